use async_channel::Sender;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

/// A value delivered by a [`Debouncer`], stamped with the schedule call that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick<T> {
    pub generation: u64,
    pub value: T,
}

/// Coalesces bursts of events into one delivery of the last value.
///
/// Scheduling aborts whatever was pending. A tick that already left the task before a newer
/// schedule call is recognisable with [`Debouncer::is_current`].
pub struct Debouncer<T> {
    runtime: Handle,
    delay: Duration,
    tx: Sender<Tick<T>>,
    generation: Arc<AtomicU64>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(runtime: Handle, delay: Duration, tx: Sender<Tick<T>>) -> Self {
        Self {
            runtime,
            delay,
            tx,
            generation: Arc::new(AtomicU64::new(0)),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule(&self, value: T) {
        self.spawn(value, self.delay);
    }

    /// Supersedes anything pending and delivers without waiting.
    pub fn schedule_now(&self, value: T) {
        self.spawn(value, Duration::ZERO);
    }

    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    pub fn is_current(&self, tick: &Tick<T>) -> bool {
        tick.generation == self.generation.load(Ordering::SeqCst)
    }

    fn spawn(&self, value: T, delay: Duration) {
        let mut pending = self.pending.lock();
        if let Some(task) = pending.take() {
            task.abort();
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let tx = self.tx.clone();
        *pending = Some(self.runtime.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if tx.send(Tick { generation, value }).await.is_err() {
                log::debug!("Debounced tick {} dropped: receiver closed", generation);
            }
        }));
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(task) = self.pending.get_mut().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn debouncer(delay_ms: u64) -> (Debouncer<u32>, async_channel::Receiver<Tick<u32>>) {
        let (tx, rx) = async_channel::unbounded();
        (
            Debouncer::new(Handle::current(), Duration::from_millis(delay_ms), tx),
            rx,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_coalesces_to_last_value() {
        let (debouncer, rx) = debouncer(150);

        for size in 1..=10 {
            debouncer.schedule(size);
            tokio::time::advance(Duration::from_millis(10)).await;
        }

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.value, 10);
        assert!(debouncer.is_current(&tick));

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_events_each_fire() {
        let (debouncer, rx) = debouncer(100);

        debouncer.schedule(1);
        let first = rx.recv().await.unwrap();
        debouncer.schedule(2);
        let second = rx.recv().await.unwrap();

        assert_eq!((first.value, second.value), (1, 2));
        assert!(!debouncer.is_current(&first));
        assert!(debouncer.is_current(&second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_now_supersedes_pending() {
        let (debouncer, rx) = debouncer(100);

        debouncer.schedule(1);
        debouncer.schedule_now(2);

        let tick = rx.recv().await.unwrap();
        assert_eq!(tick.value, 2);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_and_in_flight() {
        let (debouncer, rx) = debouncer(100);

        debouncer.schedule_now(1);
        let in_flight = rx.recv().await.unwrap();
        debouncer.schedule(2);
        debouncer.cancel();

        assert!(!debouncer.is_current(&in_flight));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(rx.try_recv().is_err());
    }
}
