#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightState {
    #[default]
    Idle,
    Highlighted(usize),
}

impl HighlightState {
    pub fn active(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Highlighted(k) => Some(*k),
        }
    }

    /// Next state after `event`, for a diagram of `count` steps.
    ///
    /// Leaving a target that is not the active one is ignored: hosts are free to deliver the
    /// enter of the next target before the leave of the previous one.
    pub fn on(self, event: Interaction, count: usize) -> Self {
        match event {
            Interaction::PointerEnter(target) if target.index() < count => {
                Self::Highlighted(target.index())
            }
            Interaction::KeyPress { index, key } => match key {
                Key::Enter | Key::Space if index < count => Self::Highlighted(index),
                Key::Escape => Self::Idle,
                _ => self,
            },
            Interaction::PointerLeave(target) | Interaction::FocusOut(target)
                if self.active() == Some(target.index()) =>
            {
                Self::Idle
            }
            _ => self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Item(usize),
    Connector(usize),
}

impl Target {
    pub fn index(&self) -> usize {
        match self {
            Self::Item(k) | Self::Connector(k) => *k,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Space,
    Escape,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    PointerEnter(Target),
    PointerLeave(Target),
    KeyPress { index: usize, key: Key },
    FocusOut(Target),
}

impl Interaction {
    /// Whether this event activates a step, for diagnostics.
    pub fn activation(&self) -> Option<(usize, &'static str)> {
        match self {
            Self::PointerEnter(target) => Some((target.index(), "pointer")),
            Self::KeyPress {
                index,
                key: Key::Enter | Key::Space,
            } => Some((*index, "keyboard")),
            _ => None,
        }
    }
}
