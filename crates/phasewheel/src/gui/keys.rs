use gdk4::Key as GdkKey;
use phasering::highlight::Key;

/// Keyboard input the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Zero-based step picked with the number row.
    Digit(usize),
    Next,
    Previous,
    Activate(Key),
    Escape,
}

impl KeyInput {
    pub fn from_key(key: GdkKey) -> Option<Self> {
        if key == GdkKey::Escape {
            Some(Self::Escape)
        } else if key == GdkKey::Return || key == GdkKey::KP_Enter {
            Some(Self::Activate(Key::Enter))
        } else if key == GdkKey::space {
            Some(Self::Activate(Key::Space))
        } else if key == GdkKey::Right || key == GdkKey::Down {
            Some(Self::Next)
        } else if key == GdkKey::Left || key == GdkKey::Up {
            Some(Self::Previous)
        } else {
            key.to_unicode()
                .and_then(|c| c.to_digit(10))
                .filter(|d| *d > 0)
                .map(|d| Self::Digit(d as usize - 1))
        }
    }
}

/// Moves keyboard focus by `delta` steps, wrapping around.
pub fn step_focus(focused: Option<usize>, delta: isize, count: usize) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let next = match focused {
        Some(k) => (k as isize + delta).rem_euclid(count as isize) as usize,
        None if delta < 0 => count - 1,
        None => 0,
    };
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyInput::from_key(GdkKey::Escape), Some(KeyInput::Escape));
        assert_eq!(
            KeyInput::from_key(GdkKey::Return),
            Some(KeyInput::Activate(Key::Enter))
        );
        assert_eq!(
            KeyInput::from_key(GdkKey::space),
            Some(KeyInput::Activate(Key::Space))
        );
        assert_eq!(KeyInput::from_key(GdkKey::Left), Some(KeyInput::Previous));
        assert_eq!(
            KeyInput::from_key(GdkKey::_3),
            Some(KeyInput::Digit(2))
        );
        assert_eq!(KeyInput::from_key(GdkKey::_0), None);
        assert_eq!(KeyInput::from_key(GdkKey::q), None);
    }

    #[test]
    fn test_step_focus_wraps() {
        assert_eq!(step_focus(None, 1, 4), Some(0));
        assert_eq!(step_focus(None, -1, 4), Some(3));
        assert_eq!(step_focus(Some(3), 1, 4), Some(0));
        assert_eq!(step_focus(Some(0), -1, 4), Some(3));
        assert_eq!(step_focus(Some(1), 1, 0), None);
    }
}
