// Chordmap Key Events
// Timestamped press and release edges from the key matrix

use std::fmt;

use crate::layer::KeyPos;

/// The edge a physical key reported. The matrix has no repeat state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Release,
    Press,
}

impl Action {
    pub fn is_pressed(self) -> bool {
        matches!(self, Action::Press)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Release => write!(f, "release"),
            Action::Press => write!(f, "press"),
        }
    }
}

/// A physical key edge at a matrix position, stamped with the
/// firmware's monotonic millisecond clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub pos: KeyPos,
    pub action: Action,
    pub time: u32,
}

impl KeyEvent {
    pub fn press(pos: KeyPos, time: u32) -> Self {
        Self {
            pos,
            action: Action::Press,
            time,
        }
    }

    pub fn release(pos: KeyPos, time: u32) -> Self {
        Self {
            pos,
            action: Action::Release,
            time,
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @{}ms", self.action, self.pos, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_and_release_edges() {
        assert!(KeyEvent::press(KeyPos::new(0, 0), 0).action.is_pressed());
        assert!(!KeyEvent::release(KeyPos::new(0, 0), 5).action.is_pressed());
    }

    #[test]
    fn test_key_event_display() {
        let event = KeyEvent::press(KeyPos::new(1, 2), 40);
        assert_eq!(event.to_string(), "press (1,2) @40ms");
    }
}
