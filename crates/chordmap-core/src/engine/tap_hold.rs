// Chordmap Tap-Hold Tracking
// The dual-role key awaiting a tap or hold decision

use crate::action::KeyEvent;
use crate::key_action::KeyAction;
use crate::layer::KeyPos;

/// A mod-tap or layer-tap key that is down and undecided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTapHold {
    pub pos: KeyPos,
    pub action: KeyAction,
    pub pressed_at: u32,
    /// Events held back until the decision is made
    buffer: Vec<KeyEvent>,
}

impl PendingTapHold {
    /// Whether a key pressed during the wait is among the held-back events
    pub fn has_buffered_press(&self, pos: KeyPos) -> bool {
        self.buffer
            .iter()
            .any(|e| e.pos == pos && e.action.is_pressed())
    }

    pub fn into_buffer(self) -> Vec<KeyEvent> {
        self.buffer
    }
}

/// Tracks at most one undecided tap-hold key.
///
/// Decisions are made by the engine; this only holds the state between
/// the press and the decision.
#[derive(Debug, Clone, Default)]
pub struct TapHoldManager {
    active: Option<PendingTapHold>,
}

impl TapHoldManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start waiting on a tap-hold key
    pub fn start(&mut self, event: &KeyEvent, action: KeyAction) {
        if let Some(previous) = &self.active {
            log::warn!(
                "tap-hold {} started while {} is still undecided",
                action,
                previous.action
            );
        }
        self.active = Some(PendingTapHold {
            pos: event.pos,
            action,
            pressed_at: event.time,
            buffer: Vec::new(),
        });
    }

    pub fn has_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn pending(&self) -> Option<&PendingTapHold> {
        self.active.as_ref()
    }

    /// Hold an event back until the decision
    pub fn buffer(&mut self, event: KeyEvent) {
        if let Some(active) = self.active.as_mut() {
            log::trace!("buffering {} behind {}", event, active.action);
            active.buffer.push(event);
        }
    }

    /// Whether the key has been down for at least `term` milliseconds at `now`
    pub fn timed_out(&self, now: u32, term: u16) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| now.wrapping_sub(a.pressed_at) >= u32::from(term))
    }

    /// End the wait, handing back the key and its buffered events
    pub fn take(&mut self) -> Option<PendingTapHold> {
        self.active.take()
    }
}
