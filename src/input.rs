/// Held-key tracking for terminals.
///
/// Instead of acting on each key event individually, `HeldKeys` records the
/// frame of the last press/repeat event for every key. A key counts as held
/// while that record is fresh, which lets Space and a direction be held at the
/// same time.
///
/// Works on two classes of terminal:
/// * **Keyboard-enhancement capable** (Ghostty, kitty, etc.): proper
///   `Press` / `Repeat` / `Release` events, keys are dropped on release.
/// * **Classic terminals**: only `Press` events (OS key-repeat shows as
///   repeated `Press`). Keys expire after `HOLD_WINDOW` frames of silence,
///   which is shorter than the OS repeat interval, so a key stays live while
///   it is actively generating repeats.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use space_defender::platform::InputState;

/// A key is considered held if its last press/repeat event arrived within
/// this many frames. The OS key-repeat rate is ≥ 15 Hz, so a window of 4
/// frames (≈133 ms at 30 Hz) is always refreshed before expiry.
const HOLD_WINDOW: u64 = 4;

#[derive(Debug, Default)]
pub struct HeldKeys {
    last_seen: HashMap<KeyCode, u64>,
}

impl HeldKeys {
    /// Record one key event. Returns `true` for a press that asks to quit.
    pub fn observe(&mut self, event: KeyEvent, frame: u64) -> bool {
        let KeyEvent {
            code,
            kind,
            modifiers,
            ..
        } = event;
        match kind {
            KeyEventKind::Press => {
                self.last_seen.insert(code, frame);
                match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
                    KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
                    _ => false,
                }
            }
            KeyEventKind::Repeat => {
                self.last_seen.insert(code, frame);
                false
            }
            KeyEventKind::Release => {
                self.last_seen.remove(&code);
                false
            }
        }
    }

    fn is_held(&self, key: KeyCode, frame: u64) -> bool {
        self.last_seen
            .get(&key)
            .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
            .unwrap_or(false)
    }

    fn any_held(&self, keys: &[KeyCode], frame: u64) -> bool {
        keys.iter().any(|&k| self.is_held(k, frame))
    }

    /// Snapshot of the game keys for this frame.
    pub fn snapshot(&self, frame: u64) -> InputState {
        InputState {
            left: self.any_held(
                &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
                frame,
            ),
            right: self.any_held(
                &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
                frame,
            ),
            fire: self.is_held(KeyCode::Char(' '), frame),
            pause: self.any_held(&[KeyCode::Char('p'), KeyCode::Char('P')], frame),
            fullscreen: self.any_held(&[KeyCode::Char('f'), KeyCode::Char('F')], frame),
        }
    }
}
