/// The capabilities the game core needs from whatever hosts it.
///
/// The core never reaches for a window, a keyboard or a speaker itself: the
/// frontend hands it an input snapshot each tick and implements these traits.

use std::collections::HashSet;

use crate::entities::{SoundCue, Sprite};

/// Which keys are held this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub pause: bool,
    pub fullscreen: bool,
}

impl InputState {
    /// Keys held now that were not held in `previous`.
    ///
    /// Pause and fullscreen act once per press, so the frontend toggles on
    /// these edges rather than on the held state.
    pub fn rising_edges(&self, previous: &InputState) -> InputState {
        InputState {
            left: self.left && !previous.left,
            right: self.right && !previous.right,
            fire: self.fire && !previous.fire,
            pause: self.pause && !previous.pause,
            fullscreen: self.fullscreen && !previous.fullscreen,
        }
    }
}

pub trait Canvas {
    fn clear(&mut self, width: f32, height: f32);
    fn draw_sprite(&mut self, sprite: Sprite, x: f32, y: f32, width: f32, height: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn draw_text(&mut self, text: &str, x: f32, y: f32);
}

/// Fire-and-forget sound playback.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// A blocking yes/no question to the player.
pub trait Prompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// For headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl AudioSink for Silent {
    fn play(&mut self, _cue: SoundCue) {}
}

/// Which sprites the platform has finished loading.
///
/// Set once per sprite by the platform, polled by the renderer; a sprite that
/// is not ready yet is simply not drawn.
#[derive(Debug, Default, Clone)]
pub struct SpriteReadiness {
    ready: HashSet<Sprite>,
}

impl SpriteReadiness {
    pub fn mark_ready(&mut self, sprite: Sprite) {
        self.ready.insert(sprite);
    }

    pub fn mark_all_ready(&mut self) {
        self.ready.extend(Sprite::ALL);
    }

    pub fn is_ready(&self, sprite: Sprite) -> bool {
        self.ready.contains(&sprite)
    }
}
