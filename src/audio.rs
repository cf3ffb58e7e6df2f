//! Sound cues for game events
//!
//! The game never plays audio itself. The presentation layer hands an
//! `AudioManager` a `SoundSink` (Web Audio, a native mixer, a test recorder)
//! and feeds it game events and ball paths; the manager picks cues and
//! applies volume settings.

use crate::sim::{BallPath, GameEvent, GameResult, StepAction};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball enters the board
    Drop,
    /// Ball pushed by a box or through a portal
    Redirect,
    /// Ball comes to rest
    Settle,
    /// A column was secured
    ColumnSecured,
    /// Secret reservation made
    Reserve,
    /// Dormant ball released
    Release,
    /// Reservation lost to a secured column
    Forfeit,
    /// Game over with a winner
    Victory,
    /// Game over, drawn
    Draw,
}

/// Something that can actually make noise
pub trait SoundSink {
    /// Play `effect` at `volume` (0.0 - 1.0)
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Sink that discards everything
#[derive(Debug, Default)]
pub struct NullSink;

impl SoundSink for NullSink {
    fn play(&mut self, _effect: SoundEffect, _volume: f32) {}
}

/// Audio manager for the game
pub struct AudioManager<S: SoundSink> {
    sink: S,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<S: SoundSink> AudioManager<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    /// Play the cues for a batch of game events
    pub fn handle_events(&mut self, events: &[GameEvent]) {
        for effect in events.iter().filter_map(cue_for_event) {
            self.play(effect);
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}

/// Cue for a single event, if it has one
pub fn cue_for_event(event: &GameEvent) -> Option<SoundEffect> {
    match event {
        GameEvent::ColumnSecured { .. } => Some(SoundEffect::ColumnSecured),
        GameEvent::ColumnReserved { .. } => Some(SoundEffect::Reserve),
        GameEvent::ReservationReleased { .. } => Some(SoundEffect::Release),
        GameEvent::ReservationForfeited { .. } => Some(SoundEffect::Forfeit),
        GameEvent::GameOver { result: GameResult::Draw } => Some(SoundEffect::Draw),
        GameEvent::GameOver { .. } => Some(SoundEffect::Victory),
        _ => None,
    }
}

/// Cues to play alongside each step of a path during playback
pub fn cues_for_path(path: &BallPath) -> Vec<Option<SoundEffect>> {
    path.steps
        .iter()
        .enumerate()
        .map(|(i, step)| match step.action {
            StepAction::Fall if i == 0 => Some(SoundEffect::Drop),
            StepAction::Fall => None,
            StepAction::Redirect => Some(SoundEffect::Redirect),
            StepAction::Settle => Some(SoundEffect::Settle),
        })
        .collect()
}
