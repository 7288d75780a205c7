//! Volume control
//!
//! Volume is the unit range the hardware output consumes directly.
//! Out-of-range input clamps rather than erroring; mute preserves the
//! level so unmuting restores it.

/// Volume controller
#[derive(Debug, Clone)]
pub struct Volume {
    /// Level in [0.0, 1.0]
    level: f32,

    /// Mute state (preserves the level)
    muted: bool,
}

impl Volume {
    /// Create a new controller, clamping the initial level
    pub fn new(level: f32) -> Self {
        Self {
            level: level.clamp(0.0, 1.0),
            muted: false,
        }
    }

    /// Set the level, clamping to [0.0, 1.0]
    pub fn set_level(&mut self, level: f32) {
        self.level = level.clamp(0.0, 1.0);
    }

    /// Current level (regardless of mute)
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Volume to hand to the output: 0.0 while muted, the level otherwise
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}
