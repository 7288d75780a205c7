//! Seek arbiter
//!
//! Resolves conflicting position updates between UI drag input and hardware
//! events. The arbiter owns the UI intent, distinct from the session's
//! `Seeking` status (which reflects the hardware layer's own in-flight
//! jump).
//!
//! Precedence rule: while a drag or a released-but-unconfirmed seek is
//! outstanding, the arbiter's position overrides anything the hardware
//! reports. The flag clears only on hardware confirmation, never
//! optimistically, so a late position tick cannot overwrite a just-released
//! target with a stale pre-seek position.

use std::time::Duration;

/// Arbitrates displayed position between a drag gesture and hardware ticks
#[derive(Debug, Clone, Default)]
pub struct SeekArbiter {
    /// Live drag position while the handle is held
    drag: Option<Duration>,

    /// Released target awaiting hardware confirmation
    outstanding: Option<Duration>,
}

impl SeekArbiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// The user grabbed the seek handle at the current position
    pub fn begin_drag(&mut self, current: Duration) {
        self.drag = Some(current);
    }

    /// The handle moved; ignored when no drag is active
    pub fn update_drag(&mut self, position: Duration) {
        if self.drag.is_some() {
            self.drag = Some(position);
        }
    }

    /// The handle was released
    ///
    /// Returns the target to pass to `PlaybackSession::seek`, exactly once
    /// per drag. The UI flag stays set until [`confirm`](Self::confirm).
    pub fn release(&mut self) -> Option<Duration> {
        let target = self.drag.take()?;
        self.outstanding = Some(target);
        Some(target)
    }

    /// Abandon any drag or outstanding target (track switch, stop, unmount)
    pub fn reset(&mut self) {
        self.drag = None;
        self.outstanding = None;
    }

    /// The hardware layer confirmed the jump landed
    pub fn confirm(&mut self) {
        self.outstanding = None;
    }

    /// Whether UI intent currently overrides hardware position
    pub fn is_engaged(&self) -> bool {
        self.drag.is_some() || self.outstanding.is_some()
    }

    /// Position to display, given the session-reported position
    pub fn display_position(&self, reported: Duration) -> Duration {
        self.drag.or(self.outstanding).unwrap_or(reported)
    }
}
