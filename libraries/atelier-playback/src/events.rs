//! Session events
//!
//! Event-based communication for UI synchronization. Position updates are
//! throttled to meaningful changes; the authoritative update after a seek
//! completes (and the first one after metadata arrives) is always emitted.

use crate::types::PlaybackStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events emitted by the playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Session status changed
    StateChanged { status: PlaybackStatus },

    /// A different track was loaded
    TrackChanged {
        track_id: u64,
        previous_track_id: Option<u64>,
    },

    /// Playback position changed meaningfully (or authoritatively)
    PositionChanged {
        position: Duration,
        duration: Duration,
    },

    /// Duration became known (metadata arrived)
    DurationKnown { duration: Duration },

    /// Track finished playing naturally
    TrackFinished { track_id: u64 },

    /// Volume or mute state changed
    VolumeChanged { volume: f32, muted: bool },

    /// A genuine playback failure (aborted loads are never reported)
    PlaybackError { message: String },
}
