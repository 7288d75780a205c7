//! Core types for the playback session

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A playable unit as displayed by the site
///
/// Owned by whichever list or modal currently displays it; the session
/// keeps only the currently loaded track, never the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Record id from the works table
    pub id: u64,

    /// Display title
    pub title: String,

    /// Streaming URL (`/storage/{key}`)
    pub audio_url: String,

    /// Artwork URL (optional)
    pub thumbnail_url: Option<String>,

    /// Free-form description (optional)
    pub description: Option<String>,
}

/// Session status
///
/// `Idle` is the only status without a loaded track. `Seeking` reflects a
/// position jump in flight at the hardware layer; the prior play/pause
/// status is restored when the jump lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackStatus {
    /// No track loaded
    Idle,

    /// Source attached, awaiting decodable metadata
    Loading,

    /// Position advancing
    Playing,

    /// Position frozen
    Paused,

    /// A position jump is in flight
    Seeking,
}

/// Configuration for the playback session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Initial volume, 0.0 to 1.0 (default: 0.7)
    pub volume: f32,

    /// Minimum position change worth notifying subscribers about
    /// (default: 100 ms). Authoritative updates after a seek or first
    /// metadata always bypass this.
    pub position_epsilon: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            position_epsilon: Duration::from_millis(100),
        }
    }
}

/// Read-only view of the full session state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub current_track: Option<Track>,
    pub status: PlaybackStatus,
    pub position: Duration,
    pub duration: Duration,
    pub volume: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.volume, 0.7);
        assert_eq!(config.position_epsilon, Duration::from_millis(100));
    }
}
