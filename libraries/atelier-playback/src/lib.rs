//! Atelier - Playback Session Management
//!
//! Platform-agnostic playback control for Atelier clients.
//!
//! This crate provides:
//! - A single-session playback state machine (Idle/Loading/Playing/Paused/Seeking)
//! - Exclusive ownership of one hardware output resource at a time
//! - Epoch-tagged event delivery (stale events from released outputs are discarded)
//! - Optimistic seeking with hardware reconciliation
//! - A seek arbiter for UI drag gestures
//! - Volume control with mute (level-preserving)
//! - Throttled position notifications for subscribers
//!
//! # Architecture
//!
//! `atelier-playback` is completely platform-agnostic: the hardware boundary
//! is the [`AudioBackend`]/[`AudioOutput`] trait pair, implemented by the
//! embedding platform. The session issues commands synchronously and
//! receives hardware notifications asynchronously through
//! [`PlaybackSession::handle_event`], tagged with the epoch the output was
//! opened under.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use atelier_playback::{
//!     AudioBackend, AudioOutput, Epoch, OutputEvent, PlaybackSession, Result, SessionConfig,
//!     Track,
//! };
//! use std::time::Duration;
//!
//! // Implement the hardware boundary for your platform
//! struct NullOutput;
//!
//! impl AudioOutput for NullOutput {
//!     fn play(&mut self) -> Result<()> {
//!         Ok(())
//!     }
//!     fn pause(&mut self) {}
//!     fn seek(&mut self, _position: Duration) -> Result<()> {
//!         Ok(())
//!     }
//!     fn set_volume(&mut self, _volume: f32) {}
//! }
//!
//! struct NullBackend;
//!
//! impl AudioBackend for NullBackend {
//!     fn open(&mut self, _url: &str, _epoch: Epoch) -> Result<Box<dyn AudioOutput>> {
//!         Ok(Box::new(NullOutput))
//!     }
//! }
//!
//! let mut session = PlaybackSession::new(NullBackend, SessionConfig::default());
//!
//! session.load(Track {
//!     id: 1,
//!     title: "First Light".to_string(),
//!     audio_url: "/storage/first-light.mp3".to_string(),
//!     thumbnail_url: None,
//!     description: None,
//! })?;
//!
//! // The platform delivers hardware notifications with the current epoch
//! let epoch = session.epoch();
//! session.handle_event(
//!     epoch,
//!     OutputEvent::MetadataLoaded {
//!         duration: Duration::from_secs(180),
//!     },
//! );
//!
//! session.seek(Duration::from_secs(30))?;
//! session.stop();
//! # Ok::<(), atelier_playback::PlaybackError>(())
//! ```

mod arbiter;
mod error;
mod events;
mod output;
mod session;
pub mod types;
mod volume;

// Public exports
pub use arbiter::SeekArbiter;
pub use error::{PlaybackError, Result};
pub use events::SessionEvent;
pub use output::{AudioBackend, AudioOutput, Epoch, OutputEvent};
pub use session::PlaybackSession;
pub use types::{PlaybackStatus, SessionConfig, SessionSnapshot, Track};
pub use volume::Volume;
