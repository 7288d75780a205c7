//! Hardware output boundary
//!
//! The session owns exactly one output resource at a time. Outputs are
//! created through [`AudioBackend::open`] and torn down by dropping the
//! boxed [`AudioOutput`]; implementors detach their event delivery in
//! `Drop`. Asynchronous notifications come back through
//! [`PlaybackSession::handle_event`](crate::PlaybackSession::handle_event)
//! tagged with the [`Epoch`] the output was opened under, so notifications
//! from an already-released output are recognizably stale.

use crate::error::Result;
use std::time::Duration;

/// Generation counter for output resources
///
/// Bumped every time the session releases its output. Events carrying an
/// older epoch are discarded; this is the explicit form of "remove the old
/// element's listeners before attaching the new one".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Epoch(u64);

impl Epoch {
    pub(crate) fn initial() -> Self {
        Self(0)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// A single decoding/output resource (one per running session)
///
/// Commands are fire-and-forget at this boundary: `play` and `seek` start
/// asynchronous work whose completion arrives later as an [`OutputEvent`].
pub trait AudioOutput: Send {
    /// Begin or resume output
    fn play(&mut self) -> Result<()>;

    /// Freeze output, keeping the decoded position
    fn pause(&mut self);

    /// Start an asynchronous jump to `position`
    ///
    /// Completion is reported via [`OutputEvent::SeekCompleted`].
    fn seek(&mut self, position: Duration) -> Result<()>;

    /// Set output volume, 0.0 to 1.0
    fn set_volume(&mut self, volume: f32);
}

/// Factory for output resources
pub trait AudioBackend: Send {
    /// Attach a new source and return its output resource
    ///
    /// Events for this resource must be delivered with the given `epoch`.
    fn open(&mut self, url: &str, epoch: Epoch) -> Result<Box<dyn AudioOutput>>;
}

/// Asynchronous notifications from the hardware layer
#[derive(Debug, Clone, PartialEq)]
pub enum OutputEvent {
    /// Decodable metadata is available; duration is now trustworthy
    MetadataLoaded { duration: Duration },

    /// Periodic position advance during playback
    PositionTick { position: Duration },

    /// A previously issued seek landed; `position` is authoritative
    SeekCompleted { position: Duration },

    /// The track reached its natural end
    Ended,

    /// The source failed
    ///
    /// `aborted` marks the benign cancellation produced when a pending
    /// load/seek is superseded by a newer command; it is never surfaced to
    /// subscribers. Everything else is a genuine decode failure.
    Failed { aborted: bool, message: String },
}
