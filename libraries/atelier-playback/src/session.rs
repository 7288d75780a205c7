//! Playback session - core state machine
//!
//! Owns the single hardware output resource and arbitrates between
//! synchronous commands (load/play/pause/seek/stop) and asynchronous
//! hardware events (metadata, position ticks, seek confirmations, errors).
//!
//! All transitions happen on the caller's thread; the design problem is
//! purely ordering. Two rules govern it:
//!
//! 1. Exactly one output resource exists at a time. Any transition that
//!    would create a second one first fully releases the current one and
//!    bumps the [`Epoch`], so stray events from the released resource are
//!    recognizably stale and discarded.
//! 2. While a seek is in flight, position ticks are ignored; the
//!    optimistically-set target holds until the hardware confirms, at which
//!    point the authoritative position wins.

use crate::{
    error::{PlaybackError, Result},
    events::SessionEvent,
    output::{AudioBackend, AudioOutput, Epoch, OutputEvent},
    types::{PlaybackStatus, SessionConfig, SessionSnapshot, Track},
    volume::Volume,
};
use std::time::Duration;

/// The single playback session of a running client
///
/// Created at application start, destroyed at teardown. Passed by handle to
/// whichever component needs it; there is no ambient global instance.
pub struct PlaybackSession<B: AudioBackend> {
    backend: B,

    // The one output resource, and the generation it was opened under
    output: Option<Box<dyn AudioOutput>>,
    epoch: Epoch,

    // State
    current_track: Option<Track>,
    status: PlaybackStatus,
    /// Status to restore when an in-flight seek lands
    resume_to: PlaybackStatus,
    position: Duration,
    duration: Duration,
    volume: Volume,

    // Subscriber notification
    pending_events: Vec<SessionEvent>,
    last_notified_position: Option<Duration>,
    position_epsilon: Duration,
}

impl<B: AudioBackend> PlaybackSession<B> {
    pub fn new(backend: B, config: SessionConfig) -> Self {
        Self {
            backend,
            output: None,
            epoch: Epoch::initial(),
            current_track: None,
            status: PlaybackStatus::Idle,
            resume_to: PlaybackStatus::Paused,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: Volume::new(config.volume),
            pending_events: Vec::new(),
            last_notified_position: None,
            position_epsilon: config.position_epsilon,
        }
    }

    // ===== Commands =====

    /// Load a track and start playback
    ///
    /// Loading the already-current track is a play/pause toggle, not a
    /// reload: position and buffered state are untouched. Loading a
    /// different track fully releases the previous output before the new
    /// one is created.
    pub fn load(&mut self, track: Track) -> Result<()> {
        if track.audio_url.is_empty() {
            return Err(PlaybackError::NoAudioUrl(track.id));
        }

        if let Some(current) = &self.current_track {
            if current.id == track.id {
                return self.toggle_play();
            }
        }

        let previous_track_id = self.current_track.as_ref().map(|t| t.id);

        // Release before attach: the old resource must be fully gone before
        // the new one exists. A load still pending on the old output is
        // thereby cancelled silently (its abort arrives with a stale epoch).
        self.release_output();
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.last_notified_position = None;

        let track_id = track.id;
        self.current_track = Some(track);
        self.set_status(PlaybackStatus::Loading);
        self.pending_events.push(SessionEvent::TrackChanged {
            track_id,
            previous_track_id,
        });

        let url = self
            .current_track
            .as_ref()
            .map(|t| t.audio_url.clone())
            .unwrap_or_default();

        match self.backend.open(&url, self.epoch) {
            Ok(mut output) => {
                output.set_volume(self.volume.effective());
                if let Err(e) = output.play() {
                    return self.fail_to_idle(e.to_string());
                }
                self.output = Some(output);
                Ok(())
            }
            Err(e) => self.fail_to_idle(e.to_string()),
        }
    }

    /// Pause playback; no-op unless currently playing
    pub fn pause(&mut self) {
        if self.status == PlaybackStatus::Playing {
            if let Some(output) = &mut self.output {
                output.pause();
            }
            self.set_status(PlaybackStatus::Paused);
        }
    }

    /// Resume playback; no-op unless paused with a source attached
    pub fn resume(&mut self) -> Result<()> {
        if self.status != PlaybackStatus::Paused {
            return Ok(());
        }
        let Some(output) = &mut self.output else {
            return Ok(());
        };
        output.play()?;
        self.set_status(PlaybackStatus::Playing);
        Ok(())
    }

    /// Playing pauses; anything else resumes
    pub fn toggle_play(&mut self) -> Result<()> {
        if self.status == PlaybackStatus::Playing {
            self.pause();
            Ok(())
        } else {
            self.resume()
        }
    }

    /// Jump to `target`
    ///
    /// Valid from any state with a loaded source. The position is set
    /// optimistically for immediate UI feedback; ticks are ignored until
    /// the hardware confirms, then the authoritative value is reconciled
    /// and the prior play/pause status restored.
    pub fn seek(&mut self, target: Duration) -> Result<()> {
        let Some(output) = &mut self.output else {
            return Err(PlaybackError::NoTrackLoaded);
        };

        match self.status {
            PlaybackStatus::Playing | PlaybackStatus::Paused => self.resume_to = self.status,
            PlaybackStatus::Loading => self.resume_to = PlaybackStatus::Playing,
            // A seek issued over a pending seek keeps the original target
            // status; Idle is unreachable here (output would be None)
            PlaybackStatus::Seeking | PlaybackStatus::Idle => {}
        }

        output.seek(target)?;
        self.position = target;
        self.notify_position_forced();
        self.set_status(PlaybackStatus::Seeking);
        Ok(())
    }

    /// Fully release the output, clear the track, return to idle
    pub fn stop(&mut self) {
        self.release_output();
        self.current_track = None;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.last_notified_position = None;
        self.set_status(PlaybackStatus::Idle);
    }

    /// Set volume; out-of-range input clamps to [0.0, 1.0]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume.set_level(volume);
        self.apply_volume();
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.volume.set_muted(muted);
        self.apply_volume();
    }

    pub fn toggle_mute(&mut self) {
        self.volume.toggle_mute();
        self.apply_volume();
    }

    // ===== Hardware events =====

    /// Current output generation; events must be delivered with the epoch
    /// their output was opened under
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Apply an asynchronous hardware notification
    ///
    /// Events from a released output (stale epoch) are discarded entirely,
    /// including abort-classified failures from superseded loads.
    pub fn handle_event(&mut self, epoch: Epoch, event: OutputEvent) {
        if epoch != self.epoch {
            tracing::trace!(?event, "discarding event from released output");
            return;
        }

        match event {
            OutputEvent::MetadataLoaded { duration } => {
                self.duration = duration;
                self.pending_events
                    .push(SessionEvent::DurationKnown { duration });
                self.notify_position_forced();
                if self.status == PlaybackStatus::Loading {
                    self.set_status(PlaybackStatus::Playing);
                }
            }
            OutputEvent::PositionTick { position } => {
                // The core seek race: ticks racing an in-flight jump must
                // not overwrite the optimistic target
                if self.status == PlaybackStatus::Seeking {
                    return;
                }
                self.position = position;
                self.notify_position_throttled();
            }
            OutputEvent::SeekCompleted { position } => {
                self.position = position;
                if self.status == PlaybackStatus::Seeking {
                    self.set_status(self.resume_to);
                }
                self.notify_position_forced();
            }
            OutputEvent::Ended => {
                self.position = self.duration;
                if let Some(track) = &self.current_track {
                    self.pending_events
                        .push(SessionEvent::TrackFinished { track_id: track.id });
                }
                self.set_status(PlaybackStatus::Paused);
                self.notify_position_forced();
            }
            OutputEvent::Failed { aborted, message } => {
                if aborted {
                    // Expected cancellation from rapid successive commands
                    tracing::debug!("playback aborted by a newer command");
                    return;
                }
                let _ = self.fail_to_idle(message);
            }
        }
    }

    // ===== State queries =====

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_track: self.current_track.clone(),
            status: self.status,
            position: self.position,
            duration: self.duration,
            volume: self.volume.level(),
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    /// Duration is zero until the output has reported metadata
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Drain events queued since the last call
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internal =====

    /// Drop the output (its teardown runs in Drop) and bump the epoch so
    /// anything it still emits is stale
    fn release_output(&mut self) {
        self.output = None;
        self.epoch = self.epoch.next();
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.status != status {
            self.status = status;
            self.pending_events
                .push(SessionEvent::StateChanged { status });
        }
    }

    fn apply_volume(&mut self) {
        if let Some(output) = &mut self.output {
            output.set_volume(self.volume.effective());
        }
        self.pending_events.push(SessionEvent::VolumeChanged {
            volume: self.volume.level(),
            muted: self.volume.is_muted(),
        });
    }

    /// Report a genuine failure once and return to idle
    fn fail_to_idle(&mut self, message: String) -> Result<()> {
        self.release_output();
        self.current_track = None;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.last_notified_position = None;
        self.pending_events.push(SessionEvent::PlaybackError {
            message: message.clone(),
        });
        self.set_status(PlaybackStatus::Idle);
        Err(PlaybackError::Output(message))
    }

    /// Notify subscribers only on meaningful movement
    fn notify_position_throttled(&mut self) {
        let meaningful = match self.last_notified_position {
            None => true,
            Some(last) => {
                let delta = if self.position > last {
                    self.position - last
                } else {
                    last - self.position
                };
                delta >= self.position_epsilon
            }
        };
        if meaningful {
            self.notify_position_forced();
        }
    }

    /// Authoritative update: bypasses throttling (post-seek, metadata, end)
    fn notify_position_forced(&mut self) {
        self.last_notified_position = Some(self.position);
        self.pending_events.push(SessionEvent::PositionChanged {
            position: self.position,
            duration: self.duration,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Shared observation point for everything the session does to the
    /// hardware boundary
    #[derive(Default)]
    struct Probe {
        live_outputs: AtomicUsize,
        max_live_outputs: AtomicUsize,
        opened_urls: Mutex<Vec<String>>,
        plays: AtomicUsize,
        pauses: AtomicUsize,
        seeks: Mutex<Vec<Duration>>,
        volumes: Mutex<Vec<f32>>,
    }

    struct TestOutput {
        probe: Arc<Probe>,
    }

    impl AudioOutput for TestOutput {
        fn play(&mut self) -> Result<()> {
            self.probe.plays.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn pause(&mut self) {
            self.probe.pauses.fetch_add(1, Ordering::SeqCst);
        }

        fn seek(&mut self, position: Duration) -> Result<()> {
            self.probe.seeks.lock().unwrap().push(position);
            Ok(())
        }

        fn set_volume(&mut self, volume: f32) {
            self.probe.volumes.lock().unwrap().push(volume);
        }
    }

    impl Drop for TestOutput {
        fn drop(&mut self) {
            self.probe.live_outputs.fetch_sub(1, Ordering::SeqCst);
        }
    }

    struct TestBackend {
        probe: Arc<Probe>,
    }

    impl AudioBackend for TestBackend {
        fn open(&mut self, url: &str, _epoch: Epoch) -> Result<Box<dyn AudioOutput>> {
            if url.contains("unplayable") {
                return Err(PlaybackError::Output("cannot open source".to_string()));
            }
            let live = self.probe.live_outputs.fetch_add(1, Ordering::SeqCst) + 1;
            self.probe
                .max_live_outputs
                .fetch_max(live, Ordering::SeqCst);
            self.probe.opened_urls.lock().unwrap().push(url.to_string());
            Ok(Box::new(TestOutput {
                probe: Arc::clone(&self.probe),
            }))
        }
    }

    fn session() -> (PlaybackSession<TestBackend>, Arc<Probe>) {
        let probe = Arc::new(Probe::default());
        let backend = TestBackend {
            probe: Arc::clone(&probe),
        };
        (
            PlaybackSession::new(backend, SessionConfig::default()),
            probe,
        )
    }

    fn track(id: u64) -> Track {
        Track {
            id,
            title: format!("Track {id}"),
            audio_url: format!("/storage/{id}.mp3"),
            thumbnail_url: None,
            description: None,
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn millis(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn load_attaches_and_plays_on_metadata() {
        let (mut session, probe) = session();

        session.load(track(1)).unwrap();
        assert_eq!(session.status(), PlaybackStatus::Loading);
        assert_eq!(session.duration(), Duration::ZERO);

        let epoch = session.epoch();
        session.handle_event(epoch, OutputEvent::MetadataLoaded { duration: secs(180) });
        assert_eq!(session.status(), PlaybackStatus::Playing);
        assert_eq!(session.duration(), secs(180));
        assert_eq!(probe.plays.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn loading_the_current_track_toggles_instead_of_reloading() {
        let (mut session, probe) = session();

        session.load(track(1)).unwrap();
        let epoch = session.epoch();
        session.handle_event(epoch, OutputEvent::MetadataLoaded { duration: secs(180) });
        session.handle_event(epoch, OutputEvent::PositionTick { position: secs(30) });
        assert_eq!(session.position(), secs(30));

        // Same track: toggles to paused, does not reset position or reopen
        session.load(track(1)).unwrap();
        assert_eq!(session.status(), PlaybackStatus::Paused);
        assert_eq!(session.position(), secs(30));
        assert_eq!(probe.opened_urls.lock().unwrap().len(), 1);

        // And back to playing
        session.load(track(1)).unwrap();
        assert_eq!(session.status(), PlaybackStatus::Playing);
    }

    #[test]
    fn switching_tracks_never_overlaps_outputs() {
        let (mut session, probe) = session();

        session.load(track(1)).unwrap();
        let epoch = session.epoch();
        session.handle_event(epoch, OutputEvent::MetadataLoaded { duration: secs(100) });
        session.handle_event(epoch, OutputEvent::PositionTick { position: secs(42) });

        session.load(track(2)).unwrap();
        assert_eq!(probe.max_live_outputs.load(Ordering::SeqCst), 1);
        assert_eq!(probe.opened_urls.lock().unwrap().len(), 2);
        assert_eq!(session.status(), PlaybackStatus::Loading);
        assert_eq!(session.position(), Duration::ZERO);
        assert_eq!(session.duration(), Duration::ZERO);
        assert_eq!(session.current_track().unwrap().id, 2);
    }

    #[test]
    fn events_from_a_released_output_are_discarded() {
        let (mut session, _probe) = session();

        session.load(track(1)).unwrap();
        let stale = session.epoch();
        session.load(track(2)).unwrap();

        // Late tick from track 1's output
        session.handle_event(stale, OutputEvent::PositionTick { position: secs(50) });
        assert_eq!(session.position(), Duration::ZERO);

        // Its abort must stay silent, and even a decode error from the
        // released output must not disturb the new session state
        session.handle_event(
            stale,
            OutputEvent::Failed {
                aborted: true,
                message: "aborted".to_string(),
            },
        );
        session.handle_event(
            stale,
            OutputEvent::Failed {
                aborted: false,
                message: "decode error".to_string(),
            },
        );
        assert_eq!(session.status(), PlaybackStatus::Loading);
        assert_eq!(session.current_track().unwrap().id, 2);
        let events = session.take_events();
        assert!(!events
            .iter()
            .any(|e| matches!(e, SessionEvent::PlaybackError { .. })));
    }

    #[test]
    fn ticks_during_seek_do_not_overwrite_the_target() {
        let (mut session, probe) = session();

        session.load(track(1)).unwrap();
        let epoch = session.epoch();
        session.handle_event(epoch, OutputEvent::MetadataLoaded { duration: secs(300) });
        session.handle_event(epoch, OutputEvent::PositionTick { position: secs(10) });

        session.seek(secs(120)).unwrap();
        assert_eq!(session.status(), PlaybackStatus::Seeking);
        assert_eq!(session.position(), secs(120));
        assert_eq!(*probe.seeks.lock().unwrap(), vec![secs(120)]);

        // A tick from just before the jump landed
        session.handle_event(epoch, OutputEvent::PositionTick { position: secs(11) });
        assert_eq!(session.position(), secs(120));

        // Confirmation reconciles to the authoritative value
        session.handle_event(
            epoch,
            OutputEvent::SeekCompleted {
                position: millis(119_950),
            },
        );
        assert_eq!(session.status(), PlaybackStatus::Playing);
        assert_eq!(session.position(), millis(119_950));
    }

    #[test]
    fn seek_from_paused_returns_to_paused() {
        let (mut session, _probe) = session();

        session.load(track(1)).unwrap();
        let epoch = session.epoch();
        session.handle_event(epoch, OutputEvent::MetadataLoaded { duration: secs(300) });
        session.pause();

        session.seek(secs(60)).unwrap();
        assert_eq!(session.status(), PlaybackStatus::Seeking);
        session.handle_event(epoch, OutputEvent::SeekCompleted { position: secs(60) });
        assert_eq!(session.status(), PlaybackStatus::Paused);
    }

    #[test]
    fn stop_after_seek_resets_the_whole_session() {
        let (mut session, probe) = session();

        session.load(track(1)).unwrap();
        let epoch = session.epoch();
        session.handle_event(epoch, OutputEvent::MetadataLoaded { duration: secs(200) });
        session.seek(secs(30)).unwrap();
        session.stop();

        let snapshot = session.snapshot();
        assert_eq!(snapshot.current_track, None);
        assert_eq!(snapshot.status, PlaybackStatus::Idle);
        assert_eq!(snapshot.position, Duration::ZERO);
        assert_eq!(snapshot.duration, Duration::ZERO);
        assert_eq!(probe.live_outputs.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn natural_end_pauses_with_position_at_duration() {
        let (mut session, _probe) = session();

        session.load(track(7)).unwrap();
        let epoch = session.epoch();
        session.handle_event(epoch, OutputEvent::MetadataLoaded { duration: secs(90) });
        session.take_events();

        session.handle_event(epoch, OutputEvent::Ended);
        assert_eq!(session.status(), PlaybackStatus::Paused);
        assert_eq!(session.position(), secs(90));
        let events = session.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, SessionEvent::TrackFinished { track_id: 7 })));
    }

    #[test]
    fn decode_failure_reports_once_and_returns_to_idle() {
        let (mut session, probe) = session();

        session.load(track(1)).unwrap();
        let epoch = session.epoch();
        session.take_events();

        session.handle_event(
            epoch,
            OutputEvent::Failed {
                aborted: false,
                message: "unsupported codec".to_string(),
            },
        );

        let snapshot = session.snapshot();
        assert_eq!(snapshot.status, PlaybackStatus::Idle);
        assert_eq!(snapshot.current_track, None);
        assert_eq!(probe.live_outputs.load(Ordering::SeqCst), 0);

        let errors: Vec<_> = session
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, SessionEvent::PlaybackError { .. }))
            .collect();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn open_failure_surfaces_error_and_stays_idle() {
        let (mut session, _probe) = session();

        let mut bad = track(9);
        bad.audio_url = "/storage/unplayable.mp3".to_string();
        assert!(session.load(bad).is_err());

        assert_eq!(session.status(), PlaybackStatus::Idle);
        assert!(session.current_track().is_none());
        assert!(session
            .take_events()
            .iter()
            .any(|e| matches!(e, SessionEvent::PlaybackError { .. })));
    }

    #[test]
    fn resume_and_pause_away_from_their_states_are_noops() {
        let (mut session, probe) = session();

        session.resume().unwrap();
        session.pause();
        assert_eq!(session.status(), PlaybackStatus::Idle);
        assert_eq!(probe.plays.load(Ordering::SeqCst), 0);
        assert_eq!(probe.pauses.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn seek_without_a_source_is_an_error() {
        let (mut session, _probe) = session();
        assert!(matches!(
            session.seek(secs(10)),
            Err(PlaybackError::NoTrackLoaded)
        ));
    }

    #[test]
    fn volume_clamps_and_reaches_the_output() {
        let (mut session, probe) = session();

        session.load(track(1)).unwrap();
        session.set_volume(1.7);
        assert_eq!(session.snapshot().volume, 1.0);
        assert_eq!(*probe.volumes.lock().unwrap().last().unwrap(), 1.0);

        session.set_volume(-0.2);
        assert_eq!(session.snapshot().volume, 0.0);

        session.set_volume(0.4);
        session.set_muted(true);
        assert_eq!(*probe.volumes.lock().unwrap().last().unwrap(), 0.0);
        // Level survives the mute
        assert_eq!(session.snapshot().volume, 0.4);
    }

    #[test]
    fn position_notifications_are_throttled_but_seeks_are_not() {
        let (mut session, _probe) = session();

        session.load(track(1)).unwrap();
        let epoch = session.epoch();
        session.handle_event(epoch, OutputEvent::MetadataLoaded { duration: secs(60) });
        session.take_events();

        let count_position_events = |events: &[SessionEvent]| {
            events
                .iter()
                .filter(|e| matches!(e, SessionEvent::PositionChanged { .. }))
                .count()
        };

        // Big jump notifies
        session.handle_event(epoch, OutputEvent::PositionTick { position: secs(1) });
        assert_eq!(count_position_events(&session.take_events()), 1);

        // Sub-epsilon movement does not
        session.handle_event(
            epoch,
            OutputEvent::PositionTick {
                position: millis(1_050),
            },
        );
        assert_eq!(count_position_events(&session.take_events()), 0);

        // Crossing epsilon notifies again
        session.handle_event(
            epoch,
            OutputEvent::PositionTick {
                position: millis(1_200),
            },
        );
        assert_eq!(count_position_events(&session.take_events()), 1);

        // A seek confirmation always notifies, however small the delta
        session.seek(millis(1_250)).unwrap();
        session.handle_event(
            epoch,
            OutputEvent::SeekCompleted {
                position: millis(1_250),
            },
        );
        assert!(count_position_events(&session.take_events()) >= 1);
    }
}
