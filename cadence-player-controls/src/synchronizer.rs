use std::{sync::Arc, time::Duration};

use cadence_player_models::Track;
use tracing::{debug, instrument, warn};

use crate::{
    notification::NotificationBroadcast,
    primitive::{Generation, Load, PrimitiveEvent, PrimitiveEventKind, RenderingPrimitive},
    queue::Direction,
    store::{Action, PlaybackState},
    time::{drift, format_duration},
};

#[derive(Debug, Clone, Copy)]
struct PendingSeek {
    target: Duration,
    reissued: u32,
    /// The target is close enough to the end that a `TrackEnded` may
    /// legitimately follow before any time update confirms it.
    near_end: bool,
}

/// Sole owner of the rendering primitive.
///
/// Store snapshots flow in through [`Synchronizer::reconcile`] and become
/// primitive commands. Primitive events flow in through
/// [`Synchronizer::handle_event`] and come back out as store actions.
pub struct Synchronizer<P> {
    primitive: P,
    broadcast: Arc<NotificationBroadcast>,
    generation: Generation,
    loaded: Option<Track>,
    failed: bool,
    transition: u64,
    is_playing: bool,
    volume: f32,
    scrubbing: bool,
    pending_seek: Option<PendingSeek>,
    drift_tolerance: Duration,
    max_seek_reissues: u32,
}

impl<P: RenderingPrimitive> Synchronizer<P> {
    pub fn new(
        mut primitive: P,
        broadcast: Arc<NotificationBroadcast>,
        volume: f32,
        drift_tolerance: Duration,
        max_seek_reissues: u32,
    ) -> Self {
        primitive.set_volume(volume);

        Self {
            primitive,
            broadcast,
            generation: Generation::default(),
            loaded: None,
            failed: false,
            transition: 0,
            is_playing: false,
            volume,
            scrubbing: false,
            pending_seek: None,
            drift_tolerance,
            max_seek_reissues,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    /// Brings the primitive in line with `state`.
    #[instrument(skip_all)]
    pub fn reconcile(&mut self, state: &PlaybackState) {
        if let Some(track) = &state.current_track {
            let same_source = self
                .loaded
                .as_ref()
                .is_some_and(|loaded| loaded.same_source(track));

            if !same_source || (self.failed && state.is_playing) {
                self.load(track, state.transition);
                self.apply_play_flag(state.is_playing);
            } else if self.transition != state.transition {
                debug!("restarting {}", track.title);
                self.transition = state.transition;
                self.issue_seek(Duration::ZERO, state.duration);
                self.apply_play_flag(state.is_playing);
            } else if self.is_playing != state.is_playing {
                self.apply_play_flag(state.is_playing);
            }
        }

        if self.volume != state.volume {
            self.volume = state.volume;
            self.primitive.set_volume(state.volume);
        }
    }

    /// Mirrors a seek that originated in the store.
    pub fn mirror_seek(&mut self, state: &PlaybackState) {
        if self.loaded.is_none() || self.failed {
            return;
        }

        self.issue_seek(state.current_time, state.duration);
    }

    pub fn begin_scrub(&mut self) {
        self.scrubbing = true;
    }

    pub fn end_scrub(&mut self) {
        self.scrubbing = false;
    }

    pub fn tick(&mut self) {
        self.primitive.tick();
    }

    /// Translates a primitive event into the store action it implies.
    /// Events from an earlier load are dropped.
    #[instrument(skip(self))]
    pub fn handle_event(&mut self, event: PrimitiveEvent) -> Option<Action> {
        if event.generation != self.generation {
            debug!(current = self.generation.value(), "discarding stale event");
            return None;
        }

        match event.kind {
            PrimitiveEventKind::TimeAdvanced(time) => self.time_advanced(time),
            PrimitiveEventKind::MetadataReady(duration) => Some(Action::SetDuration(duration)),
            PrimitiveEventKind::TrackEnded => {
                // The output finished a play-through that a seek or restart
                // has since replaced.
                if self.pending_seek.is_some_and(|pending| !pending.near_end) {
                    debug!("discarding end of abandoned play-through");
                    return None;
                }

                self.pending_seek = None;
                Some(Action::Advance(Direction::Next))
            }
            PrimitiveEventKind::LoadFailed(reason) => {
                self.failed = true;
                self.pending_seek = None;

                let title = self
                    .loaded
                    .as_ref()
                    .map(|t| t.title.as_str())
                    .unwrap_or("track");
                warn!(%reason, "load failed");
                self.broadcast
                    .send_error(format!("Unable to play {title}: {reason}"));

                Some(Action::Halt)
            }
        }
    }

    fn time_advanced(&mut self, time: Duration) -> Option<Action> {
        if self.scrubbing {
            return None;
        }

        if let Some(pending) = self.pending_seek.as_mut() {
            if drift(time, pending.target) > self.drift_tolerance {
                if pending.reissued < self.max_seek_reissues {
                    pending.reissued += 1;
                    let target = pending.target;
                    debug!(?time, ?target, "output drifted from requested seek");
                    self.primitive.seek_to(target);
                    return None;
                }

                warn!(?time, target = ?pending.target, "output ignored seek, following its clock");
                self.broadcast.send_warning(format!(
                    "Unable to seek to {}",
                    format_duration(pending.target.as_secs())
                ));
            }

            self.pending_seek = None;
        }

        Some(Action::SetCurrentTime(time))
    }

    fn load(&mut self, track: &Track, transition: u64) {
        self.generation = self.generation.next();
        self.loaded = Some(track.clone());
        self.failed = false;
        self.transition = transition;
        self.pending_seek = None;

        debug!(generation = self.generation.value(), source = %track.source, "loading");

        self.primitive.load_source(Load {
            generation: self.generation,
            locator: track.source.clone(),
            duration_hint: track.duration(),
        });
    }

    fn apply_play_flag(&mut self, is_playing: bool) {
        self.is_playing = is_playing;

        if is_playing {
            self.primitive.start();
        } else {
            self.primitive.stop();
        }
    }

    fn issue_seek(&mut self, target: Duration, duration: Duration) {
        self.primitive.seek_to(target);
        self.pending_seek = Some(PendingSeek {
            target,
            reissued: 0,
            near_end: !duration.is_zero() && target + self.drift_tolerance >= duration,
        });
    }
}
