use std::time::Duration;

use cadence_player_models::Track;

use crate::{
    queue::{Direction, Queue},
    time::clamp_seconds,
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Playing,
    Paused,
    #[default]
    Empty,
}

/// Inputs to [`PlayerState::reduce`]. None of them can fail, bad values are
/// clamped or ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetQueue(Vec<Track>),
    Play(Track),
    Pause,
    Resume,
    /// Position in seconds, any real value.
    Seek(f64),
    SetVolume(f32),
    SetDuration(Duration),
    SetCurrentTime(Duration),
    Advance(Direction),
    SkipTo(usize),
    Enqueue(Track),
    Halt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub volume: f32,
    pub current_time: Duration,
    pub duration: Duration,
    /// Bumped on every track transition, including a restart of the same
    /// track.
    pub transition: u64,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            volume: clamp_volume(volume).unwrap_or(1.0),
            current_time: Duration::ZERO,
            duration: Duration::ZERO,
            transition: 0,
        }
    }

    pub fn status(&self) -> Status {
        match (&self.current_track, self.is_playing) {
            (None, _) => Status::Empty,
            (Some(_), true) => Status::Playing,
            (Some(_), false) => Status::Paused,
        }
    }

    fn start_track(&mut self, track: Track) {
        self.duration = track.duration();
        self.current_track = Some(track);
        self.current_time = Duration::ZERO;
        self.transition += 1;
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    pub playback: PlaybackState,
    pub queue: Queue,
}

impl PlayerState {
    pub fn new(volume: f32) -> Self {
        Self {
            playback: PlaybackState::new(volume),
            queue: Queue::new(),
        }
    }

    /// Returns the state that follows `self` under `action`.
    pub fn reduce(&self, action: Action) -> Self {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    fn apply(&mut self, action: Action) {
        let playback = &mut self.playback;

        match action {
            Action::SetQueue(tracks) => {
                self.queue = Queue::from_tracks(tracks);
            }
            Action::Play(track) => {
                if let Some(index) = self.queue.position_of(&track) {
                    self.queue.select(index);
                }
                playback.start_track(track);
                playback.is_playing = true;
            }
            Action::Pause => {
                if playback.current_track.is_some() {
                    playback.is_playing = false;
                }
            }
            Action::Resume => {
                if playback.current_track.is_some() {
                    playback.is_playing = true;
                }
            }
            Action::Seek(seconds) => {
                playback.current_time = clamp_seconds(seconds, playback.duration);
            }
            Action::SetVolume(volume) => {
                if let Some(volume) = clamp_volume(volume) {
                    playback.volume = volume;
                }
            }
            Action::SetDuration(duration) => {
                if !duration.is_zero() {
                    playback.duration = duration;
                    playback.current_time = playback.current_time.min(duration);
                }
            }
            Action::SetCurrentTime(time) => {
                playback.current_time = if playback.duration.is_zero() {
                    time
                } else {
                    time.min(playback.duration)
                };
            }
            Action::Advance(direction) => {
                if let Some(track) = self.queue.step(direction) {
                    playback.start_track(track.clone());
                }
            }
            Action::SkipTo(index) => {
                if let Some(track) = self.queue.select(index) {
                    playback.start_track(track.clone());
                }
            }
            Action::Enqueue(track) => {
                self.queue.push(track);
            }
            Action::Halt => {
                playback.is_playing = false;
            }
        }
    }
}

fn clamp_volume(volume: f32) -> Option<f32> {
    if volume.is_nan() {
        None
    } else {
        Some(volume.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(id: &str) -> Track {
        Track {
            id: id.to_string(),
            title: id.to_uppercase(),
            artist: "artist".to_string(),
            duration_seconds: 180,
            source: format!("https://cdn.example.com/{id}.mp3"),
            ..Default::default()
        }
    }

    fn queued(ids: &[&str]) -> PlayerState {
        PlayerState::new(0.7).reduce(Action::SetQueue(ids.iter().map(|id| track(id)).collect()))
    }

    #[test]
    fn starts_empty() {
        let state = PlayerState::new(0.7);

        assert_eq!(state.playback.status(), Status::Empty);
        assert!(state.queue.is_empty());
        assert_eq!(state.playback.volume, 0.7);
    }

    #[test]
    fn set_queue_resets_cursor_without_playing() {
        let state = queued(&["a", "b", "c"]).reduce(Action::SkipTo(2));
        let state = state.reduce(Action::Pause).reduce(Action::SetQueue(vec![track("x")]));

        assert_eq!(state.queue.cursor(), Some(0));
        assert_eq!(state.queue.len(), 1);
        assert!(!state.playback.is_playing);
        assert_eq!(state.playback.current_track.unwrap().id, "c");
    }

    #[test]
    fn play_moves_cursor_to_queued_track() {
        let state = queued(&["a", "b", "c"]).reduce(Action::Play(track("b")));

        assert_eq!(state.queue.cursor(), Some(1));
        assert_eq!(state.playback.status(), Status::Playing);
        assert_eq!(state.playback.current_time, Duration::ZERO);
        assert_eq!(state.playback.duration, Duration::from_secs(180));
    }

    #[test]
    fn play_outside_queue_leaves_cursor() {
        let state = queued(&["a", "b", "c"])
            .reduce(Action::SkipTo(2))
            .reduce(Action::Play(track("z")));

        assert_eq!(state.queue.cursor(), Some(2));
        assert_eq!(state.playback.current_track.unwrap().id, "z");
    }

    #[test]
    fn pause_and_resume_need_a_track() {
        let empty = PlayerState::new(1.0);

        assert_eq!(empty.reduce(Action::Resume), empty);
        assert_eq!(empty.reduce(Action::Pause), empty);

        let playing = empty.reduce(Action::Play(track("a")));
        let paused = playing.reduce(Action::Pause);
        assert_eq!(paused.playback.status(), Status::Paused);
        assert_eq!(paused.reduce(Action::Resume).playback.status(), Status::Playing);
    }

    #[test]
    fn seek_clamps_to_duration() {
        let state = PlayerState::new(1.0).reduce(Action::Play(track("a")));
        let duration = state.playback.duration;

        for (input, expected) in [
            (-10.0, Duration::ZERO),
            (42.0, Duration::from_secs(42)),
            (180.0, duration),
            (1e12, duration),
            (f64::INFINITY, duration),
        ] {
            assert_eq!(state.reduce(Action::Seek(input)).playback.current_time, expected);
        }
    }

    #[test]
    fn volume_is_clamped_and_idempotent() {
        let state = PlayerState::new(1.0);

        for input in [-3.0, 0.0, 0.25, 1.0, 7.5, f32::INFINITY] {
            let once = state.reduce(Action::SetVolume(input));
            let twice = once.reduce(Action::SetVolume(input));

            assert!((0.0..=1.0).contains(&once.playback.volume));
            assert_eq!(once, twice);
        }

        let nan = state.reduce(Action::SetVolume(f32::NAN));
        assert_eq!(nan.playback.volume, 1.0);
    }

    #[test]
    fn zero_duration_keeps_provisional_value() {
        let state = PlayerState::new(1.0).reduce(Action::Play(track("a")));

        let unchanged = state.reduce(Action::SetDuration(Duration::ZERO));
        assert_eq!(unchanged.playback.duration, Duration::from_secs(180));

        let reported = state.reduce(Action::SetDuration(Duration::from_secs(183)));
        assert_eq!(reported.playback.duration, Duration::from_secs(183));
    }

    #[test]
    fn shorter_reported_duration_pulls_position_back() {
        let state = PlayerState::new(1.0)
            .reduce(Action::Play(track("a")))
            .reduce(Action::SetCurrentTime(Duration::from_secs(170)))
            .reduce(Action::SetDuration(Duration::from_secs(160)));

        assert_eq!(state.playback.current_time, Duration::from_secs(160));
    }

    #[test]
    fn primitive_time_never_passes_known_duration() {
        let state = PlayerState::new(1.0)
            .reduce(Action::Play(track("a")))
            .reduce(Action::SetCurrentTime(Duration::from_secs(500)));

        assert_eq!(state.playback.current_time, Duration::from_secs(180));
    }

    #[test]
    fn advance_on_empty_queue_is_noop() {
        let state = PlayerState::new(1.0);

        assert_eq!(state.reduce(Action::Advance(Direction::Next)), state);
        assert_eq!(state.reduce(Action::Advance(Direction::Previous)), state);

        let playing = state.reduce(Action::Play(track("a")));
        assert_eq!(playing.reduce(Action::Advance(Direction::Next)), playing);
    }

    #[test]
    fn advance_preserves_play_flag() {
        let paused = queued(&["a", "b"])
            .reduce(Action::Play(track("a")))
            .reduce(Action::Pause)
            .reduce(Action::Advance(Direction::Next));

        assert_eq!(paused.playback.current_track.as_ref().unwrap().id, "b");
        assert_eq!(paused.playback.status(), Status::Paused);

        let playing = paused
            .reduce(Action::Resume)
            .reduce(Action::Seek(30.0))
            .reduce(Action::Advance(Direction::Previous));

        assert_eq!(playing.playback.current_track.as_ref().unwrap().id, "a");
        assert_eq!(playing.playback.status(), Status::Playing);
        assert_eq!(playing.playback.current_time, Duration::ZERO);
    }

    #[test]
    fn next_then_previous_round_trips() {
        let start = queued(&["a", "b", "c"]).reduce(Action::Play(track("b")));
        let back = start
            .reduce(Action::Advance(Direction::Next))
            .reduce(Action::Advance(Direction::Previous));

        assert_eq!(back.queue.cursor(), start.queue.cursor());
        assert_eq!(back.playback.current_track, start.playback.current_track);
    }

    #[test]
    fn every_transition_is_counted() {
        let state = queued(&["a"]).reduce(Action::Play(track("a")));
        let looped = state.reduce(Action::Advance(Direction::Next));

        assert_eq!(looped.playback.current_track, state.playback.current_track);
        assert_eq!(looped.playback.transition, state.playback.transition + 1);
    }

    #[test]
    fn skip_to_out_of_range_is_noop() {
        let state = queued(&["a", "b"]).reduce(Action::Play(track("a")));

        assert_eq!(state.reduce(Action::SkipTo(9)), state);
    }

    #[test]
    fn enqueue_appends() {
        let state = PlayerState::new(1.0)
            .reduce(Action::Enqueue(track("a")))
            .reduce(Action::Enqueue(track("b")));

        assert_eq!(state.queue.len(), 2);
        assert_eq!(state.queue.cursor(), Some(0));
        assert!(state.playback.current_track.is_none());
    }

    #[test]
    fn halt_stops_but_keeps_track() {
        let state = PlayerState::new(1.0)
            .reduce(Action::Play(track("a")))
            .reduce(Action::Halt);

        assert_eq!(state.playback.status(), Status::Paused);
        assert_eq!(state.playback.current_track.unwrap().id, "a");
    }
}
