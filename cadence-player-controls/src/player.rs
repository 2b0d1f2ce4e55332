use std::{sync::Arc, time::Duration};

use cadence_player_models::Track;
use tokio::{
    select,
    sync::{
        mpsc::{self, UnboundedReceiver},
        watch,
    },
    time::MissedTickBehavior,
};
use tracing::{debug, instrument};

use crate::{
    LibraryReceiver, PlaybackReceiver, QueueReceiver, Result,
    config::PlayerConfig,
    controls::{ControlCommand, Controls},
    library::Library,
    notification::NotificationBroadcast,
    primitive::{EventReceiver, PrimitiveEvent, RenderingPrimitive},
    queue::{Direction, Queue},
    store::{Action, PlaybackState, PlayerState, Status},
    synchronizer::Synchronizer,
};

enum Wake {
    Tick,
    Command(ControlCommand),
    Event(PrimitiveEvent),
}

/// The playback context. Owns the store, the synchronizer and the library,
/// and is the only writer to any of them.
pub struct Player<P> {
    state: PlayerState,
    library: Library,
    synchronizer: Synchronizer<P>,
    controls: Controls,
    controls_rx: UnboundedReceiver<ControlCommand>,
    events_rx: EventReceiver,
    playback_tx: watch::Sender<PlaybackState>,
    queue_tx: watch::Sender<Queue>,
    library_tx: watch::Sender<Library>,
    broadcast: Arc<NotificationBroadcast>,
    tick_interval: Duration,
}

impl<P: RenderingPrimitive> Player<P> {
    pub fn new(
        config: &PlayerConfig,
        primitive: P,
        events: EventReceiver,
        broadcast: Arc<NotificationBroadcast>,
    ) -> Self {
        let state = PlayerState::new(config.volume);
        let library = Library::new(config.recent_limit);
        let synchronizer = Synchronizer::new(
            primitive,
            broadcast.clone(),
            state.playback.volume,
            config.drift_tolerance,
            config.max_seek_reissues,
        );

        let (tx, controls_rx) = mpsc::unbounded_channel();
        let (playback_tx, _) = watch::channel(state.playback.clone());
        let (queue_tx, _) = watch::channel(state.queue.clone());
        let (library_tx, _) = watch::channel(library.clone());

        Self {
            state,
            library,
            synchronizer,
            controls: Controls::new(tx),
            controls_rx,
            events_rx: events,
            playback_tx,
            queue_tx,
            library_tx,
            broadcast,
            tick_interval: config.tick_interval,
        }
    }

    pub fn controls(&self) -> Controls {
        self.controls.clone()
    }

    pub fn playback(&self) -> PlaybackReceiver {
        self.playback_tx.subscribe()
    }

    pub fn queue(&self) -> QueueReceiver {
        self.queue_tx.subscribe()
    }

    pub fn library(&self) -> LibraryReceiver {
        self.library_tx.subscribe()
    }

    pub fn broadcast(&self) -> Arc<NotificationBroadcast> {
        self.broadcast.clone()
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn synchronizer(&self) -> &Synchronizer<P> {
        &self.synchronizer
    }

    /// Runs one store transition and lets the synchronizer catch up.
    pub fn dispatch(&mut self, action: Action) {
        let mirror_seek = matches!(action, Action::Seek(_));
        let next = self.state.reduce(action);

        self.synchronizer.reconcile(&next.playback);
        if mirror_seek {
            self.synchronizer.mirror_seek(&next.playback);
        }

        if next.playback != self.state.playback {
            self.playback_tx.send_replace(next.playback.clone());
        }
        if next.queue != self.state.queue {
            self.queue_tx.send_replace(next.queue.clone());
        }
        self.state = next;
    }

    pub fn handle_event(&mut self, event: PrimitiveEvent) {
        if let Some(action) = self.synchronizer.handle_event(event) {
            self.dispatch(action);
        }
    }

    pub fn tick(&mut self) {
        self.synchronizer.tick();
    }

    /// Returns `true` when the player should shut down.
    #[instrument(skip(self))]
    pub fn handle_command(&mut self, command: ControlCommand) -> bool {
        match command {
            ControlCommand::SetQueue { tracks } => self.dispatch(Action::SetQueue(tracks)),
            ControlCommand::Play { track } => self.play(track),
            ControlCommand::PlayList { tracks, index } => {
                let Some(track) = tracks.get(index).or(tracks.first()).cloned() else {
                    debug!("ignoring empty track list");
                    return false;
                };

                self.dispatch(Action::SetQueue(tracks));
                self.play(track);
            }
            ControlCommand::Pause => self.dispatch(Action::Pause),
            ControlCommand::Resume => self.dispatch(Action::Resume),
            ControlCommand::PlayPause => match self.state.playback.status() {
                Status::Playing => self.dispatch(Action::Pause),
                Status::Paused => self.dispatch(Action::Resume),
                Status::Empty => {
                    if let Some(track) = self.state.queue.current().cloned() {
                        self.play(track);
                    }
                }
            },
            ControlCommand::Next => self.dispatch(Action::Advance(Direction::Next)),
            ControlCommand::Previous => self.dispatch(Action::Advance(Direction::Previous)),
            ControlCommand::SkipTo { index } => self.dispatch(Action::SkipTo(index)),
            ControlCommand::Enqueue { track } => self.dispatch(Action::Enqueue(track)),
            ControlCommand::Seek { seconds } => self.dispatch(Action::Seek(seconds)),
            ControlCommand::SetVolume { volume } => self.dispatch(Action::SetVolume(volume)),
            ControlCommand::BeginScrub => self.synchronizer.begin_scrub(),
            ControlCommand::EndScrub { seconds } => {
                self.synchronizer.end_scrub();
                self.dispatch(Action::Seek(seconds));
            }
            ControlCommand::ToggleLike { track } => {
                if self.library.toggle_like(track) {
                    self.broadcast
                        .send_success("Added to liked songs".to_string());
                } else {
                    self.broadcast
                        .send_success("Removed from liked songs".to_string());
                }
                self.publish_library();
            }
            ControlCommand::CreatePlaylist { name, description } => {
                let name = self.library.create_playlist(name, description).name.clone();
                self.broadcast.send_success(format!("Created {name}"));
                self.publish_library();
            }
            ControlCommand::UpdatePlaylist { playlist } => {
                if self.library.update_playlist(playlist) {
                    self.publish_library();
                }
            }
            ControlCommand::DeletePlaylist { id } => {
                if self.library.delete_playlist(&id) {
                    self.publish_library();
                }
            }
            ControlCommand::AddToPlaylist { id, track } => {
                let Some(playlist) = self.library.playlist(&id) else {
                    return false;
                };

                if playlist.contains(&track.id) {
                    self.broadcast
                        .send_info(format!("{} is already in {}", track.title, playlist.name));
                } else if self.library.add_to_playlist(&id, track) {
                    self.publish_library();
                }
            }
            ControlCommand::RemoveFromPlaylist { id, track_id } => {
                if self.library.remove_from_playlist(&id, &track_id) {
                    self.publish_library();
                }
            }
            ControlCommand::ReorderPlaylist { id, from, to } => {
                if self.library.reorder_playlist(&id, from, to) {
                    self.publish_library();
                }
            }
            ControlCommand::Quit => return true,
        }

        false
    }

    fn play(&mut self, track: Track) {
        self.library.record_played(track.clone());
        self.publish_library();
        self.dispatch(Action::Play(track));
    }

    fn publish_library(&self) {
        self.library_tx.send_replace(self.library.clone());
    }

    #[instrument(skip(self))]
    pub async fn player_loop(&mut self) -> Result<()> {
        let mut interval = tokio::time::interval(self.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let wake = select! {
                _ = interval.tick() => Wake::Tick,
                Some(command) = self.controls_rx.recv() => Wake::Command(command),
                Some(event) = self.events_rx.recv() => Wake::Event(event),
            };

            match wake {
                Wake::Tick => self.tick(),
                Wake::Command(command) => {
                    if self.handle_command(command) {
                        break;
                    }
                }
                Wake::Event(event) => self.handle_event(event),
            }
        }

        debug!("player loop finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        clock::ClockPrimitive,
        notification::Notification,
        primitive::{
            Generation, PrimitiveEventKind, event_channel,
            testing::{Command, RecordingPrimitive},
        },
    };

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

    fn player() -> (Player<RecordingPrimitive>, RecordingPrimitive) {
        let primitive = RecordingPrimitive::default();
        let (_, events) = event_channel();
        let player = Player::new(
            &PlayerConfig::default(),
            primitive.clone(),
            events,
            Arc::new(NotificationBroadcast::new()),
        );
        primitive.clear();
        (player, primitive)
    }

    fn event(generation: Generation, kind: PrimitiveEventKind) -> PrimitiveEvent {
        PrimitiveEvent { generation, kind }
    }

    fn current_id<P: RenderingPrimitive>(player: &Player<P>) -> Option<String> {
        player
            .state()
            .playback
            .current_track
            .as_ref()
            .map(|t| t.id.clone())
    }

    #[test]
    fn track_end_moves_to_next_and_keeps_playing() {
        let (mut player, primitive) = player();
        player.handle_command(ControlCommand::SetQueue {
            tracks: vec![track("a"), track("b"), track("c")],
        });
        player.handle_command(ControlCommand::Play { track: track("a") });

        let generation = player.synchronizer().generation();
        player.handle_event(event(generation, PrimitiveEventKind::TrackEnded));

        assert_eq!(current_id(&player).as_deref(), Some("b"));
        assert_eq!(player.state().queue.cursor(), Some(1));
        assert!(player.state().playback.is_playing);
        assert_eq!(primitive.loads().len(), 2);
        assert_eq!(
            primitive.loads()[1].locator,
            "https://cdn.example.com/b.mp3"
        );
    }

    #[test]
    fn single_track_queue_loops() {
        let (mut player, primitive) = player();
        player.handle_command(ControlCommand::PlayList {
            tracks: vec![track("a")],
            index: 0,
        });
        primitive.clear();

        let generation = player.synchronizer().generation();
        player.handle_event(event(generation, PrimitiveEventKind::TrackEnded));

        assert_eq!(current_id(&player).as_deref(), Some("a"));
        assert_eq!(player.state().queue.cursor(), Some(0));
        assert_eq!(
            primitive.commands(),
            vec![Command::SeekTo(Duration::ZERO), Command::Start]
        );
    }

    #[test]
    fn queued_track_end_does_not_undo_a_seek_back() {
        let (mut player, primitive) = player();
        player.handle_command(ControlCommand::SetQueue {
            tracks: vec![track("a"), track("b")],
        });
        player.handle_command(ControlCommand::Play { track: track("a") });
        let generation = player.synchronizer().generation();

        player.handle_command(ControlCommand::Seek { seconds: 10.0 });
        player.handle_event(event(generation, PrimitiveEventKind::TrackEnded));

        assert_eq!(current_id(&player).as_deref(), Some("a"));
        assert_eq!(player.state().playback.current_time, Duration::from_secs(10));
        assert_eq!(primitive.loads().len(), 1);
    }

    #[test]
    fn queued_track_end_does_not_undo_a_replay() {
        let (mut player, _) = player();
        player.handle_command(ControlCommand::PlayList {
            tracks: vec![track("a"), track("b")],
            index: 0,
        });
        let generation = player.synchronizer().generation();

        player.handle_command(ControlCommand::Play { track: track("a") });
        player.handle_event(event(generation, PrimitiveEventKind::TrackEnded));

        assert_eq!(current_id(&player).as_deref(), Some("a"));
        assert_eq!(player.state().queue.cursor(), Some(0));
    }

    #[test]
    fn late_metadata_from_skipped_track_is_ignored() {
        let (mut player, _) = player();
        player.handle_command(ControlCommand::Play { track: track("z") });
        let stale = player.synchronizer().generation();

        player.handle_command(ControlCommand::Play { track: track("a") });
        let current = player.synchronizer().generation();

        player.handle_event(event(
            stale,
            PrimitiveEventKind::MetadataReady(Duration::from_secs(999)),
        ));
        assert_eq!(player.state().playback.duration, Duration::from_secs(180));

        player.handle_event(event(
            current,
            PrimitiveEventKind::MetadataReady(Duration::from_secs(184)),
        ));
        assert_eq!(player.state().playback.duration, Duration::from_secs(184));
    }

    #[test]
    fn scrub_release_seeks_exactly_once() {
        let (mut player, primitive) = player();
        player.handle_command(ControlCommand::Play { track: track("a") });
        let generation = player.synchronizer().generation();
        primitive.clear();

        player.handle_command(ControlCommand::BeginScrub);
        for seconds in [5, 6, 7] {
            player.handle_event(event(
                generation,
                PrimitiveEventKind::TimeAdvanced(Duration::from_secs(seconds)),
            ));
        }
        assert_eq!(player.state().playback.current_time, Duration::ZERO);

        player.handle_command(ControlCommand::EndScrub { seconds: 42.0 });

        assert_eq!(player.state().playback.current_time, Duration::from_secs(42));
        assert_eq!(primitive.seeks(), vec![Duration::from_secs(42)]);
        assert!(!player.synchronizer().is_scrubbing());
    }

    #[test]
    fn next_on_empty_queue_changes_nothing() {
        let (mut player, primitive) = player();
        let before = player.state().clone();

        player.handle_command(ControlCommand::Next);
        player.handle_command(ControlCommand::Previous);

        assert_eq!(player.state(), &before);
        assert!(primitive.commands().is_empty());
    }

    #[test]
    fn play_list_starts_at_index_and_records_history() {
        let (mut player, _) = player();
        let library = player.library();

        player.handle_command(ControlCommand::PlayList {
            tracks: vec![track("a"), track("b"), track("c")],
            index: 2,
        });

        assert_eq!(current_id(&player).as_deref(), Some("c"));
        assert_eq!(player.state().queue.cursor(), Some(2));
        assert_eq!(library.borrow().recently_played()[0].id, "c");
    }

    #[test]
    fn play_list_with_bad_index_starts_at_first() {
        let (mut player, _) = player();

        player.handle_command(ControlCommand::PlayList {
            tracks: vec![track("a"), track("b")],
            index: 7,
        });
        assert_eq!(current_id(&player).as_deref(), Some("a"));

        player.handle_command(ControlCommand::PlayList {
            tracks: vec![],
            index: 0,
        });
        assert_eq!(player.state().queue.len(), 2);
    }

    #[test]
    fn play_pause_toggles_and_starts_queue() {
        let (mut player, _) = player();
        player.handle_command(ControlCommand::SetQueue {
            tracks: vec![track("a"), track("b")],
        });

        player.handle_command(ControlCommand::PlayPause);
        assert_eq!(player.state().playback.status(), Status::Playing);
        assert_eq!(current_id(&player).as_deref(), Some("a"));

        player.handle_command(ControlCommand::PlayPause);
        assert_eq!(player.state().playback.status(), Status::Paused);
    }

    #[test]
    fn watchers_see_every_state_change() {
        let (mut player, _) = player();
        let mut playback = player.playback();
        let mut queue = player.queue();

        player.handle_command(ControlCommand::SetQueue {
            tracks: vec![track("a")],
        });
        assert!(queue.has_changed().unwrap());
        assert!(!playback.has_changed().unwrap());
        assert_eq!(queue.borrow_and_update().len(), 1);

        player.handle_command(ControlCommand::SetVolume { volume: 2.0 });
        assert!(playback.has_changed().unwrap());
        assert_eq!(playback.borrow_and_update().volume, 1.0);
    }

    #[tokio::test]
    async fn toggling_like_notifies() {
        let (mut player, _) = player();
        let mut notifications = player.broadcast().subscribe();

        player.handle_command(ControlCommand::ToggleLike { track: track("a") });

        assert!(player.library().borrow().is_liked("a"));
        assert_eq!(
            notifications.recv().await.unwrap(),
            Notification::Success("Added to liked songs".to_string())
        );
    }

    #[test]
    fn playlist_commands_reach_library() {
        let (mut player, _) = player();
        let library = player.library();

        player.handle_command(ControlCommand::CreatePlaylist {
            name: "Focus".to_string(),
            description: String::new(),
        });
        let id = library.borrow().playlists()[0].id.clone();

        player.handle_command(ControlCommand::AddToPlaylist {
            id: id.clone(),
            track: track("a"),
        });
        player.handle_command(ControlCommand::AddToPlaylist {
            id: id.clone(),
            track: track("b"),
        });
        player.handle_command(ControlCommand::ReorderPlaylist {
            id: id.clone(),
            from: 1,
            to: 0,
        });
        assert_eq!(library.borrow().playlist(&id).unwrap().tracks[0].id, "b");

        player.handle_command(ControlCommand::RemoveFromPlaylist {
            id: id.clone(),
            track_id: "b".to_string(),
        });
        assert_eq!(library.borrow().playlist(&id).unwrap().tracks.len(), 1);

        player.handle_command(ControlCommand::DeletePlaylist { id });
        assert!(library.borrow().playlists().is_empty());
    }

    #[tokio::test]
    async fn adding_a_track_twice_is_reported() {
        let (mut player, _) = player();
        let mut notifications = player.broadcast().subscribe();
        player.handle_command(ControlCommand::CreatePlaylist {
            name: "Focus".to_string(),
            description: String::new(),
        });
        let library = player.library();
        let id = library.borrow().playlists()[0].id.clone();
        notifications.recv().await.unwrap();

        for _ in 0..2 {
            player.handle_command(ControlCommand::AddToPlaylist {
                id: id.clone(),
                track: track("a"),
            });
        }

        assert_eq!(library.borrow().playlist(&id).unwrap().tracks.len(), 1);
        assert_eq!(
            notifications.recv().await.unwrap(),
            Notification::Info("A is already in Focus".to_string())
        );
    }

    #[tokio::test]
    async fn loop_runs_until_quit() {
        let (tx, events) = event_channel();
        let mut player = Player::new(
            &PlayerConfig {
                tick_interval: Duration::from_millis(5),
                ..Default::default()
            },
            ClockPrimitive::new(tx),
            events,
            Arc::new(NotificationBroadcast::new()),
        );
        let controls = player.controls();
        let mut playback = player.playback();

        controls.play(track("a")).unwrap();
        controls.quit().unwrap();
        player.player_loop().await.unwrap();

        assert!(playback.has_changed().unwrap());
        assert_eq!(
            playback.borrow_and_update().current_track.as_ref().unwrap().id,
            "a"
        );
    }
}
