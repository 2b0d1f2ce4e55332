use cadence_player_models::{Playlist, Track};
use tokio::sync::mpsc::UnboundedSender;

use crate::Result;

#[derive(Debug)]
pub enum ControlCommand {
    SetQueue { tracks: Vec<Track> },
    Play { track: Track },
    PlayList { tracks: Vec<Track>, index: usize },
    Pause,
    Resume,
    PlayPause,
    Next,
    Previous,
    SkipTo { index: usize },
    Enqueue { track: Track },
    Seek { seconds: f64 },
    SetVolume { volume: f32 },
    BeginScrub,
    EndScrub { seconds: f64 },
    ToggleLike { track: Track },
    CreatePlaylist { name: String, description: String },
    UpdatePlaylist { playlist: Playlist },
    DeletePlaylist { id: String },
    AddToPlaylist { id: String, track: Track },
    RemoveFromPlaylist { id: String, track_id: String },
    ReorderPlaylist { id: String, from: usize, to: usize },
    Quit,
}

/// Cloneable handle the view layer uses to drive the player.
#[derive(Debug, Clone)]
pub struct Controls {
    tx: UnboundedSender<ControlCommand>,
}

impl Controls {
    pub fn new(tx: UnboundedSender<ControlCommand>) -> Self {
        Self { tx }
    }

    pub fn send(&self, command: ControlCommand) -> Result<()> {
        self.tx.send(command)?;
        Ok(())
    }

    pub fn set_queue(&self, tracks: Vec<Track>) -> Result<()> {
        self.send(ControlCommand::SetQueue { tracks })
    }

    pub fn play(&self, track: Track) -> Result<()> {
        self.send(ControlCommand::Play { track })
    }

    /// Replaces the queue with `tracks` and starts the one at `index`.
    pub fn play_list(&self, tracks: Vec<Track>, index: usize) -> Result<()> {
        self.send(ControlCommand::PlayList { tracks, index })
    }

    pub fn pause(&self) -> Result<()> {
        self.send(ControlCommand::Pause)
    }

    pub fn resume(&self) -> Result<()> {
        self.send(ControlCommand::Resume)
    }

    pub fn play_pause(&self) -> Result<()> {
        self.send(ControlCommand::PlayPause)
    }

    pub fn next(&self) -> Result<()> {
        self.send(ControlCommand::Next)
    }

    pub fn previous(&self) -> Result<()> {
        self.send(ControlCommand::Previous)
    }

    pub fn skip_to(&self, index: usize) -> Result<()> {
        self.send(ControlCommand::SkipTo { index })
    }

    pub fn enqueue(&self, track: Track) -> Result<()> {
        self.send(ControlCommand::Enqueue { track })
    }

    pub fn seek(&self, seconds: f64) -> Result<()> {
        self.send(ControlCommand::Seek { seconds })
    }

    pub fn set_volume(&self, volume: f32) -> Result<()> {
        self.send(ControlCommand::SetVolume { volume })
    }

    pub fn begin_scrub(&self) -> Result<()> {
        self.send(ControlCommand::BeginScrub)
    }

    pub fn end_scrub(&self, seconds: f64) -> Result<()> {
        self.send(ControlCommand::EndScrub { seconds })
    }

    pub fn toggle_like(&self, track: Track) -> Result<()> {
        self.send(ControlCommand::ToggleLike { track })
    }

    pub fn create_playlist(&self, name: &str, description: &str) -> Result<()> {
        self.send(ControlCommand::CreatePlaylist {
            name: name.to_string(),
            description: description.to_string(),
        })
    }

    pub fn update_playlist(&self, playlist: Playlist) -> Result<()> {
        self.send(ControlCommand::UpdatePlaylist { playlist })
    }

    pub fn delete_playlist(&self, id: &str) -> Result<()> {
        self.send(ControlCommand::DeletePlaylist { id: id.to_string() })
    }

    pub fn add_to_playlist(&self, id: &str, track: Track) -> Result<()> {
        self.send(ControlCommand::AddToPlaylist {
            id: id.to_string(),
            track,
        })
    }

    pub fn remove_from_playlist(&self, id: &str, track_id: &str) -> Result<()> {
        self.send(ControlCommand::RemoveFromPlaylist {
            id: id.to_string(),
            track_id: track_id.to_string(),
        })
    }

    pub fn reorder_playlist(&self, id: &str, from: usize, to: usize) -> Result<()> {
        self.send(ControlCommand::ReorderPlaylist {
            id: id.to_string(),
            from,
            to,
        })
    }

    pub fn quit(&self) -> Result<()> {
        self.send(ControlCommand::Quit)
    }
}
