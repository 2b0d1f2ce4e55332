use std::time::Duration;

use chrono::{DateTime, Utc};

#[derive(Default, Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub album: String,
    /// Provisional length, replaced once the output reports the real one.
    pub duration_seconds: u32,
    pub source: String,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub release_year: Option<u32>,
}

impl Track {
    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_seconds as u64)
    }

    /// Two values refer to the same playable item when both the id and the
    /// source locator agree.
    pub fn same_source(&self, other: &Track) -> bool {
        self.id == other.id && self.source == other.source
    }
}

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cover: Option<String>,
    pub tracks: Vec<Track>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub is_public: bool,
}

impl Playlist {
    pub fn new(id: String, name: String, description: String) -> Self {
        Self {
            id,
            name,
            description,
            cover: None,
            tracks: Default::default(),
            created_by: None,
            created_at: Utc::now(),
            is_public: false,
        }
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == track_id)
    }
}
