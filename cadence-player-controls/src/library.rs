use std::collections::HashSet;

use cadence_player_models::{Playlist, Track};

pub const DEFAULT_RECENT_LIMIT: usize = 20;

/// Per-user collections that live next to the player: liked songs,
/// recently played history and playlists.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Library {
    liked: Vec<Track>,
    recently_played: Vec<Track>,
    playlists: Vec<Playlist>,
    recent_limit: usize,
}

impl Default for Library {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

impl Library {
    pub fn new(recent_limit: usize) -> Self {
        Self {
            liked: Default::default(),
            recently_played: Default::default(),
            playlists: Default::default(),
            recent_limit,
        }
    }

    pub fn liked(&self) -> &[Track] {
        &self.liked
    }

    pub fn is_liked(&self, track_id: &str) -> bool {
        self.liked.iter().any(|t| t.id == track_id)
    }

    /// Returns whether the track is liked afterwards.
    pub fn toggle_like(&mut self, track: Track) -> bool {
        if self.is_liked(&track.id) {
            self.liked.retain(|t| t.id != track.id);
            false
        } else {
            self.liked.push(track);
            true
        }
    }

    pub fn recently_played(&self) -> &[Track] {
        &self.recently_played
    }

    /// Most recent first, no duplicates.
    pub fn record_played(&mut self, track: Track) {
        self.recently_played.retain(|t| t.id != track.id);
        self.recently_played.insert(0, track);
        self.recently_played.truncate(self.recent_limit);
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn playlist(&self, id: &str) -> Option<&Playlist> {
        self.playlists.iter().find(|p| p.id == id)
    }

    pub fn create_playlist(&mut self, name: String, description: String) -> &Playlist {
        let id = loop {
            let id = format!("{:016x}", rand::random::<u64>());
            if self.playlist(&id).is_none() {
                break id;
            }
        };

        self.playlists.push(Playlist::new(id, name, description));
        &self.playlists[self.playlists.len() - 1]
    }

    /// Replaces the playlist with the same id.
    pub fn update_playlist(&mut self, playlist: Playlist) -> bool {
        match self.playlist_mut(&playlist.id) {
            Some(existing) => {
                *existing = playlist;
                true
            }
            None => false,
        }
    }

    pub fn delete_playlist(&mut self, id: &str) -> bool {
        let before = self.playlists.len();
        self.playlists.retain(|p| p.id != id);
        self.playlists.len() != before
    }

    pub fn add_to_playlist(&mut self, id: &str, track: Track) -> bool {
        match self.playlist_mut(id) {
            Some(playlist) if !playlist.contains(&track.id) => {
                playlist.tracks.push(track);
                true
            }
            _ => false,
        }
    }

    pub fn remove_from_playlist(&mut self, id: &str, track_id: &str) -> bool {
        let Some(playlist) = self.playlist_mut(id) else {
            return false;
        };

        let before = playlist.tracks.len();
        playlist.tracks.retain(|t| t.id != track_id);
        playlist.tracks.len() != before
    }

    /// Moves the track at `from` to `to`.
    pub fn reorder_playlist(&mut self, id: &str, from: usize, to: usize) -> bool {
        let Some(playlist) = self.playlist_mut(id) else {
            return false;
        };

        let len = playlist.tracks.len();
        if from >= len || to >= len {
            return false;
        }

        let track = playlist.tracks.remove(from);
        playlist.tracks.insert(to, track);
        true
    }

    fn playlist_mut(&mut self, id: &str) -> Option<&mut Playlist> {
        self.playlists.iter_mut().find(|p| p.id == id)
    }
}

pub fn genre_bucket(catalog: &[Track], genre: &str) -> Vec<Track> {
    catalog
        .iter()
        .filter(|t| t.genre.eq_ignore_ascii_case(genre))
        .cloned()
        .collect()
}

/// Case-insensitive match on title, artist or album.
pub fn search(catalog: &[Track], query: &str) -> Vec<Track> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    catalog
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&query)
                || t.artist.to_lowercase().contains(&query)
                || t.album.to_lowercase().contains(&query)
        })
        .cloned()
        .collect()
}

/// Drops entries whose title and artist already appeared earlier.
pub fn dedupe(catalog: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();

    catalog
        .into_iter()
        .filter(|t| seen.insert((t.title.clone(), t.artist.clone())))
        .collect()
}

/// Distinct genres in catalog order.
pub fn genres(catalog: &[Track]) -> Vec<String> {
    let mut seen = HashSet::new();

    catalog
        .iter()
        .filter(|t| !t.genre.is_empty())
        .filter(|t| seen.insert(t.genre.to_lowercase()))
        .map(|t| t.genre.clone())
        .collect()
}
