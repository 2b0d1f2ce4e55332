use cadence_player_models::Track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Ordered tracks with a cursor. The queue is a ring: stepping past either
/// end wraps around.
#[derive(Default, Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Queue {
    tracks: Vec<Track>,
    cursor: usize,
}

impl Queue {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_tracks(tracks: Vec<Track>) -> Self {
        Self { tracks, cursor: 0 }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// `None` when the queue is empty, the cursor carries no meaning then.
    pub fn cursor(&self) -> Option<usize> {
        if self.tracks.is_empty() {
            None
        } else {
            Some(self.cursor)
        }
    }

    pub fn current(&self) -> Option<&Track> {
        self.tracks.get(self.cursor)
    }

    pub fn position_of(&self, track: &Track) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == track.id)
    }

    pub(crate) fn select(&mut self, index: usize) -> Option<&Track> {
        if index >= self.tracks.len() {
            return None;
        }

        self.cursor = index;
        self.tracks.get(index)
    }

    pub(crate) fn step(&mut self, direction: Direction) -> Option<&Track> {
        let len = self.tracks.len();
        if len == 0 {
            return None;
        }

        self.cursor = match direction {
            Direction::Next => (self.cursor + 1) % len,
            Direction::Previous => (self.cursor + len - 1) % len,
        };

        self.tracks.get(self.cursor)
    }

    pub(crate) fn push(&mut self, track: Track) {
        if self.tracks.is_empty() {
            self.cursor = 0;
        }
        self.tracks.push(track);
    }
}
