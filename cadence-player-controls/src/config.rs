use std::time::Duration;

use crate::library::DEFAULT_RECENT_LIMIT;

#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct PlayerConfig {
    pub volume: f32,
    /// How far the output clock may stray from a requested seek before the
    /// seek is sent again.
    pub drift_tolerance: Duration,
    pub max_seek_reissues: u32,
    pub tick_interval: Duration,
    pub recent_limit: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 0.7,
            drift_tolerance: Duration::from_secs(1),
            max_seek_reissues: 3,
            tick_interval: Duration::from_millis(250),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}
