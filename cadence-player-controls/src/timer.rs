use std::time::{Duration, Instant};

/// Wall clock that can be paused and repositioned.
#[derive(Debug, Default)]
pub(crate) struct Timer {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Timer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.start_time = None;
        self.elapsed = Duration::ZERO;
    }

    pub(crate) fn is_running(&self) -> bool {
        self.start_time.is_some()
    }

    pub(crate) fn start(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    pub(crate) fn pause(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    pub(crate) fn elapsed(&self) -> Duration {
        match self.start_time {
            Some(start) => self.elapsed + start.elapsed(),
            None => self.elapsed,
        }
    }

    /// Moves the clock to `time`, keeping it running if it was.
    pub(crate) fn set_time(&mut self, time: Duration) {
        self.elapsed = time;

        if self.start_time.is_some() {
            self.start_time = Some(Instant::now());
        }
    }
}
