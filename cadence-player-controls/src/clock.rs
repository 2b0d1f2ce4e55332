use std::time::Duration;

use tracing::debug;

use crate::{
    primitive::{EventSender, Generation, Load, PrimitiveEventKind, RenderingPrimitive},
    timer::Timer,
};

#[derive(Debug)]
struct ClockSource {
    generation: Generation,
    duration: Duration,
    ended: bool,
}

/// Headless output. Nothing is decoded, a wall clock stands in for the
/// audio device and every source lasts as long as its catalog entry says.
#[derive(Debug)]
pub struct ClockPrimitive {
    events: EventSender,
    timer: Timer,
    source: Option<ClockSource>,
}

impl ClockPrimitive {
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            timer: Timer::new(),
            source: None,
        }
    }

    pub fn position(&self) -> Duration {
        match &self.source {
            Some(source) => self.timer.elapsed().min(source.duration),
            None => Duration::ZERO,
        }
    }
}

impl RenderingPrimitive for ClockPrimitive {
    fn load_source(&mut self, load: Load) {
        self.timer.clear();

        if load.locator.trim().is_empty() {
            self.source = None;
            self.events.emit(
                load.generation,
                PrimitiveEventKind::LoadFailed("empty source locator".to_string()),
            );
            return;
        }

        debug!(locator = %load.locator, "clock source ready");
        self.source = Some(ClockSource {
            generation: load.generation,
            duration: load.duration_hint,
            ended: false,
        });
        self.events.emit(
            load.generation,
            PrimitiveEventKind::MetadataReady(load.duration_hint),
        );
    }

    fn start(&mut self) {
        if self.source.as_ref().is_some_and(|s| !s.ended) {
            self.timer.start();
        }
    }

    fn stop(&mut self) {
        self.timer.pause();
    }

    fn seek_to(&mut self, position: Duration) {
        if let Some(source) = self.source.as_mut() {
            source.ended = false;
            self.timer.set_time(position.min(source.duration));
        }
    }

    // Nothing is rendered, so there is nothing to attenuate.
    fn set_volume(&mut self, _volume: f32) {}

    fn tick(&mut self) {
        let Some(source) = self.source.as_mut() else {
            return;
        };
        if !self.timer.is_running() {
            return;
        }

        let elapsed = self.timer.elapsed();
        if !source.duration.is_zero() && elapsed >= source.duration {
            self.timer.pause();
            self.timer.set_time(source.duration);
            source.ended = true;
            self.events.emit(
                source.generation,
                PrimitiveEventKind::TimeAdvanced(source.duration),
            );
            self.events
                .emit(source.generation, PrimitiveEventKind::TrackEnded);
            return;
        }

        self.events
            .emit(source.generation, PrimitiveEventKind::TimeAdvanced(elapsed));
    }
}
