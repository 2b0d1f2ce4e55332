//! The boundary to whatever actually renders audio.
//!
//! Commands go in through [`RenderingPrimitive`] and return immediately.
//! Results come back later as [`PrimitiveEvent`]s on an unbounded channel,
//! each tagged with the [`Generation`] of the load that produced it so that
//! events from an abandoned load can be recognised and dropped.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Load {
    pub generation: Generation,
    pub locator: String,
    /// Length advertised by the catalog. Outputs that cannot probe the
    /// source themselves may report this as the real length.
    pub duration_hint: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveEventKind {
    TimeAdvanced(Duration),
    MetadataReady(Duration),
    TrackEnded,
    LoadFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveEvent {
    pub generation: Generation,
    pub kind: PrimitiveEventKind,
}

pub type EventReceiver = UnboundedReceiver<PrimitiveEvent>;

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: UnboundedSender<PrimitiveEvent>,
}

impl EventSender {
    pub fn emit(&self, generation: Generation, kind: PrimitiveEventKind) {
        if self.tx.send(PrimitiveEvent { generation, kind }).is_err() {
            debug!("primitive event dropped, player has stopped");
        }
    }
}

pub fn event_channel() -> (EventSender, EventReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

/// An audio output that can hold one source at a time.
///
/// Implementations must answer every `load_source` with exactly one of
/// `MetadataReady` or `LoadFailed`, may follow with any number of
/// `TimeAdvanced`, and send `TrackEnded` when the source plays to its end.
pub trait RenderingPrimitive {
    fn load_source(&mut self, load: Load);
    fn start(&mut self);
    fn stop(&mut self);
    fn seek_to(&mut self, position: Duration);
    fn set_volume(&mut self, volume: f32);

    /// Called periodically from the player loop. Outputs without their own
    /// clock report position from here.
    fn tick(&mut self) {}
}
