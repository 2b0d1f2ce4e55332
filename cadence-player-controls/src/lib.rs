use error::Error;
use library::Library;
use queue::Queue;
use store::PlaybackState;
use tokio::sync::watch;

pub mod clock;
pub mod config;
pub mod controls;
pub mod error;
pub mod library;
pub mod notification;
pub mod player;
pub mod primitive;
pub mod queue;
#[cfg(feature = "rodio")]
pub mod sink;
pub mod store;
pub mod synchronizer;
pub mod time;
mod timer;

pub use store::Status;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type PlaybackReceiver = watch::Receiver<PlaybackState>;
pub type QueueReceiver = watch::Receiver<Queue>;
pub type LibraryReceiver = watch::Receiver<Library>;
