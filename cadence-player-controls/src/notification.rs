use crate::Result;
use tokio::sync::broadcast::{self, Receiver, Sender};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    Error(String),
    Warning(String),
    Success(String),
    Info(String),
}

#[derive(Debug)]
pub struct NotificationBroadcast {
    tx: Sender<Notification>,
    rx: Receiver<Notification>,
}

impl NotificationBroadcast {
    pub fn new() -> Self {
        let (tx, rx) = broadcast::channel(20);
        Self { tx, rx }
    }

    pub fn send(&self, notification: Notification) -> Result<()> {
        self.tx.send(notification)?;
        Ok(())
    }

    pub fn subscribe(&self) -> Receiver<Notification> {
        self.rx.resubscribe()
    }

    /// Fire and forget. A message nobody listens to is dropped.
    pub fn send_message(&self, message: Notification) {
        if self.tx.send(message).is_err() {
            debug!("notification dropped, no subscribers");
        }
    }

    pub fn send_error(&self, message: String) {
        self.send_message(Notification::Error(message));
    }

    pub fn send_warning(&self, message: String) {
        self.send_message(Notification::Warning(message));
    }

    pub fn send_success(&self, message: String) {
        self.send_message(Notification::Success(message));
    }

    pub fn send_info(&self, message: String) {
        self.send_message(Notification::Info(message));
    }
}

impl Default for NotificationBroadcast {
    fn default() -> Self {
        Self::new()
    }
}
