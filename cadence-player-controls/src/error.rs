use crate::notification::Notification;
use snafu::prelude::*;

#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("Unable to broadcast notification"))]
    Notification,
    #[snafu(display("Player is no longer running"))]
    PlayerGone,
    #[snafu(display("{message}"))]
    StreamError { message: String },
    #[snafu(display("Unable to read source {locator}: {message}"))]
    SourceUnavailable { locator: String, message: String },
    #[snafu(display("Unable to decode {locator}"))]
    Decode { locator: String },
}

impl From<tokio::sync::broadcast::error::SendError<Notification>> for Error {
    fn from(_value: tokio::sync::broadcast::error::SendError<Notification>) -> Self {
        Self::Notification
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for Error {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        Error::PlayerGone
    }
}

#[cfg(feature = "rodio")]
impl From<rodio::StreamError> for Error {
    fn from(value: rodio::StreamError) -> Self {
        Self::StreamError {
            message: value.to_string(),
        }
    }
}
