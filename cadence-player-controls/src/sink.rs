use std::io::Cursor;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use rodio::{Source, decoder::DecoderBuilder, queue::queue};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    Result,
    error::Error,
    primitive::{EventSender, Generation, Load, PrimitiveEventKind, RenderingPrimitive},
};

/// Audio device output through rodio. Local paths and `file://` locators
/// are read from disk, `http(s)://` locators are downloaded first.
pub struct RodioPrimitive {
    stream_handle: Option<rodio::OutputStream>,
    sink: Option<rodio::Sink>,
    current_load: Option<JoinHandle<()>>,
    current: Option<Load>,
    events: EventSender,
    generation: Generation,
    ready: Arc<AtomicBool>,
    ended: Arc<AtomicBool>,
    volume: f32,
}

impl RodioPrimitive {
    pub fn new(events: EventSender) -> Self {
        Self {
            stream_handle: None,
            sink: None,
            current_load: None,
            current: None,
            events,
            generation: Generation::default(),
            ready: Default::default(),
            ended: Default::default(),
            volume: 1.0,
        }
    }

    fn clear(&mut self) {
        if let Some(handle) = self.current_load.take() {
            handle.abort();
        }

        self.sink = None;
    }

    fn open_sink(&mut self) -> Result<Arc<rodio::queue::SourcesQueueInput>> {
        if self.stream_handle.is_none() {
            let mut stream_handle = rodio::OutputStreamBuilder::from_default_device()?.open_stream()?;
            stream_handle.log_on_drop(false);
            self.stream_handle = Some(stream_handle);
        }

        let Some(stream_handle) = self.stream_handle.as_ref() else {
            return Err(Error::StreamError {
                message: "no output stream".to_string(),
            });
        };

        let (sender, receiver) = queue(true);
        let sink = rodio::Sink::connect_new(stream_handle.mixer());
        sink.pause();
        sink.append(receiver);
        set_volume(&sink, self.volume);
        self.sink = Some(sink);

        Ok(sender)
    }

    /// Decodes `load` into a fresh sink, starting `start_at` into the source.
    fn begin(&mut self, load: Load, start_at: Duration, playing: bool) {
        self.clear();
        self.generation = load.generation;
        self.current = Some(load.clone());
        self.ready = Default::default();
        self.ended = Default::default();

        let sender = match self.open_sink() {
            Ok(sender) => sender,
            Err(err) => {
                self.events
                    .emit(load.generation, PrimitiveEventKind::LoadFailed(err.to_string()));
                return;
            }
        };

        if playing && let Some(sink) = &self.sink {
            sink.play();
        }

        let events = self.events.clone();
        let ready = self.ready.clone();
        let ended = self.ended.clone();

        let handle = tokio::spawn(async move {
            let generation = load.generation;

            let bytes = match fetch(&load.locator).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    events.emit(generation, PrimitiveEventKind::LoadFailed(err.to_string()));
                    return;
                }
            };

            let Ok(mut source) = DecoderBuilder::new()
                .with_data(Cursor::new(bytes))
                .with_seekable(true)
                .build()
            else {
                let err = Error::Decode {
                    locator: load.locator,
                };
                events.emit(generation, PrimitiveEventKind::LoadFailed(err.to_string()));
                return;
            };

            if !start_at.is_zero()
                && let Err(err) = source.try_seek(start_at)
            {
                warn!(%err, "unable to start mid-source");
            }

            let duration = source.total_duration().unwrap_or(load.duration_hint);
            events.emit(generation, PrimitiveEventKind::MetadataReady(duration));

            let signal = sender.append_with_signal(source);
            ready.store(true, Ordering::Relaxed);

            tokio::task::spawn_blocking(move || {
                if signal.recv().is_ok() {
                    ended.store(true, Ordering::Relaxed);
                    events.emit(generation, PrimitiveEventKind::TrackEnded);
                }
            });
        });

        self.current_load = Some(handle);
    }
}

impl RenderingPrimitive for RodioPrimitive {
    fn load_source(&mut self, load: Load) {
        self.begin(load, Duration::ZERO, false);
    }

    fn start(&mut self) {
        if let Some(sink) = &self.sink {
            sink.play();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = &self.sink {
            sink.pause();
        }
    }

    fn seek_to(&mut self, position: Duration) {
        // A finished source has left the rodio queue and has to be decoded
        // again.
        if self.ended.load(Ordering::Relaxed)
            && let Some(load) = self.current.clone()
        {
            debug!(?position, "source finished, loading it again");
            let playing = self.sink.as_ref().is_some_and(|sink| !sink.is_paused());
            self.begin(load, position, playing);
            return;
        }

        if let Some(sink) = &self.sink
            && let Err(err) = sink.try_seek(position)
        {
            warn!(%err, "seek failed");
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(sink) = &self.sink {
            set_volume(sink, volume);
        }
    }

    fn tick(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };

        if !self.ready.load(Ordering::Relaxed)
            || self.ended.load(Ordering::Relaxed)
            || sink.is_paused()
        {
            return;
        }

        self.events
            .emit(self.generation, PrimitiveEventKind::TimeAdvanced(sink.get_pos()));
    }
}

fn set_volume(sink: &rodio::Sink, volume: f32) {
    let volume = volume.clamp(0.0, 1.0).powi(3);
    sink.set_volume(volume);
}

async fn fetch(locator: &str) -> Result<Vec<u8>> {
    let unavailable = |message: String| Error::SourceUnavailable {
        locator: locator.to_string(),
        message,
    };

    if locator.starts_with("http://") || locator.starts_with("https://") {
        debug!(%locator, "downloading");
        let response = reqwest::get(locator)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable(e.to_string()))?;
        let body = response
            .bytes()
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        return Ok(body.to_vec());
    }

    let path = locator.strip_prefix("file://").unwrap_or(locator);
    tokio::fs::read(path)
        .await
        .map_err(|e| unavailable(e.to_string()))
}
