use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use cadence_player_controls::{
    config::PlayerConfig, library, notification::NotificationBroadcast, player::Player,
    primitive::event_channel, time::format_duration,
};
use cadence_player_models::Track;
use clap::{Parser, Subcommand};
use rand::seq::SliceRandom;
use snafu::prelude::*;
use tracing::info;

use crate::console;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(short, long)]
    /// Log level
    verbosity: Option<tracing::Level>,

    #[clap(long, env = "CADENCE_VOLUME", default_value_t = 0.7)]
    /// Starting volume, between 0 and 1.
    volume: f32,

    #[clap(long, env = "CADENCE_DRIFT_TOLERANCE_MS", default_value_t = 1000)]
    /// How far playback may land from a requested seek before it is sent again.
    drift_tolerance_ms: u64,

    #[clap(long, env = "CADENCE_TICK_MS", default_value_t = 250)]
    /// Interval between position updates.
    tick_ms: u64,

    #[clap(long, env = "CADENCE_RECENT_LIMIT", default_value_t = library::DEFAULT_RECENT_LIMIT)]
    /// Number of tracks kept in the recently played list.
    recent_limit: usize,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue up tracks from one or more catalogs and start playing.
    Play {
        /// JSON files holding a list of tracks.
        #[clap(required = true)]
        catalogs: Vec<PathBuf>,

        #[clap(short, long)]
        /// Only queue tracks from this genre.
        genre: Option<String>,

        #[clap(short, long)]
        /// Only queue tracks whose title, artist or album matches.
        search: Option<String>,

        #[clap(long, default_value_t = false)]
        shuffle: bool,
    },
    /// Summarise what the catalogs contain.
    Inspect {
        #[clap(required = true)]
        catalogs: Vec<PathBuf>,
    },
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Unable to read {}: {source}", path.display()))]
    ReadCatalog {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("{} is not a track catalog: {source}", path.display()))]
    ParseCatalog {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[snafu(display("No tracks to play"))]
    NothingToPlay,
    #[snafu(display("{error}"))]
    PlayerError { error: String },
}

impl From<cadence_player_controls::error::Error> for Error {
    fn from(error: cadence_player_controls::error::Error) -> Self {
        Error::PlayerError {
            error: error.to_string(),
        }
    }
}

pub async fn run() -> Result<(), Error> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_target(false)
        .compact()
        .init();

    let config = PlayerConfig {
        volume: cli.volume,
        drift_tolerance: Duration::from_millis(cli.drift_tolerance_ms),
        tick_interval: Duration::from_millis(cli.tick_ms.max(1)),
        recent_limit: cli.recent_limit,
        ..Default::default()
    };

    match cli.command {
        Commands::Play {
            catalogs,
            genre,
            search,
            shuffle,
        } => {
            let catalog = load_catalogs(&catalogs).await?;
            let mut tracks = select_tracks(catalog, genre.as_deref(), search.as_deref());
            ensure!(!tracks.is_empty(), NothingToPlaySnafu);

            if shuffle {
                tracks.shuffle(&mut rand::rng());
            }

            play(config, tracks).await
        }
        Commands::Inspect { catalogs } => {
            let catalog = load_catalogs(&catalogs).await?;
            println!("{}", summary(&catalog));
            Ok(())
        }
    }
}

async fn play(config: PlayerConfig, tracks: Vec<Track>) -> Result<(), Error> {
    let (events_tx, events_rx) = event_channel();
    let broadcast = Arc::new(NotificationBroadcast::new());

    #[cfg(feature = "rodio")]
    let primitive = cadence_player_controls::sink::RodioPrimitive::new(events_tx);
    #[cfg(not(feature = "rodio"))]
    let primitive = cadence_player_controls::clock::ClockPrimitive::new(events_tx);

    let mut player = Player::new(&config, primitive, events_rx, broadcast.clone());
    let controls = player.controls();

    info!(tracks = tracks.len(), "starting playback");
    controls.play_list(tracks, 0)?;

    tokio::spawn(console::run(
        controls,
        player.playback(),
        player.queue(),
        broadcast.subscribe(),
    ));

    player.player_loop().await?;
    Ok(())
}

async fn load_catalogs(paths: &[PathBuf]) -> Result<Vec<Track>, Error> {
    let mut catalog = Vec::new();

    for path in paths {
        catalog.extend(load_catalog(path).await?);
    }

    Ok(library::dedupe(catalog))
}

async fn load_catalog(path: &Path) -> Result<Vec<Track>, Error> {
    let text = tokio::fs::read_to_string(path)
        .await
        .context(ReadCatalogSnafu { path })?;

    serde_json::from_str(&text).context(ParseCatalogSnafu { path })
}

fn select_tracks(catalog: Vec<Track>, genre: Option<&str>, query: Option<&str>) -> Vec<Track> {
    let tracks = match genre {
        Some(genre) => library::genre_bucket(&catalog, genre),
        None => catalog,
    };

    match query {
        Some(query) => library::search(&tracks, query),
        None => tracks,
    }
}

fn summary(catalog: &[Track]) -> String {
    let total: u64 = catalog.iter().map(|t| t.duration_seconds as u64).sum();
    let mut lines = vec![format!(
        "{} tracks, {}",
        catalog.len(),
        format_duration(total)
    )];

    for genre in library::genres(catalog) {
        let count = library::genre_bucket(catalog, &genre).len();
        lines.push(format!("  {genre}: {count}"));
    }

    lines.join("\n")
}
