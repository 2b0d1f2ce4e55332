use cadence_player_controls::{
    PlaybackReceiver, QueueReceiver, controls::Controls, notification::Notification,
    store::PlaybackState, time::format_duration,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    select,
    sync::broadcast,
};
use tracing::debug;

const HELP: &str = "commands: p (play/pause), n (next), b (back), s <sec> (seek), \
f / r (skip 10s forward/back), v <0-100> (volume), j <n> (jump), l (like), \
q (queue), i (info), x (exit)";

const SKIP_SECONDS: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
enum Input {
    PlayPause,
    Next,
    Previous,
    Seek(f64),
    Forward,
    Rewind,
    Volume(f32),
    Jump(usize),
    Like,
    Queue,
    Info,
    Exit,
}

fn parse(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let command = words.next()?;
    let argument = words.next();

    let input = match (command, argument) {
        ("p", None) => Input::PlayPause,
        ("n", None) => Input::Next,
        ("b", None) => Input::Previous,
        ("s", Some(seconds)) => Input::Seek(seconds.parse().ok()?),
        ("f", None) => Input::Forward,
        ("r", None) => Input::Rewind,
        ("v", Some(percent)) => Input::Volume(percent.parse::<f32>().ok()? / 100.0),
        ("j", Some(position)) => Input::Jump(position.parse::<usize>().ok()?.checked_sub(1)?),
        ("l", None) => Input::Like,
        ("q", None) => Input::Queue,
        ("i", None) => Input::Info,
        ("x", None) => Input::Exit,
        _ => return None,
    };

    Some(input)
}

/// What the console last printed about playback, used to skip position-only
/// updates.
#[derive(Debug, Default, PartialEq)]
struct Shown {
    track_id: Option<String>,
    transition: u64,
    is_playing: bool,
}

impl Shown {
    fn from_state(state: &PlaybackState) -> Self {
        Self {
            track_id: state.current_track.as_ref().map(|t| t.id.clone()),
            transition: state.transition,
            is_playing: state.is_playing,
        }
    }
}

fn now_playing(state: &PlaybackState) -> String {
    let Some(track) = &state.current_track else {
        return "Nothing playing".to_string();
    };

    let marker = if state.is_playing { ">" } else { "||" };
    format!(
        "{marker} {} - {} [{} / {}]",
        track.title,
        track.artist,
        format_duration(state.current_time.as_secs()),
        format_duration(state.duration.as_secs()),
    )
}

fn notification_line(notification: &Notification) -> String {
    match notification {
        Notification::Error(message) => format!("error: {message}"),
        Notification::Warning(message) => format!("warning: {message}"),
        Notification::Success(message) | Notification::Info(message) => message.clone(),
    }
}

enum Wake {
    Line(Option<String>),
    Playback,
    Notification(Notification),
    Closed,
}

/// Reads commands from stdin and prints playback changes until the player
/// goes away or the user exits.
pub async fn run(
    controls: Controls,
    mut playback: PlaybackReceiver,
    queue: QueueReceiver,
    mut notifications: broadcast::Receiver<Notification>,
) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut shown = Shown::default();

    println!("{HELP}");

    loop {
        let wake = select! {
            line = lines.next_line() => Wake::Line(line.ok().flatten()),
            changed = playback.changed() => match changed {
                Ok(()) => Wake::Playback,
                Err(_) => Wake::Closed,
            },
            Ok(notification) = notifications.recv() => Wake::Notification(notification),
        };

        match wake {
            Wake::Closed => break,
            Wake::Notification(notification) => println!("{}", notification_line(&notification)),
            Wake::Playback => {
                let state = playback.borrow_and_update().clone();
                let next = Shown::from_state(&state);
                if next != shown {
                    println!("{}", now_playing(&state));
                    shown = next;
                }
            }
            Wake::Line(None) => {
                debug!("stdin closed");
                _ = controls.quit();
                break;
            }
            Wake::Line(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }

                let Some(input) = parse(&line) else {
                    println!("{HELP}");
                    continue;
                };

                let state = playback.borrow().clone();
                let position = state.current_time.as_secs_f64();

                let sent = match input {
                    Input::PlayPause => controls.play_pause(),
                    Input::Next => controls.next(),
                    Input::Previous => controls.previous(),
                    Input::Seek(seconds) => controls.seek(seconds),
                    Input::Forward => controls.seek(position + SKIP_SECONDS),
                    Input::Rewind => controls.seek(position - SKIP_SECONDS),
                    Input::Volume(volume) => controls.set_volume(volume),
                    Input::Jump(index) => controls.skip_to(index),
                    Input::Like => match state.current_track {
                        Some(track) => controls.toggle_like(track),
                        None => Ok(()),
                    },
                    Input::Queue => {
                        let queue = queue.borrow().clone();
                        for (index, track) in queue.tracks().iter().enumerate() {
                            let marker = if queue.cursor() == Some(index) { "*" } else { " " };
                            println!("{marker}{:>3}. {} - {}", index + 1, track.title, track.artist);
                        }
                        Ok(())
                    }
                    Input::Info => {
                        println!("{} (volume {:.0}%)", now_playing(&state), state.volume * 100.0);
                        Ok(())
                    }
                    Input::Exit => {
                        _ = controls.quit();
                        break;
                    }
                };

                if sent.is_err() {
                    break;
                }
            }
        }
    }
}
