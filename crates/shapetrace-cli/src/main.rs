//! Headless ShapeTrace runner.
//!
//! Loads a board configuration, then either replays a recorded stroke or
//! lets the idle demonstration run for a while, printing every event as a
//! JSON line.
//!
//! ```text
//! shapetrace <board.json> [--stroke <points.json>] [--seconds <n>] [--device <w>x<h>]
//! ```

use kurbo::{Point, Size};
use shapetrace_core::{BASE_VIEWPORT, ConfigError, EventQueue, GameConfig, PointerEvent, TraceBoard, TraceEvent};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const FRAMES_PER_SECOND: f64 = 60.0;
const DEFAULT_SECONDS: f64 = 10.0;

#[derive(Debug, thiserror::Error)]
enum RunnerError {
    #[error("usage: shapetrace <board.json> [--stroke <points.json>] [--seconds <n>] [--device <w>x<h>]")]
    Usage,
    #[error("invalid value for {flag}: {value}")]
    InvalidArgument { flag: &'static str, value: String },
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

type RunnerResult<T> = Result<T, RunnerError>;

#[derive(Debug, Clone, PartialEq)]
struct Options {
    config: PathBuf,
    stroke: Option<PathBuf>,
    seconds: f64,
    device: Size,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> RunnerResult<Self> {
        let mut args = args.into_iter();
        let mut config = None;
        let mut stroke = None;
        let mut seconds = DEFAULT_SECONDS;
        let mut device = BASE_VIEWPORT;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--stroke" => stroke = Some(PathBuf::from(args.next().ok_or(RunnerError::Usage)?)),
                "--seconds" => {
                    let value = args.next().ok_or(RunnerError::Usage)?;
                    seconds = value
                        .parse::<f64>()
                        .ok()
                        .filter(|s| s.is_finite() && *s >= 0.0)
                        .ok_or(RunnerError::InvalidArgument {
                            flag: "--seconds",
                            value,
                        })?;
                }
                "--device" => {
                    let value = args.next().ok_or(RunnerError::Usage)?;
                    device = parse_size(&value).ok_or(RunnerError::InvalidArgument {
                        flag: "--device",
                        value,
                    })?;
                }
                _ if arg.starts_with("--") => return Err(RunnerError::Usage),
                _ if config.is_none() => config = Some(PathBuf::from(&arg)),
                _ => return Err(RunnerError::Usage),
            }
        }

        Ok(Self {
            config: config.ok_or(RunnerError::Usage)?,
            stroke,
            seconds,
            device,
        })
    }
}

fn parse_size(value: &str) -> Option<Size> {
    let (w, h) = value.split_once('x')?;
    let size = Size::new(w.trim().parse().ok()?, h.trim().parse().ok()?);
    (size.width > 0.0 && size.height > 0.0).then_some(size)
}

fn frame_time(frame: u64) -> Duration {
    Duration::from_secs_f64(frame as f64 / FRAMES_PER_SECOND)
}

/// Load a recorded stroke: a JSON array of world points.
fn load_stroke(path: &Path) -> RunnerResult<Vec<Point>> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

/// Drive a board and hand every event to `emit`, oldest first.
fn run(options: &Options, mut emit: impl FnMut(&TraceEvent) -> RunnerResult<()>) -> RunnerResult<()> {
    let config = GameConfig::load(&options.config)?;
    let base_dir = options.config.parent().unwrap_or_else(|| Path::new("."));
    let mut board = TraceBoard::load(config, base_dir, options.device);
    let mut queue = EventQueue::new();
    let mut frame = 0;

    board.start(frame_time(frame), &mut queue);

    if let Some(path) = &options.stroke {
        let points = load_stroke(path)?;
        log::info!("Replaying stroke of {} points", points.len());
        for event in PointerEvent::stroke(&points) {
            board.handle_pointer(event, frame_time(frame), &mut queue);
            board.tick(frame_time(frame), &mut queue);
            for event in queue.drain() {
                emit(&event)?;
            }
            frame += 1;
        }
    }

    let frames = frame + (options.seconds * FRAMES_PER_SECOND).round() as u64;
    while frame < frames {
        board.tick(frame_time(frame), &mut queue);
        for event in queue.drain() {
            emit(&event)?;
        }
        frame += 1;
    }

    Ok(())
}

fn main() {
    env_logger::init();

    let result = Options::parse(std::env::args().skip(1)).and_then(|options| {
        log::info!("Starting ShapeTrace runner on {}", options.config.display());
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        let (mut completed, mut burned) = (0, 0);

        run(&options, |event| {
            match event {
                TraceEvent::ShapeCompleted { .. } => completed += 1,
                TraceEvent::ShapeBurned { .. } => burned += 1,
                _ => {}
            }
            writeln!(out, "{}", serde_json::to_string(event)?)?;
            Ok(())
        })?;

        log::info!("Finished: {} completed, {} burned", completed, burned);
        Ok(())
    });

    if let Err(err) = result {
        log::error!("{}", err);
        eprintln!("{}", err);
        std::process::exit(1);
    }
}
