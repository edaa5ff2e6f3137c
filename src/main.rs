use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;

mod angles;
mod error;
mod geometry;
mod library;
mod pose;
mod render;
mod runner;
mod source;
mod tracker;

use error::Error;
use source::PoseSource;

const DEFAULT_VISIBILITY_THRESHOLD: &str = "0.2";
const DEFAULT_MATCH_THRESHOLD: &str = "30";
const DEFAULT_HOLD_TIMEOUT_MS: &str = "1000";
const DEFAULT_TICK_INTERVAL_MS: &str = "200";

#[derive(structopt::StructOpt)]
struct Opt {
    /// Name of the reference pose to match (e.g. "tree").
    pose: String,

    /// NDJSON stream of estimator frames; reads stdin when omitted.
    #[structopt(short, long)]
    input: Option<PathBuf>,

    /// Keypoint visibility score threshold.
    #[structopt(short, long, default_value = DEFAULT_VISIBILITY_THRESHOLD)]
    threshold: f32,

    /// Maximum circular angle error, in degrees, for a channel to match.
    #[structopt(short, long, default_value = DEFAULT_MATCH_THRESHOLD)]
    match_threshold: f32,

    /// How long, in milliseconds, a channel stays trusted without being
    /// re-confirmed.
    #[structopt(long, default_value = DEFAULT_HOLD_TIMEOUT_MS)]
    hold_timeout_ms: u64,

    /// Evaluation cadence in milliseconds.
    #[structopt(long, default_value = DEFAULT_TICK_INTERVAL_MS)]
    tick_interval_ms: u64,

    /// Write per-tick overlay primitives as NDJSON to this path ("-" for
    /// stdout).
    #[structopt(short, long)]
    overlay_out: Option<PathBuf>,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    let reference = library::lookup(&opt.pose).with_context(|| {
        format!(
            "known poses: {}",
            library::names().collect::<Vec<_>>().join(", ")
        )
    })?;

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();

    ctrlc::set_handler(move || {
        running_ctrl_c.store(false, Ordering::SeqCst);
    })
    .context("failed setting Ctrl-C handler")?;

    let config = tracker::MatchConfig {
        hold_timeout: Duration::from_millis(opt.hold_timeout_ms),
        match_threshold: opt.match_threshold,
        tick_interval: Duration::from_millis(opt.tick_interval_ms),
    };

    let source: Box<dyn PoseSource + Send> = match &opt.input {
        Some(path) => {
            let file = File::open(path).map_err(|e| Error::OpenInput(e, path.clone()))?;
            info!(message = "replaying estimator stream", path = ?path);
            Box::new(source::NdjsonSource::new(BufReader::new(file)))
        }
        None => Box::new(source::NdjsonSource::new(BufReader::new(io::stdin()))),
    };

    let mut overlay_sink: Option<Box<dyn Write>> = match &opt.overlay_out {
        Some(path) if path.as_os_str() == "-" => Some(Box::new(io::stdout())),
        Some(path) => Some(Box::new(
            File::create(path).map_err(|e| Error::OpenOverlaySink(e, path.clone()))?,
        )),
        None => None,
    };

    let progress = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let mut evaluation = runner::EvaluationLoop::new(config, opt.threshold, running);
    let outcome = evaluation
        .run(
            reference,
            source,
            overlay_sink.as_deref_mut(),
            progress.as_ref(),
        )
        .context("pose matching session failed")?;

    if let Some(progress) = progress {
        progress.finish_and_clear();
    }

    match outcome {
        runner::Outcome::Achieved => Ok(()),
        runner::Outcome::SourceExhausted => {
            bail!("estimator stream ended before pose {:?} was held", opt.pose)
        }
        runner::Outcome::Cancelled => bail!("cancelled before pose {:?} was held", opt.pose),
    }
}
