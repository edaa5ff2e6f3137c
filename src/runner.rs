use crate::{
    angles::{self, NUM_ANGLE_CHANNELS},
    error::Error,
    library::ReferencePose,
    render,
    source::{Frame, PoseSource},
    tracker::{MatchConfig, PoseMatchTracker},
};
use indicatif::ProgressBar;
use std::{
    io::Write,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};
use tracing::{info, trace};

/// Refresh cadence of the numeric angle readout, independent of the
/// evaluation tick cadence.
const READOUT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Every channel was simultaneously within tolerance: the pose was held.
    Achieved,
    /// The estimator stream ended before the pose was matched.
    SourceExhausted,
    /// The run flag was lowered externally.
    Cancelled,
}

/// Owns one matching session: the tracker and its attempt state, the shared
/// most-recent-frame cell, and the run flag. Replaces the ambient globals of
/// a render-loop design with an explicit start/stop lifecycle.
pub(crate) struct EvaluationLoop {
    tracker: PoseMatchTracker,
    visibility_threshold: f32,
    running: Arc<AtomicBool>,
}

impl EvaluationLoop {
    pub(crate) fn new(
        config: MatchConfig,
        visibility_threshold: f32,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            tracker: PoseMatchTracker::new(config),
            visibility_threshold,
            running,
        }
    }

    /// Run one attempt against `reference` until the pose is achieved, the
    /// source ends or fails, or the run flag is lowered. The attempt's match
    /// state never outlives this call.
    pub(crate) fn run<S>(
        &mut self,
        reference: ReferencePose,
        source: S,
        overlay_sink: Option<&mut (dyn Write + 'static)>,
        progress: Option<&ProgressBar>,
    ) -> Result<Outcome, Error>
    where
        S: PoseSource + Send,
    {
        info!(
            message = "starting pose attempt",
            pose = reference.name,
            match_threshold = f64::from(self.tracker.config().match_threshold),
        );
        self.tracker.start_attempt(reference);
        let outcome = self.drive(source, overlay_sink, progress);
        self.tracker.end_attempt();

        if let Ok(Outcome::Achieved) = outcome {
            info!(message = "pose achieved", pose = reference.name);
        }
        outcome
    }

    fn drive<S>(
        &mut self,
        source: S,
        mut overlay_sink: Option<&mut (dyn Write + 'static)>,
        progress: Option<&ProgressBar>,
    ) -> Result<Outcome, Error>
    where
        S: PoseSource + Send,
    {
        let tick_interval = self.tracker.config().tick_interval;
        let visibility_threshold = self.visibility_threshold;
        let running = self.running.clone();

        // single-writer cell holding the estimator's most recent frame
        let latest: Mutex<Option<Frame>> = Mutex::new(None);
        let done = AtomicBool::new(false);

        crossbeam::thread::scope(|scope| {
            let latest_ref = &latest;
            let done_ref = &done;
            let running_source = running.clone();

            let source_handle = scope.spawn(move |_| {
                let mut source = source;
                let result = loop {
                    if !running_source.load(Ordering::SeqCst) {
                        break Ok(());
                    }
                    match source.next_frame() {
                        Ok(Some(frame)) => *latest_ref.lock().unwrap() = Some(frame),
                        Ok(None) => break Ok(()),
                        Err(error) => break Err(error),
                    }
                };
                done_ref.store(true, Ordering::SeqCst);
                result
            });

            let mut next_tick = Instant::now();
            let mut last_readout: Option<Instant> = None;

            let outcome = loop {
                if !running.load(Ordering::SeqCst) {
                    break Ok(Outcome::Cancelled);
                }

                // read before the snapshot so the final frame still gets a tick
                let stream_ended = done.load(Ordering::SeqCst);
                let now = Instant::now();

                // snapshot the newest frame; the lock is held only for the copy
                let frame = latest.lock().unwrap().clone();
                match frame.as_ref().and_then(|poses| poses.first()) {
                    Some(pose) => {
                        let angles =
                            angles::extract_angles(&pose.keypoints, visibility_threshold);
                        let report = match self.tracker.evaluate_tick(&angles, now) {
                            Ok(report) => report,
                            Err(error) => break Err(error),
                        };

                        if let Some(sink) = overlay_sink.as_mut() {
                            let overlay = render::build_overlay(pose, visibility_threshold);
                            if let Err(error) = serde_json::to_writer(&mut **sink, &overlay)
                                .map_err(Error::SerializeOverlay)
                                .and_then(|()| writeln!(sink).map_err(Error::WriteOverlay))
                            {
                                break Err(error);
                            }
                        }

                        if let Some(progress) = progress {
                            progress.set_message(format!(
                                "satisfied {}/{} channels",
                                report.satisfied_count(),
                                NUM_ANGLE_CHANNELS,
                            ));
                            progress.inc(1);
                        }

                        let readout_due = last_readout
                            .map_or(true, |at| now.duration_since(at) >= READOUT_INTERVAL);
                        if readout_due {
                            for line in angles.readout_lines() {
                                info!(target: "readout", "{}", line);
                            }
                            last_readout = Some(now);
                        }

                        if report.all_satisfied() {
                            break Ok(Outcome::Achieved);
                        }
                    }
                    // a tick without a detected body runs neither expiry nor
                    // update; only the hold timeout governs expiry
                    None => trace!("no detected body; skipping tick"),
                }

                if stream_ended {
                    break Ok(Outcome::SourceExhausted);
                }

                next_tick += tick_interval;
                if let Some(wait) = next_tick.checked_duration_since(Instant::now()) {
                    std::thread::sleep(wait);
                }
            };

            // stop the source thread deterministically before reaping it
            running.store(false, Ordering::SeqCst);
            let source_result = source_handle
                .join()
                .expect("pose source thread panicked");

            let outcome = outcome?;
            if outcome != Outcome::Achieved {
                // a source failure is terminal for the session; never retried
                source_result?;
            }
            Ok(outcome)
        })
        .expect("evaluation scope panicked")
    }
}
