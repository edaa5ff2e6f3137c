use crate::{
    angles::{AngleVector, NUM_ANGLE_CHANNELS},
    error::Error,
    geometry,
    library::ReferencePose,
};
use std::time::{Duration, Instant};

const DEFAULT_HOLD_TIMEOUT: Duration = Duration::from_millis(1000);
const DEFAULT_MATCH_THRESHOLD: f32 = 30.0;
const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Copy, Clone)]
pub(crate) struct MatchConfig {
    /// How long a channel stays trusted after it was last within tolerance.
    pub(crate) hold_timeout: Duration,
    /// Maximum circular angle error, in degrees, counting as a match.
    pub(crate) match_threshold: f32,
    /// Evaluation cadence.
    pub(crate) tick_interval: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            hold_timeout: DEFAULT_HOLD_TIMEOUT,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// Stateful per-attempt evaluator: tracks, per channel, when the observed
/// angle was last within tolerance of the reference, and reports whether all
/// channels are currently trusted at once.
#[derive(Debug)]
pub(crate) struct PoseMatchTracker {
    config: MatchConfig,
    attempt: Option<Attempt>,
}

#[derive(Debug)]
struct Attempt {
    reference: ReferencePose,
    satisfied_at: [Option<Instant>; NUM_ANGLE_CHANNELS],
}

#[derive(Debug, Copy, Clone)]
pub(crate) struct TickReport {
    pub(crate) satisfied: [bool; NUM_ANGLE_CHANNELS],
}

impl TickReport {
    pub(crate) fn all_satisfied(&self) -> bool {
        self.satisfied.iter().all(|&satisfied| satisfied)
    }

    pub(crate) fn satisfied_count(&self) -> usize {
        self.satisfied.iter().filter(|&&satisfied| satisfied).count()
    }
}

impl PoseMatchTracker {
    pub(crate) fn new(config: MatchConfig) -> Self {
        Self {
            config,
            attempt: None,
        }
    }

    pub(crate) fn config(&self) -> MatchConfig {
        self.config
    }

    /// Begin matching against `reference`, discarding any previous attempt's
    /// state: every channel starts untrusted.
    pub(crate) fn start_attempt(&mut self, reference: ReferencePose) {
        self.attempt = Some(Attempt {
            reference,
            satisfied_at: [None; NUM_ANGLE_CHANNELS],
        });
    }

    pub(crate) fn end_attempt(&mut self) {
        self.attempt = None;
    }

    /// Evaluate one frame's angles at time `now`.
    ///
    /// An out-of-tolerance reading does not clear a channel; only the expiry
    /// of its hold window does. That grace period absorbs transient detector
    /// noise. A channel absent from `angles` is simply not updated.
    pub(crate) fn evaluate_tick(
        &mut self,
        angles: &AngleVector,
        now: Instant,
    ) -> Result<TickReport, Error> {
        let config = self.config;
        let attempt = self.attempt.as_mut().ok_or(Error::NoActivePose)?;

        // expiry pass: a stamp not re-confirmed within the hold window is no
        // longer trusted
        for stamp in attempt.satisfied_at.iter_mut() {
            if let Some(at) = *stamp {
                if now.duration_since(at) > config.hold_timeout {
                    *stamp = None;
                }
            }
        }

        // update pass: an in-tolerance reading re-stamps its channel
        for (channel, degrees) in angles.channels() {
            if let Some(degrees) = degrees {
                let error = geometry::circular_error(degrees, attempt.reference.target(channel));
                if error < config.match_threshold {
                    attempt.satisfied_at[channel.idx()] = Some(now);
                }
            }
        }

        let mut satisfied = [false; NUM_ANGLE_CHANNELS];
        for (slot, stamp) in satisfied.iter_mut().zip(attempt.satisfied_at.iter()) {
            *slot = stamp.is_some();
        }
        Ok(TickReport { satisfied })
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchConfig, PoseMatchTracker};
    use crate::{
        angles::{AngleChannel, AngleVector},
        error::Error,
        library::{self, ReferencePose},
    };
    use std::time::{Duration, Instant};

    fn tracker() -> PoseMatchTracker {
        PoseMatchTracker::new(MatchConfig::default())
    }

    /// Angle vector exactly matching every channel of `reference`.
    fn matching_vector(reference: &ReferencePose) -> AngleVector {
        let mut angles = AngleVector::default();
        for &channel in &AngleChannel::ALL {
            angles.set(channel, reference.target(channel));
        }
        angles
    }

    #[test]
    fn tick_without_attempt_is_a_misuse_error() {
        let mut tracker = tracker();
        match tracker.evaluate_tick(&AngleVector::default(), Instant::now()) {
            Err(Error::NoActivePose) => {}
            other => panic!("expected NoActivePose, got {:?}", other),
        }
    }

    #[test]
    fn exact_match_satisfies_every_channel_on_the_first_tick() {
        let tree = library::lookup("tree").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(tree);

        let report = tracker
            .evaluate_tick(&matching_vector(&tree), Instant::now())
            .unwrap();
        assert!(report.all_satisfied());
        assert_eq!(report.satisfied_count(), 8);
    }

    #[test]
    fn error_at_threshold_leaves_the_channel_unsatisfied() {
        let tree = library::lookup("tree").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(tree);

        // channel 1 off by 35 degrees, beyond the default threshold of 30
        let mut angles = matching_vector(&tree);
        angles.set(
            AngleChannel::RightElbow,
            tree.target(AngleChannel::RightElbow) - 35.0,
        );

        let report = tracker.evaluate_tick(&angles, Instant::now()).unwrap();
        assert!(!report.all_satisfied());
        assert_eq!(report.satisfied_count(), 7);
        assert!(!report.satisfied[AngleChannel::RightElbow.idx()]);
    }

    #[test]
    fn wraparound_error_counts_as_a_match() {
        // warrior-2 expects 178 on channel 1; an observation of -178 is only
        // 4 degrees away around the circle
        let warrior = library::lookup("warrior-2").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(warrior);

        let mut angles = matching_vector(&warrior);
        angles.set(AngleChannel::RightElbow, -178.0);

        let report = tracker.evaluate_tick(&angles, Instant::now()).unwrap();
        assert!(report.all_satisfied());
    }

    #[test]
    fn satisfied_tick_is_idempotent_at_the_same_instant() {
        let tree = library::lookup("tree").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(tree);

        let angles = matching_vector(&tree);
        let now = Instant::now();
        assert!(tracker.evaluate_tick(&angles, now).unwrap().all_satisfied());
        assert!(tracker.evaluate_tick(&angles, now).unwrap().all_satisfied());
    }

    #[test]
    fn out_of_tolerance_reading_keeps_the_stamp_until_it_expires() {
        let tree = library::lookup("tree").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(tree);

        let t0 = Instant::now();
        assert!(tracker
            .evaluate_tick(&matching_vector(&tree), t0)
            .unwrap()
            .all_satisfied());

        // half a hold window later the elbow drifts far out of tolerance;
        // its earlier stamp is still trusted
        let mut drifted = matching_vector(&tree);
        drifted.set(AngleChannel::RightElbow, 52.0);
        let report = tracker
            .evaluate_tick(&drifted, t0 + Duration::from_millis(500))
            .unwrap();
        assert!(report.all_satisfied());
    }

    #[test]
    fn stamp_expires_after_the_hold_timeout() {
        let tree = library::lookup("tree").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(tree);

        let t0 = Instant::now();
        assert!(tracker
            .evaluate_tick(&matching_vector(&tree), t0)
            .unwrap()
            .all_satisfied());

        // no channel is observed at all past the hold window: everything expires
        let report = tracker
            .evaluate_tick(&AngleVector::default(), t0 + Duration::from_millis(1001))
            .unwrap();
        assert_eq!(report.satisfied_count(), 0);
    }

    #[test]
    fn expiry_runs_before_the_update_pass() {
        let tree = library::lookup("tree").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(tree);

        let t0 = Instant::now();
        tracker.evaluate_tick(&matching_vector(&tree), t0).unwrap();

        // a matching observation past the hold window re-stamps the channels
        // in the same tick that expired them
        let report = tracker
            .evaluate_tick(&matching_vector(&tree), t0 + Duration::from_millis(1001))
            .unwrap();
        assert!(report.all_satisfied());
    }

    #[test]
    fn never_observed_channel_blocks_the_match_indefinitely() {
        let tree = library::lookup("tree").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(tree);

        // channel 5 stays occluded across the whole attempt
        let mut angles = AngleVector::default();
        for &channel in &AngleChannel::ALL {
            if channel != AngleChannel::RightHip {
                angles.set(channel, tree.target(channel));
            }
        }

        let t0 = Instant::now();
        for tick in 0..20 {
            let report = tracker
                .evaluate_tick(&angles, t0 + Duration::from_millis(200 * tick))
                .unwrap();
            assert!(!report.all_satisfied());
            assert_eq!(report.satisfied_count(), 7);
        }
    }

    #[test]
    fn starting_a_new_attempt_resets_all_channels() {
        let tree = library::lookup("tree").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(tree);

        let t0 = Instant::now();
        assert!(tracker
            .evaluate_tick(&matching_vector(&tree), t0)
            .unwrap()
            .all_satisfied());

        tracker.start_attempt(tree);
        let report = tracker
            .evaluate_tick(&AngleVector::default(), t0 + Duration::from_millis(1))
            .unwrap();
        assert_eq!(report.satisfied_count(), 0);
    }

    #[test]
    fn ending_an_attempt_discards_its_state() {
        let tree = library::lookup("tree").unwrap();
        let mut tracker = tracker();
        tracker.start_attempt(tree);
        tracker.evaluate_tick(&matching_vector(&tree), Instant::now()).unwrap();

        tracker.end_attempt();
        assert!(matches!(
            tracker.evaluate_tick(&AngleVector::default(), Instant::now()),
            Err(Error::NoActivePose)
        ));
    }
}
