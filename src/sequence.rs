//! Per-frame pose sequencing state machine.
//!
//! A [`SequenceSession`] walks a user through a [`PoseSequence`]. Each frame
//! carries the classifier's label and the frame's landmarks (or nothing when
//! the estimator found no body). The session smooths the labels, counts how
//! long the target pose has been held and advances once the hold completes.
//! It performs no I/O and keeps no state outside the session object.

use crate::{
    constants::{DEFAULT_CONSISTENCY_FRAMES, DEFAULT_HOLD_FRAMES},
    correction::{Correction, CorrectionEngine},
    landmarks::LandmarkSet,
    overrides::apply_overrides,
    poses::{PoseSequence, YogaPose},
    Error, Result,
};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// Frame-count thresholds for stabilizing and holding a pose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionThresholds {
    /// Identical consecutive labels before the prediction counts as stable
    pub consistency_frames: u32,
    /// Stable frames on the target before advancing
    pub hold_frames: u32,
}

impl Default for SessionThresholds {
    fn default() -> Self {
        Self {
            consistency_frames: DEFAULT_CONSISTENCY_FRAMES,
            hold_frames: DEFAULT_HOLD_FRAMES,
        }
    }
}

impl SessionThresholds {
    /// # Errors
    ///
    /// Returns an error if either threshold is zero
    pub fn validate(&self) -> Result<()> {
        if self.consistency_frames == 0 {
            return Err(Error::ConfigError(
                "Consistency frames must be greater than 0".to_string(),
            ));
        }
        if self.hold_frames == 0 {
            return Err(Error::ConfigError("Hold frames must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Mutable counters of a guided session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceState {
    /// Index of the current target in the sequence
    pub current_pose_index: usize,
    /// Last normalized label seen, if any since the last advance
    pub consistent_label: Option<String>,
    /// Consecutive frames that produced `consistent_label`
    pub consistent_count: u32,
    /// Consecutive stable frames matching the target
    pub stable_hold_count: u32,
}

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameFeedback {
    /// Target pose for this frame; `None` once the sequence is complete
    pub target_pose: Option<YogaPose>,
    /// Normalized label after overrides; `None` for skipped frames
    pub raw_label: Option<String>,
    /// Normalized classifier label before overrides
    pub classifier_label: Option<String>,
    /// Pose forced by a rule override on this frame
    pub overridden: Option<YogaPose>,
    pub corrections: Vec<Correction>,
    /// `stable_hold_count / hold_frames`, clamped to `[0, 1]`
    pub hold_progress: f32,
    /// The session moved to the next pose on this frame
    pub advanced: bool,
    /// Label matches the target and no correction applies
    pub good_alignment: bool,
    /// Every pose in the sequence has been held
    pub completed: bool,
}

impl FrameFeedback {
    fn skipped(target: YogaPose, progress: f32) -> Self {
        Self {
            target_pose: Some(target),
            raw_label: None,
            classifier_label: None,
            overridden: None,
            corrections: Vec::new(),
            hold_progress: progress,
            advanced: false,
            good_alignment: false,
            completed: false,
        }
    }

    fn finished() -> Self {
        Self {
            target_pose: None,
            raw_label: None,
            classifier_label: None,
            overridden: None,
            corrections: Vec::new(),
            hold_progress: 1.0,
            advanced: false,
            good_alignment: false,
            completed: true,
        }
    }

    /// Correction messages only
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.corrections.iter().map(|c| c.message.as_str()).collect()
    }
}

/// One user's pass through a pose sequence
#[derive(Debug, Clone)]
pub struct SequenceSession {
    sequence: PoseSequence,
    thresholds: SessionThresholds,
    corrections: CorrectionEngine,
    rule_overrides: bool,
    state: SequenceState,
    frames_processed: u64,
    frames_skipped: u64,
}

impl SequenceSession {
    #[must_use]
    pub fn new(sequence: PoseSequence, thresholds: SessionThresholds, corrections: CorrectionEngine) -> Self {
        info!(
            "Starting session: {} poses, consistency {} frames, hold {} frames",
            sequence.len(),
            thresholds.consistency_frames,
            thresholds.hold_frames
        );
        Self {
            sequence,
            thresholds,
            corrections,
            rule_overrides: true,
            state: SequenceState::default(),
            frames_processed: 0,
            frames_skipped: 0,
        }
    }

    /// Enable or disable the plank/eight-point label overrides
    #[must_use]
    pub fn with_rule_overrides(mut self, enabled: bool) -> Self {
        self.rule_overrides = enabled;
        self
    }

    #[must_use]
    pub fn state(&self) -> &SequenceState {
        &self.state
    }

    #[must_use]
    pub fn sequence(&self) -> &PoseSequence {
        &self.sequence
    }

    #[must_use]
    pub fn thresholds(&self) -> SessionThresholds {
        self.thresholds
    }

    /// Current target, or `None` when the sequence is finished
    #[must_use]
    pub fn target(&self) -> Option<YogaPose> {
        self.sequence.get(self.state.current_pose_index)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state.current_pose_index >= self.sequence.len()
    }

    /// Frames that carried landmarks / frames skipped for lack of them
    #[must_use]
    pub fn frame_counts(&self) -> (u64, u64) {
        (self.frames_processed, self.frames_skipped)
    }

    #[must_use]
    pub fn hold_progress(&self) -> f32 {
        (self.state.stable_hold_count as f32 / self.thresholds.hold_frames as f32).min(1.0)
    }

    /// Restart from the first pose
    pub fn reset(&mut self) {
        self.state = SequenceState::default();
        self.frames_processed = 0;
        self.frames_skipped = 0;
    }

    /// Advance the state machine by one frame.
    ///
    /// `landmarks == None` means the estimator found no body: the frame is a
    /// no-op and the feedback is empty.
    pub fn process_frame(&mut self, raw_label: &str, landmarks: Option<&LandmarkSet>) -> FrameFeedback {
        let Some(target) = self.target() else {
            return FrameFeedback::finished();
        };
        let Some(landmarks) = landmarks else {
            self.frames_skipped += 1;
            debug!("No landmarks detected, frame skipped");
            return FrameFeedback::skipped(target, self.hold_progress());
        };
        self.frames_processed += 1;

        let classifier_label = crate::poses::normalize_pose_name(raw_label);
        let (label, overridden) = if self.rule_overrides {
            let options = self.corrections.options();
            let decision = apply_overrides(target, raw_label, landmarks, options.min_visibility, options.scale);
            (decision.label, decision.forced)
        } else {
            (classifier_label.clone(), None)
        };

        // Label smoothing
        if self.state.consistent_label.as_deref() == Some(label.as_str()) {
            self.state.consistent_count += 1;
        } else {
            self.state.consistent_label = Some(label.clone());
            self.state.consistent_count = 1;
        }

        // Hold counting against the target
        if self.state.consistent_count >= self.thresholds.consistency_frames && label == target.name() {
            self.state.stable_hold_count += 1;
        } else {
            self.state.stable_hold_count = 0;
        }

        // Feedback follows the instantaneous label, not the smoothed one
        let corrections = self.corrections.evaluate_detailed(&label, landmarks);
        let good_alignment = corrections.is_empty() && label == target.name();
        let hold_progress = self.hold_progress();

        debug!(
            "Frame: target={} label={} consistent={} hold={}/{} corrections={}",
            target.name(),
            label,
            self.state.consistent_count,
            self.state.stable_hold_count,
            self.thresholds.hold_frames,
            corrections.len()
        );

        let advanced = self.state.stable_hold_count >= self.thresholds.hold_frames;
        if advanced {
            self.state.current_pose_index += 1;
            self.state.stable_hold_count = 0;
            self.state.consistent_label = None;
            self.state.consistent_count = 0;
            info!(
                "Held {} ({}/{})",
                target.display_name(),
                self.state.current_pose_index,
                self.sequence.len()
            );
            if self.is_complete() {
                info!("Sequence complete after {} frames", self.frames_processed);
            }
        }

        FrameFeedback {
            target_pose: Some(target),
            raw_label: Some(label),
            classifier_label: Some(classifier_label),
            overridden,
            corrections,
            hold_progress,
            advanced,
            good_alignment,
            completed: self.is_complete(),
        }
    }
}

impl Default for SequenceSession {
    fn default() -> Self {
        Self::new(
            PoseSequence::default(),
            SessionThresholds::default(),
            CorrectionEngine::default(),
        )
    }
}
