//! Per-frame pipeline: classify, then drive the sequence session.

use crate::{
    classifier::{boosted_confidence, PoseClassifier},
    landmarks::LandmarkSet,
    poses::YogaPose,
    sequence::{FrameFeedback, SequenceSession},
    Result,
};
use log::debug;
use serde::Serialize;

/// Linear confidence rescale parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceScale {
    pub floor: f32,
    pub gain: f32,
    pub cap: f32,
}

impl Default for ConfidenceScale {
    fn default() -> Self {
        use crate::constants::{CONFIDENCE_CAP, CONFIDENCE_FLOOR, CONFIDENCE_GAIN};
        Self {
            floor: CONFIDENCE_FLOOR,
            gain: CONFIDENCE_GAIN,
            cap: CONFIDENCE_CAP,
        }
    }
}

/// Everything a UI needs to render one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameReport {
    #[serde(flatten)]
    pub feedback: FrameFeedback,
    /// Display name of the predicted pose, if it is a known asana
    pub predicted_display: Option<String>,
    /// Rescaled classifier confidence (not calibrated)
    pub confidence: Option<f32>,
    /// Description of the current target
    pub target_description: Option<&'static str>,
    /// General cues for the current target
    pub target_tips: Vec<&'static str>,
    /// Short human-readable status line
    pub alignment_status: &'static str,
}

impl FrameReport {
    /// Wrap session feedback with display fields
    #[must_use]
    pub fn new(feedback: FrameFeedback, confidence: Option<f32>) -> Self {
        let predicted_display = feedback
            .raw_label
            .as_deref()
            .and_then(YogaPose::from_label)
            .map(|p| p.display_name().to_string());
        let alignment_status = if feedback.completed {
            "Sequence complete"
        } else if feedback.raw_label.is_none() {
            "No pose detected"
        } else if feedback.good_alignment {
            "Good alignment"
        } else {
            "Adjust your pose"
        };
        Self {
            predicted_display,
            confidence,
            target_description: feedback.target_pose.map(YogaPose::description),
            target_tips: feedback.target_pose.map(|p| p.tips().to_vec()).unwrap_or_default(),
            alignment_status,
            feedback,
        }
    }
}

/// Couples a classifier with one sequence session
pub struct PoseCoach<C: PoseClassifier> {
    classifier: C,
    session: SequenceSession,
    confidence: ConfidenceScale,
}

impl<C: PoseClassifier> PoseCoach<C> {
    #[must_use]
    pub fn new(classifier: C, session: SequenceSession) -> Self {
        Self {
            classifier,
            session,
            confidence: ConfidenceScale::default(),
        }
    }

    #[must_use]
    pub fn with_confidence_scale(mut self, confidence: ConfidenceScale) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn session(&self) -> &SequenceSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SequenceSession {
        &mut self.session
    }

    /// Process one frame's landmarks (`None` when nothing was detected)
    ///
    /// # Errors
    ///
    /// Returns an error if the classifier fails; the session is left untouched
    pub fn process(&mut self, landmarks: Option<&LandmarkSet>) -> Result<FrameReport> {
        let Some(landmarks) = landmarks else {
            let feedback = self.session.process_frame("", None);
            return Ok(FrameReport::new(feedback, None));
        };
        if self.session.is_complete() {
            let feedback = self.session.process_frame("", Some(landmarks));
            return Ok(FrameReport::new(feedback, None));
        }

        let result = self.classifier.predict(landmarks)?;
        let ConfidenceScale { floor, gain, cap } = self.confidence;
        let confidence = result
            .max_probability()
            .map(|p| boosted_confidence(p, floor, gain, cap));
        debug!(
            "{} predicted {} (confidence {:?})",
            self.classifier.name(),
            result.label,
            confidence
        );

        let feedback = self.session.process_frame(&result.label, Some(landmarks));
        Ok(FrameReport::new(feedback, confidence))
    }

    /// Process a flattened 132-value feature vector
    ///
    /// # Errors
    ///
    /// Returns an error if the vector has the wrong length or classification fails
    pub fn process_features(&mut self, features: &[f32]) -> Result<FrameReport> {
        let landmarks = LandmarkSet::from_features(features)?;
        self.process(Some(&landmarks))
    }
}
