//! Pose classification seam and a reference-keypoint classifier.
//!
//! The production classifier is an external model; anything that maps a
//! [`LandmarkSet`] to a pose label can be plugged in through
//! [`PoseClassifier`]. [`ReferenceClassifier`] is a self-contained fallback
//! that labels a frame by its nearest per-pose average keypoints.

use crate::{
    constants::{CONFIDENCE_CAP, CONFIDENCE_FLOOR, CONFIDENCE_GAIN, NUM_POSE_LANDMARKS, REFERENCE_TEMPERATURE},
    geometry::recenter,
    landmarks::LandmarkSet,
    poses::normalize_pose_name,
    Error, Result,
};
use log::{info, warn};
use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Coordinates kept per landmark in a reference pose (x, y, z)
const REFERENCE_DIMS: usize = 3;

/// Rescale a top-class probability into the confidence shown to users.
///
/// This is a presentation choice, not a calibrated probability: it maps
/// `p_max` linearly onto `[floor, cap]` so that a correct but uncertain
/// prediction still reads as encouraging.
#[must_use]
pub fn boosted_confidence(max_probability: f32, floor: f32, gain: f32, cap: f32) -> f32 {
    (floor + gain * max_probability.clamp(0.0, 1.0)).min(cap)
}

/// Label and optional per-class probabilities for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<Vec<f32>>,
}

impl ClassificationResult {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            probabilities: None,
        }
    }

    #[must_use]
    pub fn with_probabilities(mut self, probabilities: Vec<f32>) -> Self {
        self.probabilities = Some(probabilities);
        self
    }

    #[must_use]
    pub fn max_probability(&self) -> Option<f32> {
        self.probabilities
            .as_ref()
            .and_then(|p| p.iter().copied().filter(|v| v.is_finite()).reduce(f32::max))
    }

    /// Display confidence using the default rescale constants
    #[must_use]
    pub fn confidence(&self) -> Option<f32> {
        self.max_probability()
            .map(|p| boosted_confidence(p, CONFIDENCE_FLOOR, CONFIDENCE_GAIN, CONFIDENCE_CAP))
    }
}

/// Anything that can label a frame's landmarks with a pose name
pub trait PoseClassifier: Send {
    /// Classify one frame
    ///
    /// # Errors
    ///
    /// Returns an error if the classifier cannot produce a prediction
    fn predict(&self, landmarks: &LandmarkSet) -> Result<ClassificationResult>;

    /// Classifier name for logging
    fn name(&self) -> &str;
}

/// Average keypoints per pose, computed from labelled samples
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceKeypoints {
    /// Pose name → 99 values (x, y, z per landmark)
    poses: BTreeMap<String, Vec<f32>>,
}

impl ReferenceKeypoints {
    /// Average labelled landmark sets per (normalized) pose name
    pub fn from_samples<'a, I>(samples: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a LandmarkSet)>,
    {
        let mut sums: BTreeMap<String, (Vec<f32>, usize)> = BTreeMap::new();
        for (label, landmarks) in samples {
            let entry = sums
                .entry(normalize_pose_name(label))
                .or_insert_with(|| (vec![0.0; NUM_POSE_LANDMARKS * REFERENCE_DIMS], 0));
            for (acc, value) in entry.0.iter_mut().zip(xyz(landmarks)) {
                *acc += value;
            }
            entry.1 += 1;
        }

        let poses = sums
            .into_iter()
            .map(|(name, (sum, count))| {
                info!("Computed reference keypoints for {} from {} samples", name, count);
                let n = count as f32;
                (name, sum.into_iter().map(|v| v / n).collect())
            })
            .collect();
        Self { poses }
    }

    /// Load reference keypoints from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or an entry has
    /// the wrong number of values
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let refs: Self = serde_yaml::from_str(&content)?;
        refs.validate()?;
        Ok(refs)
    }

    /// Save reference keypoints to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let expected = NUM_POSE_LANDMARKS * REFERENCE_DIMS;
        for (name, values) in &self.poses {
            if values.len() != expected {
                return Err(Error::InvalidInput(format!(
                    "Reference for {name} has {} values, expected {expected}",
                    values.len()
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn pose_names(&self) -> Vec<&str> {
        self.poses.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn get(&self, pose: &str) -> Option<&[f32]> {
        self.poses.get(&normalize_pose_name(pose)).map(Vec::as_slice)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

fn xyz(landmarks: &LandmarkSet) -> impl Iterator<Item = f32> + '_ {
    landmarks.as_slice().iter().flat_map(|l| [l.x, l.y, l.z])
}

/// Nearest-reference classifier over torso-centered coordinates
#[derive(Debug, Clone)]
pub struct ReferenceClassifier {
    names: Vec<String>,
    centroids: Vec<DVector<f32>>,
    temperature: f32,
}

impl ReferenceClassifier {
    /// # Errors
    ///
    /// Returns an error if `references` is empty or a pose has the wrong
    /// number of values
    pub fn new(references: &ReferenceKeypoints) -> Result<Self> {
        references.validate()?;
        if references.is_empty() {
            return Err(Error::ClassifierError("No reference poses loaded".to_string()));
        }
        let (names, centroids) = references
            .poses
            .iter()
            .map(|(name, values)| (name.clone(), center_reference(values)))
            .unzip();
        Ok(Self {
            names,
            centroids,
            temperature: REFERENCE_TEMPERATURE,
        })
    }

    /// Softmax temperature applied to the negative distances
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        if temperature > 0.0 {
            self.temperature = temperature;
        } else {
            warn!("Ignoring non-positive temperature {}", temperature);
        }
        self
    }

    /// Class names in probability-vector order
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.names
    }
}

/// Subtract the torso center from a flat xyz reference
fn center_reference(values: &[f32]) -> DVector<f32> {
    use crate::landmarks::PoseLandmark::{LeftHip, LeftShoulder, RightHip, RightShoulder};
    let (cx, cy) = [LeftShoulder, RightShoulder, LeftHip, RightHip]
        .iter()
        .map(|lm| lm.index() * REFERENCE_DIMS)
        .fold((0.0, 0.0), |(sx, sy), i| (sx + values[i], sy + values[i + 1]));
    let (cx, cy) = (cx / 4.0, cy / 4.0);
    DVector::from_iterator(
        values.len(),
        values.iter().enumerate().map(|(i, &v)| match i % REFERENCE_DIMS {
            0 => v - cx,
            1 => v - cy,
            _ => v,
        }),
    )
}

impl PoseClassifier for ReferenceClassifier {
    fn predict(&self, landmarks: &LandmarkSet) -> Result<ClassificationResult> {
        let centered = recenter(landmarks);
        let sample = DVector::from_iterator(NUM_POSE_LANDMARKS * REFERENCE_DIMS, xyz(&centered));
        if sample.iter().any(|v| !v.is_finite()) {
            return Err(Error::ClassifierError("Landmarks contain non-finite values".to_string()));
        }

        let distances: Vec<f32> = self.centroids.iter().map(|c| (c - &sample).norm()).collect();
        let best = distances
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .ok_or_else(|| Error::ClassifierError("No reference poses loaded".to_string()))?;

        // Softmax over negative distances, shifted by the minimum for stability
        let min = distances[best];
        let weights: Vec<f32> = distances
            .iter()
            .map(|d| (-(d - min) / self.temperature).exp())
            .collect();
        let total: f32 = weights.iter().sum();
        let probabilities = weights.into_iter().map(|w| w / total).collect();

        Ok(ClassificationResult::new(self.names[best].clone()).with_probabilities(probabilities))
    }

    fn name(&self) -> &str {
        "reference"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boosted_confidence() {
        assert!((boosted_confidence(0.0, 0.6, 0.55, 0.99) - 0.6).abs() < 1e-6);
        assert!((boosted_confidence(0.5, 0.6, 0.55, 0.99) - 0.875).abs() < 1e-6);
        assert!((boosted_confidence(1.0, 0.6, 0.55, 0.99) - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_max_probability() {
        let r = ClassificationResult::new("pranamasana").with_probabilities(vec![0.1, 0.7, 0.2]);
        assert_eq!(r.max_probability(), Some(0.7));
        assert!(ClassificationResult::new("x").confidence().is_none());
    }

    #[test]
    fn test_empty_references_rejected() {
        assert!(ReferenceClassifier::new(&ReferenceKeypoints::default()).is_err());
    }
}
