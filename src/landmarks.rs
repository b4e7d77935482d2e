//! Body landmark types produced by the external pose estimator.
//!
//! A [`LandmarkSet`] always holds exactly 33 landmarks in the estimator's
//! fixed anatomical order. Coordinates are normalized to the image
//! (`x`, `y` in `[0, 1]`), `z` is relative depth and `visibility` is the
//! estimator's confidence in `[0, 1]`.

use crate::{
    constants::{FEATURE_VECTOR_LEN, NUM_POSE_LANDMARKS, VALUES_PER_LANDMARK},
    geometry::ImageScale,
    Error, Result,
};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The 33 anatomical keypoints, in estimator output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoseLandmark {
    Nose,
    LeftEyeInner,
    LeftEye,
    LeftEyeOuter,
    RightEyeInner,
    RightEye,
    RightEyeOuter,
    LeftEar,
    RightEar,
    MouthLeft,
    MouthRight,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftPinky,
    RightPinky,
    LeftIndex,
    RightIndex,
    LeftThumb,
    RightThumb,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

impl PoseLandmark {
    /// All landmarks in index order
    pub const ALL: [PoseLandmark; NUM_POSE_LANDMARKS] = [
        PoseLandmark::Nose,
        PoseLandmark::LeftEyeInner,
        PoseLandmark::LeftEye,
        PoseLandmark::LeftEyeOuter,
        PoseLandmark::RightEyeInner,
        PoseLandmark::RightEye,
        PoseLandmark::RightEyeOuter,
        PoseLandmark::LeftEar,
        PoseLandmark::RightEar,
        PoseLandmark::MouthLeft,
        PoseLandmark::MouthRight,
        PoseLandmark::LeftShoulder,
        PoseLandmark::RightShoulder,
        PoseLandmark::LeftElbow,
        PoseLandmark::RightElbow,
        PoseLandmark::LeftWrist,
        PoseLandmark::RightWrist,
        PoseLandmark::LeftPinky,
        PoseLandmark::RightPinky,
        PoseLandmark::LeftIndex,
        PoseLandmark::RightIndex,
        PoseLandmark::LeftThumb,
        PoseLandmark::RightThumb,
        PoseLandmark::LeftHip,
        PoseLandmark::RightHip,
        PoseLandmark::LeftKnee,
        PoseLandmark::RightKnee,
        PoseLandmark::LeftAnkle,
        PoseLandmark::RightAnkle,
        PoseLandmark::LeftHeel,
        PoseLandmark::RightHeel,
        PoseLandmark::LeftFootIndex,
        PoseLandmark::RightFootIndex,
    ];

    /// Position of this landmark in the estimator output
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Snake-case anatomical name
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PoseLandmark::Nose => "nose",
            PoseLandmark::LeftEyeInner => "left_eye_inner",
            PoseLandmark::LeftEye => "left_eye",
            PoseLandmark::LeftEyeOuter => "left_eye_outer",
            PoseLandmark::RightEyeInner => "right_eye_inner",
            PoseLandmark::RightEye => "right_eye",
            PoseLandmark::RightEyeOuter => "right_eye_outer",
            PoseLandmark::LeftEar => "left_ear",
            PoseLandmark::RightEar => "right_ear",
            PoseLandmark::MouthLeft => "mouth_left",
            PoseLandmark::MouthRight => "mouth_right",
            PoseLandmark::LeftShoulder => "left_shoulder",
            PoseLandmark::RightShoulder => "right_shoulder",
            PoseLandmark::LeftElbow => "left_elbow",
            PoseLandmark::RightElbow => "right_elbow",
            PoseLandmark::LeftWrist => "left_wrist",
            PoseLandmark::RightWrist => "right_wrist",
            PoseLandmark::LeftPinky => "left_pinky",
            PoseLandmark::RightPinky => "right_pinky",
            PoseLandmark::LeftIndex => "left_index",
            PoseLandmark::RightIndex => "right_index",
            PoseLandmark::LeftThumb => "left_thumb",
            PoseLandmark::RightThumb => "right_thumb",
            PoseLandmark::LeftHip => "left_hip",
            PoseLandmark::RightHip => "right_hip",
            PoseLandmark::LeftKnee => "left_knee",
            PoseLandmark::RightKnee => "right_knee",
            PoseLandmark::LeftAnkle => "left_ankle",
            PoseLandmark::RightAnkle => "right_ankle",
            PoseLandmark::LeftHeel => "left_heel",
            PoseLandmark::RightHeel => "right_heel",
            PoseLandmark::LeftFootIndex => "left_foot_index",
            PoseLandmark::RightFootIndex => "right_foot_index",
        }
    }
}

impl fmt::Display for PoseLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single estimated keypoint
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visibility: f32,
}

impl Landmark {
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Self { x, y, z, visibility }
    }
}

impl From<[f32; VALUES_PER_LANDMARK]> for Landmark {
    fn from(v: [f32; VALUES_PER_LANDMARK]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

/// One frame's worth of landmarks, immutable once built
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkSet {
    landmarks: Vec<Landmark>,
}

impl LandmarkSet {
    /// Build a set from exactly 33 landmarks
    ///
    /// # Errors
    ///
    /// Returns an error if the number of landmarks is not 33
    pub fn new(landmarks: Vec<Landmark>) -> Result<Self> {
        if landmarks.len() != NUM_POSE_LANDMARKS {
            return Err(Error::InvalidInput(format!(
                "Expected {} landmarks, got {}",
                NUM_POSE_LANDMARKS,
                landmarks.len()
            )));
        }
        Ok(Self { landmarks })
    }

    /// Rebuild a set from the flattened classifier feature vector
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFeatureVector`] if the slice is not 132 values long
    pub fn from_features(features: &[f32]) -> Result<Self> {
        if features.len() != FEATURE_VECTOR_LEN {
            return Err(Error::InvalidFeatureVector {
                expected: FEATURE_VECTOR_LEN,
                actual: features.len(),
            });
        }
        let landmarks = features
            .chunks_exact(VALUES_PER_LANDMARK)
            .map(|c| Landmark::new(c[0], c[1], c[2], c[3]))
            .collect();
        Ok(Self { landmarks })
    }

    /// Flatten into `[x, y, z, v]` per landmark, in landmark order
    #[must_use]
    pub fn to_features(&self) -> Vec<f32> {
        self.landmarks
            .iter()
            .flat_map(|l| [l.x, l.y, l.z, l.visibility])
            .collect()
    }

    #[must_use]
    pub fn get(&self, landmark: PoseLandmark) -> &Landmark {
        &self.landmarks[landmark.index()]
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Copy with every x/y passed through `f`
    pub(crate) fn map_xy<F>(&self, mut f: F) -> Self
    where
        F: FnMut(f32, f32) -> (f32, f32),
    {
        let landmarks = self
            .landmarks
            .iter()
            .map(|l| {
                let (x, y) = f(l.x, l.y);
                Landmark { x, y, ..*l }
            })
            .collect();
        Self { landmarks }
    }

    /// Resolve a landmark to a 2D point usable for angle computation
    ///
    /// # Errors
    ///
    /// Returns [`Error::LandmarkUnavailable`] if the coordinates are not finite
    /// or the visibility is below `min_visibility`
    pub fn point(&self, landmark: PoseLandmark, min_visibility: f32, scale: ImageScale) -> Result<Vector2<f64>> {
        let lm = self.get(landmark);
        if !lm.x.is_finite() || !lm.y.is_finite() {
            return Err(Error::LandmarkUnavailable {
                landmark,
                reason: "non-finite coordinates".to_string(),
            });
        }
        if lm.visibility < min_visibility {
            return Err(Error::LandmarkUnavailable {
                landmark,
                reason: format!("visibility {:.2} below {:.2}", lm.visibility, min_visibility),
            });
        }
        Ok(scale.apply(f64::from(lm.x), f64::from(lm.y)))
    }
}

/// Column names of the classifier feature vector: `1_x, 1_y, 1_z, 1_v, ... 33_v`
#[must_use]
pub fn feature_columns() -> Vec<String> {
    (1..=NUM_POSE_LANDMARKS)
        .flat_map(|i| ["x", "y", "z", "v"].into_iter().map(move |c| format!("{i}_{c}")))
        .collect()
}
