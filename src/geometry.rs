//! Joint-angle geometry and landmark normalization.

use crate::{
    constants::ANGLE_EPSILON,
    landmarks::{LandmarkSet, PoseLandmark},
};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Pixel scaling applied to normalized coordinates before measuring angles.
///
/// Angles are translation-invariant but not invariant to non-uniform scaling,
/// so a 640×480 frame measures slightly different angles than the raw
/// normalized coordinates. The default is unit scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageScale {
    pub width: f64,
    pub height: f64,
}

impl Default for ImageScale {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

impl ImageScale {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn apply(&self, x: f64, y: f64) -> Vector2<f64> {
        Vector2::new(x * self.width, y * self.height)
    }
}

/// Unsigned angle at vertex `b` between rays `b→a` and `b→c`, in degrees `[0, 180]`.
///
/// Zero-length rays yield a finite value rather than NaN.
#[must_use]
pub fn angle(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let ba = a - b;
    let bc = c - b;
    let denom = ba.norm() * bc.norm() + ANGLE_EPSILON;
    let cosine = (ba.dot(&bc) / denom).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// Same angle computed as a difference of `atan2` headings with wraparound.
#[must_use]
pub fn angle_atan2(a: Vector2<f64>, b: Vector2<f64>, c: Vector2<f64>) -> f64 {
    let radians = (c.y - b.y).atan2(c.x - b.x) - (a.y - b.y).atan2(a.x - b.x);
    let degrees = radians.to_degrees().abs();
    if degrees > 180.0 {
        360.0 - degrees
    } else {
        degrees
    }
}

/// Torso center: mean of both shoulders and both hips
#[must_use]
pub fn torso_center(landmarks: &LandmarkSet) -> (f32, f32) {
    let torso = [
        PoseLandmark::LeftShoulder,
        PoseLandmark::RightShoulder,
        PoseLandmark::LeftHip,
        PoseLandmark::RightHip,
    ];
    let (sx, sy) = torso.iter().fold((0.0, 0.0), |(sx, sy), &lm| {
        let p = landmarks.get(lm);
        (sx + p.x, sy + p.y)
    });
    (sx / 4.0, sy / 4.0)
}

/// Translate every x/y so the torso center sits at the origin
#[must_use]
pub fn recenter(landmarks: &LandmarkSet) -> LandmarkSet {
    let (cx, cy) = torso_center(landmarks);
    landmarks.map_xy(|x, y| (x - cx, y - cy))
}
