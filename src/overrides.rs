//! Hard angle-based overrides for poses the classifier tends to confuse.
//!
//! An override only fires when its pose is the session's current target, so
//! a user who is not attempting that pose never gets relabelled.

use crate::{
    constants::{
        EIGHT_POINT_ELBOW_MAX, EIGHT_POINT_ELBOW_MIN, EIGHT_POINT_MAX_KNEE_ANGLE, PLANK_MIN_ELBOW_ANGLE,
        PLANK_MIN_KNEE_ANGLE,
    },
    geometry::{angle, ImageScale},
    landmarks::{LandmarkSet, PoseLandmark},
    poses::{normalize_pose_name, YogaPose},
    Result,
};
use log::debug;

/// Joint angles and body levels used by the override predicates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyAngles {
    pub left_knee: f64,
    pub right_knee: f64,
    pub left_elbow: f64,
    pub right_elbow: f64,
    /// Mean y of both hips (larger is lower in the image)
    pub hip_level: f64,
    /// Mean y of both shoulders
    pub shoulder_level: f64,
}

impl BodyAngles {
    /// Measure both knees, both elbows and the hip/shoulder levels
    ///
    /// # Errors
    ///
    /// Returns an error if any of the twelve limb landmarks is unavailable
    pub fn compute(landmarks: &LandmarkSet, min_visibility: f32, scale: ImageScale) -> Result<Self> {
        use PoseLandmark::{
            LeftAnkle, LeftElbow, LeftHip, LeftKnee, LeftShoulder, LeftWrist, RightAnkle, RightElbow, RightHip,
            RightKnee, RightShoulder, RightWrist,
        };
        let p = |lm| landmarks.point(lm, min_visibility, scale);

        let (l_hip, r_hip) = (p(LeftHip)?, p(RightHip)?);
        let (l_knee, r_knee) = (p(LeftKnee)?, p(RightKnee)?);
        let (l_ankle, r_ankle) = (p(LeftAnkle)?, p(RightAnkle)?);
        let (l_sh, r_sh) = (p(LeftShoulder)?, p(RightShoulder)?);
        let (l_elb, r_elb) = (p(LeftElbow)?, p(RightElbow)?);
        let (l_wr, r_wr) = (p(LeftWrist)?, p(RightWrist)?);

        Ok(Self {
            left_knee: angle(l_hip, l_knee, l_ankle),
            right_knee: angle(r_hip, r_knee, r_ankle),
            left_elbow: angle(l_sh, l_elb, l_wr),
            right_elbow: angle(r_sh, r_elb, r_wr),
            hip_level: (l_hip.y + r_hip.y) / 2.0,
            shoulder_level: (l_sh.y + r_sh.y) / 2.0,
        })
    }
}

/// Legs and arms both straight
#[must_use]
pub fn plank_override(a: &BodyAngles) -> bool {
    a.left_knee >= PLANK_MIN_KNEE_ANGLE
        && a.right_knee >= PLANK_MIN_KNEE_ANGLE
        && a.left_elbow >= PLANK_MIN_ELBOW_ANGLE
        && a.right_elbow >= PLANK_MIN_ELBOW_ANGLE
}

/// Elbows near 90°, hips below shoulders, knees bent
#[must_use]
pub fn eight_point_override(a: &BodyAngles) -> bool {
    let elbow_range = EIGHT_POINT_ELBOW_MIN..=EIGHT_POINT_ELBOW_MAX;
    let elbows_ok = elbow_range.contains(&a.left_elbow) && elbow_range.contains(&a.right_elbow);
    let hips_low = a.hip_level > a.shoulder_level;
    let knees_bent = a.left_knee < EIGHT_POINT_MAX_KNEE_ANGLE && a.right_knee < EIGHT_POINT_MAX_KNEE_ANGLE;
    elbows_ok && hips_low && knees_bent
}

/// Outcome of override evaluation for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideDecision {
    /// Normalized label to feed into the state machine
    pub label: String,
    /// Pose forced by a rule, if one fired
    pub forced: Option<YogaPose>,
}

/// Apply at most one override for the active `target`.
///
/// The returned label is always normalized. Missing landmarks simply leave
/// the classifier's label untouched.
#[must_use]
pub fn apply_overrides(
    target: YogaPose,
    raw_label: &str,
    landmarks: &LandmarkSet,
    min_visibility: f32,
    scale: ImageScale,
) -> OverrideDecision {
    let label = normalize_pose_name(raw_label);
    let predicate: fn(&BodyAngles) -> bool = match target {
        YogaPose::Kumbhakasana => plank_override,
        YogaPose::AshtangaNamaskara => eight_point_override,
        _ => return OverrideDecision { label, forced: None },
    };

    let angles = match BodyAngles::compute(landmarks, min_visibility, scale) {
        Ok(angles) => angles,
        Err(e) => {
            debug!("Override for {} skipped: {}", target.name(), e);
            return OverrideDecision { label, forced: None };
        }
    };

    if predicate(&angles) && label != target.name() {
        debug!("Override: {} relabelled as {}", label, target.name());
        OverrideDecision {
            label: target.name().to_string(),
            forced: Some(target),
        }
    } else {
        OverrideDecision { label, forced: None }
    }
}
