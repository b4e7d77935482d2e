//! Per-pose joint-angle tolerance table.

use crate::{landmarks::PoseLandmark, poses::normalize_pose_name};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Named angle measurement bound to a fixed joint triple (first, vertex, last)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    ElbowAngle,
    FrontKnee,
    HipAngle,
    BackAngle,
    BodyLine,
    BackLeg,
}

impl CheckKind {
    /// Landmarks measured by this check; the middle one is the vertex
    #[must_use]
    pub fn joints(self) -> (PoseLandmark, PoseLandmark, PoseLandmark) {
        use PoseLandmark::{LeftAnkle, LeftElbow, LeftHip, LeftKnee, LeftShoulder, LeftWrist};
        match self {
            CheckKind::ElbowAngle => (LeftShoulder, LeftElbow, LeftWrist),
            CheckKind::FrontKnee | CheckKind::BackLeg => (LeftHip, LeftKnee, LeftAnkle),
            CheckKind::HipAngle | CheckKind::BodyLine => (LeftShoulder, LeftHip, LeftAnkle),
            CheckKind::BackAngle => (LeftHip, LeftShoulder, LeftWrist),
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            CheckKind::ElbowAngle => "elbow_angle",
            CheckKind::FrontKnee => "front_knee",
            CheckKind::HipAngle => "hip_angle",
            CheckKind::BackAngle => "back_angle",
            CheckKind::BodyLine => "body_line",
            CheckKind::BackLeg => "back_leg",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepted angle range for one check, with the message shown when violated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceRule {
    pub check: CheckKind,
    pub low: f64,
    pub high: f64,
    pub message: String,
}

impl ToleranceRule {
    #[must_use]
    pub fn new(check: CheckKind, low: f64, high: f64, message: impl Into<String>) -> Self {
        Self {
            check,
            low,
            high,
            message: message.into(),
        }
    }

    /// Inclusive range test
    #[must_use]
    pub fn contains(&self, angle: f64) -> bool {
        (self.low..=self.high).contains(&angle)
    }

    /// Measured angles never exceed 180°, so a range written entirely as a
    /// reflex angle can never contain one. This mirrors such a range to
    /// `[360 - high, 360 - low]`; other ranges are returned unchanged.
    #[must_use]
    pub fn folded(mut self) -> Self {
        if self.low > 180.0 {
            let (low, high) = (360.0 - self.high, 360.0 - self.low);
            self.low = low;
            self.high = high;
        }
        self
    }
}

/// Pose name → ordered tolerance rules. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct AngleRuleTable {
    rules: HashMap<String, Vec<ToleranceRule>>,
}

impl AngleRuleTable {
    #[must_use]
    pub fn empty() -> Self {
        Self { rules: HashMap::new() }
    }

    /// Replace the rules for one pose; the name is normalized, ranges are kept as written
    pub fn insert(&mut self, pose: &str, rules: Vec<ToleranceRule>) {
        self.rules.insert(normalize_pose_name(pose), rules);
    }

    /// Mirror every reflex range with [`ToleranceRule::folded`]
    #[must_use]
    pub fn with_folded_reflex_ranges(mut self) -> Self {
        for rules in self.rules.values_mut() {
            for rule in rules.iter_mut() {
                *rule = rule.clone().folded();
            }
        }
        self
    }

    /// Rules for a pose in evaluation order; empty for unknown poses
    #[must_use]
    pub fn rules_for(&self, pose: &str) -> &[ToleranceRule] {
        self.rules
            .get(&normalize_pose_name(pose))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn contains_pose(&self, pose: &str) -> bool {
        self.rules.contains_key(&normalize_pose_name(pose))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for AngleRuleTable {
    fn default() -> Self {
        use CheckKind::{BackAngle, BackLeg, BodyLine, ElbowAngle, FrontKnee, HipAngle};

        let mut table = Self::empty();
        table.insert(
            "pranamasana",
            vec![ToleranceRule::new(ElbowAngle, 170.0, 190.0, "Keep arms straight together")],
        );
        table.insert(
            "hasta_utthanasana",
            vec![
                ToleranceRule::new(ElbowAngle, 170.0, 190.0, "Arms straight up"),
                ToleranceRule::new(BackAngle, 190.0, 230.0, "Arch back slightly"),
            ],
        );
        table.insert(
            "padahastasana",
            vec![ToleranceRule::new(HipAngle, 50.0, 100.0, "Bend forward fully")],
        );
        table.insert(
            "ashwa_sanchalanasana",
            vec![
                ToleranceRule::new(FrontKnee, 80.0, 100.0, "Bend front knee to ~90°"),
                ToleranceRule::new(BackLeg, 160.0, 190.0, "Keep back leg straight"),
            ],
        );
        table.insert(
            "kumbhakasana",
            vec![ToleranceRule::new(BodyLine, 160.0, 180.0, "Keep body straight like plank")],
        );
        table.insert(
            "ashtanga_namaskara",
            vec![ToleranceRule::new(ElbowAngle, 80.0, 110.0, "Bend elbows ~90°")],
        );
        table.insert(
            "bhujangasana",
            vec![
                ToleranceRule::new(BackAngle, 90.0, 120.0, "Lift chest higher"),
                ToleranceRule::new(ElbowAngle, 160.0, 190.0, "Keep arms straight"),
            ],
        );
        table.insert(
            "adho_mukh_svanasana",
            vec![ToleranceRule::new(HipAngle, 70.0, 110.0, "Push hips up to form inverted V")],
        );
        table
    }
}
