//! Asana catalog and pose sequences.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalize a classifier label: trim, lowercase, spaces to underscores
#[must_use]
pub fn normalize_pose_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// The distinct asanas of the Suryanamaskara cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YogaPose {
    Pranamasana,
    HastaUtthanasana,
    Padahastasana,
    AshwaSanchalanasana,
    Kumbhakasana,
    AshtangaNamaskara,
    Bhujangasana,
    AdhoMukhSvanasana,
}

impl YogaPose {
    pub const ALL: [YogaPose; 8] = [
        YogaPose::Pranamasana,
        YogaPose::HastaUtthanasana,
        YogaPose::Padahastasana,
        YogaPose::AshwaSanchalanasana,
        YogaPose::Kumbhakasana,
        YogaPose::AshtangaNamaskara,
        YogaPose::Bhujangasana,
        YogaPose::AdhoMukhSvanasana,
    ];

    /// Normalized name, as compared against classifier output
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            YogaPose::Pranamasana => "pranamasana",
            YogaPose::HastaUtthanasana => "hasta_utthanasana",
            YogaPose::Padahastasana => "padahastasana",
            YogaPose::AshwaSanchalanasana => "ashwa_sanchalanasana",
            YogaPose::Kumbhakasana => "kumbhakasana",
            YogaPose::AshtangaNamaskara => "ashtanga_namaskara",
            YogaPose::Bhujangasana => "bhujangasana",
            YogaPose::AdhoMukhSvanasana => "adho_mukh_svanasana",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            YogaPose::Pranamasana => "Pranamasana",
            YogaPose::HastaUtthanasana => "Hasta Utthanasana",
            YogaPose::Padahastasana => "Padahastasana",
            YogaPose::AshwaSanchalanasana => "Ashwa Sanchalanasana",
            YogaPose::Kumbhakasana => "Kumbhakasana",
            YogaPose::AshtangaNamaskara => "Ashtanga Namaskara",
            YogaPose::Bhujangasana => "Bhujangasana",
            YogaPose::AdhoMukhSvanasana => "Adho Mukh Svanasana",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            YogaPose::Pranamasana => "Prayer Pose - Stand with palms together at chest",
            YogaPose::HastaUtthanasana => "Raised Arms - Arms up, arch back slightly",
            YogaPose::Padahastasana => "Forward Bend - Touch toes, bend forward",
            YogaPose::AshwaSanchalanasana => "Lunge - One leg back, knee down",
            YogaPose::Kumbhakasana => "Plank - Straight body like a plank",
            YogaPose::AshtangaNamaskara => "Eight Point Pose - Chest and knees down",
            YogaPose::Bhujangasana => "Cobra - Chest up, arms straight",
            YogaPose::AdhoMukhSvanasana => "Downward Dog - Inverted V shape",
        }
    }

    /// General cues shown when no angle-specific correction applies
    #[must_use]
    pub fn tips(self) -> &'static [&'static str] {
        match self {
            YogaPose::Pranamasana => &[
                "Keep your palms together at chest level",
                "Stand straight with feet together",
                "Relax your shoulders",
            ],
            YogaPose::HastaUtthanasana => &[
                "Raise arms straight up",
                "Arch your back slightly",
                "Look up at your hands",
            ],
            YogaPose::Padahastasana => &[
                "Bend forward from the hips",
                "Try to touch your toes",
                "Keep your legs straight",
            ],
            YogaPose::AshwaSanchalanasana => &[
                "Step one leg back",
                "Keep front knee at 90 degrees",
                "Look up and arch your back",
            ],
            YogaPose::Kumbhakasana => &[
                "Keep body straight like a plank",
                "Don't let hips sag",
                "Engage your core",
            ],
            YogaPose::AshtangaNamaskara => &[
                "Lower chest and knees to ground",
                "Keep hips raised",
                "Chin should touch the ground",
            ],
            YogaPose::Bhujangasana => &["Lift chest up", "Keep elbows slightly bent", "Look upward"],
            YogaPose::AdhoMukhSvanasana => &[
                "Form an inverted V shape",
                "Push hips up and back",
                "Keep heels down",
            ],
        }
    }

    /// Match any label whose normalized form equals a known pose name
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = normalize_pose_name(label);
        Self::ALL.into_iter().find(|p| p.name() == normalized)
    }
}

impl fmt::Display for YogaPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for YogaPose {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| Error::UnknownPose(s.to_string()))
    }
}

/// Ordered list of target poses for one guided session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<YogaPose>", into = "Vec<YogaPose>")]
pub struct PoseSequence {
    poses: Vec<YogaPose>,
}

impl PoseSequence {
    /// # Errors
    ///
    /// Returns an error if `poses` is empty
    pub fn new(poses: Vec<YogaPose>) -> Result<Self> {
        if poses.is_empty() {
            return Err(Error::InvalidInput("Pose sequence must not be empty".to_string()));
        }
        Ok(Self { poses })
    }

    /// The full 12-step cycle: forward through the eight asanas, then back
    #[must_use]
    pub fn suryanamaskara() -> Self {
        Self {
            poses: vec![
                YogaPose::Pranamasana,
                YogaPose::HastaUtthanasana,
                YogaPose::Padahastasana,
                YogaPose::AshwaSanchalanasana,
                YogaPose::Kumbhakasana,
                YogaPose::AshtangaNamaskara,
                YogaPose::Bhujangasana,
                YogaPose::AdhoMukhSvanasana,
                YogaPose::AshwaSanchalanasana,
                YogaPose::Padahastasana,
                YogaPose::HastaUtthanasana,
                YogaPose::Pranamasana,
            ],
        }
    }

    /// Practise one pose on its own
    #[must_use]
    pub fn single(pose: YogaPose) -> Self {
        Self { poses: vec![pose] }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<YogaPose> {
        self.poses.get(index).copied()
    }

    #[must_use]
    pub fn poses(&self) -> &[YogaPose] {
        &self.poses
    }
}

impl Default for PoseSequence {
    fn default() -> Self {
        Self::suryanamaskara()
    }
}

impl TryFrom<Vec<YogaPose>> for PoseSequence {
    type Error = Error;

    fn try_from(poses: Vec<YogaPose>) -> Result<Self> {
        Self::new(poses)
    }
}

impl From<PoseSequence> for Vec<YogaPose> {
    fn from(seq: PoseSequence) -> Self {
        seq.poses
    }
}
