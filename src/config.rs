//! Configuration management for the pose coach

use crate::{
    coach::ConfidenceScale,
    correction::{CorrectionEngine, CorrectionOptions},
    geometry::ImageScale,
    poses::PoseSequence,
    registry::SessionTemplate,
    rules::{AngleRuleTable, ToleranceRule},
    sequence::{SequenceSession, SessionThresholds},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sequencing configuration
    pub session: SessionConfig,

    /// Correction feedback configuration
    pub corrections: CorrectionConfig,

    /// Classifier configuration
    pub classifier: ClassifierConfig,

    /// Multi-session registry configuration
    pub registry: RegistryConfig,
}

/// Pose sequence and hold thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Consecutive identical predictions before a label is stable
    pub consistency_frames: u32,

    /// Stable frames on the target before advancing
    pub hold_frames: u32,

    /// Apply plank / eight-point rule overrides
    pub rule_overrides: bool,

    /// Ordered target poses
    pub sequence: PoseSequence,
}

/// Correction feedback parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Append the measured angle to each message
    pub annotate_angles: bool,

    /// Landmarks below this visibility are treated as missing (0.0-1.0)
    pub min_visibility: f32,

    /// Frame width in pixels; angles are measured in normalized units when unset
    pub frame_width: Option<f64>,

    /// Frame height in pixels
    pub frame_height: Option<f64>,

    /// Per-pose rule replacements, keyed by pose name
    pub rules: BTreeMap<String, Vec<ToleranceRule>>,

    /// Mirror ranges written entirely above 180° into measurable angles
    pub fold_reflex_ranges: bool,
}

/// Classifier parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Path to reference keypoints (YAML)
    pub reference_keypoints: Option<PathBuf>,

    /// Confidence rescale floor
    pub confidence_floor: f32,

    /// Confidence rescale gain
    pub confidence_gain: f32,

    /// Confidence rescale cap
    pub confidence_cap: f32,
}

/// Session registry parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Seconds of inactivity before a session is evicted
    pub idle_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let thresholds = SessionThresholds::default();
        Self {
            consistency_frames: thresholds.consistency_frames,
            hold_frames: thresholds.hold_frames,
            rule_overrides: true,
            sequence: PoseSequence::suryanamaskara(),
        }
    }
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            annotate_angles: true,
            min_visibility: 0.0,
            frame_width: None,
            frame_height: None,
            rules: BTreeMap::new(),
            fold_reflex_ranges: false,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        let scale = ConfidenceScale::default();
        Self {
            reference_keypoints: None,
            confidence_floor: scale.floor,
            confidence_gain: scale.gain,
            confidence_cap: scale.cap,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: crate::constants::DEFAULT_SESSION_IDLE_SECS,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        serde_yaml::from_str(&content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid setting
    pub fn validate(&self) -> Result<()> {
        self.thresholds().validate()?;

        if !(0.0..=1.0).contains(&self.corrections.min_visibility) {
            return Err(Error::ConfigError(
                "Minimum visibility must be between 0.0 and 1.0".to_string(),
            ));
        }
        match (self.corrections.frame_width, self.corrections.frame_height) {
            (Some(w), Some(h)) if w <= 0.0 || h <= 0.0 => {
                return Err(Error::ConfigError("Frame size must be positive".to_string()));
            }
            (Some(_), None) | (None, Some(_)) => {
                return Err(Error::ConfigError(
                    "Frame width and height must be set together".to_string(),
                ));
            }
            _ => {}
        }
        for (pose, rules) in &self.corrections.rules {
            for rule in rules {
                if rule.low > rule.high {
                    return Err(Error::ConfigError(format!(
                        "Rule {} for {pose} has low {} above high {}",
                        rule.check, rule.low, rule.high
                    )));
                }
            }
        }

        let c = &self.classifier;
        if !(0.0..=1.0).contains(&c.confidence_floor) || !(0.0..=1.0).contains(&c.confidence_cap) {
            return Err(Error::ConfigError(
                "Confidence floor and cap must be between 0.0 and 1.0".to_string(),
            ));
        }
        if c.confidence_floor > c.confidence_cap {
            return Err(Error::ConfigError(
                "Confidence floor must not exceed the cap".to_string(),
            ));
        }
        if let Some(path) = &c.reference_keypoints {
            if !path.exists() {
                return Err(Error::ConfigError(format!(
                    "Reference keypoints not found: {}",
                    path.display()
                )));
            }
        }

        if self.registry.idle_timeout_secs == 0 {
            return Err(Error::ConfigError(
                "Idle timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    #[must_use]
    pub fn thresholds(&self) -> SessionThresholds {
        SessionThresholds {
            consistency_frames: self.session.consistency_frames,
            hold_frames: self.session.hold_frames,
        }
    }

    /// Built-in rule table with configured replacements applied
    #[must_use]
    pub fn rule_table(&self) -> AngleRuleTable {
        let mut table = AngleRuleTable::default();
        for (pose, rules) in &self.corrections.rules {
            table.insert(pose, rules.clone());
        }
        if self.corrections.fold_reflex_ranges {
            table.with_folded_reflex_ranges()
        } else {
            table
        }
    }

    #[must_use]
    pub fn correction_options(&self) -> CorrectionOptions {
        let scale = match (self.corrections.frame_width, self.corrections.frame_height) {
            (Some(w), Some(h)) => ImageScale::new(w, h),
            _ => ImageScale::default(),
        };
        CorrectionOptions {
            annotate_angles: self.corrections.annotate_angles,
            min_visibility: self.corrections.min_visibility,
            scale,
        }
    }

    #[must_use]
    pub fn correction_engine(&self) -> CorrectionEngine {
        CorrectionEngine::new(Arc::new(self.rule_table()), self.correction_options())
    }

    #[must_use]
    pub fn confidence_scale(&self) -> ConfidenceScale {
        ConfidenceScale {
            floor: self.classifier.confidence_floor,
            gain: self.classifier.confidence_gain,
            cap: self.classifier.confidence_cap,
        }
    }

    #[must_use]
    pub fn session_template(&self) -> SessionTemplate {
        SessionTemplate {
            sequence: self.session.sequence.clone(),
            thresholds: self.thresholds(),
            corrections: self.correction_engine(),
            rule_overrides: self.session.rule_overrides,
        }
    }

    /// A new session over the configured sequence
    #[must_use]
    pub fn create_session(&self) -> SequenceSession {
        self.session_template().build()
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.registry.idle_timeout_secs)
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Suryanamaskara Pose Coach Configuration

# Sequencing
session:
  consistency_frames: 5
  hold_frames: 15
  rule_overrides: true
  sequence:
    - pranamasana
    - hasta_utthanasana
    - padahastasana
    - ashwa_sanchalanasana
    - kumbhakasana
    - ashtanga_namaskara
    - bhujangasana
    - adho_mukh_svanasana
    - ashwa_sanchalanasana
    - padahastasana
    - hasta_utthanasana
    - pranamasana

# Correction feedback
corrections:
  annotate_angles: true
  min_visibility: 0.0
  # frame_width: 640
  # frame_height: 480
  fold_reflex_ranges: false
  rules: {}
  # rules:
  #   kumbhakasana:
  #     - check: body_line
  #       low: 165
  #       high: 180
  #       message: "Keep body straight like plank"

# Classifier
classifier:
  # reference_keypoints: "assets/reference_keypoints.yaml"
  confidence_floor: 0.6
  confidence_gain: 0.55
  confidence_cap: 0.99

# Session registry
registry:
  idle_timeout_secs: 300
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_config_parses() {
        let config: Config = serde_yaml::from_str(EXAMPLE_CONFIG).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.session.sequence, PoseSequence::suryanamaskara());
        assert_eq!(config.thresholds(), SessionThresholds::default());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("session:\n  hold_frames: 30\n").unwrap();
        assert_eq!(config.session.hold_frames, 30);
        assert_eq!(config.session.consistency_frames, 5);
        assert_eq!(config.session.sequence.len(), 12);
        assert!(config.corrections.annotate_angles);
    }

    #[test]
    fn test_unknown_pose_in_sequence_rejected() {
        let result: std::result::Result<Config, _> = serde_yaml::from_str("session:\n  sequence: [tadasana]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = Config::default();
        config.session.hold_frames = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.corrections.min_visibility = 1.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.corrections.frame_width = Some(640.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.classifier.confidence_floor = 0.995;
        assert!(config.validate().is_err());
    }
}
