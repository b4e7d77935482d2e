//! Angle-based alignment corrections for a classified pose.

use crate::{
    geometry::{angle, ImageScale},
    landmarks::LandmarkSet,
    rules::{AngleRuleTable, CheckKind, ToleranceRule},
    Result,
};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Options controlling how corrections are measured and worded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionOptions {
    /// Append the measured angle to each message
    pub annotate_angles: bool,
    /// Landmarks below this visibility are treated as missing
    pub min_visibility: f32,
    /// Scaling applied before measuring angles
    pub scale: ImageScale,
}

impl Default for CorrectionOptions {
    fn default() -> Self {
        Self {
            annotate_angles: true,
            min_visibility: 0.0,
            scale: ImageScale::default(),
        }
    }
}

/// A single violated tolerance rule
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correction {
    pub check: CheckKind,
    /// Measured angle in degrees
    pub angle: f64,
    pub low: f64,
    pub high: f64,
    /// Message as it should be shown to the user
    pub message: String,
}

impl fmt::Display for Correction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Evaluates the rule table against a landmark set
#[derive(Debug, Clone)]
pub struct CorrectionEngine {
    table: Arc<AngleRuleTable>,
    options: CorrectionOptions,
}

impl Default for CorrectionEngine {
    fn default() -> Self {
        Self::new(Arc::new(AngleRuleTable::default()), CorrectionOptions::default())
    }
}

impl CorrectionEngine {
    #[must_use]
    pub fn new(table: Arc<AngleRuleTable>, options: CorrectionOptions) -> Self {
        Self { table, options }
    }

    #[must_use]
    pub fn options(&self) -> &CorrectionOptions {
        &self.options
    }

    #[must_use]
    pub fn table(&self) -> &AngleRuleTable {
        &self.table
    }

    /// Correction messages for `pose_name`, in table order
    #[must_use]
    pub fn evaluate(&self, pose_name: &str, landmarks: &LandmarkSet) -> Vec<String> {
        self.evaluate_detailed(pose_name, landmarks)
            .into_iter()
            .map(|c| c.message)
            .collect()
    }

    /// Like [`evaluate`](Self::evaluate) but keeps the measured angle and range.
    ///
    /// Unknown poses produce no corrections. A check whose landmarks cannot be
    /// resolved is skipped without affecting the others.
    #[must_use]
    pub fn evaluate_detailed(&self, pose_name: &str, landmarks: &LandmarkSet) -> Vec<Correction> {
        self.table
            .rules_for(pose_name)
            .iter()
            .filter_map(|rule| match self.measure(rule.check, landmarks) {
                Ok(measured) if rule.contains(measured) => None,
                Ok(measured) => Some(self.correction(rule, measured)),
                Err(e) => {
                    debug!("Skipping {} for {}: {}", rule.check, pose_name, e);
                    None
                }
            })
            .collect()
    }

    /// Angle in degrees for one check
    ///
    /// # Errors
    ///
    /// Returns an error if one of the check's landmarks is unavailable
    pub fn measure(&self, check: CheckKind, landmarks: &LandmarkSet) -> Result<f64> {
        let (first, vertex, last) = check.joints();
        let CorrectionOptions {
            min_visibility, scale, ..
        } = self.options;
        let a = landmarks.point(first, min_visibility, scale)?;
        let b = landmarks.point(vertex, min_visibility, scale)?;
        let c = landmarks.point(last, min_visibility, scale)?;
        Ok(angle(a, b, c))
    }

    fn correction(&self, rule: &ToleranceRule, measured: f64) -> Correction {
        let message = if self.options.annotate_angles {
            format!("{} (angle: {}°)", rule.message, measured.round())
        } else {
            rule.message.clone()
        };
        Correction {
            check: rule.check,
            angle: measured,
            low: rule.low,
            high: rule.high,
            message,
        }
    }
}
