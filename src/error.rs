//! Error types for the pose coaching library.

use crate::landmarks::PoseLandmark;
use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Flattened feature vector has the wrong shape
    #[error("Invalid feature vector: expected {expected} values, got {actual}")]
    InvalidFeatureVector {
        /// Number of values the classifier contract requires
        expected: usize,
        /// Number of values actually supplied
        actual: usize,
    },

    /// A landmark needed for a check is missing or too uncertain to use
    #[error("Landmark {landmark} unavailable: {reason}")]
    LandmarkUnavailable {
        /// The landmark that could not be resolved
        landmark: PoseLandmark,
        /// Why it was rejected
        reason: String,
    },

    /// Pose name that is not part of the known catalog
    #[error("Unknown pose: {0}")]
    UnknownPose(String),

    /// Classifier could not produce a prediction
    #[error("Classifier error: {0}")]
    ClassifierError(String),

    /// Session lookup or locking failed
    #[error("Session error: {0}")]
    SessionError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML (de)serialization failed
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A JSON line in a recording failed to parse
    #[error("JSON error on line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
