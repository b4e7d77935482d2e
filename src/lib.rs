//! Suryanamaskara pose sequencing and alignment feedback.
//!
//! This library guides a user through the Sun Salutation cycle from a stream
//! of body landmarks:
//! - Joint-angle geometry over the 33 MediaPipe pose landmarks
//! - A per-pose table of angle tolerances with correction messages
//! - Hard overrides for poses classifiers tend to confuse (plank, eight-point)
//! - A label-smoothing, hold-counting state machine that advances through
//!   the sequence
//!
//! The per-frame pipeline consists of:
//! 1. Pose classification (any [`classifier::PoseClassifier`])
//! 2. Rule overrides for the current target pose
//! 3. Label smoothing and hold counting
//! 4. Angle-based corrections for the predicted pose
//!
//! # Examples
//!
//! ## Driving a session with external labels
//!
//! ```no_run
//! use surya_namaskar_coach::{landmarks::LandmarkSet, sequence::SequenceSession};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut session = SequenceSession::default();
//!
//! // Landmarks and label come from the pose estimator and classifier
//! let features = vec![0.5_f32; 132];
//! let landmarks = LandmarkSet::from_features(&features)?;
//!
//! let feedback = session.process_frame("Pranamasana", Some(&landmarks));
//! for message in feedback.messages() {
//!     println!("{message}");
//! }
//! println!("Hold: {:.0}%", feedback.hold_progress * 100.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Corrections only
//!
//! ```no_run
//! use surya_namaskar_coach::{correction::CorrectionEngine, landmarks::LandmarkSet};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = CorrectionEngine::default();
//! let landmarks = LandmarkSet::from_features(&vec![0.5_f32; 132])?;
//!
//! for correction in engine.evaluate_detailed("bhujangasana", &landmarks) {
//!     println!("{}: {:.1}° not in {}-{}", correction.check, correction.angle, correction.low, correction.high);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Complete Pipeline Example
//!
//! ```no_run
//! use surya_namaskar_coach::{
//!     classifier::{ReferenceClassifier, ReferenceKeypoints},
//!     coach::PoseCoach,
//!     config::Config,
//!     replay::read_records,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_file("coach.yaml")?;
//! let references = ReferenceKeypoints::from_file("assets/reference_keypoints.yaml")?;
//! let classifier = ReferenceClassifier::new(&references)?;
//!
//! let mut coach = PoseCoach::new(classifier, config.create_session())
//!     .with_confidence_scale(config.confidence_scale());
//!
//! for record in read_records("session.jsonl")? {
//!     let landmarks = record.to_landmarks()?;
//!     let report = coach.process(landmarks.as_ref())?;
//!     println!("{} {:?}", report.alignment_status, report.feedback.target_pose);
//!     if report.feedback.completed {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Constants used throughout the library
pub mod constants;

/// Error types and result handling
pub mod error;

/// Pose landmark layout and the flattened feature vector
pub mod landmarks;

/// Joint-angle computation and coordinate normalization
pub mod geometry;

/// Asana catalog and pose sequences
pub mod poses;

/// Per-pose angle tolerance rules
pub mod rules;

/// Plank and eight-point label overrides
pub mod overrides;

/// Correction feedback from the rule table
pub mod correction;

/// Pose sequencing state machine
pub mod sequence;

/// Classifier interface and reference-keypoint classifier
pub mod classifier;

/// Classifier plus session per-frame pipeline
pub mod coach;

/// Concurrent per-user session registry
pub mod registry;

/// Configuration management
pub mod config;

/// Recorded frame streams
pub mod replay;

pub use error::{Error, Result};
