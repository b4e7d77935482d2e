//! Constants used throughout the library

/// Number of body landmarks produced by the estimator per frame
pub const NUM_POSE_LANDMARKS: usize = 33;

/// Values stored per landmark in the flattened feature vector (x, y, z, visibility)
pub const VALUES_PER_LANDMARK: usize = 4;

/// Length of the flattened classifier feature vector (33 landmarks × 4 values)
pub const FEATURE_VECTOR_LEN: usize = 132;

/// Consecutive identical predictions required before a label counts as stable
pub const DEFAULT_CONSISTENCY_FRAMES: u32 = 5;

/// Stable frames on the target pose required to advance
pub const DEFAULT_HOLD_FRAMES: u32 = 15;

/// Added to the angle denominator so degenerate rays never divide by zero
pub const ANGLE_EPSILON: f64 = 1e-12;

/// Plank override: minimum angle at both knees
pub const PLANK_MIN_KNEE_ANGLE: f64 = 165.0;

/// Plank override: minimum angle at both elbows
pub const PLANK_MIN_ELBOW_ANGLE: f64 = 150.0;

/// Eight-point override: inclusive elbow angle bounds
pub const EIGHT_POINT_ELBOW_MIN: f64 = 80.0;
pub const EIGHT_POINT_ELBOW_MAX: f64 = 100.0;

/// Eight-point override: knees must be bent below this angle
pub const EIGHT_POINT_MAX_KNEE_ANGLE: f64 = 120.0;

/// Confidence rescale: `min(FLOOR + GAIN * p_max, CAP)`
pub const CONFIDENCE_FLOOR: f32 = 0.6;
pub const CONFIDENCE_GAIN: f32 = 0.55;
pub const CONFIDENCE_CAP: f32 = 0.99;

/// Sessions untouched for this long are evicted from a registry
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 300;

/// Softmax temperature applied to reference distances
pub const REFERENCE_TEMPERATURE: f32 = 0.05;
