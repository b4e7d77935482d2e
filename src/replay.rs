//! Recorded frame streams for offline replay.
//!
//! A recording is a JSON-lines file, one object per frame:
//!
//! ```text
//! {"label": "pranamasana", "landmarks": [[0.5, 0.2, 0.0, 0.99], ...]}
//! {"features": [0.5, 0.2, 0.0, 0.99, ...]}
//! {}
//! ```
//!
//! `landmarks` holds 33 `[x, y, z, visibility]` rows and `features` the same
//! values flattened. A frame with neither means no body was detected. When
//! `label` is missing the frame must be classified before it can be sequenced.

use crate::{
    landmarks::{Landmark, LandmarkSet},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// One recorded frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<[f32; 4]>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<f32>>,
}

impl FrameRecord {
    /// Landmarks carried by this frame, if any
    ///
    /// # Errors
    ///
    /// Returns an error if both forms are present or either has the wrong size
    pub fn to_landmarks(&self) -> Result<Option<LandmarkSet>> {
        match (&self.landmarks, &self.features) {
            (Some(_), Some(_)) => Err(Error::InvalidInput(
                "Frame has both landmarks and features".to_string(),
            )),
            (Some(rows), None) => {
                let set = LandmarkSet::new(rows.iter().copied().map(Landmark::from).collect())?;
                Ok(Some(set))
            }
            (None, Some(features)) => Ok(Some(LandmarkSet::from_features(features)?)),
            (None, None) => Ok(None),
        }
    }
}

/// Parse JSON-lines frames from a reader, skipping blank lines
///
/// # Errors
///
/// Returns an error naming the first line that cannot be read or parsed
pub fn parse_records<R: BufRead>(reader: R) -> Result<Vec<FrameRecord>> {
    let mut records = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| Error::Json { line: i + 1, source })?;
        records.push(record);
    }
    Ok(records)
}

/// Read a JSON-lines recording from disk
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a line fails to parse
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<FrameRecord>> {
    let file = std::fs::File::open(path)?;
    parse_records(std::io::BufReader::new(file))
}
