use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A stored performance sample. `score` is always derived from the other
/// numeric fields and is never taken from input.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: i64,
    pub user_name: String,
    pub level: i64,
    pub miss_type_count: i64,
    pub speed: i64,
    /// Normalized to `0.0..=1.0`.
    pub accuracy: f64,
    pub score: f64,
    pub created_at: String,
}

/// Fields for an insert. Built only by the submission path, right after the
/// score has been derived.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub user_name: String,
    pub level: i64,
    pub miss_type_count: i64,
    pub speed: i64,
    pub accuracy: f64,
    pub score: f64,
}

/// A candidate record as produced by the image classifier.
///
/// The classifier reports `accuracy` as a percentage in `0..=100`. It is
/// divided by 100 before storage; a classifier that starts returning an
/// already-normalized value would break that contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCandidate {
    pub user_name: String,
    pub level: i64,
    pub miss_type_count: i64,
    pub speed: i64,
    pub accuracy: f64,
}

impl RawCandidate {
    /// Decodes the classifier's JSON text. Empty output means the classifier
    /// found nothing.
    pub fn from_classifier_output(output: &str) -> Result<Self, AppError> {
        let trimmed = output.trim();
        if trimmed.is_empty() {
            return Err(AppError::ExternalService("classifier returned no data".into()));
        }
        serde_json::from_str(trimmed)
            .map_err(|e| AppError::ExternalService(format!("undecodable classifier output: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
pub struct SubmissionRequest {
    pub channel_id: String,
    /// `None` is the classifier's "no record" signal.
    pub candidate: Option<RawCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct ClassifierOutputRequest {
    pub channel_id: String,
    pub output: String,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResult {
    pub record: Record,
    pub message: String,
    /// Set when the submission changed the published leaderboard.
    pub leaderboard: Option<String>,
}
