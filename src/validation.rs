use crate::error::AppError;
use crate::models::record::RawCandidate;

/// Only level-5 results count toward the leaderboard.
pub const REQUIRED_LEVEL: i64 = 5;
const MAX_USER_NAME_LEN: usize = 64;

pub fn validate_level(level: i64) -> Result<(), AppError> {
    if level == REQUIRED_LEVEL {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Only level {} results are accepted (got level {})",
            REQUIRED_LEVEL, level
        )))
    }
}

pub fn validate_user_name(name: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(AppError::Validation("Participant name is missing".into()))
    } else {
        Ok(trimmed.chars().take(MAX_USER_NAME_LEN).collect())
    }
}

pub fn validate_counts(miss_type_count: i64, speed: i64) -> Result<(), AppError> {
    if miss_type_count < 0 {
        return Err(AppError::Validation("Miss-type count cannot be negative".into()));
    }
    if speed < 0 {
        return Err(AppError::Validation("Speed cannot be negative".into()));
    }
    Ok(())
}

/// Converts the classifier's percentage into a `0.0..=1.0` fraction.
pub fn normalize_accuracy(percent: f64) -> Result<f64, AppError> {
    if !(0.0..=100.0).contains(&percent) {
        return Err(AppError::Validation(format!(
            "Accuracy {} is outside 0-100",
            percent
        )));
    }
    if percent <= 1.0 {
        tracing::warn!(
            "Accuracy {} looks already normalized; dividing by 100 as the classifier contract states",
            percent
        );
    }
    Ok(percent / 100.0)
}

/// Level is checked first so that an off-level result is reported as such
/// even if other fields are odd.
pub fn validate_candidate(candidate: &RawCandidate) -> Result<(), AppError> {
    validate_level(candidate.level)?;
    validate_counts(candidate.miss_type_count, candidate.speed)?;
    Ok(())
}
