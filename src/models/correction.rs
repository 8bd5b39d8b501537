use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::record::Record;
use crate::validation;

/// The columns an operator may correct. `id`, `score` and `created_at` are
/// never correctable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectableField {
    UserName,
    Level,
    MissTypeCount,
    Speed,
    Accuracy,
}

impl CorrectableField {
    pub fn column(self) -> &'static str {
        match self {
            CorrectableField::UserName => "user_name",
            CorrectableField::Level => "level",
            CorrectableField::MissTypeCount => "miss_type_count",
            CorrectableField::Speed => "speed",
            CorrectableField::Accuracy => "accuracy",
        }
    }

    /// Parses `raw` into a typed update for this field. Accuracy is taken
    /// as already normalized (`0.0..=1.0`); names get the same trimming and
    /// length limit as at submission.
    pub fn parse_value(self, raw: &str) -> Result<FieldUpdate, AppError> {
        let raw = raw.trim();
        let invalid = || AppError::InvalidValue {
            field: self.column().to_string(),
            value: raw.to_string(),
        };

        match self {
            CorrectableField::UserName => validation::validate_user_name(raw)
                .map(FieldUpdate::UserName)
                .map_err(|_| invalid()),
            CorrectableField::Level => raw.parse().map(FieldUpdate::Level).map_err(|_| invalid()),
            CorrectableField::MissTypeCount => match raw.parse::<i64>() {
                Ok(n) if n >= 0 => Ok(FieldUpdate::MissTypeCount(n)),
                _ => Err(invalid()),
            },
            CorrectableField::Speed => match raw.parse::<i64>() {
                Ok(n) if n >= 0 => Ok(FieldUpdate::Speed(n)),
                _ => Err(invalid()),
            },
            CorrectableField::Accuracy => match raw.parse::<f64>() {
                Ok(a) if (0.0..=1.0).contains(&a) => Ok(FieldUpdate::Accuracy(a)),
                _ => Err(invalid()),
            },
        }
    }
}

impl FromStr for CorrectableField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "user_name" => Ok(CorrectableField::UserName),
            "level" => Ok(CorrectableField::Level),
            "miss_type_count" => Ok(CorrectableField::MissTypeCount),
            "speed" => Ok(CorrectableField::Speed),
            "accuracy" => Ok(CorrectableField::Accuracy),
            other => Err(AppError::InvalidField(other.to_string())),
        }
    }
}

impl fmt::Display for CorrectableField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A parsed, type-checked value for exactly one correctable column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    UserName(String),
    Level(i64),
    MissTypeCount(i64),
    Speed(i64),
    Accuracy(f64),
}

#[derive(Debug, Serialize)]
pub struct CorrectionResult {
    pub record: Record,
    pub message: String,
    pub leaderboard: Option<String>,
}
