use crate::db::Db;
use crate::error::AppError;
use crate::models::record::{NewRecord, RawCandidate, Record};
use crate::services::{records, score};
use crate::validation;

/// Accepts a classifier candidate: validates it, normalizes accuracy,
/// derives the score and stores it. This is the only insert path, so every
/// stored score comes from `score::derive`.
pub fn submit(db: &Db, candidate: RawCandidate) -> Result<Record, AppError> {
    validation::validate_candidate(&candidate)?;
    let user_name = validation::validate_user_name(&candidate.user_name)?;
    let accuracy = validation::normalize_accuracy(candidate.accuracy)?;

    let new_record = NewRecord {
        user_name,
        level: candidate.level,
        miss_type_count: candidate.miss_type_count,
        speed: candidate.speed,
        accuracy,
        score: score::derive(candidate.speed, accuracy, candidate.miss_type_count),
    };

    let record = db.with_conn(|conn| {
        let id = records::insert(conn, &new_record)?;
        records::get_by_id(conn, id)
    })?;
    let record = record.ok_or_else(|| AppError::NotFound("Inserted record vanished".into()))?;

    tracing::info!(
        "Accepted record {} for {} (score {:.2})",
        record.id,
        record.user_name,
        record.score
    );
    Ok(record)
}

pub fn acceptance_message(record: &Record) -> String {
    format!(
        "Accepted the following result (record {}). Ask an operator to `!fix` it if anything is wrong.\nName: {}\nLevel: {}\nMiss types: {}\nSpeed: {}\nAccuracy: {:.3}\nScore: {:.2}",
        record.id,
        record.user_name,
        record.level,
        record.miss_type_count,
        record.speed,
        record.accuracy,
        record.score
    )
}
