use crate::db::Db;
use crate::error::AppError;
use crate::models::correction::CorrectableField;
use crate::models::record::Record;
use crate::services::{records, score};

/// Applies an operator correction to one field of one record and re-derives
/// its score.
///
/// The field name and value are parsed before the store is touched. The
/// field write, re-read and score write share one transaction, so no reader
/// ever sees the new field next to the old score. Level is not re-checked
/// against the submission rule.
pub fn correct(db: &Db, id: i64, field_name: &str, raw_value: &str) -> Result<Record, AppError> {
    let field: CorrectableField = field_name.parse()?;
    let update = field.parse_value(raw_value)?;

    let record = db.with_tx(|tx| -> Result<Record, AppError> {
        if !records::update_field(tx, id, &update)? {
            return Err(AppError::NotFound(format!("Record {} does not exist", id)));
        }
        let mut record = records::get_by_id(tx, id)?
            .ok_or_else(|| AppError::NotFound(format!("Record {} does not exist", id)))?;
        record.score = score::derive(record.speed, record.accuracy, record.miss_type_count);
        records::update_score(tx, id, record.score)?;
        Ok(record)
    })?;

    tracing::info!(
        "Corrected record {}: {} = {} (score now {:.2})",
        id,
        field,
        raw_value.trim(),
        record.score
    );
    Ok(record)
}

pub fn confirmation_message(record: &Record, field: &str) -> String {
    format!(
        "Updated {} of record {}.\nName: {}\nLevel: {}\nMiss types: {}\nSpeed: {}\nAccuracy: {:.3}\nScore: {:.2}",
        field.trim(),
        record.id,
        record.user_name,
        record.level,
        record.miss_type_count,
        record.speed,
        record.accuracy,
        record.score
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::NewRecord;

    fn seed(db: &Db, name: &str, speed: i64, accuracy: f64, misses: i64) -> i64 {
        let record = NewRecord {
            user_name: name.into(),
            level: 5,
            miss_type_count: misses,
            speed,
            accuracy,
            score: score::derive(speed, accuracy, misses),
        };
        db.with_conn(|conn| records::insert(conn, &record)).unwrap()
    }

    fn stored(db: &Db, id: i64) -> Record {
        db.with_conn(|conn| records::get_by_id(conn, id)).unwrap().unwrap()
    }

    #[test]
    fn test_accuracy_correction_rederives_score() {
        let db = Db::open_in_memory().unwrap();
        let id = seed(&db, "alice", 50, 0.9, 2);

        let corrected = correct(&db, id, "accuracy", "0.75").unwrap();
        let expected = ((50.0 * 0.75 - 2.0) * 0.75) + 50.0;
        assert_eq!(corrected.accuracy, 0.75);
        assert_eq!(corrected.score, expected);

        let row = stored(&db, id);
        assert_eq!(row.accuracy, 0.75);
        assert_eq!(row.score, expected);
    }

    #[test]
    fn test_every_field_keeps_score_consistent() {
        let db = Db::open_in_memory().unwrap();
        let id = seed(&db, "bob", 300, 0.95, 4);

        for (field, value) in [("speed", "320"), ("miss_type_count", "1"), ("level", "4"), ("user_name", "robert")] {
            correct(&db, id, field, value).unwrap();
            let row = stored(&db, id);
            assert_eq!(row.score, score::derive(row.speed, row.accuracy, row.miss_type_count));
        }

        let row = stored(&db, id);
        assert_eq!(row.user_name, "robert");
        assert_eq!(row.level, 4);
        assert_eq!(row.speed, 320);
        assert_eq!(row.miss_type_count, 1);
    }

    #[test]
    fn test_unknown_field_rejected_without_write() {
        let db = Db::open_in_memory().unwrap();
        let id = seed(&db, "carol", 100, 0.5, 0);
        let before = stored(&db, id);

        for field in ["score", "id", "created_at", "speeed"] {
            let err = correct(&db, id, field, "1").unwrap_err();
            assert!(matches!(err, AppError::InvalidField(_)));
        }
        assert_eq!(stored(&db, id), before);
    }

    #[test]
    fn test_bad_value_rejected_without_write() {
        let db = Db::open_in_memory().unwrap();
        let id = seed(&db, "dave", 100, 0.5, 0);
        let before = stored(&db, id);

        let err = correct(&db, id, "speed", "fast").unwrap_err();
        assert!(matches!(err, AppError::InvalidValue { .. }));
        let err = correct(&db, id, "accuracy", "1.5").unwrap_err();
        assert!(matches!(err, AppError::InvalidValue { .. }));
        assert_eq!(stored(&db, id), before);
    }

    #[test]
    fn test_missing_record() {
        let db = Db::open_in_memory().unwrap();
        let err = correct(&db, 77, "speed", "100").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(db.with_conn(records::count).unwrap(), 0);
    }

    #[test]
    fn test_failed_score_write_rolls_back_field() {
        let db = Db::open_in_memory().unwrap();
        let id = seed(&db, "frank", 50, 0.9, 2);
        let before = stored(&db, id);
        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_score BEFORE UPDATE OF score ON records
                 BEGIN SELECT RAISE(ABORT, 'score write refused'); END;",
            )
        })
        .unwrap();

        let err = correct(&db, id, "speed", "400").unwrap_err();
        assert!(matches!(err, AppError::Db(_)));

        let after = stored(&db, id);
        assert_eq!(after.speed, 50);
        assert_eq!(after, before);
    }

    #[test]
    fn test_corrected_name_is_normalized() {
        let db = Db::open_in_memory().unwrap();
        let id = seed(&db, "gina", 50, 0.9, 2);
        let long = format!("  {}  ", "g".repeat(100));

        let record = correct(&db, id, "user_name", &long).unwrap();
        assert_eq!(record.user_name, "g".repeat(64));
        assert_eq!(stored(&db, id).user_name, "g".repeat(64));
    }

    #[test]
    fn test_confirmation_lists_fields() {
        let db = Db::open_in_memory().unwrap();
        let id = seed(&db, "erin", 50, 0.9, 2);
        let record = correct(&db, id, "accuracy", "0.75").unwrap();
        let message = confirmation_message(&record, "accuracy");
        assert!(message.contains("Accuracy: 0.750"));
        assert!(message.contains(&format!("record {}", id)));
    }
}
