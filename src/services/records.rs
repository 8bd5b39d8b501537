use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::correction::FieldUpdate;
use crate::models::record::{NewRecord, Record};

const RECORD_COLUMNS: &str =
    "id, user_name, level, miss_type_count, speed, accuracy, score, created_at";

fn record_from_row(row: &Row<'_>) -> Result<Record, rusqlite::Error> {
    Ok(Record {
        id: row.get(0)?,
        user_name: row.get(1)?,
        level: row.get(2)?,
        miss_type_count: row.get(3)?,
        speed: row.get(4)?,
        accuracy: row.get(5)?,
        score: row.get(6)?,
        created_at: row.get(7)?,
    })
}

/// Inserts a record and returns its id. The caller supplies an already
/// derived score; see `services::submission::submit`.
pub fn insert(conn: &Connection, record: &NewRecord) -> Result<i64, rusqlite::Error> {
    let created_at = Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    conn.execute(
        "INSERT INTO records (user_name, level, miss_type_count, speed, accuracy, score, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            record.user_name,
            record.level,
            record.miss_type_count,
            record.speed,
            record.accuracy,
            record.score,
            created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// One record per participant (their highest score, lowest id on ties),
/// ordered by score descending, at most `limit` rows.
pub fn best_per_participant(conn: &Connection, limit: i64) -> Result<Vec<Record>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "WITH ranked AS (
             SELECT id, user_name, level, miss_type_count, speed, accuracy, score, created_at,
                    ROW_NUMBER() OVER (PARTITION BY user_name ORDER BY score DESC, id ASC) AS rn
             FROM records
         )
         SELECT id, user_name, level, miss_type_count, speed, accuracy, score, created_at
         FROM ranked
         WHERE rn = 1
         ORDER BY score DESC, id ASC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map(params![limit], record_from_row)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

pub fn get_by_id(conn: &Connection, id: i64) -> Result<Option<Record>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {} FROM records WHERE id = ?1", RECORD_COLUMNS),
        params![id],
        record_from_row,
    )
    .optional()
}

/// Writes one correctable column. The score column is left untouched.
/// Returns `false` when no record has this id.
pub fn update_field(conn: &Connection, id: i64, update: &FieldUpdate) -> Result<bool, rusqlite::Error> {
    let changed = match update {
        FieldUpdate::UserName(name) => conn.execute(
            "UPDATE records SET user_name = ?1 WHERE id = ?2",
            params![name, id],
        )?,
        FieldUpdate::Level(level) => conn.execute(
            "UPDATE records SET level = ?1 WHERE id = ?2",
            params![level, id],
        )?,
        FieldUpdate::MissTypeCount(count) => conn.execute(
            "UPDATE records SET miss_type_count = ?1 WHERE id = ?2",
            params![count, id],
        )?,
        FieldUpdate::Speed(speed) => conn.execute(
            "UPDATE records SET speed = ?1 WHERE id = ?2",
            params![speed, id],
        )?,
        FieldUpdate::Accuracy(accuracy) => conn.execute(
            "UPDATE records SET accuracy = ?1 WHERE id = ?2",
            params![accuracy, id],
        )?,
    };
    Ok(changed > 0)
}

/// Returns `false` when no record has this id.
pub fn update_score(conn: &Connection, id: i64, score: f64) -> Result<bool, rusqlite::Error> {
    let changed = conn.execute(
        "UPDATE records SET score = ?1 WHERE id = ?2",
        params![score, id],
    )?;
    Ok(changed > 0)
}

pub fn count(conn: &Connection) -> Result<i64, rusqlite::Error> {
    conn.query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))
}
