use std::fmt::Write;
use std::sync::Mutex;

use crate::db::Db;
use crate::error::AppError;
use crate::models::leaderboard::{LeaderboardEntry, LeaderboardSnapshot};
use crate::services::records;

pub const DEFAULT_LEADERBOARD_SIZE: i64 = 16;

/// Owns the last published leaderboard and decides when a new one is worth
/// publishing.
///
/// The snapshot lock is held for the whole of `refresh`, query included, so
/// two concurrent refreshes can neither both publish the same change nor
/// let an older computation overwrite a newer one.
pub struct RankingEngine {
    size: i64,
    published: Mutex<LeaderboardSnapshot>,
}

impl RankingEngine {
    pub fn new(size: i64) -> Self {
        RankingEngine {
            size: size.max(1),
            published: Mutex::new(LeaderboardSnapshot::default()),
        }
    }

    /// Recomputes the top entries and compares them, position by position,
    /// with the last published snapshot. Returns the new snapshot when it
    /// differs (or when `force` is set) and `None` otherwise. On a store
    /// error the held snapshot is left as it was.
    pub fn refresh(&self, db: &Db, force: bool) -> Result<Option<LeaderboardSnapshot>, AppError> {
        self.refresh_with(db, force, |_| {})
    }

    /// Like `refresh`, but runs `publish` on a changed snapshot before the
    /// lock is released. Posts therefore reach the channel in the same order
    /// the snapshots were taken, and an older table can never land after a
    /// newer one.
    pub fn refresh_with<F>(
        &self,
        db: &Db,
        force: bool,
        publish: F,
    ) -> Result<Option<LeaderboardSnapshot>, AppError>
    where
        F: FnOnce(&LeaderboardSnapshot),
    {
        let mut published = self
            .published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let best = db.with_conn(|conn| records::best_per_participant(conn, self.size))?;
        let current = LeaderboardSnapshot {
            entries: best.iter().map(LeaderboardEntry::from).collect(),
        };

        if !force && current == *published {
            tracing::debug!("Leaderboard unchanged ({} entries)", current.len());
            return Ok(None);
        }

        tracing::info!(
            "Leaderboard updated: {} entries (previously {}, forced: {})",
            current.len(),
            published.len(),
            force
        );
        *published = current.clone();
        publish(&current);
        Ok(Some(current))
    }

    /// The snapshot most recently returned by `refresh`.
    pub fn published(&self) -> LeaderboardSnapshot {
        self.published
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// Renders the snapshot as a markdown table.
pub fn format_table(snapshot: &LeaderboardSnapshot) -> String {
    let mut out = String::from(
        "## Leaderboard updated!\n\
         | Rank | Name | Level | Miss types | Speed | Accuracy | Score |\n\
         | --- | --- | --- | --- | --- | --- | --- |\n",
    );
    if snapshot.is_empty() {
        out.push_str("| - | (no records yet) | | | | | |\n");
        return out;
    }
    for (rank, entry) in snapshot.entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {:.3} | {:.2} |",
            rank + 1,
            entry.user_name,
            entry.level,
            entry.miss_type_count,
            entry.speed,
            entry.accuracy,
            entry.score
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::correction::FieldUpdate;
    use crate::models::record::NewRecord;
    use crate::services::score;

    /// With zero accuracy and no misses the derived score equals the speed.
    fn insert_with_score(db: &Db, name: &str, target: i64) -> i64 {
        let record = NewRecord {
            user_name: name.into(),
            level: 5,
            miss_type_count: 0,
            speed: target,
            accuracy: 0.0,
            score: score::derive(target, 0.0, 0),
        };
        db.with_conn(|conn| records::insert(conn, &record)).unwrap()
    }

    fn names(snapshot: &LeaderboardSnapshot) -> Vec<&str> {
        snapshot.entries.iter().map(|e| e.user_name.as_str()).collect()
    }

    #[test]
    fn test_empty_store() {
        let db = Db::open_in_memory().unwrap();
        let engine = RankingEngine::new(DEFAULT_LEADERBOARD_SIZE);

        assert!(engine.refresh(&db, false).unwrap().is_none());
        let forced = engine.refresh(&db, true).unwrap().unwrap();
        assert!(forced.is_empty());
    }

    #[test]
    fn test_change_detection_scenario() {
        let db = Db::open_in_memory().unwrap();
        let engine = RankingEngine::new(DEFAULT_LEADERBOARD_SIZE);
        insert_with_score(&db, "A", 100);
        insert_with_score(&db, "B", 90);

        let first = engine.refresh(&db, false).unwrap().unwrap();
        assert_eq!(names(&first), ["A", "B"]);
        assert_eq!(first.entries[0].score, 100.0);

        insert_with_score(&db, "C", 95);
        let second = engine.refresh(&db, false).unwrap().unwrap();
        assert_eq!(names(&second), ["A", "C", "B"]);

        assert!(engine.refresh(&db, false).unwrap().is_none());
        assert_eq!(engine.published(), second);
    }

    #[test]
    fn test_force_always_returns_snapshot() {
        let db = Db::open_in_memory().unwrap();
        let engine = RankingEngine::new(DEFAULT_LEADERBOARD_SIZE);
        insert_with_score(&db, "A", 100);

        assert!(engine.refresh(&db, false).unwrap().is_some());
        assert!(engine.refresh(&db, false).unwrap().is_none());
        let forced = engine.refresh(&db, true).unwrap().unwrap();
        assert_eq!(names(&forced), ["A"]);
    }

    #[test]
    fn test_reordering_counts_as_change() {
        let db = Db::open_in_memory().unwrap();
        let engine = RankingEngine::new(DEFAULT_LEADERBOARD_SIZE);
        insert_with_score(&db, "A", 100);
        let b = insert_with_score(&db, "B", 90);
        engine.refresh(&db, false).unwrap().unwrap();

        db.with_conn(|conn| records::update_score(conn, b, 150.0)).unwrap();
        let reordered = engine.refresh(&db, false).unwrap().unwrap();
        assert_eq!(names(&reordered), ["B", "A"]);
    }

    #[test]
    fn test_field_change_without_reorder_counts_as_change() {
        let db = Db::open_in_memory().unwrap();
        let engine = RankingEngine::new(DEFAULT_LEADERBOARD_SIZE);
        let a = insert_with_score(&db, "A", 100);
        engine.refresh(&db, false).unwrap().unwrap();

        db.with_conn(|conn| records::update_field(conn, a, &FieldUpdate::Level(4)))
            .unwrap();
        let changed = engine.refresh(&db, false).unwrap().unwrap();
        assert_eq!(changed.entries[0].level, 4);
    }

    #[test]
    fn test_lower_personal_score_is_not_a_change() {
        let db = Db::open_in_memory().unwrap();
        let engine = RankingEngine::new(DEFAULT_LEADERBOARD_SIZE);
        insert_with_score(&db, "A", 100);
        engine.refresh(&db, false).unwrap().unwrap();

        insert_with_score(&db, "A", 60);
        assert!(engine.refresh(&db, false).unwrap().is_none());
    }

    #[test]
    fn test_truncates_to_size() {
        let db = Db::open_in_memory().unwrap();
        let engine = RankingEngine::new(DEFAULT_LEADERBOARD_SIZE);
        for i in 0..20 {
            insert_with_score(&db, &format!("p{i}"), 100 + 2 * i);
        }
        let snapshot = engine.refresh(&db, false).unwrap().unwrap();
        assert_eq!(snapshot.len(), 16);

        // A newcomer below the cut leaves the visible table unchanged.
        insert_with_score(&db, "late", 2);
        assert!(engine.refresh(&db, false).unwrap().is_none());
    }

    #[test]
    fn test_concurrent_refresh_publishes_once() {
        use std::sync::Arc;
        use std::thread;

        let db = Arc::new(Db::open_in_memory().unwrap());
        let engine = Arc::new(RankingEngine::new(DEFAULT_LEADERBOARD_SIZE));
        insert_with_score(&db, "A", 100);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                let engine = engine.clone();
                thread::spawn(move || engine.refresh(&db, false).unwrap().is_some())
            })
            .collect();
        let published = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|changed| *changed)
            .count();
        assert_eq!(published, 1);
    }

    #[test]
    fn test_concurrent_publishes_arrive_in_snapshot_order() {
        use std::sync::Arc;
        use std::thread;

        let db = Arc::new(Db::open_in_memory().unwrap());
        let engine = Arc::new(RankingEngine::new(DEFAULT_LEADERBOARD_SIZE));
        let delivered = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = db.clone();
                let engine = engine.clone();
                let delivered = delivered.clone();
                thread::spawn(move || {
                    insert_with_score(&db, &format!("p{i}"), 100 + i);
                    engine
                        .refresh_with(&db, false, |snapshot| {
                            delivered.lock().unwrap().push(snapshot.clone());
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let delivered = delivered.lock().unwrap();
        assert!(!delivered.is_empty());
        // Every thread inserts a new participant before refreshing, so later
        // posts can only carry more rows.
        assert!(delivered.windows(2).all(|w| w[0].len() < w[1].len()));
        assert_eq!(delivered.last().unwrap(), &engine.published());
        assert_eq!(engine.published().len(), 8);
    }

    #[test]
    fn test_format_table() {
        let snapshot = LeaderboardSnapshot {
            entries: vec![LeaderboardEntry {
                user_name: "alice".into(),
                level: 5,
                miss_type_count: 3,
                speed: 320,
                accuracy: 0.9512,
                score: 612.25,
            }],
        };
        let table = format_table(&snapshot);
        assert!(table.contains("| 1 | alice | 5 | 3 | 320 | 0.951 | 612.25 |"));
        assert!(format_table(&LeaderboardSnapshot::default()).contains("no records yet"));
    }
}
