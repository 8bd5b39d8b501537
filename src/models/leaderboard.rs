use serde::{Deserialize, Serialize};

use crate::models::record::Record;

/// One row of the leaderboard. Equality covers every displayed column, so
/// two snapshots compare equal only when nothing observable differs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub user_name: String,
    pub level: i64,
    pub miss_type_count: i64,
    pub speed: i64,
    pub accuracy: f64,
    pub score: f64,
}

impl From<&Record> for LeaderboardEntry {
    fn from(record: &Record) -> Self {
        LeaderboardEntry {
            user_name: record.user_name.clone(),
            level: record.level,
            miss_type_count: record.miss_type_count,
            speed: record.speed,
            accuracy: record.accuracy,
            score: record.score,
        }
    }
}

/// Best-per-participant ranking, score descending, at most one entry per
/// participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LeaderboardSnapshot {
    pub entries: Vec<LeaderboardEntry>,
}

impl LeaderboardSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<i64>,
}
