use std::sync::Arc;

use crate::db::Db;
use crate::notifier::Notifier;
use crate::services::ranking::RankingEngine;

/// Everything a handler needs, shared across workers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Db>,
    pub ranking: Arc<RankingEngine>,
    pub notifier: Arc<dyn Notifier>,
}

impl AppState {
    pub fn new(db: Db, ranking: RankingEngine, notifier: Arc<dyn Notifier>) -> Self {
        AppState {
            db: Arc::new(db),
            ranking: Arc::new(ranking),
            notifier,
        }
    }
}
