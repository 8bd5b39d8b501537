use crate::error::AppError;
use crate::models::leaderboard::{LeaderboardEntry, LeaderboardQuery};
use crate::services::ranking::DEFAULT_LEADERBOARD_SIZE;
use crate::services::records;
use crate::state::AppState;
use ntex::web::{self, HttpResponse};

/// Current best-per-participant standings. Read-only: the published
/// snapshot is not touched, so this never suppresses or triggers a post.
pub async fn get_leaderboard(
    state: web::types::State<AppState>,
    query: web::types::Query<LeaderboardQuery>,
) -> Result<HttpResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_SIZE).clamp(1, 100);
    let best = state
        .db
        .with_conn(|conn| records::best_per_participant(conn, limit))?;
    let entries: Vec<LeaderboardEntry> = best.iter().map(LeaderboardEntry::from).collect();
    Ok(HttpResponse::Ok().json(&entries))
}
