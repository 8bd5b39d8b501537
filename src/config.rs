use std::time::Duration;

use crate::services::ranking::DEFAULT_LEADERBOARD_SIZE;

/// Runtime settings, read from the environment.
///
/// - `DATABASE_PATH` (default `typing-leaderboard.db`)
/// - `HOST` / `PORT` (default `0.0.0.0:3001`)
/// - `DB_BUSY_TIMEOUT_MS`: how long a store call waits on a locked
///   database before failing (default 30000)
/// - `LEADERBOARD_SIZE` (default 16)
/// - `LOG_FORMAT`: `json` or `text` (default)
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub busy_timeout: Duration,
    pub leaderboard_size: i64,
    pub json_logs: bool,
    /// Values that failed to parse and fell back to defaults. Logged by
    /// `main` once tracing is initialized.
    pub warnings: Vec<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut warnings = Vec::new();
        let port = parse_or(&lookup, &mut warnings, "PORT", 3001);
        let busy_timeout_ms = parse_or(&lookup, &mut warnings, "DB_BUSY_TIMEOUT_MS", 30_000);
        let leaderboard_size =
            parse_or(&lookup, &mut warnings, "LEADERBOARD_SIZE", DEFAULT_LEADERBOARD_SIZE);

        Config {
            db_path: lookup("DATABASE_PATH").unwrap_or_else(|| "typing-leaderboard.db".into()),
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
            leaderboard_size: leaderboard_size.max(1),
            json_logs: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            warnings,
        }
    }
}

fn parse_or<F, T>(lookup: &F, warnings: &mut Vec<String>, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warnings.push(format!("Ignoring invalid {}={:?}, using {}", key, raw, default));
            default
        }),
        None => default,
    }
}
