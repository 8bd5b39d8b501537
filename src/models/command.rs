use serde::{Deserialize, Serialize};

use crate::error::AppError;

const TOP_COMMAND: &str = "!top16";
const FIX_PREFIX: &str = "!fix";

/// An operator command posted as plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `!top16`: publish the leaderboard even if it has not changed.
    ShowLeaderboard,
    /// `!fix <id> <field> <value>`
    Fix {
        id: i64,
        field: String,
        value: String,
    },
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Result<Self, AppError> {
        let text = text.trim();
        if text == TOP_COMMAND {
            return Ok(Command::ShowLeaderboard);
        }

        let mut words = text.split_whitespace();
        if words.next() != Some(FIX_PREFIX) {
            return Ok(Command::Unknown);
        }

        let usage = || AppError::Validation("Usage: !fix <id> <field> <value>".into());
        let id = words.next().ok_or_else(usage)?;
        let field = words.next().ok_or_else(usage)?;
        // The value is the rest of the line so names with spaces survive.
        let value = words.collect::<Vec<_>>().join(" ");
        if value.is_empty() {
            return Err(usage());
        }

        let id = id
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("'{}' is not a record id", id)))?;

        Ok(Command::Fix {
            id,
            field: field.to_string(),
            value,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub channel_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub message: String,
}
