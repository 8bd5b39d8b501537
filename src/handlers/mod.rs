pub mod commands;
pub mod leaderboard;
pub mod records;
