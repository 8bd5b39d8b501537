pub mod command;
pub mod correction;
pub mod leaderboard;
pub mod record;
