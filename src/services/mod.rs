pub mod correction;
pub mod events;
pub mod ranking;
pub mod records;
pub mod score;
pub mod submission;
