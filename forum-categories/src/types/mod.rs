//! Core types for the category engine

mod category;
mod ids;
mod log;

// Re-export all types
pub use category::{Category, PublishState};
pub use ids::{CategoryId, LogEntryId, UserId};
pub use log::LogEntry;
