pub mod analytics;
pub mod etf;
pub mod holding;
pub mod schedule;
pub mod settings;
pub mod transaction;
