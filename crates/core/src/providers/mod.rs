pub mod traits;

// External data sources
pub mod csv_feed;
pub mod gemini;
