pub mod analytics;
pub mod encoder;
pub mod export;
pub mod types;
