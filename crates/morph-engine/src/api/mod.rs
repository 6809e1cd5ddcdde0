pub mod config;
pub mod engine;
pub mod subscriptions;
pub mod types;
