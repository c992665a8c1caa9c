pub mod aggregation;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod fetch;
pub mod loader;
pub mod output;
pub mod server;
