pub mod config;
pub mod http;
pub mod models;
pub mod progress;
pub mod remote;
pub mod repositories;
pub mod store;
