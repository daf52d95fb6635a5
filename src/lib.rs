pub mod cache;
pub mod calculations;
pub mod config;
pub mod error;
pub mod network;
pub mod types;
