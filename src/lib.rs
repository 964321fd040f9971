//! rollcall - student and course records API over MongoDB

pub mod cli;
pub mod config;
pub mod http;
pub mod models;
pub mod observability;
pub mod stats;
pub mod store;
