//! # Observability
//!
//! Structured logging and process-level probes used by the health endpoints.

pub mod logger;
pub mod system;
