//! Incident intelligence service.
//!
//! Deterministic text embeddings and similarity search over incidents, a
//! lifecycle guard for status changes, and rule-based suggestions optionally
//! refined by an external advisory service.

pub mod advisor;
pub mod advisory;
pub mod api;
pub mod config;
pub mod embedding;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod models;
pub mod similarity;
pub mod state;
pub mod suggestion;

pub use error::{AppError, Result};
