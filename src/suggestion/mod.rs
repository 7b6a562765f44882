//! Severity, tag and action-item suggestions from free text.
//!
//! A deterministic rule-based result is always computed first. When an
//! advisory service is configured its response is merged over that result
//! field by field; any advisory failure leaves the rule-based result as is.

mod engine;
mod heuristic;
mod merge;

pub use engine::SuggestionEngine;
pub use heuristic::{classify_severity, extract_tags, heuristic_suggestion};
pub use merge::merge_advisory;
