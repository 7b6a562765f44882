use crate::advisory::{AdvisoryService, SuggestRequest};
use crate::metrics::ADVISORY_CALLS_TOTAL;
use crate::models::SuggestionResult;
use crate::suggestion::{heuristic_suggestion, merge_advisory};
use std::sync::Arc;
use tracing::{debug, warn};

/// Classifies incident text, optionally refined by an advisory service
#[derive(Clone, Default)]
pub struct SuggestionEngine {
    advisory: Option<Arc<dyn AdvisoryService>>,
}

impl SuggestionEngine {
    pub fn new(advisory: Option<Arc<dyn AdvisoryService>>) -> Self {
        Self { advisory }
    }

    /// Heuristics only
    pub fn heuristic_only() -> Self {
        Self { advisory: None }
    }

    pub fn has_advisory(&self) -> bool {
        self.advisory.is_some()
    }

    /// Classify `title` and `description` into a suggestion.
    ///
    /// Never fails: one advisory attempt is made, and the rule-based result
    /// is returned unchanged if it errors or answers with a non-object.
    pub async fn classify(&self, title: &str, description: &str) -> SuggestionResult {
        let heuristic = heuristic_suggestion(title, description);

        let Some(advisory) = &self.advisory else {
            return heuristic;
        };

        let request = SuggestRequest {
            title: title.to_string(),
            description: description.to_string(),
            heuristic: heuristic.clone(),
        };

        match advisory.suggest(&request).await {
            Ok(response) => match merge_advisory(&heuristic, &response) {
                Some(merged) => {
                    ADVISORY_CALLS_TOTAL.with_label_values(&["suggest", "ok"]).inc();
                    debug!(
                        severity = %merged.severity_proposed,
                        confidence = merged.confidence,
                        "Advisory suggestion merged"
                    );
                    merged
                }
                None => {
                    ADVISORY_CALLS_TOTAL
                        .with_label_values(&["suggest", "fallback"])
                        .inc();
                    warn!("Advisory suggest returned a non-object response, using heuristic");
                    heuristic
                }
            },
            Err(e) => {
                ADVISORY_CALLS_TOTAL
                    .with_label_values(&["suggest", "fallback"])
                    .inc();
                warn!(error = %e, "Advisory suggest failed, using heuristic");
                heuristic
            }
        }
    }
}
