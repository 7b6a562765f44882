use crate::models::{IncidentStatus, Severity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of distinct tags carried by a suggestion
pub const MAX_TAGS: usize = 8;

/// Confidence reported by the rule-based path
pub const HEURISTIC_CONFIDENCE: f64 = 0.55;

/// Structured suggestion for an incident
///
/// A fresh value is produced by every classification; it is never mutated
/// after being returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionResult {
    pub summary: String,
    pub suggested_title: String,
    pub impact_summary: String,
    pub action_items: Vec<String>,
    pub severity_proposed: Severity,
    pub status_proposed: IncidentStatus,
    /// Deduplicated, insertion ordered, at most [`MAX_TAGS`]
    pub tags: Vec<String>,
    /// In `[0, 1]`
    pub confidence: f64,
}

/// Deduplicate tags preserving first occurrence, capped at [`MAX_TAGS`]
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::with_capacity(MAX_TAGS);
    for tag in tags {
        let tag = tag.into();
        if out.len() == MAX_TAGS {
            break;
        }
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Suggestion tagged with the incident it was computed for
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSummary {
    pub id: Uuid,
    #[serde(flatten)]
    pub suggestion: SuggestionResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags_dedups_in_order() {
        let tags = normalize_tags(vec!["db", "api", "db", "cache", "api"]);
        assert_eq!(tags, vec!["db", "api", "cache"]);
    }

    #[test]
    fn test_normalize_tags_caps_distinct() {
        let raw: Vec<String> = (0..12).map(|i| format!("t{}", i % 10)).collect();
        let tags = normalize_tags(raw);
        assert_eq!(tags.len(), MAX_TAGS);
        assert_eq!(tags[0], "t0");
        assert_eq!(tags[7], "t7");
    }

    #[test]
    fn test_wire_field_names() {
        let result = SuggestionResult {
            summary: "s".to_string(),
            suggested_title: "t".to_string(),
            impact_summary: "i".to_string(),
            action_items: vec![],
            severity_proposed: Severity::Sev2,
            status_proposed: IncidentStatus::Open,
            tags: vec![],
            confidence: HEURISTIC_CONFIDENCE,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["suggestedTitle"], "t");
        assert_eq!(value["severityProposed"], "SEV2");
        assert_eq!(value["statusProposed"], "OPEN");
    }
}
