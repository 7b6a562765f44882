use crate::models::{normalize_tags, IncidentStatus, Severity, SuggestionResult};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Overlay an advisory response onto the rule-based result.
///
/// Returns `None` when `response` is not a JSON object. Otherwise each field
/// is taken from the response when present and well-typed, and kept from
/// `heuristic` when missing or invalid. Unknown fields are ignored.
pub fn merge_advisory(heuristic: &SuggestionResult, response: &Value) -> Option<SuggestionResult> {
    let fields = response.as_object()?;

    Some(SuggestionResult {
        summary: string_field(fields, "summary").unwrap_or_else(|| heuristic.summary.clone()),
        suggested_title: string_field(fields, "suggestedTitle")
            .unwrap_or_else(|| heuristic.suggested_title.clone()),
        impact_summary: string_field(fields, "impactSummary")
            .unwrap_or_else(|| heuristic.impact_summary.clone()),
        action_items: string_list_field(fields, "actionItems")
            .unwrap_or_else(|| heuristic.action_items.clone()),
        severity_proposed: enum_field::<Severity>(fields, "severityProposed")
            .unwrap_or(heuristic.severity_proposed),
        status_proposed: enum_field::<IncidentStatus>(fields, "statusProposed")
            .unwrap_or(heuristic.status_proposed),
        tags: string_list_field(fields, "tags")
            .map(normalize_tags)
            .unwrap_or_else(|| heuristic.tags.clone()),
        confidence: confidence_field(fields).unwrap_or(heuristic.confidence),
    })
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key)?.as_str().map(str::to_string)
}

/// Arrays keep their string elements; other element types are dropped
fn string_list_field(fields: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let items = fields.get(key)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn enum_field<T: FromStr>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    T::from_str(fields.get(key)?.as_str()?.trim()).ok()
}

fn confidence_field(fields: &Map<String, Value>) -> Option<f64> {
    fields
        .get("confidence")?
        .as_f64()
        .filter(|c| c.is_finite() && (0.0..=1.0).contains(c))
}
