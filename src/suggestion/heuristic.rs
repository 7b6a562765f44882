use crate::models::{
    normalize_tags, IncidentStatus, Severity, SuggestionResult, HEURISTIC_CONFIDENCE,
};
use once_cell::sync::Lazy;
use regex::Regex;

const SUMMARY_EXCERPT_CHARS: usize = 240;
const IMPACT_EXCERPT_CHARS: usize = 180;
const ELLIPSIS: char = '…';

const UNTITLED: &str = "Incident (title to be specified)";
const IMPACT_PLACEHOLDER: &str =
    "Impact to be determined (collect more information on affected services and users).";

const ACTION_ITEMS: [&str; 4] = [
    "Check relevant metrics and logs around the time of the incident.",
    "Qualify the impact (services, regions, types of affected users).",
    "Apply a short-term mitigation if possible.",
    "Communicate status regularly to the team and stakeholders.",
];

/// Evaluated in order, first match wins. Word boundaries are ASCII-only so a
/// keyword next to a non-ASCII letter still counts as a whole word.
static SEVERITY_RULES: Lazy<Vec<(Regex, Severity)>> = Lazy::new(|| {
    [
        (r"(?-u:\b)(sev1|p1|major outage|data loss)(?-u:\b)", Severity::Sev1),
        (r"(?-u:\b)(sev2|p2|outage|5xx|downtime|critical)(?-u:\b)", Severity::Sev2),
        (r"(?-u:\b)(sev4|minor|degraded)(?-u:\b)", Severity::Sev4),
        (r"(?-u:\b)(sev5|cosmetic|typo|ui)(?-u:\b)", Severity::Sev5),
    ]
    .into_iter()
    .map(|(pattern, severity)| {
        (
            Regex::new(pattern).expect("severity pattern is valid"),
            severity,
        )
    })
    .collect()
});

static TAG_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?-u:\b)(api|billing|auth|db|cache|queue|cdn|network|eu[- ]?west|us[- ]?east|latency|5xx|timeout)(?-u:\b)",
    )
    .expect("tag pattern is valid")
});

/// First matching severity class over lower-cased text, SEV3 by default
pub fn classify_severity(text: &str) -> Severity {
    let text = text.to_lowercase();
    SEVERITY_RULES
        .iter()
        .find(|(pattern, _)| pattern.is_match(&text))
        .map(|(_, severity)| *severity)
        .unwrap_or_default()
}

/// Known service and infrastructure keywords, in order of first appearance
pub fn extract_tags(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    normalize_tags(
        TAG_PATTERN
            .find_iter(&text)
            .map(|m| m.as_str().to_string()),
    )
}

/// Rule-based suggestion; always succeeds, including on empty input
pub fn heuristic_suggestion(title: &str, description: &str) -> SuggestionResult {
    let text = format!("{} {}", title, description);
    let severity = classify_severity(&text);
    let tags = extract_tags(&text);

    let suggested_title = match title.trim() {
        "" => UNTITLED.to_string(),
        trimmed => trimmed.to_string(),
    };

    let description = description.trim();

    let mut summary = format!("- {}\n", title);
    if !description.is_empty() {
        summary.push_str(&format!(
            "- Description: {}\n",
            excerpt(description, SUMMARY_EXCERPT_CHARS)
        ));
    }
    summary.push_str(&format!("- Proposed severity: {}", severity));

    let impact_summary = if description.is_empty() {
        IMPACT_PLACEHOLDER.to_string()
    } else {
        format!(
            "Probable impact: {}",
            excerpt(description, IMPACT_EXCERPT_CHARS)
        )
    };

    SuggestionResult {
        summary,
        suggested_title,
        impact_summary,
        action_items: ACTION_ITEMS.iter().map(|s| s.to_string()).collect(),
        severity_proposed: severity,
        status_proposed: IncidentStatus::Open,
        tags,
        confidence: HEURISTIC_CONFIDENCE,
    }
}

/// First `max_chars` characters, ellipsis-marked when cut
fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_precedence() {
        assert_eq!(classify_severity("Major outage with data loss"), Severity::Sev1);
        // "outage" alone is SEV2, "major outage" wins over it
        assert_eq!(classify_severity("Partial outage"), Severity::Sev2);
        assert_eq!(classify_severity("critical but minor"), Severity::Sev2);
        assert_eq!(classify_severity("Search degraded"), Severity::Sev4);
        assert_eq!(classify_severity("Typo on pricing page"), Severity::Sev5);
        assert_eq!(classify_severity("something happened"), Severity::Sev3);
    }

    #[test]
    fn test_severity_needs_word_boundary() {
        // "ui" inside "build" or "p1" inside "sp1ke" must not match
        assert_eq!(classify_severity("build failed on sp1ke"), Severity::Sev3);
        assert_eq!(classify_severity("UI button misaligned"), Severity::Sev5);
    }

    #[test]
    fn test_keywords_next_to_non_ascii_letters() {
        assert_eq!(classify_severity("ui界面"), Severity::Sev5);
        assert_eq!(classify_severity("panne majeure: data lossé"), Severity::Sev1);
        assert_eq!(extract_tags("api接口超时 timeout"), vec!["api", "timeout"]);
    }

    #[test]
    fn test_tags_ordered_and_deduplicated() {
        let tags = extract_tags("DB timeout, then API timeout on db replica in eu-west");
        assert_eq!(tags, vec!["db", "timeout", "api", "eu-west"]);
    }

    #[test]
    fn test_tags_capped() {
        let tags = extract_tags(
            "api billing auth db cache queue cdn network latency 5xx timeout us-east",
        );
        assert_eq!(tags.len(), 8);
        assert_eq!(tags[0], "api");
        assert_eq!(tags[7], "network");
    }

    #[test]
    fn test_empty_input_is_complete() {
        let result = heuristic_suggestion("", "");
        assert_eq!(result.severity_proposed, Severity::Sev3);
        assert_eq!(result.status_proposed, IncidentStatus::Open);
        assert_eq!(result.impact_summary, IMPACT_PLACEHOLDER);
        assert_eq!(result.suggested_title, UNTITLED);
        // Header keeps the raw title; only suggested_title gets the placeholder
        assert!(result.summary.starts_with("- \n- Proposed severity: SEV3"));
        assert_eq!(result.action_items.len(), 4);
        assert!(result.tags.is_empty());
        assert_eq!(result.confidence, HEURISTIC_CONFIDENCE);
    }

    #[test]
    fn test_summary_layout() {
        let result = heuristic_suggestion("Checkout errors", "  5xx spike on api  ");
        assert_eq!(
            result.summary,
            "- Checkout errors\n- Description: 5xx spike on api\n- Proposed severity: SEV2"
        );
        assert_eq!(result.impact_summary, "Probable impact: 5xx spike on api");
    }

    #[test]
    fn test_long_description_truncated() {
        let description = "x".repeat(300);
        let result = heuristic_suggestion("Long", &description);

        let expected_summary_excerpt = format!("{}…", "x".repeat(240));
        assert!(result.summary.contains(&expected_summary_excerpt));
        assert_eq!(
            result.impact_summary,
            format!("Probable impact: {}…", "x".repeat(180))
        );
    }

    #[test]
    fn test_excerpt_counts_characters() {
        assert_eq!(excerpt("ééé", 3), "ééé");
        assert_eq!(excerpt("éééé", 3), "ééé…");
    }
}
