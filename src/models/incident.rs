use crate::embedding::EmbeddingVector;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use uuid::Uuid;

/// Represents an incident in the system
///
/// Owned by the record store. The intelligence layer reads title, description,
/// status and severity, and only ever writes the `embedding` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Unique identifier
    pub id: Uuid,

    /// Human-readable title
    pub title: String,

    /// Detailed description
    pub description: Option<String>,

    /// Current lifecycle status
    pub status: IncidentStatus,

    /// Severity level
    pub severity: Severity,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,

    /// Embedding derived from title and description
    pub embedding: Option<EmbeddingVector>,
}

impl Incident {
    /// Create a new incident in the OPEN state
    pub fn new(title: String, description: Option<String>, severity: Severity) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            title,
            description,
            status: IncidentStatus::Open,
            severity,
            created_at: now,
            updated_at: now,
            embedding: None,
        }
    }

    /// Override the initial status
    pub fn with_status(mut self, status: IncidentStatus) -> Self {
        self.status = status;
        self
    }

    /// Description or empty string
    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// Text the embedding is derived from
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}", self.title, self.description_or_empty())
            .trim()
            .to_string()
    }

    /// Apply an already-validated status
    pub fn set_status(&mut self, status: IncidentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    /// Replace the stored embedding
    pub fn set_embedding(&mut self, embedding: EmbeddingVector) {
        self.embedding = Some(embedding);
        self.updated_at = Utc::now();
    }

    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

/// Incident lifecycle status, in progression order
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    Display,
    EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum IncidentStatus {
    Open,
    Acknowledged,
    Mitigating,
    Resolved,
    Closed,
}

impl IncidentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IncidentStatus::Closed)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumString,
    Display,
    EnumIter,
    Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Sev1, // Major outage, data loss
    Sev2, // Outage, elevated 5xx
    #[default]
    Sev3,
    Sev4, // Degraded
    Sev5, // Cosmetic
}

impl Severity {
    /// Numeric level (1 is most urgent)
    pub fn level(&self) -> u8 {
        match self {
            Severity::Sev1 => 1,
            Severity::Sev2 => 2,
            Severity::Sev3 => 3,
            Severity::Sev4 => 4,
            Severity::Sev5 => 5,
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, Severity::Sev1 | Severity::Sev2)
    }
}
