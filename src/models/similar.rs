use crate::models::{Incident, IncidentStatus, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Incident returned by a similarity query, lower score is closer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarIncident {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: IncidentStatus,
    pub severity: Severity,
    pub created_at: DateTime<Utc>,
    pub score: f32,
}

impl SimilarIncident {
    pub fn from_incident(incident: Incident, score: f32) -> Self {
        Self {
            id: incident.id,
            title: incident.title,
            description: incident.description,
            status: incident.status,
            severity: incident.severity,
            created_at: incident.created_at,
            score,
        }
    }
}
