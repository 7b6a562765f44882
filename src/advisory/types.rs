use crate::models::{
    ChatIncident, ChatMessage, Incident, IncidentStatus, Severity, SimilarIncident,
    SuggestionResult,
};
use serde::Serialize;
use uuid::Uuid;

/// Body of `POST /incident-suggest`
#[derive(Debug, Clone, Serialize)]
pub struct SuggestRequest {
    pub title: String,
    pub description: String,
    pub heuristic: SuggestionResult,
}

/// Body of `POST /incident-chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub incident: ChatIncident,
    pub similar_incidents: Vec<SimilarIncident>,
    pub messages: Vec<ChatMessage>,
}

/// Incident row sent as context to the global assistant
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantIncident {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: IncidentStatus,
    pub severity: Severity,
    pub created_at: String,
}

impl From<&Incident> for AssistantIncident {
    fn from(incident: &Incident) -> Self {
        Self {
            id: incident.id,
            title: incident.title.clone(),
            description: incident.description.clone(),
            status: incident.status,
            severity: incident.severity,
            created_at: incident.created_at.to_rfc3339(),
        }
    }
}

/// Body of `POST /assistant/query`
#[derive(Debug, Clone, Serialize)]
pub struct AssistantQueryRequest {
    pub question: String,
    pub incidents: Vec<AssistantIncident>,
}
