use crate::advisor::{NewIncident, RebuildReport};
use crate::api::AppState;
use crate::error::{AppError, Result};
use crate::models::*;
use crate::state::IncidentFilter;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Default number of similar incidents returned
const DEFAULT_SIMILAR_K: usize = 5;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        embeddings_enabled: state.advisor.embeddings_enabled(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub embeddings_enabled: bool,
}

/// Create an incident; its embedding is computed in the background
pub async fn create_incident(
    State(state): State<AppState>,
    Json(request): Json<CreateIncidentRequest>,
) -> Result<(StatusCode, Json<IncidentResponse>)> {
    request.validate()?;

    let created = state
        .advisor
        .create_incident(NewIncident {
            title: request.title,
            description: request.description,
            severity: request.severity,
            status: request.status,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(IncidentResponse::from(created))))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateIncidentRequest {
    #[validate(length(min = 1, max = 500))]
    pub title: String,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<IncidentStatus>,
}

/// Get an incident by ID
pub async fn get_incident(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IncidentResponse>> {
    let incident = state.advisor.get_incident(&id).await?;
    Ok(Json(IncidentResponse::from(incident)))
}

/// List incidents
pub async fn list_incidents(
    State(state): State<AppState>,
    Query(params): Query<ListIncidentsQuery>,
) -> Result<Json<ListIncidentsResponse>> {
    let filter = IncidentFilter {
        statuses: parse_csv(params.status.as_deref())?,
        severities: parse_csv(params.severity.as_deref())?,
        query: params.q,
    };

    let page = params.page.unwrap_or(0);
    let page_size = params.page_size.unwrap_or(20).clamp(1, 100);

    let (incidents, total) = state
        .advisor
        .list_incidents(&filter, page, page_size)
        .await?;

    Ok(Json(ListIncidentsResponse {
        incidents: incidents.into_iter().map(IncidentResponse::from).collect(),
        total,
        page,
        page_size,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListIncidentsQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Comma-separated statuses
    pub status: Option<String>,
    /// Comma-separated severities
    pub severity: Option<String>,
    pub q: Option<String>,
}

fn parse_csv<T: FromStr>(raw: Option<&str>) -> Result<Vec<T>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            T::from_str(&item.to_uppercase())
                .map_err(|_| AppError::Validation(format!("Unknown filter value: {}", item)))
        })
        .collect()
}

/// Move an incident along its lifecycle
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<IncidentResponse>> {
    let incident = state.advisor.update_status(&id, request.status).await?;
    Ok(Json(IncidentResponse::from(incident)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: IncidentStatus,
}

/// Incidents similar to free text
pub async fn find_similar(
    State(state): State<AppState>,
    Query(params): Query<SimilarQuery>,
) -> Result<Json<SimilarResponse>> {
    let text = params.q.unwrap_or_default();
    let k = params.k.unwrap_or(DEFAULT_SIMILAR_K);

    let items = state.advisor.find_similar(&text, k).await?;
    Ok(Json(SimilarResponse { items }))
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub q: Option<String>,
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimilarResponse {
    pub items: Vec<SimilarIncident>,
}

/// Suggest severity, tags and next steps for a draft incident
pub async fn suggest(
    State(state): State<AppState>,
    Json(request): Json<SuggestRequest>,
) -> Result<Json<SuggestionResult>> {
    request.validate()?;

    let suggestion = state
        .advisor
        .suggest(&request.title, request.description.as_deref().unwrap_or(""))
        .await;

    Ok(Json(suggestion))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SuggestRequest {
    #[serde(default)]
    #[validate(length(max = 500))]
    pub title: String,
    #[validate(length(max = 20000))]
    pub description: Option<String>,
}

/// Suggestion for a stored incident
pub async fn summarize(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<IncidentSummary>> {
    let summary = state.advisor.summarize(&id).await?;
    Ok(Json(summary))
}

/// Chat about an incident with similar incidents as context
pub async fn chat(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatReply>> {
    request.validate()?;

    let reply = state.advisor.chat_context(&id, request.messages).await?;
    Ok(Json(reply))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(length(max = 100))]
    pub messages: Vec<ChatMessage>,
}

/// Recompute one incident's embedding
pub async fn upsert_embedding(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EmbeddingResponse>> {
    state.advisor.upsert_embedding(&id).await?;
    Ok(Json(EmbeddingResponse { id, ok: true }))
}

#[derive(Debug, Serialize)]
pub struct EmbeddingResponse {
    pub id: Uuid,
    pub ok: bool,
}

/// Recompute every stored embedding
pub async fn rebuild_embeddings(State(state): State<AppState>) -> Result<Json<RebuildReport>> {
    let report = state.advisor.rebuild_embeddings().await?;
    Ok(Json(report))
}

/// Free-form question over recent incidents
pub async fn assistant_query(
    State(state): State<AppState>,
    Json(request): Json<AssistantQueryRequest>,
) -> Result<Json<ChatReply>> {
    request.validate()?;

    let reply = state.advisor.assistant_query(&request.question).await?;
    Ok(Json(reply))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssistantQueryRequest {
    #[validate(length(min = 1, max = 4000))]
    pub question: String,
}

/// Incident response DTO
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentResponse {
    pub id: Uuid,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    pub status: IncidentStatus,
    pub severity: Severity,
    pub title: String,
    pub description: Option<String>,
    pub has_embedding: bool,
}

impl From<Incident> for IncidentResponse {
    fn from(incident: Incident) -> Self {
        Self {
            has_embedding: incident.has_embedding(),
            id: incident.id,
            created_at: incident.created_at,
            updated_at: incident.updated_at,
            status: incident.status,
            severity: incident.severity,
            title: incident.title,
            description: incident.description,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListIncidentsResponse {
    pub incidents: Vec<IncidentResponse>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

/// Prometheus metrics endpoint
///
/// Returns metrics in Prometheus text exposition format
pub async fn metrics() -> (StatusCode, String) {
    let metrics = crate::metrics::gather_metrics();
    (StatusCode::OK, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_statuses() {
        let statuses: Vec<IncidentStatus> = parse_csv(Some("open, acknowledged")).unwrap();
        assert_eq!(
            statuses,
            vec![IncidentStatus::Open, IncidentStatus::Acknowledged]
        );

        let none: Vec<Severity> = parse_csv(None).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_parse_csv_rejects_unknown() {
        let result: Result<Vec<Severity>> = parse_csv(Some("SEV9"));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateIncidentRequest {
            title: String::new(),
            description: None,
            severity: None,
            status: None,
        };
        assert!(request.validate().is_err());
    }
}
