use crate::api::{handlers, AppState};
use axum::{
    http::{HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

/// Build the main API router
///
/// Every route runs under the request timeout except the embedding rebuild,
/// whose paced pass over the corpus outlives any per-request deadline.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.advisor.features().cors_origins);

    let timed: Router<AppState> = Router::new()
        // Health endpoints
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        // Incident records
        .route("/v1/incidents", post(handlers::create_incident))
        .route("/v1/incidents", get(handlers::list_incidents))
        .route("/v1/incidents/:id", get(handlers::get_incident))
        .route("/v1/incidents/:id/status", patch(handlers::update_status))
        // Intelligence
        .route("/v1/incidents/similar", get(handlers::find_similar))
        .route("/v1/incidents/suggest", post(handlers::suggest))
        .route("/v1/incidents/:id/summary", get(handlers::summarize))
        .route("/v1/incidents/:id/chat", post(handlers::chat))
        .route("/v1/incidents/:id/embedding", post(handlers::upsert_embedding))
        .route("/v1/assistant/query", post(handlers::assistant_query))
        .layer(TimeoutLayer::new(state.request_timeout));

    let batch: Router<AppState> = Router::new().route(
        "/v1/incidents/embeddings/rebuild",
        post(handlers::rebuild_embeddings),
    );

    let router = timed
        .merge(batch)
        // Add state
        .with_state(state)
        // Add middleware
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        );

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

/// CORS for the configured origins; `None` when the list is empty
fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }

    tracing::info!(origins = origins.len(), "CORS enabled");

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers(Any),
    )
}
