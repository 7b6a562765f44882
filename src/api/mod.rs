pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::advisor::IncidentAdvisor;
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub advisor: Arc<IncidentAdvisor>,
    pub started_at: Instant,
    /// Applied to every route except the embedding rebuild
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(advisor: Arc<IncidentAdvisor>) -> Self {
        Self {
            advisor,
            started_at: Instant::now(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
