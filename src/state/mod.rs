pub mod factory;
pub mod sled_store;
pub mod store;

pub use factory::{create_in_memory_store, create_store};
pub use sled_store::SledStore;
pub use store::*;

use crate::embedding::EmbeddingVector;
use crate::error::Result;
use crate::models::{Incident, IncidentStatus, Severity};
use crate::similarity::{Candidate, Neighbor, SimilarityIndex};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Trait for incident record storage operations
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Save an incident
    async fn save_incident(&self, incident: &Incident) -> Result<()>;

    /// Get an incident by ID
    async fn get_incident(&self, id: &Uuid) -> Result<Option<Incident>>;

    /// Update an existing incident
    async fn update_incident(&self, incident: &Incident) -> Result<()>;

    /// List incidents matching `filter`, newest first
    async fn list_incidents(
        &self,
        filter: &IncidentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Incident>>;

    /// Count incidents matching filter
    async fn count_incidents(&self, filter: &IncidentFilter) -> Result<u64>;
}

/// Vector column attached to incident records
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Replace the stored vector for `id`; NotFound for unknown ids
    async fn write_vector(&self, id: &Uuid, vector: &EmbeddingVector) -> Result<()>;

    /// Every incident id with its vector (if any), newest first
    async fn load_candidates(&self) -> Result<Vec<Candidate>>;

    /// Nearest stored vectors to `query`, closest first.
    ///
    /// Backends without a native index pull every candidate and rank in
    /// process.
    async fn nearest(&self, query: &EmbeddingVector, k: usize) -> Result<Vec<Neighbor>> {
        let candidates = self.load_candidates().await?;
        Ok(SimilarityIndex::rank(query, &candidates, k))
    }
}

/// Filter for querying incidents
#[derive(Debug, Clone, Default)]
pub struct IncidentFilter {
    pub statuses: Vec<IncidentStatus>,
    pub severities: Vec<Severity>,
    /// Case-insensitive substring of title or description
    pub query: Option<String>,
}

impl IncidentFilter {
    pub fn matches(&self, incident: &Incident) -> bool {
        let status_match = self.statuses.is_empty() || self.statuses.contains(&incident.status);

        let severity_match =
            self.severities.is_empty() || self.severities.contains(&incident.severity);

        let query_match = match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(q) => {
                let q = q.to_lowercase();
                incident.title.to_lowercase().contains(&q)
                    || incident.description_or_empty().to_lowercase().contains(&q)
            }
        };

        status_match && severity_match && query_match
    }
}

/// Record and vector views over one storage backend
#[derive(Clone)]
pub struct Stores {
    pub records: Arc<dyn IncidentStore>,
    pub vectors: Arc<dyn VectorStore>,
}

impl Stores {
    pub fn from_backend<S>(backend: Arc<S>) -> Self
    where
        S: IncidentStore + VectorStore + 'static,
    {
        Self {
            records: backend.clone(),
            vectors: backend,
        }
    }
}

/// Newest first, id as tie-break
pub(crate) fn sort_newest_first(incidents: &mut [Incident]) {
    incidents.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
}

/// Zero-based page slice
pub(crate) fn paginate(incidents: Vec<Incident>, page: u32, page_size: u32) -> Vec<Incident> {
    let start = page as usize * page_size as usize;
    incidents
        .into_iter()
        .skip(start)
        .take(page_size as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_is_case_insensitive() {
        let incident = Incident::new(
            "Redis timeouts".to_string(),
            Some("Shard 3 unreachable".to_string()),
            Severity::Sev2,
        );

        let filter = IncidentFilter {
            query: Some("SHARD".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&incident));

        let filter = IncidentFilter {
            query: Some("kafka".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&incident));
    }

    #[test]
    fn test_filter_status_and_severity() {
        let incident = Incident::new("t".to_string(), None, Severity::Sev4);

        let filter = IncidentFilter {
            statuses: vec![IncidentStatus::Open],
            severities: vec![Severity::Sev4, Severity::Sev5],
            query: None,
        };
        assert!(filter.matches(&incident));

        let filter = IncidentFilter {
            statuses: vec![IncidentStatus::Closed],
            ..Default::default()
        };
        assert!(!filter.matches(&incident));
    }
}
