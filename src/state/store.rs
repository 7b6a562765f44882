use crate::embedding::EmbeddingVector;
use crate::error::{AppError, Result};
use crate::models::Incident;
use crate::similarity::Candidate;
use crate::state::{paginate, sort_newest_first, IncidentFilter, IncidentStore, VectorStore};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

/// In-memory incident store (for development and testing)
///
/// Vectors live beside the records so a status update never clobbers an
/// embedding written concurrently.
#[derive(Clone)]
pub struct InMemoryStore {
    incidents: Arc<DashMap<Uuid, Incident>>,
    vectors: Arc<DashMap<Uuid, EmbeddingVector>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            incidents: Arc::new(DashMap::new()),
            vectors: Arc::new(DashMap::new()),
        }
    }

    fn with_vector(&self, mut incident: Incident) -> Incident {
        incident.embedding = self.vectors.get(&incident.id).map(|v| v.clone());
        incident
    }

    fn snapshot(&self) -> Vec<Incident> {
        let mut incidents: Vec<Incident> = self
            .incidents
            .iter()
            .map(|entry| self.with_vector(entry.value().clone()))
            .collect();
        sort_newest_first(&mut incidents);
        incidents
    }

    fn strip_vector(incident: &Incident) -> Incident {
        Incident {
            embedding: None,
            ..incident.clone()
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IncidentStore for InMemoryStore {
    async fn save_incident(&self, incident: &Incident) -> Result<()> {
        if let Some(vector) = &incident.embedding {
            self.vectors.insert(incident.id, vector.clone());
        }
        self.incidents.insert(incident.id, Self::strip_vector(incident));
        tracing::debug!(incident_id = %incident.id, "Incident saved");
        Ok(())
    }

    async fn get_incident(&self, id: &Uuid) -> Result<Option<Incident>> {
        Ok(self
            .incidents
            .get(id)
            .map(|entry| self.with_vector(entry.clone())))
    }

    async fn update_incident(&self, incident: &Incident) -> Result<()> {
        match self.incidents.get_mut(&incident.id) {
            Some(mut entry) => {
                *entry = Self::strip_vector(incident);
                tracing::debug!(incident_id = %incident.id, "Incident updated");
                Ok(())
            }
            None => Err(AppError::NotFound(format!(
                "Incident {} not found",
                incident.id
            ))),
        }
    }

    async fn list_incidents(
        &self,
        filter: &IncidentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Incident>> {
        let incidents: Vec<Incident> = self
            .snapshot()
            .into_iter()
            .filter(|incident| filter.matches(incident))
            .collect();

        Ok(paginate(incidents, page, page_size))
    }

    async fn count_incidents(&self, filter: &IncidentFilter) -> Result<u64> {
        let count = self
            .incidents
            .iter()
            .filter(|entry| filter.matches(entry.value()))
            .count();

        Ok(count as u64)
    }
}

#[async_trait]
impl VectorStore for InMemoryStore {
    async fn write_vector(&self, id: &Uuid, vector: &EmbeddingVector) -> Result<()> {
        if !self.incidents.contains_key(id) {
            return Err(AppError::NotFound(format!("Incident {} not found", id)));
        }

        self.vectors.insert(*id, vector.clone());
        tracing::debug!(incident_id = %id, "Embedding written");
        Ok(())
    }

    async fn load_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self
            .snapshot()
            .into_iter()
            .map(|incident| Candidate::new(incident.id, incident.embedding))
            .collect())
    }
}
