use crate::embedding::EmbeddingVector;
use crate::error::{AppError, Result};
use crate::models::Incident;
use crate::similarity::Candidate;
use crate::state::{paginate, sort_newest_first, IncidentFilter, IncidentStore, VectorStore};
use async_trait::async_trait;
use sled::Db;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Persistent incident store using Sled embedded database
///
/// Records and vectors are kept in separate trees keyed by incident id.
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    incidents_tree: sled::Tree,
    vectors_tree: sled::Tree,
}

impl SledStore {
    /// Create a new Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref();
        let db = sled::open(path_str)
            .map_err(|e| AppError::Storage(format!("Failed to open Sled database: {}", e)))?;

        let incidents_tree = db
            .open_tree("incidents")
            .map_err(|e| AppError::Storage(format!("Failed to open incidents tree: {}", e)))?;

        let vectors_tree = db
            .open_tree("vectors")
            .map_err(|e| AppError::Storage(format!("Failed to open vectors tree: {}", e)))?;

        tracing::info!("Initialized Sled store at {:?}", path_str);

        Ok(Self {
            db: Arc::new(db),
            incidents_tree,
            vectors_tree,
        })
    }

    fn serialize_incident(incident: &Incident) -> Result<Vec<u8>> {
        let record = Incident {
            embedding: None,
            ..incident.clone()
        };
        bincode::serialize(&record)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize incident: {}", e)))
    }

    fn deserialize_incident(bytes: &[u8]) -> Result<Incident> {
        bincode::deserialize(bytes)
            .map_err(|e| AppError::Serialization(format!("Failed to deserialize incident: {}", e)))
    }

    fn incident_key(id: &Uuid) -> Vec<u8> {
        id.as_bytes().to_vec()
    }

    fn read_vector(&self, id: &Uuid) -> Result<Option<EmbeddingVector>> {
        let bytes = self
            .vectors_tree
            .get(Self::incident_key(id))
            .map_err(|e| AppError::Storage(format!("Failed to read vector: {}", e)))?;

        match bytes {
            Some(bytes) => {
                let vector = bincode::deserialize(&bytes).map_err(|e| {
                    AppError::Serialization(format!("Failed to deserialize vector: {}", e))
                })?;
                Ok(Some(vector))
            }
            None => Ok(None),
        }
    }

    fn write_vector_bytes(&self, id: &Uuid, vector: &EmbeddingVector) -> Result<()> {
        let value = bincode::serialize(vector)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize vector: {}", e)))?;

        self.vectors_tree
            .insert(Self::incident_key(id), value)
            .map_err(|e| AppError::Storage(format!("Failed to write vector: {}", e)))?;

        Ok(())
    }

    /// Every stored incident with its vector attached, newest first
    fn load_all(&self) -> Result<Vec<Incident>> {
        let mut incidents = Vec::new();

        for result in self.incidents_tree.iter() {
            let (_, value) = result
                .map_err(|e| AppError::Storage(format!("Failed to iterate incidents: {}", e)))?;

            let mut incident = Self::deserialize_incident(&value)?;
            incident.embedding = self.read_vector(&incident.id)?;
            incidents.push(incident);
        }

        sort_newest_first(&mut incidents);
        Ok(incidents)
    }

    fn contains(&self, id: &Uuid) -> Result<bool> {
        self.incidents_tree
            .contains_key(Self::incident_key(id))
            .map_err(|e| AppError::Storage(format!("Failed to check incident existence: {}", e)))
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| AppError::Storage(format!("Failed to flush database: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl IncidentStore for SledStore {
    async fn save_incident(&self, incident: &Incident) -> Result<()> {
        let key = Self::incident_key(&incident.id);
        let value = Self::serialize_incident(incident)?;

        self.incidents_tree
            .insert(key, value)
            .map_err(|e| AppError::Storage(format!("Failed to save incident: {}", e)))?;

        if let Some(vector) = &incident.embedding {
            self.write_vector_bytes(&incident.id, vector)?;
        }

        self.flush().await?;

        tracing::debug!(incident_id = %incident.id, "Incident saved to Sled");
        Ok(())
    }

    async fn get_incident(&self, id: &Uuid) -> Result<Option<Incident>> {
        let key = Self::incident_key(id);

        match self.incidents_tree.get(key) {
            Ok(Some(bytes)) => {
                let mut incident = Self::deserialize_incident(&bytes)?;
                incident.embedding = self.read_vector(id)?;
                Ok(Some(incident))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(AppError::Storage(format!("Failed to get incident: {}", e))),
        }
    }

    async fn update_incident(&self, incident: &Incident) -> Result<()> {
        if !self.contains(&incident.id)? {
            return Err(AppError::NotFound(format!(
                "Incident {} not found",
                incident.id
            )));
        }

        let value = Self::serialize_incident(incident)?;

        self.incidents_tree
            .insert(Self::incident_key(&incident.id), value)
            .map_err(|e| AppError::Storage(format!("Failed to update incident: {}", e)))?;

        self.flush().await?;

        tracing::debug!(incident_id = %incident.id, "Incident updated in Sled");
        Ok(())
    }

    async fn list_incidents(
        &self,
        filter: &IncidentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<Vec<Incident>> {
        let incidents: Vec<Incident> = self
            .load_all()?
            .into_iter()
            .filter(|incident| filter.matches(incident))
            .collect();

        Ok(paginate(incidents, page, page_size))
    }

    async fn count_incidents(&self, filter: &IncidentFilter) -> Result<u64> {
        let mut count = 0u64;

        for result in self.incidents_tree.iter() {
            let (_, value) = result
                .map_err(|e| AppError::Storage(format!("Failed to iterate incidents: {}", e)))?;

            if filter.matches(&Self::deserialize_incident(&value)?) {
                count += 1;
            }
        }

        Ok(count)
    }
}

#[async_trait]
impl VectorStore for SledStore {
    async fn write_vector(&self, id: &Uuid, vector: &EmbeddingVector) -> Result<()> {
        if !self.contains(id)? {
            return Err(AppError::NotFound(format!("Incident {} not found", id)));
        }

        self.write_vector_bytes(id, vector)?;
        self.flush().await?;

        tracing::debug!(incident_id = %id, dimension = vector.dimension(), "Vector written to Sled");
        Ok(())
    }

    async fn load_candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self
            .load_all()?
            .into_iter()
            .map(|incident| Candidate::new(incident.id, incident.embedding))
            .collect())
    }
}
