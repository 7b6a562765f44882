use crate::advisor::IncidentAdvisor;
use crate::error::Result;
use crate::metrics::EMBEDDINGS_WRITTEN_TOTAL;
use crate::models::Incident;
use crate::state::IncidentFilter;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Outcome of a full embedding rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildReport {
    pub total: usize,
    pub ok: usize,
    pub failed: usize,
}

impl IncidentAdvisor {
    /// Recompute and store the embedding of one incident
    pub async fn upsert_embedding(&self, id: &Uuid) -> Result<()> {
        let incident = self.get_incident(id).await?;
        self.write_embedding(&incident).await
    }

    async fn write_embedding(&self, incident: &Incident) -> Result<()> {
        let vector = self.embed_text(&incident.embedding_text())?;

        match self.vectors.write_vector(&incident.id, &vector).await {
            Ok(()) => {
                EMBEDDINGS_WRITTEN_TOTAL.with_label_values(&["ok"]).inc();
                tracing::debug!(incident_id = %incident.id, "Embedding stored");
                Ok(())
            }
            Err(e) => {
                EMBEDDINGS_WRITTEN_TOTAL.with_label_values(&["error"]).inc();
                tracing::error!(incident_id = %incident.id, error = %e, "Embedding write failed");
                Err(e)
            }
        }
    }

    /// Embed a freshly created incident in the background.
    ///
    /// Failures are logged and never reach the creator.
    pub fn spawn_embedding(&self, id: Uuid) {
        if !self.embeddings_enabled() {
            tracing::debug!(incident_id = %id, "Embeddings disabled, skipping auto-embed");
            return;
        }

        let advisor = self.clone();
        tokio::spawn(async move {
            if let Err(e) = advisor.upsert_embedding(&id).await {
                tracing::warn!(incident_id = %id, error = %e, "Auto-embed failed");
            }
        });
    }

    /// Recompute every stored embedding, newest incident first.
    ///
    /// Items are processed one at a time with a pause after each batch.
    /// Per-item failures are counted, not returned.
    pub async fn rebuild_embeddings(&self) -> Result<RebuildReport> {
        self.ensure_embeddings_enabled()?;

        let filter = IncidentFilter::default();
        let total = self.records.count_incidents(&filter).await?;
        let incidents = self
            .records
            .list_incidents(&filter, 0, u32::try_from(total).unwrap_or(u32::MAX))
            .await?;

        let batch_size = self.embedding.rebuild_batch_size.max(1);
        let pause = Duration::from_millis(self.embedding.rebuild_pause_ms);

        tracing::info!(
            total = incidents.len(),
            batch_size,
            "Rebuilding incident embeddings"
        );

        let mut report = RebuildReport {
            total: incidents.len(),
            ok: 0,
            failed: 0,
        };

        for (i, incident) in incidents.iter().enumerate() {
            match self.write_embedding(incident).await {
                Ok(()) => report.ok += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(incident_id = %incident.id, error = %e, "Embedding rebuild failed");
                }
            }

            if (i + 1) % batch_size == 0 && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        tracing::info!(
            total = report.total,
            ok = report.ok,
            failed = report.failed,
            "Embedding rebuild finished"
        );

        Ok(report)
    }
}
