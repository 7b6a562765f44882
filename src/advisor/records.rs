use crate::advisor::IncidentAdvisor;
use crate::error::{AppError, Result};
use crate::lifecycle::LifecycleGuard;
use crate::metrics::LIFECYCLE_REJECTIONS_TOTAL;
use crate::models::{Incident, IncidentStatus, Severity};
use crate::state::IncidentFilter;
use uuid::Uuid;

/// Fields accepted when recording a new incident
#[derive(Debug, Clone, Default)]
pub struct NewIncident {
    pub title: String,
    pub description: Option<String>,
    pub severity: Option<Severity>,
    pub status: Option<IncidentStatus>,
}

impl IncidentAdvisor {
    /// Persist a new incident and embed it in the background
    pub async fn create_incident(&self, new: NewIncident) -> Result<Incident> {
        let description = new.description.filter(|d| !d.trim().is_empty());
        let incident = Incident::new(new.title, description, new.severity.unwrap_or_default())
            .with_status(new.status.unwrap_or(IncidentStatus::Open));

        self.records.save_incident(&incident).await?;

        tracing::info!(
            incident_id = %incident.id,
            severity = %incident.severity,
            status = %incident.status,
            "Incident created"
        );

        self.spawn_embedding(incident.id);
        Ok(incident)
    }

    /// Page of incidents with the total matching count
    pub async fn list_incidents(
        &self,
        filter: &IncidentFilter,
        page: u32,
        page_size: u32,
    ) -> Result<(Vec<Incident>, u64)> {
        let incidents = self.records.list_incidents(filter, page, page_size).await?;
        let total = self.records.count_incidents(filter).await?;
        Ok((incidents, total))
    }

    /// Move an incident to `to` if policy and the lifecycle allow it
    pub async fn update_status(&self, id: &Uuid, to: IncidentStatus) -> Result<Incident> {
        if !self.features.allow_status_patch {
            return Err(AppError::Forbidden(
                "Status updates are disabled on this server".to_string(),
            ));
        }

        let mut incident = self.get_incident(id).await?;
        let from = incident.status;

        if let Err(e) = LifecycleGuard::validate(from, to) {
            LIFECYCLE_REJECTIONS_TOTAL
                .with_label_values(&[&from.to_string(), &to.to_string()])
                .inc();
            tracing::warn!(incident_id = %id, %from, %to, "Status transition rejected");
            return Err(e);
        }

        incident.set_status(to);
        self.records.update_incident(&incident).await?;

        tracing::info!(incident_id = %id, %from, %to, "Incident status updated");
        Ok(incident)
    }
}
