use crate::advisor::{
    ASSISTANT_CONTEXT_LIMIT, ASSISTANT_UNAVAILABLE_MESSAGE, CHAT_SIMILAR_LIMIT,
    CHAT_SIMILAR_LOOKUP, CHAT_UNAVAILABLE_MESSAGE, NO_REPLY_MESSAGE,
};
use crate::advisory::{AdvisoryService, AssistantIncident, AssistantQueryRequest, ChatRequest};
use crate::config::{Config, EmbeddingConfig, EmbeddingFallback, FeatureFlags};
use crate::embedding::{EmbeddingVector, HashingVectorizer, TextVectorizer};
use crate::error::{AppError, Result};
use crate::metrics::{ADVISORY_CALLS_TOTAL, SIMILARITY_QUERIES_TOTAL};
use crate::models::{
    ChatIncident, ChatMessage, ChatReply, Incident, IncidentSummary, SimilarIncident,
    SuggestionResult,
};
use crate::similarity::SimilarityIndex;
use crate::state::{IncidentFilter, IncidentStore, Stores, VectorStore};
use crate::suggestion::SuggestionEngine;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Answers similarity, summary and chat requests over stored incidents
#[derive(Clone)]
pub struct IncidentAdvisor {
    pub(super) records: Arc<dyn IncidentStore>,
    pub(super) vectors: Arc<dyn VectorStore>,
    pub(super) vectorizer: Arc<dyn TextVectorizer>,
    pub(super) engine: SuggestionEngine,
    pub(super) advisory: Option<Arc<dyn AdvisoryService>>,
    pub(super) embedding: EmbeddingConfig,
    pub(super) features: FeatureFlags,
}

impl IncidentAdvisor {
    /// Heuristic-only advisor with the local hashing vectorizer
    pub fn new(stores: Stores, embedding: EmbeddingConfig) -> Self {
        let vectorizer = HashingVectorizer::new(embedding.dimension)
            .with_max_input_chars(embedding.max_input_chars);

        Self {
            records: stores.records,
            vectors: stores.vectors,
            vectorizer: Arc::new(vectorizer),
            engine: SuggestionEngine::heuristic_only(),
            advisory: None,
            embedding,
            features: FeatureFlags::default(),
        }
    }

    /// Build from the loaded configuration
    pub fn from_config(
        config: &Config,
        stores: Stores,
        advisory: Option<Arc<dyn AdvisoryService>>,
    ) -> Self {
        Self::new(stores, config.embedding.clone())
            .with_advisory(advisory)
            .with_features(config.features.clone())
    }

    /// Route suggestions and chat through an advisory service
    pub fn with_advisory(mut self, advisory: Option<Arc<dyn AdvisoryService>>) -> Self {
        self.engine = SuggestionEngine::new(advisory.clone());
        self.advisory = advisory;
        self
    }

    /// Swap the text vectorizer
    pub fn with_vectorizer(mut self, vectorizer: Arc<dyn TextVectorizer>) -> Self {
        self.vectorizer = vectorizer;
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn records(&self) -> &Arc<dyn IncidentStore> {
        &self.records
    }

    pub fn features(&self) -> &FeatureFlags {
        &self.features
    }

    pub fn embeddings_enabled(&self) -> bool {
        self.embedding.fallback != EmbeddingFallback::None
    }

    pub(super) fn ensure_embeddings_enabled(&self) -> Result<()> {
        if !self.embeddings_enabled() {
            return Err(AppError::Configuration(
                "Embeddings are disabled (embedding.fallback = none)".to_string(),
            ));
        }
        Ok(())
    }

    pub(super) fn embed_text(&self, text: &str) -> Result<EmbeddingVector> {
        self.ensure_embeddings_enabled()?;
        Ok(self.vectorizer.embed(text))
    }

    /// Load an incident or fail with NotFound
    pub async fn get_incident(&self, id: &Uuid) -> Result<Incident> {
        self.records
            .get_incident(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Incident {} not found", id)))
    }

    /// Stored incidents closest to `text`, most similar first.
    ///
    /// Blank text yields an empty list without embedding or touching the
    /// vector store. `k` is clamped to the supported range.
    pub async fn find_similar(&self, text: &str, k: usize) -> Result<Vec<SimilarIncident>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.embed_text(text)?;
        let k = SimilarityIndex::clamp_k(k);
        let neighbors = self.vectors.nearest(&query, k).await?;

        let mut similar = Vec::with_capacity(neighbors.len());
        for neighbor in neighbors {
            // Deleted between ranking and lookup
            if let Some(incident) = self.records.get_incident(&neighbor.id).await? {
                similar.push(SimilarIncident::from_incident(incident, neighbor.score));
            }
        }

        SIMILARITY_QUERIES_TOTAL.inc();
        tracing::debug!(k, results = similar.len(), "Similarity query answered");

        Ok(similar)
    }

    /// Classify arbitrary text
    pub async fn suggest(&self, title: &str, description: &str) -> SuggestionResult {
        self.engine.classify(title, description).await
    }

    /// Suggestion for a stored incident
    pub async fn summarize(&self, id: &Uuid) -> Result<IncidentSummary> {
        let incident = self.get_incident(id).await?;
        let suggestion = self
            .engine
            .classify(&incident.title, incident.description_or_empty())
            .await;

        tracing::info!(
            incident_id = %id,
            severity = %suggestion.severity_proposed,
            confidence = suggestion.confidence,
            "Incident summarized"
        );

        Ok(IncidentSummary {
            id: incident.id,
            suggestion,
        })
    }

    /// Conversational reply about one incident.
    ///
    /// Only NotFound (and storage failures while loading the incident) are
    /// returned as errors. Advisory problems become a fixed reply.
    pub async fn chat_context(&self, id: &Uuid, messages: Vec<ChatMessage>) -> Result<ChatReply> {
        let incident = self.get_incident(id).await?;
        let similar_incidents = self.similar_for_chat(&incident).await;

        let Some(advisory) = &self.advisory else {
            return Ok(ChatReply::new(CHAT_UNAVAILABLE_MESSAGE));
        };

        let request = ChatRequest {
            incident: ChatIncident::from(&incident),
            similar_incidents,
            messages,
        };

        match advisory.chat(&request).await {
            Ok(response) => {
                ADVISORY_CALLS_TOTAL.with_label_values(&["chat", "ok"]).inc();
                Ok(ChatReply::new(reply_text(&response).unwrap_or(NO_REPLY_MESSAGE)))
            }
            Err(e) => {
                ADVISORY_CALLS_TOTAL
                    .with_label_values(&["chat", "fallback"])
                    .inc();
                tracing::error!(incident_id = %id, error = %e, "Advisory chat failed");
                Ok(ChatReply::new(CHAT_UNAVAILABLE_MESSAGE))
            }
        }
    }

    async fn similar_for_chat(&self, incident: &Incident) -> Vec<SimilarIncident> {
        match self
            .find_similar(&incident.embedding_text(), CHAT_SIMILAR_LOOKUP)
            .await
        {
            Ok(similar) => similar
                .into_iter()
                .filter(|candidate| candidate.id != incident.id)
                .take(CHAT_SIMILAR_LIMIT)
                .collect(),
            Err(e) => {
                tracing::warn!(
                    incident_id = %incident.id,
                    error = %e,
                    "Similar incidents lookup failed, chatting without them"
                );
                Vec::new()
            }
        }
    }

    /// Free-form question answered over the most recent incidents
    pub async fn assistant_query(&self, question: &str) -> Result<ChatReply> {
        let question = question.trim().to_string();

        let Some(advisory) = &self.advisory else {
            return Ok(ChatReply::new(ASSISTANT_UNAVAILABLE_MESSAGE));
        };

        let incidents = self
            .records
            .list_incidents(&IncidentFilter::default(), 0, ASSISTANT_CONTEXT_LIMIT)
            .await?;

        tracing::info!(
            context_incidents = incidents.len(),
            "Forwarding question to advisory assistant"
        );

        let request = AssistantQueryRequest {
            question,
            incidents: incidents.iter().map(AssistantIncident::from).collect(),
        };

        match advisory.assistant_query(&request).await {
            Ok(response) => {
                ADVISORY_CALLS_TOTAL
                    .with_label_values(&["assistant", "ok"])
                    .inc();
                Ok(ChatReply::new(reply_text(&response).unwrap_or(NO_REPLY_MESSAGE)))
            }
            Err(e) => {
                ADVISORY_CALLS_TOTAL
                    .with_label_values(&["assistant", "fallback"])
                    .inc();
                tracing::error!(error = %e, "Advisory assistant query failed");
                Ok(ChatReply::new(ASSISTANT_UNAVAILABLE_MESSAGE))
            }
        }
    }
}

/// Non-empty `reply` string, if present
fn reply_text(response: &Value) -> Option<&str> {
    response
        .get("reply")
        .and_then(Value::as_str)
        .filter(|reply| !reply.is_empty())
}
