use async_trait::async_trait;
use incident_copilot::{
    advisor::{
        IncidentAdvisor, NewIncident, ASSISTANT_UNAVAILABLE_MESSAGE, CHAT_UNAVAILABLE_MESSAGE,
        NO_REPLY_MESSAGE,
    },
    advisory::{
        AdvisoryService, AssistantQueryRequest, ChatRequest, HttpAdvisoryClient, SuggestRequest,
    },
    config::EmbeddingConfig,
    embedding::EmbeddingVector,
    error::{AppError, Result},
    models::{ChatMessage, Incident, Severity},
    similarity::Candidate,
    state::{create_in_memory_store, InMemoryStore, IncidentStore, Stores, VectorStore},
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Vector store that counts reads and can be told to fail
struct ProbeVectors {
    inner: InMemoryStore,
    reads: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl VectorStore for ProbeVectors {
    async fn write_vector(&self, id: &Uuid, vector: &EmbeddingVector) -> Result<()> {
        self.inner.write_vector(id, vector).await
    }

    async fn load_candidates(&self) -> Result<Vec<Candidate>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Storage("vector index offline".to_string()));
        }
        self.inner.load_candidates().await
    }
}

fn probe_stores(fail: bool) -> (Stores, Arc<ProbeVectors>) {
    let inner = InMemoryStore::new();
    let probe = Arc::new(ProbeVectors {
        inner: inner.clone(),
        reads: AtomicUsize::new(0),
        fail,
    });
    let stores = Stores {
        records: Arc::new(inner),
        vectors: probe.clone(),
    };
    (stores, probe)
}

/// Advisory stub that records chat payloads
#[derive(Default)]
struct RecordingAdvisory {
    chats: Mutex<Vec<Value>>,
    reply: Option<Value>,
}

#[async_trait]
impl AdvisoryService for RecordingAdvisory {
    async fn suggest(&self, _request: &SuggestRequest) -> Result<Value> {
        Err(AppError::AdvisoryUnavailable("not used".to_string()))
    }

    async fn chat(&self, request: &ChatRequest) -> Result<Value> {
        self.chats
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());
        self.reply
            .clone()
            .ok_or_else(|| AppError::AdvisoryUnavailable("down".to_string()))
    }

    async fn assistant_query(&self, _request: &AssistantQueryRequest) -> Result<Value> {
        Err(AppError::AdvisoryUnavailable("down".to_string()))
    }
}

async fn seed(advisor: &IncidentAdvisor, title: &str, description: &str) -> Incident {
    let incident = Incident::new(
        title.to_string(),
        Some(description.to_string()),
        Severity::Sev3,
    );
    advisor.records().save_incident(&incident).await.unwrap();
    advisor.upsert_embedding(&incident.id).await.unwrap();
    incident
}

#[tokio::test]
async fn test_blank_query_skips_vector_store() {
    let (stores, probe) = probe_stores(false);
    let advisor = IncidentAdvisor::new(stores, EmbeddingConfig::default());

    assert!(advisor.find_similar("", 5).await.unwrap().is_empty());
    assert!(advisor.find_similar("  \t ", 5).await.unwrap().is_empty());
    assert_eq!(probe.reads.load(Ordering::SeqCst), 0);

    advisor.find_similar("db", 5).await.unwrap();
    assert_eq!(probe.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_find_similar_ranks_stored_incidents() {
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default());

    let billing = seed(&advisor, "Billing API 5xx", "billing api failing").await;
    let _cdn = seed(&advisor, "CDN purge stuck", "cache purge queue").await;
    let unembedded = Incident::new("billing api".to_string(), None, Severity::Sev2);
    advisor.records().save_incident(&unembedded).await.unwrap();

    let similar = advisor.find_similar("billing api", 5).await.unwrap();

    assert_eq!(similar.len(), 2);
    assert_eq!(similar[0].id, billing.id);
    assert!(similar[0].score <= similar[1].score);
    assert!(similar.iter().all(|s| s.id != unembedded.id));
}

#[tokio::test]
async fn test_find_similar_clamps_k() {
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default());
    for i in 0..25 {
        seed(&advisor, &format!("network flap {}", i), "network").await;
    }

    assert_eq!(advisor.find_similar("network", 100).await.unwrap().len(), 20);
    assert_eq!(advisor.find_similar("network", 0).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_storage_failure_propagates_from_find_similar() {
    let (stores, _probe) = probe_stores(true);
    let advisor = IncidentAdvisor::new(stores, EmbeddingConfig::default());

    let result = advisor.find_similar("db", 5).await;
    assert!(matches!(result, Err(AppError::Storage(_))));
}

#[tokio::test]
async fn test_summarize_tags_result_with_incident_id() {
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default());
    let incident = seed(&advisor, "Major outage", "data loss on payments").await;

    let summary = advisor.summarize(&incident.id).await.unwrap();
    assert_eq!(summary.id, incident.id);
    assert_eq!(summary.suggestion.severity_proposed, Severity::Sev1);

    let body = serde_json::to_value(&summary).unwrap();
    assert_eq!(body["id"], json!(incident.id));
    assert_eq!(body["severityProposed"], json!("SEV1"));
}

#[tokio::test]
async fn test_chat_forwards_context_without_self() {
    let advisory = Arc::new(RecordingAdvisory {
        reply: Some(json!({ "reply": "Fail over the primary." })),
        ..Default::default()
    });
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default())
        .with_advisory(Some(advisory.clone() as Arc<dyn AdvisoryService>));

    let target = seed(&advisor, "db primary down", "db connections refused").await;
    for i in 0..4 {
        seed(&advisor, &format!("db replica lag {}", i), "db slow").await;
    }

    let reply = advisor
        .chat_context(&target.id, vec![ChatMessage::user("What should I check first?")])
        .await
        .unwrap();
    assert_eq!(reply.reply, "Fail over the primary.");

    let chats = advisory.chats.lock().unwrap();
    let payload = &chats[0];
    assert_eq!(payload["incident"]["id"], json!(target.id));
    assert_eq!(payload["messages"][0]["role"], json!("user"));

    let similar = payload["similar_incidents"].as_array().unwrap();
    assert_eq!(similar.len(), 3);
    assert!(similar.iter().all(|s| s["id"] != json!(target.id)));
}

#[tokio::test]
async fn test_chat_degrades_when_advisory_fails() {
    let advisory = Arc::new(RecordingAdvisory::default());
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default())
        .with_advisory(Some(advisory as Arc<dyn AdvisoryService>));
    let incident = seed(&advisor, "auth outage", "tokens rejected").await;

    let reply = advisor.chat_context(&incident.id, Vec::new()).await.unwrap();
    assert_eq!(reply.reply, CHAT_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn test_chat_without_reply_field() {
    let advisory = Arc::new(RecordingAdvisory {
        reply: Some(json!({ "answer": "wrong field" })),
        ..Default::default()
    });
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default())
        .with_advisory(Some(advisory as Arc<dyn AdvisoryService>));
    let incident = seed(&advisor, "queue stuck", "").await;

    let reply = advisor.chat_context(&incident.id, Vec::new()).await.unwrap();
    assert_eq!(reply.reply, NO_REPLY_MESSAGE);
}

#[tokio::test]
async fn test_chat_survives_similarity_failure() {
    let (stores, _probe) = probe_stores(true);
    let advisory = Arc::new(RecordingAdvisory {
        reply: Some(json!({ "reply": "ok" })),
        ..Default::default()
    });
    let advisor = IncidentAdvisor::new(stores, EmbeddingConfig::default())
        .with_advisory(Some(advisory.clone() as Arc<dyn AdvisoryService>));

    let incident = Incident::new("cdn errors".to_string(), None, Severity::Sev2);
    advisor.records().save_incident(&incident).await.unwrap();

    let reply = advisor.chat_context(&incident.id, Vec::new()).await.unwrap();
    assert_eq!(reply.reply, "ok");

    let chats = advisory.chats.lock().unwrap();
    assert_eq!(chats[0]["similar_incidents"], json!([]));
}

#[tokio::test]
async fn test_chat_unknown_incident_is_not_found() {
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default());
    let result = advisor.chat_context(&Uuid::new_v4(), Vec::new()).await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_chat_over_http_advisory() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/incident-chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"reply":"Check the load balancer health checks."}"#)
        .create_async()
        .await;

    let client = HttpAdvisoryClient::new(&server.url(), 2).unwrap();
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default())
        .with_advisory(Some(Arc::new(client) as Arc<dyn AdvisoryService>));
    let incident = seed(&advisor, "network partition", "us-east").await;

    let reply = advisor
        .chat_context(&incident.id, vec![ChatMessage::user("next steps?")])
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(reply.reply, "Check the load balancer health checks.");
}

#[tokio::test]
async fn test_assistant_query_sends_recent_incidents() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/assistant/query")
        .match_body(mockito::Matcher::PartialJson(json!({ "question": "What broke today?" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"reply":"Two database incidents."}"#)
        .create_async()
        .await;

    let client = HttpAdvisoryClient::new(&server.url(), 2).unwrap();
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default())
        .with_advisory(Some(Arc::new(client) as Arc<dyn AdvisoryService>));
    seed(&advisor, "db failover", "").await;

    let reply = advisor.assistant_query("  What broke today?  ").await.unwrap();

    mock.assert_async().await;
    assert_eq!(reply.reply, "Two database incidents.");
}

#[tokio::test]
async fn test_assistant_query_unavailable() {
    let advisor = IncidentAdvisor::new(create_in_memory_store(), EmbeddingConfig::default())
        .with_advisory(Some(
            Arc::new(HttpAdvisoryClient::new("http://127.0.0.1:9", 1).unwrap())
                as Arc<dyn AdvisoryService>,
        ));

    let reply = advisor.assistant_query("anything?").await.unwrap();
    assert_eq!(reply.reply, ASSISTANT_UNAVAILABLE_MESSAGE);
}

#[tokio::test]
async fn test_create_incident_embeds_in_background() {
    let stores = create_in_memory_store();
    let advisor = IncidentAdvisor::new(stores.clone(), EmbeddingConfig::default());

    let created = advisor
        .create_incident(NewIncident {
            title: "Billing API latency".to_string(),
            description: Some("p99 above 3s".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let mut embedded = false;
    for _ in 0..50 {
        let stored = stores.records.get_incident(&created.id).await.unwrap().unwrap();
        if stored.has_embedding() {
            embedded = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(embedded, "auto-embed did not complete");
}
