//! Composition root tying the vectorizer, similarity ranking, lifecycle
//! guard and suggestion engine to the record and vector stores.

mod embeddings;
mod records;
mod service;

pub use embeddings::RebuildReport;
pub use records::NewIncident;
pub use service::IncidentAdvisor;

/// Chat reply when the advisory service errors or cannot be reached
pub const CHAT_UNAVAILABLE_MESSAGE: &str = "AI assistant is unavailable (cannot reach the AI service). \
     You can still analyze the incident manually.";

/// Reply when the advisory service answers without a usable `reply`
pub const NO_REPLY_MESSAGE: &str =
    "AI assistant: no reply returned by the AI service (missing \"reply\" field).";

/// Assistant reply when the advisory service errors or cannot be reached
pub const ASSISTANT_UNAVAILABLE_MESSAGE: &str = "AI assistant temporarily unavailable. \
     You can still ask a human, or try again later.";

/// Similar incidents considered before dropping the incident itself
pub(crate) const CHAT_SIMILAR_LOOKUP: usize = 5;

/// Similar incidents forwarded with a chat request
pub(crate) const CHAT_SIMILAR_LIMIT: usize = 3;

/// Recent incidents sent as assistant context
pub(crate) const ASSISTANT_CONTEXT_LIMIT: u32 = 50;
