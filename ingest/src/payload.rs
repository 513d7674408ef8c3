use serde::{Deserialize, Serialize};

/// The `index-document` job payload, bit-exact with the wire contract every
/// enqueuer and worker agrees on: `{documentId, campaignId, storageKey,
/// mimeType}`, with `documentId`/`campaignId` carried as UUID strings so the
/// payload round-trips through any queue transport's own serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexDocumentPayload {
    /// The document being ingested, as a UUID string.
    pub document_id: String,
    /// The owning campaign, as a UUID string.
    pub campaign_id: String,
    /// The blob store key the raw bytes were uploaded under.
    pub storage_key: String,
    /// The document's declared MIME type.
    pub mime_type: String,
}
