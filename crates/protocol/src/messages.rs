use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Starts a background download of a remote resource.
///
/// `file_name` may be omitted; the worker then derives the name from the
/// response's Content-Disposition header or from the URL's last segment.
/// `auth_header_value` is an opaque, pre-built `Authorization` value
/// (for example `Bearer <token>`); the engine attaches it verbatim and
/// never inspects or stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDownloadRequest {
    pub url: String,
    pub destination_dir: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_header_value: Option<String>,
}

/// Submits one chunk of a client-driven upload session.
///
/// The first chunk of an unknown `session_id` implicitly creates the
/// session. The `data` field is base64-encoded in JSON. `target_dir` and
/// `final_file_name` only matter on the chunk marked `is_last`, but clients
/// typically send them on every chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadChunkRequest {
    pub session_id: String,
    pub chunk_index: u32,
    pub is_last: bool,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    pub target_dir: String,
    pub final_file_name: String,
}

// ---------------------------------------------------------------------------
// Acknowledgements
// ---------------------------------------------------------------------------

/// Immediate response to a download request; the transfer itself runs in
/// the background and reports through the event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadAck {
    Initiated,
}

/// Response to a chunk submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChunkAck {
    /// A non-terminal chunk was persisted.
    ChunkReceived {
        #[serde(rename = "chunkIndex")]
        chunk_index: u32,
    },
    /// The terminal chunk arrived and assembly completed.
    Success,
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
