//! Newsletter subscription payloads.

use serde::{Deserialize, Serialize};

/// Request body for `POST /subscribe/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Response body for `POST /subscribe/`; both fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscribeReply {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
