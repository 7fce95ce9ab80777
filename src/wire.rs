use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    types::{EnhancementOptions, Operation, WebhookEvent},
    GcxError,
};

/// `{"error": {...}}` envelope carried by every non-2xx response.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub balance: Option<i64>,
    #[serde(default)]
    pub required: Option<i64>,
    #[serde(default)]
    pub retry_after: Option<u64>,
}

/// Decodes an error body, falling back to an empty detail when the body is
/// not the documented shape. Missing code/message get stable defaults.
pub(crate) fn decode_error_detail(body: &str, status: u16) -> ErrorDetail {
    let mut detail = serde_json::from_str::<ErrorResponse>(body)
        .map(|response| response.error)
        .unwrap_or_default();
    if detail.code.is_empty() {
        detail.code = "unknown_error".to_owned();
    }
    if detail.message.is_empty() {
        detail.message = format!("Request failed with status {status}");
    }
    detail
}

/// Decodes a 2xx envelope body into a typed model value.
pub(crate) fn decode<T: DeserializeOwned>(body: serde_json::Value) -> Result<T, GcxError> {
    serde_json::from_value(body)
        .map_err(|err| GcxError::Decode(format!("invalid response body: {err}")))
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateJobBody {
    pub image_url: String,
    pub operations: Vec<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<EnhancementOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub(crate) struct EstimateBody {
    pub operations: Vec<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<EnhancementOptions>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateWebhookBody {
    pub url: String,
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateWebhookBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<WebhookEvent>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}
