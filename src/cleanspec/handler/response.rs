use crate::exceptions::Exception;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Externally visible error payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: Option<String>,
    pub error_code: String,
    pub event_id: Uuid,
    #[serde(default)]
    pub additional_info: Map<String, JsonValue>,
}

/// What the transport layer sends back: a status, extra headers and the body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: ErrorBody,
}

impl ErrorResponse {
    pub fn new(status: u16, body: ErrorBody) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Response built from the exception's own public fields.
    ///
    /// Status follows the exception's kind. Only meant for public kinds; the
    /// handler never calls it for `Unexpected`.
    pub fn from_exception(exc: &Exception, event_id: Uuid, expose_info: bool) -> Self {
        let additional_info = if expose_info {
            exc.additional_info().clone()
        } else {
            Map::new()
        };
        Self {
            status: exc.kind().status_code(),
            headers: exc.headers().clone(),
            body: ErrorBody {
                detail: Some(exc.message().to_string()),
                error_code: exc.code().to_string(),
                event_id,
                additional_info,
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.body)
    }
}
