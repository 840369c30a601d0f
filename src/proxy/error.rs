use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

/// Diagnostic context for an upstream body that was not JSON.
#[derive(Debug, Clone, Serialize)]
pub struct UpstreamDiagnostics {
    pub url: String,
    pub status: u16,
    #[serde(rename = "contentType")]
    pub content_type: Option<String>,
    pub body_snippet: String,
}

/// Everything the proxy can answer with instead of an upstream payload.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// No `Authorization` header; rejected before any upstream call.
    #[error("Authorization header required")]
    MissingAuthorization,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// Upstream answered with something other than JSON (usually an HTML
    /// challenge or error page).
    #[error("Upstream returned non-JSON response")]
    UpstreamProtocol(UpstreamDiagnostics),

    /// Upstream JSON classified as an authentication failure.
    #[error("{message}")]
    UpstreamUnauthorized { message: String },

    /// Network failure or timeout talking to the upstream. `message` is the
    /// family's client-facing text; `source` is only logged.
    #[error("{message}")]
    Transport {
        message: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProxyError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingAuthorization | Self::UpstreamUnauthorized { .. } => {
                StatusCode::UNAUTHORIZED
            }
            Self::UnknownAction(_) | Self::MissingParameter(_) | Self::InvalidParameter { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::UpstreamProtocol(_) => StatusCode::BAD_GATEWAY,
            Self::Transport { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::UpstreamProtocol(diagnostics) => json!({
                "success": false,
                "error": self.to_string(),
                "upstream": diagnostics,
            }),
            Self::Internal(detail) => {
                tracing::error!(detail = %detail, "Proxy internal error");
                json!({ "success": false, "error": "Internal error" })
            }
            _ => json!({ "success": false, "error": self.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
