use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use serde_json::Value as JsonValue;

/// Upper bound on how much of an unrecognized body is echoed back.
pub const SNIPPET_LIMIT: usize = 500;

/// An upstream body, classified once at the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    Json {
        status: StatusCode,
        payload: JsonValue,
    },
    /// `204 No Content` with nothing to parse.
    Empty { status: StatusCode },
    Unrecognized {
        status: StatusCode,
        content_type: Option<String>,
        raw: String,
    },
}

impl UpstreamBody {
    #[must_use]
    pub fn classify(status: StatusCode, content_type: Option<String>, raw: String) -> Self {
        if status == StatusCode::NO_CONTENT && raw.trim().is_empty() {
            return Self::Empty { status };
        }
        match serde_json::from_str(&raw) {
            Ok(payload) => Self::Json { status, payload },
            Err(_) => Self::Unrecognized {
                status,
                content_type,
                raw,
            },
        }
    }

    /// Read a response body exactly once and classify it.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the body cannot be read.
    pub async fn read(response: reqwest::Response) -> Result<Self, reqwest::Error> {
        let status = response.status();
        let content_type = content_type(response.headers());
        let raw = response.text().await?;
        Ok(Self::classify(status, content_type, raw))
    }
}

pub(crate) fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// First `limit` bytes of `raw`, cut back to a char boundary.
#[must_use]
pub fn snippet(raw: &str, limit: usize) -> String {
    if raw.len() <= limit {
        return raw.to_owned();
    }
    let mut end = limit;
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_owned()
}
