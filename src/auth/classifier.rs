use serde_json::Value as JsonValue;

/// Literal phrases that mark an error body as an authentication failure.
///
/// Matched by lower-cased substring containment, nothing fuzzier. The list is
/// coupled to upstream wording: a reworded message silently degrades to a
/// plain error without auto-logout.
pub const AUTH_FAILURE_PHRASES: [&str; 8] = [
    "unauthorized",
    "token expired",
    "invalid token",
    "jwt expired",
    "no authentication token",
    "authentication required",
    "not authenticated",
    "session expired",
];

/// The `error`/`message` fields of a heterogeneous error payload.
///
/// Non-string values are ignored rather than rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn new(error: Option<&str>, message: Option<&str>) -> Self {
        Self {
            error: error.map(str::to_owned),
            message: message.map(str::to_owned),
        }
    }

    #[must_use]
    pub fn from_value(value: &JsonValue) -> Self {
        let field = |key: &str| value.get(key).and_then(JsonValue::as_str).map(str::to_owned);
        Self {
            error: field("error"),
            message: field("message"),
        }
    }

    /// Best-effort parse; anything that is not JSON yields an empty body.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        serde_json::from_slice::<JsonValue>(bytes)
            .map(|v| Self::from_value(&v))
            .unwrap_or_default()
    }

    /// `error` if present, otherwise `message`.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

/// Transient per-response auth failure. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthFailureSignal {
    pub status: u16,
    pub raw_message: Option<String>,
}

impl AuthFailureSignal {
    /// Classify a response, yielding a signal on an auth failure.
    #[must_use]
    pub fn detect(status: u16, body: &ErrorBody) -> Option<Self> {
        is_unauthorized(status, body).then(|| Self {
            status,
            raw_message: body.text().map(str::to_owned),
        })
    }

    /// Human-readable reason for logs and the handler.
    #[must_use]
    pub fn reason(&self) -> String {
        match &self.raw_message {
            Some(msg) => format!("HTTP {}: {msg}", self.status),
            None => format!("HTTP {}", self.status),
        }
    }
}

/// Whether `(status, body)` represents an authentication failure.
///
/// 401 and 403 short-circuit. Otherwise `error` and `message` are both
/// checked against [`AUTH_FAILURE_PHRASES`], since the upstream sometimes
/// reports auth failures as HTTP 200 with an error string.
#[must_use]
pub fn is_unauthorized(status: u16, body: &ErrorBody) -> bool {
    if matches!(status, 401 | 403) {
        return true;
    }
    [body.error.as_deref(), body.message.as_deref()]
        .into_iter()
        .flatten()
        .any(mentions_auth_failure)
}

/// Case-insensitive containment check against [`AUTH_FAILURE_PHRASES`].
#[must_use]
pub fn mentions_auth_failure(text: &str) -> bool {
    let lowered = text.to_lowercase();
    AUTH_FAILURE_PHRASES
        .iter()
        .any(|phrase| lowered.contains(phrase))
}
