use std::collections::BTreeMap;

use axum::http::Method;
use serde_json::Value as JsonValue;
use url::Url;

use super::error::ProxyError;

/// How the upstream response is handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Parsed and normalized as JSON.
    Json,
    /// Streamed through as an `.xlsx` download.
    Spreadsheet,
}

/// One `action` → upstream path template mapping.
///
/// `{name}` segments are filled from the request parameters, percent-encoded.
#[derive(Debug, Clone, Copy)]
pub struct UpstreamRoute {
    pub action: &'static str,
    pub template: &'static str,
    pub kind: ResponseKind,
}

impl UpstreamRoute {
    #[must_use]
    pub const fn json(action: &'static str, template: &'static str) -> Self {
        Self {
            action,
            template,
            kind: ResponseKind::Json,
        }
    }

    #[must_use]
    pub const fn spreadsheet(action: &'static str, template: &'static str) -> Self {
        Self {
            action,
            template,
            kind: ResponseKind::Spreadsheet,
        }
    }
}

/// Static route table of one resource family. Immutable at request time.
#[derive(Debug, Clone, Copy)]
pub struct RouteTable {
    pub routes: &'static [UpstreamRoute],
    /// Action used when the request names none.
    pub default_action: &'static str,
    /// Action used when the request names none but carries an `id`.
    pub id_action: Option<&'static str>,
}

/// Parameters a request contributes to route derivation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub action: Option<String>,
    pub params: BTreeMap<String, String>,
}

impl Selection {
    /// Collect `action` and parameters from the query string, falling back
    /// to top-level string fields of a JSON body for anything the query
    /// does not set (so POSTs can carry `action`/`id` in the body).
    #[must_use]
    pub fn from_request(method: &Method, mut query: BTreeMap<String, String>, body: &[u8]) -> Self {
        if *method != Method::GET && *method != Method::HEAD && !body.is_empty() {
            if let Ok(JsonValue::Object(fields)) = serde_json::from_slice::<JsonValue>(body) {
                for key in ["action", "id"] {
                    if let Some(value) = fields.get(key).and_then(scalar_to_string) {
                        query.entry(key.to_owned()).or_insert(value);
                    }
                }
            }
        }

        let action = query.remove("action").filter(|a| !a.is_empty());
        Self {
            action,
            params: query,
        }
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A derived upstream target.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub action: &'static str,
    pub url: Url,
    pub kind: ResponseKind,
}

impl RouteTable {
    /// Pick the route for `selection` and render its URL under `base`.
    ///
    /// Parameters not consumed by the template are forwarded as query
    /// parameters.
    ///
    /// # Errors
    ///
    /// [`ProxyError::UnknownAction`] for an action outside the table and
    /// [`ProxyError::MissingParameter`] when a template segment has no value.
    pub fn resolve(&self, base: &Url, selection: &Selection) -> Result<ResolvedRoute, ProxyError> {
        let action = match selection.action.as_deref() {
            Some(action) => action,
            None => match self.id_action {
                Some(id_action) if selection.param("id").is_some() => id_action,
                _ => self.default_action,
            },
        };

        let route = self
            .routes
            .iter()
            .find(|r| r.action == action)
            .ok_or_else(|| ProxyError::UnknownAction(action.to_owned()))?;

        let (path, consumed) = render(route.template, selection)?;
        let mut url = Url::parse(&format!(
            "{}{}",
            base.as_str().trim_end_matches('/'),
            path
        ))
        .map_err(|e| ProxyError::Internal(format!("upstream URL for {action}: {e}")))?;

        let forwarded: Vec<_> = selection
            .params
            .iter()
            .filter(|(k, _)| !consumed.iter().any(|c| *c == k.as_str()))
            .collect();
        if !forwarded.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in forwarded {
                pairs.append_pair(key, value);
            }
        }

        Ok(ResolvedRoute {
            action: route.action,
            url,
            kind: route.kind,
        })
    }
}

fn render<'t>(
    template: &'t str,
    selection: &Selection,
) -> Result<(String, Vec<&'t str>), ProxyError> {
    let mut path = String::with_capacity(template.len());
    let mut consumed = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        path.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let end = after
            .find('}')
            .ok_or_else(|| ProxyError::Internal(format!("unterminated template: {template}")))?;
        let name = &after[..end];
        let value = selection
            .param(name)
            .ok_or_else(|| ProxyError::MissingParameter(name.to_owned()))?;
        path.push_str(&urlencoding::encode(value));
        consumed.push(name);
        rest = &after[end + 1..];
    }
    path.push_str(rest);

    Ok((path, consumed))
}
