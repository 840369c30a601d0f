use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::header::{
    ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use time::OffsetDateTime;
use url::Url;

use super::error::{ProxyError, UpstreamDiagnostics};
use super::families::ProxyFamily;
use super::routes::{ResolvedRoute, ResponseKind, Selection};
use super::upstream::{SNIPPET_LIMIT, UpstreamBody, snippet};
use crate::auth::{ErrorBody, is_unauthorized, mentions_auth_failure};
use crate::filename;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Per-family handler state. Nothing here is mutated by requests.
#[derive(Clone)]
pub(crate) struct ProxyState {
    pub(crate) http: reqwest::Client,
    pub(crate) upstream: Arc<Url>,
    pub(crate) family: &'static ProxyFamily,
}

/// Entry point for every method on a family's path. Preflights never get
/// here; the router's CORS layer answers them.
///
/// If the caller disconnects, axum drops this future and the in-flight
/// upstream request with it.
pub(crate) async fn forward(
    State(state): State<ProxyState>,
    method: Method,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    relay(&state, method, &headers, parse_query(query.as_deref()), body)
        .await
        .unwrap_or_else(IntoResponse::into_response)
}

async fn relay(
    state: &ProxyState,
    method: Method,
    headers: &HeaderMap,
    query: BTreeMap<String, String>,
    body: Bytes,
) -> Result<Response, ProxyError> {
    let authorization = headers
        .get(AUTHORIZATION)
        .filter(|v| !v.as_bytes().trim_ascii().is_empty())
        .cloned()
        .ok_or(ProxyError::MissingAuthorization)?;

    let selection = Selection::from_request(&method, query, &body);
    let route = state.family.routes.resolve(&state.upstream, &selection)?;

    // Settle the filename before spending an upstream call on a bad request.
    let download_name = match route.kind {
        ResponseKind::Spreadsheet => Some(download_filename(&selection)?),
        ResponseKind::Json => None,
    };

    tracing::debug!(
        family = state.family.name,
        action = route.action,
        method = %method,
        "Forwarding to upstream"
    );

    let accept = match route.kind {
        ResponseKind::Json => "application/json",
        ResponseKind::Spreadsheet => XLSX_CONTENT_TYPE,
    };
    let mut request = state
        .http
        .request(method.clone(), route.url.clone())
        .header(AUTHORIZATION, authorization)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, accept);
    if method != Method::GET && method != Method::HEAD && !body.is_empty() {
        request = request.body(body);
    }

    let upstream = request
        .send()
        .await
        .map_err(|e| transport_error(state, &route, e))?;

    match download_name {
        Some(name) if upstream.status().is_success() => stream_download(upstream, &name),
        _ => normalize(state, &route, upstream).await,
    }
}

/// Parse the upstream body once and turn it into the caller's response.
async fn normalize(
    state: &ProxyState,
    route: &ResolvedRoute,
    upstream: reqwest::Response,
) -> Result<Response, ProxyError> {
    let body = UpstreamBody::read(upstream)
        .await
        .map_err(|e| transport_error(state, route, e))?;

    match body {
        UpstreamBody::Json { status, payload } => {
            let code = status.as_u16();
            let fields = ErrorBody::from_value(&payload);
            // Real 401/403 responses already trip the client's status check.
            if !matches!(code, 401 | 403) && is_unauthorized(code, &fields) {
                let message = [fields.error.as_deref(), fields.message.as_deref()]
                    .into_iter()
                    .flatten()
                    .find(|text| mentions_auth_failure(text))
                    .unwrap_or("Unauthorized")
                    .to_owned();
                tracing::warn!(
                    family = state.family.name,
                    status = code,
                    message = %message,
                    "Upstream reported an auth failure in its body"
                );
                return Err(ProxyError::UpstreamUnauthorized { message });
            }
            Ok((status, Json(payload)).into_response())
        }
        UpstreamBody::Empty { status } => Ok(status.into_response()),
        UpstreamBody::Unrecognized {
            status,
            content_type,
            raw,
        } => {
            tracing::warn!(
                family = state.family.name,
                url = %route.url,
                status = status.as_u16(),
                content_type = content_type.as_deref().unwrap_or("-"),
                "Upstream returned non-JSON body"
            );
            Err(ProxyError::UpstreamProtocol(UpstreamDiagnostics {
                url: route.url.to_string(),
                status: status.as_u16(),
                content_type,
                body_snippet: snippet(&raw, SNIPPET_LIMIT),
            }))
        }
    }
}

fn stream_download(upstream: reqwest::Response, filename: &str) -> Result<Response, ProxyError> {
    let content_length = upstream.headers().get(CONTENT_LENGTH).cloned();
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| ProxyError::Internal(format!("content-disposition: {e}")))?;

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE));
    headers.insert(CONTENT_DISPOSITION, disposition);
    if let Some(len) = content_length {
        headers.insert(CONTENT_LENGTH, len);
    }
    Ok(response)
}

/// Report filename when type, location and date are given; otherwise the
/// Masterclass pattern for the given date, or today.
fn download_filename(selection: &Selection) -> Result<String, ProxyError> {
    let invalid_date = |e: crate::Error| ProxyError::InvalidParameter {
        name: "date",
        reason: e.to_string(),
    };
    match (
        selection.param("type"),
        selection.param("location"),
        selection.param("date"),
    ) {
        (Some(kind), Some(location), Some(date)) => {
            filename::report_filename(kind, location, date).map_err(invalid_date)
        }
        (_, _, Some(date)) => filename::parse_event_date(date)
            .map(filename::masterclass_filename)
            .map_err(invalid_date),
        _ => Ok(filename::masterclass_filename(
            OffsetDateTime::now_utc().date(),
        )),
    }
}

fn transport_error(
    state: &ProxyState,
    route: &ResolvedRoute,
    source: reqwest::Error,
) -> ProxyError {
    tracing::error!(
        family = state.family.name,
        url = %route.url,
        timeout = source.is_timeout(),
        error = %source,
        "Upstream request failed"
    );
    ProxyError::Transport {
        message: state.family.transport_error,
        source,
    }
}

fn parse_query(query: Option<&str>) -> BTreeMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}
