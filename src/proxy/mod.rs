//! Stateless forwarding proxies between the browser and the upstream API.
//!
//! Each resource family is mounted at `{mount}/{family}` and accepts any
//! method. `OPTIONS` is answered by the CORS layer before routing with
//! `204`; everything else needs an
//! `Authorization` header, an action from the family's fixed route table,
//! and gets back either normalized JSON or a streamed spreadsheet.
//!
//! ```rust,ignore
//! let config = GatewayConfig::from_env()?;
//! let app = portal_gateway::proxy::gateway_routes(&config)?;
//! axum::serve(listener, app).await?;
//! ```

mod cors;
mod error;
mod families;
mod handler;
mod routes;
mod upstream;

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use serde_json::json;

pub use cors::cors_layer;
pub use error::{ProxyError, UpstreamDiagnostics};
pub use families::{APPLICANTS, EVENTS, FAMILIES, LEADS, ProxyFamily, REPORTS};
pub use handler::XLSX_CONTENT_TYPE;
pub use routes::{ResolvedRoute, ResponseKind, RouteTable, Selection, UpstreamRoute};
pub use upstream::{SNIPPET_LIMIT, UpstreamBody, snippet};

use crate::config::GatewayConfig;
use crate::error::Error;
use handler::ProxyState;

/// Build the proxy router with an HTTP client honoring the configured
/// upstream timeout.
///
/// # Errors
///
/// Returns [`Error::Http`] if the client cannot be built, or
/// [`Error::Config`] for an invalid CORS origin.
pub fn gateway_routes(config: &GatewayConfig) -> Result<Router, Error> {
    let http = reqwest::Client::builder()
        .timeout(config.upstream_timeout())
        .build()?;
    gateway_routes_with_client(config, http)
}

/// Build the proxy router around an existing client.
///
/// # Errors
///
/// Returns [`Error::Config`] for an invalid CORS origin.
pub fn gateway_routes_with_client(
    config: &GatewayConfig,
    http: reqwest::Client,
) -> Result<Router, Error> {
    let allow_cors = cors_layer(config.allowed_origin())?;
    let upstream = Arc::new(config.upstream().clone());
    let mount = config.mount_path().trim_end_matches('/');

    let mut router = Router::new();
    for family in FAMILIES {
        let state = ProxyState {
            http: http.clone(),
            upstream: upstream.clone(),
            family,
        };
        router = router.route(
            &format!("{mount}/{}", family.name),
            any(handler::forward).with_state(state),
        );
    }

    Ok(router
        .fallback(not_found)
        .layer(allow_cors)
        .layer(middleware::from_fn(cors::no_content_preflight)))
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": "Not found" })),
    )
        .into_response()
}
