use std::time::Duration;

use axum::extract::Request;
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::Response;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::Error;

const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(86_400);

/// CORS for every proxy response, fallback and error paths included.
///
/// `"*"` allows any origin; anything else is sent back verbatim.
///
/// # Errors
///
/// Returns [`Error::Config`] if `origin` is not a valid header value.
pub fn cors_layer(origin: &str) -> Result<CorsLayer, Error> {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        HeaderValue::from_str(origin)
            .map(AllowOrigin::exact)
            .map_err(|e| Error::Config(format!("allowed origin {origin:?}: {e}")))?
    };

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        // Lets browsers read the generated download filename.
        .expose_headers([CONTENT_DISPOSITION])
        .max_age(PREFLIGHT_MAX_AGE))
}

/// Preflights are answered by [`cors_layer`] before routing; report them as
/// `204 No Content`.
pub(crate) async fn no_content_preflight(request: Request, next: Next) -> Response {
    let preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::Body;
    use axum::http::header::{
        ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_EXPOSE_HEADERS,
        ACCESS_CONTROL_MAX_AGE,
    };
    use axum::middleware;
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;

    fn app(origin: &str) -> Router {
        Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(cors_layer(origin).unwrap())
            .layer(middleware::from_fn(no_content_preflight))
    }

    async fn call(app: Router, method: Method, uri: &str) -> Response {
        let request = axum::http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap()
    }

    #[tokio::test]
    async fn wildcard_origin_on_plain_response() {
        let response = call(app("*"), Method::GET, "/ping").await;
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[ACCESS_CONTROL_EXPOSE_HEADERS].to_str().unwrap().to_lowercase(),
            "content-disposition"
        );
    }

    #[tokio::test]
    async fn explicit_origin_is_echoed() {
        let response = call(app("https://admin.example.edu"), Method::GET, "/missing").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://admin.example.edu"
        );
    }

    #[tokio::test]
    async fn preflight_is_no_content_on_any_path() {
        for uri in ["/ping", "/missing"] {
            let response = call(app("*"), Method::OPTIONS, uri).await;
            assert_eq!(response.status(), StatusCode::NO_CONTENT, "{uri}");
            let headers = response.headers();
            assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "86400");
            let allowed = headers[ACCESS_CONTROL_ALLOW_HEADERS].to_str().unwrap().to_lowercase();
            assert!(allowed.contains("authorization"));
            assert!(allowed.contains("content-type"));
        }
    }

    #[test]
    fn invalid_origin_is_config_error() {
        assert!(matches!(cors_layer("bad\norigin"), Err(Error::Config(_))));
    }
}
