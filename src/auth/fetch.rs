use bytes::Bytes;
use reqwest::{IntoUrl, Method, RequestBuilder, Response};

use super::classifier::{AuthFailureSignal, ErrorBody};
use super::handler::UnauthorizedHandler;
use crate::error::Error;

/// HTTP client whose every response passes through the unauthorized
/// classifier.
///
/// ```rust,ignore
/// let client = GuardedClient::new(handler);
/// let response = client.fetch(Method::GET, "https://portal.example.edu/api/leads").await?;
/// // An auth failure never reaches this point: `?` propagated
/// // `Error::Unauthorized` and the page is already headed to login.
/// ```
#[derive(Clone)]
pub struct GuardedClient {
    http: reqwest::Client,
    handler: UnauthorizedHandler,
}

impl GuardedClient {
    #[must_use]
    pub fn new(handler: UnauthorizedHandler) -> Self {
        Self {
            http: reqwest::Client::new(),
            handler,
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn handler(&self) -> &UnauthorizedHandler {
        &self.handler
    }

    /// Start a request on the underlying client.
    pub fn request(&self, method: Method, url: impl IntoUrl) -> RequestBuilder {
        self.http.request(method, url)
    }

    /// Attach `Authorization: Bearer <portal_token>` when a token is stored.
    #[must_use]
    pub fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.handler.credentials().token() {
            Some(token) => request.bearer_auth(token.as_str()),
            None => request,
        }
    }

    /// Send an authorized `method` request to `url` through [`send`](Self::send).
    ///
    /// # Errors
    ///
    /// See [`send`](Self::send).
    pub async fn fetch(&self, method: Method, url: impl IntoUrl) -> Result<Response, Error> {
        self.send(self.authorized(self.request(method, url))).await
    }

    /// Send `request` and classify the response.
    ///
    /// Success responses are returned untouched with their body unread.
    /// Other responses are buffered once, classified, and on a negative
    /// classification returned with the same status, headers and body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] after the handler has cleared the
    /// session, or [`Error::Http`] on transport failure.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, Error> {
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let (response, body) = buffer(response).await?;

        if let Some(signal) = AuthFailureSignal::detect(status, &ErrorBody::from_slice(&body)) {
            let failure = self.handler.handle(Some(&signal.reason()));
            return Err(failure.into());
        }

        Ok(response)
    }
}

/// Read the body once and rebuild an equivalent response around it, so the
/// caller still gets an unconsumed response.
///
/// The rebuilt response does not carry the original request URL.
async fn buffer(response: Response) -> Result<(Response, Bytes), reqwest::Error> {
    let status = response.status();
    let version = response.version();
    let headers = response.headers().clone();
    let body = response.bytes().await?;

    let mut rebuilt = http::Response::new(body.clone());
    *rebuilt.status_mut() = status;
    *rebuilt.version_mut() = version;
    *rebuilt.headers_mut() = headers;

    Ok((Response::from(rebuilt), body))
}
