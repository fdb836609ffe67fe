//! Request/response plumbing between the API clients and an HTTP backend.
//!
//! The clients never talk to `reqwest` directly: they describe a call as a
//! [`TransportRequest`] and hand it to whatever [`Transport`] they were
//! constructed with. [`HttpTransport`] is the real implementation.

mod http;

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{JenkinsError, Result};

pub use http::HttpTransport;

pub const APPLICATION_FORM: &str = "application/x-www-form-urlencoded";

/// Executes requests against a Jenkins server.
pub trait Transport: Send + Sync {
    /// Root URL of the Jenkins instance, request paths are appended to it.
    fn base_url(&self) -> &Url;

    /// Whether request/response details should be logged.
    fn debug(&self) -> bool {
        false
    }

    fn execute(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse>> + Send;
}

pub enum RequestBody {
    Empty,
    Form(Vec<(String, String)>),
    Multipart(Form),
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => f.write_str("Empty"),
            Self::Form(pairs) => f.debug_tuple("Form").field(pairs).finish(),
            Self::Multipart(form) => write!(f, "Multipart(boundary={})", form.boundary()),
        }
    }
}

#[derive(Debug)]
pub struct TransportRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

impl TransportRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn form(mut self, pairs: Vec<(String, String)>) -> Self {
        self.body = RequestBody::Form(pairs);
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Header value as a string, `None` when absent or not valid UTF-8.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Turns any status outside `expected` into [`JenkinsError::UnexpectedStatus`].
    pub fn ensure_status(self, expected: &[u16]) -> Result<Self> {
        let status = self.status.as_u16();
        if expected.contains(&status) {
            Ok(self)
        } else {
            Err(JenkinsError::UnexpectedStatus {
                status,
                body: self.text(),
            })
        }
    }
}

/// Joins a request path and query onto the server root.
///
/// The root may carry a context path (`https://ci.example.com/jenkins`), so
/// the path is appended rather than resolved with [`Url::join`].
pub fn endpoint_url(base: &Url, path: &str, query: &[(String, String)]) -> Result<Url> {
    let root = base.as_str().trim_end_matches('/');
    let path = path.trim_start_matches('/');
    let mut url = Url::parse(&format!("{root}/{path}"))?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

/// Sends `request` and checks the status against `expected`.
pub(crate) async fn send<T: Transport>(
    transport: &T,
    request: TransportRequest,
    expected: &[u16],
) -> Result<TransportResponse> {
    transport.execute(request).await?.ensure_status(expected)
}

/// Sends `request`, checks the status and decodes the JSON body.
pub(crate) async fn send_json<T: Transport, R: DeserializeOwned>(
    transport: &T,
    request: TransportRequest,
    expected: &[u16],
) -> Result<R> {
    send(transport, request, expected).await?.json()
}
