use reqwest::Method;
use serde_json::Value;

/// Per-call options for [`FetchClient::request`](crate::FetchClient::request).
///
/// Everything defaults to a plain GET with no headers and no body.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// HTTP method; `None` means GET.
    pub method: Option<Method>,
    /// Extra request headers as name/value pairs.
    pub headers: Vec<(String, String)>,
    /// JSON request body, sent with `Content-Type: application/json`.
    pub body: Option<Value>,
    /// Overrides the configured attempt count for this call only.
    pub attempts: Option<u32>,
}

impl RequestOptions {
    /// Options for a POST carrying the given JSON body.
    pub fn post(body: Value) -> Self {
        Self {
            method: Some(Method::POST),
            body: Some(body),
            ..Self::default()
        }
    }

    /// Adds a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Overrides the attempt count for this call.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = Some(attempts);
        self
    }
}
