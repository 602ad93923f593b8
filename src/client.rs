use std::time::Duration;

use reqwest::Method;
use serde_json::Value;
use tokio::time::sleep;

use crate::{FetchConfig, FetchError, RequestOptions, Result, SharedConfig};

/// Resilient JSON HTTP client.
///
/// Every call runs a bounded attempt loop: each attempt gets its own
/// timeout, any failed attempt (timeout, transport error, undecodable
/// body, or non-2xx status) is retried after an exponential backoff as
/// long as attempts remain, and the last attempt's error is what the
/// caller sees. Note that non-2xx of *any* class is retried, 4xx
/// included — the loop treats every attempt failure uniformly.
#[derive(Clone, Debug)]
pub struct FetchClient {
    http: reqwest::Client,
    config: SharedConfig,
}

impl FetchClient {
    /// Creates a client with default [`FetchConfig`] values.
    pub fn new() -> Self {
        Self::with_config(SharedConfig::default())
    }

    /// Creates a client sharing an existing configuration handle.
    ///
    /// Updates through any clone of the handle take effect on the next
    /// attempt of calls already in flight.
    pub fn with_config(config: SharedConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// The configuration handle this client reads from.
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// GET the target and decode the response body as JSON.
    pub async fn get_json(&self, target: &str) -> Result<Value> {
        self.request(target, RequestOptions::default()).await
    }

    /// POST a JSON body to the target and decode the response.
    pub async fn post_json(&self, target: &str, body: Value) -> Result<Value> {
        self.request(target, RequestOptions::post(body)).await
    }

    /// Performs a request with explicit per-call options.
    ///
    /// Returns the decoded JSON body on success; an empty body decodes
    /// to [`Value::Null`]. The attempt count is fixed when the call
    /// starts (`options.attempts`, else the configured value); timeout
    /// and backoff values are re-read from the shared configuration on
    /// every attempt.
    pub async fn request(&self, target: &str, options: RequestOptions) -> Result<Value> {
        let attempts = options
            .attempts
            .unwrap_or_else(|| self.config.get().attempts)
            .max(1);

        let mut attempt = 0u32;
        loop {
            let config = self.config.get();
            match self.attempt_once(target, &options, &config).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt + 1 < attempts {
                        self.wait_before_retry(attempt, &config).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    /// One full request/response cycle under the per-attempt timeout.
    async fn attempt_once(
        &self,
        target: &str,
        options: &RequestOptions,
        config: &FetchConfig,
    ) -> Result<Value> {
        let method = options.method.clone().unwrap_or(Method::GET);
        let mut request = self
            .http
            .request(method, target)
            .timeout(Duration::from_millis(config.timeout_ms));
        for (name, value) in &options.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        // The timeout is scoped to this one send() future, so it cannot
        // fire against a later attempt.
        let response = request.send().await.map_err(classify_transport)?;
        let status = response.status();
        let text = response.text().await.map_err(classify_transport)?;

        let data = if text.is_empty() {
            Value::Null
        } else {
            serde_json::from_str::<Value>(&text)
                .map_err(|err| FetchError::InvalidBody(err.to_string()))?
        };

        if !status.is_success() {
            return Err(FetchError::Failed {
                status: status.as_u16(),
                message: status_error_message(&data),
            });
        }

        Ok(data)
    }

    /// Waits `min(base_delay_ms * 2^attempt, max_delay_ms)` before the
    /// next attempt.
    async fn wait_before_retry(&self, attempt: u32, config: &FetchConfig) {
        let delay_ms = backoff_delay_ms(attempt, config);

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying request after {} ms", delay_ms);

        sleep(Duration::from_millis(delay_ms)).await;
    }
}

impl Default for FetchClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Exponential backoff with a cap. The exponent saturates at 16 so the
/// shift cannot overflow before the cap applies.
fn backoff_delay_ms(attempt: u32, config: &FetchConfig) -> u64 {
    let exp = attempt.min(16);
    config
        .base_delay_ms
        .saturating_mul(1u64 << exp)
        .min(config.max_delay_ms)
}

/// Message for a non-2xx response, taken from the body's `error` field.
///
/// String values are used as-is and other values are rendered as JSON
/// text; an absent field, empty string, zero, `false` or `null` falls
/// back to the generic message.
fn status_error_message(data: &Value) -> String {
    match data.get("error") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        Some(Value::Number(number)) if number.as_f64() != Some(0.0) => number.to_string(),
        Some(value @ (Value::Array(_) | Value::Object(_))) => value.to_string(),
        Some(Value::Bool(true)) => "true".to_owned(),
        _ => "Request failed".to_owned(),
    }
}

fn classify_transport(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::TimedOut
    } else {
        FetchError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{backoff_delay_ms, status_error_message};
    use crate::FetchConfig;

    fn config(base: u64, max: u64) -> FetchConfig {
        FetchConfig {
            base_delay_ms: base,
            max_delay_ms: max,
            ..FetchConfig::default()
        }
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let config = config(10, 1_000);
        assert_eq!(backoff_delay_ms(0, &config), 10);
        assert_eq!(backoff_delay_ms(1, &config), 20);
        assert_eq!(backoff_delay_ms(2, &config), 40);
    }

    #[test]
    fn backoff_is_capped_at_max_delay() {
        let config = config(100, 250);
        assert_eq!(backoff_delay_ms(0, &config), 100);
        assert_eq!(backoff_delay_ms(1, &config), 200);
        assert_eq!(backoff_delay_ms(2, &config), 250);
        assert_eq!(backoff_delay_ms(10, &config), 250);
    }

    #[test]
    fn backoff_exponent_saturates_without_overflow() {
        let config = config(u64::MAX / 2, u64::MAX);
        assert_eq!(backoff_delay_ms(63, &config), u64::MAX);
    }

    #[test]
    fn zero_base_delay_never_waits() {
        let config = config(0, 1_000);
        assert_eq!(backoff_delay_ms(5, &config), 0);
    }

    #[test]
    fn error_message_uses_string_field() {
        let data = json!({"error": "boom"});
        assert_eq!(status_error_message(&data), "boom");
    }

    #[test]
    fn error_message_renders_non_string_values() {
        assert_eq!(status_error_message(&json!({"error": 5})), "5");
        assert_eq!(
            status_error_message(&json!({"error": {"code": 7}})),
            r#"{"code":7}"#
        );
        assert_eq!(status_error_message(&json!({"error": ["a", "b"]})), r#"["a","b"]"#);
        assert_eq!(status_error_message(&json!({"error": true})), "true");
    }

    #[test]
    fn error_message_falls_back_on_empty_values() {
        assert_eq!(status_error_message(&json!({})), "Request failed");
        assert_eq!(status_error_message(&json!({"error": ""})), "Request failed");
        assert_eq!(status_error_message(&json!({"error": 0})), "Request failed");
        assert_eq!(status_error_message(&json!({"error": false})), "Request failed");
        assert_eq!(status_error_message(&json!({"error": null})), "Request failed");
        assert_eq!(
            status_error_message(&json!({"message": "Not found"})),
            "Request failed"
        );
    }
}
