use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::config::HttpConfig;

use super::error::FeedError;

pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client, FeedError> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout)
        .build()
        .map_err(|e| FeedError::Network(e.to_string()))
}

/// GETs a JSON document from one upstream URL.
#[derive(Debug, Clone)]
pub struct JsonClient {
    http: reqwest::Client,
    url: String,
}

impl JsonClient {
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    pub async fn get_array(&self) -> Result<Vec<Value>, FeedError> {
        log::debug!("GET {}", self.url);

        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UpstreamStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;
        decode_array(&body)
    }
}

pub fn decode_array(body: &[u8]) -> Result<Vec<Value>, FeedError> {
    match serde_json::from_slice(body) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(other) => Err(FeedError::Format(format!(
            "expected a JSON array, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(FeedError::Format(e.to_string())),
    }
}

/// Decodes every element or fails on the first one that does not fit.
pub fn decode_each<R, T>(
    feed: &str,
    items: Vec<Value>,
    convert: impl Fn(R) -> Result<T, String>,
) -> Result<Vec<T>, FeedError>
where
    R: for<'de> Deserialize<'de>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<R>(item)
                .map_err(|e| e.to_string())
                .and_then(&convert)
                .map_err(|e| FeedError::Format(format!("{feed} entry {i}: {e}")))
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Identifier that upstreams send either as a number or a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FlexibleId {
    Number(u64),
    Text(String),
}

impl FlexibleId {
    pub fn into_string(self) -> String {
        match self {
            FlexibleId::Number(n) => n.to_string(),
            FlexibleId::Text(s) => s,
        }
    }
}

/// Timestamp as RFC 3339 text or unix seconds.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum FlexibleTime {
    Unix(i64),
    Text(String),
}

impl FlexibleTime {
    pub fn resolve(self) -> Result<DateTime<Utc>, String> {
        match self {
            FlexibleTime::Unix(secs) => Utc
                .timestamp_opt(secs, 0)
                .single()
                .ok_or_else(|| format!("timestamp out of range: {secs}")),
            FlexibleTime::Text(s) => DateTime::parse_from_rfc3339(s.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| format!("invalid timestamp {s:?}: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{serve_fixture, unreachable_url};
    use axum::{http::StatusCode, routing::get, Router};

    fn client_for(url: String) -> JsonClient {
        JsonClient::new(reqwest::Client::new(), url)
    }

    #[test]
    fn decode_array_rejects_non_arrays() {
        assert!(matches!(
            decode_array(br#"{"results": []}"#),
            Err(FeedError::Format(_))
        ));
        assert!(matches!(decode_array(b"not json"), Err(FeedError::Format(_))));
        assert_eq!(decode_array(b"[1, 2]").unwrap().len(), 2);
    }

    #[test]
    fn flexible_values_resolve() {
        assert_eq!(FlexibleId::Number(25544).into_string(), "25544");
        assert_eq!(FlexibleId::Text("a".into()).into_string(), "a");

        let at = FlexibleTime::Text("2024-05-01T10:00:00Z".into()).resolve().unwrap();
        assert_eq!(at, FlexibleTime::Unix(at.timestamp()).resolve().unwrap());
        assert!(FlexibleTime::Text("yesterday".into()).resolve().is_err());
    }

    #[tokio::test]
    async fn fetches_json_array() {
        let base = serve_fixture(Router::new().route("/feed", get(|| async { r#"[{"a": 1}]"# })))
            .await;
        let items = client_for(format!("{base}/feed")).get_array().await.unwrap();
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let base = serve_fixture(Router::new().route(
            "/feed",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        ))
        .await;
        let err = client_for(format!("{base}/feed")).get_array().await.unwrap_err();
        assert!(matches!(err, FeedError::UpstreamStatus(503)));
    }

    #[tokio::test]
    async fn transport_failure_is_a_network_error() {
        let err = client_for(unreachable_url().await).get_array().await.unwrap_err();
        assert!(matches!(err, FeedError::Network(_)));
    }
}
