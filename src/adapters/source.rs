use crate::core::{Storage, Subscription, SubscriptionSource};
use crate::utils::error::{Result, RollupError};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

/// 解析訂閱清單，最外層必須是陣列
pub fn decode_subscriptions(payload: serde_json::Value) -> Result<Vec<Subscription>> {
    let items = match payload {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(RollupError::InvalidInput {
                message: format!(
                    "expected a JSON array of subscriptions, got {}",
                    json_kind(&other)
                ),
            })
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| RollupError::InvalidInput {
                message: format!("subscription at index {}: {}", index, e),
            })
        })
        .collect()
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// 從儲存空間讀取 JSON 檔
pub struct FileSource<S: Storage> {
    storage: S,
    path: String,
}

impl<S: Storage> FileSource<S> {
    pub fn new(storage: S, path: impl Into<String>) -> Self {
        Self {
            storage,
            path: path.into(),
        }
    }
}

#[async_trait]
impl<S: Storage> SubscriptionSource for FileSource<S> {
    async fn fetch_subscriptions(&self) -> Result<Vec<Subscription>> {
        tracing::debug!("Reading subscriptions from file: {}", self.path);
        let bytes = self.storage.read_file(&self.path).await?;
        let payload: serde_json::Value = serde_json::from_slice(&bytes)?;
        decode_subscriptions(payload)
    }

    fn describe(&self) -> String {
        format!("file {}", self.path)
    }
}

/// 從 HTTP 端點取得訂閱清單
pub struct ApiSource {
    client: Client,
    endpoint: String,
    headers: HashMap<String, String>,
    timeout: Option<Duration>,
}

impl ApiSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            headers: HashMap::new(),
            timeout: None,
        }
    }

    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl SubscriptionSource for ApiSource {
    async fn fetch_subscriptions(&self) -> Result<Vec<Subscription>> {
        let mut request = self.client.get(&self.endpoint);

        for (key, value) in &self.headers {
            request = request.header(key, value);
        }

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = request.send().await?;
        tracing::debug!("API response status: {}", response.status());

        if !response.status().is_success() {
            return Err(RollupError::SourceError {
                message: format!("{} returned HTTP {}", self.endpoint, response.status()),
            });
        }

        let payload: serde_json::Value = response.json().await?;
        decode_subscriptions(payload)
    }

    fn describe(&self) -> String {
        format!("api {}", self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                RollupError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let err = decode_subscriptions(serde_json::json!({"id": "a1"})).unwrap_err();
        assert!(matches!(err, RollupError::InvalidInput { .. }));
        assert!(err.to_string().contains("an object"));

        let err = decode_subscriptions(serde_json::Value::Null).unwrap_err();
        assert!(err.to_string().contains("null"));
    }

    #[test]
    fn test_decode_reports_bad_element_index() {
        let err = decode_subscriptions(serde_json::json!([{"id": "a1"}, {"contract": {}}]))
            .unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[tokio::test]
    async fn test_file_source_reads_json() {
        let payload = br#"[{"id": "a1", "contract": {"id": "800A", "status": "Activated"}, "net_mrr": "10"}]"#;
        let source = FileSource::new(MockStorage::with_file("subs.json", payload), "subs.json");

        let subs = source.fetch_subscriptions().await.unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].net_mrr, Some(Decimal::new(10, 0)));
        assert_eq!(source.describe(), "file subs.json");
    }

    #[tokio::test]
    async fn test_api_source_sends_headers() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/subscriptions")
                .header("Authorization", "Bearer token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(serde_json::json!([
                    {"id": "a1", "contract": {"id": "800A", "status": "Activated"}},
                    {"id": "a2"}
                ]));
        });

        let mut headers = HashMap::new();
        headers.insert("Authorization".to_string(), "Bearer token".to_string());
        let source = ApiSource::new(server.url("/subscriptions"))
            .with_headers(headers)
            .with_timeout(Duration::from_secs(5));

        let subs = source.fetch_subscriptions().await.unwrap();
        api_mock.assert();
        assert_eq!(subs.len(), 2);
        assert!(subs[1].contract.is_none());
    }

    #[tokio::test]
    async fn test_api_source_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/subscriptions");
            then.status(503);
        });

        let source = ApiSource::new(server.url("/subscriptions"));
        let err = source.fetch_subscriptions().await.unwrap_err();
        assert!(matches!(err, RollupError::SourceError { .. }));
    }
}
