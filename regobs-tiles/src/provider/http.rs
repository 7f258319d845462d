//! HTTP client abstraction for testability

use std::future::Future;
use std::time::Duration;

use super::types::ProviderError;

/// User agent sent with every tile request.
pub const USER_AGENT: &str = concat!("regobs-tiles/", env!("CARGO_PKG_VERSION"));

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Async HTTP client operations.
///
/// Allows mock clients to be injected in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes or an error.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Async HTTP client backed by reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_timeout(DEFAULT_TIMEOUT_SECS)
    }

    /// Creates a client with a custom timeout.
    pub fn with_timeout(timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::HttpError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(ProviderError::HttpError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ProviderError::HttpError(format!("Failed to read response: {}", e)))?;

        if bytes.is_empty() {
            return Err(ProviderError::InvalidResponse(format!(
                "Empty body from {}",
                url
            )));
        }

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock HTTP client serving canned responses per URL.
    ///
    /// URLs without a canned response fail with a 404. Every request is
    /// recorded so tests can assert on what was fetched.
    pub struct MockAsyncHttpClient {
        responses: HashMap<String, Result<Vec<u8>, ProviderError>>,
        requests: Mutex<Vec<String>>,
    }

    impl MockAsyncHttpClient {
        pub fn new() -> Self {
            Self {
                responses: HashMap::new(),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn with_response(mut self, url: &str, body: Vec<u8>) -> Self {
            self.responses.insert(url.to_string(), Ok(body));
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.responses.get(url).cloned().unwrap_or_else(|| {
                Err(ProviderError::HttpError(format!("HTTP 404 Not Found from {}", url)))
            })
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockAsyncHttpClient::new().with_response("http://a/1", vec![1, 2, 3]);
        assert_eq!(mock.get("http://a/1").await, Ok(vec![1, 2, 3]));
        assert_eq!(mock.requests(), vec!["http://a/1".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_client_missing_url() {
        let mock = MockAsyncHttpClient::new();
        let result = mock.get("http://a/2").await;
        assert!(matches!(result, Err(ProviderError::HttpError(_))));
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(AsyncReqwestClient::with_timeout(5).is_ok());
    }

    #[test]
    fn test_user_agent() {
        assert!(USER_AGENT.starts_with("regobs-tiles/"));
    }
}
