use crate::domain::ports::PlayerApi;
use crate::utils::error::{ApiTestError, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use url::Url;

/// One request/response pair, kept for the report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpExchange {
    pub method: String,
    pub url: String,
    pub request_body: Option<String>,
    pub status: u16,
    pub response_body: String,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Decodes the body, rejecting blank payloads up front so the failure
    /// names the expected type instead of a generic EOF error.
    pub fn json<T: DeserializeOwned>(&self, target: &str) -> Result<T> {
        if self.body.trim().is_empty() {
            return Err(ApiTestError::EmptyBody {
                target: target.to_string(),
                status: self.status,
            });
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Numeric `id` of the body, if the body is a JSON object carrying one.
    pub fn id(&self) -> Option<i64> {
        serde_json::from_str::<Value>(&self.body)
            .ok()?
            .get("id")?
            .as_i64()
    }

    pub fn expect_status(&self, expected: u16, operation: &str) -> Result<&Self> {
        if self.status != expected {
            return Err(ApiTestError::UnexpectedStatus {
                operation: operation.to_string(),
                expected,
                actual: self.status,
                body: self.body.clone(),
            });
        }
        Ok(self)
    }
}

#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: Url,
    exchanges: Arc<Mutex<Vec<HttpExchange>>>,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            exchanges: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends percent-encoded segments to the base URL, keeping any path
    /// prefix the base already has.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiTestError::InvalidConfigValueError {
                field: "target.base_url".to_string(),
                value: self.base_url.to_string(),
                reason: "URL cannot be used as a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        query: Option<Vec<(String, String)>>,
        body: Option<&Value>,
    ) -> Result<ApiResponse> {
        let mut request = self
            .client
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(query) = &query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let request = request.build()?;
        let request_url = request.url().to_string();
        let request_body = body.map(Value::to_string);

        tracing::debug!(
            "➡️ {} {} {}",
            method,
            request_url,
            request_body.as_deref().unwrap_or("")
        );

        let started = Instant::now();
        let response = self.client.execute(request).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let elapsed = started.elapsed();

        tracing::debug!("⬅️ {} {} ({:?}) {}", status, request_url, elapsed, text);

        if let Ok(mut exchanges) = self.exchanges.lock() {
            exchanges.push(HttpExchange {
                method: method.to_string(),
                url: request_url,
                request_body,
                status,
                response_body: text.clone(),
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }

        Ok(ApiResponse::new(status, text))
    }
}

/// Flattens a JSON object into query pairs. Strings are sent verbatim, other
/// scalars through their JSON text, nulls are dropped.
pub fn to_query_pairs(params: &Value) -> Result<Vec<(String, String)>> {
    let object = params.as_object().ok_or_else(|| ApiTestError::InvalidConfigValueError {
        field: "create_player.params".to_string(),
        value: params.to_string(),
        reason: "Query parameters must be a JSON object".to_string(),
    })?;

    Ok(object
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect())
}

#[async_trait]
impl PlayerApi for RestClient {
    async fn create_player(&self, editor: &str, params: &Value) -> Result<ApiResponse> {
        let url = self.endpoint(&["player", "create", editor])?;
        let query = to_query_pairs(params)?;
        self.send(Method::GET, url, Some(query), None).await
    }

    async fn get_player(&self, player_id: &Value) -> Result<ApiResponse> {
        let url = self.endpoint(&["player", "get"])?;
        let body = serde_json::json!({ "playerId": player_id });
        self.send(Method::POST, url, None, Some(&body)).await
    }

    async fn get_all_players(&self) -> Result<ApiResponse> {
        let url = self.endpoint(&["player", "get", "all"])?;
        self.send(Method::GET, url, None, None).await
    }

    async fn update_player(&self, editor: &str, id: i64, body: &Value) -> Result<ApiResponse> {
        let id = id.to_string();
        self.update_player_raw_id(editor, Some(&id), body).await
    }

    async fn update_player_raw_id(
        &self,
        editor: &str,
        id: Option<&str>,
        body: &Value,
    ) -> Result<ApiResponse> {
        let url = self.endpoint(&["player", "update", editor, id.unwrap_or("null")])?;
        self.send(Method::PATCH, url, None, Some(body)).await
    }

    async fn delete_player(&self, editor: &str, player_id: &Value) -> Result<ApiResponse> {
        let url = self.endpoint(&["player", "delete", editor])?;
        let body = serde_json::json!({ "playerId": player_id });
        self.send(Method::DELETE, url, None, Some(&body)).await
    }

    fn fork(&self) -> Arc<dyn PlayerApi> {
        Arc::new(Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            exchanges: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn drain_exchanges(&self) -> Vec<HttpExchange> {
        self.exchanges
            .lock()
            .map(|mut exchanges| std::mem::take(&mut *exchanges))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_pairs_drop_nulls_and_keep_strings_verbatim() {
        let mut pairs = to_query_pairs(&json!({
            "age": 25,
            "gender": "male",
            "login": "user_1",
            "role": null
        }))
        .unwrap();
        pairs.sort();

        assert_eq!(
            pairs,
            vec![
                ("age".to_string(), "25".to_string()),
                ("gender".to_string(), "male".to_string()),
                ("login".to_string(), "user_1".to_string()),
            ]
        );
        assert!(to_query_pairs(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_endpoint_keeps_base_prefix_and_encodes_segments() {
        let client = RestClient::new("http://localhost:8080/api/", Duration::from_secs(5)).unwrap();
        let url = client.endpoint(&["player", "create", "super visor"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/player/create/super%20visor");
    }

    #[test]
    fn test_api_response_helpers() {
        let response = ApiResponse::new(200, r#"{"id": 42, "login": "user_1"}"#);
        assert_eq!(response.id(), Some(42));
        assert!(response.expect_status(200, "create").is_ok());
        assert!(response.expect_status(204, "delete").is_err());

        let empty = ApiResponse::new(200, "  ");
        assert_eq!(empty.id(), None);
        let err = empty.json::<Value>("PlayerCreateResponse").unwrap_err();
        assert!(matches!(err, ApiTestError::EmptyBody { status: 200, .. }));
    }
}
