use crate::core::client::{ApiResponse, HttpExchange};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn list_files(&self) -> impl std::future::Future<Output = Result<Vec<String>>> + Send;
}

/// Player management API as seen by the scenarios. Inputs are loose JSON so
/// negative cases can send wrong types.
#[async_trait]
pub trait PlayerApi: Send + Sync {
    async fn create_player(&self, editor: &str, params: &Value) -> Result<ApiResponse>;
    async fn get_player(&self, player_id: &Value) -> Result<ApiResponse>;
    async fn get_all_players(&self) -> Result<ApiResponse>;
    async fn update_player(&self, editor: &str, id: i64, body: &Value) -> Result<ApiResponse>;
    async fn update_player_raw_id(
        &self,
        editor: &str,
        id: Option<&str>,
        body: &Value,
    ) -> Result<ApiResponse>;
    async fn delete_player(&self, editor: &str, player_id: &Value) -> Result<ApiResponse>;

    /// Handle for a single case: shares the connection pool, owns a fresh
    /// exchange log.
    fn fork(&self) -> Arc<dyn PlayerApi>;

    fn drain_exchanges(&self) -> Vec<HttpExchange>;
}
