use crate::config::test_config::AccountsConfig;
use crate::core::assertions::SoftAssert;
use crate::core::client::ApiResponse;
use crate::domain::model::{
    PlayerCreateResponse, PlayerDetails, PlayerGetAllResponse, PlayerGetByIdResponse,
    PlayerUpdateRequest, PlayerUpdateResponse, PlayerView, Role,
};
use crate::domain::ports::PlayerApi;
use crate::utils::error::{ApiTestError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// A named step of a case, as shown in the report.
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub name: String,
    pub started_at: DateTime<Utc>,
}

/// Per-case state: API handle, seeded accounts, cleanup queue and step log.
pub struct TestContext {
    case_name: String,
    api: Arc<dyn PlayerApi>,
    accounts: AccountsConfig,
    players_to_delete: Mutex<VecDeque<i64>>,
    steps: Mutex<Vec<StepRecord>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl TestContext {
    pub fn new(case_name: impl Into<String>, api: Arc<dyn PlayerApi>, accounts: AccountsConfig) -> Self {
        Self {
            case_name: case_name.into(),
            api,
            accounts,
            players_to_delete: Mutex::new(VecDeque::new()),
            steps: Mutex::new(Vec::new()),
        }
    }

    pub fn api(&self) -> &dyn PlayerApi {
        self.api.as_ref()
    }

    pub fn accounts(&self) -> &AccountsConfig {
        &self.accounts
    }

    pub fn supervisor_login(&self) -> &str {
        &self.accounts.supervisor.login
    }

    pub fn supervisor_id(&self) -> i64 {
        self.accounts.supervisor.id
    }

    pub fn admin_login(&self) -> &str {
        &self.accounts.admin.login
    }

    pub fn admin_id(&self) -> i64 {
        self.accounts.admin.id
    }

    /// Seeded account acting for a privileged role. No regular user is
    /// seeded, so `Role::User` is an error.
    pub fn login_for(&self, role: Role) -> Result<&str> {
        match role {
            Role::Supervisor => Ok(self.supervisor_login()),
            Role::Admin => Ok(self.admin_login()),
            Role::User => Err(ApiTestError::InvalidConfigValueError {
                field: "accounts".to_string(),
                value: role.to_string(),
                reason: "No seeded account acts for this role".to_string(),
            }),
        }
    }

    pub fn step(&self, name: impl Into<String>) {
        let name = name.into();
        tracing::info!("[{}] {}", self.case_name, name);
        lock(&self.steps).push(StepRecord {
            name,
            started_at: Utc::now(),
        });
    }

    pub fn take_steps(&self) -> Vec<StepRecord> {
        std::mem::take(&mut *lock(&self.steps))
    }

    pub fn register(&self, player_id: i64) {
        lock(&self.players_to_delete).push_back(player_id);
    }

    /// Queues the id of a create response that was expected to fail, in case
    /// the service accepted it anyway.
    pub fn register_from_response(&self, response: &ApiResponse) {
        match response.id() {
            Some(id) => self.register(id),
            None => tracing::debug!("Tried to extract ID from failed create response"),
        }
    }

    /// Drops a player the case already deleted.
    pub fn forget(&self, player_id: i64) {
        lock(&self.players_to_delete).retain(|id| *id != player_id);
    }

    pub fn pending_cleanup(&self) -> Vec<i64> {
        lock(&self.players_to_delete).iter().copied().collect()
    }

    /// Deletes every queued player as the supervisor. Never fails the case.
    pub async fn cleanup(&self) {
        loop {
            let next = lock(&self.players_to_delete).pop_front();
            let Some(player_id) = next else { break };

            tracing::info!("[{}] Removing player with id {}", self.case_name, player_id);
            match self
                .api
                .delete_player(self.supervisor_login(), &json!(player_id))
                .await
            {
                Ok(response) if response.status() == 204 => {}
                Ok(response) => tracing::warn!(
                    "Cleanup of player {} returned status {}",
                    player_id,
                    response.status()
                ),
                Err(e) => tracing::warn!("Cleanup of player {} failed: {}", player_id, e),
            }
        }
    }

    pub async fn create_player_and_register(
        &self,
        editor: &str,
        details: &PlayerDetails,
    ) -> Result<PlayerCreateResponse> {
        let response = self.api.create_player(editor, &details_params(details)?).await?;
        response.expect_status(200, "create player")?;
        if let Some(id) = response.id() {
            self.register(id);
        }
        let created: PlayerCreateResponse = response.json("PlayerCreateResponse")?;
        created_id(&created)?;
        Ok(created)
    }

    pub async fn get_player(&self, player_id: i64) -> Result<PlayerGetByIdResponse> {
        let response = self.api.get_player(&json!(player_id)).await?;
        response.expect_status(200, "get player")?;
        response.json("PlayerGetByIdResponse")
    }

    pub async fn update_player(
        &self,
        editor: &str,
        player_id: i64,
        request: &PlayerUpdateRequest,
    ) -> Result<PlayerUpdateResponse> {
        let body = serde_json::to_value(request)?;
        let response = self.api.update_player(editor, player_id, &body).await?;
        response.expect_status(200, "update player")?;
        response.json("PlayerUpdateResponse")
    }

    pub async fn delete_player(&self, editor: &str, player_id: i64) -> Result<()> {
        let response = self.api.delete_player(editor, &json!(player_id)).await?;
        response.expect_status(204, "delete player")?;
        Ok(())
    }

    pub async fn get_all_players(&self) -> Result<PlayerGetAllResponse> {
        let response = self.api.get_all_players().await?;
        response.expect_status(200, "get all players")?;
        response.json("PlayerGetAllResponse")
    }
}

/// Id of a successful create; a missing id fails the case.
pub fn created_id(created: &PlayerCreateResponse) -> Result<i64> {
    created
        .id
        .ok_or_else(|| ApiTestError::assertion("Created player should have an ID"))
}

/// Create-request query parameters.
pub fn details_params(details: &PlayerDetails) -> Result<Value> {
    Ok(serde_json::to_value(details)?)
}

pub fn assert_created_fields_match(
    soft: &mut SoftAssert,
    actual: &PlayerCreateResponse,
    expected: &PlayerDetails,
) {
    soft.assert_eq(actual.age, Some(expected.age), "Age should match");
    soft.assert_eq(actual.login.as_deref(), Some(expected.login.as_str()), "Login should match");
    soft.assert_eq(
        actual.password.as_deref(),
        Some(expected.password.as_str()),
        "Password should match",
    );
    soft.assert_eq(actual.role_as_enum(), Some(expected.role), "Role should match");
    soft.assert_eq(
        actual.screen_name.as_deref(),
        Some(expected.screen_name.as_str()),
        "ScreenName should match",
    );
    soft.assert_eq(actual.gender_as_enum(), Some(expected.gender), "Gender should match");
}

/// Every field except the id.
pub fn assert_retrieved_fields_match(
    soft: &mut SoftAssert,
    actual: &PlayerGetByIdResponse,
    expected: &PlayerDetails,
) {
    soft.assert_eq(actual.age, Some(expected.age), "Player age should match");
    soft.assert_eq(
        actual.login.as_deref(),
        Some(expected.login.as_str()),
        "Player login should match",
    );
    soft.assert_eq(
        actual.password.as_deref(),
        Some(expected.password.as_str()),
        "Player password should match",
    );
    soft.assert_eq(actual.role_as_enum(), Some(expected.role), "Player role should match");
    soft.assert_eq(
        actual.screen_name.as_deref(),
        Some(expected.screen_name.as_str()),
        "Player screenName should match",
    );
    soft.assert_eq(actual.gender_as_enum(), Some(expected.gender), "Player gender should match");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config::TestConfig;
    use crate::core::client::RestClient;
    use std::time::Duration;

    fn context() -> TestContext {
        let api = RestClient::new("http://localhost:8080", Duration::from_secs(1)).unwrap();
        TestContext::new("Case.name", Arc::new(api), TestConfig::default().accounts)
    }

    #[test]
    fn test_login_for_privileged_roles() {
        let ctx = context();
        assert_eq!(ctx.login_for(Role::Supervisor).unwrap(), "supervisor");
        assert_eq!(ctx.login_for(Role::Admin).unwrap(), "admin");
    }

    #[test]
    fn test_login_for_user_is_rejected() {
        let err = context().login_for(Role::User).unwrap_err();
        assert!(matches!(err, ApiTestError::InvalidConfigValueError { .. }));
        assert!(!err.is_assertion());
    }

    #[test]
    fn test_register_and_forget_keep_queue_order() {
        let ctx = context();
        ctx.register(3);
        ctx.register(4);
        ctx.register(5);
        ctx.forget(4);
        assert_eq!(ctx.pending_cleanup(), vec![3, 5]);

        ctx.register_from_response(&ApiResponse::new(200, r#"{"id": 9}"#));
        ctx.register_from_response(&ApiResponse::new(400, ""));
        assert_eq!(ctx.pending_cleanup(), vec![3, 5, 9]);
    }
}
