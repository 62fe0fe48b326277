//! In-memory Player service that follows the documented API rules, used to
//! drive the scenario catalogue end to end without a network.

#![allow(dead_code)]

use async_trait::async_trait;
use player_api_tests::core::client::{ApiResponse, HttpExchange};
use player_api_tests::domain::model::{Gender, Role};
use player_api_tests::{PlayerApi, Result};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub const SUPERVISOR_ID: i64 = 1;
pub const ADMIN_ID: i64 = 2;

#[derive(Debug, Clone)]
struct Player {
    id: i64,
    age: i64,
    gender: Gender,
    login: String,
    password: String,
    role: Role,
    screen_name: String,
}

impl Player {
    fn full_json(&self) -> Value {
        json!({
            "id": self.id,
            "age": self.age,
            "gender": self.gender.as_str(),
            "login": self.login,
            "password": self.password,
            "role": self.role.as_str(),
            "screenName": self.screen_name,
        })
    }

    fn update_json(&self) -> Value {
        json!({
            "id": self.id,
            "age": self.age,
            "gender": self.gender.as_str(),
            "login": self.login,
            "role": self.role.as_str(),
            "screenName": self.screen_name,
        })
    }

    fn item_json(&self) -> Value {
        json!({
            "id": self.id,
            "age": self.age,
            "gender": self.gender.as_str(),
            "role": self.role.as_str(),
            "screenName": self.screen_name,
        })
    }
}

#[derive(Debug)]
struct State {
    players: BTreeMap<i64, Player>,
    next_id: i64,
}

impl State {
    fn seeded() -> Self {
        let mut players = BTreeMap::new();
        players.insert(
            SUPERVISOR_ID,
            Player {
                id: SUPERVISOR_ID,
                age: 40,
                gender: Gender::Male,
                login: "supervisor".to_string(),
                password: "supervisor1".to_string(),
                role: Role::Supervisor,
                screen_name: "supervisor".to_string(),
            },
        );
        players.insert(
            ADMIN_ID,
            Player {
                id: ADMIN_ID,
                age: 30,
                gender: Gender::Female,
                login: "admin".to_string(),
                password: "admin1234".to_string(),
                role: Role::Admin,
                screen_name: "admin".to_string(),
            },
        );
        Self {
            players,
            next_id: 3,
        }
    }

    fn by_login(&self, login: &str) -> Option<&Player> {
        self.players.values().find(|p| p.login == login)
    }

    fn screen_name_taken(&self, screen_name: &str, except: Option<i64>) -> bool {
        self.players
            .values()
            .any(|p| p.screen_name == screen_name && Some(p.id) != except)
    }
}

fn response(status: u16, body: Value) -> ApiResponse {
    ApiResponse::new(status, body.to_string())
}

fn empty(status: u16) -> ApiResponse {
    ApiResponse::new(status, "")
}

fn valid_age(age: i64) -> bool {
    (17..=59).contains(&age)
}

fn valid_password(password: &str) -> bool {
    (7..=15).contains(&password.chars().count())
        && password.chars().all(|c| c.is_ascii_alphanumeric())
        && password.chars().any(|c| c.is_ascii_alphabetic())
        && password.chars().any(|c| c.is_ascii_digit())
}

/// Query parameters arrive as text, so numbers may be strings.
fn param_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn param_str(value: Option<&Value>) -> Option<&str> {
    value?.as_str().filter(|s| !s.is_empty())
}

#[derive(Clone)]
pub struct FakePlayerService {
    state: Arc<Mutex<State>>,
    exchanges: Arc<Mutex<Vec<HttpExchange>>>,
}

impl Default for FakePlayerService {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlayerService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::seeded())),
            exchanges: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn player_count(&self) -> usize {
        self.state.lock().unwrap().players.len()
    }

    fn record(&self, method: &str, path: String, request: Option<&Value>, response: &ApiResponse) {
        self.exchanges.lock().unwrap().push(HttpExchange {
            method: method.to_string(),
            url: format!("http://fake.local{}", path),
            request_body: request.map(Value::to_string),
            status: response.status(),
            response_body: response.body.clone(),
            elapsed_ms: 0,
        });
    }

    fn create(&self, editor: &str, params: &Value) -> ApiResponse {
        let mut state = self.state.lock().unwrap();

        let Some(editor) = state.by_login(editor).cloned() else {
            return empty(403);
        };
        let Some(params) = params.as_object() else {
            return empty(400);
        };
        let Some(role) = param_str(params.get("role")).and_then(|r| r.parse::<Role>().ok())
        else {
            return empty(400);
        };

        let allowed = match editor.role {
            Role::Supervisor => role != Role::Supervisor,
            Role::Admin => role == Role::User,
            Role::User => false,
        };
        if !allowed {
            return empty(403);
        }

        let age = param_int(params.get("age")).filter(|a| valid_age(*a));
        let gender = param_str(params.get("gender")).and_then(|g| g.parse::<Gender>().ok());
        let password = param_str(params.get("password")).filter(|p| valid_password(p));
        let login = param_str(params.get("login")).filter(|l| state.by_login(l).is_none());
        let screen_name =
            param_str(params.get("screenName")).filter(|s| !state.screen_name_taken(s, None));

        let (Some(age), Some(gender), Some(password), Some(login), Some(screen_name)) =
            (age, gender, password, login, screen_name)
        else {
            return empty(400);
        };

        let player = Player {
            id: state.next_id,
            age,
            gender,
            login: login.to_string(),
            password: password.to_string(),
            role,
            screen_name: screen_name.to_string(),
        };
        state.next_id += 1;
        let body = player.full_json();
        state.players.insert(player.id, player);
        response(200, body)
    }

    fn get(&self, player_id: &Value) -> ApiResponse {
        let Some(id) = player_id.as_i64() else {
            return empty(400);
        };
        let state = self.state.lock().unwrap();
        match state.players.get(&id) {
            Some(player) => response(200, player.full_json()),
            None => empty(404),
        }
    }

    fn get_all(&self) -> ApiResponse {
        let state = self.state.lock().unwrap();
        let players: Vec<Value> = state.players.values().map(Player::item_json).collect();
        response(200, json!({ "players": players }))
    }

    fn update(&self, editor: &str, id: Option<&str>, body: &Value) -> ApiResponse {
        let Some(id) = id.and_then(|raw| raw.parse::<i64>().ok()) else {
            return empty(400);
        };
        let mut state = self.state.lock().unwrap();

        let Some(editor) = state.by_login(editor).cloned() else {
            return empty(403);
        };
        let Some(target) = state.players.get(&id).cloned() else {
            return empty(404);
        };

        let may_edit = match editor.role {
            Role::Supervisor => true,
            Role::Admin => target.role == Role::User || target.id == editor.id,
            Role::User => target.id == editor.id,
        };
        if !may_edit {
            return empty(403);
        }

        let Some(fields) = body.as_object() else {
            return empty(400);
        };

        if let Some(raw_role) = fields.get("role") {
            let Some(role) = raw_role.as_str().and_then(|r| r.parse::<Role>().ok()) else {
                return empty(400);
            };
            let permitted = match editor.role {
                Role::Supervisor => true,
                Role::Admin => {
                    role != Role::Supervisor && (role == target.role || target.role == Role::User)
                }
                Role::User => role == target.role,
            };
            if !permitted {
                return empty(403);
            }
        }

        match validated_update(&state, &target, fields) {
            Some(updated) => {
                let body = updated.update_json();
                state.players.insert(updated.id, updated);
                response(200, body)
            }
            None => empty(400),
        }
    }

    fn delete(&self, editor: &str, player_id: &Value) -> ApiResponse {
        let Some(id) = player_id.as_i64() else {
            return empty(400);
        };
        let mut state = self.state.lock().unwrap();

        let Some(editor) = state.by_login(editor).cloned() else {
            return empty(403);
        };
        let Some(target) = state.players.get(&id).cloned() else {
            return empty(404);
        };

        let allowed = match editor.role {
            Role::Supervisor => target.id != editor.id,
            Role::Admin => target.role == Role::User || target.id == editor.id,
            Role::User => false,
        };
        if !allowed {
            return empty(403);
        }

        state.players.remove(&id);
        empty(204)
    }
}

/// Applies an update body to a copy of `target`. `None` means a 400. Keys
/// the API does not know are ignored.
fn validated_update(state: &State, target: &Player, fields: &Map<String, Value>) -> Option<Player> {
    if fields.contains_key("login") {
        return None;
    }

    let mut updated = target.clone();
    if let Some(age) = fields.get("age") {
        updated.age = age.as_i64().filter(|a| valid_age(*a))?;
    }
    if let Some(gender) = fields.get("gender") {
        updated.gender = gender.as_str()?.parse().ok()?;
    }
    if let Some(password) = fields.get("password") {
        let password = password.as_str().filter(|p| valid_password(p))?;
        updated.password = password.to_string();
    }
    if let Some(screen_name) = fields.get("screenName") {
        let screen_name = screen_name
            .as_str()
            .filter(|s| !s.is_empty() && !state.screen_name_taken(s, Some(target.id)))?;
        updated.screen_name = screen_name.to_string();
    }
    if let Some(role) = fields.get("role") {
        updated.role = role.as_str()?.parse().ok()?;
    }
    Some(updated)
}

#[async_trait]
impl PlayerApi for FakePlayerService {
    async fn create_player(&self, editor: &str, params: &Value) -> Result<ApiResponse> {
        let response = self.create(editor, params);
        self.record("GET", format!("/player/create/{}", editor), Some(params), &response);
        Ok(response)
    }

    async fn get_player(&self, player_id: &Value) -> Result<ApiResponse> {
        let body = json!({ "playerId": player_id });
        let response = self.get(player_id);
        self.record("POST", "/player/get".to_string(), Some(&body), &response);
        Ok(response)
    }

    async fn get_all_players(&self) -> Result<ApiResponse> {
        let response = self.get_all();
        self.record("GET", "/player/get/all".to_string(), None, &response);
        Ok(response)
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
        let response = self.update(editor, id, body);
        self.record(
            "PATCH",
            format!("/player/update/{}/{}", editor, id.unwrap_or("null")),
            Some(body),
            &response,
        );
        Ok(response)
    }

    async fn delete_player(&self, editor: &str, player_id: &Value) -> Result<ApiResponse> {
        let body = json!({ "playerId": player_id });
        let response = self.delete(editor, player_id);
        self.record("DELETE", format!("/player/delete/{}", editor), Some(&body), &response);
        Ok(response)
    }

    fn fork(&self) -> Arc<dyn PlayerApi> {
        Arc::new(Self {
            state: Arc::clone(&self.state),
            exchanges: Arc::new(Mutex::new(Vec::new())),
        })
    }

    fn drain_exchanges(&self) -> Vec<HttpExchange> {
        std::mem::take(&mut *self.exchanges.lock().unwrap())
    }
}
