use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Supervisor,
    Admin,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Supervisor, Role::Admin, Role::User];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Supervisor => "supervisor",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unexpected role value: '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|gender| gender.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unexpected gender value: '{}'", s))
    }
}

macro_rules! lowercase_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

lowercase_serde!(Role);
lowercase_serde!(Gender);

/// Create request. Sent as query parameters of the create endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetails {
    pub age: i32,
    pub gender: Gender,
    pub login: String,
    pub password: String,
    pub role: Role,
    pub screen_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_name: Option<String>,
}

impl PlayerUpdateRequest {
    pub fn screen_name(screen_name: impl Into<String>) -> Self {
        Self {
            screen_name: Some(screen_name.into()),
            ..Self::default()
        }
    }
}

/// Responses carry role and gender as raw strings so a malformed value
/// surfaces as a failed comparison instead of a decoding error.
pub trait PlayerView {
    fn raw_role(&self) -> Option<&str>;
    fn raw_gender(&self) -> Option<&str>;

    fn role_as_enum(&self) -> Option<Role> {
        let raw = self.raw_role()?;
        match raw.parse() {
            Ok(role) => Some(role),
            Err(e) => {
                tracing::warn!("Invalid role string: {}. {}", raw, e);
                None
            }
        }
    }

    fn gender_as_enum(&self) -> Option<Gender> {
        let raw = self.raw_gender()?;
        match raw.parse() {
            Ok(gender) => Some(gender),
            Err(e) => {
                tracing::warn!("Invalid gender string: {}. {}", raw, e);
                None
            }
        }
    }
}

macro_rules! player_view {
    ($ty:ty) => {
        impl PlayerView for $ty {
            fn raw_role(&self) -> Option<&str> {
                self.role.as_deref()
            }

            fn raw_gender(&self) -> Option<&str> {
                self.gender.as_deref()
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerCreateResponse {
    pub id: Option<i64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub screen_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerGetByIdResponse {
    pub id: Option<i64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub login: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub screen_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerUpdateResponse {
    pub id: Option<i64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub login: Option<String>,
    pub role: Option<String>,
    pub screen_name: Option<String>,
}

/// Entry of the get-all listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerItem {
    pub id: Option<i64>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub role: Option<String>,
    pub screen_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerGetAllResponse {
    #[serde(default)]
    pub players: Vec<PlayerItem>,
}

player_view!(PlayerCreateResponse);
player_view!(PlayerGetByIdResponse);
player_view!(PlayerUpdateResponse);
player_view!(PlayerItem);
