use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    Admin,
    Mechanic,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::Mechanic => "MECHANIC",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(UserRole::Admin),
            "MECHANIC" => Ok(UserRole::Mechanic),
            other => Err(format!("unknown user role: {other}")),
        }
    }
}

/// Authentication principal. The password is stored as an argon2 hash and
/// never serialized.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub username: String,
    pub password_hash: String,
    pub account_locked: bool,
    pub roles: Vec<UserRole>,
}

/// Audit row for an issued bearer token. Written on login; token validity is
/// checked statelessly from the JWT itself.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Token {
    pub id: i64,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expired_at: Option<DateTime<Utc>>,
    pub validated_at: Option<DateTime<Utc>>,
    pub user_id: i64,
}
