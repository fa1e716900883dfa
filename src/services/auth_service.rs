use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{self, Claims};
use crate::config::SecurityConfig;
use crate::models::Token;
use crate::store::Stores;

use super::DomainError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

pub struct AuthService {
    stores: Stores,
    security: SecurityConfig,
}

impl AuthService {
    pub fn new(stores: Stores, security: SecurityConfig) -> Self {
        Self { stores, security }
    }

    /// Verify credentials and issue a signed bearer token. Unknown users and
    /// wrong passwords are indistinguishable to the caller.
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, DomainError> {
        let user = self
            .stores
            .users
            .find_by_username(&request.username)
            .await?
            .ok_or(DomainError::BadCredentials)?;

        if user.account_locked {
            return Err(DomainError::AccountLocked);
        }
        if !auth::verify_password(&request.password, &user.password_hash) {
            return Err(DomainError::BadCredentials);
        }

        let claims = Claims::new(&user, self.security.jwt_expiry_hours);
        let token = auth::generate_jwt(&claims, &self.security.jwt_secret)?;

        self.stores
            .tokens
            .insert(Token {
                id: 0,
                token: token.clone(),
                created_at: Utc::now(),
                expired_at: DateTime::<Utc>::from_timestamp(claims.exp, 0),
                validated_at: None,
                user_id: user.id,
            })
            .await?;

        tracing::info!(username = %user.username, "user logged in");
        Ok(LoginResponse { token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{User, UserRole};
    use crate::store::memory::MemoryStore;

    fn security() -> SecurityConfig {
        SecurityConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiry_hours: 1,
            seed_dev_admin: false,
        }
    }

    async fn service_with_user(locked: bool) -> AuthService {
        let stores = MemoryStore::new().stores();
        stores
            .users
            .insert(User {
                id: 0,
                firstname: None,
                surname: None,
                email: None,
                username: "admin".to_string(),
                password_hash: auth::hash_password("admin").unwrap(),
                account_locked: locked,
                roles: vec![UserRole::Admin],
            })
            .await
            .unwrap();
        AuthService::new(stores, security())
    }

    #[tokio::test]
    async fn login_returns_a_valid_token() {
        let service = service_with_user(false).await;

        let response = service
            .login(LoginRequest {
                username: "admin".to_string(),
                password: "admin".to_string(),
            })
            .await
            .unwrap();

        let claims = auth::validate_jwt(&response.token, "test-secret").unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_bad_credentials() {
        let service = service_with_user(false).await;

        assert!(matches!(
            service
                .login(LoginRequest {
                    username: "admin".to_string(),
                    password: "wrong".to_string(),
                })
                .await
                .unwrap_err(),
            DomainError::BadCredentials
        ));
        assert!(matches!(
            service
                .login(LoginRequest {
                    username: "ghost".to_string(),
                    password: "admin".to_string(),
                })
                .await
                .unwrap_err(),
            DomainError::BadCredentials
        ));
    }

    #[tokio::test]
    async fn locked_account_is_rejected() {
        let service = service_with_user(true).await;

        assert!(matches!(
            service
                .login(LoginRequest {
                    username: "admin".to_string(),
                    password: "admin".to_string(),
                })
                .await
                .unwrap_err(),
            DomainError::AccountLocked
        ));
    }
}
