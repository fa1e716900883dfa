use crate::auth;
use crate::models::{User, UserRole};
use crate::store::Stores;

use super::DomainError;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub firstname: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub username: String,
    pub password: String,
    pub roles: Vec<UserRole>,
}

pub struct UserService {
    stores: Stores,
}

impl UserService {
    pub fn new(stores: Stores) -> Self {
        Self { stores }
    }

    pub async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        if new_user.username.is_empty() {
            return Err(DomainError::Validation("username is required".to_string()));
        }
        if new_user.password.is_empty() {
            return Err(DomainError::Validation("password is required".to_string()));
        }

        let password_hash = auth::hash_password(&new_user.password)?;
        let user = self
            .stores
            .users
            .insert(User {
                id: 0,
                firstname: new_user.firstname,
                surname: new_user.surname,
                email: new_user.email,
                username: new_user.username,
                password_hash,
                account_locked: false,
                roles: new_user.roles,
            })
            .await?;

        tracing::info!(username = %user.username, "created user");
        Ok(user)
    }

    /// Development bootstrap: make sure an `admin`/`admin` account exists.
    pub async fn ensure_dev_admin(&self) -> Result<(), DomainError> {
        if self.stores.users.find_by_username("admin").await?.is_some() {
            return Ok(());
        }

        self.create_user(NewUser {
            firstname: Some("John".to_string()),
            surname: Some("Doe".to_string()),
            email: Some("john.doe@email.com".to_string()),
            username: "admin".to_string(),
            password: "admin".to_string(),
            roles: vec![UserRole::Admin],
        })
        .await?;

        tracing::warn!("seeded development admin user (admin/admin) - do not use in production");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[tokio::test]
    async fn created_password_is_hashed() {
        let stores = MemoryStore::new().stores();
        let service = UserService::new(stores.clone());

        let user = service
            .create_user(NewUser {
                firstname: None,
                surname: None,
                email: None,
                username: "mechanic".to_string(),
                password: "wrench".to_string(),
                roles: vec![UserRole::Mechanic],
            })
            .await
            .unwrap();

        assert_ne!(user.password_hash, "wrench");
        assert!(auth::verify_password("wrench", &user.password_hash));
    }

    #[tokio::test]
    async fn dev_admin_seed_is_idempotent() {
        let stores = MemoryStore::new().stores();
        let service = UserService::new(stores.clone());

        service.ensure_dev_admin().await.unwrap();
        service.ensure_dev_admin().await.unwrap();

        assert!(stores.users.find_by_username("admin").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let service = UserService::new(MemoryStore::new().stores());
        let new_user = NewUser {
            firstname: None,
            surname: None,
            email: None,
            username: "mechanic".to_string(),
            password: "wrench".to_string(),
            roles: vec![UserRole::Mechanic],
        };

        service.create_user(new_user.clone()).await.unwrap();
        assert!(matches!(
            service.create_user(new_user).await.unwrap_err(),
            DomainError::Duplicate { .. }
        ));
    }
}
