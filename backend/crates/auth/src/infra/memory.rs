//! In-Memory Repository Implementation
//!
//! Process-local credential store for development without a database and
//! for tests. Contents are lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{UserId, email::Email, user_name::UserName};
use crate::error::{AuthError, AuthResult};

/// In-memory credential store
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn collides(existing: &User, user_name: &UserName, email: &Email) -> bool {
    existing.user_name == *user_name || existing.email == *email
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        // Check and insert under one write lock
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.user_id == user.user_id || collides(u, &user.user_name, &user.email))
        {
            return Err(AuthError::Conflict);
        }
        users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn find_active_by_user_name(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.is_active && u.user_name == *user_name)
            .cloned())
    }

    async fn exists_by_user_name_or_email(
        &self,
        user_name: &UserName,
        email: &Email,
    ) -> AuthResult<bool> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| collides(u, user_name, email)))
    }

    async fn record_login(&self, user_id: &UserId, at: DateTime<Utc>) -> AuthResult<()> {
        let mut users = self.users.write().await;
        let user = users.get_mut(user_id).ok_or(AuthError::UserNotFound)?;
        user.record_login(at);
        Ok(())
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let mut users = self.users.write().await;
        let stored = users.get_mut(&user.user_id).ok_or(AuthError::UserNotFound)?;
        stored.role = user.role;
        stored.is_active = user.is_active;
        stored.updated_at = user.updated_at;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::user_password::UserPassword;

    const PHC: &str = "$argon2id$v=19$m=1024,t=1,p=1$c29tZXNhbHQ$RdescudvJCsgt3ub+b+dWRWJTmaaJObG";

    fn user(name: &str, email: &str) -> User {
        User::new(
            UserName::new(name).unwrap(),
            Email::new(email).unwrap(),
            UserPassword::from_phc_string(PHC).unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(&user("alice", "shared@example.com")).await.unwrap();

        let result = repo.create(&user("bob", "shared@example.com")).await;
        assert!(matches!(result, Err(AuthError::Conflict)));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_duplicate_user_name_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(&user("alice", "a@example.com")).await.unwrap();

        let result = repo.create(&user("alice", "b@example.com")).await;
        assert!(matches!(result, Err(AuthError::Conflict)));
    }

    #[tokio::test]
    async fn test_user_name_lookup_is_case_sensitive() {
        let repo = InMemoryUserRepository::new();
        repo.create(&user("Alice", "a@example.com")).await.unwrap();

        let exact = UserName::new("Alice").unwrap();
        let lower = UserName::new("alice").unwrap();
        assert!(repo.find_active_by_user_name(&exact).await.unwrap().is_some());
        assert!(repo.find_active_by_user_name(&lower).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_inactive_users_are_not_found_by_name() {
        let repo = InMemoryUserRepository::new();
        let mut alice = user("alice", "a@example.com");
        repo.create(&alice).await.unwrap();

        alice.set_active(false, Utc::now());
        repo.update(&alice).await.unwrap();

        let name = UserName::new("alice").unwrap();
        assert!(repo.find_active_by_user_name(&name).await.unwrap().is_none());
        assert!(repo.find_by_id(&alice.user_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_record_login() {
        let repo = InMemoryUserRepository::new();
        let alice = user("alice", "a@example.com");
        repo.create(&alice).await.unwrap();

        let at = Utc::now();
        repo.record_login(&alice.user_id, at).await.unwrap();

        let stored = repo.find_by_id(&alice.user_id).await.unwrap().unwrap();
        assert_eq!(stored.last_login_at, Some(at));
    }
}
