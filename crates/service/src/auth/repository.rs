use async_trait::async_trait;

use super::errors::AuthError;
use crate::storage::{NewUser, User};

/// Repository abstraction for auth-related persistence.
#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;
    async fn create_user(&self, input: NewUser) -> Result<User, AuthError>;
}

/// Simple in-memory mock repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    use crate::storage::document::next_id;

    #[derive(Default)]
    pub struct MockAuthRepository {
        users: Mutex<Vec<User>>,
    }

    impl MockAuthRepository {
        pub fn user_count(&self) -> usize {
            self.users.lock().map(|u| u.len()).unwrap_or_default()
        }
    }

    fn poisoned<T>(_: T) -> AuthError {
        AuthError::Repository("mock repository lock poisoned".into())
    }

    #[async_trait]
    impl AuthRepository for MockAuthRepository {
        async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().map_err(poisoned)?;
            Ok(users.iter().find(|u| u.username == username).cloned())
        }

        async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
            let users = self.users.lock().map_err(poisoned)?;
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn create_user(&self, input: NewUser) -> Result<User, AuthError> {
            let mut users = self.users.lock().map_err(poisoned)?;
            let user = User {
                id: next_id(users.iter().map(|u| u.id)),
                username: input.username,
                email: input.email,
                password_hash: input.password_hash,
                created_at: chrono::Utc::now().to_rfc3339(),
                extra: Default::default(),
            };
            users.push(user.clone());
            Ok(user)
        }
    }
}
