use async_trait::async_trait;

use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::storage::{DocumentStore, NewUser, User};

/// Users live in the same JSON document as every other collection.
#[async_trait]
impl AuthRepository for DocumentStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AuthError> {
        Ok(self.get_user_by_username(username).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        Ok(self.get_user_by_email(email).await?)
    }

    async fn create_user(&self, input: NewUser) -> Result<User, AuthError> {
        Ok(DocumentStore::create_user(self, input).await?)
    }
}
