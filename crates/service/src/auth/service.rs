use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use rand::rngs::OsRng;
use tracing::{debug, info, instrument, warn};

use super::domain::{is_valid_email, LoginInput, SessionUser, SignupInput};
use super::errors::AuthError;
use super::repository::AuthRepository;
use crate::storage::NewUser;

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    /// Register a new user and return the principal to open a session for.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::SignupInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo);
    /// let input = SignupInput { username: "ann".into(), password: "pw".into(), email: "ann@example.com".into() };
    /// let user = tokio_test::block_on(svc.signup(input)).unwrap();
    /// assert_eq!(user.username, "ann");
    /// assert_eq!(user.id, 1);
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn signup(&self, input: SignupInput) -> Result<SessionUser, AuthError> {
        if input.username.is_empty() || input.password.is_empty() || input.email.is_empty() {
            return Err(AuthError::Validation("username, email and password required".into()));
        }
        if !is_valid_email(&input.email) {
            return Err(AuthError::Validation("invalid email".into()));
        }
        if self.repo.find_user_by_username(&input.username).await?.is_some() {
            debug!("username taken");
            return Err(AuthError::Conflict("username exists".into()));
        }
        if self.repo.find_user_by_email(&input.email).await?.is_some() {
            debug!("email taken");
            return Err(AuthError::Conflict("email exists".into()));
        }

        let password_hash = hash_password(input.password).await?;
        let user = self
            .repo
            .create_user(NewUser { username: input.username, email: input.email, password_hash })
            .await?;
        info!(user_id = user.id, username = %user.username, "user_signed_up");
        Ok(SessionUser { username: user.username, id: user.id })
    }

    /// Check credentials. Unknown user and wrong password are the same error.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::AuthService, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{SignupInput, LoginInput};
    /// use std::sync::Arc;
    /// let svc = AuthService::new(Arc::new(MockAuthRepository::default()));
    /// let _ = tokio_test::block_on(svc.signup(SignupInput { username: "u".into(), password: "Passw0rd".into(), email: "u@e.com".into() }));
    /// let user = tokio_test::block_on(svc.login(LoginInput { username: "u".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(user.username, "u");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn login(&self, input: LoginInput) -> Result<SessionUser, AuthError> {
        if input.username.is_empty() || input.password.is_empty() {
            return Err(AuthError::Validation("username and password required".into()));
        }
        let user = self
            .repo
            .find_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if !verify_password(input.password, user.password_hash.clone()).await? {
            return Err(AuthError::Unauthorized);
        }
        info!(user_id = user.id, "user_logged_in");
        Ok(SessionUser { username: user.username, id: user.id })
    }
}

/// Argon2 with the crate's default (fixed) parameters, on the blocking pool.
pub async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::HashError(e.to_string()))?
}

/// `Ok(false)` for a mismatch; a stored hash that is not a PHC string also never matches.
pub async fn verify_password(password: String, stored: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed = match PasswordHash::new(&stored) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is not a PHC string");
                return false;
            }
        };
        Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
    })
    .await
    .map_err(|e| AuthError::HashError(e.to_string()))
}
