use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::{IntoResponse, Response}, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::info;

use common::types::Ack;
use service::auth::{domain::{LoginInput, SignupInput}, service::AuthService};
use service::records::RecordService;
use service::session::{SessionStore, SessionUser};
use service::storage::DocumentStore;

use crate::errors::{ApiError, JsonBody};

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub cookie_name: String,
    pub secure_cookie: bool,
}

#[derive(Clone)]
pub struct ServerState {
    pub records: RecordService,
    pub auth: Arc<AuthService<DocumentStore>>,
    pub sessions: Arc<SessionStore>,
    pub cookie: ServerAuthConfig,
}

impl ServerState {
    pub fn new(store: Arc<DocumentStore>, sessions: Arc<SessionStore>, cookie: ServerAuthConfig) -> Self {
        Self {
            records: RecordService::new(Arc::clone(&store)),
            auth: Arc::new(AuthService::new(store)),
            sessions,
            cookie,
        }
    }
}

#[derive(Serialize)]
pub struct AuthCheckOutput { pub ok: bool, pub user: SessionUser }

#[utoipa::path(post, path = "/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in, session cookie set"), (status = 400, description = "Missing username or password"), (status = 401, description = "Invalid credentials")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    JsonBody(input): JsonBody<LoginInput>,
) -> Result<(CookieJar, Json<Ack>), ApiError> {
    let user = state.auth.login(input).await?;
    let jar = state.start_session(jar, user);
    Ok((jar, Json(Ack::OK)))
}

/// Signup doubles as login: the new user gets a session straight away.
#[utoipa::path(post, path = "/signup", tag = "auth", request_body = crate::openapi::SignupRequest, responses((status = 200, description = "Registered, session cookie set"), (status = 400, description = "Bad Request"), (status = 409, description = "Username or email exists")))]
pub async fn signup(
    State(state): State<ServerState>,
    jar: CookieJar,
    JsonBody(input): JsonBody<SignupInput>,
) -> Result<(CookieJar, Json<Ack>), ApiError> {
    let user = state.auth.signup(input).await?;
    let jar = state.start_session(jar, user);
    Ok((jar, Json(Ack::OK)))
}

#[utoipa::path(post, path = "/logout", tag = "auth", responses((status = 200, description = "Session destroyed")))]
pub async fn logout(State(state): State<ServerState>, jar: CookieJar) -> (CookieJar, Json<Ack>) {
    if let Some(user) = state.session_user(&jar) {
        info!(user_id = user.id, "user_logged_out");
    }
    (state.end_session(jar), Json(Ack::OK))
}

/// Lets the front-end decide what to show.
#[utoipa::path(get, path = "/api/auth-check", tag = "auth", responses((status = 200, description = "Session valid"), (status = 401, description = "No valid session")))]
pub async fn auth_check(State(state): State<ServerState>, jar: CookieJar) -> Response {
    match state.session_user(&jar) {
        Some(user) => Json(AuthCheckOutput { ok: true, user }).into_response(),
        None => (StatusCode::UNAUTHORIZED, Json(Ack::FAILED)).into_response(),
    }
}
