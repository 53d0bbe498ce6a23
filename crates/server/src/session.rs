//! Cookie ↔ server-side session glue: the [`CurrentUser`] extractor for
//! protected API handlers and the page guard that redirects to the login page.

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use service::session::SessionUser;
use uuid::Uuid;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;

/// Pages that need a session; anonymous visitors are sent to [`LOGIN_PAGE`].
pub const PROTECTED_PAGES: [&str; 5] = ["/", "/employees.html", "/customers.html", "/services.html", "/user.html"];
pub const LOGIN_PAGE: &str = "/login.html";

impl ServerState {
    fn session_id(&self, jar: &CookieJar) -> Option<Uuid> {
        jar.get(&self.cookie.cookie_name).and_then(|c| Uuid::parse_str(c.value()).ok())
    }

    /// Principal of the request's session, if it is known and unexpired.
    pub fn session_user(&self, jar: &CookieJar) -> Option<SessionUser> {
        self.session_id(jar).and_then(|sid| self.sessions.get(&sid))
    }

    /// Open a session for `user`, replacing whatever session the jar carried.
    pub fn start_session(&self, jar: CookieJar, user: SessionUser) -> CookieJar {
        if let Some(old) = self.session_id(&jar) {
            self.sessions.destroy(&old);
        }
        let sid = self.sessions.create(user);
        let mut cookie = Cookie::new(self.cookie.cookie_name.clone(), sid.to_string());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(self.cookie.secure_cookie);
        cookie.set_same_site(SameSite::Lax);
        // browser lifetime matches the server-side TTL
        cookie.set_max_age(time::Duration::seconds(self.sessions.ttl().num_seconds().max(0)));
        jar.add(cookie)
    }

    /// Destroy the jar's session (if any) and clear the cookie.
    pub fn end_session(&self, jar: CookieJar) -> CookieJar {
        if let Some(sid) = self.session_id(&jar) {
            self.sessions.destroy(&sid);
        }
        let mut cookie = Cookie::new(self.cookie.cookie_name.clone(), "");
        cookie.set_path("/");
        jar.remove(cookie)
    }
}

/// Extractor that requires a valid session; rejects with 401 `{"error":"unauthorized"}`.
pub struct CurrentUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        match state.session_user(&jar) {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                tracing::warn!(path = %parts.uri.path(), method = %parts.method, "request without valid session");
                Err(ApiError::unauthorized())
            }
        }
    }
}

/// Global middleware: protected pages redirect to the login page without a session.
pub async fn guard_pages(State(state): State<ServerState>, jar: CookieJar, req: Request, next: Next) -> Response {
    let path = req.uri().path();
    if PROTECTED_PAGES.contains(&path) && state.session_user(&jar).is_none() {
        return Redirect::to(LOGIN_PAGE).into_response();
    }
    next.run(req).await
}
