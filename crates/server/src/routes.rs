pub mod auth;
pub mod dashboard;
pub mod records;

use axum::{
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use service::storage::Collection;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::session;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// List/read are public; create/update/delete extract [`session::CurrentUser`].
fn collection_routes(collection: Collection) -> Router<auth::ServerState> {
    Router::new()
        .route("/", get(records::list).post(records::create))
        .route(
            "/:id",
            get(records::get_one).put(records::update).delete(records::delete),
        )
        .layer(Extension(collection))
}

/// Build the full application router: API, auth endpoints, and static pages
/// (the HTML pages listed in [`session::PROTECTED_PAGES`] need a session).
pub fn build_router(state: auth::ServerState, frontend_dir: &str, cors: CorsLayer) -> Router {
    let static_dir = ServeDir::new(frontend_dir);

    let mut api = Router::new()
        .route("/api/dashboard", get(dashboard::dashboard))
        .route("/api/auth-check", get(auth::auth_check));
    for collection in Collection::ALL {
        api = api.nest(&format!("/api/{collection}"), collection_routes(collection));
    }

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/signup", post(auth::signup))
        .route("/logout", post(auth::logout));

    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi_json));

    // Compose
    public
        .merge(auth_routes)
        .merge(api)
        .fallback_service(static_dir)
        .layer(middleware::from_fn_with_state(state.clone(), session::guard_pages))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                // 响应返回时打点，包含状态码与耗时
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
