use axum::{extract::State, Json};

use service::records::Dashboard;

use crate::errors::ApiError;
use crate::routes::auth::ServerState;
use crate::session::CurrentUser;

/// Counts plus the first few records of each collection. Any failure is a plain 500.
#[utoipa::path(get, path = "/api/dashboard", tag = "records", responses((status = 200, description = "Dashboard"), (status = 401, description = "No session"), (status = 500, description = "server error")))]
pub async fn dashboard(CurrentUser(_user): CurrentUser, State(state): State<ServerState>) -> Result<Json<Dashboard>, ApiError> {
    state.records.dashboard().await.map(Json).map_err(ApiError::internal)
}
