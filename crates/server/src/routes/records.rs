use axum::{extract::{Path, Query, State}, http::StatusCode, Extension, Json};
use serde::Deserialize;
use tracing::info;

use service::pagination::{Page, Pagination, SortOrder};
use service::storage::{Collection, Fields, Record};

use crate::errors::{ApiError, JsonBody};
use crate::routes::auth::ServerState;
use crate::session::CurrentUser;

/// Raw list parameters; coercion happens in [`Pagination::from_query`].
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub per_page: Option<String>,
    pub order: Option<String>,
}

/// Ids are numeric; anything else cannot name a record.
fn parse_id(raw: &str) -> Result<u64, ApiError> {
    raw.trim().parse::<u64>().map_err(|_| ApiError::not_found())
}

#[utoipa::path(
    get, path = "/api/{collection}", tag = "records",
    params(
        ("collection" = String, Path, description = "employees | customers | services"),
        ("page" = Option<u64>, Query, description = "1-based page, default 1"),
        ("per_page" = Option<u64>, Query, description = "page size, default 10"),
        ("order" = Option<String>, Query, description = "employees only: asc | desc (default)")
    ),
    responses((status = 200, description = "One page of records"))
)]
pub async fn list(
    State(state): State<ServerState>,
    Extension(collection): Extension<Collection>,
    Query(q): Query<ListQuery>,
) -> Result<Json<Page<Record>>, ApiError> {
    let p = Pagination::from_query(q.page.as_deref(), q.per_page.as_deref());
    let order = SortOrder::from_query(q.order.as_deref());
    Ok(Json(state.records.list(collection, p, order).await?))
}

#[utoipa::path(
    get, path = "/api/{collection}/{id}", tag = "records",
    params(("collection" = String, Path, description = "employees | customers | services"), ("id" = u64, Path, description = "record id")),
    responses((status = 200, description = "Record"), (status = 404, description = "Not Found"))
)]
pub async fn get_one(
    State(state): State<ServerState>,
    Extension(collection): Extension<Collection>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.records.get(collection, id).await?))
}

#[utoipa::path(
    post, path = "/api/{collection}", tag = "records",
    params(("collection" = String, Path, description = "employees | customers | services")),
    request_body = crate::openapi::RecordInputDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "name required"), (status = 401, description = "No session"))
)]
pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<ServerState>,
    Extension(collection): Extension<Collection>,
    JsonBody(fields): JsonBody<Fields>,
) -> Result<(StatusCode, Json<Record>), ApiError> {
    let rec = state.records.create(collection, fields).await?;
    info!(%collection, id = ?rec.id, by = user.id, "create_request_ok");
    Ok((StatusCode::CREATED, Json(rec)))
}

#[utoipa::path(
    put, path = "/api/{collection}/{id}", tag = "records",
    params(("collection" = String, Path, description = "employees | customers | services"), ("id" = u64, Path, description = "record id")),
    request_body = crate::openapi::RecordInputDoc,
    responses((status = 200, description = "Updated"), (status = 401, description = "No session"), (status = 404, description = "Not Found"))
)]
pub async fn update(
    CurrentUser(user): CurrentUser,
    State(state): State<ServerState>,
    Extension(collection): Extension<Collection>,
    Path(id): Path<String>,
    JsonBody(fields): JsonBody<Fields>,
) -> Result<Json<Record>, ApiError> {
    let id = parse_id(&id)?;
    let rec = state.records.update(collection, id, fields).await?;
    info!(%collection, id, by = user.id, "update_request_ok");
    Ok(Json(rec))
}

#[utoipa::path(
    delete, path = "/api/{collection}/{id}", tag = "records",
    params(("collection" = String, Path, description = "employees | customers | services"), ("id" = u64, Path, description = "record id")),
    responses((status = 204, description = "Deleted"), (status = 401, description = "No session"), (status = 404, description = "Not Found"))
)]
pub async fn delete(
    CurrentUser(user): CurrentUser,
    State(state): State<ServerState>,
    Extension(collection): Extension<Collection>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    state.records.delete(collection, id).await?;
    info!(%collection, id, by = user.id, "delete_request_ok");
    Ok(StatusCode::NO_CONTENT)
}
