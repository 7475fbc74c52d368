use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::database::manager::DatabaseManager;
use crate::database::models::{Desk, DeskCreate, DeskUpdate};
use crate::database::queries;
use crate::database::store::Store;
use crate::error::ApiError;
use crate::middleware::{ensure_admin, CurrentUser};
use crate::query::ListParams;

use super::list_response;

/// POST /desks - administrators only (guarded at the route).
/// (room, number) uniqueness is pre-checked for the friendly error; the
/// storage unique index closes the race.
pub async fn create(Json(payload): Json<DeskCreate>) -> Result<Json<Desk>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    if queries::find_desk_by_room_and_number(&pool, payload.room_id, payload.number)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Desk already exists"));
    }
    let desk = queries::create_desk(&pool, &payload).await?;
    Ok(Json(desk))
}

/// GET /desks - bulk listing, administrators only (guarded at the route)
pub async fn index(params: ListParams) -> Result<Response, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let desks = Store::<Desk>::new(pool)
        .list(params.sort.as_ref(), params.range.as_ref())
        .await?;
    Ok(list_response(desks))
}

/// GET /rooms/:room_id/desks - desks scoped to one room
pub async fn index_in_room(
    Path(room_id): Path<i64>,
    params: ListParams,
) -> Result<Response, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let desks =
        queries::find_desks_in_room(&pool, room_id, params.sort.as_ref(), params.range.as_ref())
            .await?;
    Ok(list_response(desks))
}

/// GET /desks/:desk_id
pub async fn show(Path(desk_id): Path<i64>) -> Result<Json<Desk>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let desk = Store::<Desk>::new(pool)
        .get(desk_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Desk not found"))?;
    Ok(Json(desk))
}

/// PATCH /desks/:desk_id - administrators only
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    Path(desk_id): Path<i64>,
    Json(patch): Json<DeskUpdate>,
) -> Result<Json<Desk>, ApiError> {
    ensure_admin(&user)?;

    let pool = DatabaseManager::pool().await?;
    let store = Store::<Desk>::new(pool);
    if store.get(desk_id).await?.is_none() {
        return Err(ApiError::not_found("Desk not found"));
    }
    let updated = store.update_by_diff(desk_id, &patch).await?;
    Ok(Json(updated))
}

/// DELETE /desks/:desk_id - administrators only
pub async fn destroy(
    Extension(user): Extension<CurrentUser>,
    Path(desk_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&user)?;

    let pool = DatabaseManager::pool().await?;
    let store = Store::<Desk>::new(pool);
    if store.get(desk_id).await?.is_none() {
        return Err(ApiError::not_found("Desk not found"));
    }
    store.delete(desk_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
