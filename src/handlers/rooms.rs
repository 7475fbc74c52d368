use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::database::manager::DatabaseManager;
use crate::database::models::{Room, RoomCreate, RoomUpdate};
use crate::database::queries;
use crate::database::store::Store;
use crate::error::ApiError;
use crate::middleware::{ensure_admin, CurrentUser};
use crate::query::ListParams;

use super::list_response;

/// POST /rooms - any authenticated principal may create a room
pub async fn create(Json(payload): Json<RoomCreate>) -> Result<Json<Room>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    if queries::find_room_by_name(&pool, &payload.name)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Room already exists"));
    }
    let room = queries::create_room(&pool, &payload).await?;
    Ok(Json(room))
}

/// GET /rooms - listing with sort/range
pub async fn index(params: ListParams) -> Result<Response, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let rooms = Store::<Room>::new(pool)
        .list(params.sort.as_ref(), params.range.as_ref())
        .await?;
    Ok(list_response(rooms))
}

/// GET /rooms/:room_id
pub async fn show(Path(room_id): Path<i64>) -> Result<Json<Room>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let room = Store::<Room>::new(pool)
        .get(room_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Room not found"))?;
    Ok(Json(room))
}

/// PATCH /rooms/:room_id - administrators only
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    Path(room_id): Path<i64>,
    Json(patch): Json<RoomUpdate>,
) -> Result<Json<Room>, ApiError> {
    ensure_admin(&user)?;

    let pool = DatabaseManager::pool().await?;
    let store = Store::<Room>::new(pool);
    if store.get(room_id).await?.is_none() {
        return Err(ApiError::not_found("Room not found"));
    }
    let updated = store.update_by_diff(room_id, &patch).await?;
    Ok(Json(updated))
}

/// DELETE /rooms/:room_id - administrators only
pub async fn destroy(
    Extension(user): Extension<CurrentUser>,
    Path(room_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&user)?;

    let pool = DatabaseManager::pool().await?;
    let store = Store::<Room>::new(pool);
    if store.get(room_id).await?.is_none() {
        return Err(ApiError::not_found("Room not found"));
    }
    store.delete(room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
