use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    Json,
};

use crate::auth::password;
use crate::database::manager::DatabaseManager;
use crate::database::models::{User, UserCreate, UserUpdate};
use crate::database::queries;
use crate::database::store::Store;
use crate::error::ApiError;
use crate::middleware::{ensure_admin, ensure_owner_or_admin, CurrentUser};
use crate::query::ListParams;

use super::list_response;

/// POST /register (also POST /users) - public registration.
/// The username pre-check is the friendly path; the unique index on the
/// users table is the authoritative one.
pub async fn register(Json(payload): Json<UserCreate>) -> Result<Json<User>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    if queries::find_user_by_username(&pool, &payload.username)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Email already registered"));
    }

    let hashed = password::hash_password(&payload.password)?;
    let user = queries::create_user(&pool, &payload, &hashed).await?;
    Ok(Json(user))
}

/// GET /users - bulk listing, administrators only (guarded at the route)
pub async fn index(params: ListParams) -> Result<Response, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let users = Store::<User>::new(pool)
        .list(params.sort.as_ref(), params.range.as_ref())
        .await?;
    Ok(list_response(users))
}

/// GET /users/me/ - the principal's own record
pub async fn me(Extension(user): Extension<CurrentUser>) -> Result<Json<User>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let record = Store::<User>::new(pool)
        .get(user.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;
    Ok(Json(record))
}

/// GET /users/:user_id - own record, or any record for administrators
pub async fn show(
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    ensure_owner_or_admin(&user, user_id)?;

    let pool = DatabaseManager::pool().await?;
    let record = Store::<User>::new(pool)
        .get(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(record))
}

/// PATCH /users/:user_id - sparse update of own record, or any as admin
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
    Json(patch): Json<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    ensure_owner_or_admin(&user, user_id)?;

    let pool = DatabaseManager::pool().await?;
    let store = Store::<User>::new(pool);
    if store.get(user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    let updated = store.update_by_diff(user_id, &patch).await?;
    Ok(Json(updated))
}

/// DELETE /users/:user_id - administrators only
pub async fn destroy(
    Extension(user): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    ensure_admin(&user)?;

    let pool = DatabaseManager::pool().await?;
    let store = Store::<User>::new(pool);
    if store.get(user_id).await?.is_none() {
        return Err(ApiError::not_found("User not found"));
    }
    store.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
