use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::NaiveDate;

use crate::database::manager::DatabaseManager;
use crate::database::models::{Booking, BookingCreate, BookingUpdate};
use crate::database::queries;
use crate::database::store::Store;
use crate::error::ApiError;
use crate::middleware::{ensure_owner_or_admin, CurrentUser};
use crate::query::ListParams;

use super::list_response;

/// POST /bookings - administrators only (guarded at the route).
/// Booking mutation below honors the booking's own user_id, but creation
/// stays admin-only; the asymmetry is the documented behavior.
pub async fn create(Json(payload): Json<BookingCreate>) -> Result<Json<Booking>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    if queries::find_booking_by_desk_and_date(&pool, payload.desk_id, payload.date)
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Booking already exists"));
    }
    let booking = queries::create_booking(&pool, &payload).await?;
    Ok(Json(booking))
}

/// GET /bookings - bulk listing, administrators only (guarded at the route)
pub async fn index(params: ListParams) -> Result<Response, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let bookings = Store::<Booking>::new(pool)
        .list(params.sort.as_ref(), params.range.as_ref())
        .await?;
    Ok(list_response(bookings))
}

/// GET /rooms/:room_id/bookings/:date - bookings in a room on a date
pub async fn index_in_room(
    Path((room_id, date)): Path<(i64, NaiveDate)>,
) -> Result<Json<Vec<Booking>>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let bookings = queries::find_bookings_by_room_and_date(&pool, room_id, date).await?;
    Ok(Json(bookings))
}

/// GET /users/me/bookings/ - the principal's bookings, most recent first
pub async fn mine(Extension(user): Extension<CurrentUser>) -> Result<Json<Vec<Booking>>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let bookings = queries::find_bookings_by_user(&pool, user.id).await?;
    Ok(Json(bookings))
}

/// GET /bookings/:booking_id - the booking's owner, or an administrator.
/// The owner is only known once the record is loaded, so the gate runs
/// right after the fetch.
pub async fn show(
    Extension(user): Extension<CurrentUser>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Booking>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let booking = Store::<Booking>::new(pool)
        .get(booking_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;
    ensure_owner_or_admin(&user, booking.user_id)?;
    Ok(Json(booking))
}

/// PATCH /bookings/:booking_id - owner or administrator
pub async fn update(
    Extension(user): Extension<CurrentUser>,
    Path(booking_id): Path<i64>,
    Json(patch): Json<BookingUpdate>,
) -> Result<Json<Booking>, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let store = Store::<Booking>::new(pool);
    let existing = store
        .get(booking_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;
    ensure_owner_or_admin(&user, existing.user_id)?;

    let updated = store.update_by_diff(booking_id, &patch).await?;
    Ok(Json(updated))
}

/// DELETE /bookings/:booking_id - owner or administrator
pub async fn destroy(
    Extension(user): Extension<CurrentUser>,
    Path(booking_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let pool = DatabaseManager::pool().await?;
    let store = Store::<Booking>::new(pool);
    let existing = store
        .get(booking_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Booking not found"))?;
    ensure_owner_or_admin(&user, existing.user_id)?;

    store.delete(booking_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
