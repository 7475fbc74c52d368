// Entity-specific lookups and inserts. Narrow filters over the same
// storage the generic Store mediates.
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::database::manager::{map_sqlx_error, DatabaseError};
use crate::database::models::{
    Booking, BookingCreate, Desk, DeskCreate, Room, RoomCreate, User, UserCreate,
};
use crate::database::store::{order_clause, Entity};
use crate::query::{RangeParam, SortParam};

// Users

pub async fn find_user_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Insert a user; the password arrives pre-hashed from the caller.
pub async fn create_user(
    pool: &PgPool,
    user: &UserCreate,
    hashed_password: &str,
) -> Result<User, DatabaseError> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, username, hashed_password, admin) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(hashed_password)
    .bind(user.admin)
    .fetch_one(pool)
    .await
    .map_err(|e| map_sqlx_error(e, User::CONFLICT_MESSAGE))
}

// Rooms

pub async fn find_room_by_name(pool: &PgPool, name: &str) -> Result<Option<Room>, DatabaseError> {
    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE name = $1")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(room)
}

pub async fn create_room(pool: &PgPool, room: &RoomCreate) -> Result<Room, DatabaseError> {
    sqlx::query_as::<_, Room>("INSERT INTO rooms (name) VALUES ($1) RETURNING *")
        .bind(&room.name)
        .fetch_one(pool)
        .await
        .map_err(|e| map_sqlx_error(e, Room::CONFLICT_MESSAGE))
}

// Desks

pub async fn find_desk_by_room_and_number(
    pool: &PgPool,
    room_id: i64,
    number: i32,
) -> Result<Option<Desk>, DatabaseError> {
    let desk = sqlx::query_as::<_, Desk>("SELECT * FROM desks WHERE room_id = $1 AND number = $2")
        .bind(room_id)
        .bind(number)
        .fetch_optional(pool)
        .await?;
    Ok(desk)
}

/// Desks scoped to one room, with the same sort/range semantics as the
/// generic listing.
pub async fn find_desks_in_room(
    pool: &PgPool,
    room_id: i64,
    sort: Option<&SortParam>,
    range: Option<&RangeParam>,
) -> Result<Vec<Desk>, DatabaseError> {
    let order = order_clause::<Desk>(sort)?;
    let mut sql = format!("SELECT * FROM desks WHERE room_id = $1 {}", order);

    let desks = if let Some(range) = range {
        sql.push_str(" OFFSET $2 LIMIT $3");
        sqlx::query_as::<_, Desk>(&sql)
            .bind(room_id)
            .bind(range.offset)
            .bind(range.limit)
            .fetch_all(pool)
            .await?
    } else {
        sqlx::query_as::<_, Desk>(&sql)
            .bind(room_id)
            .fetch_all(pool)
            .await?
    };

    Ok(desks)
}

pub async fn create_desk(pool: &PgPool, desk: &DeskCreate) -> Result<Desk, DatabaseError> {
    sqlx::query_as::<_, Desk>("INSERT INTO desks (number, room_id) VALUES ($1, $2) RETURNING *")
        .bind(desk.number)
        .bind(desk.room_id)
        .fetch_one(pool)
        .await
        .map_err(|e| map_sqlx_error(e, Desk::CONFLICT_MESSAGE))
}

// Bookings

pub async fn find_booking_by_desk_and_date(
    pool: &PgPool,
    desk_id: i64,
    date: NaiveDate,
) -> Result<Option<Booking>, DatabaseError> {
    let booking =
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE desk_id = $1 AND date = $2")
            .bind(desk_id)
            .bind(date)
            .fetch_optional(pool)
            .await?;
    Ok(booking)
}

/// All bookings in a room on a date: a join across desk ownership
pub async fn find_bookings_by_room_and_date(
    pool: &PgPool,
    room_id: i64,
    date: NaiveDate,
) -> Result<Vec<Booking>, DatabaseError> {
    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT b.* FROM bookings b \
         JOIN desks d ON b.desk_id = d.id \
         WHERE d.room_id = $1 AND b.date = $2 \
         ORDER BY b.id ASC",
    )
    .bind(room_id)
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(bookings)
}

/// A user's bookings, most recent date first
pub async fn find_bookings_by_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<Booking>, DatabaseError> {
    let bookings = sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE user_id = $1 ORDER BY date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(bookings)
}

pub async fn create_booking(
    pool: &PgPool,
    booking: &BookingCreate,
) -> Result<Booking, DatabaseError> {
    sqlx::query_as::<_, Booking>(
        "INSERT INTO bookings (user_id, desk_id, date, approved_status) \
         VALUES ($1, $2, $3, $4) RETURNING *",
    )
    .bind(booking.user_id)
    .bind(booking.desk_id)
    .bind(booking.date)
    .bind(booking.approved_status)
    .fetch_one(pool)
    .await
    .map_err(|e| map_sqlx_error(e, Booking::CONFLICT_MESSAGE))
}
