pub mod auth;
pub mod bookings;
pub mod desks;
pub mod rooms;
pub mod users;

use axum::{
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// List responses carry the result count in Content-Range and expose the
/// header to browser clients.
pub(crate) fn list_response<T: Serialize>(items: Vec<T>) -> Response {
    let count = items.len();
    let mut response = Json(items).into_response();
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_RANGE, HeaderValue::from(count as u64));
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("Content-Range"),
    );
    response
}
