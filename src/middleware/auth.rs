use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use crate::auth::{self, TokenKind};
use crate::database::manager::DatabaseManager;
use crate::database::models::User;
use crate::error::ApiError;

/// Authenticated principal resolved from a bearer token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub admin: bool,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            admin: user.admin,
        }
    }
}

/// Bearer-token middleware: validates the access token, resolves the
/// principal it names, and injects it into the request. The principal may
/// have been deleted since issuance, so resolution can still fail 401.
pub async fn require_auth(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers)?;
    let subject = auth::validate_token(&token, TokenKind::Access)?;

    let pool = DatabaseManager::pool().await?;
    let user = auth::resolve_subject(&pool, &subject)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Could not validate credentials"))?;

    request.extensions_mut().insert(CurrentUser::from(user));
    Ok(next.run(request).await)
}

/// Route-level administrator guard; layered after `require_auth`
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    ensure_admin(user)?;
    Ok(next.run(request).await)
}

/// Fails unless the principal is an administrator
pub fn ensure_admin(user: &CurrentUser) -> Result<(), ApiError> {
    if user.admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("Administrator privileges required"))
    }
}

/// Fails unless the principal owns the resource or is an administrator.
/// Invoked by handlers once the owning user id is known.
pub fn ensure_owner_or_admin(user: &CurrentUser, owner_id: i64) -> Result<(), ApiError> {
    if user.admin || user.id == owner_id {
        Ok(())
    } else {
        Err(ApiError::forbidden("You do not have access to this resource"))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err(ApiError::unauthorized("Empty bearer token"));
        }
        Ok(token.to_string())
    } else {
        Err(ApiError::unauthorized(
            "Authorization header must use Bearer token format",
        ))
    }
}
