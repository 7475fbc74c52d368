pub mod auth;
pub mod normalize;
pub mod request_id;

pub use auth::{ensure_admin, ensure_owner_or_admin, require_admin, require_auth, CurrentUser};
pub use normalize::flatten_query_params;
pub use request_id::{request_id_middleware, RequestId};
