use axum::{
    http::{header, HeaderValue},
    middleware,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use desk_booking_api::config;
use desk_booking_api::database::manager::DatabaseManager;
use desk_booking_api::handlers::{auth, bookings, desks, rooms, users};
use desk_booking_api::middleware::{
    flatten_query_params, request_id_middleware, require_admin, require_auth,
};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, secrets, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting desk-booking API in {:?} mode", config.environment);

    // Tables and unique indexes; the server still comes up when storage is
    // down so /health can report it
    if let Err(e) = DatabaseManager::migrate().await {
        tracing::error!("Schema bootstrap failed, storage may be unavailable: {}", e);
    }

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Desk booking API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    public_routes()
        .merge(protected_routes())
        // Global middleware, outermost first; the query normalizer runs
        // before every guard and extractor. Applied as individual layers
        // (innermost first) so the outermost-first ordering above is
        // preserved: the last `.layer()` call wraps outermost.
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(middleware::from_fn(flatten_query_params))
}

fn public_routes() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        // Both paths registered to keep to REST conventions
        .route("/register", post(users::register))
        .route("/users", post(users::register))
}

fn protected_routes() -> Router {
    Router::new()
        // Users
        .route(
            "/users",
            get(users::index).route_layer(middleware::from_fn(require_admin)),
        )
        .route("/users/me/", get(users::me))
        .route("/users/me/bookings/", get(bookings::mine))
        .route(
            "/users/:user_id",
            get(users::show).patch(users::update).delete(users::destroy),
        )
        // Rooms
        .route("/rooms", post(rooms::create).get(rooms::index))
        .route(
            "/rooms/:room_id",
            get(rooms::show).patch(rooms::update).delete(rooms::destroy),
        )
        .route("/rooms/:room_id/desks", get(desks::index_in_room))
        .route("/rooms/:room_id/bookings/:date", get(bookings::index_in_room))
        // Desks
        .route(
            "/desks",
            post(desks::create)
                .get(desks::index)
                .route_layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/desks/:desk_id",
            get(desks::show).patch(desks::update).delete(desks::destroy),
        )
        // Bookings
        .route(
            "/bookings",
            post(bookings::create)
                .get(bookings::index)
                .route_layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/bookings/:booking_id",
            get(bookings::show)
                .patch(bookings::update)
                .delete(bookings::destroy),
        )
        // Every route above requires a valid access token
        .route_layer(middleware::from_fn(require_auth))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Desk Booking API",
        "version": version,
        "endpoints": {
            "login": "POST /login (public)",
            "refresh": "POST /refresh (public)",
            "register": "POST /register, POST /users (public)",
            "users": "/users[/:id] (bearer token; listing and delete are admin-only)",
            "rooms": "/rooms[/:id] (bearer token; mutation is admin-only)",
            "desks": "/desks[/:id] (bearer token; collection and mutation are admin-only)",
            "bookings": "/bookings[/:id] (bearer token; collection is admin-only)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
