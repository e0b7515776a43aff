//! The sync server: accounts, bearer tokens and per-user document storage.
//!
//! Routes, all under `/api`:
//!
//! - `GET /health`
//! - `POST /auth/register`, `POST /auth/login`, `GET /auth/verify`
//! - `GET|POST /data/sync`, `GET|POST|DELETE /data/{data_type}` (auth required)
//! - `GET|PUT /users/profile` (auth required)

pub mod auth;
pub mod db;
pub mod error;
pub mod handlers;
pub mod storage;
pub mod tokens;
pub mod users;

pub use auth::{auth_middleware, AuthUser};
pub use db::init_db;
pub use error::ApiError;
pub use storage::UserDataRepository;
pub use tokens::{parse_expiry, Claims, TokenIssuer};
pub use users::{User, UserRepository};

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use chrono::Duration;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const BODY_LIMIT: usize = 10 * 1024 * 1024;

const FALLBACK_JWT_SECRET: &str = "gains-development-secret-change-me";

const DEFAULT_BCRYPT_COST: u32 = 10;

/// Server settings, read from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub bcrypt_cost: u32,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            db_path: PathBuf::from("./database/gains.db"),
            jwt_secret: FALLBACK_JWT_SECRET.to_string(),
            jwt_expires_in: Duration::days(7),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Reads `PORT`, `DB_PATH`, `JWT_SECRET`, `JWT_EXPIRES_IN`, `BCRYPT_COST`
    /// and `CORS_ORIGINS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let db_path = var("DB_PATH").map(PathBuf::from).unwrap_or(defaults.db_path);

        let jwt_secret = var("JWT_SECRET").unwrap_or(defaults.jwt_secret);

        let jwt_expires_in = match var("JWT_EXPIRES_IN") {
            Some(raw) => parse_expiry(&raw).unwrap_or_else(|| {
                tracing::warn!("Ignoring invalid JWT_EXPIRES_IN {:?}", raw);
                defaults.jwt_expires_in
            }),
            None => defaults.jwt_expires_in,
        };

        let bcrypt_cost = var("BCRYPT_COST")
            .and_then(|c| c.trim().parse().ok())
            .filter(|c| (4..=31).contains(c))
            .unwrap_or(defaults.bcrypt_cost);

        let cors_origins = var("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            port,
            db_path,
            jwt_secret,
            jwt_expires_in,
            bcrypt_cost,
            cors_origins,
        }
    }

    pub fn uses_fallback_secret(&self) -> bool {
        self.jwt_secret == FALLBACK_JWT_SECRET
    }
}

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub users: UserRepository,
    pub data: UserDataRepository,
    pub tokens: Arc<TokenIssuer>,
    pub bcrypt_cost: u32,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &ServerConfig) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            data: UserDataRepository::new(pool),
            tokens: Arc::new(TokenIssuer::new(&config.jwt_secret, config.jwt_expires_in)),
            bcrypt_cost: config.bcrypt_cost,
        }
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();

    if allowed.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(allowed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Builds the full application router.
pub fn router(state: AppState, cors_origins: &[String]) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/verify", get(handlers::verify));

    let protected_routes = Router::new()
        .route(
            "/data/sync",
            get(handlers::get_all_data).post(handlers::sync_all_data),
        )
        .route(
            "/data/{data_type}",
            get(handlers::get_data)
                .post(handlers::save_data)
                .delete(handlers::delete_data),
        )
        .route(
            "/users/profile",
            get(handlers::get_profile).put(handlers::update_profile),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new().merge(public_routes).merge(protected_routes);

    Router::new()
        .nest("/api", api)
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
}
