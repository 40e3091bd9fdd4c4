mod auth;
mod bugs;
mod comments;
mod dashboard;
mod error;
mod extractors;
mod projects;
mod response;
#[cfg(test)]
mod test_support;
mod users;

use axum::{
    extract::State,
    http::{header, HeaderValue, Method},
    routing::get,
    Json, Router,
};
use bugline_config::{init_tracing, AppConfig};
use bugline_db::bugs::pg_repository::PgBugRepository;
use bugline_db::comments::pg_repository::PgCommentRepository;
use bugline_db::dashboard::pg_repository::PgDashboardRepository;
use bugline_db::projects::pg_repository::PgProjectRepository;
use bugline_db::sessions::pg_repository::PgSessionRepository;
use bugline_db::sessions::repositories::SessionRepository;
use bugline_db::users::pg_repository::PgUserRepository;
use sqlx::PgPool;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub users: PgUserRepository,
    pub sessions: PgSessionRepository,
    pub projects: PgProjectRepository,
    pub bugs: PgBugRepository,
    pub comments: PgCommentRepository,
    pub dashboard: PgDashboardRepository,
    pub session_ttl: chrono::Duration,
}

impl AppState {
    pub fn new(pool: PgPool, session_ttl_hours: i64) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            sessions: PgSessionRepository::new(pool.clone()),
            projects: PgProjectRepository::new(pool.clone()),
            bugs: PgBugRepository::new(pool.clone()),
            comments: PgCommentRepository::new(pool.clone()),
            dashboard: PgDashboardRepository::new(pool),
            session_ttl: chrono::Duration::hours(session_ttl_hours),
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "bugline-api",
        "version": env!("CARGO_PKG_VERSION"),
        "session_ttl_hours": state.session_ttl.num_hours(),
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .merge(auth::router())
        .merge(users::router())
        .merge(projects::router())
        .merge(bugs::router())
        .merge(comments::router())
        .merge(dashboard::router())
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    tracing::info!(service = "bugline-api", "starting");

    let pool = bugline_db::create_pool(&config.database_url)
        .await
        .expect("failed to create database pool");
    if config.run_migrations {
        bugline_db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");
    }

    let state = AppState::new(pool, config.session_ttl_hours);
    match state.sessions.purge_expired(chrono::Utc::now()).await {
        Ok(purged) => tracing::info!(purged, "expired sessions removed"),
        Err(e) => tracing::warn!(error = %e, "could not purge expired sessions"),
    }

    let app = build_router(state, &config.cors_origins);
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
