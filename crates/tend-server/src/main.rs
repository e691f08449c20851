use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router, middleware,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use tend_api::auth::{self, AppState, AppStateInner};
use tend_api::middleware::require_auth;
use tend_api::{analytics, chat, checkins, commitments, habits, people, profile};
use tend_assistant::AssistantClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tend=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("TEND_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("TEND_DB_PATH").unwrap_or_else(|_| "tend.db".into());
    let host = std::env::var("TEND_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("TEND_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let api_key = std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|key| !key.is_empty());
    let model = std::env::var("TEND_ASSISTANT_MODEL")
        .unwrap_or_else(|_| "claude-3-5-haiku-latest".into());
    let assistant_timeout: u64 = std::env::var("TEND_ASSISTANT_TIMEOUT_SECS")
        .unwrap_or_else(|_| "30".into())
        .parse()?;

    // Init database
    let db = tend_db::Database::open(&PathBuf::from(&db_path))?;

    // Chat relay
    if api_key.is_none() {
        info!("ANTHROPIC_API_KEY not set, chat answers locally");
    }
    let assistant = AssistantClient::new(api_key, model, Duration::from_secs(assistant_timeout))?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        assistant,
    });

    // Routes
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/register", post(auth::register))
        .route("/token", post(auth::login))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/users/me", get(auth::me))
        .route("/habits", get(habits::list_habits).post(habits::create_habit))
        .route(
            "/habits/{habit_id}",
            put(habits::update_habit).delete(habits::delete_habit),
        )
        .route("/habits/{habit_id}/log", post(habits::log_habit))
        .route("/habits/{habit_id}/stats", get(habits::habit_stats))
        .route(
            "/commitments",
            get(commitments::list_commitments).post(commitments::create_commitment),
        )
        .route(
            "/commitments/{id}",
            put(commitments::update_commitment).delete(commitments::delete_commitment),
        )
        .route("/commitments/{id}/complete", post(commitments::complete_commitment))
        .route("/checkins/daily", post(checkins::create_checkin))
        .route("/checkins/history", get(checkins::checkin_history))
        .route("/analytics/overview", get(analytics::overview))
        .route("/analytics/habits", get(analytics::habit_analytics))
        .route("/analytics/commitments", get(analytics::commitment_analytics))
        .route("/analytics/mood", get(analytics::mood_analytics))
        .route(
            "/profile",
            get(profile::get_profile)
                .post(profile::create_profile)
                .put(profile::update_profile),
        )
        .route("/people", get(people::list_people).post(people::create_person))
        .route(
            "/people/{id}",
            get(people::get_person)
                .put(people::update_person)
                .delete(people::delete_person),
        )
        .route("/chat", post(chat::chat))
        .route("/chat/history", get(chat::chat_history))
        .layer(middleware::from_fn_with_state(app_state.clone(), require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("tend server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "tend API" }))
}
