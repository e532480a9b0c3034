use axum::{extract::DefaultBodyLimit, middleware as axum_middleware, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use scout_portfolio_api::{config, database, handlers, middleware};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scout_portfolio_api=info,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting Scout Portfolio API in {:?} mode", config.environment);

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Scout Portfolio API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    let config = config::config();

    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        // Protected API behind JWT middleware
        .merge(api_routes())
        // Global middleware
        .layer(DefaultBodyLimit::max(config.uploads.max_upload_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}

fn auth_public_routes() -> Router {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
}

fn api_routes() -> Router {
    use axum::routing::post;
    use handlers::protected::{auth, holdings, portfolios, recaps, upload};

    Router::new()
        .route("/api/auth/me", get(auth::me))
        // Portfolio CRUD
        .route(
            "/api/portfolios",
            get(portfolios::list).post(portfolios::create),
        )
        .route(
            "/api/portfolios/:portfolio_id",
            get(portfolios::get)
                .put(portfolios::update)
                .delete(portfolios::delete),
        )
        // Holdings CRUD
        .route(
            "/api/portfolios/:portfolio_id/holdings",
            get(holdings::list).post(holdings::create),
        )
        .route(
            "/api/portfolios/:portfolio_id/holdings/:holding_id",
            axum::routing::put(holdings::update).delete(holdings::delete),
        )
        // CSV ingestion
        .route(
            "/api/portfolios/:portfolio_id/upload-holdings",
            post(upload::upload_holdings),
        )
        .route(
            "/api/portfolios/:portfolio_id/process-holdings",
            post(upload::process_holdings),
        )
        // Email recaps
        .route(
            "/api/portfolios/:portfolio_id/recaps",
            get(recaps::list).post(recaps::create),
        )
        .route(
            "/api/portfolios/:portfolio_id/recaps/latest",
            get(recaps::latest),
        )
        .route(
            "/api/portfolios/:portfolio_id/recaps/generate",
            post(recaps::generate),
        )
        .route_layer(axum_middleware::from_fn(
            middleware::auth::jwt_auth_middleware,
        ))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Scout Portfolio API",
        "version": version,
        "endpoints": {
            "home": "/ (public)",
            "health": "/health (public)",
            "auth": "/api/auth/register, /api/auth/login, /api/auth/refresh (public - token acquisition)",
            "me": "/api/auth/me (protected)",
            "portfolios": "/api/portfolios[/:portfolio_id] (protected)",
            "holdings": "/api/portfolios/:portfolio_id/holdings[/:holding_id] (protected)",
            "upload": "/api/portfolios/:portfolio_id/upload-holdings (protected)",
            "process": "/api/portfolios/:portfolio_id/process-holdings (protected)",
            "recaps": "/api/portfolios/:portfolio_id/recaps[/latest|/generate] (protected)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::health_check().await {
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
