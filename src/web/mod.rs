pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod ui;

use crate::{models::ModelManager, utils::error::AgriError, Config, Result};
use axum::{
    extract::{DefaultBodyLimit, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer};

/// 处理器共享状态
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub models: Arc<ModelManager>,
}

impl AppState {
    pub fn new(config: Config, models: ModelManager) -> Self {
        Self {
            config,
            models: Arc::new(models),
        }
    }
}

pub async fn serve(config: Config) -> Result<()> {
    // 启动时加载全部模型，失败则直接退出
    let models = ModelManager::load(config.clone())?;
    let state = AppState::new(config.clone(), models);

    let app = create_app(state);

    let addr: SocketAddr = config.bind_addr.parse().map_err(|e| {
        AgriError::Config(format!("Invalid bind address {}: {}", config.bind_addr, e))
    })?;

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("API endpoints:");
    tracing::info!("  GET  /                    - Web UI");
    tracing::info!("  GET  /api/options         - Form options");
    tracing::info!("  POST /api/disease         - JSON base64 upload");
    tracing::info!("  POST /api/disease/upload  - Multipart file upload");
    tracing::info!("  POST /api/yield           - Crop yield prediction");
    tracing::info!("  POST /api/feedback        - Feedback");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /api/info            - Service information");

    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        AgriError::Internal(format!("Failed to bind to address {}: {}", addr, e))
    })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AgriError::Internal(format!("Server failed to start: {}", e)))?;

    Ok(())
}

pub fn create_app(state: AppState) -> Router {
    let server_config = &state.config.server_config;
    let max_request_size = server_config.max_request_size;
    let request_timeout = Duration::from_secs(server_config.request_timeout);

    Router::new()
        // 预测API路由
        .route("/api/disease", post(handlers::disease_json_handler))
        .route("/api/disease/upload", post(handlers::disease_upload_handler))
        .route("/api/yield", post(handlers::yield_handler))
        .route("/api/feedback", post(handlers::feedback_handler))
        .route("/api/options", get(handlers::options_handler))
        // Web UI路由
        .route("/", get(ui::index_handler))
        // 系统路由
        .route("/health", get(health_handler))
        .route("/api/info", get(info_handler))
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_logging))
        .layer(DefaultBodyLimit::max(max_request_size))
        .layer(RequestBodyLimitLayer::new(max_request_size))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(axum::middleware::from_fn(middleware::json_errors))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 健康检查端点
async fn health_handler(State(state): State<AppState>) -> Result<Json<serde_json::Value>> {
    state.models.health_check()?;

    Ok(Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    })))
}

/// 服务信息端点
async fn info_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.models.get_stats();

    Json(json!({
        "service": "Smart Agri",
        "version": env!("CARGO_PKG_VERSION"),
        "description": env!("CARGO_PKG_DESCRIPTION"),
        "dev_mode": state.config.dev_mode,
        "models": stats,
        "features": {
            "disease_detection": true,
            "yield_prediction": true,
            "upload_formats": ["jpeg"],
        }
    }))
}
