//! SQL 查询网关
//!
//! 无状态 HTTP 网关：
//! - 每个请求独立建立数据库连接
//! - 原样执行请求中的 SQL 语句
//! - 以 JSON 返回行数据与列信息，失败统一返回 400

mod drivers;
mod handlers;
mod routes;
mod service;
mod state;

use std::any::Any;

use anyhow::Context;
use axum::{middleware, response::IntoResponse, response::Response, Router};
use common::config::{AppConfig, LogFormat};
use common::errors::AppError;
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "query-gateway";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 中的变量不会覆盖已有环境变量
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME);

    // 初始化日志追踪，再补记加载配置时的警告
    init_tracing(config.log_format);
    if dotenv_loaded {
        info!("已加载 .env 文件");
    }
    log_config_warnings(&config);

    // 创建应用状态
    let state = AppState::new(config.clone());

    // 创建路由
    let app = create_router(state);

    // 启动服务
    let addr = config.bind_address();
    info!(
        service = SERVICE_NAME,
        address = %addr,
        statement_timeout_secs = config.statement_timeout.map(|d| d.as_secs()),
        "启动服务"
    );

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("服务运行失败")?;

    info!(service = SERVICE_NAME, "服务已停止");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .init();
}

fn log_config_warnings(config: &AppConfig) -> usize {
    for warning in &config.warnings {
        warn!(service = %config.service_name, "{}", warning);
    }
    config.warnings.len()
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turns a handler panic into the regular error response.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    AppError::Internal(detail).into_response()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", err);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                error!("failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("收到停止信号，等待进行中的请求结束");
}
