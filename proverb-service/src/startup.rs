use crate::config::{CorsConfig, ProverbConfig, StoreBackend};
use crate::handlers;
use crate::services::{InMemoryProverbRepository, MongoDb, MongoProverbRepository, ProverbRepository};
use axum::{
    middleware::from_fn,
    routing::{get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    cors::single_origin_cors, metrics::metrics_middleware,
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared by every handler. The repository is the single store handle opened
/// at startup.
#[derive(Clone)]
pub struct AppState {
    pub proverbs: Arc<dyn ProverbRepository>,
    pub cors: CorsConfig,
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    let cors = single_origin_cors(&state.cors.allowed_origin)?;

    let app = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route(
            "/api/proverbs",
            post(handlers::create_proverb).get(handlers::list_proverbs),
        )
        .route(
            "/api/proverbs/:id",
            put(handlers::update_proverb).delete(handlers::delete_proverb),
        )
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors);

    Ok(app)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    db: Option<MongoDb>,
}

impl Application {
    pub async fn build(config: ProverbConfig) -> Result<Self, AppError> {
        let (proverbs, db): (Arc<dyn ProverbRepository>, Option<MongoDb>) = match config.store {
            StoreBackend::Mongo => {
                let db = MongoDb::connect(&config.mongodb.uri, config.mongodb.database.as_deref())
                    .await
                    .map_err(|e| {
                        tracing::error!("Failed to connect to MongoDB: {}", e);
                        e
                    })?;
                let repo: Arc<dyn ProverbRepository> =
                    Arc::new(MongoProverbRepository::new(db.clone()));
                (repo, Some(db))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory proverb store; records are lost on exit");
                let repo: Arc<dyn ProverbRepository> = Arc::new(InMemoryProverbRepository::new());
                (repo, None)
            }
        };

        Self::build_with_repository(config, proverbs, db).await
    }

    /// Builds the server around an already constructed repository.
    pub async fn build_with_repository(
        config: ProverbConfig,
        proverbs: Arc<dyn ProverbRepository>,
        db: Option<MongoDb>,
    ) -> Result<Self, AppError> {
        let state = AppState {
            proverbs,
            cors: config.cors.clone(),
        };
        let app = build_router(state)?;

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Server is running on port {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            db,
        })
    }

    pub fn db(&self) -> Option<&MongoDb> {
        self.db.as_ref()
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let result = self.server.await;

        if let Some(db) = self.db {
            tracing::info!("Server stopped; closing store connection");
            db.shutdown().await;
        }

        result
    }
}
