#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use mongodb::bson::oid::ObjectId;
use proverb_service::config::{CorsConfig, ProverbConfig, DEFAULT_CORS_ORIGIN};
use proverb_service::models::{Proverb, ProverbPatch};
use proverb_service::services::{InMemoryProverbRepository, MongoDb, ProverbRepository};
use proverb_service::startup::Application;
use proverb_service::{build_router, AppState};
use serde_json::Value;
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_ORIGIN: &str = DEFAULT_CORS_ORIGIN;

pub fn state_with(proverbs: Arc<dyn ProverbRepository>) -> AppState {
    AppState {
        proverbs,
        cors: CorsConfig {
            allowed_origin: TEST_ORIGIN.to_string(),
        },
    }
}

/// Router over a fresh in-memory store.
pub fn test_router() -> Router {
    build_router(state_with(Arc::new(InMemoryProverbRepository::new())))
        .expect("Failed to build router")
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to execute request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Response body is not JSON")
    };
    (status, body)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn create(app: &Router, body: Value) -> (StatusCode, Value) {
    send(app, json_request("POST", "/api/proverbs", &body)).await
}

pub async fn list(app: &Router) -> Vec<Value> {
    let (status, body) = send(app, empty_request("GET", "/api/proverbs")).await;
    assert_eq!(status, StatusCode::OK);
    body.as_array().expect("Expected array").clone()
}

pub async fn update(app: &Router, id: &str, body: Value) -> (StatusCode, Value) {
    send(app, json_request("PUT", &format!("/api/proverbs/{}", id), &body)).await
}

pub async fn delete(app: &Router, id: &str) -> (StatusCode, Value) {
    send(app, empty_request("DELETE", &format!("/api/proverbs/{}", id))).await
}

pub fn sample_proverb() -> Value {
    serde_json::json!({
        "originalText": "Mtoto umleavyo ndivyo akuavyo",
        "englishTranslation": "As you raise a child, so they grow",
        "language": "Swahili",
        "country": "Tanzania",
        "literalMeaning": "The child you raise is how it grows",
        "metaphoricalMeaning": "Upbringing shapes character",
        "usageScenarios": "Advice to new parents",
        "lifeLesson": "Invest in the young",
        "therapeuticValue": "Encourages reflection on one's own upbringing",
        "relevantSituations": ["parenting", "mentoring"],
        "moodCategory": "reflective",
        "successStories": "Quoted at family gatherings"
    })
}

/// Repository whose every operation fails as an unreachable database would.
pub struct FailingRepository;

fn unreachable_store() -> AppError {
    AppError::DatabaseError(anyhow::anyhow!("store unreachable"))
}

#[async_trait]
impl ProverbRepository for FailingRepository {
    async fn insert(&self, _proverb: Proverb) -> Result<Proverb, AppError> {
        Err(unreachable_store())
    }

    async fn find_all(&self) -> Result<Vec<Proverb>, AppError> {
        Err(unreachable_store())
    }

    async fn update(
        &self,
        _id: ObjectId,
        _patch: ProverbPatch,
    ) -> Result<Option<Proverb>, AppError> {
        Err(unreachable_store())
    }

    async fn delete(&self, _id: ObjectId) -> Result<Option<Proverb>, AppError> {
        Err(unreachable_store())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Err(unreachable_store())
    }
}

/// A running server backed by MongoDB at `MONGODB_URI`, on a throwaway database.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        if std::env::var("MONGODB_URI").is_err() {
            std::env::set_var("MONGODB_URI", "mongodb://localhost:27017");
        }
        std::env::set_var("PROVERB_STORE", "mongo");

        let db_name = format!("proverb_test_{}", Uuid::new_v4());

        let mut config = ProverbConfig::load().expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.mongodb.database = Some(db_name.clone());

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().cloned().expect("Mongo-backed application has a db");
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
        }
    }

    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}
