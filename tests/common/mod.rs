use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use coffeeshop::modules::drinks::{DrinkRepository, InMemoryDrinkRepository};
use coffeeshop::router::init_router;
use coffeeshop::state::AppState;
use coffeeshop_auth::testing::{CountingKeySource, test_authorizer};
use coffeeshop_config::CorsConfig;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub drinks: Arc<InMemoryDrinkRepository>,
    pub keys: Arc<CountingKeySource>,
}

impl TestApp {
    #[allow(dead_code)]
    pub async fn drinks_len(&self) -> usize {
        self.drinks.all().await.unwrap().len()
    }
}

/// App backed by the in-memory store seeded with `water` (id 1) and signing keys
/// that verify tokens minted by `coffeeshop_auth::testing`.
pub fn setup_test_app() -> TestApp {
    let (authorizer, keys) = test_authorizer();
    let drinks = Arc::new(InMemoryDrinkRepository::with_seed());
    let state = AppState::new(drinks.clone(), authorizer, CorsConfig::default());

    TestApp {
        router: init_router(state),
        drinks,
        keys,
    }
}

/// Sends one request and returns the status and JSON body (`Value::Null` when empty).
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    authorization: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);

    if let Some(authorization) = authorization {
        request = request.header("authorization", authorization);
    }

    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

#[allow(dead_code)]
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
