mod common;

use axum::http::StatusCode;
use coffeeshop_auth::permissions::{DRINKS_CREATE, DRINKS_DETAIL};
use coffeeshop_auth::testing::{
    claims_json, sign, sign_with_kid, test_authorizer, token_with_permissions,
};
use common::{bearer, send, setup_test_app};
use serde_json::json;

async fn detail_with(authorization: &str) -> (StatusCode, serde_json::Value) {
    let app = setup_test_app();
    send(&app.router, "GET", "/drinks-detail", Some(authorization), None).await
}

#[tokio::test]
async fn test_malformed_headers() {
    for header in ["Bearer", "Basic abc", "Bearer a b", "bearer abc", "Bearer "] {
        let (status, body) = detail_with(header).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED, "header {:?}", header);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
    }
}

#[tokio::test]
async fn test_garbage_token() {
    let (status, body) = detail_with("Bearer not.a.token").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unable to parse authentication token.");
}

#[tokio::test]
async fn test_expired_token() {
    let token = sign(&claims_json(Some(&[DRINKS_DETAIL]), -60));

    let (status, body) = detail_with(&bearer(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired.");
}

#[tokio::test]
async fn test_token_without_permissions_claim() {
    let token = sign(&claims_json(None, 3600));

    let (status, body) = detail_with(&bearer(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Permissions not included in JWT.");
}

#[tokio::test]
async fn test_wrong_audience() {
    let mut claims = claims_json(Some(&[DRINKS_DETAIL]), 3600);
    claims["aud"] = json!("another-api");

    let (status, body) = detail_with(&bearer(&sign(&claims))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Incorrect claims. Please, check the audience and issuer."
    );
}

#[tokio::test]
async fn test_unknown_key_id() {
    let token = sign_with_kid(&claims_json(Some(&[DRINKS_DETAIL]), 3600), Some("rotated"));

    let (status, body) = detail_with(&bearer(&token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Unable to find the appropriate key.");
}

#[tokio::test]
async fn test_missing_permission_is_forbidden() {
    let token = token_with_permissions(&[DRINKS_CREATE]);

    let (status, body) = detail_with(&bearer(&token)).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], 403);
}

#[tokio::test]
async fn test_signing_key_fetched_once_across_requests() {
    let app = setup_test_app();
    let token = bearer(&token_with_permissions(&[DRINKS_DETAIL]));

    for _ in 0..3 {
        let (status, _) = send(&app.router, "GET", "/drinks-detail", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(app.keys.fetch_count(), 1);
}

#[tokio::test]
async fn test_claims_pass_through_unchanged() {
    let (authorizer, _) = test_authorizer();
    let token = sign(&claims_json(Some(&[DRINKS_CREATE, DRINKS_DETAIL]), 3600));
    let mut headers = axum::http::HeaderMap::new();
    headers.insert("authorization", bearer(&token).parse().unwrap());

    let first = authorizer.authorize(&headers, DRINKS_DETAIL).await.unwrap();
    let second = authorizer.authorize(&headers, DRINKS_DETAIL).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        first.permissions,
        Some(vec![DRINKS_CREATE.to_string(), DRINKS_DETAIL.to_string()])
    );
    assert_eq!(first.extra["azp"], "coffeeshop-frontend");
}
