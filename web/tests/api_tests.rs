//! End-to-end HTTP tests over in-memory stores.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect
#![allow(clippy::panic)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use natours_core::types::{Role, UserId};
use natours_testing::{test_clock, InMemoryReviewStore, InMemoryTourStore};
use natours_web::{router, AppState, Claims, JwtVerifier};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

const SECRET: &[u8] = b"api-test-secret";

struct TestApp {
    router: Router,
    tours: InMemoryTourStore,
}

impl TestApp {
    fn new() -> Self {
        let reviews = InMemoryReviewStore::new();
        let tours = InMemoryTourStore::new();
        let state = AppState::new(reviews, tours.clone(), test_clock(), JwtVerifier::new(SECRET));
        Self {
            router: router(state),
            tours,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn create_tour(&self, name: &str, price: f64) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/tours",
                Some(&token(Role::LeadGuide)),
                Some(tour_body(name, price)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    /// Poll until the background recomputation has caught up.
    async fn wait_for_quantity(&self, tour_id: &str, quantity: u64) -> Value {
        for _ in 0..100 {
            let (_, body) = self
                .send(Method::GET, &format!("/api/v1/tours/{tour_id}"), None, None)
                .await;
            if body["data"]["ratingsQuantity"] == quantity {
                return body["data"].clone();
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("ratings of tour {tour_id} never reached {quantity}");
    }
}

fn token_for(user: UserId, role: Role) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user,
        role,
        exp: now + 3600,
        iat: now,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap()
}

fn token(role: Role) -> String {
    token_for(UserId::new(), role)
}

fn tour_body(name: &str, price: f64) -> Value {
    json!({
        "name": name,
        "duration": 7,
        "maxGroupSize": 15,
        "difficulty": "medium",
        "price": price,
        "summary": "Exploring the jaw-dropping US east coast by foot and by boat",
        "startDates": ["2026-06-19T09:00:00Z", "2026-07-20T09:00:00Z"]
    })
}

fn review_body(rating: u8) -> Value {
    json!({ "review": "Amazing tour, would go again", "rating": rating })
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let (status, _) = app.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");

    app.tours.outage().trip();
    let (status, body) = app.send(Method::GET, "/health/ready", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn test_create_tour_requires_manager() {
    let app = TestApp::new();
    let body = tour_body("The Sea Explorer", 497.0);

    let (status, _) = app
        .send(Method::POST, "/api/v1/tours", None, Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(Method::POST, "/api/v1/tours", Some(&token(Role::User)), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, created) = app
        .send(Method::POST, "/api/v1/tours", Some(&token(Role::Admin)), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "success");
    assert_eq!(created["data"]["slug"], "the-sea-explorer");
    assert_eq!(created["data"]["ratingsAverage"], 4.5);
    assert_eq!(created["data"]["ratingsQuantity"], 0);
    assert_eq!(created["data"]["durationWeeks"], 1.0);
}

#[tokio::test]
async fn test_invalid_tour_is_unprocessable() {
    let app = TestApp::new();
    let mut body = tour_body("Short", 497.0);
    body["priceDiscount"] = json!(600.0);

    let (status, error) = app
        .send(Method::POST, "/api/v1/tours", Some(&token(Role::Admin)), Some(body))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_review_lifecycle_keeps_ratings_consistent() {
    let app = TestApp::new();
    let tour = app.create_tour("The Forest Hiker", 397.0).await;
    let author = UserId::new();
    let author_token = token_for(author, Role::User);

    let (status, created) = app
        .send(
            Method::POST,
            &format!("/api/v1/tours/{tour}/reviews"),
            Some(&author_token),
            Some(review_body(5)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["data"]["user"], author.to_string());
    assert_eq!(created["data"]["tour"], tour);
    let five = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::POST,
            &format!("/api/v1/tours/{tour}/reviews"),
            Some(&token(Role::User)),
            Some(review_body(3)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let ratings = app.wait_for_quantity(&tour, 2).await;
    assert_eq!(ratings["ratingsAverage"], 4.0);

    // Update and delete recompute before answering.
    let (status, updated) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/reviews/{five}"),
            Some(&author_token),
            Some(json!({ "rating": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["rating"], 1);

    let (_, fetched) = app
        .send(Method::GET, &format!("/api/v1/tours/{tour}"), None, None)
        .await;
    assert_eq!(fetched["data"]["ratingsAverage"], 2.0);

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/reviews/{five}"),
            Some(&author_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = app
        .send(Method::GET, &format!("/api/v1/tours/{tour}"), None, None)
        .await;
    assert_eq!(fetched["data"]["ratingsQuantity"], 1);
    assert_eq!(fetched["data"]["ratingsAverage"], 3.0);

    let (_, listed) = app
        .send(Method::GET, &format!("/api/v1/tours/{tour}/reviews"), None, None)
        .await;
    assert_eq!(listed["results"], 1);
}

#[tokio::test]
async fn test_second_review_is_conflict() {
    let app = TestApp::new();
    let tour = app.create_tour("The Forest Hiker", 397.0).await;
    let author_token = token(Role::User);
    let uri = format!("/api/v1/tours/{tour}/reviews");

    let (status, _) = app
        .send(Method::POST, &uri, Some(&author_token), Some(review_body(4)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    app.wait_for_quantity(&tour, 1).await;

    let (status, error) = app
        .send(Method::POST, &uri, Some(&author_token), Some(review_body(1)))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "DUPLICATE_REVIEW");

    let ratings = app.wait_for_quantity(&tour, 1).await;
    assert_eq!(ratings["ratingsAverage"], 4.0);
}

#[tokio::test]
async fn test_review_rules() {
    let app = TestApp::new();
    let tour = app.create_tour("The Forest Hiker", 397.0).await;
    let uri = format!("/api/v1/tours/{tour}/reviews");

    let (status, _) = app
        .send(Method::POST, &uri, Some(&token(Role::Admin)), Some(review_body(4)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(Method::POST, &uri, Some(&token(Role::User)), Some(review_body(6)))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let missing_tour = format!("/api/v1/tours/{}/reviews", UserId::new());
    let (status, _) = app
        .send(Method::POST, &missing_tour, Some(&token(Role::User)), Some(review_body(4)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, created) = app
        .send(Method::POST, &uri, Some(&token(Role::User)), Some(review_body(4)))
        .await;
    let id = created["data"]["id"].as_str().unwrap();

    let (status, _) = app
        .send(
            Method::DELETE,
            &format!("/api/v1/reviews/{id}"),
            Some(&token(Role::User)),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_tour_patch_cannot_set_ratings() {
    let app = TestApp::new();
    let tour = app.create_tour("The Forest Hiker", 397.0).await;

    let (status, updated) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/tours/{tour}"),
            Some(&token(Role::LeadGuide)),
            Some(json!({ "price": 420.0, "ratingsAverage": 1.0, "ratingsQuantity": 99 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["price"], 420.0);
    assert_eq!(updated["data"]["ratingsAverage"], 4.5);
    assert_eq!(updated["data"]["ratingsQuantity"], 0);
}

#[tokio::test]
async fn test_tour_by_slug() {
    let app = TestApp::new();
    let tour = app.create_tour("The Sea Explorer", 497.0).await;

    let (status, body) = app
        .send(Method::GET, "/api/v1/tours/slug/the-sea-explorer", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], tour.as_str());

    let (status, twin) = app
        .send(
            Method::POST,
            "/api/v1/tours",
            Some(&token(Role::Admin)),
            Some(tour_body("The Sea-Explorer!", 297.0)),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(twin["code"], "CONFLICT");

    let (status, _) = app
        .send(Method::GET, "/api/v1/tours/slug/the-snow-adventurer", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tour_listing_and_reports() {
    let app = TestApp::new();
    app.create_tour("The Forest Hiker", 397.0).await;
    app.create_tour("The Sea Explorer", 497.0).await;
    app.create_tour("The Snow Adventurer", 997.0).await;

    let (status, listed) = app
        .send(
            Method::GET,
            "/api/v1/tours?price%5Blte%5D=500&sort=-price",
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["results"], 2);
    assert_eq!(listed["data"][0]["name"], "The Sea Explorer");

    let (status, _) = app
        .send(Method::GET, "/api/v1/tours?sort=colour", None, None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, cheap) = app
        .send(Method::GET, "/api/v1/tours/top-5-cheap", None, None)
        .await;
    assert_eq!(cheap["data"][0]["name"], "The Forest Hiker");

    let (_, stats) = app
        .send(Method::GET, "/api/v1/tours/tour-stats", None, None)
        .await;
    assert_eq!(stats["data"][0]["difficulty"], "medium");
    assert_eq!(stats["data"][0]["numTours"], 3);

    let (status, _) = app
        .send(Method::GET, "/api/v1/tours/monthly-plan/2026", Some(&token(Role::User)), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, plan) = app
        .send(Method::GET, "/api/v1/tours/monthly-plan/2026", Some(&token(Role::Guide)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plan["results"], 2);
    assert_eq!(plan["data"][0]["numTourStarts"], 3);
}

#[tokio::test]
async fn test_bad_requests() {
    let app = TestApp::new();

    let (status, error) = app
        .send(Method::GET, "/api/v1/tours/not-a-uuid", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "BAD_REQUEST");

    let (status, error) = app.send(Method::GET, "/api/v1/nowhere", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "NOT_FOUND");

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/api/v1/reviews/{}", UserId::new()),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/v1/reviews/{}", UserId::new()),
            Some("garbage"),
            Some(json!({ "rating": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
