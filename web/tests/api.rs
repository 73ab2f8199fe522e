//! HTTP tests against the full router over the in-memory store.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use std::sync::Arc;
use storefront_auth::{AuthService, PasswordHasher, TokenConfig, TokenService};
use storefront_core::domain::account::UserView;
use storefront_core::{Clock, Role, SystemClock};
use storefront_testing::TestHarness;
use storefront_web::{AppState, CORRELATION_ID_HEADER, router};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

struct TestApp {
    harness: TestHarness,
    router: Router,
    tokens: TokenService,
}

impl TestApp {
    fn new() -> Self {
        let harness = TestHarness::new();
        let tokens = TokenService::new(&TokenConfig::new(SECRET));
        let auth = AuthService::new(
            harness.accounts(),
            tokens.clone(),
            PasswordHasher::new().with_cost(4),
            Arc::new(SystemClock),
        );
        let router = router(AppState::new(&harness.env, auth));
        Self {
            harness,
            router,
            tokens,
        }
    }

    /// Seed a user and mint a token for them.
    async fn user(&self, name: &str, role: Role) -> (UserView, String) {
        let user = self.harness.seed_user(name, role).await;
        let account = self
            .harness
            .accounts()
            .find_account_by_email(&user.email)
            .await
            .unwrap()
            .expect("account exists");
        let token = self.tokens.issue(&account, SystemClock.now()).unwrap();
        (user, token)
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

#[tokio::test]
async fn test_health_and_correlation_header() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(CORRELATION_ID_HEADER));

    let (status, body) = app.send(Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_register_then_login() {
    let app = TestApp::new();

    let (status, user) = app
        .send(
            Method::POST,
            "/api/users/create-user",
            None,
            Some(json!({
                "name": "Ada",
                "email": "Ada@Example.com",
                "password": "hunter2"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["email"], "ada@example.com");
    assert_eq!(user["userType"], "customer");

    let (status, login) = app
        .send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "hunter2"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["message"], "Login successful");
    let token = login["token"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(Method::GET, "/api/users/view-customers", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid credentials");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/users/login",
            None,
            Some(json!({"email": "nobody@example.com", "password": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_auth_failures() {
    let app = TestApp::new();
    let (_, customer) = app.user("Bob", Role::Customer).await;

    let (status, body) = app.send(Method::GET, "/api/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Access token missing");

    let (status, body) = app
        .send(Method::GET, "/api/products", Some("not.a.token"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Invalid or expired token");

    let (status, body) = app
        .send(Method::GET, "/api/users/view-users", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden: insufficient permissions");
}

#[tokio::test]
async fn test_order_placement_over_http() {
    let app = TestApp::new();
    let (_, admin) = app.user("Root", Role::Admin).await;
    let (buyer, customer) = app.user("Carol", Role::Customer).await;

    let (status, product) = app
        .send(
            Method::POST,
            "/api/products/create-product",
            Some(&admin),
            Some(json!({
                "productName": "Lamp",
                "modelNumber": "LMP-1",
                "quantity": 5,
                "price": 1999
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let product_id = product["id"].as_str().unwrap().to_string();

    let order = json!({"products": [{"product": product_id, "quantity": 3}]});
    let (status, placed) = app
        .send(Method::POST, "/api/orders/place-order", Some(&customer), Some(order.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["status"], "pending");
    assert_eq!(placed["user"], buyer.id.to_string());

    let (status, body) = app
        .send(Method::POST, "/api/orders/place-order", Some(&customer), Some(order))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INSUFFICIENT_STOCK");
    assert_eq!(body["message"], "Not enough stock for Lamp");
    assert_eq!(body["products"], json!([product_id]));

    let (status, view) = app
        .send(Method::GET, &format!("/api/products/{product_id}"), Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["quantity"], 2);
}

#[tokio::test]
async fn test_customer_cannot_order_for_someone_else() {
    let app = TestApp::new();
    let (mallory, token) = app.user("Mallory", Role::Customer).await;
    let (victim, _) = app.user("Victor", Role::Customer).await;
    let lamp = app.harness.seed_product("Lamp", 5, 1_000).await;

    let (status, placed) = app
        .send(
            Method::POST,
            "/api/orders/place-order",
            Some(&token),
            Some(json!({
                "user": victim.id,
                "products": [{"product": lamp.id, "quantity": 1}]
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(placed["user"], mallory.id.to_string());
}

#[tokio::test]
async fn test_cart_is_self_or_admin() {
    let app = TestApp::new();
    let (alice, alice_token) = app.user("Alice", Role::Customer).await;
    let (_, bob_token) = app.user("Bob", Role::Customer).await;
    let (_, admin) = app.user("Root", Role::Admin).await;
    let lamp = app.harness.seed_product("Lamp", 5, 1_000).await;
    let cart_uri = format!("/api/cart/{}", alice.id);

    let (status, cart) = app
        .send(
            Method::POST,
            &cart_uri,
            Some(&alice_token),
            Some(json!({"productId": lamp.id, "quantity": 2})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["quantity"], 2);

    let (status, _) = app.send(Method::GET, &cart_uri, Some(&bob_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send(Method::GET, &cart_uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.send(Method::DELETE, &cart_uri, Some(&alice_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart cleared");
    assert_eq!(app.harness.stock_of(lamp.id).await, 5);
}

#[tokio::test]
async fn test_rating_requires_purchase() {
    let app = TestApp::new();
    let (buyer, token) = app.user("Dana", Role::Customer).await;
    let lamp = app.harness.seed_product("Lamp", 5, 1_000).await;
    let rating = json!({"rating": 5, "product": lamp.id});

    let (status, body) = app
        .send(Method::POST, "/api/ratings", Some(&token), Some(rating.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You must purchase this product before rating");

    app.harness.complete_purchase(buyer.id, lamp.id, 1).await;

    let (status, _) = app
        .send(Method::POST, "/api/ratings", Some(&token), Some(rating))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, ratings) = app
        .send(
            Method::GET,
            &format!("/api/ratings/product/{}", lamp.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ratings.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_sidebar_filters_by_role() {
    let app = TestApp::new();
    let (_, admin) = app.user("Root", Role::Admin).await;
    let (_, customer) = app.user("Eve", Role::Customer).await;

    for (title, roles) in [
        ("Dashboard", json!(["admin", "customer"])),
        ("Inventory", json!(["admin"])),
    ] {
        let (status, _) = app
            .send(
                Method::POST,
                "/api/sidebar",
                Some(&admin),
                Some(json!({"title": title, "icon": "box", "route": "/x", "roles": roles})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, menus) = app.send(Method::GET, "/api/sidebar", Some(&customer), None).await;
    let titles: Vec<&str> = menus
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["Dashboard"]);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/sidebar",
            Some(&customer),
            Some(json!({"title": "Hack", "icon": "x", "route": "/y"})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_notification_owner_checks() {
    let app = TestApp::new();
    let (admin_user, admin) = app.user("Root", Role::Admin).await;
    let (buyer, buyer_token) = app.user("Finn", Role::Customer).await;
    let lamp = app.harness.seed_product("Lamp", 5, 1_000).await;

    app.harness.complete_purchase(buyer.id, lamp.id, 1).await;

    let (status, admin_notes) = app
        .send(
            Method::GET,
            &format!("/api/notifications/{}", admin_user.id),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let note_id = admin_notes[0]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .send(
            Method::PATCH,
            &format!("/api/notifications/{note_id}/mark-read"),
            Some(&buyer_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, note) = app
        .send(
            Method::PATCH,
            &format!("/api/notifications/{note_id}/mark-read"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(note["read"], true);

    let (status, body) = app
        .send(
            Method::DELETE,
            &format!("/api/notifications/{note_id}"),
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Notification deleted successfully");
}
