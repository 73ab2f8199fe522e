//! Registration and login against the in-memory store.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use std::sync::Arc;
use storefront_auth::{
    AuthError, AuthService, LoginRequest, PasswordHasher, RegisterRequest, TokenConfig,
    TokenService,
};
use storefront_core::{Role, ServiceError, SystemClock};
use storefront_testing::TestHarness;

fn auth(harness: &TestHarness) -> AuthService {
    AuthService::new(
        harness.accounts(),
        TokenService::new(&TokenConfig::new("test-secret")),
        PasswordHasher::new().with_cost(4 /* bcrypt minimum cost; `bcrypt::MIN_COST` is private */),
        Arc::new(SystemClock),
    )
}

fn register_request(email: &str, role: Option<Role>) -> RegisterRequest {
    RegisterRequest {
        name: "Ada".to_string(),
        email: email.to_string(),
        phone: None,
        password: "hunter2".to_string(),
        user_type: role,
    }
}

#[tokio::test]
async fn test_register_then_login() {
    let harness = TestHarness::new();
    let auth = auth(&harness);

    let user = auth
        .register(register_request("ada@example.com", None))
        .await
        .unwrap();
    assert_eq!(user.user_type, Role::Customer);

    let response = auth
        .login(LoginRequest {
            email: "ADA@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(response.message, "Login successful");
    assert_eq!(response.user_type, Role::Customer);
    let actor = auth.authenticate(&response.token).unwrap();
    assert_eq!(actor.user_id, user.id);
    assert_eq!(actor.role, Role::Customer);
}

#[tokio::test]
async fn test_stored_hash_is_not_the_password() {
    let harness = TestHarness::new();
    auth(&harness)
        .register(register_request("ada@example.com", Some(Role::Admin)))
        .await
        .unwrap();

    let account = harness
        .accounts()
        .find_account_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();

    assert!(account.password_hash.starts_with("$2"));
    assert_eq!(account.role, Role::Admin);
}

#[tokio::test]
async fn test_login_failures() {
    let harness = TestHarness::new();
    let auth = auth(&harness);
    auth.register(register_request("ada@example.com", None))
        .await
        .unwrap();

    let unknown = auth
        .login(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "hunter2".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(
        unknown,
        AuthError::Service(ServiceError::NotFound("User not found".to_string()))
    );

    let wrong = auth
        .login(LoginRequest {
            email: "ada@example.com".to_string(),
            password: "letmein".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(wrong, AuthError::InvalidCredentials);
    assert_eq!(wrong.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn test_register_rejects_empty_password_and_duplicates() {
    let harness = TestHarness::new();
    let auth = auth(&harness);

    let mut empty = register_request("ada@example.com", None);
    empty.password.clear();
    assert!(matches!(
        auth.register(empty).await,
        Err(AuthError::Service(ServiceError::InvalidInput(_)))
    ));

    auth.register(register_request("ada@example.com", None))
        .await
        .unwrap();
    assert_eq!(
        auth.register(register_request("ada@example.com", None))
            .await
            .unwrap_err(),
        AuthError::Service(ServiceError::Conflict("Email already registered".to_string()))
    );
}

#[test]
fn test_register_request_defaults() {
    let request: RegisterRequest = serde_json::from_str(
        r#"{"name":"Ada","email":"ada@example.com","password":"pw","userType":"admin"}"#,
    )
    .unwrap();
    assert_eq!(request.user_type, Some(Role::Admin));
    assert!(request.phone.is_none());
}
