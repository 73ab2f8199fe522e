//! Account registration and profile management.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use storefront_core::domain::account::{NewAccount, UserPatch};
use storefront_core::{Role, ServiceError, UserId};
use storefront_testing::TestHarness;

fn new_account(name: &str, email: &str) -> NewAccount {
    NewAccount {
        name: name.to_string(),
        email: email.to_string(),
        phone: Some("555-0100".to_string()),
        password_hash: "hash".to_string(),
        role: Role::Customer,
    }
}

#[tokio::test]
async fn test_registration_normalizes_email_and_sends_welcome() {
    let harness = TestHarness::new();

    let user = harness
        .accounts()
        .create_account(new_account("Ada", "  Ada@Example.com "))
        .await
        .unwrap();

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.user_type, Role::Customer);

    let sent = harness.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "🎉 Welcome to Our App!");
    assert_eq!(sent[0].text, "Hi Ada, welcome aboard!");

    let account = harness
        .accounts()
        .find_account_by_email("ADA@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.user_id, user.id);
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let harness = TestHarness::new();
    let accounts = harness.accounts();
    accounts
        .create_account(new_account("Ada", "ada@example.com"))
        .await
        .unwrap();

    let err = accounts
        .create_account(new_account("Other Ada", "ADA@example.com"))
        .await
        .unwrap_err();

    assert_eq!(err, ServiceError::Conflict("Email already registered".to_string()));
}

#[tokio::test]
async fn test_invalid_registration_input() {
    let harness = TestHarness::new();
    let accounts = harness.accounts();

    assert!(matches!(
        accounts.create_account(new_account("Ada", "not-an-email")).await,
        Err(ServiceError::InvalidInput(_))
    ));
    assert!(matches!(
        accounts.create_account(new_account("   ", "a@b.io")).await,
        Err(ServiceError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn test_customer_listing_excludes_admins() {
    let harness = TestHarness::new();
    harness.seed_user("Root", Role::Admin).await;
    let ada = harness.seed_user("Ada", Role::Customer).await;

    let everyone = harness.accounts().list_users().await.unwrap();
    let customers = harness.accounts().list_customers().await.unwrap();

    assert_eq!(everyone.len(), 2);
    assert_eq!(customers, vec![ada]);
}

#[tokio::test]
async fn test_update_and_delete_user() {
    let harness = TestHarness::new();
    let ada = harness.seed_user("Ada", Role::Customer).await;
    let accounts = harness.accounts();

    let updated = accounts
        .update_user(
            ada.id,
            UserPatch {
                name: Some("Ada L.".to_string()),
                ..UserPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Ada L.");
    assert_eq!(updated.email, ada.email);

    accounts.delete_user(ada.id).await.unwrap();
    assert_eq!(
        accounts.get_user(ada.id).await.unwrap_err(),
        ServiceError::NotFound("User not found".to_string())
    );
    assert!(
        accounts
            .find_account_by_email(&ada.email)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_missing_user_operations() {
    let harness = TestHarness::new();
    let accounts = harness.accounts();
    let ghost = UserId::new();

    let not_found = ServiceError::NotFound("User not found".to_string());
    assert_eq!(accounts.get_user(ghost).await.unwrap_err(), not_found);
    assert_eq!(
        accounts
            .update_user(ghost, UserPatch::default())
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(accounts.delete_user(ghost).await.unwrap_err(), not_found);
}
