//! Behaviour of the user factories through the public service API.

use accounts::domain::ports::UserRepository;
use accounts::domain::{EmailAddress, ErrorCode, NewUserFields};
use rstest::rstest;
use serde_json::json;

mod support;

use support::memory_accounts;

#[rstest]
#[tokio::test]
async fn create_user_with_email_stores_hashed_password() {
    let (service, users) = memory_accounts();

    let user = service
        .create_user(
            Some("test@londonappdev.com"),
            Some("Testpass123"),
            NewUserFields::default(),
        )
        .await
        .expect("user created");

    assert_eq!(user.email().as_ref(), "test@londonappdev.com");
    assert!(user.check_password("Testpass123"));
    assert!(!user.check_password("testpass123"));
    assert_ne!(user.password_hash().as_stored(), "Testpass123");
    assert!(user.is_active());
    assert!(!user.is_staff());
    assert_eq!(users.len().await, 1);
}

#[rstest]
#[case("test@LONDONAPPDEV.COM", "test@londonappdev.com")]
#[case("MixedCase@Example.Org", "MixedCase@example.org")]
#[case("  padded@EXAMPLE.com  ", "padded@example.com")]
#[tokio::test]
async fn new_user_email_domain_is_normalised(#[case] raw: &str, #[case] stored: &str) {
    let (service, users) = memory_accounts();

    let user = service
        .create_user(Some(raw), Some("test123"), NewUserFields::default())
        .await
        .expect("user created");

    assert_eq!(user.email().as_ref(), stored);
    let found = users
        .find_by_email(&EmailAddress::new(stored).expect("valid email"))
        .await
        .expect("lookup succeeds");
    assert_eq!(found.map(|u| *u.id()), Some(*user.id()));
}

#[rstest]
#[case(None)]
#[case(Some(""))]
#[case(Some("   "))]
#[tokio::test]
async fn new_user_without_email_is_rejected(#[case] email: Option<&str>) {
    let (service, users) = memory_accounts();

    let err = service
        .create_user(email, Some("test123"), NewUserFields::default())
        .await
        .expect_err("email is mandatory");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details(),
        Some(&json!({ "field": "email", "code": "required" }))
    );
    assert!(users.is_empty().await);
}

#[rstest]
#[tokio::test]
async fn create_superuser_grants_staff_and_superuser() {
    let (service, _) = memory_accounts();

    let user = service
        .create_superuser(Some("test@londonappdev.com"), Some("test123"))
        .await
        .expect("superuser created");

    assert!(user.is_superuser());
    assert!(user.is_staff());
    assert!(user.is_active());
}

#[rstest]
#[tokio::test]
async fn duplicate_email_creates_no_second_record() {
    let (service, users) = memory_accounts();
    service
        .create_user(Some("dup@example.com"), Some("test123"), NewUserFields::default())
        .await
        .expect("first user created");

    let err = service
        .create_user(Some("dup@EXAMPLE.com"), Some("other12"), NewUserFields::default())
        .await
        .expect_err("email already taken");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details(),
        Some(&json!({ "field": "email", "code": "unique" }))
    );
    assert_eq!(users.len().await, 1);
}

#[rstest]
#[tokio::test]
async fn user_without_password_cannot_log_in() {
    let (service, _) = memory_accounts();

    let user = service
        .create_user(Some("nopass@example.com"), None, NewUserFields::default())
        .await
        .expect("user created");

    assert!(!user.password_hash().is_usable());
    assert!(!user.check_password(""));
    assert!(!user.check_password(user.password_hash().as_stored()));
}

#[rstest]
#[tokio::test]
async fn email_that_grows_when_lower_cased_is_rejected_before_storage() {
    let (service, users) = memory_accounts();
    let raw = format!("a@{}", "\u{130}".repeat(250));

    let err = service
        .create_user(Some(&raw), Some("test123"), NewUserFields::default())
        .await
        .expect_err("normalised email is too long");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details(),
        Some(&json!({ "field": "email", "code": "max_length" }))
    );
    assert!(users.is_empty().await);
}
