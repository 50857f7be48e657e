//! Registration and login over the in-memory store.

use chrono::{Duration, Utc};
use notekeeper_db::test_fixtures::{test_codec, TestServices, TEST_PASSWORD};
use notekeeper_db::{Error, Identity};

#[tokio::test]
async fn test_register_stores_hash_not_password() {
    let services = TestServices::in_memory();
    let user = services
        .accounts
        .register("  alice@example.com ", TEST_PASSWORD)
        .await
        .unwrap();

    assert_eq!(user.email, "alice@example.com");
    assert_ne!(user.password_hash, TEST_PASSWORD);
    assert!(user.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let services = TestServices::in_memory();
    services.register("alice@example.com").await;

    let dup = services
        .accounts
        .register("alice@example.com", "another-password")
        .await
        .unwrap_err();
    assert!(matches!(dup, Error::DuplicateUser(_)));

    let bad_email = services.accounts.register("not-an-email", "pw").await.unwrap_err();
    assert!(matches!(bad_email, Error::InvalidInput(_)));

    let blank = services
        .accounts
        .register("bob@example.com", "   ")
        .await
        .unwrap_err();
    assert!(matches!(blank, Error::InvalidInput(_)));
}

#[tokio::test]
async fn test_login_issues_token_for_identity() {
    let services = TestServices::in_memory();
    let alice = services.register("alice@example.com").await;
    let now = Utc::now();

    let token = services
        .accounts
        .login("alice@example.com", TEST_PASSWORD, now)
        .await
        .unwrap();

    let codec = test_codec();
    assert_eq!(codec.extract_subject(&token).unwrap(), alice);
    assert!(codec.is_valid(&token, &alice, now).unwrap());
    assert!(!codec.is_valid(&token, &alice, now + Duration::hours(2)).unwrap());
}

#[tokio::test]
async fn test_login_failures() {
    let services = TestServices::in_memory();
    services.register("alice@example.com").await;

    let wrong = services
        .accounts
        .login("alice@example.com", "wrong password", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(wrong, Error::InvalidCredentials));

    let unknown = services
        .accounts
        .login("nobody@example.com", TEST_PASSWORD, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(unknown, Error::UserNotFound(_)));
}

#[tokio::test]
async fn test_check_credentials() {
    let services = TestServices::in_memory();
    services.register("alice@example.com").await;

    assert!(services
        .accounts
        .check_credentials("alice@example.com", TEST_PASSWORD)
        .await
        .unwrap());
    assert!(!services
        .accounts
        .check_credentials("alice@example.com", "nope")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_get_user_by_email() {
    let services = TestServices::in_memory();
    let alice = services.register("alice@example.com").await;

    let user = services
        .accounts
        .get_user_by_email("alice@example.com")
        .await
        .unwrap();
    assert_eq!(user.identity(), alice);

    let missing = Identity::parse_email("carol@example.com").unwrap();
    let err = services
        .accounts
        .get_user_by_email(missing.as_str())
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
