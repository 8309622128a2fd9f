//! End-to-end session semantics over in-memory stores: issuance,
//! logout, and the change-password invalidation watermark.

mod common;

use std::time::Duration;

use auth_service::error::AuthError;
use auth_service::middleware::authenticate_token;
use auth_service::models::PrincipalKind;

use common::{harness, harness_with, DownRevocationStore};

#[tokio::test]
async fn test_register_then_login_issue_matching_claims() {
    let h = harness(PrincipalKind::User);

    let registered = h
        .service
        .register("amira@example.com", "first-password", None, None)
        .await
        .unwrap();
    assert_eq!(registered.role, "client");
    assert_eq!(registered.expires_in, common::TEST_TTL);

    let claims = h.codec.parse(&registered.token).unwrap();
    assert_eq!(claims.principal_id().unwrap(), registered.principal_id);
    assert_eq!(claims.role, "client");

    let session = h
        .service
        .login("amira@example.com", "first-password")
        .await
        .unwrap();
    assert_eq!(session.principal_id, registered.principal_id);
    assert_eq!(session.email, "amira@example.com");
}

#[tokio::test]
async fn test_register_staff_role_for_user_kind() {
    let h = harness(PrincipalKind::User);

    let session = h
        .service
        .register("staff@example.com", "first-password", Some("staff"), None)
        .await
        .unwrap();
    assert_eq!(session.role, "staff");
}

#[tokio::test]
async fn test_register_rejects_foreign_role() {
    let h = harness(PrincipalKind::User);

    let err = h
        .service
        .register("sneaky@example.com", "first-password", Some("admin"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidInput(_)));
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let h = harness(PrincipalKind::Dealership);

    h.service
        .register("lot@example.com", "first-password", None, None)
        .await
        .unwrap();

    let err = h
        .service
        .register("lot@example.com", "other-password", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::AlreadyExists));
}

#[tokio::test]
async fn test_login_failures() {
    let h = harness(PrincipalKind::User);

    h.service
        .register("amira@example.com", "first-password", None, None)
        .await
        .unwrap();

    let err = h
        .service
        .login("nobody@example.com", "first-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::NotFound));

    let err = h
        .service
        .login("amira@example.com", "wrong-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_logout_revokes_exactly_once() {
    let h = harness(PrincipalKind::User);

    let session = h
        .service
        .register("amira@example.com", "first-password", None, None)
        .await
        .unwrap();

    authenticate_token(&h.codec, h.revocations.as_ref(), &session.token)
        .await
        .unwrap();

    h.service.logout(&session.token).await.unwrap();

    let err = authenticate_token(&h.codec, h.revocations.as_ref(), &session.token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated));

    let err = h.service.logout(&session.token).await.unwrap_err();
    assert!(matches!(err, AuthError::AlreadyRevoked));
}

#[tokio::test]
async fn test_logout_of_one_session_leaves_others_alive() {
    let h = harness(PrincipalKind::User);

    h.service
        .register("amira@example.com", "first-password", None, None)
        .await
        .unwrap();
    let a = h
        .service
        .login("amira@example.com", "first-password")
        .await
        .unwrap();
    // Different iat second means a distinct token value.
    tokio::time::sleep(Duration::from_millis(1100)).await;
    let b = h
        .service
        .login("amira@example.com", "first-password")
        .await
        .unwrap();
    assert_ne!(a.token, b.token);

    h.service.logout(&a.token).await.unwrap();

    assert!(authenticate_token(&h.codec, h.revocations.as_ref(), &a.token)
        .await
        .is_err());
    authenticate_token(&h.codec, h.revocations.as_ref(), &b.token)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_change_password_invalidates_all_prior_sessions() {
    let h = harness(PrincipalKind::User);

    let a = h
        .service
        .register("amira@example.com", "first-password", None, None)
        .await
        .unwrap();
    let b = h
        .service
        .login("amira@example.com", "first-password")
        .await
        .unwrap();

    // The prior tokens must be strictly older than the fresh one for
    // the whole-second watermark to separate them.
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let c = h
        .service
        .change_password(a.principal_id, "first-password", "second-password")
        .await
        .unwrap();

    for stale in [&a.token, &b.token] {
        let err = authenticate_token(&h.codec, h.revocations.as_ref(), stale)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    // The token handed back by the rotation itself stays valid.
    let context = authenticate_token(&h.codec, h.revocations.as_ref(), &c.token)
        .await
        .unwrap();
    assert_eq!(context.principal_id, a.principal_id);

    // Old password is dead, new one works and yields a live session.
    let err = h
        .service
        .login("amira@example.com", "first-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let d = h
        .service
        .login("amira@example.com", "second-password")
        .await
        .unwrap();
    authenticate_token(&h.codec, h.revocations.as_ref(), &d.token)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_change_password_with_wrong_current_revokes_nothing() {
    let h = harness(PrincipalKind::User);

    let session = h
        .service
        .register("amira@example.com", "first-password", None, None)
        .await
        .unwrap();

    let err = h
        .service
        .change_password(session.principal_id, "wrong-password", "second-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    // No watermark was written; the session is untouched.
    authenticate_token(&h.codec, h.revocations.as_ref(), &session.token)
        .await
        .unwrap();
    h.service
        .login("amira@example.com", "first-password")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_watermarks_are_scoped_per_principal() {
    let h = harness(PrincipalKind::User);

    let amira = h
        .service
        .register("amira@example.com", "first-password", None, None)
        .await
        .unwrap();
    let badr = h
        .service
        .register("badr@example.com", "first-password", None, None)
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1200)).await;

    h.service
        .change_password(amira.principal_id, "first-password", "second-password")
        .await
        .unwrap();

    assert!(authenticate_token(&h.codec, h.revocations.as_ref(), &amira.token)
        .await
        .is_err());
    authenticate_token(&h.codec, h.revocations.as_ref(), &badr.token)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_registered_profile_is_readable() {
    let h = harness(PrincipalKind::Dealership);

    let profile = serde_json::json!({
        "location": "1200 Auto Mall Dr",
        "phone": "+1-555-0134"
    });
    let session = h
        .service
        .register("lot@example.com", "first-password", None, Some(profile.clone()))
        .await
        .unwrap();

    let record = h.service.profile(session.principal_id).await.unwrap();
    assert_eq!(record.profile, Some(profile));

    let bare = h
        .service
        .register("bare@example.com", "first-password", None, None)
        .await
        .unwrap();
    let record = h.service.profile(bare.principal_id).await.unwrap();
    assert_eq!(record.profile, None);
}

#[tokio::test]
async fn test_change_password_issues_nothing_when_revocation_write_fails() {
    let h = harness_with(PrincipalKind::User, std::sync::Arc::new(DownRevocationStore));

    // Registration never touches the revocation store, so it succeeds
    // even with the backend down.
    let session = h
        .service
        .register("amira@example.com", "first-password", None, None)
        .await
        .unwrap();

    let err = h
        .service
        .change_password(session.principal_id, "first-password", "second-password")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unavailable(_)));
}

#[tokio::test]
async fn test_authenticator_fails_closed_when_store_is_down() {
    let h = harness_with(PrincipalKind::User, std::sync::Arc::new(DownRevocationStore));

    let session = h
        .service
        .register("amira@example.com", "first-password", None, None)
        .await
        .unwrap();

    // A perfectly valid token is not waved through on a store failure.
    let err = authenticate_token(&h.codec, h.revocations.as_ref(), &session.token)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unavailable(_)));
}

#[tokio::test]
async fn test_expired_token_is_rejected_before_store_lookup() {
    let h = harness(PrincipalKind::User);

    let id = uuid::Uuid::new_v4();
    let expired = h
        .codec
        .mint_at(id, "client", chrono::Utc::now().timestamp() - common::TEST_TTL - 5)
        .unwrap();

    let err = authenticate_token(&h.codec, h.revocations.as_ref(), &expired)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated));
}
