//! Credential store contract against `PostgreSQL`.

use crate::postgres::helpers::{TestDatabase, test_database};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use std::sync::Arc;
use tokenward::auth::{
    domain::{PrincipalId, Username},
    ports::{CredentialStore, CredentialStoreError},
    services::AuthService,
};
use tokenward::config::AuthConfig;

#[fixture]
fn database() -> Option<TestDatabase> {
    test_database()
}

fn username(raw: &str) -> Username {
    Username::new(raw).expect("valid username")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn created_principal_round_trips(database: Option<TestDatabase>) {
    let Some(db) = database else { return };

    let created = db
        .store
        .create_principal(&username("alice"), "s3cret!")
        .await
        .expect("create");
    let by_name = db
        .store
        .find_by_username(&username("alice"))
        .await
        .expect("lookup")
        .expect("present");

    assert_eq!(by_name.id(), created.id());
    assert!(by_name.refresh_token_hash().is_none());
    assert!(db.store.verify_secret(&by_name, "s3cret!").await);
    assert!(!db.store.verify_secret(&by_name, "wrong").await);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_username_is_rejected(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    db.store
        .create_principal(&username("alice"), "first")
        .await
        .expect("create");

    let result = db.store.create_principal(&username("alice"), "second").await;

    assert!(matches!(result, Err(CredentialStoreError::AlreadyExists(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rotation_is_a_single_use_swap(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let principal = db
        .store
        .create_principal(&username("alice"), "pw")
        .await
        .expect("create");
    db.store
        .set_refresh_token(principal.id(), Some("refresh-1"))
        .await
        .expect("set");

    db.store
        .rotate_refresh_token(principal.id(), "refresh-1", "refresh-2")
        .await
        .expect("rotate");
    let replay = db
        .store
        .rotate_refresh_token(principal.id(), "refresh-1", "refresh-3")
        .await;

    assert!(matches!(
        replay,
        Err(CredentialStoreError::RefreshTokenMismatch(_))
    ));
    let reloaded = db
        .store
        .find_by_id(principal.id())
        .await
        .expect("lookup")
        .expect("present");
    assert!(db.store.compare_refresh_token(&reloaded, "refresh-2"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_rotations_have_exactly_one_winner(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let principal = db
        .store
        .create_principal(&username("alice"), "pw")
        .await
        .expect("create");
    db.store
        .set_refresh_token(principal.id(), Some("stale"))
        .await
        .expect("set");

    let attempts = (0..4).map(|attempt| {
        let store = Arc::clone(&db.store);
        let id = principal.id();
        tokio::spawn(async move {
            store
                .rotate_refresh_token(id, "stale", &format!("next-{attempt}"))
                .await
        })
    });
    let mut winners = 0;
    for handle in attempts.collect::<Vec<_>>() {
        match handle.await.expect("join") {
            Ok(()) => winners += 1,
            Err(CredentialStoreError::RefreshTokenMismatch(_)) => {}
            Err(other) => panic!("unexpected store error: {other}"),
        }
    }

    assert_eq!(winners, 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_and_deleted_principals_are_not_found(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let principal = db
        .store
        .create_principal(&username("alice"), "pw")
        .await
        .expect("create");
    db.store
        .set_refresh_token(principal.id(), Some("refresh-1"))
        .await
        .expect("set");

    db.store.soft_delete(principal.id()).await.expect("delete");

    assert!(db.store.find_by_id(principal.id()).await.expect("lookup").is_none());
    assert!(matches!(
        db.store
            .rotate_refresh_token(principal.id(), "refresh-1", "refresh-2")
            .await,
        Err(CredentialStoreError::NotFound(_))
    ));
    assert!(matches!(
        db.store.set_refresh_token(PrincipalId::new(), None).await,
        Err(CredentialStoreError::NotFound(_))
    ));

    let restored = db.store.restore(principal.id()).await.expect("restore");
    assert!(!restored.is_deleted());
    assert!(restored.refresh_token_hash().is_none());
    assert!(matches!(
        db.store.restore(principal.id()).await,
        Err(CredentialStoreError::NotFound(_))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn service_sessions_persist_through_postgres(database: Option<TestDatabase>) {
    let Some(db) = database else { return };
    let service = AuthService::new(
        Arc::clone(&db.store),
        Arc::new(AuthConfig::default()),
        Arc::new(DefaultClock),
    );

    let opened = service
        .sign_up("alice", "correct horse battery")
        .await
        .expect("sign up");
    let rotated = service
        .refresh(opened.identity.subject, &opened.tokens.refresh_token)
        .await
        .expect("refresh");
    let replay = service
        .refresh(opened.identity.subject, &opened.tokens.refresh_token)
        .await;

    assert_ne!(rotated.tokens.refresh_token, opened.tokens.refresh_token);
    assert!(replay.is_err_and(|err| err.unauthorized_reason().is_some()));
}
