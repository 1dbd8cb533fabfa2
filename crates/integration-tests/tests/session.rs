//! Sign-in, profile edits and session expiry, end to end.

#![allow(clippy::unwrap_used)]

use shiftwatch_client::{CredentialStore, FetchError, SessionEvent};
use shiftwatch_core::AvatarPreference;
use shiftwatch_core::wire::{ProfileUpdateRequest, RegisterRequest};
use shiftwatch_integration_tests::{PASSWORD, TestServer};

#[tokio::test]
async fn test_login_with_bare_local_part_saves_session() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let id = server.sign_up(&client, "talita.huaman", "Talita Huaman").await;

    let session = client.session().await;
    assert!(session.is_complete());
    let profile = session.profile.unwrap();
    assert_eq!(profile.id, id);
    assert_eq!(profile.email.as_str(), "talita.huaman@cistcor.com");
}

#[tokio::test]
async fn test_wrong_password_is_rejected_without_session() {
    let server = TestServer::spawn().await;
    let client = server.client();
    server.sign_up(&client, "rosa.diaz", "Rosa Diaz").await;
    client.logout().await;

    let err = client.login("rosa.diaz", "Otra_Clave_1").await.unwrap_err();
    assert!(matches!(err, FetchError::Api { status: 401, .. }));
    assert!(client.session().await.token.is_none());
}

#[tokio::test]
async fn test_weak_password_never_reaches_server() {
    let server = TestServer::spawn().await;
    let client = server.client();

    let err = client
        .register(RegisterRequest {
            full_name: Some("Luis Rojas".to_owned()),
            phone: Some("987654321".to_owned()),
            email: Some("luis.rojas".to_owned()),
            password: Some("debil".to_owned()),
            avatar: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Validation(_)));

    // Nothing was created, so the account can't sign in.
    let err = client.login("luis.rojas", PASSWORD).await.unwrap_err();
    assert!(matches!(err, FetchError::Api { status: 401, .. }));
}

#[tokio::test]
async fn test_profile_update_refreshes_saved_profile() {
    let server = TestServer::spawn().await;
    let client = server.client();
    let id = server.sign_up(&client, "andrea.costa", "Andrea Costa").await;

    let updated = client
        .update_profile(
            id,
            &ProfileUpdateRequest {
                full_name: Some("Andrea Costa Vega".to_owned()),
                phone: Some("912345678".to_owned()),
                email: Some("andrea.costa@cistcor.com".to_owned()),
                password: None,
                avatar: Some(AvatarPreference::Masculine),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.full_name, "Andrea Costa Vega");

    let session = client.session().await;
    let saved = session.profile.unwrap();
    assert_eq!(saved.phone, "912345678");
    assert_eq!(saved.avatar, AvatarPreference::Masculine);
    assert!(session.token.is_some());

    // The old password still works.
    client.logout().await;
    client.login("andrea.costa", PASSWORD).await.unwrap();
}

#[tokio::test]
async fn test_expired_token_clears_session_once() {
    let server = TestServer::spawn().await;
    let client = server.client();
    let id = server.sign_up(&client, "milagros.paz", "Milagros Paz").await;
    let profile = client.session().await.profile.unwrap();

    client
        .credentials()
        .save(&server.expired_token(id), &profile)
        .await;
    let mut events = client.session_events();

    let err = client.list_temperature(1, 10).await.unwrap_err();
    assert!(matches!(err, FetchError::SessionExpired));
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
    assert!(events.try_recv().is_err());
    assert!(!client.session().await.is_complete());

    let err = client.list_fatigue().await.unwrap_err();
    assert!(matches!(err, FetchError::Unauthenticated));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_session_survives_restart_via_file_store() {
    let server = TestServer::spawn().await;
    let state = tempfile::tempdir().unwrap();
    let path = state.path().join("session.json");

    let client = server.client_with(CredentialStore::file(&path));
    server.sign_up(&client, "carmen.soto", "Carmen Soto").await;
    drop(client);

    let reopened = server.client_with(CredentialStore::file(&path));
    let page = reopened.list_temperature(1, 10).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.total_pages, 0);
}
