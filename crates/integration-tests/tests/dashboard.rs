//! Dashboard polling against a live server.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;

use shiftwatch_client::projection::{Avatar, ImageStatus};
use shiftwatch_client::{DashboardView, LiveData, SessionEvent, SnapshotUpload, Theme, polling};
use shiftwatch_core::wire::CreateTemperatureRequest;
use shiftwatch_integration_tests::{PASSWORD, PNG_PIXEL, TestServer};

#[tokio::test]
async fn test_poller_picks_up_new_data_and_stops() {
    let server = TestServer::spawn().await;
    let client = server.client();
    server.sign_up(&client, "daniela.flores", "Daniela Flores").await;

    let data = Arc::new(Mutex::new(LiveData::default()));
    let handle = polling::start(
        {
            let client = client.clone();
            let data = Arc::clone(&data);
            move || {
                let client = client.clone();
                let data = Arc::clone(&data);
                async move {
                    let mut next = data.lock().await.clone();
                    next.refresh(&client).await;
                    *data.lock().await = next;
                }
            }
        },
        server.client_config().poll_interval,
    );

    tokio::time::sleep(Duration::from_millis(120)).await;
    assert!(data.lock().await.readings.is_empty());

    client
        .create_temperature(&CreateTemperatureRequest {
            environment: Some("Sala de servidores".to_owned()),
            device_id: Some("ESP32-A".to_owned()),
            temperature: Some(27.5),
        })
        .await
        .unwrap();
    client
        .upload_fatigue(SnapshotUpload {
            camera_id: "CAM-1".to_owned(),
            environment: "Linea 3".to_owned(),
            file_name: "cara.png".to_owned(),
            content_type: "image/png".to_owned(),
            bytes: PNG_PIXEL.to_vec(),
        })
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(handle.ticks() >= 3);
    handle.shutdown().await;

    let snapshot = data.lock().await.clone();
    assert_eq!(snapshot.readings.len(), 1);
    assert_eq!(snapshot.fatigue.len(), 1);
    assert!(snapshot.error.is_none());

    let profile = client.session().await.profile.unwrap();
    let tz = server.client_config().display_offset;
    let view = DashboardView::project(Some(&profile), &snapshot, Utc::now(), tz, Theme::Dark);
    assert_eq!(view.avatar, Avatar::Feminine);
    assert!((view.average_temperature - 27.5).abs() < f64::EPSILON);
    assert_eq!(view.device_count, 1);
    assert!(view.render(&ImageStatus::new()).contains("CAM-1"));
}

#[tokio::test]
async fn test_refresh_flags_expired_session() {
    let server = TestServer::spawn().await;
    let client = server.client();
    let id = server.sign_up(&client, "jorge.salas", "Jorge Salas").await;
    let profile = client.session().await.profile.unwrap();
    client
        .credentials()
        .save(&server.expired_token(id), &profile)
        .await;

    let mut events = client.session_events();

    let mut data = LiveData::default();
    data.refresh(&client).await;

    assert!(data.session_expired);
    assert!(data.error.is_some());
    assert!(data.readings.is_empty());
    assert!(client.session().await.token.is_none());
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
    assert!(events.try_recv().is_err());

    client.login("jorge.salas", PASSWORD).await.unwrap();
    data.refresh(&client).await;

    assert!(!data.session_expired);
    assert!(data.error.is_none());
    assert!(events.try_recv().is_err());
}
