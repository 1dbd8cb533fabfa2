//! Live terminal dashboard.
//!
//! Data is re-fetched every poll interval and the screen is redrawn every
//! second so the clock line keeps moving. Ctrl+C, or the server rejecting
//! the session, stops both pollers.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;

use shiftwatch_client::polling::{self, CLOCK_INTERVAL};
use shiftwatch_client::projection::ImageStatus;
use shiftwatch_client::{DashboardView, LiveData, SessionEvent};

use super::{CommandError, Context};

const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Show the dashboard until interrupted.
pub async fn run(ctx: &Context, once: bool) -> Result<(), CommandError> {
    let session = ctx.client.session().await;
    if session.token.is_none() {
        return Err(CommandError::NotSignedIn);
    }
    let profile = session.profile;
    let theme = ctx.credentials().load_theme().await;
    let tz = ctx.config.display_offset;
    let images = ImageStatus::new();

    if once {
        let mut data = LiveData::default();
        data.refresh(&ctx.client).await;
        if data.session_expired {
            return Err(CommandError::NotSignedIn);
        }
        let view = DashboardView::project(profile.as_ref(), &data, Utc::now(), tz, theme);

        #[allow(clippy::print_stdout)]
        {
            print!("{}", view.render(&images));
        }
        return Ok(());
    }

    let data = Arc::new(Mutex::new(LiveData::default()));
    let mut events = ctx.client.session_events();

    // The lock is only held to swap in fresh data, so the renderer never
    // waits on the network.
    let mut fetcher = polling::start(
        {
            let client = ctx.client.clone();
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
        ctx.config.poll_interval,
    );

    let mut renderer = polling::start(
        {
            let data = Arc::clone(&data);
            move || {
                let data = Arc::clone(&data);
                let profile = profile.clone();
                let images = images.clone();
                async move {
                    let snapshot = data.lock().await.clone();
                    let view =
                        DashboardView::project(profile.as_ref(), &snapshot, Utc::now(), tz, theme);

                    #[allow(clippy::print_stdout)]
                    {
                        print!("{CLEAR_SCREEN}{}", view.render(&images));
                    }
                }
            }
        },
        CLOCK_INTERVAL,
    );

    let expired = tokio::select! {
        _ = tokio::signal::ctrl_c() => false,
        event = events.recv() => matches!(event, Ok(SessionEvent::Expired)),
    };

    fetcher.stop();
    renderer.stop();

    if expired {
        tracing::warn!("Session expired while the dashboard was open");
        return Err(CommandError::NotSignedIn);
    }
    Ok(())
}
