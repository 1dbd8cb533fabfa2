//! Dashboard state and its text rendering.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Utc};

use shiftwatch_core::page::DEFAULT_PAGE_SIZE;
use shiftwatch_core::{FatigueEvent, TemperatureReading, UserProfile};

use crate::client::ShiftWatchClient;
use crate::credential_store::Theme;
use crate::fetcher::FetchError;
use crate::projection::{
    Avatar, CHART_POINTS, ChartSeries, DASHBOARD_FATIGUE_ITEMS, ImageStatus, avatar_for,
    average_temperature, chart_series, clock_line, device_count, recent_fatigue,
};

/// Latest data pulled by the dashboard poller.
#[derive(Debug, Clone, Default)]
pub struct LiveData {
    pub readings: Vec<TemperatureReading>,
    pub fatigue: Vec<FatigueEvent>,
    /// Message of the last failed fetch, cleared by the next success.
    pub error: Option<String>,
    /// The last refresh found no usable session; the view should return to
    /// login.
    pub session_expired: bool,
}

impl LiveData {
    /// Re-fetch both feeds. A failed feed is emptied and its message kept.
    pub async fn refresh(&mut self, client: &ShiftWatchClient) {
        let (fatigue, readings) = tokio::join!(
            client.list_fatigue(),
            client.list_temperature(1, DEFAULT_PAGE_SIZE),
        );

        self.error = None;
        self.session_expired = false;

        match fatigue {
            Ok(events) => self.fatigue = events,
            Err(e) => {
                self.fatigue.clear();
                self.record(&e, "fatigue");
            }
        }

        match readings {
            Ok(page) => self.readings = page.items,
            Err(e) => {
                self.readings.clear();
                self.record(&e, "temperature");
            }
        }
    }

    fn record(&mut self, error: &FetchError, feed: &str) {
        if matches!(error, FetchError::SessionExpired | FetchError::Unauthenticated) {
            self.session_expired = true;
        }
        tracing::warn!(feed, error = %error, "Dashboard refresh failed");
        self.error = Some(error.to_string());
    }
}

/// Everything the dashboard screen shows.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub user_name: String,
    pub avatar: Avatar,
    pub clock: String,
    pub average_temperature: f64,
    pub device_count: usize,
    pub chart: ChartSeries,
    pub recent_fatigue: Vec<FatigueEvent>,
    pub error: Option<String>,
    pub theme: Theme,
    pub tz: FixedOffset,
}

impl DashboardView {
    /// Project the view from fetched data.
    #[must_use]
    pub fn project(
        profile: Option<&UserProfile>,
        data: &LiveData,
        now: DateTime<Utc>,
        tz: FixedOffset,
        theme: Theme,
    ) -> Self {
        Self {
            user_name: profile.map_or_else(|| "Usuario".to_owned(), |p| p.full_name.clone()),
            avatar: profile.map_or(Avatar::Masculine, avatar_for),
            clock: clock_line(now, tz),
            average_temperature: average_temperature(&data.readings),
            device_count: device_count(&data.readings),
            chart: chart_series(&data.readings, CHART_POINTS, tz),
            recent_fatigue: recent_fatigue(&data.fatigue, DASHBOARD_FATIGUE_ITEMS)
                .into_iter()
                .cloned()
                .collect(),
            error: data.error.clone(),
            theme,
            tz,
        }
    }

    /// Plain-text rendering for terminals.
    #[must_use]
    pub fn render(&self, images: &ImageStatus) -> String {
        let palette = Palette::for_theme(self.theme);
        let mut out = String::new();

        let _ = writeln!(
            out,
            "{}Hola, {}{} [{}]",
            palette.heading,
            self.user_name,
            palette.reset,
            self.avatar.asset()
        );
        let _ = writeln!(out, "{}", self.clock);
        let _ = writeln!(out);

        if let Some(error) = &self.error {
            let _ = writeln!(out, "{}! {error}{}", palette.alert, palette.reset);
            let _ = writeln!(out);
        }

        let _ = writeln!(
            out,
            "Temperatura promedio: {:.2} °C   Dispositivos: {}",
            self.average_temperature, self.device_count
        );

        let _ = writeln!(out);
        let _ = writeln!(out, "{}Últimas lecturas{}", palette.heading, palette.reset);
        if self.chart.is_empty() {
            let _ = writeln!(out, "  Sin datos de temperatura");
        }
        for (label, value) in self.chart.points() {
            let _ = writeln!(out, "  {label:>5}  {value:>6.1}  {}", bar(value));
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "{}Fatiga reciente{}", palette.heading, palette.reset);
        if self.recent_fatigue.is_empty() {
            let _ = writeln!(out, "  Sin eventos de fatiga");
        }
        for event in &self.recent_fatigue {
            let _ = writeln!(
                out,
                "  {} - {} ({}) {}",
                event.recorded_at.with_timezone(&self.tz).format("%d/%m %H:%M"),
                event.camera_id,
                event.environment,
                images.image_for(event),
            );
        }

        out
    }
}

/// One `#` per two degrees, capped at 25.
fn bar(value: f64) -> String {
    let width = (value / 2.0).clamp(0.0, 25.0);
    // Clamped to 0..=25 above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let width = width.round() as usize;
    "#".repeat(width)
}

struct Palette {
    heading: &'static str,
    alert: &'static str,
    reset: &'static str,
}

impl Palette {
    const fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                heading: "\x1b[1;96m",
                alert: "\x1b[91m",
                reset: "\x1b[0m",
            },
            Theme::Light => Self {
                heading: "\x1b[1;34m",
                alert: "\x1b[31m",
                reset: "\x1b[0m",
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shiftwatch_core::{
        AvatarPreference, Email, FatigueEventId, TemperatureReadingId, UserId,
    };

    use super::*;

    fn lima() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn data() -> LiveData {
        let reading = |id: i32, device: &str, at: &str, t: Option<f64>| TemperatureReading {
            id: TemperatureReadingId::new(id),
            recorded_at: at.parse().unwrap(),
            temperature: t,
            environment: "Planta 2".to_owned(),
            owner: UserId::new(1),
            device_id: device.to_owned(),
            fan_engaged: false,
        };
        let event = |id: i32, at: &str| FatigueEvent {
            id: FatigueEventId::new(id),
            camera_id: format!("CAM-{id}"),
            environment: "Linea 3".to_owned(),
            owner: UserId::new(1),
            recorded_at: at.parse().unwrap(),
            photo_url: format!("http://localhost:5000/uploads/fatiga_{id}.jpg"),
            storage_key: None,
        };

        LiveData {
            readings: vec![
                reading(3, "B", "2024-05-06T16:00:00Z", Some(22.0)),
                reading(2, "A", "2024-05-06T15:00:00Z", None),
                reading(1, "A", "2024-05-06T14:00:00Z", Some(20.0)),
            ],
            fatigue: vec![
                event(3, "2024-05-06T10:00:00Z"),
                event(2, "2024-05-06T09:00:00Z"),
                event(1, "2024-05-06T08:00:00Z"),
            ],
            error: None,
            session_expired: false,
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new(1),
            full_name: "Rosa Diaz".to_owned(),
            phone: "987654321".to_owned(),
            email: Email::parse("rosa@cistcor.com").unwrap(),
            avatar: AvatarPreference::Unspecified,
        }
    }

    #[test]
    fn test_project() {
        let now = "2024-05-06T19:30:00Z".parse().unwrap();
        let view = DashboardView::project(Some(&profile()), &data(), now, lima(), Theme::Dark);

        assert_eq!(view.user_name, "Rosa Diaz");
        assert_eq!(view.avatar, Avatar::Feminine);
        assert!((view.average_temperature - 21.0).abs() < f64::EPSILON);
        assert_eq!(view.device_count, 2);
        assert_eq!(view.chart.labels, vec!["09:00", "10:00", "11:00"]);
        let shown: Vec<i32> = view.recent_fatigue.iter().map(|e| e.id.as_i32()).collect();
        assert_eq!(shown, vec![3, 2]);
    }

    #[test]
    fn test_project_without_profile() {
        let now = "2024-05-06T19:30:00Z".parse().unwrap();
        let view = DashboardView::project(None, &LiveData::default(), now, lima(), Theme::Light);
        assert_eq!(view.user_name, "Usuario");
        assert!(view.average_temperature.abs() < f64::EPSILON);
        assert!(view.chart.is_empty());
    }

    #[test]
    fn test_render_marks_broken_images() {
        let now = "2024-05-06T19:30:00Z".parse().unwrap();
        let mut data = data();
        data.error = Some("Sin conexión".to_owned());
        let view = DashboardView::project(Some(&profile()), &data, now, lima(), Theme::Dark);

        let mut images = ImageStatus::new();
        images.mark_broken(FatigueEventId::new(3));
        let text = view.render(&images);

        assert!(text.contains("Rosa Diaz"));
        assert!(text.contains("21.00"));
        assert!(text.contains("Sin conexión"));
        assert!(text.contains("CAM-3 (Linea 3) placeholder.png"));
        assert!(text.contains("fatiga_2.jpg"));
        assert!(!text.contains("CAM-1"));
    }

    #[test]
    fn test_bar_is_clamped() {
        assert_eq!(bar(-3.0), "");
        assert_eq!(bar(10.0), "#####");
        assert_eq!(bar(500.0).len(), 25);
    }
}
