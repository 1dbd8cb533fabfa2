//! Pure view projections over fetched data.
//!
//! Nothing here does I/O; every function takes the already-fetched readings
//! or snapshots and derives what a screen shows.

use std::collections::HashSet;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc, Weekday};

use shiftwatch_core::{AvatarPreference, FatigueEvent, FatigueEventId, TemperatureReading, UserProfile};

/// Readings plotted on the dashboard chart.
pub const CHART_POINTS: usize = 10;

/// Snapshots shown on the dashboard.
pub const DASHBOARD_FATIGUE_ITEMS: usize = 2;

/// Page size of the snapshot list.
pub const FATIGUE_PAGE_SIZE: usize = 5;

/// Page size of the reading list.
pub const READING_PAGE_SIZE: usize = 10;

/// Common Spanish feminine given names used by the avatar guess.
pub const FEMININE_NAMES: &[&str] = &[
    "talita", "rosa", "maria", "milagros", "ana", "lucia", "sofia", "isabel", "carmen", "laura",
    "julia", "paula", "clara", "elena", "sara", "emma", "valentina", "camila", "victoria",
    "andrea", "patricia", "susana", "marta", "gloria", "beatriz", "natalia", "diana", "luz",
    "silvia", "teresa", "adriana", "monica", "carolina", "gabriela", "daniela", "veronica",
    "alejandra", "esther", "angela", "lorena", "vanessa", "cecilia", "pilar", "irene", "alicia",
    "raquel", "eva", "miriam", "noelia", "fatima", "cristina", "olga", "rocio", "amalia", "belen",
    "estefania", "yolanda",
];

/// Mean of the readings that carry a temperature, rounded to 2 decimals.
/// Zero when there are none.
#[must_use]
pub fn average_temperature(readings: &[TemperatureReading]) -> f64 {
    let (sum, count) = readings
        .iter()
        .filter_map(|r| r.temperature)
        .fold((0.0_f64, 0_u32), |(sum, count), t| (sum + t, count + 1));
    if count == 0 {
        return 0.0;
    }
    round2(sum / f64::from(count))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Number of distinct devices.
#[must_use]
pub fn device_count(readings: &[TemperatureReading]) -> usize {
    readings
        .iter()
        .map(|r| r.device_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Labels and values for the temperature chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(label, value)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (&str, f64)> {
        self.labels
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// The last `n` readings in ascending time order.
///
/// Labels are `HH:MM` when every point falls on the same calendar day in
/// `tz`, `DD/MM` otherwise. Missing temperatures plot as 0.
#[must_use]
pub fn chart_series(readings: &[TemperatureReading], n: usize, tz: FixedOffset) -> ChartSeries {
    let mut sorted: Vec<&TemperatureReading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.recorded_at);
    let window = sorted.split_off(sorted.len().saturating_sub(n));

    let local: Vec<DateTime<FixedOffset>> = window
        .iter()
        .map(|r| r.recorded_at.with_timezone(&tz))
        .collect();
    let same_day = local
        .first()
        .is_some_and(|first| local.iter().all(|t| t.date_naive() == first.date_naive()));

    let format = if same_day { "%H:%M" } else { "%d/%m" };
    ChartSeries {
        labels: local.iter().map(|t| t.format(format).to_string()).collect(),
        values: window.iter().map(|r| r.temperature.unwrap_or(0.0)).collect(),
    }
}

/// One page of a client-side list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    /// 1-based page shown.
    pub page: usize,
    pub total_pages: usize,
}

/// Slice `items` into 1-based pages of `page_size`.
///
/// Page 0 is treated as page 1; a page past the end is empty.
#[must_use]
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Page<'_, T> {
    let page = page.max(1);
    let total_pages = shiftwatch_core::total_pages(items.len(), page_size);
    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());
    Page {
        items: items.get(start..end).unwrap_or_default(),
        page,
        total_pages,
    }
}

/// Readings matching a search box and an optional calendar day.
///
/// The text matches device id or environment case-insensitively, or any
/// substring of the temperature as printed. Blank text matches everything.
#[must_use]
pub fn filter_readings<'a>(
    readings: &'a [TemperatureReading],
    text: &str,
    day: Option<NaiveDate>,
    tz: FixedOffset,
) -> Vec<&'a TemperatureReading> {
    let needle = text.trim().to_lowercase();
    readings
        .iter()
        .filter(|r| {
            needle.is_empty()
                || r.device_id.to_lowercase().contains(&needle)
                || r.environment.to_lowercase().contains(&needle)
                || r.temperature
                    .is_some_and(|t| t.to_string().contains(&needle))
        })
        .filter(|r| day.is_none_or(|d| r.recorded_at.with_timezone(&tz).date_naive() == d))
        .collect()
}

/// The newest reading of each device, newest first.
#[must_use]
pub fn latest_per_device(readings: &[TemperatureReading]) -> Vec<&TemperatureReading> {
    let mut sorted: Vec<&TemperatureReading> = readings.iter().collect();
    sorted.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|&r| seen.insert(r.device_id.as_str()))
        .collect()
}

/// The `n` newest snapshots.
#[must_use]
pub fn recent_fatigue(events: &[FatigueEvent], n: usize) -> Vec<&FatigueEvent> {
    let mut sorted: Vec<&FatigueEvent> = events.iter().collect();
    sorted.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    sorted.truncate(n);
    sorted
}

/// Stock avatar shown next to the user's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Avatar {
    Feminine,
    Masculine,
}

impl Avatar {
    /// Asset file name.
    #[must_use]
    pub const fn asset(self) -> &'static str {
        match self {
            Self::Feminine => "dama.png",
            Self::Masculine => "profile.png",
        }
    }
}

/// Guess an avatar from a full name.
#[must_use]
pub fn guess_avatar(full_name: &str) -> Avatar {
    let name = full_name.trim().to_lowercase();
    if name.ends_with('a') || FEMININE_NAMES.iter().any(|n| name.contains(n)) {
        Avatar::Feminine
    } else {
        Avatar::Masculine
    }
}

/// The avatar for a profile. An explicit preference beats the guess.
#[must_use]
pub fn avatar_for(profile: &UserProfile) -> Avatar {
    match profile.avatar {
        AvatarPreference::Feminine => Avatar::Feminine,
        AvatarPreference::Masculine => Avatar::Masculine,
        AvatarPreference::Unspecified => guess_avatar(&profile.full_name),
    }
}

/// Dashboard clock text, e.g. `lunes, 6 de mayo de 2024 - 02:30 p. m. -05`.
#[must_use]
pub fn clock_line(now: DateTime<Utc>, tz: FixedOffset) -> String {
    let local = now.with_timezone(&tz);
    let (pm, hour) = local.hour12();
    format!(
        "{}, {} de {} de {} - {:02}:{:02} {} {}",
        weekday_name(local.weekday()),
        local.day(),
        month_name(local.month()),
        local.year(),
        hour,
        local.minute(),
        if pm { "p. m." } else { "a. m." },
        offset_label(tz),
    )
}

const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}

const fn month_name(month: u32) -> &'static str {
    match month {
        1 => "enero",
        2 => "febrero",
        3 => "marzo",
        4 => "abril",
        5 => "mayo",
        6 => "junio",
        7 => "julio",
        8 => "agosto",
        9 => "septiembre",
        10 => "octubre",
        11 => "noviembre",
        _ => "diciembre",
    }
}

/// `-05`, `+00`, `+05:30`.
fn offset_label(tz: FixedOffset) -> String {
    let secs = tz.local_minus_utc();
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.unsigned_abs();
    let (hours, minutes) = (secs / 3600, secs % 3600 / 60);
    if minutes == 0 {
        format!("{sign}{hours:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}")
    }
}

/// Snapshots whose image failed to load; they show a placeholder instead.
#[derive(Debug, Clone, Default)]
pub struct ImageStatus {
    broken: HashSet<FatigueEventId>,
}

/// Shown in place of a snapshot that can't be displayed.
pub const PLACEHOLDER_IMAGE: &str = "placeholder.png";

impl ImageStatus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_broken(&mut self, id: FatigueEventId) {
        self.broken.insert(id);
    }

    #[must_use]
    pub fn is_broken(&self, id: FatigueEventId) -> bool {
        self.broken.contains(&id)
    }

    /// The image to show for `event`: its photo, or the placeholder when the
    /// photo is missing or marked broken.
    #[must_use]
    pub fn image_for<'a>(&self, event: &'a FatigueEvent) -> &'a str {
        if event.photo_url.is_empty() || self.is_broken(event.id) {
            PLACEHOLDER_IMAGE
        } else {
            &event.photo_url
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shiftwatch_core::{Email, TemperatureReadingId, UserId};

    use super::*;

    fn lima() -> FixedOffset {
        FixedOffset::west_opt(5 * 3600).unwrap()
    }

    fn reading(id: i32, device: &str, at: &str, temperature: Option<f64>) -> TemperatureReading {
        TemperatureReading {
            id: TemperatureReadingId::new(id),
            recorded_at: at.parse().unwrap(),
            temperature,
            environment: "Planta 2".to_owned(),
            owner: UserId::new(1),
            device_id: device.to_owned(),
            fan_engaged: false,
        }
    }

    fn snapshot(id: i32, at: &str) -> FatigueEvent {
        FatigueEvent {
            id: FatigueEventId::new(id),
            camera_id: "CAM-1".to_owned(),
            environment: "Linea 3".to_owned(),
            owner: UserId::new(1),
            recorded_at: at.parse().unwrap(),
            photo_url: format!("http://localhost:5000/uploads/fatiga_{id}.jpg"),
            storage_key: None,
        }
    }

    #[test]
    fn test_average_skips_missing() {
        let readings = vec![
            reading(1, "A", "2024-05-06T14:00:00Z", Some(20.0)),
            reading(2, "A", "2024-05-06T14:01:00Z", None),
            reading(3, "B", "2024-05-06T14:02:00Z", Some(22.0)),
        ];
        assert!((average_temperature(&readings) - 21.0).abs() < f64::EPSILON);
        assert!(average_temperature(&[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_average_rounds_to_two_decimals() {
        let readings = vec![
            reading(1, "A", "2024-05-06T14:00:00Z", Some(20.0)),
            reading(2, "A", "2024-05-06T14:01:00Z", Some(20.0)),
            reading(3, "A", "2024-05-06T14:02:00Z", Some(21.0)),
        ];
        assert!((average_temperature(&readings) - 20.33).abs() < 1e-9);
    }

    #[test]
    fn test_device_count() {
        let readings = vec![
            reading(1, "A", "2024-05-06T14:00:00Z", Some(20.0)),
            reading(2, "A", "2024-05-06T14:01:00Z", Some(21.0)),
            reading(3, "B", "2024-05-06T14:02:00Z", Some(22.0)),
        ];
        assert_eq!(device_count(&readings), 2);
        assert_eq!(device_count(&[]), 0);
    }

    #[test]
    fn test_chart_same_day_uses_time_labels() {
        // Newest first, as the API returns them.
        let readings = vec![
            reading(2, "A", "2024-05-06T19:45:00Z", None),
            reading(1, "A", "2024-05-06T14:30:00Z", Some(24.5)),
        ];
        let series = chart_series(&readings, CHART_POINTS, lima());
        assert_eq!(series.labels, vec!["09:30", "14:45"]);
        assert_eq!(series.values, vec![24.5, 0.0]);
    }

    #[test]
    fn test_chart_across_days_uses_date_labels() {
        let readings = vec![
            reading(1, "A", "2024-05-06T14:30:00Z", Some(24.0)),
            // 01:00 UTC on the 8th is still the 7th in Lima.
            reading(2, "A", "2024-05-08T01:00:00Z", Some(25.0)),
        ];
        let series = chart_series(&readings, CHART_POINTS, lima());
        assert_eq!(series.labels, vec!["06/05", "07/05"]);
    }

    #[test]
    fn test_chart_keeps_last_n() {
        let readings: Vec<_> = (0..15)
            .map(|i| {
                reading(
                    i + 1,
                    "A",
                    &format!("2024-05-06T14:{i:02}:00Z"),
                    Some(f64::from(i)),
                )
            })
            .collect();
        let series = chart_series(&readings, 10, lima());
        assert_eq!(series.values.len(), 10);
        assert!((series.values[0] - 5.0).abs() < f64::EPSILON);
        assert_eq!(series.labels.last().unwrap(), "09:14");
        assert!(chart_series(&[], 10, lima()).is_empty());
    }

    #[test]
    fn test_paginate() {
        let items: Vec<u32> = (1..=12).collect();
        let page = paginate(&items, 2, 5);
        assert_eq!(page.items, &[6, 7, 8, 9, 10]);
        assert_eq!(page.total_pages, 3);

        assert_eq!(paginate(&items, 3, 5).items, &[11, 12]);
        assert!(paginate(&items, 4, 5).items.is_empty());
        assert_eq!(paginate(&items, 0, 10).page, 1);
        assert_eq!(paginate::<u32>(&[], 1, 10).total_pages, 0);
    }

    #[test]
    fn test_filter_readings() {
        let mut readings = vec![
            reading(1, "ESP32-Sala", "2024-05-06T14:00:00Z", Some(25.5)),
            reading(2, "esp32-lab", "2024-05-07T14:00:00Z", Some(31.0)),
            reading(3, "CAM", "2024-05-07T15:00:00Z", None),
        ];
        readings[2].environment = "Oficina".to_owned();

        let ids = |v: Vec<&TemperatureReading>| v.iter().map(|r| r.id.as_i32()).collect::<Vec<_>>();

        assert_eq!(ids(filter_readings(&readings, "esp32", None, lima())), vec![1, 2]);
        assert_eq!(ids(filter_readings(&readings, "OFIC", None, lima())), vec![3]);
        assert_eq!(ids(filter_readings(&readings, "25.5", None, lima())), vec![1]);
        assert_eq!(ids(filter_readings(&readings, "", None, lima())), vec![1, 2, 3]);

        let day = NaiveDate::from_ymd_opt(2024, 5, 7).unwrap();
        assert_eq!(ids(filter_readings(&readings, "", Some(day), lima())), vec![2, 3]);
        assert_eq!(ids(filter_readings(&readings, "lab", Some(day), lima())), vec![2]);
    }

    #[test]
    fn test_latest_per_device() {
        let readings = vec![
            reading(1, "A", "2024-05-06T14:00:00Z", Some(20.0)),
            reading(3, "A", "2024-05-06T16:00:00Z", Some(22.0)),
            reading(2, "B", "2024-05-06T15:00:00Z", Some(21.0)),
        ];
        let latest: Vec<i32> = latest_per_device(&readings)
            .iter()
            .map(|r| r.id.as_i32())
            .collect();
        assert_eq!(latest, vec![3, 2]);
    }

    #[test]
    fn test_recent_fatigue() {
        let events = vec![
            snapshot(1, "2024-05-06T08:00:00Z"),
            snapshot(3, "2024-05-06T10:00:00Z"),
            snapshot(2, "2024-05-06T09:00:00Z"),
        ];
        let recent: Vec<i32> = recent_fatigue(&events, DASHBOARD_FATIGUE_ITEMS)
            .iter()
            .map(|e| e.id.as_i32())
            .collect();
        assert_eq!(recent, vec![3, 2]);
    }

    #[test]
    fn test_avatar_guess() {
        assert_eq!(guess_avatar("Talita Huaman"), Avatar::Feminine);
        assert_eq!(guess_avatar("Carlos Quispe"), Avatar::Masculine);
        assert_eq!(guess_avatar("Jorge Peña"), Avatar::Feminine);
        assert_eq!(guess_avatar("MARIA LOPEZ"), Avatar::Feminine);
    }

    #[test]
    fn test_explicit_avatar_wins() {
        let mut profile = UserProfile {
            id: UserId::new(1),
            full_name: "Andrea Costa".to_owned(),
            phone: "987654321".to_owned(),
            email: Email::parse("andrea@cistcor.com").unwrap(),
            avatar: AvatarPreference::Unspecified,
        };
        assert_eq!(avatar_for(&profile), Avatar::Feminine);

        profile.avatar = AvatarPreference::Masculine;
        assert_eq!(avatar_for(&profile), Avatar::Masculine);
        assert_eq!(avatar_for(&profile).asset(), "profile.png");
    }

    #[test]
    fn test_clock_line() {
        let now: DateTime<Utc> = "2024-05-06T19:30:00Z".parse().unwrap();
        assert_eq!(
            clock_line(now, lima()),
            "lunes, 6 de mayo de 2024 - 02:30 p. m. -05"
        );

        let india = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert!(clock_line(now, india).ends_with("01:00 a. m. +05:30"));
    }

    #[test]
    fn test_image_status() {
        let event = snapshot(4, "2024-05-06T08:00:00Z");
        let mut status = ImageStatus::new();
        assert_eq!(status.image_for(&event), event.photo_url);

        status.mark_broken(event.id);
        assert!(status.is_broken(event.id));
        assert_eq!(status.image_for(&event), PLACEHOLDER_IMAGE);
    }
}
