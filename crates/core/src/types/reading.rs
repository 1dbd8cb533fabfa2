//! Sensor readings and fatigue-camera events.
//!
//! Field names on the wire follow the original mobile contract
//! (`fechaHora`, `idDispositivo`, ...), so every field carries an explicit
//! serde rename.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{FatigueEventId, TemperatureReadingId, UserId};

/// Temperature above which the device's fan is reported as engaged.
pub const FAN_THRESHOLD_CELSIUS: f64 = 30.0;

/// Whether a reading engages the fan. Missing temperatures never do.
#[must_use]
pub fn fan_engaged(temperature: Option<f64>) -> bool {
    temperature.is_some_and(|t| t > FAN_THRESHOLD_CELSIUS)
}

/// One temperature sample reported by a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureReading {
    #[serde(rename = "_id")]
    pub id: TemperatureReadingId,
    /// Server receipt time unless the device supplied one.
    #[serde(rename = "fechaHora")]
    pub recorded_at: DateTime<Utc>,
    #[serde(rename = "temperatura", default)]
    pub temperature: Option<f64>,
    /// Free-form location label ("Sala de servidores", "Planta 2").
    #[serde(rename = "ambiente")]
    pub environment: String,
    #[serde(rename = "idUsuario")]
    pub owner: UserId,
    #[serde(rename = "idDispositivo")]
    pub device_id: String,
    #[serde(rename = "conectadoVentilador", default)]
    pub fan_engaged: bool,
}

/// A fatigue-camera snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueEvent {
    #[serde(rename = "_id")]
    pub id: FatigueEventId,
    #[serde(rename = "idCamara")]
    pub camera_id: String,
    #[serde(rename = "ambiente")]
    pub environment: String,
    #[serde(rename = "idUsuario")]
    pub owner: UserId,
    #[serde(rename = "fechaHora")]
    pub recorded_at: DateTime<Utc>,
    /// Public URL of the snapshot.
    #[serde(rename = "foto")]
    pub photo_url: String,
    /// Key of the stored object, kept server-side for cleanup.
    #[serde(skip)]
    pub storage_key: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_threshold_is_exclusive() {
        assert!(!fan_engaged(None));
        assert!(!fan_engaged(Some(30.0)));
        assert!(fan_engaged(Some(30.1)));
    }

    #[test]
    fn test_reading_wire_names() {
        let json = serde_json::json!({
            "_id": 3,
            "fechaHora": "2024-05-01T14:30:00Z",
            "temperatura": null,
            "ambiente": "Planta 2",
            "idUsuario": 1,
            "idDispositivo": "ESP32-A",
            "conectadoVentilador": false
        });
        let reading: TemperatureReading = serde_json::from_value(json).unwrap();
        assert_eq!(reading.device_id, "ESP32-A");
        assert_eq!(reading.temperature, None);
    }

    #[test]
    fn test_fatigue_event_hides_storage_key() {
        let event = FatigueEvent {
            id: FatigueEventId::new(1),
            camera_id: "CAM-1".to_owned(),
            environment: "Linea 3".to_owned(),
            owner: UserId::new(1),
            recorded_at: "2024-05-01T08:00:00Z".parse().unwrap(),
            photo_url: "http://localhost:5000/uploads/fatiga_1.jpg".to_owned(),
            storage_key: Some("fatiga_1.jpg".to_owned()),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["foto"], "http://localhost:5000/uploads/fatiga_1.jpg");
        assert!(value.get("storage_key").is_none());
        assert!(value.get("storageKey").is_none());
    }
}
