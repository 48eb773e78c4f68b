use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// Mirrors the `device_status` Postgres enum.
///
/// This is the *registry* status set by the admin (a retired device stays in
/// the registry as `inactive`), not the derived online/offline liveness badge
/// computed by the analytics layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "device_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Device {
    pub id: Uuid,
    /// Hardware identifier reported by the sensor, e.g. `ESP32_A101`.
    /// Unique key joining the registry to the reading log.
    pub sensor_id: String,
    pub name: String,
    pub location: String,
    pub status: DeviceStatus,
    pub installed_date: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Sensor readings
// ---------------------------------------------------------------------------

/// One row of the append-only sensor log. Written by the MQTT ingestion
/// bridge, never by this service.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, ToSchema)]
pub struct SensorReading {
    pub id: Uuid,
    pub sensor_id: String,
    pub recorded_at: DateTime<Utc>,
    /// Air Quality Index derived from pollutant concentrations, 0–500.
    pub aqi_calculated: f64,
    pub co2_ppm: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub battery: Option<f64>,
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

/// One forecast document as persisted by the external inference service.
/// This service only reads the table; regeneration goes through the HTTP
/// client and the upstream stores its own output.
#[derive(Debug, Clone, FromRow)]
pub struct PredictionRecord {
    pub id: Uuid,
    pub sensor_id: String,
    pub generated_at: DateTime<Utc>,
    pub predictions: Json<Vec<crate::airphynet::models::PredictionPoint>>,
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AqiThresholds {
    pub moderate: i64,
    pub unhealthy: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MqttSettings {
    pub broker_url: String,
    pub topic: String,
    pub qos: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub channel: Vec<String>,
}

/// Global configuration stored as the single `system_settings` row.
/// Consumed by the ingestion bridge and the dashboard; this service only
/// persists and serves it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SettingsConfig {
    pub aqi_threshold: AqiThresholds,
    pub mqtt: MqttSettings,
    pub notification: NotificationSettings,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            aqi_threshold: AqiThresholds {
                moderate: 100,
                unhealthy: 150,
            },
            mqtt: MqttSettings {
                broker_url: "mqtt://broker.hivemq.com".to_owned(),
                topic: "atmo/data".to_owned(),
                qos: 1,
            },
            notification: NotificationSettings {
                enabled: true,
                channel: vec!["dashboard".to_owned()],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_defaults_match_documented_values() {
        let s = SettingsConfig::default();
        assert_eq!(s.aqi_threshold.moderate, 100);
        assert_eq!(s.aqi_threshold.unhealthy, 150);
        assert_eq!(s.mqtt.broker_url, "mqtt://broker.hivemq.com");
        assert_eq!(s.mqtt.qos, 1);
        assert!(s.notification.enabled);
        assert_eq!(s.notification.channel, vec!["dashboard".to_owned()]);
    }

    #[test]
    fn settings_round_trip_through_json() {
        let s = SettingsConfig::default();
        let json = serde_json::to_string(&s).unwrap();
        let back: SettingsConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn device_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeviceStatus::Active).unwrap(),
            "\"active\""
        );
        assert_eq!(
            serde_json::to_string(&DeviceStatus::Inactive).unwrap(),
            "\"inactive\""
        );
    }
}
