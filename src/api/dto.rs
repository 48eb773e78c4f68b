use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::airphynet::models::{PredictionPoint, PredictionResponse};
use crate::analytics::{AnalyticsSummary, Insight, StatusFilter, TrendPoint};
use crate::db::models::{DeviceStatus, PredictionRecord, SensorReading};

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DeviceListQuery {
    /// Case-insensitive substring matched against name, location, and id.
    pub search: Option<String>,
    pub status: Option<StatusFilter>,
}

#[derive(Debug, Deserialize)]
pub struct SensorIdQuery {
    pub sensor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyticsQuery {
    /// Narrows the detailed per-reading series only; the summary always
    /// spans all devices. `"all"` is equivalent to absent.
    pub sensor_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Body for `POST /devices`. Fields are optional so that absence surfaces as
/// a 400 validation error rather than a body-rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDeviceRequest {
    pub sensor_id: Option<String>,
    pub name: Option<String>,
    pub location: Option<String>,
}

/// Body for `PUT /devices?sensor_id=X`. Absent fields are left unchanged.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDeviceRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub status: Option<DeviceStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegeneratePredictionRequest {
    pub hours_ahead: Option<u32>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

/// The latest reading for a sensor, with registry metadata merged in when
/// the device is known.
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentReadingDto {
    pub sensor_id: String,
    pub recorded_at: DateTime<Utc>,
    pub aqi_calculated: f64,
    pub co2_ppm: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub battery: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl CurrentReadingDto {
    pub fn from_reading(
        r: SensorReading,
        meta: Option<(String, String)>,
    ) -> Self {
        let (name, location) = match meta {
            Some((name, location)) => (Some(name), Some(location)),
            None => (None, None),
        };
        Self {
            sensor_id: r.sensor_id,
            recorded_at: r.recorded_at,
            aqi_calculated: r.aqi_calculated,
            co2_ppm: r.co2_ppm,
            temperature: r.temperature,
            humidity: r.humidity,
            battery: r.battery,
            name,
            location,
        }
    }
}

/// `GET /sensors/{id}`: current reading plus the trailing-24 h history.
#[derive(Debug, Serialize, ToSchema)]
pub struct SensorDetailResponse {
    pub current: CurrentReadingDto,
    pub historical: Vec<SensorReading>,
}

/// One point of the detailed per-reading chart series.
#[derive(Debug, Serialize, ToSchema)]
pub struct SensorDataPoint {
    pub time: DateTime<Utc>,
    /// CO2 concentration; named `gas_ppm` on the wire for the charts.
    pub gas_ppm: f64,
    pub temperature: f64,
    pub humidity: f64,
}

impl From<SensorReading> for SensorDataPoint {
    fn from(r: SensorReading) -> Self {
        Self {
            time: r.recorded_at,
            gas_ppm: r.co2_ppm,
            temperature: r.temperature,
            humidity: r.humidity,
        }
    }
}

/// `GET /analytics`: every derived view in one payload.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyticsResponse {
    pub summary: AnalyticsSummary,
    pub aqi_trend: Vec<TrendPoint>,
    pub sensor_data: Vec<SensorDataPoint>,
    pub insight: Insight,
}

/// A forecast document: either the latest stored record or a freshly
/// generated upstream response, normalized to one shape.
#[derive(Debug, Serialize, ToSchema)]
pub struct PredictionDto {
    pub sensor_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_time: Option<String>,
    pub predictions: Vec<PredictionPoint>,
}

impl From<PredictionRecord> for PredictionDto {
    fn from(r: PredictionRecord) -> Self {
        Self {
            sensor_id: r.sensor_id,
            generated_at: Some(r.generated_at),
            current_time: None,
            predictions: r.predictions.0,
        }
    }
}

impl From<PredictionResponse> for PredictionDto {
    fn from(r: PredictionResponse) -> Self {
        Self {
            sensor_id: r.sensor_id,
            generated_at: None,
            current_time: r.current_time,
            predictions: r.predictions,
        }
    }
}
