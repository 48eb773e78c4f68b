use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use utoipa::OpenApi;

use super::{
    auth::{admin_token, RequireAdmin},
    dto::{
        AnalyticsQuery, AnalyticsResponse, CreateDeviceRequest, CurrentReadingDto,
        DeviceListQuery, LoginRequest, LoginResponse, MessageResponse, PredictionDto,
        RegeneratePredictionRequest, SensorDataPoint, SensorDetailResponse, SensorIdQuery,
        UpdateDeviceRequest, UserInfo,
    },
    errors::{is_unique_violation, ApiError},
    AppState,
};
use crate::{
    airphynet::{self, models::PredictionPoint},
    analytics::{self, EnrichedDevice, StatusFilter},
    db::models::{Device, PredictionRecord, SensorReading, SettingsConfig},
};

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

const READING_COLUMNS: &str =
    "id, sensor_id, recorded_at, aqi_calculated, co2_ppm, temperature, humidity, battery";

/// List registry devices enriched with their latest reading and the derived
/// online/offline badge, optionally filtered.
#[utoipa::path(
    get,
    path = "/devices",
    params(
        ("search" = Option<String>, Query, description = "Substring match on name, location, or id"),
        ("status" = Option<StatusFilter>, Query, description = "Liveness filter"),
    ),
    responses(
        (status = 200, description = "Enriched devices in registry order", body = Vec<EnrichedDevice>),
        (status = 500, description = "Store unavailable"),
    ),
    tag = "devices"
)]
pub async fn list_devices(
    State(state): State<AppState>,
    Query(query): Query<DeviceListQuery>,
) -> Result<Json<Vec<EnrichedDevice>>, ApiError> {
    let devices = sqlx::query_as::<_, Device>(
        "SELECT id, sensor_id, name, location, status, installed_date \
         FROM devices ORDER BY installed_date, sensor_id",
    )
    .fetch_all(&state.pool)
    .await?;

    let latest = sqlx::query_as::<_, SensorReading>(&format!(
        "SELECT DISTINCT ON (sensor_id) {READING_COLUMNS} \
         FROM sensor_readings ORDER BY sensor_id, recorded_at DESC"
    ))
    .fetch_all(&state.pool)
    .await?;

    let enriched = analytics::enrich_devices(devices, &latest, Utc::now());
    let filtered = analytics::filter_devices(
        enriched,
        query.search.as_deref(),
        query.status.unwrap_or_default(),
    );
    Ok(Json(filtered))
}

/// Register a new device. The reading log needs no provisioning; readings
/// for the new `sensor_id` are picked up as they arrive.
#[utoipa::path(
    post,
    path = "/devices",
    request_body = CreateDeviceRequest,
    responses(
        (status = 201, description = "Device created", body = Device),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 409, description = "Duplicate sensor_id"),
    ),
    tag = "devices"
)]
pub async fn create_device(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateDeviceRequest>,
) -> Result<(StatusCode, Json<Device>), ApiError> {
    let (sensor_id, name, location) = match (body.sensor_id, body.name, body.location) {
        (Some(s), Some(n), Some(l)) if !s.is_empty() && !n.is_empty() && !l.is_empty() => {
            (s, n, l)
        }
        _ => return Err(ApiError::Validation("Missing required fields".into())),
    };

    let created = sqlx::query_as::<_, Device>(
        "INSERT INTO devices (sensor_id, name, location) VALUES ($1, $2, $3) \
         RETURNING id, sensor_id, name, location, status, installed_date",
    )
    .bind(&sensor_id)
    .bind(&name)
    .bind(&location)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict(format!("Device {sensor_id} already exists"))
        } else {
            ApiError::Store(e)
        }
    })?;

    tracing::info!(sensor_id = %created.sensor_id, "Device registered");
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update a device's name, location, or registry status.
#[utoipa::path(
    put,
    path = "/devices",
    params(("sensor_id" = String, Query, description = "Device to update")),
    request_body = UpdateDeviceRequest,
    responses(
        (status = 200, description = "Device updated", body = MessageResponse),
        (status = 400, description = "Missing sensor_id parameter"),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 404, description = "Device not found"),
    ),
    tag = "devices"
)]
pub async fn update_device(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<SensorIdQuery>,
    Json(body): Json<UpdateDeviceRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let sensor_id = query
        .sensor_id
        .ok_or_else(|| ApiError::Validation("sensor_id query parameter is required".into()))?;

    let result = sqlx::query(
        "UPDATE devices SET \
            name = COALESCE($2, name), \
            location = COALESCE($3, location), \
            status = COALESCE($4, status) \
         WHERE sensor_id = $1",
    )
    .bind(&sensor_id)
    .bind(body.name)
    .bind(body.location)
    .bind(body.status)
    .execute(&state.pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Device not found".into()));
    }
    Ok(Json(MessageResponse::new("Device updated successfully")))
}

/// Remove a device from the registry. Its readings stay in the log.
#[utoipa::path(
    delete,
    path = "/devices",
    params(("sensor_id" = String, Query, description = "Device to delete")),
    responses(
        (status = 200, description = "Device deleted", body = MessageResponse),
        (status = 400, description = "Missing sensor_id parameter"),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 404, description = "Device not found"),
    ),
    tag = "devices"
)]
pub async fn delete_device(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<SensorIdQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    let sensor_id = query
        .sensor_id
        .ok_or_else(|| ApiError::Validation("sensor_id query parameter is required".into()))?;

    let result = sqlx::query("DELETE FROM devices WHERE sensor_id = $1")
        .bind(&sensor_id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Device not found".into()));
    }
    tracing::info!(sensor_id = %sensor_id, "Device deleted");
    Ok(Json(MessageResponse::new("Device deleted successfully")))
}

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// Current reading (with registry metadata merged in) plus the trailing-24 h
/// history for one sensor.
#[utoipa::path(
    get,
    path = "/sensors/{sensor_id}",
    params(("sensor_id" = String, Path, description = "Sensor to inspect")),
    responses(
        (status = 200, description = "Current and historical readings", body = SensorDetailResponse),
        (status = 404, description = "No data for this sensor"),
    ),
    tag = "sensors"
)]
pub async fn get_sensor(
    State(state): State<AppState>,
    Path(sensor_id): Path<String>,
) -> Result<Json<SensorDetailResponse>, ApiError> {
    let current = sqlx::query_as::<_, SensorReading>(&format!(
        "SELECT {READING_COLUMNS} FROM sensor_readings \
         WHERE sensor_id = $1 ORDER BY recorded_at DESC LIMIT 1"
    ))
    .bind(&sensor_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| ApiError::NotFound("No data found for this sensor".into()))?;

    let meta = sqlx::query_as::<_, (String, String)>(
        "SELECT name, location FROM devices WHERE sensor_id = $1",
    )
    .bind(&sensor_id)
    .fetch_optional(&state.pool)
    .await?;

    let day_ago = Utc::now() - Duration::hours(24);
    let historical = sqlx::query_as::<_, SensorReading>(&format!(
        "SELECT {READING_COLUMNS} FROM sensor_readings \
         WHERE sensor_id = $1 AND recorded_at >= $2 \
         ORDER BY recorded_at ASC LIMIT 100"
    ))
    .bind(&sensor_id)
    .bind(day_ago)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(SensorDetailResponse {
        current: CurrentReadingDto::from_reading(current, meta),
        historical,
    }))
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

/// Latest stored forecast for a sensor; when none exists, one is requested
/// from the inference service on the spot. Stored forecasts are never
/// invalidated here; regeneration is an explicit POST.
#[utoipa::path(
    get,
    path = "/predictions/{sensor_id}",
    params(("sensor_id" = String, Path, description = "Sensor to forecast")),
    responses(
        (status = 200, description = "Forecast document", body = PredictionDto),
        (status = 404, description = "No predictions available"),
    ),
    tag = "predictions"
)]
pub async fn get_predictions(
    State(state): State<AppState>,
    Path(sensor_id): Path<String>,
) -> Result<Json<PredictionDto>, ApiError> {
    let stored = sqlx::query_as::<_, PredictionRecord>(
        "SELECT id, sensor_id, generated_at, predictions FROM predictions \
         WHERE sensor_id = $1 ORDER BY generated_at DESC LIMIT 1",
    )
    .bind(&sensor_id)
    .fetch_optional(&state.pool)
    .await?;

    if let Some(record) = stored {
        return Ok(Json(record.into()));
    }

    match state
        .airphynet
        .generate(&sensor_id, airphynet::DEFAULT_HORIZON_HOURS)
        .await
    {
        Ok(resp) => Ok(Json(resp.into())),
        Err(e) => {
            tracing::warn!(sensor_id = %sensor_id, error = %e, "Forecast unavailable");
            Err(ApiError::NotFound("No predictions available".into()))
        }
    }
}

/// Force a fresh forecast, bypassing any stored one.
#[utoipa::path(
    post,
    path = "/predictions/{sensor_id}",
    params(("sensor_id" = String, Path, description = "Sensor to forecast")),
    request_body = RegeneratePredictionRequest,
    responses(
        (status = 200, description = "Freshly generated forecast", body = PredictionDto),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 500, description = "Prediction service unreachable or misconfigured"),
    ),
    tag = "predictions"
)]
pub async fn regenerate_predictions(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(sensor_id): Path<String>,
    Json(body): Json<RegeneratePredictionRequest>,
) -> Result<Json<PredictionDto>, ApiError> {
    let hours = body.hours_ahead.unwrap_or(airphynet::DEFAULT_HORIZON_HOURS);
    let resp = state
        .airphynet
        .generate(&sensor_id, hours)
        .await
        .map_err(ApiError::Upstream)?;
    Ok(Json(resp.into()))
}

// ---------------------------------------------------------------------------
// Analytics
// ---------------------------------------------------------------------------

/// All derived views in one payload: 24 h summary, hourly trend,
/// day-over-day insight, and the detailed per-reading series for charts.
///
/// Everything is recomputed from the reading log on every call; there is no
/// materialized aggregate state to go stale.
#[utoipa::path(
    get,
    path = "/analytics",
    params(
        ("sensor_id" = Option<String>, Query,
         description = "Narrows the detailed series only; summary spans all devices"),
    ),
    responses(
        (status = 200, description = "Summary, trend, detail series, and insight", body = AnalyticsResponse),
        (status = 500, description = "Store unavailable"),
    ),
    tag = "analytics"
)]
pub async fn get_analytics(
    State(state): State<AppState>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<AnalyticsResponse>, ApiError> {
    let now = Utc::now();

    // One bounded fetch covers summary (24 h + 10 min), trend (24 h), and
    // both insight windows (48 h).
    let two_days_ago = now - Duration::hours(48);
    let readings = sqlx::query_as::<_, SensorReading>(&format!(
        "SELECT {READING_COLUMNS} FROM sensor_readings \
         WHERE recorded_at >= $1 ORDER BY recorded_at ASC"
    ))
    .bind(two_days_ago)
    .fetch_all(&state.pool)
    .await?;

    let detail = match query.sensor_id.as_deref().filter(|id| *id != "all") {
        Some(id) => {
            sqlx::query_as::<_, SensorReading>(&format!(
                "SELECT {READING_COLUMNS} FROM sensor_readings \
                 WHERE sensor_id = $1 ORDER BY recorded_at DESC LIMIT 20"
            ))
            .bind(id)
            .fetch_all(&state.pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, SensorReading>(&format!(
                "SELECT {READING_COLUMNS} FROM sensor_readings \
                 ORDER BY recorded_at DESC LIMIT 20"
            ))
            .fetch_all(&state.pool)
            .await?
        }
    };
    // Fetched newest-first; charts want oldest-first.
    let mut sensor_data: Vec<SensorDataPoint> = detail.into_iter().map(Into::into).collect();
    sensor_data.reverse();

    Ok(Json(AnalyticsResponse {
        summary: analytics::summary(&readings, now),
        aqi_trend: analytics::trend(&readings, now, state.trend_tz),
        sensor_data,
        insight: analytics::insight(&readings, now),
    }))
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// The stored global configuration, or the documented defaults when nothing
/// has been saved yet.
#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Global configuration", body = SettingsConfig),
        (status = 500, description = "Store unavailable"),
    ),
    tag = "settings"
)]
pub async fn get_settings(
    State(state): State<AppState>,
) -> Result<Json<SettingsConfig>, ApiError> {
    let stored = sqlx::query_scalar::<_, sqlx::types::Json<SettingsConfig>>(
        "SELECT config FROM system_settings WHERE kind = 'global'",
    )
    .fetch_optional(&state.pool)
    .await?;

    Ok(Json(stored.map(|j| j.0).unwrap_or_default()))
}

/// Upsert the global configuration as one document.
#[utoipa::path(
    post,
    path = "/settings",
    request_body = SettingsConfig,
    responses(
        (status = 200, description = "Settings saved", body = MessageResponse),
        (status = 401, description = "Missing or invalid admin token"),
        (status = 500, description = "Store unavailable"),
    ),
    tag = "settings"
)]
pub async fn save_settings(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Json(config): Json<SettingsConfig>,
) -> Result<Json<MessageResponse>, ApiError> {
    sqlx::query(
        "INSERT INTO system_settings (kind, config, updated_at) \
         VALUES ('global', $1, now()) \
         ON CONFLICT (kind) DO UPDATE SET config = EXCLUDED.config, updated_at = now()",
    )
    .bind(sqlx::types::Json(config))
    .execute(&state.pool)
    .await?;

    Ok(Json(MessageResponse::new("Settings saved successfully")))
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Exchange the shared admin secret for the bearer token gating admin
/// writes.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if body.password != state.config.admin_password {
        return Err(ApiError::Unauthorized);
    }
    Ok(Json(LoginResponse {
        success: true,
        token: admin_token(&state.config.admin_password),
        user: UserInfo {
            name: "Admin".to_owned(),
            role: "admin".to_owned(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Returns `200 OK` with `{"status":"ok"}` when the server is running.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is healthy")),
    tag = "system"
)]
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// OpenAPI spec
// ---------------------------------------------------------------------------

#[derive(OpenApi)]
#[openapi(
    paths(
        list_devices,
        create_device,
        update_device,
        delete_device,
        get_sensor,
        get_predictions,
        regenerate_predictions,
        get_analytics,
        get_settings,
        save_settings,
        login,
        health,
    ),
    components(schemas(
        Device,
        crate::db::models::DeviceStatus,
        SensorReading,
        EnrichedDevice,
        analytics::Liveness,
        analytics::StatusFilter,
        analytics::AnalyticsSummary,
        analytics::TrendPoint,
        analytics::TrendDirection,
        analytics::Insight,
        AnalyticsResponse,
        SensorDataPoint,
        SensorDetailResponse,
        CurrentReadingDto,
        PredictionDto,
        PredictionPoint,
        CreateDeviceRequest,
        UpdateDeviceRequest,
        RegeneratePredictionRequest,
        LoginRequest,
        LoginResponse,
        UserInfo,
        MessageResponse,
        SettingsConfig,
        crate::db::models::AqiThresholds,
        crate::db::models::MqttSettings,
        crate::db::models::NotificationSettings,
    )),
    tags(
        (name = "devices", description = "Device registry and enrichment"),
        (name = "sensors", description = "Sensor reading endpoints"),
        (name = "predictions", description = "Forecast endpoints"),
        (name = "analytics", description = "Aggregated views"),
        (name = "settings", description = "Global configuration"),
        (name = "auth", description = "Admin authentication"),
        (name = "system", description = "System endpoints"),
    ),
    info(
        title = "Atmo Service API",
        version = "0.1.0",
        description = "REST API for indoor air-quality monitoring"
    )
)]
pub struct ApiDoc;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
