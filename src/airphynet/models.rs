use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// Wire types for the AirPhyNet inference service
//
// POST {base}/predict
//   Request:  { "sensor_id": "...", "hours_ahead": 6 }
//   Response: { "sensor_id": "...", "current_time": "...",
//               "predictions": [ { "hour": 1, "predicted_time": "...",
//                                  "predicted_co2": 812.4,
//                                  "confidence": 0.85 }, ... ] }
//
// The same per-step objects appear inside the JSONB `predictions` column the
// service writes to the shared database.
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct PredictionRequest<'a> {
    pub sensor_id: &'a str,
    pub hours_ahead: u32,
}

/// One forecast step.
///
/// `predicted_time` is kept as the upstream's own timestamp string: the
/// service emits bare `isoformat()` values without a UTC offset, and the
/// payload is forwarded unmodified rather than reinterpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PredictionPoint {
    /// 1-based step index within the forecast horizon.
    pub hour: Option<i32>,
    pub predicted_time: String,
    pub predicted_co2: f64,
    /// Model confidence in [0, 1].
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PredictionResponse {
    pub sensor_id: String,
    pub current_time: Option<String>,
    pub predictions: Vec<PredictionPoint>,
}
