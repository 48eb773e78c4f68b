pub mod models;

use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use tracing::{debug, info};

use crate::config::Config;

use self::models::{PredictionRequest, PredictionResponse};

/// Default forecast horizon, in hourly steps.
pub const DEFAULT_HORIZON_HOURS: u32 = 6;

/// HTTP client for the AirPhyNet inference service.
///
/// Thin boundary: one synchronous call per request, a hard timeout so an
/// unreachable upstream can never stall the caller, no retries, and no
/// caching. The upstream persists its own output; this client never writes
/// the predictions table.
#[derive(Debug, Clone)]
pub struct AirphynetClient {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    http: Client,
    /// `None` when AIRPHYNET_API_URL is unset; every call then fails fast
    /// without touching the network.
    base_url: Option<String>,
    api_key: Option<String>,
}

impl AirphynetClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.prediction_timeout_secs))
            .build()
            .context("failed to build prediction HTTP client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url: config.airphynet_api_url.clone(),
                api_key: config.airphynet_api_key.clone(),
            }),
        })
    }

    /// Request a fresh forecast for `sensor_id` over `hours_ahead` hourly
    /// steps, validating the response at the boundary and otherwise
    /// forwarding it unmodified.
    pub async fn generate(
        &self,
        sensor_id: &str,
        hours_ahead: u32,
    ) -> Result<PredictionResponse> {
        let base = self
            .inner
            .base_url
            .as_deref()
            .ok_or_else(|| anyhow!("AIRPHYNET_API_URL is not set"))?;
        let url = format!("{base}/predict");
        debug!(sensor_id = %sensor_id, hours_ahead, url = %url, "Requesting forecast");

        let mut request = self.inner.http.post(&url).json(&PredictionRequest {
            sensor_id,
            hours_ahead,
        });
        if let Some(key) = &self.inner.api_key {
            request = request.header("x-api-key", key);
        }

        let resp = request
            .send()
            .await
            .context("prediction request failed")?
            .error_for_status()
            .context("prediction service returned error status")?
            .json::<PredictionResponse>()
            .await
            .context("failed to deserialize prediction response")?;

        info!(
            sensor_id = %sensor_id,
            steps = resp.predictions.len(),
            "Forecast generated"
        );
        Ok(resp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: Option<&str>) -> Config {
        Config {
            database_url: "postgres://localhost/atmo".to_owned(),
            server_host: "0.0.0.0".to_owned(),
            server_port: 8080,
            admin_password: "admin123".to_owned(),
            airphynet_api_url: url.map(str::to_owned),
            airphynet_api_key: None,
            prediction_timeout_secs: 10,
            trend_utc_offset_minutes: 0,
        }
    }

    #[tokio::test]
    async fn unconfigured_client_fails_fast_without_network() {
        let client = AirphynetClient::new(&config(None)).unwrap();
        let err = client.generate("ESP32_A101", 6).await.unwrap_err();
        assert!(err.to_string().contains("AIRPHYNET_API_URL"));
    }

    #[test]
    fn client_builds_with_configured_url() {
        let client = AirphynetClient::new(&config(Some("http://airphynet:8000"))).unwrap();
        // Clones share the same inner client.
        let _clone = client.clone();
    }
}
