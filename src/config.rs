use anyhow::{Context, Result};
use chrono::FixedOffset;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    /// Shared admin secret. The login endpoint exchanges it for the bearer
    /// token that gates every registry/settings write.
    pub admin_password: String,
    /// Base URL of the AirPhyNet inference service. `None` means predictions
    /// are unavailable and the client fails fast without a network call.
    pub airphynet_api_url: Option<String>,
    /// Static `x-api-key` value sent to the inference service, if it
    /// requires one.
    pub airphynet_api_key: Option<String>,
    /// Hard timeout on outbound prediction calls, in seconds.
    pub prediction_timeout_secs: u64,
    /// Timezone used for hourly trend bucketing, as an offset from UTC in
    /// minutes. Defaults to 0 (UTC).
    pub trend_utc_offset_minutes: i32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_host: optional("SERVER_HOST", "0.0.0.0"),
            server_port: optional("SERVER_PORT", "8080")
                .parse()
                .context("SERVER_PORT must be a valid port number")?,
            admin_password: optional("ADMIN_PASSWORD", "admin123"),
            airphynet_api_url: std::env::var("AIRPHYNET_API_URL").ok(),
            airphynet_api_key: std::env::var("AIRPHYNET_API_KEY").ok(),
            prediction_timeout_secs: optional("PREDICTION_TIMEOUT_SECS", "10")
                .parse()
                .context("PREDICTION_TIMEOUT_SECS must be a positive integer")?,
            trend_utc_offset_minutes: optional("TREND_UTC_OFFSET_MINUTES", "0")
                .parse()
                .context("TREND_UTC_OFFSET_MINUTES must be an integer")?,
        })
    }

    /// The trend bucketing timezone as a chrono offset.
    ///
    /// Errors if the configured offset is outside ±24 h.
    pub fn trend_timezone(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.trend_utc_offset_minutes * 60).with_context(|| {
            format!(
                "TREND_UTC_OFFSET_MINUTES out of range: {}",
                self.trend_utc_offset_minutes
            )
        })
    }
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("missing required env var: {key}"))
}

fn optional(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            database_url: "postgres://localhost/atmo".to_owned(),
            server_host: "0.0.0.0".to_owned(),
            server_port: 8080,
            admin_password: "admin123".to_owned(),
            airphynet_api_url: None,
            airphynet_api_key: None,
            prediction_timeout_secs: 10,
            trend_utc_offset_minutes: 0,
        }
    }

    #[test]
    fn trend_timezone_defaults_to_utc() {
        let tz = base_config().trend_timezone().unwrap();
        assert_eq!(tz.local_minus_utc(), 0);
    }

    #[test]
    fn trend_timezone_accepts_positive_offset() {
        let mut config = base_config();
        config.trend_utc_offset_minutes = 7 * 60; // UTC+7
        let tz = config.trend_timezone().unwrap();
        assert_eq!(tz.local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn trend_timezone_accepts_negative_offset() {
        let mut config = base_config();
        config.trend_utc_offset_minutes = -5 * 60; // UTC-5
        let tz = config.trend_timezone().unwrap();
        assert_eq!(tz.local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn trend_timezone_rejects_out_of_range_offset() {
        let mut config = base_config();
        config.trend_utc_offset_minutes = 30 * 60;
        assert!(config.trend_timezone().is_err());
    }
}
