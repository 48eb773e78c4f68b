//! Aggregation engine: summary, trend, insight, and device-liveness views
//! derived from the sensor log.
//!
//! Every function here is a pure computation over rows the caller has already
//! fetched, with `now` passed in explicitly. Handlers fetch a bounded window
//! (at most 48 h of readings, plus one latest-reading row per device) and
//! delegate; nothing is cached or materialized, so results are always exact
//! as of query time.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::{Device, SensorReading};

/// Window for the summary's `active_devices` count: a device is *active* if
/// it reported within the last 10 minutes.
///
/// Deliberately distinct from [`ONLINE_WINDOW_MINUTES`]; the two thresholds
/// serve different views and are kept separate.
pub const ACTIVE_WINDOW_MINUTES: i64 = 10;

/// Window for the per-device online/offline badge: a device is *online* if
/// its most recent reading is strictly less than 5 minutes old. A reading
/// aged exactly 5 minutes is offline.
pub const ONLINE_WINDOW_MINUTES: i64 = 5;

/// Hour-bucket key format used by the trend series.
const HOUR_BUCKET_FORMAT: &str = "%Y-%m-%dT%H:00:00";

// ---------------------------------------------------------------------------
// Derived view types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AnalyticsSummary {
    /// Mean AQI over the trailing 24 h, rounded to the nearest integer.
    pub avg_aqi: i64,
    pub max_aqi: f64,
    pub min_aqi: f64,
    /// Distinct devices that reported within [`ACTIVE_WINDOW_MINUTES`].
    pub active_devices: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TrendPoint {
    /// Hour bucket in the configured bucketing timezone,
    /// e.g. `2026-08-08T14:00:00`.
    pub time: String,
    pub aqi: i64,
    pub co2: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Insight {
    pub message: String,
    pub trend: TrendDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Liveness {
    Online,
    Offline,
}

/// A registry device joined with its most recent reading.
///
/// Left-outer semantics: a device that has never reported still appears,
/// with `last_seen = None` and `latest_aqi = 0`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EnrichedDevice {
    pub sensor_id: String,
    pub name: String,
    pub location: String,
    pub status: Liveness,
    pub last_seen: Option<DateTime<Utc>>,
    pub latest_aqi: f64,
    pub battery: Option<f64>,
    pub installed_date: DateTime<Utc>,
}

/// Liveness filter for the device list. AND-combined with the search term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Online,
    Offline,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Summary statistics over the trailing 24 h window, plus the active-device
/// count over the trailing 10 minute window.
///
/// An empty window yields all zeros; absence of data is a valid state, not
/// an error.
pub fn summary(readings: &[SensorReading], now: DateTime<Utc>) -> AnalyticsSummary {
    let day_ago = now - Duration::hours(24);
    let active_cutoff = now - Duration::minutes(ACTIVE_WINDOW_MINUTES);

    let active_devices = readings
        .iter()
        .filter(|r| r.recorded_at >= active_cutoff)
        .map(|r| r.sensor_id.as_str())
        .collect::<HashSet<_>>()
        .len() as i64;

    let mut sum = 0.0;
    let mut count = 0u64;
    let mut max_aqi = f64::MIN;
    let mut min_aqi = f64::MAX;
    for r in readings.iter().filter(|r| r.recorded_at >= day_ago) {
        sum += r.aqi_calculated;
        count += 1;
        max_aqi = max_aqi.max(r.aqi_calculated);
        min_aqi = min_aqi.min(r.aqi_calculated);
    }

    if count == 0 {
        return AnalyticsSummary {
            avg_aqi: 0,
            max_aqi: 0.0,
            min_aqi: 0.0,
            active_devices,
        };
    }

    AnalyticsSummary {
        avg_aqi: (sum / count as f64).round() as i64,
        max_aqi,
        min_aqi,
        active_devices,
    }
}

// ---------------------------------------------------------------------------
// Trend
// ---------------------------------------------------------------------------

/// Hourly trend over the trailing 24 h: per-bucket average AQI and CO2,
/// rounded to integers, ascending by bucket.
///
/// Buckets are hour truncations of `recorded_at` in `tz` (UTC unless
/// configured otherwise). Hours without readings are simply absent; gaps
/// are not filled.
pub fn trend(
    readings: &[SensorReading],
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> Vec<TrendPoint> {
    let day_ago = now - Duration::hours(24);

    // BTreeMap keyed by the formatted bucket gives dedup and ascending
    // order for free; the format sorts lexicographically as chronologically.
    let mut buckets: BTreeMap<String, (f64, f64, u64)> = BTreeMap::new();
    for r in readings.iter().filter(|r| r.recorded_at >= day_ago) {
        let key = r
            .recorded_at
            .with_timezone(&tz)
            .format(HOUR_BUCKET_FORMAT)
            .to_string();
        let entry = buckets.entry(key).or_insert((0.0, 0.0, 0));
        entry.0 += r.aqi_calculated;
        entry.1 += r.co2_ppm;
        entry.2 += 1;
    }

    buckets
        .into_iter()
        .map(|(time, (aqi_sum, co2_sum, n))| TrendPoint {
            time,
            aqi: (aqi_sum / n as f64).round() as i64,
            co2: (co2_sum / n as f64).round() as i64,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Insight
// ---------------------------------------------------------------------------

/// Day-over-day comparison: mean AQI over `[now-24h, now)` against
/// `[now-48h, now-24h)`.
///
/// A previous-window average of zero (no data, or all-zero readings) defines
/// the percent change as zero rather than dividing by it; an exact zero
/// change reads as stable either way.
pub fn insight(readings: &[SensorReading], now: DateTime<Utc>) -> Insight {
    let day_ago = now - Duration::hours(24);
    let two_days_ago = now - Duration::hours(48);

    let current = mean_aqi(
        readings
            .iter()
            .filter(|r| r.recorded_at >= day_ago && r.recorded_at < now),
    );
    let previous = mean_aqi(
        readings
            .iter()
            .filter(|r| r.recorded_at >= two_days_ago && r.recorded_at < day_ago),
    );

    let diff_percent = if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    };

    let message = if diff_percent == 0.0 {
        "Air quality is stable compared to yesterday.".to_owned()
    } else {
        let verb = if diff_percent < 0.0 { "improved" } else { "worsened" };
        format!(
            "Average AQI has {} by {}% since yesterday.",
            verb,
            diff_percent.abs().round() as i64
        )
    };

    Insight {
        message,
        trend: if diff_percent <= 0.0 {
            TrendDirection::Good
        } else {
            TrendDirection::Bad
        },
    }
}

fn mean_aqi<'a>(readings: impl Iterator<Item = &'a SensorReading>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0u64;
    for r in readings {
        sum += r.aqi_calculated;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// ---------------------------------------------------------------------------
// Device enrichment
// ---------------------------------------------------------------------------

/// Join each registry device with its most recent reading and derive the
/// liveness badge.
///
/// `latest` is expected to hold at most one reading per `sensor_id` (the
/// `DISTINCT ON` query result); extra rows for the same sensor are ignored
/// beyond the first. Input order of `devices` is preserved.
pub fn enrich_devices(
    devices: Vec<Device>,
    latest: &[SensorReading],
    now: DateTime<Utc>,
) -> Vec<EnrichedDevice> {
    let mut latest_by_sensor: HashMap<&str, &SensorReading> = HashMap::new();
    for r in latest {
        latest_by_sensor.entry(r.sensor_id.as_str()).or_insert(r);
    }

    let online_window = Duration::minutes(ONLINE_WINDOW_MINUTES);

    devices
        .into_iter()
        .map(|d| {
            let reading = latest_by_sensor.get(d.sensor_id.as_str());
            let last_seen = reading.map(|r| r.recorded_at);
            let status = match last_seen {
                // Strict: exactly 5 minutes old is offline.
                Some(seen) if now - seen < online_window => Liveness::Online,
                _ => Liveness::Offline,
            };
            EnrichedDevice {
                sensor_id: d.sensor_id,
                name: d.name,
                location: d.location,
                status,
                last_seen,
                latest_aqi: reading.map(|r| r.aqi_calculated).unwrap_or(0.0),
                battery: reading.and_then(|r| r.battery),
                installed_date: d.installed_date,
            }
        })
        .collect()
}

/// Apply the device-list filters: case-insensitive substring search against
/// name, location, and sensor id (OR), then the liveness filter (AND).
/// Order is preserved; identical inputs yield identical output.
pub fn filter_devices(
    devices: Vec<EnrichedDevice>,
    search: Option<&str>,
    status: StatusFilter,
) -> Vec<EnrichedDevice> {
    let needle = search.map(str::to_lowercase);
    devices
        .into_iter()
        .filter(|d| match &needle {
            Some(n) => {
                d.name.to_lowercase().contains(n)
                    || d.location.to_lowercase().contains(n)
                    || d.sensor_id.to_lowercase().contains(n)
            }
            None => true,
        })
        .filter(|d| match status {
            StatusFilter::All => true,
            StatusFilter::Online => d.status == Liveness::Online,
            StatusFilter::Offline => d.status == Liveness::Offline,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use uuid::Uuid;

    use super::*;
    use crate::db::models::DeviceStatus;

    fn at(now: DateTime<Utc>, minutes_ago: i64) -> DateTime<Utc> {
        now - Duration::minutes(minutes_ago)
    }

    fn reading(sensor_id: &str, recorded_at: DateTime<Utc>, aqi: f64, co2: f64) -> SensorReading {
        SensorReading {
            id: Uuid::new_v4(),
            sensor_id: sensor_id.to_owned(),
            recorded_at,
            aqi_calculated: aqi,
            co2_ppm: co2,
            temperature: 22.5,
            humidity: 45.0,
            battery: Some(87.0),
        }
    }

    fn device(sensor_id: &str, name: &str, location: &str) -> Device {
        Device {
            id: Uuid::new_v4(),
            sensor_id: sensor_id.to_owned(),
            name: name.to_owned(),
            location: location.to_owned(),
            status: DeviceStatus::Active,
            installed_date: Utc.with_ymd_and_hms(2026, 1, 15, 9, 0, 0).unwrap(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 8, 12, 30, 0).unwrap()
    }

    // -----------------------------------------------------------------------
    // summary
    // -----------------------------------------------------------------------

    #[test]
    fn summary_of_empty_window_is_all_zeros() {
        let s = summary(&[], now());
        assert_eq!(
            s,
            AnalyticsSummary {
                avg_aqi: 0,
                max_aqi: 0.0,
                min_aqi: 0.0,
                active_devices: 0
            }
        );
    }

    #[test]
    fn summary_mean_is_bounded_by_extremes() {
        let now = now();
        let readings = vec![
            reading("s1", at(now, 30), 42.0, 600.0),
            reading("s1", at(now, 60), 180.0, 900.0),
            reading("s2", at(now, 90), 75.5, 700.0),
        ];
        let s = summary(&readings, now);
        assert!(s.min_aqi <= s.avg_aqi as f64);
        assert!(s.avg_aqi as f64 <= s.max_aqi.ceil());
        assert_eq!(s.max_aqi, 180.0);
        assert_eq!(s.min_aqi, 42.0);
        // (42 + 180 + 75.5) / 3 = 99.1666… → 99
        assert_eq!(s.avg_aqi, 99);
    }

    #[test]
    fn summary_excludes_readings_older_than_24h() {
        let now = now();
        let readings = vec![
            reading("s1", at(now, 60), 50.0, 600.0),
            reading("s1", at(now, 25 * 60), 400.0, 2000.0),
        ];
        let s = summary(&readings, now);
        assert_eq!(s.max_aqi, 50.0);
        assert_eq!(s.avg_aqi, 50);
    }

    #[test]
    fn summary_counts_distinct_active_devices_in_ten_minute_window() {
        let now = now();
        let readings = vec![
            reading("s1", at(now, 2), 50.0, 600.0),
            reading("s1", at(now, 5), 55.0, 610.0),
            reading("s2", at(now, 9), 60.0, 620.0),
            // 11 minutes ago: inside 24 h stats, outside the active window
            reading("s3", at(now, 11), 70.0, 640.0),
        ];
        let s = summary(&readings, now);
        assert_eq!(s.active_devices, 2);
    }

    #[test]
    fn summary_active_count_is_independent_of_aqi_stats() {
        // A silent day still reports devices that pinged in the last minutes.
        let now = now();
        let readings = vec![reading("s1", at(now, 1), 33.0, 500.0)];
        let s = summary(&readings, now);
        assert_eq!(s.active_devices, 1);
        assert_eq!(s.avg_aqi, 33);
    }

    // -----------------------------------------------------------------------
    // trend
    // -----------------------------------------------------------------------

    #[test]
    fn trend_of_empty_window_is_empty() {
        assert!(trend(&[], now(), FixedOffset::east_opt(0).unwrap()).is_empty());
    }

    #[test]
    fn trend_buckets_are_unique_and_ascending() {
        let now = now();
        let utc = FixedOffset::east_opt(0).unwrap();
        let mut readings = Vec::new();
        // Three readings in one hour, two in another, out of order.
        readings.push(reading("s1", at(now, 10), 40.0, 600.0));
        readings.push(reading("s1", at(now, 130), 80.0, 800.0));
        readings.push(reading("s1", at(now, 20), 60.0, 650.0));
        readings.push(reading("s1", at(now, 140), 90.0, 820.0));
        readings.push(reading("s1", at(now, 15), 50.0, 640.0));

        let points = trend(&readings, now, utc);
        assert_eq!(points.len(), 2);
        let times: Vec<_> = points.iter().map(|p| p.time.as_str()).collect();
        let mut sorted = times.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(times, sorted);
    }

    #[test]
    fn trend_averages_are_rounded_per_bucket() {
        let now = Utc.with_ymd_and_hms(2026, 8, 8, 12, 50, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let readings = vec![
            reading("s1", at(now, 5), 41.0, 601.0),
            reading("s1", at(now, 10), 42.0, 602.0),
        ];
        let points = trend(&readings, now, utc);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].time, "2026-08-08T12:00:00");
        // (41+42)/2 = 41.5 → 42, (601+602)/2 = 601.5 → 602
        assert_eq!(points[0].aqi, 42);
        assert_eq!(points[0].co2, 602);
    }

    #[test]
    fn trend_respects_bucketing_timezone() {
        let now = Utc.with_ymd_and_hms(2026, 8, 8, 12, 30, 0).unwrap();
        let plus7 = FixedOffset::east_opt(7 * 3600).unwrap();
        let readings = vec![reading("s1", at(now, 10), 40.0, 600.0)];
        let points = trend(&readings, now, plus7);
        // 12:20 UTC is 19:20 at UTC+7.
        assert_eq!(points[0].time, "2026-08-08T19:00:00");
    }

    #[test]
    fn trend_hourly_ramp_has_one_bucket_per_populated_hour() {
        // 25 hourly readings spanning 25 hours, aqi ramping 10 → 250. The
        // oldest sits exactly on the 24 h boundary, which the window
        // includes, so every reading lands in its own bucket.
        let now = Utc.with_ymd_and_hms(2026, 8, 8, 12, 30, 0).unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        let readings: Vec<_> = (0..25)
            .map(|i| reading("S1", now - Duration::hours(i), 250.0 - i as f64 * 10.0, 800.0))
            .collect();

        let points = trend(&readings, now, utc);
        assert_eq!(points.len(), 25);
        assert!(points.windows(2).all(|w| w[0].time < w[1].time));

        let s = summary(&readings, now);
        assert_eq!(s.max_aqi, 250.0);
        assert_eq!(s.min_aqi, 10.0);
    }

    // -----------------------------------------------------------------------
    // insight
    // -----------------------------------------------------------------------

    fn day_with_constant_aqi(now: DateTime<Utc>, days_back: i64, aqi: f64) -> Vec<SensorReading> {
        // Four readings spread across the given trailing day.
        (0..4)
            .map(|i| {
                reading(
                    "s1",
                    now - Duration::hours(days_back * 24 + i * 6 + 1),
                    aqi,
                    700.0,
                )
            })
            .collect()
    }

    #[test]
    fn insight_with_no_data_at_all_is_stable_and_good() {
        let i = insight(&[], now());
        assert!(i.message.contains("stable"));
        assert_eq!(i.trend, TrendDirection::Good);
    }

    #[test]
    fn insight_zero_previous_and_zero_current_is_stable() {
        // Readings exist but every AQI is zero: the 0 == 0 path must read as
        // stable, not as an improvement or worsening claim.
        let now = now();
        let mut readings = day_with_constant_aqi(now, 0, 0.0);
        readings.extend(day_with_constant_aqi(now, 1, 0.0));
        let i = insight(&readings, now);
        assert!(i.message.contains("stable"));
        assert_eq!(i.trend, TrendDirection::Good);
    }

    #[test]
    fn insight_zero_previous_with_current_data_is_stable() {
        // No previous-day data: percent change is defined as 0.
        let now = now();
        let readings = day_with_constant_aqi(now, 0, 120.0);
        let i = insight(&readings, now);
        assert!(i.message.contains("stable"));
        assert_eq!(i.trend, TrendDirection::Good);
    }

    #[test]
    fn insight_improvement_reports_magnitude_and_good_trend() {
        let now = now();
        let mut readings = day_with_constant_aqi(now, 0, 80.0);
        readings.extend(day_with_constant_aqi(now, 1, 100.0));
        let i = insight(&readings, now);
        assert!(i.message.contains("improved"), "message: {}", i.message);
        assert!(i.message.contains("20"), "message: {}", i.message);
        assert_eq!(i.trend, TrendDirection::Good);
    }

    #[test]
    fn insight_worsening_reports_magnitude_and_bad_trend() {
        let now = now();
        let mut readings = day_with_constant_aqi(now, 0, 130.0);
        readings.extend(day_with_constant_aqi(now, 1, 100.0));
        let i = insight(&readings, now);
        assert!(i.message.contains("worsened"), "message: {}", i.message);
        assert!(i.message.contains("30"), "message: {}", i.message);
        assert_eq!(i.trend, TrendDirection::Bad);
    }

    #[test]
    fn insight_identical_days_are_stable() {
        let now = now();
        let mut readings = day_with_constant_aqi(now, 0, 100.0);
        readings.extend(day_with_constant_aqi(now, 1, 100.0));
        let i = insight(&readings, now);
        assert!(i.message.contains("stable"));
        assert_eq!(i.trend, TrendDirection::Good);
    }

    // -----------------------------------------------------------------------
    // enrich_devices
    // -----------------------------------------------------------------------

    #[test]
    fn device_seen_four_minutes_ago_is_online() {
        let now = now();
        let devices = vec![device("s1", "Meeting Room 1", "Floor 1")];
        let latest = vec![reading("s1", at(now, 4), 57.0, 640.0)];
        let enriched = enrich_devices(devices, &latest, now);
        assert_eq!(enriched[0].status, Liveness::Online);
        assert_eq!(enriched[0].latest_aqi, 57.0);
        assert_eq!(enriched[0].last_seen, Some(at(now, 4)));
    }

    #[test]
    fn device_seen_six_minutes_ago_is_offline() {
        let now = now();
        let devices = vec![device("s1", "Meeting Room 1", "Floor 1")];
        let latest = vec![reading("s1", at(now, 6), 57.0, 640.0)];
        let enriched = enrich_devices(devices, &latest, now);
        assert_eq!(enriched[0].status, Liveness::Offline);
    }

    #[test]
    fn device_seen_exactly_five_minutes_ago_is_offline() {
        // Boundary is exclusive: age < 5 min is online, age == 5 min is not.
        let now = now();
        let devices = vec![device("s1", "Meeting Room 1", "Floor 1")];
        let latest = vec![reading("s1", at(now, 5), 57.0, 640.0)];
        let enriched = enrich_devices(devices, &latest, now);
        assert_eq!(enriched[0].status, Liveness::Offline);
    }

    #[test]
    fn device_without_readings_is_kept_with_zero_defaults() {
        let now = now();
        let devices = vec![device("s1", "Meeting Room 1", "Floor 1")];
        let enriched = enrich_devices(devices, &[], now);
        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].status, Liveness::Offline);
        assert_eq!(enriched[0].last_seen, None);
        assert_eq!(enriched[0].latest_aqi, 0.0);
        assert_eq!(enriched[0].battery, None);
    }

    #[test]
    fn enrichment_preserves_device_order() {
        let now = now();
        let devices = vec![
            device("s2", "Office", "Floor 2"),
            device("s1", "Meeting Room 1", "Floor 1"),
        ];
        let latest = vec![reading("s1", at(now, 1), 40.0, 600.0)];
        let enriched = enrich_devices(devices, &latest, now);
        assert_eq!(enriched[0].sensor_id, "s2");
        assert_eq!(enriched[1].sensor_id, "s1");
    }

    // -----------------------------------------------------------------------
    // filter_devices
    // -----------------------------------------------------------------------

    fn enriched_fixture() -> Vec<EnrichedDevice> {
        let now = now();
        let devices = vec![
            device("ESP32_A101", "Meeting Room 1", "Floor 1, Room 101"),
            device("ESP32_A102", "Office Space", "Floor 2, Open Area"),
            device("ESP32_B201", "Server Room", "Basement"),
        ];
        let latest = vec![
            reading("ESP32_A101", at(now, 2), 45.0, 600.0),
            reading("ESP32_A102", at(now, 30), 90.0, 900.0),
        ];
        enrich_devices(devices, &latest, now)
    }

    #[test]
    fn search_matches_name_location_or_id_case_insensitively() {
        let all = enriched_fixture();

        let by_name = filter_devices(all.clone(), Some("meeting"), StatusFilter::All);
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].sensor_id, "ESP32_A101");

        let by_location = filter_devices(all.clone(), Some("basement"), StatusFilter::All);
        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].sensor_id, "ESP32_B201");

        let by_id = filter_devices(all.clone(), Some("esp32_a"), StatusFilter::All);
        assert_eq!(by_id.len(), 2);

        let no_match = filter_devices(all, Some("warehouse"), StatusFilter::All);
        assert!(no_match.is_empty());
    }

    #[test]
    fn status_filter_is_applied_after_enrichment_and_anded_with_search() {
        let all = enriched_fixture();

        let online = filter_devices(all.clone(), None, StatusFilter::Online);
        assert_eq!(online.len(), 1);
        assert_eq!(online[0].sensor_id, "ESP32_A101");

        let offline = filter_devices(all.clone(), None, StatusFilter::Offline);
        assert_eq!(offline.len(), 2);

        // "esp32" matches all three; offline AND search leaves two.
        let combined = filter_devices(all, Some("esp32"), StatusFilter::Offline);
        assert_eq!(combined.len(), 2);
        assert!(combined.iter().all(|d| d.status == Liveness::Offline));
    }

    #[test]
    fn filter_is_stable_for_identical_inputs() {
        let a = filter_devices(enriched_fixture(), Some("esp32"), StatusFilter::All);
        let b = filter_devices(enriched_fixture(), Some("esp32"), StatusFilter::All);
        assert_eq!(a, b);
    }
}
