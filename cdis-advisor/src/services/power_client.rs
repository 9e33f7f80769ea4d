//! NASA POWER client for agro-climatic aggregates
//!
//! Fetches a 180-day daily-point window ending yesterday and reduces it to
//! the `EnvironmentalContext` the scoring engines consume. The provider
//! fails loudly on missing temperature data rather than inventing values.

use async_trait::async_trait;
use cdis_common::config::DEFAULT_POWER_BASE_URL;
use cdis_common::types::EnvironmentalContext;
use cdis_common::{Error, Result};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Daily parameters requested from the POWER daily-point endpoint
const POWER_PARAMETERS: &str = "T2M,T2M_MAX,T2M_MIN,PRECTOTCORR,RH2M,GWETTOP";
const POWER_COMMUNITY: &str = "AG";
/// Sampling window (days); data latency keeps the last day out of reach
const WINDOW_DAYS: i64 = 180;

/// Source of environmental aggregates for a location
#[async_trait]
pub trait EnvironmentProvider: Send + Sync {
    async fn fetch_environment(&self, lat: f64, lon: f64) -> Result<EnvironmentalContext>;
}

/// Per-date value maps, keyed YYYYMMDD; -999 marks missing samples
#[derive(Debug, Default, Deserialize)]
pub struct DailySeries {
    #[serde(rename = "T2M", default)]
    pub t2m: BTreeMap<String, f64>,
    #[serde(rename = "T2M_MIN", default)]
    pub t2m_min: BTreeMap<String, f64>,
    #[serde(rename = "T2M_MAX", default)]
    pub t2m_max: BTreeMap<String, f64>,
    #[serde(rename = "PRECTOTCORR", default)]
    pub precipitation: BTreeMap<String, f64>,
    #[serde(rename = "RH2M", default)]
    pub humidity: BTreeMap<String, f64>,
    #[serde(rename = "GWETTOP", default)]
    pub surface_wetness: BTreeMap<String, f64>,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: DailySeries,
}

#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

pub struct PowerClient {
    client: reqwest::Client,
    base_url: String,
}

impl PowerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

impl Default for PowerClient {
    fn default() -> Self {
        Self::new(DEFAULT_POWER_BASE_URL)
    }
}

#[async_trait]
impl EnvironmentProvider for PowerClient {
    async fn fetch_environment(&self, lat: f64, lon: f64) -> Result<EnvironmentalContext> {
        let end = Utc::now().date_naive() - Duration::days(1);
        let start = end - Duration::days(WINDOW_DAYS);

        debug!(lat, lon, %start, %end, "fetching POWER daily window");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("parameters", POWER_PARAMETERS),
                ("community", POWER_COMMUNITY),
                ("latitude", &lat.to_string()),
                ("longitude", &lon.to_string()),
                ("start", &start.format("%Y%m%d").to_string()),
                ("end", &end.format("%Y%m%d").to_string()),
                ("format", "JSON"),
            ])
            .send()
            .await
            .map_err(|e| Error::Unavailable(format!("POWER request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Unavailable(format!(
                "POWER returned HTTP {}",
                response.status()
            )));
        }

        let body: PowerResponse = response
            .json()
            .await
            .map_err(|e| Error::UpstreamData(format!("POWER response malformed: {e}")))?;

        aggregate_daily_series(&body.properties.parameter)
    }
}

fn valid_values(series: &BTreeMap<String, f64>, floor: f64) -> Vec<f64> {
    series.values().copied().filter(|v| *v > floor).collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Monthly rainfall coefficient of variation (%), capped at 100
///
/// Zero mean rainfall reads as maximum variability; fewer than two monthly
/// samples reads as none.
fn monthly_cv(precipitation: &BTreeMap<String, f64>) -> f64 {
    let mut monthly: BTreeMap<&str, f64> = BTreeMap::new();
    for (date, value) in precipitation {
        if *value >= 0.0 && date.len() >= 6 {
            *monthly.entry(&date[..6]).or_insert(0.0) += value;
        }
    }
    let totals: Vec<f64> = monthly.into_values().collect();
    if totals.len() < 2 {
        return 0.0;
    }
    let m = mean(&totals);
    if m == 0.0 {
        return 100.0;
    }
    let variance = totals.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (totals.len() - 1) as f64;
    (variance.sqrt() / m * 100.0).min(100.0)
}

/// Longest run of consecutive days below 2.5 mm
fn longest_dry_spell(precipitation: &BTreeMap<String, f64>) -> u32 {
    let mut longest = 0u32;
    let mut current = 0u32;
    for value in precipitation.values() {
        if (-0.1..2.5).contains(value) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

/// Reduce raw per-date series to the context the engines consume
pub fn aggregate_daily_series(series: &DailySeries) -> Result<EnvironmentalContext> {
    let t2m = valid_values(&series.t2m, -900.0);
    if t2m.is_empty() {
        return Err(Error::UpstreamData(
            "no valid temperature samples in POWER window".to_string(),
        ));
    }
    let t2m_min = valid_values(&series.t2m_min, -900.0);
    let t2m_max = valid_values(&series.t2m_max, -900.0);
    let precip = valid_values(&series.precipitation, -0.1);
    let humidity = valid_values(&series.humidity, -0.1);
    let wetness = valid_values(&series.surface_wetness, -0.1);

    let avg_temp = mean(&t2m);
    let min_temp = if t2m_min.is_empty() { avg_temp - 5.0 } else { mean(&t2m_min) };
    let max_temp = if t2m_max.is_empty() { avg_temp + 5.0 } else { mean(&t2m_max) };
    let rainfall_total: f64 = precip.iter().sum();

    let heat_stress_days = t2m_max.iter().filter(|v| **v > 35.0).count() as u32;
    let cold_stress_days = t2m_min.iter().filter(|v| **v < 10.0).count() as u32;

    // GDD base 10 °C, summed over days where both extremes are present
    let mut gdd = 0.0;
    for (date, tmax) in &series.t2m_max {
        if let Some(tmin) = series.t2m_min.get(date) {
            if *tmax > -900.0 && *tmin > -900.0 {
                gdd += (((tmax + tmin) / 2.0) - 10.0).max(0.0);
            }
        }
    }

    let soil_moisture_index = if wetness.is_empty() {
        // Rough rain-minus-evaporation proxy when GWETTOP is absent
        ((rainfall_total * 0.7 - avg_temp * 5.0).max(0.0) / 500.0).min(1.0)
    } else {
        mean(&wetness)
    };

    Ok(EnvironmentalContext {
        avg_temp,
        min_temp,
        max_temp,
        rainfall_total,
        rainfall_variability: monthly_cv(&series.precipitation),
        soil_moisture_index,
        avg_humidity: if humidity.is_empty() { None } else { Some(mean(&humidity)) },
        gdd,
        heat_stress_days,
        cold_stress_days,
        dry_spell_days: longest_dry_spell(&series.precipitation),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_of(days: &[(&str, f64, f64, f64, f64)]) -> DailySeries {
        // (date, t2m, tmin, tmax, precip)
        let mut s = DailySeries::default();
        for (date, t, tmin, tmax, rain) in days {
            s.t2m.insert(date.to_string(), *t);
            s.t2m_min.insert(date.to_string(), *tmin);
            s.t2m_max.insert(date.to_string(), *tmax);
            s.precipitation.insert(date.to_string(), *rain);
        }
        s
    }

    #[test]
    fn rejects_window_with_no_temperature() {
        let mut s = DailySeries::default();
        s.t2m.insert("20250101".to_string(), -999.0);
        assert!(aggregate_daily_series(&s).is_err());
    }

    #[test]
    fn missing_sentinels_are_filtered() {
        let mut s = series_of(&[
            ("20250101", 25.0, 18.0, 32.0, 4.0),
            ("20250102", 27.0, 20.0, 34.0, 0.0),
        ]);
        s.t2m.insert("20250103".to_string(), -999.0);
        s.precipitation.insert("20250103".to_string(), -999.0);

        let env = aggregate_daily_series(&s).unwrap();
        assert_eq!(env.avg_temp, 26.0);
        assert_eq!(env.rainfall_total, 4.0);
    }

    #[test]
    fn stress_days_and_gdd() {
        let s = series_of(&[
            ("20250101", 30.0, 22.0, 38.0, 0.0), // heat day, gdd 20
            ("20250102", 15.0, 8.0, 22.0, 0.0),  // cold day, gdd 5
            ("20250103", 5.0, 0.0, 8.0, 0.0),    // cold day, gdd 0 (clamped)
        ]);
        let env = aggregate_daily_series(&s).unwrap();
        assert_eq!(env.heat_stress_days, 1);
        assert_eq!(env.cold_stress_days, 2);
        assert!((env.gdd - 25.0).abs() < 1e-9);
    }

    #[test]
    fn dry_spell_is_longest_run() {
        let s = series_of(&[
            ("20250101", 25.0, 18.0, 32.0, 0.0),
            ("20250102", 25.0, 18.0, 32.0, 1.0),
            ("20250103", 25.0, 18.0, 32.0, 10.0),
            ("20250104", 25.0, 18.0, 32.0, 0.5),
            ("20250105", 25.0, 18.0, 32.0, 2.0),
            ("20250106", 25.0, 18.0, 32.0, 0.0),
        ]);
        assert_eq!(aggregate_daily_series(&s).unwrap().dry_spell_days, 3);
    }

    #[test]
    fn zero_mean_rainfall_reads_as_max_variability() {
        let s = series_of(&[
            ("20250101", 25.0, 18.0, 32.0, 0.0),
            ("20250201", 25.0, 18.0, 32.0, 0.0),
        ]);
        assert_eq!(aggregate_daily_series(&s).unwrap().rainfall_variability, 100.0);
    }

    #[test]
    fn soil_moisture_falls_back_to_rain_proxy() {
        let s = series_of(&[("20250101", 20.0, 15.0, 25.0, 600.0)]);
        let env = aggregate_daily_series(&s).unwrap();
        // 600*0.7 - 20*5 = 320; 320/500 = 0.64
        assert!((env.soil_moisture_index - 0.64).abs() < 1e-9);
    }
}
