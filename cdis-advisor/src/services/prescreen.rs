//! Pre-screen engine: hard filter plus 100-point normalized scoring
//!
//! Dimensions (before penalty): temperature 25, water 20, GDD 15,
//! market 10, ROI 10, season 10, soil 10. A risk penalty of up to 15
//! points is subtracted at the end. All curves are smooth linear
//! interpolations; there are no hard tiers inside a dimension.
//!
//! The engine is fully deterministic: same catalog, environment and
//! request always produce the same ranking.

use crate::models::prescreen::{
    CropCandidate, EnvironmentalSummary, PrescreenRequest, PrescreenResponse, ScoreBreakdown,
};
use cdis_common::types::{CropCatalogEntry, EnvironmentalContext, Season};
use chrono::{Datelike, Utc};

/// Tolerance (°C) around the crop envelope in the hard filter
const TEMP_TOLERANCE_C: f64 = 8.0;
/// Minimum share of the crop's rainfall floor that must be available
const WATER_FLOOR_FRACTION: f64 = 0.35;
/// Minimum share of input cost the budget must cover
const BUDGET_FLOOR_FRACTION: f64 = 0.55;
/// The sampled window is half a year; annualize before comparing with
/// annual crop requirements
const ANNUALIZE_FACTOR: f64 = 2.0;
/// Required GDD proxy: duration_days × this (base 10 °C)
const GDD_PER_DAY: f64 = 8.0;

fn lerp(value: f64, low: f64, high: f64, score_low: f64, score_high: f64) -> f64 {
    if high <= low {
        return if value >= high { score_high } else { score_low };
    }
    let ratio = (value - low) / (high - low);
    score_low + ratio * (score_high - score_low)
}

fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

pub struct PrescreenEngine<'a> {
    env: &'a EnvironmentalContext,
    request: &'a PrescreenRequest,
    season: Season,
}

impl<'a> PrescreenEngine<'a> {
    pub fn new(env: &'a EnvironmentalContext, request: &'a PrescreenRequest) -> Self {
        Self::with_season(env, request, Season::for_month(Utc::now().month()))
    }

    /// Pin the detected season; used by callers that already resolved it
    pub fn with_season(
        env: &'a EnvironmentalContext,
        request: &'a PrescreenRequest,
        season: Season,
    ) -> Self {
        Self { env, request, season }
    }

    pub fn season(&self) -> Season {
        self.season
    }

    /// Total water (mm) available over a year: annualized rainfall plus
    /// the irrigation bonus for the declared water situation
    fn available_water(&self) -> f64 {
        self.env.rainfall_total * ANNUALIZE_FACTOR
            + self.request.water_availability.irrigation_bonus_mm()
    }

    /// Hard filter: a crop that fails any gate cannot grow here at all
    pub fn passes_hard_filter(&self, crop: &CropCatalogEntry) -> bool {
        let temp = self.env.avg_temp;
        if temp < crop.temp.min_c - TEMP_TOLERANCE_C || temp > crop.temp.max_c + TEMP_TOLERANCE_C {
            return false;
        }
        if self.available_water() < crop.rainfall_mm.min * WATER_FLOOR_FRACTION {
            return false;
        }
        if !crop.grows_in(self.season) && !crop.is_annual() {
            return false;
        }
        let budget = self.request.budget_per_acre;
        if budget > 0.0 && budget < crop.typical_input_cost() * BUDGET_FLOOR_FRACTION {
            return false;
        }
        true
    }

    /// Score one survivor against the 100-point model
    ///
    /// `max_market_price` is the highest price among all survivors; the
    /// market dimension is normalized against it on a log scale.
    pub fn score(&self, crop: &CropCatalogEntry, max_market_price: f64) -> (i64, ScoreBreakdown) {
        // Temperature (25): full at the range midpoint, decaying toward the
        // edges; outside the range, rapid linear decay capped at 9.
        let temp = self.env.avg_temp;
        let (t_min, t_max) = (crop.temp.min_c, crop.temp.max_c);
        let t_opt = (t_min + t_max) / 2.0;
        let temperature = if (t_min..=t_max).contains(&temp) {
            let deviation = (temp - t_opt).abs();
            let half_range = ((t_max - t_min) / 2.0).max(1.0);
            clamp(25.0 * (1.0 - deviation / half_range), 10.0, 25.0)
        } else {
            let dist = (temp - t_min).abs().min((temp - t_max).abs());
            clamp(25.0 - dist * 2.5, 0.0, 9.0)
        };

        // Water (20): surplus saturates at 20, the in-range band maps to
        // 12–20, and a deficit can never reach the in-range band.
        let available = self.available_water();
        let (r_min, r_max) = (crop.rainfall_mm.min, crop.rainfall_mm.max);
        let water = if available >= r_max {
            20.0
        } else if available >= r_min {
            lerp(available, r_min, r_max, 12.0, 20.0)
        } else {
            clamp(lerp(available, 0.0, r_min, 0.0, 12.0), 0.0, 11.0)
        };

        // GDD (15): required heat proxied from crop duration
        let required_gdd = crop.duration_days as f64 * GDD_PER_DAY;
        let gdd = if self.env.gdd >= required_gdd {
            15.0
        } else if required_gdd > 0.0 {
            clamp(lerp(self.env.gdd, 0.0, required_gdd, 0.0, 15.0), 0.0, 14.0)
        } else {
            10.0
        };

        // Market (10): log-scale price normalization keeps the spread
        // meaningful instead of handing 10 only to the priciest crop
        let price = crop.market_price_per_quintal;
        let market = if max_market_price > 0.0 && price > 0.0 {
            clamp(price.ln_1p() / max_market_price.ln_1p() * 10.0, 2.0, 10.0)
        } else {
            5.0
        };

        // ROI (10): smooth 0–10 over 0–300% return on input cost
        let cost = crop.typical_input_cost().max(1.0);
        let roi_ratio = (crop.typical_yield() * price - cost) / cost;
        let roi = clamp(lerp(roi_ratio, 0.0, 3.0, 0.0, 10.0), 0.0, 10.0);

        // Season (10): exact match 10, year-round 8, otherwise 0
        let season = if crop.grows_in(self.season) {
            10.0
        } else if crop.is_annual() {
            8.0
        } else {
            0.0
        };

        // Soil (10): unknown is neutral, affinity match is perfect, a
        // mismatch still earns partial adaptability credit
        let soil = match &self.request.soil_type {
            None => 7.0,
            Some(s) if s.trim().is_empty() => 7.0,
            Some(s) => {
                let user_soil = s.trim().to_lowercase();
                if crop.soil_affinity_text().to_lowercase().contains(&user_soil) {
                    10.0
                } else {
                    3.0
                }
            }
        };

        // Risk penalty (≤15): heat stress for heat-sensitive crops,
        // erratic rainfall, and dry spells for water-hungry crops
        let mut penalty = 0.0;
        let heat_days = self.env.heat_stress_days as f64;
        if heat_days > 0.0 && crop.temp.max_c < 38.0 {
            penalty += clamp(heat_days * 0.8, 0.0, 8.0);
        }
        let cv = self.env.rainfall_variability;
        if cv > 40.0 {
            penalty += clamp(lerp(cv, 40.0, 100.0, 0.0, 5.0), 0.0, 5.0);
        }
        let dry_days = self.env.dry_spell_days as f64;
        if dry_days > 10.0 && crop.rainfall_mm.min > 400.0 {
            penalty += clamp(lerp(dry_days, 10.0, 30.0, 0.0, 4.0), 0.0, 4.0);
        }
        let risk_penalty = clamp(penalty, 0.0, 15.0);

        let component_sum = temperature + water + gdd + market + roi + season + soil;
        let total = clamp(component_sum - risk_penalty, 0.0, 100.0).round() as i64;

        let breakdown = ScoreBreakdown {
            temperature: temperature.round() as i64,
            water: water.round() as i64,
            gdd: gdd.round() as i64,
            market: market.round() as i64,
            roi: roi.round() as i64,
            season: season.round() as i64,
            soil: soil.round() as i64,
            risk_penalty: risk_penalty.round() as i64,
        };
        (total, breakdown)
    }

    /// Filter, score and rank the whole catalog
    ///
    /// Returns every survivor, sorted by score descending (id ascending on
    /// ties, so the ranking is stable run to run).
    pub fn run(&self, catalog: &[CropCatalogEntry]) -> PrescreenResponse {
        let viable: Vec<&CropCatalogEntry> = catalog
            .iter()
            .filter(|c| self.passes_hard_filter(c))
            .collect();

        let max_price = viable
            .iter()
            .map(|c| c.market_price_per_quintal)
            .fold(f64::MIN, f64::max)
            .max(1.0);

        let mut scored: Vec<(i64, ScoreBreakdown, &CropCatalogEntry)> = viable
            .into_iter()
            .map(|c| {
                let (score, breakdown) = self.score(c, max_price);
                (score, breakdown, c)
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.2.id.cmp(&b.2.id)));

        let recommended_top_ids = scored
            .iter()
            .take(3)
            .map(|(_, _, c)| c.id.to_string())
            .collect();

        let candidates = scored
            .into_iter()
            .map(|(score, breakdown, c)| CropCandidate {
                id: c.id.to_string(),
                name: c.name.clone(),
                score,
                season: c.seasons.iter().map(|s| s.to_string()).collect(),
                market_potential: c.market_potential.to_string(),
                input_cost_range: c.cost_range_text(),
                duration_days: c.duration_text(),
                market_price_per_quintal: c.market_price_per_quintal,
                yield_quintal_per_acre: c.typical_yield(),
                input_cost_per_acre: c.typical_input_cost(),
                is_perishable: c.perishability == cdis_common::types::Tier::High,
                score_breakdown: breakdown,
            })
            .collect();

        PrescreenResponse {
            candidates,
            recommended_top_ids,
            current_season: self.season.to_string(),
            environmental_summary: EnvironmentalSummary {
                avg_temp: self.env.avg_temp,
                rainfall_mm: self.env.rainfall_total,
                soil_moisture_index: self.env.soil_moisture_index,
                heat_stress_days: self.env.heat_stress_days,
                gdd: self.env.gdd,
                rainfall_variability_cv: self.env.rainfall_variability,
                dry_spell_days: self.env.dry_spell_days,
            },
        }
    }
}
