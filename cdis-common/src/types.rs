//! Core agronomic value types shared across CDIS services

use serde::{Deserialize, Serialize};

/// Indian cropping seasons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Kharif,
    Rabi,
    Zaid,
    /// Grown year-round; matches any detected season at reduced fit
    Annual,
}

impl Season {
    /// Detect the cropping season for a calendar month (1–12)
    ///
    /// Jun–Oct → Kharif, Nov–Mar → Rabi, Apr–May → Zaid
    pub fn for_month(month: u32) -> Season {
        match month {
            6..=10 => Season::Kharif,
            11 | 12 | 1..=3 => Season::Rabi,
            _ => Season::Zaid,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Kharif => "Kharif",
            Season::Rabi => "Rabi",
            Season::Zaid => "Zaid",
            Season::Annual => "Annual",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad soil classes used for crop affinity matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilType {
    Clay,
    Sandy,
    Loamy,
    Black,
    Red,
    Alluvial,
}

impl SoilType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilType::Clay => "Clay",
            SoilType::Sandy => "Sandy",
            SoilType::Loamy => "Loamy",
            SoilType::Black => "Black",
            SoilType::Red => "Red",
            SoilType::Alluvial => "Alluvial",
        }
    }
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-declared irrigation situation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WaterAvailability {
    Rainfed,
    Limited,
    Adequate,
}

impl WaterAvailability {
    /// Irrigation bonus (mm) added to annualized rainfall
    pub fn irrigation_bonus_mm(&self) -> f64 {
        match self {
            WaterAvailability::Rainfed => 0.0,
            WaterAvailability::Limited => 150.0,
            WaterAvailability::Adequate => 400.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WaterAvailability::Rainfed => "Rainfed",
            WaterAvailability::Limited => "Limited",
            WaterAvailability::Adequate => "Adequate",
        }
    }
}

/// Qualitative tier used for market potential, intrinsic risk and perishability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Low => "Low",
            Tier::Medium => "Medium",
            Tier::High => "High",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive numeric range; invariant min <= max
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn new(min: f64, max: f64) -> Self {
        debug_assert!(min <= max, "range invariant violated: {} > {}", min, max);
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Crop temperature envelope (°C)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempRange {
    pub min_c: f64,
    pub max_c: f64,
    pub optimal_c: f64,
}

/// One crop's static agronomic envelope, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropCatalogEntry {
    pub id: u32,
    pub name: String,
    /// At least one season; `Annual` tags year-round crops
    pub seasons: Vec<Season>,
    pub temp: TempRange,
    /// Annual rainfall requirement (mm)
    pub rainfall_mm: ValueRange,
    /// Irrigation water requirement (mm)
    pub water_requirement_mm: f64,
    pub soil_affinity: Vec<SoilType>,
    /// Crop duration in days (seed-to-harvest midpoint)
    pub duration_days: u32,
    /// Input cost per acre (₹)
    pub input_cost_per_acre: ValueRange,
    /// Market price per quintal (₹)
    pub market_price_per_quintal: f64,
    /// Yield per acre (quintals)
    pub yield_quintal_per_acre: ValueRange,
    pub market_potential: Tier,
    pub risk_factor: Tier,
    pub perishability: Tier,
}

impl CropCatalogEntry {
    /// Representative input cost used by the scoring engines
    pub fn typical_input_cost(&self) -> f64 {
        self.input_cost_per_acre.midpoint()
    }

    /// Representative yield used by the scoring engines
    pub fn typical_yield(&self) -> f64 {
        self.yield_quintal_per_acre.midpoint()
    }

    pub fn is_annual(&self) -> bool {
        self.seasons.contains(&Season::Annual)
    }

    pub fn grows_in(&self, season: Season) -> bool {
        self.seasons.contains(&season)
    }

    /// Soil affinity as display text, e.g. "Black, Loamy"
    pub fn soil_affinity_text(&self) -> String {
        self.soil_affinity
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Display bundle: "₹12,000–₹18,000"
    pub fn cost_range_text(&self) -> String {
        format!(
            "₹{}–₹{}",
            format_grouped(self.input_cost_per_acre.min as i64),
            format_grouped(self.input_cost_per_acre.max as i64)
        )
    }

    /// Display bundle: "120 days"
    pub fn duration_text(&self) -> String {
        format!("{} days", self.duration_days)
    }

    /// Check the catalog invariants (ranges ordered, at least one season)
    pub fn is_valid(&self) -> bool {
        !self.seasons.is_empty()
            && self.temp.min_c <= self.temp.max_c
            && self.rainfall_mm.min <= self.rainfall_mm.max
            && self.input_cost_per_acre.min <= self.input_cost_per_acre.max
            && self.yield_quintal_per_acre.min <= self.yield_quintal_per_acre.max
    }
}

/// Thousands-grouped integer formatting for ₹ display text
pub fn format_grouped(value: i64) -> String {
    let digits = value.abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Aggregate weather/soil summary for one location over the sampled window
///
/// Produced fresh per request by the environmental provider; immutable.
/// Temperature and rainfall fields are always populated — the provider fails
/// loudly rather than returning partial data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentalContext {
    pub avg_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    /// Total rainfall (mm) over the sampled window
    pub rainfall_total: f64,
    /// Monthly rainfall coefficient of variation (%)
    pub rainfall_variability: f64,
    /// Surface soil wetness index (0–1)
    pub soil_moisture_index: f64,
    /// Relative humidity (%), when the provider reports it
    pub avg_humidity: Option<f64>,
    /// Accumulated growing degree days, base 10 °C
    pub gdd: f64,
    /// Days with max temperature above 35 °C
    pub heat_stress_days: u32,
    /// Days with min temperature below 10 °C
    pub cold_stress_days: u32,
    /// Longest run of days below 2.5 mm rainfall
    pub dry_spell_days: u32,
}
