//! Built-in crop catalog seed
//!
//! A representative Maharashtra catalog covering cereals, pulses, oilseeds,
//! commercial crops, fruit, vegetables and spices. Values are per-acre
//! agronomy envelopes; rainfall and temperature bounds drive the pre-screen
//! hard filter, the rest feeds scoring and the reasoning context.

use cdis_common::types::{
    CropCatalogEntry, Season, SoilType, TempRange, Tier, ValueRange,
};

use Season::{Annual, Kharif, Rabi, Zaid};
use SoilType::{Alluvial, Black, Clay, Loamy, Red, Sandy};
use Tier::{High, Low, Medium};

#[allow(clippy::too_many_arguments)]
fn crop(
    id: u32,
    name: &str,
    seasons: &[Season],
    temp: (f64, f64, f64),
    rainfall: (f64, f64),
    soils: &[SoilType],
    duration_days: u32,
    cost: (f64, f64),
    price: f64,
    yield_q: (f64, f64),
    market_potential: Tier,
    risk_factor: Tier,
    perishability: Tier,
) -> CropCatalogEntry {
    let rainfall_mm = ValueRange::new(rainfall.0, rainfall.1);
    CropCatalogEntry {
        id,
        name: name.to_string(),
        seasons: seasons.to_vec(),
        temp: TempRange { min_c: temp.0, max_c: temp.1, optimal_c: temp.2 },
        rainfall_mm,
        water_requirement_mm: rainfall_mm.midpoint(),
        soil_affinity: soils.to_vec(),
        duration_days,
        input_cost_per_acre: ValueRange::new(cost.0, cost.1),
        market_price_per_quintal: price,
        yield_quintal_per_acre: ValueRange::new(yield_q.0, yield_q.1),
        market_potential,
        risk_factor,
        perishability,
    }
}

/// Build the seed catalog. IDs are stable; gaps between blocks are deliberate.
#[rustfmt::skip]
pub fn seed_crops() -> Vec<CropCatalogEntry> {
    vec![
        // Cereals & millets
        crop(1, "Soybean", &[Kharif], (15.0, 35.0, 28.0), (450.0, 700.0), &[Black, Loamy], 100, (12000.0, 18000.0), 4600.0, (8.0, 12.0), High, Medium, Low),
        crop(2, "Rice (Paddy)", &[Kharif], (20.0, 40.0, 30.0), (1200.0, 2000.0), &[Clay, Alluvial, Loamy], 135, (18000.0, 28000.0), 2183.0, (18.0, 30.0), High, Medium, Low),
        crop(3, "Jowar (Sorghum)", &[Kharif, Rabi], (15.0, 40.0, 30.0), (300.0, 550.0), &[Black, Red, Loamy], 105, (8000.0, 12000.0), 3180.0, (10.0, 15.0), Medium, Low, Low),
        crop(4, "Bajra (Pearl Millet)", &[Kharif], (20.0, 42.0, 32.0), (250.0, 450.0), &[Sandy, Loamy, Red], 85, (6000.0, 10000.0), 2500.0, (8.0, 14.0), Medium, Low, Low),
        crop(5, "Wheat", &[Rabi], (10.0, 30.0, 20.0), (300.0, 500.0), &[Alluvial, Loamy, Clay], 115, (15000.0, 22000.0), 2275.0, (15.0, 22.0), Medium, Low, Low),
        crop(6, "Maize (Corn)", &[Kharif, Rabi], (18.0, 38.0, 28.0), (500.0, 800.0), &[Loamy, Alluvial, Black], 105, (12000.0, 18000.0), 2090.0, (20.0, 35.0), High, Medium, Low),
        // Pulses
        crop(10, "Tur (Pigeonpea)", &[Kharif], (18.0, 38.0, 28.0), (350.0, 600.0), &[Black, Red, Loamy], 175, (10000.0, 15000.0), 7000.0, (5.0, 10.0), High, Medium, Low),
        crop(11, "Mung (Green Gram)", &[Kharif, Zaid], (20.0, 40.0, 30.0), (200.0, 350.0), &[Loamy, Sandy, Alluvial], 68, (8000.0, 12000.0), 8558.0, (4.0, 7.0), High, Low, Low),
        crop(13, "Gram (Chickpea)", &[Rabi], (10.0, 30.0, 22.0), (200.0, 350.0), &[Black, Loamy, Clay], 105, (10000.0, 16000.0), 5440.0, (6.0, 12.0), High, Low, Low),
        // Oilseeds
        crop(20, "Groundnut", &[Kharif, Zaid], (20.0, 38.0, 28.0), (400.0, 650.0), &[Sandy, Loamy, Red], 115, (15000.0, 22000.0), 6377.0, (8.0, 15.0), High, Medium, Low),
        crop(21, "Sunflower", &[Kharif, Rabi], (18.0, 35.0, 26.0), (350.0, 550.0), &[Black, Loamy, Alluvial], 95, (10000.0, 15000.0), 6760.0, (5.0, 10.0), Medium, Medium, Low),
        crop(23, "Mustard", &[Rabi], (10.0, 28.0, 18.0), (200.0, 400.0), &[Loamy, Alluvial, Clay], 115, (10000.0, 15000.0), 5650.0, (6.0, 10.0), Medium, Low, Low),
        crop(24, "Sesame (Til)", &[Kharif], (20.0, 40.0, 30.0), (250.0, 400.0), &[Loamy, Sandy, Black], 90, (6000.0, 10000.0), 9000.0, (2.0, 4.0), High, Medium, Low),
        // Fibre & commercial
        crop(30, "Cotton", &[Kharif], (20.0, 40.0, 32.0), (700.0, 1200.0), &[Black, Loamy], 165, (20000.0, 35000.0), 6620.0, (8.0, 12.0), High, High, Low),
        crop(31, "Sugarcane", &[Annual], (20.0, 40.0, 30.0), (1500.0, 2500.0), &[Black, Alluvial, Loamy], 400, (45000.0, 65000.0), 315.0, (400.0, 600.0), Medium, Medium, High),
        // Fruits
        crop(40, "Mango", &[Annual], (20.0, 42.0, 30.0), (600.0, 1000.0), &[Loamy, Alluvial, Red], 135, (25000.0, 45000.0), 4000.0, (40.0, 100.0), High, Medium, High),
        crop(41, "Banana", &[Annual], (18.0, 38.0, 28.0), (1800.0, 2500.0), &[Loamy, Alluvial, Clay], 330, (60000.0, 100000.0), 2000.0, (250.0, 500.0), High, Medium, High),
        crop(43, "Grapes", &[Annual], (15.0, 38.0, 25.0), (500.0, 900.0), &[Loamy, Sandy, Red], 210, (80000.0, 150000.0), 8000.0, (100.0, 250.0), High, High, High),
        crop(44, "Pomegranate", &[Annual], (15.0, 40.0, 30.0), (400.0, 700.0), &[Loamy, Sandy, Black], 195, (50000.0, 90000.0), 10000.0, (60.0, 150.0), High, Medium, High),
        // Vegetables
        crop(50, "Onion", &[Kharif, Rabi], (12.0, 32.0, 22.0), (350.0, 550.0), &[Loamy, Alluvial, Sandy], 105, (35000.0, 55000.0), 2000.0, (100.0, 200.0), High, High, High),
        crop(51, "Tomato", &[Kharif, Rabi], (15.0, 35.0, 25.0), (400.0, 600.0), &[Loamy, Red], 100, (30000.0, 50000.0), 2500.0, (150.0, 350.0), High, High, High),
        crop(52, "Potato", &[Rabi], (10.0, 28.0, 18.0), (400.0, 600.0), &[Loamy, Sandy, Alluvial], 95, (40000.0, 60000.0), 1500.0, (80.0, 150.0), High, Medium, High),
        crop(54, "Chilli", &[Kharif, Rabi], (18.0, 38.0, 28.0), (400.0, 650.0), &[Loamy, Black, Red], 135, (30000.0, 50000.0), 8000.0, (30.0, 60.0), High, High, High),
        // Spices
        crop(60, "Turmeric (Haldi)", &[Kharif], (20.0, 38.0, 28.0), (1200.0, 1800.0), &[Loamy, Red, Alluvial], 270, (50000.0, 80000.0), 7000.0, (80.0, 150.0), High, Medium, Low),
        crop(62, "Garlic", &[Rabi], (12.0, 30.0, 20.0), (350.0, 550.0), &[Loamy, Alluvial, Sandy], 135, (40000.0, 60000.0), 8000.0, (40.0, 80.0), High, Medium, Low),
        // Melons
        crop(110, "Watermelon (Tarbooz)", &[Zaid, Kharif], (22.0, 40.0, 30.0), (400.0, 700.0), &[Sandy, Loamy, Alluvial], 82, (25000.0, 45000.0), 1500.0, (150.0, 300.0), High, Medium, High),
    ]
}
