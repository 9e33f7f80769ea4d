//! Fast-path decision synthesis
//!
//! Blends the six submodel reports into a weighted score per crop, then
//! picks a Best Bet plus up to two alternatives (a Safe Option and a
//! High Risk / High Reward pick when the field offers them).

use crate::models::deterministic::{FinalDecision, SubModelReport};
use cdis_common::types::CropCatalogEntry;

const BEST_BET: &str = "Best Bet";
const SAFE_OPTION: &str = "Safe Option";
const HIGH_RISK: &str = "High Risk / High Reward";
const ALTERNATIVE: &str = "Alternative";

fn model_weight(name: &str) -> f64 {
    match name {
        "Land Feasibility" => 0.15,
        "Soil Analysis" => 0.15,
        "Water Balance" => 0.20,
        "Climate Analysis" => 0.20,
        "Economic Viability" => 0.20,
        "Risk Assessment" => 0.10,
        _ => 0.10,
    }
}

/// Weighted blend of submodel scores
pub fn weighted_score(reports: &[SubModelReport]) -> f64 {
    let mut total = 0.0;
    let mut weight_sum = 0.0;
    for report in reports {
        let w = model_weight(&report.name);
        total += report.score * w;
        weight_sum += w;
    }
    if weight_sum > 0.0 {
        total / weight_sum
    } else {
        0.0
    }
}

fn risk_level(reports: &[SubModelReport]) -> &'static str {
    match reports.iter().find(|r| r.name == "Risk Assessment") {
        Some(r) if r.score < 60.0 => "High",
        Some(r) if r.score > 80.0 => "Low",
        Some(_) => "Medium",
        None => "Medium",
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Rank all candidates and tag the headline picks
///
/// Returns `(best_bet, alternatives)`; alternatives hold at most two
/// entries, preferring a low-risk pick and a high-profit high-risk pick
/// before falling back to the next best scores.
pub fn synthesize(
    candidates: &[(&CropCatalogEntry, Vec<SubModelReport>)],
) -> Option<(FinalDecision, Vec<FinalDecision>)> {
    let mut decisions: Vec<FinalDecision> = candidates
        .iter()
        .map(|(crop, reports)| {
            let score = weighted_score(reports);
            let profit = crop.typical_yield() * crop.market_price_per_quintal
                - crop.typical_input_cost();
            FinalDecision {
                crop: crop.name.clone(),
                score: round1(score),
                profit_per_acre: profit,
                risk_level: risk_level(reports).to_string(),
                confidence: round1(score * 0.95),
                recommendation_type: ALTERNATIVE.to_string(),
            }
        })
        .collect();

    decisions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut best = decisions.first()?.clone();
    best.recommendation_type = BEST_BET.to_string();

    let mut alternatives: Vec<FinalDecision> = Vec::new();

    if let Some(safe) = decisions
        .iter()
        .filter(|d| d.crop != best.crop && d.risk_level == "Low")
        .max_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
    {
        let mut safe = safe.clone();
        safe.recommendation_type = SAFE_OPTION.to_string();
        alternatives.push(safe);
    }

    let taken: Vec<String> = std::iter::once(best.crop.clone())
        .chain(alternatives.iter().map(|d| d.crop.clone()))
        .collect();
    if let Some(risky) = decisions
        .iter()
        .filter(|d| !taken.contains(&d.crop) && d.risk_level == "High")
        .max_by(|a, b| {
            a.profit_per_acre
                .partial_cmp(&b.profit_per_acre)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    {
        let mut risky = risky.clone();
        risky.recommendation_type = HIGH_RISK.to_string();
        alternatives.push(risky);
    }

    // Pad with the next best scores up to two alternatives
    for d in decisions.iter().skip(1) {
        if alternatives.len() >= 2 {
            break;
        }
        if d.crop != best.crop && alternatives.iter().all(|a| a.crop != d.crop) {
            alternatives.push(d.clone());
        }
    }

    Some((best, alternatives))
}
