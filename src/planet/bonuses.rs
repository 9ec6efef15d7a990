//! Planet-type rarity weighting and resource-bonus assignment
//! (SPEC_FULL.md §3 supplemental, grounded on the original `core/config.py`
//! tables and `core/planet.py::assign_planet_bonuses`).

use std::collections::HashMap;

use rand::Rng;

pub fn planet_type_rarity_weight(rarity: Option<&str>) -> f64 {
    match rarity {
        Some("common") => 0.25,
        Some("uncommon") => 0.15,
        Some("rare") => 0.05,
        Some("very_rare") => 0.02,
        _ => 0.25,
    }
}

pub fn planet_rarity_bonus(planet_type: &str) -> f64 {
    match planet_type {
        "volcanic" => 2.0,
        "quantum_giant" => 3.0,
        "barren" => 2.0,
        "hydrogen_giant" => 2.0,
        "ionized_giant" => 1.5,
        "oceanic" => 1.5,
        "jungle" => 1.3,
        "symbiotic" => 1.4,
        _ => 1.0,
    }
}

pub fn planet_type_allowed_resources(planet_type: &str) -> &'static [&'static str] {
    match planet_type {
        "volcanic" => &["metal_bars", "alloy", "quantum_alloy"],
        "quantum_giant" => &["quantum_plasma", "plasma"],
        "barren" => &["basaltic_ore"],
        "hydrogen_giant" => &["hydrogen_gas"],
        "ionized_giant" => &["fuel", "plasma"],
        "oceanic" => &["water_ice"],
        "jungle" => &["wetware", "genetic_gel"],
        "symbiotic" => &["genetic_gel", "neural_symbionts"],
        _ => &[],
    }
}

/// Each eligible resource gets `uniform(1.1, 1.5) * rarity_bonus` — a
/// +10% to +50% base roll before the per-type multiplier; planet types
/// outside `planet_type_allowed_resources` get no entries.
pub fn generate_resource_bonus(planet_type: &str, rng: &mut impl Rng) -> HashMap<String, f64> {
    let multiplier = planet_rarity_bonus(planet_type);
    planet_type_allowed_resources(planet_type)
        .iter()
        .map(|resource_id| {
            let roll = 1.1 + rng.random::<f64>() * 0.4;
            (resource_id.to_string(), roll * multiplier)
        })
        .collect()
}
