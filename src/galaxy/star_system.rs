//! A container owned by a star-system tile, holding 1-4 planets (§3).

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::planet::bonuses::{generate_resource_bonus, planet_type_rarity_weight};
use crate::planet::Planet;
use crate::registry::{Category, Registry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarSystem {
    pub name: String,
    pub planets: Vec<Planet>,
}

/// Picks 0..N of the registry's `planet_features` whose `planet_type`
/// matches, drawn without replacement (§3: "0..N registry features
/// whose `planet_type` matches").
fn pick_features(registry: &Registry, planet_type_id: &str, rng: &mut impl Rng) -> Vec<String> {
    let Some(by_id) = registry.category(Category::PlanetFeatures) else {
        return Vec::new();
    };
    let mut matching: Vec<String> = by_id
        .values()
        .filter(|e| e.planet_type.as_deref() == Some(planet_type_id))
        .map(|e| e.id.clone())
        .collect();
    if matching.is_empty() {
        return Vec::new();
    }
    let count = rng.random_range(0..=matching.len());
    let mut picked = Vec::with_capacity(count);
    for _ in 0..count {
        let idx = rng.random_range(0..matching.len());
        picked.push(matching.swap_remove(idx));
    }
    picked
}

fn pick_planet_type<'a>(registry: &'a Registry, rng: &mut impl Rng) -> Option<&'a str> {
    let planet_types = registry.category(Category::Planets)?;
    if planet_types.is_empty() {
        return None;
    }
    let weighted: Vec<(&str, f64)> = planet_types
        .values()
        .map(|e| (e.id.as_str(), planet_type_rarity_weight(e.rarity.as_deref())))
        .collect();
    let total: f64 = weighted.iter().map(|(_, w)| w).sum();
    let mut x = rng.random::<f64>() * total;
    for (id, w) in &weighted {
        if x < *w {
            return Some(id);
        }
        x -= w;
    }
    weighted.last().map(|(id, _)| *id)
}

pub fn generate_star_system(
    name: String,
    global_id_start: u64,
    registry: &Registry,
    is_colonized: bool,
    rng: &mut impl Rng,
) -> (StarSystem, u64) {
    let planet_count = rng.random_range(1..=4);
    let mut planets = Vec::with_capacity(planet_count);
    let mut next_global_id = global_id_start;

    for local_id in 0..planet_count {
        let planet_type_id = pick_planet_type(registry, rng).unwrap_or("barren").to_string();
        let planet_type_entry = registry.get(&planet_type_id);
        let climate = planet_type_entry
            .and_then(|e| e.possible_climates.as_ref())
            .and_then(|cs| cs.choose(rng))
            .cloned()
            .unwrap_or_else(|| "temperate".to_string());
        let defense_bonus = planet_type_entry.and_then(|e| e.defense_base_bonus).unwrap_or(1.0);
        let features = pick_features(registry, &planet_type_id, rng);
        let resource_bonus = generate_resource_bonus(&planet_type_id, rng);
        let population_max = rng.random_range(4..=12);

        planets.push(Planet::new(
            next_global_id,
            local_id as u32,
            format!("{name}-{}", local_id + 1),
            planet_type_id,
            climate,
            features,
            resource_bonus,
            defense_bonus,
            population_max,
            is_colonized,
        ));
        next_global_id += 1;
    }

    (StarSystem { name, planets }, next_global_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    #[test]
    fn generates_between_one_and_four_planets() {
        let registry = Registry::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let (system, _) = generate_star_system("Sol".into(), 0, &registry, true, &mut rng);
        assert!(system.planets.len() >= 1 && system.planets.len() <= 4);
        for planet in &system.planets {
            assert_eq!(planet.is_colonized, true);
        }
    }

    #[test]
    fn global_ids_are_assigned_sequentially() {
        let registry = Registry::default();
        let mut rng = rand::rngs::StdRng::seed_from_u64(9);
        let (system, next) = generate_star_system("Vega".into(), 100, &registry, false, &mut rng);
        for (i, planet) in system.planets.iter().enumerate() {
            assert_eq!(planet.global_id, 100 + i as u64);
        }
        assert_eq!(next, 100 + system.planets.len() as u64);
    }

    fn feature_entry(id: &str, planet_type: &str) -> crate::registry::RegistryEntry {
        crate::registry::RegistryEntry {
            id: id.to_string(),
            name: id.to_string(),
            rarity: None,
            possible_climates: None,
            defense_base_bonus: None,
            habitability: None,
            colonization_cost: None,
            resource_type: None,
            refinement_level: None,
            inputs: None,
            yield_amount: None,
            cost: None,
            slot_type: None,
            base_yield: None,
            upkeep: None,
            layer: None,
            defense_value: None,
            power_use: None,
            planet_type: Some(planet_type.to_string()),
        }
    }

    #[test]
    fn features_only_match_planet_type_and_vary_in_count() {
        let mut categories = HashMap::new();
        let mut by_id = HashMap::new();
        by_id.insert("lava_flow".to_string(), feature_entry("lava_flow", "volcanic"));
        by_id.insert("ash_field".to_string(), feature_entry("ash_field", "volcanic"));
        by_id.insert("coral_reef".to_string(), feature_entry("coral_reef", "oceanic"));
        categories.insert(Category::PlanetFeatures, by_id);
        let registry = Registry::from_wire(categories);

        let mut counts = std::collections::HashSet::new();
        for seed in 0..50 {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let picked = pick_features(&registry, "volcanic", &mut rng);
            counts.insert(picked.len());
            for id in &picked {
                assert_ne!(id, "coral_reef");
            }
        }
        assert!(counts.len() > 1, "subset size should vary across draws");

        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        assert!(pick_features(&registry, "terrestrial", &mut rng).is_empty());
    }
}
