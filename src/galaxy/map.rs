//! Hex grid generation and per-player ownership assignment (§4.4, §4.6).

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::galaxy::hex::{Feature, FeatureWeights, Hex};
use crate::galaxy::star_system::generate_star_system;
use crate::registry::Registry;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalaxyMap {
    pub width: u32,
    pub height: u32,
    pub star_density: f64,
    pub nebula_density: f64,
    pub hexes: Vec<Hex>,
    pub starting_hex: Option<Uuid>,
}

impl GalaxyMap {
    fn generate_hexes(width: u32, height: u32, weights: &FeatureWeights, rng: &mut impl Rng) -> Vec<Hex> {
        let mut hexes = Vec::new();
        for q in 0..width as i32 {
            let q_offset = q.div_euclid(2);
            for r in (-q_offset)..(height as i32 - q_offset) {
                let feature = Feature::weighted_pick(weights, rng);
                hexes.push(Hex::new(q, r, feature));
            }
        }
        hexes
    }

    pub fn find_by_global_id(&self, global_id: Uuid) -> Option<&Hex> {
        self.hexes.iter().find(|h| h.global_id == global_id)
    }

    pub fn find_by_planet_global_id(&self, planet_global_id: u64) -> Option<(&Hex, usize)> {
        self.hexes.iter().find_map(|hex| {
            hex.contents.as_ref().and_then(|system| {
                system
                    .planets
                    .iter()
                    .position(|p| p.global_id == planet_global_id)
                    .map(|idx| (hex, idx))
            })
        })
    }

    pub fn find_mut_by_planet_global_id(
        &mut self,
        planet_global_id: u64,
    ) -> Option<&mut crate::planet::Planet> {
        self.hexes.iter_mut().find_map(|hex| {
            hex.contents.as_mut().and_then(|system| {
                system.planets.iter_mut().find(|p| p.global_id == planet_global_id)
            })
        })
    }

    /// Retries generation until at least one `star_system` tile exists;
    /// that tile becomes `starting_hex`, owned by `player_id`, with every
    /// planet in its system colonized. Every other tile is reserved for
    /// `player_id` (§4.4).
    pub fn generate_for_player(
        player_id: Uuid,
        width: u32,
        height: u32,
        star_density: f64,
        nebula_density: f64,
        registry: &Registry,
        rng: &mut impl Rng,
    ) -> GalaxyMap {
        let weights = FeatureWeights::from_densities(star_density, nebula_density);
        loop {
            let mut hexes = Self::generate_hexes(width, height, &weights, rng);
            let Some(start_idx) = hexes.iter().position(|h| h.is_star_system()) else {
                continue;
            };

            let mut next_global_id: u64 = 1;
            for (i, hex) in hexes.iter_mut().enumerate() {
                if i == start_idx {
                    hex.owner_id = Some(player_id);
                    hex.reserved_id = None;
                    let (system, next) = generate_star_system(
                        format!("System-{}", hex.global_id.simple()),
                        next_global_id,
                        registry,
                        true,
                        rng,
                    );
                    next_global_id = next;
                    hex.contents = Some(system);
                } else {
                    hex.reserved_id = Some(player_id);
                    hex.owner_id = None;
                    if hex.is_star_system() {
                        let (system, next) = generate_star_system(
                            format!("System-{}", hex.global_id.simple()),
                            next_global_id,
                            registry,
                            false,
                            rng,
                        );
                        next_global_id = next;
                        hex.contents = Some(system);
                    }
                }
            }

            let starting_hex = hexes[start_idx].global_id;
            return GalaxyMap {
                width,
                height,
                star_density,
                nebula_density,
                hexes,
                starting_hex: Some(starting_hex),
            };
        }
    }
}
