//! Static climate effects table (§3 supplemental; SPEC_FULL.md §3).
//! Not registry-loaded: climates are a fixed enumeration the simulation
//! core knows about, unlike catalog content.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateEffect {
    pub resource_yield: f64,
    pub refining_speed: f64,
    pub defense: f64,
}

impl Default for ClimateEffect {
    fn default() -> Self {
        ClimateEffect {
            resource_yield: 1.0,
            refining_speed: 1.0,
            defense: 1.0,
        }
    }
}

pub fn climate_effect(name: &str) -> ClimateEffect {
    let default = ClimateEffect::default();
    match name {
        "sandstorm" => ClimateEffect { resource_yield: 0.85, refining_speed: 1.0, defense: 1.1 },
        "drought" => ClimateEffect { resource_yield: 0.8, refining_speed: 1.0, defense: 1.0 },
        "dry_winds" => ClimateEffect { resource_yield: 0.9, defense: 1.05, ..default },
        "temperate" => ClimateEffect { resource_yield: 1.0, refining_speed: 1.0, defense: 1.0 },
        "seasonal_storms" => ClimateEffect { resource_yield: 0.95, defense: 1.1, ..default },
        "dry_spell" => ClimateEffect { resource_yield: 0.9, ..default },
        "lava_rain" => ClimateEffect { resource_yield: 0.9, defense: 1.3, ..default },
        "toxic_fumes" => ClimateEffect { refining_speed: 0.9, ..default },
        "acid_storms" => ClimateEffect { resource_yield: 0.85, defense: 1.2, ..default },
        "megastorms" => ClimateEffect { resource_yield: 0.9, defense: 1.1, ..default },
        "ion_winds" => ClimateEffect { refining_speed: 1.1, ..default },
        "gas_turbulence" => ClimateEffect { resource_yield: 0.8, ..default },
        "plasma_storms" => ClimateEffect { defense: 1.3, ..default },
        "magnetic_turbulence" => ClimateEffect { refining_speed: 0.9, ..default },
        "quantum_flux" => ClimateEffect { resource_yield: 1.2, refining_speed: 0.8, ..default },
        "reality_distortion" => ClimateEffect { defense: 1.5, resource_yield: 0.9, ..default },
        "monsoon" => ClimateEffect { resource_yield: 1.1, defense: 0.9, ..default },
        "hurricane_season" => ClimateEffect { resource_yield: 0.8, defense: 1.2, ..default },
        "calm_currents" => ClimateEffect { resource_yield: 1.05, ..default },
        "humid" => ClimateEffect { resource_yield: 1.1, ..default },
        "dense_fog" => ClimateEffect { defense: 1.15, refining_speed: 0.95, ..default },
        "biospheric_balance" => ClimateEffect { resource_yield: 1.2, defense: 1.0, ..default },
        "mutual_growth" => ClimateEffect { resource_yield: 1.15, ..default },
        "spore_clouds" => ClimateEffect { refining_speed: 0.9, defense: 1.1, ..default },
        _ => default,
    }
}

/// `{raw, processed, advanced}` resource descriptor scaling (§3, GLOSSARY).
pub fn refinement_multiplier(level: &str) -> f64 {
    match level {
        "raw" => 1.0,
        "processed" => 1.25,
        "advanced" => 1.5,
        _ => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_climate_defaults_to_neutral() {
        assert_eq!(climate_effect("nonexistent"), ClimateEffect::default());
    }

    #[test]
    fn known_climate_overrides_only_its_fields() {
        let effect = climate_effect("ion_winds");
        assert_eq!(effect.refining_speed, 1.1);
        assert_eq!(effect.resource_yield, 1.0);
        assert_eq!(effect.defense, 1.0);
    }

    #[test]
    fn refinement_levels_scale_as_specified() {
        assert_eq!(refinement_multiplier("raw"), 1.0);
        assert_eq!(refinement_multiplier("processed"), 1.25);
        assert_eq!(refinement_multiplier("advanced"), 1.5);
    }
}
