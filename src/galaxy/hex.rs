//! A single cell of the galaxy grid, addressed by axial `(q, r)` with
//! derived `s = -q - r` (§3, GLOSSARY).

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::galaxy::star_system::StarSystem;

/// What occupies a tile. Fixed, registry-independent enum (Design Notes:
/// "`action` and `feature` should be closed enums"); the discriminants
/// are the wire integers of §6 — serialized via `u8`, not variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
#[repr(u8)]
pub enum Feature {
    StarSystem = 0,
    Nebula = 1,
    AsteroidField = 2,
    BlackHole = 3,
    Empty = 4,
}

impl From<Feature> for u8 {
    fn from(feature: Feature) -> u8 {
        feature as u8
    }
}

impl From<u8> for Feature {
    fn from(value: u8) -> Feature {
        match value {
            0 => Feature::StarSystem,
            1 => Feature::Nebula,
            2 => Feature::AsteroidField,
            3 => Feature::BlackHole,
            _ => Feature::Empty,
        }
    }
}

impl Feature {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Draw a feature given density-derived weights (§4.4). Weights need
    /// not sum to 1; this normalizes.
    pub fn weighted_pick(weights: &FeatureWeights, rng: &mut impl Rng) -> Feature {
        let total = weights.star + weights.nebula + weights.asteroid + weights.black_hole + weights.empty;
        let mut x = rng.random::<f64>() * total;
        for (feature, w) in [
            (Feature::StarSystem, weights.star),
            (Feature::Nebula, weights.nebula),
            (Feature::AsteroidField, weights.asteroid),
            (Feature::BlackHole, weights.black_hole),
            (Feature::Empty, weights.empty),
        ] {
            if x < w {
                return feature;
            }
            x -= w;
        }
        Feature::Empty
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureWeights {
    pub star: f64,
    pub nebula: f64,
    pub asteroid: f64,
    pub black_hole: f64,
    pub empty: f64,
}

impl FeatureWeights {
    /// Derived from `(star_density, nebula_density)`, both 0-100 (§4.4).
    pub fn from_densities(star_density: f64, nebula_density: f64) -> FeatureWeights {
        FeatureWeights {
            star: 0.30 * (0.2 + star_density / 100.0),
            nebula: 0.12 * (0.2 + nebula_density / 100.0),
            asteroid: 0.14,
            black_hole: 0.04,
            empty: (0.10 * (1.0 - 0.4 * (star_density + nebula_density) / 200.0)).max(0.02),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hex {
    pub global_id: Uuid,
    pub q: i32,
    pub r: i32,
    pub s: i32,
    pub feature: Feature,
    pub contents: Option<StarSystem>,
    pub owner_id: Option<Uuid>,
    pub reserved_id: Option<Uuid>,
    pub protected: bool,
}

impl Hex {
    pub fn new(q: i32, r: i32, feature: Feature) -> Hex {
        Hex {
            global_id: Uuid::new_v4(),
            q,
            r,
            s: -q - r,
            feature,
            contents: None,
            owner_id: None,
            reserved_id: None,
            protected: false,
        }
    }

    pub fn is_star_system(&self) -> bool {
        matches!(self.feature, Feature::StarSystem)
    }
}
