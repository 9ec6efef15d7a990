//! Per-planet defense unit bag: a multiset of registry ids keyed by
//! layer, valued by registry lookup at query time (§3).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::registry::Registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefenseLayer {
    DeepSpace,
    Orbital,
    HighAltitude,
    LowAltitude,
    Ground,
}

impl DefenseLayer {
    pub fn from_registry_name(name: &str) -> Option<DefenseLayer> {
        match name {
            "DEEP_SPACE" => Some(DefenseLayer::DeepSpace),
            "ORBITAL" => Some(DefenseLayer::Orbital),
            "HIGH_ALTITUDE" => Some(DefenseLayer::HighAltitude),
            "LOW_ALTITUDE" => Some(DefenseLayer::LowAltitude),
            "GROUND" => Some(DefenseLayer::Ground),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefenseBag {
    pub units: HashMap<DefenseLayer, Vec<String>>,
}

impl DefenseBag {
    pub fn add_unit(&mut self, layer: DefenseLayer, unit_id: String) {
        self.units.entry(layer).or_default().push(unit_id);
    }

    pub fn remove_unit(&mut self, unit_id: &str) -> bool {
        for ids in self.units.values_mut() {
            if let Some(pos) = ids.iter().position(|id| id == unit_id) {
                ids.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn total_defense_value(&self, registry: &Registry, layer: Option<DefenseLayer>) -> f64 {
        let groups: Box<dyn Iterator<Item = &Vec<String>>> = match layer {
            Some(l) => Box::new(self.units.get(&l).into_iter()),
            None => Box::new(self.units.values()),
        };
        groups
            .flatten()
            .filter_map(|id| registry.get(id))
            .filter_map(|entry| entry.defense_value)
            .sum()
    }

    pub fn unit_counts(&self) -> HashMap<DefenseLayer, usize> {
        self.units.iter().map(|(layer, ids)| (*layer, ids.len())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_unit() {
        let mut bag = DefenseBag::default();
        bag.add_unit(DefenseLayer::Orbital, "laser_turret".into());
        assert_eq!(bag.unit_counts()[&DefenseLayer::Orbital], 1);
        assert!(bag.remove_unit("laser_turret"));
        assert!(bag.units.get(&DefenseLayer::Orbital).unwrap().is_empty());
    }

    #[test]
    fn remove_missing_unit_is_a_no_op() {
        let mut bag = DefenseBag::default();
        assert!(!bag.remove_unit("nonexistent"));
    }
}
