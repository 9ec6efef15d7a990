//! The hard core: slots, modes, cached production, refining,
//! build-queue progression, defense, serialization (§4.5).

pub mod bonuses;
pub mod build_queue;
pub mod climate;
pub mod defense;
pub mod patent;
pub mod slot;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::DispatchError;
use crate::registry::Registry;
pub use build_queue::{build_time_seconds, BuildCategory, BuildOrder, BuildQueue};
pub use defense::{DefenseBag, DefenseLayer};
pub use patent::Patent;
pub use slot::{Slot, SlotStatus, SlotType};

/// The fixed symbol farm slots always produce (§9 Design Notes: flagged
/// in the source as something that "should be configurable or
/// registry-driven" — kept as a single named constant so that hook is
/// one line to change).
pub const FARM_RESOURCE_ID: &str = "organifera";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanetMode {
    Mine,
    Refine,
    Nil,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheSlot {
    signature: Option<(PlanetMode, Option<String>, Vec<(SlotType, SlotStatus, bool)>)>,
    last_yield: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProductionCache {
    farm: CacheSlot,
    mine: CacheSlot,
    refine: CacheSlot,
}

#[derive(Debug, Clone)]
pub struct SlotDelta {
    pub planet_global_id: u64,
    pub planet_id: u32,
    pub slot_index: usize,
    pub slot_type: SlotType,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Planet {
    pub global_id: u64,
    pub id: u32,
    pub name: String,
    pub planet_type_id: String,
    pub climate: String,
    pub features: Vec<String>,
    pub resource_bonus: HashMap<String, f64>,
    pub defense_bonus: f64,
    pub population_max: u32,
    pub population: u32,
    pub is_colonized: bool,
    pub mode: PlanetMode,
    pub current_resource: Option<String>,
    pub slots: Vec<Slot>,
    pub resources: HashMap<String, f64>,
    pub industry_points: f64,
    pub defense: DefenseBag,
    pub build_queue: BuildQueue,
    pub statistics: HashMap<String, f64>,
    pub rotation_hint: Option<String>,

    #[serde(default, skip_serializing)]
    cache: ProductionCache,
    #[serde(default, skip_serializing)]
    last_sent_slot_active: Vec<bool>,
}

impl Planet {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        global_id: u64,
        id: u32,
        name: String,
        planet_type_id: String,
        climate: String,
        features: Vec<String>,
        resource_bonus: HashMap<String, f64>,
        defense_bonus: f64,
        population_max: u32,
        is_colonized: bool,
    ) -> Planet {
        let slots = (0..population_max).map(|_| Slot::empty()).collect();
        let last_sent_slot_active = vec![true; population_max as usize];
        Planet {
            global_id,
            id,
            name,
            planet_type_id,
            climate,
            features,
            resource_bonus,
            defense_bonus,
            population_max,
            population: 0,
            is_colonized,
            mode: PlanetMode::Nil,
            current_resource: None,
            slots,
            resources: HashMap::new(),
            industry_points: 0.0,
            defense: DefenseBag::default(),
            build_queue: BuildQueue::default(),
            statistics: HashMap::new(),
            rotation_hint: None,
            cache: ProductionCache::default(),
            last_sent_slot_active,
        }
    }

    // ---- 4.5.1 slot accounting ----------------------------------------

    pub fn available_slot_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_available())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn used_slot_indices(&self) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_used())
            .map(|(i, _)| i)
            .collect()
    }

    fn built_slot_indices(&self, slot_type: SlotType) -> Vec<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.slot_type == slot_type && s.status == SlotStatus::Built)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn total_industry_points(&self) -> f64 {
        self.industry_points + 100.0 * self.built_slot_indices(SlotType::Industry).len() as f64
    }

    // ---- 4.5.5 build queue ---------------------------------------------

    pub fn start_build(&mut self, item_id: &str, registry: &Registry) -> Result<(), DispatchError> {
        let (entry, category) = registry
            .category(crate::registry::Category::Buildings)
            .and_then(|m| m.get(item_id))
            .map(|e| (e, BuildCategory::Building))
            .or_else(|| {
                registry
                    .category(crate::registry::Category::DefenseUnits)
                    .and_then(|m| m.get(item_id))
                    .map(|e| (e, BuildCategory::Defense))
            })
            .ok_or_else(|| DispatchError::UnknownItem(item_id.to_string()))?;

        let industry_cost = entry.cost.as_ref().and_then(|c| c.industry).unwrap_or(1000.0);
        let time = build_time_seconds(industry_cost, self.total_industry_points());

        let target_slot = if category == BuildCategory::Building {
            let slot_type = slot_type_from_str(entry.slot_type.as_deref().unwrap_or(""));
            let idx = self
                .available_slot_indices()
                .into_iter()
                .next()
                .ok_or(DispatchError::NoSlotAvailable)?;
            self.slots[idx].start_construction(slot_type, item_id.to_string());
            Some(idx)
        } else {
            None
        };

        self.build_queue.push(BuildOrder {
            item_id: item_id.to_string(),
            item_name: entry.name.clone(),
            build_time_seconds: time,
            cost: entry.cost.clone().unwrap_or_default(),
            category,
            progress_seconds: 0.0,
            target_slot,
        });
        Ok(())
    }

    /// Frees exactly one built-or-under-construction slot of `slot_type`;
    /// if `None`, the first non-empty slot is freed (§4.5.1).
    pub fn remove_building_from_slot(&mut self, slot_type: Option<SlotType>) -> Result<(), DispatchError> {
        let idx = self
            .slots
            .iter()
            .enumerate()
            .find(|(_, s)| s.is_used() && slot_type.map(|t| s.slot_type == t).unwrap_or(true))
            .map(|(i, _)| i)
            .ok_or(DispatchError::NoSlotAvailable)?;
        let freed_type = self.slots[idx].slot_type;
        self.slots[idx].clear();
        self.on_slots_changed(Some(freed_type));
        Ok(())
    }

    pub fn toggle_slot(&mut self, index: usize) -> Result<(), DispatchError> {
        let slot = self.slots.get_mut(index).ok_or(DispatchError::NoSlotAvailable)?;
        slot.toggle_active();
        let slot_type = slot.slot_type;
        self.on_slots_changed(Some(slot_type));
        Ok(())
    }

    /// Advances the head build order by `delta_seconds`; finalizes it on
    /// completion (slot -> built, or a defense unit added) and returns
    /// the completed order for the caller to emit an update for.
    pub fn tick_build(&mut self, delta_seconds: f64, registry: &Registry) -> Option<BuildOrder> {
        let completed = self.build_queue.tick(delta_seconds)?;
        match completed.category {
            BuildCategory::Building => {
                if let Some(idx) = completed.target_slot {
                    if let Some(slot) = self.slots.get_mut(idx) {
                        slot.complete_construction();
                        self.on_slots_changed(Some(slot.slot_type));
                    }
                }
            }
            BuildCategory::Defense => {
                if let Some(entry) = registry.get(&completed.item_id) {
                    if let Some(layer) = entry
                        .layer
                        .as_deref()
                        .and_then(DefenseLayer::from_registry_name)
                    {
                        self.defense.add_unit(layer, completed.item_id.clone());
                    }
                }
            }
        }
        Some(completed)
    }

    // ---- 4.5.3 production caching --------------------------------------

    fn signature_for(&self, category: SlotType) -> (PlanetMode, Option<String>, Vec<(SlotType, SlotStatus, bool)>) {
        let slots = self
            .slots
            .iter()
            .filter(|s| s.slot_type == category)
            .map(|s| (s.slot_type, s.status, s.active))
            .collect();
        (self.mode, self.current_resource.clone(), slots)
    }

    pub fn on_slots_changed(&mut self, slot_type: Option<SlotType>) {
        match slot_type {
            Some(SlotType::Farm) => self.cache.farm.signature = None,
            Some(SlotType::Mine) => self.cache.mine.signature = None,
            Some(SlotType::Refine) => self.cache.refine.signature = None,
            _ => {
                self.cache.farm.signature = None;
                self.cache.mine.signature = None;
                self.cache.refine.signature = None;
            }
        }
    }

    // ---- 4.5.4 production step ------------------------------------------

    fn resource_yield_bonus(&self) -> f64 {
        let resource_bonus = self
            .current_resource
            .as_ref()
            .and_then(|r| self.resource_bonus.get(r))
            .copied()
            .unwrap_or(1.0);
        resource_bonus * climate::climate_effect(&self.climate).resource_yield
    }

    fn refine_bonus(&self) -> f64 {
        let resource_bonus = self
            .current_resource
            .as_ref()
            .and_then(|r| self.resource_bonus.get(r))
            .copied()
            .unwrap_or(1.0);
        resource_bonus * climate::climate_effect(&self.climate).refining_speed
    }

    fn sum_base_yield(&self, registry: &Registry, category: SlotType, filter_active: bool) -> f64 {
        self.slots
            .iter()
            .filter(|s| s.slot_type == category && s.status == SlotStatus::Built)
            .filter(|s| !filter_active || s.active)
            .filter_map(|s| s.building_id.as_deref())
            .filter_map(|id| registry.get(id))
            .map(|e| e.base_yield.unwrap_or(1.0))
            .sum()
    }

    /// Runs farm (always) and mine-or-refine (by resource routing) for
    /// one tick, mutating `resources`/`statistics` and refreshing caches.
    pub fn run_production_tick(
        &mut self,
        registry: &Registry,
        patents: &[Patent],
        tech_level: f64,
        force_recompute: bool,
    ) {
        self.run_farm(registry, patents, tech_level, force_recompute);
        self.run_mine_or_refine(registry, patents, tech_level, force_recompute);
    }

    fn run_farm(&mut self, registry: &Registry, patents: &[Patent], tech_level: f64, force_recompute: bool) {
        let sig = self.signature_for(SlotType::Farm);
        let yield_amount = if !force_recompute && self.cache.farm.signature.as_ref() == Some(&sig) {
            self.cache.farm.last_yield
        } else {
            let base = self.sum_base_yield(registry, SlotType::Farm, true);
            let computed = patent::apply_patents(base * tech_level, "organics", patents);
            self.cache.farm.signature = Some(sig);
            self.cache.farm.last_yield = computed;
            computed
        };
        *self.resources.entry(FARM_RESOURCE_ID.to_string()).or_insert(0.0) += yield_amount;
        self.statistics.insert("farm".to_string(), yield_amount);
    }

    fn run_mine_or_refine(&mut self, registry: &Registry, patents: &[Patent], tech_level: f64, force_recompute: bool) {
        let Some(current_resource) = self.current_resource.clone() else {
            self.statistics.insert("mine".to_string(), 0.0);
            self.statistics.insert("refine".to_string(), 0.0);
            return;
        };
        let Some(resource_entry) = registry.get(&current_resource) else {
            return;
        };

        if resource_entry.is_refinable() {
            let inputs = resource_entry.inputs.clone().unwrap_or_default();
            let output_yield = resource_entry.yield_amount.unwrap_or(1.0);
            let sig = self.signature_for(SlotType::Refine);
            let raw_yield = if !force_recompute && self.cache.refine.signature.as_ref() == Some(&sig) {
                self.cache.refine.last_yield
            } else {
                let base = self.sum_base_yield(registry, SlotType::Refine, false);
                let computed = patent::apply_patents(base * tech_level * self.refine_bonus(), "refine", patents);
                self.cache.refine.signature = Some(sig);
                self.cache.refine.last_yield = computed;
                computed
            };

            let sufficient = inputs.iter().all(|(input_id, ratio)| {
                self.resources.get(input_id).copied().unwrap_or(0.0) >= raw_yield * ratio
            });
            if !sufficient {
                self.statistics.insert("refine".to_string(), 0.0);
                return;
            }
            for (input_id, ratio) in &inputs {
                *self.resources.entry(input_id.clone()).or_insert(0.0) -= raw_yield * ratio;
            }
            let produced = raw_yield * output_yield;
            *self.resources.entry(current_resource.clone()).or_insert(0.0) += produced;
            self.statistics.insert("refine".to_string(), produced);
        } else {
            let refinement_multiplier = climate::refinement_multiplier(
                resource_entry.refinement_level.as_deref().unwrap_or("raw"),
            );
            let output_yield = resource_entry.yield_amount.unwrap_or(1.0);
            let sig = self.signature_for(SlotType::Mine);
            let yield_amount = if !force_recompute && self.cache.mine.signature.as_ref() == Some(&sig) {
                self.cache.mine.last_yield
            } else {
                let base = self.sum_base_yield(registry, SlotType::Mine, false);
                let computed = patent::apply_patents(
                    base * tech_level * self.resource_yield_bonus() * refinement_multiplier * output_yield,
                    "mine",
                    patents,
                );
                self.cache.mine.signature = Some(sig);
                self.cache.mine.last_yield = computed;
                computed
            };
            *self.resources.entry(current_resource.clone()).or_insert(0.0) += yield_amount;
            self.statistics.insert("mine".to_string(), yield_amount);
        }
    }

    // ---- 4.7 dispatcher entry points ------------------------------------

    pub fn set_mode(&mut self, mode: PlanetMode) {
        self.mode = mode;
    }

    pub fn set_current_resource(&mut self, resource_id: String) {
        self.current_resource = Some(resource_id);
    }

    // ---- 4.5.7 serialization / deltas ------------------------------------

    pub fn compute_deltas(&mut self) -> Vec<SlotDelta> {
        if self.last_sent_slot_active.len() != self.slots.len() {
            self.last_sent_slot_active = self.slots.iter().map(|_| true).collect();
        }
        let mut deltas = Vec::new();
        for (i, slot) in self.slots.iter().enumerate() {
            if self.last_sent_slot_active[i] != slot.active {
                deltas.push(SlotDelta {
                    planet_global_id: self.global_id,
                    planet_id: self.id,
                    slot_index: i,
                    slot_type: slot.slot_type,
                    active: slot.active,
                });
                self.last_sent_slot_active[i] = slot.active;
            }
        }
        deltas
    }
}

fn slot_type_from_str(s: &str) -> SlotType {
    match s {
        "farm" => SlotType::Farm,
        "mine" => SlotType::Mine,
        "refine" => SlotType::Refine,
        "industry" => SlotType::Industry,
        "energy" => SlotType::Energy,
        "science" => SlotType::Science,
        _ => SlotType::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Category, Cost, Registry, RegistryEntry};
    use std::collections::HashMap as Map;

    fn test_registry() -> Registry {
        let mut resources = Map::new();
        resources.insert(
            "basaltic_ore".to_string(),
            RegistryEntry {
                id: "basaltic_ore".into(),
                name: "Basaltic Ore".into(),
                rarity: None,
                possible_climates: None,
                defense_base_bonus: None,
                habitability: None,
                colonization_cost: None,
                resource_type: Some("ore".into()),
                refinement_level: Some("raw".into()),
                inputs: Some(Map::new()),
                yield_amount: Some(1.0),
                cost: None,
                slot_type: None,
                base_yield: None,
                upkeep: None,
                layer: None,
                defense_value: None,
                power_use: None,
                planet_type: None,
            },
        );
        let mut metal_inputs = Map::new();
        metal_inputs.insert("basaltic_ore".to_string(), 1.0);
        resources.insert(
            "metal_bars".to_string(),
            RegistryEntry {
                id: "metal_bars".into(),
                name: "Metal Bars".into(),
                rarity: None,
                possible_climates: None,
                defense_base_bonus: None,
                habitability: None,
                colonization_cost: None,
                resource_type: Some("processed".into()),
                refinement_level: Some("processed".into()),
                inputs: Some(metal_inputs),
                yield_amount: Some(1.0),
                cost: None,
                slot_type: None,
                base_yield: None,
                upkeep: None,
                layer: None,
                defense_value: None,
                power_use: None,
                planet_type: None,
            },
        );

        let mut buildings = Map::new();
        buildings.insert(
            "mine_basic".to_string(),
            RegistryEntry {
                id: "mine_basic".into(),
                name: "Basic Mine".into(),
                rarity: None,
                possible_climates: None,
                defense_base_bonus: None,
                habitability: None,
                colonization_cost: None,
                resource_type: None,
                refinement_level: None,
                inputs: None,
                yield_amount: None,
                cost: Some(Cost { credits: 0.0, industry: Some(1000.0), resources: Map::new() }),
                slot_type: Some("mine".into()),
                base_yield: Some(2.0),
                upkeep: None,
                layer: None,
                defense_value: None,
                power_use: None,
                planet_type: None,
            },
        );
        buildings.insert(
            "refinery_basic".to_string(),
            RegistryEntry {
                id: "refinery_basic".into(),
                name: "Basic Refinery".into(),
                rarity: None,
                possible_climates: None,
                defense_base_bonus: None,
                habitability: None,
                colonization_cost: None,
                resource_type: None,
                refinement_level: None,
                inputs: None,
                yield_amount: None,
                cost: Some(Cost { credits: 0.0, industry: Some(1000.0), resources: Map::new() }),
                slot_type: Some("refine".into()),
                base_yield: Some(2.0),
                upkeep: None,
                layer: None,
                defense_value: None,
                power_use: None,
                planet_type: None,
            },
        );

        let mut categories = Map::new();
        categories.insert(Category::Resources, resources);
        categories.insert(Category::Buildings, buildings);
        categories.insert(Category::DefenseUnits, Map::new());
        categories.insert(Category::Planets, Map::new());
        categories.insert(Category::PlanetFeatures, Map::new());
        categories.insert(Category::OffenseUnits, Map::new());
        categories.insert(Category::Ships, Map::new());
        Registry::from_wire(categories)
    }

    fn colonized_planet() -> Planet {
        Planet::new(
            1,
            0,
            "Home".into(),
            "barren".into(),
            "temperate".into(),
            Vec::new(),
            HashMap::new(),
            1.0,
            4,
            true,
        )
    }

    #[test]
    fn slot_counting_invariant_holds() {
        let planet = colonized_planet();
        assert_eq!(planet.slots.len(), planet.population_max as usize);
        assert_eq!(
            planet.available_slot_indices().len() + planet.used_slot_indices().len(),
            planet.population_max as usize
        );
    }

    #[test]
    fn production_cache_reuses_yield_until_invalidated() {
        let registry = test_registry();
        let mut planet = colonized_planet();
        planet.slots[0].start_construction(SlotType::Mine, "mine_basic".into());
        planet.slots[0].complete_construction();
        planet.set_current_resource("basaltic_ore".into());

        planet.run_production_tick(&registry, &[], 1.0, false);
        let first = *planet.statistics.get("mine").unwrap();
        assert!(first > 0.0);

        planet.run_production_tick(&registry, &[], 1.0, false);
        let second = *planet.statistics.get("mine").unwrap();
        assert_eq!(first, second);

        planet.on_slots_changed(Some(SlotType::Mine));
        assert!(planet.cache.mine.signature.is_none());
    }

    #[test]
    fn refine_is_atomic_no_op_when_inputs_insufficient() {
        let registry = test_registry();
        let mut planet = colonized_planet();
        planet.slots[0].start_construction(SlotType::Refine, "refinery_basic".into());
        planet.slots[0].complete_construction();
        planet.slots[1].start_construction(SlotType::Refine, "refinery_basic".into());
        planet.slots[1].complete_construction();
        planet.set_current_resource("metal_bars".into());

        planet.run_production_tick(&registry, &[], 1.0, false);
        assert_eq!(*planet.statistics.get("refine").unwrap(), 0.0);
        assert!(planet.resources.get("metal_bars").is_none());
    }

    #[test]
    fn refine_consumes_inputs_and_produces_output_when_sufficient() {
        let registry = test_registry();
        let mut planet = colonized_planet();
        planet.slots[0].start_construction(SlotType::Refine, "refinery_basic".into());
        planet.slots[0].complete_construction();
        planet.set_current_resource("metal_bars".into());
        planet.resources.insert("basaltic_ore".into(), 100.0);

        planet.run_production_tick(&registry, &[], 1.0, false);
        let raw_yield = *planet.statistics.get("refine").unwrap();
        assert!(raw_yield > 0.0);
        assert_eq!(*planet.resources.get("basaltic_ore").unwrap(), 100.0 - raw_yield);
        assert_eq!(*planet.resources.get("metal_bars").unwrap(), raw_yield);
    }

    #[test]
    fn set_mode_is_idempotent() {
        let registry = test_registry();
        let mut a = colonized_planet();
        let mut b = colonized_planet();
        a.set_mode(PlanetMode::Mine);
        a.set_mode(PlanetMode::Mine);
        b.set_mode(PlanetMode::Mine);
        a.run_production_tick(&registry, &[], 1.0, false);
        b.run_production_tick(&registry, &[], 1.0, false);
        assert_eq!(a.resources, b.resources);
        assert_eq!(a.mode, b.mode);
    }

    #[test]
    fn build_queue_completion_transitions_slot_to_built() {
        let registry = test_registry();
        let mut planet = colonized_planet();
        planet.industry_points = 1000.0;
        planet.start_build("mine_basic", &registry).unwrap();
        assert_eq!(planet.slots[0].status, SlotStatus::UnderConstruction);

        let completed = planet.tick_build(1.0, &registry);
        assert!(completed.is_some());
        assert_eq!(planet.slots[0].status, SlotStatus::Built);
    }

    #[test]
    fn compute_deltas_reports_only_changed_slots() {
        let mut planet = colonized_planet();
        assert!(planet.compute_deltas().is_empty());
        planet.slots[2].toggle_active();
        let deltas = planet.compute_deltas();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].slot_index, 2);
        assert!(planet.compute_deltas().is_empty());
    }
}
