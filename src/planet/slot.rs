//! An atomic build site on a planet (§3, §4.5.1).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    Empty,
    Farm,
    Mine,
    Refine,
    Industry,
    Energy,
    Science,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Empty,
    UnderConstruction,
    Built,
}

/// Invariant: `type = empty ⇔ status = empty`; `status = built ⇒ type ≠ empty`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub slot_type: SlotType,
    pub status: SlotStatus,
    #[serde(default = "default_active")]
    pub active: bool,
    pub building_id: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Slot {
    pub fn empty() -> Slot {
        Slot {
            slot_type: SlotType::Empty,
            status: SlotStatus::Empty,
            active: true,
            building_id: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.slot_type == SlotType::Empty && self.status == SlotStatus::Empty
    }

    pub fn is_available(&self) -> bool {
        self.is_empty()
    }

    pub fn is_used(&self) -> bool {
        self.slot_type != SlotType::Empty
    }

    pub fn start_construction(&mut self, slot_type: SlotType, building_id: String) {
        self.slot_type = slot_type;
        self.status = SlotStatus::UnderConstruction;
        self.building_id = Some(building_id);
        self.active = true;
    }

    pub fn complete_construction(&mut self) {
        self.status = SlotStatus::Built;
    }

    pub fn clear(&mut self) {
        *self = Slot::empty();
    }

    pub fn toggle_active(&mut self) {
        self.active = !self.active;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_satisfies_invariant() {
        let slot = Slot::empty();
        assert!(slot.is_empty());
        assert!(slot.is_available());
        assert!(!slot.is_used());
    }

    #[test]
    fn construction_lifecycle() {
        let mut slot = Slot::empty();
        slot.start_construction(SlotType::Mine, "mine_basic".into());
        assert_eq!(slot.status, SlotStatus::UnderConstruction);
        assert!(slot.is_used());
        assert!(!slot.is_empty());
        slot.complete_construction();
        assert_eq!(slot.status, SlotStatus::Built);
        slot.clear();
        assert!(slot.is_empty());
    }

    #[test]
    fn toggle_active_flips_flag() {
        let mut slot = Slot::empty();
        assert!(slot.active);
        slot.toggle_active();
        assert!(!slot.active);
    }
}
