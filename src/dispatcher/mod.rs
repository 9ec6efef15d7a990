//! Validates and applies the six recognized `planet_action` commands
//! (§4.7). An unknown player or planet is logged and dropped, never an
//! error the connection sees — only structurally invalid commands
//! surface as a `DispatchError` to the caller.

use uuid::Uuid;

use crate::error::DispatchError;
use crate::planet::{Planet, PlanetMode, SlotType};
use crate::player::PlayerManager;
use crate::protocol::{ActionData, ActionKind};
use crate::registry::Registry;

pub fn handle_planet_action(
    player_manager: &PlayerManager,
    registry: &Registry,
    player_id: Uuid,
    planet_global_id: u64,
    action: ActionKind,
    data: ActionData,
) -> Result<Planet, DispatchError> {
    let mut player = player_manager
        .get_mut(player_id)
        .ok_or_else(|| DispatchError::UnknownPlayer(player_id.to_string()))?;

    let planet = player
        .galaxy
        .find_mut_by_planet_global_id(planet_global_id)
        .ok_or(DispatchError::UnknownPlanet(planet_global_id))?;

    match action {
        ActionKind::SetMode => {
            let mode_name = data.as_text().ok_or(DispatchError::NoSlotAvailable)?;
            let mode = parse_mode(mode_name)?;
            planet.set_mode(mode);
        }
        ActionKind::ApplyResource => {
            let resource_id = data
                .as_text()
                .ok_or_else(|| DispatchError::UnknownResource(String::new()))?;
            if registry.get(resource_id).is_none() {
                return Err(DispatchError::UnknownResource(resource_id.to_string()));
            }
            planet.set_current_resource(resource_id.to_string());
        }
        ActionKind::ToggleSlot => {
            let index = data.as_index().ok_or(DispatchError::NoSlotAvailable)?;
            planet.toggle_slot(index)?;
        }
        ActionKind::AddSlot => {
            let item_id = data.as_text().ok_or_else(|| DispatchError::UnknownItem(String::new()))?;
            planet.start_build(item_id, registry)?;
        }
        ActionKind::RemoveSlot => {
            let slot_type = match data.as_text() {
                None | Some("") => None,
                Some(name) => Some(
                    parse_slot_type(name).ok_or_else(|| DispatchError::UnknownSlotType(name.to_string()))?,
                ),
            };
            planet.remove_building_from_slot(slot_type)?;
        }
        ActionKind::BuildDefenseUnit => {
            let item_id = data.as_text().ok_or_else(|| DispatchError::UnknownItem(String::new()))?;
            planet.start_build(item_id, registry)?;
        }
    }

    Ok(planet.clone())
}

fn parse_mode(name: &str) -> Result<PlanetMode, DispatchError> {
    match name {
        "mine" => Ok(PlanetMode::Mine),
        "refine" => Ok(PlanetMode::Refine),
        "nil" => Ok(PlanetMode::Nil),
        other => Err(DispatchError::UnknownResource(other.to_string())),
    }
}

fn parse_slot_type(name: &str) -> Option<SlotType> {
    match name {
        "farm" => Some(SlotType::Farm),
        "mine" => Some(SlotType::Mine),
        "refine" => Some(SlotType::Refine),
        "industry" => Some(SlotType::Industry),
        "energy" => Some(SlotType::Energy),
        "science" => Some(SlotType::Science),
        _ => None,
    }
}
