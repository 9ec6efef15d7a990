//! The eight wire message shapes of §6, plus the dispatcher's closed
//! `action` enum (Design Notes: "`action` and `feature` should be closed
//! enums", "a snapshot `planet_dict` is a well-typed record, not a bag").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::galaxy::Hex;
use crate::planet::Planet;
use crate::registry::{Category, RegistryEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SetMode,
    ApplyResource,
    ToggleSlot,
    AddSlot,
    RemoveSlot,
    BuildDefenseUnit,
}

/// `data` in a `planet_action` is a string (mode name, resource id, slot
/// type, or item id) for every action except `toggle_slot`, which
/// addresses an existing slot by index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionData {
    Index(usize),
    Text(String),
}

impl ActionData {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ActionData::Text(s) => Some(s),
            ActionData::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            ActionData::Index(i) => Some(*i),
            ActionData::Text(s) => s.parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Login {
        name: String,
        #[serde(default)]
        token: Option<Uuid>,
    },
    PlanetAction {
        action: ActionKind,
        planet_global_id: u64,
        planet_id: u32,
        data: ActionData,
        #[serde(default)]
        resource: Option<String>,
        player_id: Uuid,
    },
}

/// The wire/persistence shape for a hex tile is `Hex` itself — its
/// fields already match the `hex_dict` schema of §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalaxyDict {
    pub width: u32,
    pub height: u32,
    pub grid: Vec<Hex>,
    pub owner: Uuid,
    pub protected: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    LoginAck {
        player_id: Uuid,
        token: Uuid,
        home_system_id: Uuid,
    },
    RegistrySync {
        registry: HashMap<Category, HashMap<String, RegistryEntry>>,
    },
    FullGalaxySync {
        galaxy: GalaxyDict,
    },
    PlanetUpdate {
        planet_id: u32,
        planet_global_id: u64,
        action: ActionKind,
        new_state: Planet,
    },
    PlanetResourceUpdate {
        planet_global_id: u64,
        resources: HashMap<String, f64>,
        statistics: HashMap<String, f64>,
    },
}
