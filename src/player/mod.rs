//! Player identity and the galaxy it owns (§3, §4.4).

pub mod manager;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::galaxy::GalaxyMap;
use crate::planet::Patent;

pub use manager::PlayerManager;

/// The persisted metadata row in `players.json`. Never embeds the
/// galaxy (§4.4, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: Uuid,
    pub name: String,
    pub token: Uuid,
    pub home_system_id: Uuid,
    pub last_seen: DateTime<Utc>,
    pub galaxy_path: PathBuf,
}

/// The runtime player: metadata plus its attached galaxy.
#[derive(Debug, Clone)]
pub struct Player {
    pub record: PlayerRecord,
    pub galaxy: GalaxyMap,
    pub patents: Vec<Patent>,
}

impl Player {
    pub fn id(&self) -> Uuid {
        self.record.id
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn token(&self) -> Uuid {
        self.record.token
    }

    pub fn home_system_id(&self) -> Uuid {
        self.record.home_system_id
    }

    pub fn touch_last_seen(&mut self) {
        self.record.last_seen = Utc::now();
    }
}
