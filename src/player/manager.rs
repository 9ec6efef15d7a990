//! Persistent store of players: resolves logins, creates new players,
//! loads/saves each player's galaxy in its own file (§4.4).

use std::path::{Path, PathBuf};

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::galaxy::GalaxyMap;
use crate::player::{Player, PlayerRecord};
use crate::registry::Registry;

pub const DEFAULT_GALAXY_WIDTH: u32 = 10;
pub const DEFAULT_GALAXY_HEIGHT: u32 = 10;
pub const DEFAULT_STAR_DENSITY: f64 = 40.0;
pub const DEFAULT_NEBULA_DENSITY: f64 = 20.0;

pub struct PlayerManager {
    players: DashMap<Uuid, Player>,
    token_index: DashMap<Uuid, Uuid>,
    players_file: PathBuf,
    save_dir: PathBuf,
}

impl PlayerManager {
    /// Loads every player entry in `players_file`, attaching each
    /// player's galaxy from its `galaxy_path` (generating a fresh one if
    /// the file is missing) (§4.4).
    pub fn load(
        players_file: &Path,
        save_dir: &Path,
        registry: &Registry,
    ) -> Result<PlayerManager, PersistenceError> {
        let players = DashMap::new();
        let token_index = DashMap::new();

        if players_file.exists() {
            let text = std::fs::read_to_string(players_file)?;
            let records: Vec<PlayerRecord> = serde_json::from_str(&text)?;
            for record in records {
                let galaxy = if record.galaxy_path.exists() {
                    let galaxy_text = std::fs::read_to_string(&record.galaxy_path)?;
                    serde_json::from_str(&galaxy_text)?
                } else {
                    let mut rng = rand::rng();
                    let galaxy = GalaxyMap::generate_for_player(
                        record.id,
                        DEFAULT_GALAXY_WIDTH,
                        DEFAULT_GALAXY_HEIGHT,
                        DEFAULT_STAR_DENSITY,
                        DEFAULT_NEBULA_DENSITY,
                        registry,
                        &mut rng,
                    );
                    Self::write_galaxy(&record.galaxy_path, &galaxy)?;
                    galaxy
                };
                token_index.insert(record.token, record.id);
                players.insert(
                    record.id,
                    Player {
                        record,
                        galaxy,
                        patents: Vec::new(),
                    },
                );
            }
        }

        Ok(PlayerManager {
            players,
            token_index,
            players_file: players_file.to_path_buf(),
            save_dir: save_dir.to_path_buf(),
        })
    }

    /// Returns the resolved player's id: an existing player if `token`
    /// matches, otherwise a freshly created one (Testable Property 3).
    pub fn resolve(&self, token: Option<Uuid>, name: String, registry: &Registry) -> Result<Uuid, PersistenceError> {
        if let Some(token) = token {
            if let Some(id) = self.token_index.get(&token).map(|r| *r) {
                if let Some(mut player) = self.players.get_mut(&id) {
                    player.touch_last_seen();
                    return Ok(id);
                }
            }
        }
        self.create_player(name, registry)
    }

    pub fn create_player(&self, name: String, registry: &Registry) -> Result<Uuid, PersistenceError> {
        let id = Uuid::new_v4();
        let token = Uuid::new_v4();
        let galaxy_path = self.save_dir.join(format!("galaxy-{id}.json"));
        let mut rng = rand::rng();
        let galaxy = GalaxyMap::generate_for_player(
            id,
            DEFAULT_GALAXY_WIDTH,
            DEFAULT_GALAXY_HEIGHT,
            DEFAULT_STAR_DENSITY,
            DEFAULT_NEBULA_DENSITY,
            registry,
            &mut rng,
        );
        let home_system_id = galaxy.starting_hex.unwrap_or_else(Uuid::new_v4);

        let record = PlayerRecord {
            id,
            name,
            token,
            home_system_id,
            last_seen: Utc::now(),
            galaxy_path: galaxy_path.clone(),
        };

        Self::write_galaxy(&galaxy_path, &galaxy)?;
        self.token_index.insert(token, id);
        self.players.insert(
            id,
            Player {
                record,
                galaxy,
                patents: Vec::new(),
            },
        );
        self.save_all()?;
        Ok(id)
    }

    pub fn get(&self, id: Uuid) -> Option<dashmap::mapref::one::Ref<'_, Uuid, Player>> {
        self.players.get(&id)
    }

    pub fn get_mut(&self, id: Uuid) -> Option<dashmap::mapref::one::RefMut<'_, Uuid, Player>> {
        self.players.get_mut(&id)
    }

    pub fn iter(&self) -> dashmap::iter::Iter<'_, Uuid, Player> {
        self.players.iter()
    }

    fn write_galaxy(path: &Path, galaxy: &GalaxyMap) -> Result<(), PersistenceError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(galaxy)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Writes metadata plus every loaded galaxy to its own file. Never
    /// inlines a galaxy in `players.json` (§4.4, §6).
    pub fn save_all(&self) -> Result<(), PersistenceError> {
        if let Some(parent) = self.players_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let records: Vec<PlayerRecord> = self.players.iter().map(|e| e.record.clone()).collect();
        let text = serde_json::to_string_pretty(&records)?;
        std::fs::write(&self.players_file, text)?;

        for entry in self.players.iter() {
            Self::write_galaxy(&entry.record.galaxy_path, &entry.galaxy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn persistence_round_trips_player_metadata() {
        let tmp = tempfile::tempdir().unwrap();
        let players_file = tmp.path().join("players.json");
        let save_dir = tmp.path().join("saves");
        let registry = Registry::default();

        let manager = PlayerManager::load(&players_file, &save_dir, &registry).unwrap();
        let id = manager.create_player("Alice".into(), &registry).unwrap();
        let token = manager.get(id).unwrap().token();
        let home_system_id = manager.get(id).unwrap().home_system_id();

        let reloaded = PlayerManager::load(&players_file, &save_dir, &registry).unwrap();
        let player = reloaded.get(id).unwrap();
        assert_eq!(player.token(), token);
        assert_eq!(player.home_system_id(), home_system_id);
        assert_eq!(player.name(), "Alice");
    }

    #[test]
    fn resolve_with_unknown_token_creates_a_new_player() {
        let tmp = tempfile::tempdir().unwrap();
        let players_file = tmp.path().join("players.json");
        let save_dir = tmp.path().join("saves");
        let registry = Registry::default();
        let manager = PlayerManager::load(&players_file, &save_dir, &registry).unwrap();

        let id = manager.resolve(None, "Bob".into(), &registry).unwrap();
        assert!(manager.get(id).is_some());

        let token = manager.get(id).unwrap().token();
        let id_again = manager.resolve(Some(token), "Bob".into(), &registry).unwrap();
        assert_eq!(id, id_again);
    }
}
