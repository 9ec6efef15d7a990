//! Three independent periodic tick loops: build, production, and
//! persistence, each on its own interval and blind to the others (§4.8,
//! §5).

use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::planet::Patent;
use crate::player::PlayerManager;
use crate::protocol::ServerMessage;
use crate::registry::Registry;
use crate::session::ClientRegistry;

/// Advances every planet's build queue by one tick and pushes a
/// `planet_update` to whichever player owns it, if connected.
pub async fn run_build_tick_loop(
    player_manager: Arc<PlayerManager>,
    registry: Arc<Registry>,
    clients: Arc<ClientRegistry>,
    period: Duration,
    max_frame_bytes: u32,
) {
    let mut ticker = interval(period);
    let delta_seconds = period.as_secs_f64();
    loop {
        ticker.tick().await;
        let player_ids: Vec<_> = player_manager.iter().map(|e| *e.key()).collect();
        for player_id in player_ids {
            let Some(mut player) = player_manager.get_mut(player_id) else {
                continue;
            };
            for hex in player.galaxy.hexes.iter_mut() {
                let Some(system) = hex.contents.as_mut() else { continue };
                for planet in system.planets.iter_mut() {
                    if !planet.is_colonized {
                        continue;
                    }
                    if let Some(completed) = planet.tick_build(delta_seconds, &registry) {
                        let update = ServerMessage::PlanetUpdate {
                            planet_id: planet.id,
                            planet_global_id: planet.global_id,
                            action: completed_action_kind(),
                            new_state: planet.clone(),
                        };
                        drop_and_push(&clients, player_id, update, max_frame_bytes);
                    }
                }
            }
        }
    }
}

fn completed_action_kind() -> crate::protocol::ActionKind {
    // A build completion isn't itself a client-issued action; reuse
    // `add_slot` as the closest-fitting tag rather than growing the enum
    // for a single server-originated case.
    crate::protocol::ActionKind::AddSlot
}

/// Runs farm/mine/refine production for every colonized planet and
/// pushes a `planet_resource_update` per planet.
pub async fn run_production_tick_loop(
    player_manager: Arc<PlayerManager>,
    registry: Arc<Registry>,
    clients: Arc<ClientRegistry>,
    period: Duration,
    max_frame_bytes: u32,
) {
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        let player_ids: Vec<_> = player_manager.iter().map(|e| *e.key()).collect();
        for player_id in player_ids {
            let Some(mut player) = player_manager.get_mut(player_id) else {
                continue;
            };
            let patents: Vec<Patent> = player.patents.clone();
            for hex in player.galaxy.hexes.iter_mut() {
                let Some(system) = hex.contents.as_mut() else { continue };
                for planet in system.planets.iter_mut() {
                    if !planet.is_colonized {
                        continue;
                    }
                    planet.run_production_tick(&registry, &patents, 1.0, false);
                    let update = ServerMessage::PlanetResourceUpdate {
                        planet_global_id: planet.global_id,
                        resources: planet.resources.clone(),
                        statistics: planet.statistics.clone(),
                    };
                    drop_and_push(&clients, player_id, update, max_frame_bytes);
                }
            }
        }
    }
}

/// Persists every loaded player's metadata and galaxy to disk.
pub async fn run_persistence_tick_loop(player_manager: Arc<PlayerManager>, period: Duration) {
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        if let Err(e) = player_manager.save_all() {
            log::error!("persistence tick failed: {e}");
        }
    }
}

/// Pushing is async but these loops hold a `DashMap` guard across the
/// planet mutation; spawn the push so the guard is dropped first and a
/// slow client can't stall the tick for every other player.
fn drop_and_push(clients: &Arc<ClientRegistry>, player_id: uuid::Uuid, message: ServerMessage, max_frame_bytes: u32) {
    let clients = clients.clone();
    tokio::spawn(async move {
        clients.push_to_player(player_id, &message, max_frame_bytes).await;
    });
}
