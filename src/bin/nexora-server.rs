use std::sync::Arc;

use log::*;
use tokio::time::Duration;

use nexora::config::CONFIG;
use nexora::player::PlayerManager;
use nexora::registry::Registry;
use nexora::scheduler::{run_build_tick_loop, run_persistence_tick_loop, run_production_tick_loop};
use nexora::session::{run_accept_loop, ClientRegistry};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    pretty_env_logger::init_timed();

    info!("loaded config: {:?}", *CONFIG);

    let registry = Arc::new(
        Registry::load_dir(&CONFIG.content_dir).expect("failed to load content registry"),
    );
    let player_manager = Arc::new(
        PlayerManager::load(&CONFIG.players_file, &CONFIG.save_dir, &registry)
            .expect("failed to load player store"),
    );
    let clients = Arc::new(ClientRegistry::default());

    tokio::spawn(run_build_tick_loop(
        player_manager.clone(),
        registry.clone(),
        clients.clone(),
        Duration::from_secs(CONFIG.build_tick_seconds),
        CONFIG.max_frame_bytes,
    ));
    tokio::spawn(run_production_tick_loop(
        player_manager.clone(),
        registry.clone(),
        clients.clone(),
        Duration::from_secs(CONFIG.production_tick_seconds),
        CONFIG.max_frame_bytes,
    ));
    tokio::spawn(run_persistence_tick_loop(
        player_manager.clone(),
        Duration::from_secs(CONFIG.persistence_tick_seconds),
    ));

    run_accept_loop(
        &CONFIG.listen_addr,
        CONFIG.listen_port,
        player_manager,
        registry,
        clients,
        CONFIG.max_frame_bytes,
    )
    .await
    .expect("accept loop exited");
}
