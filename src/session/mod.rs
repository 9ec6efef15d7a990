//! TCP accept loop, login handshake, and the per-connection command loop
//! (§4.3). Every outbound write is serialized by a per-client mutex so
//! command acks and scheduler-driven pushes never interleave.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dispatcher::handle_planet_action;
use crate::error::{ProtocolError, SessionError};
use crate::player::PlayerManager;
use crate::protocol::{read_frame, write_frame, ClientMessage, GalaxyDict, ServerMessage};
use crate::registry::Registry;

type Writer = Arc<Mutex<OwnedWriteHalf>>;

/// Reads one frame off the connection, surfacing a clean close at a
/// frame boundary as `SessionError::ConnectionClosed` rather than
/// folding it into the generic `Protocol` variant (§4.2, §7).
async fn read_message<T, R>(reader: &mut R, max_frame_bytes: u32) -> Result<T, SessionError>
where
    T: serde::de::DeserializeOwned,
    R: tokio::io::AsyncRead + Unpin,
{
    match read_frame(reader, max_frame_bytes).await {
        Ok(value) => Ok(value),
        Err(ProtocolError::ConnectionClosed) => Err(SessionError::ConnectionClosed),
        Err(e) => Err(SessionError::Protocol(e)),
    }
}

/// Tracks every live connection and which connection currently owns a
/// given player, so scheduler-driven pushes can find the right writer
/// (§4.3, §4.8).
#[derive(Default)]
pub struct ClientRegistry {
    writers: DashMap<Uuid, Writer>,
    client_for_player: DashMap<Uuid, Uuid>,
}

impl ClientRegistry {
    pub fn register(&self, connection_id: Uuid, player_id: Uuid, writer: Writer) {
        self.writers.insert(connection_id, writer);
        self.client_for_player.insert(player_id, connection_id);
    }

    pub fn unregister(&self, connection_id: Uuid, player_id: Uuid) {
        self.writers.remove(&connection_id);
        // Only drop the player->connection mapping if it still points at
        // this connection (a reconnect may have already replaced it).
        if let Some(entry) = self.client_for_player.get(&player_id) {
            if *entry == connection_id {
                drop(entry);
                self.client_for_player.remove(&player_id);
            }
        }
    }

    /// Silent no-op if the player isn't currently connected (§4.8).
    pub async fn push_to_player(&self, player_id: Uuid, message: &ServerMessage, max_frame_bytes: u32) {
        let Some(connection_id) = self.client_for_player.get(&player_id).map(|r| *r) else {
            return;
        };
        let Some(writer) = self.writers.get(&connection_id).map(|r| r.clone()) else {
            return;
        };
        let mut guard = writer.lock().await;
        if write_frame(&mut *guard, message, max_frame_bytes).await.is_err() {
            drop(guard);
            self.unregister(connection_id, player_id);
        }
    }
}

pub async fn run_accept_loop(
    listen_addr: &str,
    listen_port: u16,
    player_manager: Arc<PlayerManager>,
    registry: Arc<Registry>,
    clients: Arc<ClientRegistry>,
    max_frame_bytes: u32,
) -> std::io::Result<()> {
    let listener = TcpListener::bind((listen_addr, listen_port)).await?;
    log::info!("listening on {listen_addr}:{listen_port}");
    loop {
        let (stream, peer) = listener.accept().await?;
        log::info!("accepted connection from {peer}");
        let player_manager = player_manager.clone();
        let registry = registry.clone();
        let clients = clients.clone();
        tokio::spawn(async move {
            let connection_id = Uuid::new_v4();
            if let Err(e) =
                handle_connection(stream, connection_id, player_manager, registry, clients.clone(), max_frame_bytes)
                    .await
            {
                log::warn!("connection {peer} closed: {e}");
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    connection_id: Uuid,
    player_manager: Arc<PlayerManager>,
    registry: Arc<Registry>,
    clients: Arc<ClientRegistry>,
    max_frame_bytes: u32,
) -> Result<(), SessionError> {
    let (mut read_half, write_half) = stream.into_split();
    let writer: Writer = Arc::new(Mutex::new(write_half));

    let login: ClientMessage = read_message(&mut read_half, max_frame_bytes).await?;
    let (name, token) = match login {
        ClientMessage::Login { name, token } => (name, token),
        _ => return Err(SessionError::Auth),
    };
    if name.is_empty() {
        return Err(SessionError::Auth);
    }

    let player_id = player_manager
        .resolve(token, name, &registry)
        .map_err(|_| SessionError::Auth)?;

    clients.register(connection_id, player_id, writer.clone());

    {
        let player = player_manager.get(player_id).ok_or(SessionError::Auth)?;
        let ack = ServerMessage::LoginAck {
            player_id,
            token: player.token(),
            home_system_id: player.home_system_id(),
        };
        let mut guard = writer.lock().await;
        write_frame(&mut *guard, &ack, max_frame_bytes).await?;
        write_frame(
            &mut *guard,
            &ServerMessage::RegistrySync { registry: registry.to_wire() },
            max_frame_bytes,
        )
        .await?;
        write_frame(
            &mut *guard,
            &ServerMessage::FullGalaxySync {
                galaxy: GalaxyDict {
                    width: player.galaxy.width,
                    height: player.galaxy.height,
                    grid: player.galaxy.hexes.clone(),
                    owner: player_id,
                    protected: false,
                },
            },
            max_frame_bytes,
        )
        .await?;
    }

    let result = command_loop(&mut read_half, &writer, player_id, &player_manager, &registry, max_frame_bytes).await;
    clients.unregister(connection_id, player_id);
    result
}

async fn command_loop(
    read_half: &mut tokio::net::tcp::OwnedReadHalf,
    writer: &Writer,
    player_id: Uuid,
    player_manager: &PlayerManager,
    registry: &Registry,
    max_frame_bytes: u32,
) -> Result<(), SessionError> {
    loop {
        let message: ClientMessage = read_message(read_half, max_frame_bytes).await?;
        let ClientMessage::PlanetAction {
            action,
            planet_global_id,
            planet_id,
            data,
            resource: _,
            player_id: commanding_player_id,
        } = message
        else {
            log::warn!("unexpected message type after login, ignoring");
            continue;
        };

        if commanding_player_id != player_id {
            log::warn!("player {commanding_player_id} does not match connection owner {player_id}, dropping");
            continue;
        }

        match handle_planet_action(player_manager, registry, player_id, planet_global_id, action, data) {
            Ok(new_state) => {
                let update = ServerMessage::PlanetUpdate {
                    planet_id,
                    planet_global_id,
                    action,
                    new_state,
                };
                let mut guard = writer.lock().await;
                write_frame(&mut *guard, &update, max_frame_bytes).await?;
            }
            Err(e) => {
                log::warn!("dispatcher dropped command: {e}");
            }
        }
    }
}
