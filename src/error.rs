use thiserror::Error;

/// Catalog loading failures (§4.1).
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed json in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("entry in {file} is missing a required `id` field")]
    MissingId { file: String },
}

/// Frame codec failures (§4.2, §7).
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame length {size} exceeds maximum of {max} bytes")]
    FrameTooLarge { size: u32, max: u32 },
    #[error("stream ended mid-frame")]
    Truncated,
    #[error("connection closed")]
    ConnectionClosed,
    #[error("messagepack decode failed: {0}")]
    Decode(String),
    #[error("messagepack encode failed: {0}")]
    Encode(String),
    #[error("unexpected io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session-layer failures (§4.3, §7).
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("login frame missing required fields")]
    Auth,
    #[error("connection closed")]
    ConnectionClosed,
}

/// Command dispatcher validation failures (§4.7, §7). `InsufficientInputs`
/// is intentionally absent here: a refine shortfall is a normal zero-yield
/// outcome, never an error (spec.md §7).
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown player {0}")]
    UnknownPlayer(String),
    #[error("unknown planet {0}")]
    UnknownPlanet(u64),
    #[error("unknown resource {0}")]
    UnknownResource(String),
    #[error("unknown item {0}")]
    UnknownItem(String),
    #[error("unknown slot type {0}")]
    UnknownSlotType(String),
    #[error("no available slot")]
    NoSlotAvailable,
}

/// Persistence failures (§4.4, §7). Logged and retried on the next tick,
/// never fatal to the process.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum NexoraError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
