pub mod frame;
pub mod hex_coord;
pub mod messages;

pub use frame::{decode_payload, encode_frame, read_frame, write_frame, DEFAULT_MAX_FRAME_BYTES};
pub use hex_coord::{decode_hex_coord, encode_hex_coord, HEX_COORD_EXT_TYPE};
pub use messages::{ActionData, ActionKind, ClientMessage, GalaxyDict, ServerMessage};
