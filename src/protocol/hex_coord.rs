//! The reserved MessagePack extension type (code 1) for compact hex
//! coordinates: three signed 32-bit big-endian integers `(q, r, s)`
//! packed into 12 bytes (§4.2, §6, Testable Property 2).

use crate::error::ProtocolError;

pub const HEX_COORD_EXT_TYPE: i8 = 1;

pub fn encode_hex_coord(q: i32, r: i32, s: i32) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::with_capacity(16);
    rmp::encode::write_ext_meta(&mut buf, 12, HEX_COORD_EXT_TYPE)
        .map_err(|e| ProtocolError::Encode(e.to_string()))?;
    buf.extend_from_slice(&q.to_be_bytes());
    buf.extend_from_slice(&r.to_be_bytes());
    buf.extend_from_slice(&s.to_be_bytes());
    Ok(buf)
}

pub fn decode_hex_coord(bytes: &[u8]) -> Result<(i32, i32, i32), ProtocolError> {
    let mut cursor = bytes;
    let meta = rmp::decode::read_ext_meta(&mut cursor)
        .map_err(|e| ProtocolError::Decode(e.to_string()))?;
    if meta.typeid != HEX_COORD_EXT_TYPE || meta.size != 12 {
        return Err(ProtocolError::Decode(format!(
            "unexpected ext meta for HexCoord: type={} size={}",
            meta.typeid, meta.size
        )));
    }
    if cursor.len() < 12 {
        return Err(ProtocolError::Truncated);
    }
    let q = i32::from_be_bytes(cursor[0..4].try_into().unwrap());
    let r = i32::from_be_bytes(cursor[4..8].try_into().unwrap());
    let s = i32::from_be_bytes(cursor[8..12].try_into().unwrap());
    Ok((q, r, s))
}
