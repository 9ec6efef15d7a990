//! Length-prefixed binary framing: a 4-byte big-endian length header
//! followed by exactly that many bytes of MessagePack payload (§4.2).

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;

/// Reads exactly `buf.len()` bytes, distinguishing a clean close at the
/// start of a new frame (`ConnectionClosed`, zero bytes consumed) from
/// EOF partway through one (`Truncated`, §4.2, §7).
async fn read_exact_or_closed<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), ProtocolError> {
    let mut read = 0;
    while read < buf.len() {
        let n = reader.read(&mut buf[read..]).await?;
        if n == 0 {
            return if read == 0 {
                Err(ProtocolError::ConnectionClosed)
            } else {
                Err(ProtocolError::Truncated)
            };
        }
        read += n;
    }
    Ok(())
}

pub const DEFAULT_MAX_FRAME_BYTES: u32 = 64 * 1024 * 1024;

pub fn encode_frame<T: Serialize>(value: &T) -> Result<Vec<u8>, ProtocolError> {
    let payload =
        rmp_serde::to_vec_named(value).map_err(|e| ProtocolError::Encode(e.to_string()))?;
    let len: u32 = payload
        .len()
        .try_into()
        .map_err(|_| ProtocolError::FrameTooLarge {
            size: u32::MAX,
            max: DEFAULT_MAX_FRAME_BYTES,
        })?;
    let mut framed = Vec::with_capacity(4 + payload.len());
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(&payload);
    Ok(framed)
}

pub fn decode_payload<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    rmp_serde::from_slice(payload).map_err(|e| ProtocolError::Decode(e.to_string()))
}

pub async fn write_frame<T, W>(writer: &mut W, value: &T, max_frame_bytes: u32) -> Result<(), ProtocolError>
where
    T: Serialize,
    W: AsyncWrite + Unpin,
{
    let framed = encode_frame(value)?;
    let payload_len = (framed.len() - 4) as u32;
    if payload_len > max_frame_bytes {
        return Err(ProtocolError::FrameTooLarge {
            size: payload_len,
            max: max_frame_bytes,
        });
    }
    writer.write_all(&framed).await?;
    Ok(())
}

pub async fn read_frame<T, R>(reader: &mut R, max_frame_bytes: u32) -> Result<T, ProtocolError>
where
    T: DeserializeOwned,
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    read_exact_or_closed(reader, &mut len_buf).await?;
    let len = u32::from_be_bytes(len_buf);
    if len > max_frame_bytes {
        return Err(ProtocolError::FrameTooLarge {
            size: len,
            max: max_frame_bytes,
        });
    }
    let mut payload = vec![0u8; len as usize];
    read_exact_or_closed(reader, &mut payload).await?;
    decode_payload(&payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Cursor;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Ping {
        n: u32,
        label: String,
    }

    #[tokio::test]
    async fn round_trips_a_single_frame() {
        let value = Ping {
            n: 7,
            label: "hello".into(),
        };
        let framed = encode_frame(&value).unwrap();
        let mut cursor = Cursor::new(framed);
        let decoded: Ping = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await.unwrap();
        assert_eq!(decoded, value);
    }

    #[tokio::test]
    async fn round_trips_two_frames_in_order() {
        let a = Ping {
            n: 1,
            label: "a".into(),
        };
        let b = Ping {
            n: 2,
            label: "b".into(),
        };
        let mut buf = encode_frame(&a).unwrap();
        buf.extend(encode_frame(&b).unwrap());
        let mut cursor = Cursor::new(buf);
        let first: Ping = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await.unwrap();
        let second: Ping = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await.unwrap();
        assert_eq!(first, a);
        assert_eq!(second, b);
    }

    #[tokio::test]
    async fn mid_frame_eof_is_truncated() {
        let value = Ping {
            n: 1,
            label: "x".into(),
        };
        let framed = encode_frame(&value).unwrap();
        let mut cursor = Cursor::new(framed[..framed.len() - 2].to_vec());
        let result: Result<Ping, _> = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await;
        assert!(matches!(result, Err(ProtocolError::Truncated)));
    }

    #[tokio::test]
    async fn eof_at_frame_boundary_is_connection_closed() {
        let mut cursor = Cursor::new(Vec::new());
        let result: Result<Ping, _> = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await;
        assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));
    }

    #[tokio::test]
    async fn eof_mid_length_header_is_truncated() {
        let mut cursor = Cursor::new(vec![0u8, 0u8]);
        let result: Result<Ping, _> = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await;
        assert!(matches!(result, Err(ProtocolError::Truncated)));
    }

    #[tokio::test]
    async fn oversized_length_header_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(DEFAULT_MAX_FRAME_BYTES + 1).to_be_bytes());
        let mut cursor = Cursor::new(buf);
        let result: Result<Ping, _> = read_frame(&mut cursor, DEFAULT_MAX_FRAME_BYTES).await;
        assert!(matches!(result, Err(ProtocolError::FrameTooLarge { .. })));
    }
}
