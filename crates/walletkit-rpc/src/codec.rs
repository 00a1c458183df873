use bytes::{Buf, BufMut, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::{Result, RpcError};

/// Frame header: magic (2) + length (4) + request id (4) + command (2) = 12 bytes.
pub const HEADER_SIZE: usize = 12;

/// Magic bytes: "WK" (0x57 0x4B).
pub const MAGIC: [u8; 2] = [0x57, 0x4B];

/// Default maximum payload size: 16 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 16 * 1024 * 1024;

/// A framed command or reply with request/reply correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Host-assigned request id; a reply echoes the id of its request.
    pub request_id: u32,
    /// The command code this frame belongs to.
    pub command: u16,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(request_id: u32, command: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            request_id,
            command,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬───────────┬─────────────┬──────────┬─────────────────┐
/// │ Magic (2B)   │ Length    │ Request id  │ Command  │ Payload         │
/// │ 0x57 0x4B    │ (4B LE)   │ (4B LE)     │ (2B LE)  │ (Length bytes)  │
/// │ "WK"         │           │             │          │                 │
/// └──────────────┴───────────┴─────────────┴──────────┴─────────────────┘
/// ```
pub fn encode_frame(
    request_id: u32,
    command: u16,
    payload: &[u8],
    dst: &mut BytesMut,
) -> Result<()> {
    if payload.len() > u32::MAX as usize {
        return Err(RpcError::PayloadTooLarge {
            size: payload.len(),
            max: u32::MAX as usize,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&MAGIC);
    dst.put_u32_le(payload.len() as u32);
    dst.put_u32_le(request_id);
    dst.put_u16_le(command);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    if src.len() < HEADER_SIZE {
        return Ok(None); // Need more data
    }

    // Check magic
    if src[0..2] != MAGIC {
        return Err(RpcError::InvalidMagic);
    }

    let payload_len = u32::from_le_bytes(src[2..6].try_into().unwrap()) as usize;
    let request_id = u32::from_le_bytes(src[6..10].try_into().unwrap());
    let command = u16::from_le_bytes(src[10..12].try_into().unwrap());

    if payload_len > max_payload {
        return Err(RpcError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    let total = HEADER_SIZE + payload_len;
    if src.len() < total {
        return Ok(None); // Need more data
    }

    src.advance(HEADER_SIZE);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame {
        request_id,
        command,
        payload,
    }))
}

/// `tokio_util` codec for the worklet channel.
///
/// Plugs the frame format into `FramedRead`/`FramedWrite` so the dispatch
/// loop never sees partial reads.
#[derive(Debug, Clone)]
pub struct RpcCodec {
    max_payload: usize,
}

impl RpcCodec {
    /// Create a codec with an explicit payload cap.
    pub fn new(max_payload: usize) -> Self {
        Self { max_payload }
    }

    /// Current payload cap in bytes.
    pub fn max_payload(&self) -> usize {
        self.max_payload
    }
}

impl Default for RpcCodec {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PAYLOAD)
    }
}

impl Decoder for RpcCodec {
    type Item = Frame;
    type Error = RpcError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        let frame = decode_frame(src, self.max_payload)?;
        if let Some(frame) = &frame {
            tracing::trace!(
                request = frame.request_id,
                command = frame.command,
                len = frame.payload.len(),
                "decoded frame"
            );
        }
        Ok(frame)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            None => Err(RpcError::ConnectionClosed),
        }
    }
}

impl Encoder<Frame> for RpcCodec {
    type Error = RpcError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<()> {
        if frame.payload.len() > self.max_payload {
            return Err(RpcError::PayloadTooLarge {
                size: frame.payload.len(),
                max: self.max_payload,
            });
        }
        encode_frame(frame.request_id, frame.command, &frame.payload, dst)
    }
}
