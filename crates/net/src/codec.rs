//! Packet framing.
//!
//! Frame format: `[length: u32 LE][tag: u8][postcard payload]`, where
//! `length` counts the tag and payload but not itself.

use crate::protocol::{ScorePacket, OBJECTIVE_NAME, PROTOCOL_VERSION};
use thiserror::Error;

/// Largest frame body accepted by the decoder.
pub const MAX_FRAME_LEN: usize = 64 * 1024;

/// Frame decoding failures.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Fewer bytes than a header.
    #[error("frame too short: {0} bytes (minimum 5)")]
    TooShort(usize),

    /// Header promises more bytes than are present.
    #[error("incomplete frame: expected {expected} bytes, got {got}")]
    Incomplete {
        /// Bytes the header asks for, header included.
        expected: usize,
        /// Bytes available.
        got: usize,
    },

    /// Header length exceeds [`MAX_FRAME_LEN`].
    #[error("frame of {0} bytes exceeds limit")]
    Oversized(usize),

    /// Tag does not match the decoded packet kind.
    #[error("frame tag {tag} does not match packet kind {kind}")]
    TagMismatch {
        /// Tag in the header.
        tag: u8,
        /// Tag of the decoded packet.
        kind: u8,
    },

    /// Payload is not a valid packet.
    #[error("malformed payload: {0}")]
    Payload(#[from] postcard::Error),
}

/// Hash of the protocol definition, for compatibility checks between builds.
pub fn compute_schema_hash() -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&PROTOCOL_VERSION.to_le_bytes());
    hasher.update(OBJECTIVE_NAME.as_bytes());
    hasher.update(b"SetDisplayObjective");
    hasher.update(b"SetScore");
    hasher.update(b"RemoveObjective");

    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

/// Encode one packet as a frame.
pub fn encode_packet(packet: &ScorePacket) -> Result<Vec<u8>, CodecError> {
    let payload = postcard::to_allocvec(packet)?;
    let length = 1 + payload.len();

    let mut frame = Vec::with_capacity(4 + length);
    frame.extend_from_slice(&(length as u32).to_le_bytes());
    frame.push(packet.tag());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

/// Decode the frame at the start of `data`.
///
/// Returns the packet and the number of bytes consumed.
pub fn decode_packet(data: &[u8]) -> Result<(ScorePacket, usize), CodecError> {
    if data.len() < 5 {
        return Err(CodecError::TooShort(data.len()));
    }
    let length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;
    if length > MAX_FRAME_LEN {
        return Err(CodecError::Oversized(length));
    }
    if length == 0 || data.len() < 4 + length {
        return Err(CodecError::Incomplete {
            expected: 4 + length,
            got: data.len(),
        });
    }

    let tag = data[4];
    let packet: ScorePacket = postcard::from_bytes(&data[5..4 + length])?;
    if packet.tag() != tag {
        return Err(CodecError::TagMismatch {
            tag,
            kind: packet.tag(),
        });
    }
    Ok((packet, 4 + length))
}

/// Decode every frame in `data`.
pub fn decode_stream(mut data: &[u8]) -> Result<Vec<ScorePacket>, CodecError> {
    let mut packets = Vec::new();
    while !data.is_empty() {
        let (packet, used) = decode_packet(data)?;
        packets.push(packet);
        data = &data[used..];
    }
    Ok(packets)
}
