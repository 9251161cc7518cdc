#![warn(missing_docs)]
//! Wire side of the HUD: sidebar objective packets, their framing, and a
//! [`scorehud_core::DisplaySink`] that emits them.

mod codec;
mod protocol;
mod sink;

pub use codec::{
    compute_schema_hash, decode_packet, decode_stream, encode_packet, CodecError, MAX_FRAME_LEN,
};
pub use protocol::{
    ScoreAction, ScoreEntry, ScorePacket, SortOrder, CRITERIA, DISPLAY_SLOT, OBJECTIVE_NAME,
    PROTOCOL_VERSION,
};
pub use sink::{MemoryTransport, PacketSink, PacketTransport};
