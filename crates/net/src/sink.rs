//! [`DisplaySink`] that speaks sidebar objective packets.

use crate::codec::{decode_stream, encode_packet};
use crate::protocol::{ScoreAction, ScoreEntry, ScorePacket, SortOrder};
use anyhow::{Context, Result};
use scorehud_core::{DisplaySink, Rank, RenderedState, SubjectId};
use std::collections::BTreeMap;
use tracing::trace;

/// Delivers encoded frames to a subject's client.
pub trait PacketTransport {
    /// Send one frame.
    fn send_frame(&mut self, subject: &SubjectId, frame: Vec<u8>) -> Result<()>;
}

/// Encodes sink operations as [`ScorePacket`] frames.
#[derive(Debug, Clone)]
pub struct PacketSink<T> {
    transport: T,
    sort_order: SortOrder,
}

impl<T: PacketTransport> PacketSink<T> {
    /// Sink over `transport` using `sort_order` for new objectives.
    pub fn new(transport: T, sort_order: SortOrder) -> Self {
        Self {
            transport,
            sort_order,
        }
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn send(&mut self, subject: &SubjectId, packet: &ScorePacket) -> Result<()> {
        let frame = encode_packet(packet)
            .with_context(|| format!("failed to encode packet for {subject}"))?;
        trace!(%subject, tag = packet.tag(), bytes = frame.len(), "sending score packet");
        self.transport.send_frame(subject, frame)
    }
}

impl<T: PacketTransport> DisplaySink for PacketSink<T> {
    fn create_display(&mut self, subject: &SubjectId, title: &str) -> Result<()> {
        let packet = ScorePacket::display(title, self.sort_order);
        self.send(subject, &packet)
    }

    fn remove_entries(&mut self, subject: &SubjectId, ranks: &[Rank]) -> Result<()> {
        self.send(subject, &ScorePacket::remove_lines(ranks))
    }

    fn set_entries(&mut self, subject: &SubjectId, state: &RenderedState) -> Result<()> {
        let packet = ScorePacket::SetScore {
            action: ScoreAction::Change,
            entries: state
                .iter()
                .map(|(rank, text)| ScoreEntry::line(rank, text))
                .collect(),
        };
        self.send(subject, &packet)
    }

    fn remove_display(&mut self, subject: &SubjectId) -> Result<()> {
        self.send(subject, &ScorePacket::remove_objective())
    }
}

/// Transport that keeps every frame in memory, per subject.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    streams: BTreeMap<SubjectId, Vec<u8>>,
    frames: usize,
}

impl MemoryTransport {
    /// Empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames sent so far, across all subjects.
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Raw bytes sent to `subject`.
    pub fn bytes_for(&self, subject: &SubjectId) -> &[u8] {
        self.streams.get(subject).map(Vec::as_slice).unwrap_or_default()
    }

    /// Decode everything sent to `subject`.
    pub fn packets_for(&self, subject: &SubjectId) -> Result<Vec<ScorePacket>> {
        decode_stream(self.bytes_for(subject))
            .with_context(|| format!("corrupt stream for {subject}"))
    }
}

impl PacketTransport for MemoryTransport {
    fn send_frame(&mut self, subject: &SubjectId, frame: Vec<u8>) -> Result<()> {
        self.streams
            .entry(subject.clone())
            .or_default()
            .extend_from_slice(&frame);
        self.frames += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> SubjectId {
        SubjectId::new("Alice")
    }

    #[test]
    fn lifecycle_emits_expected_packets() {
        let mut sink = PacketSink::new(MemoryTransport::new(), SortOrder::Ascending);
        let state: RenderedState = [(Rank(2), "Alice".to_string()), (Rank(1), "HP: 20".to_string())]
            .into_iter()
            .collect();

        sink.create_display(&alice(), "HUD").unwrap();
        sink.remove_entries(&alice(), &state.ranks()).unwrap();
        sink.set_entries(&alice(), &state).unwrap();
        sink.remove_display(&alice()).unwrap();

        let packets = sink.transport().packets_for(&alice()).unwrap();
        assert_eq!(packets.len(), 4);
        assert_eq!(packets[0], ScorePacket::display("HUD", SortOrder::Ascending));
        assert_eq!(packets[1], ScorePacket::remove_lines(&[Rank(1), Rank(2)]));
        assert_eq!(
            packets[2],
            ScorePacket::SetScore {
                action: ScoreAction::Change,
                entries: vec![
                    ScoreEntry::line(Rank(1), "HP: 20"),
                    ScoreEntry::line(Rank(2), "Alice"),
                ],
            }
        );
        assert_eq!(packets[3], ScorePacket::remove_objective());
    }

    #[test]
    fn streams_are_kept_per_subject() {
        let mut sink = PacketSink::new(MemoryTransport::new(), SortOrder::Descending);
        sink.create_display(&alice(), "A").unwrap();
        sink.create_display(&SubjectId::new("Bob"), "B").unwrap();

        assert_eq!(sink.transport().frames(), 2);
        assert_eq!(sink.transport().packets_for(&alice()).unwrap().len(), 1);
        assert!(sink
            .transport()
            .bytes_for(&SubjectId::new("Carol"))
            .is_empty());
    }
}
