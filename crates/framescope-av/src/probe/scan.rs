//! Frame scan loop over the primary video stream.

use super::types::{FrameRecord, MediaType, StreamDescriptor};
use crate::backend::{CompressedPacket, Container, DecodedFrame, FrameDecoder};

/// Index of the first video stream, the scan target.
pub fn scan_target(streams: &[StreamDescriptor]) -> Option<usize> {
    streams
        .iter()
        .find(|s| s.media_type == MediaType::Video)
        .map(|s| s.index)
}

/// Read every remaining packet and record a [`FrameRecord`] per decoded frame
/// of `target`.
///
/// Packets of other streams are discarded before they reach the decoder.
/// With `drain` set, frames still buffered by the decoder at end of stream
/// are collected as well; frames the decoder already finished are always
/// recorded.
pub fn scan_frames<C: Container>(
    container: &mut C,
    decoder: &mut C::Decoder,
    target: usize,
    drain: bool,
) -> Vec<FrameRecord> {
    let mut frames = Vec::new();
    let mut packets = 0usize;
    let mut skipped = 0usize;

    while let Some(packet) = container.next_packet() {
        if packet.stream_index() != target {
            skipped += 1;
            continue;
        }
        packets += 1;

        if let Some(frame) = decoder.decode(&packet) {
            frames.push(record(frame));
        }
    }

    let remaining = if drain {
        decoder.drain()
    } else {
        decoder.take_decoded()
    };
    frames.extend(remaining.into_iter().map(record));

    #[cfg(feature = "tracing")]
    tracing::debug!(
        stream = target,
        packets,
        skipped,
        frames = frames.len(),
        "frame scan complete"
    );
    #[cfg(not(feature = "tracing"))]
    let _ = (packets, skipped);

    frames
}

fn record(frame: DecodedFrame) -> FrameRecord {
    FrameRecord {
        picture_type: frame.picture_type,
        frame_number: frame.frame_number,
        packet_size: frame.packet_size,
        pts: frame.pts,
    }
}
