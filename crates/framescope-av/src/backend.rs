//! Adapter traits over the container/codec library.
//!
//! The probe engine only talks to these traits. The FFmpeg implementation
//! lives in `probe::native_ffmpeg`; tests drive the engine with a scripted
//! fake.
//!
//! Every handle owns its native resource and releases it on drop. Callers
//! keep the decoder in a binding declared after the container so it is
//! released first.

use crate::probe::{FormatInfo, MediaType, PictureType, TimeBase};
use crate::Result;
use std::path::Path;

/// Entry point into a container/codec library.
pub trait MediaLibrary {
    type Container: Container;

    /// Open a container and read its stream information.
    ///
    /// Fails with `OpenFailed` when the file cannot be opened or its format is
    /// not recognized, and with `HeaderUnreadable` when stream probing fails.
    fn open(&self, path: &Path) -> Result<Self::Container>;

    /// Version identifier of the library.
    fn version(&self) -> String;
}

/// An opened container.
pub trait Container {
    type Packet: CompressedPacket;
    type Decoder: FrameDecoder<Packet = Self::Packet>;

    /// Container-level header fields.
    fn format_info(&self) -> FormatInfo;

    /// Raw parameters of every declared stream, in container order.
    fn streams(&self) -> Vec<RawStreamParams>;

    /// Find and open a decoder for one stream.
    ///
    /// Fails with `DecoderNotFound` when no decoder is registered for the
    /// stream's codec and with `DecoderOpenFailed` when initialization fails.
    fn open_decoder(&self, stream_index: usize) -> Result<Self::Decoder>;

    /// Read the next packet, `None` at end of stream.
    fn next_packet(&mut self) -> Option<Self::Packet>;
}

/// Metadata every compressed packet exposes to the scan loop.
pub trait CompressedPacket {
    fn stream_index(&self) -> usize;
    fn size(&self) -> usize;
    fn pts(&self) -> Option<i64>;
}

/// An opened decoder for a single stream.
pub trait FrameDecoder {
    type Packet;

    /// Submit one packet and try to receive one frame.
    ///
    /// `None` means the decoder produced nothing for now (buffering or a
    /// rejected packet); it is not an error. A packet that yields several
    /// frames hands them out one per call, oldest first.
    fn decode(&mut self, packet: &Self::Packet) -> Option<DecodedFrame>;

    /// Frames already decoded but not yet handed out, without flushing.
    fn take_decoded(&mut self) -> Vec<DecodedFrame>;

    /// Signal end of input and collect every frame still buffered.
    fn drain(&mut self) -> Vec<DecodedFrame>;
}

/// Per-frame metadata returned by a decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFrame {
    pub picture_type: PictureType,
    /// Running count of frames this decoder produced, starting at 1.
    pub frame_number: u64,
    /// Size of the compressed packet the frame was decoded from.
    pub packet_size: usize,
    pub pts: Option<i64>,
}

/// Stream parameters as reported by the library, before normalization.
///
/// The `*_name` fields hold the outcome of the library's name lookups:
/// `None` when its tables have no entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawStreamParams {
    pub index: usize,
    pub id: i32,
    pub start_time: Option<i64>,
    pub duration: Option<i64>,
    pub time_base: TimeBase,
    pub media_type: MediaType,
    pub codec_tag: u32,
    pub decoder_name: Option<String>,
    pub format_name: Option<String>,
    pub bit_rate: i64,
    pub profile_name: Option<String>,
    pub level: i32,
    pub width: u32,
    pub height: u32,
    pub channels: u32,
    pub sample_rate: u32,
    pub frame_size: u32,
}
