//! Scripted in-memory library used by the engine's unit tests.

use crate::backend::{
    CompressedPacket, Container, DecodedFrame, FrameDecoder, MediaLibrary, RawStreamParams,
};
use crate::probe::{build_descriptor, FormatInfo, MediaType, PictureType, StreamDescriptor, TimeBase};
use crate::{Error, Result};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::rc::Rc;

/// Shared log of acquire/release events.
pub type EventLog = Rc<RefCell<Vec<String>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Open,
    Header,
}

/// A fake stream declaration.
#[derive(Debug, Clone)]
pub struct FakeStream {
    pub params: RawStreamParams,
    pub has_decoder: bool,
    pub decoder_opens: bool,
}

impl FakeStream {
    pub fn video(index: usize, width: u32, height: u32) -> Self {
        Self {
            params: RawStreamParams {
                index,
                id: index as i32 + 1,
                start_time: Some(0),
                duration: Some(250),
                time_base: TimeBase::new(1, 25),
                media_type: MediaType::Video,
                codec_tag: u32::from_le_bytes(*b"avc1"),
                decoder_name: Some("h264".into()),
                format_name: Some("yuv420p".into()),
                bit_rate: 500_000,
                profile_name: Some("High".into()),
                level: 30,
                width,
                height,
                ..RawStreamParams::default()
            },
            has_decoder: true,
            decoder_opens: true,
        }
    }

    pub fn audio(index: usize) -> Self {
        Self {
            params: RawStreamParams {
                index,
                id: index as i32 + 1,
                start_time: Some(0),
                duration: Some(480_000),
                time_base: TimeBase::new(1, 48_000),
                media_type: MediaType::Audio,
                codec_tag: u32::from_le_bytes(*b"mp4a"),
                decoder_name: Some("aac".into()),
                format_name: Some("fltp".into()),
                bit_rate: 128_000,
                profile_name: Some("LC".into()),
                level: -99,
                channels: 2,
                sample_rate: 48_000,
                frame_size: 1024,
                ..RawStreamParams::default()
            },
            has_decoder: true,
            decoder_opens: true,
        }
    }

    pub fn subtitle(index: usize) -> Self {
        Self {
            params: RawStreamParams {
                index,
                id: index as i32 + 1,
                time_base: TimeBase::new(1, 1000),
                media_type: MediaType::Subtitle,
                decoder_name: Some("subrip".into()),
                ..RawStreamParams::default()
            },
            has_decoder: true,
            decoder_opens: true,
        }
    }

    pub fn without_decoder(mut self) -> Self {
        self.has_decoder = false;
        self.params.decoder_name = None;
        self
    }

    pub fn failing_decoder(mut self) -> Self {
        self.decoder_opens = false;
        self
    }
}

/// A fake compressed packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FakePacket {
    pub stream: usize,
    pub size: usize,
    pub pts: Option<i64>,
    /// Output position among buffered frames; falls back to pts, then to
    /// submission order.
    pub display: Option<i64>,
    pub picture: Option<PictureType>,
    /// Number of frames the packet decodes to.
    pub frames: usize,
    pub rejected: bool,
}

impl FakePacket {
    pub fn new(stream: usize, size: usize, pts: Option<i64>) -> Self {
        Self {
            stream,
            size,
            pts,
            display: None,
            picture: None,
            frames: 1,
            rejected: false,
        }
    }

    pub fn displayed_at(mut self, position: i64) -> Self {
        self.display = Some(position);
        self
    }

    pub fn picture(mut self, picture: PictureType) -> Self {
        self.picture = Some(picture);
        self
    }

    pub fn frames(mut self, count: usize) -> Self {
        self.frames = count;
        self
    }

    /// The decoder refuses this packet.
    pub fn rejected(mut self) -> Self {
        self.rejected = true;
        self
    }
}

impl CompressedPacket for FakePacket {
    fn stream_index(&self) -> usize {
        self.stream
    }

    fn size(&self) -> usize {
        self.size
    }

    fn pts(&self) -> Option<i64> {
        self.pts
    }
}

/// Builder-style fake [`MediaLibrary`].
#[derive(Debug, Clone)]
pub struct FakeLibrary {
    name: String,
    bit_rate: i64,
    duration: Option<i64>,
    streams: Vec<FakeStream>,
    packets: Vec<FakePacket>,
    decoder_delay: usize,
    failure: Option<Failure>,
    log: EventLog,
}

impl Default for FakeLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeLibrary {
    pub fn new() -> Self {
        Self {
            name: "mov,mp4,m4a,3gp,3g2,mj2".into(),
            bit_rate: 500_000,
            duration: Some(10_000_000),
            streams: Vec::new(),
            packets: Vec::new(),
            decoder_delay: 0,
            failure: None,
            log: EventLog::default(),
        }
    }

    pub fn format(mut self, name: &str, bit_rate: i64, duration: Option<i64>) -> Self {
        self.name = name.into();
        self.bit_rate = bit_rate;
        self.duration = duration;
        self
    }

    pub fn stream(mut self, stream: FakeStream) -> Self {
        self.streams.push(stream);
        self
    }

    pub fn packets(mut self, packets: impl IntoIterator<Item = FakePacket>) -> Self {
        self.packets.extend(packets);
        self
    }

    pub fn decoder_delay(mut self, delay: usize) -> Self {
        self.decoder_delay = delay;
        self
    }

    pub fn fail_open(mut self) -> Self {
        self.failure = Some(Failure::Open);
        self
    }

    pub fn fail_header(mut self) -> Self {
        self.failure = Some(Failure::Header);
        self
    }

    /// Acquire/release events recorded by containers and decoders.
    pub fn log(&self) -> EventLog {
        Rc::clone(&self.log)
    }

    pub fn descriptors(&self) -> Vec<StreamDescriptor> {
        self.streams
            .iter()
            .map(|s| build_descriptor(&s.params))
            .collect()
    }
}

impl MediaLibrary for FakeLibrary {
    type Container = FakeContainer;

    fn open(&self, path: &Path) -> Result<FakeContainer> {
        if self.failure == Some(Failure::Open) {
            return Err(Error::open_failed(
                path,
                "Invalid data found when processing input",
            ));
        }

        self.log.borrow_mut().push("open container".into());
        let container = FakeContainer {
            url: path.display().to_string(),
            library: self.clone(),
            packets: self.packets.iter().copied().collect(),
        };

        if self.failure == Some(Failure::Header) {
            return Err(Error::header_unreadable(
                path,
                "could not find codec parameters",
            ));
        }
        Ok(container)
    }

    fn version(&self) -> String {
        "62.3.100".into()
    }
}

/// Container handed out by [`FakeLibrary`].
#[derive(Debug)]
pub struct FakeContainer {
    url: String,
    library: FakeLibrary,
    packets: VecDeque<FakePacket>,
}

impl Container for FakeContainer {
    type Packet = FakePacket;
    type Decoder = FakeDecoder;

    fn format_info(&self) -> FormatInfo {
        FormatInfo {
            name: self.library.name.clone(),
            bit_rate: (self.library.bit_rate > 0).then_some(self.library.bit_rate),
            duration: self.library.duration,
            url: self.url.clone(),
            stream_count: self.library.streams.len(),
            flags: 0x200,
        }
    }

    fn streams(&self) -> Vec<RawStreamParams> {
        self.library
            .streams
            .iter()
            .map(|s| s.params.clone())
            .collect()
    }

    fn open_decoder(&self, stream_index: usize) -> Result<FakeDecoder> {
        let stream = self
            .library
            .streams
            .iter()
            .find(|s| s.params.index == stream_index)
            .ok_or_else(|| Error::InvalidInput(format!("no stream {stream_index}")))?;

        if !stream.has_decoder {
            return Err(Error::decoder_not_found(stream_index, "unknown"));
        }
        if !stream.decoder_opens {
            return Err(Error::decoder_open_failed(stream_index, "Invalid argument"));
        }

        self.library.log.borrow_mut().push("open decoder".into());
        Ok(FakeDecoder {
            delay: self.library.decoder_delay,
            pending: Vec::new(),
            ready: VecDeque::new(),
            produced: 0,
            submitted: 0,
            log: self.library.log(),
        })
    }

    fn next_packet(&mut self) -> Option<FakePacket> {
        self.packets.pop_front()
    }
}

impl Drop for FakeContainer {
    fn drop(&mut self) {
        self.library.log.borrow_mut().push("close container".into());
    }
}

/// Decoder with a fixed reordering delay.
///
/// Once more than `delay` frames are buffered, the one with the lowest display
/// position is output. Picture types come from the packet, or follow a simple
/// pattern: the first frame is `I`, every third frame is `B`, the rest are `P`.
#[derive(Debug)]
pub struct FakeDecoder {
    delay: usize,
    pending: Vec<Pending>,
    ready: VecDeque<DecodedFrame>,
    produced: u64,
    submitted: usize,
    log: EventLog,
}

#[derive(Debug)]
struct Pending {
    position: i64,
    packet: FakePacket,
}

impl FakeDecoder {
    /// Number of packets submitted so far.
    pub fn submitted(&self) -> usize {
        self.submitted
    }

    fn emit(&mut self, packet: FakePacket) {
        self.produced += 1;
        let picture_type = packet.picture.unwrap_or(match self.produced {
            1 => PictureType::I,
            n if n % 3 == 0 => PictureType::B,
            _ => PictureType::P,
        });
        self.ready.push_back(DecodedFrame {
            picture_type,
            frame_number: self.produced,
            packet_size: packet.size,
            pts: packet.pts,
        });
    }

    fn emit_next(&mut self) {
        let next = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|(_, p)| p.position)
            .map(|(i, _)| i);
        if let Some(i) = next {
            let pending = self.pending.remove(i);
            self.emit(pending.packet);
        }
    }
}

impl FrameDecoder for FakeDecoder {
    type Packet = FakePacket;

    fn decode(&mut self, packet: &FakePacket) -> Option<DecodedFrame> {
        self.submitted += 1;
        if !packet.rejected {
            let position = packet
                .display
                .or(packet.pts)
                .unwrap_or(self.submitted as i64);
            for _ in 0..packet.frames {
                self.pending.push(Pending {
                    position,
                    packet: *packet,
                });
            }
            while self.pending.len() > self.delay {
                self.emit_next();
            }
        }
        self.ready.pop_front()
    }

    fn take_decoded(&mut self) -> Vec<DecodedFrame> {
        self.ready.drain(..).collect()
    }

    fn drain(&mut self) -> Vec<DecodedFrame> {
        while !self.pending.is_empty() {
            self.emit_next();
        }
        self.take_decoded()
    }
}

impl Drop for FakeDecoder {
    fn drop(&mut self) {
        self.log.borrow_mut().push("close decoder".into());
    }
}
