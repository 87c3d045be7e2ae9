//! Probe report types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Complete result of probing one media file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Container-level fields.
    pub format: FormatInfo,
    /// One descriptor per declared stream, in container order.
    pub streams: Vec<StreamDescriptor>,
    /// Frames decoded from the scanned stream, in decode order.
    pub frames: Vec<FrameRecord>,
    /// Index of the stream the frame scan ran over, if any.
    pub scanned_stream: Option<usize>,
}

/// Container-level information read from the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatInfo {
    /// Short name of the demuxer (e.g. "mov,mp4,m4a,3gp,3g2,mj2", "matroska,webm").
    pub name: String,
    /// Overall bit rate in bits per second.
    pub bit_rate: Option<i64>,
    /// Overall duration in microseconds.
    pub duration: Option<i64>,
    /// Resolved source path or URL.
    pub url: String,
    /// Number of streams declared by the container.
    pub stream_count: usize,
    /// Container flag bitmask.
    pub flags: i32,
}

/// Normalized description of one elementary stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamDescriptor {
    /// Position of the stream in the container.
    pub index: usize,
    /// Container-assigned stream id.
    pub id: i32,
    /// Start time in `time_base` units.
    pub start_time: Option<i64>,
    /// Duration in `time_base` units.
    pub duration: Option<i64>,
    /// Time base of the stream timestamps.
    pub time_base: TimeBase,
    /// Kind of media carried.
    pub media_type: MediaType,
    /// Short name of the decoder for this codec, empty if none is registered.
    pub codec_name: String,
    /// Four-character codec tag.
    pub codec_tag: FourCc,
    /// Pixel format (video) or sample format (audio) name.
    pub format: String,
    /// Stream bit rate in bits per second.
    pub bit_rate: Option<i64>,
    /// Codec profile name, empty when the codec has no name for it.
    pub profile: String,
    /// Raw codec level.
    pub level: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Number of audio channels.
    pub channels: u32,
    /// Audio sample rate in Hz.
    pub sample_rate: u32,
    /// Samples per audio frame.
    pub frame_size: u32,
}

/// One decoded frame of the scanned stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Picture type letter.
    pub picture_type: PictureType,
    /// Running count of frames produced by the decoder, starting at 1.
    pub frame_number: u64,
    /// Size in bytes of the compressed packet the frame came from.
    pub packet_size: usize,
    /// Presentation timestamp in the stream time base.
    pub pts: Option<i64>,
}

/// Rational time base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeBase {
    pub num: i32,
    pub den: i32,
}

impl TimeBase {
    /// Create a new time base.
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// Convert a timestamp in this time base to seconds.
    pub fn seconds(&self, ts: i64) -> Option<f64> {
        if self.den == 0 {
            return None;
        }
        Some(ts as f64 * self.num as f64 / self.den as f64)
    }
}

impl fmt::Display for TimeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

/// Media type of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    #[default]
    Unknown,
    Video,
    Audio,
    Data,
    Subtitle,
    Attachment,
}

impl MediaType {
    /// Numeric code as used by the codec library (`AVMEDIA_TYPE_*`).
    pub const fn code(self) -> i32 {
        match self {
            Self::Unknown => -1,
            Self::Video => 0,
            Self::Audio => 1,
            Self::Data => 2,
            Self::Subtitle => 3,
            Self::Attachment => 4,
        }
    }

    /// Inverse of [`MediaType::code`]; anything out of range is `Unknown`.
    pub const fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Video,
            1 => Self::Audio,
            2 => Self::Data,
            3 => Self::Subtitle,
            4 => Self::Attachment,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unknown => "unknown",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Data => "data",
            Self::Subtitle => "subtitle",
            Self::Attachment => "attachment",
        };
        f.write_str(name)
    }
}

/// Picture type of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum PictureType {
    /// Undefined.
    None,
    /// Intra.
    I,
    /// Predicted.
    P,
    /// Bi-directionally predicted.
    B,
    /// S(GMC)-VOP MPEG-4.
    S,
    /// Switching intra.
    Si,
    /// Switching predicted.
    Sp,
    /// BI type.
    Bi,
}

impl PictureType {
    /// Single letter used by the codec library for this picture type.
    pub const fn as_char(self) -> char {
        match self {
            Self::None => '?',
            Self::I => 'I',
            Self::P => 'P',
            Self::B => 'B',
            Self::S => 'S',
            Self::Si => 'i',
            Self::Sp => 'p',
            Self::Bi => 'b',
        }
    }

    /// Parse a picture type letter.
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '?' => Some(Self::None),
            'I' => Some(Self::I),
            'P' => Some(Self::P),
            'B' => Some(Self::B),
            'S' => Some(Self::S),
            'i' => Some(Self::Si),
            'p' => Some(Self::Sp),
            'b' => Some(Self::Bi),
            _ => None,
        }
    }
}

impl From<PictureType> for char {
    fn from(value: PictureType) -> Self {
        value.as_char()
    }
}

impl TryFrom<char> for PictureType {
    type Error = String;

    fn try_from(value: char) -> std::result::Result<Self, Self::Error> {
        Self::from_char(value).ok_or_else(|| format!("unknown picture type: {value:?}"))
    }
}

impl fmt::Display for PictureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Four-character codec tag.
///
/// Each byte maps to exactly one `char` (U+0000..=U+00FF), so tags with
/// non-printable or non-ASCII bytes keep their raw value and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct FourCc([u8; 4]);

impl FourCc {
    /// Decompose a 32-bit little-endian tag, least significant byte first.
    pub const fn from_tag(tag: u32) -> Self {
        let mut bytes = [0u8; 4];
        let mut j = 0;
        while j < 4 {
            bytes[j] = ((tag >> (8 * j)) & 0xFF) as u8;
            j += 1;
        }
        Self(bytes)
    }

    /// Recompose the 32-bit tag.
    pub const fn to_tag(self) -> u32 {
        self.0[0] as u32
            | (self.0[1] as u32) << 8
            | (self.0[2] as u32) << 16
            | (self.0[3] as u32) << 24
    }

    /// Raw tag bytes in stream order.
    pub const fn bytes(&self) -> [u8; 4] {
        self.0
    }

    /// Whether the tag is unset (all zero).
    pub const fn is_empty(&self) -> bool {
        self.to_tag() == 0
    }
}

impl From<[u8; 4]> for FourCc {
    fn from(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

impl From<FourCc> for String {
    fn from(value: FourCc) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for FourCc {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let mut bytes = [0u8; 4];
        let mut count = 0;
        for c in value.chars() {
            if count == 4 {
                return Err(format!("codec tag longer than 4 characters: {value:?}"));
            }
            bytes[count] =
                u8::try_from(c).map_err(|_| format!("codec tag character out of range: {c:?}"))?;
            count += 1;
        }
        if count != 4 {
            return Err(format!("codec tag must be 4 characters: {value:?}"));
        }
        Ok(Self(bytes))
    }
}

impl ProbeReport {
    /// The first video stream, i.e. the one the frame scan targets.
    pub fn primary_video(&self) -> Option<&StreamDescriptor> {
        self.streams
            .iter()
            .find(|s| s.media_type == MediaType::Video)
    }

    /// Look up a stream by container index.
    pub fn stream(&self, index: usize) -> Option<&StreamDescriptor> {
        self.streams.iter().find(|s| s.index == index)
    }

    /// Count of scanned frames per picture type.
    pub fn picture_type_counts(&self) -> BTreeMap<PictureType, usize> {
        let mut counts = BTreeMap::new();
        for frame in &self.frames {
            *counts.entry(frame.picture_type).or_insert(0) += 1;
        }
        counts
    }

    /// Streams of the given media type.
    pub fn streams_of(&self, media_type: MediaType) -> impl Iterator<Item = &StreamDescriptor> {
        self.streams
            .iter()
            .filter(move |s| s.media_type == media_type)
    }
}
