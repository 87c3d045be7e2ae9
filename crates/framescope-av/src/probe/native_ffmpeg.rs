//! Native FFmpeg backend using ffmpeg-the-third bindings.
//!
//! Implements the [`backend`](crate::backend) traits directly on top of
//! libavformat/libavcodec. Requires the `native-ffmpeg` feature.

use super::types::{FormatInfo, MediaType, PictureType, TimeBase};
use crate::backend::{
    CompressedPacket, Container, DecodedFrame, FrameDecoder, MediaLibrary, RawStreamParams,
};
use crate::{Error, Result};
use ffmpeg_the_third as ffmpeg;
use ffmpeg::ffi;
use std::collections::VecDeque;
use std::ffi::{c_void, CStr, CString};
use std::path::Path;
use std::sync::OnceLock;

static FFMPEG_INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

fn init_ffmpeg() -> Result<()> {
    FFMPEG_INIT
        .get_or_init(|| ffmpeg::init().map_err(|e| e.to_string()))
        .clone()
        .map_err(Error::Init)
}

/// The system FFmpeg libraries.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegLibrary;

impl FfmpegLibrary {
    /// Initialize FFmpeg once and return a handle.
    pub fn new() -> Result<Self> {
        init_ffmpeg()?;
        Ok(Self)
    }
}

impl MediaLibrary for FfmpegLibrary {
    type Container = FfmpegContainer;

    fn open(&self, path: &Path) -> Result<FfmpegContainer> {
        init_ffmpeg()?;

        let url = path
            .to_str()
            .ok_or_else(|| Error::InvalidInput(format!("path is not UTF-8: {:?}", path)))?;
        let c_url = CString::new(url)
            .map_err(|_| Error::InvalidInput(format!("path contains NUL: {:?}", path)))?;

        // Opening and stream-info probing are split so the two failures can be
        // told apart; `format::input` folds them into one error.
        let input = unsafe {
            let mut ps = std::ptr::null_mut();
            let ret = ffi::avformat_open_input(
                &mut ps,
                c_url.as_ptr(),
                std::ptr::null(),
                std::ptr::null_mut(),
            );
            if ret < 0 {
                return Err(Error::open_failed(path, ffmpeg::Error::from(ret).to_string()));
            }

            let ret = ffi::avformat_find_stream_info(ps, std::ptr::null_mut());
            if ret < 0 {
                ffi::avformat_close_input(&mut ps);
                return Err(Error::header_unreadable(
                    path,
                    ffmpeg::Error::from(ret).to_string(),
                ));
            }

            ffmpeg::format::context::Input::wrap(ps)
        };

        #[cfg(feature = "tracing")]
        tracing::trace!("Opened {:?} as {}", path, input.format().name());

        Ok(FfmpegContainer { input })
    }

    fn version(&self) -> String {
        version_string(ffmpeg::format::version())
    }
}

/// libavformat's packed version as `major.minor.micro`.
pub(crate) fn version_string(packed: u32) -> String {
    format!(
        "{}.{}.{}",
        packed >> 16,
        (packed >> 8) & 0xff,
        packed & 0xff
    )
}

/// An open demuxer context.
pub struct FfmpegContainer {
    input: ffmpeg::format::context::Input,
}

impl FfmpegContainer {
    fn stream_params(stream: &ffmpeg::format::stream::Stream) -> RawStreamParams {
        let time_base = stream.time_base();
        let mut params = RawStreamParams {
            index: stream.index(),
            id: stream.id(),
            start_time: timestamp(stream.start_time()),
            duration: timestamp(stream.duration()),
            time_base: TimeBase::new(time_base.numerator(), time_base.denominator()),
            ..RawStreamParams::default()
        };

        let ctx = match ffmpeg::codec::context::Context::from_parameters(stream.parameters()) {
            Ok(ctx) => ctx,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(stream = params.index, "codec parameters unavailable: {}", _e);
                return params;
            }
        };

        params.media_type = media_type(ctx.medium());
        params.decoder_name = ffmpeg::decoder::find(ctx.id()).map(|c| c.name().to_string());

        let raw = unsafe { &*ctx.as_ptr() };
        params.codec_tag = raw.codec_tag;
        params.bit_rate = raw.bit_rate;
        params.level = raw.level;
        params.profile_name = unsafe { cstr(ffi::avcodec_profile_name(raw.codec_id, raw.profile)) };

        match params.media_type {
            MediaType::Video => {
                params.width = raw.width.max(0) as u32;
                params.height = raw.height.max(0) as u32;
                params.format_name = ffmpeg::format::Pixel::from(raw.pix_fmt)
                    .descriptor()
                    .map(|d| d.name().to_string());
            }
            MediaType::Audio => {
                params.channels = raw.ch_layout.nb_channels.max(0) as u32;
                params.sample_rate = raw.sample_rate.max(0) as u32;
                params.frame_size = raw.frame_size.max(0) as u32;
                params.format_name = match ffmpeg::format::Sample::from(raw.sample_fmt) {
                    ffmpeg::format::Sample::None => None,
                    sample => Some(sample.name().to_string()),
                };
            }
            _ => {}
        }

        params
    }
}

impl Container for FfmpegContainer {
    type Packet = FfmpegPacket;
    type Decoder = FfmpegDecoder;

    fn format_info(&self) -> FormatInfo {
        let raw = unsafe { &*self.input.as_ptr() };
        let url = unsafe { cstr(raw.url) }.unwrap_or_default();

        FormatInfo {
            name: self.input.format().name().to_string(),
            bit_rate: (raw.bit_rate > 0).then_some(raw.bit_rate),
            duration: timestamp(raw.duration),
            url,
            stream_count: raw.nb_streams as usize,
            flags: raw.flags,
        }
    }

    fn streams(&self) -> Vec<RawStreamParams> {
        self.input
            .streams()
            .map(|stream| Self::stream_params(&stream))
            .collect()
    }

    fn open_decoder(&self, stream_index: usize) -> Result<FfmpegDecoder> {
        let stream = self
            .input
            .stream(stream_index)
            .ok_or_else(|| Error::InvalidInput(format!("no stream {}", stream_index)))?;

        let mut ctx = ffmpeg::codec::context::Context::from_parameters(stream.parameters())
            .map_err(|e| Error::decoder_open_failed(stream_index, e.to_string()))?;

        // Frames inherit the opaque value of the packet they came from, which
        // carries the packet size.
        unsafe {
            (*ctx.as_mut_ptr()).flags |= ffi::AV_CODEC_FLAG_COPY_OPAQUE as i32;
        }

        let id = ctx.id();
        if ffmpeg::decoder::find(id).is_none() {
            return Err(Error::decoder_not_found(stream_index, format!("{:?}", id)));
        }

        let decoder = ctx
            .decoder()
            .video()
            .map_err(|e| Error::decoder_open_failed(stream_index, e.to_string()))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(stream = stream_index, codec = ?id, "Opened decoder");

        Ok(FfmpegDecoder {
            decoder,
            frame: ffmpeg::frame::Video::empty(),
            held: VecDeque::new(),
            produced: 0,
        })
    }

    fn next_packet(&mut self) -> Option<FfmpegPacket> {
        let mut packet = ffmpeg::Packet::empty();
        match packet.read(&mut self.input) {
            Ok(()) => {
                let size = packet.size();
                unsafe {
                    (*packet.as_mut_ptr()).opaque = size as *mut c_void;
                }
                Some(FfmpegPacket(packet))
            }
            Err(ffmpeg::Error::Eof) => None,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Packet read failed, ending scan: {}", _e);
                None
            }
        }
    }
}

/// A compressed packet read from the container.
pub struct FfmpegPacket(ffmpeg::Packet);

impl CompressedPacket for FfmpegPacket {
    fn stream_index(&self) -> usize {
        self.0.stream()
    }

    fn size(&self) -> usize {
        self.0.size()
    }

    fn pts(&self) -> Option<i64> {
        self.0.pts()
    }
}

/// Video decoder for the scanned stream.
///
/// Frame numbers are counted here since FFmpeg no longer exposes them. Frames
/// received ahead of time, when the decoder asks for its output to be read
/// before taking more input, wait in `held`.
pub struct FfmpegDecoder {
    decoder: ffmpeg::decoder::Video,
    frame: ffmpeg::frame::Video,
    held: VecDeque<DecodedFrame>,
    produced: u64,
}

impl FfmpegDecoder {
    fn receive(&mut self) -> Option<DecodedFrame> {
        self.decoder.receive_frame(&mut self.frame).ok()?;
        self.produced += 1;
        let packet_size = unsafe { (*self.frame.as_ptr()).opaque } as usize;
        Some(DecodedFrame {
            picture_type: picture_type(self.frame.kind()),
            frame_number: self.produced,
            packet_size,
            pts: self.frame.pts(),
        })
    }

    fn submit(&mut self, packet: &ffmpeg::Packet) {
        loop {
            match self.decoder.send_packet(packet) {
                Ok(()) => return,
                Err(ffmpeg::Error::Other { errno }) if errno == ffmpeg::error::EAGAIN => {
                    match self.receive() {
                        Some(frame) => self.held.push_back(frame),
                        None => {
                            #[cfg(feature = "tracing")]
                            tracing::debug!("Decoder neither accepts input nor yields output");
                            return;
                        }
                    }
                }
                Err(_e) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("Decode error: {}", _e);
                    return;
                }
            }
        }
    }
}

impl FrameDecoder for FfmpegDecoder {
    type Packet = FfmpegPacket;

    fn decode(&mut self, packet: &FfmpegPacket) -> Option<DecodedFrame> {
        self.submit(&packet.0);
        if let Some(frame) = self.receive() {
            self.held.push_back(frame);
        }
        self.held.pop_front()
    }

    fn take_decoded(&mut self) -> Vec<DecodedFrame> {
        self.held.drain(..).collect()
    }

    fn drain(&mut self) -> Vec<DecodedFrame> {
        let mut frames = self.take_decoded();
        if self.decoder.send_eof().is_ok() {
            frames.extend(std::iter::from_fn(|| self.receive()));
        }
        frames
    }
}

fn timestamp(ts: i64) -> Option<i64> {
    (ts != ffi::AV_NOPTS_VALUE).then_some(ts)
}

unsafe fn cstr(ptr: *const std::os::raw::c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

fn media_type(medium: ffmpeg::media::Type) -> MediaType {
    match medium {
        ffmpeg::media::Type::Video => MediaType::Video,
        ffmpeg::media::Type::Audio => MediaType::Audio,
        ffmpeg::media::Type::Data => MediaType::Data,
        ffmpeg::media::Type::Subtitle => MediaType::Subtitle,
        ffmpeg::media::Type::Attachment => MediaType::Attachment,
        ffmpeg::media::Type::Unknown => MediaType::Unknown,
    }
}

fn picture_type(kind: ffmpeg::picture::Type) -> PictureType {
    match kind {
        ffmpeg::picture::Type::I => PictureType::I,
        ffmpeg::picture::Type::P => PictureType::P,
        ffmpeg::picture::Type::B => PictureType::B,
        ffmpeg::picture::Type::S => PictureType::S,
        ffmpeg::picture::Type::SI => PictureType::Si,
        ffmpeg::picture::Type::SP => PictureType::Sp,
        ffmpeg::picture::Type::BI => PictureType::Bi,
        ffmpeg::picture::Type::None => PictureType::None,
    }
}
