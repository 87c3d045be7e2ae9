//! Stream descriptor building.

use super::types::{FourCc, MediaType, StreamDescriptor};
use crate::backend::RawStreamParams;

/// Normalize raw stream parameters into a [`StreamDescriptor`].
///
/// Missing name lookups become empty strings and non-positive bit rates become
/// `None`. Geometry is only kept for video streams and audio shape only for
/// audio streams, so a descriptor is always produced for a declared stream.
pub fn build_descriptor(params: &RawStreamParams) -> StreamDescriptor {
    let is_video = params.media_type == MediaType::Video;
    let is_audio = params.media_type == MediaType::Audio;

    StreamDescriptor {
        index: params.index,
        id: params.id,
        start_time: params.start_time,
        duration: params.duration,
        time_base: params.time_base,
        media_type: params.media_type,
        codec_name: params.decoder_name.clone().unwrap_or_default(),
        codec_tag: FourCc::from_tag(params.codec_tag),
        format: if is_video || is_audio {
            params.format_name.clone().unwrap_or_default()
        } else {
            String::new()
        },
        bit_rate: (params.bit_rate > 0).then_some(params.bit_rate),
        profile: params.profile_name.clone().unwrap_or_default(),
        level: params.level,
        width: if is_video { params.width } else { 0 },
        height: if is_video { params.height } else { 0 },
        channels: if is_audio { params.channels } else { 0 },
        sample_rate: if is_audio { params.sample_rate } else { 0 },
        frame_size: if is_audio { params.frame_size } else { 0 },
    }
}
