//! # framescope-av
//!
//! Media probe engine.
//!
//! Given a media container file, this crate reads the container header,
//! describes every elementary stream (codec tag, pixel/sample format, profile,
//! level, geometry, audio shape) and walks the first video stream frame by
//! frame, recording the picture type and compressed size of every decoded
//! frame. Everything ends up in one immutable [`ProbeReport`].
//!
//! ## Features
//!
//! - `native-ffmpeg` - Link FFmpeg through `ffmpeg-the-third` and enable
//!   [`probe`] on real files
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! let report = framescope_av::probe("/path/to/video.mp4")?;
//! println!("Container: {}", report.format.name);
//! for frame in &report.frames {
//!     println!("{} {} {}", frame.frame_number, frame.picture_type, frame.packet_size);
//! }
//! # Ok::<(), framescope_av::Error>(())
//! ```

mod error;
pub mod backend;
pub mod probe;

#[cfg(test)]
mod testing;

// Re-exports
pub use error::{Error, Result};
pub use probe::{
    FormatInfo, FourCc, FrameRecord, MediaType, PictureType, ProbeOptions, ProbeReport, Prober,
    StreamDescriptor, TimeBase,
};

#[cfg(feature = "native-ffmpeg")]
pub use probe::FfmpegLibrary;

use std::path::Path;

/// Probe a media file with default options.
///
/// Opens the container, describes every stream and scans the first video
/// stream to the end before returning.
///
/// # Example
///
/// ```no_run
/// let report = framescope_av::probe("/path/to/video.mp4")?;
/// assert_eq!(report.format.stream_count, report.streams.len());
/// # Ok::<(), framescope_av::Error>(())
/// ```
pub fn probe<P: AsRef<Path>>(path: P) -> Result<ProbeReport> {
    probe_with_options(path, ProbeOptions::default())
}

/// Probe a media file with explicit options.
#[cfg(feature = "native-ffmpeg")]
pub fn probe_with_options<P: AsRef<Path>>(path: P, options: ProbeOptions) -> Result<ProbeReport> {
    Prober::with_options(FfmpegLibrary::new()?, options).probe(path.as_ref())
}

/// Probe a media file with explicit options.
#[cfg(not(feature = "native-ffmpeg"))]
pub fn probe_with_options<P: AsRef<Path>>(path: P, _options: ProbeOptions) -> Result<ProbeReport> {
    Err(Error::Unsupported(format!(
        "cannot probe {}: built without the native-ffmpeg feature",
        path.as_ref().display()
    )))
}

/// Version of the linked container library (`major.minor.micro`).
///
/// Needs no file and always returns the same value. `Ok(None)` when no codec
/// library is compiled in; an error when the library fails to initialize.
pub fn library_version() -> Result<Option<String>> {
    #[cfg(feature = "native-ffmpeg")]
    {
        use backend::MediaLibrary;
        Ok(Some(FfmpegLibrary::new()?.version()))
    }
    #[cfg(not(feature = "native-ffmpeg"))]
    {
        Ok(None)
    }
}
