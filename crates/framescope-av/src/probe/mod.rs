//! Media file probing.
//!
//! [`Prober`] drives a [`MediaLibrary`] through the whole pipeline: open the
//! container, describe every stream, scan the first video stream frame by
//! frame and assemble a [`ProbeReport`].
//!
//! With the `native-ffmpeg` feature, [`FfmpegLibrary`] provides the FFmpeg
//! backed implementation.

mod descriptor;
mod scan;
mod types;

#[cfg(feature = "native-ffmpeg")]
mod native_ffmpeg;

pub use descriptor::build_descriptor;
pub use scan::{scan_frames, scan_target};
pub use types::*;

#[cfg(feature = "native-ffmpeg")]
pub use native_ffmpeg::FfmpegLibrary;

use crate::backend::{Container, MediaLibrary};
use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Knobs for a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOptions {
    /// Decode the primary video stream and record every frame.
    pub scan_frames: bool,
    /// Flush the decoder at end of stream to collect delayed frames.
    pub drain_decoder: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            scan_frames: true,
            drain_decoder: true,
        }
    }
}

/// Runs the probe pipeline against one [`MediaLibrary`].
#[derive(Debug, Clone, Default)]
pub struct Prober<L> {
    library: L,
    options: ProbeOptions,
}

impl<L: MediaLibrary> Prober<L> {
    /// Create a prober with default options.
    pub fn new(library: L) -> Self {
        Self::with_options(library, ProbeOptions::default())
    }

    /// Create a prober with explicit options.
    pub fn with_options(library: L, options: ProbeOptions) -> Self {
        Self { library, options }
    }

    /// Version identifier of the underlying library.
    pub fn library_version(&self) -> String {
        self.library.version()
    }

    /// Probe a media file.
    ///
    /// Returns only once the frame scan reached end of stream. Fails when the
    /// container cannot be opened, its header cannot be read, or the decoder
    /// for the scanned stream cannot be opened.
    pub fn probe(&self, path: &Path) -> Result<ProbeReport> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Probing {:?}", path);

        let mut container = self.library.open(path)?;
        let format = container.format_info();

        let streams: Vec<StreamDescriptor> =
            container.streams().iter().map(build_descriptor).collect();

        #[cfg(feature = "tracing")]
        if streams.len() != format.stream_count {
            tracing::warn!(
                declared = format.stream_count,
                described = streams.len(),
                "stream count mismatch"
            );
        }

        let scanned_stream = scan_target(&streams);
        let frames = match scanned_stream {
            Some(target) if self.options.scan_frames => {
                let mut decoder = container.open_decoder(target)?;
                scan_frames(
                    &mut container,
                    &mut decoder,
                    target,
                    self.options.drain_decoder,
                )
            }
            _ => Vec::new(),
        };

        #[cfg(feature = "tracing")]
        tracing::info!(
            container = %format.name,
            streams = streams.len(),
            frames = frames.len(),
            "Probed {:?}",
            path
        );

        Ok(ProbeReport {
            format,
            streams,
            frames,
            scanned_stream,
        })
    }
}
