use framescope_av::ProbeOptions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProbeConfig {
    /// Decode the first video stream and record every frame
    #[serde(default = "default_true")]
    pub scan_frames: bool,

    /// Flush the decoder at end of stream to collect delayed frames
    #[serde(default = "default_true")]
    pub drain_decoder: bool,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            scan_frames: true,
            drain_decoder: true,
        }
    }
}

impl From<&ProbeConfig> for ProbeOptions {
    fn from(config: &ProbeConfig) -> Self {
        ProbeOptions {
            scan_frames: config.scan_frames,
            drain_decoder: config.drain_decoder,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// List every frame record in text output
    #[serde(default)]
    pub list_frames: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn default_true() -> bool {
    true
}
