//! framescope - Media probe tool
//!
//! This library crate exposes the CLI's configuration and rendering for
//! integration testing. The probe engine itself lives in `framescope-av`.

pub mod config;
pub mod output;
