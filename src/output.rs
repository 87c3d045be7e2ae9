//! Rendering of probe reports for the terminal.

use framescope_av::{MediaType, ProbeReport, StreamDescriptor};
use std::fmt::Write;

/// Render a report as pretty-printed JSON.
pub fn render_json(report: &ProbeReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Render a human-readable summary of a report.
///
/// With `list_frames` every frame record gets its own line.
pub fn render_text(report: &ProbeReport, list_frames: bool) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_text(&mut out, report, list_frames);
    out
}

fn write_text(out: &mut String, report: &ProbeReport, list_frames: bool) -> std::fmt::Result {
    let format = &report.format;
    writeln!(out, "File: {}", format.url)?;
    writeln!(out, "Container: {}", format.name)?;
    if let Some(duration) = format.duration {
        writeln!(out, "Duration: {}", format_duration(duration))?;
    }
    if let Some(bit_rate) = format.bit_rate {
        writeln!(out, "Bit rate: {} kb/s", bit_rate / 1000)?;
    }
    writeln!(out, "Flags: {:#x}", format.flags)?;

    let video = report.streams_of(MediaType::Video).count();
    let audio = report.streams_of(MediaType::Audio).count();
    writeln!(
        out,
        "\nStreams: {} ({} video, {} audio)",
        report.streams.len(),
        video,
        audio
    )?;
    for stream in &report.streams {
        writeln!(out, "  {}", stream_line(stream))?;
    }

    match report.scanned_stream {
        Some(index) => {
            writeln!(out, "\nFrames (stream {}): {}", index, report.frames.len())?;
            let counts = report.picture_type_counts();
            if !counts.is_empty() {
                let summary: Vec<String> = counts
                    .iter()
                    .map(|(kind, count)| format!("{}={}", kind, count))
                    .collect();
                writeln!(out, "  Picture types: {}", summary.join(" "))?;
            }
        }
        None => writeln!(out, "\nFrames: no video stream")?,
    }

    if list_frames {
        for frame in &report.frames {
            write!(
                out,
                "  #{:<6} {} {:>8} bytes",
                frame.frame_number, frame.picture_type, frame.packet_size
            )?;
            if let Some(pts) = frame.pts {
                write!(out, "  pts={}", pts)?;
            }
            writeln!(out)?;
        }
    }

    Ok(())
}

fn stream_line(stream: &StreamDescriptor) -> String {
    let mut line = format!("[{}] {}", stream.index, stream.media_type);
    if !stream.codec_name.is_empty() {
        line.push_str(&format!(" {}", stream.codec_name));
    }
    if !stream.codec_tag.is_empty() {
        line.push_str(&format!(" ({})", stream.codec_tag.to_string().escape_default()));
    }
    if !stream.profile.is_empty() {
        line.push_str(&format!(" {}", stream.profile));
    }

    match stream.media_type {
        MediaType::Video => line.push_str(&format!(", {}x{}", stream.width, stream.height)),
        MediaType::Audio => line.push_str(&format!(
            ", {} Hz, {} ch",
            stream.sample_rate, stream.channels
        )),
        _ => {}
    }
    if !stream.format.is_empty() {
        line.push_str(&format!(", {}", stream.format));
    }
    if let Some(bit_rate) = stream.bit_rate {
        line.push_str(&format!(", {} kb/s", bit_rate / 1000));
    }
    if let Some(seconds) = stream.duration.and_then(|d| stream.time_base.seconds(d)) {
        line.push_str(&format!(", {:.3} s", seconds));
    }
    line
}

/// Microseconds as `HH:MM:SS.mmm`.
fn format_duration(micros: i64) -> String {
    let millis = micros.max(0) / 1000;
    let secs = millis / 1000;
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        millis % 1000
    )
}
