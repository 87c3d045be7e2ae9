mod cli;

use framescope::{
    config::{self, OutputFormat},
    output,
};
use framescope_av::ProbeOptions;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "framescope=trace,framescope_av=trace".to_string()
        } else {
            "framescope=info,framescope_av=info".to_string()
        }
    });

    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Probe {
            file,
            json,
            no_frames,
            no_drain,
            frames,
        } => probe_file(
            &file,
            cli.config.as_deref(),
            ProbeFlags {
                json,
                no_frames,
                no_drain,
                frames,
            },
        ),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("framescope {}", env!("CARGO_PKG_VERSION"));
            match framescope_av::library_version() {
                Ok(Some(version)) => println!("libavformat {}", version),
                Ok(None) => println!("libavformat: not linked (built without native-ffmpeg)"),
                Err(e) => {
                    tracing::warn!("Codec library unavailable: {}", e);
                    println!("libavformat: unavailable ({})", e);
                }
            }
            Ok(())
        }
    }
}

/// Command-line overrides for a probe.
struct ProbeFlags {
    json: bool,
    no_frames: bool,
    no_drain: bool,
    frames: bool,
}

fn probe_file(file: &Path, config_path: Option<&Path>, flags: ProbeFlags) -> Result<()> {
    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let config = config::load_config_or_default(config_path)?;

    let mut options = ProbeOptions::from(&config.probe);
    if flags.no_frames {
        options.scan_frames = false;
    }
    if flags.no_drain {
        options.drain_decoder = false;
    }

    let report = framescope_av::probe_with_options(file, options)
        .with_context(|| format!("Failed to probe {:?}", file))?;

    let format = if flags.json {
        OutputFormat::Json
    } else {
        config.output.format
    };

    match format {
        OutputFormat::Json => println!("{}", output::render_json(&report)?),
        OutputFormat::Text => print!(
            "{}",
            output::render_text(&report, flags.frames || config.output.list_frames)
        ),
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  Scan frames: {}", config.probe.scan_frames);
    println!("  Drain decoder: {}", config.probe.drain_decoder);
    println!("  Output format: {:?}", config.output.format);
    println!("  List frames: {}", config.output.list_frames);

    Ok(())
}
