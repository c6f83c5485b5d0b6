//! rev2 - Prophet Rev2 patch SysEx tool
//!
//! Reads program dumps from `.syx` files, applies sequencer edits and writes
//! the results back as SysEx ready to be sent to the synth.

mod commands;
mod config;
mod error;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use commands::OutputOptions;
use config::{Config, LayerSelection, OutputFormat};
use rev2_core::{Layer, ProgramNumber, Rev2};

#[derive(Parser)]
#[command(name = "rev2")]
#[command(author, version, about = "Edit Prophet Rev2 program dumps", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: ~/.config/rev2/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Output arguments shared by the edit commands
#[derive(clap::Args)]
struct OutputArgs {
    /// Output .syx file
    #[arg(short, long)]
    output: PathBuf,

    /// Message format (default from config)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Target program slot (0-1023) for program dumps
    #[arg(long)]
    program: Option<usize>,

    /// Replace an existing output file
    #[arg(short, long)]
    force: bool,
}

impl OutputArgs {
    fn options(&self, config: &Config) -> Result<OutputOptions> {
        Ok(OutputOptions {
            format: self.format.unwrap_or(config.output.format).into(),
            program: self.program.map(ProgramNumber::new).transpose()?,
            overwrite: self.force || config.output.overwrite,
        })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum LayerArg {
    A,
    B,
}

impl From<LayerArg> for Layer {
    fn from(layer: LayerArg) -> Self {
        match layer {
            LayerArg::A => Layer::A,
            LayerArg::B => Layer::B,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise the programs in a .syx file
    Info {
        input: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Copy a poly sequencer track into the gated sequencer
    ToGated {
        input: PathBuf,
        /// Poly sequencer track (0-5)
        #[arg(long)]
        poly_track: Option<usize>,
        /// Gated track for notes (0-2); velocities go to the next track
        #[arg(long)]
        gated_track: Option<usize>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Take over all sequencer data from a locked program
    CopySeq {
        input: PathBuf,
        /// Program providing the sequences
        #[arg(long)]
        from: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Reset the poly sequencer to silent default notes
    ClearPoly {
        input: PathBuf,
        /// Layers to clear (default from config)
        #[arg(long, value_enum)]
        layer: Option<LayerSelection>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Copy one layer over the other
    CopyLayer {
        input: PathBuf,
        /// Source layer
        #[arg(long, value_enum)]
        from: LayerArg,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Re-encode a program as edit buffer or program dump
    Reframe {
        input: PathBuf,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Check whether two programs sound the same
    Compare { a: PathBuf, b: PathBuf },
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load_or_default(),
    };
    log::debug!("Using config: {:?}", config);

    let synth = Rev2::new();

    match cli.command {
        Commands::Info { input, json } => {
            let summaries = commands::info(&synth, &input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                commands::print_summaries(&summaries);
            }
        }
        Commands::ToGated {
            input,
            poly_track,
            gated_track,
            out,
        } => {
            commands::to_gated(
                &synth,
                &input,
                &out.output,
                poly_track.unwrap_or(config.sequencer.poly_track),
                gated_track.unwrap_or(config.sequencer.gated_track),
                out.options(&config)?,
            )?;
        }
        Commands::CopySeq { input, from, out } => {
            commands::copy_sequences(&synth, &input, &from, &out.output, out.options(&config)?)?;
        }
        Commands::ClearPoly { input, layer, out } => {
            let layers = layer.unwrap_or(config.sequencer.clear_layers).flags();
            commands::clear_poly(&synth, &input, &out.output, layers, out.options(&config)?)?;
        }
        Commands::CopyLayer { input, from, out } => {
            commands::copy_layer(&synth, &input, &out.output, from.into(), out.options(&config)?)?;
        }
        Commands::Reframe { input, out } => {
            commands::reframe(&synth, &input, &out.output, out.options(&config)?)?;
        }
        Commands::Compare { a, b } => {
            let offsets = commands::compare(&synth, &a, &b)?;
            if offsets.is_empty() {
                println!("Voice identical");
            } else {
                println!("Programs differ at {} offsets:", offsets.len());
                for offset in offsets {
                    println!("  {}", offset);
                }
            }
        }
        Commands::Init => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
        }
        Commands::ConfigPath => {
            println!("{}", Config::config_path()?.display());
        }
    }

    Ok(())
}
