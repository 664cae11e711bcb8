//! pluck-duet - two plucked-string voices drifting against each other
//!
//! Run with: cargo run --release
//!
//! Press Enter to step the volume.

mod player;
mod volume;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use pluck_duet::patch::PieceConfig;
use pluck_duet::Engine;
use tracing_subscriber::EnvFilter;

use player::PlayerOptions;
use volume::Volume;

#[derive(Parser)]
#[command(version, about = "Plays a looping duet of Karplus-Strong strings.")]
struct Cli {
    /// Piece description in TOML. The built-in duet plays when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the excitation noise. Overrides the seed in the piece.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Start volume in percent.
    #[arg(short, long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(10..=100))]
    volume: u8,

    /// Double buffer size in frames, both halves together.
    #[arg(short, long, default_value_t = 4096, value_parser = parse_buffer_frames)]
    buffer_frames: usize,
}

fn parse_buffer_frames(arg: &str) -> Result<usize, String> {
    let frames: usize = arg.parse().map_err(|e| format!("{e}"))?;
    if frames < 2 || frames % 2 != 0 {
        return Err(format!("{frames} is not a positive even frame count"));
    }
    Ok(frames)
}

fn load_piece(cli: &Cli) -> color_eyre::Result<PieceConfig> {
    let mut piece = match &cli.config {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            PieceConfig::from_toml_str(&source)
                .wrap_err_with(|| format!("invalid piece in {}", path.display()))?
        }
        None => PieceConfig::default(),
    };

    if cli.seed.is_some() {
        piece.seed = cli.seed;
    }
    Ok(piece)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let piece = load_piece(&cli)?;
    let engine = Engine::from_config(&piece).wrap_err("failed to build the engine")?;

    let volume = Volume::new(cli.volume).ok_or_else(|| eyre!("volume {} out of range", cli.volume))?;

    player::run(
        engine,
        PlayerOptions {
            buffer_frames: cli.buffer_frames,
            volume,
        },
    )
}
