use std::path::PathBuf;

use clap::Parser;
use eddy_io::encode::{EncodingError, FluidDataEncoder};

mod run;

/// Headless stable-fluids run that records density and velocity frames for
/// an external viewer.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Interior grid side length, in cells.
    #[arg(short = 'n', long, default_value_t = 128)]
    size: usize,

    /// Number of frames to simulate.
    #[arg(short, long, default_value_t = 600)]
    frames: u64,

    /// Simulated frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Density diffusion rate.
    #[arg(long, default_value_t = 0.0001)]
    diffusion: f32,

    /// Kinematic viscosity.
    #[arg(long, default_value_t = 0.0001)]
    viscosity: f32,

    /// Gauss-Seidel sweeps per linear solve.
    #[arg(long, default_value_t = 20)]
    iterations: usize,

    /// Directory the frame data is written into. Must not already exist.
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

fn main() -> Result<(), EncodingError> {
    let cli = Cli::parse();

    let encoder = FluidDataEncoder::new(cli.output, cli.frames, cli.fps)?;

    run::run_d2(
        encoder,
        cli.fps,
        cli.frames,
        cli.size,
        cli.diffusion,
        cli.viscosity,
        cli.iterations,
    )
}
