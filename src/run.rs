use eddy_fluids::{
    scene::Scene,
    source::puff::Puff,
    stable::d2::{StableFluid2D, StableFluid2DParams},
};
use eddy_io::encode::{EncodingError, FluidDataEncoder};
use glam::Vec2;
use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};

pub fn run_d2(
    mut encoder: FluidDataEncoder,
    fps: u32,
    frames: u64,
    size: usize,
    diffusion: f32,
    viscosity: f32,
    iterations: usize,
) -> Result<(), EncodingError> {
    let fluid = StableFluid2D::new(size, diffusion, viscosity);
    let params = StableFluid2DParams { iterations };

    let mut scene = Scene::new(fluid, params);

    // A steady plume: density fed in low-center, drifting upward.
    let n = size as f32;
    scene.add_source(Puff::new(
        Vec2::new(0.5 * n, 0.12 * n),
        0.06 * n,
        100.0,
        Vec2::new(0.0, 2.0),
    ));

    encoder.encode_metadata(&scene.fluid, diffusion, viscosity)?;

    let dt = 1.0 / fps as f32;

    let bar_template = "Running Simulation {spinner:.green} [{elapsed}] [{bar:50.white/white}] {pos}/{len} ({eta})";
    let style = ProgressStyle::with_template(bar_template).unwrap()
        .progress_chars("=> ").tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress = ProgressBar::new(frames).with_style(style);

    for _frame in (0..frames).progress_with(progress) {
        scene.step(dt);
        encoder.encode_frame(&scene.fluid)?;
    }

    Ok(())
}
