//! One targeted encode/decode pass over a real run directory.

use eddy_fluids::source::SourceSet;
use eddy_fluids::stable::d2::{StableFluid2D, StableFluid2DParams};
use eddy_fluids::Fluid;
use eddy_io::decode::FluidDataDecoder;
use eddy_io::encode::FluidDataEncoder;

#[test]
fn encoded_run_decodes_back() {
    let dir = std::env::temp_dir().join(format!("eddy-io-roundtrip-{}", std::process::id()));
    if dir.exists() {
        std::fs::remove_dir_all(&dir).unwrap();
    }

    let n = 4;
    let mut fluid = StableFluid2D::new(n, 0.05, 0.001);
    fluid.add_density(2, 1, 50.0);
    fluid.add_velocity(1, 2, glam::Vec2::new(0.5, 1.0));

    let mut encoder = FluidDataEncoder::new(dir.clone(), 2, 30).unwrap();
    encoder.encode_metadata(&fluid, 0.05, 0.001).unwrap();

    let params = StableFluid2DParams::default();
    let sources = SourceSet::default();
    for _ in 0..2 {
        fluid.step(1.0 / 30.0, &params, &sources);
        encoder.encode_frame(&fluid).unwrap();
    }

    let mut decoder = FluidDataDecoder::new(dir.clone());
    let meta = decoder.decode_metadata().unwrap();
    assert_eq!(meta.n, n as u32);
    assert_eq!(meta.fps, 30);
    assert_eq!(meta.num_frames, 2);
    assert_eq!(meta.diffusion, 0.05);
    assert_eq!(meta.viscosity, 0.001);

    let mut frames = 0;
    while let Some(frame) = decoder.decode_frame().unwrap() {
        frames += 1;
        assert_eq!(frame.density.count::<1>(), n * n);
        assert_eq!(frame.velocity.count::<2>(), n * n);

        if frames == 2 {
            // The final frame must match the fluid's state exactly.
            let decoded: Vec<f32> = frame.density.as_slice().to_vec();
            let expected: Vec<f32> = fluid.density().interior().iter().copied().collect();
            assert_eq!(decoded, expected);

            let (u, v) = fluid.velocity();
            let expected_uv: Vec<[f32; 2]> = u
                .interior()
                .iter()
                .zip(v.interior().iter())
                .map(|(&x, &y)| [x, y])
                .collect();
            let decoded_uv: Vec<[f32; 2]> = frame.velocity.iter::<2>().collect();
            assert_eq!(decoded_uv, expected_uv);
        }
    }
    assert_eq!(frames, 2);

    std::fs::remove_dir_all(&dir).unwrap();
}
