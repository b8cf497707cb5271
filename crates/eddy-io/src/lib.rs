use std::io::Write;

use encode::{EncodingError, FluidFrameEncoder};
use glam::Vec2;

use eddy_fluids::stable::d2::StableFluid2D;

pub mod as_bytes;
pub mod decode;
pub mod encode;

pub trait EncodeFluid {
    /// Interior grid side length recorded in the run metadata.
    fn grid_size(&self) -> u32;

    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError>;
}

impl EncodeFluid for StableFluid2D {
    fn grid_size(&self) -> u32 {
        self.n() as u32
    }

    fn encode_state<W: Write>(&self, encoder: &mut FluidFrameEncoder<W>) -> Result<(), EncodingError> {
        let cells = self.n() * self.n();
        let (u, v) = self.velocity();

        encoder.encode_section(cells, self.density().interior().iter().copied())?;
        encoder.encode_section(
            cells,
            u.interior()
                .iter()
                .zip(v.interior().iter())
                .map(|(&x, &y)| Vec2::new(x, y)),
        )?;

        Ok(())
    }
}
