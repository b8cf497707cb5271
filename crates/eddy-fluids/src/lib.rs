use source::SourceSet;

pub mod grid;
pub mod scene;
pub mod source;
pub mod stable;

pub trait Fluid {
    type Params;

    fn step(&mut self, dt: f32, params: &Self::Params, sources: &SourceSet);
}
