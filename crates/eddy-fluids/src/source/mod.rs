use std::collections::HashMap;

use glam::Vec2;

pub mod puff;

/// A localized emitter that feeds density and momentum into a fluid.
///
/// Sources are sampled at interior cell centers, in grid coordinates, once
/// per tick; the returned rates are scaled by the tick's `dt` before being
/// added to the fields.
pub trait Source {
    fn emission(&self, p: Vec2) -> Emission;
}

/// Per-cell emission rates, per second of simulated time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Emission {
    pub density: f32,
    pub velocity: Vec2,
}

impl Emission {
    pub fn new(density: f32, velocity: Vec2) -> Emission {
        Emission { density, velocity }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceId(pub usize);

#[derive(Default)]
pub struct SourceSet {
    pub sources: HashMap<usize, Box<dyn Source>>,
}

impl SourceSet {
    pub fn new(sources: HashMap<usize, Box<dyn Source>>) -> Self {
        SourceSet { sources }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Source for SourceSet {
    fn emission(&self, p: Vec2) -> Emission {
        let mut total = Emission::default();

        for source in self.sources.values() {
            let e = source.emission(p);
            total.density += e.density;
            total.velocity += e.velocity;
        }

        total
    }
}

#[cfg(test)]
mod tests {
    use super::{puff::Puff, Emission, Source, SourceSet};
    use glam::Vec2;

    #[test]
    fn empty_set_emits_nothing() {
        let set = SourceSet::default();
        assert_eq!(set.emission(Vec2::new(3.0, 3.0)), Emission::default());
    }

    #[test]
    fn set_sums_overlapping_emitters() {
        let mut set = SourceSet::default();
        set.sources.insert(0, Box::new(Puff::new(Vec2::ZERO, 2.0, 10.0, Vec2::X)));
        set.sources.insert(1, Box::new(Puff::new(Vec2::ZERO, 2.0, 10.0, Vec2::X)));

        let e = set.emission(Vec2::ZERO);
        assert_eq!(e.density, 20.0);
        assert_eq!(e.velocity, Vec2::new(2.0, 0.0));
    }
}
