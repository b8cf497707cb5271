use super::{
    source::{Source, SourceId, SourceSet},
    Fluid,
};

pub struct Scene<F, P> {
    /// The fluid for this scene.
    pub fluid: F,
    /// The parameters for this scene's fluid.
    params: P,
    /// The sources feeding this scene's fluid.
    sources: SourceSet,
    /// The number of sources ever added (used for IDs).
    n_sources: usize,
}

impl<F: Fluid<Params = P>, P> Scene<F, P> {
    #[inline(always)]
    pub fn new(fluid: F, params: P) -> Self {
        Self {
            fluid,
            params,
            sources: SourceSet::default(),
            n_sources: 0,
        }
    }

    /// Adds a source to the set, returning its ID.
    pub fn add_source<T: Source + 'static>(&mut self, source: T) -> SourceId {
        let i = self.n_sources;
        self.n_sources += 1;

        self.sources.sources.insert(i, Box::new(source));
        SourceId(i)
    }

    /// Removes a source from the set, given its ID.
    pub fn remove_source(&mut self, id: SourceId) -> Option<Box<dyn Source>> {
        self.sources.sources.remove(&id.0)
    }

    /// Insert a source into the set at the given ID, overriding and returning the old value if
    /// it was previously in the set.
    pub fn insert_source<T: Source + 'static>(&mut self, id: SourceId, source: T) -> Option<Box<dyn Source>> {
        self.sources.sources.insert(id.0, Box::new(source))
    }

    pub fn step(&mut self, dt: f32) {
        self.fluid.step(
            dt,
            &self.params,
            &self.sources,
        );
    }
}
