use glam::Vec2;

use super::{Emission, Source};

/// A circular emitter with quadratic falloff from its center.
///
/// Emits at full strength at the center and fades to nothing at the radius,
/// so injected density has no hard edge for advection to smear.
#[derive(Debug, Clone, Copy)]
pub struct Puff {
    pub position: Vec2,
    pub radius: f32,
    /// Density emitted per second at the center.
    pub density_rate: f32,
    /// Velocity imparted per second at the center.
    pub velocity_rate: Vec2,
}

impl Puff {
    pub fn new(pos: Vec2, radius: f32, density_rate: f32, velocity_rate: Vec2) -> Self {
        Puff {
            position: pos,
            radius,
            density_rate,
            velocity_rate,
        }
    }

    /// Sets the position of the puff. Should be called every time step when
    /// scripting a moving emitter.
    pub fn set_position(&mut self, pos: Vec2) {
        self.position = pos;
    }
}

impl Source for Puff {
    fn emission(&self, p: Vec2) -> Emission {
        let d2 = (p - self.position).length_squared();
        let r2 = self.radius * self.radius;

        if d2 >= r2 {
            return Emission::default();
        }

        let falloff = 1.0 - d2 / r2;
        Emission::new(self.density_rate * falloff, self.velocity_rate * falloff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emission_fades_with_distance() {
        let puff = Puff::new(Vec2::new(4.0, 4.0), 2.0, 100.0, Vec2::new(0.0, 8.0));

        let center = puff.emission(Vec2::new(4.0, 4.0));
        assert_eq!(center.density, 100.0);
        assert_eq!(center.velocity, Vec2::new(0.0, 8.0));

        let halfway = puff.emission(Vec2::new(5.0, 4.0));
        assert_eq!(halfway.density, 75.0);

        let outside = puff.emission(Vec2::new(7.0, 4.0));
        assert_eq!(outside, Emission::default());
    }
}
