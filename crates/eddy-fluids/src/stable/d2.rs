use std::mem;

use glam::Vec2;

use crate::{
    grid::{Field, FieldKind},
    source::{Source, SourceSet},
    Fluid,
};

/// Grid-based incompressible fluid after Stam's stable-fluids scheme.
///
/// A scalar density field rides on a velocity field that is diffused and
/// projected back to zero divergence every tick. All six fields share one
/// padded square grid, are allocated once at construction, and live for the
/// lifetime of the simulation.
#[derive(Debug, Clone)]
pub struct StableFluid2D {
    /// Interior side length, in cells.
    n: usize,
    /// Density diffusion rate.
    diffusion: f32,
    /// Velocity diffusion rate.
    viscosity: f32,

    density: Field,
    density_prev: Field,
    /// Velocity in the X direction.
    u: Field,
    /// Velocity in the Y direction.
    v: Field,
    u_prev: Field,
    v_prev: Field,
}

impl StableFluid2D {
    pub fn new(n: usize, diffusion: f32, viscosity: f32) -> Self {
        assert!(n > 0, "grid needs at least one interior cell");

        Self {
            n,
            diffusion,
            viscosity,
            density: Field::new(n),
            density_prev: Field::new(n),
            u: Field::new(n),
            v: Field::new(n),
            u_prev: Field::new(n),
            v_prev: Field::new(n),
        }
    }

    /// Interior side length, in cells.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn density(&self) -> &Field {
        &self.density
    }

    pub fn velocity(&self) -> (&Field, &Field) {
        (&self.u, &self.v)
    }

    /// Density at interior cell `(x, y)` clamped to `[0, 1]`, the form a
    /// display collaborator maps to a visual intensity.
    pub fn intensity(&self, x: usize, y: usize) -> f32 {
        assert!(x < self.n && y < self.n, "cell ({x}, {y}) outside the interior");
        self.density[(x + 1, y + 1)].clamp(0.0, 1.0)
    }

    /// Adds density to interior cell `(x, y)`.
    ///
    /// Must be called between ticks, never while a step is in progress.
    pub fn add_density(&mut self, x: usize, y: usize, amount: f32) {
        assert!(x < self.n && y < self.n, "cell ({x}, {y}) outside the interior");
        self.density[(x + 1, y + 1)] += amount;
    }

    /// Adds velocity to interior cell `(x, y)`.
    ///
    /// Must be called between ticks, never while a step is in progress.
    pub fn add_velocity(&mut self, x: usize, y: usize, amount: Vec2) {
        assert!(x < self.n && y < self.n, "cell ({x}, {y}) outside the interior");
        self.u[(x + 1, y + 1)] += amount.x;
        self.v[(x + 1, y + 1)] += amount.y;
    }

    /// Zeroes every field, returning the simulation to its initial state.
    pub fn reset(&mut self) {
        self.density.fill(0.0);
        self.density_prev.fill(0.0);
        self.u.fill(0.0);
        self.v.fill(0.0);
        self.u_prev.fill(0.0);
        self.v_prev.fill(0.0);
    }

    fn apply_sources(&mut self, sources: &SourceSet, dt: f32) {
        if sources.is_empty() {
            return;
        }

        for i in 0..self.n {
            for j in 0..self.n {
                let e = sources.emission(Vec2::new(i as f32 + 0.5, j as f32 + 0.5));

                if e.density != 0.0 {
                    self.density[(i + 1, j + 1)] += dt * e.density;
                }

                if e.velocity != Vec2::ZERO {
                    self.u[(i + 1, j + 1)] += dt * e.velocity.x;
                    self.v[(i + 1, j + 1)] += dt * e.velocity.y;
                }
            }
        }
    }
}

pub struct StableFluid2DParams {
    /// Gauss–Seidel sweeps per linear solve. A quality knob, not a
    /// correctness gate; `0` degenerates to a no-op solve.
    pub iterations: usize,
}

impl Default for StableFluid2DParams {
    fn default() -> Self {
        Self { iterations: 20 }
    }
}

impl Fluid for StableFluid2D {
    type Params = StableFluid2DParams;

    fn step(&mut self, dt: f32, params: &Self::Params, sources: &SourceSet) {
        let iters = params.iterations;

        self.apply_sources(sources, dt);

        mem::swap(&mut self.u, &mut self.u_prev);
        mem::swap(&mut self.v, &mut self.v_prev);
        diffuse(&mut self.u, &self.u_prev, FieldKind::VelocityX, self.viscosity, dt, iters);
        diffuse(&mut self.v, &self.v_prev, FieldKind::VelocityY, self.viscosity, dt, iters);

        project(&mut self.u, &mut self.v, &mut self.u_prev, &mut self.v_prev, iters);

        mem::swap(&mut self.u, &mut self.u_prev);
        mem::swap(&mut self.v, &mut self.v_prev);
        advect(FieldKind::VelocityX, &mut self.u, &self.u_prev, &self.u_prev, &self.v_prev, dt);
        advect(FieldKind::VelocityY, &mut self.v, &self.v_prev, &self.u_prev, &self.v_prev, dt);

        project(&mut self.u, &mut self.v, &mut self.u_prev, &mut self.v_prev, iters);

        mem::swap(&mut self.density, &mut self.density_prev);
        diffuse(&mut self.density, &self.density_prev, FieldKind::Scalar, self.diffusion, dt, iters);

        mem::swap(&mut self.density, &mut self.density_prev);
        advect(FieldKind::Scalar, &mut self.density, &self.density_prev, &self.u, &self.v, dt);
    }
}

/// Gauss–Seidel relaxation of `x = (x0 + a·Σ neighbors(x)) / c` over the
/// interior.
///
/// Runs exactly `iters` full sweeps, re-reading values written earlier in
/// the same sweep, and refreshes the border after every sweep so the next
/// sweep's neighbor sums stay current. There is no convergence check.
pub fn lin_solve(x: &mut Field, x0: &Field, kind: FieldKind, a: f32, c: f32, iters: usize) {
    let n = x.n();

    for _ in 0..iters {
        for i in 1..=n {
            for j in 1..=n {
                x[(i, j)] = (x0[(i, j)]
                    + a * (x[(i - 1, j)] + x[(i + 1, j)] + x[(i, j - 1)] + x[(i, j + 1)]))
                    / c;
            }
        }

        x.set_bounds(kind);
    }
}

/// Implicit diffusion of `x0` into `x` over `dt` at the given rate.
///
/// `x0` is the fixed right-hand side and is left unmodified.
pub fn diffuse(x: &mut Field, x0: &Field, kind: FieldKind, rate: f32, dt: f32, iters: usize) {
    let n = x.n() as f32;
    let a = dt * rate * n * n;
    lin_solve(x, x0, kind, a, 1.0 + 4.0 * a, iters);
}

/// Removes the divergent component of `(u, v)` by solving a Poisson
/// equation for a pressure field and subtracting its gradient.
///
/// `p` and `div` are scratch fields whose previous contents are destroyed.
pub fn project(u: &mut Field, v: &mut Field, p: &mut Field, div: &mut Field, iters: usize) {
    let n = u.n();
    let scale = n as f32;

    for i in 1..=n {
        for j in 1..=n {
            div[(i, j)] = -0.5
                * (u[(i + 1, j)] - u[(i - 1, j)] + v[(i, j + 1)] - v[(i, j - 1)])
                / scale;
        }
    }
    p.fill(0.0);
    div.set_bounds(FieldKind::Scalar);
    p.set_bounds(FieldKind::Scalar);

    lin_solve(p, div, FieldKind::Scalar, 1.0, 4.0, iters);

    for i in 1..=n {
        for j in 1..=n {
            u[(i, j)] -= 0.5 * scale * (p[(i + 1, j)] - p[(i - 1, j)]);
            v[(i, j)] -= 0.5 * scale * (p[(i, j + 1)] - p[(i, j - 1)]);
        }
    }
    u.set_bounds(FieldKind::VelocityX);
    v.set_bounds(FieldKind::VelocityY);
}

/// Semi-Lagrangian transport of `d0` through `(u, v)` over `dt`, written
/// into `d`.
///
/// Each interior cell samples `d0` at its backtraced source point, clamped
/// into `[0.5, n + 0.5]`, with bilinear weights. Stable for any `dt` since
/// nothing is integrated forward.
pub fn advect(kind: FieldKind, d: &mut Field, d0: &Field, u: &Field, v: &Field, dt: f32) {
    let n = d.n();
    let dt0 = dt * n as f32;

    for i in 1..=n {
        for j in 1..=n {
            let x = (i as f32 - dt0 * u[(i, j)]).clamp(0.5, n as f32 + 0.5);
            let y = (j as f32 - dt0 * v[(i, j)]).clamp(0.5, n as f32 + 0.5);

            let i0 = x.floor() as usize;
            let i1 = i0 + 1;
            let j0 = y.floor() as usize;
            let j1 = j0 + 1;

            let s1 = x - i0 as f32;
            let s0 = 1.0 - s1;
            let t1 = y - j0 as f32;
            let t0 = 1.0 - t1;

            d[(i, j)] = s0 * (t0 * d0[(i0, j0)] + t1 * d0[(i0, j1)])
                + s1 * (t0 * d0[(i1, j0)] + t1 * d0[(i1, j1)]);
        }
    }

    d.set_bounds(kind);
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn diffusion_approximately_conserves_mass() {
        let n = 16;
        let mut x0 = Field::new(n);
        for i in 1..=n {
            for j in 1..=n {
                x0[(i, j)] = ((i * 31 + j * 17) % 23) as f32;
            }
        }
        x0.set_bounds(FieldKind::Scalar);

        let mut x = Field::new(n);
        diffuse(&mut x, &x0, FieldKind::Scalar, 0.01, 0.1, 20);

        assert_relative_eq!(x.interior_sum(), x0.interior_sum(), max_relative = 1e-3);
    }

    #[test]
    fn advecting_a_zero_field_yields_zero() {
        let n = 8;
        let mut u = Field::new(n);
        let mut v = Field::new(n);
        for i in 1..=n {
            for j in 1..=n {
                u[(i, j)] = (i as f32 - 4.0) * 0.3;
                v[(i, j)] = (j as f32 - 4.0) * -0.2;
            }
        }
        u.set_bounds(FieldKind::VelocityX);
        v.set_bounds(FieldKind::VelocityY);

        let d0 = Field::new(n);
        let mut d = Field::new(n);
        advect(FieldKind::Scalar, &mut d, &d0, &u, &v, 0.4);

        assert_eq!(d, Field::new(n));
    }

    #[test]
    fn zero_iterations_is_a_no_op_solve() {
        let n = 4;
        let mut x = Field::new(n);
        x[(2, 2)] = 7.0;
        let expected = x.clone();

        let x0 = Field::new(n);
        lin_solve(&mut x, &x0, FieldKind::Scalar, 1.0, 4.0, 0);

        assert_eq!(x, expected);
    }

    #[test]
    fn intensity_clamps_density_for_display() {
        let mut fluid = StableFluid2D::new(4, 0.0, 0.0);
        fluid.add_density(1, 1, 100.0);
        fluid.add_density(2, 2, -3.0);

        assert_eq!(fluid.intensity(1, 1), 1.0);
        assert_eq!(fluid.intensity(2, 2), 0.0);
        assert_eq!(fluid.intensity(0, 0), 0.0);
    }

    #[test]
    #[should_panic(expected = "outside the interior")]
    fn out_of_range_injection_panics() {
        let mut fluid = StableFluid2D::new(4, 0.0, 0.0);
        fluid.add_density(4, 0, 1.0);
    }
}
