use crate::error::{Result, XyError};
use crate::field::FieldModel;
use crate::grid::wrap_index;
use crate::thermostat::Thermostat;
use itertools::izip;
use nalgebra::{DMatrix, Vector2};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Up, down, left and right on the torus.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Parameters consumed by a single call to [`LatticeState::step`].
///
/// The integrator is only stable while `dt * max(|alpha|, |beta|, |gamma|)`
/// stays around or below one. Larger values are not rejected; they simply
/// drive θ and ω to non-finite values which then propagate through every
/// later step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepParams {
    /// Neighbour coupling; negative values anti-align.
    pub alpha: f64,
    /// Field coupling; zero switches the field off.
    pub beta: f64,
    /// Friction or thermostat strength.
    pub gamma: f64,
    pub dt: f64,
    pub thermostat: Thermostat,
}

impl StepParams {
    pub fn new(alpha: f64, beta: f64, gamma: f64, dt: f64, thermostat: Thermostat) -> Self {
        Self {
            alpha,
            beta,
            gamma,
            dt,
            thermostat,
        }
    }

    /// `dt * max(|alpha|, |beta|, |gamma|)`; values well above one are unstable.
    pub fn stiffness(&self) -> f64 {
        self.dt * self.alpha.abs().max(self.beta.abs()).max(self.gamma.abs())
    }
}

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn wrap_angle(theta: f64) -> f64 {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Planar rotors on an N×N torus.
///
/// `theta` holds orientations in `[0, 2π)` and `omega` their angular
/// velocities. Both grids are owned by the state and only change through
/// [`LatticeState::step`].
#[derive(Debug, Clone)]
pub struct LatticeState {
    size: usize,
    theta: DMatrix<f64>,
    omega: DMatrix<f64>,
    /// Number of completed steps
    pub steps: u64,
}

impl LatticeState {
    /// All rotors at θ = 0 and at rest.
    pub fn new(size: usize) -> Result<Self> {
        Self::from_parts(DMatrix::zeros(size, size), DMatrix::zeros(size, size))
    }

    /// All rotors at the same angle and at rest.
    pub fn aligned(size: usize, angle: f64) -> Result<Self> {
        Self::from_parts(
            DMatrix::from_element(size, size, angle),
            DMatrix::zeros(size, size),
        )
    }

    /// Build a state from explicit grids. θ is wrapped into `[0, 2π)`.
    pub fn from_parts(theta: DMatrix<f64>, omega: DMatrix<f64>) -> Result<Self> {
        let size = theta.nrows();
        if theta.ncols() != size {
            return Err(XyError::InvalidLattice(format!(
                "theta must be square, got {}x{}",
                theta.nrows(),
                theta.ncols()
            )));
        }
        if omega.shape() != theta.shape() {
            return Err(XyError::InvalidLattice(format!(
                "omega shape {:?} does not match theta shape {:?}",
                omega.shape(),
                theta.shape()
            )));
        }
        if size < 2 {
            return Err(XyError::InvalidLattice(format!(
                "lattice size must be at least 2, got {}",
                size
            )));
        }
        if theta.iter().chain(omega.iter()).any(|v| !v.is_finite()) {
            return Err(XyError::InvalidLattice(
                "initial theta and omega must be finite".to_string(),
            ));
        }

        Ok(Self {
            size,
            theta: theta.map(wrap_angle),
            omega,
            steps: 0,
        })
    }

    /// Uniformly random orientations with Gaussian velocities whose variance
    /// is `initial_temperature`; zero temperature starts every rotor at rest.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R, initial_temperature: f64) -> Result<Self> {
        if !(initial_temperature >= 0.0 && initial_temperature.is_finite()) {
            return Err(XyError::InvalidParameter(format!(
                "initial temperature must be non-negative, got {}",
                initial_temperature
            )));
        }

        let theta = DMatrix::from_fn(size, size, |_, _| rng.gen::<f64>() * TAU);
        let omega = if initial_temperature > 0.0 {
            let normal = Normal::new(0.0, initial_temperature.sqrt())
                .map_err(|e| XyError::InvalidParameter(e.to_string()))?;
            DMatrix::from_fn(size, size, |_, _| normal.sample(rng))
        } else {
            DMatrix::zeros(size, size)
        };

        Self::from_parts(theta, omega)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn theta(&self) -> &DMatrix<f64> {
        &self.theta
    }

    pub fn omega(&self) -> &DMatrix<f64> {
        &self.omega
    }

    /// Instantaneous kinetic temperature `mean(ω²)`.
    pub fn kinetic_temperature(&self) -> f64 {
        self.omega.iter().map(|w| w * w).sum::<f64>() / (self.size * self.size) as f64
    }

    /// Sum of the unit vectors of the four periodic neighbours of `(i, j)`.
    pub fn neighbor_sum(&self, i: usize, j: usize) -> Vector2<f64> {
        NEIGHBOR_OFFSETS
            .iter()
            .map(|&(di, dj)| {
                let t = self.theta[(wrap_index(i, di, self.size), wrap_index(j, dj, self.size))];
                Vector2::new(t.cos(), t.sin())
            })
            .sum()
    }

    /// Circular mean direction of the neighbours of `(i, j)`.
    pub fn neighbor_angle(&self, i: usize, j: usize) -> f64 {
        let sum = self.neighbor_sum(i, j);
        sum.y.atan2(sum.x)
    }

    /// Total force on `(i, j)` evaluated on the current (pre-step) state.
    fn force_at(
        &self,
        i: usize,
        j: usize,
        params: &StepParams,
        field: Option<&FieldModel>,
        target_temperature: f64,
        kinetic_temperature: f64,
    ) -> f64 {
        let theta = self.theta[(i, j)];
        let mut force = params.alpha * (self.neighbor_angle(i, j) - theta).sin();

        if let Some(field) = field {
            force += params.beta * (field.angle[(i, j)] - theta).sin() * field.magnitude[(i, j)];
        }

        force
            + params.thermostat.force(
                params.gamma,
                self.omega[(i, j)],
                target_temperature,
                kinetic_temperature,
            )
    }

    /// Advance the lattice by one semi-implicit Euler step.
    ///
    /// All forces are computed from the pre-step snapshot, then
    /// `ω += dt·F` and `θ += dt·ω` using the updated ω, and θ is wrapped back
    /// into `[0, 2π)`. The field only contributes when present and
    /// `beta != 0`. See [`StepParams`] for the stability precondition.
    ///
    /// A field built for another lattice size is rejected before anything
    /// changes.
    pub fn step(
        &mut self,
        params: &StepParams,
        field: Option<&FieldModel>,
        target_temperature: f64,
    ) -> Result<()> {
        let n = self.size;
        if let Some(field) = field {
            if field.size() != n {
                return Err(XyError::InvalidLattice(format!(
                    "field size {} does not match lattice size {}",
                    field.size(),
                    n
                )));
            }
        }
        let field = field.filter(|_| params.beta != 0.0);

        let kinetic_temperature = if params.thermostat.needs_kinetic_temperature() {
            self.kinetic_temperature()
        } else {
            0.0
        };

        // Column-major order, matching DMatrix storage.
        let forces: Vec<f64> = (0..n * n)
            .into_par_iter()
            .map(|k| {
                self.force_at(k % n, k / n, params, field, target_temperature, kinetic_temperature)
            })
            .collect();

        for (theta, omega, force) in izip!(self.theta.iter_mut(), self.omega.iter_mut(), &forces) {
            *omega += params.dt * force;
            *theta = wrap_angle(*theta + params.dt * *omega);
        }

        self.steps += 1;
        Ok(())
    }
}
