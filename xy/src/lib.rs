//! Planar rotor (XY model) lattice dynamics on a 2D torus.
//!
//! A [`LatticeState`] holds orientations and angular velocities and advances
//! them with a sine neighbour coupling, an optional static [`FieldModel`] and
//! a [`Thermostat`] term. [`SimulationDriver`] groups steps into frames, reads
//! target temperatures from a [`TemperatureSchedule`] and exposes a smoothed
//! [`Magnetization`] for rendering. The crate performs no I/O.

pub mod analysis;
pub mod config;
pub mod driver;
pub mod error;
pub mod field;
pub mod grid;
pub mod lattice;
pub mod magnetization;
pub mod schedule;
pub mod thermostat;

pub use config::{ScheduleConfig, SimulationConfig};
pub use driver::{DriverState, Frame, SimulationDriver};
pub use error::{Result, XyError};
pub use field::{FieldCoefficients, FieldModel};
pub use grid::CoordinateGrid;
pub use lattice::{wrap_angle, LatticeState, StepParams};
pub use magnetization::{Magnetization, MagnetizationField};
pub use schedule::{Segment, TemperatureSchedule};
pub use thermostat::Thermostat;
