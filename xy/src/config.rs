use crate::error::{Result, XyError};
use crate::field::{FieldCoefficients, DEFAULT_EPSILON};
use crate::lattice::StepParams;
use crate::schedule::{Segment, TemperatureSchedule};
use crate::thermostat::Thermostat;
use serde::{Deserialize, Serialize};

/// Parameters fixed for the lifetime of one simulation run.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SimulationConfig {
    /// Lattice side length N
    pub size: usize,
    /// Neighbour coupling strength
    pub alpha: f64,
    /// Field coupling strength
    #[serde(default)]
    pub beta: f64,
    /// Friction / thermostat strength
    pub gamma: f64,
    /// Integration time step
    pub dt: f64,
    #[serde(default)]
    pub thermostat: Thermostat,
    #[serde(default = "default_inner_steps")]
    pub inner_steps_per_frame: usize,
    pub total_frames: usize,
    /// Side of the smoothing window used for the magnetization field
    #[serde(default = "default_kernel_size")]
    pub kernel_size: usize,
    /// External field coefficients; `None` runs without a field
    #[serde(default)]
    pub field: Option<FieldCoefficients>,
    #[serde(default = "default_field_epsilon")]
    pub field_epsilon: f64,
    /// Frame at which `beta` is set to zero for the rest of the run
    #[serde(default)]
    pub field_off_frame: Option<usize>,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    /// Variance of the initial angular velocities
    #[serde(default)]
    pub initial_temperature: f64,
}

/// How the target temperature evolves over the run.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScheduleConfig {
    Constant { temperature: f64 },
    AnnealCycle { high: f64, low: f64 },
    Segments { start: f64, segments: Vec<Segment> },
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig::Constant { temperature: 0.0 }
    }
}

impl ScheduleConfig {
    pub fn build(&self, total_steps: usize) -> Result<TemperatureSchedule> {
        match self {
            ScheduleConfig::Constant { temperature } => {
                TemperatureSchedule::constant(total_steps, *temperature)
            }
            ScheduleConfig::AnnealCycle { high, low } => {
                TemperatureSchedule::anneal_cycle(total_steps, *high, *low)
            }
            ScheduleConfig::Segments { start, segments } => {
                TemperatureSchedule::build(total_steps, *start, segments)
            }
        }
    }
}

// Default value functions
fn default_inner_steps() -> usize {
    15
}
fn default_kernel_size() -> usize {
    5
}
fn default_field_epsilon() -> f64 {
    DEFAULT_EPSILON
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            size: 11,
            alpha: -1.0,
            beta: 1.0,
            gamma: 0.1,
            dt: 0.1,
            thermostat: Thermostat::Friction,
            inner_steps_per_frame: default_inner_steps(),
            total_frames: 100,
            kernel_size: default_kernel_size(),
            field: Some(FieldCoefficients::radial()),
            field_epsilon: default_field_epsilon(),
            field_off_frame: None,
            schedule: ScheduleConfig::default(),
            initial_temperature: 0.0,
        }
    }
}

impl SimulationConfig {
    pub fn step_params(&self) -> StepParams {
        StepParams::new(self.alpha, self.beta, self.gamma, self.dt, self.thermostat)
    }

    /// Number of lattice updates in the whole run. Saturates on overflow,
    /// which [`SimulationConfig::validate`] rejects.
    pub fn total_steps(&self) -> usize {
        self.total_frames.saturating_mul(self.inner_steps_per_frame)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.size < 2 {
            return Err(XyError::InvalidLattice(format!(
                "lattice size must be at least 2, got {}",
                self.size
            )));
        }

        for (name, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("initial_temperature", self.initial_temperature),
        ] {
            if !value.is_finite() {
                return Err(XyError::InvalidParameter(format!("{} must be finite", name)));
            }
        }
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(XyError::InvalidParameter("Time step must be positive".to_string()));
        }
        if self.initial_temperature < 0.0 {
            return Err(XyError::InvalidParameter(
                "Initial temperature must be non-negative".to_string(),
            ));
        }

        if self.inner_steps_per_frame == 0 {
            return Err(XyError::InvalidParameter(
                "inner_steps_per_frame must be positive".to_string(),
            ));
        }
        if self.total_frames == 0 {
            return Err(XyError::InvalidParameter("total_frames must be positive".to_string()));
        }
        if self.total_frames.checked_mul(self.inner_steps_per_frame).is_none() {
            return Err(XyError::InvalidParameter(format!(
                "total_frames {} * inner_steps_per_frame {} overflows",
                self.total_frames, self.inner_steps_per_frame
            )));
        }

        if self.kernel_size == 0 || self.kernel_size > self.size {
            return Err(XyError::InvalidKernel {
                kernel: self.kernel_size,
                size: self.size,
            });
        }

        if let Some(frame) = self.field_off_frame {
            if frame >= self.total_frames {
                return Err(XyError::InvalidParameter(format!(
                    "field_off_frame {} is past the last frame {}",
                    frame,
                    self.total_frames - 1
                )));
            }
        }

        Ok(())
    }
}
