use crate::config::SimulationConfig;
use crate::error::{Result, XyError};
use crate::field::FieldModel;
use crate::grid::CoordinateGrid;
use crate::lattice::{LatticeState, StepParams};
use crate::magnetization::{Magnetization, MagnetizationField};
use crate::schedule::TemperatureSchedule;
use nalgebra::DMatrix;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Complete,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub index: usize,
    /// Global step count after the frame's inner steps
    pub global_step: usize,
    pub grid: &'a CoordinateGrid,
    pub theta: &'a DMatrix<f64>,
    /// The field model, still present after the coupling is switched off
    pub field: Option<&'a FieldModel>,
    pub magnetization: Magnetization,
    /// Target temperature applied on the frame's last inner step
    pub target_temperature: f64,
    pub kinetic_temperature: f64,
    pub beta: f64,
}

/// Runs `inner_steps_per_frame` lattice updates per frame and hands the
/// smoothed state out one frame at a time.
///
/// The schedule is indexed by global step (`frame * inner + local`), which is
/// tracked separately from the frame counter.
pub struct SimulationDriver {
    config: SimulationConfig,
    params: StepParams,
    lattice: LatticeState,
    grid: CoordinateGrid,
    field: Option<FieldModel>,
    schedule: TemperatureSchedule,
    smoother: MagnetizationField,
    pending_field_off: Option<usize>,
    frame_index: usize,
    global_step: usize,
    state: DriverState,
    reported_non_finite: bool,
}

impl SimulationDriver {
    /// Build a driver whose schedule comes from `config.schedule`.
    pub fn new(config: SimulationConfig, lattice: LatticeState) -> Result<Self> {
        config.validate()?;
        let schedule = config.schedule.build(config.total_steps())?;
        Self::with_schedule(config, lattice, schedule)
    }

    /// Build a driver around an explicit schedule. A schedule shorter than
    /// the run is accepted here and fails once the driver reaches its end.
    pub fn with_schedule(
        config: SimulationConfig,
        lattice: LatticeState,
        schedule: TemperatureSchedule,
    ) -> Result<Self> {
        config.validate()?;
        if lattice.size() != config.size {
            return Err(XyError::InvalidLattice(format!(
                "lattice size {} does not match configured size {}",
                lattice.size(),
                config.size
            )));
        }

        let grid = CoordinateGrid::centered(config.size);
        let field = config
            .field
            .map(|coefficients| FieldModel::build(&grid, coefficients, config.field_epsilon))
            .transpose()?;
        let smoother = MagnetizationField::new(config.kernel_size, config.size)?;

        match &field {
            Some(field) => {
                let c = field.coefficients;
                info!(a = c.a, b = c.b, c = c.c, d = c.d, "external field enabled");
            }
            None => info!("no external field"),
        }
        if config.step_params().stiffness() > 1.0 {
            warn!(
                stiffness = config.step_params().stiffness(),
                "dt * max(|alpha|, |beta|, |gamma|) exceeds 1; the integrator may diverge"
            );
        }

        Ok(Self {
            params: config.step_params(),
            pending_field_off: config.field_off_frame,
            config,
            lattice,
            grid,
            field,
            schedule,
            smoother,
            frame_index: 0,
            global_step: 0,
            state: DriverState::Running,
            reported_non_finite: false,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Index of the next frame to be produced.
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn global_step(&self) -> usize {
        self.global_step
    }

    pub fn beta(&self) -> f64 {
        self.params.beta
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn lattice(&self) -> &LatticeState {
        &self.lattice
    }

    pub fn grid(&self) -> &CoordinateGrid {
        &self.grid
    }

    pub fn field(&self) -> Option<&FieldModel> {
        self.field.as_ref()
    }

    pub fn schedule(&self) -> &TemperatureSchedule {
        &self.schedule
    }

    /// Advance one frame. Returns `Ok(None)` once the run is complete.
    ///
    /// A schedule lookup past its end aborts the run: the error is returned
    /// and the driver is left `Complete`.
    pub fn next_frame(&mut self) -> Result<Option<Frame<'_>>> {
        if self.state == DriverState::Complete {
            return Ok(None);
        }

        if self.pending_field_off == Some(self.frame_index) {
            self.pending_field_off = None;
            self.params.beta = 0.0;
            info!(frame = self.frame_index, "field coupling switched off");
        }

        let inner = self.config.inner_steps_per_frame;
        let mut target_temperature = 0.0;
        for local in 0..inner {
            let step = self.frame_index * inner + local;
            target_temperature = match self.schedule.at(step) {
                Ok(t) => t,
                Err(e) => {
                    self.state = DriverState::Complete;
                    return Err(e);
                }
            };
            if let Err(e) = self.lattice.step(&self.params, self.field.as_ref(), target_temperature) {
                self.state = DriverState::Complete;
                return Err(e);
            }
            self.global_step = step + 1;
        }

        let magnetization = match self.smoother.compute(&self.lattice) {
            Ok(m) => m,
            Err(e) => {
                self.state = DriverState::Complete;
                return Err(e);
            }
        };
        let kinetic_temperature = self.lattice.kinetic_temperature();
        if !kinetic_temperature.is_finite() && !self.reported_non_finite {
            self.reported_non_finite = true;
            warn!(
                frame = self.frame_index,
                "kinetic temperature is no longer finite; reduce dt or the couplings"
            );
        }

        let index = self.frame_index;
        self.frame_index += 1;
        if self.frame_index >= self.config.total_frames {
            self.state = DriverState::Complete;
        }
        debug!(
            frame = index,
            step = self.global_step,
            target_temperature,
            kinetic_temperature,
            "frame complete"
        );

        Ok(Some(Frame {
            index,
            global_step: self.global_step,
            grid: &self.grid,
            theta: self.lattice.theta(),
            field: self.field.as_ref(),
            magnetization,
            target_temperature,
            kinetic_temperature,
            beta: self.params.beta,
        }))
    }

    /// Drive the run to completion, feeding every frame to `sink`.
    /// Returns the number of frames produced.
    pub fn run<E, F>(&mut self, mut sink: F) -> std::result::Result<usize, E>
    where
        E: From<XyError>,
        F: FnMut(&Frame<'_>) -> std::result::Result<(), E>,
    {
        let mut frames = 0;
        while let Some(frame) = self.next_frame()? {
            sink(&frame)?;
            frames += 1;
        }
        Ok(frames)
    }
}
