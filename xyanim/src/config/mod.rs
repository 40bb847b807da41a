//! Configuration management for rotor lattice animations
//!
//! The YAML file carries the engine parameters, the random seed, how the
//! external field is chosen and how frames are rendered. Command-line
//! arguments override individual values.

mod args;

pub use args::Args;

use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use xy::{FieldCoefficients, SimulationConfig};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// Seed for the initial state and any sampled field coefficients
    pub seed: Option<u64>,
    /// How to obtain field coefficients; when absent `simulation.field` is used as is
    pub field: Option<FieldChoice>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub render: RenderParams,
}

/// External field selection
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldChoice {
    None,
    /// Draw a, b, c, d uniformly from [-1, 1]
    Random,
    Explicit { a: f64, b: f64, c: f64, d: f64 },
}

impl FieldChoice {
    pub fn explicit(&self) -> Option<FieldCoefficients> {
        match *self {
            FieldChoice::Explicit { a, b, c, d } => Some(FieldCoefficients::new(a, b, c, d)),
            _ => None,
        }
    }
}

/// Rendering parameters
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RenderParams {
    #[serde(default = "default_output")]
    pub output: String,
    #[serde(default = "default_frame_side")]
    pub width: u32,
    #[serde(default = "default_frame_side")]
    pub height: u32,
    #[serde(default = "default_frame_delay")]
    pub frame_delay_ms: u32,
    /// Arrow half-length in lattice units
    #[serde(default = "default_arrow_scale")]
    pub arrow_scale: f64,
}

// Default value functions
fn default_output() -> String {
    "images/spin_quiver.gif".to_string()
}
fn default_frame_side() -> u32 {
    600
}
fn default_frame_delay() -> u32 {
    50
}
fn default_arrow_scale() -> f64 {
    0.4
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            output: default_output(),
            width: default_frame_side(),
            height: default_frame_side(),
            frame_delay_ms: default_frame_delay(),
            arrow_scale: default_arrow_scale(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Unable to read configuration file: {}", path.display()))?;
        let config = serde_yml::from_str::<Config>(&content)
            .wrap_err("Failed to parse configuration file")?;
        Ok(config)
    }

    /// Apply command-line overrides
    pub fn apply_args(&mut self, args: &Args) {
        let sim = &mut self.simulation;
        if let Some(size) = args.size {
            sim.size = size;
        }
        if let Some(frames) = args.frames {
            sim.total_frames = frames;
        }
        if let Some(alpha) = args.alpha {
            sim.alpha = alpha;
        }
        if let Some(beta) = args.beta {
            sim.beta = beta;
        }
        if let Some(gamma) = args.gamma {
            sim.gamma = gamma;
        }
        if let Some(dt) = args.dt {
            sim.dt = dt;
        }
        if args.field_off_frame.is_some() {
            sim.field_off_frame = args.field_off_frame;
        }
        if args.seed.is_some() {
            self.seed = args.seed;
        }
        if let Some(gif) = &args.gif {
            self.render.output = gif.clone();
        }
    }
}
