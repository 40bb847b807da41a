//! Command-line argument parsing for rotor lattice animations

use clap::Parser;

/// Animate a planar rotor lattice from a YAML configuration
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    pub config_file: String,

    /// Write the log to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Override the GIF output path
    #[arg(long)]
    pub gif: Option<String>,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the number of rendered frames
    #[arg(long)]
    pub frames: Option<usize>,

    /// Override the lattice side length
    #[arg(long)]
    pub size: Option<usize>,

    /// Override the neighbour coupling
    #[arg(long, allow_hyphen_values = true)]
    pub alpha: Option<f64>,

    /// Override the field coupling
    #[arg(long, allow_hyphen_values = true)]
    pub beta: Option<f64>,

    /// Override the friction / thermostat strength
    #[arg(long)]
    pub gamma: Option<f64>,

    /// Override the integration time step
    #[arg(long)]
    pub dt: Option<f64>,

    /// Switch the field off at this frame
    #[arg(long)]
    pub field_off_frame: Option<usize>,
}
