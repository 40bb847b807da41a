//! Rotor lattice animation command-line interface
//!
//! Runs a damped or thermostatted planar rotor lattice from a YAML
//! configuration and renders it as an animated GIF.

use color_eyre::eyre::Result;

mod app;
mod config;
mod io;

use app::XyApplication;

fn main() -> Result<()> {
    color_eyre::install()?;
    XyApplication::from_cli()?.run()
}
