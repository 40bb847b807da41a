//! Input/Output operations for rotor lattice animations
//!
//! This module handles logging setup and GIF rendering.

mod gif;
mod output;

pub use gif::GifRenderer;
pub use output::setup_output;
