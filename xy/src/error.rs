//! Error types for the xy engine.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum XyError {
    #[error("schedule index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("kernel size {kernel} is invalid for a lattice of size {size}")]
    InvalidKernel { kernel: usize, size: usize },

    #[error("Invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

pub type Result<T> = std::result::Result<T, XyError>;
