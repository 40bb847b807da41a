use crate::error::{Result, XyError};
use crate::grid::wrap_index;
use crate::lattice::LatticeState;
use nalgebra::DMatrix;
use rayon::prelude::*;

/// Locally smoothed orientation and magnitude of the spin field.
#[derive(Debug, Clone, PartialEq)]
pub struct Magnetization {
    pub angle: DMatrix<f64>,
    pub magnitude: DMatrix<f64>,
}

impl Magnetization {
    pub fn mean_magnitude(&self) -> f64 {
        self.magnitude.mean()
    }
}

/// Periodic box average of `(cos θ, sin θ)` over a `k × k` window.
///
/// Only feeds rendering; nothing here flows back into the dynamics. For site
/// `i` the window covers `i - k/2 ..= i - k/2 + k - 1` on the torus, so even
/// kernels lean one site toward lower indices.
#[derive(Debug, Clone, Copy)]
pub struct MagnetizationField {
    kernel_size: usize,
    lattice_size: usize,
}

impl MagnetizationField {
    pub fn new(kernel_size: usize, lattice_size: usize) -> Result<Self> {
        if kernel_size == 0 || kernel_size > lattice_size {
            return Err(XyError::InvalidKernel {
                kernel: kernel_size,
                size: lattice_size,
            });
        }
        Ok(Self {
            kernel_size,
            lattice_size,
        })
    }

    pub fn kernel_size(&self) -> usize {
        self.kernel_size
    }

    /// Smooth `lattice`, which must have the size this field was built for.
    pub fn compute(&self, lattice: &LatticeState) -> Result<Magnetization> {
        if lattice.size() != self.lattice_size {
            return Err(XyError::InvalidLattice(format!(
                "lattice size {} does not match smoother size {}",
                lattice.size(),
                self.lattice_size
            )));
        }
        let theta = lattice.theta();
        let x = self.box_average(&theta.map(f64::cos));
        let y = self.box_average(&theta.map(f64::sin));

        Ok(Magnetization {
            angle: y.zip_map(&x, |sy, sx| sy.atan2(sx)),
            magnitude: x.zip_map(&y, |sx, sy| (sx * sx + sy * sy).sqrt()),
        })
    }

    /// Separable periodic box filter: average along rows, then along columns.
    fn box_average(&self, grid: &DMatrix<f64>) -> DMatrix<f64> {
        let along_i = self.pass(grid, true);
        self.pass(&along_i, false)
    }

    fn pass(&self, grid: &DMatrix<f64>, along_i: bool) -> DMatrix<f64> {
        let n = self.lattice_size;
        let k = self.kernel_size;
        let lead = (k / 2) as isize;
        let inv = 1.0 / k as f64;

        let values: Vec<f64> = (0..n * n)
            .into_par_iter()
            .map(|idx| {
                let (i, j) = (idx % n, idx / n);
                (0..k as isize)
                    .map(|d| {
                        if along_i {
                            grid[(wrap_index(i, d - lead, n), j)]
                        } else {
                            grid[(i, wrap_index(j, d - lead, n))]
                        }
                    })
                    .sum::<f64>()
                    * inv
            })
            .collect();

        DMatrix::from_vec(n, n, values)
    }
}
