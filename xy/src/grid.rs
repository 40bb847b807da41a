// xy/src/grid.rs

use nalgebra::DMatrix;

/// Integer-valued coordinates of an N×N lattice centred on the origin.
///
/// `x[(i, j)]` varies along the first index and `y[(i, j)]` along the second.
/// For odd N the origin is the central site; for even N the grid runs from
/// `-(N/2 - 1)` to `N/2`.
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateGrid {
    pub size: usize,
    pub x: DMatrix<f64>,
    pub y: DMatrix<f64>,
}

impl CoordinateGrid {
    pub fn centered(size: usize) -> Self {
        let shift = (size + 1) / 2 - 1;
        let coord = |k: usize| k as f64 - shift as f64;
        Self {
            size,
            x: DMatrix::from_fn(size, size, |i, _| coord(i)),
            y: DMatrix::from_fn(size, size, |_, j| coord(j)),
        }
    }

    /// Coordinate range `(min, max)` shared by both axes.
    pub fn extent(&self) -> (f64, f64) {
        if self.size == 0 {
            return (0.0, 0.0);
        }
        (self.x[(0, 0)], self.x[(self.size - 1, 0)])
    }
}

/// Wrap `i + offset` onto a periodic axis of length `n`.
#[inline]
pub fn wrap_index(i: usize, offset: isize, n: usize) -> usize {
    (i as isize + offset).rem_euclid(n as isize) as usize
}
