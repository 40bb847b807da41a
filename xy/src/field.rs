use crate::error::{Result, XyError};
use crate::grid::CoordinateGrid;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Default regulariser added to `gx² + gy²` so the origin never divides by zero.
pub const DEFAULT_EPSILON: f64 = 1e-5;

/// Coefficients of the linear map `(gx, gy) -> (a gx + b gy, c gx + d gy)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldCoefficients {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl FieldCoefficients {
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self { a, b, c, d }
    }

    /// Radial field pointing away from the origin.
    pub fn radial() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0)
    }

    pub fn scaled(&self, k: f64) -> Self {
        Self::new(self.a * k, self.b * k, self.c * k, self.d * k)
    }

    fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d].iter().all(|v| v.is_finite())
    }
}

/// Static external field sampled on the lattice coordinates.
///
/// Each component is the linear map divided by `sqrt(gx² + gy² + ε)`, so away
/// from the origin the field is direction-only up to the scale of the
/// coefficients. `angle` and `magnitude` are cached for the force law.
#[derive(Debug, Clone)]
pub struct FieldModel {
    pub coefficients: FieldCoefficients,
    pub field_x: DMatrix<f64>,
    pub field_y: DMatrix<f64>,
    pub angle: DMatrix<f64>,
    pub magnitude: DMatrix<f64>,
}

impl FieldModel {
    pub fn build(grid: &CoordinateGrid, coefficients: FieldCoefficients, epsilon: f64) -> Result<Self> {
        if !coefficients.is_finite() {
            return Err(XyError::InvalidParameter(format!(
                "field coefficients must be finite, got {:?}",
                coefficients
            )));
        }
        if !(epsilon > 0.0 && epsilon.is_finite()) {
            return Err(XyError::InvalidParameter(format!(
                "field epsilon must be positive and finite, got {}",
                epsilon
            )));
        }

        let FieldCoefficients { a, b, c, d } = coefficients;
        let norm = grid
            .x
            .zip_map(&grid.y, |gx, gy| (gx * gx + gy * gy + epsilon).sqrt());

        let field_x = DMatrix::from_fn(grid.size, grid.size, |i, j| {
            (a * grid.x[(i, j)] + b * grid.y[(i, j)]) / norm[(i, j)]
        });
        let field_y = DMatrix::from_fn(grid.size, grid.size, |i, j| {
            (c * grid.x[(i, j)] + d * grid.y[(i, j)]) / norm[(i, j)]
        });
        let angle = field_y.zip_map(&field_x, |fy, fx| fy.atan2(fx));
        let magnitude = field_x.zip_map(&field_y, |fx, fy| (fx * fx + fy * fy).sqrt());

        Ok(Self {
            coefficients,
            field_x,
            field_y,
            angle,
            magnitude,
        })
    }

    pub fn size(&self) -> usize {
        self.field_x.nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    fn sample_coefficients() -> FieldCoefficients {
        FieldCoefficients::new(0.3, -0.7, 0.9, 0.2)
    }

    #[test]
    fn origin_is_regularised() {
        let grid = CoordinateGrid::centered(5);
        let field = FieldModel::build(&grid, sample_coefficients(), DEFAULT_EPSILON).unwrap();
        // (2, 2) is the origin of a 5×5 grid
        assert_eq!(field.field_x[(2, 2)], 0.0);
        assert_eq!(field.field_y[(2, 2)], 0.0);
        assert_eq!(field.magnitude[(2, 2)], 0.0);
        assert!(field.field_x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn magnitude_matches_components() {
        let grid = CoordinateGrid::centered(7);
        let field = FieldModel::build(&grid, sample_coefficients(), DEFAULT_EPSILON).unwrap();
        for i in 0..7 {
            for j in 0..7 {
                let fx = field.field_x[(i, j)];
                let fy = field.field_y[(i, j)];
                assert_relative_eq!(field.magnitude[(i, j)], (fx * fx + fy * fy).sqrt());
                if field.magnitude[(i, j)] > 0.0 {
                    assert_relative_eq!(field.angle[(i, j)], fy.atan2(fx));
                }
            }
        }
    }

    #[test]
    fn magnitude_scales_linearly_with_coefficients() {
        let grid = CoordinateGrid::centered(6);
        let base = FieldModel::build(&grid, sample_coefficients(), DEFAULT_EPSILON).unwrap();
        for &k in &[0.5, 2.0, 7.5] {
            let scaled =
                FieldModel::build(&grid, sample_coefficients().scaled(k), DEFAULT_EPSILON).unwrap();
            for (m0, mk) in base.magnitude.iter().zip(scaled.magnitude.iter()) {
                assert_relative_eq!(*mk, k * m0, max_relative = 1e-12);
            }
            // direction does not change under positive rescaling
            for (a0, ak) in base.angle.iter().zip(scaled.angle.iter()) {
                assert_abs_diff_eq!(*a0, *ak, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn radial_field_is_unit_away_from_origin() {
        let grid = CoordinateGrid::centered(9);
        let field = FieldModel::build(&grid, FieldCoefficients::radial(), 1e-10).unwrap();
        assert_relative_eq!(field.magnitude[(8, 4)], 1.0, epsilon = 1e-9);
        assert_relative_eq!(field.angle[(8, 4)], 0.0, epsilon = 1e-12);
        assert_relative_eq!(field.angle[(4, 8)], std::f64::consts::FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn rejects_bad_inputs() {
        let grid = CoordinateGrid::centered(4);
        let nan = FieldCoefficients::new(f64::NAN, 0.0, 0.0, 1.0);
        assert!(FieldModel::build(&grid, nan, DEFAULT_EPSILON).is_err());
        assert!(FieldModel::build(&grid, FieldCoefficients::radial(), 0.0).is_err());
    }
}
