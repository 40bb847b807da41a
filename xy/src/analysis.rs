use crate::field::FieldModel;
use nalgebra::DMatrix;
use std::f64::consts::{PI, TAU};

// Observables for analysing rotor lattice states

/// Global order parameter `|⟨e^{iθ}⟩|`: 1 for a fully aligned lattice,
/// close to 0 for a disordered one.
pub fn order_parameter(theta: &DMatrix<f64>) -> f64 {
    let n = theta.len() as f64;
    let (mx, my) = theta
        .iter()
        .fold((0.0, 0.0), |(x, y), t| (x + t.cos(), y + t.sin()));
    (mx * mx + my * my).sqrt() / n
}

/// Energy per site of `H = -alpha Σ cos(θi - θj) - beta Σ |B| cos(φB - θ)`.
///
/// Bonds are counted once (right and down neighbour, periodic). The field
/// term is skipped when `field` is `None`.
pub fn energy_per_site(theta: &DMatrix<f64>, alpha: f64, beta: f64, field: Option<&FieldModel>) -> f64 {
    let n = theta.nrows();
    let mut energy = 0.0;

    for i in 0..n {
        for j in 0..n {
            let t = theta[(i, j)];
            let right = theta[(i, (j + 1) % n)];
            let down = theta[((i + 1) % n, j)];
            energy -= alpha * ((t - right).cos() + (t - down).cos());

            if let Some(field) = field {
                energy -= beta * field.magnitude[(i, j)] * (field.angle[(i, j)] - t).cos();
            }
        }
    }

    energy / (n * n) as f64
}

/// Winding number of the plaquette with lower corner `(i, j)`, traversed
/// `(i, j) -> (i+1, j) -> (i+1, j+1) -> (i, j+1)` on the torus.
pub fn plaquette_winding(theta: &DMatrix<f64>, i: usize, j: usize) -> i32 {
    let n = theta.nrows();
    let corners = [
        theta[(i, j)],
        theta[((i + 1) % n, j)],
        theta[((i + 1) % n, (j + 1) % n)],
        theta[(i, (j + 1) % n)],
    ];
    let total: f64 = (0..4)
        .map(|k| angle_difference(corners[(k + 1) % 4] - corners[k]))
        .sum();
    (total / TAU).round() as i32
}

/// Count vortices and antivortices from plaquette winding numbers.
///
/// On a torus the windings sum to zero, so a lone vortex always comes with
/// a compensating antivortex somewhere else.
pub fn count_vortices(theta: &DMatrix<f64>) -> (usize, usize) {
    let n = theta.nrows();
    let mut plus = 0;
    let mut minus = 0;

    for i in 0..n {
        for j in 0..n {
            match plaquette_winding(theta, i, j) {
                w if w > 0 => plus += 1,
                w if w < 0 => minus += 1,
                _ => {}
            }
        }
    }

    (plus, minus)
}

/// Wrap an angle difference into `[-π, π]`.
fn angle_difference(d: f64) -> f64 {
    let wrapped = (d + PI).rem_euclid(TAU) - PI;
    if wrapped < -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

/// Berezinskii-Kosterlitz-Thouless temperature of the square-lattice XY
/// model with unit coupling (numerical estimate).
pub fn bkt_temperature() -> f64 {
    0.893
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldCoefficients, DEFAULT_EPSILON};
    use crate::grid::CoordinateGrid;
    use crate::lattice::LatticeState;
    use approx::*;

    #[test]
    fn aligned_lattice_is_fully_ordered() {
        let lattice = LatticeState::aligned(8, 2.0).unwrap();
        assert_relative_eq!(order_parameter(lattice.theta()), 1.0, epsilon = 1e-12);
        assert_relative_eq!(energy_per_site(lattice.theta(), 1.0, 0.0, None), -2.0, epsilon = 1e-12);
        assert_eq!(count_vortices(lattice.theta()), (0, 0));
    }

    #[test]
    fn checkerboard_cancels_order() {
        let theta = DMatrix::from_fn(6, 6, |i, j| if (i + j) % 2 == 0 { 0.0 } else { PI });
        let lattice = LatticeState::from_parts(theta, DMatrix::zeros(6, 6)).unwrap();
        assert_abs_diff_eq!(order_parameter(lattice.theta()), 0.0, epsilon = 1e-12);
        // antiferromagnetic ground state
        assert_relative_eq!(energy_per_site(lattice.theta(), -1.0, 0.0, None), -2.0, epsilon = 1e-12);
    }

    #[test]
    fn field_energy_favours_alignment() {
        let grid = CoordinateGrid::centered(5);
        let field = FieldModel::build(&grid, FieldCoefficients::radial(), DEFAULT_EPSILON).unwrap();
        let aligned = LatticeState::from_parts(field.angle.clone(), DMatrix::zeros(5, 5)).unwrap();
        let reversed =
            LatticeState::from_parts(field.angle.map(|a| a + PI), DMatrix::zeros(5, 5)).unwrap();
        let e_aligned = energy_per_site(aligned.theta(), 0.0, 1.0, Some(&field));
        let e_reversed = energy_per_site(reversed.theta(), 0.0, 1.0, Some(&field));
        assert!(e_aligned < 0.0);
        assert_relative_eq!(e_aligned, -e_reversed, epsilon = 1e-9);
    }

    #[test]
    fn single_vortex_is_detected() {
        // θ points away from the centre of plaquette (1, 1)
        let n = 6;
        let theta = DMatrix::from_fn(n, n, |i, j| {
            let (x, y) = (i as f64 - 1.5, j as f64 - 1.5);
            y.atan2(x)
        });
        assert_eq!(plaquette_winding(&theta, 1, 1), 1);

        let antivortex = theta.map(|t| -t);
        assert_eq!(plaquette_winding(&antivortex, 1, 1), -1);

        let (plus, minus) = count_vortices(&theta);
        assert!(plus >= 1 && minus >= 1);
    }

    #[test]
    fn angle_difference_is_wrapped() {
        assert_relative_eq!(angle_difference(1.5 * PI), -0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(angle_difference(-1.5 * PI), 0.5 * PI, epsilon = 1e-12);
        assert_relative_eq!(angle_difference(0.3), 0.3, epsilon = 1e-12);
    }
}
