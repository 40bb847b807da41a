use serde::{Deserialize, Serialize};

/// Velocity-dependent term added to the rotor force each step.
///
/// `Friction` damps every site independently and ignores the target
/// temperature. The two Nose-Hoover variants couple to the lattice-wide
/// kinetic temperature `mean(ω²)` and push it toward the target; they differ
/// in whether the kick is proportional to ω or only carries its sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Thermostat {
    #[default]
    Friction,
    NoseHoover,
    NoseHooverSigned,
}

impl Thermostat {
    /// Contribution to the force on one site.
    ///
    /// `kinetic_temperature` must be taken from the pre-step lattice so that
    /// every site sees the same ensemble value.
    #[inline]
    pub fn force(self, gamma: f64, omega: f64, target_temperature: f64, kinetic_temperature: f64) -> f64 {
        match self {
            Thermostat::Friction => -gamma * omega,
            Thermostat::NoseHoover => gamma * (target_temperature - kinetic_temperature) * omega,
            Thermostat::NoseHooverSigned => {
                gamma * (target_temperature - kinetic_temperature) * sign(omega)
            }
        }
    }

    /// Whether the policy reads the lattice kinetic temperature at all.
    pub fn needs_kinetic_temperature(self) -> bool {
        !matches!(self, Thermostat::Friction)
    }
}

/// Sign with `sign(0) = 0`; `f64::signum` maps zero to one.
#[inline]
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        // zero stays zero, NaN stays NaN
        x
    }
}
