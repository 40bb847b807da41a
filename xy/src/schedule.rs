use crate::error::{Result, XyError};
use serde::{Deserialize, Serialize};

/// One piece of a temperature schedule. `fraction` is the share of the total
/// step count the segment occupies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Linear ramp from the current temperature to `to`, endpoints included.
    Ramp { to: f64, fraction: f64 },
    /// Hold the current temperature.
    Hold { fraction: f64 },
}

impl Segment {
    fn fraction(&self) -> f64 {
        match *self {
            Segment::Ramp { fraction, .. } | Segment::Hold { fraction } => fraction,
        }
    }
}

/// Target temperature for every simulation step of a run.
///
/// The schedule is indexed by global step, not by rendered frame, and is
/// read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureSchedule {
    values: Vec<f64>,
}

impl TemperatureSchedule {
    /// Concatenate `segments` starting from `start`.
    ///
    /// Segment `k` ends at step `round(total_steps * (f_0 + .. + f_k))`. When
    /// the fractions sum to less than one the remaining steps hold the last
    /// temperature.
    pub fn build(total_steps: usize, start: f64, segments: &[Segment]) -> Result<Self> {
        if total_steps == 0 {
            return Err(XyError::InvalidSchedule("total_steps must be positive".to_string()));
        }
        if !start.is_finite() {
            return Err(XyError::InvalidSchedule(format!("start temperature {} is not finite", start)));
        }

        let mut cumulative = 0.0;
        for segment in segments {
            let fraction = segment.fraction();
            if !(fraction >= 0.0 && fraction.is_finite()) {
                return Err(XyError::InvalidSchedule(format!(
                    "segment fraction must be non-negative, got {}",
                    fraction
                )));
            }
            if let Segment::Ramp { to, .. } = segment {
                if !to.is_finite() {
                    return Err(XyError::InvalidSchedule(format!("ramp target {} is not finite", to)));
                }
            }
            cumulative += fraction;
        }
        if cumulative > 1.0 + 1e-9 {
            return Err(XyError::InvalidSchedule(format!(
                "segment fractions sum to {}, more than 1",
                cumulative
            )));
        }

        let mut values = Vec::with_capacity(total_steps);
        let mut current = start;
        let mut cumulative = 0.0;
        for segment in segments {
            cumulative += segment.fraction();
            let end = ((total_steps as f64 * cumulative).round() as usize).min(total_steps);
            let len = end.saturating_sub(values.len());
            match *segment {
                Segment::Ramp { to, .. } => {
                    values.extend(linspace(current, to, len));
                    current = to;
                }
                Segment::Hold { .. } => values.extend(std::iter::repeat(current).take(len)),
            }
        }
        values.resize(total_steps, current);

        Ok(Self { values })
    }

    pub fn constant(total_steps: usize, temperature: f64) -> Result<Self> {
        Self::build(total_steps, temperature, &[])
    }

    /// Cool, hold, reheat, hold, cool again and hold for the rest of the run:
    /// ramps take a fifth of the steps each, the first two holds a tenth.
    pub fn anneal_cycle(total_steps: usize, high: f64, low: f64) -> Result<Self> {
        Self::build(
            total_steps,
            high,
            &[
                Segment::Ramp { to: low, fraction: 0.2 },
                Segment::Hold { fraction: 0.1 },
                Segment::Ramp { to: high, fraction: 0.2 },
                Segment::Hold { fraction: 0.1 },
                Segment::Ramp { to: low, fraction: 0.2 },
            ],
        )
    }

    /// Target temperature at global step `step`.
    pub fn at(&self, step: usize) -> Result<f64> {
        self.values.get(step).copied().ok_or(XyError::IndexOutOfRange {
            index: step,
            len: self.values.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

fn linspace(from: f64, to: f64, len: usize) -> impl Iterator<Item = f64> {
    let denom = len.saturating_sub(1).max(1) as f64;
    (0..len).map(move |k| from + (to - from) * k as f64 / denom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::*;

    #[test]
    fn constant_schedule() {
        let s = TemperatureSchedule::constant(7, 0.3).unwrap();
        assert_eq!(s.len(), 7);
        assert!(s.values().iter().all(|&t| t == 0.3));
        assert_eq!(s.at(6).unwrap(), 0.3);
    }

    #[test]
    fn index_past_end_is_an_error() {
        let s = TemperatureSchedule::constant(10, 1.0).unwrap();
        match s.at(10) {
            Err(XyError::IndexOutOfRange { index, len }) => {
                assert_eq!(index, 10);
                assert_eq!(len, 10);
            }
            other => panic!("expected IndexOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn ramp_includes_both_endpoints() {
        let s = TemperatureSchedule::build(5, 1.0, &[Segment::Ramp { to: 0.0, fraction: 1.0 }]).unwrap();
        assert_eq!(s.values(), &[1.0, 0.75, 0.5, 0.25, 0.0]);
    }

    #[test]
    fn short_segments_are_padded_with_last_value() {
        let s = TemperatureSchedule::build(
            10,
            2.0,
            &[
                Segment::Hold { fraction: 0.2 },
                Segment::Ramp { to: 1.0, fraction: 0.3 },
            ],
        )
        .unwrap();
        assert_eq!(s.len(), 10);
        assert_eq!(&s.values()[..2], &[2.0, 2.0]);
        assert_relative_eq!(s.values()[2], 2.0);
        assert_relative_eq!(s.values()[3], 1.5);
        assert_relative_eq!(s.values()[4], 1.0);
        assert!(s.values()[5..].iter().all(|&t| t == 1.0));
    }

    #[test]
    fn anneal_cycle_shape() {
        let s = TemperatureSchedule::anneal_cycle(100, 1.0, 0.1).unwrap();
        assert_eq!(s.len(), 100);
        assert_eq!(s.at(0).unwrap(), 1.0);
        assert_relative_eq!(s.at(19).unwrap(), 0.1, epsilon = 1e-12);
        // first hold
        assert!(s.values()[20..30].iter().all(|&t| (t - 0.1).abs() < 1e-12));
        // reheated
        assert_relative_eq!(s.at(49).unwrap(), 1.0, epsilon = 1e-12);
        assert!(s.values()[50..60].iter().all(|&t| (t - 1.0).abs() < 1e-12));
        // cooled again and held to the end
        assert!(s.values()[79..].iter().all(|&t| (t - 0.1).abs() < 1e-12));
        // ramps are monotone
        assert!(s.values()[..20].windows(2).all(|w| w[1] <= w[0]));
        assert!(s.values()[30..50].windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn odd_lengths_still_cover_every_step() {
        for total in [1, 3, 7, 13, 101] {
            let s = TemperatureSchedule::anneal_cycle(total, 2.0, 0.5).unwrap();
            assert_eq!(s.len(), total);
            assert!(s.values().iter().all(|t| t.is_finite()));
        }
    }

    #[test]
    fn rejects_invalid_schedules() {
        assert!(TemperatureSchedule::constant(0, 1.0).is_err());
        assert!(TemperatureSchedule::build(10, 1.0, &[Segment::Hold { fraction: 1.5 }]).is_err());
        assert!(TemperatureSchedule::build(10, 1.0, &[Segment::Hold { fraction: -0.1 }]).is_err());
        assert!(TemperatureSchedule::build(
            10,
            1.0,
            &[Segment::Ramp {
                to: f64::NAN,
                fraction: 0.5
            }]
        )
        .is_err());
    }
}
