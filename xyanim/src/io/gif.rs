//! Quiver-style GIF rendering of lattice frames
//!
//! Each site gets a cell tinted by the local magnetization (hue from its
//! angle, lightness from its magnitude) and an arrow along the raw spin.
//! No text is drawn, so no font backend is needed.

use color_eyre::eyre::{eyre, Result};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::f64::consts::TAU;
use std::path::Path;
use tracing::info;
use xy::Frame;

const ARROW_HEAD: f64 = 0.35;
const HEAD_SPREAD: f64 = 0.5;

pub struct GifRenderer {
    root: DrawingArea<BitMapBackend<'static>, Shift>,
    arrow_scale: f64,
    frames: usize,
}

impl GifRenderer {
    /// Open `path` for writing, creating its parent directory if needed.
    pub fn create<P: AsRef<Path>>(
        path: P,
        (width, height): (u32, u32),
        frame_delay_ms: u32,
        arrow_scale: f64,
    ) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        if !(arrow_scale > 0.0 && arrow_scale.is_finite()) {
            return Err(eyre!("arrow_scale must be positive, got {}", arrow_scale));
        }

        let backend = BitMapBackend::gif(path, (width, height), frame_delay_ms)
            .map_err(|e| eyre!("Failed to open {}: {}", path.display(), e))?;
        info!("Rendering frames to {}", path.display());

        Ok(Self {
            root: backend.into_drawing_area(),
            arrow_scale,
            frames: 0,
        })
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    /// Draw one frame and append it to the animation.
    pub fn render(&mut self, frame: &Frame<'_>) -> Result<()> {
        let grid = frame.grid;
        let n = grid.size;
        let (lo, hi) = grid.extent();
        let range = (lo - 0.5)..(hi + 0.5);

        self.root.fill(&WHITE).map_err(|e| eyre!("{}", e))?;
        let mut chart = ChartBuilder::on(&self.root)
            .margin(10)
            .build_cartesian_2d(range.clone(), range)
            .map_err(|e| eyre!("{}", e))?;

        let m = &frame.magnetization;
        let cells = (0..n).flat_map(|i| (0..n).map(move |j| (i, j))).map(|(i, j)| {
            let (x, y) = (grid.x[(i, j)], grid.y[(i, j)]);
            let color = cell_color(m.angle[(i, j)], m.magnitude[(i, j)]);
            Rectangle::new([(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)], color.filled())
        });
        chart.draw_series(cells).map_err(|e| eyre!("{}", e))?;

        let scale = self.arrow_scale;
        let arrows = (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .flat_map(|(i, j)| arrow_strokes(grid.x[(i, j)], grid.y[(i, j)], frame.theta[(i, j)], scale))
            .map(|points| PathElement::new(points, BLACK.stroke_width(2)));
        chart.draw_series(arrows).map_err(|e| eyre!("{}", e))?;

        self.root.present().map_err(|e| eyre!("{}", e))?;
        self.frames += 1;
        Ok(())
    }
}

/// Hue follows the smoothed angle; a weak local magnetization fades to white.
fn cell_color(angle: f64, magnitude: f64) -> HSLColor {
    let hue = angle.rem_euclid(TAU) / TAU;
    let lightness = 1.0 - 0.5 * magnitude.clamp(0.0, 1.0);
    HSLColor(hue, 0.8, lightness)
}

/// Shaft and two head strokes of an arrow of half-length `scale` centred on `(x, y)`.
fn arrow_strokes(x: f64, y: f64, theta: f64, scale: f64) -> [Vec<(f64, f64)>; 3] {
    let (dx, dy) = (scale * theta.cos(), scale * theta.sin());
    let tail = (x - dx, y - dy);
    let tip = (x + dx, y + dy);
    let head = |side: f64| {
        let phi = theta + std::f64::consts::PI - side * HEAD_SPREAD;
        let len = 2.0 * scale * ARROW_HEAD;
        (tip.0 + len * phi.cos(), tip.1 + len * phi.sin())
    };
    [vec![tail, tip], vec![tip, head(1.0)], vec![tip, head(-1.0)]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;
    use xy::{LatticeState, SimulationConfig, SimulationDriver};

    #[test]
    fn test_arrow_points_along_spin() {
        let [shaft, left, right] = arrow_strokes(1.0, -1.0, 0.0, 0.4);
        assert_relative_eq!(shaft[0].0, 0.6, epsilon = 1e-12);
        assert_relative_eq!(shaft[1].0, 1.4, epsilon = 1e-12);
        assert_eq!((shaft[0].1, shaft[1].1), (-1.0, -1.0));
        // head strokes trail behind the tip on either side
        assert!(left[1].0 < 1.4 && right[1].0 < 1.4);
        assert_relative_eq!(left[1].1 + 1.0, -(right[1].1 + 1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_cell_color_encodes_angle_and_magnitude() {
        let HSLColor(h, _, l) = cell_color(-std::f64::consts::FRAC_PI_2, 1.0);
        assert_relative_eq!(h, 0.75, epsilon = 1e-12);
        assert_relative_eq!(l, 0.5, epsilon = 1e-12);
        let HSLColor(_, _, l) = cell_color(0.0, 0.0);
        assert_relative_eq!(l, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_renders_every_frame() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("run.gif");
        let config = SimulationConfig {
            size: 5,
            kernel_size: 3,
            total_frames: 3,
            inner_steps_per_frame: 2,
            ..SimulationConfig::default()
        };
        let lattice = LatticeState::aligned(5, 0.3).unwrap();
        let mut driver = SimulationDriver::new(config, lattice).unwrap();
        let mut renderer = GifRenderer::create(&path, (120, 120), 20, 0.4).unwrap();

        let frames = driver.run(|frame| renderer.render(frame)).unwrap();
        assert_eq!(frames, 3);
        assert_eq!(renderer.frames_written(), 3);
        drop(renderer);
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_rejects_bad_arrow_scale() {
        let dir = tempdir().unwrap();
        assert!(GifRenderer::create(dir.path().join("a.gif"), (50, 50), 10, 0.0).is_err());
    }
}
