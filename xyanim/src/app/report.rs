use crate::app::runner::RunSummary;
use tracing::info;
use xy::{analysis, Frame};

/// Frames between two progress lines
pub const REPORT_INTERVAL: usize = 10;

pub fn should_report(index: usize, total_frames: usize) -> bool {
    index % REPORT_INTERVAL == 0 || index + 1 == total_frames
}

pub fn report_frame(frame: &Frame<'_>, alpha: f64) {
    let order = analysis::order_parameter(frame.theta);
    let energy = analysis::energy_per_site(frame.theta, alpha, frame.beta, frame.field);
    let (plus, minus) = analysis::count_vortices(frame.theta);

    info!(
        "Frame {:>4} (step {:>6}): T_target = {:.4}  T_kin = {:.4}  |M| = {:.4}  <|m|> = {:.4}  E/site = {:+.5}  vortices +{} -{}",
        frame.index,
        frame.global_step,
        frame.target_temperature,
        frame.kinetic_temperature,
        order,
        frame.magnetization.mean_magnitude(),
        energy,
        plus,
        minus
    );
}

pub fn report_summary(summary: &RunSummary) {
    info!("\nAnimation finished.");
    info!("  Seed: {}", summary.seed);
    info!("  Frames rendered: {}", summary.frames);
    info!("  Output: {}", summary.output);
    match summary.field {
        Some(c) => info!("  Field coefficients: a = {:+.4}, b = {:+.4}, c = {:+.4}, d = {:+.4}", c.a, c.b, c.c, c.d),
        None => info!("  Field coefficients: none"),
    }

    info!("\nFinal state:");
    info!("  Order parameter: {:.6}", summary.order_parameter);
    info!("  Energy per site: {:+.6}", summary.energy_per_site);
    info!("  Kinetic temperature: {:.6}", summary.kinetic_temperature);
    info!("  Vortices: +{} -{}", summary.vortices.0, summary.vortices.1);

    let t_bkt = analysis::bkt_temperature() * summary.alpha.abs();
    if summary.alpha > 0.0 {
        let phase = if summary.final_target_temperature < t_bkt {
            "below"
        } else {
            "above"
        };
        info!(
            "  Final target temperature {:.4} is {} the BKT estimate {:.4}",
            summary.final_target_temperature, phase, t_bkt
        );
    }
}
