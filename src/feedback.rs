//! The per-frame proportional controller that nudges `frame_variance` toward the triangle budget.

use crate::config::Config;

/// Computes the next `frame_variance` given the free vertex-slot count left after `render()`,
/// using the proportional form `frame_variance += (bias - free_slots) / wanted_tris`.
///
/// `bias` is `max_tris - wanted_tris` rather than a hardcoded constant: at the default `Config`
/// (`max_tris = 200_000`, `wanted_tris = 100_000`) that's `100_000` either way, but deriving it
/// from the config lets smaller landscapes converge too, instead of being swamped by a constant
/// sized for the default map. See DESIGN.md.
pub fn update_frame_variance(frame_variance: f32, free_slots: usize, config: &Config) -> f32 {
    let bias = config.max_tris as f32 - config.wanted_tris as f32;
    let next = frame_variance + (bias - free_slots as f32) / config.wanted_tris as f32;
    next.max(0.0)
}
