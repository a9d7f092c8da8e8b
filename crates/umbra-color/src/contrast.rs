//! Relative luminance, contrast ratio and iterative contrast enforcement.
//!
//! The measurement side follows the WCAG formulas: luminance is the
//! `0.2126 / 0.7152 / 0.0722` weighted sum of linear-light RGB, and the
//! contrast ratio of two luminances is `(lighter + 0.05) / (darker + 0.05)`.
//!
//! The adjustment side works on OKLCH lightness, where equal steps look like
//! equal changes. [`adjust`] walks the candidate's lightness away from the
//! background in fixed steps until the target ratio is met or the iteration
//! budget runs out. Running out of budget is an accepted outcome: the best
//! color reached is returned and nothing is reported.

use crate::color::Color;

/// WCAG "normal text" contrast threshold.
pub const TEXT_CONTRAST_TARGET: f64 = 4.5;

/// Relative luminance of a color, in `0.0..=1.0`.
///
/// Computed over the linear-light reconstruction of the color's OKLCH
/// components (not the raw input channels).
pub fn relative_luminance(color: &Color) -> f64 {
    let linear = color.to_linear();
    (0.2126 * linear.r + 0.7152 * linear.g + 0.0722 * linear.b).clamp(0.0, 1.0)
}

/// Contrast ratio of two luminances, in `1.0..=21.0`. Argument order does not matter.
pub fn contrast_ratio(l1: f64, l2: f64) -> f64 {
    let l1 = l1.clamp(0.0, 1.0);
    let l2 = l2.clamp(0.0, 1.0);
    (l1.max(l2) + 0.05) / (l1.min(l2) + 0.05)
}

/// Step schedule and budget for [`adjust_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustPolicy {
    /// Ratio to reach.
    pub target: f64,
    /// Lightness step for the first `coarse_iterations` iterations.
    pub step: f64,
    /// Lightness step for the remaining iterations.
    pub fine_step: f64,
    /// Number of iterations that use `step` before switching to `fine_step`.
    pub coarse_iterations: usize,
    /// Hard cap on iterations.
    pub max_iterations: usize,
    /// Backgrounds with luminance below this are treated as dark.
    pub dark_threshold: f64,
}

impl Default for AdjustPolicy {
    fn default() -> Self {
        Self {
            target: TEXT_CONTRAST_TARGET,
            step: 0.05,
            fine_step: 0.025,
            coarse_iterations: 5,
            max_iterations: 10,
            dark_threshold: 0.5,
        }
    }
}

impl AdjustPolicy {
    /// The default schedule with a different target ratio.
    pub fn with_target(target: f64) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }
}

/// Nudges `candidate` until it reaches `target` contrast against a background
/// of luminance `background_luminance`, using the default step schedule.
pub fn adjust(candidate: Color, background_luminance: f64, target: f64) -> Color {
    adjust_with(candidate, background_luminance, &AdjustPolicy::with_target(target))
}

/// Like [`adjust`] with an explicit policy.
///
/// Lightens the candidate on dark backgrounds and darkens it on light ones.
/// Returns as soon as the target is met; otherwise returns the candidate with
/// the highest ratio seen, which may be the input itself.
pub fn adjust_with(candidate: Color, background_luminance: f64, policy: &AdjustPolicy) -> Color {
    let ratio_of = |c: &Color| contrast_ratio(relative_luminance(c), background_luminance);

    let mut best = candidate;
    let mut best_ratio = ratio_of(&candidate);
    if best_ratio >= policy.target {
        return candidate;
    }

    let lighten = background_luminance < policy.dark_threshold;
    let mut current = candidate;

    for iteration in 0..policy.max_iterations {
        let step = if iteration < policy.coarse_iterations {
            policy.step
        } else {
            policy.fine_step
        };
        let next = if lighten {
            current.l + step
        } else {
            current.l - step
        };
        current = current.with_lightness(next.clamp(0.0, 1.0));

        let ratio = ratio_of(&current);
        if ratio >= policy.target {
            return current;
        }
        if ratio > best_ratio {
            best = current;
            best_ratio = ratio;
        }
    }

    best
}
