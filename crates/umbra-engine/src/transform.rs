//! Color transforms shared by both override strategies.
//!
//! All transforms operate in OKLCH and keep hue and alpha. Achromatic colors
//! stay achromatic: a missing hue is carried through as missing, which reads
//! as 0° wherever a hue is needed.

use umbra_color::Color;

/// Lightness inversion (`1 - L`, clamped) with chroma scaled by `chroma_factor`.
pub fn invert(color: Color, chroma_factor: f64) -> Color {
    color
        .with_lightness((1.0 - color.l).clamp(0.0, 1.0))
        .scale_chroma(chroma_factor)
}

/// Flat lightness with chroma scaled by `chroma_factor`. Used for buttons so
/// every button lands on the same surface regardless of its original hue.
pub fn flatten(color: Color, lightness: f64, chroma_factor: f64) -> Color {
    color
        .with_lightness(lightness.clamp(0.0, 1.0))
        .scale_chroma(chroma_factor)
}

/// Hard lightness bound chosen by the background.
///
/// On a dark background (lightness below `dark_background`) lightness is
/// raised to at least `floor`; otherwise it is lowered to at most `ceiling`.
pub fn bound_lightness(
    color: Color,
    background_lightness: f64,
    dark_background: f64,
    floor: f64,
    ceiling: f64,
) -> Color {
    let l = if background_lightness < dark_background {
        color.l.max(floor)
    } else {
        color.l.min(ceiling)
    };
    color.with_lightness(l)
}

/// [`bound_lightness`] for a value about to be written.
///
/// The bounded color is mapped into sRGB at fixed lightness and rounded to
/// the 8-bit value formatting will produce. If rounding lands just outside
/// the bound, lightness is pushed further in and the value re-rounded. The
/// returned color is the quantized one, so formatting it is exact.
pub fn bound_written(
    color: Color,
    background_lightness: f64,
    dark_background: f64,
    floor: f64,
    ceiling: f64,
) -> Color {
    let dark = background_lightness < dark_background;
    let mut target = bound_lightness(color, background_lightness, dark_background, floor, ceiling);
    let mut written = target.to_gamut().quantized();

    for _ in 0..SETTLE_ATTEMPTS {
        let miss = if dark {
            floor + SETTLE_MARGIN - written.l
        } else {
            written.l - (ceiling - SETTLE_MARGIN)
        };
        if miss <= 0.0 {
            break;
        }
        let step = miss.max(SETTLE_STEP);
        let l = if dark { target.l + step } else { target.l - step };
        target = target.with_lightness(l.clamp(0.0, 1.0));
        written = target.to_gamut().quantized();
    }
    written
}

/// Slack kept inside the bound so re-parsing the written text still honors it.
const SETTLE_MARGIN: f64 = 1e-6;
const SETTLE_STEP: f64 = 0.002;
const SETTLE_ATTEMPTS: usize = 16;

/// True if the color is opaque enough to be worth rewriting.
pub fn is_visible(color: &Color, min_alpha: f64) -> bool {
    color.alpha() > min_alpha
}
