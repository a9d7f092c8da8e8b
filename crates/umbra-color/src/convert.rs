//! Conversions between sRGB, linear RGB, OKLab and OKLCH.
//!
//! OKLab is a perceptually uniform colorspace: equal numerical distances
//! correspond to roughly equal perceived differences. Its cylindrical form,
//! OKLCH, splits a color into lightness, chroma and hue, which is the shape
//! every dark-mode transform in this workspace operates on:
//!
//! - **Lightness** inversion turns light surfaces dark and dark text light
//! - **Chroma** scaling desaturates without shifting the perceived hue
//! - **Hue** is carried through untouched
//!
//! All functions here are pure and work in `f64`.

// ─── Linear light ───────────────────────────────────────────────────────────

/// Linear-light RGB, each channel nominally in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Convert a gamma-encoded sRGB channel (0.0–1.0) to linear light.
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear light channel back to gamma-encoded sRGB, clamped to `0.0..=1.0`.
pub fn linear_to_srgb(c: f64) -> f64 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.0031308 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

// ─── OKLab ──────────────────────────────────────────────────────────────────

/// OKLab color (Cartesian form).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OkLab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// Below this chroma a color is treated as achromatic and has no hue.
pub const ACHROMATIC_CHROMA: f64 = 1e-4;

/// Linear RGB to OKLab.
pub fn linear_to_oklab(c: LinearRgb) -> OkLab {
    let l = 0.4122214708 * c.r + 0.5363325363 * c.g + 0.0514459929 * c.b;
    let m = 0.2119034982 * c.r + 0.6806995451 * c.g + 0.1073969566 * c.b;
    let s = 0.0883024619 * c.r + 0.2817188376 * c.g + 0.6299787005 * c.b;

    let l = l.cbrt();
    let m = m.cbrt();
    let s = s.cbrt();

    OkLab {
        l: 0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s,
        a: 1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s,
        b: 0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s,
    }
}

/// OKLab to linear RGB. The result may fall outside `0.0..=1.0` for
/// out-of-gamut inputs; callers clamp.
pub fn oklab_to_linear(c: OkLab) -> LinearRgb {
    let l = c.l + 0.3963377774 * c.a + 0.2158037573 * c.b;
    let m = c.l - 0.1055613458 * c.a - 0.0638541728 * c.b;
    let s = c.l - 0.0894841775 * c.a - 1.2914855480 * c.b;

    let l = l * l * l;
    let m = m * m * m;
    let s = s * s * s;

    LinearRgb {
        r: 4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
        g: -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
        b: -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
    }
}

// ─── OKLCH ──────────────────────────────────────────────────────────────────

/// OKLab to `(lightness, chroma, hue)`. Hue is `None` for achromatic colors.
pub fn oklab_to_lch(c: OkLab) -> (f64, f64, Option<f64>) {
    let chroma = (c.a * c.a + c.b * c.b).sqrt();
    let hue = if chroma < ACHROMATIC_CHROMA {
        None
    } else {
        Some(c.b.atan2(c.a).to_degrees().rem_euclid(360.0))
    };
    (c.l, chroma, hue)
}

/// `(lightness, chroma, hue)` to OKLab. A missing hue is read as 0°.
pub fn lch_to_oklab(l: f64, c: f64, h: Option<f64>) -> OkLab {
    let h = h.unwrap_or(0.0).to_radians();
    OkLab {
        l,
        a: c * h.cos(),
        b: c * h.sin(),
    }
}
