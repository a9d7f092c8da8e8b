//! Color values: parsing, uniform-space conversion and formatting.
//!
//! Supports every color syntax a browser hands back from computed styles and
//! the common forms authors write into custom properties:
//!
//! - Hex: `#fff`, `#ffff`, `#ff6b35`, `#ff6b3580`
//! - Functional: `rgb()`, `rgba()`, `hsl()`, `hsla()`, `hwb()`
//! - Named colors: `white`, `rebeccapurple`, `transparent`, ...
//!
//! Gradients, `var()` references and `url()` values are rejected up front
//! with [`ColorError::Unsupported`]; keywords such as `none` or
//! `currentcolor` fail as [`ColorError::Invalid`].
//!
//! # Example
//!
//! ```rust
//! use umbra_color::{parse, Color};
//!
//! let white = parse("rgb(255, 255, 255)").unwrap();
//! assert!((white.l - 1.0).abs() < 1e-3);
//!
//! let dark = white.with_lightness(1.0 - white.l);
//! assert_eq!(dark.to_hex(), "#000000");
//! ```

use std::fmt;

use serde::Serialize;

use crate::convert::{
    lch_to_oklab, linear_to_oklab, linear_to_srgb, oklab_to_lch, oklab_to_linear, srgb_to_linear,
    LinearRgb,
};
use crate::error::{ColorError, Result};

// ─── sRGB ───────────────────────────────────────────────────────────────────

/// A gamma-encoded sRGB color with alpha, every component in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub alpha: f64,
}

impl Rgba {
    /// Creates a color from 8-bit channels and a unit alpha.
    pub fn from_u8(r: u8, g: u8, b: u8, alpha: f64) -> Self {
        Self {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// Parses a textual CSS color into sRGB.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ColorError::Empty);
        }

        let lower = trimmed.to_ascii_lowercase();
        if lower.contains("gradient(") || lower.starts_with("var(") || lower.starts_with("url(") {
            return Err(ColorError::Unsupported(trimmed.to_string()));
        }

        let parsed = csscolorparser::parse(trimmed).map_err(|e| ColorError::Invalid {
            input: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            r: f64::from(parsed.r).clamp(0.0, 1.0),
            g: f64::from(parsed.g).clamp(0.0, 1.0),
            b: f64::from(parsed.b).clamp(0.0, 1.0),
            alpha: f64::from(parsed.a).clamp(0.0, 1.0),
        })
    }

    /// Linear-light reconstruction of the RGB channels.
    pub fn to_linear(&self) -> LinearRgb {
        LinearRgb {
            r: srgb_to_linear(self.r),
            g: srgb_to_linear(self.g),
            b: srgb_to_linear(self.b),
        }
    }

    /// Channels quantized to 8 bits.
    pub fn to_u8(&self) -> (u8, u8, u8) {
        (quantize(self.r), quantize(self.g), quantize(self.b))
    }

    /// Formats as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_u8();
        let a = quantize(self.alpha);
        if a == 255 {
            format!("#{:02x}{:02x}{:02x}", r, g, b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", r, g, b, a)
        }
    }
}

fn quantize(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

// ─── Working color (OKLCH) ──────────────────────────────────────────────────

/// The working color representation: OKLCH with optional alpha.
///
/// - `l`: perceptual lightness, `0.0` (black) to `1.0` (white)
/// - `c`: chroma, `0.0` for grays; sRGB colors stay below ~0.37
/// - `h`: hue angle in degrees `0.0..360.0`, `None` for achromatic colors
/// - `alpha`: opacity, `None` meaning fully opaque
///
/// Lightness and chroma may drift out of range while transforms are being
/// composed; they are clamped whenever the color is converted back to sRGB
/// or formatted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub l: f64,
    pub c: f64,
    pub h: Option<f64>,
    pub alpha: Option<f64>,
}

impl Color {
    /// Creates a color from OKLCH components.
    pub fn new(l: f64, c: f64, h: Option<f64>) -> Self {
        Self {
            l,
            c,
            h,
            alpha: None,
        }
    }

    /// An achromatic color at the given lightness.
    pub fn gray(l: f64) -> Self {
        Self::new(l, 0.0, None)
    }

    /// Effective opacity (`1.0` when no alpha was given).
    pub fn alpha(&self) -> f64 {
        self.alpha.unwrap_or(1.0)
    }

    /// Hue in degrees, or `0.0` for achromatic colors.
    pub fn hue_or_zero(&self) -> f64 {
        self.h.unwrap_or(0.0)
    }

    /// Returns a copy with the lightness replaced.
    pub fn with_lightness(mut self, l: f64) -> Self {
        self.l = l;
        self
    }

    /// Returns a copy with the chroma replaced.
    pub fn with_chroma(mut self, c: f64) -> Self {
        self.c = c;
        self
    }

    /// Returns a copy with the chroma multiplied by `factor`.
    pub fn scale_chroma(mut self, factor: f64) -> Self {
        self.c *= factor;
        self
    }

    /// Returns a copy with the alpha replaced.
    pub fn with_alpha(mut self, alpha: Option<f64>) -> Self {
        self.alpha = alpha;
        self
    }

    /// Returns a copy with lightness clamped to `0.0..=1.0` and chroma to `>= 0.0`.
    pub fn clamped(self) -> Self {
        Self {
            l: self.l.clamp(0.0, 1.0),
            c: self.c.max(0.0),
            h: self.h,
            alpha: self.alpha.map(|a| a.clamp(0.0, 1.0)),
        }
    }

    /// Converts back to gamma-encoded sRGB, clamping into gamut.
    pub fn to_rgba(&self) -> Rgba {
        let linear = self.to_linear();
        Rgba {
            r: linear_to_srgb(linear.r),
            g: linear_to_srgb(linear.g),
            b: linear_to_srgb(linear.b),
            alpha: self.alpha().clamp(0.0, 1.0),
        }
    }

    /// Linear-light RGB reconstruction, each channel clamped to `0.0..=1.0`.
    pub fn to_linear(&self) -> LinearRgb {
        let clamped = self.clamped();
        let linear = oklab_to_linear(lch_to_oklab(clamped.l, clamped.c, clamped.h));
        LinearRgb {
            r: linear.r.clamp(0.0, 1.0),
            g: linear.g.clamp(0.0, 1.0),
            b: linear.b.clamp(0.0, 1.0),
        }
    }

    /// True if the color converts to sRGB without clipping a channel.
    pub fn in_gamut(&self) -> bool {
        let clamped = self.clamped();
        let linear = oklab_to_linear(lch_to_oklab(clamped.l, clamped.c, clamped.h));
        [linear.r, linear.g, linear.b]
            .iter()
            .all(|c| (-GAMUT_EPSILON..=1.0 + GAMUT_EPSILON).contains(c))
    }

    /// Maps the color into sRGB by lowering chroma at fixed lightness and hue.
    ///
    /// Clipping channels instead would shift lightness, which matters when a
    /// lightness bound has to hold for the written value.
    pub fn to_gamut(self) -> Self {
        let color = self.clamped();
        if color.in_gamut() {
            return color;
        }
        let (mut lo, mut hi) = (0.0, color.c);
        for _ in 0..GAMUT_SEARCH_STEPS {
            let mid = (lo + hi) / 2.0;
            if color.with_chroma(mid).in_gamut() {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        color.with_chroma(lo)
    }

    /// The color as it reads back once formatted: channels rounded to 8 bits.
    pub fn quantized(&self) -> Self {
        let (r, g, b) = self.to_rgba().to_u8();
        Color::from(Rgba::from_u8(r, g, b, self.alpha()))
    }

    /// Formats as a hex string. See [`format`].
    pub fn to_hex(&self) -> String {
        self.to_rgba().to_hex()
    }
}

/// Slack on linear channels when testing gamut membership.
const GAMUT_EPSILON: f64 = 1e-6;

/// Bisection steps for [`Color::to_gamut`]; leaves chroma within ~1e-7.
const GAMUT_SEARCH_STEPS: usize = 24;

impl From<Rgba> for Color {
    fn from(rgba: Rgba) -> Self {
        let (l, c, h) = oklab_to_lch(linear_to_oklab(rgba.to_linear()));
        let alpha = if rgba.alpha < 1.0 {
            Some(rgba.alpha)
        } else {
            None
        };
        Self { l, c, h, alpha }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

// ─── Uniform space ──────────────────────────────────────────────────────────

/// Conversion into the perceptually uniform working space.
///
/// Implemented for [`Rgba`] (a real conversion) and for [`Color`], where it
/// is the identity, so applying it twice is the same as applying it once.
pub trait ToUniform {
    fn to_uniform(&self) -> Color;
}

impl ToUniform for Rgba {
    fn to_uniform(&self) -> Color {
        Color::from(*self)
    }
}

impl ToUniform for Color {
    fn to_uniform(&self) -> Color {
        *self
    }
}

/// Parses a textual CSS color straight into the working space.
pub fn parse(text: &str) -> Result<Color> {
    Rgba::parse(text).map(|rgba| rgba.to_uniform())
}

/// Converts any supported representation into the working space.
pub fn to_uniform<T: ToUniform>(color: &T) -> Color {
    color.to_uniform()
}

/// Formats a color as `#rrggbb` (or `#rrggbbaa` when translucent).
///
/// Lightness and chroma are clamped before conversion, and the result is
/// clamped into the sRGB gamut, so every color formats to a valid string.
pub fn format(color: &Color) -> String {
    color.to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    // =====================================================================
    // Parsing
    // =====================================================================

    #[test]
    fn parse_hex_forms() {
        assert_eq!(Rgba::parse("#fff").unwrap().to_u8(), (255, 255, 255));
        assert_eq!(Rgba::parse("#ff6b35").unwrap().to_u8(), (255, 107, 53));
        let translucent = Rgba::parse("#00000080").unwrap();
        assert!((translucent.alpha - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn parse_functional_forms() {
        assert_eq!(
            Rgba::parse("rgb(255, 255, 255)").unwrap().to_u8(),
            (255, 255, 255)
        );
        let rgba = Rgba::parse("rgba(0, 0, 0, 0.25)").unwrap();
        assert_eq!(rgba.to_u8(), (0, 0, 0));
        assert!((rgba.alpha - 0.25).abs() < 1e-6);
        assert_eq!(
            Rgba::parse("hsl(0, 100%, 50%)").unwrap().to_u8(),
            (255, 0, 0)
        );
    }

    #[test]
    fn parse_named_and_transparent() {
        assert_eq!(Rgba::parse("white").unwrap().to_u8(), (255, 255, 255));
        assert_eq!(Rgba::parse("transparent").unwrap().alpha, 0.0);
    }

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(Rgba::parse("  #000000 \n").unwrap().to_u8(), (0, 0, 0));
    }

    #[test]
    fn parse_rejects_empty() {
        assert_eq!(Rgba::parse("   "), Err(ColorError::Empty));
    }

    #[test]
    fn parse_rejects_gradients_and_references() {
        assert!(matches!(
            Rgba::parse("linear-gradient(red, blue)"),
            Err(ColorError::Unsupported(_))
        ));
        assert!(matches!(
            Rgba::parse("var(--accent)"),
            Err(ColorError::Unsupported(_))
        ));
        assert!(matches!(
            Rgba::parse("url(bg.png)"),
            Err(ColorError::Unsupported(_))
        ));
    }

    #[test]
    fn parse_rejects_keywords() {
        assert!(matches!(
            Rgba::parse("none"),
            Err(ColorError::Invalid { .. })
        ));
        assert!(matches!(
            Rgba::parse("not-a-color"),
            Err(ColorError::Invalid { .. })
        ));
    }

    // =====================================================================
    // Working space
    // =====================================================================

    #[test]
    fn white_and_black_lightness() {
        let white = parse("#ffffff").unwrap();
        let black = parse("#000000").unwrap();
        assert!((white.l - 1.0).abs() < 1e-3);
        assert!(black.l.abs() < 1e-6);
        assert_eq!(white.h, None);
        assert_eq!(black.alpha, None);
    }

    #[test]
    fn translucent_colors_keep_alpha() {
        let c = parse("rgba(255, 0, 0, 0.5)").unwrap();
        assert!((c.alpha() - 0.5).abs() < 1e-6);
        assert!(c.h.is_some());
    }

    #[test]
    fn to_uniform_is_idempotent() {
        let rgba = Rgba::parse("#3366cc").unwrap();
        let once = rgba.to_uniform();
        let twice = to_uniform(&once);
        assert_eq!(once, twice);
    }

    // =====================================================================
    // Formatting
    // =====================================================================

    #[test]
    fn format_roundtrips_opaque_colors() {
        for hex in ["#000000", "#ffffff", "#ff6b35", "#3366cc", "#808080"] {
            let color = parse(hex).unwrap();
            assert_eq!(format(&color), hex, "roundtrip failed for {}", hex);
        }
    }

    #[test]
    fn format_includes_alpha_when_translucent() {
        let color = parse("rgba(0, 0, 0, 0.5)").unwrap();
        assert_eq!(format(&color), "#00000080");
    }

    #[test]
    fn format_clamps_out_of_range_components() {
        let color = Color::new(1.4, -0.2, Some(120.0));
        assert_eq!(format(&color), "#ffffff");
        let color = Color::new(-0.3, 0.0, None);
        assert_eq!(format(&color), "#000000");
    }

    #[test]
    fn builders_replace_components() {
        let base = Color::new(0.6, 0.2, Some(40.0));
        assert_eq!(base.with_lightness(0.1).l, 0.1);
        assert_eq!(base.with_chroma(0.05).c, 0.05);
        assert!((base.scale_chroma(0.3).c - 0.06).abs() < 1e-12);
        assert_eq!(base.with_alpha(Some(0.4)).alpha(), 0.4);
    }

    // =====================================================================
    // Gamut
    // =====================================================================

    #[test]
    fn to_gamut_keeps_lightness_and_hue() {
        let blue = parse("#0000ff").unwrap();
        let light_blue = blue.with_lightness(0.75).scale_chroma(0.5);
        assert!(!light_blue.in_gamut());

        let mapped = light_blue.to_gamut();
        assert!(mapped.in_gamut());
        assert_eq!(mapped.l, 0.75);
        assert_eq!(mapped.h, light_blue.h);
        assert!(mapped.c < light_blue.c);
        assert!(mapped.c > 0.0);
    }

    #[test]
    fn to_gamut_leaves_gamut_colors_alone() {
        let color = parse("#3366cc").unwrap();
        assert!(color.in_gamut());
        assert_eq!(color.to_gamut(), color);
        assert!(Color::gray(1.0).in_gamut());
        assert!(Color::gray(0.0).in_gamut());
    }

    #[test]
    fn quantized_matches_the_formatted_value() {
        for color in [
            Color::new(0.75, 0.08, Some(264.0)),
            Color::gray(0.75),
            Color::new(0.3, 0.05, Some(40.0)).with_alpha(Some(0.5)),
        ] {
            let quantized = color.quantized();
            assert_eq!(format(&quantized), format(&color));
            let reparsed = parse(&format(&color)).unwrap();
            assert!((reparsed.l - quantized.l).abs() < 1e-6);
        }
    }

    #[test]
    fn display_matches_hex() {
        let color = parse("#ff6b35").unwrap();
        assert_eq!(color.to_string(), "#ff6b35");
    }
}
