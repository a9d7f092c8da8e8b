//! # Umbra Color - perceptual color math for dark-mode rewriting
//!
//! `umbra-color` is the leaf crate of the Umbra workspace. It turns the color
//! strings a browser reports into a perceptually uniform working
//! representation, measures luminance and contrast, nudges colors toward a
//! contrast target, and formats results back into CSS hex strings.
//!
//! ## Core Concepts
//!
//! - [`Color`]: OKLCH lightness/chroma/hue with optional alpha, the working type
//! - [`Rgba`]: gamma-encoded sRGB, what parsing produces first
//! - [`parse`] / [`format`]: text in, text out
//! - [`relative_luminance`] / [`contrast_ratio`]: WCAG measurements
//! - [`adjust`]: bounded iterative contrast enforcement
//!
//! ## Quick Start
//!
//! ```rust
//! use umbra_color::{adjust, contrast_ratio, parse, relative_luminance};
//!
//! let text = parse("#777").unwrap();
//! let background = parse("#121212").unwrap();
//! let bg_lum = relative_luminance(&background);
//!
//! let legible = adjust(text, bg_lum, 4.5);
//! assert!(contrast_ratio(relative_luminance(&legible), bg_lum) >= 4.5);
//! ```
//!
//! ## Failure Model
//!
//! Parsing fails with a [`ColorError`] for anything that is not a plain color
//! (gradients, `var()` references, keywords). Callers treat that as "no
//! information for this color" and move on. Contrast enforcement never fails:
//! it returns the best color it reached within its iteration budget.

pub mod color;
pub mod contrast;
pub mod convert;
mod error;

pub use color::{format, parse, to_uniform, Color, Rgba, ToUniform};
pub use contrast::{
    adjust, adjust_with, contrast_ratio, relative_luminance, AdjustPolicy, TEXT_CONTRAST_TARGET,
};
pub use error::{ColorError, Result};
