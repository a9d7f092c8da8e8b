//! The adopted stylesheet's text.
//!
//! The sheet holds exactly one rule block, scoped to the activation marker on
//! both the root and the body, so nothing in it applies while inactive:
//!
//! ```css
//! html.umbra-dark, body.umbra-dark {
//!   color-scheme: dark;
//!   background-color: #121212 !important;
//!   color: #e0e0e0 !important;
//!   border-color: #333333 !important;
//!   --bg: #000000 !important;
//!   & a { color: #8ab4f8 !important; }
//! }
//! ```

use std::fmt::Write;

use crate::config::EngineConfig;
use crate::variables::VariableOverride;

/// Builds the rule block for the given variable overrides.
pub fn build_rule_block(config: &EngineConfig, overrides: &[VariableOverride]) -> String {
    let fallback = &config.fallback;
    let mut css = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(
        css,
        "{}, body.{} {{",
        config.root_selector, config.activation_class
    );
    let _ = writeln!(css, "  color-scheme: {};", fallback.color_scheme);
    let _ = writeln!(
        css,
        "  background-color: {} !important;",
        fallback.background
    );
    let _ = writeln!(css, "  color: {} !important;", fallback.text);
    let _ = writeln!(css, "  border-color: {} !important;", fallback.border);
    for declaration in overrides {
        let _ = writeln!(css, "  {}", declaration);
    }
    let _ = writeln!(css, "  & a {{ color: {} !important; }}", fallback.link);
    css.push_str("}\n");
    css
}
