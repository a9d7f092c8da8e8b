//! Variable overrides.
//!
//! Many sites theme themselves through a handful of custom properties on the
//! root element. Overriding those is far cheaper than touching elements one
//! by one, so this runs first: every catalog name that resolves to a plain
//! color on the root gets an inverted, desaturated replacement.

use std::collections::HashSet;
use std::fmt;

use log::trace;
use serde::Serialize;
use umbra_color::{format, parse};

use crate::transform::invert;

/// One `name: value !important;` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariableOverride {
    pub name: String,
    pub value: String,
}

impl fmt::Display for VariableOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} !important;", self.name, self.value)
    }
}

/// Generates overrides for every catalog name that resolves to a color.
///
/// `lookup` returns the resolved value of a custom property on the document
/// root. Names that are missing, empty or do not parse as a color (gradients,
/// keywords, lengths) produce nothing. Output follows catalog order and each
/// name appears at most once.
pub fn generate<F, S>(lookup: F, names: &[S], chroma_factor: f64) -> Vec<VariableOverride>
where
    F: Fn(&str) -> Option<String>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut overrides = Vec::new();

    for name in names {
        let name = name.as_ref();
        if !seen.insert(name) {
            continue;
        }
        let Some(raw) = lookup(name) else {
            continue;
        };
        let color = match parse(&raw) {
            Ok(color) => color,
            Err(e) => {
                trace!("skipping variable {}: {}", name, e);
                continue;
            }
        };
        let value = format(&invert(color, chroma_factor));
        trace!("variable {}: {} -> {}", name, raw.trim(), value);
        overrides.push(VariableOverride {
            name: name.to_string(),
            value,
        });
    }

    overrides
}
