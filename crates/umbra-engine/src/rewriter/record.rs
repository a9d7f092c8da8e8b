//! Read phase: one record per element, captured before anything is written.
//!
//! Inherited colors (`color`, `fill`, `stroke`) are read through the
//! engine's own overrides. An element inserted under a rewritten ancestor
//! computes the ancestor's written value; the record holds the page's value
//! instead, so every element is decided from what the page asked for.

use std::hash::Hash;

use umbra_color::{format, parse};

use super::snapshot::SnapshotMap;
use crate::error::HostResult;
use crate::host::{is_button, props, Document, Size};

/// Everything the write phase needs to know about one element.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ElementRecord<E> {
    pub element: E,
    pub background: Option<String>,
    pub text: Option<String>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub button: bool,
    pub has_direct_text: bool,
    pub size: Size,
}

impl<E: Copy + Eq + Hash> ElementRecord<E> {
    /// Reads computed colors and layout facts for `element`. Performs no writes.
    pub fn read<D>(doc: &D, element: E, snapshots: &SnapshotMap<E>) -> HostResult<Self>
    where
        D: Document<Element = E>,
    {
        let svg = doc.is_svg(element)?;
        let (fill, stroke) = if svg {
            (
                inherited(doc, element, props::FILL, snapshots)?,
                inherited(doc, element, props::STROKE, snapshots)?,
            )
        } else {
            (None, None)
        };

        Ok(Self {
            element,
            background: doc.computed_value(element, props::BACKGROUND_COLOR)?,
            text: inherited(doc, element, props::COLOR, snapshots)?,
            fill,
            stroke,
            button: is_button(doc, element)?,
            has_direct_text: !doc.direct_text(element)?.trim().is_empty(),
            size: doc.rendered_size(element)?,
        })
    }
}

/// Computed value of an inherited property, with the engine's override
/// swapped for the page's value.
///
/// The nearest element (self or ancestor) where the engine wrote `property`
/// decides: if the computed value is what was written there, the original
/// is returned. Anything else came from the page and is returned as is.
fn inherited<D, E>(
    doc: &D,
    element: E,
    property: &str,
    snapshots: &SnapshotMap<E>,
) -> HostResult<Option<String>>
where
    D: Document<Element = E>,
    E: Copy + Eq + Hash,
{
    let Some(value) = doc.computed_value(element, property)? else {
        return Ok(None);
    };
    if snapshots.is_empty() {
        return Ok(Some(value));
    }

    let mut node = Some(element);
    while let Some(current) = node {
        if let Some(replaced) = snapshots.replaced(current, property) {
            if is_written(&value, &replaced.written) {
                return Ok(Some(replaced.original.clone()));
            }
            break;
        }
        node = doc.parent(current)?;
    }
    Ok(Some(value))
}

/// True if `value` is the color the engine wrote. Hosts may report it in
/// another notation, so both sides are compared formatted.
fn is_written(value: &str, written: &str) -> bool {
    parse(value).map(|color| format(&color) == written).unwrap_or(false)
}
