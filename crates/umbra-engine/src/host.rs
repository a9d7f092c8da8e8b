//! The host document seam.
//!
//! The engine never touches a concrete DOM. Everything it needs from the page
//! (traversal, attributes, computed values, inline style writes, adopted
//! stylesheets and insertion watching) goes through [`Document`], so the same
//! engine can drive a browser binding, a headless DOM, or the in-memory
//! document used by the tests and the CLI.
//!
//! Handles are plain `Copy` keys. Holding one never keeps a node alive, which
//! is what lets the snapshot map key on them without extending element
//! lifetimes: entries for nodes the page has removed are pruned by asking
//! [`Document::is_connected`].

use std::fmt::Debug;
use std::hash::Hash;

use crate::error::HostResult;

/// CSS property names the engine reads and writes.
pub mod props {
    pub const BACKGROUND_COLOR: &str = "background-color";
    pub const COLOR: &str = "color";
    pub const FILL: &str = "fill";
    pub const STROKE: &str = "stroke";
}

/// Rendered box size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if either dimension is below `min`.
    pub fn is_smaller_than(&self, min: f64) -> bool {
        self.width < min || self.height < min
    }
}

/// One batch entry from an insertion watcher: element nodes added under `target`.
///
/// Hosts only report element nodes; text insertions are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion<E> {
    pub target: E,
    pub added: Vec<E>,
}

/// The DOM capabilities the engine depends on.
pub trait Document {
    /// Element handle. Must not own the node.
    type Element: Copy + Eq + Hash + Debug;
    /// Adopted stylesheet handle.
    type Sheet: Copy + Eq + Debug;
    /// Subtree insertion watcher handle.
    type Watcher: Copy + Eq + Debug;

    // ─── Tree ───────────────────────────────────────────────────────────────

    /// The document root (`html`).
    fn root(&self) -> Self::Element;

    /// The `body` element, if the document has one.
    fn body(&self) -> Option<Self::Element>;

    /// False once the page has removed the element from the document.
    fn is_connected(&self, element: Self::Element) -> bool;

    /// Parent element. `None` for the root and for detached elements.
    fn parent(&self, element: Self::Element) -> HostResult<Option<Self::Element>>;

    /// Lowercase tag name.
    fn tag_name(&self, element: Self::Element) -> HostResult<String>;

    /// Element descendants in document order, excluding `element` itself.
    fn descendants(&self, element: Self::Element) -> HostResult<Vec<Self::Element>>;

    // ─── Attributes ─────────────────────────────────────────────────────────

    fn attribute(&self, element: Self::Element, name: &str) -> HostResult<Option<String>>;

    fn set_attribute(&mut self, element: Self::Element, name: &str, value: &str)
        -> HostResult<()>;

    fn remove_attribute(&mut self, element: Self::Element, name: &str) -> HostResult<()>;

    fn add_class(&mut self, element: Self::Element, class: &str) -> HostResult<()>;

    fn remove_class(&mut self, element: Self::Element, class: &str) -> HostResult<()>;

    fn has_class(&self, element: Self::Element, class: &str) -> HostResult<bool>;

    // ─── Rendering (reads) ──────────────────────────────────────────────────

    /// Resolved value of a property (including custom properties) as the
    /// browser reports it. `None` if the property has no value.
    fn computed_value(&self, element: Self::Element, property: &str)
        -> HostResult<Option<String>>;

    /// Concatenated direct child text nodes, untrimmed.
    fn direct_text(&self, element: Self::Element) -> HostResult<String>;

    fn rendered_size(&self, element: Self::Element) -> HostResult<Size>;

    /// True for elements in the SVG namespace.
    fn is_svg(&self, element: Self::Element) -> HostResult<bool>;

    // ─── Inline style (writes) ──────────────────────────────────────────────

    /// Sets one property in the element's inline style, adding `!important`
    /// when `important` is set.
    fn set_style_property(
        &mut self,
        element: Self::Element,
        property: &str,
        value: &str,
        important: bool,
    ) -> HostResult<()>;

    // ─── Adopted stylesheets ────────────────────────────────────────────────

    fn supports_adopted_stylesheets(&self) -> bool;

    fn create_stylesheet(&mut self) -> HostResult<Self::Sheet>;

    /// Replaces the whole text of a stylesheet.
    fn replace_stylesheet(&mut self, sheet: Self::Sheet, css: &str) -> HostResult<()>;

    /// Appends the sheet to the document's adopted list.
    fn adopt_stylesheet(&mut self, sheet: Self::Sheet) -> HostResult<()>;

    /// Removes the sheet from the document's adopted list.
    fn drop_stylesheet(&mut self, sheet: Self::Sheet) -> HostResult<()>;

    fn is_adopted(&self, sheet: Self::Sheet) -> bool;

    // ─── Insertion watching ─────────────────────────────────────────────────

    /// Starts watching `target`'s subtree for inserted element nodes.
    fn observe_insertions(&mut self, target: Self::Element) -> HostResult<Self::Watcher>;

    fn disconnect(&mut self, watcher: Self::Watcher) -> HostResult<()>;

    /// Drains the records queued for a watcher since the last call.
    fn take_records(&mut self, watcher: Self::Watcher)
        -> HostResult<Vec<Insertion<Self::Element>>>;
}

/// True for `<button>`, button-like `<input>`s and `role="button"`.
pub fn is_button<D: Document>(doc: &D, element: D::Element) -> HostResult<bool> {
    let tag = doc.tag_name(element)?;
    if tag == "button" {
        return Ok(true);
    }
    if tag == "input" {
        if let Some(kind) = doc.attribute(element, "type")? {
            if matches!(
                kind.trim().to_ascii_lowercase().as_str(),
                "button" | "submit" | "reset"
            ) {
                return Ok(true);
            }
        }
    }
    Ok(doc
        .attribute(element, "role")?
        .is_some_and(|role| role.trim().eq_ignore_ascii_case("button")))
}
