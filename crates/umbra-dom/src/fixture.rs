//! Page fixtures.
//!
//! A fixture describes a rendered page in YAML or JSON: custom properties on
//! the root, whether adopted stylesheets exist, and the body's element tree
//! with the values a browser would report for each element.
//!
//! ```yaml
//! variables:
//!   --bg: "#ffffff"
//! body:
//!   computed:
//!     background-color: rgb(255, 255, 255)
//!     color: rgb(0, 0, 0)
//!   children:
//!     - tag: p
//!       text: Hello
//!       size: { width: 300, height: 40 }
//!     - tag: button
//!       text: Save
//!       style: "padding: 4px"
//!       computed:
//!         background-color: "#1a73e8"
//! ```
//!
//! `computed` values act as the element's cascaded styles; inherited
//! properties flow down to children that do not set them.

use std::collections::BTreeMap;
use std::path::Path;

use indextree::NodeId;
use serde::{Deserialize, Serialize};
use umbra_engine::host::{Document, Size};

use crate::document::{MemoryDocument, DEFAULT_SIZE};
use crate::error::{DomError, FixtureError};

/// A whole page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageSpec {
    #[serde(default = "default_true")]
    pub adopted_stylesheets: bool,
    /// Custom properties resolved on the root element.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,
    /// The body element; its `tag` is ignored.
    #[serde(default)]
    pub body: ElementSpec,
}

fn default_true() -> bool {
    true
}

/// One element and its subtree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElementSpec {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    /// Shorthand for the `style` attribute.
    pub style: Option<String>,
    pub computed: BTreeMap<String, String>,
    /// Direct text, placed before the children.
    pub text: Option<String>,
    pub size: Option<SizeSpec>,
    pub children: Vec<ElementSpec>,
}

impl Default for ElementSpec {
    fn default() -> Self {
        Self {
            tag: "div".to_string(),
            attributes: BTreeMap::new(),
            style: None,
            computed: BTreeMap::new(),
            text: None,
            size: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeSpec {
    pub width: f64,
    pub height: f64,
}

impl From<SizeSpec> for Size {
    fn from(spec: SizeSpec) -> Self {
        Size::new(spec.width, spec.height)
    }
}

impl PageSpec {
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a fixture, picking the format from the extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, FixtureError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&content),
            Some("json") => Self::from_json(&content),
            _ => Err(FixtureError::UnknownFormat(path.to_path_buf())),
        }
    }

    /// Builds the document.
    pub fn build(&self) -> Result<MemoryDocument, FixtureError> {
        let mut doc = MemoryDocument::new();
        doc.set_supports_adopted_stylesheets(self.adopted_stylesheets);

        let root = doc.root();
        for (name, value) in &self.variables {
            doc.set_cascaded(root, name, value)?;
        }

        let body = doc
            .body()
            .ok_or_else(|| DomError::UnknownNode("body".to_string()))?;
        apply_element(&mut doc, body, &self.body)?;
        for child in &self.body.children {
            build_subtree(&mut doc, body, child)?;
        }
        Ok(doc)
    }
}

/// Builds `spec` detached and appends it to `parent` in one insertion, the
/// way a page script inserting a prepared fragment would.
pub fn insert(
    doc: &mut MemoryDocument,
    parent: NodeId,
    spec: &ElementSpec,
) -> Result<NodeId, DomError> {
    let element = doc.create_element(&spec.tag);
    apply_element(doc, element, spec)?;
    for child in &spec.children {
        build_subtree(doc, element, child)?;
    }
    doc.append(parent, element)?;
    Ok(element)
}

fn build_subtree(
    doc: &mut MemoryDocument,
    parent: NodeId,
    spec: &ElementSpec,
) -> Result<NodeId, DomError> {
    let element = doc.append_element(parent, &spec.tag)?;
    apply_element(doc, element, spec)?;
    for child in &spec.children {
        build_subtree(doc, element, child)?;
    }
    Ok(element)
}

fn apply_element(
    doc: &mut MemoryDocument,
    element: NodeId,
    spec: &ElementSpec,
) -> Result<(), DomError> {
    for (name, value) in &spec.attributes {
        doc.set_attribute(element, name, value)?;
    }
    if let Some(style) = &spec.style {
        doc.set_attribute(element, "style", style)?;
    }
    for (property, value) in &spec.computed {
        doc.set_cascaded(element, property, value)?;
    }
    if let Some(text) = &spec.text {
        doc.append_text(element, text)?;
    }
    let size = spec.size.map(Size::from).unwrap_or(DEFAULT_SIZE);
    doc.set_size(element, size.width, size.height)
}
