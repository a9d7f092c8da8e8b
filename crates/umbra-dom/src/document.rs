//! Arena-backed document.
//!
//! [`MemoryDocument`] keeps just enough of a DOM for the engine: a node tree
//! with attributes and text, a per-element map of cascaded property values
//! standing in for author stylesheets, a rendered size per element, a list of
//! adopted stylesheets, and insertion watchers with queued records.
//!
//! Computed values resolve in this order:
//!
//! 1. the inline `style` attribute,
//! 2. the element's cascaded values,
//! 3. the parent's computed value, for inherited properties
//!    (`color`, `fill`, `stroke` and custom properties),
//! 4. the property's initial value.
//!
//! Adopted stylesheet text is stored but not cascaded.

use std::collections::{BTreeMap, HashMap};

use indextree::{Arena, NodeId};
use log::trace;
use serde::Serialize;
use umbra_engine::host::{Document, Insertion, Size};
use umbra_engine::{HostError, HostResult};

use crate::error::DomError;
use crate::style::InlineStyle;

/// Size given to elements that were not sized explicitly.
pub const DEFAULT_SIZE: Size = Size {
    width: 100.0,
    height: 100.0,
};

#[derive(Debug, Clone)]
enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
    cascaded: HashMap<String, String>,
    size: Size,
}

impl ElementData {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.trim().to_ascii_lowercase(),
            attributes: Vec::new(),
            cascaded: HashMap::new(),
            size: DEFAULT_SIZE,
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attribute(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    fn remove_attribute(&mut self, name: &str) {
        self.attributes.retain(|(n, _)| n != name);
    }

    fn classes(&self) -> Vec<&str> {
        self.attribute("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// Adopted stylesheet handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetId(usize);

/// Insertion watcher handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatcherId(usize);

#[derive(Debug, Clone)]
struct Watcher {
    target: NodeId,
    queue: Vec<Insertion<NodeId>>,
}

/// An in-memory document: `html` root with an optional `body`.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    arena: Arena<NodeData>,
    root: NodeId,
    body: Option<NodeId>,
    supports_adopted: bool,
    stylesheets: Vec<String>,
    adopted: Vec<SheetId>,
    /// Connected watchers only; disconnecting removes the entry.
    watchers: BTreeMap<usize, Watcher>,
    next_watcher: usize,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// `<html><body></body></html>` with adopted stylesheet support.
    pub fn new() -> Self {
        let mut doc = Self::without_body();
        let body = doc.arena.new_node(NodeData::Element(ElementData::new("body")));
        doc.root.append(body, &mut doc.arena);
        doc.body = Some(body);
        doc
    }

    /// A bare `<html>` root.
    pub fn without_body() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(NodeData::Element(ElementData::new("html")));
        Self {
            arena,
            root,
            body: None,
            supports_adopted: true,
            stylesheets: Vec::new(),
            adopted: Vec::new(),
            watchers: BTreeMap::new(),
            next_watcher: 0,
        }
    }

    pub fn set_supports_adopted_stylesheets(&mut self, supported: bool) {
        self.supports_adopted = supported;
    }

    // ─── Building ───────────────────────────────────────────────────────────

    /// Creates a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena
            .new_node(NodeData::Element(ElementData::new(tag)))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.new_node(NodeData::Text(text.to_string()))
    }

    /// Appends `child` under `parent`. If `parent` is connected and `child`
    /// is an element, every watcher observing an ancestor of `parent` gets a
    /// record.
    pub fn append(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.element(parent)?;
        self.node(child)?;
        parent
            .checked_append(child, &mut self.arena)
            .map_err(|e| DomError::Append {
                parent: format!("{:?}", parent),
                child: format!("{:?}", child),
                reason: e.to_string(),
            })?;

        if self.element(child).is_ok() && self.is_connected(parent) {
            self.notify_insertion(parent, child);
        }
        Ok(())
    }

    /// Creates an element and appends it in one step.
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let child = self.create_element(tag);
        self.append(parent, child)?;
        Ok(child)
    }

    /// Creates a text node and appends it in one step.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        let child = self.create_text(text);
        self.append(parent, child)?;
        Ok(child)
    }

    /// Removes a node (and its subtree) from the tree. Handles stay valid
    /// but report as disconnected.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        self.node(node)?;
        node.detach(&mut self.arena);
        Ok(())
    }

    /// Sets a cascaded value, as if from an author stylesheet.
    pub fn set_cascaded(
        &mut self,
        element: NodeId,
        property: &str,
        value: &str,
    ) -> Result<(), DomError> {
        self.element_mut(element)?
            .cascaded
            .insert(property.trim().to_string(), value.to_string());
        Ok(())
    }

    /// Sets an attribute. Same as the [`Document`] method, with a tree error.
    pub fn set_attribute(
        &mut self,
        element: NodeId,
        name: &str,
        value: &str,
    ) -> Result<(), DomError> {
        self.element_mut(element)?.set_attribute(name, value);
        Ok(())
    }

    pub fn set_size(&mut self, element: NodeId, width: f64, height: f64) -> Result<(), DomError> {
        self.element_mut(element)?.size = Size::new(width, height);
        Ok(())
    }

    // ─── Inspection ─────────────────────────────────────────────────────────

    /// Raw `style` attribute.
    pub fn style_attribute(&self, element: NodeId) -> Option<&str> {
        self.element(element).ok()?.attribute("style")
    }

    /// Parsed inline style.
    pub fn inline_style(&self, element: NodeId) -> InlineStyle {
        self.style_attribute(element)
            .map(InlineStyle::parse)
            .unwrap_or_default()
    }

    /// Text of every adopted stylesheet, in adoption order.
    pub fn adopted_css(&self) -> Vec<&str> {
        self.adopted
            .iter()
            .filter_map(|id| self.stylesheets.get(id.0))
            .map(String::as_str)
            .collect()
    }

    /// Number of stylesheets ever created.
    pub fn stylesheet_count(&self) -> usize {
        self.stylesheets.len()
    }

    /// Number of watchers still connected.
    pub fn active_watchers(&self) -> usize {
        self.watchers.len()
    }

    /// Serializable view of the body subtree.
    pub fn dump(&self) -> PageDump {
        PageDump {
            adopted_stylesheets: self.adopted_css().into_iter().map(str::to_string).collect(),
            body: self.body.and_then(|body| self.dump_element(body)),
        }
    }

    fn dump_element(&self, id: NodeId) -> Option<ElementDump> {
        let data = self.element(id).ok()?;
        let text = self.direct_text_of(id);
        let text = text.trim();
        Some(ElementDump {
            tag: data.tag.clone(),
            attributes: data.attributes.iter().cloned().collect(),
            text: (!text.is_empty()).then(|| text.to_string()),
            children: id
                .children(&self.arena)
                .filter_map(|child| self.dump_element(child))
                .collect(),
        })
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    fn node(&self, id: NodeId) -> Result<&NodeData, DomError> {
        match self.arena.get(id) {
            Some(node) if !node.is_removed() => Ok(node.get()),
            _ => Err(DomError::UnknownNode(format!("{:?}", id))),
        }
    }

    fn element(&self, id: NodeId) -> Result<&ElementData, DomError> {
        match self.node(id)? {
            NodeData::Element(data) => Ok(data),
            NodeData::Text(_) => Err(DomError::NotAnElement(format!("{:?}", id))),
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData, DomError> {
        match self.arena.get_mut(id) {
            Some(node) if !node.is_removed() => match node.get_mut() {
                NodeData::Element(data) => Ok(data),
                NodeData::Text(_) => Err(DomError::NotAnElement(format!("{:?}", id))),
            },
            _ => Err(DomError::UnknownNode(format!("{:?}", id))),
        }
    }

    fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_ok()
    }

    fn direct_text_of(&self, id: NodeId) -> String {
        id.children(&self.arena)
            .filter_map(|child| match self.arena.get(child).map(|n| n.get()) {
                Some(NodeData::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn notify_insertion(&mut self, parent: NodeId, child: NodeId) {
        let ancestors: Vec<NodeId> = parent.ancestors(&self.arena).collect();
        for watcher in self.watchers.values_mut() {
            if ancestors.contains(&watcher.target) {
                trace!("queueing insertion of {:?} under {:?}", child, parent);
                watcher.queue.push(Insertion {
                    target: parent,
                    added: vec![child],
                });
            }
        }
    }

    fn resolve(&self, id: NodeId, property: &str) -> Result<Option<String>, DomError> {
        let data = self.element(id)?;

        if let Some(style) = data.attribute("style") {
            if let Some(declaration) = InlineStyle::parse(style).get(property) {
                return Ok(Some(declaration.value.clone()));
            }
        }
        if let Some(value) = data.cascaded.get(property) {
            return Ok(Some(value.clone()));
        }
        if is_inherited(property) {
            if let Some(parent) = id.parent(&self.arena).filter(|p| self.is_element(*p)) {
                return self.resolve(parent, property);
            }
        }
        Ok(initial_value(property).map(str::to_string))
    }

    fn sheet_index(&self, sheet: SheetId) -> HostResult<usize> {
        if sheet.0 < self.stylesheets.len() {
            Ok(sheet.0)
        } else {
            Err(HostError::UnknownStylesheet(format!("{:?}", sheet)))
        }
    }

    fn watcher_mut(&mut self, watcher: WatcherId) -> HostResult<&mut Watcher> {
        self.watchers
            .get_mut(&watcher.0)
            .ok_or_else(|| HostError::UnknownWatcher(format!("{:?}", watcher)))
    }
}

fn is_inherited(property: &str) -> bool {
    matches!(property, "color" | "fill" | "stroke") || property.starts_with("--")
}

fn initial_value(property: &str) -> Option<&'static str> {
    match property {
        "background-color" => Some("rgba(0, 0, 0, 0)"),
        "color" | "fill" => Some("rgb(0, 0, 0)"),
        "stroke" => Some("none"),
        _ => None,
    }
}

impl Document for MemoryDocument {
    type Element = NodeId;
    type Sheet = SheetId;
    type Watcher = WatcherId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn body(&self) -> Option<NodeId> {
        self.body.filter(|body| self.is_connected(*body))
    }

    fn is_connected(&self, element: NodeId) -> bool {
        self.node(element).is_ok() && element.ancestors(&self.arena).any(|a| a == self.root)
    }

    fn parent(&self, element: NodeId) -> HostResult<Option<NodeId>> {
        self.element(element)?;
        Ok(element.parent(&self.arena).filter(|p| self.is_element(*p)))
    }

    fn tag_name(&self, element: NodeId) -> HostResult<String> {
        Ok(self.element(element)?.tag.clone())
    }

    fn descendants(&self, element: NodeId) -> HostResult<Vec<NodeId>> {
        self.element(element)?;
        Ok(element
            .descendants(&self.arena)
            .skip(1)
            .filter(|id| self.is_element(*id))
            .collect())
    }

    fn attribute(&self, element: NodeId, name: &str) -> HostResult<Option<String>> {
        Ok(self.element(element)?.attribute(name).map(str::to_string))
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> HostResult<()> {
        Ok(MemoryDocument::set_attribute(self, element, name, value)?)
    }

    fn remove_attribute(&mut self, element: NodeId, name: &str) -> HostResult<()> {
        self.element_mut(element)?.remove_attribute(name);
        Ok(())
    }

    fn add_class(&mut self, element: NodeId, class: &str) -> HostResult<()> {
        let data = self.element_mut(element)?;
        let mut classes: Vec<String> = data.classes().into_iter().map(str::to_string).collect();
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
            data.set_attribute("class", &classes.join(" "));
        }
        Ok(())
    }

    fn remove_class(&mut self, element: NodeId, class: &str) -> HostResult<()> {
        let data = self.element_mut(element)?;
        let remaining: Vec<String> = data
            .classes()
            .into_iter()
            .filter(|c| *c != class)
            .map(str::to_string)
            .collect();
        if remaining.is_empty() {
            data.remove_attribute("class");
        } else {
            data.set_attribute("class", &remaining.join(" "));
        }
        Ok(())
    }

    fn has_class(&self, element: NodeId, class: &str) -> HostResult<bool> {
        Ok(self.element(element)?.classes().contains(&class))
    }

    fn computed_value(&self, element: NodeId, property: &str) -> HostResult<Option<String>> {
        Ok(self.resolve(element, property)?)
    }

    fn direct_text(&self, element: NodeId) -> HostResult<String> {
        self.element(element)?;
        Ok(self.direct_text_of(element))
    }

    fn rendered_size(&self, element: NodeId) -> HostResult<Size> {
        Ok(self.element(element)?.size)
    }

    fn is_svg(&self, element: NodeId) -> HostResult<bool> {
        self.element(element)?;
        Ok(element.ancestors(&self.arena).any(|id| {
            matches!(self.arena.get(id).map(|n| n.get()), Some(NodeData::Element(data)) if data.tag == "svg")
        }))
    }

    fn set_style_property(
        &mut self,
        element: NodeId,
        property: &str,
        value: &str,
        important: bool,
    ) -> HostResult<()> {
        let mut style = self.inline_style(element);
        style.set(property, value, important);
        self.element_mut(element)?
            .set_attribute("style", &style.to_css());
        Ok(())
    }

    fn supports_adopted_stylesheets(&self) -> bool {
        self.supports_adopted
    }

    fn create_stylesheet(&mut self) -> HostResult<SheetId> {
        if !self.supports_adopted {
            return Err(HostError::StylesheetsUnsupported);
        }
        self.stylesheets.push(String::new());
        Ok(SheetId(self.stylesheets.len() - 1))
    }

    fn replace_stylesheet(&mut self, sheet: SheetId, css: &str) -> HostResult<()> {
        let index = self.sheet_index(sheet)?;
        self.stylesheets[index] = css.to_string();
        Ok(())
    }

    fn adopt_stylesheet(&mut self, sheet: SheetId) -> HostResult<()> {
        self.sheet_index(sheet)?;
        if !self.adopted.contains(&sheet) {
            self.adopted.push(sheet);
        }
        Ok(())
    }

    fn drop_stylesheet(&mut self, sheet: SheetId) -> HostResult<()> {
        self.sheet_index(sheet)?;
        self.adopted.retain(|s| *s != sheet);
        Ok(())
    }

    fn is_adopted(&self, sheet: SheetId) -> bool {
        self.adopted.contains(&sheet)
    }

    fn observe_insertions(&mut self, target: NodeId) -> HostResult<WatcherId> {
        self.element(target)?;
        let id = self.next_watcher;
        self.next_watcher += 1;
        self.watchers.insert(
            id,
            Watcher {
                target,
                queue: Vec::new(),
            },
        );
        Ok(WatcherId(id))
    }

    fn disconnect(&mut self, watcher: WatcherId) -> HostResult<()> {
        match self.watchers.remove(&watcher.0) {
            Some(_) => Ok(()),
            None => Err(HostError::UnknownWatcher(format!("{:?}", watcher))),
        }
    }

    fn take_records(&mut self, watcher: WatcherId) -> HostResult<Vec<Insertion<NodeId>>> {
        Ok(std::mem::take(&mut self.watcher_mut(watcher)?.queue))
    }
}

// ─── Dump ───────────────────────────────────────────────────────────────────

/// Serializable snapshot of a document, for printing and assertions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageDump {
    pub adopted_stylesheets: Vec<String>,
    pub body: Option<ElementDump>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementDump {
    pub tag: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementDump>,
}
