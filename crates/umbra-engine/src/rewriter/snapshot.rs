//! Original inline styles, kept for exact rollback.
//!
//! An element has an entry here exactly when it carries the styled marker.
//! Keys are host handles, which do not keep nodes alive; entries for nodes
//! the page removed are dropped by [`SnapshotMap::prune`].
//!
//! Each entry also remembers the inherited colors written on its element,
//! so later passes can see through them to the page's own values.

use std::collections::HashMap;
use std::hash::Hash;

/// What an element's `style` attribute looked like before the first override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginalStyle {
    /// The attribute was present with this exact text (possibly empty).
    Attribute(String),
    /// The element had no `style` attribute.
    Absent,
}

impl From<Option<String>> for OriginalStyle {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => Self::Attribute(text),
            None => Self::Absent,
        }
    }
}

/// An inherited property the engine overwrote: the page's value and ours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replaced {
    pub original: String,
    /// Formatted value as written.
    pub written: String,
}

#[derive(Debug, Clone)]
struct Entry {
    original: OriginalStyle,
    replaced: HashMap<&'static str, Replaced>,
}

#[derive(Debug, Clone)]
pub struct SnapshotMap<E> {
    entries: HashMap<E, Entry>,
}

impl<E> Default for SnapshotMap<E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<E: Copy + Eq + Hash> SnapshotMap<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the original style unless one is already held.
    ///
    /// Returns `true` if a new entry was created.
    pub fn record(&mut self, element: E, original: OriginalStyle) -> bool {
        if self.entries.contains_key(&element) {
            return false;
        }
        self.entries.insert(
            element,
            Entry {
                original,
                replaced: HashMap::new(),
            },
        );
        true
    }

    /// Notes that `property` was overwritten on `element`. Later notes for the
    /// same property win. Returns `false` if the element has no entry.
    pub fn note_replaced(
        &mut self,
        element: E,
        property: &'static str,
        replaced: Replaced,
    ) -> bool {
        match self.entries.get_mut(&element) {
            Some(entry) => {
                entry.replaced.insert(property, replaced);
                true
            }
            None => false,
        }
    }

    pub fn replaced(&self, element: E, property: &str) -> Option<&Replaced> {
        self.entries.get(&element)?.replaced.get(property)
    }

    pub fn contains(&self, element: E) -> bool {
        self.entries.contains_key(&element)
    }

    pub fn get(&self, element: E) -> Option<&OriginalStyle> {
        self.entries.get(&element).map(|entry| &entry.original)
    }

    /// Removes an entry and returns its original style.
    pub fn take(&mut self, element: E) -> Option<OriginalStyle> {
        self.entries.remove(&element).map(|entry| entry.original)
    }

    /// Drops entries whose element fails `keep`. Returns how many were dropped.
    pub fn prune<F: FnMut(E) -> bool>(&mut self, mut keep: F) -> usize {
        let before = self.entries.len();
        self.entries.retain(|element, _| keep(*element));
        before - self.entries.len()
    }

    pub fn elements(&self) -> impl Iterator<Item = E> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_does_not_overwrite() {
        let mut map = SnapshotMap::new();
        assert!(map.record(1u32, OriginalStyle::Attribute("color: red".into())));
        assert!(!map.record(1u32, OriginalStyle::Absent));
        assert_eq!(
            map.get(1),
            Some(&OriginalStyle::Attribute("color: red".into()))
        );
    }

    #[test]
    fn take_removes_entry() {
        let mut map = SnapshotMap::new();
        map.record(7u32, OriginalStyle::Absent);
        assert_eq!(map.take(7), Some(OriginalStyle::Absent));
        assert!(map.is_empty());
        assert_eq!(map.take(7), None);
    }

    #[test]
    fn prune_drops_rejected_entries() {
        let mut map = SnapshotMap::new();
        for id in 0u32..6 {
            map.record(id, OriginalStyle::Absent);
        }
        assert_eq!(map.prune(|id| id % 2 == 0), 3);
        assert_eq!(map.len(), 3);
        assert!(map.contains(4));
        assert!(!map.contains(5));
    }

    fn replaced(original: &str, written: &str) -> Replaced {
        Replaced {
            original: original.to_string(),
            written: written.to_string(),
        }
    }

    #[test]
    fn replacements_need_an_entry() {
        let mut map = SnapshotMap::new();
        assert!(!map.note_replaced(1u32, "color", replaced("#000000", "#ffffff")));
        assert_eq!(map.replaced(1, "color"), None);

        map.record(1u32, OriginalStyle::Absent);
        assert!(map.note_replaced(1, "color", replaced("#000000", "#ffffff")));
        assert!(map.note_replaced(1, "color", replaced("#111111", "#eeeeee")));
        assert_eq!(map.replaced(1, "color"), Some(&replaced("#111111", "#eeeeee")));
        assert_eq!(map.replaced(1, "fill"), None);
    }

    #[test]
    fn replacements_go_with_the_entry() {
        let mut map = SnapshotMap::new();
        map.record(1u32, OriginalStyle::Absent);
        map.record(2u32, OriginalStyle::Absent);
        map.note_replaced(1, "stroke", replaced("#333333", "#cccccc"));
        map.note_replaced(2, "color", replaced("#000000", "#ffffff"));

        map.take(1);
        assert_eq!(map.replaced(1, "stroke"), None);
        map.prune(|_| false);
        assert_eq!(map.replaced(2, "color"), None);

        // A fresh entry starts clean.
        map.record(2u32, OriginalStyle::Absent);
        assert_eq!(map.replaced(2, "color"), None);
    }

    #[test]
    fn original_style_from_option() {
        assert_eq!(OriginalStyle::from(None), OriginalStyle::Absent);
        assert_eq!(
            OriginalStyle::from(Some(String::new())),
            OriginalStyle::Attribute(String::new())
        );
    }
}
