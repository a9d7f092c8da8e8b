//! Per-element style rewriting.
//!
//! Where variable overrides cannot reach (hardcoded colors, inline styles,
//! third-party widgets), elements are rewritten one by one through their
//! inline style. A pass runs in two phases that never interleave:
//!
//! 1. **Read**: computed background, text and icon colors, size and direct
//!    text are captured for every element. Nothing is written.
//! 2. **Write**: each record is decided on its own and the results are
//!    applied as `!important` inline declarations.
//!
//! Interleaving the two would force a style recalculation per element and
//! would let one element's new colors leak into the next element's reads.
//!
//! Before an element's first override it gets the styled marker and its
//! `style` attribute is captured in the [`SnapshotMap`]. [`restore`] uses the
//! pair to put every attribute back exactly as it was.
//!
//! [`restore`]: StyleRewriter::restore

mod decide;
mod record;
mod snapshot;

use std::collections::HashSet;

use log::{debug, trace, warn};
use serde::Serialize;
use umbra_color::format;

use crate::config::EngineConfig;
use crate::error::HostResult;
use crate::host::{props, Document};

use decide::{decide, Decision};
use record::ElementRecord;
pub use snapshot::{OriginalStyle, Replaced, SnapshotMap};

/// Name of the attribute holding an element's inline style.
pub const STYLE_ATTRIBUTE: &str = "style";

/// Counts from one [`StyleRewriter::process`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub visited: usize,
    pub backgrounds: usize,
    pub texts: usize,
    pub fills: usize,
    pub strokes: usize,
    /// Elements snapshotted for the first time.
    pub snapshotted: usize,
    /// Elements skipped because the host failed on them.
    pub failed: usize,
}

impl PassReport {
    /// Total number of properties written.
    pub fn overrides(&self) -> usize {
        self.backgrounds + self.texts + self.fills + self.strokes
    }

    pub fn merge(&mut self, other: &PassReport) {
        self.visited += other.visited;
        self.backgrounds += other.backgrounds;
        self.texts += other.texts;
        self.fills += other.fills;
        self.strokes += other.strokes;
        self.snapshotted += other.snapshotted;
        self.failed += other.failed;
    }
}

/// Counts from one [`StyleRewriter::restore`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    /// Elements whose style attribute was put back or removed.
    pub restored: usize,
    /// Marked elements that had no snapshot; their style was cleared.
    pub missing_snapshot: usize,
    pub failed: usize,
}

/// Applies and reverts inline overrides, owning the snapshot map.
#[derive(Debug, Clone)]
pub struct StyleRewriter<E> {
    config: EngineConfig,
    snapshots: SnapshotMap<E>,
}

impl<E> StyleRewriter<E>
where
    E: Copy + Eq + std::hash::Hash + std::fmt::Debug,
{
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            snapshots: SnapshotMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn snapshots(&self) -> &SnapshotMap<E> {
        &self.snapshots
    }

    /// Rewrites `elements` in one read-all-then-write-all pass.
    ///
    /// Duplicates are visited once. A host failure on one element is logged
    /// and counted; the others are still processed.
    pub fn process<D>(&mut self, doc: &mut D, elements: &[E]) -> PassReport
    where
        D: Document<Element = E>,
    {
        let mut report = PassReport::default();
        let mut seen = HashSet::with_capacity(elements.len());

        // Read phase.
        let mut records = Vec::with_capacity(elements.len());
        for &element in elements {
            if !seen.insert(element) {
                continue;
            }
            report.visited += 1;
            match ElementRecord::read(&*doc, element, &self.snapshots) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("skipping {:?}: read failed: {}", element, e);
                    report.failed += 1;
                }
            }
        }

        // Write phase.
        for record in &records {
            let decision = decide(record, &self.config);
            if decision.is_empty() {
                continue;
            }
            if let Err(e) = self.apply(doc, record, &decision, &mut report) {
                warn!("skipping {:?}: write failed: {}", record.element, e);
                report.failed += 1;
            }
        }

        debug!(
            "rewrite pass: {} visited, {} overrides ({} bg, {} text, {} fill, {} stroke), {} new snapshots, {} failed",
            report.visited,
            report.overrides(),
            report.backgrounds,
            report.texts,
            report.fills,
            report.strokes,
            report.snapshotted,
            report.failed
        );
        report
    }

    fn apply<D>(
        &mut self,
        doc: &mut D,
        record: &ElementRecord<E>,
        decision: &Decision,
        report: &mut PassReport,
    ) -> HostResult<()>
    where
        D: Document<Element = E>,
    {
        let element = record.element;
        let marker = self.config.styled_marker.as_str();
        if doc.attribute(element, marker)?.is_none() {
            let original = OriginalStyle::from(doc.attribute(element, STYLE_ATTRIBUTE)?);
            // Marker first, so a failed write never leaves a snapshot behind.
            doc.set_attribute(element, marker, "true")?;
            if self.snapshots.record(element, original) {
                report.snapshotted += 1;
            }
        }

        // Inherited properties also note the page's value they replace.
        let writes = [
            (props::BACKGROUND_COLOR, decision.background, None, &mut report.backgrounds),
            (props::COLOR, decision.text, record.text.as_ref(), &mut report.texts),
            (props::FILL, decision.fill, record.fill.as_ref(), &mut report.fills),
            (props::STROKE, decision.stroke, record.stroke.as_ref(), &mut report.strokes),
        ];
        for (property, color, original, counter) in writes {
            let Some(color) = color else { continue };
            let value = format(&color);
            trace!("{:?}: {} -> {}", element, property, value);
            doc.set_style_property(element, property, &value, true)?;
            *counter += 1;
            if let Some(original) = original {
                self.snapshots.note_replaced(
                    element,
                    property,
                    Replaced {
                        original: original.clone(),
                        written: value,
                    },
                );
            }
        }
        Ok(())
    }

    /// Puts back the original style of every marked element in `elements`.
    ///
    /// Elements without the marker are ignored. A marked element with no
    /// snapshot has its style attribute removed.
    pub fn restore<D>(&mut self, doc: &mut D, elements: &[E]) -> RestoreReport
    where
        D: Document<Element = E>,
    {
        let mut report = RestoreReport::default();
        let marker = self.config.styled_marker.clone();

        for &element in elements {
            if let Err(e) = self.restore_one(doc, element, &marker, &mut report) {
                warn!("failed to restore {:?}: {}", element, e);
                report.failed += 1;
            }
        }

        debug!(
            "restore: {} restored, {} without snapshot, {} failed",
            report.restored, report.missing_snapshot, report.failed
        );
        report
    }

    fn restore_one<D>(
        &mut self,
        doc: &mut D,
        element: E,
        marker: &str,
        report: &mut RestoreReport,
    ) -> HostResult<()>
    where
        D: Document<Element = E>,
    {
        if doc.attribute(element, marker)?.is_none() {
            return Ok(());
        }

        match self.snapshots.get(element).cloned() {
            Some(OriginalStyle::Attribute(text)) => {
                doc.set_attribute(element, STYLE_ATTRIBUTE, &text)?
            }
            Some(OriginalStyle::Absent) => doc.remove_attribute(element, STYLE_ATTRIBUTE)?,
            None => {
                warn!("{:?} is marked but has no snapshot; clearing style", element);
                report.missing_snapshot += 1;
                doc.remove_attribute(element, STYLE_ATTRIBUTE)?;
            }
        }

        // Entry and marker go together.
        self.snapshots.take(element);
        doc.remove_attribute(element, marker)?;
        report.restored += 1;
        Ok(())
    }

    /// Drops snapshots of elements no longer in the document.
    pub fn prune<D>(&mut self, doc: &D) -> usize
    where
        D: Document<Element = E>,
    {
        let dropped = self.snapshots.prune(|element| doc.is_connected(element));
        if dropped > 0 {
            debug!("pruned {} snapshots of disconnected elements", dropped);
        }
        dropped
    }

    /// Every element under the root (root included) carrying the marker.
    pub fn marked_elements<D>(&self, doc: &D) -> HostResult<Vec<E>>
    where
        D: Document<Element = E>,
    {
        let root = doc.root();
        let marker = self.config.styled_marker.as_str();
        let mut marked = Vec::new();
        for element in std::iter::once(root).chain(doc.descendants(root)?) {
            if doc.attribute(element, marker)?.is_some() {
                marked.push(element);
            }
        }
        Ok(marked)
    }
}
