//! Lifecycle controller.
//!
//! One [`Controller`] per page owns the whole dark-mode state: whether it is
//! active, the adopted stylesheet, the insertion watcher and the rewriter's
//! snapshots. It is a two-state machine:
//!
//! ```text
//!            activate()
//!   Inactive ───────────▶ Active
//!      ▲                    │
//!      └────────────────────┘
//!            deactivate()
//! ```
//!
//! Both transitions are idempotent: calling either one in the state it leads
//! to returns [`Transition::Unchanged`] and touches nothing.
//!
//! The controller borrows the document mutably for every call, so nothing
//! else can mutate the page while a pass runs.

use log::{debug, warn};

use crate::cache::BootstrapCache;
use crate::config::EngineConfig;
use crate::error::{EngineError, HostResult, Result};
use crate::host::{Document, Insertion};
use crate::rewriter::{PassReport, RestoreReport, StyleRewriter};
use crate::stylesheet::build_rule_block;
use crate::variables::generate;

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Inactive,
    Active,
}

/// Outcome of a lifecycle call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Inactive to Active; carries the full-document pass report.
    Activated(PassReport),
    /// Active to Inactive; carries the restore report.
    Deactivated(RestoreReport),
    /// The call was redundant.
    Unchanged,
}

impl Transition {
    pub fn changed(&self) -> bool {
        !matches!(self, Transition::Unchanged)
    }
}

pub struct Controller<D: Document, C> {
    config: EngineConfig,
    cache: C,
    state: State,
    rewriter: StyleRewriter<D::Element>,
    sheet: Option<D::Sheet>,
    watcher: Option<D::Watcher>,
    /// Adopted-stylesheet support, checked on first activation.
    stylesheets_supported: Option<bool>,
}

impl<D, C> Controller<D, C>
where
    D: Document,
    C: BootstrapCache,
{
    pub fn new(config: EngineConfig, cache: C) -> Self {
        Self {
            rewriter: StyleRewriter::new(config.clone()),
            config,
            cache,
            state: State::Inactive,
            sheet: None,
            watcher: None,
            stylesheets_supported: None,
        }
    }

    /// Validates `config` before building the controller.
    pub fn with_validated(config: EngineConfig, cache: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config, cache))
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == State::Active
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn rewriter(&self) -> &StyleRewriter<D::Element> {
        &self.rewriter
    }

    /// Turns dark mode on.
    pub fn activate(&mut self, doc: &mut D) -> Result<Transition> {
        if self.is_active() {
            debug!("activate: already active");
            return Ok(Transition::Unchanged);
        }

        let body = doc.body().ok_or(EngineError::NoBody)?;
        doc.add_class(body, &self.config.activation_class)?;

        self.install_stylesheet(doc);

        let elements = match self.matched_elements(doc, body) {
            Ok(elements) => elements,
            Err(e) => {
                warn!("could not list elements, rolling back: {}", e);
                self.teardown(doc);
                return Err(e.into());
            }
        };
        let report = self.rewriter.process(doc, &elements);

        match doc.observe_insertions(body) {
            Ok(watcher) => self.watcher = Some(watcher),
            Err(e) => {
                warn!("could not watch insertions, rolling back: {}", e);
                self.teardown(doc);
                return Err(e.into());
            }
        }

        self.persist(true);
        self.state = State::Active;
        debug!("activated: {} elements visited", report.visited);
        Ok(Transition::Activated(report))
    }

    /// Turns dark mode off and restores every rewritten element.
    pub fn deactivate(&mut self, doc: &mut D) -> Result<Transition> {
        if !self.is_active() {
            debug!("deactivate: already inactive");
            return Ok(Transition::Unchanged);
        }

        let report = self.teardown(doc);
        self.persist(false);
        self.state = State::Inactive;
        debug!("deactivated: {} elements restored", report.restored);
        Ok(Transition::Deactivated(report))
    }

    pub fn toggle(&mut self, doc: &mut D) -> Result<Transition> {
        if self.is_active() {
            self.deactivate(doc)
        } else {
            self.activate(doc)
        }
    }

    /// Entry point for an external "enabled changed" signal.
    pub fn set_enabled(&mut self, doc: &mut D, enabled: bool) -> Result<Transition> {
        if enabled {
            self.activate(doc)
        } else {
            self.deactivate(doc)
        }
    }

    /// Delivers records queued on the watcher since the last call.
    ///
    /// Returns `None` when inactive or when nothing was inserted.
    pub fn pump(&mut self, doc: &mut D) -> Result<Option<PassReport>> {
        let Some(watcher) = self.watcher.filter(|_| self.is_active()) else {
            return Ok(None);
        };
        let records = doc.take_records(watcher)?;
        if records.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.on_insertions(doc, &records)))
    }

    /// Rewrites the inserted nodes of one batch and their matching descendants.
    ///
    /// Nodes already removed again by the time the batch is handled are
    /// skipped. The whole batch is one read-all-then-write-all pass.
    pub fn on_insertions(
        &mut self,
        doc: &mut D,
        records: &[Insertion<D::Element>],
    ) -> PassReport {
        if !self.is_active() {
            return PassReport::default();
        }

        self.rewriter.prune(doc);

        let mut elements = Vec::new();
        for node in records.iter().flat_map(|r| r.added.iter().copied()) {
            if !doc.is_connected(node) {
                continue;
            }
            if let Err(e) = self.collect_matching(doc, node, &mut elements) {
                warn!("skipping inserted {:?}: {}", node, e);
            }
        }

        let report = self.rewriter.process(doc, &elements);
        debug!(
            "insertion batch: {} records, {} elements visited",
            records.len(),
            report.visited
        );
        report
    }

    // ─── Internals ──────────────────────────────────────────────────────────

    /// Body plus every descendant whose tag is in the configured list.
    fn matched_elements(&self, doc: &D, body: D::Element) -> HostResult<Vec<D::Element>> {
        let mut elements = vec![body];
        for element in doc.descendants(body)? {
            match doc.tag_name(element) {
                Ok(tag) if self.config.matches_tag(&tag) => elements.push(element),
                Ok(_) => {}
                Err(e) => warn!("skipping {:?}: {}", element, e),
            }
        }
        Ok(elements)
    }

    fn collect_matching(
        &self,
        doc: &D,
        node: D::Element,
        out: &mut Vec<D::Element>,
    ) -> HostResult<()> {
        for element in std::iter::once(node).chain(doc.descendants(node)?) {
            if self.config.matches_tag(&doc.tag_name(element)?) {
                out.push(element);
            }
        }
        Ok(())
    }

    /// Writes the rule block into the adopted stylesheet. Failures degrade
    /// to inline-only mode.
    fn install_stylesheet(&mut self, doc: &mut D) {
        let supported = match self.stylesheets_supported {
            Some(supported) => supported,
            None => {
                let supported = doc.supports_adopted_stylesheets();
                if !supported {
                    warn!("adopted stylesheets unavailable; variable overrides disabled");
                }
                self.stylesheets_supported = Some(supported);
                supported
            }
        };
        if !supported {
            return;
        }

        let root = doc.root();
        let overrides = {
            let doc = &*doc;
            generate(
                |name| doc.computed_value(root, name).ok().flatten(),
                &self.config.variables,
                self.config.variable_chroma,
            )
        };
        let css = build_rule_block(&self.config, &overrides);
        debug!("stylesheet: {} variable overrides", overrides.len());

        if let Err(e) = self.write_stylesheet(doc, &css) {
            warn!("could not install stylesheet: {}", e);
        }
    }

    /// Creates the sheet on first use, replaces its text and adopts it.
    fn write_stylesheet(&mut self, doc: &mut D, css: &str) -> HostResult<()> {
        let sheet = match self.sheet {
            Some(sheet) => sheet,
            None => {
                let sheet = doc.create_stylesheet()?;
                self.sheet = Some(sheet);
                sheet
            }
        };
        doc.replace_stylesheet(sheet, css)?;
        if !doc.is_adopted(sheet) {
            doc.adopt_stylesheet(sheet)?;
        }
        Ok(())
    }

    /// Undoes everything `activate` did. Never fails; problems are logged.
    fn teardown(&mut self, doc: &mut D) -> RestoreReport {
        if let Some(watcher) = self.watcher.take() {
            if let Err(e) = doc.disconnect(watcher) {
                warn!("could not disconnect watcher: {}", e);
            }
        }

        let report = match self.rewriter.marked_elements(doc) {
            Ok(marked) => self.rewriter.restore(doc, &marked),
            Err(e) => {
                warn!("could not list styled elements: {}", e);
                RestoreReport::default()
            }
        };
        self.rewriter.prune(doc);

        if let Some(body) = doc.body() {
            if let Err(e) = doc.remove_class(body, &self.config.activation_class) {
                warn!("could not remove activation class: {}", e);
            }
        }

        if let Some(sheet) = self.sheet {
            if doc.is_adopted(sheet) {
                if let Err(e) = doc.drop_stylesheet(sheet) {
                    warn!("could not drop stylesheet: {}", e);
                }
            }
        }

        report
    }

    fn persist(&mut self, enabled: bool) {
        let value = if enabled { "true" } else { "false" };
        if let Err(e) = self.cache.write(&self.config.cache_key, value) {
            warn!("could not write bootstrap cache: {}", e);
        }
    }
}
