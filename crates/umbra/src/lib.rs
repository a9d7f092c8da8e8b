//! # Umbra - dark mode for pages that never asked for it
//!
//! Umbra rewrites the colors of an already-rendered web page into a dark
//! palette, keeps pace with content the page inserts later, and can undo
//! every change exactly.
//!
//! This crate is the facade over the workspace:
//!
//! - [`color`]: OKLCH color math, WCAG luminance and contrast, the contrast
//!   enforcer (`umbra-color`)
//! - [`engine`]: variable overrides, per-element rewriting, the lifecycle
//!   controller and the host document trait (`umbra-engine`)
//! - [`dom`]: an in-memory document and YAML/JSON page fixtures (`umbra-dom`)
//! - [`cli`]: the `umbra` command-line front end
//!
//! ## Quick Start
//!
//! ```rust
//! use umbra::{Controller, Document, EngineConfig, MemoryCache, MemoryDocument};
//!
//! let mut doc = MemoryDocument::new();
//! let body = doc.body().unwrap();
//! let p = doc.append_element(body, "p").unwrap();
//! doc.append_text(p, "Hello").unwrap();
//! doc.set_cascaded(p, "background-color", "rgb(255, 255, 255)").unwrap();
//! doc.set_cascaded(p, "color", "rgb(0, 0, 0)").unwrap();
//!
//! let mut controller = Controller::new(EngineConfig::default(), MemoryCache::new());
//! controller.activate(&mut doc).unwrap();
//! assert!(doc.style_attribute(p).unwrap().contains("background-color"));
//!
//! controller.deactivate(&mut doc).unwrap();
//! assert_eq!(doc.style_attribute(p), None);
//! ```

pub mod cli;

pub use umbra_color as color;
pub use umbra_dom as dom;
pub use umbra_engine as engine;

pub use umbra_color::{
    adjust, contrast_ratio, format, parse, relative_luminance, AdjustPolicy, Color, ColorError,
};
pub use umbra_dom::{MemoryDocument, PageSpec};
pub use umbra_engine::{
    BootstrapCache, Controller, Document, EngineConfig, EngineError, FileCache, MemoryCache,
    PassReport, RestoreReport, Transition,
};
