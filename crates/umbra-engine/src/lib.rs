//! # Umbra Engine - dark-mode style overrides for live documents
//!
//! The engine turns an already-rendered, light page dark without the page's
//! cooperation, and can put it back exactly as it was.
//!
//! ## Two strategies
//!
//! 1. **Variable overrides** ([`variables`]): theme custom properties found
//!    on the root are inverted and written into one adopted stylesheet,
//!    scoped to the activation class.
//! 2. **Per-element rewriting** ([`rewriter`]): matched elements get inline
//!    `!important` overrides for background, text, fill and stroke, decided
//!    from their computed colors with a contrast floor on text.
//!
//! The [`Controller`] runs both on activation, watches for inserted
//! subtrees while active, and rolls everything back on deactivation.
//!
//! ## Host documents
//!
//! The engine is generic over [`Document`], the small set of DOM
//! capabilities it needs. An in-memory implementation lives in the
//! `umbra-dom` crate.
//!
//! ## Example
//!
//! ```rust,ignore
//! use umbra_engine::{Controller, EngineConfig, MemoryCache};
//!
//! let mut controller = Controller::new(EngineConfig::default(), MemoryCache::new());
//! controller.activate(&mut doc)?;
//! // ... page inserts content ...
//! controller.pump(&mut doc)?;
//! controller.deactivate(&mut doc)?;
//! ```

pub mod cache;
pub mod config;
pub mod controller;
mod error;
pub mod host;
pub mod rewriter;
pub mod stylesheet;
pub mod transform;
pub mod variables;

pub use cache::{read_enabled, BootstrapCache, FileCache, MemoryCache};
pub use config::EngineConfig;
pub use controller::{Controller, State, Transition};
pub use error::{CacheError, ConfigError, EngineError, HostError, HostResult, Result};
pub use host::{Document, Insertion, Size};
pub use rewriter::{
    OriginalStyle, PassReport, Replaced, RestoreReport, SnapshotMap, StyleRewriter,
};
pub use variables::{generate, VariableOverride};
