//! # Umbra DOM - an in-memory host document
//!
//! A small arena-backed document implementing [`umbra_engine::Document`].
//! It backs the engine's integration tests and the `umbra page` command,
//! and can be built by hand or from a YAML/JSON [`PageSpec`].
//!
//! ```rust
//! use umbra_dom::MemoryDocument;
//! use umbra_engine::Document;
//!
//! let mut doc = MemoryDocument::new();
//! let body = doc.body().unwrap();
//! let p = doc.append_element(body, "p").unwrap();
//! doc.append_text(p, "Hello").unwrap();
//! doc.set_cascaded(p, "background-color", "#ffffff").unwrap();
//!
//! assert_eq!(
//!     doc.computed_value(p, "background-color").unwrap().as_deref(),
//!     Some("#ffffff")
//! );
//! ```

mod document;
mod error;
pub mod fixture;
pub mod style;

pub use document::{ElementDump, MemoryDocument, PageDump, SheetId, WatcherId, DEFAULT_SIZE};
pub use error::{DomError, FixtureError};
pub use fixture::{insert, ElementSpec, PageSpec, SizeSpec};
pub use indextree::NodeId;
pub use style::{Declaration, InlineStyle};
