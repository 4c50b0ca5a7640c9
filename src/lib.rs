//! # folio
//!
//! Render a sectioned document into well-formed XHTML files ready to be
//! packaged into an EPUB.
//!
//! ## Features
//!
//! - One XHTML file per section, named `<ordinal>-<slug>.xhtml` so names are
//!   unique and sort in document order
//! - Optional markup templates supplying head metadata and body scaffolding
//! - Deterministic serialization with a normalized XML declaration
//! - Atomic writes (temporary file, then rename) and a dry-run mode
//!
//! ## Quick Start
//!
//! ```no_run
//! use folio::{RootElement, Section, XhtmlWriter};
//! use folio::document::ContentNode;
//!
//! let document = RootElement::new()
//!     .with_section(Section::titled("Intro").with_content(ContentNode::paragraph("Hello")))
//!     .with_section(Section::titled("Chapter 1"));
//!
//! let writer = XhtmlWriter::new();
//! for path in writer.write_as_many_documents("OEBPS/text", &document, None, false)? {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), folio::Error>(())
//! ```

pub mod builder;
pub mod document;
pub mod error;
pub mod markup;
pub mod naming;
pub mod util;
pub mod writer;

pub use builder::{Template, XhtmlBuilder};
pub use document::{Heading, RootElement, Section};
pub use error::{Error, Result};
pub use markup::MarkupDocument;
pub use naming::generate_section_file_name;
pub use writer::{WriterConfig, XhtmlWriter};
