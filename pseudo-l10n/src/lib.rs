//! Pseudo-translation of localization files
//!
//! This crate turns the source strings of a localization file into pseudo
//! translations and writes them back in the same format, so that the
//! result can be loaded by the application like any real translation.
//!
//! # Overview
//!
//! 1. **Format handlers** parse gettext PO, Qt TS, Java properties and
//!    Joomla INI files into a [`Document`] and compile it back.
//! 2. **Pseudo types** ([`PseudoType`]) rewrite one string at a time.
//! 3. The **pipeline** ([`Pipeline`]) ties both together.
//!
//! # Example
//!
//! ```
//! use pseudo_l10n::{Format, Origin, Pipeline, PseudoType};
//!
//! let pipeline = Pipeline::default();
//! let document = pipeline
//!     .parse(Format::Properties, "Key00:Value00\n", &Origin::Source)
//!     .unwrap();
//! let output = pipeline.compile_to_string(&document, PseudoType::Unicode).unwrap();
//! assert_eq!(output, "Key00:Ṽȧŀŭḗ00\n");
//! ```

pub mod document;
pub mod error;
pub mod format;
pub mod handlers;
pub mod pipeline;
pub mod pseudo;


// Re-export main types for convenient access
pub use document::{Document, Entry, Origin, Segment, Template, TemplateBuilder};
pub use error::{FormatError, PseudoError, PseudoResult};
pub use format::Format;
pub use handlers::{FormatHandler, HandlerFactory, Registry};
pub use pipeline::{Pipeline, decode_content, pseudo_translate};
pub use pseudo::PseudoType;
