//! Format handlers
//!
//! A handler converts between the text of one localization format and a
//! [`Document`]. Handlers are looked up through an explicit [`Registry`]
//! keyed by [`Format`]; there is no lookup by type name.
//!
//! # Example
//!
//! ```
//! use pseudo_l10n::{Format, Origin, Registry};
//!
//! let registry = Registry::with_defaults();
//! let handler = registry.handler(Format::Ini).unwrap();
//! let document = handler.parse("KEY1=\"Translation\"\n", &Origin::Source).unwrap();
//! assert_eq!(document.entries[0].key, "KEY1");
//! assert_eq!(handler.compile(&document).unwrap(), b"KEY1=\"Translation\"\n");
//! ```

pub mod ini;
pub mod po;
pub mod properties;
pub mod qt;

use std::collections::BTreeMap;

use crate::document::{Document, Entry, Origin};
use crate::error::{FormatError, PseudoError, PseudoResult};
use crate::format::Format;

pub use ini::IniHandler;
pub use po::PoHandler;
pub use properties::PropertiesHandler;
pub use qt::QtHandler;

/// Parser and compiler for one localization format
pub trait FormatHandler: Send + Sync {
    /// The format this handler reads and writes
    fn format(&self) -> Format;

    /// Parse `content` into a document whose values come from `origin`
    ///
    /// With [`Origin::Source`] the values are the source strings; with a
    /// translation origin they are the translations found in the file.
    fn parse(&self, content: &str, origin: &Origin) -> Result<Document, FormatError>;

    /// The text that replaces a template slot holding `value`
    fn render_slot(&self, entry: &Entry, form: usize, value: &str) -> String;

    /// Compile a document back into the bytes of a file (always UTF-8)
    fn compile(&self, document: &Document) -> Result<Vec<u8>, FormatError> {
        if document.format != self.format() {
            return Err(FormatError::FormatMismatch {
                expected: self.format(),
                found: document.format,
            });
        }

        let output = document.template.render(|index, form| {
            let entry = document
                .entries
                .get(index)
                .ok_or(FormatError::MissingEntry { entry: index })?;
            let value = entry
                .values
                .get(form)
                .ok_or(FormatError::MissingForm { entry: index, form })?;
            Ok(self.render_slot(entry, form, value))
        })?;
        Ok(output.into_bytes())
    }
}

/// Creates a fresh handler instance
pub type HandlerFactory = fn() -> Box<dyn FormatHandler>;

/// Explicit mapping from format tag to handler factory
#[derive(Clone)]
pub struct Registry {
    factories: BTreeMap<Format, HandlerFactory>,
}

impl Registry {
    /// A registry without any handler
    pub fn new() -> Self {
        Registry {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the PO, Qt, properties and INI handlers
    pub fn with_defaults() -> Self {
        let mut registry = Registry::new();
        registry
            .register(Format::Po, || Box::new(PoHandler))
            .register(Format::Qt, || Box::new(QtHandler))
            .register(Format::Properties, || Box::new(PropertiesHandler))
            .register(Format::Ini, || Box::new(IniHandler));
        registry
    }

    /// Add or replace the handler factory for `format`
    pub fn register(&mut self, format: Format, factory: HandlerFactory) -> &mut Self {
        self.factories.insert(format, factory);
        self
    }

    /// Instantiate the handler registered for `format`
    pub fn handler(&self, format: Format) -> PseudoResult<Box<dyn FormatHandler>> {
        self.factories
            .get(&format)
            .map(|factory| factory())
            .ok_or_else(|| PseudoError::UnsupportedFormat(format.tag().to_string()))
    }

    /// Formats that have a registered handler
    pub fn formats(&self) -> impl Iterator<Item = Format> + '_ {
        self.factories.keys().copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::with_defaults()
    }
}

/// 1-based line number of a byte offset
pub(crate) fn line_at(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

/// Split a physical line into its text and its line ending
pub(crate) fn split_line_ending(raw: &str) -> (&str, &str) {
    let text = raw.trim_end_matches(['\n', '\r']);
    (text, &raw[text.len()..])
}
