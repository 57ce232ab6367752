//! Compilation pipeline
//!
//! Glues a [`Registry`] of format handlers to the pseudo types: parse a
//! file, pseudo-translate every value, and compile the result back into
//! the original format.
//!
//! # Example
//!
//! ```
//! use pseudo_l10n::{Format, Pipeline, PseudoType};
//!
//! let pipeline = Pipeline::default();
//! let output = pipeline
//!     .pseudo_translate_content(
//!         Format::Po,
//!         "msgid \"Locations\"\nmsgstr \"\"\n",
//!         PseudoType::Brackets,
//!     )
//!     .unwrap();
//! assert!(output.contains("msgstr \"[Locations]\""));
//! ```

use std::sync::LazyLock;

use regex::bytes::Regex;
use tracing::debug;

use crate::document::{Document, Origin};
use crate::error::{PseudoError, PseudoResult};
use crate::format::Format;
use crate::handlers::Registry;
use crate::pseudo::PseudoType;

/// Pseudo-translate every value of `document`
///
/// Entries are transformed independently of one another. Variables of the
/// document's format are preserved by character-level pseudo types.
pub fn pseudo_translate(document: &Document, kind: PseudoType) -> Document {
    let variables = document.format.variables();
    document.map_values(|value| kind.apply_protected(value, variables))
}

static DECLARED_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"charset=([A-Za-z0-9_.:-]+)").expect("charset pattern is valid")
});

/// Decode the raw bytes of a localization file
///
/// UTF-8 is accepted for every format. Otherwise ISO-8859-1 is used for
/// properties files (the Java default) and for PO catalogs whose header
/// declares it; any other encoding is a [`PseudoError::Decoding`] error.
pub fn decode_content(format: Format, bytes: Vec<u8>) -> PseudoResult<String> {
    let err = match String::from_utf8(bytes) {
        Ok(content) => return Ok(content),
        Err(err) => err,
    };

    let latin1 = match format {
        Format::Properties => true,
        Format::Po => DECLARED_CHARSET
            .captures(err.as_bytes())
            .and_then(|c| c.get(1))
            .is_some_and(|charset| {
                matches!(
                    charset.as_bytes().to_ascii_lowercase().as_slice(),
                    b"iso-8859-1" | b"iso8859-1" | b"latin1" | b"latin-1"
                )
            }),
        Format::Qt | Format::Ini => false,
    };
    if !latin1 {
        return Err(err.into());
    }
    debug!(%format, "decoding input as ISO-8859-1");
    Ok(err.as_bytes().iter().map(|&b| char::from(b)).collect())
}

/// Parses, pseudo-translates and compiles documents
#[derive(Clone, Default)]
pub struct Pipeline {
    registry: Registry,
}

impl Pipeline {
    pub fn new(registry: Registry) -> Self {
        Pipeline { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse `content` with the handler registered for `format`
    pub fn parse(&self, format: Format, content: &str, origin: &Origin) -> PseudoResult<Document> {
        let handler = self.registry.handler(format)?;
        let document = handler
            .parse(content, origin)
            .map_err(|source| PseudoError::Parse { format, source })?;
        debug!(%format, entries = document.len(), "parsed document");
        Ok(document)
    }

    /// Compile a document as is, without pseudo-translating it
    pub fn render(&self, document: &Document) -> PseudoResult<String> {
        let handler = self.registry.handler(document.format)?;
        let bytes = handler
            .compile(document)
            .map_err(PseudoError::Compilation)?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Pseudo-translate a document and compile it, checking that the
    /// output is valid UTF-8
    pub fn compile_to_string(&self, document: &Document, kind: PseudoType) -> PseudoResult<String> {
        debug!(
            format = %document.format,
            pseudo_type = %kind,
            entries = document.len(),
            "compiling pseudo translation"
        );
        let translated = pseudo_translate(document, kind);
        self.render(&translated)
    }

    /// Like [`Pipeline::compile_to_string`], returning the encoded bytes
    pub fn compile(&self, document: &Document, kind: PseudoType) -> PseudoResult<Vec<u8>> {
        self.compile_to_string(document, kind).map(String::into_bytes)
    }

    /// Parse source `content` and return its pseudo-translated compilation
    pub fn pseudo_translate_content(
        &self,
        format: Format,
        content: &str,
        kind: PseudoType,
    ) -> PseudoResult<String> {
        let document = self.parse(format, content, &Origin::Source)?;
        self.compile_to_string(&document, kind)
    }
}
