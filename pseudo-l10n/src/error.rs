use std::string::FromUtf8Error;

use thiserror::Error;

use crate::format::Format;

/// Errors raised by a format handler while parsing or compiling a document
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The input could not be read as the declared format
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    /// A document was handed to the handler of another format
    #[error("cannot compile a {found} document with the {expected} handler")]
    FormatMismatch { expected: Format, found: Format },
    /// A template slot points at an entry the document no longer has
    #[error("template refers to missing entry #{entry}")]
    MissingEntry { entry: usize },
    /// A template slot points at a plural form the entry does not carry
    #[error("entry #{entry} has no value for plural form {form}")]
    MissingForm { entry: usize, form: usize },
}

impl FormatError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        FormatError::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Errors surfaced by the pseudo-translation pipeline
#[derive(Debug, Error)]
pub enum PseudoError {
    /// The requested pseudo type is not one of the known strategies
    #[error("unsupported pseudo type '{0}'")]
    UnsupportedStrategy(String),
    /// No handler is known for the requested format
    #[error("unsupported format '{0}'")]
    UnsupportedFormat(String),
    /// The source content could not be parsed
    #[error("failed to parse {format} content: {source}")]
    Parse {
        format: Format,
        #[source]
        source: FormatError,
    },
    /// The handler could not render the transformed document
    #[error("compilation failed: {0}")]
    Compilation(#[source] FormatError),
    /// The compiled output is not valid UTF-8
    #[error("compiled output is not valid UTF-8: {0}")]
    Decoding(#[from] FromUtf8Error),
    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pseudo-translation operations
pub type PseudoResult<T> = Result<T, PseudoError>;
