//! Localization file formats known to the pseudo-translation pipeline
//!
//! A [`Format`] is the tag that selects a handler from the
//! [`Registry`](crate::handlers::Registry). Each format also knows which
//! runtime variables may appear in its strings, so that character-level
//! pseudo types can leave them untouched.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PseudoError;

/// printf-style conversions used by gettext catalogs and Joomla INI files:
/// `%s`, `%d`, `%1$s`, `%(name)s`, `%.2f`, `%%`, and python brace fields.
/// The space flag is left out so that prose like `50% off` is not a
/// conversion.
static PRINTF_VARIABLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"%(?:\d+\$|\([A-Za-z_][\w.]*\))?[-+#0']*(?:\d+|\*)?(?:\.(?:\d+|\*))?(?:hh|h|ll|l|L|q|j|z|t)?[diouxXeEfFgGaAcrsp%]|\{[A-Za-z0-9_.]*\}",
    )
    .expect("printf variable pattern is valid")
});

/// Qt placeholders: `%1`, `%L1`, `%n`
static QT_VARIABLES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%L?\d+|%n").expect("Qt variable pattern is valid"));

/// java.text.MessageFormat arguments: `{0}`, `{1,number,#.##}`
static MESSAGE_FORMAT_VARIABLES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\d+(?:,[^{}]*)?\}").expect("MessageFormat variable pattern is valid")
});

/// File format of a localization resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Format {
    /// GNU gettext catalogs (`.po`, `.pot`)
    Po,
    /// Qt Linguist translation sources (`.ts`)
    Qt,
    /// Java properties files
    Properties,
    /// Joomla INI language files
    Ini,
}

impl Format {
    /// Every supported format, in registration order
    pub const ALL: [Format; 4] = [Format::Po, Format::Qt, Format::Properties, Format::Ini];

    /// The upper-case tag used in configuration and API requests
    pub fn tag(&self) -> &'static str {
        match self {
            Format::Po => "PO",
            Format::Qt => "QT",
            Format::Properties => "PROPERTIES",
            Format::Ini => "INI",
        }
    }

    /// Mimetype of compiled files of this format
    pub fn mimetype(&self) -> &'static str {
        match self {
            Format::Po => "text/x-po",
            Format::Qt => "application/x-linguist",
            Format::Properties => "text/x-java-properties",
            Format::Ini => "text/x-joomla-ini",
        }
    }

    /// Detect a format from a file extension (without the dot)
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension.to_ascii_lowercase().as_str() {
            "po" | "pot" => Some(Format::Po),
            "ts" => Some(Format::Qt),
            "properties" => Some(Format::Properties),
            "ini" => Some(Format::Ini),
            _ => None,
        }
    }

    /// Detect a format from a file path's extension
    pub fn from_path(path: &Path) -> Option<Format> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Format::from_extension)
    }

    /// Pattern matching the runtime variables of strings in this format
    pub fn variables(&self) -> &'static Regex {
        match self {
            Format::Po | Format::Ini => &PRINTF_VARIABLES,
            Format::Qt => &QT_VARIABLES,
            Format::Properties => &MESSAGE_FORMAT_VARIABLES,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Format {
    type Err = PseudoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim();
        Format::ALL
            .into_iter()
            .find(|format| format.tag().eq_ignore_ascii_case(tag))
            .ok_or_else(|| PseudoError::UnsupportedFormat(tag.to_string()))
    }
}
