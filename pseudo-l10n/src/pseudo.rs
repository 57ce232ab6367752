//! Pseudo-translation strategies
//!
//! A pseudo type turns a source string into a visibly different but still
//! readable string. Loading a pseudo-translated catalog into an application
//! makes hard-coded strings (which stay untouched), truncated layouts and
//! encoding problems easy to spot before any real translation exists.
//!
//! | Pseudo type | "Translation" becomes   |
//! |-------------|-------------------------|
//! | `XXX`       | `xxxTranslationxxx`     |
//! | `BRACKETS`  | `[Translation]`         |
//! | `UNICODE`   | `Ŧřȧƞşŀȧŧīǿƞ`           |
//! | `PLANGUAGE` | `Tråקånslåקåtïôקïôn`    |
//!
//! # Example
//!
//! ```
//! use pseudo_l10n::PseudoType;
//!
//! assert_eq!(PseudoType::Brackets.apply("Locations"), "[Locations]");
//! assert_eq!(PseudoType::Xxx.apply("START"), "xxxSTARTxxx");
//! ```

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::PseudoError;

/// Letter inserted between repeated vowel groups by [`PseudoType::PLanguage`]
const PLANGUAGE_MARKER: char = '\u{05E7}';

/// Word rendered by each pseudo type when describing itself
const EXAMPLE_WORD: &str = "Translation";

/// The pseudo-translation strategy to apply to every translatable string
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PseudoType {
    /// Surround the text with `xxx` markers
    Xxx,
    /// Surround the text with square brackets
    Brackets,
    /// Replace every ASCII letter with an accented look-alike
    Unicode,
    /// "P language": repeat each vowel group around a Hebrew qof
    PLanguage,
}

impl PseudoType {
    /// Every pseudo type, in the order they are offered to users
    pub const ALL: [PseudoType; 4] = [
        PseudoType::Xxx,
        PseudoType::Brackets,
        PseudoType::Unicode,
        PseudoType::PLanguage,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PseudoType::Xxx => "XXX",
            PseudoType::Brackets => "BRACKETS",
            PseudoType::Unicode => "UNICODE",
            PseudoType::PLanguage => "PLANGUAGE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PseudoType::Xxx => "Wraps each string in 'xxx' markers",
            PseudoType::Brackets => "Wraps each string in square brackets",
            PseudoType::Unicode => "Replaces letters with accented Unicode look-alikes",
            PseudoType::PLanguage => {
                "Doubles vowel groups around a Hebrew letter to simulate text expansion and mixed scripts"
            }
        }
    }

    /// How this pseudo type renders the word "Translation"
    pub fn example(&self) -> String {
        self.apply(EXAMPLE_WORD)
    }

    /// Whether the strategy wraps the whole string rather than rewriting
    /// individual characters
    pub fn is_wrapping(&self) -> bool {
        matches!(self, PseudoType::Xxx | PseudoType::Brackets)
    }

    /// Pseudo-translate `text` without any variable protection
    pub fn apply(&self, text: &str) -> String {
        match self {
            PseudoType::Xxx => format!("xxx{}xxx", text),
            PseudoType::Brackets => format!("[{}]", text),
            PseudoType::Unicode => text.chars().map(unicode_lookalike).collect(),
            PseudoType::PLanguage => planguage(text),
        }
    }

    /// Pseudo-translate `text`, leaving every match of `variables` intact
    ///
    /// Wrapping strategies keep the whole string (variables included)
    /// between their markers. Character-level strategies only rewrite the
    /// text between variables, so `%s` never turns into `%ş`.
    pub fn apply_protected(&self, text: &str, variables: &Regex) -> String {
        if self.is_wrapping() {
            return self.apply(text);
        }

        let mut result = String::with_capacity(text.len() * 2);
        let mut last = 0;
        for variable in variables.find_iter(text) {
            result.push_str(&self.apply(&text[last..variable.start()]));
            result.push_str(variable.as_str());
            last = variable.end();
        }
        result.push_str(&self.apply(&text[last..]));
        result
    }
}

impl fmt::Display for PseudoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PseudoType {
    type Err = PseudoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        PseudoType::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| PseudoError::UnsupportedStrategy(name.to_string()))
    }
}

/// Visually similar non-ASCII replacement for an ASCII letter
fn unicode_lookalike(c: char) -> char {
    match c {
        'a' => 'ȧ',
        'b' => 'ƀ',
        'c' => 'ƈ',
        'd' => 'ḓ',
        'e' => 'ḗ',
        'f' => 'ƒ',
        'g' => 'ɠ',
        'h' => 'ħ',
        'i' => 'ī',
        'j' => 'ĵ',
        'k' => 'ķ',
        'l' => 'ŀ',
        'm' => 'ḿ',
        'n' => 'ƞ',
        'o' => 'ǿ',
        'p' => 'ƥ',
        'q' => 'ɋ',
        'r' => 'ř',
        's' => 'ş',
        't' => 'ŧ',
        'u' => 'ŭ',
        'v' => 'ṽ',
        'w' => 'ẇ',
        'x' => 'ẋ',
        'y' => 'ẏ',
        'z' => 'ẑ',
        'A' => 'Ȧ',
        'B' => 'Ɓ',
        'C' => 'Ƈ',
        'D' => 'Ḓ',
        'E' => 'Ḗ',
        'F' => 'Ƒ',
        'G' => 'Ɠ',
        'H' => 'Ħ',
        'I' => 'Ī',
        'J' => 'Ĵ',
        'K' => 'Ķ',
        'L' => 'Ŀ',
        'M' => 'Ḿ',
        'N' => 'Ƞ',
        'O' => 'Ǿ',
        'P' => 'Ƥ',
        'Q' => 'Ɋ',
        'R' => 'Ř',
        'S' => 'Ş',
        'T' => 'Ŧ',
        'U' => 'Ŭ',
        'V' => 'Ṽ',
        'W' => 'Ẇ',
        'X' => 'Ẋ',
        'Y' => 'Ẏ',
        'Z' => 'Ẑ',
        other => other,
    }
}

/// Accented form of an ASCII vowel, `None` for anything else
fn accented_vowel(c: char) -> Option<char> {
    match c {
        'a' => Some('å'),
        'e' => Some('é'),
        'i' => Some('ï'),
        'o' => Some('ô'),
        'u' => Some('ü'),
        'A' => Some('Å'),
        'E' => Some('É'),
        'I' => Some('Ï'),
        'O' => Some('Ô'),
        'U' => Some('Ü'),
        _ => None,
    }
}

/// Every maximal vowel run `v` becomes `v'קv'`, with `v'` the accented run:
/// "Locations" -> "Lôקôcåקåtïôקïôns"
fn planguage(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 3);
    let mut group = String::new();

    for c in text.chars() {
        match accented_vowel(c) {
            Some(accented) => group.push(accented),
            None => {
                flush_vowel_group(&mut result, &mut group);
                result.push(c);
            }
        }
    }
    flush_vowel_group(&mut result, &mut group);
    result
}

fn flush_vowel_group(result: &mut String, group: &mut String) {
    if group.is_empty() {
        return;
    }
    result.push_str(group);
    result.push(PLANGUAGE_MARKER);
    result.push_str(group);
    group.clear();
}
