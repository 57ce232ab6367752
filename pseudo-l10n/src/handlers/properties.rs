//! Java properties files
//!
//! The key and its separator are kept as written; the value of every
//! logical line (including backslash continuations) is a slot. Output is
//! UTF-8, so non-ASCII text is written as is instead of `\uXXXX` escapes.

use super::{FormatHandler, split_line_ending};
use crate::document::{Document, Entry, Origin, TemplateBuilder};
use crate::error::FormatError;
use crate::format::Format;

/// Handler for Java properties files
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesHandler;

/// Characters that may separate a key from its value
fn is_separator_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\u{c}')
}

/// A line that ends in an odd number of backslashes continues on the next
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Byte offsets of the key start, key end and value start of a key line
fn split_key(line: &str) -> (usize, usize, usize) {
    let key_start = line.len() - line.trim_start_matches(is_separator_space).len();
    let mut key_end = line.len();
    let mut escaped = false;
    for (offset, c) in line[key_start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                key_end = key_start + offset;
                break;
            }
            c if is_separator_space(c) => {
                key_end = key_start + offset;
                break;
            }
            _ => {}
        }
    }

    let rest = &line[key_end..];
    let after_space = rest.trim_start_matches(is_separator_space);
    let after_separator = after_space
        .strip_prefix(['=', ':'])
        .map(|s| s.trim_start_matches(is_separator_space))
        .unwrap_or(after_space);
    let value_start = line.len() - after_separator.len();
    (key_start, key_end, value_start)
}

/// Resolve Java escapes, including `\uXXXX` and surrogate pairs
fn unescape(raw: &str, line: usize) -> Result<String, FormatError> {
    let mut result = String::with_capacity(raw.len());
    let mut units: Vec<u16> = Vec::new();
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            flush_units(&mut result, &mut units);
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                let unit = Some(&hex)
                    .filter(|h| h.len() == 4 && h.chars().all(|c| c.is_ascii_hexdigit()))
                    .and_then(|h| u16::from_str_radix(h, 16).ok())
                    .ok_or_else(|| {
                        FormatError::syntax(line, format!("malformed \\u escape '\\u{}'", hex))
                    })?;
                units.push(unit);
            }
            Some(other) => {
                flush_units(&mut result, &mut units);
                result.push(match other {
                    't' => '\t',
                    'n' => '\n',
                    'r' => '\r',
                    'f' => '\u{c}',
                    other => other,
                });
            }
            None => flush_units(&mut result, &mut units),
        }
    }
    flush_units(&mut result, &mut units);
    Ok(result)
}

fn flush_units(result: &mut String, units: &mut Vec<u16>) {
    result.extend(
        char::decode_utf16(units.drain(..)).map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER)),
    );
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for (index, c) in value.chars().enumerate() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            '\u{c}' => escaped.push_str("\\f"),
            ' ' if index == 0 => escaped.push_str("\\ "),
            other => escaped.push(other),
        }
    }
    escaped
}

impl FormatHandler for PropertiesHandler {
    fn format(&self) -> Format {
        Format::Properties
    }

    fn parse(&self, content: &str, origin: &Origin) -> Result<Document, FormatError> {
        let mut builder = TemplateBuilder::new();
        let mut entries = Vec::new();
        let mut comments = Vec::new();
        let mut lines = content.split_inclusive('\n').enumerate();

        while let Some((index, raw)) = lines.next() {
            let number = index + 1;
            let (text, ending) = split_line_ending(raw);
            let trimmed = text.trim_start_matches(is_separator_space);

            if trimmed.is_empty() {
                comments.clear();
                builder.push_text(raw);
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix(['#', '!']) {
                comments.push(comment.trim().to_string());
                builder.push_text(raw);
                continue;
            }

            // Join continuation lines before the key is split off, since
            // the key itself may continue on the next line
            let mut logical = text.to_string();
            let mut line_ending = ending;
            while continues(&logical) {
                logical.pop();
                let Some((_, next)) = lines.next() else {
                    break;
                };
                let (next_text, next_ending) = split_line_ending(next);
                logical.push_str(next_text.trim_start_matches(is_separator_space));
                line_ending = next_ending;
            }

            let (key_start, key_end, value_start) = split_key(&logical);
            let key = unescape(&logical[key_start..key_end], number)?;
            let value = unescape(&logical[value_start..], number)?;

            builder.push_text(&logical[..value_start]);
            builder.push_slot(entries.len(), 0);
            builder.push_text(line_ending);

            entries.push(Entry {
                key,
                context: None,
                plural_key: None,
                values: vec![value],
                comments: std::mem::take(&mut comments),
                origin: origin.clone(),
            });
        }

        Ok(Document::new(Format::Properties, entries, builder.build()))
    }

    fn render_slot(&self, _entry: &Entry, _form: usize, value: &str) -> String {
        escape(value)
    }
}
