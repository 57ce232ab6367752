//! Joomla INI language files
//!
//! Lines look like `KEY="value"`. Joomla writes an embedded double quote
//! as `"_QQ_"`. Values are always written back quoted, which also turns
//! old unquoted files into the quoted form current Joomla expects.

use super::{FormatHandler, split_line_ending};
use crate::document::{Document, Entry, Origin, TemplateBuilder};
use crate::error::FormatError;
use crate::format::Format;

const QUOTE_ESCAPE: &str = "\"_QQ_\"";

/// Handler for Joomla INI files
#[derive(Debug, Clone, Copy, Default)]
pub struct IniHandler;

type Span = (usize, usize);

/// Byte span of the raw value (without quotes) and of the whole value
/// token (with quotes) inside a `KEY=value` line
fn value_bounds(line: &str, equals: usize, number: usize) -> Result<(Span, Span), FormatError> {
    let after = &line[equals + 1..];
    let start = equals + 1 + (after.len() - after.trim_start().len());
    let token = line[start..].trim_end();
    let end = start + token.len();

    if !token.starts_with('"') {
        return Ok(((start, end), (start, end)));
    }
    match token.rfind('"') {
        Some(close) if close > 0 => Ok(((start + 1, start + close), (start, start + close + 1))),
        _ => Err(FormatError::syntax(number, "unterminated quoted value")),
    }
}

impl FormatHandler for IniHandler {
    fn format(&self) -> Format {
        Format::Ini
    }

    fn parse(&self, content: &str, origin: &Origin) -> Result<Document, FormatError> {
        let mut builder = TemplateBuilder::new();
        let mut entries = Vec::new();
        let mut comments = Vec::new();
        let mut section: Option<String> = None;

        for (index, raw) in content.split_inclusive('\n').enumerate() {
            let number = index + 1;
            let (text, _) = split_line_ending(raw);
            let trimmed = text.trim();

            if trimmed.is_empty() {
                comments.clear();
                builder.push_text(raw);
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix([';', '#']) {
                comments.push(comment.trim().to_string());
                builder.push_text(raw);
                continue;
            }
            if let Some(name) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
                section = Some(name.trim().to_string());
                builder.push_text(raw);
                continue;
            }

            let equals = text.find('=').ok_or_else(|| {
                FormatError::syntax(number, format!("expected KEY=\"value\", found '{}'", trimmed))
            })?;
            let key = text[..equals].trim();
            if key.is_empty() {
                return Err(FormatError::syntax(number, "empty key"));
            }
            let ((value_start, value_end), (token_start, token_end)) =
                value_bounds(text, equals, number)?;

            builder.push_text(&text[..token_start]);
            builder.push_slot(entries.len(), 0);
            builder.push_text(&raw[token_end..]);

            entries.push(Entry {
                key: key.to_string(),
                context: section.clone(),
                plural_key: None,
                values: vec![text[value_start..value_end].replace(QUOTE_ESCAPE, "\"")],
                comments: std::mem::take(&mut comments),
                origin: origin.clone(),
            });
        }

        Ok(Document::new(Format::Ini, entries, builder.build()))
    }

    fn render_slot(&self, _entry: &Entry, _form: usize, value: &str) -> String {
        format!("\"{}\"", value.replace('"', QUOTE_ESCAPE))
    }
}
