//! GNU gettext catalogs (`.po` / `.pot`)
//!
//! Every `msgstr` (or `msgstr[n]`) keyword together with its continuation
//! lines becomes one template slot. The header entry (`msgid ""` without
//! a context) is kept as literal text, except that its charset is forced
//! to UTF-8 since compiled output is always UTF-8.

use std::sync::LazyLock;

use regex::Regex;

use super::{FormatHandler, split_line_ending};
use crate::document::{Document, Entry, Origin, TemplateBuilder};
use crate::error::FormatError;
use crate::format::Format;

static HEADER_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"charset=[A-Za-z0-9_.:-]+").expect("charset pattern is valid"));

/// Handler for gettext catalogs
#[derive(Debug, Clone, Copy, Default)]
pub struct PoHandler;

/// The string field that continuation lines extend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    None,
    Context,
    Id,
    Plural,
    Str,
}

#[derive(Debug, Default)]
struct PendingEntry {
    comments: Vec<String>,
    context: Option<String>,
    id: Option<String>,
    plural: Option<String>,
    strs: Vec<String>,
}

impl PendingEntry {
    fn is_header(&self) -> bool {
        self.context.is_none() && self.id.as_deref() == Some("")
    }

    fn is_complete(&self) -> bool {
        !self.strs.is_empty()
    }
}

/// Parser state while scanning a catalog line by line
struct PoParser<'a> {
    origin: &'a Origin,
    builder: TemplateBuilder,
    entries: Vec<Entry>,
    pending: PendingEntry,
    field: Field,
}

impl<'a> PoParser<'a> {
    fn new(origin: &'a Origin) -> Self {
        PoParser {
            origin,
            builder: TemplateBuilder::new(),
            entries: Vec::new(),
            pending: PendingEntry::default(),
            field: Field::None,
        }
    }

    fn line(&mut self, raw: &str, number: usize) -> Result<(), FormatError> {
        let (text, ending) = split_line_ending(raw);
        let trimmed = text.trim();

        if trimmed.starts_with('"') {
            return self.continuation(raw, trimmed, number);
        }

        if trimmed.is_empty() || trimmed.starts_with('#') {
            self.finish_if_complete();
            if let Some(comment) = entry_comment(trimmed).filter(|c| !c.is_empty()) {
                self.pending.comments.push(comment.to_string());
            }
            self.builder.push_text(raw);
            return Ok(());
        }

        let (keyword, rest) = trimmed
            .split_once(|c: char| c.is_whitespace())
            .ok_or_else(|| FormatError::syntax(number, format!("unexpected '{}'", trimmed)))?;
        let value = unquote(rest.trim(), number)?;

        match keyword {
            "msgctxt" => {
                self.finish_if_complete();
                self.pending.context = Some(value);
                self.field = Field::Context;
                self.builder.push_text(raw);
            }
            "msgid" => {
                self.finish_if_complete();
                if self.pending.id.is_some() {
                    return Err(FormatError::syntax(number, "msgid without msgstr"));
                }
                self.pending.id = Some(value);
                self.field = Field::Id;
                self.builder.push_text(raw);
            }
            "msgid_plural" => {
                if self.pending.id.is_none() || self.pending.is_complete() {
                    return Err(FormatError::syntax(number, "msgid_plural without msgid"));
                }
                self.pending.plural = Some(value);
                self.field = Field::Plural;
                self.builder.push_text(raw);
            }
            _ if keyword == "msgstr" || keyword.starts_with("msgstr[") => {
                if self.pending.id.is_none() {
                    return Err(FormatError::syntax(number, "msgstr without msgid"));
                }
                self.pending.strs.push(value);
                self.field = Field::Str;
                if self.pending.is_header() {
                    self.push_header_line(raw);
                } else {
                    let form = self.pending.strs.len() - 1;
                    self.builder.push_slot(self.entries.len(), form);
                    self.builder.push_text(ending);
                }
            }
            _ => {
                return Err(FormatError::syntax(
                    number,
                    format!("unknown keyword '{}'", keyword),
                ));
            }
        }
        Ok(())
    }

    fn continuation(&mut self, raw: &str, trimmed: &str, number: usize) -> Result<(), FormatError> {
        let value = unquote(trimmed, number)?;
        let target = match self.field {
            Field::Context => self.pending.context.as_mut(),
            Field::Id => self.pending.id.as_mut(),
            Field::Plural => self.pending.plural.as_mut(),
            Field::Str => self.pending.strs.last_mut(),
            Field::None => None,
        };
        target
            .ok_or_else(|| FormatError::syntax(number, "string outside of an entry"))?
            .push_str(&value);

        // msgstr continuations are replaced by the slot, except in the header
        if self.field != Field::Str {
            self.builder.push_text(raw);
        } else if self.pending.is_header() {
            self.push_header_line(raw);
        }
        Ok(())
    }

    fn push_header_line(&mut self, raw: &str) {
        let line = HEADER_CHARSET.replace(raw, "charset=UTF-8");
        self.builder.push_text(&line);
    }

    fn finish_if_complete(&mut self) {
        if self.pending.is_complete() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        self.field = Field::None;
        if pending.is_header() {
            return;
        }

        let Some(id) = pending.id else {
            return;
        };
        let values = match self.origin {
            Origin::Source => (0..pending.strs.len())
                .map(|form| match (&pending.plural, form) {
                    (Some(plural), form) if form > 0 => plural.clone(),
                    _ => id.clone(),
                })
                .collect(),
            Origin::Translation { .. } => pending.strs,
        };

        self.entries.push(Entry {
            key: id,
            context: pending.context,
            plural_key: pending.plural,
            values,
            comments: pending.comments,
            origin: self.origin.clone(),
        });
    }

    fn end(mut self, last_line: usize) -> Result<Document, FormatError> {
        if self.pending.id.is_some() && !self.pending.is_complete() {
            return Err(FormatError::syntax(last_line, "msgid without msgstr"));
        }
        self.finish_if_complete();
        Ok(Document::new(Format::Po, self.entries, self.builder.build()))
    }
}

/// Text of a translator (`# `) or extracted (`#.`) comment
fn entry_comment(line: &str) -> Option<&str> {
    if let Some(extracted) = line.strip_prefix("#.") {
        return Some(extracted.trim());
    }
    match line.strip_prefix('#') {
        Some(rest) if rest.is_empty() || rest.starts_with(' ') => Some(rest.trim()),
        _ => None,
    }
}

/// Remove the surrounding quotes of a PO string and resolve its escapes
fn unquote(quoted: &str, line: usize) -> Result<String, FormatError> {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| FormatError::syntax(line, format!("malformed string {}", quoted)))?;

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => result.push('\n'),
            Some('t') => result.push('\t'),
            Some('r') => result.push('\r'),
            Some(other) => result.push(other),
            None => return Err(FormatError::syntax(line, "dangling escape")),
        }
    }
    Ok(result)
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

impl FormatHandler for PoHandler {
    fn format(&self) -> Format {
        Format::Po
    }

    fn parse(&self, content: &str, origin: &Origin) -> Result<Document, FormatError> {
        let mut parser = PoParser::new(origin);
        let mut number = 0;
        for raw in content.split_inclusive('\n') {
            number += 1;
            parser.line(raw, number)?;
        }
        parser.end(number)
    }

    fn render_slot(&self, entry: &Entry, form: usize, value: &str) -> String {
        if entry.is_plural() {
            format!("msgstr[{}] \"{}\"", form, escape(value))
        } else {
            format!("msgstr \"{}\"", escape(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"# Test catalog.
#
msgid ""
msgstr ""
"Project-Id-Version: 1.0\n"
"Content-Type: text/plain; charset=CHARSET\n"

#. Title of the map page
#: maps/views.py:12
msgid "Locations"
msgstr ""

msgctxt "menu"
msgid "Open"
msgstr ""

msgid ""
"Say \"hi\"\n"
"twice"
msgstr ""

#, python-format
msgid "%(count)s file"
msgid_plural "%(count)s files"
msgstr[0] ""
msgstr[1] ""
"#;

    #[test]
    fn test_parse_source_entries() {
        let doc = PoHandler.parse(CATALOG, &Origin::Source).unwrap();
        assert_eq!(doc.len(), 4);

        let locations = &doc.entries[0];
        assert_eq!(locations.key, "Locations");
        assert_eq!(locations.values, vec!["Locations"]);
        assert_eq!(locations.comments, vec!["Title of the map page"]);

        assert_eq!(doc.entries[1].context.as_deref(), Some("menu"));
        assert_eq!(doc.entries[2].key, "Say \"hi\"\ntwice");

        let plural = &doc.entries[3];
        assert_eq!(plural.plural_key.as_deref(), Some("%(count)s files"));
        assert_eq!(plural.values, vec!["%(count)s file", "%(count)s files"]);
        assert_eq!(doc.template.slot_count(), 5);
    }

    #[test]
    fn test_round_trip_forces_utf8_charset() {
        let doc = PoHandler.parse(CATALOG, &Origin::Source).unwrap();
        let output = String::from_utf8(PoHandler.compile(&doc).unwrap()).unwrap();
        assert!(output.contains("charset=UTF-8\\n\""));
        assert!(!output.contains("CHARSET"));
        assert!(output.contains("msgid \"Locations\"\nmsgstr \"Locations\"\n"));
        assert!(output.contains("msgstr \"Say \\\"hi\\\"\\ntwice\"\n"));
        assert!(output.contains("msgstr[0] \"%(count)s file\"\nmsgstr[1] \"%(count)s files\"\n"));
        assert!(output.starts_with("# Test catalog.\n#\nmsgid \"\"\nmsgstr \"\"\n"));
    }

    #[test]
    fn test_parse_translations() {
        let catalog = "msgid \"Open\"\nmsgstr \"Ouvrir\"\n\nmsgid \"Close\"\nmsgstr \"\"\n\"Fer\"\n\"mer\"\n";
        let origin = Origin::Translation {
            language: "fr".to_string(),
        };
        let doc = PoHandler.parse(catalog, &origin).unwrap();
        assert_eq!(doc.entries[0].values, vec!["Ouvrir"]);
        assert_eq!(doc.entries[1].values, vec!["Fermer"]);
        assert_eq!(doc.entries[1].origin, origin);

        let output = String::from_utf8(PoHandler.compile(&doc).unwrap()).unwrap();
        assert_eq!(
            output,
            "msgid \"Open\"\nmsgstr \"Ouvrir\"\n\nmsgid \"Close\"\nmsgstr \"Fermer\"\n"
        );
    }

    #[test]
    fn test_last_entry_without_newline() {
        let doc = PoHandler
            .parse("msgid \"Yes\"\nmsgstr \"\"", &Origin::Source)
            .unwrap();
        let output = PoHandler.compile(&doc).unwrap();
        assert_eq!(output, b"msgid \"Yes\"\nmsgstr \"Yes\"");
    }

    #[test]
    fn test_obsolete_entries_stay_literal() {
        let catalog = "msgid \"Yes\"\nmsgstr \"\"\n\n#~ msgid \"No\"\n#~ msgstr \"Non\"\n";
        let doc = PoHandler.parse(catalog, &Origin::Source).unwrap();
        assert_eq!(doc.len(), 1);
        let output = String::from_utf8(PoHandler.compile(&doc).unwrap()).unwrap();
        assert!(output.ends_with("#~ msgid \"No\"\n#~ msgstr \"Non\"\n"));
    }

    #[test]
    fn test_syntax_errors() {
        let err = PoHandler
            .parse("msgid \"a\"\nmsgstr \"b\n", &Origin::Source)
            .unwrap_err();
        assert!(matches!(err, FormatError::Syntax { line: 2, .. }));

        let err = PoHandler.parse("msgstr \"b\"\n", &Origin::Source).unwrap_err();
        assert!(matches!(err, FormatError::Syntax { line: 1, .. }));

        let err = PoHandler
            .parse("msgid \"a\"\n\nmsgid \"b\"\nmsgstr \"\"\n", &Origin::Source)
            .unwrap_err();
        assert!(matches!(err, FormatError::Syntax { line: 3, .. }));

        let err = PoHandler.parse("msgid \"a\"\n", &Origin::Source).unwrap_err();
        assert!(matches!(err, FormatError::Syntax { line: 1, .. }));

        let err = PoHandler.parse("\"orphan\"\n", &Origin::Source).unwrap_err();
        assert!(matches!(err, FormatError::Syntax { line: 1, .. }));

        let err = PoHandler.parse("bogus\n", &Origin::Source).unwrap_err();
        assert!(matches!(err, FormatError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a\"b\\c\nd\te"), "a\\\"b\\\\c\\nd\\te");
        assert_eq!(unquote(r#""a\"b\\c\nd""#, 1).unwrap(), "a\"b\\c\nd");
    }
}
