//! In-memory representation of a parsed localization file
//!
//! Parsing a file yields a [`Document`]: the translatable [`Entry`] values
//! plus a [`Template`] of the original file in which every value position
//! has been replaced by a slot. Compiling fills the slots back in, so
//! comments, headers, separators and markup survive untouched.

use serde::Serialize;

use crate::error::FormatError;
use crate::format::Format;

/// Where the values of an entry come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Origin {
    /// Values are the source strings themselves
    Source,
    /// Values are translations into `language`
    Translation { language: String },
}

/// One translatable unit of a localization file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// msgid, Qt `<source>` text, or property key
    pub key: String,
    /// msgctxt, Qt context name, or INI section
    pub context: Option<String>,
    /// msgid_plural for entries with plural forms
    pub plural_key: Option<String>,
    /// One value per plural form; `values[0]` is the singular
    pub values: Vec<String>,
    /// Translator and extracted comments attached to the entry
    pub comments: Vec<String>,
    pub origin: Origin,
}

impl Entry {
    /// A source entry with a single value
    pub fn new(key: &str, value: &str) -> Self {
        Entry {
            key: key.to_string(),
            context: None,
            plural_key: None,
            values: vec![value.to_string()],
            comments: Vec::new(),
            origin: Origin::Source,
        }
    }

    pub fn with_context(mut self, context: &str) -> Self {
        self.context = Some(context.to_string());
        self
    }

    /// The singular value, empty when the entry has none
    pub fn text(&self) -> &str {
        self.values.first().map(String::as_str).unwrap_or_default()
    }

    pub fn is_plural(&self) -> bool {
        self.plural_key.is_some()
    }
}

/// A piece of a [`Template`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Copied to the output verbatim
    Text(String),
    /// Filled with plural form `form` of entry number `entry`
    Slot { entry: usize, form: usize },
}

/// The original file with every translatable value replaced by a slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of slots in the template
    pub fn slot_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Slot { .. }))
            .count()
    }

    /// Render the template, asking `fill` for the text of every slot
    pub fn render<F>(&self, mut fill: F) -> Result<String, FormatError>
    where
        F: FnMut(usize, usize) -> Result<String, FormatError>,
    {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Slot { entry, form } => output.push_str(&fill(*entry, *form)?),
            }
        }
        Ok(output)
    }
}

/// Incrementally assembles a [`Template`] while a handler scans its input
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    segments: Vec<Segment>,
}

impl TemplateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append literal text, merging it with a preceding literal
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(last)) = self.segments.last_mut() {
            last.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }

    pub fn push_slot(&mut self, entry: usize, form: usize) {
        self.segments.push(Segment::Slot { entry, form });
    }

    pub fn build(self) -> Template {
        Template {
            segments: self.segments,
        }
    }
}

/// A parsed localization file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub format: Format,
    pub entries: Vec<Entry>,
    pub template: Template,
}

impl Document {
    pub fn new(format: Format, entries: Vec<Entry>, template: Template) -> Self {
        Document {
            format,
            entries,
            template,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by key and optional context
    pub fn find(&self, key: &str, context: Option<&str>) -> Option<&Entry> {
        self.entries
            .iter()
            .find(|entry| entry.key == key && entry.context.as_deref() == context)
    }

    /// A copy of this document with every value passed through `transform`
    ///
    /// Each value is transformed on its own; the template is shared
    /// unchanged.
    pub fn map_values<F>(&self, mut transform: F) -> Document
    where
        F: FnMut(&str) -> String,
    {
        let entries = self
            .entries
            .iter()
            .map(|entry| Entry {
                values: entry.values.iter().map(|value| transform(value)).collect(),
                ..entry.clone()
            })
            .collect();
        Document {
            format: self.format,
            entries,
            template: self.template.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        let mut builder = TemplateBuilder::new();
        builder.push_text("a=");
        builder.push_slot(0, 0);
        builder.push_text("\n");
        builder.push_text("b=");
        builder.push_slot(1, 0);
        builder.push_text("\n");
        Document::new(
            Format::Properties,
            vec![Entry::new("a", "Apple"), Entry::new("b", "Banana")],
            builder.build(),
        )
    }

    #[test]
    fn test_builder_merges_text() {
        let doc = sample();
        assert_eq!(
            doc.template.segments(),
            &[
                Segment::Text("a=".to_string()),
                Segment::Slot { entry: 0, form: 0 },
                Segment::Text("\nb=".to_string()),
                Segment::Slot { entry: 1, form: 0 },
                Segment::Text("\n".to_string()),
            ]
        );
        assert_eq!(doc.template.slot_count(), 2);
    }

    #[test]
    fn test_render_fills_slots() {
        let doc = sample();
        let output = doc
            .template
            .render(|entry, form| Ok(doc.entries[entry].values[form].clone()))
            .unwrap();
        assert_eq!(output, "a=Apple\nb=Banana\n");
    }

    #[test]
    fn test_render_propagates_errors() {
        let doc = sample();
        let err = doc
            .template
            .render(|entry, _| Err(FormatError::MissingEntry { entry }))
            .unwrap_err();
        assert_eq!(err, FormatError::MissingEntry { entry: 0 });
    }

    #[test]
    fn test_map_values_is_per_entry() {
        let doc = sample();
        let upper = doc.map_values(|value| value.to_uppercase());
        assert_eq!(upper.entries[0].values, vec!["APPLE"]);
        assert_eq!(upper.entries[1].values, vec!["BANANA"]);
        assert_eq!(upper.entries[0].key, "a");
        assert_eq!(upper.template, doc.template);
        // The original document is left alone
        assert_eq!(doc.entries[0].text(), "Apple");
    }

    #[test]
    fn test_find() {
        let mut doc = sample();
        doc.entries.push(Entry::new("a", "Avocado").with_context("fruit"));
        assert_eq!(doc.find("a", None).unwrap().text(), "Apple");
        assert_eq!(doc.find("a", Some("fruit")).unwrap().text(), "Avocado");
        assert!(doc.find("c", None).is_none());
        assert_eq!(doc.len(), 3);
        assert!(!doc.is_empty());
    }

    #[test]
    fn test_entry_text_without_values() {
        let mut entry = Entry::new("k", "v");
        entry.values.clear();
        assert_eq!(entry.text(), "");
        assert!(!entry.is_plural());
    }
}
