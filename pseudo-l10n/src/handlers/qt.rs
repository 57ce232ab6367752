//! Qt Linguist translation sources (`.ts`)
//!
//! The file is read with `quick_xml`'s event reader, and the byte offsets
//! of each event are used to keep the original markup byte for byte. Each
//! `<translation>` element of a message becomes a slot and is always
//! written back without its `type="unfinished"` attribute. Messages marked
//! `numerus="yes"` get one slot per `<numerusform>`. Comments, CDATA
//! sections and obsolete or vanished messages are copied through as is.

use quick_xml::Reader;
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesStart, Event};

use super::{FormatHandler, line_at};
use crate::document::{Document, Entry, Origin, TemplateBuilder};
use crate::error::FormatError;
use crate::format::Format;

/// Handler for Qt Linguist files
#[derive(Debug, Clone, Copy, Default)]
pub struct QtHandler;

/// Element whose text is being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ContextName,
    Source,
    Comment,
    Translation,
    NumerusForm,
}

/// Byte span of one `<numerusform>` element and its text
#[derive(Debug)]
struct FormScan {
    start: usize,
    end: usize,
    text: String,
}

#[derive(Debug, Default)]
struct TranslationScan {
    /// Offset of `<translation`
    start: usize,
    /// Offset just past the opening tag
    open_end: usize,
    /// Offset of `</translation>`, or `end` for an empty element
    close_start: usize,
    /// Offset just past the element
    end: usize,
    text: String,
    forms: Vec<FormScan>,
}

#[derive(Debug, Default)]
struct MessageScan {
    numerus: bool,
    obsolete: bool,
    source: Option<String>,
    comments: Vec<String>,
    translation: Option<TranslationScan>,
}

struct QtParser<'a> {
    content: &'a str,
    origin: &'a Origin,
    builder: TemplateBuilder,
    entries: Vec<Entry>,
    /// Byte offset up to which `content` has been copied into the template
    cursor: usize,
    context: Option<String>,
    message: Option<MessageScan>,
    field: Option<Field>,
    text: String,
    has_root: bool,
}

fn syntax_error(content: &str, offset: usize, message: impl ToString) -> FormatError {
    FormatError::syntax(line_at(content, offset.min(content.len())), message.to_string())
}

/// Whether attribute `name` of `tag` has one of `values`
fn attribute_is(
    tag: &BytesStart<'_>,
    name: &str,
    values: &[&str],
    content: &str,
    offset: usize,
) -> Result<bool, FormatError> {
    let attribute = tag
        .try_get_attribute(name)
        .map_err(|e| syntax_error(content, offset, e))?;
    Ok(attribute.is_some_and(|a| values.iter().any(|v| a.value.as_ref() == v.as_bytes())))
}

impl<'a> QtParser<'a> {
    fn new(content: &'a str, origin: &'a Origin) -> Self {
        QtParser {
            content,
            origin,
            builder: TemplateBuilder::new(),
            entries: Vec::new(),
            cursor: 0,
            context: None,
            message: None,
            field: None,
            text: String::new(),
            has_root: false,
        }
    }

    /// Copy the original content up to `offset` into the template
    fn copy_until(&mut self, offset: usize) {
        self.builder.push_text(&self.content[self.cursor..offset]);
        self.cursor = offset;
    }

    /// Offset of the `<` that opens the markup ending at `end`
    fn tag_start(&self, end: usize) -> usize {
        self.content[..end].rfind('<').unwrap_or(end)
    }

    fn parse(mut self) -> Result<Document, FormatError> {
        let content = self.content;
        let mut reader = Reader::from_str(content);

        loop {
            let position = reader.buffer_position() as usize;
            let event = reader
                .read_event()
                .map_err(|e| syntax_error(content, reader.error_position() as usize, e))?;
            let end = reader.buffer_position() as usize;

            match event {
                Event::Start(tag) => self.start(&tag, self.tag_start(end), end, false)?,
                Event::Empty(tag) => self.start(&tag, self.tag_start(end), end, true)?,
                Event::End(tag) => {
                    let start = self.tag_start(end);
                    self.end(tag.name().as_ref(), start, end)?;
                }
                Event::Text(text) if self.field.is_some() => {
                    let text = text
                        .unescape()
                        .map_err(|e| syntax_error(content, position, e))?;
                    self.text.push_str(&text);
                }
                Event::CData(data) if self.field.is_some() => {
                    self.text.push_str(&String::from_utf8_lossy(&data));
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !self.has_root {
            return Err(FormatError::syntax(1, "missing <TS> root element"));
        }
        self.copy_until(content.len());
        Ok(Document::new(Format::Qt, self.entries, self.builder.build()))
    }

    fn start(
        &mut self,
        tag: &BytesStart<'_>,
        start: usize,
        end: usize,
        empty: bool,
    ) -> Result<(), FormatError> {
        let content = self.content;
        match tag.name().as_ref() {
            b"TS" => self.has_root = true,
            b"context" if !empty => self.context = None,
            b"name" if self.message.is_none() && !empty => self.collect(Field::ContextName),
            b"message" => {
                let numerus = attribute_is(tag, "numerus", &["yes"], content, start)?;
                if empty {
                    return Ok(());
                }
                self.message = Some(MessageScan {
                    numerus,
                    ..MessageScan::default()
                });
            }
            b"source" if self.message.is_some() && !empty => self.collect(Field::Source),
            b"comment" | b"extracomment" if self.message.is_some() && !empty => {
                self.collect(Field::Comment)
            }
            b"translation" => {
                let obsolete =
                    attribute_is(tag, "type", &["obsolete", "vanished"], content, start)?;
                let Some(message) = self.message.as_mut() else {
                    return Ok(());
                };
                message.obsolete |= obsolete;
                message.translation = Some(TranslationScan {
                    start,
                    open_end: end,
                    close_start: end,
                    end,
                    ..TranslationScan::default()
                });
                if !empty {
                    self.collect(Field::Translation);
                }
            }
            b"numerusform" => {
                let Some(translation) = self
                    .message
                    .as_mut()
                    .and_then(|message| message.translation.as_mut())
                else {
                    return Ok(());
                };
                translation.forms.push(FormScan {
                    start,
                    end,
                    text: String::new(),
                });
                if !empty {
                    self.collect(Field::NumerusForm);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn collect(&mut self, field: Field) {
        self.field = Some(field);
        self.text.clear();
    }

    fn end(&mut self, name: &[u8], start: usize, end: usize) -> Result<(), FormatError> {
        let field = self.field;
        match (name, field) {
            (b"name", Some(Field::ContextName)) => {
                self.context = Some(std::mem::take(&mut self.text));
            }
            (b"source", Some(Field::Source)) => {
                let text = std::mem::take(&mut self.text);
                if let Some(message) = self.message.as_mut() {
                    message.source = Some(text);
                }
            }
            (b"comment" | b"extracomment", Some(Field::Comment)) => {
                let text = std::mem::take(&mut self.text);
                if let Some(message) = self.message.as_mut() {
                    message.comments.push(text);
                }
            }
            (b"numerusform", Some(Field::NumerusForm)) => {
                let text = std::mem::take(&mut self.text);
                if let Some(form) = self
                    .message
                    .as_mut()
                    .and_then(|message| message.translation.as_mut())
                    .and_then(|translation| translation.forms.last_mut())
                {
                    form.end = end;
                    form.text = text;
                }
                self.field = Some(Field::Translation);
                return Ok(());
            }
            (b"translation", _) => {
                let text = std::mem::take(&mut self.text);
                if let Some(translation) = self
                    .message
                    .as_mut()
                    .and_then(|message| message.translation.as_mut())
                {
                    translation.close_start = start;
                    translation.end = end;
                    translation.text = text;
                }
            }
            (b"message", _) => {
                if let Some(message) = self.message.take() {
                    self.message(message, start)?;
                }
            }
            (b"context", _) => self.context = None,
            _ => return Ok(()),
        }
        self.field = None;
        Ok(())
    }

    /// Turn a complete `<message>` into an entry and its slots; `close` is
    /// the offset of `</message>`
    fn message(&mut self, message: MessageScan, close: usize) -> Result<(), FormatError> {
        let Some(key) = message.source else {
            return Ok(());
        };
        if message.obsolete {
            return Ok(());
        }

        let index = self.entries.len();
        let current = match message.translation {
            Some(translation) => {
                self.copy_until(translation.start);
                let values = if message.numerus {
                    self.numerus_slots(index, &translation)
                } else {
                    self.builder.push_slot(index, 0);
                    vec![translation.text]
                };
                self.cursor = translation.end;
                values
            }
            None => {
                // No translation element yet: add one before </message>
                self.copy_until(close);
                if message.numerus {
                    self.builder.push_text("<translation>");
                    self.builder.push_slot(index, 0);
                    self.builder.push_text("</translation>");
                } else {
                    self.builder.push_slot(index, 0);
                }
                vec![String::new()]
            }
        };

        let values = match self.origin {
            Origin::Source => vec![key.clone(); current.len()],
            Origin::Translation { .. } => current,
        };

        self.entries.push(Entry {
            plural_key: message.numerus.then(|| key.clone()),
            key,
            context: self.context.clone(),
            values,
            comments: message.comments,
            origin: self.origin.clone(),
        });
        Ok(())
    }

    /// Replace each `<numerusform>` of a translation with a slot and return
    /// the current form texts
    fn numerus_slots(&mut self, index: usize, translation: &TranslationScan) -> Vec<String> {
        self.builder.push_text("<translation>");
        if translation.forms.is_empty() {
            self.builder.push_slot(index, 0);
            self.builder.push_text("</translation>");
            return vec![String::new()];
        }

        let mut last = translation.open_end;
        for (form, scan) in translation.forms.iter().enumerate() {
            self.builder.push_text(&self.content[last..scan.start]);
            self.builder.push_slot(index, form);
            last = scan.end;
        }
        self.builder
            .push_text(&self.content[last..translation.close_start.max(last)]);
        self.builder.push_text("</translation>");
        translation.forms.iter().map(|f| f.text.clone()).collect()
    }
}

impl FormatHandler for QtHandler {
    fn format(&self) -> Format {
        Format::Qt
    }

    fn parse(&self, content: &str, origin: &Origin) -> Result<Document, FormatError> {
        QtParser::new(content, origin).parse()
    }

    fn render_slot(&self, entry: &Entry, _form: usize, value: &str) -> String {
        if entry.is_plural() {
            format!("<numerusform>{}</numerusform>", partial_escape(value))
        } else {
            format!("<translation>{}</translation>", partial_escape(value))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE TS>
<TS version="2.0" language="en">
<context>
    <name>MainWindow</name>
    <message>
        <location filename="mainwindow.ui" line="14"/>
        <source>START</source>
        <translation type="unfinished"></translation>
    </message>
    <message>
        <source>Save &amp; quit</source>
        <comment>File menu</comment>
        <translation type="unfinished"/>
    </message>
    <message numerus="yes">
        <source>%n file(s)</source>
        <translation type="unfinished">
            <numerusform></numerusform>
            <numerusform></numerusform>
        </translation>
    </message>
    <message>
        <source>Gone</source>
        <translation type="obsolete">Parti</translation>
    </message>
</context>
<context>
    <name>Dialog</name>
    <message>
        <source>OK</source>
        <translation>D&apos;accord</translation>
    </message>
</context>
</TS>
"#;

    #[test]
    fn test_parse_source() {
        let doc = QtHandler.parse(TS, &Origin::Source).unwrap();
        assert_eq!(doc.len(), 4);

        assert_eq!(doc.entries[0].key, "START");
        assert_eq!(doc.entries[0].context.as_deref(), Some("MainWindow"));
        assert_eq!(doc.entries[0].values, vec!["START"]);

        assert_eq!(doc.entries[1].key, "Save & quit");
        assert_eq!(doc.entries[1].comments, vec!["File menu"]);

        let plural = &doc.entries[2];
        assert!(plural.is_plural());
        assert_eq!(plural.values, vec!["%n file(s)", "%n file(s)"]);

        assert_eq!(doc.entries[3].context.as_deref(), Some("Dialog"));
    }

    #[test]
    fn test_parse_translations() {
        let origin = Origin::Translation {
            language: "fr".to_string(),
        };
        let doc = QtHandler.parse(TS, &origin).unwrap();
        assert_eq!(doc.entries[0].values, vec![""]);
        assert_eq!(doc.entries[3].values, vec!["D'accord"]);
    }

    #[test]
    fn test_compile_rewrites_translation_elements() {
        let doc = QtHandler.parse(TS, &Origin::Source).unwrap();
        let output = String::from_utf8(QtHandler.compile(&doc).unwrap()).unwrap();

        assert!(output.contains("<source>START</source>\n        <translation>START</translation>\n"));
        assert!(output.contains("<translation>Save &amp; quit</translation>\n"));
        assert!(output.contains(
            "<translation>\n            <numerusform>%n file(s)</numerusform>\n            <numerusform>%n file(s)</numerusform>\n        </translation>"
        ));
        // Obsolete messages are left alone
        assert!(output.contains(r#"<translation type="obsolete">Parti</translation>"#));
        assert!(output.contains("<translation>OK</translation>"));
        assert!(output.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n"));
        assert!(output.ends_with("</context>\n</TS>\n"));
    }

    #[test]
    fn test_message_without_translation() {
        let ts = "<TS><context><name>C</name><message><source>Hi</source></message></context></TS>";
        let doc = QtHandler.parse(ts, &Origin::Source).unwrap();
        let output = String::from_utf8(QtHandler.compile(&doc).unwrap()).unwrap();
        assert_eq!(
            output,
            "<TS><context><name>C</name><message><source>Hi</source><translation>Hi</translation></message></context></TS>"
        );
    }

    #[test]
    fn test_commented_out_message_is_not_an_entry() {
        let ts = concat!(
            "<TS>\n<context>\n<name>C</name>\n",
            "<!-- <message><source>Old</source><translation>x</translation></message> -->\n",
            "<message><source>START</source><translation type=\"unfinished\"/></message>\n",
            "<message><source><![CDATA[a < b]]></source></message>\n",
            "</context>\n</TS>\n",
        );
        let doc = QtHandler.parse(ts, &Origin::Source).unwrap();
        let keys: Vec<&str> = doc.entries.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["START", "a < b"]);

        let doc = doc.map_values(|value| format!("[{}]", value));
        let output = String::from_utf8(QtHandler.compile(&doc).unwrap()).unwrap();
        assert!(output.contains(
            "<!-- <message><source>Old</source><translation>x</translation></message> -->\n"
        ));
        assert!(output.contains("<source>START</source><translation>[START]</translation>"));
        assert!(output.contains("<translation>[a &lt; b]</translation></message>"));
    }

    #[test]
    fn test_rejects_non_ts_content() {
        let err = QtHandler.parse("<html></html>", &Origin::Source).unwrap_err();
        assert!(matches!(err, FormatError::Syntax { line: 1, .. }));
    }

    #[test]
    fn test_bad_entity_reports_line() {
        let ts = "<TS>\n<context>\n<name>C</name>\n<message>\n<source>A &bogus; B</source>\n</message>\n</context>\n</TS>";
        let err = QtHandler.parse(ts, &Origin::Source).unwrap_err();
        assert!(matches!(err, FormatError::Syntax { line: 5, .. }));
    }
}
