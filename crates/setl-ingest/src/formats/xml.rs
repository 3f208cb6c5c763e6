//! Tagged-markup adapter
//!
//! Every `objects` element, at any depth, is one record. Its direct children
//! are the entries:
//!
//! ```xml
//! <root>
//!   <objects>
//!     <object name="D1"><value>a</value></object>
//!     <object name="M1"><value>1</value></object>
//!   </objects>
//! </root>
//! ```

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use setl_common::{Record, RecordOrigin, RecordSet, Result, SetlError, Value};
use std::io::Read;

const RECORD_TAG: &[u8] = b"objects";
const VALUE_TAG: &[u8] = b"value";
const NAME_ATTR: &str = "name";

/// Read an XML document of `objects` records.
pub fn read_xml<R: Read>(mut reader: R, source_name: &str) -> Result<RecordSet> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| SetlError::malformed(source_name, format!("unreadable document: {}", e)))?;

    let mut xml = Reader::from_str(&content);
    let mut parser = ObjectsParser::new(source_name);

    loop {
        let event = xml.read_event().map_err(|e| {
            SetlError::malformed(
                source_name,
                format!("XML error at byte {}: {}", xml.buffer_position(), e),
            )
        })?;

        match event {
            Event::Start(e) => parser.open(&e)?,
            Event::Empty(e) => {
                parser.open(&e)?;
                parser.close()?;
            },
            Event::End(_) => parser.close()?,
            Event::Text(t) => {
                let text = t
                    .unescape()
                    .map_err(|e| SetlError::malformed(source_name, e.to_string()))?;
                parser.text(&text);
            },
            Event::CData(c) => parser.text(&String::from_utf8_lossy(&c)),
            Event::Eof => break,
            _ => {},
        }
    }

    parser.finish(&content)
}

/// An entry whose `value` child is being collected
struct PendingEntry {
    depth: usize,
    name: String,
    value: Option<String>,
}

/// Streaming state for the `objects` layout
struct ObjectsParser<'a> {
    source_name: &'a str,
    depth: usize,
    saw_element: bool,
    record: Option<(usize, Record)>,
    entry: Option<PendingEntry>,
    capture_depth: Option<usize>,
    records: Vec<Record>,
}

impl<'a> ObjectsParser<'a> {
    fn new(source_name: &'a str) -> Self {
        Self {
            source_name,
            depth: 0,
            saw_element: false,
            record: None,
            entry: None,
            capture_depth: None,
            records: Vec::new(),
        }
    }

    fn open(&mut self, element: &BytesStart<'_>) -> Result<()> {
        self.depth += 1;
        self.saw_element = true;

        // Only the text directly inside <value>, before any child, counts.
        self.capture_depth = None;

        let tag = element.name();
        let Some((record_depth, _)) = self.record else {
            if tag.as_ref() == RECORD_TAG {
                self.record = Some((self.depth, Record::new()));
            }
            return Ok(());
        };

        if self.depth == record_depth + 1 {
            let name = element
                .try_get_attribute(NAME_ATTR)
                .map_err(|e| SetlError::malformed(self.source_name, e.to_string()))?
                .ok_or_else(|| {
                    SetlError::malformed(
                        self.source_name,
                        format!(
                            "<{}> inside <objects> has no '{}' attribute",
                            String::from_utf8_lossy(tag.as_ref()),
                            NAME_ATTR
                        ),
                    )
                })?
                .unescape_value()
                .map_err(|e| SetlError::malformed(self.source_name, e.to_string()))?
                .into_owned();

            self.entry = Some(PendingEntry {
                depth: self.depth,
                name,
                value: None,
            });
            return Ok(());
        }

        if let Some(entry) = self.entry.as_mut() {
            if self.depth == entry.depth + 1 && tag.as_ref() == VALUE_TAG && entry.value.is_none() {
                entry.value = Some(String::new());
                self.capture_depth = Some(self.depth);
            }
        }

        Ok(())
    }

    fn text(&mut self, text: &str) {
        if self.capture_depth != Some(self.depth) {
            return;
        }
        if let Some(value) = self.entry.as_mut().and_then(|e| e.value.as_mut()) {
            value.push_str(text);
        }
    }

    fn close(&mut self) -> Result<()> {
        if self.depth == 0 {
            return Err(SetlError::malformed(self.source_name, "unbalanced closing tag"));
        }

        if self.capture_depth == Some(self.depth) {
            self.capture_depth = None;
        }

        if self.entry.as_ref().is_some_and(|e| e.depth == self.depth) {
            if let Some(entry) = self.entry.take() {
                let value = entry.value.ok_or_else(|| {
                    SetlError::malformed(
                        self.source_name,
                        format!("object '{}' has no <value> element", entry.name),
                    )
                })?;
                if let Some((_, record)) = self.record.as_mut() {
                    record.insert(entry.name, Value::Text(value));
                }
            }
        }

        if self.record.as_ref().is_some_and(|(d, _)| *d == self.depth) {
            if let Some((_, record)) = self.record.take() {
                let index = self.records.len() + 1;
                self.records.push(record.with_origin(RecordOrigin {
                    source: self.source_name.to_string(),
                    index,
                }));
            }
        }

        self.depth -= 1;
        Ok(())
    }

    fn finish(self, content: &str) -> Result<RecordSet> {
        if self.depth != 0 {
            return Err(SetlError::malformed(
                self.source_name,
                "document ended inside an open element",
            ));
        }
        if !self.saw_element && !content.trim().is_empty() {
            return Err(SetlError::malformed(self.source_name, "no root element"));
        }

        super::ensure_uniform_keys(self.source_name, &self.records)?;
        Ok(RecordSet::new(self.source_name, self.records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<root>
  <objects>
    <object name="D1"><value>a</value></object>
    <object name="D2"><value>a</value></object>
    <object name="M1"><value>1</value></object>
    <object name="M2"><value>1</value></object>
  </objects>
</root>"#;

    #[test]
    fn test_read_xml_objects() {
        let set = read_xml(SAMPLE.as_bytes(), "test.xml").unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.key_basis(), vec!["D1", "D2", "M1", "M2"]);
        assert_eq!(set.records[0].get("M1"), Some(&Value::from("1")));
        assert_eq!(set.records[0].origin().unwrap().index, 1);
    }

    #[test]
    fn test_read_xml_multiple_and_nested_records() {
        let data = r#"<root>
            <objects><o name="D1"><value>x</value></o></objects>
            <group><objects><o name="D1"><value>y</value></o></objects></group>
        </root>"#;
        let set = read_xml(data.as_bytes(), "nested.xml").unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.records[1].get("D1"), Some(&Value::from("y")));
        assert_eq!(set.records[1].origin().unwrap().index, 2);
    }

    #[test]
    fn test_read_xml_empty_value_and_entities() {
        let data = r#"<r><objects><o name="D1"><value/></o><o name="D2"><value>a &amp; b</value></o></objects></r>"#;
        let set = read_xml(data.as_bytes(), "entities.xml").unwrap();

        assert_eq!(set.records[0].get("D1"), Some(&Value::from("")));
        assert_eq!(set.records[0].get("D2"), Some(&Value::from("a & b")));
    }

    #[test]
    fn test_read_xml_without_records() {
        assert!(read_xml("".as_bytes(), "empty.xml").unwrap().is_empty());
        assert!(read_xml("<root/>".as_bytes(), "bare.xml").unwrap().is_empty());
    }

    #[test]
    fn test_read_xml_malformed_documents() {
        let cases = [
            r#"<r><objects><o><value>1</value></o></objects></r>"#,
            r#"<r><objects><o name="D1"></o></objects></r>"#,
            r#"<r><objects><o name="D1"><value>1</value></o></objects>"#,
            r#"<r><objects></r>"#,
            "just text",
        ];
        for data in cases {
            let err = read_xml(data.as_bytes(), "bad.xml").unwrap_err();
            assert!(
                matches!(err, SetlError::MalformedSource { .. }),
                "expected malformed source for {:?}, got {:?}",
                data,
                err
            );
        }
    }
}
