//! Owned XML document tree
//!
//! Requests are assembled as an [`XmlElement`] tree and serialized with every
//! text node and attribute value escaped, so caller-supplied strings can never
//! change document structure. Responses are parsed into the same tree type
//! from `quick-xml` events and then queried by local-name paths.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure to read a body as a well-formed XML document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("XML parse error at byte {position}: {message}")]
pub struct XmlParseError {
    /// Byte offset where the problem was detected
    pub position: u64,
    /// Parser message
    pub message: String,
}

impl XmlParseError {
    fn new(position: u64, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }
}

/// A single element with its attributes, concatenated text and child elements.
///
/// Names are stored qualified (`soap:Envelope`); lookups compare local names.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = XmlElement>) -> Self {
        self.children.extend(children);
        self
    }

    /// Element name without its namespace prefix
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Attribute value by local name
    pub fn attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local_part(key) == local)
            .map(|(_, value)| value.as_str())
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name() == local)
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.local_name() == local)
    }

    /// Walks a local-name path whose first segment names this element.
    ///
    /// `doc.select(&["Envelope", "Body", "Fault"])` succeeds only when `doc`
    /// itself is an `Envelope`.
    pub fn select(&self, path: &[&str]) -> Option<&XmlElement> {
        let (first, rest) = path.split_first()?;
        if self.local_name() != *first {
            return None;
        }
        rest.iter()
            .try_fold(self, |current, segment| current.child(segment))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Serialize without XML declaration or indentation.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    fn write_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }

        if self.text.is_empty() && self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        out.push_str(&escape_text(&self.text));
        for child in &self.children {
            child.write_into(out);
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Parse a complete document and return its root element.
    ///
    /// End tags must match, exactly one root element is allowed and
    /// non-whitespace text outside the root is rejected. Declarations,
    /// comments, processing instructions and doctypes are skipped.
    pub fn parse(input: &str) -> Result<XmlElement, XmlParseError> {
        let mut reader = Reader::from_str(input.trim_start_matches('\u{feff}'));
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let position = offset(reader.buffer_position());
            let event = reader
                .read_event()
                .map_err(|e| XmlParseError::new(position, e.to_string()))?;

            match event {
                Event::Start(start) => stack.push(element_from_start(&start, position)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start, position)?;
                    attach(&mut stack, &mut root, element, position)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlParseError::new(position, "unexpected end tag"))?;
                    attach(&mut stack, &mut root, element, position)?;
                }
                Event::Text(text) => {
                    let value = text
                        .unescape()
                        .map_err(|e| XmlParseError::new(position, e.to_string()))?;
                    append_text(&mut stack, &value, position)?;
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data).into_owned();
                    append_text(&mut stack, &value, position)?;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlParseError::new(
                offset(reader.buffer_position()),
                format!("unclosed element <{}>", open.name),
            ));
        }

        root.ok_or_else(|| XmlParseError::new(0, "document has no root element"))
    }
}

/// Escape character data, replacing characters XML 1.0 cannot carry.
///
/// `&`, `<`, `>`, `"` and `'` become entity references; carriage returns are
/// written as character references so parsers do not normalize them away.
pub fn escape_text(raw: &str) -> String {
    let cleaned = sanitize(raw);
    escape(cleaned.as_str()).replace('\r', "&#13;")
}

fn escape_attribute(raw: &str) -> String {
    escape_text(raw)
        .replace('\n', "&#10;")
        .replace('\t', "&#9;")
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if is_forbidden(c) { '\u{FFFD}' } else { c })
        .collect()
}

fn is_forbidden(c: char) -> bool {
    matches!(
        c,
        '\u{0}'..='\u{8}' | '\u{B}' | '\u{C}' | '\u{E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}'
    )
}

fn local_part(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

fn offset<P>(position: P) -> u64
where
    u64: TryFrom<P>,
{
    u64::try_from(position).unwrap_or(u64::MAX)
}

fn element_from_start(start: &BytesStart<'_>, position: u64) -> Result<XmlElement, XmlParseError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlParseError::new(position, e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlParseError::new(position, e.to_string()))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
    position: u64,
) -> Result<(), XmlParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(XmlParseError::new(position, "multiple root elements"));
    }
    *root = Some(element);
    Ok(())
}

fn append_text(stack: &mut [XmlElement], value: &str, position: u64) -> Result<(), XmlParseError> {
    match stack.last_mut() {
        Some(current) => {
            current.text.push_str(value);
            Ok(())
        }
        None if value.trim().is_empty() => Ok(()),
        None => Err(XmlParseError::new(position, "text outside the root element")),
    }
}
