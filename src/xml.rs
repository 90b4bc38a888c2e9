//! A small XML document tree for `application/*xml` response bodies.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;

/// A parsed XML document.
///
/// # Examples
///
/// ```
/// use fetchwright::XmlDocument;
///
/// let doc = XmlDocument::parse(
///     r#"<feed><entry id="1"><title>First</title></entry></feed>"#,
///     "application/atom+xml",
/// )
/// .unwrap();
///
/// assert_eq!(doc.root().name(), "feed");
/// assert_eq!(doc.find("entry/title").unwrap().text(), "First");
/// assert_eq!(doc.find("entry").unwrap().attribute("id"), Some("1"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    mime_type: String,
    root: XmlElement,
}

/// An element with its attributes, child elements, and text content.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlElement {
    name: String,
    attributes: BTreeMap<String, String>,
    children: Vec<XmlElement>,
    text: String,
}

/// Why a body could not be read as an XML document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct XmlParseError(String);

impl XmlDocument {
    /// Parses `text` into a document; `mime_type` is kept as a hint.
    pub fn parse(text: &str, mime_type: &str) -> Result<Self, XmlParseError> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut root: Option<XmlElement> = None;
        let mut stack: Vec<XmlElement> = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(Event::Start(start)) => stack.push(element_from_start(&start)?),
                Ok(Event::Empty(empty)) => {
                    let element = element_from_start(&empty)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| XmlParseError("unexpected closing tag".to_string()))?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(text)) => {
                    let content = text
                        .unescape()
                        .map_err(|e| XmlParseError(e.to_string()))?;
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&content);
                    }
                }
                Ok(Event::CData(cdata)) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.text.push_str(&String::from_utf8_lossy(&cdata));
                    }
                }
                // Declarations, comments, PIs and doctypes carry no content.
                Ok(_) => {}
                Err(e) => {
                    return Err(XmlParseError(format!(
                        "error at position {}: {}",
                        reader.error_position(),
                        e
                    )))
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(XmlParseError(format!("unclosed element <{}>", open.name)));
        }

        let root = root.ok_or_else(|| XmlParseError("document has no root element".to_string()))?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            root,
        })
    }

    /// The root element.
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// The MIME type the document was parsed under.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Finds the first element matching a `/`-separated path below the root.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        self.root.find(path)
    }
}

impl XmlElement {
    /// Creates an element with no attributes or content.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The element's tag name, including any namespace prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Child elements, in document order.
    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// Direct text content (text and CDATA, concatenated).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Finds the first descendant matching a `/`-separated path of tag names.
    pub fn find(&self, path: &str) -> Option<&XmlElement> {
        let mut current = self;
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = current.children.iter().find(|c| c.name == segment)?;
        }
        Some(current)
    }

    /// All direct children with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn element_from_start(start: &BytesStart<'_>) -> Result<XmlElement, XmlParseError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlParseError(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlParseError(e.to_string()))?
            .into_owned();
        element.attributes.insert(key, value);
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), XmlParseError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_some() {
        Err(XmlParseError(format!(
            "multiple root elements, found <{}>",
            element.name
        )))
    } else {
        *root = Some(element);
        Ok(())
    }
}
