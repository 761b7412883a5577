//! Owned XML element tree built on top of `quick-xml`'s event reader.
//!
//! Last.fm XML responses are small, so the whole document is materialized and
//! queried by tag name, the same way the JSON branch walks a `serde_json::Value`.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::{Deserialize, Serialize};

/// A node inside an [`XmlElement`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// An XML element with its attributes and children in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parse a complete document and return its root element.
    ///
    /// Mismatched or unclosed tags, multiple roots, stray text outside the
    /// root and documents without any element are all rejected.
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        let mut reader = Reader::from_str(input);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            let event = reader.read_event().map_err(|e| e.to_string())?;

            match event {
                Event::Start(start) => stack.push(element_from_start(&start)?),
                Event::Empty(start) => {
                    let element = element_from_start(&start)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| "closing tag without an open element".to_string())?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(|e| e.to_string())?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(text.into_owned())),
                        None if text.trim().is_empty() => {}
                        None => return Err("text outside of the root element".to_string()),
                    }
                }
                Event::CData(data) => {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::Text(text)),
                        None => return Err("CDATA outside of the root element".to_string()),
                    }
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(format!("unclosed element <{}>", open.name));
        }
        root.ok_or_else(|| "document has no root element".to_string())
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Direct child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First direct child element with the given tag name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.name == name)
    }

    /// All direct child elements with the given tag name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |e| e.name == name)
    }

    /// All descendant elements (excluding `self`) with the given tag name, in
    /// document order.
    pub fn descendants(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        collect_descendants(self, name, &mut found);
        found
    }

    /// Concatenation of the direct text nodes of this element.
    ///
    /// Text inside nested elements is not included.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }

    /// Text of the first direct child with the given name.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(XmlElement::text)
    }
}

fn collect_descendants<'a>(element: &'a XmlElement, name: &str, found: &mut Vec<&'a XmlElement>) {
    for child in element.elements() {
        if child.name == name {
            found.push(child);
        }
        collect_descendants(child, name, found);
    }
}

fn element_from_start(start: &BytesStart<'_>) -> std::result::Result<XmlElement, String> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| e.to_string())?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> std::result::Result<(), String> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(format!("multiple root elements, found <{}>", element.name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let doc = XmlElement::parse(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <lfm status="ok">
                <recenttracks user="rj">
                    <track nowplaying="true"><name>Ágætis byrjun &amp; more</name></track>
                    <track><name>Second</name><mbid/></track>
                </recenttracks>
            </lfm>"#,
        )
        .unwrap();

        assert_eq!(doc.name, "lfm");
        assert_eq!(doc.attribute("status"), Some("ok"));

        let tracks = doc.descendants("track");
        assert_eq!(tracks.len(), 2);
        assert!(tracks[0].has_attribute("nowplaying"));
        assert_eq!(tracks[0].child_text("name").as_deref(), Some("Ágætis byrjun & more"));
        assert_eq!(tracks[1].child_text("mbid").as_deref(), Some(""));
    }

    #[test]
    fn test_text_excludes_nested_elements() {
        let doc = XmlElement::parse("<a>one<b>two</b>three</a>").unwrap();
        assert_eq!(doc.text(), "onethree");
        assert_eq!(doc.child_text("b").as_deref(), Some("two"));
    }

    #[test]
    fn test_cdata_is_text() {
        let doc = XmlElement::parse("<a><![CDATA[<raw>]]></a>").unwrap();
        assert_eq!(doc.text(), "<raw>");
    }

    #[test]
    fn test_rejects_malformed_documents() {
        assert!(XmlElement::parse("Internal error").is_err());
        assert!(XmlElement::parse("").is_err());
        assert!(XmlElement::parse("<a><b></a>").is_err());
        assert!(XmlElement::parse("<a>").is_err());
        assert!(XmlElement::parse("<a/><b/>").is_err());
        assert!(XmlElement::parse(r#"{"recenttracks": {}}"#).is_err());
    }
}
