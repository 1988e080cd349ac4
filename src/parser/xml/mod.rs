//! Minimal XML document tree
//!
//! Layout and values resources are small, so they are read fully into an
//! owned tree with quick-xml and walked recursively afterwards.

mod layout;

pub use layout::LayoutParser;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::trace;

/// Errors produced while reading an XML resource
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not valid UTF-8")]
    Decode(String),
    #[error("Malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),
    #[error("Document has no root element")]
    NoRoot,
    #[error("Document ended inside <{0}>")]
    Unclosed(String),
}

/// A node below an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

/// An element with its qualified name (e.g. `android:layout_width` attributes keep their prefix)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attribute value by qualified name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Direct element children, skipping text and comments
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// This element and every element below it, in document order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Concatenated text content of the element and its descendants
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(e) => e.collect_text(out),
                XmlNode::Comment(_) => {}
            }
        }
    }
}

/// Pre-order iterator over an element subtree
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let children: Vec<&XmlElement> = element.elements().collect();
        self.stack.extend(children.into_iter().rev());
        Some(element)
    }
}

/// A parsed XML file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

impl XmlDocument {
    /// Parse a document from text
    pub fn parse(contents: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(contents);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => stack.push(start_element(e)?),
                Event::Empty(ref e) => {
                    let element = start_element(e)?;
                    close_element(element, &mut stack, &mut root);
                }
                Event::End(_) => {
                    if let Some(element) = stack.pop() {
                        close_element(element, &mut stack, &mut root);
                    }
                }
                Event::Text(ref e) => {
                    let text = e.unescape()?;
                    // Indentation between tags is not content
                    if let Some(parent) = stack.last_mut().filter(|_| !text.trim().is_empty()) {
                        parent.children.push(XmlNode::Text(text.into_owned()));
                    }
                }
                Event::CData(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e).into_owned();
                        parent.children.push(XmlNode::Text(text));
                    }
                }
                Event::Comment(ref e) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = String::from_utf8_lossy(e).into_owned();
                        parent.children.push(XmlNode::Comment(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.pop() {
            return Err(XmlError::Unclosed(open.name));
        }

        root.map(|root| Self { root }).ok_or(XmlError::NoRoot)
    }

    /// Read and parse a file, failing with [`XmlError::Decode`] for non-UTF-8 content
    pub fn read(path: &Path) -> Result<Self, XmlError> {
        let bytes = fs::read(path).map_err(|source| XmlError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let contents =
            String::from_utf8(bytes).map_err(|_| XmlError::Decode(path.display().to_string()))?;
        Self::parse(&contents)
    }
}

fn start_element(e: &BytesStart<'_>) -> Result<XmlElement, XmlError> {
    let mut element = XmlElement::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn close_element(element: XmlElement, stack: &mut [XmlElement], root: &mut Option<XmlElement>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlNode::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => trace!("Ignoring extra top-level element <{}>", element.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_document() {
        let doc = XmlDocument::parse(
            r#"<?xml version="1.0" encoding="utf-8"?>
            <LinearLayout xmlns:android="http://schemas.android.com/apk/res/android"
                android:layout_width="match_parent">
                <!-- a comment -->
                <Button android:text="Go &amp; stop" />
                <TextView>hello</TextView>
            </LinearLayout>"#,
        )
        .unwrap();

        assert_eq!(doc.root.name, "LinearLayout");
        assert_eq!(doc.root.attr("android:layout_width"), Some("match_parent"));
        assert_eq!(doc.root.elements().count(), 2);
        assert_eq!(doc.root.children.len(), 3);

        let button = doc.root.elements().next().unwrap();
        assert_eq!(button.attr("android:text"), Some("Go & stop"));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let doc = XmlDocument::parse("<a><b><c/></b><d/></a>").unwrap();
        let names: Vec<_> = doc.root.descendants().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_text_flattens_markup() {
        let doc = XmlDocument::parse("<string name=\"x\">Hello <b>bold</b> world</string>").unwrap();
        assert_eq!(doc.root.text(), "Hello bold world");
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(XmlDocument::parse(""), Err(XmlError::NoRoot)));
        assert!(XmlDocument::parse("<a><b></a>").is_err());
        assert!(XmlDocument::parse("<a><b>").is_err());
    }
}
