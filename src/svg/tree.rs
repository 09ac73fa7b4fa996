//! Lenient SVG tree built on the quick-xml tokenizer.
//!
//! Icons come from hand-edited files, icon fonts, and copy/paste, so the
//! parser recovers instead of rejecting: mismatched closing tags are skipped,
//! unclosed elements are closed at the end of input, and anything that is not
//! an element (text, comments, CDATA, doctypes) is kept verbatim so that
//! serializing an untouched tree reproduces its content.

use std::fmt;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};

// ============================================================================
// Node
// ============================================================================

/// A node of the lenient tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// An element with attributes and children.
    Element(Element),

    /// Raw markup: text, comments, CDATA, processing instructions, doctypes.
    Raw(String),
}

impl Node {
    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Raw(_) => None,
        }
    }
}

// ============================================================================
// Element
// ============================================================================

/// An element with its attributes in source order.
///
/// Attribute values are kept in their escaped source form. Duplicate
/// attributes are preserved, which is how corrupted namespace declarations
/// are detected and repaired.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// Creates an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        }
    }

    /// Adds an attribute, builder style.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Adds raw text content, builder style.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Raw(text.into()));
        self
    }

    fn from_start(start: &BytesStart<'_>, self_closing: bool) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();

        let mut iter = start.attributes();
        iter.with_checks(false);
        for attr in iter {
            let attr = attr.map_err(|e| Error::Parse {
                position: 0,
                message: format!("<{name}>: {e}"),
            })?;
            attributes.push((
                String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                String::from_utf8_lossy(&attr.value).into_owned(),
            ));
        }

        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            self_closing,
        })
    }

    /// The element name without a namespace prefix.
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Returns true if the local name equals `name`.
    pub fn is(&self, name: &str) -> bool {
        self.local_name() == name
    }

    /// Returns the first value of the attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Number of times the attribute is declared.
    pub fn count_attr(&self, name: &str) -> usize {
        self.attributes.iter().filter(|(key, _)| key == name).count()
    }

    /// Sets the attribute, replacing the first declaration or appending.
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Inserts an attribute at `index` (clamped to the attribute count).
    pub fn insert_attr(&mut self, index: usize, name: &str, value: impl Into<String>) {
        let index = index.min(self.attributes.len());
        self.attributes
            .insert(index, (name.to_string(), value.into()));
    }

    /// Removes every declaration of the attribute. Returns how many were removed.
    pub fn remove_attr(&mut self, name: &str) -> usize {
        let before = self.attributes.len();
        self.attributes.retain(|(key, _)| key != name);
        before - self.attributes.len()
    }

    /// Returns true if the `class` attribute has a token matching `pred`.
    pub fn has_class(&self, pred: impl Fn(&str) -> bool) -> bool {
        self.attr("class")
            .is_some_and(|class| class.split_whitespace().any(pred))
    }

    /// Concatenated raw content of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// All descendant elements in document order (excluding `self`).
    pub fn descendants(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(&self.children, &mut out);
        out
    }

    /// Removes every descendant element matching `pred`, at any depth.
    ///
    /// Returns the number of removed elements.
    pub fn remove_where(&mut self, pred: &impl Fn(&Element) -> bool) -> usize {
        remove_where(&mut self.children, pred)
    }

    /// Replaces every descendant element matching `pred` with its children.
    ///
    /// Nested matches are unwrapped as well. Returns the number of unwrapped
    /// elements.
    pub fn unwrap_where(&mut self, pred: &impl Fn(&Element) -> bool) -> usize {
        unwrap_where(&mut self.children, pred)
    }

    /// Serializes the children only.
    pub fn inner_markup(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            out.push_str(&child.to_string());
        }
        out
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Raw(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

fn collect_elements<'a>(nodes: &'a [Node], out: &mut Vec<&'a Element>) {
    for node in nodes {
        if let Node::Element(el) = node {
            out.push(el);
            collect_elements(&el.children, out);
        }
    }
}

fn remove_where(nodes: &mut Vec<Node>, pred: &impl Fn(&Element) -> bool) -> usize {
    let before = nodes.len();
    nodes.retain(|node| !matches!(node, Node::Element(el) if pred(el)));
    let mut removed = before - nodes.len();

    for node in nodes.iter_mut() {
        if let Node::Element(el) = node {
            removed += remove_where(&mut el.children, pred);
        }
    }
    removed
}

fn unwrap_where(nodes: &mut Vec<Node>, pred: &impl Fn(&Element) -> bool) -> usize {
    let mut unwrapped = 0;
    let mut result = Vec::with_capacity(nodes.len());

    for node in nodes.drain(..) {
        match node {
            Node::Element(mut el) => {
                unwrapped += unwrap_where(&mut el.children, pred);
                if pred(&el) {
                    unwrapped += 1;
                    result.append(&mut el.children);
                } else {
                    result.push(Node::Element(el));
                }
            }
            raw => result.push(raw),
        }
    }

    *nodes = result;
    unwrapped
}

// ============================================================================
// SvgDocument
// ============================================================================

/// A parsed SVG document or fragment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SvgDocument {
    pub nodes: Vec<Node>,
}

impl SvgDocument {
    /// Parses markup leniently.
    ///
    /// Only tokenizer-level failures (for example an unterminated tag or a
    /// broken attribute) are reported; structural problems are repaired.
    pub fn parse(input: &str) -> Result<Self> {
        let mut reader = Reader::from_str(input);
        reader.config_mut().check_end_names = false;

        let mut open: Vec<Element> = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut last = 0usize;

        loop {
            let event = reader.read_event().map_err(|e| Error::Parse {
                position: reader.buffer_position() as usize,
                message: e.to_string(),
            })?;
            let position = reader.buffer_position() as usize;
            let raw = input.get(last..position).unwrap_or_default();
            last = position;

            match event {
                Event::Start(start) => open.push(Element::from_start(&start, false)?),
                Event::Empty(start) => {
                    let el = Element::from_start(&start, true)?;
                    attach(&mut open, &mut nodes, Node::Element(el));
                }
                Event::End(end) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    match open.iter().rposition(|el| el.name == name) {
                        Some(depth) => {
                            while open.len() > depth {
                                if let Some(el) = open.pop() {
                                    attach(&mut open, &mut nodes, Node::Element(el));
                                }
                            }
                        }
                        None => log::debug!("skipping unmatched closing tag </{name}>"),
                    }
                }
                Event::Eof => break,
                _ => attach(&mut open, &mut nodes, Node::Raw(raw.to_string())),
            }
        }

        while let Some(el) = open.pop() {
            log::debug!("closing unterminated <{}>", el.name);
            attach(&mut open, &mut nodes, Node::Element(el));
        }

        Ok(Self { nodes })
    }

    /// All elements in document order.
    pub fn elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_elements(&self.nodes, &mut out);
        out
    }

    /// The first `<svg>` element in document order.
    pub fn root(&self) -> Option<&Element> {
        let path = svg_path(&self.nodes)?;
        let mut nodes = &self.nodes;
        let mut found = None;
        for index in path {
            let el = nodes.get(index)?.as_element()?;
            nodes = &el.children;
            found = Some(el);
        }
        found
    }

    /// Mutable access to the first `<svg>` element.
    pub fn root_mut(&mut self) -> Option<&mut Element> {
        let path = svg_path(&self.nodes)?;
        let (first, rest) = path.split_first()?;
        let mut el = match self.nodes.get_mut(*first)? {
            Node::Element(el) => el,
            Node::Raw(_) => return None,
        };
        for index in rest {
            el = match el.children.get_mut(*index)? {
                Node::Element(child) => child,
                Node::Raw(_) => return None,
            };
        }
        Some(el)
    }
}

fn attach(open: &mut [Element], nodes: &mut Vec<Node>, node: Node) {
    match open.last_mut() {
        Some(parent) => parent.children.push(node),
        None => nodes.push(node),
    }
}

/// Index path to the first `<svg>` element.
fn svg_path(nodes: &[Node]) -> Option<Vec<usize>> {
    for (index, node) in nodes.iter().enumerate() {
        if let Node::Element(el) = node {
            if el.is("svg") {
                return Some(vec![index]);
            }
            if let Some(mut rest) = svg_path(&el.children) {
                rest.insert(0, index);
                return Some(rest);
            }
        }
    }
    None
}

// ============================================================================
// Serialization
// ============================================================================

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Element(el) => el.fmt(f),
            Self::Raw(raw) => f.write_str(raw),
        }
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        for (key, value) in &self.attributes {
            if value.contains('"') && !value.contains('\'') {
                write!(f, " {key}='{value}'")?;
            } else {
                write!(f, " {key}=\"{value}\"")?;
            }
        }

        if self.self_closing && self.children.is_empty() {
            return f.write_str("/>");
        }

        f.write_str(">")?;
        for child in &self.children {
            child.fmt(f)?;
        }
        write!(f, "</{}>", self.name)
    }
}

impl fmt::Display for SvgDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            node.fmt(f)?;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_preserves_markup() {
        let svg = r##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><!-- icon --><g fill="#fff"><path d="M1 1"/></g></svg>"##;
        let doc = SvgDocument::parse(svg).unwrap();
        assert_eq!(doc.to_string(), svg);
    }

    #[test]
    fn keeps_duplicate_attributes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns="http://www.w3.org/2000/svg"></svg>"#;
        let doc = SvgDocument::parse(svg).unwrap();
        assert_eq!(doc.root().unwrap().count_attr("xmlns"), 2);
    }

    #[test]
    fn recovers_from_unclosed_elements() {
        let doc = SvgDocument::parse(r#"<svg><g><path d="M0 0"/></svg>"#).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.descendants().len(), 2);
        assert!(doc.to_string().contains("</g></svg>"));
    }

    #[test]
    fn finds_nested_root() {
        let mut doc = SvgDocument::parse(r#"<div><span/><svg width="1"/></div>"#).unwrap();
        assert_eq!(doc.root().unwrap().attr("width"), Some("1"));
        doc.root_mut().unwrap().set_attr("width", "2");
        assert!(doc.to_string().contains(r#"<svg width="2"/>"#));
    }

    #[test]
    fn unwraps_nested_matches() {
        let mut doc =
            SvgDocument::parse(r#"<svg><g class="w"><g class="w"><rect/></g></g></svg>"#).unwrap();
        let root = doc.root_mut().unwrap();
        let count = root.unwrap_where(&|el: &Element| el.is("g") && el.has_class(|c| c == "w"));
        assert_eq!(count, 2);
        assert_eq!(doc.to_string(), "<svg><rect/></svg>");
    }

    #[test]
    fn removes_at_any_depth() {
        let mut doc =
            SvgDocument::parse(r#"<svg><style/><g><style>a</style><circle/></g></svg>"#).unwrap();
        let removed = doc.root_mut().unwrap().remove_where(&|el: &Element| el.is("style"));
        assert_eq!(removed, 2);
        assert_eq!(doc.to_string(), "<svg><g><circle/></g></svg>");
    }

    #[test]
    fn text_includes_raw_content() {
        let doc = SvgDocument::parse("<svg><style>@keyframes a {}</style></svg>").unwrap();
        let style = doc.root().unwrap().descendants()[0];
        assert_eq!(style.text(), "@keyframes a {}");
    }

    #[test]
    fn broken_tag_is_an_error() {
        assert!(SvgDocument::parse(r#"<svg><path d="M0 0></svg>"#).is_err());
    }
}
