//! XML document tree
//!
//! A small owned tree over `quick-xml` events. Elements keep their original
//! start tag (attribute order, spacing, quoting) and every non-element event
//! is stored verbatim, so a document that is not changed serializes back to
//! the bytes it was parsed from.

use std::borrow::Cow;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::domain::error::{DomainError, DomainResult};

/// A child of an element, or a top-level item around the root element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Character data, including indentation between elements
    Text(BytesText<'static>),
    /// Declaration, comment, CDATA, processing instruction or doctype
    Other(Event<'static>),
}

impl Node {
    /// Whitespace-only text, i.e. layout between elements.
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(text) if is_blank(text))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }
}

fn is_blank(text: &BytesText<'_>) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

/// An element: tag name, attributes and ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    start: BytesStart<'static>,
    children: Vec<Node>,
    /// Written as `<name/>` while it has no children
    self_closing: bool,
}

impl Element {
    /// Create an empty element without attributes.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            start: BytesStart::new(name.to_owned()),
            children: Vec::new(),
            self_closing: true,
        }
    }

    /// Builder: append an attribute (the value is escaped).
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    /// Builder: append a child node.
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    fn from_start(start: BytesStart<'static>, self_closing: bool, position: u64) -> DomainResult<Self> {
        let name = std::str::from_utf8(start.name().into_inner())
            .map_err(|e| DomainError::parse(format!("element name is not UTF-8: {e}"), position))?
            .to_owned();

        // Reject broken attributes now so lookups later can ignore errors.
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| {
                DomainError::parse(format!("invalid attribute on <{name}>: {e}"), position)
            })?;
            attribute.unescape_value().map_err(|e| {
                DomainError::parse(format!("invalid attribute value on <{name}>: {e}"), position)
            })?;
        }

        Ok(Self {
            name,
            start,
            children: Vec::new(),
            self_closing,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unescaped value of an attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|attribute| attribute.key.as_ref() == key.as_bytes())
            .and_then(|attribute| attribute.unescape_value().ok().map(Cow::into_owned))
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order, skipping text and other nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First child element with the given name.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// Index (into `children()`) of the first child element with the given name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|node| matches!(node, Node::Element(child) if child.name == name))
    }

    /// Copy of this element with a different set of children.
    pub fn with_children(&self, children: Vec<Node>) -> Self {
        Self {
            name: self.name.clone(),
            start: self.start.clone(),
            children,
            self_closing: self.self_closing,
        }
    }

    /// Copy of this element with the child at `index` replaced.
    pub fn with_replaced_child(&self, index: usize, replacement: Element) -> Self {
        let children = self
            .children
            .iter()
            .enumerate()
            .map(|(i, node)| {
                if i == index {
                    Node::Element(replacement.clone())
                } else {
                    node.clone()
                }
            })
            .collect();
        self.with_children(children)
    }

    /// Copy of this element keeping only the child elements accepted by `keep`.
    ///
    /// `keep` receives the child's index into `children()`. A dropped element
    /// takes the whitespace-only text directly before it along (its newline
    /// and indentation), so its whole line disappears.
    pub fn retain_elements<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(usize, &Element) -> bool,
    {
        let mut children: Vec<Node> = Vec::with_capacity(self.children.len());
        for (index, node) in self.children.iter().enumerate() {
            match node {
                Node::Element(child) if !keep(index, child) => {
                    let after_blank = index
                        .checked_sub(1)
                        .is_some_and(|prev| self.children[prev].is_blank_text());
                    if after_blank {
                        children.pop();
                    }
                }
                _ => children.push(node.clone()),
            }
        }
        self.with_children(children)
    }

    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> DomainResult<()> {
        if self.children.is_empty() && self.self_closing {
            return emit(writer, Event::Empty(self.start.borrow()));
        }
        emit(writer, Event::Start(self.start.borrow()))?;
        for child in &self.children {
            child.write_to(writer)?;
        }
        emit(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    fn write_to(&self, writer: &mut Writer<Vec<u8>>) -> DomainResult<()> {
        match self {
            Node::Element(element) => element.write_to(writer),
            Node::Text(text) => emit(writer, Event::Text(text.borrow())),
            Node::Other(event) => emit(writer, event.borrow()),
        }
    }
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> DomainResult<()> {
    writer
        .write_event(event)
        .map_err(|e| DomainError::Serialize(e.to_string()))
}

const BOM: char = '\u{feff}';

/// A parsed XML document: the root element plus whatever surrounds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Input started with a UTF-8 byte order mark
    bom: bool,
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            bom: false,
            prolog: Vec::new(),
            root,
            epilog: Vec::new(),
        }
    }

    /// Parse a complete document.
    ///
    /// Fails on anything that is not well-formed: mismatched or unclosed
    /// tags, broken attributes, no root element, a second root element,
    /// or text outside the root.
    pub fn parse(xml: &str) -> DomainResult<Self> {
        let (bom, body) = match xml.strip_prefix(BOM) {
            Some(body) => (true, body),
            None => (false, xml),
        };
        // Positions are reported relative to the full input
        let offset = (xml.len() - body.len()) as u64;
        let mut reader = Reader::from_str(body);
        let mut builder = TreeBuilder::default();

        loop {
            let position = reader.buffer_position() as u64 + offset;
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(DomainError::parse(
                        e.to_string(),
                        reader.buffer_position() as u64 + offset,
                    ))
                }
            };
            match event {
                Event::Start(start) => {
                    builder.open(Element::from_start(start.into_owned(), false, position)?)
                }
                Event::Empty(start) => {
                    let element = Element::from_start(start.into_owned(), true, position)?;
                    builder.append(Node::Element(element), position)?;
                }
                Event::End(_) => builder.close(position)?,
                Event::Text(text) => builder.append(Node::Text(text.into_owned()), position)?,
                Event::Eof => break,
                other => builder.append(Node::Other(other.into_owned()), position)?,
            }
        }

        let mut document = builder.finish(reader.buffer_position() as u64 + offset)?;
        document.bom = bom;
        Ok(document)
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Copy of this document with a different root, keeping prolog and epilog.
    pub fn with_root(&self, root: Element) -> Self {
        Self {
            bom: self.bom,
            prolog: self.prolog.clone(),
            root,
            epilog: self.epilog.clone(),
        }
    }

    pub fn to_xml_string(&self) -> DomainResult<String> {
        let mut writer = Writer::new(Vec::new());
        if self.bom {
            let mut buf = [0; 3];
            writer
                .get_mut()
                .extend_from_slice(BOM.encode_utf8(&mut buf).as_bytes());
        }
        for node in &self.prolog {
            node.write_to(&mut writer)?;
        }
        self.root.write_to(&mut writer)?;
        for node in &self.epilog {
            node.write_to(&mut writer)?;
        }
        String::from_utf8(writer.into_inner()).map_err(|e| DomainError::Serialize(e.to_string()))
    }
}

/// Assembles the tree from the flat event stream.
#[derive(Default)]
struct TreeBuilder {
    open: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn open(&mut self, element: Element) {
        self.open.push(element);
    }

    fn close(&mut self, position: u64) -> DomainResult<()> {
        let element = self.open.pop().ok_or_else(|| {
            DomainError::parse("closing tag without matching opening tag", position)
        })?;
        self.append(Node::Element(element), position)
    }

    fn append(&mut self, node: Node, position: u64) -> DomainResult<()> {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
            return Ok(());
        }

        match node {
            Node::Element(element) => {
                if let Some(root) = &self.root {
                    return Err(DomainError::parse(
                        format!("second root element <{}> after <{}>", element.name, root.name),
                        position,
                    ));
                }
                self.root = Some(element);
            }
            Node::Text(text) if !is_blank(&text) => {
                return Err(DomainError::parse("text outside the root element", position));
            }
            Node::Other(Event::CData(_)) => {
                return Err(DomainError::parse("CDATA outside the root element", position));
            }
            other if self.root.is_none() => self.prolog.push(other),
            other => self.epilog.push(other),
        }
        Ok(())
    }

    fn finish(self, position: u64) -> DomainResult<Document> {
        if let Some(unclosed) = self.open.last() {
            return Err(DomainError::parse(
                format!("unclosed element <{}>", unclosed.name),
                position,
            ));
        }
        let root = self
            .root
            .ok_or_else(|| DomainError::parse("no root element", position))?;
        Ok(Document {
            bom: false,
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}
