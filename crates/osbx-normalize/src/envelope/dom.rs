//! Minimal read-only node tree over a namespace-aware XML parse.
//!
//! Only what envelope lookup needs is kept: node kinds, first-child and
//! next-sibling links. Whitespace text, comments and processing instructions
//! inside the root element are real nodes, as in a DOM.
//!
//! The input is decoded to text before parsing. General entities declared
//! with a literal value in the internal DTD subset are expanded as text;
//! an external or otherwise undeclared entity fails the parse.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Element { name: String },
    Text(String),
    /// Literal character data, verbatim.
    CData(Vec<u8>),
    Comment,
    ProcessingInstruction,
}

#[derive(Debug)]
struct Node {
    kind: NodeKind,
    first_child: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("document is not valid {0}")]
    Encoding(&'static str),

    #[error("malformed character data: {0}")]
    Text(String),

    #[error("namespace prefix '{0}' is not bound")]
    UnboundPrefix(String),

    #[error("document has no root element")]
    NoRoot,

    #[error("more than one root element")]
    MultipleRoots,

    #[error("character data outside the root element")]
    StrayText,

    #[error("element '{0}' is never closed")]
    Unclosed(String),

    #[error("closing tag without a matching opening tag")]
    UnexpectedEnd,
}

#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        let decoded = super::decode::decode_document(bytes).map_err(ParseError::Encoding)?;
        let mut reader = NsReader::from_str(&decoded);
        let mut builder = TreeBuilder::default();
        let mut entities: HashMap<String, String> = HashMap::new();

        loop {
            let (ns, event) = reader.read_resolved_event()?;
            if let ResolveResult::Unknown(prefix) = ns {
                if !is_reserved_prefix(&prefix) {
                    return Err(ParseError::UnboundPrefix(lossy(&prefix)));
                }
            }

            match event {
                Event::Start(e) => {
                    check_attributes(&reader, &e)?;
                    builder.open(element_name(&e))?;
                }
                Event::Empty(e) => {
                    check_attributes(&reader, &e)?;
                    builder.open(element_name(&e))?;
                    builder.close()?;
                }
                Event::End(_) => builder.close()?,
                Event::Text(t) => {
                    let text = t
                        .unescape_with(|name| entities.get(name).map(String::as_str))
                        .map_err(|e| ParseError::Text(e.to_string()))?;
                    builder.text(text.into_owned())?;
                }
                Event::DocType(d) => entities = internal_entities(&lossy(&d)),
                Event::CData(c) => builder.leaf(NodeKind::CData(c.into_inner().into_owned()))?,
                Event::Comment(_) => builder.leaf(NodeKind::Comment)?,
                Event::PI(_) => builder.leaf(NodeKind::ProcessingInstruction)?,
                Event::Eof => break,
                _ => {}
            }
        }

        builder.finish()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].first_child
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].next_sibling
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Literal-valued general entities of an internal subset. The first
/// declaration of a name wins.
fn internal_entities(doctype: &str) -> HashMap<String, String> {
    const DECL: &str = "<!ENTITY";

    let mut entities = HashMap::new();
    let mut rest = doctype;
    while let Some(at) = rest.find(DECL) {
        rest = rest[at + DECL.len()..].trim_start();
        if rest.starts_with('%') {
            continue;
        }
        let Some(name_end) = rest.find(char::is_whitespace) else {
            break;
        };
        let (name, value) = rest.split_at(name_end);
        let value = value.trim_start();
        let Some(quote) = value.chars().next().filter(|c| *c == '"' || *c == '\'') else {
            // SYSTEM or PUBLIC
            rest = value;
            continue;
        };
        let value = &value[1..];
        let Some(end) = value.find(quote) else {
            break;
        };
        entities
            .entry(name.to_string())
            .or_insert_with(|| value[..end].to_string());
        rest = &value[end + 1..];
    }
    entities
}

fn is_reserved_prefix(prefix: &[u8]) -> bool {
    prefix == b"xml" || prefix == b"xmlns"
}

fn element_name(e: &BytesStart<'_>) -> String {
    lossy(e.name().as_ref())
}

fn check_attributes(reader: &NsReader<&[u8]>, e: &BytesStart<'_>) -> Result<(), ParseError> {
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        if let (ResolveResult::Unknown(prefix), _) = reader.resolve_attribute(attr.key) {
            if !is_reserved_prefix(&prefix) {
                return Err(ParseError::UnboundPrefix(lossy(&prefix)));
            }
        }
    }
    Ok(())
}

struct OpenElement {
    id: NodeId,
    name: String,
    last_child: Option<NodeId>,
}

#[derive(Default)]
struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<OpenElement>,
    root: Option<NodeId>,
}

impl TreeBuilder {
    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(Node {
            kind,
            first_child: None,
            next_sibling: None,
        });

        if let Some(parent) = self.open.last_mut() {
            match parent.last_child {
                Some(prev) => self.nodes[prev].next_sibling = Some(id),
                None => self.nodes[parent.id].first_child = Some(id),
            }
            parent.last_child = Some(id);
        }
        id
    }

    fn open(&mut self, name: String) -> Result<(), ParseError> {
        if self.open.is_empty() && self.root.is_some() {
            return Err(ParseError::MultipleRoots);
        }

        let id = self.push(NodeKind::Element { name: name.clone() });
        if self.open.is_empty() {
            self.root = Some(id);
        }
        self.open.push(OpenElement {
            id,
            name,
            last_child: None,
        });
        Ok(())
    }

    fn close(&mut self) -> Result<(), ParseError> {
        self.open.pop().map(|_| ()).ok_or(ParseError::UnexpectedEnd)
    }

    fn text(&mut self, text: String) -> Result<(), ParseError> {
        let Some(parent) = self.open.last() else {
            // Whitespace is allowed around the root element.
            return if text.trim().is_empty() {
                Ok(())
            } else {
                Err(ParseError::StrayText)
            };
        };
        if text.is_empty() {
            return Ok(());
        }

        // Adjacent text is a single node.
        if let Some(prev) = parent.last_child {
            if let NodeKind::Text(existing) = &mut self.nodes[prev].kind {
                existing.push_str(&text);
                return Ok(());
            }
        }
        self.push(NodeKind::Text(text));
        Ok(())
    }

    fn leaf(&mut self, kind: NodeKind) -> Result<(), ParseError> {
        if self.open.is_empty() {
            return match kind {
                NodeKind::CData(_) => Err(ParseError::StrayText),
                _ => Ok(()),
            };
        }
        self.push(kind);
        Ok(())
    }

    fn finish(self) -> Result<Document, ParseError> {
        if let Some(unclosed) = self.open.last() {
            return Err(ParseError::Unclosed(unclosed.name.clone()));
        }
        let root = self.root.ok_or(ParseError::NoRoot)?;
        Ok(Document {
            nodes: self.nodes,
            root,
        })
    }
}
