//! Minimal mutable XML tree over quick-xml events.
//!
//! Elements keep their original start tag (name and raw attributes), so a
//! parse/serialize round trip leaves untouched markup byte-compatible. Text is
//! stored unescaped and re-escaped on write.

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesStart, BytesText, Event};

use crate::error::DocxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeId(usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Element(BytesStart<'static>),
    Text(String),
    /// Declarations, comments, processing instructions, CDATA.
    Raw(Event<'static>),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    children: Vec<NodeId>,
}

/// Arena of nodes. Detached nodes stay in the arena but are never written.
#[derive(Debug, Clone, Default)]
pub(crate) struct XmlTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl XmlTree {
    pub(crate) fn parse(xml: &str) -> Result<Self, DocxError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);

        let mut tree = XmlTree::default();
        let mut stack: Vec<NodeId> = Vec::new();
        loop {
            let parent = stack.last().copied();
            match reader.read_event()? {
                Event::Start(e) => {
                    let id = tree.push(NodeKind::Element(e.into_owned()), parent);
                    stack.push(id);
                }
                Event::Empty(e) => {
                    tree.push(NodeKind::Element(e.into_owned()), parent);
                }
                Event::End(_) => {
                    stack.pop();
                }
                Event::Text(e) => {
                    let text = e.unescape()?.into_owned();
                    tree.push(NodeKind::Text(text), parent);
                }
                Event::Eof => break,
                other => {
                    tree.push(NodeKind::Raw(other.into_owned()), parent);
                }
            }
        }
        Ok(tree)
    }

    fn push(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    // ── Queries ──

    /// Qualified element name, `None` for non-element nodes.
    pub(crate) fn name(&self, id: NodeId) -> Option<&[u8]> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(start) => Some(start.name().into_inner()),
            _ => None,
        }
    }

    pub(crate) fn is(&self, id: NodeId, name: &str) -> bool {
        self.name(id) == Some(name.as_bytes())
    }

    pub(crate) fn text(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].kind {
            NodeKind::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub(crate) fn child_elements(&self, id: NodeId, name: &str) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.is(*c, name))
            .collect()
    }

    pub(crate) fn first_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.children(id).iter().copied().find(|c| self.is(*c, name))
    }

    /// Pre-order descendants, excluding `id` itself.
    pub(crate) fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// First element with this name anywhere in the tree, document order.
    pub(crate) fn find(&self, name: &str) -> Option<NodeId> {
        self.roots.iter().find_map(|r| {
            if self.is(*r, name) {
                Some(*r)
            } else {
                self.descendants(*r).into_iter().find(|n| self.is(*n, name))
            }
        })
    }

    // ── Mutation ──

    pub(crate) fn new_element(&mut self, name: &str) -> NodeId {
        let start = BytesStart::new(name.to_string());
        self.push_detached(NodeKind::Element(start))
    }

    pub(crate) fn new_text(&mut self, text: &str) -> NodeId {
        self.push_detached(NodeKind::Text(text.to_string()))
    }

    /// Deep copy of a subtree; the copy starts detached.
    pub(crate) fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let kind = self.nodes[id.0].kind.clone();
        let copy = self.push_detached(kind);
        let children = self.children(id).to_vec();
        for child in children {
            let c = self.deep_clone(child);
            self.nodes[copy.0].children.push(c);
        }
        copy
    }

    fn push_detached(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            children: Vec::new(),
        });
        id
    }

    pub(crate) fn append(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    pub(crate) fn insert(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        let at = index.min(children.len());
        children.insert(at, child);
    }

    pub(crate) fn set_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        self.nodes[parent.0].children = children;
    }

    pub(crate) fn set_attr(&mut self, id: NodeId, key: &str, value: &str) {
        if let NodeKind::Element(start) = &mut self.nodes[id.0].kind {
            let already = start
                .attributes()
                .flatten()
                .any(|a| a.key.as_ref() == key.as_bytes());
            if !already {
                start.push_attribute((key.as_bytes(), value.as_bytes()));
            }
        }
    }

    // ── Output ──

    pub(crate) fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut writer = Writer::new(Vec::new());
        for root in &self.roots {
            self.write_node(*root, &mut writer)?;
        }
        Ok(writer.into_inner())
    }

    fn write_node(&self, id: NodeId, writer: &mut Writer<Vec<u8>>) -> Result<(), DocxError> {
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Element(start) if node.children.is_empty() => {
                writer.write_event(Event::Empty(start.borrow()))?;
            }
            NodeKind::Element(start) => {
                writer.write_event(Event::Start(start.borrow()))?;
                for child in &node.children {
                    self.write_node(*child, writer)?;
                }
                writer.write_event(Event::End(start.to_end()))?;
            }
            NodeKind::Text(s) => {
                writer.write_event(Event::Text(BytesText::new(s)))?;
            }
            NodeKind::Raw(event) => {
                writer.write_event(event.clone())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_keeps_markup() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><a x="1"><b/><c>hi &amp; bye</c></a>"#;
        let tree = XmlTree::parse(xml).unwrap();
        let out = String::from_utf8(tree.to_bytes().unwrap()).unwrap();
        assert_eq!(out, xml);
    }

    #[test]
    fn find_and_descend() {
        let tree = XmlTree::parse("<r><x><y/></x><y/></r>").unwrap();
        let x = tree.find("x").unwrap();
        assert_eq!(tree.descendants(x).len(), 1);
        let r = tree.find("r").unwrap();
        assert_eq!(tree.child_elements(r, "y").len(), 1);
        assert_eq!(tree.descendants(r).len(), 3);
    }

    #[test]
    fn new_nodes_serialize_escaped() {
        let mut tree = XmlTree::parse("<r/>").unwrap();
        let r = tree.find("r").unwrap();
        let t = tree.new_element("t");
        tree.set_attr(t, "xml:space", "preserve");
        let txt = tree.new_text("a < b");
        tree.append(t, txt);
        tree.append(r, t);
        let out = String::from_utf8(tree.to_bytes().unwrap()).unwrap();
        assert_eq!(out, r#"<r><t xml:space="preserve">a &lt; b</t></r>"#);
    }

    #[test]
    fn set_attr_does_not_duplicate() {
        let mut tree = XmlTree::parse(r#"<t xml:space="preserve"/>"#).unwrap();
        let t = tree.find("t").unwrap();
        tree.set_attr(t, "xml:space", "preserve");
        let out = String::from_utf8(tree.to_bytes().unwrap()).unwrap();
        assert_eq!(out, r#"<t xml:space="preserve"/>"#);
    }
}
