//! DOM tree data structures.
//!
//! The document is an arena of nodes addressed by [`NodeId`]. Nodes are
//! never freed: removing a node detaches it from its parent, and the id stays
//! valid for the lifetime of the document so controllers can keep holding it.

use core::fmt;
use tr_core::TrellisError;
use tr_core::TrellisResult;

mod style;

pub use style::parse_declarations;
pub use style::serialize_declarations;

/// ID used to address nodes in the DOM arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Payload of a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

/// Tag name plus attributes in source order. Names are ASCII-lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Mutable document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    url: Option<String>,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
            url: None,
            focused: None,
        }
    }

    /// The document node. Every connected node descends from it.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever allocated, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    /// First non-empty `<title>` text, whitespace-collapsed.
    pub fn title(&self) -> Option<String> {
        self.descendants(self.root())
            .filter(|id| self.tag_name(*id) == Some("title"))
            .map(|id| collapse_whitespace(&self.text_content(id)))
            .find(|title| !title.is_empty())
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|node| &node.data)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id)? {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// Ancestors from the parent up to the document node.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            document: self,
            next: self.parent(id),
        }
    }

    /// Descendants of `id` in document (pre-)order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants {
            document: self,
            stack,
        }
    }

    /// Inclusive containment, matching `Node.contains`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if !self.contains_node(node) {
            return false;
        }
        node == ancestor || self.ancestors(node).any(|candidate| candidate == ancestor)
    }

    /// True when the node is reachable from the document node.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.root(), id)
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element(ElementData::new(tag)))
    }

    pub fn create_element_with(&mut self, data: ElementData) -> NodeId {
        self.push_node(NodeData::Element(data))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push_node(NodeData::Text(text.into()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> TrellisResult<()> {
        self.require(parent)?;
        self.require(child)?;

        if matches!(self.nodes[parent.0].data, NodeData::Text(_)) {
            return Err(TrellisError::new(
                "dom.hierarchy_request",
                format!("cannot append {child} to text {parent}"),
            ));
        }
        if matches!(self.nodes[child.0].data, NodeData::Document) {
            return Err(TrellisError::new(
                "dom.hierarchy_request",
                "the document node cannot be re-parented",
            ));
        }
        if self.contains(child, parent) {
            return Err(TrellisError::new(
                "dom.hierarchy_request",
                format!("cannot append {child} into its own subtree"),
            ));
        }

        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    /// Detaches `id` from its parent. Detaching a detached node is a no-op.
    pub fn remove(&mut self, id: NodeId) -> TrellisResult<()> {
        self.require(id)?;
        if id == self.root() {
            return Err(TrellisError::new(
                "dom.hierarchy_request",
                "the document node cannot be removed",
            ));
        }

        if self.focused.is_some_and(|focused| self.contains(id, focused)) {
            self.focused = None;
        }
        self.detach(id);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.nodes[id.0].parent.take() else {
            return;
        };
        self.nodes[parent.0].children.retain(|child| *child != id);
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        self.element(id)
            .map(|element| element.attrs.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> TrellisResult<()> {
        let name = name.to_ascii_lowercase();
        let element = self.element_mut(id)?;
        if let Some(slot) = element.attrs.iter_mut().find(|(key, _)| *key == name) {
            if slot.1 != value {
                slot.1 = value.to_owned();
            }
        } else {
            element.attrs.push((name, value.to_owned()));
        }
        Ok(())
    }

    /// Returns whether the attribute was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> TrellisResult<bool> {
        let name = name.to_ascii_lowercase();
        let element = self.element_mut(id)?;
        let before = element.attrs.len();
        element.attrs.retain(|(key, _)| *key != name);
        Ok(element.attrs.len() != before)
    }

    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.attribute(id, "class")
            .unwrap_or("")
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, id: NodeId, class_name: &str) -> bool {
        self.classes(id).any(|candidate| candidate == class_name)
    }

    pub fn add_class(&mut self, id: NodeId, class_name: &str) -> TrellisResult<()> {
        self.toggle_class(id, class_name, Some(true)).map(|_| ())
    }

    pub fn remove_class(&mut self, id: NodeId, class_name: &str) -> TrellisResult<()> {
        self.toggle_class(id, class_name, Some(false)).map(|_| ())
    }

    /// `classList.toggle` semantics; returns whether the class is present afterwards.
    pub fn toggle_class(
        &mut self,
        id: NodeId,
        class_name: &str,
        force: Option<bool>,
    ) -> TrellisResult<bool> {
        self.element_mut(id)?;
        let mut classes: Vec<String> = self.classes(id).map(ToOwned::to_owned).collect();
        let present = classes.iter().any(|candidate| candidate == class_name);
        let want = force.unwrap_or(!present);

        if want == present {
            return Ok(present);
        }

        if want {
            classes.push(class_name.to_owned());
        } else {
            classes.retain(|candidate| candidate != class_name);
        }
        self.set_attribute(id, "class", &classes.join(" "))?;
        Ok(want)
    }

    /// Value of one inline style property, read from the `style` attribute.
    pub fn style_property(&self, id: NodeId, name: &str) -> Option<String> {
        let declarations = parse_declarations(self.attribute(id, "style")?);
        declarations
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Sets one inline style property; an empty value removes it, like
    /// assigning `''` through `element.style`.
    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) -> TrellisResult<()> {
        self.element_mut(id)?;
        let name = name.trim().to_ascii_lowercase();
        let mut declarations = self
            .attribute(id, "style")
            .map(parse_declarations)
            .unwrap_or_default();

        let value = value.trim();
        if value.is_empty() {
            declarations.retain(|(key, _)| *key != name);
        } else if let Some(slot) = declarations.iter_mut().find(|(key, _)| *key == name) {
            slot.1 = value.to_owned();
        } else {
            declarations.push((name, value.to_owned()));
        }

        if declarations.is_empty() {
            self.remove_attribute(id, "style")?;
            return Ok(());
        }
        self.set_attribute(id, "style", &serialize_declarations(&declarations))
    }

    /// Merges a block of declarations (`cssText`-style) into the inline style.
    pub fn apply_style_text(&mut self, id: NodeId, css_text: &str) -> TrellisResult<()> {
        for (name, value) in parse_declarations(css_text) {
            self.set_style_property(id, &name, &value)?;
        }
        Ok(())
    }

    /// False only when the inline style says `display: none`.
    pub fn is_displayed(&self, id: NodeId) -> bool {
        self.style_property(id, "display")
            .is_none_or(|display| !display.eq_ignore_ascii_case("none"))
    }

    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(NodeData::Text(text)) = self.data(id) {
            return text.clone();
        }

        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(NodeData::Text(text)) = self.data(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// Replaces all children with a single text node.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> TrellisResult<()> {
        self.require(id)?;
        if let NodeData::Text(existing) = &mut self.nodes[id.0].data {
            *existing = text.to_owned();
            return Ok(());
        }

        for child in self.children(id).to_vec() {
            self.remove(child)?;
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    pub fn element_by_id(&self, element_id: &str) -> Option<NodeId> {
        if element_id.is_empty() {
            return None;
        }
        self.descendants(self.root())
            .find(|node| self.attribute(*node, "id") == Some(element_id))
    }

    /// First `<body>` element, if the markup had one.
    pub fn body(&self) -> Option<NodeId> {
        self.descendants(self.root())
            .find(|node| self.tag_name(*node) == Some("body"))
    }

    /// Where injected page-level markup goes: the body, or the document node
    /// for bare fragments.
    pub fn body_or_root(&self) -> NodeId {
        self.body().unwrap_or_else(|| self.root())
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn focus(&mut self, id: NodeId) -> TrellisResult<()> {
        self.element_mut(id)?;
        self.focused = Some(id);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    fn require(&self, id: NodeId) -> TrellisResult<()> {
        if self.contains_node(id) {
            Ok(())
        } else {
            Err(unknown_node(id))
        }
    }

    fn element_mut(&mut self, id: NodeId) -> TrellisResult<&mut ElementData> {
        match self.nodes.get_mut(id.0).map(|node| &mut node.data) {
            Some(NodeData::Element(element)) => Ok(element),
            Some(_) => Err(TrellisError::new(
                "dom.not_an_element",
                format!("{id} is not an element"),
            )),
            None => Err(unknown_node(id)),
        }
    }
}

fn unknown_node(id: NodeId) -> TrellisError {
    TrellisError::new(
        "dom.unknown_node",
        format!("{id} is not part of this document"),
    )
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Iterator over a node's ancestors, nearest first.
#[derive(Debug)]
pub struct Ancestors<'a> {
    document: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.document.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree.
#[derive(Debug)]
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.stack.pop()?;
        self.stack
            .extend(self.document.children(current).iter().rev().copied());
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use super::NodeId;

    fn tree() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let body = doc.create_element("BODY");
        let section = doc.create_element("section");
        let para = doc.create_element("p");
        let text = doc.create_text("hello");
        let root = doc.root();
        assert!(doc.append_child(root, body).is_ok());
        assert!(doc.append_child(body, section).is_ok());
        assert!(doc.append_child(section, para).is_ok());
        assert!(doc.append_child(para, text).is_ok());
        (doc, body, section, para)
    }

    #[test]
    fn descendants_follow_document_order() {
        let (doc, body, section, para) = tree();
        let order: Vec<NodeId> = doc.descendants(doc.root()).collect();
        assert_eq!(&order[..3], &[body, section, para]);
        assert_eq!(doc.tag_name(body), Some("body"));
        assert_eq!(doc.text_content(body), "hello");
        assert_eq!(doc.body(), Some(body));
    }

    #[test]
    fn rejects_cycles_and_unknown_nodes() {
        let (mut doc, body, section, _) = tree();
        let cycle = doc.append_child(section, body);
        assert!(cycle.is_err_and(|error| error.is("dom.hierarchy_request")));

        let missing = doc.set_attribute(super::NodeId(999), "id", "x");
        assert!(missing.is_err_and(|error| error.is("dom.unknown_node")));
    }

    #[test]
    fn class_toggle_mirrors_class_list() {
        let (mut doc, _, section, _) = tree();
        assert!(doc.set_attribute(section, "class", "carousel-dot").is_ok());
        assert_eq!(doc.toggle_class(section, "active", None), Ok(true));
        assert!(doc.has_class(section, "active"));
        assert_eq!(doc.toggle_class(section, "active", Some(true)), Ok(true));
        assert_eq!(doc.attribute(section, "class"), Some("carousel-dot active"));
        assert_eq!(doc.toggle_class(section, "active", None), Ok(false));
        assert_eq!(doc.attribute(section, "class"), Some("carousel-dot"));
    }

    #[test]
    fn inline_style_round_trips_through_attribute() {
        let (mut doc, _, section, _) = tree();
        assert!(doc.set_style_property(section, "display", "none").is_ok());
        assert!(!doc.is_displayed(section));
        assert!(doc.set_style_property(section, "cursor", "pointer").is_ok());
        assert_eq!(
            doc.attribute(section, "style"),
            Some("display: none; cursor: pointer;")
        );
        assert!(doc.set_style_property(section, "display", "block").is_ok());
        assert!(doc.is_displayed(section));
        assert!(doc.set_style_property(section, "display", "").is_ok());
        assert!(doc.set_style_property(section, "cursor", "").is_ok());
        assert!(!doc.has_attribute(section, "style"));
    }

    #[test]
    fn removing_a_subtree_drops_focus_inside_it() {
        let (mut doc, body, section, para) = tree();
        assert!(doc.focus(para).is_ok());
        assert!(doc.remove(section).is_ok());
        assert_eq!(doc.focused(), None);
        assert!(!doc.is_connected(para));
        assert!(doc.children(body).is_empty());
        assert!(doc.contains(section, para));
    }

    #[test]
    fn set_text_content_replaces_children() {
        let (mut doc, _, section, _) = tree();
        assert!(doc.set_text_content(section, "Copied!").is_ok());
        assert_eq!(doc.children(section).len(), 1);
        assert_eq!(doc.text_content(section), "Copied!");
    }
}
