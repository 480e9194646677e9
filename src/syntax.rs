//! Arena model of the JSX parts of a source file.
//!
//! The tree-sitter CST is lowered into this shape by [`crate::parser`]. Nodes
//! live in one `Vec` owned by [`JsxTree`]; parent links are plain indices, so a
//! [`Node`] is just a cheap `(tree, id)` pair that can walk in either direction.

/// Half-open byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn intersects(&self, other: Span) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Name of an element as written in its opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementName {
    /// `<div>`, `<Fragment>`
    Identifier(String),
    /// `<React.Fragment>`, `<a.b.C>`
    Member {
        object: Box<ElementName>,
        property: String,
    },
    /// `<svg:rect>`
    Namespaced { namespace: String, name: String },
}

impl ElementName {
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            ElementName::Identifier(name) => Some(name),
            ElementName::Member { .. } | ElementName::Namespaced { .. } => None,
        }
    }
}

impl std::fmt::Display for ElementName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ElementName::Identifier(name) => write!(f, "{}", name),
            ElementName::Member { object, property } => write!(f, "{}.{}", object, property),
            ElementName::Namespaced { namespace, name } => write!(f, "{}:{}", namespace, name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// Quoted string, quotes included.
    Literal(String),
    /// `{...}`
    Expression,
    /// `<Foo />` used directly as a value.
    Element,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// `None` for a spread attribute (`{...props}`).
    pub key: Option<String>,
    pub value: Option<AttributeValue>,
    pub span: Span,
}

/// Opening and closing delimiters of an element or fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tags {
    pub open: Span,
    /// `None` when the element is self-closing.
    pub close: Option<Span>,
}

impl Tags {
    pub fn is_self_closing(&self) -> bool {
        self.close.is_none()
    }

    /// Bytes strictly between the delimiters. Empty for self-closing tags.
    pub fn inner(&self) -> Span {
        match self.close {
            Some(close) => Span::new(self.open.end, close.start),
            None => Span::new(self.open.end, self.open.end),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: ElementName,
    pub attributes: Vec<Attribute>,
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element(Element),
    Fragment(Tags),
    /// Raw text between tags, whitespace included.
    Text(String),
    /// `{...}`; its single child is the expression.
    ExpressionContainer,
    /// The nothing inside `{}` or `{/* comment */}`.
    EmptyExpression,
    /// Any other syntax, tagged with its grammar kind.
    Other(&'static str),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    span: Span,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub span: Span,
    /// Comment text without its `//` or `/* */` delimiters.
    pub body: String,
}

#[derive(Debug, Clone)]
pub struct JsxTree {
    source: String,
    nodes: Vec<NodeData>,
    comments: Vec<Comment>,
}

impl JsxTree {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            nodes: Vec::new(),
            comments: Vec::new(),
        }
    }

    /// Append a node, linking it under `parent` when given.
    pub fn push(&mut self, kind: NodeKind, span: Span, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            span,
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn push_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn text(&self, span: Span) -> &str {
        &self.source[span.start..span.end]
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes without a parent: detached syntactic contexts.
    pub fn roots(&self) -> impl Iterator<Item = Node<'_>> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, data)| data.parent.is_none())
            .map(move |(i, _)| self.node(NodeId(i)))
    }

    /// Every element and fragment exactly once, in document order.
    pub fn elements(&self) -> Vec<Node<'_>> {
        let mut elements: Vec<Node<'_>> = (0..self.nodes.len())
            .map(|i| self.node(NodeId(i)))
            .filter(|n| n.is_element_or_fragment())
            .collect();
        elements.sort_by_key(|n| n.span().start);
        elements
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t JsxTree,
    id: NodeId,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id.0]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn tree(&self) -> &'t JsxTree {
        self.tree
    }

    pub fn kind(&self) -> &'t NodeKind {
        &self.data().kind
    }

    pub fn span(&self) -> Span {
        self.data().span
    }

    pub fn source_text(&self) -> &'t str {
        self.tree.text(self.span())
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| self.tree.node(id))
    }

    pub fn children(&self) -> impl ExactSizeIterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.data().children.iter().map(move |&id| tree.node(id))
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn first_child(&self) -> Option<Node<'t>> {
        self.data().children.first().map(|&id| self.tree.node(id))
    }

    pub fn element(&self) -> Option<&'t Element> {
        match self.kind() {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tags(&self) -> Option<Tags> {
        match self.kind() {
            NodeKind::Element(element) => Some(element.tags),
            NodeKind::Fragment(tags) => Some(*tags),
            _ => None,
        }
    }

    pub fn is_element_or_fragment(&self) -> bool {
        matches!(self.kind(), NodeKind::Element(_) | NodeKind::Fragment(_))
    }

    pub fn as_text(&self) -> Option<&'t str> {
        match self.kind() {
            NodeKind::Text(raw) => Some(raw),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("kind", self.kind())
            .field("span", &self.span())
            .finish()
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_and_children_links() {
        let mut tree = JsxTree::new("<>hi</>");
        let tags = Tags {
            open: Span::new(0, 2),
            close: Some(Span::new(4, 7)),
        };
        let fragment = tree.push(NodeKind::Fragment(tags), Span::new(0, 7), None);
        let text = tree.push(NodeKind::Text("hi".into()), Span::new(2, 4), Some(fragment));

        let node = tree.node(fragment);
        assert_eq!(node.child_count(), 1);
        assert_eq!(node.first_child().map(|c| c.id()), Some(text));
        assert_eq!(tree.node(text).parent(), Some(node));
        assert_eq!(tree.node(text).source_text(), "hi");
        assert_eq!(tags.inner(), Span::new(2, 4));
        assert_eq!(tree.elements().len(), 1);
    }

    #[test]
    fn test_element_name_display() {
        let name = ElementName::Member {
            object: Box::new(ElementName::Identifier("React".into())),
            property: "Fragment".into(),
        };
        assert_eq!(name.to_string(), "React.Fragment");
        assert_eq!(name.as_identifier(), None);
    }

    #[test]
    fn test_self_closing_inner_is_empty() {
        let tags = Tags {
            open: Span::new(3, 10),
            close: None,
        };
        assert!(tags.is_self_closing());
        assert_eq!(tags.inner(), Span::new(10, 10));
    }
}
