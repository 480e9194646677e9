use std::path::Path;

use tree_sitter::{Language, Node as TsNode, Parser};

use crate::error::LintError;
use crate::syntax::{
    Attribute, AttributeValue, Comment, Element, ElementName, JsxTree, NodeId, NodeKind, Span, Tags,
};

/// Which grammar a file is parsed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Javascript,
    Tsx,
}

impl Dialect {
    /// `None` for files that cannot contain JSX (including plain `.ts`, where
    /// `<T>x` is a type assertion).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "js" | "jsx" | "mjs" | "cjs" => Some(Dialect::Javascript),
            "tsx" => Some(Dialect::Tsx),
            _ => None,
        }
    }

    fn language(self) -> Language {
        match self {
            Dialect::Javascript => tree_sitter_javascript::LANGUAGE.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }
}

pub struct JsxParser {
    dialect: Dialect,
}

impl JsxParser {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn parse_cst(&self, source: &str) -> Result<tree_sitter::Tree, LintError> {
        let mut parser = Parser::new();
        parser.set_language(&self.dialect.language())?;
        parser.parse(source, None).ok_or(LintError::NoTree)
    }

    /// Parse `source` and lower its JSX into a [`JsxTree`].
    pub fn parse(&self, source: &str) -> Result<JsxTree, LintError> {
        let cst = self.parse_cst(source)?;
        let root = cst.root_node();

        if root.has_error() {
            let offset = first_error(root).map_or(root.start_byte(), |n| n.start_byte());
            tracing::debug!("syntax error at byte {}", offset);
            return Err(LintError::Syntax { offset });
        }

        let mut lowering = Lowering {
            source,
            tree: JsxTree::new(source),
        };
        lowering.collect_comments(root);
        lowering.walk(root);

        tracing::trace!("lowered {} nodes", lowering.tree.len());
        Ok(lowering.tree)
    }
}

fn first_error(node: TsNode) -> Option<TsNode> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(found) = first_error(child) {
                return Some(found);
            }
        }
    }
    None
}

fn child_of_kind<'t>(node: TsNode<'t>, kind: &str) -> Option<TsNode<'t>> {
    let mut cursor = node.walk();
    let found = node.named_children(&mut cursor).find(|c| c.kind() == kind);
    found
}

/// Name of an opening or self-closing tag; `None` for `<>`.
fn tag_name(tag: TsNode) -> Option<TsNode> {
    tag.child_by_field_name("name").or_else(|| {
        let mut cursor = tag.walk();
        let found = tag.named_children(&mut cursor).find(|c| {
            matches!(
                c.kind(),
                "identifier" | "member_expression" | "nested_identifier" | "jsx_namespace_name"
            )
        });
        found
    })
}

/// Attributes of a tag; a `{...spread}` shows up as a `jsx_expression`.
fn tag_attributes(tag: TsNode) -> Vec<TsNode> {
    let mut cursor = tag.walk();
    tag.named_children(&mut cursor)
        .filter(|c| matches!(c.kind(), "jsx_attribute" | "jsx_expression"))
        .collect()
}

fn is_jsx(node: TsNode) -> bool {
    matches!(node.kind(), "jsx_element" | "jsx_self_closing_element")
}

fn span_of(node: TsNode) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// Strip any number of parentheses around an expression.
fn unparenthesize(mut node: TsNode) -> TsNode {
    while node.kind() == "parenthesized_expression" {
        let mut cursor = node.walk();
        let inner = node
            .named_children(&mut cursor)
            .find(|c| c.kind() != "comment");
        match inner {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Kind of a container's expression. tree-sitter folds tagged templates,
/// `import(...)` and optional-chain calls into `call_expression`; those get
/// their own kinds so only a plain call reads as one.
fn expression_kind(node: TsNode) -> &'static str {
    if node.kind() != "call_expression" {
        return node.kind();
    }
    let arguments = node
        .child_by_field_name("arguments")
        .or_else(|| child_of_kind(node, "template_string"));
    if arguments.is_some_and(|a| a.kind() == "template_string") {
        return "tagged_template_expression";
    }
    let function = node.child_by_field_name("function");
    if function.is_some_and(|f| f.kind() == "import") {
        return "import_expression";
    }
    if in_optional_chain(node) {
        return "chain_expression";
    }
    "call_expression"
}

/// Whether a `?.` appears anywhere along a call or member chain. Parentheses
/// end the chain.
fn in_optional_chain(mut node: TsNode) -> bool {
    loop {
        if node.child_by_field_name("optional_chain").is_some()
            || child_of_kind(node, "optional_chain").is_some()
        {
            return true;
        }
        let next = match node.kind() {
            "call_expression" => node.child_by_field_name("function"),
            "member_expression" | "subscript_expression" => node.child_by_field_name("object"),
            _ => None,
        };
        match next {
            Some(next) => node = next,
            None => return false,
        }
    }
}

struct Lowering<'s> {
    source: &'s str,
    tree: JsxTree,
}

impl<'s> Lowering<'s> {
    fn node_text(&self, node: TsNode) -> &'s str {
        &self.source[node.byte_range()]
    }

    fn collect_comments(&mut self, root: TsNode) {
        let mut cursor = root.walk();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if node.kind() == "comment" {
                let text = self.node_text(node);
                self.tree.push_comment(Comment {
                    span: span_of(node),
                    body: comment_body(text).to_string(),
                });
                continue;
            }
            let children: Vec<_> = node.children(&mut cursor).collect();
            stack.extend(children.into_iter().rev());
        }
    }

    /// Find JSX outside of any children list and lower it under a detached
    /// context node.
    fn walk(&mut self, node: TsNode) {
        if is_jsx(node) {
            let context = self.context_for(node);
            self.lower_jsx(node, Some(context));
            return;
        }

        let mut cursor = node.walk();
        let children: Vec<_> = node.named_children(&mut cursor).collect();
        for child in children {
            self.walk(child);
        }
    }

    /// The syntactic parent of a JSX node, parentheses skipped the way ESTree
    /// drops them.
    fn context_for(&mut self, node: TsNode) -> NodeId {
        let mut parent = node.parent();
        while let Some(p) = parent {
            if p.kind() != "parenthesized_expression" {
                break;
            }
            parent = p.parent();
        }

        match parent {
            Some(p) if p.kind() == "jsx_expression" => {
                self.tree.push(NodeKind::ExpressionContainer, span_of(p), None)
            }
            Some(p) => self.tree.push(NodeKind::Other(p.kind()), span_of(p), None),
            None => self
                .tree
                .push(NodeKind::Other("program"), Span::new(0, self.source.len()), None),
        }
    }

    fn lower_jsx(&mut self, node: TsNode, parent: Option<NodeId>) -> NodeId {
        if node.kind() == "jsx_self_closing_element" {
            let element = Element {
                name: self.lower_name(tag_name(node)),
                attributes: self.lower_attributes(node),
                tags: Tags {
                    open: span_of(node),
                    close: None,
                },
            };
            let id = self
                .tree
                .push(NodeKind::Element(element), span_of(node), parent);
            self.walk_attributes(node);
            return id;
        }

        let open = node
            .child_by_field_name("open_tag")
            .or_else(|| child_of_kind(node, "jsx_opening_element"));
        let close = node
            .child_by_field_name("close_tag")
            .or_else(|| child_of_kind(node, "jsx_closing_element"));
        let (open_span, close_span) = match (open, close) {
            (Some(open), Some(close)) => (span_of(open), span_of(close)),
            // Unreachable on an error-free tree; keep the element opaque.
            _ => {
                return self
                    .tree
                    .push(NodeKind::Other(node.kind()), span_of(node), parent)
            }
        };
        let tags = Tags {
            open: open_span,
            close: Some(close_span),
        };

        let open = open.filter(|o| tag_name(*o).is_some());
        let kind = match open {
            Some(open) => NodeKind::Element(Element {
                name: self.lower_name(tag_name(open)),
                attributes: self.lower_attributes(open),
                tags,
            }),
            None => NodeKind::Fragment(tags),
        };
        let id = self.tree.push(kind, span_of(node), parent);
        if let Some(open) = open {
            self.walk_attributes(open);
        }

        self.lower_children(node, id, tags);
        id
    }

    /// Rebuild the children list from the bytes between the tags. Whitespace
    /// is not in the CST, so every gap between nested elements and `{...}`
    /// containers becomes one text node.
    fn lower_children(&mut self, node: TsNode, id: NodeId, tags: Tags) {
        let inner = tags.inner();
        let mut pos = inner.start;

        let mut cursor = node.walk();
        let structural: Vec<_> = node
            .named_children(&mut cursor)
            .filter(|c| {
                c.start_byte() >= inner.start
                    && c.end_byte() <= inner.end
                    && (is_jsx(*c) || c.kind() == "jsx_expression")
            })
            .collect();

        for child in structural {
            if child.start_byte() > pos {
                self.push_text(Span::new(pos, child.start_byte()), id);
            }
            if child.kind() == "jsx_expression" {
                self.lower_container(child, id);
            } else {
                self.lower_jsx(child, Some(id));
            }
            pos = child.end_byte();
        }

        if inner.end > pos {
            self.push_text(Span::new(pos, inner.end), id);
        }
    }

    fn push_text(&mut self, span: Span, parent: NodeId) {
        let raw = self.source[span.start..span.end].to_string();
        self.tree.push(NodeKind::Text(raw), span, Some(parent));
    }

    fn lower_container(&mut self, node: TsNode, parent: NodeId) {
        let container = self
            .tree
            .push(NodeKind::ExpressionContainer, span_of(node), Some(parent));

        let mut cursor = node.walk();
        let expression = node
            .named_children(&mut cursor)
            .find(|c| c.kind() != "comment");

        match expression {
            None => {
                let inside = Span::new(node.start_byte() + 1, node.end_byte().saturating_sub(1));
                self.tree
                    .push(NodeKind::EmptyExpression, inside, Some(container));
            }
            Some(expression) => {
                let expression = unparenthesize(expression);
                if is_jsx(expression) {
                    self.lower_jsx(expression, Some(container));
                } else {
                    self.tree.push(
                        NodeKind::Other(expression_kind(expression)),
                        span_of(expression),
                        Some(container),
                    );
                    self.walk(expression);
                }
            }
        }
    }

    fn walk_attributes(&mut self, tag: TsNode) {
        for attribute in tag_attributes(tag) {
            self.walk(attribute);
        }
    }

    fn lower_attributes(&self, tag: TsNode) -> Vec<Attribute> {
        tag_attributes(tag)
            .into_iter()
            .map(|attribute| self.lower_attribute(attribute))
            .collect()
    }

    fn lower_attribute(&self, node: TsNode) -> Attribute {
        let span = span_of(node);
        if node.kind() != "jsx_attribute" {
            // `{...props}`
            return Attribute {
                key: None,
                value: Some(AttributeValue::Expression),
                span,
            };
        }

        let mut cursor = node.walk();
        let mut named = node.named_children(&mut cursor).filter(|c| c.kind() != "comment");
        let key = named.next().map(|n| self.node_text(n).to_string());
        let value = named.next().map(|v| match v.kind() {
            "jsx_expression" => AttributeValue::Expression,
            "jsx_element" | "jsx_self_closing_element" => AttributeValue::Element,
            _ => AttributeValue::Literal(self.node_text(v).to_string()),
        });

        Attribute { key, value, span }
    }

    fn lower_name(&self, node: Option<TsNode>) -> ElementName {
        let Some(node) = node else {
            return ElementName::Identifier(String::new());
        };

        match node.kind() {
            "member_expression" | "nested_identifier" => {
                let object = node
                    .child_by_field_name("object")
                    .or_else(|| node.named_child(0));
                let property = node
                    .child_by_field_name("property")
                    .or_else(|| node.named_child(node.named_child_count().saturating_sub(1)));
                ElementName::Member {
                    object: Box::new(self.lower_name(object)),
                    property: property
                        .map(|p| self.node_text(p).to_string())
                        .unwrap_or_default(),
                }
            }
            "jsx_namespace_name" => {
                let namespace = node.named_child(0).map(|n| self.node_text(n).to_string());
                let name = node.named_child(1).map(|n| self.node_text(n).to_string());
                ElementName::Namespaced {
                    namespace: namespace.unwrap_or_default(),
                    name: name.unwrap_or_default(),
                }
            }
            _ => ElementName::Identifier(self.node_text(node).to_string()),
        }
    }
}

/// `// text` -> ` text`, `/* text */` -> ` text `.
fn comment_body(text: &str) -> &str {
    if let Some(line) = text.strip_prefix("//") {
        return line;
    }
    if let Some(block) = text.strip_prefix("/*") {
        return block.strip_suffix("*/").unwrap_or(block);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> JsxTree {
        JsxParser::new(Dialect::Javascript).parse(source).unwrap()
    }

    fn kinds(tree: &JsxTree, id: NodeId) -> Vec<String> {
        tree.node(id)
            .children()
            .map(|c| match c.kind() {
                NodeKind::Element(e) => format!("element:{}", e.name),
                NodeKind::Fragment(_) => "fragment".to_string(),
                NodeKind::Text(raw) => format!("text:{:?}", raw),
                NodeKind::ExpressionContainer => "container".to_string(),
                NodeKind::EmptyExpression => "empty".to_string(),
                NodeKind::Other(kind) => format!("other:{}", kind),
            })
            .collect()
    }

    #[test]
    fn test_fragment_children_keep_whitespace() {
        let tree = parse("<>\n  <div/> text {x}\n</>");
        let elements = tree.elements();
        let fragment = elements[0];
        assert!(matches!(fragment.kind(), NodeKind::Fragment(_)));
        assert_eq!(
            kinds(&tree, fragment.id()),
            vec![
                "text:\"\\n  \"".to_string(),
                "element:div".to_string(),
                "text:\" text \"".to_string(),
                "container".to_string(),
                "text:\"\\n\"".to_string(),
            ]
        );
    }

    #[test]
    fn test_top_level_context_is_not_jsx() {
        let tree = parse("const a = <></>;");
        let fragment = tree.elements()[0];
        let parent = fragment.parent().unwrap();
        assert!(matches!(parent.kind(), NodeKind::Other("variable_declarator")));
        assert_eq!(fragment.child_count(), 0);
    }

    #[test]
    fn test_attribute_value_context_is_container() {
        let tree = parse(r#"<div p={<>{"a"}{"b"}</>} />"#);
        let elements = tree.elements();
        assert_eq!(elements.len(), 2);

        let div = elements[0].element().unwrap();
        assert_eq!(div.name, ElementName::Identifier("div".into()));
        assert_eq!(div.attributes[0].key.as_deref(), Some("p"));
        assert_eq!(div.attributes[0].value, Some(AttributeValue::Expression));

        let parent = elements[1].parent().unwrap();
        assert_eq!(parent.kind(), &NodeKind::ExpressionContainer);
        assert!(parent.parent().is_none());
    }

    #[test]
    fn test_expression_container_contents() {
        let tree = parse("<>{}{/* c */}{foo()}{(<b/>)}</>");
        let fragment = tree.elements()[0];
        let inner: Vec<_> = fragment
            .children()
            .map(|c| c.first_child().unwrap().kind().clone())
            .collect();

        assert_eq!(inner[0], NodeKind::EmptyExpression);
        assert_eq!(inner[1], NodeKind::EmptyExpression);
        assert_eq!(inner[2], NodeKind::Other("call_expression"));
        assert!(matches!(inner[3], NodeKind::Element(_)));
    }

    #[test]
    fn test_call_like_expressions() {
        let tree = parse("<>{html`x`}{import('x')}{foo?.()}{a?.b.map(f)}{(a?.b).map(f)}{foo.bar(1)}</>");
        let fragment = tree.elements()[0];
        let inner: Vec<_> = fragment
            .children()
            .map(|c| c.first_child().unwrap().kind().clone())
            .collect();

        assert_eq!(
            inner,
            vec![
                NodeKind::Other("tagged_template_expression"),
                NodeKind::Other("import_expression"),
                NodeKind::Other("chain_expression"),
                NodeKind::Other("chain_expression"),
                NodeKind::Other("call_expression"),
                NodeKind::Other("call_expression"),
            ]
        );
    }

    #[test]
    fn test_member_name_and_key_attribute() {
        let tree = parse("<React.Fragment key={id}>x</React.Fragment>");
        let element = tree.elements()[0].element().unwrap();
        assert_eq!(element.name.to_string(), "React.Fragment");
        assert_eq!(element.attributes[0].key.as_deref(), Some("key"));
        assert!(!element.tags.is_self_closing());
    }

    #[test]
    fn test_spread_attribute_has_no_key() {
        let tree = parse("<Fragment {...props} />");
        let element = tree.elements()[0].element().unwrap();
        assert_eq!(element.attributes.len(), 1);
        assert_eq!(element.attributes[0].key, None);
        assert!(element.tags.is_self_closing());
    }

    #[test]
    fn test_nested_jsx_in_expression_gets_own_context() {
        let tree = parse("<div>{items.map(i => <>{i}</>)}</div>");
        let elements = tree.elements();
        assert_eq!(elements.len(), 2);
        let parent = elements[1].parent().unwrap();
        assert!(matches!(parent.kind(), NodeKind::Other("arrow_function")));
    }

    #[test]
    fn test_comments_are_collected_without_delimiters() {
        let tree = parse("/** @jsx h */\n// line\nconst a = <div/>;");
        let bodies: Vec<_> = tree.comments().iter().map(|c| c.body.as_str()).collect();
        assert_eq!(bodies, vec!["* @jsx h ", " line"]);
    }

    #[test]
    fn test_syntax_error_is_rejected() {
        let result = JsxParser::new(Dialect::Javascript).parse("<div>{ </div>");
        assert!(matches!(result, Err(LintError::Syntax { .. })));
    }

    #[test]
    fn test_tsx_dialect() {
        let tree = JsxParser::new(Dialect::Tsx)
            .parse("const a: JSX.Element = <><b/></>;")
            .unwrap();
        assert_eq!(tree.elements().len(), 2);
    }

    #[test]
    fn test_dialect_from_path() {
        assert_eq!(Dialect::from_path(Path::new("a/b.jsx")), Some(Dialect::Javascript));
        assert_eq!(Dialect::from_path(Path::new("b.tsx")), Some(Dialect::Tsx));
        assert_eq!(Dialect::from_path(Path::new("b.ts")), None);
        assert_eq!(Dialect::from_path(Path::new("Makefile")), None);
    }
}
