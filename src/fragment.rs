//! The `jsx-no-useless-fragment` rule.
//!
//! A fragment is useless when it wraps fewer than two meaningful children, or
//! when it sits directly inside a host element (`<div>`), which accepts a list
//! of children anyway. Removal is offered as a fix only where collapsing the
//! fragment cannot change the shape of the value a consumer receives.

use crate::pragma::Pragmas;
use crate::syntax::{Attribute, Element, ElementName, Node, NodeKind, Span};

pub const RULE_ID: &str = "jsx-no-useless-fragment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    NeedsMoreChildren,
    ChildOfHostElement,
}

impl Reason {
    pub fn id(self) -> &'static str {
        match self {
            Reason::NeedsMoreChildren => "NeedsMoreChildren",
            Reason::ChildOfHostElement => "ChildOfHostElement",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Reason::NeedsMoreChildren => {
                "Fragments should contain either an expression or at least two children."
            }
            Reason::ChildOfHostElement => "Passing a fragment to an HTML element is useless.",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Replacement of `range` in the original source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: Span,
    pub replacement: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// Span of the whole wrapper, delimiters included.
    pub range: Span,
    pub reason: Reason,
    pub fix: Option<TextEdit>,
}

impl Report {
    pub fn message(&self) -> &'static str {
        self.reason.message()
    }
}

/// Rule instance bound to the pragmas of one file.
pub struct FragmentRule<'p> {
    pragmas: &'p Pragmas,
}

impl<'p> FragmentRule<'p> {
    pub fn new(pragmas: &'p Pragmas) -> Self {
        Self { pragmas }
    }

    /// Visit an element; only pragma-named fragments are checked.
    pub fn on_element(&self, node: Node<'_>) -> Vec<Report> {
        match node.element() {
            Some(element) if is_fragment_element(element, self.pragmas) => self.check(node),
            _ => Vec::new(),
        }
    }

    /// Visit a `<>...</>` shorthand fragment.
    pub fn on_fragment(&self, node: Node<'_>) -> Vec<Report> {
        match node.kind() {
            NodeKind::Fragment(_) => self.check(node),
            _ => Vec::new(),
        }
    }

    fn check(&self, node: Node<'_>) -> Vec<Report> {
        redundancy(node, self.pragmas)
            .into_iter()
            .map(|reason| Report {
                range: node.span(),
                reason,
                fix: build_edit(node, self.pragmas),
            })
            .collect()
    }
}

// --- classification ---

/// `<Fragment>` or `<React.Fragment>` under the resolved pragmas.
pub fn is_fragment_element(element: &Element, pragmas: &Pragmas) -> bool {
    match &element.name {
        ElementName::Identifier(name) => *name == pragmas.fragment,
        ElementName::Member { object, property } => {
            object.as_identifier() == Some(pragmas.react.as_str())
                && *property == pragmas.fragment
        }
        ElementName::Namespaced { .. } => false,
    }
}

pub fn is_wrapper_node(node: Node<'_>, pragmas: &Pragmas) -> bool {
    match node.kind() {
        NodeKind::Fragment(_) => true,
        NodeKind::Element(element) => is_fragment_element(element, pragmas),
        NodeKind::Text(_)
        | NodeKind::ExpressionContainer
        | NodeKind::EmptyExpression
        | NodeKind::Other(_) => false,
    }
}

/// `key={...}` carries list identity and must survive.
pub fn is_exempt_attribute(attribute: &Attribute) -> bool {
    attribute.key.as_deref() == Some("key")
}

fn is_keyed(node: Node<'_>) -> bool {
    node.element()
        .is_some_and(|element| element.attributes.iter().any(is_exempt_attribute))
}

fn is_host_name(name: &ElementName) -> bool {
    name.as_identifier()
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_lowercase()))
}

fn is_only_whitespace(text: &str) -> bool {
    text.chars().all(char::is_whitespace)
}

/// Whitespace spanning a line break; the JSX transform drops it.
fn is_padding(node: Node<'_>) -> bool {
    node.as_text()
        .is_some_and(|raw| is_only_whitespace(raw) && raw.contains('\n'))
}

fn is_nonspace_text_or_container(node: Node<'_>) -> bool {
    match node.kind() {
        NodeKind::Text(raw) => !is_only_whitespace(raw),
        NodeKind::ExpressionContainer => true,
        NodeKind::Element(_)
        | NodeKind::Fragment(_)
        | NodeKind::EmptyExpression
        | NodeKind::Other(_) => false,
    }
}

fn is_call_container(node: Node<'_>) -> bool {
    matches!(node.kind(), NodeKind::ExpressionContainer)
        && node
            .first_child()
            .is_some_and(|expr| matches!(expr.kind(), NodeKind::Other("call_expression")))
}

fn has_jsx_parent(node: Node<'_>) -> bool {
    node.parent().is_some_and(|p| p.is_element_or_fragment())
}

fn is_child_of_host_element(node: Node<'_>) -> bool {
    node.parent()
        .and_then(|p| p.element())
        .is_some_and(|parent| is_host_name(&parent.name))
}

/// Parent is a user component, which may insist on a single element child.
fn is_child_of_component_element(node: Node<'_>, pragmas: &Pragmas) -> bool {
    node.parent()
        .and_then(|p| p.element())
        .is_some_and(|parent| !is_host_name(&parent.name) && !is_fragment_element(parent, pragmas))
}

/// `<>{}</>`. Named fragments never match.
fn is_fragment_with_empty_expression(node: Node<'_>) -> bool {
    matches!(node.kind(), NodeKind::Fragment(_))
        && node.child_count() == 1
        && node.first_child().is_some_and(|child| {
            matches!(child.kind(), NodeKind::ExpressionContainer)
                && child
                    .first_child()
                    .is_some_and(|expr| matches!(expr.kind(), NodeKind::EmptyExpression))
        })
}

fn non_padding_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    node.children().filter(|c| !is_padding(*c)).collect()
}

fn has_fewer_than_two_children(node: Node<'_>) -> bool {
    let children = non_padding_children(node);
    match children.as_slice() {
        [] => true,
        [only] => !is_call_container(*only),
        _ => false,
    }
}

/// `<Foo bar={<>some text</>} />`: text as a value, where a string and an
/// element are not interchangeable.
fn is_text_only_outside_jsx(node: Node<'_>) -> bool {
    node.child_count() == 1
        && node.first_child().is_some_and(|c| c.as_text().is_some())
        && !has_jsx_parent(node)
}

fn has_safe_inner_expression(node: Node<'_>) -> bool {
    if node.child_count() == 0 {
        return false;
    }
    let children = non_padding_children(node);
    // `<>{children}</>` may render several nodes, or none.
    !(children.len() == 1
        && matches!(children[0].kind(), NodeKind::ExpressionContainer)
        && !is_child_of_host_element(node))
}

// --- predicates ---

/// Reasons this wrapper is reportable, in reporting order. Empty for nodes
/// that are not wrappers or carry a `key`.
pub fn redundancy(node: Node<'_>, pragmas: &Pragmas) -> Vec<Reason> {
    let mut reasons = Vec::new();
    if !is_wrapper_node(node, pragmas) || is_keyed(node) {
        return reasons;
    }

    if is_fragment_with_empty_expression(node)
        || (has_fewer_than_two_children(node)
            && !is_text_only_outside_jsx(node)
            && has_safe_inner_expression(node))
    {
        reasons.push(Reason::NeedsMoreChildren);
    }

    if is_child_of_host_element(node) {
        reasons.push(Reason::ChildOfHostElement);
    }

    reasons
}

pub fn can_auto_fix(node: Node<'_>, pragmas: &Pragmas) -> bool {
    if is_fragment_with_empty_expression(node) {
        return true;
    }

    if !has_jsx_parent(node) {
        // `const a = <></>`
        if node.child_count() == 0 {
            return false;
        }
        // `const a = <>cat {meow}</>`
        if node.children().any(is_nonspace_text_or_container) {
            return false;
        }
    }

    // `<Eeee><>foo</></Eeee>`
    !is_child_of_component_element(node, pragmas)
}

/// The edit removing `node`, or `None` when removal is unsafe.
pub fn build_edit(node: Node<'_>, pragmas: &Pragmas) -> Option<TextEdit> {
    if !can_auto_fix(node, pragmas) {
        return None;
    }

    if is_fragment_with_empty_expression(node) {
        return Some(TextEdit {
            range: node.span(),
            replacement: "<></>".to_string(),
        });
    }

    let tags = node.tags()?;
    let inner = node.tree().text(tags.inner());
    Some(TextEdit {
        range: node.span(),
        replacement: trim_like_react(inner).to_string(),
    })
}

/// Drop a leading or trailing whitespace run only if it contains a line
/// break, the same way JSX text is trimmed at compile time.
pub fn trim_like_react(text: &str) -> &str {
    let leading = text.len() - text.trim_start().len();
    let trailing = text.len() - text.trim_end().len();

    let start = if text[..leading].contains('\n') {
        leading
    } else {
        0
    };
    let end = if text[text.len() - trailing..].contains('\n') {
        text.len() - trailing
    } else {
        text.len()
    };

    if start >= end {
        ""
    } else {
        &text[start..end]
    }
}
