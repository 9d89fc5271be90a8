//! AST nodes and stack-based tree construction.
//!
//! The builder turns a flat, nesting-annotated token stream into a forest.
//! Open spans live on an explicit stack together with the sibling list they
//! were opened in; a node is attached to its parent only once its span
//! closes, so every parent exclusively owns a fully built children list.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use rustc_hash::FxBuildHasher;
use serde::Serialize;
use smallvec::SmallVec;

use crate::defaults::MAX_TREE_NESTING;
use crate::normalize::token_type;
use crate::token::{Nesting, Token};

/// Node attributes, built from a token's attribute pairs (last write wins).
pub type Attributes = HashMap<String, String, FxBuildHasher>;

/// A node of the constructed tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstNode {
    /// Normalized type, the render-rule key.
    #[serde(rename = "type")]
    pub kind: String,
    /// Type as produced by the markup engine.
    pub source_type: String,
    pub source_info: String,
    pub source_meta: serde_json::Value,
    pub block: bool,
    /// Unique key, ordered by creation.
    pub key: String,
    pub content: String,
    /// Position of the producing token in the flat stream, `None` for
    /// synthetic nodes.
    pub token_index: Option<usize>,
    /// Position among siblings.
    pub index: usize,
    pub attributes: Attributes,
    pub children: Vec<AstNode>,
    pub markup: String,
}

impl AstNode {
    /// Synthetic root wrapping a forest, type `body`.
    pub fn root(keys: &KeySequence, children: Vec<AstNode>) -> Self {
        Self {
            kind: ROOT.to_string(),
            source_type: ROOT.to_string(),
            source_info: String::new(),
            source_meta: serde_json::Value::Null,
            block: true,
            key: keys.next_key(),
            content: String::new(),
            token_index: None,
            index: 0,
            attributes: Attributes::default(),
            children,
            markup: String::new(),
        }
    }

    /// Attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// True for a node with no children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Total number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(AstNode::count).sum::<usize>()
    }
}

/// Type of the synthetic root node.
pub const ROOT: &str = "body";

/// Monotonic source of node keys.
///
/// Each build context owns its own sequence, which keeps tree construction
/// deterministic. The counter is atomic, so a shared sequence also hands out
/// distinct keys across threads.
#[derive(Debug, Default)]
pub struct KeySequence {
    next: AtomicU64,
}

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next key, e.g. `k1f`.
    pub fn next_key(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("k{n:x}")
    }
}

/// `depth` is the nesting level the node itself sits at.
fn create_node(token: &Token, token_index: usize, keys: &KeySequence, depth: usize) -> AstNode {
    let kind = token_type(token);

    let mut attributes = Attributes::default();
    for (name, value) in &token.attrs {
        attributes.insert(name.clone(), value.clone());
    }

    AstNode {
        key: format!("{}_{}", keys.next_key(), kind),
        kind,
        source_type: token.source_kind().to_string(),
        source_info: token.info.clone(),
        source_meta: token.meta.clone(),
        block: token.block,
        content: token.content.clone(),
        token_index: Some(token_index),
        index: 0,
        attributes,
        children: if depth < MAX_TREE_NESTING {
            build_forest(token.children(), keys, depth)
        } else {
            Vec::new()
        },
        markup: token.markup.clone(),
    }
}

/// Open span on the builder stack.
struct OpenSpan {
    node: AstNode,
    /// Sibling list the node will be appended to when its span closes.
    outer: Vec<AstNode>,
}

/// Build the top-level forest from a normalized token sequence.
///
/// Unbalanced input never fails: a close with no open span is ignored and
/// spans still open at the end are closed implicitly. Spans opened deeper
/// than [`MAX_TREE_NESTING`] are kept as childless nodes, their content
/// becomes their siblings and their closes are dropped.
pub fn tokens_to_ast(tokens: &[Token], keys: &KeySequence) -> Vec<AstNode> {
    build_forest(tokens, keys, 0)
}

fn build_forest(tokens: &[Token], keys: &KeySequence, base_depth: usize) -> Vec<AstNode> {
    let mut stack: SmallVec<[OpenSpan; 8]> = SmallVec::new();
    let mut current: Vec<AstNode> = Vec::new();
    // Closes still owed by spans flattened at the nesting cap.
    let mut capped = 0usize;

    for (i, token) in tokens.iter().enumerate() {
        if token.nesting == Nesting::Close {
            if capped > 0 {
                capped -= 1;
            } else if let Some(OpenSpan { mut node, outer }) = stack.pop() {
                node.children = std::mem::replace(&mut current, outer);
                current.push(node);
            }
            continue;
        }

        let depth = base_depth + stack.len() + 1;
        let mut node = create_node(token, i, keys, depth);
        if is_empty_text(&node) {
            continue;
        }
        node.index = current.len();

        if token.nesting == Nesting::Open && depth < MAX_TREE_NESTING {
            let outer = std::mem::take(&mut current);
            // Following nodes append after the token's own nested children.
            current = std::mem::take(&mut node.children);
            stack.push(OpenSpan { node, outer });
        } else {
            if token.nesting == Nesting::Open {
                capped += 1;
            }
            current.push(node);
        }
    }

    while let Some(OpenSpan { mut node, outer }) = stack.pop() {
        node.children = std::mem::replace(&mut current, outer);
        current.push(node);
    }

    current
}

fn is_empty_text(node: &AstNode) -> bool {
    node.kind == "text" && node.children.is_empty() && node.content.is_empty()
}

/// Ancestor chain of a node during a render walk.
///
/// Stored outermost first; [`Ancestors::iter`] yields the immediate parent
/// first.
#[derive(Debug, Clone, Copy)]
pub struct Ancestors<'a> {
    chain: &'a [&'a AstNode],
}

impl<'a> Ancestors<'a> {
    /// Wrap an outermost-first chain.
    pub fn new(chain: &'a [&'a AstNode]) -> Self {
        Self { chain }
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// The immediate parent.
    pub fn parent(&self) -> Option<&'a AstNode> {
        self.chain.last().copied()
    }

    /// Ancestors from the immediate parent outwards.
    pub fn iter(self) -> impl Iterator<Item = &'a AstNode> {
        self.chain.iter().rev().copied()
    }

    /// Ancestors from the root inwards.
    pub fn outermost_first(&self) -> &'a [&'a AstNode] {
        self.chain
    }

    /// Nearest ancestor of the given type.
    pub fn nearest(self, kind: &str) -> Option<&'a AstNode> {
        self.iter().find(|node| node.kind == kind)
    }

    /// True if any ancestor has the given type.
    pub fn has(&self, kind: &str) -> bool {
        has_parents(self.chain, kind)
    }
}

/// True if any node of `parents` has type `kind`.
pub fn has_parents(parents: &[&AstNode], kind: &str) -> bool {
    parents.iter().any(|node| node.kind == kind)
}
