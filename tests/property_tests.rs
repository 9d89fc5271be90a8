use proptest::prelude::*;

use marktree::normalize::normalize_token;
use marktree::{
    AstNode, KeySequence, Nesting, Token, convert_to_block_links, flatten_inline_tokens, group_text_tokens,
    tokens_to_ast,
};

/// A balanced token tree, serialized to a flat stream for the tests.
#[derive(Debug, Clone)]
enum Tree {
    Leaf(&'static str, String),
    Span(&'static str, Vec<Tree>),
}

fn leaf_kind() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("text"), Just("code_inline"), Just("fence"), Just("hr"), Just("softbreak")]
}

fn span_kind() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("paragraph"), Just("strong"), Just("em"), Just("blockquote"), Just("list_item")]
}

fn tree() -> impl Strategy<Value = Tree> {
    let leaf = (leaf_kind(), "[a-z]{1,4}").prop_map(|(kind, content)| Tree::Leaf(kind, content));
    leaf.prop_recursive(4, 32, 4, |inner| {
        (span_kind(), prop::collection::vec(inner, 0..4)).prop_map(|(kind, children)| Tree::Span(kind, children))
    })
}

fn serialize(tree: &Tree, out: &mut Vec<Token>) {
    match tree {
        Tree::Leaf(kind, content) => out.push(Token::leaf(*kind, content.as_str())),
        Tree::Span(kind, children) => {
            out.push(Token::open(format!("{kind}_open")));
            for child in children {
                serialize(child, out);
            }
            out.push(Token::close(format!("{kind}_close")));
        }
    }
}

fn stream(forest: &[Tree]) -> Vec<Token> {
    let mut out = Vec::new();
    for tree in forest {
        serialize(tree, &mut out);
    }
    out
}

fn count(nodes: &[AstNode]) -> usize {
    nodes.iter().map(AstNode::count).sum()
}

fn indices_dense(nodes: &[AstNode]) -> bool {
    nodes
        .iter()
        .enumerate()
        .all(|(i, node)| node.index == i && indices_dense(&node.children))
}

fn inline_token() -> impl Strategy<Value = Token> {
    let leaf = (leaf_kind(), "[a-z]{0,3}").prop_map(|(kind, content)| Token::leaf(kind, content));
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(|children| Token::leaf("inline", "").with_children(children))
    })
}

/// Tokens that are not non-empty `inline` wrappers, counted recursively.
fn content_tokens(tokens: &[Token]) -> usize {
    tokens
        .iter()
        .map(|t| {
            if t.kind == "inline" && !t.children().is_empty() {
                content_tokens(t.children())
            } else {
                1
            }
        })
        .sum()
}

fn raw_token() -> impl Strategy<Value = Token> {
    (
        prop_oneof![
            Just("heading_open"),
            Just("heading_close"),
            Just("image"),
            Just("hardbreak"),
            Just("strong_open"),
            Just("text"),
            Just(""),
            Just("link_close"),
        ],
        prop_oneof![Just(""), Just("h1"), Just("h4")],
        any::<bool>(),
        prop::collection::vec("[a-z]{0,3}", 0..3),
    )
        .prop_map(|(kind, tag, block, alt_children)| {
            let token = Token::leaf(kind, "").with_tag(tag).with_block(block).with_attr("alt", "x");
            if alt_children.is_empty() {
                token
            } else {
                token.with_children(alt_children.into_iter().map(Token::text).collect())
            }
        })
}

/// Flattened, normalized tokens around a single link span.
fn link_span() -> impl Strategy<Value = (Vec<Token>, Vec<bool>)> {
    prop::collection::vec(any::<bool>(), 0..5).prop_map(|blocks| {
        let mut tokens = vec![Token::open("link").with_attr("href", "https://x")];
        tokens.extend(blocks.iter().map(|&block| Token::text("t").with_block(block)));
        tokens.push(Token::close("link"));
        (tokens, blocks)
    })
}

proptest! {
    #[test]
    fn prop_flatten_leaves_no_wrappers(tokens in prop::collection::vec(inline_token(), 0..6)) {
        let expected = content_tokens(&tokens);
        let flat = flatten_inline_tokens(tokens);
        prop_assert!(flat.iter().all(|t| t.kind != "inline" || t.children().is_empty()));
        prop_assert_eq!(flat.len(), expected);
    }

    #[test]
    fn prop_tree_counts_and_indices(forest in prop::collection::vec(tree(), 0..5)) {
        let tokens = stream(&forest);
        let expected = tokens.iter().filter(|t| t.nesting != Nesting::Close).count();
        let ast = tokens_to_ast(&tokens, &KeySequence::new());
        prop_assert_eq!(ast.len(), forest.len());
        prop_assert_eq!(count(&ast), expected);
        prop_assert!(indices_dense(&ast));
    }

    #[test]
    fn prop_tree_never_panics_on_unbalanced(
        nestings in prop::collection::vec(prop_oneof![Just(-1i8), Just(0), Just(1)], 0..32)
    ) {
        let tokens: Vec<Token> = nestings
            .iter()
            .map(|&n| Token::new("span", Nesting::try_from(n).unwrap_or_default()))
            .collect();
        let ast = tokens_to_ast(&tokens, &KeySequence::new());
        let opened = tokens.iter().filter(|t| t.nesting != Nesting::Close).count();
        prop_assert!(count(&ast) <= opened);
        prop_assert!(indices_dense(&ast));
    }

    #[test]
    fn prop_normalize_idempotent(token in raw_token()) {
        let once = normalize_token(token);
        let twice = normalize_token(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_blocklink_promotion((tokens, blocks) in link_span()) {
        let before: Vec<String> = tokens.iter().map(|t| t.content.clone()).collect();
        let out = convert_to_block_links(tokens);
        let after: Vec<String> = out.iter().map(|t| t.content.clone()).collect();
        prop_assert_eq!(before, after);

        let promoted = blocks.iter().any(|&b| b);
        let expected = if promoted { "blocklink" } else { "link" };
        prop_assert_eq!(out[0].kind.as_str(), expected);
        prop_assert_eq!(out[out.len() - 1].kind.as_str(), expected);
        prop_assert_eq!(out[0].block, promoted);
    }

    #[test]
    fn prop_textgroups_balanced(blocks in prop::collection::vec(any::<bool>(), 0..12)) {
        let tokens: Vec<Token> = blocks.iter().map(|&b| Token::text("x").with_block(b)).collect();
        let grouped = group_text_tokens(tokens);
        let mut depth = 0i32;
        for token in &grouped {
            if token.kind == "textgroup" {
                depth += i32::from(token.nesting.as_i8());
                prop_assert!((0..=1).contains(&depth));
            }
        }
        prop_assert_eq!(depth, 0);
        prop_assert_eq!(grouped.iter().filter(|t| t.kind == "text").count(), blocks.len());
    }
}
