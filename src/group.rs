//! Text run grouping.

use crate::token::{Nesting, Token};

/// Type of the synthetic run markers.
pub const TEXTGROUP: &str = "textgroup";

/// Wrap every maximal run of non-block tokens in `textgroup` open/close
/// markers. A run still open at the end of the sequence is closed there.
pub fn group_text_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() + tokens.len() / 4 + 2);
    let mut in_group = false;

    for token in tokens {
        if !token.block && !in_group {
            in_group = true;
            out.push(Token::new(TEXTGROUP, Nesting::Open));
        } else if token.block && in_group {
            in_group = false;
            out.push(Token::new(TEXTGROUP, Nesting::Close));
        }
        out.push(token);
    }

    if in_group {
        out.push(Token::new(TEXTGROUP, Nesting::Close));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(kind: &str, nesting: Nesting) -> Token {
        Token::new(kind, nesting).with_block(true)
    }

    fn shape(tokens: &[Token]) -> Vec<(&str, i8)> {
        tokens
            .iter()
            .map(|t| (t.kind.as_str(), t.nesting.as_i8()))
            .collect()
    }

    #[test]
    fn test_empty() {
        assert!(group_text_tokens(Vec::new()).is_empty());
    }

    #[test]
    fn test_run_between_blocks() {
        let out = group_text_tokens(vec![
            block("paragraph", Nesting::Open),
            Token::text("a"),
            Token::open("strong"),
            Token::text("b"),
            Token::close("strong"),
            block("paragraph", Nesting::Close),
        ]);
        assert_eq!(
            shape(&out),
            [
                ("paragraph", 1),
                ("textgroup", 1),
                ("text", 0),
                ("strong", 1),
                ("text", 0),
                ("strong", -1),
                ("textgroup", -1),
                ("paragraph", -1),
            ]
        );
    }

    #[test]
    fn test_block_splits_runs() {
        let out = group_text_tokens(vec![
            Token::text("a"),
            block("image", Nesting::SelfClosing),
            Token::text("b"),
        ]);
        let kinds: Vec<_> = out.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(
            kinds,
            ["textgroup", "text", "textgroup", "image", "textgroup", "text", "textgroup"]
        );
    }

    #[test]
    fn test_only_blocks_untouched() {
        let out = group_text_tokens(vec![block("hr", Nesting::SelfClosing)]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_markers_are_not_block() {
        let out = group_text_tokens(vec![Token::text("a")]);
        assert!(out.iter().all(|t| !t.block));
        assert_eq!(out[0].nesting, Nesting::Open);
        assert_eq!(out[2].nesting, Nesting::Close);
    }
}
