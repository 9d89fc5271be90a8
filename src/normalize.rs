//! Per-token normalization.
//!
//! Canonical types drop the `_open`/`_close` suffixes so both halves of a
//! span share one type, headings carry their level (`heading2`), and images
//! and hard breaks are always block-level.

use crate::token::Token;

/// Type assigned to tokens whose type is empty.
pub const UNKNOWN: &str = "unknown";

/// Canonical node type for a token.
///
/// # Example
/// ```
/// use marktree::{normalize::token_type, Token};
///
/// assert_eq!(token_type(&Token::open("strong_open")), "strong");
/// assert_eq!(token_type(&Token::open("heading_open").with_tag("h3")), "heading3");
/// ```
pub fn token_type(token: &Token) -> String {
    if token.kind.is_empty() {
        return UNKNOWN.to_string();
    }

    let cleaned = token.kind.replace("_open", "").replace("_close", "");
    if cleaned.is_empty() {
        return UNKNOWN.to_string();
    }
    if cleaned == "heading" {
        // `h2` -> `2`; the tag's first character is the `h`.
        let level = token.tag.get(1..).unwrap_or("");
        return format!("{cleaned}{level}");
    }
    cleaned
}

/// Concatenate the content of all `text` tokens, descending into images.
///
/// Used to build an image's alt text from its markup children, so
/// `![foo *bar*](x)` yields `foo bar`.
pub fn render_inline_as_text(tokens: &[Token]) -> String {
    let mut out = String::new();
    collect_text(tokens, &mut out);
    out
}

fn collect_text(tokens: &[Token], out: &mut String) {
    for token in tokens {
        match token.kind.as_str() {
            "text" => out.push_str(&token.content),
            "image" => collect_text(token.children(), out),
            _ => {}
        }
    }
}

/// Normalize a single token.
///
/// Running this twice is a no-op on the second pass.
pub fn normalize_token(mut token: Token) -> Token {
    let kind = token_type(&token);
    if kind != token.kind {
        let previous = std::mem::replace(&mut token.kind, kind);
        token.original_kind.get_or_insert(previous);
    }

    if token.kind == "image" || token.kind == "hardbreak" {
        token.block = true;
    }

    if token.kind == "image" && !token.children().is_empty() {
        if let Some(idx) = token.attr_index("alt") {
            token.attrs[idx].1 = render_inline_as_text(token.children());
        }
    }

    token
}

/// Normalize every token of a sequence.
pub fn normalize_tokens(tokens: Vec<Token>) -> Vec<Token> {
    tokens.into_iter().map(normalize_token).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Nesting;

    fn image_with_alt(children: Vec<Token>) -> Token {
        Token::leaf("image", "")
            .with_attr("src", "img.png")
            .with_attr("alt", "")
            .with_children(children)
    }

    #[test]
    fn test_strips_open_suffix() {
        let token = normalize_token(Token::open("strong_open"));
        assert_eq!(token.kind, "strong");
        assert_eq!(token.source_kind(), "strong_open");
    }

    #[test]
    fn test_strips_close_suffix() {
        let token = normalize_token(Token::close("strong_close"));
        assert_eq!(token.kind, "strong");
        assert_eq!(token.nesting, Nesting::Close);
    }

    #[test]
    fn test_heading_level_from_tag() {
        let token = normalize_token(Token::open("heading_open").with_tag("h2"));
        assert_eq!(token.kind, "heading2");
    }

    #[test]
    fn test_empty_type_is_unknown() {
        let token = normalize_token(Token::leaf("", "x"));
        assert_eq!(token.kind, "unknown");
        assert_eq!(token.source_kind(), "");
    }

    #[test]
    fn test_other_types_unchanged() {
        let token = normalize_token(Token::leaf("fence", "code"));
        assert_eq!(token.kind, "fence");
        assert!(!token.block);
    }

    #[test]
    fn test_strips_every_occurrence() {
        let token = normalize_token(Token::open("container_open_open"));
        assert_eq!(token.kind, "container");
    }

    #[test]
    fn test_image_and_hardbreak_become_block() {
        assert!(normalize_token(Token::leaf("image", "")).block);
        assert!(normalize_token(Token::leaf("hardbreak", "")).block);
        assert!(!normalize_token(Token::text("a")).block);
    }

    #[test]
    fn test_alt_from_text_children() {
        let token = normalize_token(image_with_alt(vec![Token::text("my alt text")]));
        assert_eq!(token.attr("alt"), Some("my alt text"));
    }

    #[test]
    fn test_alt_concatenates_and_ignores_non_text() {
        let token = normalize_token(image_with_alt(vec![
            Token::text("hello "),
            Token::open("strong_open"),
            Token::text("world"),
            Token::close("strong_close"),
            Token::leaf("code_inline", "ignored"),
        ]));
        assert_eq!(token.attr("alt"), Some("hello world"));
    }

    #[test]
    fn test_alt_descends_into_nested_images() {
        let inner = Token::leaf("image", "").with_children(vec![Token::text("inner")]);
        let token = normalize_token(image_with_alt(vec![Token::text("outer "), inner]));
        assert_eq!(token.attr("alt"), Some("outer inner"));
    }

    #[test]
    fn test_alt_untouched_without_children() {
        let token = Token::leaf("image", "").with_attr("alt", "original");
        let token = normalize_token(token);
        assert_eq!(token.attr("alt"), Some("original"));
    }

    #[test]
    fn test_alt_not_added_when_missing() {
        let token = Token::leaf("image", "")
            .with_attr("src", "img.png")
            .with_children(vec![Token::text("ignored")]);
        let token = normalize_token(token);
        assert_eq!(token.attrs, vec![("src".to_string(), "img.png".to_string())]);
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_token(
            Token::open("heading_open")
                .with_tag("h4")
                .with_children(vec![Token::text("t")]),
        );
        let twice = normalize_token(once.clone());
        assert_eq!(once, twice);

        let image = normalize_token(image_with_alt(vec![Token::text("a")]));
        assert_eq!(normalize_token(image.clone()), image);
    }
}
