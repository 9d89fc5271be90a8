//! Inline wrapper flattening.

use crate::token::Token;

/// Replace every `inline` token that has children with its (recursively
/// flattened) children.
///
/// `inline` tokens without children pass through unchanged, as does every
/// other token. Order is preserved.
pub fn flatten_inline_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    flatten_into(tokens, &mut out);
    out
}

fn flatten_into(tokens: Vec<Token>, out: &mut Vec<Token>) {
    for mut token in tokens {
        if token.kind == "inline" && !token.children().is_empty() {
            if let Some(children) = token.children.take() {
                flatten_into(children, out);
            }
        } else {
            out.push(token);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn test_empty() {
        assert!(flatten_inline_tokens(Vec::new()).is_empty());
    }

    #[test]
    fn test_inline_children_are_spliced_in_place() {
        let tokens = vec![
            Token::open("paragraph_open"),
            Token::leaf("inline", "a *b*").with_children(vec![
                Token::text("a "),
                Token::open("em_open"),
                Token::text("b"),
                Token::close("em_close"),
            ]),
            Token::close("paragraph_close"),
        ];
        let flat = flatten_inline_tokens(tokens);
        assert_eq!(
            kinds(&flat),
            ["paragraph_open", "text", "em_open", "text", "em_close", "paragraph_close"]
        );
    }

    #[test]
    fn test_nested_inline_wrappers() {
        let inner = Token::leaf("inline", "").with_children(vec![Token::text("deep")]);
        let outer = Token::leaf("inline", "").with_children(vec![Token::text("a"), inner]);
        let flat = flatten_inline_tokens(vec![outer]);
        assert_eq!(kinds(&flat), ["text", "text"]);
        assert_eq!(flat[1].content, "deep");
    }

    #[test]
    fn test_inline_without_children_kept() {
        let flat = flatten_inline_tokens(vec![
            Token::leaf("inline", "x"),
            Token::leaf("inline", "y").with_children(Vec::new()),
        ]);
        assert_eq!(kinds(&flat), ["inline", "inline"]);
    }

    #[test]
    fn test_image_children_not_flattened() {
        let image = Token::leaf("image", "").with_children(vec![Token::text("alt")]);
        let flat = flatten_inline_tokens(vec![Token::leaf("inline", "").with_children(vec![image])]);
        assert_eq!(kinds(&flat), ["image"]);
        assert_eq!(flat[0].children().len(), 1);
    }
}
