//! Markup tokens as emitted by a markup engine.
//!
//! The shape follows markdown-it's `Token`: a flat unit with a type, a
//! nesting marker and optional content, children and attributes. Tokens
//! deserialize directly from markdown-it JSON dumps (`null` attrs and
//! children are accepted, unknown fields such as `map` or `level` ignored).

use serde::{Deserialize, Deserializer, Serialize};

/// Nesting marker of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Nesting {
    /// Closes the nearest open span (`-1`).
    Close,
    /// Self-contained, opens no span (`0`).
    #[default]
    SelfClosing,
    /// Opens a span (`+1`).
    Open,
}

impl Nesting {
    /// Numeric form used by markdown-it.
    #[inline]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Close => -1,
            Self::SelfClosing => 0,
            Self::Open => 1,
        }
    }
}

impl TryFrom<i8> for Nesting {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::Close),
            0 => Ok(Self::SelfClosing),
            1 => Ok(Self::Open),
            other => Err(format!("invalid nesting marker {other}, expected -1, 0 or 1")),
        }
    }
}

impl From<Nesting> for i8 {
    fn from(nesting: Nesting) -> Self {
        nesting.as_i8()
    }
}

/// A single token of the flat markup stream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Token {
    /// Token type, e.g. `paragraph_open`, `text`, `image`.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// HTML tag name hint, e.g. `h2` for a level-2 heading.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,
    #[serde(default)]
    pub nesting: Nesting,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Nested tokens. Only `inline` wrappers and images carry children.
    #[serde(default)]
    pub children: Option<Vec<Token>>,
    /// Attribute pairs in source order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub attrs: Vec<(String, String)>,
    #[serde(default)]
    pub block: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub markup: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: String,
    #[serde(default)]
    pub meta: serde_json::Value,
    /// Type before normalization rewrote `kind`.
    #[serde(skip)]
    pub(crate) original_kind: Option<String>,
}

impl Token {
    /// Create a token with the given type and nesting and everything else empty.
    pub fn new(kind: impl Into<String>, nesting: Nesting) -> Self {
        Self {
            kind: kind.into(),
            nesting,
            ..Self::default()
        }
    }

    /// Opening token, e.g. `Token::open("paragraph_open")`.
    pub fn open(kind: impl Into<String>) -> Self {
        Self::new(kind, Nesting::Open)
    }

    /// Closing token.
    pub fn close(kind: impl Into<String>) -> Self {
        Self::new(kind, Nesting::Close)
    }

    /// Self-contained token with content.
    pub fn leaf(kind: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::new(kind, Nesting::SelfClosing)
        }
    }

    /// `text` token.
    pub fn text(content: impl Into<String>) -> Self {
        Self::leaf("text", content)
    }

    /// Builder: set the tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Builder: set the block flag.
    pub fn with_block(mut self, block: bool) -> Self {
        self.block = block;
        self
    }

    /// Builder: append an attribute pair.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Builder: set the children.
    pub fn with_children(mut self, children: Vec<Token>) -> Self {
        self.children = Some(children);
        self
    }

    /// Builder: set the markup.
    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    /// Builder: set the info string.
    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.info = info.into();
        self
    }

    /// Index of the first attribute named `name`.
    pub fn attr_index(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|(n, _)| n == name)
    }

    /// Value of the first attribute named `name`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attr_index(name).map(|i| self.attrs[i].1.as_str())
    }

    /// The type as the engine produced it, before normalization.
    pub fn source_kind(&self) -> &str {
        self.original_kind.as_deref().unwrap_or(&self.kind)
    }

    /// Children slice, empty when there are none.
    #[inline]
    pub fn children(&self) -> &[Token] {
        self.children.as_deref().unwrap_or(&[])
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting_from_i8() {
        assert_eq!(Nesting::try_from(-1), Ok(Nesting::Close));
        assert_eq!(Nesting::try_from(0), Ok(Nesting::SelfClosing));
        assert_eq!(Nesting::try_from(1), Ok(Nesting::Open));
        assert!(Nesting::try_from(2).is_err());
    }

    #[test]
    fn test_attr_lookup_first_wins() {
        let token = Token::leaf("image", "")
            .with_attr("src", "a.png")
            .with_attr("alt", "x")
            .with_attr("src", "b.png");
        assert_eq!(token.attr_index("alt"), Some(1));
        assert_eq!(token.attr("src"), Some("a.png"));
        assert_eq!(token.attr("title"), None);
    }

    #[test]
    fn test_deserialize_markdown_it_token() {
        let json = r###"{
            "type": "heading_open", "tag": "h2", "attrs": null, "map": [0, 1],
            "nesting": 1, "level": 0, "children": null, "content": "",
            "markup": "##", "info": "", "meta": null, "block": true, "hidden": false
        }"###;
        let token: Token = serde_json::from_str(json).unwrap();
        assert_eq!(token.kind, "heading_open");
        assert_eq!(token.tag, "h2");
        assert_eq!(token.nesting, Nesting::Open);
        assert!(token.attrs.is_empty());
        assert!(token.children.is_none());
        assert!(token.block);
        assert_eq!(token.markup, "##");
    }

    #[test]
    fn test_deserialize_attrs_and_children() {
        let json = r#"{
            "type": "inline", "nesting": 0, "content": "x",
            "children": [
                {"type": "image", "nesting": 0, "attrs": [["src", "a.png"], ["alt", ""]],
                 "children": [{"type": "text", "nesting": 0, "content": "alt"}]}
            ]
        }"#;
        let token: Token = serde_json::from_str(json).unwrap();
        let image = &token.children()[0];
        assert_eq!(image.attr("src"), Some("a.png"));
        assert_eq!(image.children()[0].content, "alt");
    }

    #[test]
    fn test_deserialize_rejects_bad_nesting() {
        let json = r#"{"type": "text", "nesting": 3}"#;
        assert!(serde_json::from_str::<Token>(json).is_err());
    }

    #[test]
    fn test_source_kind_defaults_to_kind() {
        let token = Token::open("paragraph_open");
        assert_eq!(token.source_kind(), "paragraph_open");
    }
}
