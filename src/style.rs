//! Style maps and style sheets.
//!
//! Styles are opaque key/value maps in host notation (camelCase keys, raw
//! string values). A [`StyleSheet`] maps node types (plus a few pseudo keys
//! such as `bullet_list_icon`) to styles.

use std::collections::{BTreeMap, HashMap};

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState, QualifiedRuleParser,
    RuleBodyItemParser, RuleBodyParser,
};
use rustc_hash::FxBuildHasher;
use serde::Serialize;

/// Properties that apply to text and cascade from ancestors to leaves.
pub const TEXT_STYLE_PROPS: &[&str] = &[
    "textShadowOffset",
    "color",
    "fontSize",
    "fontStyle",
    "fontWeight",
    "lineHeight",
    "textAlign",
    "textDecorationLine",
    "textShadowColor",
    "fontFamily",
    "textShadowRadius",
    "includeFontPadding",
    "textAlignVertical",
    "fontVariant",
    "letterSpacing",
    "textDecorationColor",
    "textDecorationStyle",
    "textTransform",
    "writingDirection",
];

/// Prefix of the derived style entries that have text properties removed.
pub const VIEW_SAFE_PREFIX: &str = "_VIEW_SAFE_";

/// True if `key` is a cascading text property.
#[inline]
pub fn is_text_style_prop(key: &str) -> bool {
    TEXT_STYLE_PROPS.contains(&key)
}

/// A single style object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Style {
    props: BTreeMap<String, String>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.props.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.props.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    /// Properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.props.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copy every property of `other` into `self`; `other` wins on conflicts.
    pub fn merge(&mut self, other: &Style) {
        for (key, value) in &other.props {
            self.props.insert(key.clone(), value.clone());
        }
    }

    /// Copy only the text properties of `other` into `self`.
    pub fn merge_text_props(&mut self, other: &Style) {
        for (key, value) in &other.props {
            if is_text_style_prop(key) {
                self.props.insert(key.clone(), value.clone());
            }
        }
    }

    /// A copy with every text property removed, safe for view containers.
    pub fn without_text_props(&self) -> Style {
        let props = self
            .props
            .iter()
            .filter(|(key, _)| !is_text_style_prop(key))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Style { props }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Style {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let props = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Style { props }
    }
}

/// Remove text properties from a style.
pub fn remove_text_style_props(style: &Style) -> Style {
    style.without_text_props()
}

/// Parse an inline `style` attribute (`color: red; font-size: 12px`).
///
/// Declarations that fail to parse or have an empty value are dropped.
/// Property names are converted to camelCase; values are kept as written.
pub fn parse_inline_style(source: &str) -> Style {
    let mut input = ParserInput::new(source);
    let mut parser = Parser::new(&mut input);
    let mut decl_parser = InlineDeclarationParser;

    let mut style = Style::new();
    for (name, value) in RuleBodyParser::new(&mut parser, &mut decl_parser).flatten() {
        style.set(camel_case(&name), value);
    }
    style
}

/// Collects `(name, raw value)` pairs from a declaration list.
struct InlineDeclarationParser;

impl<'i> DeclarationParser<'i> for InlineDeclarationParser {
    type Declaration = (String, String);
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
        _start: &ParserState,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        let start = input.position();
        while input.next().is_ok() {}
        let value = input.slice_from(start).trim();
        if value.is_empty() {
            return Err(input.new_custom_error(()));
        }
        Ok(((*name).to_owned(), value.to_owned()))
    }
}

impl<'i> AtRuleParser<'i> for InlineDeclarationParser {
    type Prelude = ();
    type AtRule = (String, String);
    type Error = ();
}

impl<'i> QualifiedRuleParser<'i> for InlineDeclarationParser {
    type Prelude = ();
    type QualifiedRule = (String, String);
    type Error = ();
}

impl<'i> RuleBodyItemParser<'i, (String, String), ()> for InlineDeclarationParser {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        false
    }
}

/// `font-size` -> `fontSize`. Names already in camelCase are unchanged.
fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '-' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Styles keyed by node type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    entries: HashMap<String, Style, FxBuildHasher>,
}

impl StyleSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the style of a type.
    pub fn with(mut self, kind: impl Into<String>, style: Style) -> Self {
        self.insert(kind, style);
        self
    }

    pub fn insert(&mut self, kind: impl Into<String>, style: Style) {
        self.entries.insert(kind.into(), style);
    }

    pub fn get(&self, kind: &str) -> Option<&Style> {
        self.entries.get(kind)
    }

    /// Style of a type, or an empty style.
    pub fn style_of(&self, kind: &str) -> Style {
        self.get(kind).cloned().unwrap_or_default()
    }

    /// The `_VIEW_SAFE_` variant of a type's style.
    pub fn view_safe(&self, kind: &str) -> Style {
        match self.get(&format!("{VIEW_SAFE_PREFIX}{kind}")) {
            Some(style) => style.clone(),
            None => self.style_of(kind).without_text_props(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Style)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Combine default styles with user overrides.
    ///
    /// With `merge_style`, each user entry is merged into the matching default
    /// entry key by key. Without it, user entries replace default entries
    /// whole. Either way a `_VIEW_SAFE_<type>` entry is derived for every
    /// resulting entry.
    pub fn resolve(defaults: &StyleSheet, user: Option<&StyleSheet>, merge_style: bool) -> StyleSheet {
        let mut resolved = defaults.clone();

        if let Some(user) = user {
            for (kind, style) in &user.entries {
                match resolved.entries.get_mut(kind) {
                    Some(existing) if merge_style => existing.merge(style),
                    _ => {
                        resolved.entries.insert(kind.clone(), style.clone());
                    }
                }
            }
        }

        let view_safe: Vec<(String, Style)> = resolved
            .entries
            .iter()
            .filter(|(kind, _)| !kind.starts_with(VIEW_SAFE_PREFIX))
            .map(|(kind, style)| (format!("{VIEW_SAFE_PREFIX}{kind}"), remove_text_style_props(style)))
            .collect();
        resolved.entries.extend(view_safe);
        resolved
    }
}

fn style(pairs: &[(&str, &str)]) -> Style {
    pairs.iter().copied().collect()
}

const CODE: &[(&str, &str)] = &[
    ("borderWidth", "1"),
    ("borderColor", "#CCCCCC"),
    ("backgroundColor", "#f5f5f5"),
    ("padding", "10"),
    ("borderRadius", "4"),
    ("fontFamily", "monospace"),
];

/// The built-in style sheet.
pub fn default_styles() -> StyleSheet {
    let heading = |size: &str| style(&[("flexDirection", "row"), ("fontSize", size)]);

    StyleSheet::new()
        .with("body", Style::new())
        .with("heading1", heading("32"))
        .with("heading2", heading("24"))
        .with("heading3", heading("18"))
        .with("heading4", heading("16"))
        .with("heading5", heading("13"))
        .with("heading6", heading("11"))
        .with("hr", style(&[("backgroundColor", "#000000"), ("height", "1")]))
        .with("strong", style(&[("fontWeight", "bold")]))
        .with("em", style(&[("fontStyle", "italic")]))
        .with("s", style(&[("textDecorationLine", "line-through")]))
        .with(
            "blockquote",
            style(&[
                ("backgroundColor", "#F5F5F5"),
                ("borderColor", "#CCC"),
                ("borderLeftWidth", "4"),
                ("marginLeft", "5"),
                ("paddingHorizontal", "5"),
            ]),
        )
        .with("bullet_list", Style::new())
        .with("ordered_list", Style::new())
        .with("list_item", style(&[("flexDirection", "row"), ("justifyContent", "flex-start")]))
        .with("bullet_list_icon", style(&[("marginLeft", "10"), ("marginRight", "10")]))
        .with("bullet_list_content", style(&[("flex", "1")]))
        .with("ordered_list_icon", style(&[("marginLeft", "10"), ("marginRight", "10")]))
        .with("ordered_list_content", style(&[("flex", "1")]))
        .with("code_inline", style(CODE))
        .with("code_block", style(CODE))
        .with("fence", style(CODE))
        .with(
            "table",
            style(&[("borderWidth", "1"), ("borderColor", "#000000"), ("borderRadius", "3")]),
        )
        .with("thead", Style::new())
        .with("tbody", Style::new())
        .with("th", style(&[("flex", "1"), ("padding", "5")]))
        .with(
            "tr",
            style(&[("borderBottomWidth", "1"), ("borderColor", "#000000"), ("flexDirection", "row")]),
        )
        .with("td", style(&[("flex", "1"), ("padding", "5")]))
        .with("link", style(&[("textDecorationLine", "underline")]))
        .with(
            "blocklink",
            style(&[("flex", "1"), ("borderColor", "#000000"), ("borderBottomWidth", "1")]),
        )
        .with("image", style(&[("flex", "1")]))
        .with("text", Style::new())
        .with("textgroup", Style::new())
        .with(
            "paragraph",
            style(&[
                ("marginTop", "10"),
                ("marginBottom", "10"),
                ("flexWrap", "wrap"),
                ("flexDirection", "row"),
                ("alignItems", "flex-start"),
                ("justifyContent", "flex-start"),
                ("width", "100%"),
            ]),
        )
        .with("hardbreak", style(&[("width", "100%"), ("height", "1")]))
        .with("softbreak", Style::new())
        .with("pre", Style::new())
        .with("inline", Style::new())
        .with("span", Style::new())
}
