//! HTML host: a default rule table rendering the AST to HTML strings.
//!
//! Container types render as block elements carrying their `_VIEW_SAFE_`
//! style, text-like types as inline elements carrying their full style.
//! Styles are emitted as inline CSS.

use crate::defaults::{SEE_MORE_LABEL, SEE_MORE_TARGET};
use crate::rules::{RenderArgs, RenderRules, RuleInput, resolve_image_source};
use crate::style::Style;

/// HTML output buffer.
///
/// # Example
/// ```
/// use marktree::html::HtmlWriter;
///
/// let mut writer = HtmlWriter::new();
/// writer.write_str("<p>");
/// writer.write_escaped_text("Hello <World>");
/// writer.write_str("</p>");
/// assert_eq!(writer.into_string(), "<p>Hello &lt;World&gt;</p>");
/// ```
#[derive(Debug, Default)]
pub struct HtmlWriter {
    out: String,
}

impl HtmlWriter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Write raw markup without escaping.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Write text content with HTML escaping.
    #[inline]
    pub fn write_escaped_text(&mut self, text: &str) {
        html_escape::encode_text_to_string(text, &mut self.out);
    }

    /// Write a double-quoted attribute value with escaping.
    #[inline]
    pub fn write_escaped_attr(&mut self, value: &str) {
        html_escape::encode_double_quoted_attribute_to_string(value, &mut self.out);
    }

    /// `<tag name="value" ... style="...">`. Empty styles are omitted.
    pub fn open_tag(&mut self, tag: &str, attrs: &[(&str, &str)], style: &Style) {
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in attrs {
            self.write_attr(name, value);
        }
        if !style.is_empty() {
            self.write_attr("style", &css(style));
        }
        self.out.push('>');
    }

    /// `</tag>`
    #[inline]
    pub fn close_tag(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn write_attr(&mut self, name: &str, value: &str) {
        self.out.push(' ');
        self.out.push_str(name);
        self.out.push_str("=\"");
        self.write_escaped_attr(value);
        self.out.push('"');
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.out
    }
}

/// Properties that take no length unit.
const UNITLESS_PROPS: &[&str] = &["flex", "flexGrow", "flexShrink", "fontWeight", "opacity", "zIndex", "aspectRatio"];

/// Render a style as inline CSS. Keys become kebab-case and bare numbers on
/// length properties get a `px` unit.
pub fn css(style: &Style) -> String {
    let mut out = String::new();
    for (key, value) in style.iter() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(&css_property(key));
        out.push_str(": ");
        out.push_str(value);
        if !UNITLESS_PROPS.contains(&key) && value.parse::<f64>().is_ok() && value != "0" {
            out.push_str("px");
        }
        out.push(';');
    }
    out
}

fn css_property(key: &str) -> String {
    match key {
        "paddingHorizontal" => return "padding-inline".to_string(),
        "paddingVertical" => return "padding-block".to_string(),
        "marginHorizontal" => return "margin-inline".to_string(),
        "marginVertical" => return "margin-block".to_string(),
        _ => {}
    }
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn element(tag: &str, attrs: &[(&str, &str)], style: &Style, children: &[String]) -> String {
    let mut writer = HtmlWriter::new();
    writer.open_tag(tag, attrs, style);
    for child in children {
        writer.write_str(child);
    }
    writer.close_tag(tag);
    writer.into_string()
}

fn text_element(style: &Style, text: &str) -> String {
    let mut writer = HtmlWriter::new();
    writer.open_tag("span", &[], style);
    writer.write_escaped_text(text);
    writer.close_tag("span");
    writer.into_string()
}

/// A block container rendered with its view-safe style.
fn view(tag: &'static str) -> impl for<'a> Fn(RenderArgs<'a, String>) -> String + Send + Sync + 'static {
    move |args: RenderArgs<'_, String>| element(tag, &[], &args.styles.view_safe(&args.node.kind), &args.children)
}

/// An inline container rendered with its full style.
fn span(tag: &'static str) -> impl for<'a> Fn(RenderArgs<'a, String>) -> String + Send + Sync + 'static {
    move |args: RenderArgs<'_, String>| element(tag, &[], &args.styles.style_of(&args.node.kind), &args.children)
}

fn leaf_style(args: &RenderArgs<'_, String>) -> Style {
    let mut style = args.input.inherited();
    style.merge(&args.styles.style_of(&args.node.kind));
    style
}

/// Code content without the one trailing newline the parser leaves.
fn trim_code(content: &str) -> &str {
    content.strip_suffix('\n').unwrap_or(content)
}

fn code_block(args: RenderArgs<'_, String>) -> String {
    let mut writer = HtmlWriter::new();
    writer.open_tag("pre", &[], &leaf_style(&args));
    writer.write_str("<code>");
    writer.write_escaped_text(trim_code(&args.node.content));
    writer.write_str("</code></pre>");
    writer.into_string()
}

fn code_inline(args: RenderArgs<'_, String>) -> String {
    let mut writer = HtmlWriter::new();
    writer.open_tag("code", &[], &leaf_style(&args));
    writer.write_escaped_text(&args.node.content);
    writer.close_tag("code");
    writer.into_string()
}

fn list_item(args: RenderArgs<'_, String>) -> String {
    let styles = args.styles;

    // Text properties of the item flow into its marker.
    let mut marker_style = Style::new();
    marker_style.merge(&args.input.inherited());
    marker_style.merge_text_props(&styles.style_of("list_item"));

    let (marker, list) = if args.ancestors.has("bullet_list") {
        ("\u{2022}".to_string(), "bullet_list")
    } else if let Some(list) = args.ancestors.nearest("ordered_list") {
        let number = match list.attr("start").and_then(|s| s.trim().parse::<u64>().ok()) {
            Some(start) => start + args.node.index as u64,
            None => args.node.index as u64 + 1,
        };
        (format!("{number}{}", args.node.markup), "ordered_list")
    } else {
        return element("li", &[], &styles.view_safe("list_item"), &args.children);
    };

    marker_style.merge(&styles.style_of(&format!("{list}_icon")));

    let mut writer = HtmlWriter::new();
    writer.open_tag("li", &[], &styles.view_safe("list_item"));
    writer.write_str(&text_element(&marker_style, &marker));
    writer.write_str(&element(
        "div",
        &[],
        &styles.view_safe(&format!("{list}_content")),
        &args.children,
    ));
    writer.close_tag("li");
    writer.into_string()
}

fn link(args: RenderArgs<'_, String>) -> String {
    let href = args.node.attr("href").unwrap_or_default();
    element("a", &[("href", href)], &args.styles.style_of("link"), &args.children)
}

fn blocklink(args: RenderArgs<'_, String>) -> String {
    let href = args.node.attr("href").unwrap_or_default();
    let inner = element("div", &[], &args.styles.style_of("image"), &args.children);
    element("a", &[("href", href)], &args.styles.style_of("blocklink"), &[inner])
}

fn image(args: RenderArgs<'_, String>) -> String {
    let RuleInput::Image {
        allowed_image_handlers,
        default_image_handler,
    } = args.input
    else {
        return String::new();
    };

    let src = args.node.attr("src").unwrap_or_default();
    let Some(uri) = resolve_image_source(src, allowed_image_handlers, default_image_handler) else {
        return String::new();
    };

    let mut attrs = vec![("src", uri.as_str())];
    if let Some(alt) = args.node.attr("alt").filter(|alt| !alt.is_empty()) {
        attrs.push(("alt", alt));
    }

    let mut writer = HtmlWriter::new();
    writer.open_tag("img", &attrs, &args.styles.view_safe("image"));
    writer.into_string()
}

fn text(args: &RenderArgs<'_, String>, text_limit: Option<usize>) -> String {
    let style = leaf_style(args);
    let content = args.node.content.as_str();

    let limit = match text_limit {
        Some(limit) if limit > 0 && content.chars().count() >= limit => limit,
        _ => return text_element(&style, content),
    };

    let truncated: String = content.chars().take(limit).collect();
    let mut link_style = args.input.inherited();
    link_style.merge(&args.styles.style_of("link"));

    let mut writer = HtmlWriter::new();
    writer.open_tag("span", &[], &style);
    writer.write_escaped_text(&truncated);
    writer.write_str("... ");
    writer.open_tag("a", &[("href", SEE_MORE_TARGET)], &link_style);
    writer.write_escaped_text(SEE_MORE_LABEL);
    writer.close_tag("a");
    writer.close_tag("span");
    writer.into_string()
}

/// The default HTML rule table.
///
/// With a `text_limit`, text leaves at least that many characters long are
/// cut and followed by a "See more" link to `/seemore`.
pub fn rules(text_limit: Option<usize>) -> RenderRules<String> {
    RenderRules::new()
        .with("unknown", |_| String::new())
        .with("body", view("div"))
        .with("heading1", view("h1"))
        .with("heading2", view("h2"))
        .with("heading3", view("h3"))
        .with("heading4", view("h4"))
        .with("heading5", view("h5"))
        .with("heading6", view("h6"))
        .with("hr", |args: RenderArgs<'_, String>| {
            let mut writer = HtmlWriter::new();
            writer.open_tag("hr", &[], &args.styles.view_safe("hr"));
            writer.into_string()
        })
        .with("strong", span("strong"))
        .with("em", span("em"))
        .with("s", span("s"))
        .with("sup", span("sup"))
        .with("sub", span("sub"))
        .with("blockquote", view("blockquote"))
        .with("bullet_list", view("ul"))
        .with("ordered_list", view("ol"))
        .with("list_item", list_item)
        .with("code_inline", code_inline)
        .with("code_block", code_block)
        .with("fence", code_block)
        .with("table", view("table"))
        .with("thead", view("thead"))
        .with("tbody", view("tbody"))
        .with("th", view("th"))
        .with("tr", view("tr"))
        .with("td", view("td"))
        .with("link", link)
        .with("blocklink", blocklink)
        .with("image", image)
        .with("text", move |args: RenderArgs<'_, String>| text(&args, text_limit))
        .with("textgroup", span("span"))
        .with("paragraph", view("p"))
        .with("hardbreak", |_| "<br>".to_string())
        .with("softbreak", |_| "\n".to_string())
        .with("pre", view("pre"))
        .with("inline", span("span"))
        .with("span", span("span"))
}

/// Style keys the HTML host reads besides node types.
pub fn host_style_keys() -> impl Iterator<Item = &'static str> {
    ["bullet_list_icon", "bullet_list_content", "ordered_list_icon", "ordered_list_content"].into_iter()
}
