//! marktree: markup token streams to rendered trees
//!
//! This crate turns the flat token stream of a Markdown engine into a tree
//! and renders that tree through a table of per-type render rules, with a
//! cascading style model for text.
//!
//! # Pipeline
//! 1. A [`MarkupEngine`] produces markdown-it shaped [`Token`]s.
//! 2. Inline wrappers are flattened, types normalized, and links around
//!    block content promoted to `blocklink` ([`cleanup_tokens`]).
//! 3. Runs of inline tokens are wrapped in `textgroup` spans.
//! 4. The stream is built into an [`AstNode`] forest.
//! 5. An [`AstRenderer`] walks the forest under a synthetic `body` root.
//!
//! The bundled HTML host ([`html::rules`]) renders to strings; other hosts
//! supply their own [`RenderRules`] for any output type.

pub mod ast;
pub mod blocklink;
pub mod cascade;
pub mod defaults;
pub mod engine;
pub mod error;
pub mod flatten;
pub mod group;
pub mod html;
pub mod normalize;
#[cfg(feature = "pulldown")]
pub mod pulldown;
pub mod rules;
pub mod style;
pub mod token;
pub mod walker;

// Re-export primary types
pub use ast::{Ancestors, AstNode, KeySequence, has_parents, tokens_to_ast};
pub use blocklink::convert_to_block_links;
pub use engine::{JsonEngine, MarkupEngine, string_to_tokens};
pub use error::{ParseError, RenderError};
pub use flatten::flatten_inline_tokens;
pub use group::group_text_tokens;
pub use normalize::normalize_tokens;
#[cfg(feature = "pulldown")]
pub use pulldown::PulldownEngine;
pub use rules::{LinkAction, LinkHandler, RenderArgs, RenderRules, RuleInput, open_url};
pub use style::{Style, StyleSheet, default_styles, remove_text_style_props};
pub use token::{Nesting, Token};
pub use walker::AstRenderer;

/// Rendering options.
///
/// `renderer` takes precedence over everything that configures a renderer;
/// passing it together with `rules` or `style` logs a warning and ignores
/// the latter.
pub struct Options<O> {
    /// Pre-built renderer.
    pub renderer: Option<AstRenderer<O>>,
    /// Rules overlaid on the host's default table.
    pub rules: Option<RenderRules<O>>,
    /// Per-type style overrides.
    pub style: Option<StyleSheet>,
    /// Merge `style` entries into the defaults key by key instead of
    /// replacing whole entries.
    pub merge_style: bool,
    pub on_link_press: Option<LinkHandler>,
    /// Truncate containers to this many children. `None` or `0` disables.
    pub max_top_level_children: Option<usize>,
    /// Rendered in place of truncated children.
    pub top_level_max_exceeded_item: Option<O>,
    /// Image source prefixes (case-insensitive) used as is.
    pub allowed_image_handlers: Vec<String>,
    /// Prefix for other image sources; `None` drops such images.
    pub default_image_handler: Option<String>,
    /// Trace every visited node type, indented by depth.
    pub debug_print_tree: bool,
    /// Cut text leaves at this many characters and add a "See more" link.
    pub text_limit: Option<usize>,
}

impl<O> Default for Options<O> {
    fn default() -> Self {
        Self {
            renderer: None,
            rules: None,
            style: None,
            merge_style: true,
            on_link_press: None,
            max_top_level_children: None,
            top_level_max_exceeded_item: None,
            allowed_image_handlers: defaults::allowed_image_handlers(),
            default_image_handler: Some(defaults::DEFAULT_IMAGE_HANDLER.to_string()),
            debug_print_tree: false,
            text_limit: None,
        }
    }
}

impl<O: Clone> Options<O> {
    /// Build the renderer these options describe on top of a host's default
    /// rule table.
    pub fn into_renderer(self, mut base_rules: RenderRules<O>) -> Result<AstRenderer<O>, RenderError> {
        if let Some(renderer) = self.renderer {
            if self.rules.is_some() {
                tracing::warn!("renderer and rules supplied together, rules are ignored");
            }
            if self.style.is_some() {
                tracing::warn!("renderer and style supplied together, style is ignored");
            }
            return Ok(renderer);
        }

        if let Some(overrides) = &self.rules {
            base_rules.extend(overrides);
        }
        let styles = StyleSheet::resolve(&default_styles(), self.style.as_ref(), self.merge_style);

        let mut renderer = AstRenderer::new(base_rules, styles)?
            .with_allowed_image_handlers(self.allowed_image_handlers)
            .with_default_image_handler(self.default_image_handler)
            .with_debug_print_tree(self.debug_print_tree);
        if let Some(handler) = self.on_link_press {
            renderer = renderer.with_link_handler(handler);
        }
        if let Some(max) = self.max_top_level_children {
            renderer = renderer.with_max_top_level_children(max, self.top_level_max_exceeded_item);
        }
        Ok(renderer)
    }
}

impl Options<String> {
    /// Build an HTML renderer. The truncation sentinel defaults to `...`.
    pub fn into_html_renderer(mut self) -> Result<AstRenderer<String>, RenderError> {
        if self.top_level_max_exceeded_item.is_none() {
            self.top_level_max_exceeded_item = Some(defaults::TOP_LEVEL_MAX_EXCEEDED_TEXT.to_string());
        }
        let base = html::rules(self.text_limit);
        self.into_renderer(base)
    }
}

/// Flatten, normalize and promote block links.
pub fn cleanup_tokens(tokens: Vec<Token>) -> Vec<Token> {
    let tokens = flatten_inline_tokens(tokens);
    let tokens = normalize_tokens(tokens);
    convert_to_block_links(tokens)
}

/// Run an engine and the token passes, ready for tree building.
pub fn parse_tokens(source: &str, engine: &dyn MarkupEngine) -> Vec<Token> {
    let raw = string_to_tokens(source, engine);
    let raw_len = raw.len();
    let tokens = group_text_tokens(cleanup_tokens(raw));
    tracing::debug!(raw = raw_len, cleaned = tokens.len(), "token passes done");
    tokens
}

/// Parse source text into an AST forest.
pub fn parse_to_ast(source: &str, engine: &dyn MarkupEngine, keys: &KeySequence) -> Vec<AstNode> {
    let nodes = tokens_to_ast(&parse_tokens(source, engine), keys);
    tracing::debug!(roots = nodes.len(), "ast built");
    nodes
}

/// Parse and render source text.
pub fn render<O: Clone>(
    source: &str,
    engine: &dyn MarkupEngine,
    renderer: &AstRenderer<O>,
) -> Result<O, RenderError> {
    let keys = KeySequence::new();
    let nodes = parse_to_ast(source, engine, &keys);
    renderer.render(nodes, &keys)
}

/// Convert Markdown to HTML.
///
/// This is the primary API for simple use cases.
///
/// # Example
/// ```
/// let html = marktree::to_html("# Hello\n\nWorld").unwrap();
/// assert!(html.starts_with("<div><h1"));
/// assert!(html.contains(">Hello</span>"));
/// assert!(html.contains(">World</span>"));
/// ```
#[cfg(feature = "pulldown")]
pub fn to_html(source: &str) -> Result<String, RenderError> {
    to_html_with_options(source, &PulldownEngine::new(), Options::default())
}

/// Convert source text to HTML with an explicit engine and options.
pub fn to_html_with_options(
    source: &str,
    engine: &dyn MarkupEngine,
    options: Options<String>,
) -> Result<String, RenderError> {
    let renderer = options.into_html_renderer()?;
    render(source, engine, &renderer)
}
