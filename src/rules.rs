//! Render-rule table.
//!
//! A rule renders one node type into a host value `O`. Every rule has the same
//! signature; what differs per node category is the extra input the walker
//! hands over, carried by [`RuleInput`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxBuildHasher;

use crate::ast::{Ancestors, AstNode};
use crate::error::RenderError;
use crate::style::{Style, StyleSheet};

/// Link activation handler. Returns `true` when it handled the URL and the
/// default navigation must not happen.
pub type LinkHandler = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Category-specific rule input.
#[derive(Clone)]
pub enum RuleInput<'a> {
    /// Containers without special needs.
    Plain,
    /// `link` and `blocklink`.
    Link {
        on_link_press: Option<&'a LinkHandler>,
    },
    /// `image`.
    Image {
        allowed_image_handlers: &'a [String],
        default_image_handler: Option<&'a str>,
    },
    /// Childless nodes and `list_item`.
    Leaf {
        inherited: Style,
        /// Only set for `text` nodes.
        on_link_press: Option<&'a LinkHandler>,
    },
}

impl fmt::Debug for RuleInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("Plain"),
            Self::Link { on_link_press } => f
                .debug_struct("Link")
                .field("on_link_press", &on_link_press.is_some())
                .finish(),
            Self::Image {
                allowed_image_handlers,
                default_image_handler,
            } => f
                .debug_struct("Image")
                .field("allowed_image_handlers", allowed_image_handlers)
                .field("default_image_handler", default_image_handler)
                .finish(),
            Self::Leaf {
                inherited,
                on_link_press,
            } => f
                .debug_struct("Leaf")
                .field("inherited", inherited)
                .field("on_link_press", &on_link_press.is_some())
                .finish(),
        }
    }
}

impl RuleInput<'_> {
    /// Inherited text style, empty outside the leaf category.
    pub fn inherited(&self) -> Style {
        match self {
            Self::Leaf { inherited, .. } => inherited.clone(),
            _ => Style::new(),
        }
    }

    /// Link handler, if this category carries one.
    pub fn on_link_press(&self) -> Option<&LinkHandler> {
        match self {
            Self::Link { on_link_press } | Self::Leaf { on_link_press, .. } => *on_link_press,
            _ => None,
        }
    }
}

/// Everything a rule receives.
#[derive(Debug)]
pub struct RenderArgs<'a, O> {
    pub node: &'a AstNode,
    /// Rendered children, possibly truncated and followed by a sentinel.
    pub children: Vec<O>,
    pub ancestors: Ancestors<'a>,
    pub styles: &'a StyleSheet,
    pub input: RuleInput<'a>,
}

/// A render function.
pub type RenderFn<O> = Arc<dyn for<'a> Fn(RenderArgs<'a, O>) -> O + Send + Sync>;

/// Mapping from node type to render function.
pub struct RenderRules<O> {
    rules: HashMap<String, RenderFn<O>, FxBuildHasher>,
}

impl<O> Default for RenderRules<O> {
    fn default() -> Self {
        Self {
            rules: HashMap::default(),
        }
    }
}

impl<O> Clone for RenderRules<O> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<O> fmt::Debug for RenderRules<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        f.debug_struct("RenderRules").field("kinds", &kinds).finish()
    }
}

impl<O> RenderRules<O> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule, replacing any previous one for `kind`.
    pub fn insert<F>(&mut self, kind: impl Into<String>, rule: F)
    where
        F: for<'a> Fn(RenderArgs<'a, O>) -> O + Send + Sync + 'static,
    {
        self.rules.insert(kind.into(), Arc::new(rule));
    }

    /// Builder form of [`RenderRules::insert`].
    pub fn with<F>(mut self, kind: impl Into<String>, rule: F) -> Self
    where
        F: for<'a> Fn(RenderArgs<'a, O>) -> O + Send + Sync + 'static,
    {
        self.insert(kind, rule);
        self
    }

    /// Overlay `overrides` on top of these rules.
    pub fn extend(&mut self, overrides: &RenderRules<O>) {
        for (kind, rule) in &overrides.rules {
            self.rules.insert(kind.clone(), Arc::clone(rule));
        }
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.rules.contains_key(kind)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule for a node type.
    pub fn get(&self, kind: &str) -> Result<&RenderFn<O>, RenderError> {
        self.rules
            .get(kind)
            .ok_or_else(|| RenderError::MissingRule(kind.to_string()))
    }

    /// Check that every type in `kinds` has a rule.
    pub fn validate(&self, kinds: &[&str]) -> Result<(), RenderError> {
        match kinds.iter().find(|kind| !self.contains(kind)) {
            Some(kind) => Err(RenderError::MissingRule(kind.to_string())),
            None => Ok(()),
        }
    }
}

/// What should happen when a link is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// The handler took care of it.
    Handled,
    /// Navigate to the URL.
    Open(String),
    /// Nothing to do (empty URL).
    Ignore,
}

/// Decide how to activate `url`, consulting the handler first.
pub fn open_url(url: &str, on_link_press: Option<&LinkHandler>) -> LinkAction {
    if let Some(handler) = on_link_press {
        if handler(url) {
            return LinkAction::Handled;
        }
    }
    if url.is_empty() {
        LinkAction::Ignore
    } else {
        LinkAction::Open(url.to_string())
    }
}

/// Source URI an image should load, or `None` to suppress the image.
///
/// A source starting with any allowed prefix (case-insensitive) is used as is.
/// Otherwise the default prefix is prepended, or the image is suppressed when
/// there is no default.
pub fn resolve_image_source(
    src: &str,
    allowed_image_handlers: &[String],
    default_image_handler: Option<&str>,
) -> Option<String> {
    let lower = src.to_lowercase();
    let allowed = allowed_image_handlers
        .iter()
        .any(|prefix| lower.starts_with(&prefix.to_lowercase()));

    if allowed {
        return Some(src.to_string());
    }
    default_image_handler.map(|prefix| format!("{prefix}{src}"))
}
