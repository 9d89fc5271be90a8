//! AST walker dispatching nodes to render rules.

use smallvec::SmallVec;

use crate::ast::{Ancestors, AstNode, KeySequence};
use crate::blocklink::BLOCKLINK;
use crate::cascade::inherited_text_style;
use crate::error::RenderError;
use crate::group::TEXTGROUP;
use crate::rules::{LinkHandler, RenderArgs, RenderRules, RuleInput};
use crate::style::StyleSheet;

/// Node types the pipeline itself introduces; every rule table needs them.
pub const SYNTHETIC_TYPES: &[&str] = &[crate::ast::ROOT, TEXTGROUP, BLOCKLINK];

/// Renders an AST through a rule table.
pub struct AstRenderer<O> {
    rules: RenderRules<O>,
    styles: StyleSheet,
    on_link_press: Option<LinkHandler>,
    max_top_level_children: Option<usize>,
    top_level_max_exceeded_item: Option<O>,
    allowed_image_handlers: Vec<String>,
    default_image_handler: Option<String>,
    debug_print_tree: bool,
}

impl<O: Clone> AstRenderer<O> {
    /// Create a renderer. Fails if a synthetic node type has no rule.
    pub fn new(rules: RenderRules<O>, styles: StyleSheet) -> Result<Self, RenderError> {
        rules.validate(SYNTHETIC_TYPES)?;
        Ok(Self {
            rules,
            styles,
            on_link_press: None,
            max_top_level_children: None,
            top_level_max_exceeded_item: None,
            allowed_image_handlers: crate::defaults::allowed_image_handlers(),
            default_image_handler: Some(crate::defaults::DEFAULT_IMAGE_HANDLER.to_string()),
            debug_print_tree: false,
        })
    }

    pub fn with_link_handler(mut self, handler: LinkHandler) -> Self {
        self.on_link_press = Some(handler);
        self
    }

    /// Keep at most `max` children per container and append `sentinel`, if
    /// any, in place of the rest. `0` disables truncation.
    pub fn with_max_top_level_children(mut self, max: usize, sentinel: Option<O>) -> Self {
        self.max_top_level_children = (max > 0).then_some(max);
        self.top_level_max_exceeded_item = sentinel;
        self
    }

    pub fn with_allowed_image_handlers(mut self, handlers: Vec<String>) -> Self {
        self.allowed_image_handlers = handlers;
        self
    }

    /// Prefix for image sources matching no allowed handler; `None`
    /// suppresses such images.
    pub fn with_default_image_handler(mut self, handler: Option<String>) -> Self {
        self.default_image_handler = handler;
        self
    }

    pub fn with_debug_print_tree(mut self, enabled: bool) -> Self {
        self.debug_print_tree = enabled;
        self
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    /// Render a forest under a synthetic `body` root keyed from `keys`.
    pub fn render(&self, nodes: Vec<AstNode>, keys: &KeySequence) -> Result<O, RenderError> {
        let root = AstNode::root(keys, nodes);
        self.render_root(&root)
    }

    /// Render an already rooted tree.
    pub fn render_root(&self, root: &AstNode) -> Result<O, RenderError> {
        let mut ancestors: SmallVec<[&AstNode; 16]> = SmallVec::new();
        self.render_node(root, &mut ancestors)
    }

    fn render_node<'a>(
        &self,
        node: &'a AstNode,
        ancestors: &mut SmallVec<[&'a AstNode; 16]>,
    ) -> Result<O, RenderError> {
        let rule = self.rules.get(&node.kind)?;

        if self.debug_print_tree {
            tracing::info!("{}", debug_line(ancestors.len(), &node.kind));
        }

        let is_link = node.kind == "link" || node.kind == BLOCKLINK;
        let is_image = node.kind == "image";
        let is_leaf = node.is_leaf() || node.kind == "list_item";
        let truncate = match self.max_top_level_children {
            Some(max) if !is_link && !is_image && !is_leaf && node.children.len() > max => Some(max),
            _ => None,
        };

        let visible = truncate.unwrap_or(node.children.len());
        let mut children = Vec::with_capacity(visible + 1);
        ancestors.push(node);
        for child in &node.children[..visible] {
            children.push(self.render_node(child, ancestors)?);
        }
        ancestors.pop();

        if truncate.is_some() {
            if let Some(sentinel) = &self.top_level_max_exceeded_item {
                children.push(sentinel.clone());
            }
        }

        let chain = Ancestors::new(ancestors.as_slice());
        let input = if is_link {
            RuleInput::Link {
                on_link_press: self.on_link_press.as_ref(),
            }
        } else if is_image {
            RuleInput::Image {
                allowed_image_handlers: &self.allowed_image_handlers,
                default_image_handler: self.default_image_handler.as_deref(),
            }
        } else if is_leaf {
            RuleInput::Leaf {
                inherited: inherited_text_style(chain, &self.styles),
                on_link_press: if node.kind == "text" {
                    self.on_link_press.as_ref()
                } else {
                    None
                },
            }
        } else {
            RuleInput::Plain
        };

        Ok(rule(RenderArgs {
            node,
            children,
            ancestors: chain,
            styles: &self.styles,
            input,
        }))
    }
}

/// One line of the debug tree trace: one dash per ancestor, then the type.
pub fn debug_line(depth: usize, kind: &str) -> String {
    format!("{}{}", "-".repeat(depth), kind)
}
