//! Inherited text style resolution.
//!
//! Leaves take their text style from every ancestor, outermost first, so an
//! inner ancestor overrides an outer one. Per ancestor the candidate style is
//! its inline `style` attribute overlaid by the style sheet entry for its type.
//! Only text properties survive into the inherited style.

use crate::ast::Ancestors;
use crate::style::{Style, StyleSheet, parse_inline_style};

/// Compute the text style a leaf inherits from its ancestors.
pub fn inherited_text_style(ancestors: Ancestors<'_>, styles: &StyleSheet) -> Style {
    let chain = ancestors.outermost_first();
    let mut inherited = Style::new();

    for (depth, ancestor) in chain.iter().enumerate() {
        let mut candidate = match ancestor.attr("style") {
            Some(inline) => parse_inline_style(inline),
            None => Style::new(),
        };

        if let Some(entry) = styles.get(&ancestor.kind) {
            candidate.merge(entry);
        }

        if ancestor.kind == "list_item" {
            // The list container sits one step further out.
            let container = depth.checked_sub(1).and_then(|i| chain.get(i));
            let content_key = match container.map(|n| n.kind.as_str()) {
                Some("bullet_list") => Some("bullet_list_content"),
                Some("ordered_list") => Some("ordered_list_content"),
                _ => None,
            };
            if let Some(content) = content_key.and_then(|key| styles.get(key)) {
                candidate.merge(content);
            }
        }

        inherited.merge_text_props(&candidate);
    }

    inherited
}
