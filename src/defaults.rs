//! Default rendering constants.

/// Image source prefixes accepted without rewriting.
pub const DEFAULT_ALLOWED_IMAGE_HANDLERS: &[&str] = &[
    "data:image/png;base64",
    "data:image/gif;base64",
    "data:image/jpeg;base64",
    "https://",
    "http://",
];

/// Prefix prepended to image sources no allowed handler matches.
pub const DEFAULT_IMAGE_HANDLER: &str = "https://";

/// Link target of the "See more" marker appended to truncated text.
pub const SEE_MORE_TARGET: &str = "/seemore";

/// Label of the "See more" marker.
pub const SEE_MORE_LABEL: &str = "See more";

/// Sentinel text the HTML host renders in place of truncated children.
pub const TOP_LEVEL_MAX_EXCEEDED_TEXT: &str = "...";

/// Maximum nesting depth of the built tree. Deeper spans are flattened so
/// rendering and dropping a tree stay within the stack.
pub const MAX_TREE_NESTING: usize = 128;

/// Owned copy of [`DEFAULT_ALLOWED_IMAGE_HANDLERS`].
pub fn allowed_image_handlers() -> Vec<String> {
    DEFAULT_ALLOWED_IMAGE_HANDLERS
        .iter()
        .map(|prefix| prefix.to_string())
        .collect()
}
