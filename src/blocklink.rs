//! Promotion of links that contain block-level content.
//!
//! A link whose span holds a block token (typically an image) cannot be
//! rendered as an inline text run, so both of its boundary tokens are
//! reclassified as `blocklink`.

use crate::token::{Nesting, Token};

/// Type given to promoted link boundaries.
pub const BLOCKLINK: &str = "blocklink";

/// Reclassify link spans containing block tokens as `blocklink`.
///
/// Expects normalized types (`link`, not `link_open`). Tokens are buffered
/// from a link open up to the next link close; the whole buffer is flushed in
/// order at that close. A span left open at end of input is flushed as is.
pub fn convert_to_block_links(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut buffer: Vec<Token> = Vec::new();

    for mut token in tokens {
        let is_link = token.kind == "link";
        if is_link && token.nesting == Nesting::Open {
            buffer.push(token);
        } else if is_link && token.nesting == Nesting::Close && !buffer.is_empty() {
            if token.block || buffer.iter().any(|t| t.block) {
                promote(&mut buffer[0]);
                promote(&mut token);
            }
            out.append(&mut buffer);
            out.push(token);
        } else if !buffer.is_empty() {
            buffer.push(token);
        } else {
            out.push(token);
        }
    }

    out.append(&mut buffer);
    out
}

fn promote(token: &mut Token) {
    token.kind = BLOCKLINK.to_string();
    token.block = true;
}
