//! Markup engines: sources of raw token sequences.

use crate::error::ParseError;
use crate::token::Token;

/// Produces a markdown-it shaped token sequence from source text.
pub trait MarkupEngine {
    fn parse(&self, source: &str) -> Result<Vec<Token>, ParseError>;
}

impl<E: MarkupEngine + ?Sized> MarkupEngine for &E {
    fn parse(&self, source: &str) -> Result<Vec<Token>, ParseError> {
        (**self).parse(source)
    }
}

/// Run an engine. A failing engine yields an empty sequence and a warning,
/// so a broken document renders as nothing instead of aborting the host.
pub fn string_to_tokens(source: &str, engine: &dyn MarkupEngine) -> Vec<Token> {
    match engine.parse(source) {
        Ok(tokens) => tokens,
        Err(err) => {
            tracing::warn!(error = %err, "markup engine failed, rendering empty document");
            Vec::new()
        }
    }
}

/// Engine reading a markdown-it token dump (`JSON.stringify(md.parse(src))`).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEngine;

impl MarkupEngine for JsonEngine {
    fn parse(&self, source: &str) -> Result<Vec<Token>, ParseError> {
        Ok(serde_json::from_str(source)?)
    }
}
