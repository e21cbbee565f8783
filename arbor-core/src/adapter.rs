//! Source parser trait for extracting import specifiers.

/// Outcome of one parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Raw import specifiers in source order.
    Parsed(Vec<String>),
    /// The source is not valid in this parser's grammar.
    ParseFailed(String),
}

/// Trait for grammar-specific import detection.
///
/// Parsers are tried in sequence; the first `Parsed` outcome wins. They only
/// report specifiers, resolution is left to the dependency resolver.
pub trait SourceParser: Send + Sync {
    fn dialect(&self) -> &'static str;
    fn parse(&self, source: &str) -> ParseOutcome;
}

/// Runs `parsers` in order until one accepts `source`.
///
/// Returns the failure message of the last parser when none succeed. Empty
/// source has no imports and is never handed to a parser.
pub fn parse_imports(
    parsers: &[Box<dyn SourceParser>],
    source: &str,
) -> std::result::Result<Vec<String>, String> {
    if source.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut last_failure = String::from("no source parsers configured");
    for parser in parsers {
        match parser.parse(source) {
            ParseOutcome::Parsed(specifiers) => {
                tracing::trace!(dialect = parser.dialect(), count = specifiers.len(), "parsed source");
                return Ok(specifiers);
            }
            ParseOutcome::ParseFailed(reason) => {
                tracing::debug!(dialect = parser.dialect(), %reason, "parse failed, trying next dialect");
                last_failure = format!("{}: {}", parser.dialect(), reason);
            }
        }
    }
    Err(last_failure)
}
