use arbor_core::adapter::{ParseOutcome, SourceParser};

use crate::imports;
use crate::lexer::{tokenize, Strictness};

/// TypeScript (and TSX) import detection.
///
/// Tokenizes strictly, so malformed source is reported rather than guessed
/// at, and also recognizes `import x = require("y")`.
pub struct TypeScriptParser;

impl SourceParser for TypeScriptParser {
    fn dialect(&self) -> &'static str {
        "typescript"
    }

    fn parse(&self, source: &str) -> ParseOutcome {
        match tokenize(source, Strictness::Strict) {
            Ok(tokens) => ParseOutcome::Parsed(imports::collect(&tokens, true)),
            Err(reason) => ParseOutcome::ParseFailed(reason),
        }
    }
}
