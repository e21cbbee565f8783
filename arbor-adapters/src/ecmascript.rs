use arbor_core::adapter::{ParseOutcome, SourceParser};

use crate::imports;
use crate::lexer::{tokenize, Strictness};

/// Plain ECMAScript (and JSX) import detection.
///
/// The fallback dialect. Lexing is lenient: strings end at a line break and
/// brackets are not balanced, so odd syntax still yields its imports. An
/// unterminated comment, template literal or JSX element fails.
pub struct EcmaScriptParser;

impl SourceParser for EcmaScriptParser {
    fn dialect(&self) -> &'static str {
        "ecmascript"
    }

    fn parse(&self, source: &str) -> ParseOutcome {
        match tokenize(source, Strictness::Lenient) {
            Ok(tokens) => ParseOutcome::Parsed(imports::collect(&tokens, false)),
            Err(reason) => ParseOutcome::ParseFailed(reason),
        }
    }
}
