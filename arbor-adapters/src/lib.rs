//! Source parsers for import detection.

pub mod ecmascript;
pub mod imports;
pub mod lexer;
pub mod typescript;

pub use ecmascript::EcmaScriptParser;
pub use typescript::TypeScriptParser;

use arbor_core::adapter::SourceParser;

/// Parsers in fallback order: TypeScript first, then plain ECMAScript.
pub fn default_parsers() -> Vec<Box<dyn SourceParser>> {
    vec![Box::new(TypeScriptParser), Box::new(EcmaScriptParser)]
}
