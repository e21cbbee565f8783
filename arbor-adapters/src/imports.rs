//! Import specifier extraction from a token stream.

use crate::lexer::Token;

/// Tokens an import or export clause may contain before `from`.
fn is_clause_token(token: &Token) -> bool {
    matches!(token, Token::Ident(_) | Token::Punct('{' | '}' | ',' | '*'))
}

fn is_ident(token: Option<&Token>, word: &str) -> bool {
    matches!(token, Some(Token::Ident(w)) if w == word)
}

fn is_punct(token: Option<&Token>, c: char) -> bool {
    matches!(token, Some(Token::Punct(p)) if *p == c)
}

fn string_at(tokens: &[Token], index: usize) -> Option<&str> {
    match tokens.get(index) {
        Some(Token::Str(s)) => Some(s.as_str()),
        _ => None,
    }
}

/// Finds `from "<specifier>"` ending the clause that starts at `start`.
fn from_clause(tokens: &[Token], start: usize) -> Option<&str> {
    let mut j = start;
    while let Some(token) = tokens.get(j) {
        if is_ident(Some(token), "from") {
            if let Some(specifier) = string_at(tokens, j + 1) {
                return Some(specifier);
            }
        }
        if !is_clause_token(token) {
            return None;
        }
        j += 1;
    }
    None
}

/// `require("<specifier>")` where the literal is the first argument.
fn require_call(tokens: &[Token], at: usize) -> Option<&str> {
    if !is_punct(tokens.get(at + 1), '(') {
        return None;
    }
    let specifier = string_at(tokens, at + 2)?;
    let next = tokens.get(at + 3);
    (is_punct(next, ')') || is_punct(next, ',')).then_some(specifier)
}

/// Collects import specifiers in source order.
///
/// Recognizes static imports, re-exports, dynamic `import()` and `require`
/// calls with a literal argument. With `external_module_references`, the
/// TypeScript `import x = require("y")` form is matched as a whole.
pub fn collect(tokens: &[Token], external_module_references: bool) -> Vec<String> {
    let mut specifiers = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let member_access = i > 0 && is_punct(tokens.get(i - 1), '.');
        let Some(Token::Ident(word)) = tokens.get(i) else {
            i += 1;
            continue;
        };
        if member_access {
            i += 1;
            continue;
        }

        match word.as_str() {
            "import" => {
                let next = tokens.get(i + 1);
                if is_punct(next, '.') {
                    // import.meta
                } else if is_punct(next, '(') {
                    if let Some(specifier) = string_at(tokens, i + 2) {
                        specifiers.push(specifier.to_string());
                    }
                } else if let Some(specifier) = string_at(tokens, i + 1) {
                    specifiers.push(specifier.to_string());
                } else if let Some(specifier) = external_module_reference(tokens, i)
                    .filter(|_| external_module_references)
                {
                    specifiers.push(specifier.to_string());
                    // Skip the `require(...)` already consumed.
                    i += 6;
                    continue;
                } else if let Some(specifier) = from_clause(tokens, i + 1) {
                    specifiers.push(specifier.to_string());
                }
            }
            "export" => {
                if let Some(specifier) = from_clause(tokens, i + 1) {
                    specifiers.push(specifier.to_string());
                }
            }
            "require" => {
                if let Some(specifier) = require_call(tokens, i) {
                    specifiers.push(specifier.to_string());
                }
            }
            _ => {}
        }
        i += 1;
    }

    specifiers
}

/// `import <name> = require("<specifier>")`, with an optional `type` modifier
/// after `import`.
fn external_module_reference(tokens: &[Token], at: usize) -> Option<&str> {
    let mut j = at + 1;
    if is_ident(tokens.get(j), "type") && matches!(tokens.get(j + 1), Some(Token::Ident(_))) {
        j += 1;
    }
    if !matches!(tokens.get(j), Some(Token::Ident(_)))
        || !is_punct(tokens.get(j + 1), '=')
        || !is_ident(tokens.get(j + 2), "require")
    {
        return None;
    }
    require_call(tokens, j + 2)
}
