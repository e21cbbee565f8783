//! A small JavaScript tokenizer.
//!
//! Produces just enough structure to find import specifiers: identifiers,
//! string literals and punctuation. Comments, numbers, regular expressions
//! and template text are consumed without being reported.
//!
//! JSX elements are recognized where an expression may start. Their text
//! and attribute strings are skipped as raw text, so apostrophes, backticks
//! and `/*` inside markup are not mistaken for literals or comments. Only
//! the code inside `{...}` is tokenized.

/// Lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Ident(String),
    /// Quoted string literal, unescaped.
    Str(String),
    /// Template literal or a part of one around a substitution.
    Template,
    Regex,
    Number,
    /// A complete JSX element or fragment.
    Jsx,
    Punct(char),
}

/// How tolerant tokenizing is of malformed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Any unterminated literal or unbalanced bracket is an error.
    Strict,
    /// A string left open at a line break ends there, which tolerates
    /// apostrophes in JSX text. A `/` that does not close as a regex is
    /// division. Brackets are not checked.
    Lenient,
}

/// Keywords after which `/` starts a regular expression.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Open {
    Bracket(char),
    /// `${` inside a template literal.
    Substitution,
    /// Between `<name` and the `>` or `/>` that ends an opening tag.
    JsxTag,
    /// Between an opening tag and its closing tag.
    JsxChildren,
    /// `{` inside a JSX tag or its children.
    JsxExpression,
}

/// Tokenizes `source`, recognizing JSX elements.
///
/// When that fails the source is tokenized again with `<` always read as an
/// operator, which accepts generic type syntax such as `<T>(v: T) => T` that
/// reads like an unclosed element. The first error is reported if both fail.
pub fn tokenize(source: &str, strictness: Strictness) -> Result<Vec<Token>, String> {
    Lexer::new(source, strictness, true)
        .run()
        .or_else(|error| Lexer::new(source, strictness, false).run().map_err(|_| error))
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    strictness: Strictness,
    jsx: bool,
    tokens: Vec<Token>,
    stack: Vec<Open>,
}

impl Lexer {
    fn new(source: &str, strictness: Strictness, jsx: bool) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            strictness,
            jsx,
            tokens: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn strict(&self) -> bool {
        self.strictness == Strictness::Strict
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn error(&self, message: &str) -> String {
        format!("{} at line {}", message, self.line)
    }

    fn run(mut self) -> Result<Vec<Token>, String> {
        // Skip a hashbang line.
        if self.peek(0) == Some('#') && self.peek(1) == Some('!') {
            while !matches!(self.peek(0), None | Some('\n')) {
                self.bump();
            }
        }

        while let Some(c) = self.peek(0) {
            match c {
                _ if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek(1) == Some('/') => self.line_comment(),
                '/' if self.peek(1) == Some('*') => self.block_comment()?,
                '/' if self.regex_allowed() => self.regex()?,
                '<' if self.jsx_allowed() => {
                    self.jsx_open();
                    self.jsx()?;
                }
                '"' | '\'' => self.string(c)?,
                '`' => {
                    self.bump();
                    self.template()?;
                }
                _ if c.is_ascii_digit() => self.number(),
                '.' if self.peek(1).is_some_and(|n| n.is_ascii_digit()) => self.number(),
                _ if is_ident_start(c) => self.ident(),
                '(' | '[' | '{' => {
                    self.bump();
                    self.stack.push(Open::Bracket(c));
                    self.tokens.push(Token::Punct(c));
                }
                '}' if self.stack.last() == Some(&Open::Substitution) => {
                    self.bump();
                    self.stack.pop();
                    self.template()?;
                }
                '}' if self.stack.last() == Some(&Open::JsxExpression) => {
                    self.bump();
                    self.stack.pop();
                    self.jsx()?;
                }
                ')' | ']' | '}' => {
                    self.bump();
                    self.close(c)?;
                    self.tokens.push(Token::Punct(c));
                }
                _ => {
                    self.bump();
                    self.tokens.push(Token::Punct(c));
                }
            }
        }

        if self.stack.contains(&Open::Substitution) {
            return Err(self.error("unterminated template literal"));
        }
        if self.stack.contains(&Open::JsxExpression) {
            return Err(self.error("unterminated JSX expression"));
        }
        if self.strict() {
            if let Some(Open::Bracket(open)) = self.stack.last() {
                return Err(self.error(&format!("unclosed '{}'", open)));
            }
        }
        Ok(self.tokens)
    }

    fn close(&mut self, c: char) -> Result<(), String> {
        let expected = match c {
            ')' => '(',
            ']' => '[',
            _ => '{',
        };
        match self.stack.last() {
            Some(Open::Bracket(open)) if *open == expected => {
                self.stack.pop();
                Ok(())
            }
            _ if self.strict() => Err(self.error(&format!("unexpected '{}'", c))),
            _ => Ok(()),
        }
    }

    fn line_comment(&mut self) {
        while !matches!(self.peek(0), None | Some('\n')) {
            self.bump();
        }
    }

    fn block_comment(&mut self) -> Result<(), String> {
        let start = self.line;
        self.pos += 2;
        loop {
            match self.peek(0) {
                None => return Err(format!("unterminated comment starting at line {}", start)),
                Some('*') if self.peek(1) == Some('/') => {
                    self.pos += 2;
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn string(&mut self, quote: char) -> Result<(), String> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.peek(0) {
                None => {
                    if self.strict() {
                        return Err(self.error("unterminated string literal"));
                    }
                    break;
                }
                Some('\n') => {
                    if self.strict() {
                        return Err(self.error("unterminated string literal"));
                    }
                    break;
                }
                Some('\\') => {
                    self.bump();
                    match self.bump() {
                        Some('n') => value.push('\n'),
                        Some('t') => value.push('\t'),
                        // Line continuation.
                        Some('\n') => {}
                        Some(other) => value.push(other),
                        None => {}
                    }
                }
                Some(c) if c == quote => {
                    self.bump();
                    break;
                }
                Some(c) => {
                    self.bump();
                    value.push(c);
                }
            }
        }
        self.tokens.push(Token::Str(value));
        Ok(())
    }

    /// Consumes template text after a backtick or a closing substitution.
    fn template(&mut self) -> Result<(), String> {
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated template literal")),
                Some('\\') => {
                    self.bump();
                }
                Some('`') => break,
                Some('$') if self.peek(0) == Some('{') => {
                    self.bump();
                    self.tokens.push(Token::Template);
                    self.stack.push(Open::Substitution);
                    return Ok(());
                }
                Some(_) => {}
            }
        }
        self.tokens.push(Token::Template);
        Ok(())
    }

    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(Token::Punct(c)) => !matches!(c, ')' | ']' | '}'),
            Some(Token::Ident(word)) => REGEX_PRECEDING_KEYWORDS.contains(&word.as_str()),
            Some(_) => false,
        }
    }

    /// A `<` in expression position followed by a tag name or `>`.
    ///
    /// `<T,>` and `<T extends U>` are type parameters of a generic arrow
    /// function, not elements.
    fn jsx_allowed(&self) -> bool {
        if !self.jsx || !self.regex_allowed() {
            return false;
        }
        match self.peek(1) {
            Some('>') => true,
            Some(c) if is_ident_start(c) => {
                let mut offset = 1;
                while self.peek(offset).is_some_and(is_ident_part) {
                    offset += 1;
                }
                while self.peek(offset).is_some_and(char::is_whitespace) {
                    offset += 1;
                }
                if self.peek(offset) == Some(',') {
                    return false;
                }
                let rest: String = self.chars[self.pos + offset..].iter().take(8).collect();
                !(rest.starts_with("extends") && !rest[7..].starts_with(is_ident_part))
            }
            _ => false,
        }
    }

    /// Consumes the `<` of an element or fragment.
    fn jsx_open(&mut self) {
        self.bump();
        if self.peek(0) == Some('>') {
            self.bump();
            self.stack.push(Open::JsxChildren);
        } else {
            self.stack.push(Open::JsxTag);
        }
    }

    /// Scans markup until the outermost element closes or a `{` hands
    /// control back to the tokenizer.
    fn jsx(&mut self) -> Result<(), String> {
        loop {
            match self.stack.last() {
                Some(Open::JsxTag) => self.jsx_tag()?,
                Some(Open::JsxChildren) => self.jsx_children()?,
                _ => return Ok(()),
            }
            if self.stack.last() == Some(&Open::JsxExpression) {
                return Ok(());
            }
        }
    }

    fn jsx_tag(&mut self) -> Result<(), String> {
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated JSX tag")),
                Some('/') if self.peek(0) == Some('>') => {
                    self.bump();
                    self.stack.pop();
                    self.jsx_closed();
                    return Ok(());
                }
                Some('>') => {
                    self.stack.pop();
                    self.stack.push(Open::JsxChildren);
                    return Ok(());
                }
                Some('{') => {
                    self.stack.push(Open::JsxExpression);
                    return Ok(());
                }
                Some(quote @ ('"' | '\'')) => loop {
                    match self.bump() {
                        None => return Err(self.error("unterminated JSX attribute")),
                        Some(c) if c == quote => break,
                        Some(_) => {}
                    }
                },
                Some(_) => {}
            }
        }
    }

    fn jsx_children(&mut self) -> Result<(), String> {
        loop {
            match self.peek(0) {
                None => return Err(self.error("unterminated JSX element")),
                Some('{') => {
                    self.bump();
                    self.stack.push(Open::JsxExpression);
                    return Ok(());
                }
                Some('<') if self.peek(1) == Some('/') => {
                    while !matches!(self.bump(), None | Some('>')) {}
                    self.stack.pop();
                    self.jsx_closed();
                    return Ok(());
                }
                Some('<') => {
                    self.jsx_open();
                    return Ok(());
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// Reports the element once it is no longer nested in other markup.
    fn jsx_closed(&mut self) {
        if self.stack.last() != Some(&Open::JsxChildren) {
            self.tokens.push(Token::Jsx);
        }
    }

    fn regex(&mut self) -> Result<(), String> {
        let start = self.pos;
        let start_line = self.line;
        self.pos += 1;
        let mut in_class = false;

        loop {
            match self.peek(0) {
                None | Some('\n') => {
                    if self.strict() {
                        return Err(self.error("unterminated regular expression"));
                    }
                    // Not a regex after all: rewind and treat the slash as division.
                    self.pos = start + 1;
                    self.line = start_line;
                    self.tokens.push(Token::Punct('/'));
                    return Ok(());
                }
                Some('\\') => self.pos += 2,
                Some('[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some('/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }

        while self.peek(0).is_some_and(is_ident_part) {
            self.pos += 1;
        }
        self.tokens.push(Token::Regex);
        Ok(())
    }

    fn number(&mut self) {
        while self
            .peek(0)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
        {
            self.pos += 1;
        }
        self.tokens.push(Token::Number);
    }

    fn ident(&mut self) {
        let start = self.pos;
        while self.peek(0).is_some_and(is_ident_part) {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        self.tokens.push(Token::Ident(word));
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(source: &str, strictness: Strictness) -> Vec<String> {
        tokenize(source, strictness)
            .unwrap()
            .into_iter()
            .filter_map(|t| match t {
                Token::Str(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_comments_hide_strings() {
        let source = "// require('a')\n/* import 'b' */ const c = 'c';";
        assert_eq!(strings(source, Strictness::Strict), vec!["c"]);
    }

    #[test]
    fn test_template_substitution_is_tokenized() {
        let source = "const s = `a ${require('x')} b ${ {k: 'y'}.k }`;";
        assert_eq!(strings(source, Strictness::Strict), vec!["x", "y"]);
    }

    #[test]
    fn test_regex_is_not_a_string() {
        let source = "const r = /'[\"/]/g; const d = a / b / c; const s = 'ok';";
        assert_eq!(strings(source, Strictness::Strict), vec!["ok"]);
    }

    #[test]
    fn test_jsx_closing_tags_are_not_regexes() {
        let source = "const el = <ul>{items.map(i => <li key={i}>{i}</li>)}</ul>;\nconst s = 'ok';";
        assert_eq!(strings(source, Strictness::Strict), vec!["ok"]);
    }

    #[test]
    fn test_jsx_text_is_not_code() {
        let source = "const el = <p>Run ` to open the console</p>;\nconst s = 'ok';";
        assert_eq!(strings(source, Strictness::Strict), vec!["ok"]);

        let source = "const el = <p>/* docs</p>;\nconst s = 'ok';";
        assert_eq!(strings(source, Strictness::Strict), vec!["ok"]);

        let source = "const el = <><b title=\"it's\">Don't</b> // not a comment</>;\nconst s = 'ok';";
        assert_eq!(strings(source, Strictness::Strict), vec!["ok"]);
    }

    #[test]
    fn test_jsx_expressions_are_tokenized() {
        let source = "render(<App theme={require('theme')} onClick={() => go({a: 1})}>\n  {load('x')}\n</App>, root);";
        assert_eq!(strings(source, Strictness::Strict), vec!["theme", "x"]);
        assert!(tokenize(source, Strictness::Strict).unwrap().contains(&Token::Jsx));
    }

    #[test]
    fn test_generic_arrow_is_not_jsx() {
        let source = "const id = <T,>(v: T): T => v;\nconst first = <T extends unknown[]>(xs: T) => xs[0];\nconst s = 's';";
        let tokens = tokenize(source, Strictness::Strict).unwrap();
        assert!(!tokens.contains(&Token::Jsx));
        assert_eq!(strings(source, Strictness::Strict), vec!["s"]);
    }

    #[test]
    fn test_generic_function_type_falls_back_to_operators() {
        let source = "type Fn = <T>(value: T) => T;\nconst s = 's';";
        assert_eq!(strings(source, Strictness::Strict), vec!["s"]);
    }

    #[test]
    fn test_comparison_is_not_jsx() {
        let source = "if (a <b) { x = 'y'; }";
        assert_eq!(strings(source, Strictness::Strict), vec!["y"]);
    }

    #[test]
    fn test_unclosed_jsx_reports_the_jsx_error() {
        let error = tokenize("const el = <p>Don't", Strictness::Strict).unwrap_err();
        assert!(error.contains("unterminated JSX element"), "{}", error);
    }

    #[test]
    fn test_strict_rejects_unterminated_string() {
        assert!(tokenize("const s = 'oops\n", Strictness::Strict).is_err());
        assert_eq!(strings("const s = 'oops\nconst t = 't';", Strictness::Lenient), vec!["oops", "t"]);
    }

    #[test]
    fn test_strict_rejects_unbalanced_brackets() {
        assert!(tokenize("function f() {", Strictness::Strict).is_err());
        assert!(tokenize("function f() {", Strictness::Lenient).is_ok());
    }

    #[test]
    fn test_unterminated_comment_fails_in_both_modes() {
        assert!(tokenize("/* never closed", Strictness::Strict).is_err());
        assert!(tokenize("/* never closed", Strictness::Lenient).is_err());
    }
}
