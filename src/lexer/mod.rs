//! Scanner for request-definition source text.
//!
//! The scanner turns source text into a stream of [`Token`]s, one per call to
//! [`Scanner::scan`]. Most constructs are a single token, but quoting is a
//! *mode*: after an opening `"` or `` ` `` the scanner emits alternating
//! `String` and `Variable` tokens until the matching sigil closes the region,
//! so that
//!
//! ```text
//! `hello $name!`
//! ```
//!
//! scans as `Quote, String("hello "), Variable("name"), String("!"), Quote`.
//!
//! Lexical errors never abort scanning with an error value. They surface as a
//! [`TokenKind::Invalid`] token carrying whatever literal had been accumulated;
//! callers stop at the first `Invalid` or `EndOfInput` token.
//!
//! # Example
//!
//! ```
//! use reqdef::lexer::{tokenize, TokenKind};
//!
//! let tokens = tokenize("bearer ${token}\n");
//! let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
//! assert_eq!(
//!     kinds,
//!     vec![TokenKind::Keyword, TokenKind::Variable, TokenKind::EndOfLine, TokenKind::EndOfInput]
//! );
//! ```

mod keywords;
mod token;

pub use keywords::Keywords;
pub use token::{Token, TokenKind};

use crate::config::get_config;
use std::iter::FusedIterator;

const MACRO_SIGIL: char = '@';
const COMMENT_SIGIL: char = '#';
const VARIABLE_SIGIL: char = '$';
const SINGLE_QUOTE: char = '\'';
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Scans the whole input, returning every token up to and including the
/// first terminal one.
pub fn tokenize(input: &str) -> Vec<Token> {
    Scanner::new(input).into_iter().collect()
}

/// Stateful scanner over a single input.
///
/// A scanner is not reusable: it owns its input and moves forward on every
/// call to [`scan`](Scanner::scan).
#[derive(Debug)]
pub struct Scanner {
    input: String,
    /// Current scalar, `None` at end of input.
    ch: Option<char>,
    /// Byte offset of `ch`.
    offset: usize,
    /// Byte offset of the scalar after `ch`.
    next_offset: usize,
    line: usize,
    column: usize,
    start_line: usize,
    start_column: usize,
    literal: String,
    /// Closing sigil of the quoted region the scanner is inside, if any.
    quote: Option<char>,
    keywords: Keywords,
}

impl Scanner {
    /// Creates a scanner using the configured keyword set.
    pub fn new(input: impl Into<String>) -> Self {
        Self::with_keywords(input, Keywords::from_config(&get_config()))
    }

    pub fn with_keywords(input: impl Into<String>, keywords: Keywords) -> Self {
        let input = input.into();
        let offset = if input.starts_with(BYTE_ORDER_MARK) {
            BYTE_ORDER_MARK.len_utf8()
        } else {
            0
        };
        let ch = input[offset..].chars().next();
        let next_offset = offset + ch.map_or(0, char::len_utf8);

        Self {
            input,
            ch,
            offset,
            next_offset,
            line: 1,
            column: 1,
            start_line: 1,
            start_column: 1,
            literal: String::new(),
            quote: None,
            keywords,
        }
    }

    /// Returns true while the scanner is inside a quoted region.
    pub fn is_quoted(&self) -> bool {
        self.quote.is_some()
    }

    /// Scans the next token.
    ///
    /// Once `EndOfInput` or `Invalid` has been returned the caller must stop.
    pub fn scan(&mut self) -> Token {
        self.literal.clear();

        if let Some(sigil) = self.quote {
            self.mark();
            return self.scan_quoted(sigil);
        }

        self.skip_blanks();
        self.mark();

        let Some(ch) = self.ch else {
            return self.emit(TokenKind::EndOfInput);
        };

        match ch {
            MACRO_SIGIL => self.scan_macro(),
            COMMENT_SIGIL => self.scan_comment(),
            c if c.is_ascii_digit() => self.scan_number(),
            '.' => {
                self.advance();
                self.emit(TokenKind::Dot)
            }
            '{' => {
                self.advance();
                self.skip_layout();
                self.emit(TokenKind::LeftBrace)
            }
            '}' => {
                self.advance();
                self.skip_layout();
                self.emit(TokenKind::RightBrace)
            }
            '\n' | '\r' => self.scan_end_of_line(),
            c if is_quote_sigil(c) => {
                self.quote = Some(c);
                self.advance();
                self.emit(TokenKind::Quote)
            }
            SINGLE_QUOTE => self.scan_single_quoted(),
            VARIABLE_SIGIL => self.scan_variable(),
            '<' if self.peek() == Some('<') => self.scan_heredoc(),
            c if c.is_alphabetic() => self.scan_identifier(),
            _ => self.scan_bare_word(),
        }
    }

    fn scan_quoted(&mut self, sigil: char) -> Token {
        match self.ch {
            None => self.emit(TokenKind::Invalid),
            Some(VARIABLE_SIGIL) => self.scan_variable(),
            Some(c) if c == sigil => {
                self.quote = None;
                self.advance();
                self.emit(TokenKind::Quote)
            }
            Some(_) => self.scan_verbatim(sigil),
        }
    }

    /// Text inside a quoted region up to the next variable or the closing sigil.
    fn scan_verbatim(&mut self, sigil: char) -> Token {
        loop {
            match self.ch {
                None => return self.emit(TokenKind::Invalid),
                Some(c) if c == VARIABLE_SIGIL || c == sigil => {
                    return self.emit(TokenKind::String);
                }
                Some('\\') => match self.peek() {
                    Some(next) if next == VARIABLE_SIGIL || next == sigil || next == '\\' => {
                        self.advance();
                        self.bump();
                    }
                    _ => self.bump(),
                },
                Some(_) => self.bump(),
            }
        }
    }

    fn scan_macro(&mut self) -> Token {
        self.advance();
        if self.scan_name() {
            self.emit(TokenKind::Macro)
        } else {
            self.emit(TokenKind::Invalid)
        }
    }

    fn scan_comment(&mut self) -> Token {
        self.advance();
        self.bump_while(|c| c != '\n');
        let trimmed = self.literal.trim();
        if trimmed.len() != self.literal.len() {
            self.literal = trimmed.to_string();
        }
        self.emit(TokenKind::Comment)
    }

    fn scan_number(&mut self) -> Token {
        self.bump_while(|c| c.is_ascii_digit());
        if self.ch == Some('.') && matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.bump();
            self.bump_while(|c| c.is_ascii_digit());
        }
        self.emit(TokenKind::Number)
    }

    fn scan_end_of_line(&mut self) -> Token {
        while matches!(self.ch, Some(' ' | '\t' | '\r' | '\n')) {
            self.advance();
        }
        self.emit(TokenKind::EndOfLine)
    }

    fn scan_single_quoted(&mut self) -> Token {
        self.advance();
        loop {
            match self.ch {
                None => return self.emit(TokenKind::Invalid),
                Some(SINGLE_QUOTE) => {
                    self.advance();
                    return self.emit(TokenKind::String);
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// `$name` or `${name}`.
    fn scan_variable(&mut self) -> Token {
        self.advance();

        if self.ch == Some('{') {
            self.advance();
            if !self.scan_name() || self.ch != Some('}') {
                return self.emit(TokenKind::Invalid);
            }
            self.advance();
            return self.emit(TokenKind::Variable);
        }

        if self.scan_name() {
            self.emit(TokenKind::Variable)
        } else {
            self.emit(TokenKind::Invalid)
        }
    }

    /// `<<LABEL` followed by body lines up to a line equal to `LABEL`.
    ///
    /// Body lines are concatenated without separators and blank lines are
    /// dropped. The terminator line, including its newline, is consumed.
    fn scan_heredoc(&mut self) -> Token {
        self.advance();
        self.advance();

        let mut label = String::new();
        while let Some(c) = self.ch {
            if c == '\n' {
                break;
            }
            label.push(c);
            self.advance();
        }
        if self.ch.is_none() {
            self.literal = label;
            return self.emit(TokenKind::Invalid);
        }
        self.advance();

        let label = label.trim().to_string();
        if label.is_empty() {
            return self.emit(TokenKind::Invalid);
        }

        loop {
            if self.ch.is_none() {
                return self.emit(TokenKind::Invalid);
            }
            let line = self.read_line();
            let trimmed = line.trim();
            if trimmed == label {
                return self.emit(TokenKind::String);
            }
            if trimmed.is_empty() {
                continue;
            }
            self.literal
                .push_str(line.strip_suffix('\r').unwrap_or(&line));
        }
    }

    fn scan_identifier(&mut self) -> Token {
        self.bump_while(|c| !is_delimiter(c));
        if self.keywords.contains(&self.literal) {
            self.emit(TokenKind::Keyword)
        } else {
            self.emit(TokenKind::Identifier)
        }
    }

    /// Anything else up to a blank, a quote sigil or a variable sigil, e.g.
    /// `/users/42` or `--verbose`.
    fn scan_bare_word(&mut self) -> Token {
        self.bump_while(|c| !is_blank(c) && !is_quote_sigil(c) && c != VARIABLE_SIGIL);
        self.emit(TokenKind::String)
    }

    /// Consumes a variable or macro name into the literal.
    fn scan_name(&mut self) -> bool {
        match self.ch {
            Some(c) if c.is_alphabetic() || c == '_' => {}
            _ => return false,
        }
        self.bump_while(|c| c.is_alphanumeric() || c == '_');
        true
    }

    /// Reads the rest of the current line, consuming its newline.
    fn read_line(&mut self) -> String {
        let mut line = String::new();
        while let Some(c) = self.ch {
            self.advance();
            if c == '\n' {
                break;
            }
            line.push(c);
        }
        line
    }

    fn skip_blanks(&mut self) {
        while matches!(self.ch, Some(' ' | '\t')) {
            self.advance();
        }
    }

    /// Skips blanks and newlines after structural punctuation.
    fn skip_layout(&mut self) {
        while matches!(self.ch, Some(c) if is_blank(c)) {
            self.advance();
        }
    }

    fn mark(&mut self) {
        self.start_line = self.line;
        self.start_column = self.column;
    }

    fn emit(&mut self, kind: TokenKind) -> Token {
        let token = Token {
            kind,
            literal: std::mem::take(&mut self.literal),
            line: self.start_line,
            column: self.start_column,
        };
        if kind == TokenKind::Invalid {
            log::debug!("invalid token at {}:{}", token.line, token.column);
        } else {
            log::trace!("{}", token);
        }
        token
    }

    fn peek(&self) -> Option<char> {
        self.input[self.next_offset..].chars().next()
    }

    fn advance(&mut self) {
        match self.ch {
            Some('\n') => {
                self.line += 1;
                self.column = 1;
            }
            Some(_) => self.column += 1,
            None => return,
        }
        self.offset = self.next_offset;
        self.ch = self.input[self.offset..].chars().next();
        self.next_offset = self.offset + self.ch.map_or(0, char::len_utf8);
    }

    /// Appends the current scalar to the literal and advances.
    fn bump(&mut self) {
        if let Some(c) = self.ch {
            self.literal.push(c);
            self.advance();
        }
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.ch {
            if !pred(c) {
                break;
            }
            self.bump();
        }
    }
}

impl IntoIterator for Scanner {
    type Item = Token;
    type IntoIter = Tokens;

    fn into_iter(self) -> Tokens {
        Tokens {
            scanner: self,
            finished: false,
        }
    }
}

/// Iterator over a scanner's tokens, ending after the first terminal token.
///
/// Created by [`Scanner::into_iter`]. `Scanner` itself is not an iterator so
/// that `scanner.scan()` always names the inherent method.
#[derive(Debug)]
pub struct Tokens {
    scanner: Scanner,
    finished: bool,
}

impl Tokens {
    /// The underlying scanner.
    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }
}

impl Iterator for Tokens {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.finished {
            return None;
        }
        let token = self.scanner.scan();
        self.finished = token.is_terminal();
        Some(token)
    }
}

impl FusedIterator for Tokens {}

fn is_blank(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn is_quote_sigil(c: char) -> bool {
    matches!(c, '"' | '`')
}

/// Characters that end a bare identifier.
fn is_delimiter(c: char) -> bool {
    is_blank(c) || is_quote_sigil(c) || matches!(c, '.' | '{' | '}' | VARIABLE_SIGIL)
}
