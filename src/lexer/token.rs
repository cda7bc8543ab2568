//! Token types produced by the scanner.

use std::fmt;

/// Token kinds produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input. Terminal.
    EndOfInput,
    /// One or more newlines, collapsed.
    EndOfLine,
    /// Opening or closing quote/template sigil (`"` or `` ` ``).
    Quote,
    /// Comment (`# ...`), literal holds the trimmed text.
    Comment,
    /// Bare word starting with a letter.
    Identifier,
    /// Identifier found in the reserved-word set.
    Keyword,
    /// Macro (`@name`), literal holds the name.
    Macro,
    /// Variable reference (`$name` or `${name}`), literal holds the name.
    Variable,
    /// String body: single-quoted, heredoc, quoted segment or bare word.
    String,
    /// Unsigned decimal number, optionally with a fractional part.
    Number,
    /// `.`
    Dot,
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// Malformed input. Terminal.
    Invalid,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::EndOfInput => "EOF",
            TokenKind::EndOfLine => "EOL",
            TokenKind::Quote => "QUOTE",
            TokenKind::Comment => "COMMENT",
            TokenKind::Identifier => "IDENT",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Macro => "MACRO",
            TokenKind::Variable => "VARIABLE",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Dot => "DOT",
            TokenKind::LeftBrace => "LBRACE",
            TokenKind::RightBrace => "RBRACE",
            TokenKind::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token with its kind, text, and the position where it starts.
///
/// `line` and `column` are 1-based; columns count Unicode scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub literal: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            line,
            column,
        }
    }

    /// Returns true for the tokens after which a caller must stop scanning.
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, TokenKind::EndOfInput | TokenKind::Invalid)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.literal.is_empty() {
            write!(f, "{}:{} {}", self.line, self.column, self.kind)
        } else {
            write!(
                f,
                "{}:{} {} {:?}",
                self.line, self.column, self.kind, self.literal
            )
        }
    }
}
