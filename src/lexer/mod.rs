use std::collections::VecDeque;
use std::fmt;

use crate::KnotError;
use crate::reader::{Position, Reader};

mod scanner;
mod tokenizer;

/// Token classification.
///
/// The reserved-word kinds (`Nil`..`DecimalType`) are specializations of
/// [`TokenKind::Identifier`]: they keep their keyword identity but still
/// answer to `matches(Identifier)`, so a keyword can serve as a map key or
/// reference component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // --- punctuation ---
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Slash,
    Equals,
    Percent,
    Caret,
    Dot,
    DotDot,
    Ellipsis,

    // --- identifiers & reserved words ---
    Identifier,
    Nil,
    Null,
    True,
    False,
    Boolean,
    StringType,
    IntegerType,
    DecimalType,

    // --- literals ---
    Integer,
    HexInteger,
    Decimal,
    String,

    // --- terminal ---
    End,
}

impl TokenKind {
    /// True for plain identifiers and every reserved word derived from one.
    pub fn is_identifier(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::Nil
                | TokenKind::Null
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Boolean
                | TokenKind::StringType
                | TokenKind::IntegerType
                | TokenKind::DecimalType
        )
    }

    /// Weak type-matching: exact kind equality, or any identifier-derived
    /// kind when an `Identifier` is expected.
    pub fn matches(self, expected: TokenKind) -> bool {
        self == expected || (expected == TokenKind::Identifier && self.is_identifier())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::LeftBrace => "'{'",
            TokenKind::RightBrace => "'}'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Slash => "'/'",
            TokenKind::Equals => "'='",
            TokenKind::Percent => "'%'",
            TokenKind::Caret => "'^'",
            TokenKind::Dot => "'.'",
            TokenKind::DotDot => "'..'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::Identifier => "identifier",
            TokenKind::Nil => "'nil'",
            TokenKind::Null => "'null'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Boolean => "'boolean'",
            TokenKind::StringType => "'string'",
            TokenKind::IntegerType => "'integer'",
            TokenKind::DecimalType => "'decimal'",
            TokenKind::Integer => "integer literal",
            TokenKind::HexInteger => "hex integer literal",
            TokenKind::Decimal => "decimal literal",
            TokenKind::String => "string literal",
            TokenKind::End => "end of input",
        };
        f.write_str(name)
    }
}

/// A single lexed token. Immutable once produced.
///
/// `text` is the literal source slice (string literals keep their quotes and
/// raw escapes; decoding happens in the parser). `comment` and `whitespace`
/// hold the trivia run that preceded the token, subject to the lexer's
/// [`WhitespaceMode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
    pub comment: String,
    pub whitespace: String,
}

impl Token {
    /// Human-readable form for diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::End => "end of input".to_string(),
            TokenKind::Identifier => format!("identifier '{}'", self.text),
            TokenKind::Integer
            | TokenKind::HexInteger
            | TokenKind::Decimal
            | TokenKind::String => format!("{} {}", self.kind, self.text),
            _ => self.kind.to_string(),
        }
    }
}

/// Controls how much trivia survives onto tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhitespaceMode {
    /// Discard comments and whitespace entirely.
    DropAll,
    /// Keep comment text, discard raw whitespace.
    #[default]
    PreserveComments,
    /// Keep both comment text and the raw whitespace run.
    PreserveAllWhitespace,
}

/// Tokenizer with an unbounded lookahead queue.
///
/// `peek(n)` lexes tokens on demand; `pop()` commits the front of the queue.
/// Once the input is exhausted every further token is `End` (idempotent
/// end-of-stream), so lookahead past the end is always safe.
pub struct Lexer<'a> {
    pub(super) reader: Reader<'a>,
    pub(super) mode: WhitespaceMode,
    queue: VecDeque<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_mode(input, WhitespaceMode::default())
    }

    pub fn with_mode(input: &'a str, mode: WhitespaceMode) -> Self {
        Lexer {
            reader: Reader::new(input),
            mode,
            queue: VecDeque::new(),
        }
    }

    pub fn with_source(input: &'a str, source: &str, mode: WhitespaceMode) -> Self {
        Lexer {
            reader: Reader::with_source(input, source),
            mode,
            queue: VecDeque::new(),
        }
    }

    pub fn mode(&self) -> WhitespaceMode {
        self.mode
    }

    /// Kind of the token `n` positions ahead.
    pub fn peek(&mut self, n: usize) -> Result<TokenKind, KnotError> {
        self.require(n + 1)?;
        Ok(self.queue[n].kind)
    }

    /// Full token `n` positions ahead, without consuming.
    pub fn peek_token(&mut self, n: usize) -> Result<&Token, KnotError> {
        self.require(n + 1)?;
        Ok(&self.queue[n])
    }

    /// Consume and return the next token.
    pub fn pop(&mut self) -> Result<Token, KnotError> {
        self.require(1)?;
        match self.queue.pop_front() {
            Some(token) => Ok(token),
            None => Err(KnotError::ReadPastEnd {
                position: self.reader.position(),
            }),
        }
    }

    /// Make sure at least `n` tokens are buffered.
    pub fn require(&mut self, n: usize) -> Result<(), KnotError> {
        while self.queue.len() < n {
            let token = tokenizer::next_token(self)?;
            self.queue.push_back(token);
        }
        Ok(())
    }
}
