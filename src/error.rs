use std::fmt;

use crate::lexer::TokenKind;
use crate::reader::Position;
use crate::utils::printable_char;

/// The main error type for KNOT lexing, parsing and resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum KnotError {
    /// Raised when reading past the confirmed end of the input. This is an
    /// internal lexer/parser bug, never a recoverable user condition.
    ReadPastEnd {
        position: Position,
    },
    /// Raised for characters that can never start a token.
    UnexpectedCharacter {
        character: char,
        position: Position,
        hint: Option<String>,
    },
    /// Raised when a string literal is not closed.
    UnclosedString {
        quote: char,
        position: Position,
        hint: Option<String>,
    },
    /// Raised for an unterminated or unrecognized backslash escape.
    InvalidEscape {
        sequence: String,
        position: Position,
        hint: Option<String>,
    },
    /// Raised for malformed numeric literals (bad exponent, empty hex, overflow).
    InvalidNumber {
        literal: String,
        position: Position,
        hint: Option<String>,
    },
    /// Raised when the parser meets a token outside the expected set.
    UnexpectedToken {
        found: String,
        expected: Vec<TokenKind>,
        position: Position,
        hint: Option<String>,
    },
    /// Raised during resolution when a reference resolves to itself,
    /// an ancestor, or through a loop of other references.
    CyclicReference {
        path: String,
    },
}

fn expected_list(expected: &[TokenKind]) -> String {
    expected
        .iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref()
        .map_or(String::new(), |h| format!(" Hint: {}", h))
}

impl fmt::Display for KnotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KnotError::ReadPastEnd { position } => {
                write!(f, "[KNOT] Read past end of input at {}", position)
            }
            KnotError::UnexpectedCharacter { character, position, hint } => write!(
                f,
                "[KNOT] Unexpected character '{}' at {}{}",
                printable_char(*character),
                position,
                hint_suffix(hint)
            ),
            KnotError::UnclosedString { quote, position, hint } => write!(
                f,
                "[KNOT] Unclosed string starting with {} at {}{}",
                quote,
                position,
                hint_suffix(hint)
            ),
            KnotError::InvalidEscape { sequence, position, hint } => write!(
                f,
                "[KNOT] Invalid escape sequence '{}' at {}{}",
                sequence,
                position,
                hint_suffix(hint)
            ),
            KnotError::InvalidNumber { literal, position, hint } => write!(
                f,
                "[KNOT] Invalid number '{}' at {}{}",
                literal,
                position,
                hint_suffix(hint)
            ),
            KnotError::UnexpectedToken { found, expected, position, hint } => write!(
                f,
                "[KNOT] Unexpected {} at {}, expected {}{}",
                found,
                position,
                expected_list(expected),
                hint_suffix(hint)
            ),
            KnotError::CyclicReference { path } => {
                write!(f, "[KNOT] Cyclic reference '{}'", path)
            }
        }
    }
}

impl std::error::Error for KnotError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_display_includes_position_and_hint() {
        let err = KnotError::UnexpectedCharacter {
            character: '\u{1}',
            position: Position {
                source: Rc::from("conf.knot"),
                line: 3,
                column: 7,
            },
            hint: Some("remove the control character".into()),
        };
        let text = err.to_string();
        assert!(text.contains("conf.knot:3:7"));
        assert!(text.contains("\\x01"));
        assert!(text.contains("Hint:"));
    }

    #[test]
    fn test_display_expected_tokens() {
        let err = KnotError::UnexpectedToken {
            found: "',' (\",\")".into(),
            expected: vec![TokenKind::Identifier, TokenKind::String],
            position: Position::start(Rc::from("<input>")),
            hint: None,
        };
        let text = err.to_string();
        assert!(text.contains("identifier or string"));
    }
}
