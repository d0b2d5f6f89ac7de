use std::collections::HashMap;

use once_cell::sync::Lazy;

use super::scanner::{self, is_identifier_char, is_identifier_start};
use super::{Lexer, Token, TokenKind, WhitespaceMode};
use crate::KnotError;
use crate::reader::Position;
use crate::utils::printable_char;

/// Case-insensitive reserved-word table. Keys are lowercase.
static RESERVED: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    HashMap::from([
        ("nil", TokenKind::Nil),
        ("null", TokenKind::Null),
        ("true", TokenKind::True),
        ("false", TokenKind::False),
        ("boolean", TokenKind::Boolean),
        ("string", TokenKind::StringType),
        ("integer", TokenKind::IntegerType),
        ("decimal", TokenKind::DecimalType),
    ])
});

pub(super) fn next_token(lexer: &mut Lexer) -> Result<Token, KnotError> {
    let (comment, whitespace) = scanner::consume_trivia(&mut lexer.reader)?;
    let position = lexer.reader.position();

    let (kind, text) = match lexer.reader.peek(0) {
        None => (TokenKind::End, String::new()),
        Some('{') => punctuation(lexer, TokenKind::LeftBrace)?,
        Some('}') => punctuation(lexer, TokenKind::RightBrace)?,
        Some('[') => punctuation(lexer, TokenKind::LeftBracket)?,
        Some(']') => punctuation(lexer, TokenKind::RightBracket)?,
        Some(',') => punctuation(lexer, TokenKind::Comma)?,
        Some(':') => punctuation(lexer, TokenKind::Colon)?,
        Some('/') => punctuation(lexer, TokenKind::Slash)?,
        Some('=') => punctuation(lexer, TokenKind::Equals)?,
        Some('%') => punctuation(lexer, TokenKind::Percent)?,
        Some('^') => punctuation(lexer, TokenKind::Caret)?,
        Some('"') | Some('\'') => tokenize_string(lexer, &position)?,
        Some('.') => tokenize_dot(lexer, String::new(), &position)?,
        Some('+') | Some('-') => tokenize_number(lexer, &position)?,
        Some(c) if c.is_ascii_digit() => tokenize_number(lexer, &position)?,
        Some(c) if is_identifier_start(c) => tokenize_identifier(lexer)?,
        Some(c) => {
            lexer.reader.skip(1)?;
            return Err(KnotError::UnexpectedCharacter {
                character: c,
                position,
                hint: Some("Character cannot start a token".into()),
            });
        }
    };

    let (comment, whitespace) = match lexer.mode {
        WhitespaceMode::DropAll => (String::new(), String::new()),
        WhitespaceMode::PreserveComments => (comment, String::new()),
        WhitespaceMode::PreserveAllWhitespace => (comment, whitespace),
    };

    Ok(Token { kind, text, position, comment, whitespace })
}

fn punctuation(lexer: &mut Lexer, kind: TokenKind) -> Result<(TokenKind, String), KnotError> {
    let text = lexer.reader.read(1)?;
    Ok((kind, text))
}

fn tokenize_identifier(lexer: &mut Lexer) -> Result<(TokenKind, String), KnotError> {
    let mut text = String::new();
    while let Some(c) = lexer.reader.peek(0) {
        if !is_identifier_char(c) {
            break;
        }
        lexer.reader.skip(1)?;
        text.push(c);
    }

    let kind = RESERVED
        .get(text.to_lowercase().as_str())
        .copied()
        .unwrap_or(TokenKind::Identifier);
    Ok((kind, text))
}

fn tokenize_string(lexer: &mut Lexer, position: &Position) -> Result<(TokenKind, String), KnotError> {
    let mut text = lexer.reader.read(1)?;
    let quote = text.chars().next().unwrap_or('"');

    loop {
        match lexer.reader.peek(0) {
            None => {
                return Err(KnotError::UnclosedString {
                    quote,
                    position: position.clone(),
                    hint: Some("String literal not closed".into()),
                });
            }
            Some(c) if c == quote => {
                text.push_str(&lexer.reader.read(1)?);
                break;
            }
            Some('\\') => {
                // Keep escapes raw; decoding happens in the parser.
                text.push_str(&lexer.reader.read(1)?);
                if lexer.reader.peek(0).is_none() {
                    return Err(KnotError::UnclosedString {
                        quote,
                        position: position.clone(),
                        hint: Some("Trailing backslash in string".into()),
                    });
                }
                text.push_str(&lexer.reader.read(1)?);
            }
            Some('\r') => {
                return Err(KnotError::UnexpectedCharacter {
                    character: '\r',
                    position: lexer.reader.position(),
                    hint: Some("Bare carriage return inside a string; escape it as \\r".into()),
                });
            }
            Some(_) => {
                text.push_str(&lexer.reader.read(1)?);
            }
        }
    }

    Ok((TokenKind::String, text))
}

fn tokenize_number(lexer: &mut Lexer, position: &Position) -> Result<(TokenKind, String), KnotError> {
    let mut text = String::new();

    if matches!(lexer.reader.peek(0), Some('+') | Some('-')) {
        text.push_str(&lexer.reader.read(1)?);
    }

    match lexer.reader.peek(0) {
        Some('.') => return tokenize_dot(lexer, text, position),
        Some(c) if c.is_ascii_digit() => {}
        _ => {
            return Err(KnotError::InvalidNumber {
                literal: text,
                position: position.clone(),
                hint: Some("A sign must be followed by digits or '.'".into()),
            });
        }
    }

    // Hex integer: 0x / 0X followed by at least one hex digit.
    if lexer.reader.peek(0) == Some('0')
        && matches!(lexer.reader.peek(1), Some('x') | Some('X'))
    {
        text.push_str(&lexer.reader.read(2)?);
        let digits = read_digits(lexer, |c| c.is_ascii_hexdigit())?;
        if digits.is_empty() {
            return Err(KnotError::InvalidNumber {
                literal: text,
                position: position.clone(),
                hint: Some("Hex literal needs at least one digit after 0x".into()),
            });
        }
        text.push_str(&digits);
        return Ok((TokenKind::HexInteger, text));
    }

    text.push_str(&read_digits(lexer, |c| c.is_ascii_digit())?);

    let mut is_decimal = false;

    // Fractional part, but leave '..' / '...' alone for slice ranges.
    if lexer.reader.peek(0) == Some('.')
        && lexer.reader.peek(1).is_some_and(|c| c.is_ascii_digit())
    {
        text.push_str(&lexer.reader.read(1)?);
        text.push_str(&read_digits(lexer, |c| c.is_ascii_digit())?);
        is_decimal = true;
    }

    if matches!(lexer.reader.peek(0), Some('e') | Some('E')) {
        text.push_str(&read_exponent(lexer, &text, position)?);
        is_decimal = true;
    }

    let kind = if is_decimal { TokenKind::Decimal } else { TokenKind::Integer };
    Ok((kind, text))
}

/// Tokens starting with '.': the '.' / '..' / '...' path markers, a
/// fraction-only decimal like `.5`, and the special spellings `.NaN`/`.Inf`
/// (with optional sign already collected in `text`).
fn tokenize_dot(
    lexer: &mut Lexer,
    mut text: String,
    position: &Position,
) -> Result<(TokenKind, String), KnotError> {
    if text.is_empty() && lexer.reader.peek(1) == Some('.') {
        if lexer.reader.peek(2) == Some('.') {
            return Ok((TokenKind::Ellipsis, lexer.reader.read(3)?));
        }
        return Ok((TokenKind::DotDot, lexer.reader.read(2)?));
    }

    if peek_word(lexer, 1, "NaN") {
        text.push_str(&lexer.reader.read(4)?);
        return Ok((TokenKind::Decimal, text));
    }
    if peek_word(lexer, 1, "Inf") {
        text.push_str(&lexer.reader.read(4)?);
        return Ok((TokenKind::Decimal, text));
    }

    if lexer.reader.peek(1).is_some_and(|c| c.is_ascii_digit()) {
        text.push_str(&lexer.reader.read(1)?);
        text.push_str(&read_digits(lexer, |c| c.is_ascii_digit())?);
        if matches!(lexer.reader.peek(0), Some('e') | Some('E')) {
            text.push_str(&read_exponent(lexer, &text, position)?);
        }
        return Ok((TokenKind::Decimal, text));
    }

    if text.is_empty() {
        return Ok((TokenKind::Dot, lexer.reader.read(1)?));
    }

    text.push_str(&lexer.reader.read(1)?);
    Err(KnotError::InvalidNumber {
        literal: text,
        position: position.clone(),
        hint: Some("Expected digits, 'NaN' or 'Inf' after the decimal point".into()),
    })
}

fn read_exponent(
    lexer: &mut Lexer,
    mantissa: &str,
    position: &Position,
) -> Result<String, KnotError> {
    let mut text = lexer.reader.read(1)?; // e | E
    if matches!(lexer.reader.peek(0), Some('+') | Some('-')) {
        text.push_str(&lexer.reader.read(1)?);
    }
    let digits = read_digits(lexer, |c| c.is_ascii_digit())?;
    if digits.is_empty() {
        return Err(KnotError::InvalidNumber {
            literal: format!("{}{}", mantissa, text),
            position: position.clone(),
            hint: Some(
                format!(
                    "Exponent needs digits, found {}",
                    lexer
                        .reader
                        .peek(0)
                        .map_or("end of input".to_string(), |c| format!("'{}'", printable_char(c)))
                ),
            ),
        });
    }
    text.push_str(&digits);
    Ok(text)
}

fn read_digits(lexer: &mut Lexer, accept: fn(char) -> bool) -> Result<String, KnotError> {
    let mut digits = String::new();
    while let Some(c) = lexer.reader.peek(0) {
        if !accept(c) {
            break;
        }
        lexer.reader.skip(1)?;
        digits.push(c);
    }
    Ok(digits)
}

fn peek_word(lexer: &mut Lexer, offset: usize, word: &str) -> bool {
    for (i, expected) in word.chars().enumerate() {
        if lexer.reader.peek(offset + i) != Some(expected) {
            return false;
        }
    }
    // The word must end where a longer identifier would continue.
    !lexer
        .reader
        .peek(offset + word.len())
        .is_some_and(is_identifier_char)
}
