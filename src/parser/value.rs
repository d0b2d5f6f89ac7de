use crate::KnotError;
use crate::document::Scalar;
use crate::lexer::{Token, TokenKind};
use crate::utils;

/// Convert a literal token into its scalar payload. String escapes are
/// decoded here, not in the lexer, so tokens stay byte-faithful to the
/// source.
pub(super) fn scalar_from_token(token: &Token) -> Result<Scalar, KnotError> {
    match token.kind {
        TokenKind::Nil | TokenKind::Null => Ok(Scalar::Null),
        TokenKind::True => Ok(Scalar::Bool(true)),
        TokenKind::False => Ok(Scalar::Bool(false)),
        TokenKind::Integer => parse_int(token),
        TokenKind::HexInteger => parse_hex_int(token),
        TokenKind::Decimal => parse_double(token),
        TokenKind::String => Ok(Scalar::String(decode_string(token)?)),
        _ => Err(KnotError::UnexpectedToken {
            found: token.describe(),
            expected: vec![
                TokenKind::Null,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Integer,
                TokenKind::Decimal,
                TokenKind::String,
            ],
            position: token.position.clone(),
            hint: None,
        }),
    }
}

fn parse_int(token: &Token) -> Result<Scalar, KnotError> {
    token
        .text
        .parse::<i64>()
        .map(Scalar::Int)
        .map_err(|_| invalid_number(token, "value does not fit in a 64-bit integer"))
}

fn parse_hex_int(token: &Token) -> Result<Scalar, KnotError> {
    let (negative, rest) = match token.text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, token.text.strip_prefix('+').unwrap_or(&token.text)),
    };
    let digits = rest
        .strip_prefix("0x")
        .or_else(|| rest.strip_prefix("0X"))
        .unwrap_or(rest);
    let magnitude = u64::from_str_radix(digits, 16)
        .map_err(|_| invalid_number(token, "value does not fit in a 64-bit integer"))?;
    let value = if negative {
        if magnitude > i64::MAX as u64 + 1 {
            return Err(invalid_number(token, "value does not fit in a 64-bit integer"));
        }
        (magnitude as i64).wrapping_neg()
    } else {
        i64::try_from(magnitude)
            .map_err(|_| invalid_number(token, "value does not fit in a 64-bit integer"))?
    };
    Ok(Scalar::Int(value))
}

fn parse_double(token: &Token) -> Result<Scalar, KnotError> {
    let value = match token.text.as_str() {
        ".NaN" => f64::NAN,
        ".Inf" | "+.Inf" => f64::INFINITY,
        "-.Inf" => f64::NEG_INFINITY,
        text => text
            .parse::<f64>()
            .map_err(|_| invalid_number(token, "not a valid decimal literal"))?,
    };
    Ok(Scalar::Double(value))
}

/// Strip the delimiting quotes and decode escape sequences.
pub(super) fn decode_string(token: &Token) -> Result<String, KnotError> {
    let text = &token.text;
    let raw = if text.len() >= 2 {
        &text[1..text.len() - 1]
    } else {
        text.as_str()
    };
    utils::unescape(raw, &token.position)
}

fn invalid_number(token: &Token, hint: &str) -> KnotError {
    KnotError::InvalidNumber {
        literal: token.text.clone(),
        position: token.position.clone(),
        hint: Some(hint.to_string()),
    }
}
