use super::Parser;
use crate::KnotError;
use crate::document::{Element, Index, Range};
use crate::lexer::TokenKind;

use super::value;

/// Parse a reference path. The first delimiter locks the style for the
/// whole path; a leading delimiter additionally marks the reference as
/// rooted at the document top instead of the nearest enclosing map.
pub(super) fn parse_reference(parser: &mut Parser) -> Result<Element, KnotError> {
    let mut rooted = false;
    let mut delimiter: Option<TokenKind> = None;
    let mut comment = String::new();
    let mut whitespace = String::new();

    let first = parser.peek(0)?;
    if matches!(first, TokenKind::Colon | TokenKind::Slash) {
        let token = parser.pop()?;
        rooted = true;
        delimiter = Some(token.kind);
        comment = token.comment;
        whitespace = token.whitespace;
    }

    let mut path = Vec::new();
    loop {
        let component = parse_component(parser)?;
        if path.is_empty() && !rooted {
            comment = component.comment;
            whitespace = component.whitespace;
        }
        path.push(component.text);

        let next = parser.peek(0)?;
        if !matches!(next, TokenKind::Colon | TokenKind::Slash) {
            break;
        }
        match delimiter {
            Some(kind) if kind != next => {
                let token = parser.pop()?;
                return Err(KnotError::UnexpectedToken {
                    found: token.describe(),
                    expected: vec![kind],
                    position: token.position,
                    hint: Some(
                        "reference paths must use a single delimiter style".to_string(),
                    ),
                });
            }
            _ => {
                let token = parser.pop()?;
                delimiter = Some(token.kind);
            }
        }
    }

    let element = Element::reference(path, rooted);
    element.set_comment(comment);
    element.set_whitespace(whitespace);
    Ok(element)
}

struct Component {
    text: String,
    comment: String,
    whitespace: String,
}

fn parse_component(parser: &mut Parser) -> Result<Component, KnotError> {
    let kind = parser.peek(0)?;
    match kind {
        TokenKind::Dot | TokenKind::DotDot => {
            let token = parser.pop()?;
            Ok(Component {
                text: token.text,
                comment: token.comment,
                whitespace: token.whitespace,
            })
        }
        TokenKind::String => {
            let token = parser.pop()?;
            let text = value::decode_string(&token)?;
            Ok(Component {
                text,
                comment: token.comment,
                whitespace: token.whitespace,
            })
        }
        TokenKind::LeftBracket => parse_slice(parser),
        _ if kind.is_identifier() => {
            let token = parser.pop()?;
            Ok(Component {
                text: token.text,
                comment: token.comment,
                whitespace: token.whitespace,
            })
        }
        _ => {
            let token = parser.pop()?;
            Err(parser.unexpected(
                &token,
                vec![
                    TokenKind::Identifier,
                    TokenKind::String,
                    TokenKind::Dot,
                    TokenKind::DotDot,
                    TokenKind::LeftBracket,
                ],
            ))
        }
    }
}

/// A bracketed index or range component, stored in canonical text form.
/// Evaluating slices against a list is left to callers of the document
/// model; the grammar only has to carry them through.
fn parse_slice(parser: &mut Parser) -> Result<Component, KnotError> {
    let open = parser.expect(TokenKind::LeftBracket)?;

    // Both ends of a range may be omitted: the start defaults to the first
    // element, the end to the last.
    let start = if matches!(parser.peek(0)?, TokenKind::DotDot | TokenKind::Ellipsis) {
        Index::new(0)
    } else {
        parse_index(parser)?
    };

    let kind = parser.peek(0)?;
    let text = if matches!(kind, TokenKind::DotDot | TokenKind::Ellipsis) {
        parser.pop()?;
        let exclusive = kind == TokenKind::Ellipsis;
        let end = if parser.peek(0)? == TokenKind::RightBracket {
            if exclusive { Index::from_end(0) } else { Index::from_end(1) }
        } else {
            parse_index(parser)?
        };
        let range = if exclusive {
            Range::exclusive(start, end)
        } else {
            Range::inclusive(start, end)
        };
        format!("[{}]", range)
    } else {
        format!("[{}]", start)
    };

    parser.expect(TokenKind::RightBracket)?;
    Ok(Component {
        text,
        comment: open.comment,
        whitespace: open.whitespace,
    })
}

fn parse_index(parser: &mut Parser) -> Result<Index, KnotError> {
    let from_end = parser.peek(0)? == TokenKind::Caret;
    if from_end {
        parser.pop()?;
    }
    let token = parser.expect(TokenKind::Integer)?;
    let value = token.text.parse::<i32>().map_err(|_| KnotError::InvalidNumber {
        literal: token.text.clone(),
        position: token.position.clone(),
        hint: Some("list indices must fit in a 32-bit integer".to_string()),
    })?;
    Ok(if from_end {
        Index::from_end(value)
    } else {
        Index::new(value)
    })
}
