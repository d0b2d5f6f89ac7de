use crate::KnotError;
use crate::document::{Document, Element};
use crate::lexer::{Lexer, Token, TokenKind};

mod reference;
mod value;

#[cfg(test)]
mod tests;

/// Recursive-descent parser over a [`Lexer`] token stream.
///
/// Grammar productions that cannot be told apart by a single token
/// (typed maps vs. references, string values vs. string path components)
/// are disambiguated by *prefix scanning*: a virtual cursor walks the
/// lexer's lookahead queue without consuming anything, and a saved-cursor
/// stack allows nested speculation. All `is_*` predicates below are pure,
/// they leave both the cursor and the token queue exactly as they found
/// them.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    scan_cursor: usize,
    scan_stack: Vec<usize>,
    finished_with_closing: bool,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Parser {
            lexer,
            scan_cursor: 0,
            scan_stack: Vec::new(),
            finished_with_closing: false,
        }
    }

    /// Parse a complete document: one root element followed by end of
    /// input. A comment dangling after the last token becomes the
    /// document's trailing comment.
    pub fn parse(&mut self) -> Result<Document, KnotError> {
        let root = self.parse_element()?;
        let end = self.lexer.pop()?;
        if end.kind != TokenKind::End {
            return Err(self.unexpected(&end, vec![TokenKind::End]));
        }
        let trailing = if end.comment.is_empty() {
            None
        } else {
            Some(end.comment)
        };
        Ok(Document::with_trailing_comment(root, trailing))
    }

    // --- prefix scanning ---

    fn begin_prefix_scan(&mut self) {
        self.scan_stack.push(self.scan_cursor);
    }

    fn next_prefix(&mut self) -> Result<TokenKind, KnotError> {
        let kind = self.lexer.peek(self.scan_cursor)?;
        self.scan_cursor += 1;
        Ok(kind)
    }

    fn end_prefix_scan(&mut self) {
        self.scan_cursor = self
            .scan_stack
            .pop()
            .unwrap_or(0);
    }

    // --- disambiguation predicates, all side-effect free ---

    fn is_map(&mut self) -> Result<bool, KnotError> {
        self.begin_prefix_scan();
        let result = self.next_prefix()? == TokenKind::LeftBrace;
        self.end_prefix_scan();
        Ok(result)
    }

    fn is_typed_map(&mut self) -> Result<bool, KnotError> {
        self.begin_prefix_scan();
        let result = self.next_prefix()?.is_identifier()
            && self.next_prefix()? == TokenKind::LeftBrace;
        self.end_prefix_scan();
        Ok(result)
    }

    fn is_list(&mut self) -> Result<bool, KnotError> {
        self.begin_prefix_scan();
        let result = self.next_prefix()? == TokenKind::LeftBracket;
        self.end_prefix_scan();
        Ok(result)
    }

    fn is_identifier(&mut self) -> Result<bool, KnotError> {
        self.begin_prefix_scan();
        let result = self.next_prefix()?.is_identifier();
        self.end_prefix_scan();
        Ok(result)
    }

    fn is_reference(&mut self) -> Result<bool, KnotError> {
        self.begin_prefix_scan();
        let first = self.next_prefix()?;
        let result = match first {
            TokenKind::Colon | TokenKind::Slash => true,
            TokenKind::Dot | TokenKind::DotDot => true,
            // Literal keywords and strings are values on their own; they
            // only open a reference when a path delimiter follows.
            TokenKind::Nil
            | TokenKind::Null
            | TokenKind::True
            | TokenKind::False
            | TokenKind::String => matches!(
                self.next_prefix()?,
                TokenKind::Colon | TokenKind::Slash
            ),
            kind if kind.is_identifier() => {
                // A bare identifier is a one-component reference unless it
                // opens a typed map.
                self.next_prefix()? != TokenKind::LeftBrace
            }
            _ => false,
        };
        self.end_prefix_scan();
        Ok(result)
    }

    // --- productions ---

    fn parse_element(&mut self) -> Result<Element, KnotError> {
        self.finished_with_closing = false;
        if self.is_typed_map()? {
            self.parse_typed_map()
        } else if self.is_map()? {
            self.parse_map(None)
        } else if self.is_list()? {
            self.parse_list()
        } else if self.is_reference()? {
            reference::parse_reference(self)
        } else {
            self.parse_value()
        }
    }

    fn parse_value(&mut self) -> Result<Element, KnotError> {
        let token = self.lexer.pop()?;
        let scalar = value::scalar_from_token(&token)?;
        let element = Element::value(scalar);
        element.set_comment(token.comment);
        element.set_whitespace(token.whitespace);
        Ok(element)
    }

    fn parse_typed_map(&mut self) -> Result<Element, KnotError> {
        let name = self.expect(TokenKind::Identifier)?;
        let map = self.parse_map(Some(name.text))?;
        if !name.comment.is_empty() {
            map.set_comment(name.comment);
        }
        map.set_whitespace(name.whitespace);
        Ok(map)
    }

    fn parse_map(&mut self, type_name: Option<String>) -> Result<Element, KnotError> {
        let open = self.expect(TokenKind::LeftBrace)?;
        let map = Element::map();
        map.set_type_name(type_name);
        if map.comment().is_empty() {
            map.set_comment(open.comment);
            map.set_whitespace(open.whitespace);
        }

        loop {
            if self.lexer.peek(0)? == TokenKind::RightBrace {
                break;
            }
            let key = self.parse_key()?;
            let separator = self.lexer.pop()?;
            if !matches!(separator.kind, TokenKind::Equals | TokenKind::Colon) {
                return Err(self.unexpected(
                    &separator,
                    vec![TokenKind::Equals, TokenKind::Colon],
                ));
            }
            let element = self.parse_element()?;
            let key_text = unquote_key(&key)?;
            // The comment before an entry sits on its key token.
            if !key.comment.is_empty() {
                element.set_comment(key.comment);
            }
            if !key.whitespace.is_empty() {
                element.set_whitespace(key.whitespace);
            }
            map.put(key_text, element);
            self.entry_boundary(TokenKind::RightBrace)?;
        }

        let close = self.expect(TokenKind::RightBrace)?;
        if !close.comment.is_empty() {
            map.set_trailing_comment(close.comment);
        }
        self.finished_with_closing = true;
        Ok(map)
    }

    fn parse_list(&mut self) -> Result<Element, KnotError> {
        let open = self.expect(TokenKind::LeftBracket)?;
        let list = Element::list();
        list.set_comment(open.comment);
        list.set_whitespace(open.whitespace);

        loop {
            if self.lexer.peek(0)? == TokenKind::RightBracket {
                break;
            }
            let element = self.parse_element()?;
            list.add(element);
            self.entry_boundary(TokenKind::RightBracket)?;
        }

        let close = self.expect(TokenKind::RightBracket)?;
        if !close.comment.is_empty() {
            list.set_trailing_comment(close.comment);
        }
        self.finished_with_closing = true;
        Ok(list)
    }

    fn parse_key(&mut self) -> Result<Token, KnotError> {
        if self.is_identifier()? || self.peek(0)? == TokenKind::String {
            self.lexer.pop()
        } else {
            let token = self.lexer.pop()?;
            Err(self.unexpected(
                &token,
                vec![TokenKind::Identifier, TokenKind::String],
            ))
        }
    }

    /// Enforce the separator rule after a container entry: a comma, or the
    /// container's closing token, or nothing at all when the entry itself
    /// ended with `}`/`]`.
    fn entry_boundary(&mut self, closer: TokenKind) -> Result<(), KnotError> {
        let next = self.lexer.peek(0)?;
        if next == TokenKind::Comma {
            self.lexer.pop()?;
            return Ok(());
        }
        if next == closer || self.finished_with_closing {
            return Ok(());
        }
        let token = self.lexer.pop()?;
        Err(self.unexpected(&token, vec![TokenKind::Comma, closer]))
    }

    // --- token helpers shared with the submodules ---

    pub(super) fn pop(&mut self) -> Result<Token, KnotError> {
        self.lexer.pop()
    }

    pub(super) fn peek(&mut self, n: usize) -> Result<TokenKind, KnotError> {
        self.lexer.peek(n)
    }

    pub(super) fn expect(&mut self, expected: TokenKind) -> Result<Token, KnotError> {
        let token = self.lexer.pop()?;
        if token.kind.matches(expected) {
            Ok(token)
        } else {
            Err(self.unexpected(&token, vec![expected]))
        }
    }

    pub(super) fn unexpected(&self, token: &Token, expected: Vec<TokenKind>) -> KnotError {
        KnotError::UnexpectedToken {
            found: token.describe(),
            expected,
            position: token.position.clone(),
            hint: None,
        }
    }
}

/// Map keys may be written as string literals; storage keeps the decoded
/// text.
fn unquote_key(key: &Token) -> Result<String, KnotError> {
    if key.kind == TokenKind::String {
        value::decode_string(key)
    } else {
        Ok(key.text.clone())
    }
}
