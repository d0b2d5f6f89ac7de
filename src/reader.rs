use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;
use std::str::Chars;

use crate::KnotError;

/// A location in the source text, attached to every token and every
/// positional error. Lines and columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub source: Rc<str>,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn start(source: Rc<str>) -> Self {
        Position { source, line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// Buffered, lookahead-capable character source for the lexer.
///
/// `peek` fills an internal buffer on demand; `read`/`skip` consume and keep
/// line/column tracking in step. `\r`, `\n` and `\r\n` each count as exactly
/// one line advance.
pub struct Reader<'a> {
    input: Chars<'a>,
    buffer: VecDeque<char>,
    source: Rc<str>,
    line: u32,
    column: u32,
    last_was_cr: bool,
}

impl<'a> Reader<'a> {
    pub fn new(input: &'a str) -> Self {
        Self::with_source(input, "<input>")
    }

    pub fn with_source(input: &'a str, source: &str) -> Self {
        Reader {
            input: input.chars(),
            buffer: VecDeque::new(),
            source: Rc::from(source),
            line: 1,
            column: 1,
            last_was_cr: false,
        }
    }

    /// Look at the character `n` positions ahead without consuming anything.
    pub fn peek(&mut self, n: usize) -> Option<char> {
        self.fill(n + 1);
        self.buffer.get(n).copied()
    }

    /// Consume and return the next `n` characters.
    pub fn read(&mut self, n: usize) -> Result<String, KnotError> {
        self.fill(n);
        if self.buffer.len() < n {
            return Err(KnotError::ReadPastEnd { position: self.position() });
        }
        let mut out = String::with_capacity(n);
        for _ in 0..n {
            if let Some(c) = self.buffer.pop_front() {
                self.advance(c);
                out.push(c);
            }
        }
        Ok(out)
    }

    /// Consume `n` characters, discarding them.
    pub fn skip(&mut self, n: usize) -> Result<(), KnotError> {
        self.fill(n);
        if self.buffer.len() < n {
            return Err(KnotError::ReadPastEnd { position: self.position() });
        }
        for _ in 0..n {
            if let Some(c) = self.buffer.pop_front() {
                self.advance(c);
            }
        }
        Ok(())
    }

    /// Position of the next unconsumed character.
    pub fn position(&self) -> Position {
        Position {
            source: self.source.clone(),
            line: self.line,
            column: self.column,
        }
    }

    pub fn source(&self) -> Rc<str> {
        self.source.clone()
    }

    fn fill(&mut self, n: usize) {
        while self.buffer.len() < n {
            match self.input.next() {
                Some(c) => self.buffer.push_back(c),
                None => break,
            }
        }
    }

    fn advance(&mut self, c: char) {
        match c {
            '\r' => {
                self.line += 1;
                self.column = 1;
                self.last_was_cr = true;
            }
            '\n' => {
                // A \n directly after \r is the second half of one line break.
                if !self.last_was_cr {
                    self.line += 1;
                    self.column = 1;
                }
                self.last_was_cr = false;
            }
            _ => {
                self.column += 1;
                self.last_was_cr = false;
            }
        }
    }
}
