//! knot-cfg is a structured-data text format: typed maps, lists, scalars,
//! comments, and intra-document cross-references.
//!
//! ```text
//! server {
//!   # connection endpoint
//!   host = "example.org",
//!   port = 8080,
//!   admin_port = :port,
//! }
//! ```
//!
//! The pipeline is a buffered [`reader::Reader`], a hand-written
//! [`lexer::Lexer`], a recursive-descent [`parser::Parser`] producing a
//! [`Document`] tree, a [`resolver`] pass that links references and
//! detects cycles, and a [`formatter`] that writes the tree back out under
//! a configurable [`FormatStyle`].

pub mod document;
pub mod error;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod reader;
pub mod resolver;
pub mod utils;

pub use document::{Document, Element, Index, Range, Scalar};
pub use error::KnotError;
pub use formatter::{FormatStyle, Indent, NumberMode, Separator};
pub use lexer::{Lexer, Token, TokenKind, WhitespaceMode};
pub use parser::Parser;
pub use reader::Position;

/// Parse a document from text.
pub fn parse(input: &str) -> Result<Document, KnotError> {
    parse_named(input, "input")
}

/// Parse a document from text, labelling diagnostics with `source`.
pub fn parse_named(input: &str, source: &str) -> Result<Document, KnotError> {
    let lexer = Lexer::with_source(input, source, WhitespaceMode::default());
    Parser::new(lexer).parse()
}
