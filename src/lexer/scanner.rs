use crate::KnotError;
use crate::reader::Reader;

/// Consume the maximal run of whitespace and `#` comments in front of a
/// token, accumulating comment text and raw whitespace separately.
///
/// Consecutive comment lines concatenate with `\n`; a blank line (two line
/// breaks with nothing but spaces between) discards what was accumulated so
/// far, so a detached comment never leaks onto the next token.
pub(super) fn consume_trivia(reader: &mut Reader) -> Result<(String, String), KnotError> {
    let mut comment = String::new();
    let mut whitespace = String::new();
    let mut newline_run = 0u32;

    loop {
        match reader.peek(0) {
            Some(c @ (' ' | '\t')) => {
                reader.skip(1)?;
                whitespace.push(c);
            }
            Some('\r') | Some('\n') => {
                let pair = reader.peek(0) == Some('\r') && reader.peek(1) == Some('\n');
                let chunk = reader.read(if pair { 2 } else { 1 })?;
                whitespace.push_str(&chunk);
                newline_run += 1;
                if newline_run >= 2 {
                    comment.clear();
                }
            }
            Some('#') => {
                reader.skip(1)?;
                let line = read_comment_line(reader)?;
                if !comment.is_empty() {
                    comment.push('\n');
                }
                comment.push_str(line.trim());
                newline_run = 0;
            }
            _ => break,
        }
    }

    Ok((comment, whitespace))
}

fn read_comment_line(reader: &mut Reader) -> Result<String, KnotError> {
    let mut line = String::new();
    while let Some(c) = reader.peek(0) {
        if c == '\r' || c == '\n' {
            break;
        }
        reader.skip(1)?;
        line.push(c);
    }
    Ok(line)
}

pub(super) fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub(super) fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
