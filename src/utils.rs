use crate::KnotError;
use crate::reader::Position;

/// True when `s` can be written as a bare map key or reference component:
/// a letter or underscore followed by letters, digits or underscores.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// Render a character for diagnostics: printable characters verbatim,
/// control characters in `\xHH` or `\uHHHH` escape form.
pub(crate) fn printable_char(c: char) -> String {
    if c.is_control() || c == '\u{FEFF}' {
        let code = c as u32;
        if code <= 0xFF {
            format!("\\x{:02X}", code)
        } else {
            format!("\\u{:04X}", code)
        }
    } else {
        c.to_string()
    }
}

/// Decode the backslash escapes of a raw string literal body (the text
/// between the quotes, exactly as it appeared in the source).
///
/// Recognized escapes: `\"` `\'` `\\` `\0` `\b` `\t` `\n` `\f` `\r`,
/// `\xHH`, `\uHHHH`, and a backslash directly before a line break, which
/// elides the break (line continuation). Anything else is fatal.
pub fn unescape(raw: &str, position: &Position) -> Result<String, KnotError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err(KnotError::InvalidEscape {
                sequence: "\\".into(),
                position: position.clone(),
                hint: Some("Trailing backslash in string".into()),
            });
        };
        match escape {
            '"' => out.push('"'),
            '\'' => out.push('\''),
            '\\' => out.push('\\'),
            '0' => out.push('\0'),
            'b' => out.push('\u{8}'),
            't' => out.push('\t'),
            'n' => out.push('\n'),
            'f' => out.push('\u{c}'),
            'r' => out.push('\r'),
            'x' => out.push(hex_escape(&mut chars, 2, position)?),
            'u' => out.push(hex_escape(&mut chars, 4, position)?),
            '\n' => {} // line continuation
            '\r' => {
                // \r\n is one line break; swallow the \n half too.
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            other => {
                return Err(KnotError::InvalidEscape {
                    sequence: format!("\\{}", printable_char(other)),
                    position: position.clone(),
                    hint: Some("Known escapes: \\\" \\' \\\\ \\0 \\b \\t \\n \\f \\r \\xHH \\uHHHH".into()),
                });
            }
        }
    }

    Ok(out)
}

fn hex_escape(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    digits: usize,
    position: &Position,
) -> Result<char, KnotError> {
    let marker = if digits == 2 { "\\x" } else { "\\u" };
    let mut code = 0u32;
    for _ in 0..digits {
        let digit = chars
            .next()
            .and_then(|c| c.to_digit(16))
            .ok_or_else(|| KnotError::InvalidEscape {
                sequence: marker.into(),
                position: position.clone(),
                hint: Some(format!("{} requires exactly {} hex digits", marker, digits)),
            })?;
        code = code * 16 + digit;
    }
    char::from_u32(code).ok_or_else(|| KnotError::InvalidEscape {
        sequence: format!("{}{:04X}", marker, code),
        position: position.clone(),
        hint: Some("Not a valid Unicode scalar value".into()),
    })
}

/// Encode `s` for emission inside a string literal delimited by `quote`.
/// The inverse of [`unescape`] for everything the formatter produces.
pub fn escape(s: &str, quote: char) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\0' => out.push_str("\\0"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xFF {
                    out.push_str(&format!("\\x{:02X}", code));
                } else {
                    out.push_str(&format!("\\u{:04X}", code));
                }
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn pos() -> Position {
        Position::start(Rc::from("<test>"))
    }

    #[test]
    fn test_identifier_check() {
        assert!(is_identifier("host"));
        assert!(is_identifier("_private"));
        assert!(is_identifier("spritely7"));
        assert!(!is_identifier("7up"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("with space"));
    }

    #[test]
    fn test_unescape_simple() {
        let decoded = unescape(r#"a\tb\n\"c\"\\"#, &pos()).unwrap();
        assert_eq!(decoded, "a\tb\n\"c\"\\");
    }

    #[test]
    fn test_unescape_hex_and_unicode() {
        assert_eq!(unescape(r"\x41é", &pos()).unwrap(), "Aé");
        assert!(unescape(r"\x4", &pos()).is_err());
        assert!(unescape(r"\u12", &pos()).is_err());
    }

    #[test]
    fn test_unescape_line_continuation() {
        assert_eq!(unescape("ab\\\ncd", &pos()).unwrap(), "abcd");
        assert_eq!(unescape("ab\\\r\ncd", &pos()).unwrap(), "abcd");
    }

    #[test]
    fn test_unescape_rejects_unknown() {
        let err = unescape(r"\q", &pos()).unwrap_err();
        assert!(matches!(err, KnotError::InvalidEscape { .. }));
    }

    #[test]
    fn test_escape_round_trip() {
        let original = "line1\nline2\t\"quoted\" \\ end\u{1}é";
        let encoded = escape(original, '"');
        assert_eq!(unescape(&encoded, &pos()).unwrap(), original);
    }

    #[test]
    fn test_escape_respects_quote_choice() {
        assert_eq!(escape("it's", '\''), "it\\'s");
        assert_eq!(escape("it's", '"'), "it's");
    }
}
