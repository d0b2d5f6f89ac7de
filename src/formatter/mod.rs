//! Tree-to-text rendering.
//!
//! The writer never fails: unresolved references render in raw path form
//! and every scalar has a spelling. Layout is driven entirely by
//! [`FormatStyle`]; a per-container complexity score decides between
//! inline and one-entry-per-line output.

use crate::document::{Document, Element, Scalar};
use crate::utils;

mod number;
mod style;


pub use style::{FormatStyle, Indent, NumberMode, Separator};

pub fn format_document(document: &Document, style: &FormatStyle) -> String {
    let mut writer = Writer::new(style);
    let root = document.root();
    if style.write_comments && !root.comment().is_empty() {
        writer.write_comment_lines(&root.comment());
        writer.out.push('\n');
    }
    writer.write_element(&root);
    if style.write_comments {
        if let Some(comment) = document.trailing_comment() {
            writer.out.push('\n');
            writer.write_comment_lines(comment);
        }
    }
    writer.out
}

pub(crate) fn format_element(element: &Element, style: &FormatStyle) -> String {
    let mut writer = Writer::new(style);
    writer.write_element(element);
    writer.out
}

struct Writer<'a> {
    style: &'a FormatStyle,
    out: String,
    depth: usize,
}

impl<'a> Writer<'a> {
    fn new(style: &'a FormatStyle) -> Self {
        Writer { style, out: String::new(), depth: 0 }
    }

    fn write_element(&mut self, element: &Element) {
        if element.is_map() {
            self.write_map(element);
        } else if element.is_list() {
            self.write_list(element);
        } else if element.is_reference() {
            self.write_reference(element);
        } else if let Some(scalar) = element.scalar() {
            self.write_scalar(&scalar);
        }
    }

    // --- scalars ---

    fn write_scalar(&mut self, scalar: &Scalar) {
        match scalar {
            Scalar::Null => self.out.push_str("null"),
            Scalar::Bool(true) => self.out.push_str("true"),
            Scalar::Bool(false) => self.out.push_str("false"),
            Scalar::Int(value) => {
                self.out.push_str(&number::format_int(*value, self.style));
            }
            Scalar::Double(value) => {
                self.out.push_str(&number::format_double(*value, self.style));
            }
            Scalar::String(value) => self.write_quoted(value),
        }
    }

    fn write_quoted(&mut self, text: &str) {
        let quote = self.style.quote;
        self.out.push(quote);
        self.out.push_str(&utils::escape(text, quote));
        self.out.push(quote);
    }

    // --- references ---

    fn write_reference(&mut self, element: &Element) {
        let delimiter = self.style.reference_delimiter;
        if element.rooted() {
            self.out.push(delimiter);
        }
        let path = element.path();
        for (i, component) in path.iter().enumerate() {
            if i > 0 {
                self.out.push(delimiter);
            }
            if component == "."
                || component == ".."
                || component.starts_with('[')
                || utils::is_identifier(component)
            {
                self.out.push_str(component);
            } else {
                self.write_quoted(component);
            }
        }
    }

    // --- containers ---

    fn write_map(&mut self, map: &Element) {
        let mut entries = map.entries();
        if self.style.sort_map_keys {
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        }

        if let Some(name) = map.type_name() {
            self.out.push_str(&name);
            self.spaces(self.style.spaces_before_type_brace);
        }

        self.out.push('{');
        if entries.is_empty() {
            self.out.push('}');
            return;
        }

        if self.multiline(map) {
            self.depth += 1;
            self.newlines(self.style.newlines_after_map_open);
            let last = entries.len() - 1;
            for (i, (key, child)) in entries.iter().enumerate() {
                self.indent();
                self.entry_comment(child);
                self.write_key(key);
                self.spaces(self.style.spaces_before_separator);
                self.out.push(self.style.separator.as_char());
                self.spaces(self.style.spaces_after_separator);
                self.write_element(child);
                if i < last || self.style.write_trailing_commas {
                    self.out.push(',');
                }
                if i < last {
                    self.newlines(self.style.newlines_between_map_entries);
                }
            }
            self.trailing_container_comment(map);
            self.depth -= 1;
            self.newlines(self.style.newlines_before_map_close);
            self.indent();
            self.out.push('}');
        } else {
            self.spaces(self.style.spaces_within_braces);
            let last = entries.len() - 1;
            for (i, (key, child)) in entries.iter().enumerate() {
                self.write_key(key);
                self.spaces(self.style.spaces_before_separator);
                self.out.push(self.style.separator.as_char());
                self.spaces(self.style.spaces_after_separator);
                self.write_element(child);
                if i < last {
                    self.spaces(self.style.spaces_before_comma);
                    self.out.push(',');
                    self.spaces(self.style.spaces_after_comma);
                }
            }
            self.spaces(self.style.spaces_within_braces);
            self.out.push('}');
        }
    }

    fn write_list(&mut self, list: &Element) {
        let items = list.items();
        self.out.push('[');
        if items.is_empty() {
            self.out.push(']');
            return;
        }

        if self.multiline(list) {
            self.depth += 1;
            self.newlines(self.style.newlines_after_list_open);
            let last = items.len() - 1;
            for (i, child) in items.iter().enumerate() {
                self.indent();
                self.entry_comment(child);
                self.write_element(child);
                if i < last || self.style.write_trailing_commas {
                    self.out.push(',');
                }
                if i < last {
                    self.newlines(self.style.newlines_between_list_items);
                }
            }
            self.trailing_container_comment(list);
            self.depth -= 1;
            self.newlines(self.style.newlines_before_list_close);
            self.indent();
            self.out.push(']');
        } else {
            self.spaces(self.style.spaces_within_brackets);
            let last = items.len() - 1;
            for (i, child) in items.iter().enumerate() {
                self.write_element(child);
                if i < last {
                    self.spaces(self.style.spaces_before_comma);
                    self.out.push(',');
                    self.spaces(self.style.spaces_after_comma);
                }
            }
            self.spaces(self.style.spaces_within_brackets);
            self.out.push(']');
        }
    }

    fn write_key(&mut self, key: &str) {
        if self.style.always_quote_keys || !utils::is_identifier(key) {
            self.write_quoted(key);
        } else {
            self.out.push_str(key);
        }
    }

    // --- comments & layout plumbing ---

    fn entry_comment(&mut self, element: &Element) {
        if !self.style.write_comments {
            return;
        }
        let comment = element.comment();
        if !comment.is_empty() {
            self.write_comment_lines(&comment);
            self.out.push('\n');
            self.indent();
        }
    }

    fn trailing_container_comment(&mut self, container: &Element) {
        if !self.style.write_comments {
            return;
        }
        let comment = container.trailing_comment();
        if !comment.is_empty() {
            self.out.push('\n');
            self.indent();
            self.write_comment_lines(&comment);
        }
    }

    fn write_comment_lines(&mut self, comment: &str) {
        for (i, line) in comment.lines().enumerate() {
            if i > 0 {
                self.out.push('\n');
                self.indent();
            }
            self.out.push_str("# ");
            self.out.push_str(line);
        }
    }

    fn multiline(&self, container: &Element) -> bool {
        complexity(container) > self.style.complexity_threshold
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            match self.style.indent {
                Indent::Tabs => self.out.push('\t'),
                Indent::Spaces(n) => self.spaces(n),
            }
        }
    }

    fn spaces(&mut self, count: u8) {
        for _ in 0..count {
            self.out.push(' ');
        }
    }

    fn newlines(&mut self, count: u8) {
        for _ in 0..count {
            self.out.push('\n');
        }
    }
}

/// Structural size heuristic: scalars and references are 1, a list costs
/// 2 plus its children, a map 2 plus three per child subtree.
fn complexity(element: &Element) -> u32 {
    if element.is_map() {
        2 + element
            .entries()
            .iter()
            .map(|(_, child)| 3 * complexity(child))
            .sum::<u32>()
    } else if element.is_list() {
        2 + element.items().iter().map(complexity).sum::<u32>()
    } else {
        1
    }
}
