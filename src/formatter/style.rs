use serde::{Deserialize, Serialize};

/// Indentation unit for multi-line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indent {
    Tabs,
    Spaces(u8),
}

/// Key/value separator inside maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Separator {
    Equals,
    Colon,
}

impl Separator {
    pub(crate) fn as_char(self) -> char {
        match self {
            Separator::Equals => '=',
            Separator::Colon => ':',
        }
    }
}

/// Rendering mode for double values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberMode {
    /// Decimal within the `[scientific_lower, scientific_upper)` exponent
    /// window, scientific outside it.
    Auto,
    Decimal,
    Scientific,
}

/// Layout configuration for the writer.
///
/// Every knob is independent. Two presets cover the common cases:
/// [`FormatStyle::compact`] for machine-oriented single-line output and
/// [`FormatStyle::nice`] (the default) for human-readable multi-line
/// output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatStyle {
    pub indent: Indent,
    pub separator: Separator,
    /// Quote character for string values and quoted keys.
    pub quote: char,
    /// Path delimiter used when writing references.
    pub reference_delimiter: char,

    pub spaces_before_separator: u8,
    pub spaces_after_separator: u8,
    pub spaces_before_comma: u8,
    pub spaces_after_comma: u8,
    pub spaces_within_braces: u8,
    pub spaces_within_brackets: u8,
    pub spaces_before_type_brace: u8,

    pub newlines_after_map_open: u8,
    pub newlines_before_map_close: u8,
    pub newlines_between_map_entries: u8,
    pub newlines_after_list_open: u8,
    pub newlines_before_list_close: u8,
    pub newlines_between_list_items: u8,

    pub write_comments: bool,
    pub write_trailing_commas: bool,
    pub sort_map_keys: bool,
    pub always_quote_keys: bool,

    /// Containers whose complexity score exceeds this lay out one child
    /// per line. Zero means every non-empty container is multi-line.
    pub complexity_threshold: u32,

    pub number_mode: NumberMode,
    pub significant_digits: u8,
    pub scientific_lower: i32,
    pub scientific_upper: i32,
    pub always_show_sign: bool,
    pub always_show_exponent_sign: bool,
}

impl FormatStyle {
    /// Single-line output with no optional whitespace at all.
    pub fn compact() -> Self {
        FormatStyle {
            indent: Indent::Spaces(0),
            separator: Separator::Equals,
            quote: '"',
            reference_delimiter: ':',
            spaces_before_separator: 0,
            spaces_after_separator: 0,
            spaces_before_comma: 0,
            spaces_after_comma: 0,
            spaces_within_braces: 0,
            spaces_within_brackets: 0,
            spaces_before_type_brace: 0,
            newlines_after_map_open: 0,
            newlines_before_map_close: 0,
            newlines_between_map_entries: 0,
            newlines_after_list_open: 0,
            newlines_before_list_close: 0,
            newlines_between_list_items: 0,
            write_comments: false,
            write_trailing_commas: false,
            sort_map_keys: false,
            always_quote_keys: false,
            complexity_threshold: u32::MAX,
            number_mode: NumberMode::Auto,
            significant_digits: 15,
            scientific_lower: -2,
            scientific_upper: 5,
            always_show_sign: false,
            always_show_exponent_sign: false,
        }
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_reference_delimiter(mut self, delimiter: char) -> Self {
        self.reference_delimiter = delimiter;
        self
    }

    pub fn with_comments(mut self, write_comments: bool) -> Self {
        self.write_comments = write_comments;
        self
    }

    pub fn with_trailing_commas(mut self, write_trailing_commas: bool) -> Self {
        self.write_trailing_commas = write_trailing_commas;
        self
    }

    pub fn with_sorted_keys(mut self, sort_map_keys: bool) -> Self {
        self.sort_map_keys = sort_map_keys;
        self
    }

    pub fn with_quoted_keys(mut self, always_quote_keys: bool) -> Self {
        self.always_quote_keys = always_quote_keys;
        self
    }

    pub fn with_complexity_threshold(mut self, threshold: u32) -> Self {
        self.complexity_threshold = threshold;
        self
    }

    pub fn with_number_mode(mut self, mode: NumberMode) -> Self {
        self.number_mode = mode;
        self
    }

    pub fn with_significant_digits(mut self, digits: u8) -> Self {
        self.significant_digits = digits;
        self
    }

    /// Decimal-exponent window outside of which auto mode goes scientific.
    pub fn with_scientific_window(mut self, lower: i32, upper: i32) -> Self {
        self.scientific_lower = lower;
        self.scientific_upper = upper;
        self
    }

    /// Human-readable output: one entry per line, spaced separators.
    pub fn nice() -> Self {
        FormatStyle {
            indent: Indent::Spaces(2),
            spaces_before_separator: 1,
            spaces_after_separator: 1,
            spaces_after_comma: 1,
            newlines_after_map_open: 1,
            newlines_before_map_close: 1,
            newlines_between_map_entries: 1,
            newlines_after_list_open: 1,
            newlines_before_list_close: 1,
            newlines_between_list_items: 1,
            write_comments: true,
            complexity_threshold: 0,
            ..FormatStyle::compact()
        }
    }
}

impl Default for FormatStyle {
    fn default() -> Self {
        FormatStyle::nice()
    }
}
