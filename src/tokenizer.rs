//! Quote-aware field tokenizer for one logical row.
//!
//! Malformed quoting never fails: an unterminated quoted span simply runs to the
//! end of the row and whatever was accumulated becomes the last field.

/// Delimiter and quote pair used by both the tokenizer and the row splitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: char,
    pub quote: char,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
        }
    }
}

impl From<&crate::IngestOptions> for Dialect {
    fn from(options: &crate::IngestOptions) -> Self {
        Self {
            delimiter: options.delimiter,
            quote: options.quote,
        }
    }
}

/// Split one logical row into trimmed field values.
///
/// An empty (or whitespace-only) row yields no fields at all.
pub fn tokenize_row(row: &str, dialect: Dialect) -> Vec<String> {
    if row.trim().is_empty() {
        return Vec::new();
    }

    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();

    while let Some(c) = chars.next() {
        if c == dialect.quote {
            if in_quotes && chars.peek() == Some(&dialect.quote) {
                current.push(dialect.quote);
                chars.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == dialect.delimiter && !in_quotes {
            fields.push(finish_field(&current, dialect.quote));
            current.clear();
        } else {
            current.push(c);
        }
    }
    // also covers a row that ended inside an open quote
    fields.push(finish_field(&current, dialect.quote));

    fields
}

fn finish_field(raw: &str, quote: char) -> String {
    let trimmed = raw.trim();
    let unwrapped = trimmed
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote));
    match unwrapped {
        Some(inner) => inner.to_string(),
        None => trimmed.to_string(),
    }
}
