//! Split file text into logical rows.
//!
//! A line break only ends a row when the quotes seen so far in that row are
//! balanced; otherwise it belongs to a quoted multi-line field and is kept as
//! `\n`. `\r\n` and `\n` are both row terminators.

use crate::tokenizer::Dialect;

/// Header row plus the raw data rows that follow it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRows {
    pub header: String,
    pub data: Vec<String>,
}

/// Split text into logical rows, dropping rows that are blank.
pub fn split_rows(text: &str, dialect: Dialect) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                end_line(&mut rows, &mut current, in_quotes);
            }
            '\n' => end_line(&mut rows, &mut current, in_quotes),
            _ => {
                // doubled quotes toggle twice, so parity tracks "inside a quoted span"
                if c == dialect.quote {
                    in_quotes = !in_quotes;
                }
                current.push(c);
            }
        }
    }
    push_row(&mut rows, current);

    rows
}

/// Split text and separate the header from the data rows.
///
/// Returns `None` when there is no header row at all; a header with no data
/// rows is returned with an empty `data` list so the caller can decide.
pub fn split_header(text: &str, dialect: Dialect) -> Option<SplitRows> {
    let mut rows = split_rows(text, dialect).into_iter();
    let header = rows.next()?;
    Some(SplitRows {
        header,
        data: rows.collect(),
    })
}

fn end_line(rows: &mut Vec<String>, current: &mut String, in_quotes: bool) {
    if in_quotes {
        current.push('\n');
    } else {
        push_row(rows, std::mem::take(current));
    }
}

fn push_row(rows: &mut Vec<String>, row: String) {
    if !row.trim().is_empty() {
        rows.push(row);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(text: &str) -> Vec<String> {
        split_rows(text, Dialect::default())
    }

    #[test]
    fn lf_and_crlf_both_break_rows() {
        assert_eq!(split("a,b\r\nc,d\ne,f"), vec!["a,b", "c,d", "e,f"]);
    }

    #[test]
    fn newline_inside_quotes_is_not_a_break() {
        let rows = split("h1,h2\n\"first\nsecond\",x\ny,z\n");
        assert_eq!(rows, vec!["h1,h2", "\"first\nsecond\",x", "y,z"]);
    }

    #[test]
    fn crlf_inside_quotes_normalizes_to_lf() {
        let rows = split("\"a\r\nb\",c\r\n");
        assert_eq!(rows, vec!["\"a\nb\",c"]);
    }

    #[test]
    fn escaped_quotes_keep_parity() {
        let rows = split("\"say \"\"hi\"\"\",x\nnext,row");
        assert_eq!(rows, vec!["\"say \"\"hi\"\"\",x", "next,row"]);
    }

    #[test]
    fn blank_rows_are_dropped() {
        assert_eq!(split("\n\na,b\n   \n\r\nc,d\n\n"), vec!["a,b", "c,d"]);
    }

    #[test]
    fn header_only_has_empty_data() {
        let split = split_header("title,desc\n\n", Dialect::default()).unwrap();
        assert_eq!(split.header, "title,desc");
        assert!(split.data.is_empty());
    }

    #[test]
    fn empty_text_has_no_header() {
        assert!(split_header("", Dialect::default()).is_none());
        assert!(split_header(" \r\n \n", Dialect::default()).is_none());
    }

    #[test]
    fn unterminated_quote_swallows_the_rest() {
        let rows = split("a,\"open\nb,c\nd,e");
        assert_eq!(rows, vec!["a,\"open\nb,c\nd,e"]);
    }
}
