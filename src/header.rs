//! Fuzzy header-to-field mapping.
//!
//! A header column matches a field when its lowercased text contains any of the
//! field's synonyms. Each field independently takes the first matching column,
//! so one column may serve several fields.

use crate::record::CanonicalField;
use std::fmt;

/// Field to ordered synonym list. Synonyms are lowercase substrings.
pub const HEADER_SYNONYMS: [(CanonicalField, &[&str]); 8] = [
    (
        CanonicalField::Subject,
        &["subject", "title", "summary", "issue", "bug"],
    ),
    (
        CanonicalField::Description,
        &["description", "desc", "detail", "summary"],
    ),
    (
        CanonicalField::StepsToReproduce,
        &["steps", "reproduce", "reproduction", "how to"],
    ),
    (
        CanonicalField::ActualResult,
        &["actual", "result", "observed", "outcome"],
    ),
    (
        CanonicalField::ExpectedResult,
        &["expected", "should", "desired"],
    ),
    (
        CanonicalField::FeatureTag,
        &["feature", "module", "component", "area", "func"],
    ),
    (
        CanonicalField::BugOrigin,
        &["origin", "environment", "env", "found in", "source"],
    ),
    (
        CanonicalField::TestCaseId,
        &["test", "case", "tc", "testcase"],
    ),
];

/// Synonyms for one field.
pub fn synonyms(field: CanonicalField) -> &'static [&'static str] {
    HEADER_SYNONYMS
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, s)| *s)
        .unwrap_or(&[])
}

/// Column index per canonical field, built once per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMapping {
    columns: [Option<usize>; 8],
}

impl HeaderMapping {
    /// Map header cells to canonical fields.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let lowered: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();

        let mut mapping = Self::default();
        for (field, candidates) in HEADER_SYNONYMS {
            mapping.columns[field as usize] = lowered
                .iter()
                .position(|header| candidates.iter().any(|c| header.contains(c)));
        }
        mapping
    }

    /// Build a mapping from explicit column assignments.
    pub fn with_columns(assignments: &[(CanonicalField, usize)]) -> Self {
        let mut mapping = Self::default();
        for &(field, column) in assignments {
            mapping.columns[field as usize] = Some(column);
        }
        mapping
    }

    pub fn column(&self, field: CanonicalField) -> Option<usize> {
        self.columns[field as usize]
    }

    /// Column index, or -1 when the field was not found.
    pub fn signed_column(&self, field: CanonicalField) -> i64 {
        self.column(field).map_or(-1, |c| c as i64)
    }

    pub fn has_subject(&self) -> bool {
        self.column(CanonicalField::Subject).is_some()
    }

    /// Number of canonical fields that found a column.
    pub fn mapped_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }
}

impl fmt::Display for HeaderMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = CanonicalField::ALL
            .iter()
            .map(|&field| format!("{}={}", field, self.signed_column(field)))
            .collect();
        f.write_str(&parts.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CanonicalField::*;

    #[test]
    fn maps_synonym_headers() {
        let headers = [
            "Bug Title",
            "Detail",
            "How To Repro",
            "Observed",
            "Expected",
            "Area",
            "Found In",
            "Related TC",
        ];
        let mapping = HeaderMapping::from_headers(&headers);
        assert_eq!(mapping.column(Subject), Some(0));
        assert_eq!(mapping.column(Description), Some(1));
        assert_eq!(mapping.column(StepsToReproduce), Some(2));
        assert_eq!(mapping.column(ActualResult), Some(3));
        assert_eq!(mapping.column(ExpectedResult), Some(4));
        assert_eq!(mapping.column(FeatureTag), Some(5));
        assert_eq!(mapping.column(BugOrigin), Some(6));
        assert_eq!(mapping.column(TestCaseId), Some(7));
        assert_eq!(mapping.mapped_count(), 8);
    }

    #[test]
    fn matching_is_case_insensitive_and_first_match_wins() {
        let mapping = HeaderMapping::from_headers(&["notes", "TITLE", "Subject Line"]);
        assert_eq!(mapping.column(Subject), Some(1));
    }

    #[test]
    fn missing_fields_are_not_found() {
        let mapping = HeaderMapping::from_headers(&["Title", "Priority"]);
        assert!(mapping.has_subject());
        assert_eq!(mapping.column(FeatureTag), None);
        assert_eq!(mapping.signed_column(FeatureTag), -1);
        assert_eq!(mapping.mapped_count(), 1);
    }

    #[test]
    fn no_subject_synonym_means_no_subject() {
        let mapping = HeaderMapping::from_headers(&["Description", "Steps", "Expected"]);
        assert!(!mapping.has_subject());
        assert_eq!(mapping.column(Description), Some(0));
    }

    #[test]
    fn one_column_can_serve_two_fields() {
        // "summary" is a synonym of both subject and description
        let mapping = HeaderMapping::from_headers(&["Summary", "Priority"]);
        assert_eq!(mapping.column(Subject), Some(0));
        assert_eq!(mapping.column(Description), Some(0));
    }

    #[test]
    fn every_field_has_synonyms() {
        for field in CanonicalField::ALL {
            assert!(!synonyms(field).is_empty(), "{field}");
        }
    }

    #[test]
    fn display_lists_signed_columns() {
        let mapping = HeaderMapping::from_headers(&["Title"]);
        let shown = mapping.to_string();
        assert!(shown.starts_with("subject=0 description=-1"));
    }
}
