//! The canonical defect record and its field vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight source-mapped fields of a defect record (everything but `id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CanonicalField {
    Subject,
    Description,
    StepsToReproduce,
    ActualResult,
    ExpectedResult,
    FeatureTag,
    BugOrigin,
    TestCaseId,
}

impl CanonicalField {
    /// All fields, in record order.
    pub const ALL: [CanonicalField; 8] = [
        CanonicalField::Subject,
        CanonicalField::Description,
        CanonicalField::StepsToReproduce,
        CanonicalField::ActualResult,
        CanonicalField::ExpectedResult,
        CanonicalField::FeatureTag,
        CanonicalField::BugOrigin,
        CanonicalField::TestCaseId,
    ];

    /// Value used when the source carries nothing for this field.
    pub fn default_value(self) -> &'static str {
        match self {
            CanonicalField::Subject | CanonicalField::BugOrigin => "Unknown",
            CanonicalField::Description
            | CanonicalField::StepsToReproduce
            | CanonicalField::ActualResult
            | CanonicalField::ExpectedResult => "",
            CanonicalField::FeatureTag => "Untagged",
            CanonicalField::TestCaseId => "N/A",
        }
    }

    /// Serialized (camelCase) name.
    pub fn name(self) -> &'static str {
        match self {
            CanonicalField::Subject => "subject",
            CanonicalField::Description => "description",
            CanonicalField::StepsToReproduce => "stepsToReproduce",
            CanonicalField::ActualResult => "actualResult",
            CanonicalField::ExpectedResult => "expectedResult",
            CanonicalField::FeatureTag => "featureTag",
            CanonicalField::BugOrigin => "bugOrigin",
            CanonicalField::TestCaseId => "testCaseId",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One structured bug report.
///
/// Every field is always populated: absent source values are replaced by
/// [`CanonicalField::default_value`] at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectRecord {
    pub id: String,
    pub subject: String,
    pub description: String,
    pub steps_to_reproduce: String,
    pub actual_result: String,
    pub expected_result: String,
    pub feature_tag: String,
    pub bug_origin: String,
    pub test_case_id: String,
}

impl DefectRecord {
    /// A record with the given id and every other field at its default.
    pub fn with_defaults(id: impl Into<String>) -> Self {
        let d = CanonicalField::default_value;
        Self {
            id: id.into(),
            subject: d(CanonicalField::Subject).to_string(),
            description: d(CanonicalField::Description).to_string(),
            steps_to_reproduce: d(CanonicalField::StepsToReproduce).to_string(),
            actual_result: d(CanonicalField::ActualResult).to_string(),
            expected_result: d(CanonicalField::ExpectedResult).to_string(),
            feature_tag: d(CanonicalField::FeatureTag).to_string(),
            bug_origin: d(CanonicalField::BugOrigin).to_string(),
            test_case_id: d(CanonicalField::TestCaseId).to_string(),
        }
    }

    pub fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::Subject => &self.subject,
            CanonicalField::Description => &self.description,
            CanonicalField::StepsToReproduce => &self.steps_to_reproduce,
            CanonicalField::ActualResult => &self.actual_result,
            CanonicalField::ExpectedResult => &self.expected_result,
            CanonicalField::FeatureTag => &self.feature_tag,
            CanonicalField::BugOrigin => &self.bug_origin,
            CanonicalField::TestCaseId => &self.test_case_id,
        }
    }

    fn slot(&mut self, field: CanonicalField) -> &mut String {
        match field {
            CanonicalField::Subject => &mut self.subject,
            CanonicalField::Description => &mut self.description,
            CanonicalField::StepsToReproduce => &mut self.steps_to_reproduce,
            CanonicalField::ActualResult => &mut self.actual_result,
            CanonicalField::ExpectedResult => &mut self.expected_result,
            CanonicalField::FeatureTag => &mut self.feature_tag,
            CanonicalField::BugOrigin => &mut self.bug_origin,
            CanonicalField::TestCaseId => &mut self.test_case_id,
        }
    }

    /// Store a trimmed source value. Blank values leave the default in place.
    pub fn set(&mut self, field: CanonicalField, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            *self.slot(field) = value.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_field() {
        let record = DefectRecord::with_defaults("BUG-1");
        assert_eq!(record.id, "BUG-1");
        assert_eq!(record.subject, "Unknown");
        assert_eq!(record.description, "");
        assert_eq!(record.feature_tag, "Untagged");
        assert_eq!(record.bug_origin, "Unknown");
        assert_eq!(record.test_case_id, "N/A");
        for field in CanonicalField::ALL {
            assert_eq!(record.get(field), field.default_value());
        }
    }

    #[test]
    fn blank_set_keeps_default() {
        let mut record = DefectRecord::with_defaults("BUG-1");
        record.set(CanonicalField::FeatureTag, "   ");
        assert_eq!(record.feature_tag, "Untagged");
        record.set(CanonicalField::FeatureTag, "  Auth ");
        assert_eq!(record.feature_tag, "Auth");
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let record = DefectRecord::with_defaults("BUG-7");
        let json = serde_json::to_value(&record).unwrap();
        for field in CanonicalField::ALL {
            assert!(json.get(field.name()).is_some(), "missing {field}");
        }
        assert_eq!(json["id"], "BUG-7");
        assert_eq!(json["testCaseId"], "N/A");
    }
}
