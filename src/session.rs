//! Holds the defect set of the current analysis session.

use crate::{ingest_path, DefectRecord, IngestOptions, IngestResult, IngestSummary, Ingested};
use std::path::Path;
use tracing::{debug, warn};

/// Current record set, replaced wholesale by each successful ingestion.
///
/// A failed ingestion leaves the previous set in place.
#[derive(Debug, Default)]
pub struct DefectSession {
    records: Vec<DefectRecord>,
    summary: Option<IngestSummary>,
    source: Option<String>,
}

impl DefectSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt a parse result. On error the session is untouched and the error is returned.
    pub fn apply(
        &mut self,
        source: &str,
        result: IngestResult<Ingested>,
    ) -> IngestResult<&[DefectRecord]> {
        match result {
            Ok(ingested) => {
                debug!(
                    "replacing {} record(s) with {} from {}",
                    self.records.len(),
                    ingested.records.len(),
                    source
                );
                self.records = ingested.records;
                self.summary = Some(ingested.summary);
                self.source = Some(source.to_string());
                Ok(&self.records)
            }
            Err(err) => {
                warn!("keeping previous defect set, {} failed: {}", source, err);
                Err(err)
            }
        }
    }

    /// Ingest a local file into the session.
    pub async fn ingest_path(
        &mut self,
        path: &Path,
        options: &IngestOptions,
    ) -> IngestResult<&[DefectRecord]> {
        let result = ingest_path(path, options).await;
        self.apply(&path.display().to_string(), result)
    }

    pub fn records(&self) -> &[DefectRecord] {
        &self.records
    }

    /// The first `n` records in source order.
    pub fn first(&self, n: usize) -> &[DefectRecord] {
        &self.records[..n.min(self.records.len())]
    }

    pub fn summary(&self) -> Option<&IngestSummary> {
        self.summary.as_ref()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a new summary describes the same content as the current set.
    pub fn is_unchanged_by(&self, summary: &IngestSummary) -> bool {
        self.summary.as_ref().is_some_and(|current| {
            current.checksum == summary.checksum && current.records == summary.records
        })
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.summary = None;
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_text, DefectIngestError, SourceFormat};

    fn parse(text: &str) -> IngestResult<Ingested> {
        parse_text(text, SourceFormat::Csv, &IngestOptions::default())
    }

    #[test]
    fn failed_parse_keeps_previous_set() {
        let mut session = DefectSession::new();
        session
            .apply("first.csv", parse("Title,Area\nCrash,Auth\nHang,UI\n"))
            .unwrap();
        assert_eq!(session.records().len(), 2);

        let err = session
            .apply("second.csv", parse("Area,Notes\nUI,x\n"))
            .unwrap_err();
        assert!(matches!(err, DefectIngestError::MissingSubjectColumn { .. }));
        assert_eq!(session.records().len(), 2);
        assert_eq!(session.source(), Some("first.csv"));
    }

    #[test]
    fn successful_parse_replaces_set() {
        let mut session = DefectSession::new();
        session.apply("a.csv", parse("Title,Area\nCrash,Auth\n")).unwrap();
        session
            .apply("b.csv", parse("Title,Area\nHang,UI\nLeak,Core\n"))
            .unwrap();
        assert_eq!(session.records()[0].subject, "Hang");
        assert_eq!(session.summary().unwrap().records, 2);
    }

    #[test]
    fn first_truncates_in_source_order() {
        let mut session = DefectSession::new();
        session
            .apply("a.csv", parse("Title,Area\nA,x\nB,y\nC,z\n"))
            .unwrap();
        let shown: Vec<&str> = session.first(2).iter().map(|r| r.subject.as_str()).collect();
        assert_eq!(shown, vec!["A", "B"]);
        assert_eq!(session.first(10).len(), 3);
    }

    #[test]
    fn detects_identical_reupload() {
        let text = "Title,Area\nCrash,Auth\n";
        let mut session = DefectSession::new();
        session.apply("a.csv", parse(text)).unwrap();

        let again = parse(text).unwrap();
        assert!(session.is_unchanged_by(&again.summary));

        let other = parse("Title,Area\nCrash,Billing\n").unwrap();
        assert!(!session.is_unchanged_by(&other.summary));

        session.clear();
        assert!(session.is_empty());
        assert!(!session.is_unchanged_by(&again.summary));
    }
}
