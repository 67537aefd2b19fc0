//! Turn tokenized data rows into defect records.
//!
//! Rows are isolated from each other: a row that cannot become a record is
//! skipped with a diagnostic and the build carries on with the next row.

use crate::header::HeaderMapping;
use crate::record::{CanonicalField, DefectRecord};
use crate::IngestOptions;
use rand::distr::Alphanumeric;
use rand::Rng;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a single row produced no record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("row {row}: not enough data ({populated} populated cell(s))")]
    InsufficientData { row: usize, populated: usize },

    #[error("row {row}: subject is empty")]
    MissingSubject { row: usize },

    #[error("row {row}: no unique id derived from {base} after {attempts} attempts")]
    IdExhausted {
        row: usize,
        base: String,
        attempts: u32,
    },
}

/// Hands out batch-unique identifiers of the form `<prefix>-<n>`.
///
/// A colliding id gets a short random lowercase suffix (`BUG-1-k3x9`), retried
/// until it is unique or the attempt budget runs out.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    prefix: String,
    suffix_len: usize,
    max_attempts: u32,
    used: HashSet<String>,
}

impl IdAllocator {
    pub fn new(options: &IngestOptions) -> Self {
        Self {
            prefix: options.id_prefix.clone(),
            suffix_len: options.id_suffix_len,
            max_attempts: options.max_id_attempts,
            used: HashSet::new(),
        }
    }

    pub fn allocate(&mut self, position: usize) -> Result<String, RowError> {
        let base = format!("{}-{}", self.prefix, position);
        if self.used.insert(base.clone()) {
            return Ok(base);
        }

        for _ in 0..self.max_attempts {
            let candidate = format!("{}-{}", base, random_suffix(self.suffix_len));
            if self.used.insert(candidate.clone()) {
                debug!("id {} already taken, using {}", base, candidate);
                return Ok(candidate);
            }
        }

        Err(RowError::IdExhausted {
            row: position,
            base,
            attempts: self.max_attempts,
        })
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

fn random_suffix(len: usize) -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// Records plus row bookkeeping from one build.
#[derive(Debug, Clone, Default)]
pub struct BuildOutcome {
    pub records: Vec<DefectRecord>,
    /// Data rows offered to the builder.
    pub rows_seen: usize,
    /// Rows that produced no record.
    pub skipped: usize,
    /// Row diagnostics, capped at `max_diagnostics`.
    pub diagnostics: Vec<String>,
}

/// Incremental record builder for one batch.
#[derive(Debug)]
pub struct RecordBuilder<'a> {
    mapping: &'a HeaderMapping,
    ids: IdAllocator,
    max_diagnostics: usize,
    outcome: BuildOutcome,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(mapping: &'a HeaderMapping, options: &IngestOptions) -> Self {
        Self {
            mapping,
            ids: IdAllocator::new(options),
            max_diagnostics: options.max_diagnostics,
            outcome: BuildOutcome::default(),
        }
    }

    /// Offer one tokenized row at its 1-based data-row position.
    pub fn push_row<S: AsRef<str>>(&mut self, position: usize, fields: &[S]) {
        self.outcome.rows_seen += 1;

        match self.build_row(position, fields) {
            Ok(record) => self.outcome.records.push(record),
            Err(err) => {
                self.outcome.skipped += 1;
                match err {
                    RowError::InsufficientData { .. } | RowError::MissingSubject { .. } => {
                        debug!("skipping {}", err)
                    }
                    RowError::IdExhausted { .. } => warn!("skipping {}", err),
                }
                if self.outcome.diagnostics.len() < self.max_diagnostics {
                    self.outcome.diagnostics.push(err.to_string());
                }
            }
        }
    }

    pub fn finish(self) -> BuildOutcome {
        self.outcome
    }

    fn build_row<S: AsRef<str>>(
        &mut self,
        position: usize,
        fields: &[S],
    ) -> Result<DefectRecord, RowError> {
        let populated = fields
            .iter()
            .filter(|f| !f.as_ref().trim().is_empty())
            .count();
        if populated <= 1 {
            return Err(RowError::InsufficientData {
                row: position,
                populated,
            });
        }

        if let Some(col) = self.mapping.column(CanonicalField::Subject) {
            let subject = fields.get(col).map_or("", |f| f.as_ref().trim());
            if subject.is_empty() {
                return Err(RowError::MissingSubject { row: position });
            }
        }

        let mut record = DefectRecord::with_defaults(self.ids.allocate(position)?);
        for field in CanonicalField::ALL {
            let value = self
                .mapping
                .column(field)
                .and_then(|col| fields.get(col));
            if let Some(value) = value {
                record.set(field, value.as_ref());
            }
        }
        Ok(record)
    }
}

/// Build records from data rows numbered 1..=n.
pub fn build_records<S: AsRef<str>>(
    rows: &[Vec<S>],
    mapping: &HeaderMapping,
    options: &IngestOptions,
) -> BuildOutcome {
    let mut builder = RecordBuilder::new(mapping, options);
    for (i, fields) in rows.iter().enumerate() {
        builder.push_row(i + 1, fields);
    }
    builder.finish()
}
