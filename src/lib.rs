//! Tolerant ingestion of defect logs into typed defect records.
//!
//! - CSV path: quote-aware rows and fields, fuzzy header mapping, per-row isolation.
//! - Label-block path: free text of `Label: value` lines split into blocks.
//! - Sources may be gzip/zstd compressed and in any charset `encoding_rs` knows.
//!
//! Data shape:
//! - `Ingested { records, summary }`
//! - `DefectRecord` has all nine fields populated; absent values take fixed defaults.
#![cfg_attr(docsrs, feature(doc_cfg))]
//
pub mod builder;
mod codec;
pub mod header;
mod io;
pub mod labels;
mod options;
pub mod record;
pub mod rows;
mod session;
pub mod tokenizer;

pub use crate::builder::{build_records, BuildOutcome, RecordBuilder, RowError};
pub use crate::header::HeaderMapping;
pub use crate::io::{
    build_source_reader, read_source_text, reader_from_path, SourceFormat, SourceMeta,
};
pub use crate::options::IngestOptions;
pub use crate::record::{CanonicalField, DefectRecord};
pub use crate::session::DefectSession;
pub use crate::tokenizer::{tokenize_row, Dialect};

use crc32fast::Hasher as Crc32;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tokio::io::AsyncRead;
use tracing::{debug, info};

/// Outcome counts for one ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub format: SourceFormat,
    /// Header cells as read (CSV path only).
    pub headers: Vec<String>,
    /// Data rows (CSV) or blocks (label path) offered to the builder.
    pub data_rows: usize,
    pub records: usize,
    pub skipped: usize,
    pub diagnostics: Vec<String>,
    /// CRC32 over every record's source-mapped fields, ids excluded.
    pub checksum: u32,
}

/// A successful ingestion.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub records: Vec<DefectRecord>,
    pub summary: IngestSummary,
}

/// Error type returned by this crate when not using `anyhow`.
#[derive(Debug, Error)]
pub enum DefectIngestError {
    #[error("File is empty or has no data rows")]
    EmptyFile,
    #[error(
        "CSV must include at least a subject/title column (found headers: {})",
        .headers.join(", ")
    )]
    MissingSubjectColumn { headers: Vec<String> },
    #[error("No defect records could be extracted ({rows} row(s) read, {skipped} skipped)")]
    NoRecords { rows: usize, skipped: usize },
    #[error("Configuration error: {message}")]
    Configuration { message: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type IngestResult<T> = std::result::Result<T, DefectIngestError>;

/// Parse CSV text into defect records.
pub fn parse_csv_text(text: &str, options: &IngestOptions) -> IngestResult<Ingested> {
    options.validate()?;
    let dialect = Dialect::from(options);

    debug!("splitting {} bytes of CSV", text.len());
    let split = rows::split_header(text, dialect).ok_or(DefectIngestError::EmptyFile)?;
    if split.data.is_empty() {
        return Err(DefectIngestError::EmptyFile);
    }

    let headers = tokenize_row(&split.header, dialect);
    let mapping = HeaderMapping::from_headers(&headers);
    debug!("header mapping: {}", mapping);
    if !mapping.has_subject() {
        return Err(DefectIngestError::MissingSubjectColumn { headers });
    }

    let mut builder = RecordBuilder::new(&mapping, options);
    for (i, row) in split.data.iter().enumerate() {
        builder.push_row(i + 1, &tokenize_row(row, dialect));
    }

    finish(SourceFormat::Csv, headers, builder.finish())
}

/// Parse label-block text into defect records.
pub fn parse_label_text(text: &str, options: &IngestOptions) -> IngestResult<Ingested> {
    options.validate()?;
    if text.trim().is_empty() {
        return Err(DefectIngestError::EmptyFile);
    }

    let outcome = labels::parse_label_blocks(text, options);
    if outcome.rows_seen == 0 {
        return Err(DefectIngestError::EmptyFile);
    }

    finish(SourceFormat::LabelBlocks, Vec::new(), outcome)
}

/// Parse already-read text along the given path.
pub fn parse_text(
    text: &str,
    format: SourceFormat,
    options: &IngestOptions,
) -> IngestResult<Ingested> {
    match format {
        SourceFormat::Csv => parse_csv_text(text, options),
        SourceFormat::LabelBlocks => parse_label_text(text, options),
    }
}

/// Read a source to completion, then parse it.
pub async fn ingest_reader<R>(
    reader: R,
    meta: SourceMeta,
    options: &IngestOptions,
) -> IngestResult<Ingested>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    options.validate()?;
    let text = read_source_text(reader, &meta).await?;
    let format = meta.format();
    debug!("read {} ({} bytes) as {:?}", meta.name_hint, text.len(), format);
    parse_text(&text, format, options)
}

/// Ingest a local file, routed by its name.
pub async fn ingest_path(path: &Path, options: &IngestOptions) -> IngestResult<Ingested> {
    let (file, meta) = reader_from_path(path).await?;
    ingest_reader(file, meta, options).await
}

/// CRC32 over the source-mapped fields of every record, in order.
pub fn records_checksum(records: &[DefectRecord]) -> u32 {
    let mut crc = Crc32::new();
    for record in records {
        for (i, field) in CanonicalField::ALL.iter().enumerate() {
            if i > 0 {
                crc.update(&[0x1f]);
            }
            crc.update(record.get(*field).as_bytes());
        }
        crc.update(&[0x1e]);
    }
    crc.finalize()
}

fn finish(
    format: SourceFormat,
    headers: Vec<String>,
    outcome: BuildOutcome,
) -> IngestResult<Ingested> {
    if outcome.records.is_empty() {
        return Err(DefectIngestError::NoRecords {
            rows: outcome.rows_seen,
            skipped: outcome.skipped,
        });
    }

    let summary = IngestSummary {
        format,
        headers,
        data_rows: outcome.rows_seen,
        records: outcome.records.len(),
        skipped: outcome.skipped,
        diagnostics: outcome.diagnostics,
        checksum: records_checksum(&outcome.records),
    };
    info!(
        "ingested {} record(s) from {} row(s), {} skipped",
        summary.records, summary.data_rows, summary.skipped
    );

    Ok(Ingested {
        records: outcome.records,
        summary,
    })
}
