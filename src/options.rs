//! Ingestion options.
//!
//! Every knob has a default matching the common upload case (comma-separated,
//! double-quoted, `BUG-<n>` identifiers), so `IngestOptions::default()` is what
//! most callers want. Options can also be loaded from a JSON file; missing keys
//! fall back to their defaults.

use crate::{DefectIngestError, IngestResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestOptions {
    /// Field separator for the CSV path.
    pub delimiter: char,
    /// Quote character for the CSV path. Doubled inside a quoted span means a literal quote.
    pub quote: char,
    /// Prefix of synthesized identifiers (`<prefix>-<n>`).
    pub id_prefix: String,
    /// Length of the random disambiguator appended on identifier collisions.
    pub id_suffix_len: usize,
    /// How many random suffixes to try before giving up on a row.
    pub max_id_attempts: u32,
    /// Consecutive blank lines that separate two label blocks.
    pub block_break_lines: usize,
    /// Cap on retained row diagnostics (counts are never capped).
    pub max_diagnostics: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            id_prefix: "BUG".to_string(),
            id_suffix_len: 4,
            max_id_attempts: 16,
            block_break_lines: 2,
            max_diagnostics: 100,
        }
    }
}

impl IngestOptions {
    /// Load options from a JSON file.
    pub fn from_json_file(path: &Path) -> IngestResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let options: Self =
            serde_json::from_str(&content).map_err(|e| DefectIngestError::Configuration {
                message: format!("{}: {}", path.display(), e),
            })?;
        options.validate()?;
        Ok(options)
    }

    /// Reject option combinations the tokenizer or builder cannot honour.
    pub fn validate(&self) -> IngestResult<()> {
        let reject = |message: String| Err(DefectIngestError::Configuration { message });

        if self.delimiter == self.quote {
            return reject(format!(
                "delimiter and quote must differ (both are {:?})",
                self.delimiter
            ));
        }
        for (name, c) in [("delimiter", self.delimiter), ("quote", self.quote)] {
            if c == '\n' || c == '\r' {
                return reject(format!("{name} cannot be a line break"));
            }
            // tab is the one whitespace delimiter in common use
            if c.is_whitespace() && c != '\t' {
                return reject(format!("{name} cannot be whitespace ({c:?})"));
            }
        }
        if self.quote == '\t' {
            return reject("quote cannot be a tab".to_string());
        }
        if self.id_prefix.trim().is_empty() {
            return reject("id_prefix cannot be empty".to_string());
        }
        if self.id_suffix_len == 0 {
            return reject("id_suffix_len must be at least 1".to_string());
        }
        if self.max_id_attempts == 0 {
            return reject("max_id_attempts must be at least 1".to_string());
        }
        if self.block_break_lines == 0 {
            return reject("block_break_lines must be at least 1".to_string());
        }
        Ok(())
    }
}
