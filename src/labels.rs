//! Parser for the plain-text "Label: value" defect format.
//!
//! ```text
//! Subject: Login crash
//! Feature: Auth
//! -----
//! Title: Slow search
//! ```
//!
//! Blocks are separated by a run of blank lines or by a line made only of three
//! or more dashes. Every non-empty block becomes a record; missing labels take
//! their defaults.

use crate::builder::{BuildOutcome, IdAllocator};
use crate::record::{CanonicalField, DefectRecord};
use crate::IngestOptions;
use tracing::warn;

/// Field to label phrases, lowercase and colon-terminated.
pub const LABEL_PHRASES: [(CanonicalField, &[&str]); 8] = [
    (CanonicalField::Subject, &["subject:", "title:"]),
    (CanonicalField::Description, &["description:"]),
    (
        CanonicalField::StepsToReproduce,
        &["steps to reproduce:", "reproduction:"],
    ),
    (CanonicalField::ActualResult, &["actual result:", "actual:"]),
    (
        CanonicalField::ExpectedResult,
        &["expected result:", "expected:"],
    ),
    (CanonicalField::FeatureTag, &["feature:", "module:"]),
    (CanonicalField::BugOrigin, &["origin:", "environment:"]),
    (CanonicalField::TestCaseId, &["test case:", "test id:"]),
];

/// Split text into trimmed, non-empty blocks.
pub fn split_blocks(text: &str, break_lines: usize) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;

    for line in text.lines() {
        let trimmed = line.trim();
        if is_separator(trimmed) {
            flush_block(&mut blocks, &mut current);
            blank_run = 0;
        } else if trimmed.is_empty() {
            blank_run += 1;
            if blank_run >= break_lines {
                flush_block(&mut blocks, &mut current);
            } else {
                current.push(line);
            }
        } else {
            blank_run = 0;
            current.push(line);
        }
    }
    flush_block(&mut blocks, &mut current);

    blocks
}

fn is_separator(line: &str) -> bool {
    line.len() >= 3 && line.chars().all(|c| c == '-')
}

fn flush_block(blocks: &mut Vec<String>, current: &mut Vec<&str>) {
    let block = current.join("\n");
    current.clear();
    let block = block.trim();
    if !block.is_empty() {
        blocks.push(block.to_string());
    }
}

/// The field a line is labelled with, if any.
///
/// The phrase that starts earliest in the line wins, so a label phrase quoted
/// inside a value never steals the line. Equal offsets fall back to record order.
fn match_label(lowered: &str) -> Option<CanonicalField> {
    LABEL_PHRASES
        .iter()
        .filter_map(|(field, phrases)| {
            phrases
                .iter()
                .filter_map(|p| lowered.find(p))
                .min()
                .map(|at| (at, *field))
        })
        .min_by_key(|(at, _)| *at)
        .map(|(_, field)| field)
}

/// Parse one block into a record with the given id.
pub fn parse_block(block: &str, id: String) -> DefectRecord {
    let mut record = DefectRecord::with_defaults(id);
    let mut seen: Vec<CanonicalField> = Vec::with_capacity(CanonicalField::ALL.len());

    for line in block.lines() {
        let Some(field) = match_label(&line.to_lowercase()) else {
            continue;
        };
        if seen.contains(&field) {
            continue;
        }
        if let Some((_, value)) = line.split_once(':') {
            record.set(field, value);
            seen.push(field);
        }
    }

    record
}

/// Parse label-block text into records, ids numbered by block.
pub fn parse_label_blocks(text: &str, options: &IngestOptions) -> BuildOutcome {
    let blocks = split_blocks(text, options.block_break_lines);
    let mut ids = IdAllocator::new(options);
    let mut outcome = BuildOutcome {
        rows_seen: blocks.len(),
        ..Default::default()
    };

    for (i, block) in blocks.iter().enumerate() {
        match ids.allocate(i + 1) {
            Ok(id) => outcome.records.push(parse_block(block, id)),
            Err(err) => {
                warn!("skipping block: {}", err);
                outcome.skipped += 1;
                if outcome.diagnostics.len() < options.max_diagnostics {
                    outcome.diagnostics.push(err.to_string());
                }
            }
        }
    }

    outcome
}
