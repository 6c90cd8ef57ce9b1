//! Run summary returned by the processor and printed by the CLI.

use crate::encoding::Encoding;
use crate::error::{CellError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A cell the pipeline skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFailure {
    pub sheet: String,
    /// A1 address, or the raw coordinates when no address could be formed.
    pub cell: String,
    pub code: ErrorCode,
    pub error: String,
}

impl CellFailure {
    pub fn new(sheet: &str, cell: impl Into<String>, error: &CellError) -> Self {
        Self {
            sheet: sheet.to_string(),
            cell: cell.into(),
            code: error.code(),
            error: error.to_string(),
        }
    }
}

/// Runs seen per detected encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingCounts {
    pub vni: u64,
    pub tcvn3: u64,
    pub unknown: u64,
}

impl EncodingCounts {
    pub fn record(&mut self, encoding: Encoding) {
        match encoding {
            Encoding::Vni => self.vni += 1,
            Encoding::Tcvn3 => self.tcvn3 += 1,
            Encoding::Unknown => self.unknown += 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionReport {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub sheets: Vec<String>,
    /// Non-blank cells found by the scan.
    pub scanned: u64,
    /// Results received by the collector, written or not.
    pub processed: u64,
    /// Cells whose runs were decoded and written back.
    pub converted: u64,
    pub failures: Vec<CellFailure>,
    pub encodings: EncodingCounts,
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

impl ConversionReport {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }

    pub fn add_failure(&mut self, failure: CellFailure) {
        self.failures.push(failure);
    }

    pub fn unchanged(&self) -> u64 {
        self.processed.saturating_sub(self.converted)
    }

    /// Cells the scan found that never produced a result.
    pub fn skipped(&self) -> u64 {
        self.scanned
            .saturating_sub(self.processed)
            .saturating_sub(self.failures.len() as u64)
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }

    pub fn is_partial_success(&self) -> bool {
        self.converted > 0 && (!self.failures.is_empty() || self.cancelled)
    }
}
