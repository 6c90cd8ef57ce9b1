//! Error types for the conversion engine.
//!
//! Run-level failures are [`ConvertError`] and abort the whole run. Cell-level
//! failures are [`CellError`]; the pipeline records them in the run report
//! and carries on with the next cell.

use crate::document::DocumentError;
use crate::model::{AddressError, CellAddress};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Stable identifiers for failures, surfaced in JSON output. Run-level codes
/// are also the exit status of the `vnconv` binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    /// Input file missing, unreadable or not a workbook
    OpenFailed = 10,
    /// Requested sheet does not exist
    SheetNotFound = 11,
    /// Configuration rejected during validation
    InvalidConfig = 12,
    /// Output workbook could not be written
    SaveFailed = 20,
    /// A pipeline task died
    PipelineFailure = 30,
    /// Cell coordinate could not be formed
    InvalidAddress = 40,
    /// Cell content could not be read
    CellReadFailed = 41,
    /// Converted runs could not be written back
    CellWriteFailed = 42,
}

impl ErrorCode {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn category(&self) -> &'static str {
        match self {
            ErrorCode::OpenFailed | ErrorCode::SheetNotFound | ErrorCode::InvalidConfig => {
                "precondition"
            }
            ErrorCode::SaveFailed => "persistence",
            ErrorCode::PipelineFailure => "internal",
            ErrorCode::InvalidAddress | ErrorCode::CellReadFailed | ErrorCode::CellWriteFailed => {
                "cell"
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, self.code())
    }
}

// =============================================================================
// RUN ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("failed to open workbook {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
    #[error("sheet '{sheet}' not found in workbook")]
    SheetNotFound { sheet: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to save workbook to {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
    #[error("conversion pipeline failed: {0}")]
    Pipeline(String),
}

impl ConvertError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ConvertError::Open { .. } => ErrorCode::OpenFailed,
            ConvertError::SheetNotFound { .. } => ErrorCode::SheetNotFound,
            ConvertError::InvalidConfig(_) => ErrorCode::InvalidConfig,
            ConvertError::Save { .. } => ErrorCode::SaveFailed,
            ConvertError::Pipeline(_) => ErrorCode::PipelineFailure,
        }
    }

    pub fn category(&self) -> &'static str {
        self.code().category()
    }

    /// Process exit status for this failure.
    pub fn exit_status(&self) -> u8 {
        u8::try_from(self.code().code()).unwrap_or(1)
    }
}

impl From<tokio::task::JoinError> for ConvertError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            ConvertError::Pipeline(format!("task panicked: {err}"))
        } else {
            ConvertError::Pipeline(format!("task aborted: {err}"))
        }
    }
}

// =============================================================================
// CELL ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CellError {
    #[error("invalid cell address: {0}")]
    Address(#[from] AddressError),
    #[error("failed to read {sheet}!{address}: {source}")]
    Read {
        sheet: String,
        address: CellAddress,
        #[source]
        source: DocumentError,
    },
    #[error("failed to write {sheet}!{address}: {source}")]
    Write {
        sheet: String,
        address: CellAddress,
        #[source]
        source: DocumentError,
    },
}

impl CellError {
    pub fn code(&self) -> ErrorCode {
        match self {
            CellError::Address(_) => ErrorCode::InvalidAddress,
            CellError::Read { .. } => ErrorCode::CellReadFailed,
            CellError::Write { .. } => ErrorCode::CellWriteFailed,
        }
    }
}
