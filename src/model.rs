use crate::encoding::Encoding;
use crate::utils::{column_name_to_number, column_number_to_name};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StyledRun {
    pub text: String,
    /// Empty when the source carried no font.
    pub font_name: String,
    pub bold: bool,
    pub italic: bool,
    /// ARGB hex, e.g. `FFFF0000`.
    pub color: Option<String>,
    pub size: Option<f64>,
}

impl StyledRun {
    pub fn new(text: impl Into<String>, font_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_name: font_name.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_color(mut self, argb: impl Into<String>) -> Self {
        self.color = Some(argb.into());
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    /// Builds the single run used for a plain (non rich text) cell.
    pub fn from_plain(text: impl Into<String>, font: Option<FontInfo>) -> Self {
        let font = font.unwrap_or_default();
        Self {
            text: text.into(),
            font_name: font.name,
            bold: font.bold,
            italic: font.italic,
            color: font.color,
            size: font.size,
        }
    }
}

/// Font attributes of a cell style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FontInfo {
    pub name: String,
    pub bold: bool,
    pub italic: bool,
    pub color: Option<String>,
    pub size: Option<f64>,
}

/// 1-based (column, row) coordinate of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellAddress {
    pub column: u32,
    pub row: u32,
}

impl CellAddress {
    pub fn new(column: u32, row: u32) -> Result<Self, AddressError> {
        if column == 0 || row == 0 {
            return Err(AddressError::OutOfRange { column, row });
        }
        if column > MAX_COLUMN {
            return Err(AddressError::OutOfRange { column, row });
        }
        Ok(Self { column, row })
    }
}

const MAX_COLUMN: u32 = 16_384;

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_number_to_name(self.column), self.row)
    }
}

impl FromStr for CellAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .ok_or_else(|| AddressError::Malformed(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AddressError::Malformed(s.to_string()));
        }
        let column = column_name_to_number(letters)
            .ok_or_else(|| AddressError::Malformed(s.to_string()))?;
        let row = digits
            .parse::<u32>()
            .map_err(|_| AddressError::Malformed(s.to_string()))?;
        CellAddress::new(column, row)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("cell coordinates ({column}, {row}) are outside the sheet")]
    OutOfRange { column: u32, row: u32 },
    #[error("malformed cell address '{0}'")]
    Malformed(String),
}

/// One non-blank cell queued for conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct CellJob {
    pub sheet_name: String,
    pub address: CellAddress,
    pub runs: Vec<StyledRun>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionResult {
    pub job: CellJob,
    pub new_runs: Vec<StyledRun>,
    /// Classification of each run, parallel to `new_runs`.
    pub encodings: Vec<Encoding>,
}

impl ConversionResult {
    /// True when at least one run went through a legacy decoder.
    pub fn is_decoded(&self) -> bool {
        self.encodings.iter().any(|e| *e != Encoding::Unknown)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub processed: u64,
    pub failed: u64,
}
