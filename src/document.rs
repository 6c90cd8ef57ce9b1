//! Spreadsheet access used by the conversion pipeline.
//!
//! The pipeline only talks to [`SpreadsheetDocument`]; [`XlsxDocument`] is
//! the implementation backed by `umya-spreadsheet`. A document is not safe
//! for concurrent use, so the trait takes `&mut self` for writes and the
//! pipeline keeps it behind a single lock.

use crate::model::{CellAddress, FontInfo, StyledRun};
use std::path::{Path, PathBuf};
use umya_spreadsheet::structs::{CellRawValue, Font, RichText, TextElement};
use tracing::debug;
use umya_spreadsheet::{Spreadsheet, Worksheet};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("sheet '{0}' not found")]
    SheetNotFound(String),
    #[error("spreadsheet backend error: {0}")]
    Backend(String),
}

pub trait SpreadsheetDocument: Send + 'static {
    fn sheet_names(&self) -> Vec<String>;

    /// Displayed text of every cell, row-major. Row `i` is spreadsheet row
    /// `i + 1`; each row is trimmed after its last non-empty cell.
    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, DocumentError>;

    /// Rich-text runs of a cell, or `None` when the cell holds plain text.
    fn styled_runs(
        &self,
        sheet: &str,
        address: CellAddress,
    ) -> Result<Option<Vec<StyledRun>>, DocumentError>;

    /// Font of the cell's style, if it has one.
    fn style_font(&self, sheet: &str, address: CellAddress)
    -> Result<Option<FontInfo>, DocumentError>;

    fn set_styled_runs(
        &mut self,
        sheet: &str,
        address: CellAddress,
        runs: &[StyledRun],
    ) -> Result<(), DocumentError>;

    fn save_as(&self, path: &Path) -> Result<(), DocumentError>;
}

/// An `.xlsx`/`.xlsm` workbook loaded fully into memory.
pub struct XlsxDocument {
    path: PathBuf,
    book: Spreadsheet,
}

impl XlsxDocument {
    pub fn open(path: &Path) -> Result<Self, DocumentError> {
        let book = umya_spreadsheet::reader::xlsx::read(path)
            .map_err(|e| DocumentError::Backend(e.to_string()))?;
        Ok(Self {
            path: path.to_path_buf(),
            book,
        })
    }

    pub fn from_spreadsheet(path: impl Into<PathBuf>, book: Spreadsheet) -> Self {
        Self {
            path: path.into(),
            book,
        }
    }

    fn sheet(&self, name: &str) -> Result<&Worksheet, DocumentError> {
        self.book
            .get_sheet_by_name(name)
            .ok_or_else(|| DocumentError::SheetNotFound(name.to_string()))
    }

    fn sheet_mut(&mut self, name: &str) -> Result<&mut Worksheet, DocumentError> {
        self.book
            .get_sheet_by_name_mut(name)
            .ok_or_else(|| DocumentError::SheetNotFound(name.to_string()))
    }
}

impl SpreadsheetDocument for XlsxDocument {
    fn sheet_names(&self) -> Vec<String> {
        self.book
            .get_sheet_collection()
            .iter()
            .map(|sheet| sheet.get_name().to_string())
            .collect()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, DocumentError> {
        let sheet = self.sheet(sheet)?;
        let mut rows: Vec<Vec<String>> = Vec::new();
        for cell in sheet.get_cell_collection() {
            // formulas keep their cached value; rewriting them would drop the formula
            if cell.is_formula() {
                continue;
            }
            let value = cell.get_value();
            if value.is_empty() {
                continue;
            }
            let row = *cell.get_coordinate().get_row_num() as usize;
            let col = *cell.get_coordinate().get_col_num() as usize;
            if row == 0 || col == 0 {
                continue;
            }
            if rows.len() < row {
                rows.resize_with(row, Vec::new);
            }
            let cells = &mut rows[row - 1];
            if cells.len() < col {
                cells.resize(col, String::new());
            }
            cells[col - 1] = value.into_owned();
        }
        Ok(rows)
    }

    fn styled_runs(
        &self,
        sheet: &str,
        address: CellAddress,
    ) -> Result<Option<Vec<StyledRun>>, DocumentError> {
        let sheet = self.sheet(sheet)?;
        let Some(cell) = sheet.get_cell(address.to_string().as_str()) else {
            return Ok(None);
        };
        let CellRawValue::RichText(rich_text) = cell.get_cell_value().get_raw_value() else {
            return Ok(None);
        };
        let runs = rich_text
            .get_rich_text_elements()
            .iter()
            .map(|element| {
                let font = element.get_run_properties().map(font_info);
                StyledRun::from_plain(element.get_text(), font)
            })
            .collect();
        Ok(Some(runs))
    }

    fn style_font(
        &self,
        sheet: &str,
        address: CellAddress,
    ) -> Result<Option<FontInfo>, DocumentError> {
        let sheet = self.sheet(sheet)?;
        Ok(sheet
            .get_cell(address.to_string().as_str())
            .and_then(|cell| cell.get_style().get_font())
            .map(font_info))
    }

    fn set_styled_runs(
        &mut self,
        sheet: &str,
        address: CellAddress,
        runs: &[StyledRun],
    ) -> Result<(), DocumentError> {
        let coordinate = address.to_string();
        let sheet = self.sheet_mut(sheet)?;
        let (is_rich, current) = match sheet.get_cell(coordinate.as_str()) {
            Some(cell) => {
                let raw = cell.get_cell_value().get_raw_value();
                let current = match raw {
                    CellRawValue::String(text) | CellRawValue::Lazy(text) => {
                        CurrentValue::Text(text.to_string())
                    }
                    CellRawValue::Empty => CurrentValue::Text(String::new()),
                    _ => CurrentValue::Typed,
                };
                (matches!(raw, CellRawValue::RichText(_)), current)
            }
            None => (false, CurrentValue::Text(String::new())),
        };

        match runs {
            [single] if !is_rich => {
                // numbers, dates and booleans keep their typed value; only the font moves
                if matches!(&current, CurrentValue::Text(text) if *text != single.text) {
                    sheet
                        .get_cell_mut(coordinate.as_str())
                        .set_value_string(single.text.clone());
                }
                let font = sheet.get_style_mut(coordinate.as_str()).get_font_mut();
                apply_run_font(font, single);
            }
            _ => {
                let mut rich_text = RichText::default();
                for run in runs {
                    let mut element = TextElement::default();
                    element.set_text(run.text.clone());
                    let mut font = Font::default();
                    apply_run_font(&mut font, run);
                    element.set_run_properties(font);
                    rich_text.add_rich_text_elements(element);
                }
                sheet
                    .get_cell_mut(coordinate.as_str())
                    .set_rich_text(rich_text);
            }
        }
        Ok(())
    }

    fn save_as(&self, path: &Path) -> Result<(), DocumentError> {
        debug!(source = %self.path.display(), target = %path.display(), "writing workbook");
        umya_spreadsheet::writer::xlsx::write(&self.book, path)
            .map_err(|e| DocumentError::Backend(e.to_string()))
    }
}

enum CurrentValue {
    Text(String),
    Typed,
}

fn font_info(font: &Font) -> FontInfo {
    let argb = font.get_color().get_argb();
    let size = *font.get_size();
    FontInfo {
        name: font.get_name().to_string(),
        bold: *font.get_bold(),
        italic: *font.get_italic(),
        color: (!argb.is_empty()).then(|| argb.to_string()),
        size: (size > 0.0).then_some(size),
    }
}

fn apply_run_font(font: &mut Font, run: &StyledRun) {
    font.set_name(run.font_name.clone());
    font.set_bold(run.bold);
    font.set_italic(run.italic);
    if let Some(size) = run.size {
        font.set_size(size);
    }
    if let Some(argb) = &run.color {
        font.get_color_mut().set_argb(argb.clone());
    }
}
