#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::{TempDir, tempdir};
use umya_spreadsheet::structs::{Font, RichText, TextElement};
use umya_spreadsheet::{self, Spreadsheet, Worksheet};
use vnconv::{CellAddress, DocumentError, SpreadsheetDocument, StyledRun};
use vnconv::model::FontInfo;

pub fn build_workbook<F>(f: F) -> PathBuf
where
    F: FnOnce(&mut Spreadsheet),
{
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("fixture.xlsx");
    write_workbook_to_path(&path, f);
    std::mem::forget(tmp);
    path
}

pub fn write_workbook_to_path<F>(path: &Path, f: F)
where
    F: FnOnce(&mut Spreadsheet),
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create dir");
    }
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    umya_spreadsheet::writer::xlsx::write(&book, path).expect("write workbook");
}

pub fn read_workbook(path: &Path) -> Spreadsheet {
    umya_spreadsheet::reader::xlsx::read(path).expect("read workbook")
}

/// Plain string cell whose style font is `font`.
pub fn set_plain(sheet: &mut Worksheet, cell: &str, text: &str, font: &str) {
    sheet.get_cell_mut(cell).set_value_string(text);
    sheet.get_style_mut(cell).get_font_mut().set_name(font);
}

pub fn set_rich(sheet: &mut Worksheet, cell: &str, runs: &[StyledRun]) {
    let mut rt = RichText::default();
    for run in runs {
        let mut elem = TextElement::default();
        elem.set_text(run.text.clone());
        let mut font = Font::default();
        font.set_name(run.font_name.clone());
        font.set_bold(run.bold);
        font.set_italic(run.italic);
        if let Some(color) = &run.color {
            font.get_color_mut().set_argb(color.clone());
        }
        elem.set_run_properties(font);
        rt.add_rich_text_elements(elem);
    }
    sheet.get_cell_mut(cell).set_rich_text(rt);
}

pub struct TestWorkspace {
    _tempdir: TempDir,
    root: PathBuf,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let tempdir = tempdir().expect("tempdir");
        let root = tempdir.path().to_path_buf();
        Self {
            _tempdir: tempdir,
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn create_workbook<F>(&self, name: &str, f: F) -> PathBuf
    where
        F: FnOnce(&mut Spreadsheet),
    {
        let path = self.path(name);
        write_workbook_to_path(&path, f);
        path
    }

    /// Files in the workspace whose name contains `_output_`.
    pub fn outputs(&self) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = std::fs::read_dir(&self.root)
            .expect("read workspace")
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| {
                p.file_name()
                    .map(|n| n.to_string_lossy().contains("_output_"))
                    .unwrap_or(false)
            })
            .collect();
        found.sort();
        found
    }
}

// -----------------------------------------------------------------------------
// In-memory document
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct MemCell {
    pub text: String,
    pub runs: Option<Vec<StyledRun>>,
    pub font: Option<FontInfo>,
}

#[derive(Debug, Default)]
pub struct MemState {
    pub sheets: Vec<String>,
    pub cells: BTreeMap<(String, CellAddress), MemCell>,
    pub writes: Vec<(String, CellAddress, Vec<StyledRun>)>,
    pub saved_to: Vec<PathBuf>,
    pub fail_reads: HashSet<CellAddress>,
    pub fail_writes: HashSet<CellAddress>,
    pub fail_save: bool,
    pub read_delay: Option<Duration>,
}

/// A [`SpreadsheetDocument`] whose state stays inspectable after the
/// processor has consumed it.
#[derive(Clone, Default)]
pub struct MemoryDocument {
    pub state: Arc<Mutex<MemState>>,
}

impl MemoryDocument {
    pub fn with_sheets(names: &[&str]) -> Self {
        let doc = Self::default();
        doc.state.lock().unwrap().sheets = names.iter().map(|s| s.to_string()).collect();
        doc
    }

    pub fn put_plain(&self, sheet: &str, cell: &str, text: &str, font: &str) {
        let font = FontInfo {
            name: font.to_string(),
            ..FontInfo::default()
        };
        self.state.lock().unwrap().cells.insert(
            (sheet.to_string(), cell.parse().unwrap()),
            MemCell {
                text: text.to_string(),
                runs: None,
                font: Some(font),
            },
        );
    }

    pub fn put_rich(&self, sheet: &str, cell: &str, runs: Vec<StyledRun>) {
        let text = runs.iter().map(|r| r.text.as_str()).collect::<String>();
        self.state.lock().unwrap().cells.insert(
            (sheet.to_string(), cell.parse().unwrap()),
            MemCell {
                text,
                runs: Some(runs),
                font: None,
            },
        );
    }

    pub fn runs_at(&self, sheet: &str, cell: &str) -> Vec<StyledRun> {
        let address: CellAddress = cell.parse().unwrap();
        let state = self.state.lock().unwrap();
        let cell = state
            .cells
            .get(&(sheet.to_string(), address))
            .expect("cell exists");
        cell.runs
            .clone()
            .unwrap_or_else(|| vec![StyledRun::from_plain(cell.text.clone(), cell.font.clone())])
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes.len()
    }

    pub fn saved_to(&self) -> Vec<PathBuf> {
        self.state.lock().unwrap().saved_to.clone()
    }
}

impl SpreadsheetDocument for MemoryDocument {
    fn sheet_names(&self) -> Vec<String> {
        self.state.lock().unwrap().sheets.clone()
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>, DocumentError> {
        let state = self.state.lock().unwrap();
        if !state.sheets.iter().any(|s| s == sheet) {
            return Err(DocumentError::SheetNotFound(sheet.to_string()));
        }
        let mut rows: Vec<Vec<String>> = Vec::new();
        for ((name, address), cell) in &state.cells {
            if name != sheet {
                continue;
            }
            let (r, c) = (address.row as usize, address.column as usize);
            if rows.len() < r {
                rows.resize_with(r, Vec::new);
            }
            if rows[r - 1].len() < c {
                rows[r - 1].resize(c, String::new());
            }
            rows[r - 1][c - 1] = cell.text.clone();
        }
        Ok(rows)
    }

    fn styled_runs(
        &self,
        sheet: &str,
        address: CellAddress,
    ) -> Result<Option<Vec<StyledRun>>, DocumentError> {
        let delay = self.state.lock().unwrap().read_delay;
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        let state = self.state.lock().unwrap();
        if state.fail_reads.contains(&address) {
            return Err(DocumentError::Backend("unreadable".to_string()));
        }
        Ok(state
            .cells
            .get(&(sheet.to_string(), address))
            .and_then(|c| c.runs.clone()))
    }

    fn style_font(
        &self,
        sheet: &str,
        address: CellAddress,
    ) -> Result<Option<FontInfo>, DocumentError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .cells
            .get(&(sheet.to_string(), address))
            .and_then(|c| c.font.clone()))
    }

    fn set_styled_runs(
        &mut self,
        sheet: &str,
        address: CellAddress,
        runs: &[StyledRun],
    ) -> Result<(), DocumentError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_writes.contains(&address) {
            return Err(DocumentError::Backend("read-only cell".to_string()));
        }
        state
            .writes
            .push((sheet.to_string(), address, runs.to_vec()));
        let cell = state
            .cells
            .entry((sheet.to_string(), address))
            .or_default();
        cell.text = runs.iter().map(|r| r.text.as_str()).collect();
        cell.runs = Some(runs.to_vec());
        Ok(())
    }

    fn save_as(&self, path: &Path) -> Result<(), DocumentError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_save {
            return Err(DocumentError::Backend("disk full".to_string()));
        }
        state.saved_to.push(path.to_path_buf());
        Ok(())
    }
}
