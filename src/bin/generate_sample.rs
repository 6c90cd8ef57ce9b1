//! Write a small workbook with VNI, TCVN3 and mixed rich-text cells.
//!
//! Usage:
//!   cargo run --bin generate_sample                 # samples/sample_data.xlsx
//!   cargo run --bin generate_sample -- out.xlsx

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use vnconv::encoding::{tcvn3, vni};
use vnconv::{CellAddress, SpreadsheetDocument, StyledRun, XlsxDocument};

const DEFAULT_OUTPUT: &str = "samples/sample_data.xlsx";
const SHEET: &str = "Sheet1";

const WORDS: &[&str] = &[
    "Cộng hòa Xã hội Chủ nghĩa Việt Nam",
    "Độc lập - Tự do - Hạnh phúc",
    "Người đại diện theo pháp luật",
    "Hóa đơn giá trị gia tăng",
];

fn main() -> Result<()> {
    let output = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let mut doc = XlsxDocument::from_spreadsheet(&output, umya_spreadsheet::new_file());
    let mut put = |cell: &str, runs: &[StyledRun]| -> Result<()> {
        let address: CellAddress = cell.parse()?;
        doc.set_styled_runs(SHEET, address, runs)
            .with_context(|| format!("failed to write {cell}"))
    };

    for (cell, header) in [("A1", "VNI Content"), ("B1", "TCVN3 Content"), ("C1", "Mixed/Plain")] {
        put(cell, &[StyledRun::new(header, "Arial").bold()])?;
    }

    put("A2", &[StyledRun::new("Vi\u{D6}t Nam", "VNI-Times").with_size(12.0)])?;
    put("B2", &[StyledRun::new("C\u{F6}ng ty", ".VnTime").with_size(12.0)])?;
    put(
        "C2",
        &[
            StyledRun::new("Sample ", "Arial"),
            StyledRun::new("Vi\u{D6}t", "VNI-Times")
                .bold()
                .with_color("FFFF0000"),
        ],
    )?;

    for (idx, word) in WORDS.iter().enumerate() {
        let row = idx + 3;
        put(&format!("A{row}"), &[StyledRun::new(vni::encode(word), "VNI-Times")])?;
        put(
            &format!("B{row}"),
            &[StyledRun::new(tcvn3::encode(&word.to_lowercase()), ".VnTime")],
        )?;
        put(&format!("C{row}"), &[StyledRun::new(*word, "Arial").italic()])?;
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    doc.save_as(&output)
        .with_context(|| format!("failed to save {}", output.display()))?;

    println!("Sample file generated at: {}", output.display());
    Ok(())
}
