use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use assert_matches::assert_matches;
use tokio_util::sync::CancellationToken;
use vnconv::{
    CellAddress, ConvertError, ErrorCode, Processor, ProcessorOptions, RunTransformer, StyledRun,
};

mod support;
use support::MemoryDocument;

const SHEET: &str = "Sheet1";

fn options(workers: usize, queue_depth: usize) -> ProcessorOptions {
    ProcessorOptions {
        sheet: None,
        workers,
        queue_depth,
        output_path: Some(PathBuf::from("/virtual/out.xlsx")),
    }
}

/// Fills `rows` x 4 cells: VNI, TCVN3, plain text and a number per row.
fn populated(rows: u32) -> MemoryDocument {
    let doc = MemoryDocument::with_sheets(&[SHEET]);
    for row in 1..=rows {
        doc.put_plain(SHEET, &format!("A{row}"), "Vi\u{D6}t Nam", "VNI-Times");
        doc.put_plain(SHEET, &format!("B{row}"), "C\u{F6}ng ty", ".VnTime");
        doc.put_plain(SHEET, &format!("C{row}"), "Invoice", "Calibri");
        doc.put_plain(SHEET, &format!("D{row}"), &row.to_string(), "Calibri");
    }
    doc
}

#[tokio::test]
async fn every_non_blank_cell_is_processed_once() {
    let doc = populated(50);
    doc.put_plain(SHEET, "F3", "   ", "Calibri");
    let originals: Vec<(String, Vec<StyledRun>)> = (1..=50)
        .flat_map(|row| ["A", "B", "C", "D"].map(|col| format!("{col}{row}")))
        .map(|cell| {
            let runs = doc.runs_at(SHEET, &cell);
            (cell, runs)
        })
        .collect();

    let processor = Processor::new(doc.clone(), "in.xlsx", RunTransformer::default(), options(8, 4));
    let progress = processor.subscribe_progress();
    let outcome = processor.run(CancellationToken::new()).await.expect("run");

    let report = &outcome.report;
    assert_eq!(report.scanned, 200);
    assert_eq!(report.processed, 200);
    assert_eq!(report.converted, 100);
    assert_eq!(report.unchanged(), 100);
    assert!(report.failures.is_empty());
    assert!(!outcome.cancelled());
    assert_eq!(report.encodings.vni, 50);
    assert_eq!(report.encodings.tcvn3, 50);
    assert_eq!(report.encodings.unknown, 100);
    assert_eq!(progress.borrow().processed, 200);

    assert_eq!(doc.writes(), 100);
    let transformer = RunTransformer::default();
    for (cell, runs) in originals {
        let expected = if cell.starts_with('A') || cell.starts_with('B') {
            transformer.transform(&runs)
        } else {
            runs
        };
        assert_eq!(doc.runs_at(SHEET, &cell), expected, "cell {cell}");
    }
    assert_eq!(doc.saved_to(), vec![PathBuf::from("/virtual/out.xlsx")]);
}

#[tokio::test]
async fn no_cross_talk_between_cells() {
    let doc = MemoryDocument::with_sheets(&[SHEET]);
    let words = ["Vi\u{D6}t", "Ha\u{F8}", "No\u{E2}\u{EF}i", "\u{D1}a\u{F9}", "a\u{E5}n"];
    for row in 1..=100u32 {
        let word = words[row as usize % words.len()];
        doc.put_plain(SHEET, &format!("A{row}"), &format!("{word} {row}"), "VNI-Arial");
    }
    let processor = Processor::new(doc.clone(), "in.xlsx", RunTransformer::default(), options(16, 2));
    processor.run(CancellationToken::new()).await.expect("run");

    let transformer = RunTransformer::default();
    for row in 1..=100u32 {
        let word = words[row as usize % words.len()];
        let expected =
            transformer.transform(&[StyledRun::new(format!("{word} {row}"), "VNI-Arial")]);
        assert_eq!(doc.runs_at(SHEET, &format!("A{row}")), expected);
    }
}

#[tokio::test]
async fn mixed_rich_text_cell_keeps_run_structure() {
    let doc = MemoryDocument::with_sheets(&[SHEET]);
    doc.put_rich(
        SHEET,
        "C2",
        vec![
            StyledRun::new("Sample ", "Arial"),
            StyledRun::new("Vi\u{D6}t", "VNI-Times").bold().with_color("FFFF0000"),
        ],
    );
    let processor = Processor::new(doc.clone(), "in.xlsx", RunTransformer::default(), options(2, 2));
    processor.run(CancellationToken::new()).await.expect("run");

    let runs = doc.runs_at(SHEET, "C2");
    assert_eq!(
        runs,
        vec![
            StyledRun::new("Sample ", "Arial"),
            StyledRun::new("Việt", "Times New Roman").bold().with_color("FFFF0000"),
        ]
    );
}

#[tokio::test]
async fn missing_sheet_fails_before_any_work() {
    let doc = populated(3);
    let processor = Processor::new(
        doc.clone(),
        "in.xlsx",
        RunTransformer::default(),
        ProcessorOptions {
            sheet: Some("Nope".to_string()),
            ..options(2, 2)
        },
    );
    let err = processor.run(CancellationToken::new()).await.unwrap_err();
    assert_matches!(err, ConvertError::SheetNotFound { ref sheet } if sheet == "Nope");
    assert_eq!(doc.writes(), 0);
    assert!(doc.saved_to().is_empty());
}

#[tokio::test]
async fn only_the_requested_sheet_is_converted() {
    let doc = MemoryDocument::with_sheets(&["First", "Second"]);
    doc.put_plain("First", "A1", "Vi\u{D6}t", "VNI-Times");
    doc.put_plain("Second", "A1", "Vi\u{D6}t", "VNI-Times");
    let processor = Processor::new(
        doc.clone(),
        "in.xlsx",
        RunTransformer::default(),
        ProcessorOptions {
            sheet: Some("Second".to_string()),
            ..options(2, 2)
        },
    );
    let outcome = processor.run(CancellationToken::new()).await.expect("run");
    assert_eq!(outcome.report.sheets, vec!["Second".to_string()]);
    assert_eq!(doc.runs_at("First", "A1")[0].text, "Vi\u{D6}t");
    assert_eq!(doc.runs_at("Second", "A1")[0].text, "Việt");
}

#[tokio::test]
async fn cell_failures_are_recorded_and_skipped() {
    let doc = populated(4);
    {
        let mut state = doc.state.lock().unwrap();
        state.fail_reads.insert("A2".parse::<CellAddress>().unwrap());
        state.fail_writes.insert("B3".parse::<CellAddress>().unwrap());
    }
    let processor = Processor::new(doc.clone(), "in.xlsx", RunTransformer::default(), options(3, 3));
    let progress = processor.subscribe_progress();
    let outcome = processor.run(CancellationToken::new()).await.expect("run");

    let report = &outcome.report;
    assert_eq!(report.scanned, 16);
    assert_eq!(report.processed, 14);
    assert_eq!(report.failures.len(), 2);
    assert!(report.is_partial_success());
    let codes: HashSet<(String, ErrorCode)> = report
        .failures
        .iter()
        .map(|f| (f.cell.clone(), f.code))
        .collect();
    assert!(codes.contains(&("A2".to_string(), ErrorCode::CellReadFailed)));
    assert!(codes.contains(&("B3".to_string(), ErrorCode::CellWriteFailed)));
    assert_eq!(progress.borrow().failed, 2);
    assert_eq!(doc.runs_at(SHEET, "B3")[0].text, "C\u{F6}ng ty");
    assert_eq!(doc.saved_to().len(), 1);
}

#[tokio::test]
async fn save_failure_is_fatal() {
    let doc = populated(1);
    doc.state.lock().unwrap().fail_save = true;
    let processor = Processor::new(doc, "in.xlsx", RunTransformer::default(), options(1, 1));
    let err = processor.run(CancellationToken::new()).await.unwrap_err();
    assert_matches!(err, ConvertError::Save { ref path, .. } if path == &PathBuf::from("/virtual/out.xlsx"));
    assert_eq!(err.code(), ErrorCode::SaveFailed);
}

#[tokio::test]
async fn progress_never_decreases() {
    let doc = populated(30);
    let processor = Processor::new(doc, "in.xlsx", RunTransformer::default(), options(4, 2));
    let mut progress = processor.subscribe_progress();
    let watcher = tokio::spawn(async move {
        let mut seen = Vec::new();
        while progress.changed().await.is_ok() {
            seen.push(progress.borrow_and_update().processed);
        }
        seen
    });
    processor.run(CancellationToken::new()).await.expect("run");

    let seen = watcher.await.expect("watcher");
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
    assert_eq!(seen.last().copied(), Some(120));
}

#[tokio::test]
async fn progress_rises_while_the_scan_is_running() {
    let doc = MemoryDocument::with_sheets(&[SHEET]);
    for row in 1..=200u32 {
        doc.put_plain(SHEET, &format!("A{row}"), "Vi\u{D6}t", "VNI-Times");
    }
    doc.state.lock().unwrap().read_delay = Some(Duration::from_millis(2));
    let processor = Processor::new(doc.clone(), "in.xlsx", RunTransformer::default(), options(2, 2));
    let mut progress = processor.subscribe_progress();
    let running = tokio::spawn(processor.run(CancellationToken::new()));

    let first = tokio::time::timeout(
        Duration::from_secs(5),
        progress.wait_for(|p| p.processed > 0),
    )
    .await
    .expect("progress before the scan ends")
    .expect("progress channel open")
    .processed;
    assert!(first < 200, "first update {first}");
    assert!(doc.saved_to().is_empty());
    assert!(doc.writes() > 0);

    let outcome = running.await.expect("join").expect("run");
    assert_eq!(outcome.report.processed, 200);
    assert_eq!(doc.writes(), 200);
}

#[tokio::test]
async fn cancellation_saves_completed_cells() {
    let doc = populated(100);
    doc.state.lock().unwrap().read_delay = Some(Duration::from_millis(2));
    let processor = Processor::new(doc.clone(), "in.xlsx", RunTransformer::default(), options(2, 2));

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(40)).await;
        trigger.cancel();
    });
    let outcome = processor.run(cancel).await.expect("run");

    let report = &outcome.report;
    assert!(outcome.cancelled());
    assert!(report.scanned < 400, "scanned {}", report.scanned);
    assert_eq!(report.processed, report.scanned);
    assert_eq!(doc.saved_to().len(), 1);
}

#[tokio::test]
async fn cancelled_before_start_saves_untouched_copy() {
    let doc = populated(5);
    let processor = Processor::new(doc.clone(), "in.xlsx", RunTransformer::default(), options(2, 2));
    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = processor.run(cancel).await.expect("run");
    assert!(outcome.cancelled());
    assert_eq!(outcome.report.processed, 0);
    assert_eq!(doc.writes(), 0);
    assert_eq!(doc.saved_to().len(), 1);
}
