//! Concurrent batch conversion of a workbook.
//!
//! Three roles cooperate:
//!
//! - a **dispatcher** on a blocking thread scans the document, turning every
//!   non-blank cell into a [`CellJob`];
//! - a pool of **workers** converts jobs without touching the document;
//! - the **collector** (the task calling [`Processor::run`]) writes each
//!   result back as soon as it arrives.
//!
//! Dispatcher and collector share the document behind one mutex. Each holds
//! it for a single cell read or write and never across a channel send, so
//! in-flight work stays bounded by the two queues.

use crate::document::SpreadsheetDocument;
use crate::error::{CellError, ConvertError};
use crate::model::{CellAddress, CellJob, ConversionResult, Progress, StyledRun};
use crate::report::{CellFailure, ConversionReport, EncodingCounts};
use crate::transform::RunTransformer;
use crate::utils::{cell_address, output_path_now};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const DEFAULT_WORKERS: usize = 10;
pub const DEFAULT_QUEUE_DEPTH: usize = 100;
const SLOW_SAVE_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct ProcessorOptions {
    /// Convert only this sheet; every sheet when `None`.
    pub sheet: Option<String>,
    pub workers: usize,
    pub queue_depth: usize,
    /// Overrides the timestamped output name.
    pub output_path: Option<PathBuf>,
}

impl Default for ProcessorOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            workers: DEFAULT_WORKERS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            output_path: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub output_path: PathBuf,
    pub report: ConversionReport,
}

impl ConversionOutcome {
    pub fn cancelled(&self) -> bool {
        self.report.cancelled
    }
}

/// What the dispatcher saw while scanning.
#[derive(Debug, Default)]
struct ScanSummary {
    scanned: u64,
    failures: Vec<CellFailure>,
    cancelled: bool,
}

pub struct Processor<D> {
    document: D,
    input: PathBuf,
    transformer: Arc<RunTransformer>,
    options: ProcessorOptions,
    progress: watch::Sender<Progress>,
}

impl<D: SpreadsheetDocument> Processor<D> {
    pub fn new(
        document: D,
        input: impl Into<PathBuf>,
        transformer: RunTransformer,
        options: ProcessorOptions,
    ) -> Self {
        let (progress, _) = watch::channel(Progress::default());
        Self {
            document,
            input: input.into(),
            transformer: Arc::new(transformer),
            options,
            progress,
        }
    }

    /// Progress updates for this run. Counts only ever grow.
    pub fn subscribe_progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    pub async fn run(self, cancel: CancellationToken) -> Result<ConversionOutcome, ConvertError> {
        let started = Instant::now();
        let Processor {
            document,
            input,
            transformer,
            options,
            progress,
        } = self;

        let sheets = select_sheets(&document, options.sheet.as_deref())?;
        let workers = options.workers.max(1);
        let queue_depth = options.queue_depth.max(1);
        info!(
            input = %input.display(),
            sheets = ?sheets,
            workers,
            queue_depth,
            mode = %transformer.mode(),
            "starting conversion"
        );

        let mut report = ConversionReport::new(input.clone());
        report.sheets = sheets.clone();

        let (job_tx, job_rx) = mpsc::channel::<CellJob>(queue_depth);
        let (result_tx, mut result_rx) = mpsc::channel::<ConversionResult>(queue_depth);

        let document = Arc::new(Mutex::new(document));
        let scan: JoinHandle<ScanSummary> = {
            let document = Arc::clone(&document);
            let cancel = cancel.clone();
            task::spawn_blocking(move || dispatch(&*document, &sheets, &job_tx, &cancel))
        };

        let worker_handles = spawn_workers(workers, job_rx, &result_tx, &transformer);
        drop(result_tx);

        let mut collector = Collector {
            report,
            progress: &progress,
        };
        while let Some(result) = result_rx.recv().await {
            collector.apply(&*document, result);
        }

        let summary = scan.await?;
        collector.absorb_scan(summary);
        for handle in worker_handles {
            handle.await?;
        }
        let mut report = collector.report;

        let output_path = options
            .output_path
            .clone()
            .unwrap_or_else(|| output_path_now(&input));
        let save_path = output_path.clone();
        let save_started = Instant::now();
        task::spawn_blocking(move || document.lock().save_as(&save_path))
            .await?
            .map_err(|source| ConvertError::Save {
                path: output_path.clone(),
                source,
            })?;
        crate::log_slow_operation!(
            save_started.elapsed(),
            SLOW_SAVE_MS,
            output = %output_path.display(),
            "workbook saved"
        );

        report.output = Some(output_path.clone());
        report.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            output = %output_path.display(),
            scanned = report.scanned,
            processed = report.processed,
            converted = report.converted,
            failed = report.failures.len(),
            cancelled = report.cancelled,
            elapsed_ms = report.elapsed_ms,
            "conversion finished"
        );

        Ok(ConversionOutcome {
            output_path,
            report,
        })
    }
}

fn select_sheets<D: SpreadsheetDocument>(
    document: &D,
    requested: Option<&str>,
) -> Result<Vec<String>, ConvertError> {
    let available = document.sheet_names();
    match requested {
        Some(name) if available.iter().any(|s| s == name) => Ok(vec![name.to_string()]),
        Some(name) => Err(ConvertError::SheetNotFound {
            sheet: name.to_string(),
        }),
        None => Ok(available),
    }
}

fn spawn_workers(
    count: usize,
    jobs: mpsc::Receiver<CellJob>,
    results: &mpsc::Sender<ConversionResult>,
    transformer: &Arc<RunTransformer>,
) -> Vec<JoinHandle<()>> {
    let jobs = Arc::new(tokio::sync::Mutex::new(jobs));
    (0..count)
        .map(|worker| {
            let jobs = Arc::clone(&jobs);
            let results = results.clone();
            let transformer = Arc::clone(transformer);
            tokio::spawn(async move {
                loop {
                    let next = jobs.lock().await.recv().await;
                    let Some(job) = next else {
                        break;
                    };
                    if results.send(transformer.convert(job)).await.is_err() {
                        debug!(worker, "result channel closed");
                        break;
                    }
                }
            })
        })
        .collect()
}

/// Scans the requested sheets and queues one job per non-blank cell.
fn dispatch<D: SpreadsheetDocument>(
    document: &Mutex<D>,
    sheets: &[String],
    jobs: &mpsc::Sender<CellJob>,
    cancel: &CancellationToken,
) -> ScanSummary {
    let mut summary = ScanSummary::default();

    for sheet in sheets {
        let rows = document.lock().rows(sheet);
        let rows = match rows {
            Ok(rows) => rows,
            Err(err) => {
                warn!(sheet = %sheet, error = %err, "failed to read rows");
                continue;
            }
        };
        debug!(sheet = %sheet, rows = rows.len(), "scanning sheet");
        let before = summary.scanned;

        for (row_idx, row) in rows.iter().enumerate() {
            for (col_idx, text) in row.iter().enumerate() {
                if cancel.is_cancelled() {
                    info!(sheet = %sheet, scanned = summary.scanned, "scan cancelled");
                    summary.cancelled = true;
                    return summary;
                }
                if text.trim().is_empty() {
                    continue;
                }
                summary.scanned += 1;

                let (column, row_num) = (col_idx as u32 + 1, row_idx as u32 + 1);
                let job = read_job(&*document.lock(), sheet, column, row_num, text);
                let job = match job {
                    Ok(job) => job,
                    Err((cell, err)) => {
                        warn!(sheet = %sheet, cell = %cell, error = %err, "skipping unreadable cell");
                        summary.failures.push(CellFailure::new(sheet, cell, &err));
                        continue;
                    }
                };
                if jobs.blocking_send(job).is_err() {
                    warn!(sheet = %sheet, "job queue closed before the scan finished");
                    return summary;
                }
            }
        }
        debug!(sheet = %sheet, cells = summary.scanned - before, "sheet scanned");
    }

    summary
}

fn read_job<D: SpreadsheetDocument>(
    document: &D,
    sheet: &str,
    column: u32,
    row: u32,
    text: &str,
) -> Result<CellJob, (String, CellError)> {
    let address =
        CellAddress::new(column, row).map_err(|e| (format!("R{row}C{column}"), CellError::from(e)))?;
    let read_error = |source| {
        (
            cell_address(column, row),
            CellError::Read {
                sheet: sheet.to_string(),
                address,
                source,
            },
        )
    };

    let runs = match document.styled_runs(sheet, address).map_err(read_error)? {
        Some(runs) if !runs.is_empty() => runs,
        _ => {
            let font = match document.style_font(sheet, address) {
                Ok(font) => font,
                Err(err) => {
                    debug!(cell = %address, error = %err, "no style font");
                    None
                }
            };
            if let Some(font) = &font {
                debug!(cell = %address, font = %font.name, "cell font detected");
            }
            vec![StyledRun::from_plain(text, font)]
        }
    };

    Ok(CellJob {
        sheet_name: sheet.to_string(),
        address,
        runs,
    })
}

struct Collector<'a> {
    report: ConversionReport,
    progress: &'a watch::Sender<Progress>,
}

impl Collector<'_> {
    fn absorb_scan(&mut self, summary: ScanSummary) {
        debug!(scanned = summary.scanned, "scan finished");
        self.report.scanned = summary.scanned;
        self.report.cancelled = summary.cancelled;
        self.report.failures.extend(summary.failures);
        self.publish();
    }

    fn apply<D: SpreadsheetDocument>(&mut self, document: &Mutex<D>, result: ConversionResult) {
        record_encodings(&mut self.report.encodings, &result);
        if result.is_decoded() {
            let job = &result.job;
            let written =
                document
                    .lock()
                    .set_styled_runs(&job.sheet_name, job.address, &result.new_runs);
            match written {
                Ok(()) => {
                    self.report.converted += 1;
                    self.report.processed += 1;
                }
                Err(source) => {
                    let err = CellError::Write {
                        sheet: job.sheet_name.clone(),
                        address: job.address,
                        source,
                    };
                    warn!(sheet = %job.sheet_name, cell = %job.address, error = %err, "failed to write converted cell");
                    self.report
                        .add_failure(CellFailure::new(&job.sheet_name, job.address.to_string(), &err));
                }
            }
        } else {
            self.report.processed += 1;
        }
        self.publish();
    }

    fn publish(&self) {
        self.progress.send_replace(Progress {
            processed: self.report.processed,
            failed: self.report.failures.len() as u64,
        });
    }
}

fn record_encodings(counts: &mut EncodingCounts, result: &ConversionResult) {
    for encoding in &result.encodings {
        counts.record(*encoding);
    }
}
