//! Converts legacy Vietnamese spreadsheet text (VNI, TCVN3) to Unicode while
//! keeping each rich-text run's formatting and replacing legacy fonts.

pub mod config;
pub mod document;
pub mod encoding;
pub mod error;
pub mod fonts;
pub mod logging;
pub mod model;
pub mod processor;
pub mod report;
pub mod shutdown;
pub mod transform;
pub mod utils;

pub use config::{CliArgs, ConvertConfig};
pub use document::{DocumentError, SpreadsheetDocument, XlsxDocument};
pub use encoding::{Decoder, Encoding, EncodingMode, decoder_for, detect};
pub use error::{CellError, ConvertError, ErrorCode};
pub use fonts::FontMap;
pub use logging::{LoggingConfig, init_logging};
pub use model::{CellAddress, CellJob, ConversionResult, Progress, StyledRun};
pub use processor::{ConversionOutcome, Processor, ProcessorOptions};
pub use report::{CellFailure, ConversionReport};
pub use transform::RunTransformer;

use std::path::{Path, PathBuf};
use tokio::task;
use tokio_util::sync::CancellationToken;

/// Converts every sheet (or only `sheet`) of `input` with default settings
/// and returns the path of the timestamped output workbook.
pub async fn run(input: &Path, sheet: Option<&str>) -> Result<PathBuf, ConvertError> {
    let mut config = ConvertConfig::new(input);
    config.sheet = sheet.map(str::to_string);
    let outcome = run_with_config(&config, CancellationToken::new()).await?;
    Ok(outcome.output_path)
}

pub async fn run_with_config(
    config: &ConvertConfig,
    cancel: CancellationToken,
) -> Result<ConversionOutcome, ConvertError> {
    config.validate()?;
    let document = open_workbook(&config.input).await?;
    let processor = Processor::new(
        document,
        config.input.clone(),
        config.transformer(),
        config.processor_options(),
    );
    processor.run(cancel).await
}

/// Loads a workbook on a blocking thread.
pub async fn open_workbook(path: &Path) -> Result<XlsxDocument, ConvertError> {
    let owned = path.to_path_buf();
    task::spawn_blocking(move || XlsxDocument::open(&owned))
        .await?
        .map_err(|source| ConvertError::Open {
            path: path.to_path_buf(),
            source,
        })
}
