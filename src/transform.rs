use crate::encoding::{Encoding, EncodingMode, decoder_for};
use crate::fonts::FontMap;
use crate::model::{CellJob, ConversionResult, StyledRun};
use std::sync::Arc;

/// Decodes the runs of one cell and swaps legacy fonts for Unicode ones.
///
/// Holds no per-cell state, so one instance is shared by every worker.
#[derive(Debug, Clone)]
pub struct RunTransformer {
    mode: EncodingMode,
    fonts: Arc<FontMap>,
}

impl Default for RunTransformer {
    fn default() -> Self {
        Self::new(EncodingMode::Auto, Arc::new(FontMap::builtin()))
    }
}

impl RunTransformer {
    pub fn new(mode: EncodingMode, fonts: Arc<FontMap>) -> Self {
        Self { mode, fonts }
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Converts one run, returning it with the encoding it was read as.
    pub fn convert_run(&self, run: &StyledRun) -> (StyledRun, Encoding) {
        let encoding = self.mode.classify(&run.font_name, &run.text);
        let mut converted = run.clone();
        match decoder_for(encoding) {
            Some(decoder) => {
                converted.text = decoder.to_unicode(&run.text);
                converted.font_name = self.fonts.resolve(&run.font_name).to_string();
            }
            None => {
                if converted.font_name.trim().is_empty() {
                    converted.font_name = self.fonts.default_font().to_string();
                }
            }
        }
        (converted, encoding)
    }

    pub fn transform(&self, runs: &[StyledRun]) -> Vec<StyledRun> {
        runs.iter().map(|run| self.convert_run(run).0).collect()
    }

    pub fn convert(&self, job: CellJob) -> ConversionResult {
        let (new_runs, encodings) = job.runs.iter().map(|run| self.convert_run(run)).unzip();
        ConversionResult {
            job,
            new_runs,
            encodings,
        }
    }
}
