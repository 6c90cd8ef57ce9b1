use crate::encoding::EncodingMode;
use crate::error::ConvertError;
use crate::fonts::{DEFAULT_FONT, FontMap};
use crate::processor::{DEFAULT_QUEUE_DEPTH, DEFAULT_WORKERS, ProcessorOptions};
use crate::transform::RunTransformer;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];

#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub input: PathBuf,
    pub sheet: Option<String>,
    pub encoding: EncodingMode,
    pub workers: usize,
    pub queue_depth: usize,
    pub default_font: String,
    /// Extra legacy font mappings layered over the built-in table.
    pub fonts: BTreeMap<String, String>,
    pub output: Option<PathBuf>,
}

impl ConvertConfig {
    /// Defaults for converting `input`.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            sheet: None,
            encoding: EncodingMode::Auto,
            workers: DEFAULT_WORKERS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            default_font: DEFAULT_FONT.to_string(),
            fonts: BTreeMap::new(),
            output: None,
        }
    }

    pub fn from_args(args: CliArgs) -> Result<Self> {
        let CliArgs {
            config,
            input: cli_input,
            sheet: cli_sheet,
            encoding: cli_encoding,
            workers: cli_workers,
            queue_depth: cli_queue_depth,
            default_font: cli_default_font,
            output: cli_output,
            json: _,
        } = args;

        let file_config = if let Some(path) = config.as_ref() {
            load_config_file(path)?
        } else {
            PartialConfig::default()
        };

        let PartialConfig {
            input: file_input,
            sheet: file_sheet,
            encoding: file_encoding,
            workers: file_workers,
            queue_depth: file_queue_depth,
            default_font: file_default_font,
            fonts: file_fonts,
            output: file_output,
        } = file_config;

        let input = cli_input
            .or(file_input)
            .context("no input workbook given (pass INPUT or set `input` in the config file)")?;

        let sheet = cli_sheet
            .or(file_sheet)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let default_font = cli_default_font
            .or(file_default_font)
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .unwrap_or_else(|| DEFAULT_FONT.to_string());

        let config = Self {
            input,
            sheet,
            encoding: cli_encoding.or(file_encoding).unwrap_or_default(),
            workers: cli_workers.or(file_workers).unwrap_or(DEFAULT_WORKERS),
            queue_depth: cli_queue_depth
                .or(file_queue_depth)
                .unwrap_or(DEFAULT_QUEUE_DEPTH),
            default_font,
            fonts: file_fonts.unwrap_or_default(),
            output: cli_output.or(file_output),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConvertError> {
        let invalid = |msg: String| Err(ConvertError::InvalidConfig(msg));

        if self.workers == 0 {
            return invalid("workers must be at least 1".to_string());
        }
        if self.queue_depth == 0 {
            return invalid("queue_depth must be at least 1".to_string());
        }
        if !self.input.exists() {
            return invalid(format!("input {:?} does not exist", self.input));
        }
        if !self.input.is_file() {
            return invalid(format!("input {:?} is not a file", self.input));
        }
        if !has_supported_extension(&self.input) {
            return invalid(format!(
                "input {:?} must have one of the extensions {:?}",
                self.input, SUPPORTED_EXTENSIONS
            ));
        }
        if let Some((legacy, _)) = self
            .fonts
            .iter()
            .find(|(legacy, modern)| legacy.trim().is_empty() || modern.trim().is_empty())
        {
            return invalid(format!("font mapping for {legacy:?} is incomplete"));
        }
        Ok(())
    }

    pub fn font_map(&self) -> FontMap {
        FontMap::with_overrides(&self.fonts, &self.default_font)
    }

    pub fn transformer(&self) -> RunTransformer {
        RunTransformer::new(self.encoding, Arc::new(self.font_map()))
    }

    pub fn processor_options(&self) -> ProcessorOptions {
        ProcessorOptions {
            sheet: self.sheet.clone(),
            workers: self.workers,
            queue_depth: self.queue_depth,
            output_path: self.output.clone(),
        }
    }
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

#[derive(Parser, Debug, Default, Clone)]
#[command(
    name = "vnconv",
    about = "Convert VNI and TCVN3 spreadsheet text to Unicode",
    version
)]
pub struct CliArgs {
    #[arg(
        long,
        value_name = "FILE",
        help = "Path to a configuration file (YAML or JSON)"
    )]
    pub config: Option<PathBuf>,

    #[arg(
        value_name = "INPUT",
        env = "VNCONV_INPUT",
        help = "Workbook to convert (.xlsx or .xlsm)"
    )]
    pub input: Option<PathBuf>,

    #[arg(
        long,
        env = "VNCONV_SHEET",
        value_name = "NAME",
        help = "Convert only this sheet (default: every sheet)"
    )]
    pub sheet: Option<String>,

    #[arg(
        long,
        env = "VNCONV_ENCODING",
        value_enum,
        value_name = "MODE",
        help = "Source encoding, or auto to detect per run"
    )]
    pub encoding: Option<EncodingMode>,

    #[arg(
        long,
        env = "VNCONV_WORKERS",
        value_name = "N",
        help = "Number of conversion workers",
        value_parser = clap::value_parser!(usize)
    )]
    pub workers: Option<usize>,

    #[arg(
        long,
        env = "VNCONV_QUEUE_DEPTH",
        value_name = "N",
        help = "Capacity of the job and result queues",
        value_parser = clap::value_parser!(usize)
    )]
    pub queue_depth: Option<usize>,

    #[arg(
        long,
        env = "VNCONV_DEFAULT_FONT",
        value_name = "NAME",
        help = "Font used for decoded runs with no known replacement"
    )]
    pub default_font: Option<String>,

    #[arg(
        long,
        short = 'o',
        env = "VNCONV_OUTPUT",
        value_name = "FILE",
        help = "Write here instead of the timestamped name next to the input"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, help = "Print the run report as JSON")]
    pub json: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    input: Option<PathBuf>,
    sheet: Option<String>,
    encoding: Option<EncodingMode>,
    workers: Option<usize>,
    queue_depth: Option<usize>,
    default_font: Option<String>,
    fonts: Option<BTreeMap<String, String>>,
    output: Option<PathBuf>,
}

fn load_config_file(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        anyhow::bail!("config file {:?} does not exist", path);
    }
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {:?}", path))?;
    let ext = path
        .extension()
        .and_then(|os| os.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse YAML config {:?}", path))?,
        "json" => serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse JSON config {:?}", path))?,
        other => anyhow::bail!("unsupported config extension: {other}"),
    };
    Ok(parsed)
}
