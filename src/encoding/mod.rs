//! Legacy Vietnamese encodings and their Unicode decoders.
//!
//! Two 8-bit schemes are supported:
//!
//! - **VNI-Windows**: tone diacritics are trailing marker characters that
//!   must be fused with the vowel before them ([`vni::VniDecoder`]).
//! - **TCVN3 (ABC)**: every accented letter is a single precomposed glyph
//!   ([`tcvn3::Tcvn3Decoder`]).
//!
//! Text read out of a workbook arrives as the Latin-1 code points of the
//! original bytes, so the tables in [`tables`] are keyed by `char`.

pub mod detect;
pub mod tables;
pub mod tcvn3;
pub mod vni;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use detect::detect;
pub use tcvn3::Tcvn3Decoder;
pub use vni::VniDecoder;

/// Classification of one styled run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Vni,
    Tcvn3,
    Unknown,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Vni => write!(f, "vni"),
            Encoding::Tcvn3 => write!(f, "tcvn3"),
            Encoding::Unknown => write!(f, "unknown"),
        }
    }
}

/// How runs are classified before decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// Font name first, then content heuristics.
    #[default]
    Auto,
    /// Treat every run as VNI.
    Vni,
    /// Treat every run as TCVN3.
    Tcvn3,
}

impl EncodingMode {
    pub fn classify(self, font_name: &str, sample: &str) -> Encoding {
        match self {
            EncodingMode::Auto => detect(font_name, sample),
            EncodingMode::Vni => Encoding::Vni,
            EncodingMode::Tcvn3 => Encoding::Tcvn3,
        }
    }
}

impl fmt::Display for EncodingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingMode::Auto => write!(f, "auto"),
            EncodingMode::Vni => write!(f, "vni"),
            EncodingMode::Tcvn3 => write!(f, "tcvn3"),
        }
    }
}

/// Converts legacy encoded text to Unicode. Implementations are total:
/// anything they do not recognise is passed through unchanged.
pub trait Decoder: Send + Sync {
    fn to_unicode(&self, text: &str) -> String;
}

static VNI: VniDecoder = VniDecoder;
static TCVN3: Tcvn3Decoder = Tcvn3Decoder;

/// Returns the decoder for `encoding`, or `None` for [`Encoding::Unknown`].
pub fn decoder_for(encoding: Encoding) -> Option<&'static dyn Decoder> {
    match encoding {
        Encoding::Vni => Some(&VNI),
        Encoding::Tcvn3 => Some(&TCVN3),
        Encoding::Unknown => None,
    }
}
