use super::Encoding;
use super::tables::{TCVN3_CHARACTERISTIC, VNI_CHARACTERISTIC};

const VNI_FONT_PREFIX: &str = "vni-";
const TCVN3_FONT_PREFIX: &str = ".vn";

/// Guesses the legacy encoding of a run.
///
/// The font name wins when it carries a known legacy prefix. Otherwise the
/// text is scanned for code points that are characteristic of one scheme
/// and rare in Unicode Vietnamese. VNI is checked first because its marker
/// set is the more specific of the two. A TCVN3 glyph only counts when it
/// touches a letter, so `£ 100` or `§ 3` stay Unknown.
pub fn detect(font_name: &str, sample: &str) -> Encoding {
    if let Some(encoding) = from_font_name(font_name) {
        return encoding;
    }
    if sample.chars().any(|c| VNI_CHARACTERISTIC.contains(&c)) {
        return Encoding::Vni;
    }
    if has_tcvn3_glyph(sample) {
        return Encoding::Tcvn3;
    }
    Encoding::Unknown
}

fn has_tcvn3_glyph(sample: &str) -> bool {
    let chars: Vec<char> = sample.chars().collect();
    chars.iter().enumerate().any(|(i, c)| {
        if !TCVN3_CHARACTERISTIC.contains(c) {
            return false;
        }
        let before = i.checked_sub(1).and_then(|j| chars.get(j));
        let after = chars.get(i + 1);
        [before, after]
            .into_iter()
            .flatten()
            .any(|n| n.is_alphabetic())
    })
}

pub fn from_font_name(font_name: &str) -> Option<Encoding> {
    let lowered = font_name.trim().to_ascii_lowercase();
    if lowered.starts_with(VNI_FONT_PREFIX) {
        Some(Encoding::Vni)
    } else if lowered.starts_with(TCVN3_FONT_PREFIX) {
        Some(Encoding::Tcvn3)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_prefix_beats_content() {
        assert_eq!(detect("VNI-Times", "plain"), Encoding::Vni);
        assert_eq!(detect(".VnTime", "Vi\u{D6}t"), Encoding::Tcvn3);
        assert_eq!(detect("vni-helve", ""), Encoding::Vni);
    }

    #[test]
    fn unicode_vietnamese_is_unknown() {
        assert_eq!(detect("Arial", "Tiếng Việt có dấu"), Encoding::Unknown);
    }

    #[test]
    fn isolated_tcvn3_glyph_is_ignored() {
        assert_eq!(detect("Calibri", "\u{A3} 100"), Encoding::Unknown);
        assert_eq!(detect("Calibri", "\u{A7} 3"), Encoding::Unknown);
        assert_eq!(detect("Calibri", "C\u{A4}NG"), Encoding::Tcvn3);
    }
}
