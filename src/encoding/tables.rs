//! Static lookup data for the VNI and TCVN3 decoders.
//!
//! All tables are built once on first use and never mutated afterwards.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// A VNI marker's meaning: one of the five tones or a vowel modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Circumflex,
    Grave,
    Acute,
    Hook,
    Tilde,
    Dot,
    Horn,
}

/// Tones that can sit on top of a vowel, in the column order of
/// [`TONED_VOWELS`] and [`MODIFIED_VOWELS`].
pub const TONE_COLUMNS: [Tone; 5] = [Tone::Acute, Tone::Grave, Tone::Hook, Tone::Tilde, Tone::Dot];

const TONE_MARKERS: &[(char, Tone)] = &[
    ('Â', Tone::Circumflex),
    ('â', Tone::Circumflex),
    ('Ê', Tone::Circumflex),
    ('ê', Tone::Circumflex),
    ('Ô', Tone::Circumflex),
    ('ô', Tone::Circumflex),
    ('Ø', Tone::Grave),
    ('ø', Tone::Grave),
    ('Ù', Tone::Acute),
    ('ù', Tone::Acute),
    ('Û', Tone::Hook),
    ('û', Tone::Hook),
    ('Ü', Tone::Tilde),
    ('ü', Tone::Tilde),
    ('Ï', Tone::Dot),
    ('ï', Tone::Dot),
    ('Ö', Tone::Horn),
    ('ö', Tone::Horn),
];

const BREVE_MARKERS: [char; 2] = ['Å', 'å'];

const TONED_VOWELS: &[(char, [char; 5])] = &[
    ('a', ['á', 'à', 'ả', 'ã', 'ạ']),
    ('A', ['Á', 'À', 'Ả', 'Ã', 'Ạ']),
    ('e', ['é', 'è', 'ẻ', 'ẽ', 'ẹ']),
    ('E', ['É', 'È', 'Ẻ', 'Ẽ', 'Ẹ']),
    ('i', ['í', 'ì', 'ỉ', 'ĩ', 'ị']),
    ('I', ['Í', 'Ì', 'Ỉ', 'Ĩ', 'Ị']),
    ('o', ['ó', 'ò', 'ỏ', 'õ', 'ọ']),
    ('O', ['Ó', 'Ò', 'Ỏ', 'Õ', 'Ọ']),
    ('u', ['ú', 'ù', 'ủ', 'ũ', 'ụ']),
    ('U', ['Ú', 'Ù', 'Ủ', 'Ũ', 'Ụ']),
    ('y', ['ý', 'ỳ', 'ỷ', 'ỹ', 'ỵ']),
    ('Y', ['Ý', 'Ỳ', 'Ỷ', 'Ỹ', 'Ỵ']),
];

/// Vowels that already carry a circumflex, breve or horn.
const MODIFIED_VOWELS: &[(char, [char; 5])] = &[
    ('â', ['ấ', 'ầ', 'ẩ', 'ẫ', 'ậ']),
    ('Â', ['Ấ', 'Ầ', 'Ẩ', 'Ẫ', 'Ậ']),
    ('ă', ['ắ', 'ằ', 'ẳ', 'ẵ', 'ặ']),
    ('Ă', ['Ắ', 'Ằ', 'Ẳ', 'Ẵ', 'Ặ']),
    ('ê', ['ế', 'ề', 'ể', 'ễ', 'ệ']),
    ('Ê', ['Ế', 'Ề', 'Ể', 'Ễ', 'Ệ']),
    ('ô', ['ố', 'ồ', 'ổ', 'ỗ', 'ộ']),
    ('Ô', ['Ố', 'Ồ', 'Ổ', 'Ỗ', 'Ộ']),
    ('ơ', ['ớ', 'ờ', 'ở', 'ỡ', 'ợ']),
    ('Ơ', ['Ớ', 'Ờ', 'Ở', 'Ỡ', 'Ợ']),
    ('ư', ['ứ', 'ừ', 'ử', 'ữ', 'ự']),
    ('Ư', ['Ứ', 'Ừ', 'Ử', 'Ữ', 'Ự']),
];

const VOWEL_MODIFIERS: &[(char, Tone, char)] = &[
    ('a', Tone::Circumflex, 'â'),
    ('A', Tone::Circumflex, 'Â'),
    ('e', Tone::Circumflex, 'ê'),
    ('E', Tone::Circumflex, 'Ê'),
    ('o', Tone::Circumflex, 'ô'),
    ('O', Tone::Circumflex, 'Ô'),
    ('o', Tone::Horn, 'ơ'),
    ('O', Tone::Horn, 'Ơ'),
    ('u', Tone::Horn, 'ư'),
    ('U', Tone::Horn, 'Ư'),
];

/// Bases whose toned forms gain a circumflex when the marker arrives late.
const CIRCUMFLEX_PAIRS: &[(char, char)] = &[
    ('a', 'â'),
    ('A', 'Â'),
    ('e', 'ê'),
    ('E', 'Ê'),
    ('o', 'ô'),
    ('O', 'Ô'),
];

/// Marker pairs rewritten before marker resolution.
pub const AMBIGUOUS_SEQUENCES: &[(&str, &str)] = &[("ÖÔ", "ƯƠ"), ("öô", "ươ"), ("Öô", "Ươ")];

/// Single-rune VNI glyphs for letters that never take a trailing marker.
const ARTIFACTS: &[(char, char)] = &[('æ', 'ỉ'), ('Æ', 'Ỉ'), ('î', 'ỵ'), ('Î', 'Ỵ')];

const D_STROKE: &[(char, char)] = &[('ñ', 'đ'), ('Ñ', 'Đ')];

/// Glyph appended when a horn marker follows a vowel it cannot modify.
pub const HORN_AFTER_VOWEL: (char, char) = ('ệ', 'Ệ');

/// Standalone horned vowel introduced by a horn marker with no vowel before it.
pub const STANDALONE_HORN: (char, char) = ('ư', 'Ư');

const TCVN3_GLYPHS: &[(char, char)] = &[
    // a
    ('\u{B8}', 'á'),
    ('\u{B5}', 'à'),
    ('\u{B6}', 'ả'),
    ('\u{B7}', 'ã'),
    ('\u{B9}', 'ạ'),
    // ă
    ('\u{A8}', 'ă'),
    ('\u{BE}', 'ắ'),
    ('\u{BB}', 'ằ'),
    ('\u{BC}', 'ẳ'),
    ('\u{BD}', 'ẵ'),
    ('\u{C6}', 'ặ'),
    // â
    ('\u{A9}', 'â'),
    ('\u{CA}', 'ấ'),
    ('\u{C7}', 'ầ'),
    ('\u{C8}', 'ẩ'),
    ('\u{C9}', 'ẫ'),
    ('\u{CB}', 'ậ'),
    // e
    ('\u{D0}', 'é'),
    ('\u{CC}', 'è'),
    ('\u{CE}', 'ẻ'),
    ('\u{CF}', 'ẽ'),
    ('\u{D1}', 'ẹ'),
    // ê
    ('\u{AA}', 'ê'),
    ('\u{D5}', 'ế'),
    ('\u{D2}', 'ề'),
    ('\u{D3}', 'ể'),
    ('\u{D4}', 'ễ'),
    ('\u{D6}', 'ệ'),
    // i
    ('\u{DD}', 'í'),
    ('\u{D7}', 'ì'),
    ('\u{D8}', 'ỉ'),
    ('\u{DC}', 'ĩ'),
    ('\u{DE}', 'ị'),
    // o
    ('\u{E3}', 'ó'),
    ('\u{DF}', 'ò'),
    ('\u{E1}', 'ỏ'),
    ('\u{E2}', 'õ'),
    ('\u{E4}', 'ọ'),
    // ô; files in the wild store it at 0xF6 as well as 0xAB
    ('\u{AB}', 'ô'),
    ('\u{F6}', 'ô'),
    ('\u{E8}', 'ố'),
    ('\u{E5}', 'ồ'),
    ('\u{E6}', 'ổ'),
    ('\u{E7}', 'ỗ'),
    ('\u{E9}', 'ộ'),
    // ơ
    ('\u{AC}', 'ơ'),
    ('\u{ED}', 'ớ'),
    ('\u{EA}', 'ờ'),
    ('\u{EB}', 'ở'),
    ('\u{EC}', 'ỡ'),
    ('\u{EE}', 'ợ'),
    // u
    ('\u{F3}', 'ú'),
    ('\u{EF}', 'ù'),
    ('\u{F1}', 'ủ'),
    ('\u{F2}', 'ũ'),
    ('\u{F4}', 'ụ'),
    // ư
    ('\u{AD}', 'ư'),
    ('\u{F8}', 'ứ'),
    ('\u{F5}', 'ừ'),
    ('\u{F7}', 'ữ'),
    ('\u{F9}', 'ự'),
    // y
    ('\u{FD}', 'ý'),
    ('\u{FA}', 'ỳ'),
    ('\u{FB}', 'ỷ'),
    ('\u{FC}', 'ỹ'),
    ('\u{FE}', 'ỵ'),
    // uppercase modifier letters
    ('\u{A1}', 'Ă'),
    ('\u{A2}', 'Â'),
    ('\u{A3}', 'Ê'),
    ('\u{A4}', 'Ô'),
    ('\u{A5}', 'Ơ'),
    ('\u{A6}', 'Ư'),
    ('\u{A7}', 'Đ'),
    ('\u{AE}', 'đ'),
];

/// Code points that rarely appear in Unicode Vietnamese but are typical of
/// VNI text: grave/hook/tilde/dot/breve/horn markers, đ and the artifacts.
pub const VNI_CHARACTERISTIC: &[char] = &[
    'Ø', 'ø', 'Û', 'û', 'Ü', 'ü', 'Ï', 'ï', 'Å', 'å', 'Ö', 'ö', 'Ñ', 'ñ', 'Æ', 'æ', 'Î', 'î',
];

/// TCVN3 glyphs for the uppercase modified letters (Ă Â Ê Ô Ơ Ư Đ) and
/// `¹` (ạ). Other TCVN3 letters sit on common symbols such as `©`, `®`,
/// `·` or `½` and are left to the font prefix.
pub const TCVN3_CHARACTERISTIC: &[char] = &[
    '\u{A1}', '\u{A2}', '\u{A3}', '\u{A4}', '\u{A5}', '\u{A6}', '\u{A7}', '\u{B9}',
];

static MARKERS: Lazy<HashMap<char, Tone>> = Lazy::new(|| TONE_MARKERS.iter().copied().collect());

static BASE_TABLE: Lazy<HashMap<(char, Tone), char>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for (base, toned) in TONED_VOWELS {
        for (tone, composed) in TONE_COLUMNS.iter().zip(toned) {
            table.insert((*base, *tone), *composed);
        }
    }
    for (base, tone, composed) in VOWEL_MODIFIERS {
        table.insert((*base, *tone), *composed);
    }
    table
});

static COMPOSED_TABLE: Lazy<HashMap<(char, Tone), char>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for (composed, toned) in MODIFIED_VOWELS {
        for (tone, doubly) in TONE_COLUMNS.iter().zip(toned) {
            table.insert((*composed, *tone), *doubly);
        }
    }
    table
});

static KNOWN_VOWELS: Lazy<HashSet<char>> = Lazy::new(|| {
    TONED_VOWELS
        .iter()
        .chain(MODIFIED_VOWELS)
        .flat_map(|(root, toned)| std::iter::once(*root).chain(toned.iter().copied()))
        .collect()
});

/// Toned a/e/o mapped to the same tone with a circumflex added.
static CIRCUMFLEX_RECOVERY: Lazy<HashMap<char, char>> = Lazy::new(|| {
    let mut table = HashMap::new();
    for (plain, hatted) in CIRCUMFLEX_PAIRS {
        let Some(plain_row) = row_of(TONED_VOWELS, *plain) else {
            continue;
        };
        let Some(hatted_row) = row_of(MODIFIED_VOWELS, *hatted) else {
            continue;
        };
        for (from, to) in plain_row.iter().zip(hatted_row) {
            table.insert(*from, *to);
        }
    }
    table
});

static GRAVE_RECOVERY: Lazy<HashMap<char, char>> = Lazy::new(|| retone_table(Tone::Grave));
static DOT_RECOVERY: Lazy<HashMap<char, char>> = Lazy::new(|| retone_table(Tone::Dot));

static TCVN3_TABLE: Lazy<HashMap<char, char>> =
    Lazy::new(|| TCVN3_GLYPHS.iter().copied().collect());

fn row_of(rows: &'static [(char, [char; 5])], root: char) -> Option<&'static [char; 5]> {
    rows.iter().find(|(r, _)| *r == root).map(|(_, toned)| toned)
}

fn column_of(tone: Tone) -> Option<usize> {
    TONE_COLUMNS.iter().position(|t| *t == tone)
}

/// Maps every toned vowel to the same vowel carrying `target` instead.
fn retone_table(target: Tone) -> HashMap<char, char> {
    let mut table = HashMap::new();
    let Some(target_idx) = column_of(target) else {
        return table;
    };
    for (_, toned) in TONED_VOWELS.iter().chain(MODIFIED_VOWELS) {
        for (idx, from) in toned.iter().enumerate() {
            if idx != target_idx {
                table.insert(*from, toned[target_idx]);
            }
        }
    }
    table
}

pub fn tone_marker(c: char) -> Option<Tone> {
    MARKERS.get(&c).copied()
}

/// Canonical lowercase marker for `tone`.
pub fn marker_for(tone: Tone) -> char {
    TONE_MARKERS
        .iter()
        .find(|(m, t)| *t == tone && m.is_lowercase())
        .map(|(m, _)| *m)
        .unwrap_or('\0')
}

pub fn is_breve_marker(c: char) -> bool {
    BREVE_MARKERS.contains(&c)
}

/// Canonical lowercase breve marker.
pub fn breve_marker() -> char {
    BREVE_MARKERS[1]
}

pub fn combine_base(base: char, tone: Tone) -> Option<char> {
    BASE_TABLE.get(&(base, tone)).copied()
}

pub fn combine_composed(composed: char, tone: Tone) -> Option<char> {
    COMPOSED_TABLE.get(&(composed, tone)).copied()
}

pub fn is_composed_vowel(c: char) -> bool {
    MODIFIED_VOWELS.iter().any(|(root, _)| *root == c)
}

pub fn is_known_vowel(c: char) -> bool {
    KNOWN_VOWELS.contains(&c)
}

/// Secondary lookup for a marker the main tables could not place. Only the
/// circumflex, grave and dot markers have one.
pub fn recover(tone: Tone, last: char) -> Option<char> {
    let table = match tone {
        Tone::Circumflex => &CIRCUMFLEX_RECOVERY,
        Tone::Grave => &GRAVE_RECOVERY,
        Tone::Dot => &DOT_RECOVERY,
        _ => return None,
    };
    table.get(&last).copied()
}

pub fn with_breve(c: char) -> Option<char> {
    match c {
        'a' => Some('ă'),
        'A' => Some('Ă'),
        _ => None,
    }
}

pub fn d_stroke(c: char) -> Option<char> {
    D_STROKE.iter().find(|(from, _)| *from == c).map(|(_, to)| *to)
}

pub fn artifact(c: char) -> Option<char> {
    ARTIFACTS.iter().find(|(from, _)| *from == c).map(|(_, to)| *to)
}

pub fn tcvn3_glyph(c: char) -> Option<char> {
    TCVN3_TABLE.get(&c).copied()
}

/// `(base, tone, composed)` for every first-level combination.
pub fn base_entries() -> impl Iterator<Item = (char, Tone, char)> {
    BASE_TABLE.iter().map(|((base, tone), out)| (*base, *tone, *out))
}

/// `(composed, tone, doubly composed)` for every second-level combination.
pub fn composed_entries() -> impl Iterator<Item = (char, Tone, char)> {
    COMPOSED_TABLE.iter().map(|((base, tone), out)| (*base, *tone, *out))
}

pub fn tcvn3_entries() -> impl Iterator<Item = (char, char)> {
    TCVN3_GLYPHS.iter().copied()
}
