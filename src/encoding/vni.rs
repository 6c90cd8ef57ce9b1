//! VNI-Windows decoder.
//!
//! VNI writes a toned vowel as the bare vowel followed by one or two marker
//! characters. Decoding walks the text once and fuses every marker into the
//! last character already emitted, so stacked diacritics (circumflex then
//! tone) resolve against the current output rather than the raw input.

use super::Decoder;
use super::tables::{self, Tone};
use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct VniDecoder;

impl Decoder for VniDecoder {
    fn to_unicode(&self, text: &str) -> String {
        decode(text)
    }
}

pub fn decode(text: &str) -> String {
    let text = rewrite_ambiguous(text);
    let mut out: Vec<char> = Vec::with_capacity(text.len());

    for c in text.chars() {
        if let Some(tone) = tables::tone_marker(c) {
            apply_marker(&mut out, c, tone);
        } else if let Some(d) = tables::d_stroke(c) {
            out.push(d);
        } else if tables::is_breve_marker(c) {
            match out.last().copied().and_then(tables::with_breve) {
                Some(breve) => replace_last(&mut out, breve),
                None => out.push(c),
            }
        } else {
            out.push(c);
        }
    }

    out.into_iter()
        .map(|c| tables::artifact(c).unwrap_or(c))
        .collect()
}

fn rewrite_ambiguous(text: &str) -> String {
    let mut text = text.to_string();
    for (from, to) in tables::AMBIGUOUS_SEQUENCES {
        if text.contains(from) {
            text = text.replace(from, to);
        }
    }
    text
}

fn apply_marker(out: &mut Vec<char>, marker: char, tone: Tone) {
    let Some(last) = out.last().copied() else {
        out.push(marker);
        return;
    };

    let combined = if tables::is_composed_vowel(last) {
        tables::combine_composed(last, tone)
    } else {
        tables::combine_base(last, tone)
    };
    if let Some(composed) = combined {
        replace_last(out, composed);
        return;
    }

    match tone {
        Tone::Horn if tables::is_known_vowel(last) => {
            let (lower, upper) = tables::HORN_AFTER_VOWEL;
            out.push(if last.is_uppercase() { upper } else { lower });
        }
        Tone::Horn => {
            let (lower, upper) = tables::STANDALONE_HORN;
            out.push(if marker.is_uppercase() { upper } else { lower });
        }
        Tone::Circumflex | Tone::Grave | Tone::Dot => match tables::recover(tone, last) {
            Some(recovered) => replace_last(out, recovered),
            None => out.push(marker),
        },
        _ => out.push(marker),
    }
}

fn replace_last(out: &mut [char], c: char) {
    if let Some(slot) = out.last_mut() {
        *slot = c;
    }
}

/// Unicode letter to its VNI spelling (base letter followed by markers).
static DECOMPOSITION: Lazy<HashMap<char, String>> = Lazy::new(|| {
    let mut steps: HashMap<char, (char, char)> = HashMap::new();
    for (base, tone, composed) in tables::base_entries() {
        steps.insert(composed, (base, tables::marker_for(tone)));
    }
    for (composed, tone, doubly) in tables::composed_entries() {
        steps.insert(doubly, (composed, tables::marker_for(tone)));
    }
    for base in ['a', 'A'] {
        if let Some(breve) = tables::with_breve(base) {
            steps.insert(breve, (base, tables::breve_marker()));
        }
    }

    let mut spelled = HashMap::new();
    for &letter in steps.keys() {
        let mut markers = Vec::new();
        let mut current = letter;
        while let Some((prev, marker)) = steps.get(&current) {
            markers.push(*marker);
            current = *prev;
        }
        let mut spelling = String::new();
        spelling.push(current);
        spelling.extend(markers.into_iter().rev());
        spelled.insert(letter, spelling);
    }
    spelled.insert('đ', "ñ".to_string());
    spelled.insert('Đ', "Ñ".to_string());
    spelled
});

/// Spells Unicode Vietnamese text the way VNI stores it. Characters with
/// no VNI spelling are copied as they are.
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        match DECOMPOSITION.get(&c) {
            Some(spelling) => out.push_str(spelling),
            None => out.push(c),
        }
    }
    out
}
