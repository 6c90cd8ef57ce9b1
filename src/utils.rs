use chrono::{DateTime, Local, TimeZone};
use std::path::{Path, PathBuf};

const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";

pub fn column_number_to_name(column: u32) -> String {
    let mut column = column;
    let mut name = String::new();
    while column > 0 {
        let rem = ((column - 1) % 26) as u8;
        name.insert(0, (b'A' + rem) as char);
        column = (column - 1) / 26;
    }
    name
}

pub fn column_name_to_number(name: &str) -> Option<u32> {
    if name.is_empty() || name.len() > 3 {
        return None;
    }
    let mut column: u32 = 0;
    for c in name.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
        column = column * 26 + digit;
    }
    Some(column)
}

pub fn cell_address(column: u32, row: u32) -> String {
    format!("{}{}", column_number_to_name(column), row)
}

/// `<base>_output_<YYYY_MM_DD_HH_MM_SS>.<ext>` next to the input file.
pub fn derive_output_path<Tz>(input: &Path, at: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let timestamp = at.format(OUTPUT_TIMESTAMP_FORMAT);
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}_output_{timestamp}.{}", ext.to_string_lossy()),
        None => format!("{stem}_output_{timestamp}"),
    };
    input.with_file_name(file_name)
}

pub fn output_path_now(input: &Path) -> PathBuf {
    derive_output_path(input, &Local::now())
}
