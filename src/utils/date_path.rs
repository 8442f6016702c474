use chrono::Datelike;
use thiserror::Error;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatePathError {
    #[error("invalid month index: {0}")]
    InvalidMonthIndex(u32),
}

/// English three-letter abbreviation for a zero-based month index.
pub fn month_abbrev(month_index: u32) -> Result<&'static str, DatePathError> {
    MONTH_ABBREVIATIONS
        .get(month_index as usize)
        .copied()
        .ok_or(DatePathError::InvalidMonthIndex(month_index))
}

/// `"{year}/{Mon}/"`, e.g. `2025/Oct/`.
pub fn directory_path<D: Datelike>(date: &D) -> Result<String, DatePathError> {
    let month = month_abbrev(date.month0())?;
    Ok(format!("{}/{}/", date.year(), month))
}

/// `"{year}-{MM}-{DD}.md"`, e.g. `2025-10-25.md`.
pub fn file_name<D: Datelike>(date: &D) -> String {
    format!("{}-{:02}-{:02}.md", date.year(), date.month(), date.day())
}

/// Directory and file name joined by exactly one `/`.
pub fn full_path<D: Datelike>(date: &D) -> Result<String, DatePathError> {
    let directory = directory_path(date)?;
    Ok(join_path(&directory, &file_name(date)))
}

fn join_path(directory: &str, file: &str) -> String {
    let directory = directory.trim_end_matches('/');
    let file = file.trim_start_matches('/');
    if directory.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", directory, file)
    }
}

/// Containing directory of a relative file path, without a trailing `/`.
/// Root-level files yield an empty string.
pub fn split_directory(path: &str) -> &str {
    let trimmed = path.trim_matches('/');
    match trimmed.rfind('/') {
        Some(idx) => &trimmed[..idx],
        None => "",
    }
}
