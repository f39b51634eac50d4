//! Spreadsheet decoding on top of `calamine`.
//!
//! A [`Sheet`] is the first row of a worksheet taken as (normalized)
//! headers plus every following row padded to the header width.

use crate::columns::normalize_headers;
use crate::error::{MapError, Result};
use crate::util::parse_f64_safe;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::debug;

static EMPTY: Data = Data::Empty;

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl Sheet {
    pub fn cell(&self, row: usize, col: usize) -> &Data {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }
}

/// Text content of a cell, or `None` when the cell counts as missing.
///
/// Empty cells, error cells and whitespace-only strings are missing.
pub fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Numeric content of a cell. Text cells are parsed; anything non-finite
/// or unparsable is `None`.
pub fn cell_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(f) => Some(*f).filter(|v| v.is_finite()),
        Data::Int(i) => Some(*i as f64),
        Data::String(s) => parse_f64_safe(Some(s.as_str())),
        _ => None,
    }
}

/// Pick the sheet whose trimmed, uppercased name equals `target`, falling
/// back to the first sheet.
pub fn select_sheet<'a>(names: &'a [String], target: &str) -> Option<&'a String> {
    let wanted = target.trim().to_uppercase();
    names
        .iter()
        .find(|name| name.trim().to_uppercase() == wanted)
        .or_else(|| names.first())
}

/// Read one sheet of a workbook held in memory.
///
/// With `target` set, the sheet is chosen by [`select_sheet`]; otherwise
/// the first sheet is used.
pub fn read_sheet(bytes: &[u8], target: Option<&str>) -> Result<Sheet> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let names = workbook.sheet_names();

    let name = match target {
        Some(t) => select_sheet(&names, t),
        None => names.first(),
    }
    .cloned()
    .ok_or(MapError::EmptyWorkbook)?;
    debug!(sheet = %name, available = ?names, "selected worksheet");

    let range = workbook.worksheet_range(&name)?;
    let mut rows_iter = range.rows();

    let raw_headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| cell_text(cell).unwrap_or_default())
            .collect(),
        None => Vec::new(),
    };
    let headers = normalize_headers(&raw_headers);

    let width = headers.len();
    let rows: Vec<Vec<Data>> = rows_iter
        .filter(|row| row.iter().any(|c| cell_text(c).is_some()))
        .map(|row| {
            let mut values = row.to_vec();
            values.resize(width, Data::Empty);
            values
        })
        .collect();

    Ok(Sheet {
        name,
        headers,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_sheet_matches_case_insensitively() {
        let names = vec!["Summary".to_string(), " toate alertele ".to_string()];
        assert_eq!(
            select_sheet(&names, "TOATE ALERTELE").map(String::as_str),
            Some(" toate alertele ")
        );
    }

    #[test]
    fn select_sheet_falls_back_to_first() {
        let names = vec!["Sheet1".to_string(), "Other".to_string()];
        assert_eq!(
            select_sheet(&names, "TOATE ALERTELE").map(String::as_str),
            Some("Sheet1")
        );
        assert_eq!(select_sheet(&[], "TOATE ALERTELE"), None);
    }

    #[test]
    fn cell_text_treats_blanks_as_missing() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("  ".into())), None);
        assert_eq!(cell_text(&Data::String(" FR1 ".into())), Some(" FR1 ".into()));
        assert_eq!(cell_text(&Data::Int(7)), Some("7".into()));
    }

    #[test]
    fn cell_number_coerces_text() {
        assert_eq!(cell_number(&Data::Float(38.7)), Some(38.7));
        assert_eq!(cell_number(&Data::Int(-9)), Some(-9.0));
        assert_eq!(cell_number(&Data::String("38.70".into())), Some(38.7));
        assert_eq!(cell_number(&Data::String("north".into())), None);
        assert_eq!(cell_number(&Data::Bool(true)), None);
        assert_eq!(cell_number(&Data::Empty), None);
    }

    #[test]
    fn read_sheet_rejects_non_spreadsheet_bytes() {
        let err = read_sheet(b"not a workbook", None).unwrap_err();
        assert!(matches!(err, MapError::Workbook(_)));
    }
}
