use crate::columns::{
    column_index, pick_column, ALERT_CODE_ALIASES, CHAIN_CODE_ALIASES, COMMENTS_ALIASES,
    GATEWAY_ALIASES, ISSUE_ALIASES, LATITUDE_ALIASES, LOCATION_CODE_ALIASES, LONGITUDE_ALIASES,
    STATUS_ALIASES,
};
use crate::error::{MapError, Result};
use crate::types::{AlertRecord, AlertTable, LoadReport, LocationTable, SiteLocation};
use crate::util::{normalize_cell, normalize_code};
use crate::workbook::{cell_number, cell_text, read_sheet, Sheet};
use tracing::{debug, info};

/// Sheet name looked up in the alert workbook before falling back to the
/// first sheet.
pub const ALERT_SHEET: &str = "TOATE ALERTELE";

/// Resolve a required column to its index, recording its canonical name in
/// `missing` when it cannot be found.
fn require(
    sheet: &Sheet,
    aliases: &[&str],
    canonical: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<usize> {
    let idx = pick_column(&sheet.headers, aliases).and_then(|c| column_index(&sheet.headers, &c));
    match idx {
        Some(i) => {
            debug!(column = canonical, header = %sheet.headers[i], "resolved column");
            Some(i)
        }
        None => {
            missing.push(canonical);
            None
        }
    }
}

fn optional(sheet: &Sheet, aliases: &[&str], canonical: &'static str) -> Option<usize> {
    let idx = pick_column(&sheet.headers, aliases).and_then(|c| column_index(&sheet.headers, &c));
    if let Some(i) = idx {
        debug!(column = canonical, header = %sheet.headers[i], "resolved optional column");
    }
    idx
}

/// Load the site location workbook (first sheet).
pub fn load_locations(bytes: &[u8]) -> Result<LocationTable> {
    let sheet = read_sheet(bytes, None)?;
    locations_from_sheet(&sheet)
}

pub fn locations_from_sheet(sheet: &Sheet) -> Result<LocationTable> {
    let mut missing = Vec::new();
    let code = require(sheet, LOCATION_CODE_ALIASES, "site code", &mut missing);
    let lat = require(sheet, LATITUDE_ALIASES, "latitude", &mut missing);
    let lon = require(sheet, LONGITUDE_ALIASES, "longitude", &mut missing);
    let (Some(code), Some(lat), Some(lon)) = (code, lat, lon) else {
        return Err(MapError::validation("locations", &missing, &sheet.headers));
    };

    let mut report = LoadReport {
        sheet: sheet.name.clone(),
        total_rows: sheet.rows.len(),
        ..LoadReport::default()
    };
    let mut records = Vec::new();

    for row in 0..sheet.rows.len() {
        let site_code = cell_text(sheet.cell(row, code)).map(|c| normalize_code(&c));
        let lat_cell = sheet.cell(row, lat);
        let lon_cell = sheet.cell(row, lon);

        let coords_present = cell_text(lat_cell).is_some() && cell_text(lon_cell).is_some();
        let site_code = match site_code {
            Some(c) if !c.is_empty() && coords_present => c,
            _ => {
                report.missing_rows += 1;
                continue;
            }
        };
        let (Some(latitude), Some(longitude)) = (cell_number(lat_cell), cell_number(lon_cell))
        else {
            report.coercion_failures += 1;
            continue;
        };

        records.push(SiteLocation {
            site_code,
            latitude,
            longitude,
        });
    }

    report.kept_rows = records.len();
    info!(
        sheet = %report.sheet,
        total = report.total_rows,
        kept = report.kept_rows,
        missing = report.missing_rows,
        bad_coordinates = report.coercion_failures,
        "loaded site locations"
    );
    Ok(LocationTable { records, report })
}

/// Load the alert workbook, preferring the sheet named `target_sheet`.
pub fn load_alerts(bytes: &[u8], target_sheet: &str) -> Result<AlertTable> {
    let sheet = read_sheet(bytes, Some(target_sheet))?;
    alerts_from_sheet(&sheet)
}

pub fn alerts_from_sheet(sheet: &Sheet) -> Result<AlertTable> {
    let mut missing = Vec::new();
    let code = require(sheet, ALERT_CODE_ALIASES, "site code", &mut missing);
    let issue = require(sheet, ISSUE_ALIASES, "issue", &mut missing);
    let status = require(sheet, STATUS_ALIASES, "status", &mut missing);
    let gateway = require(sheet, GATEWAY_ALIASES, "gateway type", &mut missing);
    let comments = optional(sheet, COMMENTS_ALIASES, "comments");
    let chain = optional(sheet, CHAIN_CODE_ALIASES, "chain code");
    let (Some(code), Some(issue), Some(status), Some(gateway)) = (code, issue, status, gateway)
    else {
        return Err(MapError::validation("alerts", &missing, &sheet.headers));
    };

    let text = |row: usize, col: usize| normalize_cell(cell_text(sheet.cell(row, col)).as_deref());

    let mut report = LoadReport {
        sheet: sheet.name.clone(),
        total_rows: sheet.rows.len(),
        ..LoadReport::default()
    };
    let mut records = Vec::new();

    for row in 0..sheet.rows.len() {
        let site_code = match cell_text(sheet.cell(row, code)).map(|c| normalize_code(&c)) {
            Some(c) if !c.is_empty() => c,
            _ => {
                report.missing_rows += 1;
                continue;
            }
        };

        records.push(AlertRecord {
            site_code,
            issue: text(row, issue),
            status: text(row, status),
            gateway_type: text(row, gateway),
            comments: comments.map(|col| text(row, col)),
            chain_code: chain.map(|col| text(row, col)),
        });
    }

    report.kept_rows = records.len();
    info!(
        sheet = %report.sheet,
        total = report.total_rows,
        kept = report.kept_rows,
        missing_code = report.missing_rows,
        comments = comments.is_some(),
        chain_code = chain.is_some(),
        "loaded alerts"
    );
    Ok(AlertTable {
        records,
        has_comments: comments.is_some(),
        has_chain_code: chain.is_some(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::Data;

    fn s(v: &str) -> Data {
        Data::String(v.to_string())
    }

    fn sheet(headers: &[&str], rows: Vec<Vec<Data>>) -> Sheet {
        Sheet {
            name: "Sheet1".to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn locations_resolve_aliases_and_clean_codes() {
        let sh = sheet(
            &["SITE CODE", "LAT", "LNG"],
            vec![
                vec![s(" fr1 "), Data::Float(38.7), Data::Float(-9.1)],
                vec![s("fr2"), s("38.8"), s(" -9.0 ")],
            ],
        );
        let table = locations_from_sheet(&sh).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].site_code, "FR1");
        assert_eq!(table.records[1].latitude, 38.8);
        assert_eq!(table.records[1].longitude, -9.0);
        assert_eq!(table.report.kept_rows, 2);
    }

    #[test]
    fn locations_drop_incomplete_and_non_numeric_rows() {
        let sh = sheet(
            &["Cod Site", "Latitudine", "Longitudine"],
            vec![
                vec![s("A"), Data::Empty, Data::Float(1.0)],
                vec![Data::Empty, Data::Float(1.0), Data::Float(1.0)],
                vec![s("B"), s("north"), Data::Float(1.0)],
                vec![s("C"), Data::Float(2.0), Data::Float(3.0)],
            ],
        );
        let table = locations_from_sheet(&sh).unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.records[0].site_code, "C");
        assert_eq!(table.report.missing_rows, 2);
        assert_eq!(table.report.coercion_failures, 1);
    }

    #[test]
    fn locations_use_the_first_of_duplicated_headers() {
        let sh = sheet(
            &["Cod Site", "Latitudine", "Longitudine", "Latitudine"],
            vec![vec![s("A"), Data::Float(38.7), Data::Float(-9.1), Data::Empty]],
        );
        let table = locations_from_sheet(&sh).unwrap();
        assert_eq!(table.report.kept_rows, 1);
        assert_eq!(table.report.missing_rows, 0);
        assert_eq!(table.records[0].latitude, 38.7);
    }

    #[test]
    fn locations_missing_column_lists_headers() {
        let sh = sheet(&["Cod Site", "Name"], vec![]);
        let err = locations_from_sheet(&sh).unwrap_err();
        match err {
            MapError::Validation {
                table,
                missing,
                columns,
            } => {
                assert_eq!(table, "locations");
                assert_eq!(missing, "latitude, longitude");
                assert_eq!(columns, vec!["Cod Site".to_string(), "Name".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn alerts_normalize_text_and_detect_optional_columns() {
        let sh = sheet(
            &["Site code", "Issue", "Tip Alarma", "GW / NGW", "Lant"],
            vec![
                vec![s(" fr1"), s("FALLEN\nTOWER"), s(" Down "), s("NGW"), Data::Float(482.0)],
                vec![Data::Empty, s("X"), s("DOWN"), s("GW"), Data::Empty],
                vec![s("FR3"), Data::Empty, s("ONAIR"), s("GW"), s("7.0")],
            ],
        );
        let table = alerts_from_sheet(&sh).unwrap();
        assert!(!table.has_comments);
        assert!(table.has_chain_code);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.report.missing_rows, 1);

        let first = &table.records[0];
        assert_eq!(first.site_code, "FR1");
        assert_eq!(first.issue, "FALLEN TOWER");
        assert_eq!(first.status, "Down");
        assert_eq!(first.comments, None);
        assert_eq!(first.chain_code.as_deref(), Some("482"));

        let second = &table.records[1];
        assert_eq!(second.issue, "");
        assert_eq!(second.chain_code.as_deref(), Some("7.0"));
    }

    #[test]
    fn alerts_missing_required_columns_fail() {
        let sh = sheet(&["Site code", "Issue", "Comments"], vec![]);
        let err = alerts_from_sheet(&sh).unwrap_err();
        match err {
            MapError::Validation { table, missing, .. } => {
                assert_eq!(table, "alerts");
                assert_eq!(missing, "status, gateway type");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
