//! Header normalization and alias-based column resolution.
//!
//! Source workbooks spell their headers inconsistently ("Cod Site",
//! "SITE CODE", "Latitudine", "LAT", ...). Each canonical column carries a
//! ranked alias list; [`pick_column`] tries exact case-insensitive matches
//! in alias order first and falls back to substring matches in sheet order.

use crate::util::normalize_cell;
use std::collections::HashMap;

pub const LOCATION_CODE_ALIASES: &[&str] =
    &["Cod Site", "COD SITE", "CODSITE", "SITE", "SITE CODE", "CODE"];
pub const LATITUDE_ALIASES: &[&str] = &["Latitudine", "LATITUDINE", "LATITUDE", "LAT"];
pub const LONGITUDE_ALIASES: &[&str] = &["Longitudine", "LONGITUDINE", "LONGITUDE", "LON", "LNG"];

pub const ALERT_CODE_ALIASES: &[&str] =
    &["Site code", "SITE CODE", "Cod Site", "COD SITE", "SITE", "CODE"];
pub const ISSUE_ALIASES: &[&str] = &["Issue", "ISSUE"];
pub const STATUS_ALIASES: &[&str] = &["Tip Alarma", "TIP ALARMA", "STATUS", "TYPE"];
pub const GATEWAY_ALIASES: &[&str] = &["GW", "GW/NGW", "GW / NGW"];
pub const COMMENTS_ALIASES: &[&str] = &["Comments", "COMMENT", "NOTES", "NOTE", "OBS"];
pub const CHAIN_CODE_ALIASES: &[&str] = &["Lant", "LANT", "LANT CODE", "LANTCODE"];

/// Apply the cell normalizer to every header label.
pub fn normalize_headers<S: AsRef<str>>(headers: &[S]) -> Vec<String> {
    headers
        .iter()
        .map(|h| normalize_cell(Some(h.as_ref())))
        .collect()
}

fn match_key(s: &str) -> String {
    s.trim().to_uppercase()
}

/// Find the column that best matches a ranked list of aliases.
///
/// Returns the actual column label as it appears in `columns`.
pub fn pick_column(columns: &[String], candidates: &[&str]) -> Option<String> {
    // The first column wins when several collapse to the same key.
    let mut by_key: HashMap<String, &String> = HashMap::new();
    for col in columns {
        by_key.entry(match_key(col)).or_insert(col);
    }

    for cand in candidates {
        if let Some(col) = by_key.get(&match_key(cand)) {
            return Some((*col).clone());
        }
    }

    let cand_keys: Vec<String> = candidates.iter().map(|c| match_key(c)).collect();
    columns
        .iter()
        .find(|col| {
            let key = match_key(col);
            cand_keys.iter().any(|cand| key.contains(cand.as_str()))
        })
        .cloned()
}

/// Position of a resolved column label in the header row.
pub fn column_index(columns: &[String], name: &str) -> Option<usize> {
    columns.iter().position(|c| c == name)
}
