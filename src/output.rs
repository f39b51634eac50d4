use serde::Serialize;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

use crate::error::Result;
use crate::types::{CommentRow, MapRecord, Metrics};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn preview_table<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}", table_str);
    if rows.len() > max_rows {
        println!("... {} more rows", rows.len() - max_rows);
    }
    println!();
}

fn status_is(record: &MapRecord, wanted: &str) -> bool {
    record.status.trim().eq_ignore_ascii_case(wanted)
}

pub fn metrics(records: &[MapRecord]) -> Metrics {
    Metrics {
        total: records.len(),
        onair: records.iter().filter(|r| status_is(r, "onair")).count(),
        down: records.iter().filter(|r| status_is(r, "down")).count(),
    }
}

/// Rows of the visible table that carry a real comment.
///
/// `None` when the alert sheet had no comments column.
pub fn comments_view(records: &[MapRecord], has_comments: bool) -> Option<Vec<CommentRow>> {
    if !has_comments {
        return None;
    }
    let rows = records
        .iter()
        .filter_map(|r| {
            let text = r.comments.as_deref()?.trim();
            if text.is_empty() || text.eq_ignore_ascii_case("nan") {
                return None;
            }
            Some(CommentRow {
                site_code: r.site_code.clone(),
                issue: r.issue.clone(),
                comments: text.to_string(),
            })
        })
        .collect();
    Some(rows)
}
