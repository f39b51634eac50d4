// Marker styling rules: color from the issue and alarm status, shape from
// the gateway type.
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

use crate::types::MapRecord;
use crate::util::normalize_cell;

// Infrastructure problems override the status color.
static BLACK_ISSUES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["FALLEN TOWER", "FORBIDDEN TOWER", "FALLEN MAST", "INFRA"]
        .into_iter()
        .collect()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerColor {
    Black,
    Green,
    Red,
    Gray,
}

impl fmt::Display for MarkerColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarkerColor::Black => "black",
            MarkerColor::Green => "green",
            MarkerColor::Red => "red",
            MarkerColor::Gray => "gray",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerShape {
    /// Gateway sites.
    Star,
    Circle,
}

fn upper(s: &str) -> String {
    normalize_cell(Some(s)).to_uppercase()
}

pub fn marker_color(issue: &str, status: &str) -> MarkerColor {
    if BLACK_ISSUES.contains(upper(issue).as_str()) {
        return MarkerColor::Black;
    }
    match upper(status).as_str() {
        "ONAIR" => MarkerColor::Green,
        "DOWN" => MarkerColor::Red,
        _ => MarkerColor::Gray,
    }
}

pub fn marker_shape(gateway_type: &str) -> MarkerShape {
    if upper(gateway_type) == "GW" {
        MarkerShape::Star
    } else {
        MarkerShape::Circle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub color: MarkerColor,
    pub shape: MarkerShape,
}

impl MarkerStyle {
    pub fn for_record(record: &MapRecord) -> Self {
        Self {
            color: marker_color(&record.issue, &record.status),
            shape: marker_shape(&record.gateway_type),
        }
    }
}
