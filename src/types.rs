use serde::Serialize;
use tabled::Tabled;

use crate::error::Warning;
use crate::util::format_number;

/// One row of the location workbook after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteLocation {
    pub site_code: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// One row of the alert workbook after cleaning.
///
/// `comments` and `chain_code` are `Some` exactly when the sheet had the
/// corresponding column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertRecord {
    pub site_code: String,
    pub issue: String,
    pub status: String,
    pub gateway_type: String,
    pub comments: Option<String>,
    pub chain_code: Option<String>,
}

/// Row counts gathered while cleaning one sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub sheet: String,
    pub total_rows: usize,
    pub kept_rows: usize,
    /// Rows dropped because a required cell was empty.
    pub missing_rows: usize,
    /// Rows dropped because a coordinate was not a number.
    pub coercion_failures: usize,
}

#[derive(Debug, Clone)]
pub struct LocationTable {
    pub records: Vec<SiteLocation>,
    pub report: LoadReport,
}

#[derive(Debug, Clone)]
pub struct AlertTable {
    pub records: Vec<AlertRecord>,
    pub has_comments: bool,
    pub has_chain_code: bool,
    pub report: LoadReport,
}

/// A joined location + alert row with its distance from the reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapRecord {
    pub site_code: String,
    pub issue: String,
    pub status: String,
    pub gateway_type: String,
    pub distance_km: f64,
    pub comments: Option<String>,
    pub chain_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

/// Output of the merge pipeline: records sorted by distance plus the
/// issue labels available for filtering.
#[derive(Debug, Clone)]
pub struct PreparedMap {
    pub records: Vec<MapRecord>,
    pub issues: Vec<String>,
    pub has_comments: bool,
    pub has_chain_code: bool,
    pub location_report: LoadReport,
    pub alert_report: LoadReport,
    /// Non-fatal conditions raised while preparing, e.g. an empty join.
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MapRow {
    #[tabled(rename = "Site")]
    pub site_code: String,
    #[tabled(rename = "Issue")]
    pub issue: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "GW")]
    pub gateway_type: String,
    #[tabled(rename = "Lant")]
    pub chain_code: String,
    #[tabled(rename = "Distance (km)")]
    pub distance_km: String,
}

impl From<&MapRecord> for MapRow {
    fn from(r: &MapRecord) -> Self {
        MapRow {
            site_code: r.site_code.clone(),
            issue: r.issue.clone(),
            status: r.status.clone(),
            gateway_type: r.gateway_type.clone(),
            chain_code: r.chain_code.clone().unwrap_or_default(),
            distance_km: format_number(r.distance_km, 2),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq, Eq)]
pub struct CommentRow {
    #[tabled(rename = "Site")]
    pub site_code: String,
    #[tabled(rename = "Issue")]
    pub issue: String,
    #[tabled(rename = "Comments")]
    pub comments: String,
}

/// Headline counts shown above the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub total: usize,
    pub onair: usize,
    pub down: usize,
}

#[derive(Debug, Serialize)]
pub struct ExportSummary {
    pub generated_at: String,
    pub reference_lat: f64,
    pub reference_lon: f64,
    pub metrics: Metrics,
    pub issues: Vec<String>,
    pub chain_code: Option<String>,
    pub route: Vec<String>,
}
