//! Join locations with alerts and rank the result by distance.

use crate::error::{Result, Warning};
use crate::geo::{geodesic_km, GeoPoint};
use crate::loader::{load_alerts, load_locations};
use crate::types::{AlertRecord, MapRecord, PreparedMap, SiteLocation};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use tracing::{info, warn};

/// Load both workbooks, join them on site code and sort by distance from
/// `reference`.
///
/// The result depends only on the arguments, so it is safe to memoize on
/// them (see [`crate::cache::PipelineCache`]).
pub fn prepare(
    location_bytes: &[u8],
    alert_bytes: &[u8],
    reference: GeoPoint,
    alert_sheet: &str,
) -> Result<PreparedMap> {
    let locations = load_locations(location_bytes)?;
    let alerts = load_alerts(alert_bytes, alert_sheet)?;

    let records = merge(&locations.records, &alerts.records, reference);
    let issues = distinct_issues(&records);

    info!(
        locations = locations.records.len(),
        alerts = alerts.records.len(),
        merged = records.len(),
        issues = issues.len(),
        "prepared map records"
    );
    let mut warnings = Vec::new();
    if records.is_empty() {
        warn!("no site in the location workbook has a current alert");
        warnings.push(Warning::EmptyResult { stage: "join" });
    }

    Ok(PreparedMap {
        records,
        issues,
        has_comments: alerts.has_comments,
        has_chain_code: alerts.has_chain_code,
        location_report: locations.report,
        alert_report: alerts.report,
        warnings,
    })
}

/// Inner join on site code, annotated with distance and sorted ascending.
///
/// Rows come out in location order, then alert order, before the stable
/// sort; codes that repeat on either side fan out.
pub fn merge(
    locations: &[SiteLocation],
    alerts: &[AlertRecord],
    reference: GeoPoint,
) -> Vec<MapRecord> {
    let mut by_code: HashMap<&str, Vec<&AlertRecord>> = HashMap::new();
    for alert in alerts {
        by_code.entry(alert.site_code.as_str()).or_default().push(alert);
    }

    let mut records: Vec<MapRecord> = Vec::new();
    for loc in locations {
        let Some(matches) = by_code.get(loc.site_code.as_str()) else {
            continue;
        };
        let distance_km = geodesic_km(reference, GeoPoint::new(loc.latitude, loc.longitude));
        for alert in matches {
            records.push(MapRecord {
                site_code: loc.site_code.clone(),
                issue: alert.issue.clone(),
                status: alert.status.clone(),
                gateway_type: alert.gateway_type.clone(),
                distance_km,
                comments: alert.comments.clone(),
                chain_code: alert.chain_code.clone(),
                latitude: loc.latitude,
                longitude: loc.longitude,
            });
        }
    }

    records.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });
    records
}

/// Sorted distinct non-blank issue labels.
pub fn distinct_issues(records: &[MapRecord]) -> Vec<String> {
    records
        .iter()
        .filter(|r| !r.issue.trim().is_empty())
        .map(|r| r.issue.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
