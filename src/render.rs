//! Handing prepared records to a map renderer.
//!
//! The crate does not draw maps. [`MapRenderer`] is the seam a
//! presentation layer plugs into; [`GeoJsonRenderer`] produces a
//! renderer-neutral FeatureCollection that any web map can display.

use crate::error::Result;
use crate::geo::GeoPoint;
use crate::style::MarkerStyle;
use crate::types::MapRecord;
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::debug;

pub trait MapRenderer {
    type Output;

    /// Render `records` around `reference`. `route_order` lists site codes
    /// to connect with a polyline, in order; unknown codes are skipped.
    fn render(
        &self,
        records: &[MapRecord],
        reference: GeoPoint,
        cluster: bool,
        route_order: &[String],
    ) -> Result<Self::Output>;
}

/// Coordinates for each route stop that exists in `records`.
///
/// Codes are compared trimmed and uppercased. A code matching several
/// records uses the first one.
pub fn resolve_route(records: &[MapRecord], route_order: &[String]) -> Vec<(String, GeoPoint)> {
    let mut by_code: HashMap<String, GeoPoint> = HashMap::new();
    for r in records {
        by_code
            .entry(r.site_code.trim().to_uppercase())
            .or_insert_with(|| GeoPoint::new(r.latitude, r.longitude));
    }

    route_order
        .iter()
        .filter_map(|code| {
            let code = code.trim().to_uppercase();
            let point = by_code.get(&code).copied();
            if point.is_none() {
                debug!(%code, "route stop not on the map, skipping");
            }
            point.map(|p| (code, p))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonRenderer;

impl GeoJsonRenderer {
    fn point(p: GeoPoint, properties: Value) -> Value {
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [p.lon, p.lat] },
            "properties": properties,
        })
    }
}

impl MapRenderer for GeoJsonRenderer {
    type Output = Value;

    fn render(
        &self,
        records: &[MapRecord],
        reference: GeoPoint,
        cluster: bool,
        route_order: &[String],
    ) -> Result<Value> {
        let mut features = Vec::with_capacity(records.len() + 2);
        features.push(Self::point(reference, json!({ "kind": "reference" })));

        for r in records {
            let style = MarkerStyle::for_record(r);
            features.push(Self::point(
                GeoPoint::new(r.latitude, r.longitude),
                json!({
                    "kind": "site",
                    "site_code": r.site_code,
                    "issue": r.issue,
                    "status": r.status,
                    "gateway_type": r.gateway_type,
                    "chain_code": r.chain_code,
                    "comments": r.comments,
                    "distance_km": r.distance_km,
                    "color": style.color,
                    "shape": style.shape,
                }),
            ));
        }

        let route = resolve_route(records, route_order);
        if route.len() >= 2 {
            let coords: Vec<[f64; 2]> = route.iter().map(|(_, p)| [p.lon, p.lat]).collect();
            let stops: Vec<&str> = route.iter().map(|(c, _)| c.as_str()).collect();
            features.push(json!({
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": coords },
                "properties": { "kind": "route", "stops": stops },
            }));
        }

        Ok(json!({
            "type": "FeatureCollection",
            "properties": { "cluster": cluster },
            "features": features,
        }))
    }
}
