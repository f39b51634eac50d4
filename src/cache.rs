//! Content-addressed memoization of [`pipeline::prepare`](crate::pipeline::prepare).
//!
//! Entries are keyed by the SHA-256 of each workbook, the exact bit
//! patterns of the reference coordinates and the alert sheet name. The
//! cache is an ordinary value owned by the caller.
//!
//! Only results for the most recent pair of workbooks are kept: loading a
//! different file on either side drops every entry first.

use crate::error::Result;
use crate::geo::GeoPoint;
use crate::pipeline::prepare;
use crate::types::PreparedMap;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    locations: String,
    alerts: String,
    lat_bits: u64,
    lon_bits: u64,
    sheet: String,
}

impl CacheKey {
    pub fn new(
        location_bytes: &[u8],
        alert_bytes: &[u8],
        reference: GeoPoint,
        sheet: &str,
    ) -> Self {
        Self {
            locations: digest(location_bytes),
            alerts: digest(alert_bytes),
            lat_bits: reference.lat.to_bits(),
            lon_bits: reference.lon.to_bits(),
            sheet: sheet.to_string(),
        }
    }

    fn files(&self) -> (String, String) {
        (self.locations.clone(), self.alerts.clone())
    }
}

fn digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[derive(Debug, Default)]
pub struct PipelineCache {
    entries: HashMap<CacheKey, Arc<PreparedMap>>,
    /// Digests of the workbooks the current entries were built from.
    files: Option<(String, String)>,
    hits: usize,
    misses: usize,
}

impl PipelineCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for these inputs, running the pipeline on
    /// a miss. Errors are not cached.
    pub fn get_or_prepare(
        &mut self,
        location_bytes: &[u8],
        alert_bytes: &[u8],
        reference: GeoPoint,
        sheet: &str,
    ) -> Result<Arc<PreparedMap>> {
        let key = CacheKey::new(location_bytes, alert_bytes, reference, sheet);
        if let Some(hit) = self.entries.get(&key) {
            self.hits += 1;
            debug!(hits = self.hits, "pipeline cache hit");
            return Ok(Arc::clone(hit));
        }

        self.misses += 1;
        debug!(misses = self.misses, "pipeline cache miss");
        let files = key.files();
        if self.files.as_ref() != Some(&files) {
            if !self.entries.is_empty() {
                debug!(dropped = self.entries.len(), "workbooks changed, clearing cache");
            }
            self.entries.clear();
            self.files = Some(files);
        }
        let prepared = Arc::new(prepare(location_bytes, alert_bytes, reference, sheet)?);
        self.entries.insert(key, Arc::clone(&prepared));
        Ok(prepared)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn misses(&self) -> usize {
        self.misses
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.files = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_depends_on_content_and_reference() {
        let p = GeoPoint::new(38.7223, -9.1393);
        let a = CacheKey::new(b"loc", b"alerts", p, "TOATE ALERTELE");
        let b = CacheKey::new(b"loc", b"alerts", p, "TOATE ALERTELE");
        assert_eq!(a, b);

        assert_ne!(a, CacheKey::new(b"loc2", b"alerts", p, "TOATE ALERTELE"));
        let nudged = GeoPoint::new(38.7224, -9.1393);
        assert_ne!(a, CacheKey::new(b"loc", b"alerts", nudged, "TOATE ALERTELE"));
        assert_ne!(a, CacheKey::new(b"loc", b"alerts", p, "Sheet1"));
    }

    #[test]
    fn failed_prepare_is_not_cached() {
        let mut cache = PipelineCache::new();
        let p = GeoPoint::new(0.0, 0.0);
        assert!(cache.get_or_prepare(b"junk", b"junk", p, "X").is_err());
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 1);
    }
}
