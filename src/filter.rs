//! Narrowing the merged table by issue and chain code.
//!
//! The chain filter runs before the issue filter so that route building
//! only ever offers sites of the active chain.

use crate::error::Warning;
use crate::types::MapRecord;
use crate::util::normalize_chain_code;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// `None` keeps every issue; `Some(empty)` keeps nothing.
    pub issues: Option<BTreeSet<String>>,
    pub chain_code: Option<String>,
}

impl FilterState {
    /// The trimmed chain code, if one was entered.
    pub fn active_chain(&self) -> Option<&str> {
        self.chain_code
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }

    /// Route stops uppercased and trimmed, or nothing when no chain filter is
    /// active. Routes only exist within a chain.
    pub fn route_stops(&self, requested: &[String]) -> Vec<String> {
        if self.active_chain().is_none() {
            return Vec::new();
        }
        requested
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub records: Vec<MapRecord>,
    pub warnings: Vec<Warning>,
}

pub fn apply(records: &[MapRecord], has_chain_code: bool, state: &FilterState) -> FilterOutcome {
    let mut warnings = Vec::new();
    let mut kept: Vec<&MapRecord> = records.iter().collect();

    if let Some(chain) = state.active_chain() {
        if !has_chain_code {
            warn!(chain, "chain filter requested but the alert sheet has no chain column");
            warnings.push(Warning::MissingChainColumn);
            kept.clear();
        } else {
            let wanted = normalize_chain_code(chain);
            kept.retain(|r| {
                r.chain_code
                    .as_deref()
                    .map(normalize_chain_code)
                    .is_some_and(|c| c == wanted)
            });
            note_empty(&mut warnings, records.len(), kept.len(), "chain code filter");
        }
    }

    if let Some(allowed) = &state.issues {
        let before = kept.len();
        kept.retain(|r| allowed.contains(&r.issue));
        note_empty(&mut warnings, before, kept.len(), "issue filter");
    }

    FilterOutcome {
        records: kept.into_iter().cloned().collect(),
        warnings,
    }
}

fn note_empty(warnings: &mut Vec<Warning>, before: usize, after: usize, stage: &'static str) {
    if before > 0 && after == 0 {
        warn!(stage, "filter removed every row");
        warnings.push(Warning::EmptyResult { stage });
    }
}

/// Sorted distinct site codes, offered as route stops.
pub fn chain_sites(records: &[MapRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.site_code.trim().to_uppercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, issue: &str, chain: Option<&str>) -> MapRecord {
        MapRecord {
            site_code: code.to_string(),
            issue: issue.to_string(),
            status: "DOWN".to_string(),
            gateway_type: "NGW".to_string(),
            distance_km: 1.0,
            comments: None,
            chain_code: chain.map(str::to_string),
            latitude: 0.0,
            longitude: 0.0,
        }
    }

    fn issues(items: &[&str]) -> Option<BTreeSet<String>> {
        Some(items.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn no_filter_keeps_everything() {
        let rows = vec![record("A", "DOWN", None), record("B", "INFRA", None)];
        let out = apply(&rows, false, &FilterState::default());
        assert_eq!(out.records, rows);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn empty_issue_set_shows_nothing() {
        let rows = vec![record("A", "DOWN", None)];
        let state = FilterState {
            issues: issues(&[]),
            chain_code: None,
        };
        let out = apply(&rows, false, &state);
        assert!(out.records.is_empty());
        assert_eq!(
            out.warnings,
            vec![Warning::EmptyResult {
                stage: "issue filter"
            }]
        );
    }

    #[test]
    fn issue_filter_is_case_sensitive() {
        let rows = vec![record("A", "DOWN", None), record("B", "down", None)];
        let state = FilterState {
            issues: issues(&["DOWN"]),
            chain_code: None,
        };
        let out = apply(&rows, false, &state);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].site_code, "A");
    }

    #[test]
    fn chain_filter_strips_float_suffix() {
        let rows = vec![
            record("A", "DOWN", Some("482")),
            record("B", "DOWN", Some("483")),
            record("C", "DOWN", None),
        ];
        let state = FilterState {
            issues: None,
            chain_code: Some(" 482.0 ".to_string()),
        };
        let out = apply(&rows, true, &state);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].site_code, "A");

        let state = FilterState {
            issues: None,
            chain_code: Some("l7".to_string()),
        };
        let rows = vec![record("A", "DOWN", Some("L7.0"))];
        assert_eq!(apply(&rows, true, &state).records.len(), 1);
    }

    #[test]
    fn chain_filter_without_column_is_empty_with_warning() {
        let rows = vec![record("A", "DOWN", None)];
        let state = FilterState {
            issues: None,
            chain_code: Some("7".to_string()),
        };
        let out = apply(&rows, false, &state);
        assert!(out.records.is_empty());
        assert_eq!(out.warnings, vec![Warning::MissingChainColumn]);
    }

    #[test]
    fn blank_chain_code_is_no_filter() {
        let rows = vec![record("A", "DOWN", None)];
        let state = FilterState {
            issues: None,
            chain_code: Some("   ".to_string()),
        };
        let out = apply(&rows, false, &state);
        assert_eq!(out.records.len(), 1);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn filters_compose() {
        let rows = vec![
            record("A", "DOWN", Some("7")),
            record("B", "INFRA", Some("7")),
            record("C", "DOWN", Some("9")),
        ];
        let state = FilterState {
            issues: issues(&["DOWN"]),
            chain_code: Some("7".to_string()),
        };
        let out = apply(&rows, true, &state);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].site_code, "A");
    }

    #[test]
    fn route_stops_need_an_active_chain() {
        let requested = vec![" fr1".to_string(), "".to_string(), "Fr2 ".to_string()];
        assert!(FilterState::default().route_stops(&requested).is_empty());

        let blank = FilterState {
            issues: None,
            chain_code: Some("  ".to_string()),
        };
        assert!(blank.route_stops(&requested).is_empty());

        let chained = FilterState {
            issues: None,
            chain_code: Some("482".to_string()),
        };
        assert_eq!(
            chained.route_stops(&requested),
            vec!["FR1".to_string(), "FR2".to_string()]
        );
    }

    #[test]
    fn chain_sites_are_sorted_and_unique() {
        let rows = vec![
            record("fr2", "X", None),
            record("FR1", "X", None),
            record("FR2", "Y", None),
        ];
        assert_eq!(chain_sites(&rows), vec!["FR1".to_string(), "FR2".to_string()]);
    }
}
