//! Labor Peer Resolver
//!
//! Wage-rate comparison series: national average per year, the selected
//! state's value, and a small set of peer states resolved from an
//! injectable regional table. The resolved peer list is returned with the
//! series so chart labels come from the same lookup that built the rows.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::{smallvec, SmallVec};

use crate::record::Record;
use crate::utils::stats::mean;

const WAGE_RATE: &str = "WAGE RATE";

type PeerList = SmallVec<[String; 3]>;

/// Regional peer-state table. Injectable so new states can be added
/// without touching the resolver.
#[derive(Debug, Clone)]
pub struct PeerConfig {
    peers: FxHashMap<String, PeerList>,
    default_peers: PeerList,
}

impl PeerConfig {
    pub fn new(peers: FxHashMap<String, PeerList>, default_peers: PeerList) -> Self {
        Self {
            peers,
            default_peers,
        }
    }

    /// Peers for a state, falling back to the default set.
    pub fn peers_for(&self, state: &str) -> &[String] {
        self.peers
            .get(state)
            .map(|p| p.as_slice())
            .unwrap_or(&self.default_peers)
    }
}

impl Default for PeerConfig {
    fn default() -> Self {
        let mut peers: FxHashMap<String, PeerList> = FxHashMap::default();
        let entries: &[(&str, &[&str])] = &[
            ("IN", &["IL", "OH", "IA"]),
            ("IL", &["IN", "IA", "MO"]),
            ("IA", &["IL", "NE", "MN"]),
            ("OH", &["IN", "MI", "PA"]),
            ("NE", &["IA", "KS", "SD"]),
            ("KS", &["NE", "OK", "MO"]),
            ("MN", &["IA", "WI", "SD"]),
            ("WI", &["MN", "MI", "IL"]),
            ("CA", &["WA", "OR", "AZ"]),
            ("WA", &["OR", "CA", "ID"]),
            ("TX", &["OK", "NM", "KS"]),
            ("FL", &["GA", "AL", "SC"]),
            ("GA", &["FL", "AL", "SC"]),
            ("NC", &["SC", "VA", "GA"]),
            ("NY", &["PA", "VT", "NJ"]),
            ("PA", &["OH", "NY", "MD"]),
        ];
        for (state, list) in entries {
            peers.insert(
                (*state).to_string(),
                list.iter().map(|s| (*s).to_string()).collect(),
            );
        }
        let default_peers = smallvec!["CA".to_string(), "IA".to_string(), "TX".to_string()];
        Self {
            peers,
            default_peers,
        }
    }
}

/// One year of the wage comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaborTrendRow {
    pub year: i32,
    pub national_avg: f64,
    pub selected_state_value: Option<f64>,
    pub peer_state_values: BTreeMap<String, f64>,
}

/// Wage series plus the peer states used to build it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaborTrends {
    pub rows: Vec<LaborTrendRow>,
    pub peer_states: Vec<String>,
}

/// Build the wage-rate comparison for `selected_state`.
///
/// National average per year prefers an explicit national row; without
/// one it is the unweighted mean of state rows for that year. Years with
/// no national figure at all are dropped.
pub fn labor_trends(records: &[Record], selected_state: &str, config: &PeerConfig) -> LaborTrends {
    let peer_states: Vec<String> = config.peers_for(selected_state).to_vec();

    // Several wage-type rows can exist per state-year; collapse each
    // state-year to one averaged wage before anything else uses it.
    let mut national: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    let mut by_state: BTreeMap<i32, FxHashMap<&str, Vec<f64>>> = BTreeMap::new();
    let mut selected: FxHashMap<i32, Vec<f64>> = FxHashMap::default();
    let mut peers: FxHashMap<(i32, usize), Vec<f64>> = FxHashMap::default();

    for rec in records {
        if !rec.has_statistic(WAGE_RATE) {
            continue;
        }
        let Some(year) = rec.year else {
            continue;
        };
        let Some(value) = rec.value() else {
            continue;
        };
        if rec.is_national() {
            national.entry(year).or_default().push(value);
            continue;
        }
        let Some(state) = rec.state_code.as_deref() else {
            continue;
        };
        by_state
            .entry(year)
            .or_default()
            .entry(state)
            .or_default()
            .push(value);
        if state == selected_state {
            selected.entry(year).or_default().push(value);
        }
        if let Some(idx) = peer_states.iter().position(|p| p.as_str() == state) {
            peers.entry((year, idx)).or_default().push(value);
        }
    }

    let mut years: Vec<i32> = national.keys().chain(by_state.keys()).copied().collect();
    years.sort_unstable();
    years.dedup();

    let rows = years
        .into_iter()
        .filter_map(|year| {
            // Fallback is the unweighted mean over states, one averaged
            // wage per state, so multi-wage-type states carry no extra
            // weight.
            let national_avg = national
                .get(&year)
                .and_then(|vals| mean(vals))
                .or_else(|| {
                    let states = by_state.get(&year)?;
                    let state_means: Vec<f64> =
                        states.values().filter_map(|vals| mean(vals)).collect();
                    mean(&state_means)
                })?;
            let peer_state_values = peer_states
                .iter()
                .enumerate()
                .filter_map(|(idx, p)| {
                    let vals = peers.get(&(year, idx))?;
                    mean(vals).map(|v| (p.clone(), v))
                })
                .collect();
            Some(LaborTrendRow {
                year,
                national_avg,
                selected_state_value: selected.get(&year).and_then(|vals| mean(vals)),
                peer_state_values,
            })
        })
        .collect();

    LaborTrends { rows, peer_states }
}
