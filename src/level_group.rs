//! Level Grouper (C2, spec §4.2).
//!
//! Partitions hosts by subdomain-label depth so alignment in C8 never mixes
//! structurally different shapes. Singleton groups are dropped: a group of
//! one host can never form a closure (size >= 2 is required, spec invariant
//! #1 / P3).

use rustc_hash::FxHashMap;

use crate::host::Host;

/// One depth-partition of the input.
#[derive(Debug, Clone)]
pub struct LevelGroup {
    pub level_count: usize,
    pub hosts: Vec<Host>,
}

/// Groups hosts by `level_count`, dropping groups of size 1. Order of the
/// returned groups is by ascending `level_count` for determinism (P6).
pub fn group_by_level(hosts: Vec<Host>) -> Vec<LevelGroup> {
    let mut by_level: FxHashMap<usize, Vec<Host>> = FxHashMap::default();
    for host in hosts {
        by_level.entry(host.level_count()).or_default().push(host);
    }

    let mut groups: Vec<LevelGroup> = by_level
        .into_iter()
        .filter(|(_, hosts)| hosts.len() >= 2)
        .map(|(level_count, hosts)| LevelGroup { level_count, hosts })
        .collect();

    groups.sort_by_key(|g| g.level_count);
    groups
}
