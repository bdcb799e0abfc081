//! Closure Builder (C7, spec §4.7).
//!
//! Three independent clustering strategies run per level-group and their
//! output closures are unioned before C8. All three may run on distinct
//! cores; Strategy 1's per-center loop is itself trivially parallel over a
//! read-only distance memo.

use std::collections::BTreeSet;

use rayon::prelude::*;
use rustc_hash::FxHashSet;

use crate::cancel::CancelToken;
use crate::config::{Config, ResolvedMode};
use crate::distance::DistanceMemo;
use crate::error::CoreResult;
use crate::token::{tokenize_label, TokenizedHost};
use crate::trie::PrefixTrie;

/// A set of host indices (into the owning group's host slice) produced by
/// one clustering strategy. Always size >= 2 (spec invariant #1 / P3).
#[derive(Debug, Clone)]
pub struct Closure {
    pub members: Vec<usize>,
}

impl Closure {
    fn signature(&self) -> BTreeSet<usize> {
        self.members.iter().copied().collect()
    }
}

/// Runs all three C7 strategies over one level-group and returns the
/// deduplicated union of their closures.
pub fn build_closures(
    tokenized: &[TokenizedHost],
    distances: &DistanceMemo,
    trie: &PrefixTrie,
    mode: ResolvedMode,
    config: &Config,
    cancel: &CancelToken,
) -> CoreResult<Vec<Closure>> {
    let n = tokenized.len();
    let all_indices: Vec<usize> = (0..n).collect();
    let (k_min, k_max) = config.distance_range;

    cancel.check()?;

    let strategy1 = global_k_closures(&all_indices, distances, k_min, k_max, cancel)?;

    cancel.check()?;
    let strategy2 = if config.ngram_strategy_enabled && n > config.ngram_min_group_size_for(mode) {
        ngram_prefix_closures(tokenized, distances, trie, k_min, k_max, cancel)?
    } else {
        Vec::new()
    };

    cancel.check()?;
    let strategy3 = first_token_closures(tokenized, distances, k_min, k_max, mode, config, cancel)?;

    let mut all: Vec<Closure> = Vec::new();
    all.extend(strategy1);
    all.extend(strategy2);
    all.extend(strategy3);
    Ok(dedup_closures(all))
}

/// Strategy 1 — global-k. For every center `a` and every `k` in
/// `[k_min, k_max]`, the closure `{a} ∪ {b | dist(a,b) < k}`. Not
/// transitive by design.
fn global_k_closures(
    indices: &[usize],
    distances: &DistanceMemo,
    k_min: usize,
    k_max: usize,
    cancel: &CancelToken,
) -> CoreResult<Vec<Closure>> {
    cancel.check()?;
    let closures: Vec<Closure> = indices
        .par_iter()
        .flat_map(|&center| {
            (k_min..=k_max)
                .map(|k| {
                    let mut members: Vec<usize> = indices
                        .iter()
                        .copied()
                        .filter(|&other| other == center || distances.distance(center, other) < k)
                        .collect();
                    members.sort_unstable();
                    Closure { members }
                })
                .collect::<Vec<_>>()
        })
        .collect();
    Ok(closures.into_iter().filter(|c| c.members.len() >= 2).collect())
}

/// Strategy 2 — n-gram prefix anchoring. Candidate prefixes are the
/// distinct 2-gram and 3-gram prefixes of every group subdomain string,
/// excluding those starting with `-`. The redundancy filter tracks the
/// last prefix that produced at least one closure; a proper extension of
/// that prefix is skipped, approximating "already emitted an accepted
/// template at this level" without forward-referencing C8/C9.
fn ngram_prefix_closures(
    tokenized: &[TokenizedHost],
    distances: &DistanceMemo,
    trie: &PrefixTrie,
    k_min: usize,
    k_max: usize,
    cancel: &CancelToken,
) -> CoreResult<Vec<Closure>> {
    let labels: Vec<String> = tokenized
        .iter()
        .map(|h| h.levels.iter().map(|l| l.label.as_str()).collect::<Vec<_>>().join("."))
        .collect();

    let mut candidates: BTreeSet<String> = BTreeSet::new();
    for label in &labels {
        for len in [2usize, 3usize] {
            if label.chars().count() >= len {
                let prefix: String = label.chars().take(len).collect();
                if !prefix.starts_with('-') {
                    candidates.insert(prefix);
                }
            }
        }
    }

    let mut result = Vec::new();
    let mut last_accepted: Option<String> = None;
    for prefix in candidates {
        cancel.check()?;
        if let Some(last) = &last_accepted {
            if prefix.starts_with(last.as_str()) && &prefix != last {
                continue;
            }
        }

        let subset = trie.keys_with_prefix(&prefix);
        if subset.len() < 2 {
            continue;
        }
        let closures = global_k_closures(&subset, distances, k_min, k_max, cancel)?;
        if !closures.is_empty() {
            last_accepted = Some(prefix);
            result.extend(closures);
        }
    }
    Ok(result)
}

/// Strategy 3 — first-token partitioning. In FAST mode, only the largest
/// `config.token_group_cap` partitions (by host count) are kept.
fn first_token_closures(
    tokenized: &[TokenizedHost],
    distances: &DistanceMemo,
    k_min: usize,
    k_max: usize,
    mode: ResolvedMode,
    config: &Config,
    cancel: &CancelToken,
) -> CoreResult<Vec<Closure>> {
    let mut partitions: rustc_hash::FxHashMap<String, Vec<usize>> = rustc_hash::FxHashMap::default();
    for (idx, host) in tokenized.iter().enumerate() {
        let first_token = host
            .levels
            .first()
            .and_then(|level| level.tokens.first())
            .cloned()
            .unwrap_or_default();
        partitions.entry(first_token).or_default().push(idx);
    }

    let mut groups: Vec<Vec<usize>> = partitions.into_values().collect();
    if matches!(mode, ResolvedMode::Fast) && groups.len() > config.token_group_cap {
        groups.sort_by_key(|g| std::cmp::Reverse(g.len()));
        groups.truncate(config.token_group_cap);
    }

    let mut result = Vec::new();
    for partition in groups {
        cancel.check()?;
        if partition.len() < 2 {
            continue;
        }
        result.extend(global_k_closures(&partition, distances, k_min, k_max, cancel)?);
    }
    Ok(result)
}

fn dedup_closures(closures: Vec<Closure>) -> Vec<Closure> {
    let mut seen: FxHashSet<BTreeSet<usize>> = FxHashSet::default();
    let mut result = Vec::new();
    for closure in closures {
        let signature = closure.signature();
        if seen.insert(signature) {
            result.push(closure);
        }
    }
    result
}

/// Exposed for strategy 3's partitioning; re-tokenizes just the first
/// label, matching [`crate::token::tokenize_label`]'s rule.
pub fn first_token_of(label: &str) -> String {
    tokenize_label(label).into_iter().next().unwrap_or_default()
}
