//! Adaptive Sampler (C3, spec §4.3).
//!
//! Stratified downsampling for oversize groups in FAST mode. Deterministic
//! given the group contents and a seed: the RNG is seeded from a stable
//! hash of the sorted host set combined with the caller-supplied seed, so
//! re-running with the same input and config reproduces the same sample
//! (P6).

use std::hash::{Hash, Hasher};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rustc_hash::{FxHashMap, FxHasher};

use crate::host::Host;
use crate::token::tokenize_label;

/// Runs stratified sampling over `hosts` if `hosts.len() > threshold`;
/// otherwise returns them unchanged. `seed` is mixed with a hash of the
/// group's contents so two groups with different membership never collide
/// on RNG state.
pub fn sample_group(hosts: Vec<Host>, threshold: usize, seed: u64) -> Vec<Host> {
    if hosts.len() <= threshold {
        return hosts;
    }

    let mut partitions: FxHashMap<String, Vec<Host>> = FxHashMap::default();
    for host in hosts {
        let first_level = host.levels.first().map(String::as_str).unwrap_or("");
        let first_token = tokenize_label(first_level)
            .into_iter()
            .next()
            .unwrap_or_default();
        partitions.entry(first_token).or_default().push(host);
    }

    let total: usize = partitions.values().map(Vec::len).sum();
    let mut rng = rand::rngs::StdRng::seed_from_u64(derive_seed(&partitions, seed));

    let mut keys: Vec<&String> = partitions.keys().collect();
    keys.sort();

    let mut result = Vec::new();
    for key in keys {
        let members = partitions.get(key).unwrap();
        let share = members.len() as f64 / total as f64;
        let keep = if share < 0.05 {
            members.len()
        } else if share <= 0.5 {
            ((members.len() as f64) * 0.6).ceil() as usize
        } else {
            members.len().min(200)
        };

        if keep >= members.len() {
            result.extend(members.iter().cloned());
        } else {
            let mut indices: Vec<usize> = (0..members.len()).collect();
            indices.shuffle(&mut rng);
            indices.truncate(keep);
            indices.sort_unstable();
            result.extend(indices.into_iter().map(|i| members[i].clone()));
        }
    }

    result
}

fn derive_seed(partitions: &FxHashMap<String, Vec<Host>>, seed: u64) -> u64 {
    let mut fqdns: Vec<&str> = partitions
        .values()
        .flat_map(|hosts| hosts.iter().map(|h| h.fqdn.as_str()))
        .collect();
    fqdns.sort_unstable();

    let mut hasher = FxHasher::default();
    seed.hash(&mut hasher);
    for fqdn in fqdns {
        fqdn.hash(&mut hasher);
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(s: &str) -> Host {
        Host::parse(s).unwrap()
    }

    #[test]
    fn below_threshold_is_unchanged() {
        let hosts = vec![host("a.example.com"), host("b.example.com")];
        let sampled = sample_group(hosts.clone(), 500, 0);
        assert_eq!(sampled.len(), hosts.len());
    }

    #[test]
    fn rare_partitions_keep_everything() {
        let mut hosts: Vec<Host> = (0..600)
            .map(|i| host(&format!("common{i}.example.com")))
            .collect();
        hosts.push(host("rareonly.example.com"));
        let sampled = sample_group(hosts, 500, 42);
        assert!(sampled.iter().any(|h| h.fqdn == "rareonly.example.com"));
    }

    #[test]
    fn sampling_is_deterministic_for_same_seed() {
        let hosts: Vec<Host> = (0..600)
            .map(|i| host(&format!("dominant{i}.example.com")))
            .collect();
        let a = sample_group(hosts.clone(), 500, 7);
        let b = sample_group(hosts, 500, 7);
        assert_eq!(
            a.iter().map(|h| &h.fqdn).collect::<Vec<_>>(),
            b.iter().map(|h| &h.fqdn).collect::<Vec<_>>()
        );
    }

    #[test]
    fn dominant_partition_is_capped_at_200() {
        let hosts: Vec<Host> = (0..600)
            .map(|i| host(&format!("dominant{i}.example.com")))
            .collect();
        let sampled = sample_group(hosts, 500, 1);
        assert!(sampled.len() <= 200);
    }
}
