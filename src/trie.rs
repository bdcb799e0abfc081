//! Prefix Trie (C6, spec §4.6).
//!
//! Built once per level-group from the group's subdomain strings. Backs
//! Strategy 2 (n-gram prefix anchoring) and Strategy 3 (first-token
//! partitioning) in C7.

use radix_trie::{Trie, TrieCommon};

/// Maps subdomain strings to their index in the owning group's host slice.
pub struct PrefixTrie {
    trie: Trie<String, usize>,
}

impl PrefixTrie {
    pub fn build(subdomains: impl IntoIterator<Item = (usize, impl Into<String>)>) -> Self {
        let mut trie = Trie::new();
        for (index, subdomain) in subdomains {
            trie.insert(subdomain.into(), index);
        }
        Self { trie }
    }

    /// All host indices whose subdomain string has `prefix` as a prefix.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<usize> {
        match self.trie.get_raw_descendant(prefix) {
            Some(subtrie) => subtrie.values().copied().collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_lookup_finds_matching_entries() {
        let trie = PrefixTrie::build(vec![
            (0, "api-dev"),
            (1, "api-prod"),
            (2, "web-dev"),
        ]);
        let mut matches = trie.keys_with_prefix("api");
        matches.sort_unstable();
        assert_eq!(matches, vec![0, 1]);
    }

    #[test]
    fn unmatched_prefix_returns_empty() {
        let trie = PrefixTrie::build(vec![(0, "api-dev")]);
        assert!(trie.keys_with_prefix("zzz").is_empty());
    }

    #[test]
    fn exact_prefix_matches_itself() {
        let trie = PrefixTrie::build(vec![(0, "api")]);
        assert_eq!(trie.keys_with_prefix("api"), vec![0]);
    }
}
