//! Host parsing and level derivation (spec §3 / §4.1).
//!
//! A [`Host`] is a fully-qualified, lowercased DNS name split into its
//! registrable root (eTLD+1, via the compiled-in public suffix list) and
//! the subdomain labels above it. Derivation is pure and allocation-only —
//! `psl`'s list is compiled into the binary, so there is no I/O at lookup
//! time, matching the no-I/O core this crate is built around.

use smallvec::SmallVec;

/// A parsed subdomain observation.
///
/// `levels[0]` is the leftmost (most specific) label of the subdomain
/// portion, e.g. for `api.eu.example.com` with root `example.com`,
/// `levels == ["api", "eu"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Host {
    pub fqdn: String,
    pub root: String,
    pub subdomain: String,
    pub levels: SmallVec<[String; 4]>,
}

impl Host {
    /// Parses a raw observed hostname. Returns `None` when the name has no
    /// subdomain labels above its registrable root (bare apex) or when the
    /// public suffix list cannot identify a root at all — both are filtered
    /// out by [`crate::filter`], not treated as errors.
    pub fn parse(raw: &str) -> Option<Self> {
        let fqdn = raw.trim().trim_end_matches('.').to_ascii_lowercase();
        if fqdn.is_empty() {
            return None;
        }

        let domain = psl::domain(fqdn.as_bytes())?;
        let root = std::str::from_utf8(domain.as_bytes()).ok()?.to_string();

        let subdomain = fqdn.strip_suffix(&root)?.trim_end_matches('.').to_string();
        if subdomain.is_empty() {
            return None;
        }

        let levels: SmallVec<[String; 4]> = subdomain
            .split('.')
            .map(|s| s.to_string())
            .collect();

        Some(Host {
            fqdn,
            root,
            subdomain,
            levels,
        })
    }

    /// Number of subdomain labels (spec's "level count").
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_label_subdomain_parses() {
        let host = Host::parse("api.example.com").unwrap();
        assert_eq!(host.root, "example.com");
        assert_eq!(host.subdomain, "api");
        assert_eq!(host.levels.as_slice(), ["api"]);
    }

    #[test]
    fn multi_label_subdomain_orders_leftmost_first() {
        let host = Host::parse("api.eu.example.com").unwrap();
        assert_eq!(host.root, "example.com");
        assert_eq!(host.levels.as_slice(), ["api", "eu"]);
    }

    #[test]
    fn bare_apex_is_rejected() {
        assert!(Host::parse("example.com").is_none());
    }

    #[test]
    fn trailing_dot_and_case_are_normalized() {
        let host = Host::parse("API.Example.COM.").unwrap();
        assert_eq!(host.fqdn, "api.example.com");
        assert_eq!(host.root, "example.com");
    }

    #[test]
    fn unparseable_junk_is_rejected() {
        assert!(Host::parse("").is_none());
        assert!(Host::parse("   ").is_none());
    }
}
