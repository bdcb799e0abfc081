//! Input Filter (C1, spec §4.1).
//!
//! Drops wildcards, unparseable names, and bare roots. Rejections are data
//! decisions, logged via `tracing`, never propagated as errors.

use tracing::debug;

use crate::host::Host;

/// Filters raw hostnames down to valid, subdomain-bearing [`Host`]s.
///
/// Rejected in order: empty strings, `*.`-prefixed wildcards, names the
/// public-suffix list cannot parse, and names equal to their own eTLD+1.
/// [`Host::parse`] already rejects the last two cases, so only the
/// wildcard check happens here.
pub fn filter_hosts(raw: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<Host> {
    let mut hosts = Vec::new();
    for entry in raw {
        let raw = entry.as_ref();
        if raw.trim().is_empty() {
            debug!(host = raw, "dropping empty host");
            continue;
        }
        if raw.trim_start().starts_with("*.") {
            debug!(host = raw, "dropping wildcard host");
            continue;
        }
        match Host::parse(raw) {
            Some(host) => hosts.push(host),
            None => debug!(host = raw, "dropping unparseable or bare-root host"),
        }
    }
    hosts
}
