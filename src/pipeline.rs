//! Orchestrator (C13, spec §4.13) and the crate's public entry point.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::budget;
use crate::cancel::CancelToken;
use crate::closure::build_closures;
use crate::config::Config;
use crate::consolidate;
use crate::dictionary::TokenDictionary;
use crate::distance::DistanceMemo;
use crate::enrich;
use crate::error::CoreResult;
use crate::filter::filter_hosts;
use crate::host::Host;
use crate::level_group::{group_by_level, LevelGroup};
use crate::pattern::LearnedPattern;
use crate::quality::filter_templates;
use crate::sampler::sample_group;
use crate::template::{synthesize, SynthesizedTemplate};
use crate::token::tokenize_host;
use crate::trie::PrefixTrie;

/// Learns a small set of generative templates from a set of observed
/// subdomains. Pure function of `(hosts, config, dictionary)`: running it
/// twice on the same input produces an identical result (P6).
///
/// Equivalent to [`learn_patterns_cancellable`] with a token that is never
/// cancelled.
pub fn learn_patterns(
    raw_hosts: &[impl AsRef<str>],
    config: &Config,
    dictionary: Option<&TokenDictionary>,
) -> CoreResult<Vec<LearnedPattern>> {
    learn_patterns_cancellable(raw_hosts, config, dictionary, &CancelToken::new())
}

/// Same as [`learn_patterns`] but checks `cancel` at stage boundaries,
/// between groups, between C7 strategies, and between C10's AP trials,
/// aborting with [`crate::error::CoreError::Cancelled`] and discarding
/// partial results.
pub fn learn_patterns_cancellable(
    raw_hosts: &[impl AsRef<str>],
    config: &Config,
    dictionary: Option<&TokenDictionary>,
    cancel: &CancelToken,
) -> CoreResult<Vec<LearnedPattern>> {
    config.validate()?;
    cancel.check()?;

    let empty_dictionary = TokenDictionary::new();
    let dictionary = dictionary.unwrap_or(&empty_dictionary);

    let hosts = filter_hosts(raw_hosts);
    if hosts.is_empty() {
        info!("all input hosts were filtered out, returning empty pattern list");
        return Ok(Vec::new());
    }

    let mode = config.mode.resolve(hosts.len());
    debug!(?mode, filtered = hosts.len(), "resolved orchestration mode");

    let groups = group_by_level(hosts);
    if groups.is_empty() {
        info!("no level-group had two or more hosts, returning empty pattern list");
        return Ok(Vec::new());
    }

    let total_filtered: usize = groups.iter().map(|g| g.hosts.len()).sum();

    let sampler_threshold = config.group_sample_max;
    let per_group: Vec<Vec<SynthesizedTemplate>> = groups
        .into_par_iter()
        .map(|group| process_group(group, mode, config, dictionary, sampler_threshold, cancel))
        .collect::<CoreResult<Vec<_>>>()?;

    cancel.check()?;
    let merged: Vec<SynthesizedTemplate> = per_group.into_iter().flatten().collect();
    debug!(candidates = merged.len(), "synthesized candidate templates");

    let accepted = filter_templates(merged, mode, config);
    if accepted.is_empty() {
        return Ok(Vec::new());
    }

    cancel.check()?;
    let consolidated = consolidate::consolidate(
        accepted,
        config.max_patterns_for(mode),
        config.ap_iterations_for(mode),
        cancel,
    )?;

    cancel.check()?;
    let selected = budget::select(
        consolidated,
        total_filtered,
        config.target_coverage_for(mode),
        config.elbow_sensitivity_for(mode),
        config.min_patterns_for(mode),
        config.max_patterns_for(mode),
    );

    let mut enriched = enrich::enrich(selected, config.enrichment_rate_for(mode));
    enriched.sort_by(|a, b| {
        budget::score(b)
            .partial_cmp(&budget::score(a))
            .unwrap()
            .then_with(|| a.template.string.cmp(&b.template.string))
    });

    let patterns = enriched
        .into_iter()
        .enumerate()
        .map(|(id, synthesized)| LearnedPattern::from_synthesized(id, synthesized))
        .collect();

    Ok(patterns)
}

/// Runs C3 through C8 for one level-group, returning its synthesized
/// candidate templates.
fn process_group(
    group: LevelGroup,
    mode: crate::config::ResolvedMode,
    config: &Config,
    dictionary: &TokenDictionary,
    sampler_threshold: usize,
    cancel: &CancelToken,
) -> CoreResult<Vec<SynthesizedTemplate>> {
    cancel.check()?;

    let hosts: Vec<Host> = if mode.sampler_enabled() {
        sample_group(group.hosts, sampler_threshold, config.seed)
    } else {
        group.hosts
    };
    if hosts.len() < 2 {
        return Ok(Vec::new());
    }

    let tokenized = hosts.iter().map(tokenize_host).collect::<Vec<_>>();
    let distances = DistanceMemo::new(&hosts);
    let trie = PrefixTrie::build(
        hosts
            .iter()
            .enumerate()
            .map(|(i, h)| (i, h.subdomain.clone())),
    );

    let closures = build_closures(&tokenized, &distances, &trie, mode, config, cancel)?;

    let synthesized: Vec<SynthesizedTemplate> = closures
        .iter()
        .filter_map(|closure| synthesize(closure, &tokenized, &hosts, dictionary))
        .collect();

    Ok(synthesized)
}
