//! Quality Filter (C9, spec §4.9).
//!
//! Rejects over-broad templates by a ratio/absolute-threshold test and by
//! assembled-string length. Rejections are silent data decisions, not
//! errors (spec §7): P8 requires no accepted template to ever violate the
//! ratio+threshold conjunction.

use crate::config::{Config, ResolvedMode};
use crate::template::SynthesizedTemplate;

/// `true` if `candidate` should be kept.
pub fn accepts(candidate: &SynthesizedTemplate, mode: ResolvedMode, config: &Config) -> bool {
    let max_ratio = config.max_ratio_for(mode);
    let over_broad =
        candidate.possible_generations >= config.absolute_threshold as u64 && candidate.ratio >= max_ratio;
    if over_broad {
        return false;
    }
    candidate.template.string.chars().count() <= config.max_template_length
}

pub fn filter_templates(
    candidates: Vec<SynthesizedTemplate>,
    mode: ResolvedMode,
    config: &Config,
) -> Vec<SynthesizedTemplate> {
    candidates
        .into_iter()
        .filter(|c| accepts(c, mode, config))
        .collect()
}
