//! Budget Selector (C11, spec §4.11).
//!
//! Greedy selection toward a target coverage fraction, ranked by
//! entropy × coverage, with elbow detection and pattern-count bounds.

use rustc_hash::FxHashSet;

use crate::template::{SynthesizedTemplate, Variable};

/// Shannon entropy (bits) over a variable's observed payload frequencies.
/// Treats every distinct value as equally weighted by its multiplicity in
/// `raw_observed`; for the simplified pool available after C8/C9, each
/// distinct payload value is counted once, which degenerates to
/// `log2(|payload set|)` — still monotone in structural diversity, which
/// is the property spec §4.11 requires.
fn variable_entropy(variable: &Variable) -> f64 {
    let n = match variable {
        Variable::Word { values, .. } => values.len(),
        Variable::Number { start, end, step, .. } => ((((end - start) / step) + 1).max(1)) as usize,
    };
    if n <= 1 {
        0.0
    } else {
        (n as f64).log2()
    }
}

fn template_entropy(candidate: &SynthesizedTemplate) -> f64 {
    candidate.template.variables.iter().map(variable_entropy).sum()
}

/// `entropy × coverage`, the ranking score used both for greedy selection
/// here and for the final stable output order (spec §4.13).
pub fn score(candidate: &SynthesizedTemplate) -> f64 {
    template_entropy(candidate) * candidate.coverage as f64
}

/// Selects a subset of `candidates` greedily toward `target_coverage`
/// (fraction of `total_input_hosts`), bounded by `[min_patterns,
/// max_patterns]` and stopping early on two consecutive small marginal
/// coverage gains.
pub fn select(
    mut candidates: Vec<SynthesizedTemplate>,
    total_input_hosts: usize,
    target_coverage: f64,
    elbow_sensitivity: f64,
    min_patterns: usize,
    max_patterns: usize,
) -> Vec<SynthesizedTemplate> {
    candidates.sort_by(|a, b| {
        score(b)
            .partial_cmp(&score(a))
            .unwrap()
            .then_with(|| a.ratio.partial_cmp(&b.ratio).unwrap())
            .then_with(|| a.template.string.len().cmp(&b.template.string.len()))
    });

    let mut selected = Vec::new();
    let mut covered: FxHashSet<String> = FxHashSet::default();
    let mut small_gain_streak = 0usize;
    let target_count = (total_input_hosts as f64 * target_coverage).ceil() as usize;

    for candidate in candidates.into_iter() {
        if selected.len() >= max_patterns {
            break;
        }

        let before = covered.len();
        for example in &candidate.examples {
            covered.insert(example.clone());
        }
        let gain = covered.len() - before;
        let marginal_fraction = gain as f64 / total_input_hosts.max(1) as f64;

        selected.push(candidate);

        if covered.len() >= target_count && selected.len() >= min_patterns {
            break;
        }

        if marginal_fraction < elbow_sensitivity {
            small_gain_streak += 1;
            if small_gain_streak >= 2 && selected.len() >= min_patterns {
                break;
            }
        } else {
            small_gain_streak = 0;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::closure::Closure;
    use crate::dictionary::TokenDictionary;
    use crate::host::Host;
    use crate::template::synthesize;
    use crate::token::tokenize_host;

    fn synth(hosts: &[&str]) -> SynthesizedTemplate {
        let hosts: Vec<Host> = hosts.iter().map(|s| Host::parse(s).unwrap()).collect();
        let tokenized: Vec<_> = hosts.iter().map(tokenize_host).collect();
        let closure = Closure {
            members: (0..hosts.len()).collect(),
        };
        let dictionary = TokenDictionary::new();
        synthesize(&closure, &tokenized, &hosts, &dictionary).unwrap()
    }

    #[test]
    fn selection_respects_min_and_max_patterns() {
        let candidates: Vec<SynthesizedTemplate> = (0..10)
            .map(|i| {
                synth(&[
                    &format!("svc{i}-dev.example.com"),
                    &format!("svc{i}-prod.example.com"),
                ])
            })
            .collect();
        let selected = select(candidates, 20, 0.95, 0.01, 2, 5);
        assert!(selected.len() <= 5);
    }

    #[test]
    fn never_stops_below_min_patterns_when_candidates_remain() {
        let candidates: Vec<SynthesizedTemplate> = (0..10)
            .map(|i| {
                synth(&[
                    &format!("svc{i}-dev.example.com"),
                    &format!("svc{i}-prod.example.com"),
                ])
            })
            .collect();
        let selected = select(candidates, 1000, 0.99, 0.5, 5, 10);
        assert!(selected.len() >= 5);
    }

    #[test]
    fn empty_candidates_selects_nothing() {
        let selected = select(Vec::new(), 10, 0.9, 0.01, 3, 5);
        assert!(selected.is_empty());
    }
}
