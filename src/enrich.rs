//! Enricher (C12, spec §4.12).
//!
//! Marks variables optional in a mode-dependent fraction of selected
//! templates by adding `""` to their payload sets. Selection is
//! deterministic (first-N by arrival order, which is already the score
//! order produced by C11). Number variables are never touched.

use crate::template::{SynthesizedTemplate, Variable};

/// Enriches the first `ceil(rate * templates.len())` templates in place.
pub fn enrich(mut templates: Vec<SynthesizedTemplate>, rate: f64) -> Vec<SynthesizedTemplate> {
    let enrich_count = ((templates.len() as f64) * rate).ceil() as usize;
    for candidate in templates.iter_mut().take(enrich_count) {
        for variable in candidate.template.variables.iter_mut() {
            if let Variable::Word { values, .. } = variable {
                if !values.iter().any(String::is_empty) {
                    values.push(String::new());
                }
            }
        }
        candidate.possible_generations = candidate
            .template
            .variables
            .iter()
            .map(Variable::possible_generations)
            .product::<u64>()
            .max(1);
        candidate.ratio = candidate.possible_generations as f64 / candidate.coverage.max(1) as f64;
    }
    templates
}
