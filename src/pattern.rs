//! The public result type (spec §3's `LearnedPattern`).

use serde::{Deserialize, Serialize};

use crate::template::{SynthesizedTemplate, Variable};

/// One learned generative template plus the metrics and payloads needed
/// to expand it downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnedPattern {
    pub id: usize,
    pub template: String,
    pub coverage: usize,
    pub ratio: f64,
    pub confidence: f64,
    pub variables: Vec<Variable>,
    pub examples: Vec<String>,
}

impl LearnedPattern {
    pub(crate) fn from_synthesized(id: usize, synthesized: SynthesizedTemplate) -> Self {
        Self {
            id,
            template: synthesized.template.string,
            coverage: synthesized.coverage,
            ratio: synthesized.ratio,
            confidence: synthesized.confidence,
            variables: synthesized.template.variables,
            examples: synthesized.examples,
        }
    }
}
