//! Pipeline configuration (spec §6.2).
//!
//! Mirrors the teacher's `MatcherConfig` shape: a plain `Default` struct
//! with typed knobs and builder methods, no environment-variable loading.
//! The core never reads the environment — configuration always arrives as
//! a value from the caller.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Selects the per-mode default parameter table (spec §4.13).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Thorough,
    Balanced,
    Fast,
    /// Chosen by input size at orchestration time: `<100 -> Thorough`,
    /// `100..1000 -> Balanced`, `>1000 -> Fast`.
    Auto,
}

impl Mode {
    /// Resolves `Auto` by filtered input size; other modes are identity.
    pub fn resolve(self, filtered_host_count: usize) -> ResolvedMode {
        match self {
            Mode::Thorough => ResolvedMode::Thorough,
            Mode::Balanced => ResolvedMode::Balanced,
            Mode::Fast => ResolvedMode::Fast,
            Mode::Auto => {
                if filtered_host_count < 100 {
                    ResolvedMode::Thorough
                } else if filtered_host_count < 1000 {
                    ResolvedMode::Balanced
                } else {
                    ResolvedMode::Fast
                }
            }
        }
    }
}

/// `Mode` with `Auto` already resolved; every other component matches on
/// this rather than re-deriving the size threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedMode {
    Thorough,
    Balanced,
    Fast,
}

impl ResolvedMode {
    pub fn max_ratio(self) -> f64 {
        match self {
            ResolvedMode::Thorough => 18.0,
            ResolvedMode::Balanced => 15.0,
            ResolvedMode::Fast => 12.0,
        }
    }

    pub fn max_patterns(self) -> usize {
        match self {
            ResolvedMode::Thorough => 30,
            ResolvedMode::Balanced => 25,
            ResolvedMode::Fast => 20,
        }
    }

    pub fn min_patterns(self) -> usize {
        match self {
            ResolvedMode::Thorough => 8,
            ResolvedMode::Balanced => 5,
            ResolvedMode::Fast => 3,
        }
    }

    pub fn target_coverage(self) -> f64 {
        match self {
            ResolvedMode::Thorough => 0.95,
            ResolvedMode::Balanced => 0.90,
            ResolvedMode::Fast => 0.85,
        }
    }

    pub fn elbow_sensitivity(self) -> f64 {
        match self {
            ResolvedMode::Thorough => 0.01,
            ResolvedMode::Balanced => 0.02,
            ResolvedMode::Fast => 0.03,
        }
    }

    pub fn ap_iterations(self) -> usize {
        match self {
            ResolvedMode::Thorough => 12,
            ResolvedMode::Balanced => 10,
            ResolvedMode::Fast => 6,
        }
    }

    pub fn enrichment_rate(self) -> f64 {
        match self {
            ResolvedMode::Thorough => 0.80,
            ResolvedMode::Balanced => 0.50,
            ResolvedMode::Fast => 0.50,
        }
    }

    /// Strategy 2 (n-gram prefix anchoring) group-size gate. Disabled
    /// entirely in Thorough mode (spec §4.7 enables it only in
    /// Balanced/Fast).
    pub fn ngram_min_group_size(self) -> usize {
        match self {
            ResolvedMode::Thorough => usize::MAX,
            ResolvedMode::Balanced => 200,
            ResolvedMode::Fast => 100,
        }
    }

    pub fn sampler_enabled(self) -> bool {
        matches!(self, ResolvedMode::Fast)
    }
}

/// Top-level pipeline configuration (spec §6.2). Construct with
/// `Config::default()` then override via the builder methods, mirroring
/// `MatcherConfig::new().with_match_kind(..)` in the teacher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub mode: Mode,
    pub target_coverage: Option<f64>,
    pub min_patterns: Option<usize>,
    pub max_patterns: Option<usize>,
    pub elbow_sensitivity: Option<f64>,
    pub distance_range: (usize, usize),
    pub absolute_threshold: usize,
    pub max_ratio: Option<f64>,
    pub ap_iterations: Option<usize>,
    pub enrichment_rate: Option<f64>,
    pub ngram_strategy_enabled: bool,
    pub ngram_min_group_size: Option<usize>,
    pub token_group_cap: usize,
    pub group_sample_max: usize,
    pub max_template_length: usize,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::Auto,
            target_coverage: None,
            min_patterns: None,
            max_patterns: None,
            elbow_sensitivity: None,
            distance_range: (1, 3),
            absolute_threshold: 500,
            max_ratio: None,
            ap_iterations: None,
            enrichment_rate: None,
            ngram_strategy_enabled: true,
            ngram_min_group_size: None,
            token_group_cap: 30,
            group_sample_max: 500,
            max_template_length: 1000,
            seed: 0,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_target_coverage(mut self, fraction: f64) -> Self {
        self.target_coverage = Some(fraction);
        self
    }

    pub fn with_pattern_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_patterns = Some(min);
        self.max_patterns = Some(max);
        self
    }

    pub fn with_distance_range(mut self, k_min: usize, k_max: usize) -> Self {
        self.distance_range = (k_min, k_max);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validates cross-field invariants, surfacing `CoreError::Config` for
    /// the cases spec §6.5 names. Called once at the top of
    /// [`crate::learn_patterns`].
    pub fn validate(&self) -> CoreResult<()> {
        let (k_min, k_max) = self.distance_range;
        if k_min == 0 || k_min > k_max {
            return Err(CoreError::Config(format!(
                "distance_range must be a non-empty interval of positive integers, got ({k_min}, {k_max})"
            )));
        }
        if self.absolute_threshold == 0 {
            return Err(CoreError::Config(
                "absolute_threshold must be positive".into(),
            ));
        }
        if let Some(ratio) = self.max_ratio {
            if ratio <= 0.0 {
                return Err(CoreError::Config("max_ratio must be positive".into()));
            }
        }
        if let Some(fraction) = self.target_coverage {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(CoreError::Config(
                    "target_coverage must be in (0, 1]".into(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_patterns, self.max_patterns) {
            if min > max {
                return Err(CoreError::Config(format!(
                    "min_patterns ({min}) exceeds max_patterns ({max})"
                )));
            }
        }
        if let Some(rate) = self.enrichment_rate {
            if !(0.0..=1.0).contains(&rate) {
                return Err(CoreError::Config("enrichment_rate must be in [0, 1]".into()));
            }
        }
        if self.max_template_length == 0 {
            return Err(CoreError::Config(
                "max_template_length must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn max_ratio_for(&self, mode: ResolvedMode) -> f64 {
        self.max_ratio.unwrap_or_else(|| mode.max_ratio())
    }

    pub fn max_patterns_for(&self, mode: ResolvedMode) -> usize {
        self.max_patterns.unwrap_or_else(|| mode.max_patterns())
    }

    pub fn min_patterns_for(&self, mode: ResolvedMode) -> usize {
        self.min_patterns.unwrap_or_else(|| mode.min_patterns())
    }

    pub fn target_coverage_for(&self, mode: ResolvedMode) -> f64 {
        self.target_coverage.unwrap_or_else(|| mode.target_coverage())
    }

    pub fn elbow_sensitivity_for(&self, mode: ResolvedMode) -> f64 {
        self.elbow_sensitivity
            .unwrap_or_else(|| mode.elbow_sensitivity())
    }

    pub fn ap_iterations_for(&self, mode: ResolvedMode) -> usize {
        self.ap_iterations.unwrap_or_else(|| mode.ap_iterations())
    }

    pub fn enrichment_rate_for(&self, mode: ResolvedMode) -> f64 {
        self.enrichment_rate
            .unwrap_or_else(|| mode.enrichment_rate())
    }

    pub fn ngram_min_group_size_for(&self, mode: ResolvedMode) -> usize {
        self.ngram_min_group_size
            .unwrap_or_else(|| mode.ngram_min_group_size())
    }
}
