//! Template Synthesizer (C8, spec §4.8).
//!
//! Turns one closure into a structural template plus per-variable payload
//! sets, inferring number ranges and semantic names where possible.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::closure::Closure;
use crate::dictionary::TokenDictionary;
use crate::host::Host;
use crate::token::TokenizedHost;

/// A single placeholder in a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Variable {
    Word {
        name: String,
        values: Vec<String>,
    },
    Number {
        name: String,
        start: i64,
        end: i64,
        step: i64,
        format: String,
        dashed: bool,
    },
}

impl Variable {
    pub fn name(&self) -> &str {
        match self {
            Variable::Word { name, .. } => name,
            Variable::Number { name, .. } => name,
        }
    }

    /// `|payload set|`; for `Number`, `(end - start) / step + 1`.
    pub fn possible_generations(&self) -> u64 {
        match self {
            Variable::Word { values, .. } => values.len() as u64,
            Variable::Number {
                start, end, step, ..
            } => (((end - start) / step) + 1) as u64,
        }
    }

    fn placeholder(&self) -> String {
        format!("{{{{{}}}}}", self.name())
    }
}

/// One rendered position in a level: either fixed text or a reference to
/// `variables[index]`.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    Literal(String),
    Var(usize),
}

#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub slots: Vec<Slot>,
}

/// A structural template: the DSL string plus enough layout to compute
/// quality metrics (C9) and structural similarity (C10) later.
#[derive(Debug, Clone)]
pub struct Template {
    pub levels: Vec<LevelLayout>,
    pub variables: Vec<Variable>,
    pub string: String,
}

impl Template {
    /// `literal vs. variable-slot` sequence across all levels, used by C10.
    pub fn token_type_sequence(&self) -> Vec<bool> {
        self.levels
            .iter()
            .flat_map(|level| {
                level.slots.iter().map(|slot| matches!(slot, Slot::Var(_)))
            })
            .collect()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }
}

/// Output of synthesizing one closure: the template plus the metrics C9
/// and C11 need.
pub struct SynthesizedTemplate {
    pub template: Template,
    pub coverage: usize,
    pub possible_generations: u64,
    pub ratio: f64,
    pub confidence: f64,
    pub examples: Vec<String>,
}

/// Small constant controlling how quickly confidence saturates with
/// coverage (spec §4.8).
const TARGET_COVERAGE_COUNT: f64 = 3.0;

struct RawSlot {
    observed: Vec<String>,
    optional: bool,
}

/// Synthesizes a template from one closure. Returns `None` only if the
/// closure is degenerate (fewer than 2 members); callers should already
/// guarantee this via C7's size invariant.
pub fn synthesize(
    closure: &Closure,
    tokenized: &[TokenizedHost],
    hosts: &[Host],
    dictionary: &TokenDictionary,
) -> Option<SynthesizedTemplate> {
    let members = &closure.members;
    if members.len() < 2 {
        return None;
    }
    let closure_size = members.len();
    let level_count = tokenized[members[0]].levels.len();

    let mut levels: Vec<LevelLayout> = Vec::with_capacity(level_count);
    let mut variables: Vec<Variable> = Vec::new();

    let mut p_counter = 0usize;
    let mut n_counter = 0usize;

    for level_idx in 0..level_count {
        let members_with_level = members
            .iter()
            .filter(|&&m| level_idx < tokenized[m].levels.len())
            .count();
        let level_optional = members_with_level < closure_size;

        let max_positions = members
            .iter()
            .map(|&m| {
                tokenized[m]
                    .levels
                    .get(level_idx)
                    .map(|l| l.tokens.len())
                    .unwrap_or(0)
            })
            .max()
            .unwrap_or(0);

        let mut slots = Vec::with_capacity(max_positions);

        for pos in 0..max_positions {
            let mut present: Vec<&str> = Vec::new();
            for &m in members {
                if let Some(level) = tokenized[m].levels.get(level_idx) {
                    if let Some(token) = level.tokens.get(pos) {
                        present.push(token.as_str());
                    }
                }
            }

            let all_equal = present.len() == closure_size
                && present.windows(2).all(|w| w[0] == w[1]);

            if all_equal && !level_optional {
                slots.push(Slot::Literal(present[0].to_string()));
                continue;
            }

            let optional = present.len() < closure_size || level_optional;
            let raw = RawSlot {
                observed: present.into_iter().map(str::to_string).collect(),
                optional,
            };

            let built = build_variable(raw, dictionary, &mut p_counter, &mut n_counter);
            if built.split_leading_dash {
                slots.push(Slot::Literal("-".to_string()));
            }
            let index = variables.len();
            variables.push(built.variable);
            slots.push(Slot::Var(index));
        }

        levels.push(LevelLayout { slots });
    }

    let string = assemble_string(&levels, &variables);

    let possible_generations: u64 = variables
        .iter()
        .map(Variable::possible_generations)
        .product::<u64>()
        .max(1);
    let coverage = closure_size;
    let ratio = possible_generations as f64 / coverage as f64;

    let total_positions: usize = levels.iter().map(|l| l.slots.len()).sum();
    let static_positions = levels
        .iter()
        .flat_map(|l| l.slots.iter())
        .filter(|s| matches!(s, Slot::Literal(_)))
        .count();
    let optional_var_positions = levels
        .iter()
        .flat_map(|l| l.slots.iter())
        .filter(|s| matches!(s, Slot::Var(idx) if is_optional(&variables[*idx])))
        .count();

    let confidence = if total_positions == 0 {
        0.0
    } else {
        let structure_term =
            (static_positions as f64 - optional_var_positions as f64 * 0.5) / total_positions as f64;
        let coverage_term = 1.0_f64.min(coverage as f64 / TARGET_COVERAGE_COUNT);
        (structure_term * coverage_term).clamp(0.0, 1.0)
    };

    let examples = members.iter().map(|&m| hosts[m].fqdn.clone()).collect();

    Some(SynthesizedTemplate {
        template: Template {
            levels,
            variables,
            string,
        },
        coverage,
        possible_generations,
        ratio,
        confidence,
        examples,
    })
}

fn is_optional(variable: &Variable) -> bool {
    match variable {
        Variable::Word { values, .. } => values.iter().any(String::is_empty),
        Variable::Number { .. } => false,
    }
}

/// A synthesized variable plus whether a literal `-` must be emitted as
/// its own slot immediately before it.
struct BuiltVariable {
    variable: Variable,
    split_leading_dash: bool,
}

fn build_variable(
    raw: RawSlot,
    dictionary: &TokenDictionary,
    p_counter: &mut usize,
    n_counter: &mut usize,
) -> BuiltVariable {
    // Number promotion only for non-optional slots (§4.8): an optional
    // numeric-looking slot stays a Word variable so the "" marker can be
    // represented without breaking the number format's exact-reproduction
    // invariant.
    if !raw.optional {
        if let Some((start, end, step, format, dashed)) = infer_number(&raw.observed) {
            let name = format!("n{n_counter}");
            *n_counter += 1;
            // C4's tokenizer glues a leading "-" onto an all-digit
            // fragment as one token (e.g. "-01"). That dash is always
            // structurally uniform across the closure at this point (the
            // number promotion already required identical dash presence
            // on every member), so it renders more naturally as a
            // literal character immediately before the placeholder than
            // folded into the variable's own format string. The dashed
            // case from §4.8's prose is represented here by always
            // splitting rather than emitting a `-%0Nd` format.
            return BuiltVariable {
                variable: Variable::Number {
                    name,
                    start,
                    end,
                    step,
                    format,
                    dashed: false,
                },
                split_leading_dash: dashed,
            };
        }
    }

    let mut values: Vec<String> = Vec::new();
    for v in &raw.observed {
        if !values.contains(v) {
            values.push(v.clone());
        }
    }
    if raw.optional && !values.iter().any(String::is_empty) {
        values.push(String::new());
    }

    let category = dictionary.category_for_all(values.iter().filter(|v| !v.is_empty()).map(|v| {
        v.strip_prefix('-').unwrap_or(v.as_str())
    }));
    let name = match category {
        Some(cat) => cat.to_string(),
        None => format!("p{p_counter}"),
    };
    *p_counter += 1;

    BuiltVariable {
        variable: Variable::Word { name, values },
        split_leading_dash: false,
    }
}

/// Detects a number variable: every observed value is (optional leading
/// `-`) plus a pure digit run, and the inferred zero-pad format
/// reproduces each value exactly.
fn infer_number(observed: &[String]) -> Option<(i64, i64, i64, String, bool)> {
    if observed.is_empty() {
        return None;
    }

    let mut dashed: Option<bool> = None;
    let mut digits: Vec<&str> = Vec::with_capacity(observed.len());

    for value in observed {
        let (is_dashed, digit_str) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value.as_str()),
        };
        if digit_str.is_empty() || !digit_str.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        match dashed {
            None => dashed = Some(is_dashed),
            Some(d) if d != is_dashed => return None,
            _ => {}
        }
        digits.push(digit_str);
    }

    let dashed = dashed.unwrap_or(false);
    let width = digits.iter().map(|d| d.len()).max()?;

    let values: Vec<i64> = digits.iter().map(|d| d.parse().ok()).collect::<Option<_>>()?;
    let min = *values.iter().min()?;
    let max = *values.iter().max()?;

    // The caller always renders a leading dash as a preceding literal
    // slot rather than folding it into the format string; see
    // `build_variable`.
    let format = format!("%0{width}d");

    for digit_str in &digits {
        let value: i64 = digit_str.parse().ok()?;
        let rendered = format!("{value:0width$}", width = width);
        if &rendered != digit_str {
            return None;
        }
    }

    let start = (min - 1).max(0);
    let end = max + 1;
    Some((start, end, 1, format, dashed))
}

fn assemble_string(levels: &[LevelLayout], variables: &[Variable]) -> String {
    let rendered_levels: Vec<String> = levels
        .iter()
        .map(|level| {
            level
                .slots
                .iter()
                .map(|slot| match slot {
                    Slot::Literal(text) => text.clone(),
                    Slot::Var(idx) => variables[*idx].placeholder(),
                })
                .collect::<Vec<_>>()
                .join("")
        })
        .collect();

    let mut string = rendered_levels.join(".");
    string.push_str(".{{root}}");
    string
}

#[allow(dead_code)]
fn distinct_names(variables: &[Variable]) -> FxHashSet<&str> {
    variables.iter().map(Variable::name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize_host;

    fn setup(hosts: &[&str]) -> (Vec<Host>, Vec<TokenizedHost>) {
        let hosts: Vec<Host> = hosts.iter().map(|s| Host::parse(s).unwrap()).collect();
        let tokenized = hosts.iter().map(tokenize_host).collect();
        (hosts, tokenized)
    }

    #[test]
    fn simple_service_env_template() {
        let (hosts, tokenized) = setup(&[
            "api-dev.example.com",
            "api-prod.example.com",
            "api-staging.example.com",
            "web-dev.example.com",
            "web-prod.example.com",
        ]);
        let closure = Closure {
            members: (0..hosts.len()).collect(),
        };
        let dictionary = TokenDictionary::new();
        let result = synthesize(&closure, &tokenized, &hosts, &dictionary).unwrap();
        assert_eq!(result.coverage, 5);
        assert_eq!(result.template.variables.len(), 2);
        assert!(result.template.string.ends_with(".{{root}}"));
    }

    #[test]
    fn number_range_inference() {
        let (hosts, tokenized) = setup(&[
            "server-01.example.com",
            "server-02.example.com",
            "server-03.example.com",
            "server-04.example.com",
            "server-05.example.com",
        ]);
        let closure = Closure {
            members: (0..hosts.len()).collect(),
        };
        let dictionary = TokenDictionary::new();
        let result = synthesize(&closure, &tokenized, &hosts, &dictionary).unwrap();
        assert_eq!(result.template.variables.len(), 1);
        match &result.template.variables[0] {
            Variable::Number {
                start,
                end,
                step,
                format,
                dashed,
                ..
            } => {
                assert_eq!(*start, 0);
                assert_eq!(*end, 6);
                assert_eq!(*step, 1);
                assert_eq!(format, "%02d");
                assert!(!dashed);
            }
            other => panic!("expected number variable, got {other:?}"),
        }
        assert_eq!(result.possible_generations, 7);
    }

    #[test]
    fn optional_variable_round_trips_both_inputs() {
        let (hosts, tokenized) = setup(&["api.example.com", "api-v2.example.com"]);
        let closure = Closure {
            members: vec![0, 1],
        };
        let dictionary = TokenDictionary::new();
        let result = synthesize(&closure, &tokenized, &hosts, &dictionary).unwrap();
        assert_eq!(result.template.variables.len(), 1);
        match &result.template.variables[0] {
            Variable::Word { values, .. } => {
                let mut sorted = values.clone();
                sorted.sort();
                assert_eq!(sorted, vec!["".to_string(), "-v2".to_string()]);
            }
            other => panic!("expected word variable, got {other:?}"),
        }
    }

    #[test]
    fn semantic_naming_uses_dictionary_category() {
        let (hosts, tokenized) = setup(&[
            "dev.example.com",
            "prod.example.com",
            "staging.example.com",
        ]);
        let closure = Closure {
            members: (0..hosts.len()).collect(),
        };
        let dictionary = TokenDictionary::new().with_category(
            "env",
            vec!["dev".into(), "prod".into(), "staging".into()],
        );
        let result = synthesize(&closure, &tokenized, &hosts, &dictionary).unwrap();
        assert_eq!(result.template.variables[0].name(), "env");
    }
}
