//! End-to-end scenarios and invariant properties for the pattern-induction
//! pipeline.

use std::collections::BTreeSet;

use proptest::prelude::*;
use subdomain_patterns::config::Config;
use subdomain_patterns::host::Host;
use subdomain_patterns::learn_patterns;
use subdomain_patterns::template::Variable;
use subdomain_patterns::token::tokenize_label;

#[test]
fn simple_service_env_template() {
    let hosts = [
        "api-dev.example.com",
        "api-prod.example.com",
        "api-staging.example.com",
        "web-dev.example.com",
        "web-prod.example.com",
    ];
    let config = Config::new().with_pattern_bounds(1, 10);
    let patterns = learn_patterns(&hosts, &config, None).unwrap();

    assert!(patterns.iter().any(|p| p.coverage == 5));
}

#[test]
fn number_range_template() {
    let hosts = [
        "server-01.example.com",
        "server-02.example.com",
        "server-03.example.com",
        "server-04.example.com",
        "server-05.example.com",
    ];
    let config = Config::new().with_pattern_bounds(1, 10);
    let patterns = learn_patterns(&hosts, &config, None).unwrap();

    let number_pattern = patterns
        .iter()
        .find(|p| p.template.contains("{{n0}}"))
        .expect("expected a number-range template");
    assert_eq!(number_pattern.coverage, 5);

    let possible_generations: u64 = number_pattern
        .variables
        .iter()
        .map(Variable::possible_generations)
        .product();
    assert_eq!(possible_generations, 7);
}

#[test]
fn optional_variable_template_round_trips_both_inputs() {
    let hosts = ["api.example.com", "api-v2.example.com"];
    let config = Config::new().with_pattern_bounds(1, 10);
    let patterns = learn_patterns(&hosts, &config, None).unwrap();

    assert_eq!(patterns.len(), 1);
    let pattern = &patterns[0];
    let variable = pattern
        .variables
        .iter()
        .find(|v| matches!(v, Variable::Word { .. }))
        .expect("expected a word variable");
    match variable {
        Variable::Word { values, .. } => {
            let set: BTreeSet<&str> = values.iter().map(String::as_str).collect();
            assert!(set.contains(""));
            assert!(set.contains("-v2"));
        }
        _ => unreachable!(),
    }
}

#[test]
fn distinct_depth_groups_never_mix() {
    let hosts = ["a.example.com", "b.example.com", "x.y.example.com", "x.z.example.com"];
    let config = Config::new().with_pattern_bounds(1, 10);
    let patterns = learn_patterns(&hosts, &config, None).unwrap();

    let level1_examples: BTreeSet<&str> = ["a.example.com", "b.example.com"].into_iter().collect();
    let level2_examples: BTreeSet<&str> = ["x.y.example.com", "x.z.example.com"].into_iter().collect();

    for pattern in &patterns {
        let touches_level1 = pattern.examples.iter().any(|e| level1_examples.contains(e.as_str()));
        let touches_level2 = pattern.examples.iter().any(|e| level2_examples.contains(e.as_str()));
        assert!(
            !(touches_level1 && touches_level2),
            "a single template must not span both depths: {:?}",
            pattern.examples
        );
    }
}

#[test]
fn over_broad_templates_are_rejected() {
    let hosts = ["a01.example.com", "b02.example.com", "c03.example.com"];
    let mut config = Config::new();
    config.max_ratio = Some(3.0);
    config.absolute_threshold = 5;
    config.min_patterns = Some(0);

    let patterns = learn_patterns(&hosts, &config, None).unwrap();
    for pattern in &patterns {
        let possible_generations: u64 = pattern
            .variables
            .iter()
            .map(Variable::possible_generations)
            .product::<u64>()
            .max(1);
        let ratio = possible_generations as f64 / pattern.coverage as f64;
        assert!(!(possible_generations >= config.absolute_threshold as u64 && ratio >= 3.0));
    }
}

proptest! {
    /// P1: tokenizing a label and concatenating its tokens reproduces it.
    #[test]
    fn tokenize_reconcatenates(label in "[a-z][a-z0-9]{0,5}(-[a-z0-9]{1,5}){0,3}") {
        let tokens = tokenize_label(&label);
        let joined: String = tokens.concat();
        prop_assert_eq!(joined, label);
    }

    /// P2: the distance memo is symmetric and zero iff the inputs are equal.
    #[test]
    fn distance_memo_is_symmetric(
        a in "[a-z]{1,8}",
        b in "[a-z]{1,8}",
    ) {
        use subdomain_patterns::distance::DistanceMemo;
        let host_a = Host::parse(&format!("{a}.example.com")).unwrap();
        let host_b = Host::parse(&format!("{b}.example.com")).unwrap();
        let hosts = vec![host_a, host_b];
        let memo = DistanceMemo::new(&hosts);
        prop_assert_eq!(memo.distance(0, 1), memo.distance(1, 0));
        prop_assert_eq!(memo.distance(0, 1) == 0, hosts[0].subdomain == hosts[1].subdomain);
    }

    /// P6: two independent runs over the same input and config agree.
    #[test]
    fn repeated_runs_agree(n in 2usize..8) {
        let hosts: Vec<String> = (0..n).map(|i| format!("svc-{i}.example.com")).collect();
        let config = Config::new().with_pattern_bounds(1, 10);
        let first = learn_patterns(&hosts, &config, None).unwrap();
        let second = learn_patterns(&hosts, &config, None).unwrap();
        let first_strings: Vec<&String> = first.iter().map(|p| &p.template).collect();
        let second_strings: Vec<&String> = second.iter().map(|p| &p.template).collect();
        prop_assert_eq!(first_strings, second_strings);
    }
}
