//! Runs the conformance table and checks that parsing is deterministic.

use jsparse_options::ParseOptions;
use jsparse_tests::{cases, is_deterministic, run_all, Expected, Summary};
use rayon::prelude::*;

#[test]
fn test_conformance_table() {
    let cases = cases();
    let results = run_all(&cases);
    let summary = Summary::from_results(&results);
    println!("{}", summary.render(&results));

    assert_eq!(results.len(), cases.len());
    assert_eq!(summary.failed(), 0, "{}", summary.render(&results));
}

#[test]
fn test_every_category_has_an_accepted_and_a_rejected_case() {
    let cases = cases();
    let mut categories: Vec<_> = cases.iter().map(|c| c.category).collect();
    categories.sort_unstable();
    categories.dedup();
    for category in categories {
        let in_category = || cases.iter().filter(move |c| c.category == category);
        assert!(
            in_category().any(|c| c.expected == Expected::Accept),
            "category {category} has no accepted case"
        );
        assert!(
            in_category().any(|c| c.expected != Expected::Accept),
            "category {category} has no rejected case"
        );
    }
}

#[test]
fn test_table_parses_deterministically() {
    let cases = cases();
    let unstable: Vec<_> = cases
        .par_iter()
        .filter(|c| !is_deterministic(c.source, &c.options))
        .map(|c| c.name)
        .collect();
    assert!(unstable.is_empty(), "non-deterministic cases: {unstable:?}");
}

#[test]
fn test_options_loaded_from_json_match_constructors() {
    let options = ParseOptions::from_json(r#"{"module": true}"#).unwrap();
    assert_eq!(options, ParseOptions::module());
    let options = ParseOptions::from_json(r#"{"compatMode": false}"#).unwrap();
    assert_eq!(options, ParseOptions::script().with_compat_mode(false));
}
