//! Property tests for pattern translation

use std::collections::HashMap;

use named_regex::{translate, NamedPattern};
use proptest::prelude::*;

/// One fragment of a generated pattern
#[derive(Debug, Clone)]
enum Part {
    /// Text that never forms a capture group on its own
    Inert(String),
    /// A named group `(?<name>a)`
    Named(String),
    /// An unnamed group `(b)`
    Unnamed,
}

impl Part {
    fn named_text(&self) -> String {
        match self {
            Part::Inert(text) => text.clone(),
            Part::Named(name) => format!("(?<{}>a)", name),
            Part::Unnamed => "(b)".to_string(),
        }
    }

    fn standard_text(&self) -> String {
        match self {
            Part::Inert(text) => text.clone(),
            Part::Named(_) => "(a)".to_string(),
            Part::Unnamed => "(b)".to_string(),
        }
    }
}

fn inert_fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,3}",
        Just(r"\(".to_string()),
        Just(r"\)".to_string()),
        Just("(?:x)".to_string()),
        Just("(?=y)".to_string()),
        Just("(?<!z)".to_string()),
        Just("[()]".to_string()),
        Just(r"[\]()]".to_string()),
        Just(r"\Q(?<q>)\E".to_string()),
        Just(r"\\".to_string()),
    ]
}

fn parts() -> impl Strategy<Value = Vec<Part>> {
    prop::collection::vec(
        prop_oneof![
            inert_fragment().prop_map(Part::Inert),
            "[a-z]{1,4}".prop_map(Part::Named),
            Just(Part::Unnamed),
        ],
        0..12,
    )
}

fn named_pattern(parts: &[Part]) -> String {
    parts.iter().map(Part::named_text).collect()
}

/// Native group index of every name, in declaration order
fn expected_indices(parts: &[Part]) -> (usize, HashMap<String, Vec<usize>>) {
    let mut count = 0;
    let mut indices: HashMap<String, Vec<usize>> = HashMap::new();
    for part in parts {
        match part {
            Part::Inert(_) => {}
            Part::Named(name) => {
                count += 1;
                indices.entry(name.clone()).or_default().push(count);
            }
            Part::Unnamed => count += 1,
        }
    }
    (count, indices)
}

proptest! {
    #[test]
    fn translation_is_deterministic(parts in parts()) {
        let pattern = named_pattern(&parts);
        prop_assert_eq!(translate(&pattern).unwrap(), translate(&pattern).unwrap());
    }

    #[test]
    fn group_indices_are_one_to_k(parts in parts()) {
        let pattern = named_pattern(&parts);
        let t = translate(&pattern).unwrap();
        let (groups, expected) = expected_indices(&parts);
        prop_assert_eq!(t.registry().group_count(), groups);

        let mut named: Vec<usize> = t
            .registry()
            .group_info()
            .values()
            .flatten()
            .map(|info| info.group_index)
            .collect();
        named.sort_unstable();
        let total = named.len();
        named.dedup();
        prop_assert_eq!(named.len(), total, "duplicate group index in {}", pattern);
        prop_assert!(named.iter().all(|&i| (1..=groups).contains(&i)));

        for (name, indices) in &expected {
            let found: Vec<usize> = t
                .registry()
                .get(name)
                .unwrap()
                .iter()
                .map(|info| info.group_index)
                .collect();
            prop_assert_eq!(&found, indices);
        }

        // the engine must see exactly the groups the registry counted;
        // it has no quote spans, so the single quoted fragment is escaped
        let native = t.standard_pattern().replace(r"\Q(?<q>)\E", r"\(\?<q>\)");
        let compiled = fancy_regex::Regex::new(&native).unwrap();
        prop_assert_eq!(compiled.captures_len() - 1, groups);
    }

    #[test]
    fn names_resolve_to_first_declaration(parts in parts()) {
        let t = translate(&named_pattern(&parts)).unwrap();
        for name in t.names() {
            let infos = t.registry().get(name).unwrap();
            prop_assert_eq!(t.registry().index_of(name), Some(infos[0].group_index));
            prop_assert!(infos.windows(2).all(|w| w[0].group_index < w[1].group_index));
        }
    }

    #[test]
    fn standard_pattern_drops_only_group_names(parts in parts()) {
        let t = translate(&named_pattern(&parts)).unwrap();
        let expected: String = parts.iter().map(Part::standard_text).collect();
        prop_assert_eq!(t.standard_pattern(), expected.as_str());
    }

    #[test]
    fn plain_patterns_round_trip(pattern in prop::collection::vec(inert_fragment(), 0..10)) {
        let pattern: String = pattern.concat();
        let t = translate(&pattern).unwrap();
        prop_assert_eq!(t.standard_pattern(), pattern.as_str());
        prop_assert_eq!(t.registry().group_count(), 0);
    }

    #[test]
    fn named_groups_capture_like_numbered(words in prop::collection::vec("[a-z]{1,5}", 1..5)) {
        let named: String = words.iter().enumerate().map(|(i, w)| format!("(?<g{}>{})", i, w)).collect();
        let input = words.concat();

        let p = NamedPattern::compile(&named).unwrap();
        let mut m = p.matcher(&input);
        prop_assert!(m.matches().unwrap());
        for (i, w) in words.iter().enumerate() {
            let name = format!("g{}", i);
            prop_assert_eq!(m.group(name.as_str()).unwrap(), Some(w.as_str()));
        }
    }
}
