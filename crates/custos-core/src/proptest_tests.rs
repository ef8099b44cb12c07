//! Property-based tests for custos-core types.
//!
//! These tests use proptest to verify invariants across many randomly generated inputs.

use chrono::NaiveDate;
use proptest::prelude::*;
use serde_json::{json, Value};

use crate::{
    check_deprecations, Context, Data, Deprecation, DeprecationRegistry, DeprecationSource, Report,
};

/// Strategy for generating field names.
fn field_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,15}"
}

/// Strategy for generating `(year, month, day)` triples in `YYYY-MM-DD` range.
fn date_parts_strategy() -> impl Strategy<Value = (i32, u32, u32)> {
    (0..=9999i32, 1..=12u32, 1..=31u32)
}

/// Strategy for generating flat policy data.
fn data_strategy() -> impl Strategy<Value = Data> {
    prop::collection::btree_map(field_name_strategy(), any::<i64>(), 0..6).prop_map(|map| {
        map.into_iter()
            .map(|(key, value)| (key, json!(value)))
            .collect()
    })
}

struct Element {
    rules: Vec<Deprecation>,
    data: Data,
}

impl DeprecationSource for Element {
    fn deprecations(&self) -> &[Deprecation] {
        &self.rules
    }

    fn data(&self) -> Option<&Data> {
        Some(&self.data)
    }
}

proptest! {
    #[test]
    fn removal_date_accepts_exactly_calendar_dates((year, month, day) in date_parts_strategy()) {
        let text = format!("{year:04}-{month:02}-{day:02}");
        let registry = DeprecationRegistry::new();
        let result = registry.field("a", "b", Some(text.as_str()));

        if year >= 1 && NaiveDate::from_ymd_opt(year, month, day).is_some() {
            let rule = result.unwrap();
            prop_assert_eq!(rule.removed_after().map(|d| d.to_string()), Some(text));
        } else {
            prop_assert!(result.is_err());
        }
    }

    #[test]
    fn removal_date_rejects_other_shapes(text in "[0-9a-z: -]{0,14}") {
        let bytes = text.as_bytes();
        prop_assume!(!(bytes.len() == 10 && bytes[4] == b'-' && bytes[7] == b'-'));
        let registry = DeprecationRegistry::new();
        prop_assert!(registry.optional_field("tag", Some(text.as_str())).is_err());
    }

    #[test]
    fn removal_date_rejects_non_strings(value in any::<i64>()) {
        prop_assert!(crate::RemovalDate::from_value(&json!(value)).is_err());
        prop_assert!(crate::RemovalDate::from_value(&Value::Bool(value % 2 == 0)).is_err());
    }

    #[test]
    fn ids_increase_in_construction_order(names in prop::collection::vec(field_name_strategy(), 1..20)) {
        let registry = DeprecationRegistry::new();
        let rules: Vec<Deprecation> = names
            .iter()
            .map(|name| registry.alias(name.as_str(), None).unwrap())
            .collect();

        for pair in rules.windows(2) {
            prop_assert!(pair[0].id() < pair[1].id());
        }
    }

    #[test]
    fn context_shares_wrapped_id(name in field_name_strategy(), label in "[a-z-]{1,12}:") {
        let rule = DeprecationRegistry::new().optional_field(name, None).unwrap();
        let context = Context::new(label, rule.clone());
        prop_assert_eq!(context.id(), rule.id());
    }

    #[test]
    fn field_rule_matches_key_presence(name in field_name_strategy(), data in data_strategy()) {
        let rule = DeprecationRegistry::new().field(name.as_str(), "replacement", None).unwrap();
        prop_assert_eq!(rule.check(&data), data.contains_key(&name));
    }

    #[test]
    fn optionality_matches_only_when_all_absent(
        fields in prop::collection::vec(field_name_strategy(), 1..4),
        data in data_strategy(),
    ) {
        let rule = DeprecationRegistry::new().optional_fields(fields.clone(), None).unwrap();
        let any_present = fields.iter().any(|field| data.contains_key(field));
        prop_assert_eq!(rule.check(&data), !any_present);
    }

    #[test]
    fn collector_is_idempotent(data in data_strategy(), names in prop::collection::vec(field_name_strategy(), 0..6)) {
        let registry = DeprecationRegistry::new();
        let element = Element {
            rules: names
                .iter()
                .map(|name| registry.field(name.as_str(), "other", None).unwrap())
                .collect(),
            data,
        };

        let first = check_deprecations(&element, Some("filter:"), None);
        let second = check_deprecations(&element, Some("filter:"), None);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn report_has_deprecations_iff_any_section_non_empty(counts in prop::collection::vec(0..3usize, 6)) {
        let registry = DeprecationRegistry::new();
        let mut report = Report::new("p");
        let sections = [
            &mut report.policy_fields,
            &mut report.conditions,
            &mut report.mode,
            &mut report.resource,
            &mut report.filters,
            &mut report.actions,
        ];
        for (section, count) in sections.into_iter().zip(&counts) {
            for _ in 0..*count {
                section.push(registry.alias("mark", None).unwrap().into());
            }
        }

        let total: usize = counts.iter().sum();
        prop_assert_eq!(report.has_deprecations(), total > 0);
        prop_assert_eq!(report.len(), total);
        prop_assert_eq!(report.format(None).lines().count() == 1, total == 0);
        prop_assert!(!report.format(None).ends_with('\n'));
    }
}
