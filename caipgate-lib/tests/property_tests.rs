//! Property-based tests for caipgate-lib
//!
//! These tests use proptest to verify invariants across a wide range of inputs.

#[cfg(test)]
mod identifier_properties {
    use caipgate_lib::identifier::{spec, SpecName, WILDCARD};
    use caipgate_lib::{GatewayError, Identifier};
    use proptest::prelude::*;

    fn namespace() -> impl Strategy<Value = String> {
        "[a-z0-9-]{3,8}"
    }

    fn reference() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9-]{1,32}"
    }

    fn address() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9]{1,64}"
    }

    fn asset_reference() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9-]{1,64}"
    }

    /// Canonical strings of every identifier kind.
    fn identifier_string() -> impl Strategy<Value = String> {
        prop_oneof![
            (namespace(), reference()).prop_map(|(n, r)| format!("{n}:{r}")),
            (namespace(), reference(), address()).prop_map(|(n, r, a)| format!("{n}:{r}:{a}")),
            (namespace(), reference(), namespace(), asset_reference())
                .prop_map(|(n, r, an, ar)| format!("{n}:{r}/{an}:{ar}")),
            (namespace(), reference(), namespace(), asset_reference(), reference())
                .prop_map(|(n, r, an, ar, t)| format!("{n}:{r}/{an}:{ar}/{t}")),
        ]
    }

    fn fragments(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|s| Some(s.to_string())).collect()
    }

    /// Leaf count and flattened length agree for every spec
    #[test]
    fn required_arg_count_equals_leaf_count() {
        for name in SpecName::ALL {
            let spec = spec(name);
            assert_eq!(spec.required_arg_count(), spec.flatten().len(), "{name}");
        }
    }

    proptest! {
        /// Parsing the formatted string gives back the same fragments
        #[test]
        fn parse_format_round_trip(input in identifier_string()) {
            let id = Identifier::parse(&input).unwrap();
            let formatted = id.format().unwrap();
            prop_assert_eq!(&formatted, &input);

            let reparsed = Identifier::parse(&formatted).unwrap();
            prop_assert_eq!(reparsed.to_fragments(), id.to_fragments());
            prop_assert_eq!(reparsed, id);
        }

        /// A valid identifier matches itself and the all-wildcard pattern
        #[test]
        fn identifier_matches_itself_and_wildcards(input in identifier_string()) {
            let id = Identifier::parse(&input).unwrap();
            prop_assert!(id.match_pattern(&input));

            let wildcard = vec![WILDCARD; id.to_fragments().len()].join(":");
            prop_assert!(id.match_pattern(&wildcard));
        }

        /// The wildcard validates at any position
        #[test]
        fn wildcard_validates_at_any_position(position in 0usize..5) {
            let mut values = fragments(&["eip155", "1", "erc721", "0xabc", "7"]);
            values[position] = Some(WILDCARD.to_string());
            prop_assert!(spec(SpecName::AssetId).validate(&values).is_ok());
        }

        /// Fewer fragments than leaves is always a missing argument
        #[test]
        fn validate_fails_below_leaf_count(count in 0usize..5) {
            let values: Vec<Option<&str>> = vec![Some("a1b"); count];
            let result = spec(SpecName::AssetId).validate(&values);
            prop_assert!(matches!(result, Err(GatewayError::MissingArgument(_))));
        }

        /// A fragment outside its leaf alphabet is rejected with its value
        #[test]
        fn invalid_leaf_fails_validation(bad in "[#?!@ ]{1,4}", position in 0usize..3) {
            let mut values = fragments(&["eip155", "1", "0xabc"]);
            values[position] = Some(bad.clone());
            let result = spec(SpecName::AccountId).validate(&values);
            let rejected = matches!(
                result,
                Err(GatewayError::InvalidArgument { ref value, .. }) if *value == bad
            );
            prop_assert!(rejected);
        }
    }
}

#[cfg(test)]
mod payload_properties {
    use caipgate_lib::digester::{self, Algorithm};
    use caipgate_lib::manipulator::{
        Argument, DescriptorTable, ManipulationDescriptor, MethodDescriptors,
    };
    use proptest::prelude::*;
    use serde_json::{json, Value};

    /// JSON values whose strings are drawn from `text`.
    fn json_value_with(text: &'static str) -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            text.prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
                prop::collection::btree_map("[a-zA-Z]{1,6}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        /// JSON encoding is reversed by one decode
        #[test]
        fn json_round_trip(value in json_value_with(".*")) {
            let encoded = digester::encode(&value, Algorithm::Json).unwrap();
            prop_assert_eq!(digester::decode(&encoded).unwrap(), value);
        }

        /// Base64 layers over JSON unwrap to the original value.
        /// Decoded strings holding the delimiter would be decoded again, so
        /// strings here never contain one.
        #[test]
        fn nested_layers_unwrap(value in json_value_with("[^.]*"), layers in 1usize..4) {
            let mut payload = digester::encode(&value, Algorithm::Json).unwrap();
            for _ in 0..layers {
                payload = digester::encode(&json!(payload), Algorithm::Base64).unwrap();
            }
            prop_assert_eq!(digester::decode_recursive(&payload).unwrap(), value);
        }

        /// Plain arguments skip selection entirely
        #[test]
        fn plain_arguments_pass_through(value in json_value_with(".*")) {
            let table = DescriptorTable::new().with_method(
                "call",
                MethodDescriptors::new().with(0, ManipulationDescriptor::new("id")),
            );
            let bound = table.bind("call", vec![Argument::Value(value.clone())]).unwrap();
            prop_assert_eq!(bound, vec![value]);
        }
    }
}

#[cfg(test)]
mod routing_properties {
    use caipgate_lib::routing::RouterBuilder;
    use proptest::prelude::*;

    proptest! {
        /// A wildcard namespace route answers for every unregistered reference
        #[test]
        fn wildcard_route_answers_any_reference(chain in "[a-zA-Z0-9-]{1,32}") {
            let router = RouterBuilder::new()
                .with_route("eip155", true, "evm")
                .unwrap()
                .with_route("eip155:4", false, "rinkeby")
                .unwrap()
                .build();
            let expected = if chain == "4" { "rinkeby" } else { "evm" };
            let evm_path = format!("eip155:{}", chain);
            let cosmos_path = format!("cosmos:{}", chain);
            prop_assert_eq!(router.resolve(&evm_path).unwrap(), &expected);
            prop_assert!(router.resolve(&cosmos_path).is_err());
        }
    }
}
