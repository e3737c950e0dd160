//! Property-based tests for the round-trip guarantees
//!
//! Generated values are acyclic trees; sharing and cycles are covered by
//! the fixture tests in `reference_tests.rs`.

use fron::{from_str, parse, stringify, to_string, Value};
use num_bigint::BigInt;
use proptest::prelude::*;
use serde::{Deserialize, Serialize};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        (-1.0e9f64..1.0e9).prop_map(Value::from),
        Just(Value::from(f64::NAN)),
        Just(Value::from(f64::NEG_INFINITY)),
        any::<i128>().prop_map(|n| Value::BigInt(BigInt::from(n))),
        ".{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::array),
            prop::collection::vec((".{0,6}", inner), 0..6).prop_map(Value::object_from),
        ]
    })
}

proptest! {
    #[test]
    fn prop_i64(n in any::<i64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_u64(n in any::<u64>()) {
        prop_assert!(roundtrip(&n));
    }

    #[test]
    fn prop_string(s in ".*") {
        prop_assert!(roundtrip(&s));
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        prop_assert!(roundtrip(&v));
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        prop_assert!(roundtrip(&opt));
    }

    #[test]
    fn prop_tuple_i32_bool(t in (any::<i32>(), any::<bool>())) {
        prop_assert!(roundtrip(&t));
    }

    #[test]
    fn prop_value_roundtrip(value in arb_value()) {
        let text = stringify(&value, false).unwrap();
        let back = parse(&text).unwrap();
        prop_assert_eq!(&back, &value);
        prop_assert_eq!(stringify(&back, false).unwrap(), text);
    }

    #[test]
    fn prop_pretty_parses_like_compact(value in arb_value()) {
        let compact = parse(&stringify(&value, false).unwrap()).unwrap();
        let pretty = parse(&stringify(&value, true).unwrap()).unwrap();
        prop_assert_eq!(compact, pretty);
    }

    #[test]
    fn prop_parse_never_panics(text in "[\\[\\]{}(),:$.a-z0-9\"' ]{0,24}") {
        let _ = parse(&text);
    }
}
