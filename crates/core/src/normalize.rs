//! Canonicalization of heterogeneous shop references.
//!
//! The backing service has accumulated several shapes for "which shop does
//! this record point at": a bare id string, an id-bearing object (a
//! serialized document reference), or a single-element array of either.
//! Nothing past this boundary sees those shapes; everything downstream works
//! with canonical [`ShopId`]s.

use serde_json::Value;

use crate::ShopId;

/// Collapse a raw shop reference into a canonical [`ShopId`].
///
/// Unwraps one level at a time (object → its `"id"` field, array → its first
/// element) and recurses until a string id is reached or the input is
/// exhausted. Malformed references (blank string, empty array, object without
/// an `"id"`, numbers, booleans, `null`) yield `None`; callers drop the
/// surrounding record instead of failing the whole session build.
///
/// Idempotent: normalizing an already-canonical id returns it unchanged.
pub fn normalize_shop_ref(value: &Value) -> Option<ShopId> {
    match value {
        Value::String(s) => ShopId::try_from(s.as_str()).ok(),
        Value::Object(map) => map.get("id").and_then(normalize_shop_ref),
        Value::Array(items) => items.first().and_then(normalize_shop_ref),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn bare_string() {
        assert_eq!(normalize_shop_ref(&json!("s1")), Some(ShopId::new("s1")));
    }

    #[test]
    fn id_bearing_object() {
        assert_eq!(
            normalize_shop_ref(&json!({"id": "s1", "name": "Main Branch"})),
            Some(ShopId::new("s1"))
        );
    }

    #[test]
    fn array_of_strings_takes_first() {
        assert_eq!(
            normalize_shop_ref(&json!(["s1", "s2"])),
            Some(ShopId::new("s1"))
        );
    }

    #[test]
    fn array_of_objects() {
        assert_eq!(
            normalize_shop_ref(&json!([{"id": "s1"}])),
            Some(ShopId::new("s1"))
        );
    }

    #[test]
    fn nested_object_inside_object() {
        // A document reference whose `id` is itself a wrapped reference.
        assert_eq!(
            normalize_shop_ref(&json!({"id": {"id": "s1"}})),
            Some(ShopId::new("s1"))
        );
    }

    #[test]
    fn malformed_inputs_yield_none() {
        for value in [
            json!(null),
            json!(42),
            json!(true),
            json!(""),
            json!([]),
            json!({}),
            json!({"name": "no id here"}),
            json!({"id": null}),
            json!([null]),
        ] {
            assert_eq!(normalize_shop_ref(&value), None, "input: {value}");
        }
    }

    proptest! {
        /// Every supported wrapping of an id normalizes to the same value,
        /// and normalizing the canonical form is the identity.
        #[test]
        fn idempotent_over_supported_shapes(id in "[a-zA-Z0-9_-]{1,24}") {
            let canonical = Some(ShopId::new(id.as_str()));
            prop_assert_eq!(&normalize_shop_ref(&json!(id)), &canonical);
            prop_assert_eq!(&normalize_shop_ref(&json!({"id": id})), &canonical);
            prop_assert_eq!(&normalize_shop_ref(&json!([id])), &canonical);
            prop_assert_eq!(&normalize_shop_ref(&json!([{"id": id}])), &canonical);
        }
    }
}
