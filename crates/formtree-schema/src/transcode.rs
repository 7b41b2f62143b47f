//! # Flatten / Deepen
//!
//! Projects a validated instance tree onto a flat mapping and rebuilds
//! nested raw input from one. Both directions are driven by the schema, so
//! composites decide how their keys are spelled and grouped:
//!
//! | Kind  | Flat key of a child          | Deepen                                      |
//! |-------|------------------------------|---------------------------------------------|
//! | Tuple | position (`0`, `1`, ...)     | numeric groups `< arity`, null-filled gaps   |
//! | List  | position                     | numeric groups in index order, no gap fill  |
//! | Dict  | field name                   | exact-name groups, missing names are null   |
//! | Leaf  | none (the parent's key)      | the value under the empty remainder         |
//!
//! ## Absent leaves
//!
//! A leaf whose data is null (absent, unvalidated, or failed) emits no
//! pair. Deepen turns a missing key back into null, so
//! `deepen(flatten(v)) == v` holds for valid trees, and null leaves at
//! fixed tuple positions come back at the same position.
//!
//! ## Unconsumed keys
//!
//! Keys no node claims (non-numeric or out-of-range positions, unknown
//! dict names, sub-keys under a scalar) do not affect the rebuilt value.
//! [`Schema::deepen_detailed`] reports them; [`Schema::deepen`] drops them.

use std::collections::BTreeMap;

use formtree_core::{group_by_key, join_key, Delimiter, FlatMap};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::instance::{Content, Instance};
use crate::node::{NodeSpec, Schema};

/// Result of [`Schema::deepen_detailed`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Deepened {
    /// Nested raw value, ready for validation.
    pub value: Value,
    /// Flat keys that no schema node consumed, sorted.
    pub unconsumed: Vec<String>,
}

impl Instance {
    /// Flatten into `(flat key, leaf value)` pairs in pre-order.
    pub fn flatten(&self, delimiter: &Delimiter) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        self.flatten_into("", delimiter, &mut out);
        out
    }

    /// Flatten into a sorted flat mapping.
    pub fn to_flat_map(&self, delimiter: &Delimiter) -> FlatMap {
        self.flatten(delimiter).into_iter().collect()
    }

    fn flatten_into(&self, key: &str, delimiter: &Delimiter, out: &mut Vec<(String, Value)>) {
        if self.is_absent() {
            return;
        }
        match self.content() {
            Content::Leaf(Value::Null) => {}
            Content::Leaf(value) => {
                if self.error().is_none() {
                    out.push((key.to_string(), value.clone()));
                }
            }
            Content::Items(items) => {
                for (i, child) in items.iter().enumerate() {
                    child.flatten_into(&join_key(key, &i.to_string(), delimiter), delimiter, out);
                }
            }
            Content::Fields(fields) => {
                for (name, child) in fields {
                    child.flatten_into(&join_key(key, name, delimiter), delimiter, out);
                }
            }
        }
    }
}

impl Schema {
    /// Rebuild nested raw input from a flat mapping.
    pub fn deepen(&self, flat: &FlatMap, delimiter: &Delimiter) -> Value {
        self.deepen_detailed(flat, delimiter).value
    }

    /// Rebuild nested raw input and report the keys that were not used.
    pub fn deepen_detailed(&self, flat: &FlatMap, delimiter: &Delimiter) -> Deepened {
        let mut unconsumed = Vec::new();
        let value = self.deepen_group(Some(flat), "", delimiter, &mut unconsumed);
        unconsumed.sort();
        if !unconsumed.is_empty() {
            tracing::debug!(
                count = unconsumed.len(),
                keys = ?unconsumed,
                "flat keys not consumed by schema"
            );
        }
        Deepened { value, unconsumed }
    }

    fn deepen_group(
        &self,
        flat: Option<&FlatMap>,
        key: &str,
        delimiter: &Delimiter,
        unconsumed: &mut Vec<String>,
    ) -> Value {
        match self.spec() {
            NodeSpec::String(_) | NodeSpec::Integer(_) | NodeSpec::Boolean => {
                let Some(flat) = flat else {
                    return Value::Null;
                };
                unconsumed.extend(
                    flat.keys()
                        .filter(|rest| !rest.is_empty())
                        .map(|rest| join_key(key, rest, delimiter)),
                );
                flat.get("").cloned().unwrap_or(Value::Null)
            }
            NodeSpec::Tuple(items) => {
                let mut slots = vec![Value::Null; items.len()];
                for (base, group) in groups(flat, delimiter) {
                    let child_key = join_key(key, &base, delimiter);
                    match base.parse::<usize>() {
                        Ok(i) if i < items.len() => {
                            slots[i] = items[i].deepen_group(Some(&group), &child_key, delimiter, unconsumed);
                        }
                        _ => note_group(&child_key, &group, delimiter, unconsumed),
                    }
                }
                Value::Array(slots)
            }
            NodeSpec::List(item) => {
                let mut positions: BTreeMap<usize, Value> = BTreeMap::new();
                for (base, group) in groups(flat, delimiter) {
                    let child_key = join_key(key, &base, delimiter);
                    match base.parse::<usize>() {
                        Ok(i) => {
                            let value = item.deepen_group(Some(&group), &child_key, delimiter, unconsumed);
                            positions.insert(i, value);
                        }
                        Err(_) => note_group(&child_key, &group, delimiter, unconsumed),
                    }
                }
                Value::Array(positions.into_values().collect())
            }
            NodeSpec::Dict(fields) => {
                let mut grouped = groups(flat, delimiter);
                let mut out = Map::new();
                for (name, schema) in fields {
                    let group = grouped.remove(name);
                    let child_key = join_key(key, name, delimiter);
                    out.insert(
                        name.clone(),
                        schema.deepen_group(group.as_ref(), &child_key, delimiter, unconsumed),
                    );
                }
                for (base, group) in grouped {
                    note_group(&join_key(key, &base, delimiter), &group, delimiter, unconsumed);
                }
                Value::Object(out)
            }
        }
    }
}

fn groups(flat: Option<&FlatMap>, delimiter: &Delimiter) -> BTreeMap<String, FlatMap> {
    flat.map(|f| group_by_key(f, delimiter)).unwrap_or_default()
}

fn note_group(key: &str, group: &FlatMap, delimiter: &Delimiter, unconsumed: &mut Vec<String>) {
    unconsumed.extend(group.keys().map(|rest| join_key(key, rest, delimiter)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{IntegerRules, StringRules};
    use serde_json::json;

    fn flat(value: Value) -> FlatMap {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => FlatMap::new(),
        }
    }

    fn int(required: bool) -> Schema {
        Schema::new(NodeSpec::Integer(IntegerRules::new(None, Some(90)).unwrap()), required)
    }

    fn text() -> Schema {
        Schema::new(NodeSpec::String(StringRules::default()), true)
    }

    fn tuple() -> Schema {
        Schema::new(NodeSpec::Tuple(vec![int(false), text(), int(false)]), true)
    }

    #[test]
    fn flatten_scalar_root_uses_empty_key() {
        let inst = text().instantiate(json!("kuku"));
        assert_eq!(inst.flatten(&Delimiter::default()), vec![("".to_string(), json!("kuku"))]);
    }

    #[test]
    fn flatten_tuple_omits_absent_leaf() {
        let inst = tuple().instantiate(json!([null, "Lorem", 78]));
        assert_eq!(
            inst.to_flat_map(&Delimiter::default()),
            flat(json!({"1": "Lorem", "2": 78}))
        );
    }

    #[test]
    fn flatten_keeps_valid_leaves_of_invalid_tree() {
        let inst = tuple().instantiate(json!([5, "Lorem", 91]));
        assert_eq!(
            inst.to_flat_map(&Delimiter::default()),
            flat(json!({"0": 5, "1": "Lorem"}))
        );
    }

    #[test]
    fn flatten_nested_keys() {
        let list = Schema::new(NodeSpec::List(int(true)), true);
        let outer = Schema::new(NodeSpec::Tuple(vec![int(true), text(), list]), true);
        let inst = outer.instantiate(json!([9, "234234", [0, 1, 2]]));
        let pairs = inst.flatten(&Delimiter::default());
        let keys: Vec<&str> = pairs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["0", "1", "2__0", "2__1", "2__2"]);
    }

    #[test]
    fn flatten_custom_delimiter() {
        let list = Schema::new(NodeSpec::List(text()), true);
        let inst = list.instantiate(json!(["a", "b"]));
        let d = Delimiter::new(".").unwrap();
        let nested = Schema::new(NodeSpec::Tuple(vec![list.clone()]), true);
        assert_eq!(
            nested.instantiate(json!([["a", "b"]])).to_flat_map(&d),
            flat(json!({"0.0": "a", "0.1": "b"}))
        );
        assert_eq!(inst.to_flat_map(&d), flat(json!({"0": "a", "1": "b"})));
    }

    #[test]
    fn tuple_deepen_fills_missing_positions() {
        let d = Delimiter::default();
        assert_eq!(tuple().deepen(&flat(json!({"1": "Lorem", "2": 78})), &d), json!([null, "Lorem", 78]));
        assert_eq!(tuple().deepen(&FlatMap::new(), &d), json!([null, null, null]));
    }

    #[test]
    fn tuple_deepen_drops_foreign_and_out_of_range_keys() {
        let detailed = tuple().deepen_detailed(
            &flat(json!({"0": 1, "1": "x", "3": 4, "name": "y", "-1": 2})),
            &Delimiter::default(),
        );
        assert_eq!(detailed.value, json!([1, "x", null]));
        assert_eq!(detailed.unconsumed, vec!["-1", "3", "name"]);
    }

    #[test]
    fn list_deepen_does_not_fill_gaps() {
        let list = Schema::new(NodeSpec::List(text()), true);
        assert_eq!(
            list.deepen(&flat(json!({"0": "x", "2": "y"})), &Delimiter::default()),
            json!(["x", "y"])
        );
    }

    #[test]
    fn list_deepen_orders_numerically() {
        let list = Schema::new(NodeSpec::List(int(true)), true);
        let input: FlatMap = (0..12).map(|i| (i.to_string(), json!(i))).collect();
        let expected: Vec<i64> = (0..12).collect();
        assert_eq!(list.deepen(&input, &Delimiter::default()), json!(expected));
    }

    #[test]
    fn dict_deepen_groups_by_name() {
        let dict = Schema::new(
            NodeSpec::Dict(BTreeMap::from([
                ("a".to_string(), int(false)),
                ("b".to_string(), text()),
                ("c".to_string(), tuple()),
            ])),
            true,
        );
        let detailed = dict.deepen_detailed(
            &flat(json!({"b": "kuku", "c__1": "Lorem", "c__2": 78, "zzz": 1, "b__x": 2})),
            &Delimiter::default(),
        );
        assert_eq!(
            detailed.value,
            json!({"a": null, "b": "kuku", "c": [null, "Lorem", 78]})
        );
        assert_eq!(detailed.unconsumed, vec!["b__x", "zzz"]);
    }

    #[test]
    fn deepen_then_validate_round_trip() {
        let list = Schema::new(NodeSpec::List(int(true)), true);
        let dict = Schema::new(
            NodeSpec::Dict(BTreeMap::from([
                ("a".to_string(), int(true)),
                ("b".to_string(), text()),
                ("c".to_string(), list),
            ])),
            true,
        );
        let outer = Schema::new(NodeSpec::Tuple(vec![int(true), text(), dict]), true);
        let flat_input = flat(json!({
            "2__b": "sdfsdf", "2__a": 34, "2__c__0": 0, "2__c__1": 1, "2__c__2": 2,
            "1": "234234", "0": 9
        }));
        let raw = outer.deepen(&flat_input, &Delimiter::default());
        let inst = outer.instantiate(raw);
        assert!(inst.is_valid());
        assert_eq!(inst.data(), json!([9, "234234", {"a": 34, "b": "sdfsdf", "c": [0, 1, 2]}]));
        assert_eq!(inst.to_flat_map(&Delimiter::default()), flat_input);
    }
}
