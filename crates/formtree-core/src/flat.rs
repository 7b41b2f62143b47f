//! # Flat Mappings
//!
//! A flat mapping is the single-level key/value shape used by HTML form
//! submissions and query strings: every leaf of a nested value sits under a
//! key made of its path segments joined by a [`Delimiter`].
//!
//! ## Grouping
//!
//! [`group_by_key`] is the primitive every composite uses when rebuilding a
//! nested value. Each key is split at the *first* delimiter into a base key
//! and a remainder; entries sharing a base key form one group, keyed by
//! remainder. A key without the delimiter lands in its group under `""`.
//!
//! ```text
//! {"0": 9, "2__b": "x", "2__c__0": 1}
//!   => {"0": {"": 9}, "2": {"b": "x", "c__0": 1}}
//! ```

use std::collections::BTreeMap;

use serde_json::Value;
use url::form_urlencoded;

use crate::delimiter::Delimiter;

/// A sorted single-level mapping from flat keys to leaf values.
pub type FlatMap = BTreeMap<String, Value>;

/// Group a flat mapping by the segment before the first delimiter.
pub fn group_by_key(flat: &FlatMap, delimiter: &Delimiter) -> BTreeMap<String, FlatMap> {
    let mut groups: BTreeMap<String, FlatMap> = BTreeMap::new();
    for (key, value) in flat {
        let (base, rest) = delimiter.split_first(key);
        groups
            .entry(base.to_string())
            .or_default()
            .insert(rest.to_string(), value.clone());
    }
    groups
}

/// Join a parent flat key and a child key.
///
/// An empty side is dropped so that no leading or trailing delimiter is
/// produced.
pub fn join_key(prefix: &str, key: &str, delimiter: &Delimiter) -> String {
    match (prefix.is_empty(), key.is_empty()) {
        (true, _) => key.to_string(),
        (false, true) => prefix.to_string(),
        (false, false) => format!("{prefix}{delimiter}{key}"),
    }
}

/// Parse an `application/x-www-form-urlencoded` string into a flat mapping.
///
/// All values are strings. A leading `?` is ignored. When a key repeats,
/// the last occurrence wins.
pub fn parse_query(query: &str) -> FlatMap {
    let query = query.strip_prefix('?').unwrap_or(query);
    form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

/// Encode a flat mapping as an `application/x-www-form-urlencoded` string.
///
/// Null values are skipped; strings are emitted verbatim and every other
/// value uses its JSON text.
pub fn encode_query(flat: &FlatMap) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in flat {
        match value {
            Value::Null => {}
            Value::String(s) => {
                serializer.append_pair(key, s);
            }
            other => {
                serializer.append_pair(key, &other.to_string());
            }
        }
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(value: Value) -> FlatMap {
        match value {
            Value::Object(map) => map.into_iter().collect(),
            _ => FlatMap::new(),
        }
    }

    #[test]
    fn group_by_key_splits_on_first_delimiter() {
        let input = flat(json!({
            "0": 9,
            "1": "234234",
            "2__b": "sdfsdf",
            "2__c__0": 0,
            "2__c__1": 1
        }));
        let groups = group_by_key(&input, &Delimiter::default());

        assert_eq!(groups.len(), 3);
        assert_eq!(groups["0"][""], json!(9));
        assert_eq!(groups["2"]["b"], json!("sdfsdf"));
        assert_eq!(groups["2"]["c__0"], json!(0));
        assert_eq!(groups["2"]["c__1"], json!(1));
    }

    #[test]
    fn group_by_key_empty_input() {
        let groups = group_by_key(&FlatMap::new(), &Delimiter::default());
        assert!(groups.is_empty());
    }

    #[test]
    fn group_by_key_custom_delimiter_leaves_default_alone() {
        let input = flat(json!({"a.b": 1, "a__c": 2}));
        let groups = group_by_key(&input, &Delimiter::new(".").unwrap());
        assert_eq!(groups["a"]["b"], json!(1));
        assert_eq!(groups["a__c"][""], json!(2));
    }

    #[test]
    fn join_key_omits_empty_sides() {
        let d = Delimiter::default();
        assert_eq!(join_key("", "name", &d), "name");
        assert_eq!(join_key("pets", "", &d), "pets");
        assert_eq!(join_key("pets", "0", &d), "pets__0");
        assert_eq!(join_key("", "", &d), "");
    }

    #[test]
    fn parse_query_decodes_pairs() {
        let parsed = parse_query("?form__name=Ann+Lee&form__age=30&x=%26");
        assert_eq!(parsed["form__name"], json!("Ann Lee"));
        assert_eq!(parsed["form__age"], json!("30"));
        assert_eq!(parsed["x"], json!("&"));
    }

    #[test]
    fn parse_query_last_repeat_wins() {
        let parsed = parse_query("a=1&a=2");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["a"], json!("2"));
    }

    #[test]
    fn encode_query_skips_nulls_and_stringifies_scalars() {
        let input = flat(json!({"a": null, "b": "x y", "c": 78, "d": true}));
        assert_eq!(encode_query(&input), "b=x+y&c=78&d=true");
    }

    #[test]
    fn query_round_trip_for_strings() {
        let input = flat(json!({"form__0": "Lorem", "form__1": "a&b=c"}));
        assert_eq!(parse_query(&encode_query(&input)), input);
    }
}
