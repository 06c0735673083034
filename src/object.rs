// Copyright 2018 The GeoRust Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//	http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Merging, copying and checking JSON objects.

use crate::json::{JsonObject, JsonValue};
use crate::util;

/// Deep merge `obj` into `def`, `obj` winning on conflicts.
///
/// Nested objects are merged recursively. An array in `obj` is copied when
/// `def` has nothing under that key, unioned into an array already in `def`
/// (items already present are not repeated), and ignored when `def` holds
/// something else there. Every other value overwrites. A falsy `obj` returns
/// `def` unchanged, a falsy `def` returns `obj`.
///
/// ```
/// use geostar_util::object::merge;
/// use serde_json::json;
///
/// let merged = merge(json!({"a": {"b": 1}}), json!({"a": {"c": 2}}));
/// assert_eq!(merged, json!({"a": {"b": 1, "c": 2}}));
/// ```
pub fn merge(def: JsonValue, obj: JsonValue) -> JsonValue {
    if !util::is_truthy(&obj) {
        return def;
    }
    if !util::is_truthy(&def) {
        return obj;
    }
    match (def, obj) {
        (JsonValue::Object(mut def), JsonValue::Object(obj)) => {
            merge_objects(&mut def, obj);
            JsonValue::Object(def)
        }
        (def, _) => def,
    }
}

fn merge_objects(def: &mut JsonObject, obj: JsonObject) {
    for (key, value) in obj {
        match value {
            JsonValue::Object(_) => {
                let current = def.remove(&key).unwrap_or(JsonValue::Null);
                def.insert(key, merge(current, value));
            }
            JsonValue::Array(items) => {
                match def.get_mut(&key) {
                    Some(JsonValue::Array(existing)) => {
                        for item in items {
                            if !existing.contains(&item) {
                                existing.push(item);
                            }
                        }
                        continue;
                    }
                    Some(current) if util::is_truthy(current) => continue,
                    _ => {}
                }
                def.insert(key, JsonValue::Array(items));
            }
            value => {
                def.insert(key, value);
            }
        }
    }
}

/// Merge every value in turn into the first one. Empty input gives `null`.
pub fn merge_all<I>(values: I) -> JsonValue
where
    I: IntoIterator<Item = JsonValue>,
{
    let mut values = values.into_iter();
    match values.next() {
        Some(first) => values.fold(first, merge),
        None => JsonValue::Null,
    }
}

/// Shape `src` after `template`: keys missing from `src` are taken from the
/// template, keys the template does not know are dropped.
///
/// A template that is not an object leaves `src` as is.
pub fn fix_obj(src: &JsonValue, template: &JsonValue) -> JsonValue {
    let template = match template.as_object() {
        Some(t) => t,
        None => return src.clone(),
    };
    let empty = JsonObject::new();
    let src = src.as_object().unwrap_or(&empty);
    let fixed = template
        .iter()
        .map(|(key, default)| {
            let value = src.get(key).unwrap_or(default);
            (key.to_owned(), value.clone())
        })
        .collect();
    JsonValue::Object(fixed)
}

/// New object holding only the listed keys that `src` has.
pub fn pick(src: &JsonObject, keys: &[&str]) -> JsonObject {
    keys.iter()
        .filter_map(|&k| src.get(k).map(|v| (k.to_owned(), v.clone())))
        .collect()
}

/// Shallow-assign the fields of every source onto `dest`, later sources
/// winning.
pub fn extend<'a, I>(dest: &mut JsonObject, sources: I)
where
    I: IntoIterator<Item = &'a JsonObject>,
{
    for source in sources {
        for (key, value) in source {
            dest.insert(key.to_owned(), value.clone());
        }
    }
}

type KeyProcessor = Box<dyn Fn(&str) -> String + Send + Sync>;
type ValueProcessor = Box<dyn Fn(&JsonValue, &str) -> JsonValue + Send + Sync>;

/// Hooks applied by [`deep_copy_with`].
#[derive(Default)]
pub struct CopyOptions {
    key_processors: Vec<KeyProcessor>,
    value_processors: Vec<ValueProcessor>,
    ignores: Vec<String>,
}

impl CopyOptions {
    pub fn new() -> Self {
        CopyOptions::default()
    }

    /// Rename keys; processors run in the order they were added.
    pub fn key_processor<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.key_processors.push(Box::new(f));
        self
    }

    /// Rewrite values; each processor sees the previous one's output and the
    /// already renamed key.
    pub fn value_processor<F>(mut self, f: F) -> Self
    where
        F: Fn(&JsonValue, &str) -> JsonValue + Send + Sync + 'static,
    {
        self.value_processors.push(Box::new(f));
        self
    }

    /// Copy this key verbatim, without running any processor on it.
    pub fn ignore(mut self, key: &str) -> Self {
        self.ignores.push(key.to_owned());
        self
    }
}

/// Deep copy of `data` with key and value processors applied at every level.
///
/// A value changed by the value processors is taken as is; an unchanged one
/// is copied recursively.
pub fn deep_copy_with(data: &JsonValue, options: &CopyOptions) -> JsonValue {
    match data {
        JsonValue::Array(items) => JsonValue::Array(
            items
                .iter()
                .map(|item| deep_copy_with(item, options))
                .collect(),
        ),
        JsonValue::Object(object) => {
            let mut copy = JsonObject::new();
            for (key, value) in object {
                if options.ignores.iter().any(|i| i == key) {
                    copy.insert(key.to_owned(), value.clone());
                    continue;
                }
                let key = options
                    .key_processors
                    .iter()
                    .fold(key.to_owned(), |k, processor| processor(&k));
                let processed = options
                    .value_processors
                    .iter()
                    .fold(value.clone(), |v, processor| processor(&v, &key));
                let copied = if processed == *value {
                    deep_copy_with(value, options)
                } else {
                    processed
                };
                copy.insert(key, copied);
            }
            JsonValue::Object(copy)
        }
        scalar => scalar.clone(),
    }
}

/// Replace, at any depth, strings holding a JSON object or array by the
/// parsed value. Other strings are kept.
pub fn parse_nested_json(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Object(object) => JsonValue::Object(
            object
                .into_iter()
                .map(|(k, v)| (k, parse_nested_json(v)))
                .collect(),
        ),
        JsonValue::Array(items) => {
            JsonValue::Array(items.into_iter().map(parse_nested_json).collect())
        }
        JsonValue::String(s) => match serde_json::from_str::<JsonValue>(&s) {
            Ok(parsed @ JsonValue::Object(_)) | Ok(parsed @ JsonValue::Array(_)) => {
                parse_nested_json(parsed)
            }
            _ => JsonValue::String(s),
        },
        other => other,
    }
}

/// Whether every value is usable: arrays non-empty, numbers finite, strings
/// not blank, anything else truthy.
pub fn check_values(values: &[JsonValue]) -> bool {
    values.iter().all(|v| match v {
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Number(n) => n.as_f64().map_or(false, f64::is_finite),
        JsonValue::String(s) => !s.trim().is_empty(),
        other => util::is_truthy(other),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: JsonValue) -> JsonObject {
        util::expect_owned_object(value).unwrap()
    }

    #[test]
    fn merge_nested_objects() {
        assert_eq!(
            merge(json!({"a": {"b": 1}, "x": 1}), json!({"a": {"c": 2}, "x": 2})),
            json!({"a": {"b": 1, "c": 2}, "x": 2})
        );
    }

    #[test]
    fn merge_arrays() {
        assert_eq!(
            merge(json!({"a": [1, 2]}), json!({"a": [2, 3]})),
            json!({"a": [1, 2, 3]})
        );
        assert_eq!(merge(json!({}), json!({"a": [1]})), json!({"a": [1]}));
        // An array never replaces a non-array value.
        assert_eq!(merge(json!({"a": 5}), json!({"a": [1]})), json!({"a": 5}));
    }

    #[test]
    fn merge_falsy_sides() {
        assert_eq!(merge(json!({"a": 1}), json!(null)), json!({"a": 1}));
        assert_eq!(merge(json!(null), json!({"a": 1})), json!({"a": 1}));
        assert_eq!(merge(json!({"a": 1}), json!({"a": null})), json!({"a": null}));
    }

    #[test]
    fn merge_all_folds_left() {
        assert_eq!(
            merge_all(vec![json!({"a": 1}), json!({"b": 2}), json!({"a": 3})]),
            json!({"a": 3, "b": 2})
        );
        assert_eq!(merge_all(Vec::new()), JsonValue::Null);
    }

    #[test]
    fn fix_obj_follows_template() {
        assert_eq!(
            fix_obj(
                &json!({"a": 1, "extra": true}),
                &json!({"a": 0, "b": {"c": 2}})
            ),
            json!({"a": 1, "b": {"c": 2}})
        );
        assert_eq!(fix_obj(&json!({"a": 1}), &json!(3)), json!({"a": 1}));
    }

    #[test]
    fn pick_and_extend() {
        let src = object(json!({"name": "Charlie", "age": 10}));
        assert_eq!(
            JsonValue::Object(pick(&src, &["name", "missing"])),
            json!({"name": "Charlie"})
        );

        let mut dest = object(json!({"a": 1}));
        let b = object(json!({"a": 2, "b": 2}));
        let c = object(json!({"b": 3}));
        extend(&mut dest, vec![&b, &c]);
        assert_eq!(JsonValue::Object(dest), json!({"a": 2, "b": 3}));
    }

    #[test]
    fn deep_copy_applies_processors() {
        let options = CopyOptions::new()
            .key_processor(|k| k.to_uppercase())
            .value_processor(|v, k| match (v, k) {
                (JsonValue::Number(n), "N") => json!(n.as_i64().unwrap_or(0) * 10),
                _ => v.clone(),
            })
            .ignore("raw");
        let data = json!({"n": 1, "nested": {"n": 2}, "raw": {"n": 3}, "list": [{"n": 4}]});
        assert_eq!(
            deep_copy_with(&data, &options),
            json!({"N": 10, "NESTED": {"N": 20}, "raw": {"n": 3}, "LIST": [{"N": 40}]})
        );
    }

    #[test]
    fn deep_copy_without_processors_is_a_copy() {
        let data = json!(["A", {"one": 1}, {"b": [2]}]);
        assert_eq!(deep_copy_with(&data, &CopyOptions::new()), data);
        assert_eq!(deep_copy_with(&json!(1), &CopyOptions::new()), json!(1));
    }

    #[test]
    fn parse_nested_json_strings() {
        let data = json!({"a": "{\"b\": \"[1, 2]\"}", "c": "12", "d": "plain"});
        assert_eq!(
            parse_nested_json(data),
            json!({"a": {"b": [1, 2]}, "c": "12", "d": "plain"})
        );
    }

    #[test]
    fn check_values_validity() {
        assert!(check_values(&[json!([1]), json!(0), json!("x"), json!(true), json!({})]));
        assert!(!check_values(&[json!([])]));
        assert!(!check_values(&[json!("  ")]));
        assert!(!check_values(&[json!(null)]));
        assert!(!check_values(&[json!(1), json!(false)]));
    }
}
