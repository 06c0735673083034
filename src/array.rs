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

//! Helpers for plain slices and for arrays of JSON records.

use std::cmp::Ordering;

use crate::json::JsonValue;
use crate::util;

/// Sort direction for [`sort_by_field`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Flatten nested arrays at any depth. A non-array value gives a
/// one-element list.
pub fn flatten(value: &JsonValue) -> Vec<JsonValue> {
    let mut flat = Vec::new();
    flatten_into(value, &mut flat);
    flat
}

fn flatten_into(value: &JsonValue, flat: &mut Vec<JsonValue>) {
    match value {
        JsonValue::Array(items) => {
            for item in items {
                flatten_into(item, flat);
            }
        }
        other => flat.push(other.clone()),
    }
}

/// Split `items` into groups of `size`, the last group holding what is left.
/// A zero `size` gives no groups.
///
/// ```
/// use geostar_util::array::chunk;
///
/// assert_eq!(chunk(&["a", "b", "c", "d"], 3), vec![vec!["a", "b", "c"], vec!["d"]]);
/// ```
pub fn chunk<T: Clone>(items: &[T], size: usize) -> Vec<Vec<T>> {
    if size == 0 {
        return Vec::new();
    }
    items.chunks(size).map(<[T]>::to_vec).collect()
}

/// Rotate `items` left by `times` places, wrapping around: the first
/// element moves to the end each time.
pub fn rotate_left<T>(items: &mut [T], times: usize) {
    if !items.is_empty() {
        let times = times % items.len();
        items.rotate_left(times);
    }
}

/// Rotate `items` right by `times` places, wrapping around: the last
/// element moves to the front each time.
pub fn rotate_right<T>(items: &mut [T], times: usize) {
    if !items.is_empty() {
        let times = times % items.len();
        items.rotate_right(times);
    }
}

/// Sort numbers from smallest to largest. `NaN` goes last.
pub fn sort_ascending(numbers: &mut [f64]) {
    numbers.sort_by(|a, b| match (a.is_nan(), b.is_nan()) {
        (false, false) => a.total_cmp(b),
        (x, y) => x.cmp(&y),
    });
}

/// Sort numbers from largest to smallest. `NaN` goes last.
pub fn sort_descending(numbers: &mut [f64]) {
    numbers.sort_by(|a, b| match (a.is_nan(), b.is_nan()) {
        (false, false) => b.total_cmp(a),
        (x, y) => x.cmp(&y),
    });
}

/// Keep the records whose `key` value appears in `order`, sorted by that
/// position.
///
/// ```
/// use geostar_util::array::filter_sort;
/// use serde_json::json;
///
/// let src = json!([{"id": "name2"}, {"id": "name1"}, {"name": "tom"}]);
/// let sorted = filter_sort(&src, &[json!("name1"), json!("name2")], "id");
/// assert_eq!(sorted, vec![json!({"id": "name1"}), json!({"id": "name2"})]);
/// ```
pub fn filter_sort(src: &JsonValue, order: &[JsonValue], key: &str) -> Vec<JsonValue> {
    let records = match src.as_array() {
        Some(r) => r,
        None => return Vec::new(),
    };
    let position = |record: &JsonValue| {
        record
            .get(key)
            .and_then(|v| order.iter().position(|o| util::strict_eq(o, v)))
    };
    let mut kept: Vec<(usize, &JsonValue)> = records
        .iter()
        .filter_map(|r| position(r).map(|p| (p, r)))
        .collect();
    kept.sort_by_key(|&(p, _)| p);
    kept.into_iter().map(|(_, r)| r.clone()).collect()
}

fn numeric_field(record: &JsonValue, key: &str) -> Option<f64> {
    record.get(key).and_then(JsonValue::as_f64)
}

/// Stable sort of records by the numeric value of `key`. Records without a
/// numeric `key` keep their relative order after all the others.
pub fn sort_by_field(records: &mut [JsonValue], key: &str, order: Order) {
    records.sort_by(|a, b| match (numeric_field(a, key), numeric_field(b, key)) {
        (Some(x), Some(y)) => {
            let ord = x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            match order {
                Order::Ascending => ord,
                Order::Descending => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn extreme_by_field<'a>(
    records: &'a [JsonValue],
    key: &str,
    wins: fn(f64, f64) -> bool,
) -> Option<&'a JsonValue> {
    let mut best: Option<(f64, &JsonValue)> = None;
    for record in records {
        if let Some(value) = numeric_field(record, key) {
            match best {
                Some((current, _)) if !wins(value, current) => {}
                _ => best = Some((value, record)),
            }
        }
    }
    best.map(|(_, record)| record)
}

/// First record holding the largest numeric `key`.
pub fn max_by_field<'a>(records: &'a [JsonValue], key: &str) -> Option<&'a JsonValue> {
    extreme_by_field(records, key, |a, b| a > b)
}

/// First record holding the smallest numeric `key`.
pub fn min_by_field<'a>(records: &'a [JsonValue], key: &str) -> Option<&'a JsonValue> {
    extreme_by_field(records, key, |a, b| a < b)
}
