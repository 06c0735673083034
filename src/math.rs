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

//! Small numeric helpers.

use std::collections::HashMap;
use std::hash::Hash;
use std::ops::RangeInclusive;

/// Median of `numbers`, or 0 for an empty slice.
pub fn median(numbers: &[f64]) -> f64 {
    if numbers.is_empty() {
        return 0.0;
    }
    let mut sorted = numbers.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Most frequent item. On a tie the item that reached the top count first
/// wins.
pub fn mode<T>(items: &[T]) -> Option<T>
where
    T: Eq + Hash + Clone,
{
    let mut counts: HashMap<&T, usize> = HashMap::new();
    let mut best: Option<(&T, usize)> = None;
    for item in items {
        let count = counts.entry(item).or_insert(0);
        *count += 1;
        if best.map_or(true, |(_, top)| *count > top) {
            best = Some((item, *count));
        }
    }
    best.map(|(item, _)| item.clone())
}

/// Values from `start` to `end` inclusive, `step` apart, leaving out those
/// inside any of the `skip` windows. A non-positive step, or a bound that is
/// not finite, gives nothing.
///
/// ```
/// use geostar_util::math::range;
///
/// assert_eq!(range(0.0, 10.0, 1.0, &[2.0..=4.0, 7.0..=8.0]), vec![0.0, 1.0, 5.0, 6.0, 9.0, 10.0]);
/// ```
pub fn range(start: f64, end: f64, step: f64, skip: &[RangeInclusive<f64>]) -> Vec<f64> {
    let mut values = Vec::new();
    if !(step > 0.0) || !start.is_finite() || !end.is_finite() {
        return values;
    }
    let mut n = 0u64;
    loop {
        // Computed from the start every time so the steps do not drift.
        let value = start + step * n as f64;
        if !(value <= end) {
            break;
        }
        if !skip.iter().any(|window| window.contains(&value)) {
            values.push(value);
        }
        n += 1;
    }
    values
}

/// Format `num` with exactly `digits` decimals, rounding or truncating.
///
/// Rounding is done on the exact binary value, halfway cases going away from
/// zero: `2.5` gives `"3"`, while `1.005` (stored just below) gives `"1.00"`.
///
/// A result reading as zero loses its minus sign unless `keep_negative_zero`
/// is set. Non-finite numbers are printed as they are.
pub fn fixed_decimal(num: f64, digits: usize, round: bool, keep_negative_zero: bool) -> String {
    if !num.is_finite() {
        return num.to_string();
    }
    let text = if round {
        round_half_up(num, digits)
    } else {
        truncate_decimal(num, digits)
    };
    let is_zero = text.parse::<f64>().map_or(false, |v| v == 0.0);
    match text.strip_prefix('-') {
        Some(unsigned) if is_zero && !keep_negative_zero => unsigned.to_owned(),
        _ => text,
    }
}

// Longest fractional part of the exact decimal expansion of an f64.
const EXACT_DIGITS: usize = 1074;

fn round_half_up(num: f64, digits: usize) -> String {
    // With enough precision the formatter prints the exact value, unrounded.
    let exact = format!("{:.*}", EXACT_DIGITS.max(digits) + 1, num.abs());
    let (integer, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut kept: Vec<u8> = integer
        .bytes()
        .chain(fraction.bytes().take(digits))
        .collect();
    if fraction.as_bytes().get(digits).map_or(false, |&d| d >= b'5') {
        let mut i = kept.len();
        loop {
            if i == 0 {
                kept.insert(0, b'1');
                break;
            }
            i -= 1;
            if kept[i] == b'9' {
                kept[i] = b'0';
            } else {
                kept[i] += 1;
                break;
            }
        }
    }
    let mut text = String::with_capacity(kept.len() + 2);
    if num.is_sign_negative() {
        text.push('-');
    }
    let split = kept.len() - digits;
    text.extend(kept[..split].iter().map(|&b| b as char));
    if digits > 0 {
        text.push('.');
        text.extend(kept[split..].iter().map(|&b| b as char));
    }
    text
}

fn truncate_decimal(num: f64, digits: usize) -> String {
    let text = num.to_string();
    let (integer, decimal) = match text.split_once('.') {
        Some((i, d)) => (i, d),
        None => (text.as_str(), ""),
    };
    if digits == 0 {
        return integer.to_owned();
    }
    let mut decimal: String = decimal.chars().take(digits).collect();
    while decimal.len() < digits {
        decimal.push('0');
    }
    format!("{}.{}", integer, decimal)
}
