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

use crate::json::{JsonObject, JsonValue};
use crate::Error;

pub fn expect_string(value: &JsonValue) -> Result<String, Error> {
    match value {
        JsonValue::String(s) => Ok(s.to_owned()),
        _ => Err(Error::ExpectedStringValue),
    }
}

pub fn expect_bool(value: &JsonValue) -> Result<bool, Error> {
    match value.as_bool() {
        Some(v) => Ok(v),
        None => Err(Error::ExpectedBoolValue),
    }
}

pub fn expect_object(value: &JsonValue) -> Result<&JsonObject, Error> {
    match value.as_object() {
        Some(v) => Ok(v),
        None => Err(Error::ExpectedObjectValue),
    }
}

pub fn expect_owned_object(value: JsonValue) -> Result<JsonObject, Error> {
    match value {
        JsonValue::Object(o) => Ok(o),
        _ => Err(Error::ExpectedObjectValue),
    }
}

/// Parse a JSON text that must hold an object at its top level.
pub fn get_object(s: &str) -> Result<JsonObject, Error> {
    ::serde_json::from_str(s)
        .ok()
        .and_then(|v| expect_owned_object(v).ok())
        .ok_or(Error::MalformedJson)
}

/// Truthiness of a JSON value as understood by loosely typed callers.
///
/// `null`, `false`, `0`, `NaN`-like numbers and `""` are falsy; everything
/// else, including empty arrays and objects, is truthy.
pub fn is_truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    }
}

/// Text form of a scalar used as a map key. Numbers and strings with the
/// same text collide (`1` and `"1"`). Arrays and objects have no key.
pub fn scalar_key(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => Some("null".to_owned()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Number(n) => Some(number_text(n)),
        JsonValue::String(s) => Some(s.to_owned()),
        JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

// `1.0` and `1` print the same way.
fn number_text(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

/// Strict equality: same JSON type and value, numbers compared numerically.
pub fn strict_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Human readable rendering of an optional field, for diagnostics.
pub fn describe(value: Option<&JsonValue>) -> String {
    match value {
        None => "undefined".to_owned(),
        Some(JsonValue::String(s)) => s.to_owned(),
        Some(v) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_keys_collide_across_types() {
        assert_eq!(scalar_key(&json!(1)), scalar_key(&json!("1")));
        assert_eq!(scalar_key(&json!(1.0)), Some("1".to_owned()));
        assert_eq!(scalar_key(&json!(2.5)), Some("2.5".to_owned()));
        assert_eq!(scalar_key(&json!([1])), None);
    }

    #[test]
    fn strict_equality_keeps_types_apart() {
        assert!(strict_eq(&json!(1), &json!(1.0)));
        assert!(!strict_eq(&json!(1), &json!("1")));
        assert!(strict_eq(&json!("a"), &json!("a")));
        assert!(!strict_eq(&json!(null), &json!(0)));
    }

    #[test]
    fn truthiness() {
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(null)));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!([])));
    }

    #[test]
    fn get_object_rejects_non_objects() {
        assert_eq!(get_object("[1, 2]"), Err(Error::MalformedJson));
        assert_eq!(get_object("{"), Err(Error::MalformedJson));
        assert!(get_object("{\"id\": \"key\"}").is_ok());
    }
}
