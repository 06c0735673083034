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

use std::str::FromStr;

use crate::json::{Deserialize, Deserializer, JsonObject, JsonValue};
use crate::{util, Error};

/// How the flat list is assembled into a forest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Single pass over the input with an id index. A record can only be
    /// attached to a parent that appears before it.
    #[default]
    Indexed,
    /// Roots are the records whose parent id equals `root`; children are
    /// searched recursively among the remaining records. Worst-case cost is
    /// quadratic or worse; kept for its output order.
    Recursive,
}

impl FromStr for Strategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "indexed" => Ok(Strategy::Indexed),
            "recursive" => Ok(Strategy::Recursive),
            _ => Err(Error::UnknownStrategy(s.to_owned())),
        }
    }
}

/// What the recursive strategy does with records it never reaches from a root.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrphanPolicy {
    #[default]
    Discard,
    /// Append unreached records as extra top-level nodes, in input order.
    Promote,
}

impl FromStr for OrphanPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "discard" => Ok(OrphanPolicy::Discard),
            "promote" => Ok(OrphanPolicy::Promote),
            _ => Err(Error::UnknownOrphanPolicy(s.to_owned())),
        }
    }
}

/// Fields added to every record before assembly: each entry copies the value
/// of `source` into a new field named `target`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels(Vec<(String, String)>);

impl Labels {
    pub fn new() -> Self {
        Labels(Vec::new())
    }

    /// Add a `target` field that copies `source`.
    pub fn with(mut self, target: &str, source: &str) -> Self {
        self.0.push((target.to_owned(), source.to_owned()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(t, s)| (t.as_str(), s.as_str()))
    }

    /// Copy the labelled fields into `record`. Sources are read before any
    /// target is written; a missing source field adds nothing, and an
    /// existing `target` field then keeps its value rather than being removed.
    pub fn apply(&self, record: &mut JsonObject) {
        let added: Vec<(String, JsonValue)> = self
            .iter()
            .filter_map(|(target, source)| {
                record.get(source).map(|v| (target.to_owned(), v.clone()))
            })
            .collect();
        for (target, value) in added {
            record.insert(target, value);
        }
    }

    pub fn from_json_object(object: &JsonObject) -> Result<Self, Error> {
        let mut labels = Labels::new();
        for (target, source) in object {
            labels.0.push((target.to_owned(), util::expect_string(source)?));
        }
        Ok(labels)
    }
}

/// Options shared by every tree entry point.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeOptions {
    /// Name of the id field.
    pub id: String,
    /// Name of the parent id field.
    pub pid: String,
    /// Name of the field receiving the child nodes.
    pub children: String,
    /// Parent id value marking a root (recursive strategy only).
    pub root: JsonValue,
    pub labels: Option<Labels>,
    pub strategy: Strategy,
    pub orphans: OrphanPolicy,
    /// Give leaves an empty `children` array instead of leaving the field out.
    pub empty_children: bool,
    /// Report duplicate ids, dangling parents and missing fields as errors.
    pub strict: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            id: String::from("id"),
            pid: String::from("pid"),
            children: String::from("children"),
            root: JsonValue::from(0),
            labels: None,
            strategy: Strategy::default(),
            orphans: OrphanPolicy::default(),
            empty_children: false,
            strict: false,
        }
    }
}

impl TreeOptions {
    /// Read options from a JSON object, falling back to the defaults for
    /// absent keys. Unknown keys are ignored.
    pub fn from_json_object(object: JsonObject) -> Result<Self, Error> {
        let mut options = TreeOptions::default();
        for (key, value) in object {
            match key.as_str() {
                "id" => options.id = util::expect_string(&value)?,
                "pid" => options.pid = util::expect_string(&value)?,
                "children" | "child" => options.children = util::expect_string(&value)?,
                "root" => options.root = value,
                "labels" => {
                    options.labels = match value {
                        JsonValue::Null => None,
                        ref v => Some(Labels::from_json_object(util::expect_object(v)?)?),
                    }
                }
                "strategy" => options.strategy = util::expect_string(&value)?.parse()?,
                "orphans" => options.orphans = util::expect_string(&value)?.parse()?,
                "emptyChildren" => options.empty_children = util::expect_bool(&value)?,
                "strict" => options.strict = util::expect_bool(&value)?,
                _ => log::debug!("ignoring unknown tree option '{}'", key),
            }
        }
        Ok(options)
    }
}

impl FromStr for TreeOptions {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreeOptions::from_json_object(util::get_object(s)?)
    }
}

impl<'de> Deserialize<'de> for TreeOptions {
    fn deserialize<D>(deserializer: D) -> Result<TreeOptions, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::Error as SerdeError;

        let val = JsonObject::deserialize(deserializer)?;

        TreeOptions::from_json_object(val).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults() {
        let options = TreeOptions::default();
        assert_eq!(options.id, "id");
        assert_eq!(options.pid, "pid");
        assert_eq!(options.children, "children");
        assert_eq!(options.root, json!(0));
        assert_eq!(options.strategy, Strategy::Indexed);
        assert_eq!(options.orphans, OrphanPolicy::Discard);
        assert!(!options.empty_children);
        assert!(!options.strict);
    }

    #[test]
    fn decode_options_from_str() {
        let options: TreeOptions = "{\"id\":\"key\",\"child\":\"nodes\",\"root\":\"top\",\"labels\":{\"label\":\"name\"},\"strategy\":\"recursive\",\"orphans\":\"promote\",\"emptyChildren\":true,\"unknown\":1}"
            .parse()
            .unwrap();
        assert_eq!(options.id, "key");
        assert_eq!(options.pid, "pid");
        assert_eq!(options.children, "nodes");
        assert_eq!(options.root, json!("top"));
        assert_eq!(options.labels, Some(Labels::new().with("label", "name")));
        assert_eq!(options.strategy, Strategy::Recursive);
        assert_eq!(options.orphans, OrphanPolicy::Promote);
        assert!(options.empty_children);
    }

    #[test]
    fn decode_options_with_serde() {
        let options: TreeOptions =
            serde_json::from_value(json!({"pid": "parent", "strict": true})).unwrap();
        assert_eq!(options.pid, "parent");
        assert!(options.strict);

        let result = serde_json::from_value::<TreeOptions>(json!({"strategy": "bfs"}));
        assert!(result.is_err());
    }

    #[test]
    fn decode_invalid_options() {
        assert_eq!("[]".parse::<TreeOptions>(), Err(Error::MalformedJson));
        assert_eq!(
            "{\"id\": 3}".parse::<TreeOptions>(),
            Err(Error::ExpectedStringValue)
        );
        assert_eq!(
            "{\"strict\": \"yes\"}".parse::<TreeOptions>(),
            Err(Error::ExpectedBoolValue)
        );
        assert_eq!(
            "{\"labels\": [\"name\"]}".parse::<TreeOptions>(),
            Err(Error::ExpectedObjectValue)
        );
        assert_eq!(
            "{\"orphans\": \"keep\"}".parse::<TreeOptions>(),
            Err(Error::UnknownOrphanPolicy("keep".to_owned()))
        );
    }

    #[test]
    fn labels_skip_missing_sources() {
        let labels = Labels::new().with("label", "name").with("code", "missing");
        let mut record = json!({"id": 1, "name": "root"}).as_object().unwrap().clone();
        labels.apply(&mut record);
        assert_eq!(
            JsonValue::Object(record),
            json!({"id": 1, "name": "root", "label": "root"})
        );
    }

    #[test]
    fn labels_keep_target_without_source() {
        let labels = Labels::new().with("code", "missing").with("name", "id");
        let mut record = json!({"id": 1, "code": "A1", "name": "root"})
            .as_object()
            .unwrap()
            .clone();
        labels.apply(&mut record);
        assert_eq!(
            JsonValue::Object(record),
            json!({"id": 1, "code": "A1", "name": 1})
        );
    }
}
