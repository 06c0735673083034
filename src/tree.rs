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

use std::collections::{HashMap, HashSet};

use crate::json::{JsonObject, JsonValue};
use crate::{util, Error, Forest, OrphanPolicy, Strategy, TreeOptions};

/// Convert a flat list of records into a forest, using `options.strategy`.
///
/// Every output node is a copy of its input record; `data` is never
/// modified. Fails with [`Error::InvalidInput`] when `data` is not an array,
/// and with the [`validate`] diagnostics when `options.strict` is set.
///
/// # Depth
///
/// The forest is a nested `serde_json::Value`, and building, counting and
/// dropping it recurse once per level. A parent chain tens of thousands of
/// records deep can overflow a 2 MB thread stack; run such inputs on a thread
/// spawned with a larger stack (see [`std::thread::Builder::stack_size`]).
pub fn build_tree(data: &JsonValue, options: &TreeOptions) -> Result<Forest, Error> {
    let records = data.as_array().ok_or(Error::InvalidInput)?;
    if options.strict {
        check(records, options, options.strategy)?;
    }
    Ok(match options.strategy {
        Strategy::Indexed => assemble_indexed(records, options),
        Strategy::Recursive => assemble_recursive(records, options),
    })
}

/// Convert a flat list into a forest in a single pass.
///
/// A record is attached to the last record seen so far whose id equals its
/// parent id; otherwise it becomes a top-level node. A parent listed after
/// its child therefore does not adopt it. Never fails: anything other than an
/// array gives an empty forest. `strategy` and `strict` are not consulted.
/// Deep chains need a large stack, as described on [`build_tree`].
///
/// ```
/// use geostar_util::{format_list_to_tree, TreeOptions};
/// use serde_json::json;
///
/// let forest = format_list_to_tree(&json!([{"id": 3, "pid": 9}, {"id": 9}]), &TreeOptions::default());
/// assert_eq!(forest, vec![json!({"id": 3, "pid": 9}), json!({"id": 9})]);
/// ```
pub fn format_list_to_tree(data: &JsonValue, options: &TreeOptions) -> Forest {
    match data {
        JsonValue::Array(records) => assemble_indexed(records, options),
        _ => {
            log::debug!("list-to-tree input is not an array, returning an empty forest");
            Vec::new()
        }
    }
}

/// Convert a flat list into a forest rooted at the records whose parent id
/// equals `options.root`, searching children recursively.
///
/// Ids are compared strictly (`1` does not match `"1"`). Records that cannot
/// be reached from a root are dropped unless `options.orphans` is
/// [`OrphanPolicy::Promote`]. `strategy` is not consulted; `strict` is.
/// Deep chains need a large stack, as described on [`build_tree`].
pub fn format_tree(data: &JsonValue, options: &TreeOptions) -> Result<Forest, Error> {
    let records = data.as_array().ok_or(Error::InvalidInput)?;
    if options.strict {
        check(records, options, Strategy::Recursive)?;
    }
    Ok(assemble_recursive(records, options))
}

/// Check that every record is an object carrying the id and parent id fields,
/// that ids are unique and that every parent id resolves the way
/// `options.strategy` matches it.
///
/// With [`Strategy::Indexed`] ids match by text (`1` is `"1"`) and a `null`
/// parent id marks a root. With [`Strategy::Recursive`] a parent id must be
/// strictly equal to `options.root` or to some record's id, so `null` is a
/// root only when `root` is `null` too.
pub fn validate(records: &[JsonValue], options: &TreeOptions) -> Result<(), Error> {
    check(records, options, options.strategy)
}

fn check(records: &[JsonValue], options: &TreeOptions, strategy: Strategy) -> Result<(), Error> {
    let mut ids = HashSet::with_capacity(records.len());
    let mut typed_ids = HashSet::with_capacity(records.len());
    let mut objects = Vec::with_capacity(records.len());
    for record in records {
        let object = util::expect_object(record)?;
        let id = match object.get(&options.id) {
            Some(id) => id,
            None => return Err(invalid(Error::MissingField(options.id.to_owned()))),
        };
        if !object.contains_key(&options.pid) {
            return Err(invalid(Error::MissingField(options.pid.to_owned())));
        }
        let key = util::describe(Some(id));
        if !ids.insert(util::scalar_key(id).unwrap_or_else(|| key.clone())) {
            return Err(invalid(Error::DuplicateId(key)));
        }
        if let Some(typed) = typed_key(id) {
            typed_ids.insert(typed);
        }
        objects.push(object);
    }
    for object in objects {
        let pid = match object.get(&options.pid) {
            Some(pid) => pid,
            None => continue,
        };
        if util::strict_eq(pid, &options.root) {
            continue;
        }
        let known = match strategy {
            Strategy::Indexed => {
                pid.is_null() || util::scalar_key(pid).map_or(false, |k| ids.contains(&k))
            }
            Strategy::Recursive => typed_key(pid).map_or(false, |k| typed_ids.contains(&k)),
        };
        if !known {
            return Err(invalid(Error::DanglingParent {
                id: util::describe(object.get(&options.id)),
                pid: util::describe(Some(pid)),
            }));
        }
    }
    Ok(())
}

// Text key tagged with the JSON type, so that two values share a key exactly
// when they are strictly equal.
fn typed_key(value: &JsonValue) -> Option<String> {
    let tag = match value {
        JsonValue::Null => 'z',
        JsonValue::Bool(_) => 'b',
        JsonValue::Number(_) => 'n',
        JsonValue::String(_) => 's',
        JsonValue::Array(_) | JsonValue::Object(_) => return None,
    };
    util::scalar_key(value).map(|k| format!("{}{}", tag, k))
}

fn invalid(e: Error) -> Error {
    log::warn!("tree input rejected: {}", e);
    e
}

/// Number of nodes reachable in `forest` through the `children` field.
pub fn count_nodes(forest: &[JsonValue], children: &str) -> usize {
    forest
        .iter()
        .map(|node| {
            1 + match node.get(children) {
                Some(JsonValue::Array(kids)) => count_nodes(kids, children),
                _ => 0,
            }
        })
        .sum()
}

// Append `kids` to the node's children array, creating it when absent.
fn attach(node: &mut JsonValue, kids: Vec<JsonValue>, options: &TreeOptions) {
    let object = match node.as_object_mut() {
        Some(o) => o,
        None => return,
    };
    if kids.is_empty() && !options.empty_children {
        return;
    }
    match object.get_mut(&options.children) {
        Some(JsonValue::Array(existing)) => existing.extend(kids),
        _ => {
            object.insert(options.children.to_owned(), JsonValue::Array(kids));
        }
    }
}

fn assemble_indexed(records: &[JsonValue], options: &TreeOptions) -> Forest {
    log::debug!("assembling {} records with the id index", records.len());

    let mut nodes = Vec::with_capacity(records.len());
    let mut children: Vec<Vec<usize>> = Vec::with_capacity(records.len());
    let mut roots = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let mut node = record.clone();
        let parent = match node.as_object_mut() {
            Some(object) => {
                // The id is read before labelling, the parent id after.
                let key = object
                    .get(&options.id)
                    .filter(|id| util::is_truthy(id))
                    .and_then(util::scalar_key);
                if let Some(labels) = &options.labels {
                    labels.apply(object);
                }
                let parent = object
                    .get(&options.pid)
                    .and_then(util::scalar_key)
                    .and_then(|k| index.get(&k).copied());
                if let Some(key) = key {
                    index.insert(key, i);
                }
                parent
            }
            None => {
                log::warn!("record {} is not an object, keeping it at the top level", i);
                None
            }
        };
        match parent {
            Some(p) => {
                log::trace!("record {} attached under record {}", i, p);
                children[p].push(i);
            }
            None => roots.push(i),
        }
        nodes.push(Some(node));
        children.push(Vec::new());
    }

    // A parent always precedes its children, so building from the back
    // finishes every subtree before its parent takes it.
    for i in (0..nodes.len()).rev() {
        let kids: Vec<JsonValue> = children[i]
            .iter()
            .filter_map(|&c| nodes[c].take())
            .collect();
        if let Some(node) = nodes[i].as_mut() {
            attach(node, kids, options);
        }
    }

    roots.iter().filter_map(|&r| nodes[r].take()).collect()
}

struct Descent<'a> {
    records: Vec<Option<&'a JsonObject>>,
    remaining: Vec<usize>,
    reached: Vec<bool>,
    // Records already taken on the way down from the current root.
    on_path: Vec<bool>,
    options: &'a TreeOptions,
}

impl<'a> Descent<'a> {
    fn parent_id(&self, i: usize) -> Option<&'a JsonValue> {
        self.records[i].and_then(|r| r.get(&self.options.pid))
    }

    fn subtree(&mut self, node: usize) -> JsonValue {
        self.reached[node] = true;
        let object = match self.records[node] {
            Some(o) => o,
            None => return JsonValue::Null,
        };
        let mut kids = Vec::new();
        if let Some(id) = object.get(&self.options.id) {
            for j in 0..self.remaining.len() {
                let candidate = self.remaining[j];
                if self.on_path[candidate] {
                    continue;
                }
                let matches = self
                    .parent_id(candidate)
                    .map_or(false, |pid| util::strict_eq(pid, id));
                if matches {
                    log::trace!("record {} attached under record {}", candidate, node);
                    self.on_path[candidate] = true;
                    kids.push(self.subtree(candidate));
                    self.on_path[candidate] = false;
                }
            }
        }
        let mut value = JsonValue::Object(object.clone());
        attach(&mut value, kids, self.options);
        value
    }

    // An unreached record with no unreached parent, or failing that (only
    // cycles are left) the first unreached record.
    fn next_orphan(&self) -> Option<usize> {
        let unreached: Vec<usize> = self
            .remaining
            .iter()
            .copied()
            .filter(|&i| !self.reached[i] && self.records[i].is_some())
            .collect();
        let has_unreached_parent = |i: usize| {
            let pid = match self.parent_id(i) {
                Some(pid) => pid,
                None => return false,
            };
            unreached.iter().any(|&j| {
                j != i
                    && self.records[j]
                        .and_then(|r| r.get(&self.options.id))
                        .map_or(false, |id| util::strict_eq(pid, id))
            })
        };
        unreached
            .iter()
            .copied()
            .find(|&i| !has_unreached_parent(i))
            .or_else(|| unreached.first().copied())
    }
}

fn assemble_recursive(records: &[JsonValue], options: &TreeOptions) -> Forest {
    log::debug!(
        "assembling {} records by recursive descent from root {}",
        records.len(),
        options.root
    );

    let objects: Vec<Option<&JsonObject>> = records.iter().map(JsonValue::as_object).collect();
    let (parents, remaining): (Vec<usize>, Vec<usize>) = (0..records.len()).partition(|&i| {
        objects[i]
            .and_then(|r| r.get(&options.pid))
            .map_or(false, |pid| util::strict_eq(pid, &options.root))
    });

    let mut descent = Descent {
        records: objects,
        remaining,
        reached: vec![false; records.len()],
        on_path: vec![false; records.len()],
        options,
    };

    let mut forest = Vec::with_capacity(parents.len());
    for p in parents {
        forest.push(descent.subtree(p));
    }

    match options.orphans {
        OrphanPolicy::Discard => {
            let dropped = descent
                .remaining
                .iter()
                .filter(|&&i| !descent.reached[i])
                .count();
            if dropped > 0 {
                log::debug!("{} records not reachable from a root were dropped", dropped);
            }
        }
        OrphanPolicy::Promote => {
            while let Some(orphan) = descent.next_orphan() {
                log::trace!("record {} promoted to the top level", orphan);
                descent.on_path[orphan] = true;
                forest.push(descent.subtree(orphan));
                descent.on_path[orphan] = false;
            }
        }
    }

    forest
}
