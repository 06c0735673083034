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

//! Utilities for flat JSON record lists and GeoJSON values.
//!
//! The central piece is the list-to-tree conversion: a flat, ordered list of
//! records carrying an id and a parent id is turned into a forest of nested
//! records.
//!
//! ```
//! use geostar_util::{format_list_to_tree, TreeOptions};
//! use serde_json::json;
//!
//! let data = json!([{"id": 1}, {"id": 2}, {"id": 3, "pid": 1}]);
//! let forest = format_list_to_tree(&data, &TreeOptions::default());
//!
//! assert_eq!(
//!     serde_json::Value::Array(forest),
//!     json!([{"id": 1, "children": [{"id": 3, "pid": 1}]}, {"id": 2}])
//! );
//! ```
//!
//! The [`object`], [`array`], [`math`], [`date`] and [`transform`] modules
//! carry the smaller helpers: deep merges, record sorting, statistics, date
//! formatting and EPSG:4326 / EPSG:3857 reprojection of GeoJSON values.

mod error;
mod options;
mod tree;
mod util;

pub mod array;
pub mod date;
pub mod math;
pub mod object;
pub mod transform;

pub use crate::error::Error;
pub use crate::options::{Labels, OrphanPolicy, Strategy, TreeOptions};
pub use crate::tree::{build_tree, count_nodes, format_list_to_tree, format_tree, validate};

/// An ordered sequence of top-level tree nodes.
pub type Forest = Vec<json::JsonValue>;

pub mod json {
    pub use serde::{Deserialize, Deserializer, Serialize, Serializer};
    pub use serde_json::{Map, Value as JsonValue};

    /// A JSON object, i.e. one record.
    pub type JsonObject = Map<String, JsonValue>;
}
