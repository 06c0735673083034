extern crate geostar_util;
extern crate serde_json;

use std::env;
use std::fs;

use geostar_util::{build_tree, count_nodes, Strategy, TreeOptions};

// Usage: list_to_tree <records.json> [options.json]
pub fn main() {
    let args: Vec<String> = env::args().collect();
    let data = match args.get(1) {
        Some(path) => {
            let contents = fs::read_to_string(path).expect("Unable to read file");
            serde_json::from_str(&contents).expect("unable to parse records")
        }
        None => serde_json::json!([
            {"id": 1, "pid": 0, "name": "root"},
            {"id": 2, "pid": 1, "name": "branch"},
            {"id": 3, "pid": 2, "name": "leaf"},
            {"id": 4, "pid": 0, "name": "other root"}
        ]),
    };
    let options: TreeOptions = match args.get(2) {
        Some(path) => fs::read_to_string(path)
            .expect("Unable to read file")
            .parse()
            .expect("unable to parse options"),
        None => TreeOptions::default(),
    };

    for strategy in [Strategy::Indexed, Strategy::Recursive] {
        let options = TreeOptions {
            strategy,
            ..options.clone()
        };
        let forest = build_tree(&data, &options).expect("Unable to build the tree");
        println!(
            "{:?}: {} nodes\n{}",
            strategy,
            count_nodes(&forest, &options.children),
            serde_json::to_string_pretty(&forest).expect("Unable to serialize the tree")
        );
    }
}
