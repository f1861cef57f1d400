//! Builds LightGBM-style model artifacts on disk for integration tests.

use safebrowse_core::features::{feature_index, FEATURE_COUNT};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::NamedTempFile;

pub fn leaf(value: f64) -> Value {
    json!({ "leaf_index": 0, "leaf_value": value })
}

pub fn split(feature: &str, threshold: f64, left: Value, right: Value) -> Value {
    json!({
        "split_index": 0,
        "split_feature": feature_index(feature).expect("known feature"),
        "split_gain": 1.0,
        "threshold": threshold,
        "decision_type": "<=",
        "default_left": true,
        "missing_type": "None",
        "left_child": left,
        "right_child": right,
    })
}

pub fn artifact(trees: Vec<Value>, mean: Vec<f64>, scale: Vec<f64>) -> Value {
    let tree_info: Vec<Value> = trees
        .into_iter()
        .enumerate()
        .map(|(i, t)| json!({ "tree_index": i, "num_leaves": 2, "shrinkage": 0.1, "tree_structure": t }))
        .collect();
    json!({
        "model": {
            "name": "tree",
            "version": "v4",
            "num_class": 1,
            "objective": "binary sigmoid:1",
            "max_feature_idx": FEATURE_COUNT - 1,
            "tree_info": tree_info,
        },
        "scaler_mean": mean,
        "scaler_scale": scale,
    })
}

/// Two-tree model where `http://g00gle-secure-login.ru/update?id=12345`
/// scales to `count_hyphen = 2.0` and `tld_len = 3.0`, both routing right.
pub fn phishing_example() -> Value {
    let mut mean = vec![0.0; FEATURE_COUNT];
    mean[feature_index("tld_len").expect("known feature")] = -1.0;
    artifact(
        vec![
            split("count_hyphen", 1.5, leaf(-0.2), leaf(0.8)),
            split("tld_len", 2.5, leaf(-0.6), leaf(1.3)),
        ],
        mean,
        vec![1.0; FEATURE_COUNT],
    )
}

pub fn write(doc: &Value) -> NamedTempFile {
    let mut f = NamedTempFile::new().expect("temp file");
    f.write_all(doc.to_string().as_bytes()).expect("write artifact");
    f.flush().expect("flush artifact");
    f
}
