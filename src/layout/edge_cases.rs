//! Edge case tests for layout compilation
//!
//! Covers:
//! - Degenerate inputs (no channels, no tokens, no methods)
//! - Nested and repeated groups
//! - Lookups that fail for every cell
//! - Pattern corner cases

use super::*;
use std::path::PathBuf;

/// Lookup with nothing in it
struct EmptyLookup;

impl ResultLookup for EmptyLookup {
    fn statistic(&self, _: &str, _: &LookupContext<'_>, _: usize) -> Option<RawValue> {
        None
    }

    fn passthrough(&self, _: &str, _: usize) -> Option<RawValue> {
        None
    }
}

/// Lookup answering NaN for every statistic
struct NanLookup;

impl ResultLookup for NanLookup {
    fn statistic(&self, _: &str, _: &LookupContext<'_>, _: usize) -> Option<RawValue> {
        Some(RawValue::Number(f64::NAN))
    }

    fn passthrough(&self, _: &str, _: usize) -> Option<RawValue> {
        Some(RawValue::Number(f64::NAN))
    }
}

fn default_tree() -> TokenTree {
    let catalog = StatisticsCatalog::builtin();
    build_tree(
        &[
            "plate",
            "position",
            "replicate",
            "extra",
            "group_channels_start",
            "score",
            "group_replicates_start",
            "raw",
            "normalized",
            "group_replicates_end",
            "group_channels_end",
            "gene_symbol",
        ],
        &catalog,
    )
    .expect("default tree")
}

/// Helper: every produced row matches the schema position by position
fn assert_parallel(tree: &TokenTree, options: &LayoutOptions, lookup: &dyn ResultLookup, reps: usize) {
    let columns = expand_spec(tree, options);
    let rows = expand_values(tree, options, lookup, 0, reps);
    for row in &rows {
        assert_eq!(row.len(), columns.len(), "arity drift for {:?}", options);
        for (cell, column) in row.iter().zip(&columns) {
            assert!(cell.matches_column(column), "{:?} in {:?}", cell, column);
        }
    }
}

fn opts(params: &[&str], include_replicates: bool, extra: usize) -> LayoutOptions {
    let extra_columns = (0..extra)
        .map(|i| ExtraColumn::new(format!("col{}", i), ValueType::String))
        .collect();
    LayoutOptions::new(params.iter().map(|s| s.to_string()).collect(), include_replicates)
        .with_extra_columns(extra_columns)
}

// ============================================================================
// Degenerate inputs
// ============================================================================

#[test]
fn test_no_channels_selected() {
    let tree = default_tree();
    let options = opts(&[], true, 0);
    let columns = expand_spec(&tree, &options);
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["plate", "position", "replicate", "gene_symbol"]);

    // No replicate-dependent token is reachable without channels
    let rows = expand_values(&tree, &options, &EmptyLookup, 0, 3);
    assert_eq!(rows.len(), 1);
}

#[test]
fn test_parallelism_across_inputs() {
    let tree = default_tree();
    for params in [&[][..], &["A"][..], &["A", "B", "C"][..]] {
        for include in [false, true] {
            for extra in [0, 2] {
                for reps in [1, 2, 4] {
                    let options = opts(params, include, extra);
                    assert_parallel(&tree, &options, &EmptyLookup, reps);
                    assert_parallel(&tree, &options, &NanLookup, reps);
                }
            }
        }
    }
}

#[test]
fn test_row_arity_follows_reachability() {
    let tree = default_tree();
    for params in [&[][..], &["A"][..], &["A", "B"][..]] {
        for include in [false, true] {
            let options = opts(params, include, 1);
            let rows = expand_values(&tree, &options, &EmptyLookup, 0, 3);
            let expected = if tree.has_replicate_tokens(include, &options.params) {
                3
            } else {
                1
            };
            assert_eq!(rows.len(), expected, "params={:?} include={}", params, include);
        }
    }
}

#[test]
fn test_nan_everywhere_is_missing() {
    let tree = default_tree();
    let options = opts(&["A", "B"], true, 2);
    let rows = expand_values(&tree, &options, &NanLookup, 0, 2);
    let columns = expand_spec(&tree, &options);
    let replicate_col = columns.iter().position(|c| c.name == "replicate").unwrap();

    for (r, row) in rows.iter().enumerate() {
        for (idx, cell) in row.iter().enumerate() {
            if idx == replicate_col {
                assert_eq!(*cell, Cell::Int(r as i64 + 1));
            } else {
                assert!(cell.is_missing(), "column {} should be missing", columns[idx].name);
            }
        }
    }
}

#[test]
fn test_marker_only_list() {
    let catalog = StatisticsCatalog::builtin();
    let tree = build_tree(
        &[
            "group_channels_start",
            "group_replicates_start",
            "group_replicates_end",
            "group_channels_end",
        ],
        &catalog,
    )
    .unwrap();
    assert_eq!(tree.leaf_count(), 0);
    assert!(expand_spec(&tree, &opts(&["A"], true, 0)).is_empty());
}

// ============================================================================
// Groups
// ============================================================================

#[test]
fn test_nested_channel_groups_multiply() {
    let catalog = StatisticsCatalog::builtin();
    let tree = build_tree(
        &[
            "group_channels_start",
            "group_channels_start",
            "score",
            "group_channels_end",
            "group_channels_end",
        ],
        &catalog,
    )
    .unwrap();
    // Inner group rebinds the channel, outer group repeats it
    let columns = expand_spec(&tree, &opts(&["A", "B"], false, 0));
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["score_A", "score_B", "score_A", "score_B"]);
}

#[test]
fn test_replicate_group_outside_channels() {
    let catalog = StatisticsCatalog::builtin();
    let tree = build_tree(
        &["group_replicates_start", "raw", "group_replicates_end"],
        &catalog,
    )
    .unwrap();
    let columns = expand_spec(&tree, &opts(&["A", "B"], true, 0));
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["raw_A", "raw_B"]);
    assert!(expand_spec(&tree, &opts(&["A", "B"], false, 0)).is_empty());
}

#[test]
fn test_repeated_statistic_is_allowed() {
    let catalog = StatisticsCatalog::builtin();
    let tree = build_tree(&["plate", "plate"], &catalog).unwrap();
    assert_eq!(expand_spec(&tree, &opts(&[], false, 0)).len(), 2);
}

#[test]
fn test_unbalanced_list_is_rejected() {
    let catalog = StatisticsCatalog::builtin();
    let result = build_tree(&["group_channels_start", "score"], &catalog);
    assert!(matches!(result, Err(LayoutError::SchemaMismatch(_))));
}

// ============================================================================
// Patterns
// ============================================================================

#[test]
fn test_empty_pattern() {
    let subs = Substitutions {
        output_dir: PathBuf::from("/base"),
        ..Default::default()
    };
    let folders = compile("", &["median"], &subs).unwrap();
    assert_eq!(folders.get("median").unwrap(), PathBuf::from("/base"));
}

#[test]
fn test_empty_block() {
    let subs = Substitutions {
        output_dir: PathBuf::from("/base"),
        ..Default::default()
    };
    let folders = compile("a{}b", &["median"], &subs).unwrap();
    assert_eq!(folders.get("median").unwrap(), PathBuf::from("/base").join("ab"));
}

#[test]
fn test_digits_without_placeholder_are_ignored() {
    let subs = Substitutions {
        experiment: "experiment".to_string(),
        output_dir: PathBuf::from("/base"),
        ..Default::default()
    };
    let folders = compile("{12e}", &["median"], &subs).unwrap();
    assert_eq!(folders.get("median").unwrap(), PathBuf::from("/base").join("experiment"));
}

#[test]
fn test_multiple_n_in_one_pattern() {
    let subs = Substitutions {
        output_dir: PathBuf::from("/base"),
        ..Default::default()
    };
    let folders = compile("{n}_{n2}", &["median", "POC"], &subs).unwrap();
    assert_eq!(folders.get("median").unwrap(), PathBuf::from("/base").join("median_me"));
    assert_eq!(folders.get("POC").unwrap(), PathBuf::from("/base").join("POC_PO"));
}

#[test]
fn test_unicode_in_literals() {
    let subs = Substitutions {
        experiment: "run".to_string(),
        output_dir: PathBuf::from("/base"),
        ..Default::default()
    };
    let folders = compile("é_{e}", &["median"], &subs).unwrap();
    assert_eq!(folders.get("median").unwrap(), PathBuf::from("/base").join("é_run"));

    let err = compile("é{e", &["median"], &subs).unwrap_err();
    assert!(matches!(err, LayoutError::Configuration(msg) if msg.contains("offset 2")));
}
