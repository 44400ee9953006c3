pub mod errors;
pub mod expand;
pub mod lookup;
pub mod pattern;
pub mod serializers;
pub mod table;
pub mod tokens;
pub mod tree;
pub mod types;

#[cfg(test)]
mod edge_cases;

// Re-export key types for convenience
pub use errors::LayoutError;
pub use expand::{
    Emitter, LayoutOptions, Slot, SpecEmitter, ValueEmitter, expand_spec, expand_values, walk,
};
pub use lookup::{
    LookupContext, MethodResults, RawValue, ResultLookup, ResultRow, StatisticEntry, TableLookup,
    resolve,
};
pub use pattern::{FolderMap, Substitutions, abbreviate, compile};
pub use serializers::{JsonSerializer, TableSerializer, TsvSerializer};
pub use table::{MethodLayout, MethodTables, ResultTable, plan_methods};
pub use tokens::{Marker, StatisticsCatalog, TokenItem, parse_token_list};
pub use tree::{TokenNode, TokenTree};
pub use types::{Cell, ColumnDescriptor, ExtraColumn, Multiplicity, Row, StatToken, ValueType};

/// Parse a name list into a token tree: names → items → tree
///
/// Combines [`parse_token_list`] and [`TokenTree::parse`].
///
/// # Errors
///
/// * `LayoutError::Configuration` - a name is neither a statistic nor a group marker
/// * `LayoutError::SchemaMismatch` - group markers are unbalanced
///
/// # Example
///
/// ```
/// use cellhts_layout::layout::{LayoutOptions, StatisticsCatalog, build_tree, expand_spec};
///
/// let catalog = StatisticsCatalog::builtin();
/// let tree = build_tree(
///     &["plate", "group_channels_start", "score", "group_channels_end"],
///     &catalog,
/// )?;
/// let options = LayoutOptions::new(vec!["Cell Count".into()], false);
/// let names: Vec<String> = expand_spec(&tree, &options).into_iter().map(|c| c.name).collect();
/// assert_eq!(names, ["plate", "score_Cell Count"]);
/// # Ok::<(), cellhts_layout::layout::LayoutError>(())
/// ```
pub fn build_tree<S: AsRef<str>>(
    names: &[S],
    catalog: &StatisticsCatalog,
) -> Result<TokenTree, LayoutError> {
    let items = parse_token_list(names, catalog)?;
    TokenTree::parse(&items)
}
