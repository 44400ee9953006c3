//! Output-layout compiler for cellHTS2 screening results.
//!
//! Turns a folder template plus an ordered list of statistic tokens into
//! per-method output folders, table schemas and rows:
//!
//! - [`layout::compile`] expands a folder pattern for every normalization method
//! - [`layout::expand_spec`] produces the column descriptors of a table
//! - [`layout::expand_values`] produces the rows for one result record
//! - [`LayoutRegistry`] loads all of the above from TOML
//!
//! # Example
//!
//! ```
//! use cellhts_layout::LayoutRegistry;
//!
//! let registry = LayoutRegistry::load_default().unwrap();
//! for method in registry.plan().unwrap() {
//!     println!("{} -> {}", method.method, method.folder.display());
//! }
//! ```

mod core;
pub mod layout;
pub mod prelude;

pub use crate::core::config::{
    ExperimentConfig, LayoutRegistry, LayoutSection, OutputFormat, Settings, StatisticConfig,
};
pub use layout::{
    Cell, ColumnDescriptor, FolderMap, LayoutError, LayoutOptions, MethodLayout, MethodResults,
    MethodTables, Multiplicity, ResultLookup, ResultTable, StatToken, StatisticsCatalog,
    Substitutions, TableLookup, TokenTree, ValueType, build_tree, compile, expand_spec,
    expand_values,
};
