//! Convenient re-exports for common usage.
//!
//! # Example
//!
//! ```
//! use cellhts_layout::prelude::*;
//!
//! let registry = LayoutRegistry::load_default().unwrap();
//! let tree = registry.token_tree().unwrap();
//! let columns = expand_spec(&tree, &registry.layout_options());
//! assert!(!columns.is_empty());
//! ```

pub use crate::{
    // Config
    LayoutRegistry,
    OutputFormat,

    // Token model
    Cell,
    ColumnDescriptor,
    Multiplicity,
    StatToken,
    StatisticsCatalog,
    TokenTree,
    ValueType,
    build_tree,

    // Folders
    FolderMap,
    Substitutions,
    compile,

    // Expansion
    LayoutOptions,
    MethodResults,
    ResultLookup,
    TableLookup,
    expand_spec,
    expand_values,

    // Tables
    LayoutError,
    MethodLayout,
    MethodTables,
    ResultTable,
};
pub use crate::layout::{JsonSerializer, TableSerializer, TsvSerializer};
