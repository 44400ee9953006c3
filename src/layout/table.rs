use super::errors::LayoutError;
use super::expand::{LayoutOptions, expand_spec, expand_values};
use super::lookup::ResultLookup;
use super::pattern::{Substitutions, compile};
use super::tree::TokenTree;
use super::types::{Cell, ColumnDescriptor, Row};
use std::path::PathBuf;

/// Declared columns plus the rows appended so far
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    columns: Vec<ColumnDescriptor>,
    rows: Vec<Row>,
}

impl ResultTable {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row after checking its arity and per-column types
    pub fn push_row(&mut self, row: Row) -> Result<(), LayoutError> {
        if row.len() != self.columns.len() {
            return Err(LayoutError::schema_mismatch(format!(
                "row {} has {} values for {} columns",
                self.rows.len(),
                row.len(),
                self.columns.len()
            )));
        }

        if let Some((cell, column)) = row
            .iter()
            .zip(&self.columns)
            .find(|(cell, column)| !cell.matches_column(column))
        {
            return Err(LayoutError::schema_mismatch(format!(
                "column '{}' is declared {} but row {} holds a {} value",
                column.name,
                column.value_type,
                self.rows.len(),
                cell.value_type()
            )));
        }

        self.rows.push(row);
        Ok(())
    }

    pub fn extend_rows(&mut self, rows: impl IntoIterator<Item = Row>) -> Result<(), LayoutError> {
        for row in rows {
            self.push_row(row)?;
        }
        Ok(())
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(column)
    }

    /// Index of the column called `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }
}

/// Summary and replicate tables of one normalization method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodTables {
    pub summary: ResultTable,
    pub replicates: ResultTable,
}

/// Output layout of one normalization method
#[derive(Debug, Clone, PartialEq)]
pub struct MethodLayout {
    pub method: String,
    pub folder: PathBuf,
    pub summary_columns: Vec<ColumnDescriptor>,
    pub replicate_columns: Vec<ColumnDescriptor>,
    tree: TokenTree,
    options: LayoutOptions,
}

impl MethodLayout {
    pub fn new(method: impl Into<String>, folder: PathBuf, tree: TokenTree, options: LayoutOptions) -> Self {
        let summary_columns = expand_spec(&tree, &options.summary());
        let replicate_columns = expand_spec(&tree, &options.replicates());
        Self {
            method: method.into(),
            folder,
            summary_columns,
            replicate_columns,
            tree,
            options,
        }
    }

    /// Expand every result row into both tables.
    ///
    /// `lookup` is the per-method result object of the statistical engine.
    pub fn fill<L: ResultLookup + ?Sized>(
        &self,
        lookup: &L,
        row_count: usize,
        replicate_count: usize,
    ) -> Result<MethodTables, LayoutError> {
        let summary_options = self.options.summary();
        let replicate_options = self.options.replicates();

        let mut summary = ResultTable::new(self.summary_columns.clone());
        let mut replicates = ResultTable::new(self.replicate_columns.clone());

        for row in 0..row_count {
            summary.extend_rows(expand_values(
                &self.tree,
                &summary_options,
                lookup,
                row,
                replicate_count,
            ))?;
            replicates.extend_rows(expand_values(
                &self.tree,
                &replicate_options,
                lookup,
                row,
                replicate_count,
            ))?;
        }

        tracing::debug!(
            method = %self.method,
            summary_rows = summary.row_count(),
            replicate_rows = replicates.row_count(),
            "filled result tables"
        );
        Ok(MethodTables {
            summary,
            replicates,
        })
    }
}

/// Compile folders and schemas for every normalization method.
///
/// Each method gets its own independent layout; nothing is shared between
/// them, so the layouts can be filled concurrently by the caller.
pub fn plan_methods<S: AsRef<str>>(
    pattern: &str,
    methods: &[S],
    subs: &Substitutions,
    tree: &TokenTree,
    options: &LayoutOptions,
) -> Result<Vec<MethodLayout>, LayoutError> {
    let folders = compile(pattern, methods, subs)?;
    Ok(folders
        .iter()
        .map(|(method, folder)| {
            MethodLayout::new(method, folder.to_path_buf(), tree.clone(), options.clone())
        })
        .collect())
}
