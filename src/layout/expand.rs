//! Layout expansion.
//!
//! A single traversal of the [`TokenTree`] visits every column position as a
//! [`Slot`]. Schema expansion and value expansion are two [`Emitter`]s over
//! that same traversal, so the column list and each value row cannot diverge
//! in length or order.

use super::lookup::{LookupContext, ResultLookup, resolve};
use super::tree::{TokenNode, TokenTree};
use super::types::{Cell, ColumnDescriptor, ExtraColumn, Multiplicity, Row, StatToken, ValueType};

/// Fixed inputs of one expansion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutOptions {
    /// Selected channels, in column order
    pub params: Vec<String>,
    /// Replicate table (`true`) or summary table (`false`)
    pub include_replicates: bool,
    /// Upstream columns copied through by `Unspecified` tokens
    pub extra_columns: Vec<ExtraColumn>,
}

impl LayoutOptions {
    pub fn new(params: Vec<String>, include_replicates: bool) -> Self {
        Self {
            params,
            include_replicates,
            extra_columns: Vec::new(),
        }
    }

    pub fn with_extra_columns(mut self, extra_columns: Vec<ExtraColumn>) -> Self {
        self.extra_columns = extra_columns;
        self
    }

    pub fn summary(&self) -> Self {
        Self {
            include_replicates: false,
            ..self.clone()
        }
    }

    pub fn replicates(&self) -> Self {
        Self {
            include_replicates: true,
            ..self.clone()
        }
    }
}

/// One output column position.
///
/// The `Option<&str>` is the channel bound by an enclosing channel group and
/// suffixes the column name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    Extra(&'a ExtraColumn, Option<&'a str>),
    Single(&'a StatToken, Option<&'a str>),
    ReplicateIndex(&'a StatToken, Option<&'a str>),
    Channel(&'a StatToken, &'a str),
    Replicate(&'a StatToken, Option<&'a str>),
}

impl Slot<'_> {
    pub fn column_name(&self) -> String {
        let (name, channel) = match self {
            Slot::Extra(col, channel) => (&col.name, *channel),
            Slot::Single(token, channel)
            | Slot::ReplicateIndex(token, channel)
            | Slot::Replicate(token, channel) => (&token.name, *channel),
            Slot::Channel(token, channel) => (&token.name, Some(*channel)),
        };
        match channel {
            Some(channel) => format!("{}_{}", name, channel),
            None => name.clone(),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Slot::Extra(col, _) => col.value_type,
            Slot::ReplicateIndex(..) => ValueType::Int,
            Slot::Single(token, _) | Slot::Channel(token, _) | Slot::Replicate(token, _) => {
                token.value_type
            }
        }
    }
}

/// Receives the slots of a traversal, in column order
pub trait Emitter {
    fn emit(&mut self, slot: Slot<'_>);
}

/// Visit every slot of `tree` under `options`.
///
/// Channel groups repeat their body once per selected channel with that
/// channel bound; replicate groups and replicate-dependent tokens are skipped
/// unless `include_replicates` is set. `Channels` tokens outside a channel
/// group iterate over all selected channels.
pub fn walk<E: Emitter>(tree: &TokenTree, options: &LayoutOptions, emitter: &mut E) {
    walk_nodes(tree.nodes(), options, None, emitter);
}

fn walk_nodes<'a, E: Emitter>(
    nodes: &'a [TokenNode],
    options: &'a LayoutOptions,
    channel: Option<&'a str>,
    emitter: &mut E,
) {
    let channels = || -> Vec<&'a str> {
        match channel {
            Some(c) => vec![c],
            None => options.params.iter().map(String::as_str).collect(),
        }
    };

    for node in nodes {
        match node {
            TokenNode::Leaf(token) => match token.multiplicity {
                Multiplicity::None => {}
                Multiplicity::Unspecified => {
                    for col in &options.extra_columns {
                        emitter.emit(Slot::Extra(col, channel));
                    }
                }
                Multiplicity::Single if token.replicate_index => {
                    if options.include_replicates {
                        emitter.emit(Slot::ReplicateIndex(token, channel));
                    }
                }
                Multiplicity::Single => emitter.emit(Slot::Single(token, channel)),
                Multiplicity::Channels => {
                    for c in channels() {
                        emitter.emit(Slot::Channel(token, c));
                    }
                }
                Multiplicity::Replicates => {
                    if options.include_replicates {
                        emitter.emit(Slot::Replicate(token, channel));
                    }
                }
                Multiplicity::ChannelsAndReplicates => {
                    if options.include_replicates {
                        for c in channels() {
                            emitter.emit(Slot::Replicate(token, Some(c)));
                        }
                    }
                }
            },
            TokenNode::ChannelGroup(inner) => {
                for param in &options.params {
                    walk_nodes(inner, options, Some(param.as_str()), emitter);
                }
            }
            TokenNode::ReplicateGroup(inner) => {
                if options.include_replicates {
                    walk_nodes(inner, options, channel, emitter);
                }
            }
        }
    }
}

/// Collects column descriptors
#[derive(Debug, Default)]
pub struct SpecEmitter {
    columns: Vec<ColumnDescriptor>,
}

impl SpecEmitter {
    pub fn into_columns(self) -> Vec<ColumnDescriptor> {
        self.columns
    }
}

impl Emitter for SpecEmitter {
    fn emit(&mut self, slot: Slot<'_>) {
        self.columns
            .push(ColumnDescriptor::new(slot.column_name(), slot.value_type()));
    }
}

/// Collects cell values for one result row.
///
/// Works on `max(replicate_count, 1)` rows at once: replicate-invariant
/// values are broadcast to every row, replicate-dependent values get one
/// lookup per row.
pub struct ValueEmitter<'l, L: ResultLookup + ?Sized> {
    lookup: &'l L,
    row: usize,
    replicate_count: usize,
    rows: Vec<Row>,
    per_replicate: bool,
}

impl<'l, L: ResultLookup + ?Sized> ValueEmitter<'l, L> {
    pub fn new(lookup: &'l L, row: usize, replicate_count: usize) -> Self {
        Self {
            lookup,
            row,
            replicate_count,
            rows: vec![Vec::new(); replicate_count.max(1)],
            per_replicate: false,
        }
    }

    fn broadcast(&mut self, cell: Cell) {
        for row in &mut self.rows {
            row.push(cell.clone());
        }
    }

    /// `replicate_count` rows if anything replicate-dependent was emitted,
    /// otherwise the single broadcast row
    pub fn into_rows(mut self) -> Vec<Row> {
        let keep = if self.per_replicate {
            self.replicate_count
        } else {
            1
        };
        self.rows.truncate(keep);
        self.rows
    }
}

impl<L: ResultLookup + ?Sized> Emitter for ValueEmitter<'_, L> {
    fn emit(&mut self, slot: Slot<'_>) {
        let value_type = slot.value_type();
        match slot {
            Slot::Extra(col, _) => {
                let cell = resolve(self.lookup.passthrough(&col.name, self.row), value_type);
                self.broadcast(cell);
            }
            Slot::Single(token, _) => {
                let raw = self
                    .lookup
                    .statistic(&token.name, &LookupContext::default(), self.row);
                self.broadcast(resolve(raw, value_type));
            }
            Slot::ReplicateIndex(..) => {
                for (idx, row) in self.rows.iter_mut().enumerate() {
                    row.push(Cell::Int(idx as i64 + 1));
                }
            }
            Slot::Channel(token, channel) => {
                let ctx = LookupContext::with_channel(channel);
                let raw = self.lookup.statistic(&token.name, &ctx, self.row);
                self.broadcast(resolve(raw, value_type));
            }
            Slot::Replicate(token, channel) => {
                self.per_replicate = true;
                let base = LookupContext {
                    channel,
                    replicate: None,
                };
                for (idx, row) in self.rows.iter_mut().enumerate() {
                    let ctx = base.replicate(idx + 1);
                    let raw = self.lookup.statistic(&token.name, &ctx, self.row);
                    row.push(resolve(raw, value_type));
                }
            }
        }
    }
}

/// Column descriptors for a table laid out by `tree`
pub fn expand_spec(tree: &TokenTree, options: &LayoutOptions) -> Vec<ColumnDescriptor> {
    let mut emitter = SpecEmitter::default();
    walk(tree, options, &mut emitter);
    let columns = emitter.into_columns();
    tracing::debug!(
        columns = columns.len(),
        include_replicates = options.include_replicates,
        "expanded layout schema"
    );
    columns
}

/// Cell values of result `row` for a table laid out by `tree`.
///
/// Returns `replicate_count` rows when a replicate-dependent token is reached,
/// one row otherwise. Lookup failures become `Cell::Missing`.
pub fn expand_values<L: ResultLookup + ?Sized>(
    tree: &TokenTree,
    options: &LayoutOptions,
    lookup: &L,
    row: usize,
    replicate_count: usize,
) -> Vec<Row> {
    let mut emitter = ValueEmitter::new(lookup, row, replicate_count);
    walk(tree, options, &mut emitter);
    emitter.into_rows()
}
