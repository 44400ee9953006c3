use serde::{Deserialize, Serialize};
use std::fmt;

/// Value types a result column can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Real,
    String,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Real => "real",
            ValueType::String => "string",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How many columns a statistic token expands to.
///
/// The multiplicity decides whether a token is repeated per selected channel,
/// per replicate row, both, or taken verbatim from the upstream table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Multiplicity {
    /// Produces nothing (group markers)
    None,
    /// Passthrough of the upstream extra columns
    Unspecified,
    /// One column per selected channel
    Channels,
    /// One value per replicate row
    Replicates,
    /// One column per channel, one value per replicate row
    ChannelsAndReplicates,
    /// Exactly one column
    Single,
}

impl Multiplicity {
    /// Whether values of this multiplicity differ between replicate rows
    pub fn is_replicate_dependent(&self) -> bool {
        matches!(
            self,
            Multiplicity::Replicates | Multiplicity::ChannelsAndReplicates
        )
    }
}

/// Immutable description of one statistic item in the output layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatToken {
    pub name: String,
    pub multiplicity: Multiplicity,
    pub display_text: String,
    pub value_type: ValueType,
    /// Running replicate number, emitted only in the replicate table
    #[serde(default)]
    pub replicate_index: bool,
}

impl StatToken {
    pub fn new(
        name: impl Into<String>,
        multiplicity: Multiplicity,
        display_text: impl Into<String>,
        value_type: ValueType,
    ) -> Self {
        Self {
            name: name.into(),
            multiplicity,
            display_text: display_text.into(),
            value_type,
            replicate_index: false,
        }
    }

    /// A `Single` Int token whose value is the replicate number of the row
    pub fn replicate_index(name: impl Into<String>, display_text: impl Into<String>) -> Self {
        Self {
            replicate_index: true,
            ..Self::new(name, Multiplicity::Single, display_text, ValueType::Int)
        }
    }
}

/// Passthrough column copied verbatim from the upstream source table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl ExtraColumn {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// One declared output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
        }
    }
}

/// One output cell. `Missing` keeps the column type so rows stay well-typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Real(f64),
    Str(String),
    Missing(ValueType),
}

impl Cell {
    pub fn value_type(&self) -> ValueType {
        match self {
            Cell::Int(_) => ValueType::Int,
            Cell::Real(_) => ValueType::Real,
            Cell::Str(_) => ValueType::String,
            Cell::Missing(t) => *t,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing(_))
    }

    pub fn matches_column(&self, column: &ColumnDescriptor) -> bool {
        self.value_type() == column.value_type
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{}", v),
            Cell::Real(v) => write!(f, "{}", v),
            Cell::Str(s) => f.write_str(s),
            Cell::Missing(_) => Ok(()),
        }
    }
}

/// Values produced for one result row: one `Vec<Cell>` per output row
pub type Row = Vec<Cell>;
