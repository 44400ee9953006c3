//! Resolution of statistic values for one result row.
//!
//! The expander never talks to the statistical engine directly; it asks a
//! [`ResultLookup`] for raw values and converts them with [`resolve`], which
//! turns every NaN, absent or ill-typed result into a typed `Cell::Missing`.

use super::types::{Cell, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scalar result as handed over by the statistical engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

/// Channel and replicate a lookup is made for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupContext<'a> {
    pub channel: Option<&'a str>,
    /// 1-based replicate number
    pub replicate: Option<usize>,
}

impl<'a> LookupContext<'a> {
    pub fn with_channel(channel: &'a str) -> Self {
        Self {
            channel: Some(channel),
            replicate: None,
        }
    }

    pub fn replicate(self, replicate: usize) -> Self {
        Self {
            replicate: Some(replicate),
            ..self
        }
    }
}

/// Read-only, row-indexed source of raw results
pub trait ResultLookup {
    /// Value of statistic `name` for `row` in the given context, if computed
    fn statistic(&self, name: &str, context: &LookupContext<'_>, row: usize) -> Option<RawValue>;

    /// Value of upstream column `column` for `row`, if present
    fn passthrough(&self, column: &str, row: usize) -> Option<RawValue>;
}

/// Convert a raw result into a cell of the requested type.
///
/// Never fails: NaN, infinities, non-integral numbers in Int columns and
/// unparsable text in numeric columns all become `Cell::Missing(value_type)`.
pub fn resolve(raw: Option<RawValue>, value_type: ValueType) -> Cell {
    let missing = Cell::Missing(value_type);
    let Some(raw) = raw else {
        return missing;
    };

    let number = match raw {
        RawValue::Number(n) => n,
        RawValue::Text(text) => match value_type {
            ValueType::String => return Cell::Str(text),
            _ => match text.trim().parse::<f64>() {
                Ok(n) => n,
                Err(_) => return missing,
            },
        },
    };

    if !number.is_finite() {
        return missing;
    }

    match value_type {
        ValueType::Real => Cell::Real(number),
        ValueType::Int => {
            if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
                Cell::Int(number as i64)
            } else {
                missing
            }
        }
        ValueType::String => Cell::Str(number.to_string()),
    }
}

/// One computed statistic in a [`TableLookup`] row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticEntry {
    pub stat: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicate: Option<usize>,
    /// `null` stands for a NaN result
    pub value: Option<RawValue>,
}

/// Raw results and upstream columns of one input row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(default)]
    pub statistics: Vec<StatisticEntry>,
    #[serde(default)]
    pub columns: HashMap<String, RawValue>,
}

type StatKey = (String, Option<String>, Option<usize>);

/// In-memory [`ResultLookup`] over rows loaded from JSON
#[derive(Debug, Clone, Default)]
pub struct TableLookup {
    rows: Vec<(HashMap<StatKey, RawValue>, HashMap<String, RawValue>)>,
}

#[derive(Deserialize)]
struct TableLookupFile {
    rows: Vec<ResultRow>,
}

impl TableLookup {
    pub fn new(rows: Vec<ResultRow>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                let stats = row
                    .statistics
                    .into_iter()
                    .map(|e| {
                        let value = e.value.unwrap_or(RawValue::Number(f64::NAN));
                        ((e.stat, e.channel, e.replicate), value)
                    })
                    .collect();
                (stats, row.columns)
            })
            .collect();
        Self { rows }
    }

    /// Parse `{"rows": [{"statistics": [...], "columns": {...}}]}`
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let file: TableLookupFile = serde_json::from_str(content)?;
        Ok(Self::new(file.rows))
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Results of every normalization method, one [`TableLookup`] each
#[derive(Debug, Clone, Default)]
pub struct MethodResults {
    shared: Option<TableLookup>,
    methods: HashMap<String, TableLookup>,
}

#[derive(Deserialize)]
struct MethodResultsFile {
    #[serde(default)]
    rows: Option<Vec<ResultRow>>,
    #[serde(default)]
    methods: HashMap<String, TableLookupFile>,
}

impl MethodResults {
    /// Parse `{"methods": {"median": {"rows": [...]}, ...}}`.
    ///
    /// A top-level `"rows"` list is used for every method without a section
    /// of its own.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let file: MethodResultsFile = serde_json::from_str(content)?;
        Ok(Self {
            shared: file.rows.map(TableLookup::new),
            methods: file
                .methods
                .into_iter()
                .map(|(method, section)| (method, TableLookup::new(section.rows)))
                .collect(),
        })
    }

    pub fn insert(&mut self, method: impl Into<String>, lookup: TableLookup) {
        self.methods.insert(method.into(), lookup);
    }

    /// Lookup for `method`, falling back to the shared rows
    pub fn for_method(&self, method: &str) -> Option<&TableLookup> {
        self.methods.get(method).or(self.shared.as_ref())
    }
}

impl ResultLookup for TableLookup {
    fn statistic(&self, name: &str, context: &LookupContext<'_>, row: usize) -> Option<RawValue> {
        let (stats, _) = self.rows.get(row)?;
        let key = (
            name.to_string(),
            context.channel.map(str::to_string),
            context.replicate,
        );
        stats.get(&key).cloned()
    }

    fn passthrough(&self, column: &str, row: usize) -> Option<RawValue> {
        let (_, columns) = self.rows.get(row)?;
        columns.get(column).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_numbers() {
        assert_eq!(resolve(Some(0.5.into()), ValueType::Real), Cell::Real(0.5));
        assert_eq!(resolve(Some(3.0.into()), ValueType::Int), Cell::Int(3));
        assert_eq!(
            resolve(Some(3.5.into()), ValueType::Int),
            Cell::Missing(ValueType::Int)
        );
        assert_eq!(
            resolve(Some(2.0.into()), ValueType::String),
            Cell::Str("2".to_string())
        );
    }

    #[test]
    fn test_resolve_nan_and_absent() {
        assert_eq!(
            resolve(Some(f64::NAN.into()), ValueType::Real),
            Cell::Missing(ValueType::Real)
        );
        assert_eq!(
            resolve(Some(f64::INFINITY.into()), ValueType::Real),
            Cell::Missing(ValueType::Real)
        );
        assert_eq!(resolve(None, ValueType::String), Cell::Missing(ValueType::String));
    }

    #[test]
    fn test_resolve_text() {
        assert_eq!(resolve(Some("A01".into()), ValueType::String), Cell::Str("A01".into()));
        assert_eq!(resolve(Some(" 12 ".into()), ValueType::Int), Cell::Int(12));
        assert_eq!(resolve(Some("1.25".into()), ValueType::Real), Cell::Real(1.25));
        assert_eq!(
            resolve(Some("NA".into()), ValueType::Real),
            Cell::Missing(ValueType::Real)
        );
    }

    #[test]
    fn test_method_results_per_method() {
        let results = MethodResults::from_json(
            r#"{"methods": {
                "median": {"rows": [{"statistics": [{"stat": "score", "channel": "X", "value": 1.0}]}]},
                "POC": {"rows": [{"statistics": [{"stat": "score", "channel": "X", "value": 80.0}]}]}
            }}"#,
        )
        .unwrap();
        let ctx = LookupContext::with_channel("X");

        let median = results.for_method("median").unwrap();
        let poc = results.for_method("POC").unwrap();
        assert_eq!(median.statistic("score", &ctx, 0), Some(RawValue::Number(1.0)));
        assert_eq!(poc.statistic("score", &ctx, 0), Some(RawValue::Number(80.0)));
        assert!(results.for_method("Bscore").is_none());
    }

    #[test]
    fn test_method_results_shared_rows() {
        let mut results = MethodResults::from_json(
            r#"{"rows": [{"statistics": [{"stat": "plate", "value": 2}]}]}"#,
        )
        .unwrap();
        assert_eq!(results.for_method("median").unwrap().row_count(), 1);

        results.insert("POC", TableLookup::default());
        assert_eq!(results.for_method("POC").unwrap().row_count(), 0);
        assert_eq!(results.for_method("Bscore").unwrap().row_count(), 1);
    }

    #[test]
    fn test_table_lookup_from_json() {
        let json = r#"{
            "rows": [
                {
                    "statistics": [
                        {"stat": "plate", "value": 1},
                        {"stat": "raw", "channel": "X", "replicate": 1, "value": 0.5},
                        {"stat": "raw", "channel": "X", "replicate": 2, "value": null}
                    ],
                    "columns": {"GeneID": "g1"}
                }
            ]
        }"#;
        let lookup = TableLookup::from_json(json).unwrap();
        assert_eq!(lookup.row_count(), 1);

        let ctx = LookupContext::with_channel("X");
        assert_eq!(
            lookup.statistic("raw", &ctx.replicate(1), 0),
            Some(RawValue::Number(0.5))
        );
        assert!(matches!(
            lookup.statistic("raw", &ctx.replicate(2), 0),
            Some(RawValue::Number(n)) if n.is_nan()
        ));
        assert_eq!(lookup.statistic("raw", &ctx, 0), None);
        assert_eq!(
            lookup.statistic("plate", &LookupContext::default(), 0),
            Some(RawValue::Number(1.0))
        );
        assert_eq!(lookup.passthrough("GeneID", 0), Some(RawValue::Text("g1".into())));
        assert_eq!(lookup.passthrough("GeneID", 1), None);
    }
}
