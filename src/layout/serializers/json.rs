use crate::layout::serializers::TableSerializer;
use crate::layout::table::ResultTable;
use crate::layout::types::Cell;
use serde_json::{Value, json};

pub struct JsonSerializer;

impl JsonSerializer {
    /// Build the JSON value `{"columns": [...], "rows": [[...], ...]}`
    pub fn to_value(table: &ResultTable) -> Value {
        let rows: Vec<Value> = table
            .rows()
            .iter()
            .map(|row| Value::Array(row.iter().map(cell_to_json).collect()))
            .collect();

        json!({
            "columns": table.columns(),
            "rows": rows,
        })
    }
}

impl TableSerializer for JsonSerializer {
    type Error = serde_json::Error;

    fn serialize(table: &ResultTable, pretty: bool) -> Result<String, Self::Error> {
        let value = Self::to_value(table);
        if pretty {
            serde_json::to_string_pretty(&value)
        } else {
            serde_json::to_string(&value)
        }
    }
}

/// Missing cells become `null`
fn cell_to_json(cell: &Cell) -> Value {
    match cell {
        Cell::Int(n) => json!(*n),
        Cell::Real(n) => json!(*n),
        Cell::Str(s) => json!(s),
        Cell::Missing(_) => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{ColumnDescriptor, ValueType};

    #[test]
    fn test_serialize_table() {
        let mut table = ResultTable::new(vec![
            ColumnDescriptor::new("plate", ValueType::Int),
            ColumnDescriptor::new("score_X", ValueType::Real),
            ColumnDescriptor::new("well", ValueType::String),
        ]);
        table
            .push_row(vec![
                Cell::Int(1),
                Cell::Missing(ValueType::Real),
                Cell::Str("A01".to_string()),
            ])
            .unwrap();

        let output = JsonSerializer::serialize(&table, false).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["columns"][1]["name"], "score_X");
        assert_eq!(value["columns"][1]["type"], "real");
        assert_eq!(value["rows"][0], json!([1, null, "A01"]));
    }

    #[test]
    fn test_pretty_output_is_multiline() {
        let table = ResultTable::new(vec![ColumnDescriptor::new("plate", ValueType::Int)]);
        let output = JsonSerializer::serialize(&table, true).unwrap();
        assert!(output.contains('\n'));
        assert!(output.contains("\"rows\": []"));
    }
}
