use crate::layout::serializers::TableSerializer;
use crate::layout::table::ResultTable;
use crate::layout::types::Cell;
use std::convert::Infallible;

/// Tab-separated output: a header line, then one line per row.
///
/// Missing cells are written as empty fields. Tabs and line breaks inside
/// string values are replaced by spaces.
pub struct TsvSerializer;

impl TableSerializer for TsvSerializer {
    type Error = Infallible;

    fn serialize(table: &ResultTable, _pretty: bool) -> Result<String, Self::Error> {
        let mut out = String::new();

        let header: Vec<String> = table.columns().iter().map(|c| escape(&c.name)).collect();
        out.push_str(&header.join("\t"));
        out.push('\n');

        for row in table.rows() {
            let fields: Vec<String> = row.iter().map(format_cell).collect();
            out.push_str(&fields.join("\t"));
            out.push('\n');
        }

        Ok(out)
    }
}

fn escape(value: &str) -> String {
    value.replace(['\t', '\n', '\r'], " ")
}

fn format_cell(cell: &Cell) -> String {
    match cell {
        Cell::Str(s) => escape(s),
        other => other.to_string(),
    }
}
