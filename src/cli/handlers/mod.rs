pub mod config;
pub mod expand;
pub mod folders;
pub mod schema;

use cellhts_layout::prelude::*;

/// Render a table in the requested format
pub fn render_table(
    table: &ResultTable,
    format: OutputFormat,
    pretty: bool,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        OutputFormat::Json => JsonSerializer::serialize(table, pretty)?,
        OutputFormat::Tsv => TsvSerializer::serialize(table, pretty)?,
    })
}
