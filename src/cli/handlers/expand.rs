use crate::cli::{args::ExpandArgs, config::with_overrides, global::GlobalArgs};
use crate::cli::handlers::render_table;
use cellhts_layout::prelude::*;
use std::fs;

pub fn handle(
    args: ExpandArgs,
    _global: &GlobalArgs,
    config: &LayoutRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = with_overrides(config, &args.experiment);

    let content = fs::read_to_string(&args.results).map_err(|e| {
        format!("Cannot read results file '{}': {}", args.results.display(), e)
    })?;
    let results = MethodResults::from_json(&content).map_err(|e| {
        format!("Invalid results file '{}': {}", args.results.display(), e)
    })?;

    let format: OutputFormat = args
        .format
        .map(Into::into)
        .unwrap_or(registry.settings.default_format);
    let plan = registry.plan()?;
    if plan.is_empty() {
        return Err("No normalization methods configured; pass --method".into());
    }

    for layout in &plan {
        let lookup = results.for_method(&layout.method).ok_or_else(|| {
            format!(
                "No results for method '{}' in '{}'",
                layout.method,
                args.results.display()
            )
        })?;
        let tables = layout.fill(lookup, lookup.row_count(), registry.experiment.replicate_count)?;
        if args.write {
            write_tables(layout, format, &tables, args.pretty)?;
            continue;
        }

        match format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "method": layout.method,
                    "folder": layout.folder.display().to_string(),
                    "summary": JsonSerializer::to_value(&tables.summary),
                    "replicates": JsonSerializer::to_value(&tables.replicates),
                });
                if args.pretty {
                    println!("{}", serde_json::to_string_pretty(&output)?);
                } else {
                    println!("{}", output);
                }
            }
            OutputFormat::Tsv => {
                println!("# {} summary", layout.method);
                print!("{}", render_table(&tables.summary, format, false)?);
                println!("# {} replicates", layout.method);
                print!("{}", render_table(&tables.replicates, format, false)?);
            }
        }
    }

    Ok(())
}

fn write_tables(
    layout: &MethodLayout,
    format: OutputFormat,
    tables: &MethodTables,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let extension = match format {
        OutputFormat::Json => "json",
        OutputFormat::Tsv => "tsv",
    };

    fs::create_dir_all(&layout.folder).map_err(|e| {
        format!("Cannot create output folder '{}': {}", layout.folder.display(), e)
    })?;

    for (name, table) in [("summary", &tables.summary), ("replicates", &tables.replicates)] {
        let path = layout.folder.join(format!("{}.{}", name, extension));
        fs::write(&path, render_table(table, format, pretty)?)?;
        tracing::info!(method = %layout.method, path = %path.display(), "wrote table");
        println!("{}", path.display());
    }

    Ok(())
}
