use crate::cli::{args::SchemaArgs, config::with_overrides, global::GlobalArgs};
use cellhts_layout::prelude::*;

pub fn handle(
    args: SchemaArgs,
    _global: &GlobalArgs,
    config: &LayoutRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = with_overrides(config, &args.experiment);
    let tree = registry.token_tree()?;
    let options = LayoutOptions {
        include_replicates: args.replicates,
        ..registry.layout_options()
    };
    let columns = expand_spec(&tree, &options);

    let format = args
        .format
        .map(Into::into)
        .unwrap_or(registry.settings.default_format);

    match format {
        OutputFormat::Json => {
            let output = if args.pretty {
                serde_json::to_string_pretty(&columns)?
            } else {
                serde_json::to_string(&columns)?
            };
            println!("{}", output);
        }
        OutputFormat::Tsv => {
            for column in &columns {
                println!("{}\t{}", column.name, column.value_type);
            }
        }
    }

    Ok(())
}
