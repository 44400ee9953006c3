use crate::cli::{
    args::{ConfigAction, ConfigCategory},
    global::GlobalArgs,
};
use cellhts_layout::{LayoutRegistry, layout::Marker};

pub fn handle(
    action: ConfigAction,
    _global: &GlobalArgs,
    config: &LayoutRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::List { category, json } => handle_list(category, json, config),
        ConfigAction::Show { statistic } => handle_show(&statistic, config),
    }
}

fn handle_list(
    category: Option<ConfigCategory>,
    json: bool,
    config: &LayoutRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let stat_list: Vec<String> = config.catalog().iter().map(|t| t.name.clone()).collect();
    let method_list = &config.experiment.methods;
    let param_list = &config.experiment.parameters;

    // JSON output
    if json {
        let output = match category {
            Some(ConfigCategory::Statistics) => serde_json::json!({ "statistics": stat_list }),
            Some(ConfigCategory::Methods) => serde_json::json!({ "methods": method_list }),
            Some(ConfigCategory::Parameters) => serde_json::json!({ "parameters": param_list }),
            None => serde_json::json!({
                "statistics": stat_list,
                "methods": method_list,
                "parameters": param_list,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    // Comma-separated output for specific categories
    match category {
        Some(ConfigCategory::Statistics) => println!("{}", stat_list.join(",")),
        Some(ConfigCategory::Methods) => println!("{}", method_list.join(",")),
        Some(ConfigCategory::Parameters) => println!("{}", param_list.join(",")),
        None => {
            println!("Statistics: {} available", stat_list.len());
            println!("Methods: {}", method_list.join(", "));
            println!("Parameters: {}", param_list.join(", "));
            println!("Folder pattern: {}", config.settings.folder_pattern);
            println!("\nUse 'config list statistics|methods|parameters' for machine-readable output");
            println!("Use --json for structured output");
        }
    }

    Ok(())
}

fn handle_show(name: &str, config: &LayoutRegistry) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(marker) = Marker::from_name(name) {
        println!("Group marker: {}", marker);
        println!("  Emits no column");
        return Ok(());
    }

    let catalog = config.catalog();
    let token = catalog
        .get(name)
        .ok_or_else(|| format!("Statistic '{}' not found", name))?;

    println!("Statistic: {}", token.name);
    println!("  Display text: {}", token.display_text);
    println!("  Multiplicity: {:?}", token.multiplicity);
    println!("  Type: {}", token.value_type);
    if token.replicate_index {
        println!("  Replicate index: yes");
    }
    let in_layout = config.layout.tokens.iter().any(|t| t == name);
    println!("  In layout: {}", if in_layout { "yes" } else { "no" });

    Ok(())
}
