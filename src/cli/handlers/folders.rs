use crate::cli::{args::FoldersArgs, config::with_overrides, global::GlobalArgs};
use cellhts_layout::{LayoutRegistry, compile};

pub fn handle(
    args: FoldersArgs,
    _global: &GlobalArgs,
    config: &LayoutRegistry,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = with_overrides(config, &args.experiment);
    let pattern = args
        .pattern
        .as_deref()
        .unwrap_or(&registry.settings.folder_pattern);

    let folders = compile(pattern, &registry.experiment.methods, &registry.substitutions())?;
    for (method, folder) in folders.iter() {
        println!("{}\t{}", method, folder.display());
    }

    Ok(())
}
