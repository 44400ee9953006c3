use crate::layout::{
    ExtraColumn, LayoutError, LayoutOptions, MethodLayout, Multiplicity, StatToken,
    StatisticsCatalog, Substitutions, TokenTree, ValueType, build_tree, plan_methods,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Output format for tables written by the front-end
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Tsv,
}

/// Global settings for cellhts-layout.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Folder pattern compiled once per normalization method
    #[serde(default = "default_folder_pattern")]
    pub folder_pattern: String,
    /// Root of all output folders; `~` is expanded
    #[serde(default)]
    pub output_dir: String,
    #[serde(default)]
    pub default_format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            folder_pattern: default_folder_pattern(),
            output_dir: String::new(),
            default_format: OutputFormat::default(),
        }
    }
}

fn default_folder_pattern() -> String {
    "{e}\\{n}".to_string()
}

fn default_replicate_count() -> usize {
    1
}

/// Parameters of the screening run the layout is compiled for.
#[derive(Debug, Deserialize, Clone)]
pub struct ExperimentConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub variance_adjustment: String,
    #[serde(default)]
    pub score_method: String,
    #[serde(default)]
    pub aggregate: String,
    #[serde(default)]
    pub log_transform: String,
    /// Multiplicative (`true`) or additive (`false`) normalization
    #[serde(default)]
    pub multiplicative: bool,
    /// Normalization methods, in output order
    #[serde(default)]
    pub methods: Vec<String>,
    /// Selected channels, in column order
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default = "default_replicate_count")]
    pub replicate_count: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            variance_adjustment: String::new(),
            score_method: String::new(),
            aggregate: String::new(),
            log_transform: String::new(),
            multiplicative: false,
            methods: Vec::new(),
            parameters: Vec::new(),
            replicate_count: default_replicate_count(),
        }
    }
}

/// Column layout preferences.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LayoutSection {
    /// Statistic and group-marker names in column order
    #[serde(default)]
    pub tokens: Vec<String>,
    /// Upstream columns passed through by the `extra` statistic
    #[serde(default)]
    pub extra_columns: Vec<ExtraColumn>,
}

/// Definition or override of one statistic.
#[derive(Debug, Deserialize, Clone)]
pub struct StatisticConfig {
    pub multiplicity: Multiplicity,
    #[serde(default)]
    pub display_text: Option<String>,
    #[serde(rename = "type", default = "default_value_type")]
    pub value_type: ValueType,
    #[serde(default)]
    pub replicate_index: bool,
}

fn default_value_type() -> ValueType {
    ValueType::Real
}

impl StatisticConfig {
    fn to_token(&self, name: &str) -> StatToken {
        let display = self.display_text.clone().unwrap_or_else(|| name.to_string());
        if self.replicate_index {
            return StatToken::replicate_index(name, display);
        }
        StatToken::new(name, self.multiplicity, display, self.value_type)
    }
}

/// Layout configuration loaded from TOML files.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct LayoutRegistry {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub layout: LayoutSection,
    /// Catalog overrides and additions, by statistic name
    #[serde(default)]
    pub statistics: BTreeMap<String, StatisticConfig>,
}

const BUILTIN_LAYOUT: &str = include_str!("../../layout.toml");

impl LayoutRegistry {
    /// Parses a layout configuration from TOML content.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads the built-in layout configuration.
    pub fn load_default() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::from_toml(BUILTIN_LAYOUT)?)
    }

    /// Loads configuration from a custom file path, layered over the built-in defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let mut table: toml::Table = toml::from_str(BUILTIN_LAYOUT)?;
        merge_tables(&mut table, read_table(path)?);
        Ok(table.try_into()?)
    }

    /// Loads configuration with user overrides from standard locations.
    ///
    /// Searches in priority order:
    /// 1. Built-in layout (from library)
    /// 2. `~/.config/cellhts-layout/layout.toml` (user overrides)
    /// 3. `./layout.toml` (project-local overrides)
    ///
    /// Later files override earlier ones key by key. Files that fail to load
    /// are skipped with a warning.
    pub fn load_with_overrides() -> Result<Self, Box<dyn std::error::Error>> {
        let mut table: toml::Table = toml::from_str(BUILTIN_LAYOUT)?;

        let mut candidates = Vec::new();
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("cellhts-layout").join("layout.toml"));
        }
        candidates.push(PathBuf::from("layout.toml"));

        for path in candidates.iter().filter(|p| p.exists()) {
            match read_table(path) {
                Ok(overlay) => merge_tables(&mut table, overlay),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load layout config");
                }
            }
        }

        Ok(table.try_into()?)
    }

    /// Built-in statistics with the `[statistics]` overrides applied.
    pub fn catalog(&self) -> StatisticsCatalog {
        let mut catalog = StatisticsCatalog::builtin();
        for (name, stat) in &self.statistics {
            catalog.insert(stat.to_token(name));
        }
        catalog
    }

    /// The configured column order as a token tree.
    pub fn token_tree(&self) -> Result<TokenTree, LayoutError> {
        let tree = build_tree(&self.layout.tokens, &self.catalog())?;
        tracing::debug!(
            names = self.layout.tokens.len(),
            statistics = tree.leaf_count(),
            "parsed token layout"
        );
        Ok(tree)
    }

    /// Placeholder values for the folder pattern.
    pub fn substitutions(&self) -> Substitutions {
        let experiment = &self.experiment;
        Substitutions {
            experiment: experiment.name.clone(),
            variance_adjustment: experiment.variance_adjustment.clone(),
            score_method: experiment.score_method.clone(),
            aggregate: experiment.aggregate.clone(),
            log_transform: experiment.log_transform.clone(),
            multiplicative: experiment.multiplicative,
            parameters: experiment.parameters.clone(),
            output_dir: PathBuf::from(shellexpand::tilde(&self.settings.output_dir).as_ref()),
        }
    }

    /// Summary-table expansion options; use `.replicates()` for the replicate table.
    pub fn layout_options(&self) -> LayoutOptions {
        LayoutOptions::new(self.experiment.parameters.clone(), false)
            .with_extra_columns(self.layout.extra_columns.clone())
    }

    /// Folder and schemas of every configured normalization method.
    pub fn plan(&self) -> Result<Vec<MethodLayout>, LayoutError> {
        plan_methods(
            &self.settings.folder_pattern,
            &self.experiment.methods,
            &self.substitutions(),
            &self.token_tree()?,
            &self.layout_options(),
        )
    }
}

fn read_table(path: &Path) -> Result<toml::Table, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge `overlay` into `base`: nested tables merge key by key, everything
/// else (including arrays) is replaced.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
