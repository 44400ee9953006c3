use super::errors::LayoutError;
use super::types::{Multiplicity, StatToken, ValueType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Group delimiters of the flat token list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    GroupChannelsStart,
    GroupChannelsEnd,
    GroupReplicatesStart,
    GroupReplicatesEnd,
}

impl Marker {
    pub const ALL: [Marker; 4] = [
        Marker::GroupChannelsStart,
        Marker::GroupChannelsEnd,
        Marker::GroupReplicatesStart,
        Marker::GroupReplicatesEnd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Marker::GroupChannelsStart => "group_channels_start",
            Marker::GroupChannelsEnd => "group_channels_end",
            Marker::GroupReplicatesStart => "group_replicates_start",
            Marker::GroupReplicatesEnd => "group_replicates_end",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }

    pub fn is_start(&self) -> bool {
        matches!(
            self,
            Marker::GroupChannelsStart | Marker::GroupReplicatesStart
        )
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the flat, user-ordered token list
#[derive(Debug, Clone, PartialEq)]
pub enum TokenItem {
    Token(StatToken),
    Marker(Marker),
}

impl From<StatToken> for TokenItem {
    fn from(token: StatToken) -> Self {
        TokenItem::Token(token)
    }
}

impl From<Marker> for TokenItem {
    fn from(marker: Marker) -> Self {
        TokenItem::Marker(marker)
    }
}

/// Statistics known to the layout, looked up by name.
///
/// Insertion order is kept so listings follow the order the statistics were
/// declared in.
#[derive(Debug, Clone, Default)]
pub struct StatisticsCatalog {
    entries: Vec<StatToken>,
}

impl StatisticsCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The cellHTS2 result statistics
    pub fn builtin() -> Self {
        use Multiplicity::*;
        use ValueType::*;

        let mut catalog = Self::empty();
        for token in [
            StatToken::new("plate", Single, "Plate", Int),
            StatToken::new("position", Single, "Position", Int),
            StatToken::new("well", Single, "Well", String),
            StatToken::new("well_anno", Single, "Well annotation", String),
            StatToken::new("final_well_anno", Single, "Final well annotation", String),
            StatToken::new("score", Channels, "Score", Real),
            StatToken::new("raw", ChannelsAndReplicates, "Raw value", Real),
            StatToken::new("median", Channels, "Median of replicates", Real),
            StatToken::new("mean", Channels, "Mean of replicates", Real),
            StatToken::new("diff", Channels, "Difference between replicates", Real),
            StatToken::new(
                "raw_per_median",
                ChannelsAndReplicates,
                "Raw value / plate median",
                Real,
            ),
            StatToken::new("normalized", ChannelsAndReplicates, "Normalized value", Real),
            StatToken::replicate_index("replicate", "Replicate"),
            StatToken::new("gene_id", Single, "Gene ID", String),
            StatToken::new("gene_symbol", Single, "Gene symbol", String),
            StatToken::new("extra", Unspecified, "Other input columns", String),
        ] {
            catalog.insert(token);
        }
        catalog
    }

    /// Add a statistic, replacing any existing one with the same name in place
    pub fn insert(&mut self, token: StatToken) {
        match self.entries.iter_mut().find(|t| t.name == token.name) {
            Some(existing) => *existing = token,
            None => self.entries.push(token),
        }
    }

    pub fn get(&self, name: &str) -> Option<&StatToken> {
        self.entries.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatToken> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolve a preference-ordered list of names into tokens and group markers.
///
/// Marker names take precedence over catalog entries. Unknown names are a
/// configuration error; marker balance is checked later by `TokenTree::parse`.
pub fn parse_token_list<S: AsRef<str>>(
    names: &[S],
    catalog: &StatisticsCatalog,
) -> Result<Vec<TokenItem>, LayoutError> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref().trim();
            if let Some(marker) = Marker::from_name(name) {
                return Ok(TokenItem::Marker(marker));
            }
            catalog
                .get(name)
                .cloned()
                .map(TokenItem::Token)
                .ok_or_else(|| LayoutError::configuration(format!("unknown statistic '{}'", name)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_lookup() {
        let catalog = StatisticsCatalog::builtin();
        let score = catalog.get("score").unwrap();
        assert_eq!(score.multiplicity, Multiplicity::Channels);
        assert_eq!(score.value_type, ValueType::Real);
        assert!(catalog.get("replicate").unwrap().replicate_index);
        assert!(catalog.get("nonsense").is_none());
    }

    #[test]
    fn test_insert_overrides_in_place() {
        let mut catalog = StatisticsCatalog::builtin();
        let before = catalog.len();
        let position = catalog.iter().position(|t| t.name == "score").unwrap();

        catalog.insert(StatToken::new(
            "score",
            Multiplicity::Single,
            "Overall score",
            ValueType::Real,
        ));

        assert_eq!(catalog.len(), before);
        assert_eq!(catalog.iter().position(|t| t.name == "score"), Some(position));
        assert_eq!(
            catalog.get("score").unwrap().multiplicity,
            Multiplicity::Single
        );
    }

    #[test]
    fn test_parse_token_list_with_markers() {
        let catalog = StatisticsCatalog::builtin();
        let items = parse_token_list(
            &["plate", "group_channels_start", "score", "group_channels_end"],
            &catalog,
        )
        .unwrap();

        assert_eq!(items.len(), 4);
        assert_eq!(items[1], TokenItem::Marker(Marker::GroupChannelsStart));
        assert!(matches!(&items[2], TokenItem::Token(t) if t.name == "score"));
    }

    #[test]
    fn test_parse_token_list_unknown_name() {
        let catalog = StatisticsCatalog::builtin();
        let err = parse_token_list(&["plate", "zscore"], &catalog).unwrap_err();
        assert!(matches!(err, LayoutError::Configuration(msg) if msg.contains("zscore")));
    }

    #[test]
    fn test_marker_names() {
        for marker in Marker::ALL {
            assert_eq!(Marker::from_name(marker.as_str()), Some(marker));
        }
        assert!(Marker::GroupReplicatesStart.is_start());
        assert!(!Marker::GroupChannelsEnd.is_start());
    }
}
