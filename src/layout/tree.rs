use super::errors::LayoutError;
use super::tokens::{Marker, TokenItem};
use super::types::{Multiplicity, StatToken};

/// A token list with its group markers resolved into nesting
#[derive(Debug, Clone, PartialEq)]
pub enum TokenNode {
    Leaf(StatToken),
    /// Repeated once per selected channel
    ChannelGroup(Vec<TokenNode>),
    /// Included only when replicate columns are requested
    ReplicateGroup(Vec<TokenNode>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupKind {
    Channels,
    Replicates,
}

impl GroupKind {
    fn of(marker: Marker) -> Self {
        match marker {
            Marker::GroupChannelsStart | Marker::GroupChannelsEnd => GroupKind::Channels,
            Marker::GroupReplicatesStart | Marker::GroupReplicatesEnd => GroupKind::Replicates,
        }
    }

    fn start_marker(self) -> Marker {
        match self {
            GroupKind::Channels => Marker::GroupChannelsStart,
            GroupKind::Replicates => Marker::GroupReplicatesStart,
        }
    }
}

/// Parsed token tree, built once per run from the flat preference list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TokenTree {
    nodes: Vec<TokenNode>,
}

impl TokenTree {
    /// Match group markers in a single pass.
    ///
    /// # Errors
    ///
    /// `LayoutError::SchemaMismatch` for an end marker without a start, a
    /// start marker that is never closed, or an end of the wrong kind.
    pub fn parse(items: &[TokenItem]) -> Result<Self, LayoutError> {
        // Bottom frame is the top level; every open group pushes one
        let mut stack: Vec<(Option<(GroupKind, usize)>, Vec<TokenNode>)> = vec![(None, Vec::new())];

        for (idx, item) in items.iter().enumerate() {
            match item {
                TokenItem::Token(token) => {
                    if let Some((_, nodes)) = stack.last_mut() {
                        nodes.push(TokenNode::Leaf(token.clone()));
                    }
                }
                TokenItem::Marker(start) if start.is_start() => {
                    stack.push((Some((GroupKind::of(*start), idx)), Vec::new()));
                }
                TokenItem::Marker(end) => {
                    let expected = GroupKind::of(*end);
                    let open = stack.last().and_then(|(group, _)| *group);
                    match open {
                        Some((kind, _)) if kind == expected => {}
                        Some((kind, start)) => {
                            return Err(LayoutError::schema_mismatch(format!(
                                "{} at position {} closes {} opened at position {}",
                                end,
                                idx,
                                kind.start_marker(),
                                start
                            )));
                        }
                        None => {
                            return Err(LayoutError::schema_mismatch(format!(
                                "{} at position {} has no matching start",
                                end, idx
                            )));
                        }
                    }

                    let (_, nodes) = stack
                        .pop()
                        .ok_or_else(|| LayoutError::schema_mismatch("group stack underflow"))?;
                    let node = match expected {
                        GroupKind::Channels => TokenNode::ChannelGroup(nodes),
                        GroupKind::Replicates => TokenNode::ReplicateGroup(nodes),
                    };
                    if let Some((_, parent)) = stack.last_mut() {
                        parent.push(node);
                    }
                }
            }
        }

        if stack.len() > 1
            && let Some((Some((kind, start)), _)) = stack.last()
        {
            return Err(LayoutError::schema_mismatch(format!(
                "{} at position {} is never closed",
                kind.start_marker(),
                start
            )));
        }

        let nodes = stack.pop().map(|(_, nodes)| nodes).unwrap_or_default();
        Ok(Self { nodes })
    }

    pub fn nodes(&self) -> &[TokenNode] {
        &self.nodes
    }

    /// Whether a replicate-dependent token would be visited by an expansion
    /// with these inputs. Decides between 1 and `replicate_count` value rows.
    pub fn has_replicate_tokens<S: AsRef<str>>(&self, include_replicates: bool, params: &[S]) -> bool {
        fn reachable(nodes: &[TokenNode], include_replicates: bool, has_params: bool) -> bool {
            nodes.iter().any(|node| match node {
                TokenNode::Leaf(token) => {
                    // Outside a group, channel-and-replicate tokens need a channel to expand
                    include_replicates
                        && token.multiplicity.is_replicate_dependent()
                        && (has_params || token.multiplicity == Multiplicity::Replicates)
                }
                TokenNode::ChannelGroup(inner) => {
                    has_params && reachable(inner, include_replicates, has_params)
                }
                TokenNode::ReplicateGroup(inner) => {
                    include_replicates && reachable(inner, include_replicates, has_params)
                }
            })
        }

        reachable(&self.nodes, include_replicates, !params.is_empty())
    }

    /// Number of leaf tokens, ignoring groups
    pub fn leaf_count(&self) -> usize {
        fn count(nodes: &[TokenNode]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    TokenNode::Leaf(_) => 1,
                    TokenNode::ChannelGroup(inner) | TokenNode::ReplicateGroup(inner) => {
                        count(inner)
                    }
                })
                .sum()
        }
        count(&self.nodes)
    }
}
