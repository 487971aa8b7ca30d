//! Tree-specific label cleanup applied before clade matching.

use super::tree::{Tree, TreeError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Which labelled internal nodes may be entered into a
/// [`CladeIndex`](super::CladeIndex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidacyRules {
    /// Only labels starting with this prefix are candidates.
    pub required_prefix: Option<String>,
    /// Labels starting with any of these are tip-style names sitting on
    /// internal nodes and are never candidates.
    pub excluded_prefixes: Vec<String>,
    pub include_root: bool,
}

impl Default for CandidacyRules {
    fn default() -> Self {
        Self {
            required_prefix: None,
            excluded_prefixes: Vec::new(),
            include_root: true,
        }
    }
}

impl CandidacyRules {
    pub fn is_candidate(&self, label: &str, is_root: bool) -> bool {
        if is_root && !self.include_root {
            return false;
        }
        if let Some(prefix) = &self.required_prefix
            && !label.starts_with(prefix.as_str())
        {
            return false;
        }
        !self
            .excluded_prefixes
            .iter()
            .any(|prefix| label.starts_with(prefix.as_str()))
    }
}

/// Normalization applied to one tree before its clades are indexed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Label of an artificial single-child root to collapse.
    pub placeholder_root: Option<String>,
    /// Internal labels keep only the text before the first occurrence.
    pub support_separator: Option<char>,
    /// Drop a leading `<digits>_` from tip labels.
    pub strip_numeric_tip_prefix: bool,
    pub candidacy: CandidacyRules,
}

impl NormalizeOptions {
    /// RAxML `nodeLabelledRootedTree`: numeric internal labels under a
    /// single-child `ROOT` placeholder.
    pub fn raxml() -> Self {
        Self { placeholder_root: Some("ROOT".to_string()), ..Self::default() }
    }

    /// IQ-TREE: `NodeXX/support/support` internal labels.
    pub fn iqtree() -> Self {
        Self {
            support_separator: Some('/'),
            candidacy: CandidacyRules {
                required_prefix: Some("Node".to_string()),
                ..CandidacyRules::default()
            },
            ..Self::default()
        }
    }

    /// PAML `.rst` tree: tips carry a `<number>_` prefix.
    pub fn paml() -> Self {
        Self { strip_numeric_tip_prefix: true, ..Self::default() }
    }
}

/// What [`normalize_tree`] changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeSummary {
    pub root_collapsed: bool,
    pub tips_renamed: usize,
    pub labels_trimmed: usize,
}

/// Returns the part of `label` before the first `separator`.
pub fn strip_support_suffix(label: &str, separator: char) -> &str {
    match label.split_once(separator) {
        Some((head, _)) => head,
        None => label,
    }
}

/// Strips a leading `<digits>_` prefix, e.g. `112_OG_WP_010903286` to
/// `OG_WP_010903286`. Returns `None` when the label does not match.
pub fn strip_numeric_prefix(label: &str) -> Option<&str> {
    let digits = label.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = label[digits..].strip_prefix('_')?;
    if rest.is_empty() { None } else { Some(rest) }
}

/// Applies `options` to `tree` in place: root collapse, tip renaming and
/// support-suffix trimming, in that order.
///
/// Tip renaming discards clade signatures; index them afterwards. Fails
/// only when root collapse finds a tree without a single root.
pub fn normalize_tree(
    tree: &mut Tree,
    options: &NormalizeOptions,
) -> Result<NormalizeSummary, TreeError> {
    let mut summary = NormalizeSummary::default();

    if let Some(placeholder) = &options.placeholder_root
        && tree.collapse_placeholder_root(placeholder)?.is_some()
    {
        info!("Collapsed placeholder root '{placeholder}'.");
        summary.root_collapsed = true;
    }

    if options.strip_numeric_tip_prefix {
        for node_id in tree.tip_node_ids_all() {
            let Some(label) = tree.label(&node_id) else {
                continue;
            };
            if let Some(stripped) = strip_numeric_prefix(&label) {
                tree.set_label(&node_id, Some(stripped));
                summary.tips_renamed += 1;
            }
        }
        debug!("Stripped numeric prefixes from {} tips.", summary.tips_renamed);
    }

    if let Some(separator) = options.support_separator {
        for node_id in tree.internal_node_ids_all() {
            let Some(label) = tree.label(&node_id) else {
                continue;
            };
            let trimmed = strip_support_suffix(&label, separator);
            if trimmed.len() != label.len() {
                // A bare support value leaves the node unlabelled.
                let trimmed = if trimmed.is_empty() { None } else { Some(trimmed) };
                tree.set_label(&node_id, trimmed);
                summary.labels_trimmed += 1;
            }
        }
    }

    Ok(summary)
}
