use crate::phylo::CladeIndex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Mapped,
    Unmapped,
}

impl Display for MatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                MatchStatus::Mapped => "mapped",
                MatchStatus::Unmapped => "unmapped",
            }
        )
    }
}

/// Outcome of looking up one source candidate in the target tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrespondenceRow {
    pub source: Arc<str>,
    pub target: Option<Arc<str>>,
    pub clade_size: usize,
}

impl CorrespondenceRow {
    pub fn status(&self) -> MatchStatus {
        if self.target.is_some() {
            MatchStatus::Mapped
        } else {
            MatchStatus::Unmapped
        }
    }
}

/// Source node label to target node label, derived from clades that
/// both trees share.
///
/// Only source-side misses are listed; target nodes without a partner
/// are available through [`CorrespondenceMap::unmatched_target`].
#[derive(Debug, Clone, Default)]
pub struct CorrespondenceMap {
    mapping: FxHashMap<Arc<str>, Arc<str>>,
    unmatched_source: Vec<Arc<str>>,
    rows: Vec<CorrespondenceRow>,
}

impl CorrespondenceMap {
    /// Looks up every source clade in `target` by exact tip-set equality.
    ///
    /// Source labels overwritten by a signature collision get an unmapped
    /// row but are not listed in [`CorrespondenceMap::unmatched_source`],
    /// which holds lookup misses only.
    pub fn build(source: &CladeIndex, target: &CladeIndex) -> Self {
        let mut map = Self::default();

        for entry in source.entries() {
            let target_label = target.get(&entry.signature).cloned();
            match &target_label {
                Some(target_label) => {
                    _ = map
                        .mapping
                        .insert(entry.label.clone(), target_label.clone());
                }
                None => map.unmatched_source.push(entry.label.clone()),
            }
            map.rows.push(CorrespondenceRow {
                source: entry.label.clone(),
                target: target_label,
                clade_size: entry.signature.len(),
            });
        }

        // Labels that lost their clade to a later node in the same tree.
        let mut reported: FxHashSet<&Arc<str>> = source.labels().collect();
        for collision in source.collisions() {
            if reported.insert(&collision.overwritten) {
                map.rows.push(CorrespondenceRow {
                    source: collision.overwritten.clone(),
                    target: None,
                    clade_size: collision.clade_size,
                });
            }
        }

        info!("Mapped internal nodes: {}", map.mapping.len());
        if !map.unmatched_source.is_empty() {
            warn!(
                "{} source nodes could not be mapped (topology mismatch or polytomy?).",
                map.unmatched_source.len()
            );
        }

        map
    }

    /// A map from explicit label pairs, without clade rows.
    pub fn from_pairs<I, S, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mapping = pairs
            .into_iter()
            .map(|(s, t)| (Arc::from(s.as_ref()), Arc::from(t.as_ref())))
            .collect();
        Self { mapping, ..Self::default() }
    }

    pub fn get(&self, source_label: &str) -> Option<&Arc<str>> {
        self.mapping.get(source_label)
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Arc<str>, &Arc<str>)> {
        self.mapping.iter()
    }

    pub fn unmatched_source(&self) -> &[Arc<str>] {
        &self.unmatched_source
    }

    /// Target candidates that no source node maps to, in target index
    /// order.
    pub fn unmatched_target(&self, target: &CladeIndex) -> Vec<Arc<str>> {
        let mapped: FxHashSet<&Arc<str>> = self.mapping.values().collect();
        target
            .labels()
            .filter(|label| !mapped.contains(label))
            .cloned()
            .collect()
    }

    /// One row per source candidate, in source index order, followed by
    /// the rows of source labels lost to signature collisions.
    pub fn rows(&self) -> &[CorrespondenceRow] {
        &self.rows
    }
}
