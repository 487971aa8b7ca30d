use super::normalize::CandidacyRules;
use super::tree::{Tree, TreeError};
use rustc_hash::FxHashMap;
use std::fmt::Display;
use std::sync::Arc;
use tracing::warn;

/// The set of tip labels spanned by a subtree.
///
/// Stored as a sorted slice so that two signatures built from the same
/// labels in any order compare and hash equal, independently of the
/// tree they came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CladeSignature(Box<[Arc<str>]>);

impl CladeSignature {
    pub fn tip(label: Arc<str>) -> Self {
        Self(Box::new([label]))
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<Arc<str>> =
            labels.into_iter().map(|l| Arc::from(l.as_ref())).collect();
        Self::from_unsorted(labels)
    }

    /// Union of the given signatures.
    pub fn union<'a>(parts: impl IntoIterator<Item = &'a CladeSignature>) -> Self {
        let mut labels: Vec<Arc<str>> = Vec::new();
        for part in parts {
            labels.extend(part.0.iter().cloned());
        }
        Self::from_unsorted(labels)
    }

    fn from_unsorted(mut labels: Vec<Arc<str>>) -> Self {
        labels.sort_unstable();
        labels.dedup();
        Self(labels.into_boxed_slice())
    }

    /// Number of tips in the clade.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> &[Arc<str>] {
        &self.0
    }

    pub fn contains(&self, label: &str) -> bool {
        self.0.binary_search_by(|l| l.as_ref().cmp(label)).is_ok()
    }
}

impl Display for CladeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let labels: Vec<&str> = self.0.iter().map(|l| l.as_ref()).collect();
        write!(f, "{{{}}}", labels.join(","))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CladeEntry {
    pub signature: CladeSignature,
    pub label: Arc<str>,
}

/// Two candidate nodes of the same tree that span the same tips.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureCollision {
    pub overwritten: Arc<str>,
    pub winner: Arc<str>,
    pub clade_size: usize,
}

/// Clade signature to internal node label table for one tree.
///
/// Entries keep the position of the first insertion of their signature;
/// a later insertion of the same signature replaces the label and is
/// recorded as a [`SignatureCollision`].
#[derive(Debug, Clone, Default)]
pub struct CladeIndex {
    entries: Vec<CladeEntry>,
    positions: FxHashMap<CladeSignature, usize>,
    collisions: Vec<SignatureCollision>,
}

impl CladeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the index from the candidate internal nodes of `tree`, in
    /// pre-order. Empty labels count as unlabelled. Requires
    /// [`Tree::index_clades`] to have been run.
    pub fn build(
        tree: &Tree,
        rules: &CandidacyRules,
    ) -> Result<Self, TreeError> {
        let mut index = Self::new();
        let root_id = tree.first_node_id();
        for node_id in tree.node_ids_preorder() {
            if tree.is_tip(&node_id) {
                continue;
            }
            let Some(label) = tree.label(&node_id) else {
                continue;
            };
            let is_root = Some(node_id) == root_id;
            if label.is_empty() || !rules.is_candidate(&label, is_root) {
                continue;
            }
            let signature =
                tree.clade(&node_id).ok_or(TreeError::CladesNotIndexed)?;
            _ = index.insert(signature.clone(), label);
        }
        Ok(index)
    }

    /// Inserts an entry, returning the label it replaced, if any.
    pub fn insert(
        &mut self,
        signature: CladeSignature,
        label: Arc<str>,
    ) -> Option<Arc<str>> {
        if let Some(&position) = self.positions.get(&signature) {
            let entry = &mut self.entries[position];
            let overwritten = std::mem::replace(&mut entry.label, label.clone());
            warn!(
                "Clade of {} tips is claimed by both '{}' and '{}'; keeping '{}'.",
                signature.len(),
                overwritten,
                label,
                label
            );
            self.collisions.push(SignatureCollision {
                overwritten: overwritten.clone(),
                winner: label,
                clade_size: signature.len(),
            });
            Some(overwritten)
        } else {
            _ = self.positions.insert(signature.clone(), self.entries.len());
            self.entries.push(CladeEntry { signature, label });
            None
        }
    }

    pub fn get(&self, signature: &CladeSignature) -> Option<&Arc<str>> {
        self.positions
            .get(signature)
            .map(|&position| &self.entries[position].label)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[CladeEntry] {
        &self.entries
    }

    pub fn labels(&self) -> impl Iterator<Item = &Arc<str>> {
        self.entries.iter().map(|entry| &entry.label)
    }

    pub fn collisions(&self) -> &[SignatureCollision] {
        &self.collisions
    }
}
