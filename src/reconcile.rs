//! End-to-end matching of one source/target tree pair.

use crate::parsers::rst::{RstError, extract_labelled_tree};
use crate::{
    CladeIndex, ConfigError, CorrespondenceMap, MatchConfig, NormalizeOptions,
    NormalizeSummary, SiteError, Tree, TreeError, TreeParseError,
    normalize_tree, parse_newick,
};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Cannot parse tree: {0}")]
    Parse(#[from] TreeParseError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Rst(#[from] RstError),
    #[error(transparent)]
    Site(#[from] SiteError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A parsed, normalized and indexed tree.
#[derive(Debug, Clone)]
pub struct PreparedTree {
    pub tree: Tree,
    pub index: CladeIndex,
    pub normalization: NormalizeSummary,
}

/// Parses `newick`, applies `options`, computes clade signatures and
/// builds the candidate index.
pub fn prepare_tree(
    newick: &str,
    options: &NormalizeOptions,
) -> Result<PreparedTree, ReconcileError> {
    let mut tree = parse_newick(newick.trim())?;
    let normalization = normalize_tree(&mut tree, options)?;
    tree.index_clades()?;
    let index = CladeIndex::build(&tree, &options.candidacy)?;
    Ok(PreparedTree { tree, index, normalization })
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub source: PreparedTree,
    pub target: PreparedTree,
    pub map: CorrespondenceMap,
}

impl Reconciliation {
    /// Target candidates with no source partner.
    pub fn unmatched_target(&self) -> Vec<Arc<str>> {
        self.map.unmatched_target(&self.target.index)
    }

    /// Number of tip labels the two trees share after normalization.
    pub fn tip_overlap(&self) -> usize {
        let source: FxHashSet<Arc<str>> =
            self.source.tree.tip_labels().into_iter().collect();
        self.target
            .tree
            .tip_labels()
            .iter()
            .filter(|label| source.contains(*label))
            .count()
    }
}

/// Matches the internal nodes of two trees by shared tip sets.
pub fn reconcile(
    source_newick: &str,
    target_newick: &str,
    config: &MatchConfig,
) -> Result<Reconciliation, ReconcileError> {
    let target = prepare_tree(target_newick, &config.target)?;
    info!("Target internal nodes with candidate labels: {}", target.index.len());

    let source = prepare_tree(source_newick, &config.source)?;
    info!("Source internal nodes with candidate labels: {}", source.index.len());

    let map = CorrespondenceMap::build(&source.index, &target.index);
    let reconciliation = Reconciliation { source, target, map };

    info!("Tip-label overlap size: {}", reconciliation.tip_overlap());
    debug!(
        "Target nodes without a source partner: {}",
        reconciliation.unmatched_target().len()
    );

    Ok(reconciliation)
}

/// [`reconcile`] against the node-labelled tree of a PAML `.rst` report.
pub fn reconcile_with_rst(
    source_newick: &str,
    rst_content: &str,
    config: &MatchConfig,
) -> Result<Reconciliation, ReconcileError> {
    let target_newick = extract_labelled_tree(rst_content)?;
    reconcile(source_newick, &target_newick, config)
}

pub fn reconcile_files(
    source_path: impl AsRef<Path>,
    target_path: impl AsRef<Path>,
    config: &MatchConfig,
) -> Result<Reconciliation, ReconcileError> {
    let source_newick = std::fs::read_to_string(source_path)?;
    let target_newick = std::fs::read_to_string(target_path)?;
    reconcile(&source_newick, &target_newick, config)
}

/// One independent tree pair, e.g. one gene family.
#[derive(Debug, Clone)]
pub struct ReconcileJob {
    pub name: String,
    pub source_newick: String,
    pub target_newick: String,
}

/// Reconciles many independent pairs in parallel. Results keep the job
/// order.
pub fn reconcile_batch(
    jobs: &[ReconcileJob],
    config: &MatchConfig,
) -> Vec<(String, Result<Reconciliation, ReconcileError>)> {
    jobs.par_iter()
        .map(|job| {
            let result =
                reconcile(&job.source_newick, &job.target_newick, config);
            (job.name.clone(), result)
        })
        .collect()
}
