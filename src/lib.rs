// -------------------------------------
// #![allow(dead_code)]
// #![allow(unused_mut)]
// #![allow(unused_imports)]
// #![allow(unused_variables)]
// #![allow(clippy::type_complexity)]
// #![allow(clippy::too_many_arguments)]
// -------------------------------------

pub mod ancestral;
mod config;
mod mapping;
mod parsers;
mod phylo;
mod reconcile;

pub use config::ConfigError;
pub use config::MatchConfig;
pub use mapping::CorrespondenceMap;
pub use mapping::CorrespondenceRow;
pub use mapping::MatchStatus;
pub use mapping::ReportColumns;
pub use mapping::RewriteStats;
pub use mapping::compare_labels;
pub use mapping::rewrite_file;
pub use mapping::rewrite_labels;
pub use mapping::sorted_rows;
pub use mapping::write_report;
pub use mapping::write_report_file;
pub use parsers::TreeParseError;
pub use parsers::newick::parse_newick;
pub use parsers::newick::write_newick;
pub use phylo::CandidacyRules;
pub use phylo::CladeEntry;
pub use phylo::CladeIndex;
pub use phylo::CladeSignature;
pub use phylo::Node;
pub use phylo::NodeId;
pub use phylo::NodeType;
pub use phylo::NormalizeOptions;
pub use phylo::NormalizeSummary;
pub use phylo::SignatureCollision;
pub use phylo::Tree;
pub use phylo::TreeError;
pub use phylo::normalize_tree;
pub use phylo::strip_numeric_prefix;
pub use phylo::strip_support_suffix;
pub use reconcile::PreparedTree;
pub use reconcile::ReconcileError;
pub use reconcile::ReconcileJob;
pub use reconcile::Reconciliation;
pub use reconcile::prepare_tree;
pub use reconcile::reconcile;
pub use reconcile::reconcile_batch;
pub use reconcile::reconcile_files;
pub use reconcile::reconcile_with_rst;

pub use ancestral::SiteError;

/// Readers for PAML `.rst` reports.
pub mod rst {
    pub use super::parsers::rst::{
        RstError, extract_labelled_tree, internal_node_order,
        node_position, parse_node_sequences,
    };
}
