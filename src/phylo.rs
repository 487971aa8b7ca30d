mod clade;
mod node;
mod normalize;
mod tree;

pub use clade::{CladeEntry, CladeIndex, CladeSignature, SignatureCollision};
pub use node::{Node, NodeId, NodeType};
pub use normalize::{
    CandidacyRules, NormalizeOptions, NormalizeSummary, normalize_tree,
    strip_numeric_prefix, strip_support_suffix,
};
pub use tree::{Tree, TreeError};
