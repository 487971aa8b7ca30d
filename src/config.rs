use crate::{NormalizeOptions, ReportColumns};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// How a source/target tree pair is normalized and reported.
///
/// The source tree is the one whose labels appear in the per-node files
/// being rewritten; the target tree supplies the replacement labels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub source: NormalizeOptions,
    pub target: NormalizeOptions,
    pub report_columns: ReportColumns,
}

/// Tip-style names that RAxML may leave on internal nodes.
const RAXML_TIP_STYLE_PREFIXES: [&str; 3] = ["SzR_", "HeR_", "OG_"];

impl MatchConfig {
    /// RAxML ancestral states onto an IQ-TREE `NodeXX` tree.
    pub fn raxml_to_iqtree() -> Self {
        let mut source = NormalizeOptions::raxml();
        source.candidacy.excluded_prefixes =
            RAXML_TIP_STYLE_PREFIXES.iter().map(|p| p.to_string()).collect();
        Self {
            source,
            target: NormalizeOptions::iqtree(),
            report_columns: ReportColumns::iqtree(),
        }
    }

    /// RAxML ancestral states onto the node ids of a PAML `.rst` tree.
    pub fn raxml_to_paml() -> Self {
        Self {
            source: NormalizeOptions::raxml(),
            target: NormalizeOptions::paml(),
            report_columns: ReportColumns::paml(),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
