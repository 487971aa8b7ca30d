//! Readers for the PAML `.rst` ancestral reconstruction report.

use std::collections::BTreeMap;
use thiserror::Error;
use tracing::warn;

const TREE_SECTION_MARKER: &str = "tree with node labels";
const BLOCK_TERMINATORS: [&str; 4] = ["node #", "TREE", "Ancestral", "Probab"];

#[derive(Debug, Error)]
pub enum RstError {
    #[error("No \"tree with node labels\" section found.")]
    MissingTreeSection,
    #[error("No NEWICK string follows \"tree with node labels\".")]
    MissingNewick,
    #[error("Node {0} was not found among the reconstructed nodes.")]
    NodeNotFound(u32),
    #[error("No \"node #\" sequence blocks found.")]
    NoNodeSequences,
}

/// Returns the node-labelled NEWICK tree embedded in a `.rst` report.
///
/// The tree starts on the line after the first line containing
/// "tree with node labels" (any case) and may wrap over several lines;
/// it is cut after the first `;`.
pub fn extract_labelled_tree(content: &str) -> Result<String, RstError> {
    let mut lines = content.lines();
    lines
        .by_ref()
        .find(|line| line.to_lowercase().contains(TREE_SECTION_MARKER))
        .ok_or(RstError::MissingTreeSection)?;

    let mut parts: Vec<&str> = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        parts.push(line);
        if line.contains(';') {
            break;
        }
    }

    if parts.is_empty() {
        return Err(RstError::MissingNewick);
    }

    let joined = parts.join(" ");
    match joined.split_once(';') {
        Some((tree, _)) => Ok(format!("{tree};")),
        None => Ok(joined),
    }
}

/// Parses the id of a `node #<id>` header line. The word `node` must be
/// followed by whitespace and the id must end at a word boundary.
fn node_header_id(line: &str) -> Option<(u32, &str)> {
    let rest = line.trim_start();
    let rest = strip_prefix_ignore_case(rest, "node")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start().strip_prefix('#')?.trim_start();
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let tail = &rest[digits..];
    if tail.starts_with(|c: char| c.is_alphanumeric() || c == '_') {
        return None;
    }
    let id = rest[..digits].parse().ok()?;
    Some((id, tail))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) { Some(&s[prefix.len()..]) } else { None }
}

/// Internal node ids in the order their `node #<id>` lines appear.
pub fn internal_node_order(content: &str) -> Vec<u32> {
    content
        .lines()
        .filter(|line| line.starts_with("node #"))
        .filter_map(|line| node_header_id(line).map(|(id, _)| id))
        .collect()
}

/// 0-based position of `node_id` in `order`.
pub fn node_position(order: &[u32], node_id: u32) -> Result<usize, RstError> {
    order
        .iter()
        .position(|&id| id == node_id)
        .ok_or(RstError::NodeNotFound(node_id))
}

fn upper_case_runs(s: &str) -> String {
    s.chars().filter(char::is_ascii_uppercase).collect()
}

/// Reconstructed sequences per node id from the `node #<id>` blocks.
///
/// A block runs from its header (whose tail may already hold residues)
/// to the next blank line or a line starting with `node #`, `TREE`,
/// `Ancestral` or `Probab`.
pub fn parse_node_sequences(
    content: &str,
) -> Result<BTreeMap<String, String>, RstError> {
    let mut sequences: BTreeMap<String, String> = BTreeMap::new();
    let mut current: Option<String> = None;

    for line in content.lines() {
        if let Some((id, tail)) = node_header_id(line) {
            let id = id.to_string();
            sequences.entry(id.clone()).or_default().push_str(&upper_case_runs(tail));
            current = Some(id);
            continue;
        }

        let Some(id) = &current else {
            continue;
        };

        let trimmed = line.trim();
        if trimmed.is_empty()
            || BLOCK_TERMINATORS.iter().any(|t| trimmed.starts_with(t))
        {
            current = None;
            continue;
        }

        let residues = upper_case_runs(trimmed);
        if let Some(sequence) = sequences.get_mut(id) {
            sequence.push_str(&residues);
        }
    }

    if sequences.is_empty() {
        return Err(RstError::NoNodeSequences);
    }

    let mut lengths: Vec<usize> = sequences.values().map(String::len).collect();
    lengths.sort_unstable();
    lengths.dedup();
    if lengths.len() != 1 {
        warn!("Reconstructed sequences have differing lengths: {lengths:?}.");
    }

    Ok(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_parsing() {
        assert_eq!(node_header_id("node #229  MKT"), Some((229, "  MKT")));
        assert_eq!(node_header_id("Node # 7"), Some((7, "")));
        assert_eq!(node_header_id("node #x"), None);
        assert_eq!(node_header_id("nodes"), None);
    }

    #[test]
    fn header_needs_word_boundaries() {
        assert_eq!(node_header_id("node#9 MKV"), None);
        assert_eq!(node_header_id("node #12abc"), None);
        assert_eq!(node_header_id("node #12_"), None);
        assert_eq!(node_header_id("node #12 abc"), Some((12, " abc")));
        assert_eq!(node_header_id("node\t#3"), Some((3, "")));
    }
}
