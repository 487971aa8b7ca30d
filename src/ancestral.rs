//! Per-node ancestral state tables and indel patterns, and the rules for
//! combining per-site arrays of the same alignment.

use std::collections::BTreeMap;
use std::io::BufRead;
use thiserror::Error;
use tracing::{info, warn};

pub const GAP: char = '-';

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("Length mismatch for node {node}: states={states} indels={indels}.")]
    LengthMismatch { node: String, states: usize, indels: usize },
    #[error("No valid 0/1 indel patterns found.")]
    NoIndelPatterns,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reads an IQ-TREE `.state` table into one sequence per node.
///
/// Each data line is `<node> <site> <state> ...`; the third column is
/// concatenated per node in file order. Comment lines (`#`), blank lines,
/// lines with fewer than three columns and lines whose site column is not
/// a number (the column header) are skipped.
pub fn parse_state_table(
    reader: impl BufRead,
) -> Result<BTreeMap<String, String>, SiteError> {
    let mut sequences: BTreeMap<String, String> = BTreeMap::new();
    for line in reader.lines() {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < 3 || columns[1].parse::<usize>().is_err() {
            continue;
        }
        sequences.entry(columns[0].to_string()).or_default().push_str(columns[2]);
    }
    Ok(sequences)
}

/// Reads `<node> <pattern>` lines where the pattern is a run of `0`
/// (deleted) and `1` (present). Lines whose second column is not such a
/// pattern, e.g. headers, are skipped.
pub fn parse_indel_table(
    reader: impl BufRead,
) -> Result<BTreeMap<String, Vec<bool>>, SiteError> {
    let mut patterns: BTreeMap<String, Vec<bool>> = BTreeMap::new();
    for line in reader.lines() {
        let line = line?;
        let mut columns = line.split_whitespace();
        let (Some(node), Some(bits)) = (columns.next(), columns.next()) else {
            continue;
        };
        if !bits.bytes().all(|b| b == b'0' || b == b'1') {
            continue;
        }
        _ = patterns.insert(node.to_string(), bits.bytes().map(|b| b == b'1').collect());
    }

    if patterns.is_empty() {
        return Err(SiteError::NoIndelPatterns);
    }
    Ok(patterns)
}

/// Strict length check for per-site arrays that must describe the same
/// columns.
pub fn check_equal_lengths(
    node: &str,
    states: usize,
    indels: usize,
) -> Result<(), SiteError> {
    if states == indels {
        Ok(())
    } else {
        Err(SiteError::LengthMismatch { node: node.to_string(), states, indels })
    }
}

/// Masks `states` with an indel pattern: absent columns become gaps,
/// present columns keep their state.
pub fn apply_indel_pattern(
    node: &str,
    states: &str,
    pattern: &[bool],
) -> Result<String, SiteError> {
    check_equal_lengths(node, states.chars().count(), pattern.len())?;
    Ok(states
        .chars()
        .zip(pattern)
        .map(|(state, &present)| if present { state } else { GAP })
        .collect())
}

/// Indel-aware sequences plus the nodes that could not take part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedSequences {
    pub sequences: BTreeMap<String, String>,
    /// Nodes with states but no indel pattern.
    pub missing_indel: Vec<String>,
    /// Nodes with an indel pattern but no states.
    pub extra_indel: Vec<String>,
}

/// Applies each node's indel pattern to its states.
///
/// Nodes present on only one side are reported, not fatal. A length
/// mismatch on any node is fatal.
pub fn merge_states_and_indels(
    states: &BTreeMap<String, String>,
    indels: &BTreeMap<String, Vec<bool>>,
) -> Result<MergedSequences, SiteError> {
    let mut merged = MergedSequences::default();

    for (node, sequence) in states {
        match indels.get(node) {
            Some(pattern) => {
                let masked = apply_indel_pattern(node, sequence, pattern)?;
                _ = merged.sequences.insert(node.clone(), masked);
            }
            None => merged.missing_indel.push(node.clone()),
        }
    }

    merged.extra_indel = indels
        .keys()
        .filter(|node| !states.contains_key(*node))
        .cloned()
        .collect();

    if !merged.missing_indel.is_empty() {
        warn!(
            "{} nodes have states but no indel pattern (skipped). Examples: {:?}",
            merged.missing_indel.len(),
            &merged.missing_indel[..merged.missing_indel.len().min(5)]
        );
    }
    if !merged.extra_indel.is_empty() {
        warn!(
            "{} nodes have an indel pattern but no states (ignored). Examples: {:?}",
            merged.extra_indel.len(),
            &merged.extra_indel[..merged.extra_indel.len().min(5)]
        );
    }
    info!("Merged {} sequences.", merged.sequences.len());

    Ok(merged)
}

/// Removes gap characters.
pub fn gap_free(sequence: &str) -> String {
    sequence.chars().filter(|&c| c != GAP).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub first_len: usize,
    pub second_len: usize,
    pub kept: usize,
}

/// Two per-site arrays cut to a common length.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled<A, B> {
    pub first: Vec<A>,
    pub second: Vec<B>,
    /// Set when the inputs differed in length.
    pub truncation: Option<Truncation>,
}

/// Lenient counterpart of [`check_equal_lengths`] for two independent
/// measurements of one alignment: both arrays are cut to the shorter
/// length and the cut is reported instead of failing.
pub fn reconcile_lengths<A, B>(
    mut first: Vec<A>,
    mut second: Vec<B>,
) -> Reconciled<A, B> {
    let (first_len, second_len) = (first.len(), second.len());
    if first_len == second_len {
        return Reconciled { first, second, truncation: None };
    }

    let kept = first_len.min(second_len);
    warn!(
        "Per-site lengths differ ({first_len} vs {second_len}); truncating both to {kept}."
    );
    first.truncate(kept);
    second.truncate(kept);
    Reconciled {
        first,
        second,
        truncation: Some(Truncation { first_len, second_len, kept }),
    }
}
