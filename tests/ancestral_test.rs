use clademap::SiteError;
use clademap::ancestral::{
    Truncation, apply_indel_pattern, check_equal_lengths, gap_free,
    merge_states_and_indels, parse_indel_table, parse_state_table,
    reconcile_lengths,
};
use clademap::rst::{
    RstError, extract_labelled_tree, internal_node_order, node_position,
    parse_node_sequences,
};
use std::collections::BTreeMap;
use std::fs;
use std::io::Cursor;

fn rst_fixture() -> String {
    fs::read_to_string("tests/data/paml.rst").expect("fixture exists")
}

// ============================================================================
// Per-site length policies
// ============================================================================

#[test]
fn test_lenient_lengths_truncate_to_shorter() {
    let probabilities = vec![0.9_f64; 120];
    let states = vec!['A'; 118];

    let reconciled = reconcile_lengths(probabilities, states);
    assert_eq!(reconciled.first.len(), 118);
    assert_eq!(reconciled.second.len(), 118);
    assert_eq!(
        reconciled.truncation,
        Some(Truncation { first_len: 120, second_len: 118, kept: 118 })
    );
}

#[test]
fn test_lenient_lengths_equal_inputs_untouched() {
    let reconciled = reconcile_lengths(vec![1, 2, 3], vec!["a", "b", "c"]);
    assert_eq!(reconciled.first, vec![1, 2, 3]);
    assert_eq!(reconciled.second, vec!["a", "b", "c"]);
    assert_eq!(reconciled.truncation, None);
}

#[test]
fn test_strict_lengths_fail() {
    assert!(check_equal_lengths("Node5", 118, 118).is_ok());

    let states = "A".repeat(120);
    let pattern = vec![true; 118];
    match apply_indel_pattern("Node5", &states, &pattern) {
        Err(SiteError::LengthMismatch { node, states, indels }) => {
            assert_eq!(node, "Node5");
            assert_eq!(states, 120);
            assert_eq!(indels, 118);
        }
        other => panic!("expected a length mismatch, got {other:?}"),
    }
}

#[test]
fn test_indel_pattern_masks_absent_columns() {
    let pattern = [true, false, true, true, false];
    assert_eq!(
        apply_indel_pattern("n", "MKVLA", &pattern).expect("equal lengths"),
        "M-VL-"
    );
    assert_eq!(gap_free("M-VL-"), "MVL");
    assert_eq!(gap_free("-----"), "");
}

// ============================================================================
// State and indel tables
// ============================================================================

#[test]
fn test_state_table() {
    let table = "\
# Ancestral state reconstruction for all nodes in tree.treefile
# This file can be read in MS Excel or in R with command:
#   tab=read.table('x.state',header=TRUE)
Node\tSite\tState\tp_A\tp_R
Node1\t1\tM\t0.01\t0.00
Node1\t2\tK\t0.02\t0.01
Node1\t3\tV\t0.00\t0.00
Node2\t1\tM\t0.01\t0.00
Node2\t2\tR\t0.00\t0.97

Node2\t3\tV\t0.00\t0.00
";
    let states = parse_state_table(Cursor::new(table)).expect("valid table");
    assert_eq!(states.len(), 2);
    assert_eq!(states["Node1"], "MKV");
    assert_eq!(states["Node2"], "MRV");
}

#[test]
fn test_indel_table_skips_non_patterns() {
    let table = "ntaxa 3\nNode1 101\nNode2\t111\nNode3 1x1\n\nNode4 000\n";
    let patterns = parse_indel_table(Cursor::new(table)).expect("valid table");

    let keys: Vec<&str> = patterns.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["Node1", "Node2", "Node4"]);
    assert_eq!(patterns["Node1"], vec![true, false, true]);
    assert_eq!(patterns["Node4"], vec![false, false, false]);
}

#[test]
fn test_indel_table_without_patterns() {
    let result = parse_indel_table(Cursor::new("header line\nno patterns here\n"));
    assert!(matches!(result, Err(SiteError::NoIndelPatterns)));
}

#[test]
fn test_merge_reports_nodes_on_one_side() {
    let states: BTreeMap<String, String> = [
        ("Node1", "MKV"),
        ("Node2", "MKA"),
        ("Node3", "AAA"),
    ]
    .into_iter()
    .map(|(n, s)| (n.to_string(), s.to_string()))
    .collect();
    let indels: BTreeMap<String, Vec<bool>> = [
        ("Node1", vec![true, false, true]),
        ("Node2", vec![true, true, true]),
        ("Node4", vec![true, true, false]),
    ]
    .into_iter()
    .map(|(n, p)| (n.to_string(), p))
    .collect();

    let merged = merge_states_and_indels(&states, &indels).expect("lengths agree");
    assert_eq!(merged.sequences.len(), 2);
    assert_eq!(merged.sequences["Node1"], "M-V");
    assert_eq!(merged.sequences["Node2"], "MKA");
    assert_eq!(merged.missing_indel, vec!["Node3"]);
    assert_eq!(merged.extra_indel, vec!["Node4"]);
}

#[test]
fn test_merge_fails_on_any_length_mismatch() {
    let states: BTreeMap<String, String> =
        [("Node1".to_string(), "MKVL".to_string())].into_iter().collect();
    let indels: BTreeMap<String, Vec<bool>> =
        [("Node1".to_string(), vec![true, true, true])].into_iter().collect();

    assert!(matches!(
        merge_states_and_indels(&states, &indels),
        Err(SiteError::LengthMismatch { states: 4, indels: 3, .. })
    ));
}

// ============================================================================
// PAML .rst reports
// ============================================================================

#[test]
fn test_labelled_tree_spanning_lines() {
    let tree = extract_labelled_tree(&rst_fixture()).expect("tree present");
    assert_eq!(
        tree,
        "((((1_SzR_1, 2_SzR_2) 11 , (3_HeR_3, 4_HeR_4) 12 ) 10 , \
         ((5_OG_5, 6_OG_6) 14 , (7_WP_7, 8_WP_8) 15 ) 13 ) 9 ;"
    );
}

#[test]
fn test_labelled_tree_is_cut_at_semicolon() {
    let content = "TREE WITH NODE LABELS\n\n  ((1_A, 2_B) 4 , 3_C) 3 ; trailing\nmore\n";
    assert_eq!(
        extract_labelled_tree(content).expect("tree present"),
        "((1_A, 2_B) 4 , 3_C) 3 ;"
    );
}

#[test]
fn test_labelled_tree_errors() {
    assert!(matches!(
        extract_labelled_tree("TREE # 1\n((1,2),3);\n"),
        Err(RstError::MissingTreeSection)
    ));
    assert!(matches!(
        extract_labelled_tree("tree with node labels for Rod Page's TreeView\n\n"),
        Err(RstError::MissingNewick)
    ));
}

#[test]
fn test_internal_node_order_and_positions() {
    let order = internal_node_order(&rst_fixture());
    assert_eq!(order, vec![9, 10, 11, 12, 13, 14, 15]);
    assert_eq!(node_position(&order, 9).expect("present"), 0);
    assert_eq!(node_position(&order, 13).expect("present"), 4);
    assert!(matches!(
        node_position(&order, 99),
        Err(RstError::NodeNotFound(99))
    ));
}

#[test]
fn test_node_sequences() {
    let sequences = parse_node_sequences(&rst_fixture()).expect("blocks present");
    assert_eq!(sequences.len(), 7);
    assert_eq!(sequences["9"], "MKVLA");
    assert_eq!(sequences["12"], "MKILA");
    assert_eq!(sequences["15"], "MRVMA");
    assert!(!sequences.contains_key("SzR_1"));
}

#[test]
fn test_node_sequences_wrapped_blocks() {
    let content = "\
node #20  M K
  V L
A
node #21 MR
VLA

node #22 MKVLA
Probab of best state
node #23 AAAAA
TREE # 2
";
    let sequences = parse_node_sequences(content).expect("blocks present");
    assert_eq!(sequences["20"], "MKVLA");
    assert_eq!(sequences["21"], "MRVLA");
    assert_eq!(sequences["22"], "MKVLA");
    assert_eq!(sequences["23"], "AAAAA");
}

#[test]
fn test_node_sequences_missing() {
    assert!(matches!(
        parse_node_sequences("no reconstructed nodes\n"),
        Err(RstError::NoNodeSequences)
    ));
}

#[test]
fn test_node_headers_need_word_boundaries() {
    let content = "node#9 MKV\nnode #10 MKA\nnode #12abc\n\nnode #13_ MRA\n";
    let sequences = parse_node_sequences(content).expect("blocks present");
    let keys: Vec<&str> = sequences.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["10"]);
    assert_eq!(sequences["10"], "MKA");
    assert_eq!(internal_node_order(content), vec![10]);
}
