use clademap::{
    CandidacyRules, ConfigError, MatchConfig, NormalizeOptions, ReportColumns,
    reconcile,
};
use std::fs;

#[test]
fn test_empty_json_gives_defaults() {
    let config = MatchConfig::from_json_str("{}").expect("valid json");
    assert_eq!(config, MatchConfig::default());
    assert!(config.source.candidacy.include_root);
    assert_eq!(config.report_columns.target, "target_node");
    assert_eq!(config.report_columns.source, "source_node");
}

#[test]
fn test_partial_json_matches_presets() {
    let json = r#"{
        "source": { "placeholder_root": "ROOT" },
        "target": {
            "support_separator": "/",
            "candidacy": { "required_prefix": "Node" }
        },
        "report_columns": { "target": "iqtree_node", "source": "raxml_node" }
    }"#;
    let config = MatchConfig::from_json_str(json).expect("valid json");

    assert_eq!(config.source, NormalizeOptions::raxml());
    assert_eq!(config.target, NormalizeOptions::iqtree());
    assert_eq!(config.report_columns, ReportColumns::iqtree());
}

#[test]
fn test_presets_survive_json() {
    for config in [
        MatchConfig::default(),
        MatchConfig::raxml_to_iqtree(),
        MatchConfig::raxml_to_paml(),
    ] {
        let json = config.to_json_string().expect("serializable");
        let loaded = MatchConfig::from_json_str(&json).expect("valid json");
        assert_eq!(loaded, config);
    }
}

#[test]
fn test_raxml_to_iqtree_excludes_tip_style_labels() {
    let rules = MatchConfig::raxml_to_iqtree().source.candidacy;
    assert!(rules.is_candidate("230", false));
    assert!(!rules.is_candidate("SzR_12", false));
    assert!(!rules.is_candidate("HeR_3", false));
    assert!(!rules.is_candidate("OG_WP_010903286", false));
}

#[test]
fn test_required_prefix() {
    let rules = CandidacyRules {
        required_prefix: Some("Node".to_string()),
        ..CandidacyRules::default()
    };
    assert!(rules.is_candidate("Node12", false));
    assert!(rules.is_candidate("Node1", true));
    assert!(!rules.is_candidate("95", false));
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        MatchConfig::from_json_str("{ \"source\": 3 }"),
        Err(ConfigError::Json(_))
    ));
    assert!(matches!(
        MatchConfig::from_json_str("{ \"target\": { \"support_separator\": \"//\" } }"),
        Err(ConfigError::Json(_))
    ));
}

#[test]
fn test_config_file() {
    let dir = tempfile::tempdir().expect("temporary directory");
    let path = dir.path().join("match.json");
    fs::write(
        &path,
        r#"{ "source": { "candidacy": { "include_root": false } },
             "target": { "candidacy": { "include_root": false } } }"#,
    )
    .expect("config written");

    let config = MatchConfig::from_json_file(&path).expect("valid config file");
    let result = reconcile(
        "(( L1,L2)IntA,L3)RootA;",
        "((L1,L2)IntB,L3)RootB;",
        &config,
    )
    .expect("trees match");
    assert_eq!(result.map.len(), 1);
    assert_eq!(result.map.get("IntA").map(|l| l.as_ref()), Some("IntB"));

    assert!(matches!(
        MatchConfig::from_json_file(dir.path().join("missing.json")),
        Err(ConfigError::Io(_))
    ));
}
