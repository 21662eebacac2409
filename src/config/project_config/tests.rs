use super::*;
use tempfile::TempDir;

#[test]
fn test_category_weights_validation() {
    let valid = CategoryWeights::default();
    assert!(valid.is_valid());

    let invalid = CategoryWeights {
        structure: 50.0,
        ..CategoryWeights::default()
    };
    assert!(!invalid.is_valid());

    let negative = CategoryWeights {
        style: -5.0,
        ..CategoryWeights::default()
    };
    assert!(!negative.all_non_negative());
}

#[test]
fn test_category_weights_normalize() {
    let mut weights = CategoryWeights {
        structure: 2.0,
        content: 1.0,
        efficiency: 1.0,
        security: 0.0,
        style: 0.0,
    };
    weights.normalize();
    assert!((weights.structure - 50.0).abs() < 0.001);
    assert!((weights.content - 25.0).abs() < 0.001);
    assert!(weights.is_valid());
}

#[test]
fn test_uneven_weights_normalize_to_exactly_100() {
    let mut weights = CategoryWeights {
        structure: 1.0,
        content: 1.0,
        efficiency: 1.0,
        security: 0.0,
        style: 0.0,
    };
    weights.normalize();
    assert_eq!(weights.structure, 33.34);
    assert_eq!(weights.content, 33.33);
    assert_eq!(weights.efficiency, 33.33);
    let sum = weights.structure + weights.content + weights.efficiency;
    assert!((sum - 100.0).abs() < 1e-9, "{sum}");
    assert!(weights.is_valid());
}

#[test]
fn test_prepare_scales_oversized_weights() {
    let mut config = ValidationConfig::default();
    config.scoring.weights = CategoryWeights {
        structure: 10.0,
        content: 10.0,
        efficiency: 10.0,
        security: 10.0,
        style: 10.0,
    };
    let config = config.prepare().unwrap();
    assert_eq!(config.scoring.weights.structure, 20.0);
    assert_eq!(config.scoring.weights.style, 20.0);
    assert!(config.scoring.weights.is_valid());
}

#[test]
fn test_default_config() {
    let config = ValidationConfig::default();

    assert!(config.scoring.weights.is_valid());
    assert!((config.scoring.pass_threshold - 70.0).abs() < 0.001);
    assert!((config.style.full_threshold - 0.5).abs() < 0.001);
    assert!((config.style.partial_threshold - 0.3).abs() < 0.001);
    assert!(config.style.verbs.contains(&"run".to_string()));
    assert_eq!(config.budget.min_lines.get(PriorityTier::Critical), 50);
    assert_eq!(config.budget.min_lines.get(PriorityTier::Optional), 0);
    assert_eq!(config.budget.token_ceilings.get(PriorityTier::Important), 3000);
    assert_eq!(config.tokens.monthly_volume, 1000);
    assert!(config.tokens.output_tokens.is_none());
    assert!(config.security.is_rule_enabled("hardcoded-secret"));
}

#[test]
fn test_parse_toml_config() {
    let toml_content = r#"
[scoring]
pass_threshold = 80.0

[scoring.weights]
style = 25.0

[style]
full_threshold = 0.7

[budget]
priorities = { "scripts/main.py" = "critical" }

[budget.min_lines]
important = 20

[tokens]
monthly_volume = 5000
output_tokens = 300

[security]
disabled_rules = ["outbound-network-call"]

[references]
entrypoints = ["scripts/main.py"]
"#;

    let config: ValidationConfig = toml::from_str(toml_content).expect("parse config");

    assert!((config.scoring.pass_threshold - 80.0).abs() < 0.001);
    // Unspecified weights keep their defaults
    assert!((config.scoring.weights.structure - 20.0).abs() < 0.001);
    assert!((config.scoring.weights.style - 25.0).abs() < 0.001);
    assert!((config.style.full_threshold - 0.7).abs() < 0.001);
    assert!((config.style.partial_threshold - 0.3).abs() < 0.001);
    assert_eq!(
        config.budget.priorities.get("scripts/main.py"),
        Some(&PriorityTier::Critical)
    );
    assert_eq!(config.budget.min_lines.important, 20);
    assert_eq!(config.budget.min_lines.critical, 50);
    assert_eq!(config.tokens.monthly_volume, 5000);
    assert_eq!(config.tokens.output_tokens, Some(300));
    assert!(!config.security.is_rule_enabled("outbound-network-call"));
    assert_eq!(config.references.entrypoints, vec!["scripts/main.py"]);

    // 105 points in total gets scaled back to 100
    let prepared = config.prepare().expect("prepare");
    assert!(prepared.scoring.weights.is_valid());
}

#[test]
fn test_prepare_rejects_bad_values() {
    let mut config = ValidationConfig::default();
    config.scoring.weights.security = -1.0;
    assert!(config.prepare().is_err());

    let mut config = ValidationConfig::default();
    config.style.partial_threshold = 0.8;
    assert!(config.prepare().is_err());

    let mut config = ValidationConfig::default();
    config.budget.warning_fraction = 1.5;
    assert!(config.prepare().is_err());
}

#[test]
fn test_grade_bands() {
    let bands = GradeBands::default();
    assert_eq!(bands.grade(95.0), "A");
    assert_eq!(bands.grade(90.0), "A");
    assert_eq!(bands.grade(89.99), "B");
    assert_eq!(bands.grade(70.0), "C");
    assert_eq!(bands.grade(60.0), "D");
    assert_eq!(bands.grade(0.0), "F");
}

#[test]
fn test_default_config_toml_matches_defaults() {
    let parsed: ValidationConfig = toml::from_str(DEFAULT_CONFIG_TOML).expect("parse default toml");
    assert_eq!(parsed, ValidationConfig::default());
}

#[test]
fn test_load_from_package_root() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("skillcheck.toml"),
        "[tokens]\nmonthly_volume = 42\n",
    )
    .unwrap();
    let config = load_validation_config(dir.path());
    assert_eq!(config.tokens.monthly_volume, 42);
}

#[test]
fn test_json_config_fallback() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(".skillcheckrc.json"),
        r#"{"security": {"disabled_rules": ["broad-permission"]}}"#,
    )
    .unwrap();
    let config = load_validation_config(dir.path());
    assert!(!config.security.is_rule_enabled("broad-permission"));
}

#[test]
fn test_broken_discovered_config_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("skillcheck.toml"), "[tokens\nbroken").unwrap();
    let config = load_validation_config(dir.path());
    assert_eq!(config, ValidationConfig::default());

    // An explicit file surfaces the error instead
    assert!(load_config_file(&dir.path().join("skillcheck.toml")).is_err());
}
