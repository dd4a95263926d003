use crate::config::{Config, ConfigError};
use crate::search::SearchMode;

#[test]
fn test_missing_config_is_created_with_defaults() {
    let base = tempfile::tempdir().unwrap();
    let config = Config::load_with(base.path()).unwrap();

    assert_eq!(config.top_k, 3);
    assert_eq!(config.extension, "msg");
    assert_eq!(config.default_mode, SearchMode::Keyword);
    assert_eq!(config.semantic_search.model, "all-MiniLM-L6-v2");
    assert!(config.semantic_search.cache);
    assert_eq!(config.daemon.addr, "127.0.0.1:8080");
    assert_eq!(config.base_path(), base.path());

    let written = std::fs::read_to_string(base.path().join("config.yaml")).unwrap();
    assert!(written.contains("top_k: 3"));
}

#[test]
fn test_partial_config_is_filled_and_resaved() {
    let base = tempfile::tempdir().unwrap();
    let path = base.path().join("config.yaml");
    std::fs::write(&path, "top_k: 5\ndefault_mode: hybrid\nsemantic_search:\n  model: hash\n").unwrap();

    let config = Config::load_with(base.path()).unwrap();
    assert_eq!(config.top_k, 5);
    assert_eq!(config.default_mode, SearchMode::Hybrid);
    assert_eq!(config.semantic_search.model, "hash");
    assert!((config.semantic_search.hybrid_weight - 0.6).abs() < f32::EPSILON);

    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("hybrid_weight"));
    assert!(written.contains("daemon"));

    // loading again changes nothing
    let again = Config::load_with(base.path()).unwrap();
    assert_eq!(again, config);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), written);
}

#[test]
fn test_invalid_top_k_rejected() {
    let base = tempfile::tempdir().unwrap();
    std::fs::write(base.path().join("config.yaml"), "top_k: 0\n").unwrap();

    let err = Config::load_with(base.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { field: "top_k", .. }));
}

#[test]
fn test_validate_semantic_ranges() {
    let mut config = Config::default();
    assert!(config.validate().is_ok());

    config.semantic_search.hybrid_weight = 1.5;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "semantic_search.hybrid_weight", .. })
    ));

    config.semantic_search.hybrid_weight = 0.0;
    config.semantic_search.min_similarity = Some(-1.0);
    assert!(config.validate().is_ok());

    config.semantic_search.min_similarity = Some(1.2);
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "semantic_search.min_similarity", .. })
    ));
}

#[test]
fn test_validate_rejects_empty_strings() {
    let mut config = Config::default();
    config.extension = " ".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "extension", .. })
    ));

    config.extension = "msg".to_string();
    config.semantic_search.model = String::new();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "semantic_search.model", .. })
    ));
}

#[test]
fn test_malformed_config() {
    let base = tempfile::tempdir().unwrap();
    std::fs::write(base.path().join("config.yaml"), "top_k: [not a number\n").unwrap();

    assert!(matches!(
        Config::load_with(base.path()),
        Err(ConfigError::Malformed(_))
    ));
}

// the only test touching MAILGREP_* variables, so it cannot race another test
#[test]
fn test_env_overrides() {
    let base = tempfile::tempdir().unwrap();
    let emails = tempfile::tempdir().unwrap();

    std::env::set_var("MAILGREP_BASE_PATH", base.path());
    std::env::set_var("MAILGREP_EMAILS_DIR", emails.path());
    let loaded = Config::load();
    std::env::remove_var("MAILGREP_BASE_PATH");
    std::env::remove_var("MAILGREP_EMAILS_DIR");

    let config = loaded.unwrap();
    assert_eq!(config.base_path(), base.path());
    assert_eq!(config.emails_dir, emails.path());
    assert!(base.path().join("config.yaml").is_file());

    // the override is not written back
    let saved = Config::load_with(base.path()).unwrap();
    assert_ne!(saved.emails_dir, emails.path());
}
