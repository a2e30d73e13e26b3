use pretty_assertions::assert_eq;
use solide_common::{Config, GasCosts};
use tracing::info;

#[test]
fn test_default_config() {
    solide_common::logging::ensure_test_logging(None);
    info!("Running test");
    let config = Config::default();

    assert_eq!(config.editor.indent_width, 4);
    assert_eq!(config.editor.tab_size, 4);
    assert!(config.editor.trim_trailing_whitespace);
    assert_eq!(config.lint.header_scan_lines, 10);
    assert!(config.lint.disabled_rules.is_empty());
    assert_eq!(config.gas.base, 21_000);
    assert_eq!(config.gas.view_base, 2_100);
}

#[test]
fn test_config_round_trips_through_file() {
    solide_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("solide.toml");

    let mut config = Config::default();
    config.lint.disabled_rules.push("naming-convention".to_string());
    config.gas = GasCosts { storage_write: 5_000, ..GasCosts::default() };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_missing_file_is_an_error() {
    solide_common::logging::ensure_test_logging(None);
    info!("Running test");
    let dir = tempfile::tempdir().unwrap();

    let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_gas_section_overrides_only_named_weights() {
    solide_common::logging::ensure_test_logging(None);
    info!("Running test");
    let config = Config::from_toml("[gas]\nexternal_call = 2600\n").unwrap();

    assert_eq!(config.gas.external_call, 2_600);
    assert_eq!(config.gas.base, GasCosts::default().base);
}
