use pretty_assertions::assert_eq;
use solide_common::{logging::ensure_test_logging, GasCosts, LintConfig, TEMPLATES};
use solide_engine::{
    estimate_gas, format, lint, optimize, tokenize, GasEstimator, Linter, Severity, TokenKind,
};
use tracing::info;

const AIRDROP: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity 0.8.19;

contract Airdrop {
    address[] public recipients;
    mapping(address => bool) public paid;

    function payAll() external {
        for (uint256 i = 0; i < recipients.length; i++) {
            (bool ok, ) = recipients[i].call{value: 1 ether}("");
            require(ok);
            paid[recipients[i]] = true;
        }
    }
}
"#;

#[test]
fn test_empty_source() {
    ensure_test_logging(None);
    info!("Running test");

    assert!(tokenize("").is_empty());
    let codes: Vec<_> = lint("").iter().filter_map(|issue| issue.code).collect();
    assert_eq!(codes, vec!["missing-spdx", "missing-pragma"]);
    assert!(estimate_gas("").is_empty());
    assert_eq!(format(""), "");
}

#[test]
fn test_comment_only_source() {
    ensure_test_logging(None);
    info!("Running test");

    let tokens = tokenize("// comment\n");
    let kinds: Vec<_> = tokens.iter().map(|t| (t.kind, t.text)).collect();
    assert_eq!(kinds, vec![(TokenKind::Comment, "// comment"), (TokenKind::Whitespace, "\n")]);

    let codes: Vec<_> = lint("// comment\n").iter().filter_map(|issue| issue.code).collect();
    assert_eq!(codes, vec!["missing-spdx", "missing-pragma"]);
}

#[test]
fn test_loop_and_reentrancy_scenario() {
    ensure_test_logging(None);
    info!("Running test");

    let issues = lint(AIRDROP);
    let found: Vec<_> = issues.iter().map(|i| (i.code, i.line, i.column)).collect();
    assert_eq!(
        found,
        vec![(Some("unbounded-loop"), 9, 9), (Some("reentrancy"), 12, 13)]
    );
    assert!(issues.iter().all(|i| i.severity == Severity::Warning));

    let estimate = estimate_gas(AIRDROP);
    let gas = estimate.get("payAll").unwrap();
    assert!(gas > GasCosts::default().base);
}

#[test]
fn test_view_function_costs_reduced_base() {
    ensure_test_logging(None);
    info!("Running test");

    let source = "contract A {\n    uint256 x;\n    function get() public view returns (uint256) {\n        return x;\n    }\n}\n";
    let estimate = estimate_gas(source);
    assert_eq!(estimate.len(), 1);
    assert_eq!(estimate.get("get"), Some(GasCosts::default().view_base));
    assert_eq!(estimate.get("get"), Some(2100));
}

#[test]
fn test_two_functions_sum_to_total() {
    ensure_test_logging(None);
    info!("Running test");

    let source = "contract A {\n    uint256 x;\n    function set(uint256 v) public { x = v; }\n    function reset() public { delete x; }\n}\n";
    let estimate = estimate_gas(source);
    assert_eq!(estimate.names().collect::<Vec<_>>(), vec!["set", "reset"]);
    let sum = estimate.get("set").unwrap() + estimate.get("reset").unwrap();
    assert_eq!(estimate.total(), sum);
}

#[test]
fn test_custom_configuration() {
    ensure_test_logging(None);
    info!("Running test");

    let config = LintConfig {
        disabled_rules: vec!["reentrancy".to_string()],
        ..LintConfig::default()
    };
    let issues = Linter::new(config).lint(AIRDROP);
    assert!(issues.iter().all(|i| i.code != Some("reentrancy")));

    let costs = GasCosts { view_base: 7, ..GasCosts::default() };
    let estimate = GasEstimator::new(costs)
        .estimate("contract A { function f() external pure returns (uint256) { return 1; } }");
    assert_eq!(estimate.get("f"), Some(7));
}

#[test]
fn test_templates_analyse_cleanly() {
    ensure_test_logging(None);
    info!("Running test");

    for template in TEMPLATES {
        let issues = lint(template.code);
        assert!(
            issues.iter().all(|i| i.severity != Severity::Error),
            "template {} has errors: {issues:?}",
            template.id
        );
        assert_eq!(format(template.code), template.code, "template {} is not formatted", template.id);
        assert_eq!(format(&optimize(template.code)), optimize(template.code));
    }
}

#[test]
fn test_erc20_template_estimates() {
    ensure_test_logging(None);
    info!("Running test");

    let template = solide_common::find_template("erc20").unwrap();
    let estimate = estimate_gas(template.code);
    assert!(estimate.get("transfer").is_some());
    assert!(estimate.get("balanceOf").unwrap() < GasCosts::default().base);
    assert_eq!(estimate.total(), estimate.iter().map(|f| f.gas).sum::<u64>());
}
