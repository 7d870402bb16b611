use std::path::Path;

use dao_cli::{run_scenario, ExecutionReport, ScenarioConfig, ScenarioError};
use dao_types::{Clock, SystemClock};

fn reference() -> ScenarioConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/reference.toml");
    ScenarioConfig::from_toml_file(&path).unwrap()
}

const MINIMAL: &str = r#"
initial_allocation = 1000

[policy]
quorum = 1
proposal_duration_secs = 60
min_voting_threshold = 1

[[holders]]
name = "authority"
balance = 1000
"#;

#[test]
fn reference_scenario_parses_with_defaults() {
    let config = reference();
    assert_eq!(config.authority, "authority");
    assert_eq!(config.start_time, Some(1_700_000_000));
    assert_eq!(config.advance_secs, None);
    assert_eq!(config.holders.len(), 4);
    assert_eq!(config.holders[3].balance, 0);
    assert_eq!(config.policy.quorum, 100_000);
    assert_eq!(config.proposals[0].index, 0);
}

#[test]
fn reference_scenario_outcomes() {
    let report = run_scenario(&reference()).unwrap();

    let grant = report.proposal("grant").unwrap();
    assert_eq!(grant.yes_weight, 223_606);
    assert_eq!(grant.no_weight, 316_227);
    assert_eq!(
        grant.execution,
        ExecutionReport::Executed {
            outcome: "rejected (no majority)".into(),
            passed: false,
        }
    );

    let tooling = report.proposal("tooling").unwrap();
    assert_eq!(tooling.yes_weight, 539_833);
    assert_eq!(tooling.votes_cast, 2);
    assert!(matches!(
        tooling.execution,
        ExecutionReport::Executed { passed: true, .. }
    ));

    assert_eq!(report.treasury_start, 2_000_000_000);
    assert_eq!(report.treasury_end, 1_500_000_000);
    assert_eq!(report.holder_balance("carol"), Some(500_000_000));
    assert_eq!(report.holder_balance("authority"), Some(3_000_000_000));
}

#[test]
fn refused_votes_are_reported() {
    let report = run_scenario(&reference()).unwrap();
    let carol = report.votes.iter().find(|v| v.voter == "carol").unwrap();
    assert_eq!(carol.weight, None);
    assert!(carol.error.as_deref().unwrap().contains("insufficient"));
}

#[test]
fn short_advance_leaves_voting_open() {
    let mut config = reference();
    config.advance_secs = Some(5);
    let report = run_scenario(&config).unwrap();
    for p in &report.proposals {
        assert!(matches!(p.execution, ExecutionReport::Failed { .. }));
    }
    assert_eq!(report.treasury_end, report.treasury_start);
}

#[test]
fn proposal_below_creation_threshold_is_reported() {
    let mut config = reference();
    config.proposals[0].proposer = "carol".into();
    let report = run_scenario(&config).unwrap();
    let grant = report.proposal("grant").unwrap();
    assert!(grant.address.is_none());
    assert!(matches!(grant.execution, ExecutionReport::NotCreated { .. }));
    let refused = report
        .votes
        .iter()
        .filter(|v| v.proposal == "grant")
        .all(|v| v.error.as_deref() == Some("proposal was not created"));
    assert!(refused);
}

#[test]
fn unknown_names_abort() {
    let mut config = reference();
    config.votes[0].voter = "mallory".into();
    assert!(matches!(
        run_scenario(&config),
        Err(ScenarioError::UnknownHolder(name)) if name == "mallory"
    ));

    let mut config = reference();
    config.votes[0].proposal = "nope".into();
    assert!(matches!(
        run_scenario(&config),
        Err(ScenarioError::UnknownProposal(_))
    ));

    let mut config = reference();
    config.authority = "nobody".into();
    assert!(matches!(
        run_scenario(&config),
        Err(ScenarioError::UnknownHolder(_))
    ));
}

#[test]
fn duplicate_holder_rejected() {
    let mut config = reference();
    let dup = config.holders[1].clone();
    config.holders.push(dup);
    assert!(matches!(
        run_scenario(&config),
        Err(ScenarioError::DuplicateName(name)) if name == "alice"
    ));
}

#[test]
fn minimal_scenario_runs() {
    let config = ScenarioConfig::from_toml_str(MINIMAL).unwrap();
    assert_eq!(config.policy.proposal_creation_threshold, 0);
    assert_eq!(config.start_time, None);
    let report = run_scenario(&config).unwrap();
    assert_eq!(report.treasury_start, 1000);
    assert_eq!(report.holder_balance("authority"), Some(0));
    assert!(report.proposals.is_empty());
}

#[test]
fn invalid_policy_aborts_setup() {
    let mut config = ScenarioConfig::from_toml_str(MINIMAL).unwrap();
    config.policy.proposal_duration_secs = 0;
    assert!(matches!(
        run_scenario(&config),
        Err(ScenarioError::Governance(_))
    ));
}

#[test]
fn malformed_file_is_a_parse_error() {
    assert!(matches!(
        ScenarioConfig::from_toml_str("initial_allocation = \"lots\""),
        Err(ScenarioError::Parse(_))
    ));
}

#[test]
fn report_renders_as_text_and_json() {
    let report = run_scenario(&reference()).unwrap();
    let text = report.to_string();
    assert!(text.contains("voting window   5s"));
    assert!(text.contains("rejected (no majority)"));

    let json: serde_json::Value = serde_json::to_value(&report).unwrap();
    assert_eq!(json["treasury_end"], 1_500_000_000u64);
    assert_eq!(json["proposals"][1]["execution"]["status"], "executed");
    assert_eq!(json["votes"][0]["choice"], "yes");
}

#[test]
fn missing_start_time_reads_the_system_clock() {
    let config = ScenarioConfig::from_toml_str(MINIMAL).unwrap();
    let before = SystemClock.now().as_secs();
    let report = run_scenario(&config).unwrap();
    let after = SystemClock.now().as_secs();
    assert!(report.start_time >= before && report.start_time <= after);

    let pinned = run_scenario(&reference()).unwrap();
    assert_eq!(pinned.start_time, 1_700_000_000);
}
