//! Scenario configuration and the runner that plays it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use dao_crypto::derive_address;
use dao_governance::{GovernanceEngine, GovernanceError, ProposalRequest, RegistryPolicy};
use dao_nullables::{NullClock, NullStore, NullTokenLedger};
use dao_store::{TokenError, TokenLedger};
use dao_types::{Address, Clock, SystemClock, Timestamp, TokenAmount, VoteChoice};

use crate::report::{ExecutionReport, HolderReport, ProposalReport, ScenarioReport, VoteReport};

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("unknown holder {0:?}")]
    UnknownHolder(String),
    #[error("unknown proposal {0:?}")]
    UnknownProposal(String),
    #[error("name {0:?} is used more than once")]
    DuplicateName(String),
    #[error("registry setup failed: {0}")]
    Governance(#[from] GovernanceError),
    #[error("funding holders failed: {0}")]
    Token(#[from] TokenError),
}

/// A complete scenario: one registry, its holders, and the script to run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Label for the governed mint; its address is derived from it.
    #[serde(default = "default_mint")]
    pub mint: String,

    /// Holder that initializes the registry and funds the treasury.
    #[serde(default = "default_authority")]
    pub authority: String,

    /// Clock reading, in unix seconds, when the scenario starts. Read from
    /// the system clock when absent.
    #[serde(default)]
    pub start_time: Option<u64>,

    /// Tokens moved from the authority into the treasury at setup.
    pub initial_allocation: u64,

    /// Seconds to advance between voting and execution. Defaults to one
    /// second past the voting window.
    #[serde(default)]
    pub advance_secs: Option<u64>,

    pub policy: RegistryPolicy,

    #[serde(default)]
    pub holders: Vec<HolderConfig>,

    #[serde(default)]
    pub proposals: Vec<ProposalConfig>,

    #[serde(default)]
    pub votes: Vec<VoteConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HolderConfig {
    pub name: String,
    #[serde(default)]
    pub balance: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProposalConfig {
    pub name: String,
    pub proposer: String,
    #[serde(default)]
    pub index: u64,
    #[serde(default)]
    pub description: String,
    pub amount: u64,
    /// Holder whose token account receives the payout.
    pub target: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoteConfig {
    pub proposal: String,
    pub voter: String,
    pub choice: VoteChoice,
}

fn default_mint() -> String {
    "governance".into()
}

fn default_authority() -> String {
    "authority".into()
}

impl ScenarioConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ScenarioError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }
}

/// Wallet and token account of one scenario holder.
#[derive(Clone, Copy)]
struct Holder {
    wallet: Address,
    account: Address,
}

fn holder_for(mint: &Address, name: &str) -> Holder {
    let wallet = derive_address(b"scenario-wallet", &[name.as_bytes()]);
    let account = derive_address(b"scenario-token-account", &[wallet.as_bytes(), mint.as_bytes()]);
    Holder { wallet, account }
}

/// Play `config` against fresh in-memory collaborators.
///
/// Setup failures (unknown names, registry initialization) abort the run.
/// Failures of individual proposals, votes and executions are recorded in
/// the report instead, since rejected operations are part of what a
/// scenario exercises.
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioReport, ScenarioError> {
    let mint = derive_address(b"scenario-mint", &[config.mint.as_bytes()]);
    let tokens = Arc::new(NullTokenLedger::new());
    let start = config
        .start_time
        .map(Timestamp::new)
        .unwrap_or_else(|| SystemClock.now());
    let clock = Arc::new(NullClock::new(start.as_secs()));
    let engine = GovernanceEngine::new(Arc::new(NullStore::new()), tokens.clone(), clock.clone());

    let mut holders: HashMap<&str, Holder> = HashMap::new();
    for h in &config.holders {
        let holder = holder_for(&mint, &h.name);
        if holders.insert(h.name.as_str(), holder).is_some() {
            return Err(ScenarioError::DuplicateName(h.name.clone()));
        }
        tokens.open_funded(&holder.account, &mint, &holder.wallet, TokenAmount::new(h.balance))?;
    }
    let lookup = |name: &str| {
        holders
            .get(name)
            .copied()
            .ok_or_else(|| ScenarioError::UnknownHolder(name.to_string()))
    };

    let authority = lookup(&config.authority)?;
    let registry = engine.initialize_registry(
        &authority.wallet,
        &mint,
        &authority.account,
        config.policy.clone(),
        TokenAmount::new(config.initial_allocation),
    )?;
    let treasury_start = engine.treasury_balance(&registry.address)?;
    info!(registry = %registry.address, treasury = %treasury_start, "scenario registry ready");

    // name -> (address, target account); None when creation failed.
    let mut created: HashMap<&str, Option<(Address, Address)>> = HashMap::new();
    let mut proposal_errors: HashMap<&str, String> = HashMap::new();
    for p in &config.proposals {
        if created.contains_key(p.name.as_str()) {
            return Err(ScenarioError::DuplicateName(p.name.clone()));
        }
        let proposer = lookup(&p.proposer)?;
        let target = lookup(&p.target)?;
        let request = ProposalRequest {
            index: p.index,
            description: p.description.clone(),
            action_amount: TokenAmount::new(p.amount),
            action_target: target.account,
        };
        let result = engine.create_proposal(
            &proposer.wallet,
            &registry.address,
            &proposer.account,
            request,
        );
        match result {
            Ok(proposal) => {
                created.insert(&p.name, Some((proposal.address, target.account)));
            }
            Err(e) => {
                warn!(proposal = %p.name, error = %e, "proposal not created");
                created.insert(&p.name, None);
                proposal_errors.insert(&p.name, e.to_string());
            }
        }
    }

    let mut votes = Vec::with_capacity(config.votes.len());
    for v in &config.votes {
        let voter = lookup(&v.voter)?;
        let slot = created
            .get(v.proposal.as_str())
            .ok_or_else(|| ScenarioError::UnknownProposal(v.proposal.clone()))?;
        let result = match slot {
            Some((address, _)) => engine
                .cast_vote(&voter.wallet, address, v.choice, &voter.account)
                .map(|r| r.weight)
                .map_err(|e| e.to_string()),
            None => Err("proposal was not created".to_string()),
        };
        votes.push(VoteReport {
            proposal: v.proposal.clone(),
            voter: v.voter.clone(),
            choice: v.choice,
            weight: result.as_ref().ok().copied(),
            error: result.err(),
        });
    }

    let advance = config
        .advance_secs
        .unwrap_or_else(|| config.policy.proposal_duration_secs.saturating_add(1));
    clock.advance(advance);

    let mut proposals = Vec::with_capacity(config.proposals.len());
    for p in &config.proposals {
        let report = match created.get(p.name.as_str()).copied().flatten() {
            Some((address, target)) => {
                let execution = match engine.execute_proposal(
                    &address,
                    &registry.treasury_vault,
                    &target,
                ) {
                    Ok(outcome) => ExecutionReport::Executed {
                        outcome: outcome.to_string(),
                        passed: outcome.is_passed(),
                    },
                    Err(e) => ExecutionReport::Failed {
                        error: e.to_string(),
                    },
                };
                let record = engine.proposal(&address)?;
                ProposalReport {
                    name: p.name.clone(),
                    address: Some(address.to_string()),
                    yes_weight: record.yes_weight,
                    no_weight: record.no_weight,
                    votes_cast: record.votes_cast,
                    execution,
                }
            }
            None => ProposalReport {
                name: p.name.clone(),
                address: None,
                yes_weight: 0,
                no_weight: 0,
                votes_cast: 0,
                execution: ExecutionReport::NotCreated {
                    error: proposal_errors
                        .get(p.name.as_str())
                        .cloned()
                        .unwrap_or_default(),
                },
            },
        };
        proposals.push(report);
    }

    let treasury_end = engine.treasury_balance(&registry.address)?;
    let holders_report = config
        .holders
        .iter()
        .map(|h| {
            let holder = holder_for(&mint, &h.name);
            Ok(HolderReport {
                name: h.name.clone(),
                balance: tokens.balance_of(&holder.account)?.raw(),
            })
        })
        .collect::<Result<Vec<_>, TokenError>>()?;

    info!(
        proposals = proposals.len(),
        votes = votes.len(),
        treasury = %treasury_end,
        "scenario complete"
    );

    Ok(ScenarioReport {
        registry: registry.address.to_string(),
        treasury_vault: registry.treasury_vault.to_string(),
        start_time: start.as_secs(),
        voting_window_secs: config.policy.proposal_duration_secs,
        treasury_start: treasury_start.raw(),
        treasury_end: treasury_end.raw(),
        proposals,
        votes,
        holders: holders_report,
    })
}
