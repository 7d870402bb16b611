//! What a scenario run produced, for printing or JSON output.

use std::fmt;

use serde::Serialize;

use dao_types::VoteChoice;
use dao_utils::format_duration;

#[derive(Clone, Debug, Serialize)]
pub struct ScenarioReport {
    pub registry: String,
    pub treasury_vault: String,
    pub start_time: u64,
    pub voting_window_secs: u64,
    pub treasury_start: u64,
    pub treasury_end: u64,
    pub proposals: Vec<ProposalReport>,
    pub votes: Vec<VoteReport>,
    pub holders: Vec<HolderReport>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ProposalReport {
    pub name: String,
    pub address: Option<String>,
    pub yes_weight: u64,
    pub no_weight: u64,
    pub votes_cast: u64,
    pub execution: ExecutionReport,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionReport {
    Executed { outcome: String, passed: bool },
    Failed { error: String },
    NotCreated { error: String },
}

#[derive(Clone, Debug, Serialize)]
pub struct VoteReport {
    pub proposal: String,
    pub voter: String,
    pub choice: VoteChoice,
    /// Quadratic weight credited, if the vote was accepted.
    pub weight: Option<u64>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct HolderReport {
    pub name: String,
    pub balance: u64,
}

impl ScenarioReport {
    pub fn proposal(&self, name: &str) -> Option<&ProposalReport> {
        self.proposals.iter().find(|p| p.name == name)
    }

    pub fn holder_balance(&self, name: &str) -> Option<u64> {
        self.holders.iter().find(|h| h.name == name).map(|h| h.balance)
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "registry        {}", self.registry)?;
        writeln!(f, "treasury vault  {}", self.treasury_vault)?;
        writeln!(f, "started at      {}", self.start_time)?;
        writeln!(f, "voting window   {}", format_duration(self.voting_window_secs))?;
        writeln!(f, "treasury        {} -> {}", self.treasury_start, self.treasury_end)?;

        writeln!(f, "\nvotes")?;
        for v in &self.votes {
            let result = match (&v.weight, &v.error) {
                (Some(w), _) => format!("weight {w}"),
                (None, Some(e)) => format!("refused: {e}"),
                (None, None) => String::new(),
            };
            writeln!(f, "  {:<12} {:<12} {:<4} {}", v.proposal, v.voter, v.choice, result)?;
        }

        writeln!(f, "\nproposals")?;
        for p in &self.proposals {
            let status = match &p.execution {
                ExecutionReport::Executed { outcome, .. } => outcome.clone(),
                ExecutionReport::Failed { error } => format!("execution failed: {error}"),
                ExecutionReport::NotCreated { error } => format!("not created: {error}"),
            };
            writeln!(
                f,
                "  {:<12} yes {:>10}  no {:>10}  votes {:>3}  {}",
                p.name, p.yes_weight, p.no_weight, p.votes_cast, status
            )?;
        }

        writeln!(f, "\nholders")?;
        for h in &self.holders {
            writeln!(f, "  {:<12} {}", h.name, h.balance)?;
        }
        Ok(())
    }
}
