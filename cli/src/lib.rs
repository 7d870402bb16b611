//! Scenario simulation for the treasury DAO.
//!
//! A scenario file describes a registry, its token holders and a script of
//! proposals and votes. [`run_scenario`] plays it against in-memory
//! collaborators and returns a [`ScenarioReport`].

pub mod report;
pub mod scenario;

pub use report::{ExecutionReport, HolderReport, ProposalReport, ScenarioReport, VoteReport};
pub use scenario::{
    run_scenario, HolderConfig, ProposalConfig, ScenarioConfig, ScenarioError, VoteConfig,
};
