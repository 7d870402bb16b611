//! Core governance engine: registry setup, proposals, voting and execution.
//!
//! Every mutating operation runs under one transition lock, so transitions
//! are serialized the way a ledger serializes transactions. Inside the lock
//! an operation checks all of its preconditions, then applies its effects
//! through a [`Journal`] that rolls back on the first failure.

use crate::error::{EntityKind, GovernanceError};
use crate::params::{RegistryPolicy, MAX_DESCRIPTION_LEN};
use crate::proposal::{Proposal, ProposalOutcome, ProposalStatus};
use crate::receipt::VoteReceipt;
use crate::registry::Registry;
use crate::transition::{Journal, Undo};
use crate::weight::vote_weight;
use dao_crypto::{proposal_address, receipt_address, registry_address, vault_address};
use dao_store::{AccountStore, StoreError, TokenAccount, TokenLedger};
use dao_types::{Address, Clock, TokenAmount, VoteChoice};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::info_span;

/// What a proposer asks the treasury to do.
#[derive(Clone, Debug)]
pub struct ProposalRequest {
    /// Caller-chosen; lets one proposer keep several proposals open.
    pub index: u64,
    pub description: String,
    pub action_amount: TokenAmount,
    /// Token account that receives the payout if the proposal passes.
    pub action_target: Address,
}

/// The governance engine.
///
/// Collaborators are shared handles so callers can keep using the same
/// store, token ledger and clock alongside the engine.
pub struct GovernanceEngine {
    store: Arc<dyn AccountStore>,
    tokens: Arc<dyn TokenLedger>,
    clock: Arc<dyn Clock>,
    transitions: Mutex<()>,
}

impl GovernanceEngine {
    pub fn new(
        store: Arc<dyn AccountStore>,
        tokens: Arc<dyn TokenLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            tokens,
            clock,
            transitions: Mutex::new(()),
        }
    }

    // ── Transitions ────────────────────────────────────────────────────

    /// Create the registry for `token_mint` and fund its treasury vault.
    ///
    /// `source` is the authority's token account; `initial_allocation` is
    /// moved from it into the vault. At most one registry can exist per mint.
    pub fn initialize_registry(
        &self,
        authority: &Address,
        token_mint: &Address,
        source: &Address,
        policy: RegistryPolicy,
        initial_allocation: TokenAmount,
    ) -> Result<Registry, GovernanceError> {
        let _span = info_span!("initialize_registry", mint = %token_mint).entered();
        let _guard = self.lock();

        policy.validate()?;

        let address = registry_address(token_mint);
        let vault = vault_address(token_mint);
        if self.store.exists(&address)? {
            return Err(GovernanceError::AlreadyExists {
                kind: EntityKind::Registry,
                address,
            });
        }

        let funding = self.holder_account(source, token_mint, authority)?;
        if funding.amount < initial_allocation {
            return Err(GovernanceError::InsufficientBalance {
                account: *source,
                needed: initial_allocation,
                available: funding.amount,
            });
        }

        let registry = Registry {
            address,
            token_mint: *token_mint,
            treasury_vault: vault,
            authority: *authority,
            policy,
            created_at: self.clock.now(),
        };

        self.transition(|journal| {
            self.create_record(journal, EntityKind::Registry, &address, &registry)?;

            match self.tokens.open_account(&vault, token_mint, &address) {
                Ok(()) => journal.record(Undo::CloseTokenAccount(vault)),
                Err(dao_store::TokenError::AccountExists(_)) => {
                    return Err(GovernanceError::AlreadyExists {
                        kind: EntityKind::TreasuryVault,
                        address: vault,
                    })
                }
                Err(e) => return Err(e.into()),
            }

            if !initial_allocation.is_zero() {
                self.tokens.transfer(source, &vault, initial_allocation)?;
            }
            Ok(())
        })?;

        tracing::info!(
            registry = %address,
            vault = %vault,
            allocation = %initial_allocation,
            quorum = registry.policy.quorum,
            duration_secs = registry.policy.proposal_duration_secs,
            "registry initialized"
        );
        Ok(registry)
    }

    /// Open a proposal against `registry`.
    ///
    /// The proposer's balance is read from `proposer_account` at call time
    /// and must reach the registry's creation threshold. Nothing is reserved
    /// in the treasury.
    pub fn create_proposal(
        &self,
        proposer: &Address,
        registry: &Address,
        proposer_account: &Address,
        request: ProposalRequest,
    ) -> Result<Proposal, GovernanceError> {
        let _span = info_span!("create_proposal", registry = %registry, index = request.index)
            .entered();
        let _guard = self.lock();

        if request.description.len() > MAX_DESCRIPTION_LEN {
            return Err(GovernanceError::DescriptionTooLong {
                len: request.description.len(),
                max: MAX_DESCRIPTION_LEN,
            });
        }

        let registry: Registry = self.load(EntityKind::Registry, registry)?;

        let holding = self.holder_account(proposer_account, &registry.token_mint, proposer)?;
        let threshold = TokenAmount::new(registry.policy.proposal_creation_threshold);
        if holding.amount < threshold {
            return Err(GovernanceError::InsufficientBalance {
                account: *proposer_account,
                needed: threshold,
                available: holding.amount,
            });
        }

        let target = self.tokens.account(&request.action_target)?;
        if target.mint != registry.token_mint {
            return Err(GovernanceError::WrongMint {
                account: request.action_target,
                expected: registry.token_mint,
                got: target.mint,
            });
        }

        let address = proposal_address(&registry.address, proposer, request.index);
        let proposal = Proposal {
            address,
            registry: registry.address,
            proposer: *proposer,
            index: request.index,
            description: request.description,
            action_amount: request.action_amount,
            action_target: request.action_target,
            yes_weight: 0,
            no_weight: 0,
            votes_cast: 0,
            created_at: self.clock.now(),
            executed: false,
            outcome: None,
        };

        self.transition(|journal| {
            self.create_record(journal, EntityKind::Proposal, &address, &proposal)
        })?;

        tracing::info!(
            proposal = %address,
            proposer = %proposer,
            amount = %proposal.action_amount,
            target = %proposal.action_target,
            deadline = %registry.voting_deadline(proposal.created_at),
            "proposal created"
        );
        Ok(proposal)
    }

    /// Cast `voter`'s single ballot on `proposal`.
    ///
    /// The weight is `floor(sqrt(balance))` of `voter_account` at call time.
    /// A second ballot from the same voter fails with `AlreadyExists` and
    /// leaves the tally unchanged.
    pub fn cast_vote(
        &self,
        voter: &Address,
        proposal: &Address,
        choice: VoteChoice,
        voter_account: &Address,
    ) -> Result<VoteReceipt, GovernanceError> {
        let _span = info_span!("cast_vote", proposal = %proposal, voter = %voter).entered();
        let _guard = self.lock();

        let mut record: Proposal = self.load(EntityKind::Proposal, proposal)?;
        let registry: Registry = self.load(EntityKind::Registry, &record.registry)?;

        if record.executed {
            return Err(GovernanceError::AlreadyExecuted(*proposal));
        }

        let now = self.clock.now();
        let deadline = registry.voting_deadline(record.created_at);
        if now > deadline {
            return Err(GovernanceError::VotingClosed { deadline });
        }

        let receipt_at = receipt_address(proposal, voter);
        if self.store.exists(&receipt_at)? {
            return Err(GovernanceError::AlreadyExists {
                kind: EntityKind::VoteReceipt,
                address: receipt_at,
            });
        }

        let holding = self.holder_account(voter_account, &registry.token_mint, voter)?;
        if holding.amount.is_zero() {
            return Err(GovernanceError::InsufficientBalance {
                account: *voter_account,
                needed: TokenAmount::new(1),
                available: holding.amount,
            });
        }
        let weight = vote_weight(holding.amount);
        tracing::debug!(balance = %holding.amount, weight, "computed quadratic weight");

        record
            .record_vote(choice, weight)
            .ok_or(GovernanceError::Overflow)?;

        let receipt = VoteReceipt {
            proposal: *proposal,
            voter: *voter,
            choice,
            weight,
            cast_at: now,
        };

        self.transition(|journal| {
            self.create_record(journal, EntityKind::VoteReceipt, &receipt_at, &receipt)?;
            self.store.put(proposal, &encode(&record)?)?;
            Ok(())
        })?;

        tracing::info!(
            %choice,
            weight,
            yes = record.yes_weight,
            no = record.no_weight,
            "vote recorded"
        );
        Ok(receipt)
    }

    /// Finalize `proposal` after its voting window has closed.
    ///
    /// Requires quorum. A proposal whose yes weight reaches the threshold and
    /// beats the no weight pays `action_amount` from `vault` to `recipient`;
    /// any other tally marks it executed without moving funds. Either way
    /// the proposal is executed exactly once.
    pub fn execute_proposal(
        &self,
        proposal: &Address,
        vault: &Address,
        recipient: &Address,
    ) -> Result<ProposalOutcome, GovernanceError> {
        let _span = info_span!("execute_proposal", proposal = %proposal).entered();
        let _guard = self.lock();

        let mut record: Proposal = self.load(EntityKind::Proposal, proposal)?;
        let registry: Registry = self.load(EntityKind::Registry, &record.registry)?;

        if record.executed {
            return Err(GovernanceError::AlreadyExecuted(*proposal));
        }

        let deadline = registry.voting_deadline(record.created_at);
        if self.clock.now() <= deadline {
            return Err(GovernanceError::VotingStillOpen { deadline });
        }

        if *recipient != record.action_target {
            return Err(GovernanceError::InvalidRecipient {
                expected: record.action_target,
                got: *recipient,
            });
        }
        if *vault != registry.treasury_vault {
            return Err(GovernanceError::InvalidVault {
                expected: registry.treasury_vault,
                got: *vault,
            });
        }

        let total = record.total_weight();
        if total < registry.policy.quorum as u128 {
            return Err(GovernanceError::QuorumNotMet {
                have: total,
                need: registry.policy.quorum,
            });
        }

        let outcome = record.decide(registry.policy.min_voting_threshold);
        let amount = record.action_amount;
        if outcome == ProposalOutcome::Passed {
            let available = self.tokens.balance_of(vault)?;
            if available < amount {
                return Err(GovernanceError::InsufficientBalance {
                    account: *vault,
                    needed: amount,
                    available,
                });
            }
        }

        record.executed = true;
        record.outcome = Some(outcome);

        self.transition(|journal| {
            if outcome == ProposalOutcome::Passed && !amount.is_zero() {
                self.tokens.transfer(vault, recipient, amount)?;
                journal.record(Undo::Refund {
                    from: *recipient,
                    to: *vault,
                    amount,
                });
            }
            self.store.put(proposal, &encode(&record)?)?;
            Ok(())
        })?;

        match outcome {
            ProposalOutcome::Passed => tracing::info!(
                recipient = %recipient,
                %amount,
                yes = record.yes_weight,
                no = record.no_weight,
                "proposal passed, treasury disbursed"
            ),
            ProposalOutcome::Rejected(reason) => tracing::warn!(
                ?reason,
                yes = record.yes_weight,
                no = record.no_weight,
                threshold = registry.policy.min_voting_threshold,
                "proposal rejected"
            ),
        }
        Ok(outcome)
    }

    // ── Queries ────────────────────────────────────────────────────────

    pub fn registry(&self, address: &Address) -> Result<Registry, GovernanceError> {
        self.load(EntityKind::Registry, address)
    }

    pub fn registry_for_mint(&self, token_mint: &Address) -> Result<Registry, GovernanceError> {
        self.registry(&registry_address(token_mint))
    }

    pub fn proposal(&self, address: &Address) -> Result<Proposal, GovernanceError> {
        self.load(EntityKind::Proposal, address)
    }

    /// The receipt for `voter` on `proposal`, if they have voted.
    pub fn vote_receipt(
        &self,
        proposal: &Address,
        voter: &Address,
    ) -> Result<Option<VoteReceipt>, GovernanceError> {
        let address = receipt_address(proposal, voter);
        match self.load(EntityKind::VoteReceipt, &address) {
            Ok(receipt) => Ok(Some(receipt)),
            Err(GovernanceError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Lifecycle status of `proposal` at the engine clock's current time.
    pub fn proposal_status(&self, proposal: &Address) -> Result<ProposalStatus, GovernanceError> {
        let record = self.proposal(proposal)?;
        let registry = self.registry(&record.registry)?;
        let deadline = registry.voting_deadline(record.created_at);
        Ok(record.status(self.clock.now(), deadline))
    }

    /// Current balance of the registry's treasury vault.
    pub fn treasury_balance(&self, registry: &Address) -> Result<TokenAmount, GovernanceError> {
        let registry = self.registry(registry)?;
        Ok(self.tokens.balance_of(&registry.treasury_vault)?)
    }

    pub fn registry_address(token_mint: &Address) -> Address {
        registry_address(token_mint)
    }

    pub fn vault_address(token_mint: &Address) -> Address {
        vault_address(token_mint)
    }

    pub fn proposal_address(registry: &Address, proposer: &Address, index: u64) -> Address {
        proposal_address(registry, proposer, index)
    }

    pub fn receipt_address(proposal: &Address, voter: &Address) -> Address {
        receipt_address(proposal, voter)
    }

    // ── Internals ──────────────────────────────────────────────────────

    fn lock(&self) -> MutexGuard<'_, ()> {
        // The lock guards no data; a panic mid-transition has already been
        // rolled back or never applied, so a poisoned lock is still usable.
        self.transitions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `apply` against a fresh journal, rolling back on error.
    fn transition<T>(
        &self,
        apply: impl FnOnce(&mut Journal<'_>) -> Result<T, GovernanceError>,
    ) -> Result<T, GovernanceError> {
        let mut journal = Journal::new(&*self.store, &*self.tokens);
        match apply(&mut journal) {
            Ok(value) => {
                journal.commit();
                Ok(value)
            }
            Err(e) => {
                journal.rollback();
                Err(e)
            }
        }
    }

    /// Read a token account and check it holds `mint` and belongs to `owner`.
    fn holder_account(
        &self,
        account: &Address,
        mint: &Address,
        owner: &Address,
    ) -> Result<TokenAccount, GovernanceError> {
        let info = self.tokens.account(account)?;
        if info.mint != *mint {
            return Err(GovernanceError::WrongMint {
                account: *account,
                expected: *mint,
                got: info.mint,
            });
        }
        if info.owner != *owner {
            return Err(GovernanceError::Unauthorized {
                account: *account,
                caller: *owner,
            });
        }
        Ok(info)
    }

    fn load<T: DeserializeOwned>(
        &self,
        kind: EntityKind,
        address: &Address,
    ) -> Result<T, GovernanceError> {
        match self.store.get(address) {
            Ok(bytes) => decode(&bytes),
            Err(StoreError::NotFound(_)) => Err(GovernanceError::NotFound {
                kind,
                address: *address,
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn create_record<T: Serialize>(
        &self,
        journal: &mut Journal<'_>,
        kind: EntityKind,
        address: &Address,
        value: &T,
    ) -> Result<(), GovernanceError> {
        match self.store.create_at(address, &encode(value)?) {
            Ok(()) => {
                journal.record(Undo::RemoveAccount(*address));
                Ok(())
            }
            Err(StoreError::Duplicate(_)) => Err(GovernanceError::AlreadyExists {
                kind,
                address: *address,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, GovernanceError> {
    bincode::serialize(value).map_err(|e| GovernanceError::Codec(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, GovernanceError> {
    bincode::deserialize(bytes).map_err(|e| GovernanceError::Codec(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dao_nullables::{NullClock, NullStore, NullTokenLedger};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// Store whose `put` can be made to fail, to exercise rollback.
    struct FlakyStore {
        inner: NullStore,
        fail_puts: AtomicBool,
    }

    impl AccountStore for FlakyStore {
        fn exists(&self, address: &Address) -> Result<bool, StoreError> {
            self.inner.exists(address)
        }
        fn get(&self, address: &Address) -> Result<Vec<u8>, StoreError> {
            self.inner.get(address)
        }
        fn create_at(&self, address: &Address, data: &[u8]) -> Result<(), StoreError> {
            self.inner.create_at(address, data)
        }
        fn put(&self, address: &Address, data: &[u8]) -> Result<(), StoreError> {
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(StoreError::Backend("disk full".into()));
            }
            self.inner.put(address, data)
        }
        fn remove(&self, address: &Address) -> Result<(), StoreError> {
            self.inner.remove(address)
        }
        fn account_count(&self) -> Result<u64, StoreError> {
            self.inner.account_count()
        }
    }

    struct Fixture {
        engine: GovernanceEngine,
        store: Arc<FlakyStore>,
        tokens: Arc<NullTokenLedger>,
        clock: Arc<NullClock>,
        registry: Registry,
        proposal: Address,
        target: Address,
    }

    fn account(owner: u8) -> Address {
        Address::repeat(owner.wrapping_add(100))
    }

    fn setup() -> Fixture {
        let mint = Address::repeat(0xee);
        let store = Arc::new(FlakyStore {
            inner: NullStore::new(),
            fail_puts: AtomicBool::new(false),
        });
        let tokens = Arc::new(NullTokenLedger::new());
        let clock = Arc::new(NullClock::new(1_000));
        for (owner, amount) in [(1u8, 1_000_000u64), (2, 10_000), (3, 0)] {
            tokens
                .open_funded(
                    &account(owner),
                    &mint,
                    &Address::repeat(owner),
                    TokenAmount::new(amount),
                )
                .unwrap();
        }
        let engine = GovernanceEngine::new(store.clone(), tokens.clone(), clock.clone());
        let registry = engine
            .initialize_registry(
                &Address::repeat(1),
                &mint,
                &account(1),
                RegistryPolicy {
                    quorum: 50,
                    proposal_duration_secs: 10,
                    min_voting_threshold: 50,
                    proposal_creation_threshold: 100,
                },
                TokenAmount::new(500_000),
            )
            .unwrap();
        let proposal = engine
            .create_proposal(
                &Address::repeat(2),
                &registry.address,
                &account(2),
                ProposalRequest {
                    index: 0,
                    description: "grant".into(),
                    action_amount: TokenAmount::new(1_000),
                    action_target: account(3),
                },
            )
            .unwrap()
            .address;
        Fixture {
            engine,
            store,
            tokens,
            clock,
            registry,
            proposal,
            target: account(3),
        }
    }

    #[test]
    fn failed_tally_write_removes_receipt() {
        let f = setup();
        f.store.fail_puts.store(true, Ordering::SeqCst);

        let result = f
            .engine
            .cast_vote(&Address::repeat(2), &f.proposal, VoteChoice::Yes, &account(2));
        assert!(matches!(result, Err(GovernanceError::Store(_))));
        assert!(f
            .engine
            .vote_receipt(&f.proposal, &Address::repeat(2))
            .unwrap()
            .is_none());

        // The voter can retry once the store recovers.
        f.store.fail_puts.store(false, Ordering::SeqCst);
        let receipt = f
            .engine
            .cast_vote(&Address::repeat(2), &f.proposal, VoteChoice::Yes, &account(2))
            .unwrap();
        assert_eq!(receipt.weight, 100);
        assert_eq!(f.engine.proposal(&f.proposal).unwrap().yes_weight, 100);
    }

    #[test]
    fn failed_execution_write_refunds_treasury() {
        let f = setup();
        f.engine
            .cast_vote(&Address::repeat(2), &f.proposal, VoteChoice::Yes, &account(2))
            .unwrap();
        f.clock.advance(11);
        f.store.fail_puts.store(true, Ordering::SeqCst);

        let result =
            f.engine
                .execute_proposal(&f.proposal, &f.registry.treasury_vault, &f.target);
        assert!(matches!(result, Err(GovernanceError::Store(_))));
        assert_eq!(f.tokens.balance_of(&f.target).unwrap().raw(), 0);
        assert_eq!(
            f.tokens
                .balance_of(&f.registry.treasury_vault)
                .unwrap()
                .raw(),
            500_000
        );
        assert!(!f.engine.proposal(&f.proposal).unwrap().executed);

        f.store.fail_puts.store(false, Ordering::SeqCst);
        assert_eq!(
            f.engine
                .execute_proposal(&f.proposal, &f.registry.treasury_vault, &f.target)
                .unwrap(),
            ProposalOutcome::Passed
        );
        assert_eq!(f.tokens.balance_of(&f.target).unwrap().raw(), 1_000);
    }

    #[test]
    fn zero_amount_proposal_passes_without_transfer() {
        let f = setup();
        let signal = f
            .engine
            .create_proposal(
                &Address::repeat(2),
                &f.registry.address,
                &account(2),
                ProposalRequest {
                    index: 1,
                    description: "signal only".into(),
                    action_amount: TokenAmount::ZERO,
                    action_target: f.target,
                },
            )
            .unwrap()
            .address;
        f.engine
            .cast_vote(&Address::repeat(2), &signal, VoteChoice::Yes, &account(2))
            .unwrap();
        f.clock.advance(11);
        assert_eq!(
            f.engine
                .execute_proposal(&signal, &f.registry.treasury_vault, &f.target)
                .unwrap(),
            ProposalOutcome::Passed
        );
        assert_eq!(f.tokens.balance_of(&f.target).unwrap().raw(), 0);
    }
}
