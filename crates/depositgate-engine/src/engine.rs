//! The deposit accounting engine.
//!
//! One state object holds configuration, the balance ledger, the holder log
//! and the audit journal. Every state-changing operation follows the same
//! shape:
//!
//! 1. Authorize the caller
//! 2. Plan the balance update against current state (nothing mutated yet)
//! 3. Make at most one call to the asset ledger
//! 4. Only if that call succeeded, apply the plan, append to the holder log
//!    and journal the event
//!
//! A failure at steps 1–3 returns before step 4, so no partial mutation is
//! ever observable.

use depositgate_ledger::AssetLedger;
use depositgate_types::{
    AccountId, Amount, DepositError, EngineConfig, EngineEvent, EngineSnapshot, EventKind,
    LedgerId, Result, ThresholdPolicy, constants,
};
use sha2::{Digest, Sha256};

use crate::balance_ledger::BalanceLedger;
use crate::holder_log::HolderLog;

/// Threshold-gated deposit accounting over an external asset ledger `L`.
///
/// Operations take `&mut self`, so one engine value is already a single
/// mutual-exclusion domain. Share it between tasks with
/// [`SharedDepositEngine`](crate::SharedDepositEngine).
#[derive(Debug)]
pub struct DepositEngine<L> {
    administrator: AccountId,
    ledger: L,
    threshold: Amount,
    threshold_policy: ThresholdPolicy,
    balances: BalanceLedger,
    holders: HolderLog,
    events: Vec<EngineEvent>,
}

impl<L: AssetLedger> DepositEngine<L> {
    /// Create an engine with the default (open) threshold policy.
    pub fn new(administrator: AccountId, ledger: L, threshold: Amount) -> Self {
        tracing::info!(
            administrator = %administrator,
            ledger = %ledger.ledger_id(),
            threshold,
            "Deposit engine created"
        );
        Self {
            administrator,
            ledger,
            threshold,
            threshold_policy: ThresholdPolicy::default(),
            balances: BalanceLedger::new(),
            holders: HolderLog::new(),
            events: Vec::new(),
        }
    }

    pub fn from_config(config: &EngineConfig, ledger: L) -> Self {
        let mut engine = Self::new(config.administrator, ledger, config.threshold);
        engine.threshold_policy = config.threshold_policy;
        engine
    }

    /// Rebuild an engine from a snapshot taken by an earlier instance.
    ///
    /// # Errors
    /// - anything [`EngineSnapshot::validate`] reports
    /// - `Configuration` if `ledger` is not the ledger the snapshot was
    ///   taken against
    pub fn restore(snapshot: &EngineSnapshot, ledger: L) -> Result<Self> {
        snapshot.validate()?;
        if ledger.ledger_id() != snapshot.asset_ledger {
            return Err(DepositError::Configuration(format!(
                "snapshot belongs to ledger {}, got {}",
                snapshot.asset_ledger,
                ledger.ledger_id()
            )));
        }

        let engine = Self {
            administrator: snapshot.administrator,
            ledger,
            threshold: snapshot.threshold,
            threshold_policy: snapshot.threshold_policy,
            balances: BalanceLedger::from_records(&snapshot.balances)?,
            holders: HolderLog::from_entries(snapshot.holders.clone()),
            events: Vec::new(),
        };
        tracing::info!(
            ledger = %snapshot.asset_ledger,
            accounts = snapshot.balances.len(),
            holders = snapshot.holders.len(),
            digest = hex::encode(engine.state_digest()),
            "Deposit engine restored from snapshot"
        );
        Ok(engine)
    }

    /// Capture configuration, balances and holder log.
    #[must_use]
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            format_version: constants::SNAPSHOT_FORMAT_VERSION,
            administrator: self.administrator,
            asset_ledger: self.ledger.ledger_id(),
            threshold: self.threshold,
            threshold_policy: self.threshold_policy,
            balances: self.balances.records(),
            aggregate_total: self.balances.aggregate_total(),
            holders: self.holders.as_slice().to_vec(),
        }
    }

    // =================================================================
    // Configuration & access control
    // =================================================================

    #[must_use]
    pub fn administrator(&self) -> AccountId {
        self.administrator
    }

    /// Identity of the asset ledger currently in use.
    #[must_use]
    pub fn asset_ledger(&self) -> LedgerId {
        self.ledger.ledger_id()
    }

    #[must_use]
    pub fn threshold(&self) -> Amount {
        self.threshold
    }

    #[must_use]
    pub fn threshold_policy(&self) -> ThresholdPolicy {
        self.threshold_policy
    }

    #[must_use]
    pub fn is_administrator(&self, account: &AccountId) -> bool {
        *account == self.administrator
    }

    /// The asset ledger handle.
    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Mutable access to the asset ledger, for flows that happen on the
    /// ledger itself (minting, approvals) rather than through the engine.
    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Replace the asset ledger handle. Administrator only.
    ///
    /// Balances are left as they are. Returns the previous handle.
    pub fn set_asset_ledger(&mut self, caller: AccountId, ledger: L) -> Result<L> {
        self.ensure_administrator(caller, "set_asset_ledger")?;

        let previous_id = self.ledger.ledger_id();
        let current_id = ledger.ledger_id();
        let previous = std::mem::replace(&mut self.ledger, ledger);

        tracing::info!(previous = %previous_id, current = %current_id, "Asset ledger replaced");
        self.journal(EventKind::AssetLedgerChanged {
            previous: previous_id,
            current: current_id,
        });
        Ok(previous)
    }

    /// Replace the threshold. Takes effect immediately for every account.
    ///
    /// Under [`ThresholdPolicy::Open`] any caller may do this.
    pub fn set_threshold(&mut self, caller: AccountId, threshold: Amount) -> Result<()> {
        if self.threshold_policy == ThresholdPolicy::AdministratorOnly {
            self.ensure_administrator(caller, "set_threshold")?;
        }

        let previous = std::mem::replace(&mut self.threshold, threshold);
        tracing::info!(previous, current = threshold, changed_by = %caller, "Threshold changed");
        self.journal(EventKind::ThresholdChanged {
            previous,
            current: threshold,
            changed_by: caller,
        });
        Ok(())
    }

    // =================================================================
    // Deposits
    // =================================================================

    /// Top up the caller's own balance towards the threshold.
    ///
    /// Returns the amount pulled; zero means nothing needed or nothing was
    /// approved, which is not an error.
    pub fn deposit(&mut self, caller: AccountId) -> Result<Amount> {
        self.top_up(caller, caller)
    }

    /// Top up `account` towards the threshold. Administrator only.
    ///
    /// Funds still come from `account`, within what it approved.
    pub fn deposit_on_behalf_of(
        &mut self,
        caller: AccountId,
        account: AccountId,
    ) -> Result<Amount> {
        self.ensure_administrator(caller, "deposit_on_behalf_of")?;
        self.top_up(caller, account)
    }

    fn top_up(&mut self, initiator: AccountId, account: AccountId) -> Result<Amount> {
        let current = self.balances.balance(&account);
        let deficit = self.threshold.saturating_sub(current);
        if deficit == 0 {
            tracing::debug!(
                account = %account,
                current,
                threshold = self.threshold,
                "Already sufficient, nothing to pull"
            );
            return Ok(0);
        }

        let approved = self.ledger.approved_amount(&account);
        let amount = deficit.min(approved);
        if amount == 0 {
            tracing::debug!(account = %account, deficit, "No approval, nothing to pull");
            return Ok(0);
        }

        let update = self.balances.plan_credit(account, amount)?;

        if let Err(err) = self.ledger.pull(&account, amount) {
            tracing::warn!(
                account = %account,
                amount,
                error = %err,
                "Pull rejected by asset ledger"
            );
            return Err(err.into());
        }

        self.balances.apply(update);
        self.holders.record(account);
        tracing::info!(
            account = %account,
            initiator = %initiator,
            amount,
            balance = update.balance,
            total = update.aggregate_total,
            "Deposit committed"
        );
        self.journal(EventKind::Deposited {
            account,
            amount,
            initiator,
        });
        Ok(amount)
    }

    // =================================================================
    // Releases
    // =================================================================

    /// Pay the caller's entire locked balance back to the caller.
    ///
    /// # Errors
    /// `NothingToRelease` if the balance is zero; `TransferFailed` if the
    /// ledger rejects the push.
    pub fn release_my_tokens(&mut self, caller: AccountId) -> Result<Amount> {
        self.release(caller, caller)
    }

    /// Pay `account`'s entire locked balance back to `account`.
    /// Administrator only.
    pub fn release_tokens_of(&mut self, caller: AccountId, account: AccountId) -> Result<Amount> {
        self.ensure_administrator(caller, "release_tokens_of")?;
        self.release(caller, account)
    }

    fn release(&mut self, initiator: AccountId, account: AccountId) -> Result<Amount> {
        let update = self.balances.plan_clear(account)?;

        if let Err(err) = self.ledger.push(&account, update.delta) {
            tracing::warn!(
                account = %account,
                amount = update.delta,
                error = %err,
                "Push rejected by asset ledger"
            );
            return Err(err.into());
        }

        self.balances.apply(update);
        tracing::info!(
            account = %account,
            initiator = %initiator,
            amount = update.delta,
            total = update.aggregate_total,
            "Release committed"
        );
        self.journal(EventKind::Released {
            account,
            amount: update.delta,
            initiator,
        });
        Ok(update.delta)
    }

    /// Send the whole custody balance on the asset ledger to `destination`.
    /// Administrator only.
    ///
    /// Per-account balances, the aggregate and the holder log are left
    /// untouched, so after a sweep the ledger's custody and the engine's
    /// books can disagree; [`CustodyReconciliation`](crate::CustodyReconciliation)
    /// reports that. Sweeping an empty custody, or sweeping custody to
    /// itself, succeeds and moves nothing.
    pub fn release_all_tokens_to(
        &mut self,
        caller: AccountId,
        destination: AccountId,
    ) -> Result<Amount> {
        self.ensure_administrator(caller, "release_all_tokens_to")?;

        let amount = self.ledger.custody_balance();
        if amount == 0 {
            tracing::debug!(destination = %destination, "Custody empty, nothing to sweep");
            return Ok(0);
        }
        if destination == self.ledger.custody_account() {
            tracing::debug!(
                destination = %destination,
                amount,
                "Sweep into custody itself, nothing to move"
            );
            return Ok(0);
        }

        if let Err(err) = self.ledger.push(&destination, amount) {
            tracing::warn!(
                destination = %destination,
                amount,
                error = %err,
                "Sweep rejected by asset ledger"
            );
            return Err(err.into());
        }

        tracing::info!(
            destination = %destination,
            amount,
            books_total = self.balances.aggregate_total(),
            "Custody swept"
        );
        self.journal(EventKind::Swept {
            destination,
            amount,
        });
        Ok(amount)
    }

    // =================================================================
    // Queries
    // =================================================================

    /// Whether `account` currently meets the threshold. Evaluated against
    /// the live threshold on every call.
    #[must_use]
    pub fn is_sufficiently_deposited(&self, account: &AccountId) -> bool {
        self.balances.balance(account) >= self.threshold
    }

    #[must_use]
    pub fn current_balance(&self, account: &AccountId) -> Amount {
        self.balances.balance(account)
    }

    /// Sum of all locked balances.
    #[must_use]
    pub fn total_deposits(&self) -> Amount {
        self.balances.aggregate_total()
    }

    /// Number of deposit events recorded (not distinct accounts).
    #[must_use]
    pub fn holder_count(&self) -> usize {
        self.holders.len()
    }

    pub fn holder_at(&self, index: usize) -> Result<AccountId> {
        self.holders.get(index)
    }

    #[must_use]
    pub fn holders(&self) -> &HolderLog {
        &self.holders
    }

    #[must_use]
    pub fn balance_ledger(&self) -> &BalanceLedger {
        &self.balances
    }

    /// Audit journal, oldest first.
    ///
    /// The journal is kept until [`Self::drain_events`] hands it off.
    #[must_use]
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Take every journaled event, oldest first, leaving the journal empty.
    ///
    /// Engine state and [`Self::state_digest`] are not affected.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    /// Recompute `Σ balances` and compare with the maintained aggregate.
    pub fn verify_aggregate(&self) -> Result<()> {
        self.balances.verify()
    }

    /// SHA-256 over configuration, balances, aggregate and holder log.
    ///
    /// Two engines with equal digests expose identical query results. The
    /// audit journal is not covered.
    ///
    /// `SHA-256(domain || admin || ledger || threshold || policy ||
    /// n || (account || amount)* || aggregate || m || holder*)`
    #[must_use]
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(constants::STATE_DIGEST_DOMAIN);
        hasher.update(self.administrator.as_bytes());
        hasher.update(self.ledger.ledger_id().as_bytes());
        hasher.update(self.threshold.to_le_bytes());
        hasher.update([match self.threshold_policy {
            ThresholdPolicy::Open => 0u8,
            ThresholdPolicy::AdministratorOnly => 1u8,
        }]);

        let records = self.balances.records();
        hasher.update((records.len() as u64).to_le_bytes());
        for record in &records {
            hasher.update(record.account.as_bytes());
            hasher.update(record.amount.to_le_bytes());
        }
        hasher.update(self.balances.aggregate_total().to_le_bytes());

        let holders = self.holders.as_slice();
        hasher.update((holders.len() as u64).to_le_bytes());
        for holder in holders {
            hasher.update(holder.as_bytes());
        }
        hasher.finalize().into()
    }

    // =================================================================
    // Internals
    // =================================================================

    fn ensure_administrator(&self, caller: AccountId, operation: &'static str) -> Result<()> {
        if self.is_administrator(&caller) {
            return Ok(());
        }
        tracing::warn!(caller = %caller, operation, "Privileged call rejected");
        Err(DepositError::Unauthorized { caller })
    }

    fn journal(&mut self, kind: EventKind) {
        self.events.push(EngineEvent::now(kind));
    }
}

#[cfg(test)]
mod tests {
    use depositgate_ledger::{InMemoryLedger, LedgerOp};
    use depositgate_types::LedgerError;

    use super::*;
    use crate::CustodyReconciliation;

    struct Fixture {
        engine: DepositEngine<InMemoryLedger>,
        admin: AccountId,
        alice: AccountId,
        bob: AccountId,
    }

    fn setup(threshold: Amount) -> Fixture {
        let admin = AccountId::derive("creator");
        let ledger = InMemoryLedger::new(LedgerId::derive("STT"), AccountId::derive("deposit"));
        Fixture {
            engine: DepositEngine::new(admin, ledger, threshold),
            admin,
            alice: AccountId::derive("alice"),
            bob: AccountId::derive("bob"),
        }
    }

    fn fund(engine: &mut DepositEngine<InMemoryLedger>, account: AccountId, amount: Amount) {
        let ledger = engine.ledger_mut();
        ledger.mint(account, amount).unwrap();
        let approved = ledger.approved_amount(&account);
        ledger.approve_custody(account, approved + amount);
    }

    #[test]
    fn constructor_exposes_configuration() {
        let f = setup(15_000);
        assert_eq!(f.engine.administrator(), f.admin);
        assert_eq!(f.engine.asset_ledger(), LedgerId::derive("STT"));
        assert_eq!(f.engine.threshold(), 15_000);
        assert_eq!(f.engine.threshold_policy(), ThresholdPolicy::Open);
        assert_eq!(f.engine.total_deposits(), 0);
        assert_eq!(f.engine.holder_count(), 0);
    }

    #[test]
    fn from_config_applies_policy() {
        let config = EngineConfig::new(AccountId::derive("creator"), 5)
            .with_threshold_policy(ThresholdPolicy::AdministratorOnly);
        let ledger = InMemoryLedger::new(LedgerId::derive("STT"), AccountId::derive("deposit"));
        let engine = DepositEngine::from_config(&config, ledger);
        assert_eq!(engine.threshold(), 5);
        assert_eq!(engine.threshold_policy(), ThresholdPolicy::AdministratorOnly);
    }

    #[test]
    fn deposit_pulls_deficit_only() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 25_000);

        let pulled = f.engine.deposit(f.alice).unwrap();

        assert_eq!(pulled, 10_000);
        assert_eq!(f.engine.current_balance(&f.alice), 10_000);
        assert_eq!(f.engine.ledger().approved_amount(&f.alice), 15_000);
        assert_eq!(f.engine.ledger().balance_of(&f.alice), 15_000);
        assert!(f.engine.is_sufficiently_deposited(&f.alice));
    }

    #[test]
    fn deposit_partial_when_approval_short() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 4_000);

        assert_eq!(f.engine.deposit(f.alice).unwrap(), 4_000);
        assert!(!f.engine.is_sufficiently_deposited(&f.alice));
        assert_eq!(f.engine.holder_count(), 1);

        fund(&mut f.engine, f.alice, 6_000);
        assert_eq!(f.engine.deposit(f.alice).unwrap(), 6_000);
        assert!(f.engine.is_sufficiently_deposited(&f.alice));
        assert_eq!(f.engine.holder_count(), 2);
    }

    #[test]
    fn deposit_without_approval_is_noop() {
        let mut f = setup(10_000);
        f.engine.ledger_mut().mint(f.alice, 10_000).unwrap();
        let before = f.engine.state_digest();

        assert_eq!(f.engine.deposit(f.alice).unwrap(), 0);
        assert_eq!(f.engine.state_digest(), before);
        assert!(f.engine.events().is_empty());
    }

    #[test]
    fn zero_threshold_means_everyone_is_sufficient() {
        let mut f = setup(0);
        fund(&mut f.engine, f.alice, 100);
        assert!(f.engine.is_sufficiently_deposited(&f.alice));
        assert_eq!(f.engine.deposit(f.alice).unwrap(), 0);
        assert_eq!(f.engine.ledger().approved_amount(&f.alice), 100);
    }

    #[test]
    fn failed_pull_changes_nothing() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        let before = f.engine.state_digest();

        f.engine.ledger_mut().fail_next(LedgerOp::Pull);
        let err = f.engine.deposit(f.alice).unwrap_err();

        assert!(matches!(
            err,
            DepositError::TransferFailed(LedgerError::Unavailable { .. })
        ));
        assert_eq!(f.engine.state_digest(), before);
        assert_eq!(f.engine.ledger().balance_of(&f.alice), 10_000);
        assert!(f.engine.events().is_empty());
    }

    #[test]
    fn approval_without_balance_is_transfer_failure() {
        let mut f = setup(10_000);
        f.engine.ledger_mut().approve_custody(f.alice, 10_000);

        let err = f.engine.deposit(f.alice).unwrap_err();
        assert!(matches!(
            err,
            DepositError::TransferFailed(LedgerError::InsufficientBalance { .. })
        ));
        assert_eq!(f.engine.holder_count(), 0);
        assert_eq!(f.engine.total_deposits(), 0);
    }

    #[test]
    fn deposit_on_behalf_requires_admin() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);

        let err = f.engine.deposit_on_behalf_of(f.bob, f.alice).unwrap_err();
        assert!(matches!(err, DepositError::Unauthorized { caller } if caller == f.bob));
        assert_eq!(f.engine.current_balance(&f.alice), 0);

        assert_eq!(f.engine.deposit_on_behalf_of(f.admin, f.alice).unwrap(), 10_000);
        assert_eq!(f.engine.current_balance(&f.alice), 10_000);
        assert_eq!(f.engine.holder_at(0).unwrap(), f.alice);
        assert_eq!(
            f.engine.events()[0].kind,
            EventKind::Deposited {
                account: f.alice,
                amount: 10_000,
                initiator: f.admin,
            }
        );
    }

    #[test]
    fn release_returns_funds_and_keeps_holder_log() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        f.engine.deposit(f.alice).unwrap();

        assert_eq!(f.engine.release_my_tokens(f.alice).unwrap(), 10_000);

        assert_eq!(f.engine.current_balance(&f.alice), 0);
        assert_eq!(f.engine.total_deposits(), 0);
        assert_eq!(f.engine.ledger().balance_of(&f.alice), 10_000);
        assert_eq!(f.engine.ledger().custody_balance(), 0);
        assert_eq!(f.engine.holder_count(), 1);
        assert!(!f.engine.is_sufficiently_deposited(&f.alice));
    }

    #[test]
    fn failed_push_keeps_balance() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        f.engine.deposit(f.alice).unwrap();
        let before = f.engine.state_digest();
        let events_before = f.engine.events().len();

        f.engine.ledger_mut().fail_next(LedgerOp::Push);
        let err = f.engine.release_my_tokens(f.alice).unwrap_err();

        assert!(matches!(err, DepositError::TransferFailed(_)));
        assert_eq!(f.engine.state_digest(), before);
        assert_eq!(f.engine.current_balance(&f.alice), 10_000);
        assert_eq!(f.engine.events().len(), events_before);

        // A retry goes through once the ledger recovers.
        assert_eq!(f.engine.release_my_tokens(f.alice).unwrap(), 10_000);
    }

    #[test]
    fn release_tokens_of_pays_account_not_admin() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        f.engine.deposit(f.alice).unwrap();

        assert_eq!(f.engine.release_tokens_of(f.admin, f.alice).unwrap(), 10_000);
        assert_eq!(f.engine.ledger().balance_of(&f.alice), 10_000);
        assert_eq!(f.engine.ledger().balance_of(&f.admin), 0);

        let err = f.engine.release_tokens_of(f.admin, f.alice).unwrap_err();
        assert!(matches!(err, DepositError::NothingToRelease { account } if account == f.alice));
    }

    #[test]
    fn sweep_moves_custody_and_leaves_books() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        fund(&mut f.engine, f.bob, 10_000);
        f.engine.deposit(f.alice).unwrap();
        f.engine.deposit(f.bob).unwrap();
        let treasury = AccountId::derive("treasury");

        assert_eq!(f.engine.release_all_tokens_to(f.admin, treasury).unwrap(), 20_000);

        assert_eq!(f.engine.ledger().balance_of(&treasury), 20_000);
        assert_eq!(f.engine.ledger().custody_balance(), 0);
        assert_eq!(f.engine.total_deposits(), 20_000);
        assert_eq!(f.engine.current_balance(&f.alice), 10_000);
        assert_eq!(f.engine.holder_count(), 2);
    }

    #[test]
    fn sweep_empty_custody_is_noop() {
        let mut f = setup(10_000);
        let treasury = AccountId::derive("treasury");
        assert_eq!(f.engine.release_all_tokens_to(f.admin, treasury).unwrap(), 0);
        assert!(f.engine.events().is_empty());
    }

    #[test]
    fn sweep_to_custody_moves_nothing() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        f.engine.deposit(f.alice).unwrap();
        let custody = f.engine.ledger().custody_account();
        let events_before = f.engine.events().len();

        assert_eq!(f.engine.release_all_tokens_to(f.admin, custody).unwrap(), 0);
        assert_eq!(f.engine.release_all_tokens_to(f.admin, custody).unwrap(), 0);

        assert_eq!(f.engine.ledger().custody_balance(), 10_000);
        assert_eq!(f.engine.events().len(), events_before);
        assert!(CustodyReconciliation::verify(&f.engine).is_ok());
    }

    #[test]
    fn failed_sweep_changes_nothing() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        f.engine.deposit(f.alice).unwrap();
        let treasury = AccountId::derive("treasury");
        let digest = f.engine.state_digest();
        let events_before = f.engine.events().len();

        f.engine.ledger_mut().fail_next(LedgerOp::Push);
        let err = f.engine.release_all_tokens_to(f.admin, treasury).unwrap_err();

        assert!(matches!(
            err,
            DepositError::TransferFailed(LedgerError::Unavailable { .. })
        ));
        assert_eq!(f.engine.ledger().custody_balance(), 10_000);
        assert_eq!(f.engine.ledger().balance_of(&treasury), 0);
        assert_eq!(f.engine.events().len(), events_before);
        assert_eq!(f.engine.state_digest(), digest);

        assert_eq!(f.engine.release_all_tokens_to(f.admin, treasury).unwrap(), 10_000);
    }

    #[test]
    fn drain_events_empties_journal_only() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        f.engine.deposit(f.alice).unwrap();
        f.engine.set_threshold(f.bob, 12_000).unwrap();
        let digest = f.engine.state_digest();

        let drained = f.engine.drain_events();

        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].kind.tag(), "DEPOSITED");
        assert_eq!(drained[1].kind.tag(), "THRESHOLD_CHANGED");
        assert!(f.engine.events().is_empty());
        assert!(f.engine.drain_events().is_empty());
        assert_eq!(f.engine.state_digest(), digest);
        assert_eq!(f.engine.current_balance(&f.alice), 10_000);
    }

    #[test]
    fn sweep_requires_admin() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        f.engine.deposit(f.alice).unwrap();

        let err = f.engine.release_all_tokens_to(f.alice, f.alice).unwrap_err();
        assert!(matches!(err, DepositError::Unauthorized { .. }));
        assert_eq!(f.engine.ledger().custody_balance(), 10_000);
    }

    #[test]
    fn open_threshold_policy_allows_anyone() {
        let mut f = setup(10_000);
        f.engine.set_threshold(f.bob, 12_000).unwrap();
        assert_eq!(f.engine.threshold(), 12_000);
        assert_eq!(
            f.engine.events()[0].kind,
            EventKind::ThresholdChanged {
                previous: 10_000,
                current: 12_000,
                changed_by: f.bob,
            }
        );
    }

    #[test]
    fn admin_only_threshold_policy_rejects_others() {
        let config = EngineConfig::new(AccountId::derive("creator"), 10_000)
            .with_threshold_policy(ThresholdPolicy::AdministratorOnly);
        let ledger = InMemoryLedger::new(LedgerId::derive("STT"), AccountId::derive("deposit"));
        let mut engine = DepositEngine::from_config(&config, ledger);

        let err = engine.set_threshold(AccountId::derive("bob"), 1).unwrap_err();
        assert!(matches!(err, DepositError::Unauthorized { .. }));
        assert_eq!(engine.threshold(), 10_000);

        engine.set_threshold(config.administrator, 1).unwrap();
        assert_eq!(engine.threshold(), 1);
    }

    #[test]
    fn set_asset_ledger_admin_only() {
        let mut f = setup(15_000);
        let replacement =
            InMemoryLedger::new(LedgerId::derive("STT2"), AccountId::derive("deposit"));

        let err = f
            .engine
            .set_asset_ledger(f.alice, replacement.clone())
            .unwrap_err();
        assert!(matches!(err, DepositError::Unauthorized { .. }));
        assert_eq!(f.engine.asset_ledger(), LedgerId::derive("STT"));

        let previous = f.engine.set_asset_ledger(f.admin, replacement).unwrap();
        assert_eq!(previous.ledger_id(), LedgerId::derive("STT"));
        assert_eq!(f.engine.asset_ledger(), LedgerId::derive("STT2"));
    }

    #[test]
    fn holder_at_out_of_range() {
        let f = setup(10_000);
        let err = f.engine.holder_at(0).unwrap_err();
        assert!(matches!(err, DepositError::IndexOutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn snapshot_restore_preserves_digest() {
        let mut f = setup(10_000);
        fund(&mut f.engine, f.alice, 10_000);
        fund(&mut f.engine, f.bob, 3_000);
        f.engine.deposit(f.alice).unwrap();
        f.engine.deposit(f.bob).unwrap();

        let snapshot = f.engine.snapshot();
        let digest = f.engine.state_digest();
        let ledger = f.engine.ledger().clone();

        let restored = DepositEngine::restore(&snapshot, ledger).unwrap();
        assert_eq!(restored.state_digest(), digest);
        assert_eq!(restored.current_balance(&f.bob), 3_000);
        assert_eq!(restored.holder_count(), 2);
        assert!(restored.events().is_empty());
    }

    #[test]
    fn restore_rejects_foreign_ledger() {
        let f = setup(10_000);
        let snapshot = f.engine.snapshot();
        let other = InMemoryLedger::new(LedgerId::derive("OTHER"), AccountId::derive("deposit"));
        let err = DepositEngine::restore(&snapshot, other).unwrap_err();
        assert!(matches!(err, DepositError::Configuration(_)));
    }

    #[test]
    fn digest_tracks_threshold() {
        let mut f = setup(10_000);
        let before = f.engine.state_digest();
        f.engine.set_threshold(f.alice, 10_001).unwrap();
        assert_ne!(f.engine.state_digest(), before);
    }
}
