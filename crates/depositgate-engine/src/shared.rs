//! Task-shareable engine handle.
//!
//! Wraps a [`DepositEngine`] in `Arc<tokio::sync::Mutex<_>>`. Each call
//! holds the lock for the whole operation, including the asset-ledger call,
//! and the guard is dropped on every return path. Two operations therefore
//! never interleave.

use std::sync::Arc;

use depositgate_ledger::AssetLedger;
use depositgate_types::{AccountId, Amount, EngineEvent, EngineSnapshot, LedgerId, Result};
use tokio::sync::Mutex;

use crate::DepositEngine;

pub struct SharedDepositEngine<L> {
    inner: Arc<Mutex<DepositEngine<L>>>,
}

impl<L> Clone for SharedDepositEngine<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: AssetLedger> SharedDepositEngine<L> {
    pub fn new(engine: DepositEngine<L>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Run `f` with exclusive access to the engine.
    pub async fn with_engine<R>(&self, f: impl FnOnce(&mut DepositEngine<L>) -> R) -> R {
        let mut engine = self.inner.lock().await;
        f(&mut engine)
    }

    /// Recover the engine if this is the last handle.
    pub fn try_into_inner(self) -> Option<DepositEngine<L>> {
        Arc::try_unwrap(self.inner).ok().map(Mutex::into_inner)
    }

    pub async fn set_asset_ledger(&self, caller: AccountId, ledger: L) -> Result<L> {
        self.inner.lock().await.set_asset_ledger(caller, ledger)
    }

    pub async fn set_threshold(&self, caller: AccountId, threshold: Amount) -> Result<()> {
        self.inner.lock().await.set_threshold(caller, threshold)
    }

    pub async fn deposit(&self, caller: AccountId) -> Result<Amount> {
        self.inner.lock().await.deposit(caller)
    }

    pub async fn deposit_on_behalf_of(
        &self,
        caller: AccountId,
        account: AccountId,
    ) -> Result<Amount> {
        self.inner.lock().await.deposit_on_behalf_of(caller, account)
    }

    pub async fn release_my_tokens(&self, caller: AccountId) -> Result<Amount> {
        self.inner.lock().await.release_my_tokens(caller)
    }

    pub async fn release_tokens_of(&self, caller: AccountId, account: AccountId) -> Result<Amount> {
        self.inner.lock().await.release_tokens_of(caller, account)
    }

    pub async fn release_all_tokens_to(
        &self,
        caller: AccountId,
        destination: AccountId,
    ) -> Result<Amount> {
        self.inner.lock().await.release_all_tokens_to(caller, destination)
    }

    pub async fn administrator(&self) -> AccountId {
        self.inner.lock().await.administrator()
    }

    pub async fn asset_ledger(&self) -> LedgerId {
        self.inner.lock().await.asset_ledger()
    }

    pub async fn threshold(&self) -> Amount {
        self.inner.lock().await.threshold()
    }

    pub async fn is_sufficiently_deposited(&self, account: AccountId) -> bool {
        self.inner.lock().await.is_sufficiently_deposited(&account)
    }

    pub async fn current_balance(&self, account: AccountId) -> Amount {
        self.inner.lock().await.current_balance(&account)
    }

    pub async fn total_deposits(&self) -> Amount {
        self.inner.lock().await.total_deposits()
    }

    pub async fn holder_count(&self) -> usize {
        self.inner.lock().await.holder_count()
    }

    pub async fn holder_at(&self, index: usize) -> Result<AccountId> {
        self.inner.lock().await.holder_at(index)
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn drain_events(&self) -> Vec<EngineEvent> {
        self.inner.lock().await.drain_events()
    }
}
