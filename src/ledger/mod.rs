//! in-memory ledger of accounts, lendings and repayments
//!
//! Every mutation runs under one lock: validation, the repayment row, the
//! recomputed status and the account balance move together or not at all.
//! Concurrent repayments against the same lending are therefore serialised
//! and each is validated against the balance left by the previous one.

pub mod account;
pub mod lending;

use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::interest::{ReconciliationEngine, ReconciliationResult};
use crate::serialization::LendingView;
use crate::status::{derive_overdue, StatusChange};
use crate::types::{AccountId, LendingId, LendingStatus, Repayment, RepaymentId};
use crate::validation::RepaymentValidator;

pub use account::Account;
pub use lending::{Lending, NewLending};

/// result of adding or deleting a repayment
#[derive(Debug, Clone, PartialEq)]
pub struct RepaymentOutcome {
    pub lending_id: LendingId,
    pub repayment_id: RepaymentId,
    pub status: StatusChange,
    pub reconciliation: ReconciliationResult,
}

#[derive(Debug, Default)]
struct LedgerBook {
    accounts: HashMap<AccountId, Account>,
    lendings: HashMap<LendingId, Lending>,
}

pub struct Ledger {
    config: EngineConfig,
    engine: ReconciliationEngine,
    validator: RepaymentValidator,
    book: Mutex<LedgerBook>,
}

impl Ledger {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: ReconciliationEngine::new(&config),
            validator: RepaymentValidator::new(&config),
            config,
            book: Mutex::new(LedgerBook::default()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub fn open_account(
        &self,
        name: impl Into<String>,
        opening_balance: Money,
        time_provider: &SafeTimeProvider,
    ) -> AccountId {
        let account = Account::new(name, opening_balance, time_provider.now());
        let id = account.id;
        info!(account_id = %id, name = %account.name, balance = %opening_balance, "account opened");
        self.book.lock().accounts.insert(id, account);
        id
    }

    pub fn account(&self, id: AccountId) -> Result<Account> {
        self.book
            .lock()
            .accounts
            .get(&id)
            .cloned()
            .ok_or(LendingError::AccountNotFound { id })
    }

    /// record a lending and pay its principal out of the funding account
    pub fn create_lending(
        &self,
        request: NewLending,
        time_provider: &SafeTimeProvider,
    ) -> Result<LendingId> {
        let now = time_provider.now();
        let mut terms = request.terms();
        self.validator.validate_terms(&terms, now)?;
        // recorded as already paid off: freeze accrual at the moment it was entered
        if terms.status == LendingStatus::FullyPaid {
            terms.settled_at = Some(now);
        }

        let mut book = self.book.lock();
        if let Some(account_id) = request.funding_account_id {
            let account = book
                .accounts
                .get_mut(&account_id)
                .ok_or(LendingError::AccountNotFound { id: account_id })?;
            account.debit(terms.principal);
        }

        let lending = Lending {
            id: Uuid::new_v4(),
            borrower: request.borrower,
            terms,
            repayments: Vec::new(),
            funding_account_id: request.funding_account_id,
            created_at: now,
            last_status_change: now,
        };
        let id = lending.id;

        info!(
            lending_id = %id,
            borrower = %lending.borrower,
            principal = %lending.terms.principal,
            rate = %lending.terms.annual_rate,
            status = %lending.terms.status,
            "lending created"
        );
        book.lendings.insert(id, lending);
        Ok(id)
    }

    pub fn lending(&self, id: LendingId) -> Result<Lending> {
        self.book
            .lock()
            .lendings
            .get(&id)
            .cloned()
            .ok_or(LendingError::LendingNotFound { id })
    }

    pub fn lendings(&self) -> Vec<Lending> {
        let mut all: Vec<Lending> = self.book.lock().lendings.values().cloned().collect();
        all.sort_by_key(|l| (l.terms.lent_at, l.created_at));
        all
    }

    /// read-only reconciliation for tables and charts
    pub fn reconcile(&self, id: LendingId, as_of: DateTime<Utc>) -> Result<ReconciliationResult> {
        let book = self.book.lock();
        let lending = book.lendings.get(&id).ok_or(LendingError::LendingNotFound { id })?;
        self.engine.reconcile(&lending.terms, &lending.repayments, as_of)
    }

    pub fn view(&self, id: LendingId, as_of: DateTime<Utc>) -> Result<LendingView> {
        let lending = self.lending(id)?;
        let reconciliation = self.engine.reconcile(&lending.terms, &lending.repayments, as_of)?;
        Ok(LendingView::new(&lending, &reconciliation, as_of, self.config.currency))
    }

    /// validate, insert, recompute status and credit the receiving account in one step
    pub fn add_repayment(
        &self,
        lending_id: LendingId,
        repayment: Repayment,
        time_provider: &SafeTimeProvider,
    ) -> Result<RepaymentOutcome> {
        let now = time_provider.now();
        let mut guard = self.book.lock();
        let book = &mut *guard;

        let lending = book
            .lendings
            .get_mut(&lending_id)
            .ok_or(LendingError::LendingNotFound { id: lending_id })?;

        if let Some(account_id) = repayment.source_account_id {
            if !book.accounts.contains_key(&account_id) {
                return Err(LendingError::AccountNotFound { id: account_id });
            }
        }

        if let Err(err) = self
            .validator
            .validate_repayment(&lending.terms, &lending.repayments, &repayment)
        {
            warn!(lending_id = %lending_id, amount = %repayment.amount, error = %err, "repayment rejected");
            return Err(err);
        }

        let as_of = repayment.repayment_date;
        let repayment_id = repayment.id;
        let amount = repayment.amount;
        let account_id = repayment.source_account_id;

        lending.repayments.push(repayment);
        let recomputed = match self.recompute_status(lending, as_of, now) {
            Ok(recomputed) => recomputed,
            Err(err) => {
                lending.remove_repayment(repayment_id);
                return Err(err);
            }
        };

        if let Some(account) = account_id.and_then(|id| book.accounts.get_mut(&id)) {
            account.credit(amount);
        }

        info!(
            lending_id = %lending_id,
            repayment_id = %repayment_id,
            amount = %amount,
            remaining = %recomputed.1.remaining_amount,
            "repayment recorded"
        );

        Ok(RepaymentOutcome {
            lending_id,
            repayment_id,
            status: recomputed.0,
            reconciliation: recomputed.1,
        })
    }

    /// remove a repayment, recompute status as of now and take the money back out
    pub fn delete_repayment(
        &self,
        lending_id: LendingId,
        repayment_id: RepaymentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<RepaymentOutcome> {
        let now = time_provider.now();
        let mut guard = self.book.lock();
        let book = &mut *guard;

        let lending = book
            .lendings
            .get_mut(&lending_id)
            .ok_or(LendingError::LendingNotFound { id: lending_id })?;

        let index = lending
            .repayments
            .iter()
            .position(|r| r.id == repayment_id)
            .ok_or(LendingError::RepaymentNotFound { id: repayment_id })?;
        let removed = lending.repayments.remove(index);

        let (status, reconciliation) = match self.recompute_status(lending, now, now) {
            Ok(recomputed) => recomputed,
            Err(err) => {
                lending.repayments.insert(index, removed);
                return Err(err);
            }
        };

        if let Some(account) = removed.source_account_id.and_then(|id| book.accounts.get_mut(&id)) {
            account.debit(removed.amount);
        }

        info!(
            lending_id = %lending_id,
            repayment_id = %repayment_id,
            amount = %removed.amount,
            remaining = %reconciliation.remaining_amount,
            "repayment deleted"
        );

        Ok(RepaymentOutcome {
            lending_id,
            repayment_id,
            status,
            reconciliation,
        })
    }

    /// delete a lending with its repayments and reverse every balance movement
    pub fn delete_lending(&self, id: LendingId) -> Result<Lending> {
        let mut guard = self.book.lock();
        let book = &mut *guard;

        let lending = book
            .lendings
            .remove(&id)
            .ok_or(LendingError::LendingNotFound { id })?;

        if let Some(account) = lending
            .funding_account_id
            .and_then(|account_id| book.accounts.get_mut(&account_id))
        {
            account.credit(lending.terms.principal);
        }
        for repayment in &lending.repayments {
            if let Some(account) = repayment
                .source_account_id
                .and_then(|account_id| book.accounts.get_mut(&account_id))
            {
                account.debit(repayment.amount);
            }
        }

        info!(
            lending_id = %id,
            repayments = lending.repayments.len(),
            "lending deleted"
        );
        Ok(lending)
    }

    /// manual status override; the only way into or out of DEFAULTED
    pub fn override_status(
        &self,
        id: LendingId,
        status: LendingStatus,
        time_provider: &SafeTimeProvider,
    ) -> Result<StatusChange> {
        let now = time_provider.now();
        let mut book = self.book.lock();
        let lending = book.lendings.get_mut(&id).ok_or(LendingError::LendingNotFound { id })?;

        let change = StatusChange::new(lending.terms.status, status);
        if status == LendingStatus::FullyPaid && lending.terms.settled_at.is_none() {
            lending.terms.settled_at = Some(now);
        } else if status != LendingStatus::FullyPaid {
            lending.terms.settled_at = None;
        }
        lending.set_status(status, now);

        if change.is_change() {
            info!(
                lending_id = %id,
                from = %change.previous,
                to = %change.current,
                "status overridden"
            );
        }
        Ok(change)
    }

    pub fn mark_defaulted(&self, id: LendingId, time_provider: &SafeTimeProvider) -> Result<StatusChange> {
        self.override_status(id, LendingStatus::Defaulted, time_provider)
    }

    /// move the due date and re-apply the date-driven overdue check
    pub fn reschedule(
        &self,
        id: LendingId,
        due_at: Option<DateTime<Utc>>,
        time_provider: &SafeTimeProvider,
    ) -> Result<StatusChange> {
        let now = time_provider.now();
        let mut book = self.book.lock();
        let lending = book.lendings.get_mut(&id).ok_or(LendingError::LendingNotFound { id })?;

        let mut terms = lending.terms.clone();
        terms.due_at = due_at;
        // the lending date was already accepted, so only the due date is at stake
        self.validator.validate_terms(&terms, now.max(terms.lent_at))?;

        // the due date caps accrual, so the obligation and with it the status can move
        let previous_due = lending.terms.due_at;
        lending.terms.due_at = due_at;
        let (change, _) = match self.recompute_status(lending, now, now) {
            Ok(recomputed) => recomputed,
            Err(err) => {
                lending.terms.due_at = previous_due;
                return Err(err);
            }
        };

        debug!(lending_id = %id, due_at = ?due_at, status = %change.current, "lending rescheduled");
        Ok(change)
    }

    /// flag lendings whose due date has passed; returns only the ones that changed
    pub fn refresh_overdue(&self, time_provider: &SafeTimeProvider) -> Vec<(LendingId, StatusChange)> {
        let now = time_provider.now();
        let mut book = self.book.lock();
        let mut changed = Vec::new();

        for lending in book.lendings.values_mut() {
            let next = derive_overdue(lending.terms.status, lending.terms.due_at, now);
            let change = StatusChange::new(lending.terms.status, next);
            if change.is_change() {
                lending.set_status(next, now);
                info!(
                    lending_id = %lending.id,
                    from = %change.previous,
                    to = %change.current,
                    "overdue status refreshed"
                );
                changed.push((lending.id, change));
            }
        }
        changed
    }

    /// recompute status from the repayment history as of `as_of`, apply the
    /// overdue check against `now` and persist the result
    fn recompute_status(
        &self,
        lending: &mut Lending,
        as_of: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(StatusChange, ReconciliationResult)> {
        let previous = lending.terms.status;

        // a settled lending is re-checked as if open, so a deleted repayment can reopen it
        let mut open_terms = lending.terms.clone();
        if open_terms.status == LendingStatus::FullyPaid {
            open_terms.status = LendingStatus::PartiallyPaid;
        }
        open_terms.settled_at = None;

        let open = self.engine.reconcile(&open_terms, &lending.repayments, as_of)?;
        let next = derive_overdue(
            open.derive_status(previous, self.engine.tolerance()),
            lending.terms.due_at,
            now,
        );

        let settled_at = if next == LendingStatus::FullyPaid {
            Some(
                self.engine
                    .settlement_date(&open_terms, &lending.repayments)?
                    .unwrap_or(as_of),
            )
        } else {
            None
        };

        // everything fallible happens before the lending is touched
        let reconciliation = if next == LendingStatus::FullyPaid {
            let mut settled_terms = lending.terms.clone();
            settled_terms.status = next;
            settled_terms.settled_at = settled_at;
            self.engine.reconcile(&settled_terms, &lending.repayments, as_of)?
        } else {
            open
        };

        let change = StatusChange::new(previous, next);
        lending.terms.settled_at = settled_at;
        lending.set_status(next, now);

        if change.is_change() {
            info!(
                lending_id = %lending.id,
                from = %change.previous,
                to = %change.current,
                total_repaid = %reconciliation.total_repaid,
                total_with_interest = %reconciliation.total_with_interest,
                "status changed"
            );
        }

        Ok((change, reconciliation))
    }
}
