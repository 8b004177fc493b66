// Expense service: the write and query surface the HTTP layer (and any
// other collaborator, e.g. a read-only assistant) talks to.
//
// Write flow:
// 1. Resolve group
// 2. Acquire the group's write region
// 3. Validate request, convert amount to minor units
// 4. Compute frozen splits (pure)
// 5. Append expense+splits atomically
//
// All-or-nothing: a failure at any step leaves the log untouched. Queries
// never take the write region; they fold the committed log.

use std::sync::Arc;
use std::time::Duration;

use crate::balance;
use crate::guard::ConsistencyGuard;
use crate::models::{
    BalanceEntry, CreateExpenseRequest, Expense, Group, GroupContribution, GroupId, LedgerError,
    UserBalanceSummary, UserId,
};
use crate::money;
use crate::split;
use crate::store::{LedgerStore, PendingExpense};

pub struct ExpenseService {
    store: Arc<dyn LedgerStore>,
    guard: ConsistencyGuard,
}

impl ExpenseService {
    pub fn new(store: Arc<dyn LedgerStore>, lock_timeout: Duration) -> Self {
        Self {
            store,
            guard: ConsistencyGuard::new(lock_timeout),
        }
    }

    pub async fn create_expense(
        &self,
        group_id: GroupId,
        req: &CreateExpenseRequest,
    ) -> Result<Expense, LedgerError> {
        // 1. Resolve group (not-found needs no serialization)
        let group = self
            .store
            .group(group_id)?
            .ok_or(LedgerError::GroupNotFound(group_id))?;

        // 2. One in-flight validate-compute-append per group
        let _region = self.guard.acquire(group_id).await?;

        // 3. Validate request, convert to minor units
        if req.description.trim().is_empty() {
            return Err(LedgerError::EmptyDescription);
        }
        let total_minor = money::to_minor_units(req.amount)?;
        let spec = req.split_spec()?;

        // 4. Compute frozen splits
        let shares = split::compute_splits(&group, total_minor, req.paid_by, &spec)?;

        // 5. Atomic append
        let expense = self.store.append_expense(PendingExpense {
            group_id,
            description: req.description.clone(),
            amount_minor: total_minor,
            paid_by: req.paid_by,
            split_kind: req.split_kind,
            shares,
        })?;

        log::info!(
            "Expense {} committed: group={} payer={} amount={} splits={}",
            expense.id,
            group_id,
            expense.paid_by,
            expense.amount_minor,
            expense.splits.len()
        );
        Ok(expense)
    }

    pub fn group_expenses(&self, group_id: GroupId) -> Result<Vec<Expense>, LedgerError> {
        self.store
            .group(group_id)?
            .ok_or(LedgerError::GroupNotFound(group_id))?;
        self.store.expenses_for_group(group_id)
    }

    /// Per-member net balances for a group, with display names resolved.
    pub fn group_balances(&self, group_id: GroupId) -> Result<Vec<BalanceEntry>, LedgerError> {
        let group = self
            .store
            .group(group_id)?
            .ok_or(LedgerError::GroupNotFound(group_id))?;
        let expenses = self.store.expenses_for_group(group_id)?;
        let balances = balance::group_balances(&group, &expenses)?;

        let mut entries = Vec::with_capacity(balances.len());
        for (user_id, amount_minor) in balances {
            let user = self
                .store
                .user(user_id)?
                .ok_or(LedgerError::UserNotFound(user_id))?;
            entries.push(BalanceEntry {
                user_id,
                user_name: user.name,
                amount: money::to_decimal(amount_minor),
            });
        }
        Ok(entries)
    }

    /// A user's net position across all their groups, with the per-group
    /// breakdown retained.
    pub fn user_balances(&self, user_id: UserId) -> Result<UserBalanceSummary, LedgerError> {
        let user = self
            .store
            .user(user_id)?
            .ok_or(LedgerError::UserNotFound(user_id))?;

        let mut net: i64 = 0;
        let mut groups = Vec::new();
        for group in self.store.groups_for_user(user_id)? {
            let expenses = self.store.expenses_for_group(group.id)?;
            let contribution = balance::user_contribution(user_id, &group, &expenses)?;
            net = net
                .checked_add(contribution)
                .ok_or(LedgerError::AmountOverflow)?;
            groups.push(GroupContribution {
                group_id: group.id,
                group_name: group.name,
                amount: money::to_decimal(contribution),
            });
        }

        Ok(UserBalanceSummary {
            user_id,
            user_name: user.name,
            net: money::to_decimal(net),
            groups,
        })
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn group(&self, group_id: GroupId) -> Result<Group, LedgerError> {
        self.store
            .group(group_id)?
            .ok_or(LedgerError::GroupNotFound(group_id))
    }
}
