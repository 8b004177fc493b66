//! Balance projections over the expense log.
//!
//! Balances are never stored: every query folds the committed log, so a
//! recomputation is always authoritative. The fold is commutative (payer
//! credited the full amount, each participant debited their share), which
//! makes the result independent of expense order.

use std::collections::BTreeMap;

use crate::models::{Expense, Group, LedgerError, UserId};

/// Net minor-unit balance per member. Every group member appears, zero or
/// not; users occurring in the log but no longer listed as members (never
/// the case for logs written through the guarded path) are included too.
/// BTreeMap keeps iteration order deterministic.
pub fn group_balances(
    group: &Group,
    expenses: &[Expense],
) -> Result<BTreeMap<UserId, i64>, LedgerError> {
    let mut balances: BTreeMap<UserId, i64> = BTreeMap::new();
    for member in &group.members {
        balances.insert(*member, 0);
    }

    for expense in expenses {
        let payer = balances.entry(expense.paid_by).or_insert(0);
        *payer = payer
            .checked_add(expense.amount_minor)
            .ok_or(LedgerError::AmountOverflow)?;

        for split in &expense.splits {
            let participant = balances.entry(split.user_id).or_insert(0);
            *participant = participant
                .checked_sub(split.amount_minor)
                .ok_or(LedgerError::AmountOverflow)?;
        }
    }

    Ok(balances)
}

/// One user's net contribution from a single group's log.
pub fn user_contribution(
    user_id: UserId,
    group: &Group,
    expenses: &[Expense],
) -> Result<i64, LedgerError> {
    Ok(group_balances(group, expenses)?.get(&user_id).copied().unwrap_or(0))
}
