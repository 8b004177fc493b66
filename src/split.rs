//! Split calculation: turns an expense amount plus a split specification
//! into frozen per-member shares.
//!
//! Flow:
//! 1. Validate amount, payer, participants
//! 2. Compute raw shares (integer division or percentage floor)
//! 3. Distribute the leftover minor units in ascending user-id order
//!
//! Pure function of its inputs: no side effects, identical inputs produce
//! identical share lists. Invariant: shares sum exactly to the total.

use std::collections::HashSet;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::models::{Group, LedgerError, SplitSpec, UserId};
use crate::money;

/// Allowed drift of a percentage sum from 100, in percentage points.
/// Absorbs decimal representation noise like 33.33 + 33.33 + 33.34.
fn percent_sum_tolerance() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// One computed share, before the store freezes it into a Split.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareAmount {
    pub user_id: UserId,
    pub amount_minor: i64,
    pub percentage: Option<Decimal>,
}

/// Compute the frozen shares for an expense.
///
/// Fails with a validation error and no partial result if the amount is
/// not positive, the payer or any participant is not a group member, the
/// participant list is empty or has duplicates, or percentages are out of
/// range / out of tolerance.
pub fn compute_splits(
    group: &Group,
    total_minor: i64,
    paid_by: UserId,
    spec: &SplitSpec,
) -> Result<Vec<ShareAmount>, LedgerError> {
    // 1. Amount must be positive
    if total_minor <= 0 {
        return Err(LedgerError::NonPositiveAmount {
            amount: money::to_decimal(total_minor),
        });
    }

    // 2. Payer must belong to the group
    if !group.is_member(paid_by) {
        return Err(LedgerError::PayerNotMember {
            user_id: paid_by,
            group_id: group.id,
        });
    }

    // 3. Participants: non-empty, unique, all members
    match spec {
        SplitSpec::Equal { participants } => {
            validate_participants(group, participants)?;
            Ok(equal_shares(total_minor, participants))
        }
        SplitSpec::Percentage { shares } => {
            let ids: Vec<UserId> = shares.iter().map(|(id, _)| *id).collect();
            validate_participants(group, &ids)?;
            percentage_shares(total_minor, shares)
        }
    }
}

fn validate_participants(group: &Group, ids: &[UserId]) -> Result<(), LedgerError> {
    if ids.is_empty() {
        return Err(LedgerError::EmptyParticipants);
    }
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(LedgerError::DuplicateParticipant { user_id: *id });
        }
        if !group.is_member(*id) {
            return Err(LedgerError::ParticipantNotMember {
                user_id: *id,
                group_id: group.id,
            });
        }
    }
    Ok(())
}

/// Equal split: integer division, remainder cents to the lowest user ids.
fn equal_shares(total_minor: i64, participants: &[UserId]) -> Vec<ShareAmount> {
    let mut ids = participants.to_vec();
    ids.sort_unstable();

    let n = ids.len() as i64;
    let base = total_minor / n;

    let mut shares: Vec<ShareAmount> = ids
        .into_iter()
        .map(|user_id| ShareAmount { user_id, amount_minor: base, percentage: None })
        .collect();
    distribute_remainder(&mut shares, total_minor - base * n);
    shares
}

/// Percentage split: floor each raw share, then correct the total so the
/// shares sum exactly to the original amount.
fn percentage_shares(
    total_minor: i64,
    shares: &[(UserId, Decimal)],
) -> Result<Vec<ShareAmount>, LedgerError> {
    let hundred = Decimal::from(100);

    let mut sum = Decimal::ZERO;
    for (user_id, pct) in shares {
        if *pct < Decimal::ZERO || *pct > hundred {
            return Err(LedgerError::PercentageOutOfRange {
                user_id: *user_id,
                percentage: *pct,
            });
        }
        sum += *pct;
    }
    if (sum - hundred).abs() > percent_sum_tolerance() {
        return Err(LedgerError::PercentageSumMismatch { sum: sum.normalize() });
    }

    let mut ordered = shares.to_vec();
    ordered.sort_unstable_by_key(|(id, _)| *id);

    let total_dec = Decimal::from(total_minor);
    let mut computed = Vec::with_capacity(ordered.len());
    for (user_id, pct) in ordered {
        let raw = total_dec
            .checked_mul(pct)
            .and_then(|v| v.checked_div(hundred))
            .ok_or(LedgerError::AmountOverflow)?;
        let amount_minor = raw.floor().to_i64().ok_or(LedgerError::AmountOverflow)?;
        computed.push(ShareAmount {
            user_id,
            amount_minor,
            percentage: Some(pct),
        });
    }

    let assigned: i64 = computed.iter().map(|s| s.amount_minor).sum();
    distribute_remainder(&mut computed, total_minor - assigned);
    Ok(computed)
}

/// Spread leftover minor units one at a time across shares, which are
/// already in ascending user-id order. A positive diff adds cents starting
/// from the lowest id; a negative diff (percentage sums just above 100
/// inside the tolerance) removes cents the same way, skipping shares that
/// are already zero.
fn distribute_remainder(shares: &mut [ShareAmount], diff: i64) {
    let n = shares.len();
    let mut remaining = diff;
    let mut i = 0usize;
    while remaining > 0 {
        shares[i % n].amount_minor += 1;
        remaining -= 1;
        i += 1;
    }
    while remaining < 0 {
        if shares[i % n].amount_minor > 0 {
            shares[i % n].amount_minor -= 1;
            remaining += 1;
        }
        i += 1;
    }
}
