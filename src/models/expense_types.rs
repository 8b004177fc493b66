use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type UserId = u64;
pub type GroupId = u64;
pub type ExpenseId = u64;
pub type SplitId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Member ids; order carries no meaning.
    pub members: Vec<UserId>,
}

impl Group {
    pub fn is_member(&self, user_id: UserId) -> bool {
        self.members.contains(&user_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitKind {
    Equal,
    Percentage,
}

/// Split specification. Kind and payload are inseparable: a percentage map
/// cannot exist on an equal split and vice versa.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitSpec {
    Equal { participants: Vec<UserId> },
    Percentage { shares: Vec<(UserId, Decimal)> },
}

impl SplitSpec {
    pub fn kind(&self) -> SplitKind {
        match self {
            Self::Equal { .. } => SplitKind::Equal,
            Self::Percentage { .. } => SplitKind::Percentage,
        }
    }
}

/// One participant's frozen share of an expense. amount_minor is in integer
/// minor units (cents); percentage is only present for percentage splits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub id: SplitId,
    pub expense_id: ExpenseId,
    pub user_id: UserId,
    pub amount_minor: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
}

/// An expense and its frozen splits. Append-only: never mutated or deleted
/// once committed. Invariant: split amounts sum exactly to amount_minor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub description: String,
    pub amount_minor: i64,
    pub paid_by: UserId,
    pub split_kind: SplitKind,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub splits: Vec<Split>,
}

/// One member's net position in a group. Positive: owed money. Negative:
/// owes money.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceEntry {
    pub user_id: UserId,
    pub user_name: String,
    pub amount: Decimal,
}

/// A single group's contribution to a user's overall position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupContribution {
    pub group_id: GroupId,
    pub group_name: String,
    pub amount: Decimal,
}

/// A user's position aggregated across all their groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserBalanceSummary {
    pub user_id: UserId,
    pub user_name: String,
    pub net: Decimal,
    pub groups: Vec<GroupContribution>,
}
