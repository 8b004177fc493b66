use rust_decimal::Decimal;
use serde::Deserialize;

use super::errors::LedgerError;
use super::expense_types::{SplitKind, SplitSpec, UserId};

/// One participant row of a create-expense request. `percentage` is only
/// meaningful when the expense's split kind is `percentage`.
#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantShare {
    pub user_id: UserId,
    #[serde(default)]
    pub percentage: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateExpenseRequest {
    pub description: String,
    /// Decimal amount with at most two fractional digits (e.g. "12.50").
    pub amount: Decimal,
    pub paid_by: UserId,
    pub split_kind: SplitKind,
    #[serde(default)]
    pub participants: Vec<ParticipantShare>,
}

impl CreateExpenseRequest {
    /// Bind kind and payload into a tagged spec. Percentage splits must
    /// carry a percentage on every participant row; equal splits ignore
    /// any percentages supplied.
    pub fn split_spec(&self) -> Result<SplitSpec, LedgerError> {
        match self.split_kind {
            SplitKind::Equal => Ok(SplitSpec::Equal {
                participants: self.participants.iter().map(|p| p.user_id).collect(),
            }),
            SplitKind::Percentage => {
                let mut shares = Vec::with_capacity(self.participants.len());
                for p in &self.participants {
                    let pct = p
                        .percentage
                        .ok_or(LedgerError::MissingPercentage { user_id: p.user_id })?;
                    shares.push((p.user_id, pct));
                }
                Ok(SplitSpec::Percentage { shares })
            }
        }
    }
}

/// Member record for group creation. Users are deduplicated by email: an
/// existing user with the same email is reused instead of recreated.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberRecord {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberRecord>,
}
