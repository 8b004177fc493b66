// Error types for expense submission and balance queries
use std::fmt;

use rust_decimal::Decimal;

use super::expense_types::{GroupId, UserId};

#[derive(Debug, Clone, PartialEq)]
pub enum LedgerError {
    // Validation errors
    EmptyDescription,
    EmptyGroupName,
    NonPositiveAmount { amount: Decimal },
    InvalidPrecision { value: String, max_scale: u32 },
    EmptyParticipants,
    DuplicateParticipant { user_id: UserId },
    PayerNotMember { user_id: UserId, group_id: GroupId },
    ParticipantNotMember { user_id: UserId, group_id: GroupId },
    MissingPercentage { user_id: UserId },
    PercentageOutOfRange { user_id: UserId, percentage: Decimal },
    PercentageSumMismatch { sum: Decimal },

    // Not found
    GroupNotFound(GroupId),
    UserNotFound(UserId),

    // Concurrency errors
    LockTimeout { group_id: GroupId, waited_ms: u64 },

    // Arithmetic errors
    AmountOverflow,

    // Storage errors
    Storage(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDescription => write!(f, "Description must not be empty"),
            Self::EmptyGroupName => write!(f, "Group name must not be empty"),
            Self::NonPositiveAmount { amount } => {
                write!(f, "Amount {} must be positive", amount)
            }
            Self::InvalidPrecision { value, max_scale } => {
                write!(f, "Amount {} exceeds max precision {}", value, max_scale)
            }
            Self::EmptyParticipants => write!(f, "Expense needs at least one participant"),
            Self::DuplicateParticipant { user_id } => {
                write!(f, "Participant {} listed more than once", user_id)
            }
            Self::PayerNotMember { user_id, group_id } => {
                write!(f, "Payer {} is not a member of group {}", user_id, group_id)
            }
            Self::ParticipantNotMember { user_id, group_id } => {
                write!(f, "Participant {} is not a member of group {}", user_id, group_id)
            }
            Self::MissingPercentage { user_id } => {
                write!(f, "Percentage split requires a percentage for user {}", user_id)
            }
            Self::PercentageOutOfRange { user_id, percentage } => {
                write!(
                    f,
                    "Percentage {} for user {} is outside [0, 100]",
                    percentage, user_id
                )
            }
            Self::PercentageSumMismatch { sum } => {
                write!(f, "percentages sum to {}, expected 100", sum)
            }
            Self::GroupNotFound(id) => write!(f, "Group {} not found", id),
            Self::UserNotFound(id) => write!(f, "User {} not found", id),
            Self::LockTimeout { group_id, waited_ms } => {
                write!(
                    f,
                    "Timed out after {}ms waiting for group {} write lock",
                    waited_ms, group_id
                )
            }
            Self::AmountOverflow => write!(f, "Amount exceeds the representable range"),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}

// Error code mapping for API responses
impl LedgerError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::EmptyGroupName => "EMPTY_GROUP_NAME",
            Self::NonPositiveAmount { .. } => "INVALID_AMOUNT",
            Self::InvalidPrecision { .. } => "INVALID_PRECISION",
            Self::EmptyParticipants => "EMPTY_PARTICIPANTS",
            Self::DuplicateParticipant { .. } => "DUPLICATE_PARTICIPANT",
            Self::PayerNotMember { .. } => "PAYER_NOT_MEMBER",
            Self::ParticipantNotMember { .. } => "PARTICIPANT_NOT_MEMBER",
            Self::MissingPercentage { .. } => "MISSING_PERCENTAGE",
            Self::PercentageOutOfRange { .. } => "PERCENTAGE_OUT_OF_RANGE",
            Self::PercentageSumMismatch { .. } => "PERCENTAGE_SUM_MISMATCH",
            Self::GroupNotFound(_) => "GROUP_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::LockTimeout { .. } => "LOCK_TIMEOUT",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout { .. } | Self::Storage(_))
    }

    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyDescription
                | Self::EmptyGroupName
                | Self::NonPositiveAmount { .. }
                | Self::InvalidPrecision { .. }
                | Self::EmptyParticipants
                | Self::DuplicateParticipant { .. }
                | Self::PayerNotMember { .. }
                | Self::ParticipantNotMember { .. }
                | Self::MissingPercentage { .. }
                | Self::PercentageOutOfRange { .. }
                | Self::PercentageSumMismatch { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::GroupNotFound(_) | Self::UserNotFound(_))
    }
}
