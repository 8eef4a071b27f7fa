use crate::group::GroupStatus;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SquaresError>;

#[derive(Error, Debug)]
pub enum SquaresError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Group not found: {id}")]
    GroupNotFound { id: String },

    #[error("No group with invite code: {code}")]
    InviteCodeNotFound { code: String },

    #[error("Numbers not assigned for quarter {quarter}")]
    NumbersNotAssigned { quarter: u8 },

    #[error("Group {id} is already locked")]
    AlreadyLocked { id: String },

    #[error("Group {id} is not accepting purchases (status: {status})")]
    PurchasesClosed { id: String, status: GroupStatus },

    #[error("Invalid quarter: {0} (expected 1-4)")]
    InvalidQuarter(u8),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Score feed error: {0}")]
    ScoreFeed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SquaresError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn score_feed(msg: impl Into<String>) -> Self {
        Self::ScoreFeed(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
