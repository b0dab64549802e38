//! Error taxonomy for rejected actions.
//!
//! Every rejection leaves the game untouched. Validation errors mean the action
//! was aimed at the wrong turn or phase (or could not be read at all); rule
//! violations mean the action was well-timed but breaks a game rule. Both carry a
//! machine readable [`ErrorKind`] for client messaging.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::player::PlayerId;

/// Closed set of error kinds sent back to the submitting client.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotYourTurn,
    InvalidPhase,
    ActionNotAllowed,
    UnknownPlayer,
    MalformedAction,
    InvalidTile,
    NotYourTile,
    ChainNotAvailable,
    ChainAlreadyActive,
    InsufficientFunds,
    StockUnavailable,
    MaxStocksExceeded,
    InvalidStockQuantity,
    InvalidChain,
    TradeNotEven,
    InvalidDisposition,
    InsufficientStockToTrade,
    InternalInconsistency,
}

/// The action does not fit the current turn or phase.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum ValidationError {
    #[error("it is not {0}'s turn")]
    NotYourTurn(PlayerId),
    #[error("this action is not valid in the current phase")]
    InvalidPhase,
    #[error("this action is not allowed right now")]
    ActionNotAllowed,
    #[error("{0} is not seated in this game")]
    UnknownPlayer(PlayerId),
    #[error("malformed action: {0}")]
    MalformedAction(String),
}

/// The action is well-timed but breaks a rule of the game.
#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum RuleViolation {
    #[error("that tile cannot be placed")]
    InvalidTile,
    #[error("that tile is not in your hand")]
    NotYourTile,
    #[error("that chain is not available to found")]
    ChainNotAvailable,
    #[error("that chain is already on the board")]
    ChainAlreadyActive,
    #[error("not enough cash: the purchase costs ${cost} and you have ${cash}")]
    InsufficientFunds { cost: u32, cash: u32 },
    #[error("not enough stock left in that chain")]
    StockUnavailable,
    #[error("at most {max} shares may be bought per turn, {requested} requested")]
    MaxStocksExceeded { requested: u32, max: u32 },
    #[error("share quantities must be positive")]
    InvalidStockQuantity,
    #[error("that chain cannot be chosen here")]
    InvalidChain,
    #[error("shares are traded two for one, so the trade amount must be even")]
    TradeNotEven,
    #[error("sell, trade and hold must cover exactly the shares held in the defunct chain")]
    InvalidDisposition,
    #[error("the surviving chain does not have enough stock left for that trade")]
    InsufficientStockToTrade,
}

#[derive(Debug, PartialEq, Eq, Clone, Error)]
pub enum AcquireError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Rule(#[from] RuleViolation),
    /// The game broke one of its own invariants. Not recoverable.
    #[error("game state is inconsistent: {0}")]
    Inconsistent(String),
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::NotYourTurn(_) => ErrorKind::NotYourTurn,
            ValidationError::InvalidPhase => ErrorKind::InvalidPhase,
            ValidationError::ActionNotAllowed => ErrorKind::ActionNotAllowed,
            ValidationError::UnknownPlayer(_) => ErrorKind::UnknownPlayer,
            ValidationError::MalformedAction(_) => ErrorKind::MalformedAction,
        }
    }
}

impl RuleViolation {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RuleViolation::InvalidTile => ErrorKind::InvalidTile,
            RuleViolation::NotYourTile => ErrorKind::NotYourTile,
            RuleViolation::ChainNotAvailable => ErrorKind::ChainNotAvailable,
            RuleViolation::ChainAlreadyActive => ErrorKind::ChainAlreadyActive,
            RuleViolation::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            RuleViolation::StockUnavailable => ErrorKind::StockUnavailable,
            RuleViolation::MaxStocksExceeded { .. } => ErrorKind::MaxStocksExceeded,
            RuleViolation::InvalidStockQuantity => ErrorKind::InvalidStockQuantity,
            RuleViolation::InvalidChain => ErrorKind::InvalidChain,
            RuleViolation::TradeNotEven => ErrorKind::TradeNotEven,
            RuleViolation::InvalidDisposition => ErrorKind::InvalidDisposition,
            RuleViolation::InsufficientStockToTrade => ErrorKind::InsufficientStockToTrade,
        }
    }
}

impl AcquireError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AcquireError::Validation(error) => error.kind(),
            AcquireError::Rule(error) => error.kind(),
            AcquireError::Inconsistent(_) => ErrorKind::InternalInconsistency,
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, AcquireError::Inconsistent(_))
    }
}
