//! Contract-violation errors. See the in-band `OrderError` in [`crate::orders`] for
//! per-order validation failures, which are data, not `Result::Err` — only structural
//! misuse of the engine surfaces here.

use std::fmt;

/// A violation of the engine's calling contract: the caller did something the state
/// machine cannot make sense of, as opposed to an order that is merely illegal this
/// turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// `deploy` was called with a key set or power multiset that does not match
    /// `{1,2,3,4,5}` exactly.
    BadDeployment(String),
    /// An operation referenced a player id the game does not have.
    UnknownPlayer(String),
    /// An operation referenced a token id that does not belong to the state.
    UnknownToken(String),
    /// `resolve`/`advance` was called while the game was in the wrong phase.
    WrongPhase { expected: &'static str, found: &'static str },
    /// Any operation was attempted on a game whose phase is already `Ended`.
    GameEnded,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadDeployment(reason) => write!(f, "bad deployment: {reason}"),
            Self::UnknownPlayer(id) => write!(f, "unknown player: {id}"),
            Self::UnknownToken(id) => write!(f, "unknown token: {id}"),
            Self::WrongPhase { expected, found } => {
                write!(f, "expected phase {expected}, found {found}")
            }
            Self::GameEnded => write!(f, "game has already ended"),
        }
    }
}

impl std::error::Error for EngineError {}

pub type EngineResult<T> = Result<T, EngineError>;
