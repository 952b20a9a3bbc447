//! The module contains the errors the engine can throw.
//!
//! Malformed user input (`SummaParsing`, `DateParsing`, `LimitParsing`,
//! `UnknownPeriod`, `InvalidCurrency`) is always user-recoverable and is
//! turned into guidance close to the call site. `CategoryNotExist` and
//! `UserHasntCategory` trigger the category-choice workflow instead of
//! failing the command. Collaborator failures are wrapped with the name of
//! the failing operation and surface as a generic failure message.

use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("summa parsing error: \"{0}\"")]
    SummaParsing(String),
    #[error("limit parsing error: \"{0}\"")]
    LimitParsing(String),
    #[error("date parsing error: \"{0}\"")]
    DateParsing(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("unknown period: \"{0}\"")]
    UnknownPeriod(String),
    #[error("invalid currency: \"{0}\"")]
    InvalidCurrency(String),
    #[error("category \"{0}\" doesn't exist")]
    CategoryNotExist(String),
    #[error("category \"{0}\" already exists")]
    CategoryAlreadyExists(String),
    #[error("user doesn't have category \"{0}\"")]
    UserHasntCategory(String),
    #[error("invalid pending status")]
    InvalidPendingStatus,
    #[error("storage failure in {op}: {source}")]
    Storage { op: &'static str, source: Source },
    #[error("transport failure in {op}: {source}")]
    Transport { op: &'static str, source: Source },
}

impl EngineError {
    /// Wrap a persistence failure, naming the failing operation.
    pub fn storage(op: &'static str, source: impl Into<Source>) -> Self {
        EngineError::Storage {
            op,
            source: source.into(),
        }
    }

    /// Wrap a transport/side-channel failure, naming the failing operation.
    pub fn transport(op: &'static str, source: impl Into<Source>) -> Self {
        EngineError::Transport {
            op,
            source: source.into(),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::SummaParsing(a), Self::SummaParsing(b)) => a == b,
            (Self::LimitParsing(a), Self::LimitParsing(b)) => a == b,
            (Self::DateParsing(a), Self::DateParsing(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::UnknownPeriod(a), Self::UnknownPeriod(b)) => a == b,
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::CategoryNotExist(a), Self::CategoryNotExist(b)) => a == b,
            (Self::CategoryAlreadyExists(a), Self::CategoryAlreadyExists(b)) => a == b,
            (Self::UserHasntCategory(a), Self::UserHasntCategory(b)) => a == b,
            (Self::InvalidPendingStatus, Self::InvalidPendingStatus) => true,
            (
                Self::Storage { op: a, source: sa },
                Self::Storage { op: b, source: sb },
            ) => a == b && sa.to_string() == sb.to_string(),
            (
                Self::Transport { op: a, source: sa },
                Self::Transport { op: b, source: sb },
            ) => a == b && sa.to_string() == sb.to_string(),
            _ => false,
        }
    }
}
