use thiserror::Error;

use crate::agent::Role;

// Errors raised while decoding an utterance into a Content tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("empty utterance")]
    Empty,

    #[error("invalid agent token: {0}")]
    InvalidAgent(String),

    #[error("unknown keyword: {0}")]
    UnknownKeyword(String),

    #[error("invalid {kind}: {token}")]
    InvalidToken { kind: &'static str, token: String },

    #[error("{operator} expects {expected} operand(s), got {found}")]
    Arity {
        operator: &'static str,
        expected: &'static str,
        found: usize,
    },

    #[error("unbalanced parentheses at byte {0}")]
    Unbalanced(usize),

    #[error("unexpected end of utterance")]
    UnexpectedEnd,

    #[error("operands nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("trailing input: {0}")]
    Trailing(String),
}

// Errors raised by the player when the driver asks for something its role cannot do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("{action} is not available to a {role}")]
    UnsupportedAction { role: Role, action: &'static str },

    #[error("player is not initialized")]
    NotInitialized,
}

// Errors for the JSON files the agent reads and writes.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Logger error: {0}")]
    Logger(String),
}

impl From<log::SetLoggerError> for SettingsError {
    fn from(error: log::SetLoggerError) -> Self {
        SettingsError::Logger(error.to_string())
    }
}

// Errors raised while answering a server packet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PacketError {
    #[error("{request} arrived without {field}")]
    Missing {
        request: &'static str,
        field: &'static str,
    },

    #[error(transparent)]
    Agent(#[from] AgentError),
}
