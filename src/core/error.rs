use crate::validation::ProcessId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AllocError {
    #[error("Process {0} already has memory allocated")]
    DuplicateProcess(ProcessId),

    #[error("Unknown allocation strategy: {0}")]
    UnknownStrategy(char),

    #[error("Not enough memory: requested {requested}, largest free block is {largest_free}")]
    InsufficientMemory { requested: u64, largest_free: u64 },

    #[error("Process {0} does not have memory allocated")]
    ProcessNotFound(String),

    #[error("Invalid process identifier: {0:?} (must be non-empty, no whitespace)")]
    InvalidProcessId(String),

    #[error("Invalid allocation size: {0} (must be positive)")]
    InvalidSize(u64),

    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(u64),

    #[error("Address space corrupted: {0}")]
    Corrupted(String),

    #[error("{0}")]
    InvalidCommand(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AllocError {
    /// True for the four outcomes the block list can produce on its own
    pub fn is_allocator_outcome(&self) -> bool {
        matches!(
            self,
            AllocError::DuplicateProcess(_)
                | AllocError::UnknownStrategy(_)
                | AllocError::InsufficientMemory { .. }
                | AllocError::ProcessNotFound(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AllocError>;
