// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Bad delay value: {0}")]
    InvalidDelay(String),

    #[error("Queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    #[error("Queue is closed")]
    QueueClosed,

    #[error("Queue capacity must be positive")]
    InvalidCapacity,
}

pub type Result<T> = std::result::Result<T, DomainError>;
