//! Error types for timer registry operations

use crate::timers::timer::TimerId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("no active timer with id {0}")]
    NotFound(TimerId),

    #[error("invalid timer configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, TimerError>;
