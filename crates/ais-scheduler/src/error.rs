//! Error types for the scheduler

use ais_protocol::{MessageType, Mmsi};
use thiserror::Error;

/// Errors that can occur while scheduling transmissions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Target not registered
    #[error("target not found: {0}")]
    TargetNotFound(Mmsi),

    /// Target already registered
    #[error("target already registered: {0}")]
    TargetExists(Mmsi),

    /// Target does not transmit this message type
    #[error("target {mmsi} has no schedule for message type {message_type}")]
    MessageNotScheduled {
        mmsi: Mmsi,
        message_type: MessageType,
    },
}
