//! Error types for the simulation layer

use ais_protocol::{MessageType, Mmsi, ProtocolError};
use ais_scheduler::ScheduleError;
use thiserror::Error;

/// Errors that can occur while simulating traffic
#[derive(Debug, Error)]
pub enum SimError {
    /// Encoding or framing failed
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Scheduler rejected the operation
    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    /// No simulated target with this MMSI
    #[error("unknown target: {0}")]
    UnknownTarget(Mmsi),

    /// Target kind does not transmit this message type
    #[error("target {mmsi} cannot transmit message type {message_type}")]
    IncompatibleTarget {
        mmsi: Mmsi,
        message_type: MessageType,
    },

    /// Operation needs a vessel but the target is a fixed station
    #[error("target {0} is not a vessel")]
    NotAVessel(Mmsi),

    /// Invalid scenario configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
