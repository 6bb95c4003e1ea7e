//! AIS Transmission Scheduler
//!
//! Decides which AIS messages each simulated station owes and when. Every
//! (target, message type) pair cycles through
//! `scheduled -> due -> sent -> scheduled`:
//!
//! - **Registration** sets up the message types of a target's class with
//!   staggered first transmissions
//! - **Due selection** returns every pair with `now >= next_due`, position
//!   reports first
//! - **Marking sent** moves the next due time one interval past the send
//! - **Speed-dependent rates** shorten position report intervals for fast
//!   vessels, following the ITU reporting-rate table
//! - **Cleanup** drops targets that have gone silent
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use ais_protocol::{Mmsi, VesselClass};
//! use ais_scheduler::TransmissionScheduler;
//!
//! let mut scheduler = TransmissionScheduler::new();
//! let mmsi = Mmsi(366_053_209);
//! scheduler.add_vessel(mmsi, VesselClass::A, Duration::ZERO).unwrap();
//!
//! let now = Duration::ZERO;
//! for due in scheduler.get_due_messages(now) {
//!     // encode and transmit `due.message_type` for `due.mmsi` here
//!     scheduler.mark_sent(due.mmsi, due.message_type, now).unwrap();
//! }
//!
//! let next = scheduler.next_transmission_time().unwrap();
//! assert_eq!(next, Duration::from_secs(2));
//! ```

pub mod error;
pub mod scheduler;
pub mod state;
pub mod stats;

pub use error::ScheduleError;
pub use scheduler::{
    class_a_reporting_interval, class_b_reporting_interval, duration_from_secs, DueMessage,
    MessageIntervals, SchedulerConfig, TransmissionScheduler,
};
pub use state::{Priority, ScheduledTransmission, TargetClass, TargetSchedule};
pub use stats::{MessageTypeStats, SchedulerStatistics};
