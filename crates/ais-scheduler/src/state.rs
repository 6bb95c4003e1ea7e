//! Per-target schedule state
//!
//! Times are offsets from the simulation epoch. Nothing here reads a wall
//! clock, so a schedule behaves identically in real time and in replay.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use ais_protocol::{MessageType, Mmsi, VesselClass};
use serde::{Deserialize, Serialize};

/// Kind of station a schedule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TargetClass {
    ClassA,
    ClassB,
    BaseStation,
    AidToNavigation,
}

impl TargetClass {
    /// Message types a target of this class transmits
    pub fn message_types(&self) -> &'static [MessageType] {
        match self {
            Self::ClassA => &[
                MessageType::PositionReportScheduled,
                MessageType::PositionReportAssigned,
                MessageType::PositionReportResponse,
                MessageType::StaticAndVoyage,
            ],
            Self::ClassB => &[
                MessageType::ClassBPosition,
                MessageType::ClassBExtended,
                MessageType::StaticDataReport,
            ],
            Self::BaseStation => &[MessageType::BaseStationReport],
            Self::AidToNavigation => &[MessageType::AidToNavigation],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ClassA => "Class A",
            Self::ClassB => "Class B",
            Self::BaseStation => "Base Station",
            Self::AidToNavigation => "Aid to Navigation",
        }
    }
}

impl From<VesselClass> for TargetClass {
    fn from(class: VesselClass) -> Self {
        match class {
            VesselClass::A => Self::ClassA,
            VesselClass::B => Self::ClassB,
        }
    }
}

impl fmt::Display for TargetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Transmission priority; lower values go out first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Priority {
    /// Position reports (1, 2, 3, 18)
    High = 1,
    /// Extended class B report (19)
    Medium = 2,
    /// Static data (5, 24)
    Low = 3,
    /// Base station and aid-to-navigation reports (4, 21)
    Periodic = 4,
}

impl Priority {
    pub fn for_message(message_type: MessageType) -> Self {
        match message_type {
            MessageType::PositionReportScheduled
            | MessageType::PositionReportAssigned
            | MessageType::PositionReportResponse
            | MessageType::ClassBPosition => Self::High,
            MessageType::ClassBExtended => Self::Medium,
            MessageType::StaticAndVoyage | MessageType::StaticDataReport => Self::Low,
            MessageType::BaseStationReport | MessageType::AidToNavigation => Self::Periodic,
        }
    }

    pub fn value(&self) -> u8 {
        *self as u8
    }
}

/// One (target, message type) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledTransmission {
    pub message_type: MessageType,
    pub priority: Priority,
    pub interval: Duration,
    pub next_due: Duration,
    pub last_sent: Option<Duration>,
    pub send_count: u64,
}

impl ScheduledTransmission {
    pub fn new(message_type: MessageType, interval: Duration, first_due: Duration) -> Self {
        Self {
            message_type,
            priority: Priority::for_message(message_type),
            interval,
            next_due: first_due,
            last_sent: None,
            send_count: 0,
        }
    }

    pub fn is_due(&self, now: Duration) -> bool {
        now >= self.next_due
    }

    /// Record a transmission and schedule the next one from `now`
    pub fn mark_sent(&mut self, now: Duration) {
        self.last_sent = Some(now);
        self.send_count += 1;
        self.next_due = now.saturating_add(self.interval);
    }
}

/// All scheduled transmissions of one target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSchedule {
    pub mmsi: Mmsi,
    pub class: TargetClass,
    pub transmissions: BTreeMap<MessageType, ScheduledTransmission>,
}

impl TargetSchedule {
    pub fn new(mmsi: Mmsi, class: TargetClass) -> Self {
        Self {
            mmsi,
            class,
            transmissions: BTreeMap::new(),
        }
    }

    /// Add (or replace) a message type
    pub fn add(&mut self, message_type: MessageType, interval: Duration, first_due: Duration) {
        self.transmissions.insert(
            message_type,
            ScheduledTransmission::new(message_type, interval, first_due),
        );
    }

    pub fn get(&self, message_type: MessageType) -> Option<&ScheduledTransmission> {
        self.transmissions.get(&message_type)
    }

    pub fn get_mut(&mut self, message_type: MessageType) -> Option<&mut ScheduledTransmission> {
        self.transmissions.get_mut(&message_type)
    }

    /// Due transmissions of this target, in message type order
    pub fn due(&self, now: Duration) -> impl Iterator<Item = &ScheduledTransmission> {
        self.transmissions.values().filter(move |t| t.is_due(now))
    }

    /// Earliest next-due time among this target's transmissions
    pub fn next_transmission_time(&self) -> Option<Duration> {
        self.transmissions.values().map(|t| t.next_due).min()
    }

    /// Most recent transmission of any type
    pub fn last_activity(&self) -> Option<Duration> {
        self.transmissions.values().filter_map(|t| t.last_sent).max()
    }

    pub fn total_sent(&self) -> u64 {
        self.transmissions.values().map(|t| t.send_count).sum()
    }
}
