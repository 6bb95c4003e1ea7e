//! Transmission statistics, derived on demand from scheduler state

use std::collections::BTreeMap;
use std::fmt;

use ais_protocol::MessageType;
use serde::Serialize;

use crate::state::{TargetClass, TargetSchedule};

/// Per message type totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MessageTypeStats {
    /// Targets that have this message type scheduled
    pub scheduled: usize,
    /// Transmissions of this type across all targets
    pub total_sent: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchedulerStatistics {
    pub total_targets: usize,
    pub targets_by_class: BTreeMap<TargetClass, usize>,
    pub message_types: BTreeMap<MessageType, MessageTypeStats>,
    pub total_sent: u64,
}

impl SchedulerStatistics {
    pub fn collect<'a>(schedules: impl IntoIterator<Item = &'a TargetSchedule>) -> Self {
        let mut stats = Self::default();
        for schedule in schedules {
            stats.total_targets += 1;
            *stats.targets_by_class.entry(schedule.class).or_default() += 1;
            for (message_type, transmission) in &schedule.transmissions {
                let entry = stats.message_types.entry(*message_type).or_default();
                entry.scheduled += 1;
                entry.total_sent += transmission.send_count;
                stats.total_sent += transmission.send_count;
            }
        }
        stats
    }

    pub fn targets_of(&self, class: TargetClass) -> usize {
        self.targets_by_class.get(&class).copied().unwrap_or(0)
    }

    pub fn sent_of(&self, message_type: MessageType) -> u64 {
        self.message_types
            .get(&message_type)
            .map(|s| s.total_sent)
            .unwrap_or(0)
    }
}

impl fmt::Display for SchedulerStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} targets, {} messages sent",
            self.total_targets, self.total_sent
        )?;
        for (class, count) in &self.targets_by_class {
            writeln!(f, "  {class}: {count}")?;
        }
        for (message_type, stats) in &self.message_types {
            writeln!(
                f,
                "  type {:>2} {:<45} scheduled {:>4}  sent {:>6}",
                message_type.code(),
                message_type.description(),
                stats.scheduled,
                stats.total_sent
            )?;
        }
        Ok(())
    }
}
