//! Transmission scheduler
//!
//! Tracks when every registered target next owes each of its message types
//! and hands out due transmissions in priority order. The scheduler keeps no
//! timers of its own; the caller drives it with the current simulated time.

use std::collections::BTreeMap;
use std::time::Duration;

use ais_protocol::{MessageType, Mmsi, VesselClass};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ScheduleError;
use crate::state::{Priority, TargetClass, TargetSchedule};
use crate::stats::SchedulerStatistics;

/// First type 5 goes out this long after registration
const STATIC_VOYAGE_DELAY: Duration = Duration::from_secs(30);
const ASSIGNED_REPORT_DELAY: Duration = Duration::from_secs(10);
const RESPONSE_REPORT_DELAY: Duration = Duration::from_secs(20);
const CLASS_B_EXTENDED_DELAY: Duration = Duration::from_secs(15);
const STATIC_DATA_DELAY: Duration = Duration::from_secs(45);

const ASSIGNED_REPORT_FACTOR: u32 = 5;
const RESPONSE_REPORT_FACTOR: u32 = 10;

/// Above this many targets the base intervals are stretched
const CONGESTION_THRESHOLD: usize = 100;
const MAX_CONGESTION_SCALE: f64 = 2.0;

/// Seconds to a `Duration`; negative and NaN become zero
pub fn duration_from_secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value.max(0.0)).unwrap_or(Duration::MAX)
}

/// Base reporting interval per message type, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageIntervals {
    /// Types 1, 2 and 3
    pub position_report_secs: f64,
    pub base_station_secs: f64,
    pub static_voyage_secs: f64,
    pub class_b_position_secs: f64,
    pub class_b_extended_secs: f64,
    pub aid_to_navigation_secs: f64,
    pub static_data_secs: f64,
}

impl Default for MessageIntervals {
    fn default() -> Self {
        Self {
            position_report_secs: 2.0,
            base_station_secs: 10.0,
            static_voyage_secs: 360.0,
            class_b_position_secs: 3.0,
            class_b_extended_secs: 30.0,
            aid_to_navigation_secs: 180.0,
            static_data_secs: 360.0,
        }
    }
}

impl MessageIntervals {
    pub fn base(&self, message_type: MessageType) -> Duration {
        duration_from_secs(match message_type {
            MessageType::PositionReportScheduled
            | MessageType::PositionReportAssigned
            | MessageType::PositionReportResponse => self.position_report_secs,
            MessageType::BaseStationReport => self.base_station_secs,
            MessageType::StaticAndVoyage => self.static_voyage_secs,
            MessageType::ClassBPosition => self.class_b_position_secs,
            MessageType::ClassBExtended => self.class_b_extended_secs,
            MessageType::AidToNavigation => self.aid_to_navigation_secs,
            MessageType::StaticDataReport => self.static_data_secs,
        })
    }

    /// Every interval multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            position_report_secs: self.position_report_secs * factor,
            base_station_secs: self.base_station_secs * factor,
            static_voyage_secs: self.static_voyage_secs * factor,
            class_b_position_secs: self.class_b_position_secs * factor,
            class_b_extended_secs: self.class_b_extended_secs * factor,
            aid_to_navigation_secs: self.aid_to_navigation_secs * factor,
            static_data_secs: self.static_data_secs * factor,
        }
    }

    /// Intervals stretched by `min(2, n / 100)` once more than 100 targets share the channel
    pub fn congestion_scaled(&self, target_count: usize) -> Self {
        if target_count <= CONGESTION_THRESHOLD {
            return self.clone();
        }
        let factor = (target_count as f64 / CONGESTION_THRESHOLD as f64).min(MAX_CONGESTION_SCALE);
        self.scaled(factor)
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minimum simulated time between cleanup passes
    pub cleanup_interval_secs: f64,
    /// Targets silent for longer than this are dropped by cleanup
    pub inactivity_threshold_secs: f64,
    pub intervals: MessageIntervals,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            cleanup_interval_secs: 300.0,
            inactivity_threshold_secs: 3600.0,
            intervals: MessageIntervals::default(),
        }
    }
}

/// A transmission that is owed now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueMessage {
    pub mmsi: Mmsi,
    pub message_type: MessageType,
    pub priority: Priority,
    /// When it became due
    pub due_at: Duration,
}

/// Class A position report interval for a speed over ground
pub fn class_a_reporting_interval(speed_knots: f64) -> Duration {
    if speed_knots > 23.0 {
        Duration::from_secs(2)
    } else if speed_knots > 14.0 {
        Duration::from_secs(6)
    } else {
        Duration::from_secs(10)
    }
}

/// Class B position report interval for a speed over ground
pub fn class_b_reporting_interval(speed_knots: f64) -> Duration {
    if speed_knots > 14.0 {
        Duration::from_secs(5)
    } else if speed_knots > 2.0 {
        Duration::from_secs(30)
    } else {
        Duration::from_secs(180)
    }
}

/// Schedules AIS transmissions for many targets
#[derive(Debug, Clone)]
pub struct TransmissionScheduler {
    config: SchedulerConfig,
    targets: BTreeMap<Mmsi, TargetSchedule>,
    last_cleanup: Duration,
}

impl TransmissionScheduler {
    /// Create a new scheduler with default configuration
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            targets: BTreeMap::new(),
            last_cleanup: Duration::ZERO,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Register a target, scheduling every message type its class transmits
    ///
    /// The primary report is due at `start`; the others follow at fixed
    /// offsets so a fleet registered together does not burst.
    pub fn add_target(
        &mut self,
        mmsi: Mmsi,
        class: TargetClass,
        start: Duration,
    ) -> Result<(), ScheduleError> {
        if self.targets.contains_key(&mmsi) {
            return Err(ScheduleError::TargetExists(mmsi));
        }

        let intervals = &self.config.intervals;
        let mut schedule = TargetSchedule::new(mmsi, class);
        match class {
            TargetClass::ClassA => {
                let position = intervals.base(MessageType::PositionReportScheduled);
                schedule.add(MessageType::PositionReportScheduled, position, start);
                schedule.add(
                    MessageType::StaticAndVoyage,
                    intervals.base(MessageType::StaticAndVoyage),
                    start + STATIC_VOYAGE_DELAY,
                );
                schedule.add(
                    MessageType::PositionReportAssigned,
                    intervals
                        .base(MessageType::PositionReportAssigned)
                        .saturating_mul(ASSIGNED_REPORT_FACTOR),
                    start + ASSIGNED_REPORT_DELAY,
                );
                schedule.add(
                    MessageType::PositionReportResponse,
                    intervals
                        .base(MessageType::PositionReportResponse)
                        .saturating_mul(RESPONSE_REPORT_FACTOR),
                    start + RESPONSE_REPORT_DELAY,
                );
            }
            TargetClass::ClassB => {
                schedule.add(
                    MessageType::ClassBPosition,
                    intervals.base(MessageType::ClassBPosition),
                    start,
                );
                schedule.add(
                    MessageType::ClassBExtended,
                    intervals.base(MessageType::ClassBExtended),
                    start + CLASS_B_EXTENDED_DELAY,
                );
                schedule.add(
                    MessageType::StaticDataReport,
                    intervals.base(MessageType::StaticDataReport),
                    start + STATIC_DATA_DELAY,
                );
            }
            TargetClass::BaseStation => {
                schedule.add(
                    MessageType::BaseStationReport,
                    intervals.base(MessageType::BaseStationReport),
                    start,
                );
            }
            TargetClass::AidToNavigation => {
                schedule.add(
                    MessageType::AidToNavigation,
                    intervals.base(MessageType::AidToNavigation),
                    start,
                );
            }
        }

        info!(
            "Registered {} target {} ({} message types)",
            class,
            mmsi,
            schedule.transmissions.len()
        );
        self.targets.insert(mmsi, schedule);
        Ok(())
    }

    pub fn add_vessel(
        &mut self,
        mmsi: Mmsi,
        class: VesselClass,
        start: Duration,
    ) -> Result<(), ScheduleError> {
        self.add_target(mmsi, class.into(), start)
    }

    pub fn add_base_station(&mut self, mmsi: Mmsi, start: Duration) -> Result<(), ScheduleError> {
        self.add_target(mmsi, TargetClass::BaseStation, start)
    }

    pub fn add_aid_to_navigation(
        &mut self,
        mmsi: Mmsi,
        start: Duration,
    ) -> Result<(), ScheduleError> {
        self.add_target(mmsi, TargetClass::AidToNavigation, start)
    }

    /// Remove a target and all its schedules
    pub fn remove_target(&mut self, mmsi: Mmsi) -> Option<TargetSchedule> {
        let removed = self.targets.remove(&mmsi)?;
        info!("Removed target {}", mmsi);
        Some(removed)
    }

    pub fn schedule(&self, mmsi: Mmsi) -> Option<&TargetSchedule> {
        self.targets.get(&mmsi)
    }

    pub fn targets(&self) -> impl Iterator<Item = &TargetSchedule> {
        self.targets.values()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Every transmission due at `now`
    ///
    /// Ordered by priority, then by how long it has been due, then by MMSI
    /// and message type.
    pub fn get_due_messages(&self, now: Duration) -> Vec<DueMessage> {
        let mut due: Vec<DueMessage> = self
            .targets
            .values()
            .flat_map(|schedule| {
                schedule.due(now).map(move |t| DueMessage {
                    mmsi: schedule.mmsi,
                    message_type: t.message_type,
                    priority: t.priority,
                    due_at: t.next_due,
                })
            })
            .collect();
        due.sort_by_key(|d| (d.priority, d.due_at, d.mmsi, d.message_type));
        due
    }

    /// Record a transmission at `now`; the next one falls due one interval later
    pub fn mark_sent(
        &mut self,
        mmsi: Mmsi,
        message_type: MessageType,
        now: Duration,
    ) -> Result<(), ScheduleError> {
        let transmission = self
            .targets
            .get_mut(&mmsi)
            .ok_or(ScheduleError::TargetNotFound(mmsi))?
            .get_mut(message_type)
            .ok_or(ScheduleError::MessageNotScheduled { mmsi, message_type })?;
        transmission.mark_sent(now);
        debug!(
            mmsi = %mmsi,
            message_type = message_type.code(),
            count = transmission.send_count,
            next_due_secs = transmission.next_due.as_secs_f64(),
            "Marked sent"
        );
        Ok(())
    }

    /// Earliest next-due time across all targets
    pub fn next_transmission_time(&self) -> Option<Duration> {
        self.targets
            .values()
            .filter_map(TargetSchedule::next_transmission_time)
            .min()
    }

    /// Recompute position report intervals from a newly observed speed
    ///
    /// Only the interval changes; the already scheduled next-due time stands.
    pub fn update_vessel_intervals(
        &mut self,
        mmsi: Mmsi,
        speed_knots: f64,
    ) -> Result<(), ScheduleError> {
        let schedule = self
            .targets
            .get_mut(&mmsi)
            .ok_or(ScheduleError::TargetNotFound(mmsi))?;

        if let Some(t) = schedule.get_mut(MessageType::PositionReportScheduled) {
            t.interval = class_a_reporting_interval(speed_knots);
        }
        if let Some(t) = schedule.get_mut(MessageType::ClassBPosition) {
            t.interval = class_b_reporting_interval(speed_knots);
        }
        Ok(())
    }

    pub fn set_custom_interval(
        &mut self,
        mmsi: Mmsi,
        message_type: MessageType,
        interval: Duration,
    ) -> Result<(), ScheduleError> {
        let transmission = self
            .targets
            .get_mut(&mmsi)
            .ok_or(ScheduleError::TargetNotFound(mmsi))?
            .get_mut(message_type)
            .ok_or(ScheduleError::MessageNotScheduled { mmsi, message_type })?;
        transmission.interval = interval;
        Ok(())
    }

    /// Drop targets that have been silent past the inactivity threshold
    ///
    /// Runs at most once per cleanup interval; calls in between return
    /// nothing. Targets that never transmitted are kept.
    pub fn cleanup_old_schedules(&mut self, now: Duration) -> Vec<Mmsi> {
        let interval = duration_from_secs(self.config.cleanup_interval_secs);
        if now.saturating_sub(self.last_cleanup) < interval {
            return Vec::new();
        }
        self.last_cleanup = now;

        let threshold = duration_from_secs(self.config.inactivity_threshold_secs);
        let inactive: Vec<Mmsi> = self
            .targets
            .values()
            .filter(|s| {
                s.last_activity()
                    .is_some_and(|last| now.saturating_sub(last) > threshold)
            })
            .map(|s| s.mmsi)
            .collect();

        for mmsi in &inactive {
            self.targets.remove(mmsi);
            info!("Cleaned up inactive target {}", mmsi);
        }
        inactive
    }

    pub fn statistics(&self) -> SchedulerStatistics {
        SchedulerStatistics::collect(self.targets.values())
    }

    /// Base intervals adjusted for `target_count` targets sharing the channel
    pub fn congestion_scaled_intervals(&self, target_count: usize) -> MessageIntervals {
        self.config.intervals.congestion_scaled(target_count)
    }
}

impl Default for TransmissionScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VESSEL: Mmsi = Mmsi(366_053_209);

    fn at(secs: u64) -> Duration {
        Duration::from_secs(secs)
    }

    #[test]
    fn test_class_a_registration() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_target(VESSEL, TargetClass::ClassA, at(100)).unwrap();

        let s = scheduler.schedule(VESSEL).unwrap();
        let t1 = s.get(MessageType::PositionReportScheduled).unwrap();
        assert_eq!((t1.next_due, t1.interval), (at(100), at(2)));
        let t5 = s.get(MessageType::StaticAndVoyage).unwrap();
        assert_eq!((t5.next_due, t5.interval), (at(130), at(360)));
        let t2 = s.get(MessageType::PositionReportAssigned).unwrap();
        assert_eq!((t2.next_due, t2.interval), (at(110), at(10)));
        let t3 = s.get(MessageType::PositionReportResponse).unwrap();
        assert_eq!((t3.next_due, t3.interval), (at(120), at(20)));
    }

    #[test]
    fn test_class_b_registration() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_vessel(VESSEL, VesselClass::B, at(0)).unwrap();

        let s = scheduler.schedule(VESSEL).unwrap();
        assert_eq!(s.class, TargetClass::ClassB);
        assert_eq!(s.get(MessageType::ClassBPosition).unwrap().next_due, at(0));
        assert_eq!(s.get(MessageType::ClassBExtended).unwrap().next_due, at(15));
        assert_eq!(s.get(MessageType::StaticDataReport).unwrap().next_due, at(45));
        assert!(s.get(MessageType::PositionReportScheduled).is_none());
    }

    #[test]
    fn test_stations() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_base_station(Mmsi(3_669_702), at(0)).unwrap();
        scheduler.add_aid_to_navigation(Mmsi(993_672_001), at(0)).unwrap();

        let base = scheduler.schedule(Mmsi(3_669_702)).unwrap();
        assert_eq!(base.transmissions.len(), 1);
        assert_eq!(base.get(MessageType::BaseStationReport).unwrap().interval, at(10));
        let aton = scheduler.schedule(Mmsi(993_672_001)).unwrap();
        assert_eq!(aton.get(MessageType::AidToNavigation).unwrap().interval, at(180));
    }

    #[test]
    fn test_duplicate_target() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_target(VESSEL, TargetClass::ClassA, at(0)).unwrap();
        assert_eq!(
            scheduler.add_target(VESSEL, TargetClass::ClassB, at(0)),
            Err(ScheduleError::TargetExists(VESSEL))
        );
    }

    #[test]
    fn test_due_at_boundary() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_target(VESSEL, TargetClass::ClassA, at(0)).unwrap();
        scheduler
            .mark_sent(VESSEL, MessageType::PositionReportScheduled, at(0))
            .unwrap();

        assert!(scheduler.get_due_messages(Duration::from_millis(1900)).is_empty());
        let due = scheduler.get_due_messages(at(2));
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].message_type, MessageType::PositionReportScheduled);
    }

    #[test]
    fn test_due_ordered_by_priority() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_target(Mmsi(1), TargetClass::AidToNavigation, at(0)).unwrap();
        scheduler.add_target(Mmsi(2), TargetClass::ClassB, at(0)).unwrap();
        scheduler.add_target(Mmsi(3), TargetClass::ClassA, at(0)).unwrap();

        let due = scheduler.get_due_messages(at(60));
        let priorities: Vec<u8> = due.iter().map(|d| d.priority.value()).collect();
        let mut sorted = priorities.clone();
        sorted.sort();
        assert_eq!(priorities, sorted);
        assert_eq!(due.first().unwrap().priority, Priority::High);
        assert_eq!(due.last().unwrap().message_type, MessageType::AidToNavigation);
    }

    #[test]
    fn test_mark_sent_errors() {
        let mut scheduler = TransmissionScheduler::new();
        assert_eq!(
            scheduler.mark_sent(VESSEL, MessageType::ClassBPosition, at(0)),
            Err(ScheduleError::TargetNotFound(VESSEL))
        );
        scheduler.add_target(VESSEL, TargetClass::ClassA, at(0)).unwrap();
        assert_eq!(
            scheduler.mark_sent(VESSEL, MessageType::ClassBPosition, at(0)),
            Err(ScheduleError::MessageNotScheduled {
                mmsi: VESSEL,
                message_type: MessageType::ClassBPosition
            })
        );
    }

    #[test]
    fn test_speed_intervals() {
        assert_eq!(class_a_reporting_interval(30.0), at(2));
        assert_eq!(class_a_reporting_interval(23.0), at(6));
        assert_eq!(class_a_reporting_interval(14.5), at(6));
        assert_eq!(class_a_reporting_interval(5.0), at(10));
        assert_eq!(class_a_reporting_interval(0.0), at(10));
        assert_eq!(class_b_reporting_interval(15.0), at(5));
        assert_eq!(class_b_reporting_interval(14.0), at(30));
        assert_eq!(class_b_reporting_interval(2.0), at(180));
    }

    #[test]
    fn test_update_vessel_intervals() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_target(VESSEL, TargetClass::ClassA, at(0)).unwrap();

        scheduler.update_vessel_intervals(VESSEL, 30.0).unwrap();
        let s = scheduler.schedule(VESSEL).unwrap();
        assert_eq!(s.get(MessageType::PositionReportScheduled).unwrap().interval, at(2));

        scheduler.update_vessel_intervals(VESSEL, 5.0).unwrap();
        let s = scheduler.schedule(VESSEL).unwrap();
        assert_eq!(s.get(MessageType::PositionReportScheduled).unwrap().interval, at(10));
        // Secondary reports keep their registration intervals
        assert_eq!(s.get(MessageType::PositionReportAssigned).unwrap().interval, at(10));

        assert_eq!(
            scheduler.update_vessel_intervals(Mmsi(1), 5.0),
            Err(ScheduleError::TargetNotFound(Mmsi(1)))
        );
    }

    #[test]
    fn test_cleanup() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_target(Mmsi(1), TargetClass::ClassA, at(0)).unwrap();
        scheduler.add_target(Mmsi(2), TargetClass::ClassA, at(0)).unwrap();
        scheduler.add_target(Mmsi(3), TargetClass::ClassA, at(0)).unwrap();
        scheduler
            .mark_sent(Mmsi(1), MessageType::PositionReportScheduled, at(0))
            .unwrap();
        scheduler
            .mark_sent(Mmsi(2), MessageType::PositionReportScheduled, at(3500))
            .unwrap();

        // Too early for a cleanup pass
        assert!(scheduler.cleanup_old_schedules(at(200)).is_empty());

        let removed = scheduler.cleanup_old_schedules(at(3700));
        assert_eq!(removed, vec![Mmsi(1)]);
        assert!(scheduler.schedule(Mmsi(2)).is_some());
        // Never transmitted
        assert!(scheduler.schedule(Mmsi(3)).is_some());

        // Within five minutes of the last pass
        assert!(scheduler.cleanup_old_schedules(at(3800)).is_empty());
        assert_eq!(scheduler.cleanup_old_schedules(at(7200)), vec![Mmsi(2)]);
    }

    #[test]
    fn test_next_transmission_time() {
        let mut scheduler = TransmissionScheduler::new();
        assert_eq!(scheduler.next_transmission_time(), None);
        scheduler.add_target(Mmsi(1), TargetClass::AidToNavigation, at(50)).unwrap();
        scheduler.add_target(Mmsi(2), TargetClass::BaseStation, at(20)).unwrap();
        assert_eq!(scheduler.next_transmission_time(), Some(at(20)));
    }

    #[test]
    fn test_custom_interval() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_target(VESSEL, TargetClass::ClassB, at(0)).unwrap();
        scheduler
            .set_custom_interval(VESSEL, MessageType::StaticDataReport, at(60))
            .unwrap();
        scheduler
            .mark_sent(VESSEL, MessageType::StaticDataReport, at(45))
            .unwrap();
        let s = scheduler.schedule(VESSEL).unwrap();
        assert_eq!(s.get(MessageType::StaticDataReport).unwrap().next_due, at(105));
    }

    #[test]
    fn test_congestion_scaling() {
        let scheduler = TransmissionScheduler::new();
        assert_eq!(
            scheduler.congestion_scaled_intervals(100),
            MessageIntervals::default()
        );
        let scaled = scheduler.congestion_scaled_intervals(150);
        assert_eq!(scaled.position_report_secs, 3.0);
        assert_eq!(scaled.static_voyage_secs, 540.0);
        let capped = scheduler.congestion_scaled_intervals(10_000);
        assert_eq!(capped.class_b_position_secs, 6.0);
    }

    #[test]
    fn test_remove_target() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler.add_target(VESSEL, TargetClass::ClassA, at(0)).unwrap();
        assert!(scheduler.remove_target(VESSEL).is_some());
        assert!(scheduler.remove_target(VESSEL).is_none());
        assert!(scheduler.is_empty());
        assert!(scheduler.get_due_messages(at(1000)).is_empty());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: SchedulerConfig =
            serde_json::from_str(r#"{"cleanup_interval_secs": 60.0}"#).unwrap();
        assert_eq!(config.cleanup_interval_secs, 60.0);
        assert_eq!(config.inactivity_threshold_secs, 3600.0);
    }

    #[test]
    fn test_duration_from_secs_clamps() {
        assert_eq!(duration_from_secs(-5.0), Duration::ZERO);
        assert_eq!(duration_from_secs(f64::NAN), Duration::ZERO);
        assert_eq!(duration_from_secs(1.5), Duration::from_millis(1500));
    }
}
