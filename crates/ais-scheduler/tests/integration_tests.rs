//! Integration tests for the transmission scheduler
//!
//! These tests drive the scheduler the way a simulation loop does:
//! - Registering mixed fleets and draining due messages tick by tick
//! - Priority ordering across targets
//! - Speed-dependent reporting rates
//! - Cleanup of silent targets and statistics

use std::time::Duration;

use ais_protocol::{MessageType, Mmsi, VesselClass};
use ais_scheduler::{DueMessage, Priority, SchedulerConfig, TargetClass, TransmissionScheduler};

// ============================================================================
// Helper Functions
// ============================================================================

mod helpers {
    use super::*;

    pub fn at(secs: u64) -> Duration {
        Duration::from_secs(secs)
    }

    /// Mark everything due at `now` as sent and return what was sent
    pub fn drain(scheduler: &mut TransmissionScheduler, now: Duration) -> Vec<DueMessage> {
        let due = scheduler.get_due_messages(now);
        for d in &due {
            scheduler.mark_sent(d.mmsi, d.message_type, now).unwrap();
        }
        due
    }

    /// Run a one-second tick loop over `[0, until)` and return everything sent
    pub fn run(scheduler: &mut TransmissionScheduler, until: u64) -> Vec<(u64, DueMessage)> {
        let mut sent = Vec::new();
        for t in 0..until {
            for d in drain(scheduler, at(t)) {
                sent.push((t, d));
            }
        }
        sent
    }

    pub fn mixed_fleet() -> TransmissionScheduler {
        let mut scheduler = TransmissionScheduler::new();
        scheduler
            .add_vessel(Mmsi(366_000_001), VesselClass::A, Duration::ZERO)
            .unwrap();
        scheduler
            .add_vessel(Mmsi(338_000_002), VesselClass::B, Duration::ZERO)
            .unwrap();
        scheduler
            .add_base_station(Mmsi(3_669_702), Duration::ZERO)
            .unwrap();
        scheduler
            .add_aid_to_navigation(Mmsi(993_672_001), Duration::ZERO)
            .unwrap();
        scheduler
    }

    pub fn count(sent: &[(u64, DueMessage)], message_type: MessageType) -> usize {
        sent.iter()
            .filter(|(_, d)| d.message_type == message_type)
            .count()
    }
}

// ============================================================================
// Tick Loop Behavior
// ============================================================================

mod tick_loop {
    use super::*;
    use super::helpers::*;

    #[test]
    fn test_first_minute_of_mixed_fleet() {
        let mut scheduler = mixed_fleet();
        let sent = run(&mut scheduler, 60);

        // Type 1 every 2 s from t=0
        assert_eq!(count(&sent, MessageType::PositionReportScheduled), 30);
        // Type 2 every 10 s from t=10
        assert_eq!(count(&sent, MessageType::PositionReportAssigned), 5);
        // Type 3 every 20 s from t=20
        assert_eq!(count(&sent, MessageType::PositionReportResponse), 2);
        // Type 5 once at t=30
        assert_eq!(count(&sent, MessageType::StaticAndVoyage), 1);
        // Type 18 every 3 s from t=0
        assert_eq!(count(&sent, MessageType::ClassBPosition), 20);
        // Type 19 at t=15 and t=45
        assert_eq!(count(&sent, MessageType::ClassBExtended), 2);
        // Type 24 once at t=45
        assert_eq!(count(&sent, MessageType::StaticDataReport), 1);
        // Type 4 every 10 s
        assert_eq!(count(&sent, MessageType::BaseStationReport), 6);
        // Type 21 once
        assert_eq!(count(&sent, MessageType::AidToNavigation), 1);
    }

    #[test]
    fn test_each_tick_is_priority_ordered() {
        let mut scheduler = mixed_fleet();
        for t in 0..120 {
            let due = drain(&mut scheduler, at(t));
            for pair in due.windows(2) {
                assert!(pair[0].priority <= pair[1].priority, "tick {t}: {pair:?}");
            }
        }
    }

    #[test]
    fn test_late_tick_sends_once() {
        let mut scheduler = TransmissionScheduler::new();
        scheduler
            .add_vessel(Mmsi(366_000_001), VesselClass::A, Duration::ZERO)
            .unwrap();
        drain(&mut scheduler, at(0));

        // Skipping ahead does not queue a backlog
        let due = drain(&mut scheduler, at(9));
        assert_eq!(
            due.iter()
                .filter(|d| d.message_type == MessageType::PositionReportScheduled)
                .count(),
            1
        );
        let schedule = scheduler.schedule(Mmsi(366_000_001)).unwrap();
        assert_eq!(
            schedule
                .get(MessageType::PositionReportScheduled)
                .unwrap()
                .next_due,
            at(11)
        );
    }

    #[test]
    fn test_speed_changes_rate() {
        let mut scheduler = TransmissionScheduler::new();
        let mmsi = Mmsi(366_000_001);
        scheduler.add_vessel(mmsi, VesselClass::A, Duration::ZERO).unwrap();
        scheduler.update_vessel_intervals(mmsi, 5.0).unwrap();

        let slow = run(&mut scheduler, 60);
        assert_eq!(count(&slow, MessageType::PositionReportScheduled), 6);

        scheduler.update_vessel_intervals(mmsi, 30.0).unwrap();
        let mut fast = 0;
        for t in 60..120 {
            fast += drain(&mut scheduler, at(t))
                .iter()
                .filter(|d| d.message_type == MessageType::PositionReportScheduled)
                .count();
        }
        assert_eq!(fast, 30);
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;
    use super::helpers::*;

    #[test]
    fn test_statistics_after_run() {
        let mut scheduler = mixed_fleet();
        let sent = run(&mut scheduler, 60);
        let stats = scheduler.statistics();

        assert_eq!(stats.total_targets, 4);
        assert_eq!(stats.targets_of(TargetClass::ClassA), 1);
        assert_eq!(stats.targets_of(TargetClass::ClassB), 1);
        assert_eq!(stats.targets_of(TargetClass::BaseStation), 1);
        assert_eq!(stats.targets_of(TargetClass::AidToNavigation), 1);
        assert_eq!(stats.total_sent, sent.len() as u64);
        assert_eq!(stats.sent_of(MessageType::ClassBPosition), 20);
        assert_eq!(stats.message_types.len(), 9);
    }

    #[test]
    fn test_silent_target_is_cleaned_up() {
        let mut scheduler = mixed_fleet();
        drain(&mut scheduler, at(0));
        scheduler.remove_target(Mmsi(3_669_702));

        // Everyone but the class A vessel keeps transmitting
        let mut now = at(0);
        while now < at(4000) {
            now += at(10);
            let due = scheduler.get_due_messages(now);
            for d in due.iter().filter(|d| d.mmsi != Mmsi(366_000_001)) {
                scheduler.mark_sent(d.mmsi, d.message_type, now).unwrap();
            }
            scheduler.cleanup_old_schedules(now);
        }

        assert!(scheduler.schedule(Mmsi(366_000_001)).is_none());
        assert!(scheduler.schedule(Mmsi(338_000_002)).is_some());
        assert!(scheduler.schedule(Mmsi(993_672_001)).is_some());
        assert_eq!(scheduler.len(), 2);
    }

    #[test]
    fn test_config_intervals() {
        let config: SchedulerConfig = serde_json::from_str(
            r#"{ "intervals": { "base_station_secs": 5.0 }, "cleanup_interval_secs": 30.0 }"#,
        )
        .unwrap();
        let mut scheduler = TransmissionScheduler::with_config(config);
        scheduler.add_base_station(Mmsi(3_669_702), at(0)).unwrap();
        let sent = run(&mut scheduler, 30);
        assert_eq!(count(&sent, MessageType::BaseStationReport), 6);

        let schedule = scheduler.schedule(Mmsi(3_669_702)).unwrap();
        let t4 = schedule.get(MessageType::BaseStationReport).unwrap();
        assert_eq!(t4.priority, Priority::Periodic);
        assert_eq!(t4.interval, at(5));
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod proptest_tests {
    use super::*;
    use super::helpers::*;
    use proptest::prelude::*;

    fn target_class() -> impl Strategy<Value = TargetClass> {
        prop_oneof![
            Just(TargetClass::ClassA),
            Just(TargetClass::ClassB),
            Just(TargetClass::BaseStation),
            Just(TargetClass::AidToNavigation),
        ]
    }

    proptest! {
        #[test]
        fn due_messages_sorted_by_priority(
            classes in prop::collection::vec(target_class(), 1..20),
            now in 0u64..1000,
        ) {
            let mut scheduler = TransmissionScheduler::new();
            for (i, class) in classes.iter().enumerate() {
                scheduler.add_target(Mmsi(i as u32 + 1), *class, at(i as u64)).unwrap();
            }
            let due = scheduler.get_due_messages(at(now));
            for pair in due.windows(2) {
                prop_assert!(pair[0].priority <= pair[1].priority);
            }
            for d in &due {
                prop_assert!(d.due_at <= at(now));
            }
        }

        #[test]
        fn mark_sent_moves_due_one_interval(
            class in target_class(),
            sent_at in 0u64..100_000,
        ) {
            let mut scheduler = TransmissionScheduler::new();
            scheduler.add_target(Mmsi(1), class, at(0)).unwrap();
            for message_type in class.message_types() {
                scheduler.mark_sent(Mmsi(1), *message_type, at(sent_at)).unwrap();
                let t = scheduler.schedule(Mmsi(1)).unwrap().get(*message_type).unwrap().clone();
                prop_assert_eq!(t.next_due, at(sent_at) + t.interval);
                prop_assert_eq!(t.send_count, 1);
                prop_assert!(!t.is_due(at(sent_at) + t.interval - Duration::from_millis(1)));
                prop_assert!(t.is_due(at(sent_at) + t.interval));
            }
        }

        #[test]
        fn faster_never_reports_slower(a in 0.0f64..60.0, b in 0.0f64..60.0) {
            let (slow, fast) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                ais_scheduler::class_a_reporting_interval(fast)
                    <= ais_scheduler::class_a_reporting_interval(slow)
            );
            prop_assert!(
                ais_scheduler::class_b_reporting_interval(fast)
                    <= ais_scheduler::class_b_reporting_interval(slow)
            );
        }

        #[test]
        fn congestion_scale_is_bounded(n in 0usize..10_000) {
            let scheduler = TransmissionScheduler::new();
            let scaled = scheduler.congestion_scaled_intervals(n);
            let base = &scheduler.config().intervals;
            prop_assert!(scaled.position_report_secs >= base.position_report_secs);
            prop_assert!(scaled.position_report_secs <= base.position_report_secs * 2.0);
        }
    }
}
