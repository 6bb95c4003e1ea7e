//! The simulation loop: move targets, ask the scheduler what is due, encode it

use std::collections::BTreeMap;
use std::time::Duration;

use ais_protocol::{
    Channel, FixQuality, GeoPosition, Gga, ModeIndicator, Mmsi, Rmc, TalkerId, UtcDateTime,
};
use ais_scheduler::{SchedulerConfig, SchedulerStatistics, TransmissionScheduler};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::ScenarioConfig;
use crate::error::SimError;
use crate::generator::{MessageGenerator, Transmission};
use crate::target::SimTarget;

const GPS_SATELLITES: u8 = 8;
const GPS_HDOP: f64 = 1.2;
const GPS_ALTITUDE_M: f64 = 0.0;
const GPS_GEOID_SEPARATION_M: f64 = 19.6;

/// Running totals for one engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub ticks: u64,
    pub ais_messages: u64,
    pub ais_sentences: u64,
    pub gps_sentences: u64,
    /// Scheduled messages that could not be generated
    pub errors: u64,
}

/// Owns every simulated target together with the scheduler and encoder
///
/// Time is simulated: it only moves when [`TrafficEngine::tick`] is called,
/// so a run is fully determined by its scenario and tick sizes.
#[derive(Debug)]
pub struct TrafficEngine {
    start: UtcDateTime,
    elapsed: Duration,
    targets: BTreeMap<Mmsi, SimTarget>,
    scheduler: TransmissionScheduler,
    generator: MessageGenerator,
    stats: EngineStats,
}

impl TrafficEngine {
    pub fn new(start: UtcDateTime, config: SchedulerConfig) -> Self {
        Self {
            start,
            elapsed: Duration::ZERO,
            targets: BTreeMap::new(),
            scheduler: TransmissionScheduler::with_config(config),
            generator: MessageGenerator::new(),
            stats: EngineStats::default(),
        }
    }

    /// Build an engine with every target of a validated scenario registered
    pub fn from_scenario(scenario: &ScenarioConfig) -> Result<Self, SimError> {
        scenario.validate()?;
        let mut engine = Self::new(scenario.start_time, scenario.scheduler.clone());
        for target in &scenario.targets {
            engine.add_target(target.clone())?;
        }
        info!(
            "Loaded scenario '{}' with {} targets",
            scenario.name,
            engine.targets.len()
        );
        Ok(engine)
    }

    /// Send every message on one channel instead of each type's default
    pub fn force_channel(&mut self, channel: Channel) {
        self.generator = MessageGenerator::with_channel(channel);
    }

    /// Register a target; its first transmissions are due at the current time
    pub fn add_target(&mut self, target: impl Into<SimTarget>) -> Result<Mmsi, SimError> {
        let target = target.into();
        let mmsi = target.mmsi();
        if !target.mmsi_matches_kind() {
            warn!(
                "MMSI {} is outside the usual range for a {}",
                mmsi,
                target.target_class()
            );
        }

        self.scheduler
            .add_target(mmsi, target.target_class(), self.elapsed)?;
        if let Some(vessel) = target.as_vessel() {
            self.scheduler
                .update_vessel_intervals(mmsi, vessel.navigation.sog)?;
        }

        debug!("Added {} {}", target.target_class(), mmsi);
        self.targets.insert(mmsi, target);
        Ok(mmsi)
    }

    pub fn remove_target(&mut self, mmsi: Mmsi) -> Option<SimTarget> {
        self.scheduler.remove_target(mmsi);
        self.targets.remove(&mmsi)
    }

    pub fn target(&self, mmsi: Mmsi) -> Option<&SimTarget> {
        self.targets.get(&mmsi)
    }

    /// Mutable access for steering a target between ticks
    ///
    /// Speed changes take effect on the reporting rate at the next tick.
    pub fn target_mut(&mut self, mmsi: Mmsi) -> Option<&mut SimTarget> {
        self.targets.get_mut(&mmsi)
    }

    pub fn targets(&self) -> impl Iterator<Item = &SimTarget> {
        self.targets.values()
    }

    /// Current simulated UTC time
    pub fn now(&self) -> UtcDateTime {
        self.start.add_duration(self.elapsed)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn scheduler(&self) -> &TransmissionScheduler {
        &self.scheduler
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn statistics(&self) -> SchedulerStatistics {
        self.scheduler.statistics()
    }

    /// Advance simulated time by `step` and return everything that became due
    ///
    /// Targets move first, so transmissions carry positions at the new time.
    /// A message that fails to generate is logged and stays due for the
    /// next tick.
    pub fn tick(&mut self, step: Duration) -> Vec<Transmission> {
        self.elapsed = self.elapsed.saturating_add(step);
        let now = self.now();

        for target in self.targets.values_mut() {
            target.advance(step, &now);
            if let SimTarget::Vessel(vessel) = target {
                if let Err(e) = self
                    .scheduler
                    .update_vessel_intervals(vessel.mmsi, vessel.navigation.sog)
                {
                    warn!("Failed to update intervals for {}: {}", vessel.mmsi, e);
                }
            }
        }

        let due = self.scheduler.get_due_messages(self.elapsed);
        let mut transmissions = Vec::with_capacity(due.len());
        for d in due {
            let Some(target) = self.targets.get(&d.mmsi) else {
                warn!("Scheduled message for unknown target {}", d.mmsi);
                self.stats.errors += 1;
                continue;
            };

            match self.generator.generate(target, d.message_type, now) {
                Ok(transmission) => {
                    if let Err(e) = self.scheduler.mark_sent(d.mmsi, d.message_type, self.elapsed)
                    {
                        warn!("Failed to mark {} type {} sent: {}", d.mmsi, d.message_type, e);
                    }
                    self.stats.ais_messages += 1;
                    self.stats.ais_sentences += transmission.sentences.len() as u64;
                    transmissions.push(transmission);
                }
                Err(e) => {
                    warn!(
                        "Failed to generate type {} for {}: {}",
                        d.message_type, d.mmsi, e
                    );
                    self.stats.errors += 1;
                }
            }
        }

        for mmsi in self.scheduler.cleanup_old_schedules(self.elapsed) {
            self.targets.remove(&mmsi);
        }

        self.stats.ticks += 1;
        transmissions
    }

    /// GGA and RMC sentences for one vessel's current fix, without terminators
    pub fn gps_sentences(&self, mmsi: Mmsi) -> Result<Vec<String>, SimError> {
        let target = self.targets.get(&mmsi).ok_or(SimError::UnknownTarget(mmsi))?;
        let vessel = target.as_vessel().ok_or(SimError::NotAVessel(mmsi))?;
        let now = self.now();
        let nav = &vessel.navigation;
        let position = GeoPosition::new(nav.position.latitude, nav.position.longitude);
        let fixed = position.is_some();

        let gga = Gga {
            talker: TalkerId::GP,
            time: Some(now.time),
            position,
            fix_quality: if fixed {
                FixQuality::Gps
            } else {
                FixQuality::Invalid
            },
            satellites: fixed.then_some(GPS_SATELLITES),
            hdop: fixed.then_some(GPS_HDOP),
            altitude_m: fixed.then_some(GPS_ALTITUDE_M),
            geoid_separation_m: fixed.then_some(GPS_GEOID_SEPARATION_M),
            ..Gga::default()
        };
        let rmc = Rmc {
            talker: TalkerId::GP,
            time: Some(now.time),
            active: fixed,
            position,
            sog_knots: Some(nav.sog).filter(|v| fixed && v.is_finite()),
            cog_deg: Some(nav.cog).filter(|v| fixed && v.is_finite()),
            date: Some(now.date),
            magnetic_variation: None,
            mode: Some(if fixed {
                ModeIndicator::Autonomous
            } else {
                ModeIndicator::NotValid
            }),
        };

        [gga.to_sentence(), rmc.to_sentence()]
            .iter()
            .map(|sentence| {
                sentence
                    .encode()
                    .map(|line| line.trim_end().to_string())
                    .map_err(SimError::from)
            })
            .collect()
    }

    /// GPS sentences for every vessel, in MMSI order
    pub fn gps_fixes(&mut self) -> Vec<String> {
        let vessels: Vec<Mmsi> = self
            .targets
            .values()
            .filter(|t| t.as_vessel().is_some())
            .map(SimTarget::mmsi)
            .collect();

        let mut sentences = Vec::new();
        for mmsi in vessels {
            match self.gps_sentences(mmsi) {
                Ok(lines) => sentences.extend(lines),
                Err(e) => {
                    warn!("Failed to generate GPS fix for {}: {}", mmsi, e);
                    self.stats.errors += 1;
                }
            }
        }
        self.stats.gps_sentences += sentences.len() as u64;
        sentences
    }
}
