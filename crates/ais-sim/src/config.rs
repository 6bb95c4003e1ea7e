//! Scenario files: start time, pacing and the targets to simulate

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use ais_protocol::{
    AidToNavigationData, AidType, BaseStationData, Dimensions, Eta, GeoPosition, Mmsi,
    NavigationData, NavigationStatus, ShipType, StaticData, UtcDateTime, VesselClass, VoyageData,
};
use ais_scheduler::{duration_from_secs, SchedulerConfig};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::SimError;
use crate::target::{AidToNavigation, BaseStation, Movement, SimTarget, Vessel};

/// A complete simulation run, usually loaded from JSON
///
/// Every field has a default, so a scenario file only needs the parts it
/// changes. An empty object runs the built-in San Francisco Bay demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    /// Simulated UTC time at tick zero
    pub start_time: UtcDateTime,
    /// Simulated seconds per tick
    pub step_secs: f64,
    /// Total simulated seconds; zero runs until interrupted
    pub duration_secs: f64,
    /// Emit GGA and RMC for every vessel this often; `None` disables GPS output
    pub gps_interval_secs: Option<f64>,
    pub scheduler: SchedulerConfig,
    pub targets: Vec<SimTarget>,
}

impl ScenarioConfig {
    /// Read and validate a JSON scenario file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, SimError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| SimError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject pacing values that cannot drive a tick loop and duplicate MMSIs
    ///
    /// An MMSI outside its kind's numbering range only logs a warning; such
    /// identities are common in test fixtures.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.step_secs.is_finite() && self.step_secs > 0.0) || self.step().is_zero() {
            return Err(SimError::Config(format!(
                "step_secs must be positive, got {}",
                self.step_secs
            )));
        }
        if !(self.duration_secs.is_finite() && self.duration_secs >= 0.0) {
            return Err(SimError::Config(format!(
                "duration_secs must be zero or positive, got {}",
                self.duration_secs
            )));
        }
        if let Some(interval) = self.gps_interval_secs {
            if !(interval.is_finite() && interval > 0.0) {
                return Err(SimError::Config(format!(
                    "gps_interval_secs must be positive, got {interval}"
                )));
            }
        }

        let mut seen = BTreeSet::new();
        for target in &self.targets {
            let mmsi = target.mmsi();
            if !mmsi.is_valid() {
                return Err(SimError::Config(format!("MMSI {mmsi} is not a 9-digit identity")));
            }
            if !seen.insert(mmsi) {
                return Err(SimError::Config(format!("duplicate MMSI {mmsi}")));
            }
            if !target.mmsi_matches_kind() {
                warn!(
                    "MMSI {} is outside the usual range for a {}",
                    mmsi,
                    target.target_class()
                );
            }
        }
        Ok(())
    }

    pub fn step(&self) -> Duration {
        duration_from_secs(self.step_secs)
    }

    /// `None` when the run has no fixed length
    pub fn duration(&self) -> Option<Duration> {
        (self.duration_secs > 0.0).then(|| duration_from_secs(self.duration_secs))
    }

    pub fn gps_interval(&self) -> Option<Duration> {
        self.gps_interval_secs.map(duration_from_secs)
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "San Francisco Bay".into(),
            start_time: UtcDateTime::default(),
            step_secs: 1.0,
            duration_secs: 600.0,
            gps_interval_secs: Some(1.0),
            scheduler: SchedulerConfig::default(),
            targets: demo_targets(),
        }
    }
}

fn demo_targets() -> Vec<SimTarget> {
    let golden_gate = GeoPosition {
        latitude: 37.8199,
        longitude: -122.4783,
    };
    let alcatraz = GeoPosition {
        latitude: 37.8267,
        longitude: -122.4230,
    };

    let freighter = Vessel::new(
        Mmsi(366_053_209),
        VesselClass::A,
        NavigationData {
            position: GeoPosition {
                latitude: 37.8000,
                longitude: -122.4000,
            },
            sog: 12.3,
            cog: 285.0,
            heading: 285,
            rot: 0,
            status: NavigationStatus::UnderWayUsingEngine,
            ..NavigationData::default()
        },
    )
    .with_static_data(StaticData {
        name: "PACIFIC TRADER".into(),
        callsign: "WDC1234".into(),
        ship_type: ShipType::CARGO,
        dimensions: Dimensions {
            to_bow: 120,
            to_stern: 30,
            to_port: 12,
            to_starboard: 13,
        },
        imo_number: Some(9_123_456),
        ..StaticData::default()
    })
    .with_voyage(VoyageData {
        destination: "OAKLAND".into(),
        eta: Eta {
            month: 1,
            day: 1,
            hour: 6,
            minute: 30,
        },
        draught: 8.5,
        dte: false,
    })
    .with_movement(Movement::Waypoints {
        points: vec![golden_gate, alcatraz],
        repeat: true,
    });

    let yacht = Vessel::new(
        Mmsi(338_123_456),
        VesselClass::B,
        NavigationData {
            position: GeoPosition {
                latitude: 37.8100,
                longitude: -122.4500,
            },
            sog: 6.5,
            cog: 90.0,
            status: NavigationStatus::UnderWaySailing,
            ..NavigationData::default()
        },
    )
    .with_static_data(StaticData {
        name: "SEA BREEZE".into(),
        callsign: "WDE5678".into(),
        ship_type: ShipType::SAILING,
        dimensions: Dimensions {
            to_bow: 8,
            to_stern: 4,
            to_port: 2,
            to_starboard: 2,
        },
        vendor_id: "SRT".into(),
        ..StaticData::default()
    })
    .with_movement(Movement::Circular {
        center: GeoPosition {
            latitude: 37.8150,
            longitude: -122.4500,
        },
        radius_m: 556.0,
        counter_clockwise: false,
    });

    let base = BaseStation {
        mmsi: Mmsi(3_669_702),
        station: BaseStationData {
            position: GeoPosition {
                latitude: 37.8080,
                longitude: -122.4660,
            },
            ..BaseStationData::default()
        },
    };

    let light = AidToNavigation {
        mmsi: Mmsi(993_672_001),
        aid: AidToNavigationData {
            aid_type: AidType::LIGHT_WITHOUT_SECTORS,
            name: "ALCATRAZ ISLAND LIGHT".into(),
            position: alcatraz,
            position_accuracy: true,
            ..AidToNavigationData::default()
        },
    };

    vec![freighter.into(), yacht.into(), base.into(), light.into()]
}
