//! Simulated stations and their kinematics

use std::time::Duration;

use ais_protocol::bits::sentinel;
use ais_protocol::position::METERS_PER_NM;
use ais_protocol::{
    AidToNavigationData, BaseStationData, GeoPosition, Mmsi, MmsiKind, NavigationData,
    StaticData, UtcDateTime, VesselClass, VoyageData,
};
use ais_scheduler::TargetClass;
use serde::{Deserialize, Serialize};

/// Turn rates past this already saturate the ROT indicator
const MAX_ROT_DEG_PER_MIN: f64 = 720.0;

/// How a vessel moves between ticks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "pattern", rename_all = "snake_case")]
pub enum Movement {
    /// Moored or anchored; the position never changes
    Stationary,
    /// Dead reckoning along the current course and speed
    #[default]
    Linear,
    /// Orbit `center` at the current speed
    Circular {
        center: GeoPosition,
        radius_m: f64,
        #[serde(default)]
        counter_clockwise: bool,
    },
    /// Steer for each waypoint in turn, stopping at the last unless `repeat`
    Waypoints {
        points: Vec<GeoPosition>,
        #[serde(default)]
        repeat: bool,
    },
}

/// A class A or class B vessel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub mmsi: Mmsi,
    #[serde(default)]
    pub class: VesselClass,
    #[serde(default)]
    pub static_data: StaticData,
    #[serde(default)]
    pub voyage: VoyageData,
    #[serde(default)]
    pub navigation: NavigationData,
    #[serde(default)]
    pub movement: Movement,
    #[serde(skip)]
    next_waypoint: usize,
}

impl Vessel {
    pub fn new(mmsi: Mmsi, class: VesselClass, navigation: NavigationData) -> Self {
        Self {
            mmsi,
            class,
            static_data: StaticData::default(),
            voyage: VoyageData::default(),
            navigation,
            movement: Movement::default(),
            next_waypoint: 0,
        }
    }

    pub fn with_static_data(mut self, static_data: StaticData) -> Self {
        self.static_data = static_data;
        self
    }

    pub fn with_voyage(mut self, voyage: VoyageData) -> Self {
        self.voyage = voyage;
        self
    }

    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movement = movement;
        self.next_waypoint = 0;
        self
    }

    /// Index of the waypoint currently steered for
    pub fn next_waypoint(&self) -> usize {
        self.next_waypoint
    }

    /// Move the vessel forward by `dt` and stamp the fix with `now`
    pub fn advance(&mut self, dt: Duration, now: &UtcDateTime) {
        let Self {
            navigation: nav,
            movement,
            next_waypoint,
            ..
        } = self;

        nav.timestamp = now.time.second;
        let secs = dt.as_secs_f64();
        if secs <= 0.0 {
            return;
        }
        if GeoPosition::new(nav.position.latitude, nav.position.longitude).is_none() {
            // No fix to reckon from
            return;
        }

        let previous_cog = nav.cog;
        // 102.3 kn means speed not available
        let speed = if nav.sog.is_finite() && nav.sog < sentinel::SOG_KNOTS {
            nav.sog.max(0.0)
        } else {
            0.0
        };
        let distance = speed * METERS_PER_NM / 3600.0 * secs;

        match movement {
            Movement::Stationary => {}
            Movement::Linear => {
                nav.position = nav.position.destination(nav.cog, distance);
            }
            Movement::Circular {
                center,
                radius_m,
                counter_clockwise,
            } => {
                if *radius_m > 0.0 {
                    let sweep = (distance / *radius_m).to_degrees();
                    let bearing = center.bearing_to(&nav.position);
                    let (bearing, course) = if *counter_clockwise {
                        (bearing - sweep, bearing - sweep - 90.0)
                    } else {
                        (bearing + sweep, bearing + sweep + 90.0)
                    };
                    nav.position = center.destination(bearing.rem_euclid(360.0), *radius_m);
                    nav.cog = course.rem_euclid(360.0);
                }
            }
            Movement::Waypoints { points, repeat } => {
                follow_waypoints(nav, points, *repeat, next_waypoint, distance);
            }
        }

        if nav.heading != sentinel::HEADING && speed > 0.0 {
            nav.heading = (nav.cog.round() as u16) % 360;
        }
        if nav.rot != sentinel::ROT {
            let turned = (nav.cog - previous_cog + 540.0).rem_euclid(360.0) - 180.0;
            nav.rot = (turned / secs * 60.0)
                .round()
                .clamp(-MAX_ROT_DEG_PER_MIN, MAX_ROT_DEG_PER_MIN) as i32;
        }
    }
}

fn follow_waypoints(
    nav: &mut NavigationData,
    points: &[GeoPosition],
    repeat: bool,
    next: &mut usize,
    mut distance: f64,
) {
    // Each pass either stops short of a waypoint or consumes one
    for _ in 0..=points.len() {
        let Some(target) = points.get(*next) else {
            nav.sog = 0.0;
            return;
        };
        let remaining = nav.position.distance_to(target);
        if remaining > distance {
            nav.cog = nav.position.bearing_to(target);
            nav.position = nav.position.destination(nav.cog, distance);
            return;
        }

        if remaining > 0.0 {
            nav.cog = nav.position.bearing_to(target);
        }
        nav.position = *target;
        distance -= remaining;
        *next += 1;
        if *next >= points.len() {
            if repeat && points.len() > 1 {
                *next = 0;
            } else {
                nav.sog = 0.0;
                return;
            }
        }
    }
}

/// A fixed AIS base station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseStation {
    pub mmsi: Mmsi,
    #[serde(default)]
    pub station: BaseStationData,
}

/// A physical or virtual aid to navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AidToNavigation {
    pub mmsi: Mmsi,
    #[serde(default)]
    pub aid: AidToNavigationData,
}

/// Anything the simulation transmits for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimTarget {
    Vessel(Vessel),
    BaseStation(BaseStation),
    AidToNavigation(AidToNavigation),
}

impl SimTarget {
    pub fn mmsi(&self) -> Mmsi {
        match self {
            SimTarget::Vessel(v) => v.mmsi,
            SimTarget::BaseStation(b) => b.mmsi,
            SimTarget::AidToNavigation(a) => a.mmsi,
        }
    }

    pub fn target_class(&self) -> TargetClass {
        match self {
            SimTarget::Vessel(v) => v.class.into(),
            SimTarget::BaseStation(_) => TargetClass::BaseStation,
            SimTarget::AidToNavigation(_) => TargetClass::AidToNavigation,
        }
    }

    pub fn position(&self) -> GeoPosition {
        match self {
            SimTarget::Vessel(v) => v.navigation.position,
            SimTarget::BaseStation(b) => b.station.position,
            SimTarget::AidToNavigation(a) => a.aid.position,
        }
    }

    pub fn as_vessel(&self) -> Option<&Vessel> {
        match self {
            SimTarget::Vessel(v) => Some(v),
            _ => None,
        }
    }

    /// Whether the MMSI lies in the numbering range for this kind of station
    pub fn mmsi_matches_kind(&self) -> bool {
        let expected = match self {
            SimTarget::Vessel(_) => MmsiKind::Ship,
            SimTarget::BaseStation(_) => MmsiKind::CoastalStation,
            SimTarget::AidToNavigation(_) => MmsiKind::NavigationAid,
        };
        self.mmsi().kind() == expected
    }

    /// Advance by `dt`, ending at simulated time `now`
    pub fn advance(&mut self, dt: Duration, now: &UtcDateTime) {
        match self {
            SimTarget::Vessel(v) => v.advance(dt, now),
            SimTarget::BaseStation(b) => b.station.timestamp = *now,
            SimTarget::AidToNavigation(a) => a.aid.timestamp = now.time.second,
        }
    }
}

impl From<Vessel> for SimTarget {
    fn from(v: Vessel) -> Self {
        SimTarget::Vessel(v)
    }
}

impl From<BaseStation> for SimTarget {
    fn from(b: BaseStation) -> Self {
        SimTarget::BaseStation(b)
    }
}

impl From<AidToNavigation> for SimTarget {
    fn from(a: AidToNavigation) -> Self {
        SimTarget::AidToNavigation(a)
    }
}
