//! AIS data model
//!
//! Typed inputs for the message encoders. Field defaults follow the ITU
//! not-available conventions (heading 511, ROT 128, timestamp 60, ETA
//! 0/0/24/60) so a partially-filled record still encodes cleanly.

use std::fmt;

use crate::bits::sentinel;
use crate::position::GeoPosition;
use crate::time::UtcDateTime;

/// Maritime Mobile Service Identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Mmsi(pub u32);

/// Station category implied by an MMSI's numeric range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MmsiKind {
    Ship,
    CoastalStation,
    GroupShip,
    SearchRescue,
    CraftParentShip,
    NavigationAid,
    Other,
}

impl Mmsi {
    /// Largest value a 30-bit MMSI field holds
    pub const MAX: u32 = (1 << 30) - 1;

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn kind(&self) -> MmsiKind {
        match self.0 {
            1_000_000..=9_999_999 => MmsiKind::CoastalStation,
            200_000_000..=799_999_999 => MmsiKind::Ship,
            800_000_000..=899_999_999 => MmsiKind::GroupShip,
            970_000_000..=979_999_999 => MmsiKind::SearchRescue,
            980_000_000..=989_999_999 => MmsiKind::CraftParentShip,
            990_000_000..=999_999_999 => MmsiKind::NavigationAid,
            _ => MmsiKind::Other,
        }
    }

    /// Whether the value is a 9-digit identity that fits the 30-bit field
    pub fn is_valid(&self) -> bool {
        self.0 <= 999_999_999 && self.0 <= Self::MAX
    }
}

impl fmt::Display for Mmsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:09}", self.0)
    }
}

impl From<u32> for Mmsi {
    fn from(v: u32) -> Self {
        Mmsi(v)
    }
}

/// Navigational status (4-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum NavigationStatus {
    UnderWayUsingEngine = 0,
    AtAnchor = 1,
    NotUnderCommand = 2,
    RestrictedManoeuvrability = 3,
    ConstrainedByDraught = 4,
    Moored = 5,
    Aground = 6,
    EngagedInFishing = 7,
    UnderWaySailing = 8,
    Reserved9 = 9,
    Reserved10 = 10,
    TowingAstern = 11,
    PushingAhead = 12,
    Reserved13 = 13,
    AisSart = 14,
    #[default]
    NotDefined = 15,
}

impl NavigationStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Interpret the low 4 bits of `code`
    pub fn from_code(code: u8) -> Self {
        use NavigationStatus::*;
        match code & 0x0F {
            0 => UnderWayUsingEngine,
            1 => AtAnchor,
            2 => NotUnderCommand,
            3 => RestrictedManoeuvrability,
            4 => ConstrainedByDraught,
            5 => Moored,
            6 => Aground,
            7 => EngagedInFishing,
            8 => UnderWaySailing,
            9 => Reserved9,
            10 => Reserved10,
            11 => TowingAstern,
            12 => PushingAhead,
            13 => Reserved13,
            14 => AisSart,
            _ => NotDefined,
        }
    }
}

/// Electronic position fixing device (4-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum EpfdType {
    Undefined = 0,
    #[default]
    Gps = 1,
    Glonass = 2,
    CombinedGpsGlonass = 3,
    LoranC = 4,
    Chayka = 5,
    IntegratedNavigation = 6,
    Surveyed = 7,
    Galileo = 8,
    InternalGnss = 15,
}

impl EpfdType {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        use EpfdType::*;
        Some(match code {
            0 => Undefined,
            1 => Gps,
            2 => Glonass,
            3 => CombinedGpsGlonass,
            4 => LoranC,
            5 => Chayka,
            6 => IntegratedNavigation,
            7 => Surveyed,
            8 => Galileo,
            15 => InternalGnss,
            _ => return None,
        })
    }
}

/// Ship and cargo type (8-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ShipType(pub u8);

impl ShipType {
    pub const NOT_AVAILABLE: ShipType = ShipType(0);
    pub const WIG: ShipType = ShipType(20);
    pub const FISHING: ShipType = ShipType(30);
    pub const TOWING: ShipType = ShipType(31);
    pub const DREDGING: ShipType = ShipType(33);
    pub const DIVING: ShipType = ShipType(34);
    pub const MILITARY: ShipType = ShipType(35);
    pub const SAILING: ShipType = ShipType(36);
    pub const PLEASURE_CRAFT: ShipType = ShipType(37);
    pub const HIGH_SPEED_CRAFT: ShipType = ShipType(40);
    pub const PILOT_VESSEL: ShipType = ShipType(50);
    pub const SEARCH_AND_RESCUE: ShipType = ShipType(51);
    pub const TUG: ShipType = ShipType(52);
    pub const PORT_TENDER: ShipType = ShipType(53);
    pub const LAW_ENFORCEMENT: ShipType = ShipType(55);
    pub const PASSENGER: ShipType = ShipType(60);
    pub const CARGO: ShipType = ShipType(70);
    pub const TANKER: ShipType = ShipType(80);
    pub const OTHER: ShipType = ShipType(90);

    /// Broad category name
    pub fn category(&self) -> &'static str {
        match self.0 {
            0 => "Not available",
            20..=29 => "Wing in ground",
            30 => "Fishing",
            31 | 32 => "Towing",
            33 => "Dredging",
            34 => "Diving",
            35 => "Military",
            36 => "Sailing",
            37 => "Pleasure craft",
            40..=49 => "High speed craft",
            50 => "Pilot vessel",
            51 => "Search and rescue",
            52 => "Tug",
            53 => "Port tender",
            54 => "Anti-pollution",
            55 => "Law enforcement",
            58 => "Medical transport",
            60..=69 => "Passenger",
            70..=79 => "Cargo",
            80..=89 => "Tanker",
            90..=99 => "Other",
            _ => "Reserved",
        }
    }
}

/// Aid-to-navigation type (5-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct AidType(pub u8);

impl AidType {
    pub const UNSPECIFIED: AidType = AidType(0);
    pub const REFERENCE_POINT: AidType = AidType(1);
    pub const RACON: AidType = AidType(2);
    pub const FIXED_STRUCTURE: AidType = AidType(3);
    pub const LIGHT_WITHOUT_SECTORS: AidType = AidType(5);
    pub const LIGHT_WITH_SECTORS: AidType = AidType(6);
    pub const BEACON_ISOLATED_DANGER: AidType = AidType(17);
    pub const BEACON_SAFE_WATER: AidType = AidType(18);
    pub const CARDINAL_MARK_NORTH: AidType = AidType(20);
    pub const PORT_HAND_MARK: AidType = AidType(24);
    pub const STARBOARD_HAND_MARK: AidType = AidType(25);
    pub const ISOLATED_DANGER: AidType = AidType(28);
    pub const SAFE_WATER: AidType = AidType(29);
    pub const SPECIAL_MARK: AidType = AidType(30);
    pub const LIGHT_VESSEL: AidType = AidType(31);

    /// Whether the value is one of the fixed structures (1-19) rather than a floating aid
    pub fn is_fixed(&self) -> bool {
        (1..=19).contains(&self.0)
    }
}

/// Transponder class of a vessel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VesselClass {
    #[default]
    A,
    B,
}

/// Distances from the position reference point, in meters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimensions {
    pub to_bow: u16,
    pub to_stern: u16,
    pub to_port: u8,
    pub to_starboard: u8,
}

impl Dimensions {
    pub fn new(to_bow: u16, to_stern: u16, to_port: u8, to_starboard: u8) -> Self {
        Self {
            to_bow,
            to_stern,
            to_port,
            to_starboard,
        }
    }

    pub fn length(&self) -> u32 {
        u32::from(self.to_bow) + u32::from(self.to_stern)
    }

    pub fn beam(&self) -> u32 {
        u32::from(self.to_port) + u32::from(self.to_starboard)
    }
}

/// Estimated time of arrival, UTC, without a year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Eta {
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl Default for Eta {
    fn default() -> Self {
        Self::NOT_AVAILABLE
    }
}

impl Eta {
    pub const NOT_AVAILABLE: Eta = Eta {
        month: sentinel::ETA_MONTH,
        day: sentinel::ETA_DAY,
        hour: sentinel::ETA_HOUR,
        minute: sentinel::ETA_MINUTE,
    };

    pub fn from_datetime(dt: &UtcDateTime) -> Self {
        Self {
            month: dt.date.month,
            day: dt.date.day,
            hour: dt.time.hour,
            minute: dt.time.minute,
        }
    }

    pub fn is_available(&self) -> bool {
        *self != Self::NOT_AVAILABLE
    }
}

/// Dynamic navigation state reported in position messages
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct NavigationData {
    pub position: GeoPosition,
    /// Speed over ground, knots
    pub sog: f64,
    /// Course over ground, degrees
    pub cog: f64,
    /// True heading, degrees (511 = not available)
    pub heading: u16,
    pub status: NavigationStatus,
    /// Rate of turn sensor value, degrees/minute (128 = not available)
    pub rot: i32,
    /// UTC second of the fix (60 = not available)
    pub timestamp: u8,
    pub position_accuracy: bool,
    pub raim: bool,
    pub radio_status: u32,
}

impl Default for NavigationData {
    fn default() -> Self {
        Self {
            position: GeoPosition::default(),
            sog: 0.0,
            cog: 0.0,
            heading: sentinel::HEADING,
            status: NavigationStatus::default(),
            rot: sentinel::ROT,
            timestamp: sentinel::TIMESTAMP,
            position_accuracy: false,
            raim: false,
            radio_status: 0,
        }
    }
}

/// Identity and hull data that rarely changes
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct StaticData {
    pub name: String,
    pub callsign: String,
    pub ship_type: ShipType,
    pub dimensions: Dimensions,
    pub epfd: EpfdType,
    pub imo_number: Option<u32>,
    /// Manufacturer id carried in type 24 part B (3 characters)
    pub vendor_id: String,
    pub unit_model: u8,
    pub serial_number: u32,
}

/// Per-voyage data carried in type 5
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct VoyageData {
    pub destination: String,
    pub eta: Eta,
    /// Maximum present static draught, meters
    pub draught: f64,
    /// Data terminal equipment not ready
    pub dte: bool,
}

impl Default for VoyageData {
    fn default() -> Self {
        Self {
            destination: String::new(),
            eta: Eta::NOT_AVAILABLE,
            draught: 0.0,
            dte: true,
        }
    }
}

/// Base station report contents (type 4)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct BaseStationData {
    pub position: GeoPosition,
    pub timestamp: UtcDateTime,
    pub epfd: EpfdType,
    pub position_accuracy: bool,
    pub raim: bool,
    pub radio_status: u32,
}

impl Default for BaseStationData {
    fn default() -> Self {
        Self {
            position: GeoPosition::default(),
            timestamp: UtcDateTime::default(),
            epfd: EpfdType::Surveyed,
            position_accuracy: true,
            raim: false,
            radio_status: 0,
        }
    }
}

/// Aid-to-navigation report contents (type 21)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct AidToNavigationData {
    pub aid_type: AidType,
    /// Up to 34 characters; the part past 20 goes in the name extension
    pub name: String,
    pub position: GeoPosition,
    pub position_accuracy: bool,
    pub dimensions: Dimensions,
    pub epfd: EpfdType,
    pub timestamp: u8,
    pub off_position: bool,
    pub regional: u8,
    pub raim: bool,
    pub virtual_aid: bool,
    pub assigned: bool,
}

impl Default for AidToNavigationData {
    fn default() -> Self {
        Self {
            aid_type: AidType::UNSPECIFIED,
            name: String::new(),
            position: GeoPosition::default(),
            position_accuracy: false,
            dimensions: Dimensions::default(),
            epfd: EpfdType::Surveyed,
            timestamp: sentinel::TIMESTAMP,
            off_position: false,
            regional: 0,
            raim: false,
            virtual_aid: false,
            assigned: false,
        }
    }
}
