//! AIS Message Encoder
//!
//! One variant per supported message layout. Every encoding is a fixed,
//! ordered list of fields: 6-bit message type, 2-bit repeat indicator and
//! 30-bit MMSI first, then the type-specific body.
//!
//! | Type | Bits | Contents |
//! |------|------|----------|
//! | 1/2/3 | 168 | Class A position report |
//! | 4 | 168 | Base station report |
//! | 5 | 424 | Static and voyage data |
//! | 18 | 168 | Class B position report |
//! | 19 | 312 | Extended Class B report |
//! | 21 | 272+ | Aid-to-navigation report (byte aligned) |
//! | 24 | 168 | Static data report, part A or B |

use std::fmt;

use tracing::debug;

use crate::aivdm::Channel;
use crate::bits::{
    cog_raw, decode_cog, decode_heading, decode_latitude, decode_longitude, decode_sog,
    draught_raw, heading_raw, latitude_raw, longitude_raw, rot_raw, sentinel, sog_raw, BitBuffer,
};
use crate::error::ProtocolError;
use crate::position::GeoPosition;
use crate::trace::{InputTrace, TraceValue};
use crate::types::{
    AidToNavigationData, BaseStationData, Dimensions, Mmsi, NavigationData, StaticData,
    VoyageData,
};

/// Most extra name characters a type 21 report carries
pub const AID_NAME_EXTENSION_CHARS: usize = 14;

/// Supported AIS message type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum MessageType {
    PositionReportScheduled = 1,
    PositionReportAssigned = 2,
    PositionReportResponse = 3,
    BaseStationReport = 4,
    StaticAndVoyage = 5,
    ClassBPosition = 18,
    ClassBExtended = 19,
    AidToNavigation = 21,
    StaticDataReport = 24,
}

impl MessageType {
    pub const ALL: [MessageType; 9] = [
        MessageType::PositionReportScheduled,
        MessageType::PositionReportAssigned,
        MessageType::PositionReportResponse,
        MessageType::BaseStationReport,
        MessageType::StaticAndVoyage,
        MessageType::ClassBPosition,
        MessageType::ClassBExtended,
        MessageType::AidToNavigation,
        MessageType::StaticDataReport,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Channel a transponder of this kind normally uses
    pub fn default_channel(self) -> Channel {
        match self {
            MessageType::ClassBPosition
            | MessageType::ClassBExtended
            | MessageType::StaticDataReport => Channel::B,
            _ => Channel::A,
        }
    }

    /// Nominal payload length in bits (type 21 without name extension)
    pub fn bit_length(self) -> usize {
        match self {
            MessageType::StaticAndVoyage => 424,
            MessageType::ClassBExtended => 312,
            MessageType::AidToNavigation => 272,
            _ => 168,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MessageType::PositionReportScheduled => "Position Report Class A",
            MessageType::PositionReportAssigned => "Position Report Class A (Assigned schedule)",
            MessageType::PositionReportResponse => "Position Report Class A (Response to interrogation)",
            MessageType::BaseStationReport => "Base Station Report",
            MessageType::StaticAndVoyage => "Static and Voyage Related Data",
            MessageType::ClassBPosition => "Standard Class B CS Position Report",
            MessageType::ClassBExtended => "Extended Class B Equipment Position Report",
            MessageType::AidToNavigation => "Aid-to-Navigation Report",
            MessageType::StaticDataReport => "Static Data Report",
        }
    }
}

impl TryFrom<u8> for MessageType {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        MessageType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(ProtocolError::UnsupportedMessageType(code))
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code(), self.description())
    }
}

/// Class A or Class B position report body
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionReport {
    pub mmsi: Mmsi,
    pub navigation: NavigationData,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStationReport {
    pub mmsi: Mmsi,
    pub station: BaseStationData,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticAndVoyageReport {
    pub mmsi: Mmsi,
    pub static_data: StaticData,
    pub voyage: VoyageData,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtendedClassBReport {
    pub mmsi: Mmsi,
    pub navigation: NavigationData,
    pub static_data: StaticData,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AidToNavigationReport {
    pub mmsi: Mmsi,
    pub aid: AidToNavigationData,
}

/// Type 24 part A: vessel name
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticDataPartA {
    pub mmsi: Mmsi,
    pub name: String,
}

/// Type 24 part B: ship type, vendor, callsign and dimensions
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticDataPartB {
    pub mmsi: Mmsi,
    pub static_data: StaticData,
}

/// An AIS message ready to encode
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AisMessage {
    /// Type 1
    PositionReportScheduled(PositionReport),
    /// Type 2, same layout as type 1
    PositionReportAssigned(PositionReport),
    /// Type 3, same layout as type 1
    PositionReportResponse(PositionReport),
    /// Type 4
    BaseStationReport(BaseStationReport),
    /// Type 5
    StaticAndVoyage(StaticAndVoyageReport),
    /// Type 18
    ClassBPosition(PositionReport),
    /// Type 19
    ClassBExtended(ExtendedClassBReport),
    /// Type 21
    AidToNavigation(AidToNavigationReport),
    /// Type 24, part A
    StaticDataPartA(StaticDataPartA),
    /// Type 24, part B
    StaticDataPartB(StaticDataPartB),
}

/// Output of [`AisMessage::encode`]
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedMessage {
    pub bits: BitBuffer,
    pub trace: InputTrace,
}

impl AisMessage {
    pub fn message_type(&self) -> MessageType {
        match self {
            AisMessage::PositionReportScheduled(_) => MessageType::PositionReportScheduled,
            AisMessage::PositionReportAssigned(_) => MessageType::PositionReportAssigned,
            AisMessage::PositionReportResponse(_) => MessageType::PositionReportResponse,
            AisMessage::BaseStationReport(_) => MessageType::BaseStationReport,
            AisMessage::StaticAndVoyage(_) => MessageType::StaticAndVoyage,
            AisMessage::ClassBPosition(_) => MessageType::ClassBPosition,
            AisMessage::ClassBExtended(_) => MessageType::ClassBExtended,
            AisMessage::AidToNavigation(_) => MessageType::AidToNavigation,
            AisMessage::StaticDataPartA(_) | AisMessage::StaticDataPartB(_) => {
                MessageType::StaticDataReport
            }
        }
    }

    pub fn mmsi(&self) -> Mmsi {
        match self {
            AisMessage::PositionReportScheduled(r)
            | AisMessage::PositionReportAssigned(r)
            | AisMessage::PositionReportResponse(r)
            | AisMessage::ClassBPosition(r) => r.mmsi,
            AisMessage::BaseStationReport(r) => r.mmsi,
            AisMessage::StaticAndVoyage(r) => r.mmsi,
            AisMessage::ClassBExtended(r) => r.mmsi,
            AisMessage::AidToNavigation(r) => r.mmsi,
            AisMessage::StaticDataPartA(r) => r.mmsi,
            AisMessage::StaticDataPartB(r) => r.mmsi,
        }
    }

    /// Build a Class A position report of the given type (1, 2 or 3)
    pub fn class_a_position(
        message_type: MessageType,
        report: PositionReport,
    ) -> Result<Self, ProtocolError> {
        match message_type {
            MessageType::PositionReportScheduled => Ok(AisMessage::PositionReportScheduled(report)),
            MessageType::PositionReportAssigned => Ok(AisMessage::PositionReportAssigned(report)),
            MessageType::PositionReportResponse => Ok(AisMessage::PositionReportResponse(report)),
            other => Err(ProtocolError::UnsupportedMessageType(other.code())),
        }
    }

    /// Assemble the binary payload and its input trace
    pub fn encode(&self) -> EncodedMessage {
        let mut asm = Assembler::new(self.message_type(), self.mmsi());
        match self {
            AisMessage::PositionReportScheduled(r)
            | AisMessage::PositionReportAssigned(r)
            | AisMessage::PositionReportResponse(r) => encode_class_a_position(&mut asm, r),
            AisMessage::BaseStationReport(r) => encode_base_station(&mut asm, r),
            AisMessage::StaticAndVoyage(r) => encode_static_and_voyage(&mut asm, r),
            AisMessage::ClassBPosition(r) => encode_class_b_position(&mut asm, r),
            AisMessage::ClassBExtended(r) => encode_class_b_extended(&mut asm, r),
            AisMessage::AidToNavigation(r) => encode_aid_to_navigation(&mut asm, r),
            AisMessage::StaticDataPartA(r) => encode_static_part_a(&mut asm, r),
            AisMessage::StaticDataPartB(r) => encode_static_part_b(&mut asm, r),
        }
        let encoded = asm.finish();
        debug!(
            message_type = self.message_type().code(),
            mmsi = %self.mmsi(),
            bits = encoded.bits.len(),
            "Encoded AIS message"
        );
        encoded
    }
}

/// Build both halves of a type 24 static data report
pub fn static_data_report(mmsi: Mmsi, static_data: &StaticData) -> [AisMessage; 2] {
    [
        AisMessage::StaticDataPartA(StaticDataPartA {
            mmsi,
            name: static_data.name.clone(),
        }),
        AisMessage::StaticDataPartB(StaticDataPartB {
            mmsi,
            static_data: static_data.clone(),
        }),
    ]
}

/// Read the message type code from the first 6 bits of a payload
pub fn peek_message_type(bits: &BitBuffer) -> Result<MessageType, ProtocolError> {
    let code = bits
        .read_unsigned(0, 6)
        .ok_or_else(|| ProtocolError::InvalidFragment("payload shorter than 6 bits".into()))?;
    MessageType::try_from(code as u8)
}

/// Writes fields and their trace entries side by side
struct Assembler {
    bits: BitBuffer,
    trace: InputTrace,
}

impl Assembler {
    fn new(message_type: MessageType, mmsi: Mmsi) -> Self {
        let mut asm = Self {
            bits: BitBuffer::with_capacity(message_type.bit_length()),
            trace: InputTrace::new(),
        };
        asm.unsigned("message_type", u64::from(message_type.code()), 6);
        asm.unsigned("repeat", 0, 2);
        asm.unsigned("mmsi", u64::from(mmsi.0), 30);
        asm
    }

    fn unsigned(&mut self, name: &'static str, value: u64, width: usize) {
        self.bits.push_unsigned(value, width);
        self.trace.record(name, value);
    }

    fn flag(&mut self, name: &'static str, value: bool) {
        self.bits.push_bit(value);
        self.trace.record(name, value);
    }

    /// Write a raw field value while tracing its physical meaning
    fn field(&mut self, name: &'static str, raw: u64, width: usize, traced: impl Into<TraceValue>) {
        self.bits.push_unsigned(raw, width);
        self.trace.record(name, traced);
    }

    fn signed_field(
        &mut self,
        name: &'static str,
        raw: i64,
        width: usize,
        traced: impl Into<TraceValue>,
    ) {
        self.bits.push_signed(raw, width);
        self.trace.record(name, traced);
    }

    fn text(&mut self, name: &'static str, text: &str, chars: usize) {
        self.bits.push_text(text, chars);
        let shown: String = text.chars().take(chars).collect::<String>().to_ascii_uppercase();
        self.trace.record(name, shown.trim_end());
    }

    fn spare(&mut self, width: usize) {
        self.bits.push_unsigned(0, width);
    }

    fn position(&mut self, position: &GeoPosition) {
        let lon = longitude_raw(position.longitude);
        let lat = latitude_raw(position.latitude);
        self.signed_field("longitude", lon, 28, decode_longitude(lon));
        self.signed_field("latitude", lat, 27, decode_latitude(lat));
    }

    fn dimensions(&mut self, dims: &Dimensions) {
        self.unsigned("to_bow", u64::from(dims.to_bow), 9);
        self.unsigned("to_stern", u64::from(dims.to_stern), 9);
        self.unsigned("to_port", u64::from(dims.to_port), 6);
        self.unsigned("to_starboard", u64::from(dims.to_starboard), 6);
    }

    fn motion(&mut self, nav: &NavigationData) {
        let sog = sog_raw(nav.sog);
        self.field("sog", sog, 10, decode_sog(sog));
        self.flag("position_accuracy", nav.position_accuracy);
        self.position(&nav.position);
        let cog = cog_raw(nav.cog);
        self.field("cog", cog, 12, decode_cog(cog));
        let heading = heading_raw(nav.heading);
        self.field("heading", heading, 9, decode_heading(heading));
        self.timestamp(nav.timestamp);
    }

    fn timestamp(&mut self, second: u8) {
        let traced = (second < 60).then_some(second);
        self.field("timestamp", u64::from(second.min(63)), 6, traced);
    }

    fn finish(self) -> EncodedMessage {
        EncodedMessage {
            bits: self.bits,
            trace: self.trace,
        }
    }
}

fn encode_class_a_position(asm: &mut Assembler, report: &PositionReport) {
    let nav = &report.navigation;
    asm.unsigned("nav_status", u64::from(nav.status.code()), 4);
    let rot = rot_raw(nav.rot);
    let traced = (nav.rot != sentinel::ROT).then_some(nav.rot);
    asm.field("rot", rot, 8, traced);
    asm.motion(nav);
    asm.unsigned("maneuver", 0, 2);
    asm.spare(3);
    asm.flag("raim", nav.raim);
    asm.unsigned("radio_status", u64::from(nav.radio_status), 19);
}

fn encode_base_station(asm: &mut Assembler, report: &BaseStationReport) {
    let station = &report.station;
    let ts = &station.timestamp;
    asm.unsigned("year", u64::from(ts.date.year), 14);
    asm.unsigned("month", u64::from(ts.date.month), 4);
    asm.unsigned("day", u64::from(ts.date.day), 5);
    asm.unsigned("hour", u64::from(ts.time.hour), 5);
    asm.unsigned("minute", u64::from(ts.time.minute), 6);
    asm.unsigned("second", u64::from(ts.time.second), 6);
    asm.flag("position_accuracy", station.position_accuracy);
    asm.position(&station.position);
    asm.unsigned("epfd", u64::from(station.epfd.code()), 4);
    asm.spare(10);
    asm.flag("raim", station.raim);
    asm.unsigned("radio_status", u64::from(station.radio_status), 19);
}

fn encode_static_and_voyage(asm: &mut Assembler, report: &StaticAndVoyageReport) {
    let s = &report.static_data;
    let v = &report.voyage;
    asm.unsigned("ais_version", 0, 2);
    asm.unsigned("imo", u64::from(s.imo_number.unwrap_or(0)), 30);
    asm.text("callsign", &s.callsign, 7);
    asm.text("name", &s.name, 20);
    asm.unsigned("ship_type", u64::from(s.ship_type.0), 8);
    asm.dimensions(&s.dimensions);
    asm.unsigned("epfd", u64::from(s.epfd.code()), 4);
    asm.unsigned("eta_month", u64::from(v.eta.month), 4);
    asm.unsigned("eta_day", u64::from(v.eta.day), 5);
    asm.unsigned("eta_hour", u64::from(v.eta.hour), 5);
    asm.unsigned("eta_minute", u64::from(v.eta.minute), 6);
    let draught = draught_raw(v.draught);
    asm.field("draught", draught, 8, (draught > 0).then(|| draught as f64 / 10.0));
    asm.text("destination", &v.destination, 20);
    asm.flag("dte", v.dte);
    asm.spare(1);
}

fn encode_class_b_position(asm: &mut Assembler, report: &PositionReport) {
    let nav = &report.navigation;
    asm.spare(8);
    asm.motion(nav);
    asm.spare(2);
    asm.flag("cs_unit", true);
    asm.flag("display", false);
    asm.flag("dsc", false);
    asm.flag("band", false);
    asm.flag("msg22", false);
    asm.flag("assigned", false);
    asm.flag("raim", nav.raim);
    asm.unsigned("radio_status", u64::from(nav.radio_status), 20);
}

fn encode_class_b_extended(asm: &mut Assembler, report: &ExtendedClassBReport) {
    let nav = &report.navigation;
    let s = &report.static_data;
    asm.spare(8);
    asm.motion(nav);
    asm.spare(4);
    asm.text("name", &s.name, 20);
    asm.unsigned("ship_type", u64::from(s.ship_type.0), 8);
    asm.dimensions(&s.dimensions);
    asm.unsigned("epfd", u64::from(s.epfd.code()), 4);
    asm.flag("raim", nav.raim);
    asm.flag("dte", true);
    asm.flag("assigned", false);
    asm.spare(4);
}

fn encode_aid_to_navigation(asm: &mut Assembler, report: &AidToNavigationReport) {
    let aid = &report.aid;
    let (head, extension) = split_name(&aid.name, 20);
    asm.unsigned("aid_type", u64::from(aid.aid_type.0), 5);
    asm.text("name", head, 20);
    asm.flag("position_accuracy", aid.position_accuracy);
    asm.position(&aid.position);
    asm.dimensions(&aid.dimensions);
    asm.unsigned("epfd", u64::from(aid.epfd.code()), 4);
    asm.timestamp(aid.timestamp);
    asm.flag("off_position", aid.off_position);
    asm.unsigned("regional", u64::from(aid.regional), 8);
    asm.flag("raim", aid.raim);
    asm.flag("virtual_aid", aid.virtual_aid);
    asm.flag("assigned", aid.assigned);
    asm.spare(1);

    let ext_chars = extension.chars().count().min(AID_NAME_EXTENSION_CHARS);
    if ext_chars > 0 {
        asm.text("name_extension", extension, ext_chars);
        asm.bits.pad_to_multiple(8);
    }
}

fn encode_static_part_a(asm: &mut Assembler, report: &StaticDataPartA) {
    asm.unsigned("part_number", 0, 2);
    asm.text("name", &report.name, 20);
    asm.spare(8);
}

fn encode_static_part_b(asm: &mut Assembler, report: &StaticDataPartB) {
    let s = &report.static_data;
    asm.unsigned("part_number", 1, 2);
    asm.unsigned("ship_type", u64::from(s.ship_type.0), 8);
    asm.text("vendor_id", &s.vendor_id, 3);
    asm.unsigned("unit_model", u64::from(s.unit_model), 4);
    asm.unsigned("serial_number", u64::from(s.serial_number), 20);
    asm.text("callsign", &s.callsign, 7);
    asm.dimensions(&s.dimensions);
    asm.unsigned("epfd", u64::from(s.epfd.code()), 4);
    asm.spare(2);
}

/// Split at a character (not byte) boundary
fn split_name(name: &str, chars: usize) -> (&str, &str) {
    match name.char_indices().nth(chars) {
        Some((idx, _)) => name.split_at(idx),
        None => (name, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::sentinel;
    use crate::time::UtcDateTime;
    use crate::types::{AidType, Eta, NavigationStatus, ShipType};

    fn nav() -> NavigationData {
        NavigationData {
            position: GeoPosition::new(37.8, -122.4).unwrap(),
            sog: 12.3,
            cog: 210.5,
            heading: 211,
            status: NavigationStatus::UnderWayUsingEngine,
            rot: 0,
            timestamp: 30,
            ..NavigationData::default()
        }
    }

    fn position_report() -> PositionReport {
        PositionReport {
            mmsi: Mmsi(366_053_209),
            navigation: nav(),
        }
    }

    fn static_data() -> StaticData {
        StaticData {
            name: "PACIFIC TRADER".into(),
            callsign: "WDC1234".into(),
            ship_type: ShipType::CARGO,
            dimensions: Dimensions::new(150, 30, 12, 13),
            imo_number: Some(9_123_456),
            vendor_id: "ACM".into(),
            unit_model: 2,
            serial_number: 4321,
            ..StaticData::default()
        }
    }

    #[test]
    fn test_message_type_try_from() {
        assert_eq!(MessageType::try_from(18).unwrap(), MessageType::ClassBPosition);
        assert_eq!(
            MessageType::try_from(6),
            Err(ProtocolError::UnsupportedMessageType(6))
        );
    }

    #[test]
    fn test_default_channels() {
        assert_eq!(MessageType::PositionReportScheduled.default_channel(), Channel::A);
        assert_eq!(MessageType::AidToNavigation.default_channel(), Channel::A);
        assert_eq!(MessageType::ClassBPosition.default_channel(), Channel::B);
        assert_eq!(MessageType::StaticDataReport.default_channel(), Channel::B);
    }

    #[test]
    fn test_type1_layout() {
        let encoded = AisMessage::PositionReportScheduled(position_report()).encode();
        let b = &encoded.bits;
        assert_eq!(b.len(), 168);
        assert_eq!(b.read_unsigned(0, 6), Some(1));
        assert_eq!(b.read_unsigned(8, 30), Some(366_053_209));
        assert_eq!(b.read_unsigned(38, 4), Some(0));
        assert_eq!(b.read_signed(42, 8), Some(0));
        assert_eq!(b.read_unsigned(50, 10), Some(123));
        assert_eq!(b.read_signed(61, 28), Some(-73_440_000));
        assert_eq!(b.read_signed(89, 27), Some(22_680_000));
        assert_eq!(b.read_unsigned(116, 12), Some(2105));
        assert_eq!(b.read_unsigned(128, 9), Some(211));
        assert_eq!(b.read_unsigned(137, 6), Some(30));
    }

    #[test]
    fn test_types_2_and_3_share_type1_layout() {
        let t1 = AisMessage::PositionReportScheduled(position_report()).encode().bits;
        for (msg, code) in [
            (AisMessage::PositionReportAssigned(position_report()), 2),
            (AisMessage::PositionReportResponse(position_report()), 3),
        ] {
            let bits = msg.encode().bits;
            assert_eq!(bits.read_unsigned(0, 6), Some(code));
            assert_eq!(bits.slice(6..168), t1.slice(6..168));
        }
    }

    #[test]
    fn test_class_a_position_rejects_other_types() {
        assert!(
            AisMessage::class_a_position(MessageType::PositionReportAssigned, position_report())
                .is_ok()
        );
        assert_eq!(
            AisMessage::class_a_position(MessageType::ClassBPosition, position_report()),
            Err(ProtocolError::UnsupportedMessageType(18))
        );
    }

    #[test]
    fn test_type4_layout() {
        let report = BaseStationReport {
            mmsi: Mmsi(3_669_702),
            station: BaseStationData {
                position: GeoPosition::new(37.8, -122.4).unwrap(),
                timestamp: "2024-06-01T12:34:56Z".parse::<UtcDateTime>().unwrap(),
                ..BaseStationData::default()
            },
        };
        let b = AisMessage::BaseStationReport(report).encode().bits;
        assert_eq!(b.len(), 168);
        assert_eq!(b.read_unsigned(38, 14), Some(2024));
        assert_eq!(b.read_unsigned(52, 4), Some(6));
        assert_eq!(b.read_unsigned(56, 5), Some(1));
        assert_eq!(b.read_unsigned(61, 5), Some(12));
        assert_eq!(b.read_unsigned(66, 6), Some(34));
        assert_eq!(b.read_unsigned(72, 6), Some(56));
        assert_eq!(b.read_unsigned(78, 1), Some(1));
        assert_eq!(b.read_unsigned(134, 4), Some(7));
    }

    #[test]
    fn test_type5_layout() {
        let report = StaticAndVoyageReport {
            mmsi: Mmsi(366_053_209),
            static_data: static_data(),
            voyage: VoyageData {
                destination: "OAKLAND".into(),
                eta: Eta {
                    month: 6,
                    day: 2,
                    hour: 8,
                    minute: 30,
                },
                draught: 9.4,
                dte: false,
            },
        };
        let b = AisMessage::StaticAndVoyage(report).encode().bits;
        assert_eq!(b.len(), 424);
        assert_eq!(b.read_unsigned(40, 30), Some(9_123_456));
        assert_eq!(b.read_text(70, 7).as_deref(), Some("WDC1234"));
        assert_eq!(b.read_text(112, 20).as_deref(), Some("PACIFIC TRADER"));
        assert_eq!(b.read_unsigned(232, 8), Some(70));
        assert_eq!(b.read_unsigned(240, 9), Some(150));
        assert_eq!(b.read_unsigned(274, 4), Some(6));
        assert_eq!(b.read_unsigned(294, 8), Some(94));
        assert_eq!(b.read_text(302, 20).as_deref(), Some("OAKLAND"));
        assert_eq!(b.read_unsigned(422, 1), Some(0));
    }

    #[test]
    fn test_type5_defaults_encode_not_available_eta() {
        let report = StaticAndVoyageReport {
            mmsi: Mmsi(366_053_209),
            static_data: StaticData::default(),
            voyage: VoyageData {
                draught: 30.0,
                ..VoyageData::default()
            },
        };
        let b = AisMessage::StaticAndVoyage(report).encode().bits;
        assert_eq!(b.read_unsigned(274, 4), Some(0));
        assert_eq!(b.read_unsigned(278, 5), Some(0));
        assert_eq!(b.read_unsigned(283, 5), Some(24));
        assert_eq!(b.read_unsigned(288, 6), Some(60));
        assert_eq!(b.read_unsigned(294, 8), Some(0));
    }

    #[test]
    fn test_type18_layout() {
        let b = AisMessage::ClassBPosition(position_report()).encode().bits;
        assert_eq!(b.len(), 168);
        assert_eq!(b.read_unsigned(0, 6), Some(18));
        assert_eq!(b.read_unsigned(46, 10), Some(123));
        assert_eq!(b.read_unsigned(141, 1), Some(1));
    }

    #[test]
    fn test_type19_layout() {
        let report = ExtendedClassBReport {
            mmsi: Mmsi(338_123_456),
            navigation: nav(),
            static_data: static_data(),
        };
        let b = AisMessage::ClassBExtended(report).encode().bits;
        assert_eq!(b.len(), 312);
        assert_eq!(b.read_text(143, 20).as_deref(), Some("PACIFIC TRADER"));
        assert_eq!(b.read_unsigned(263, 8), Some(70));
        assert_eq!(b.read_unsigned(306, 1), Some(1));
    }

    #[test]
    fn test_type21_base_length() {
        let report = AidToNavigationReport {
            mmsi: Mmsi(993_672_001),
            aid: AidToNavigationData {
                aid_type: AidType::SAFE_WATER,
                name: "SF APPROACH".into(),
                position: GeoPosition::new(37.76, -122.63).unwrap(),
                virtual_aid: true,
                ..AidToNavigationData::default()
            },
        };
        let b = AisMessage::AidToNavigation(report).encode().bits;
        assert_eq!(b.len(), 272);
        assert_eq!(b.read_unsigned(38, 5), Some(29));
        assert_eq!(b.read_unsigned(269, 1), Some(1));
    }

    #[test]
    fn test_type21_name_extension() {
        let report = AidToNavigationReport {
            mmsi: Mmsi(993_672_001),
            aid: AidToNavigationData {
                name: "GOLDEN GATE BRIDGE MIDSPAN".into(),
                ..AidToNavigationData::default()
            },
        };
        let encoded = AisMessage::AidToNavigation(report).encode();
        // 272 + 6 * 6 = 308, padded to 312
        assert_eq!(encoded.bits.len(), 312);
        assert_eq!(encoded.bits.read_text(272, 6).as_deref(), Some("IDSPAN"));
        assert_eq!(
            encoded.trace.get("name_extension"),
            Some(&TraceValue::Text("IDSPAN".into()))
        );
    }

    #[test]
    fn test_type21_extension_capped() {
        let report = AidToNavigationReport {
            mmsi: Mmsi(993_672_001),
            aid: AidToNavigationData {
                name: "X".repeat(60),
                ..AidToNavigationData::default()
            },
        };
        let b = AisMessage::AidToNavigation(report).encode().bits;
        // 272 + 14 * 6 = 356, padded to 360
        assert_eq!(b.len(), 360);
    }

    #[test]
    fn test_type24_pair() {
        let [a, b] = static_data_report(Mmsi(338_123_456), &static_data());
        let a = a.encode().bits;
        let b = b.encode().bits;
        assert_eq!(a.len(), 168);
        assert_eq!(b.len(), 168);
        assert_eq!(a.read_unsigned(38, 2), Some(0));
        assert_eq!(b.read_unsigned(38, 2), Some(1));
        assert_eq!(a.read_text(40, 20).as_deref(), Some("PACIFIC TRADER"));
        assert_eq!(b.read_unsigned(40, 8), Some(70));
        assert_eq!(b.read_text(48, 3).as_deref(), Some("ACM"));
        assert_eq!(b.read_unsigned(66, 4), Some(2));
        assert_eq!(b.read_unsigned(70, 20), Some(4321));
        assert_eq!(b.read_text(90, 7).as_deref(), Some("WDC1234"));
        assert_eq!(b.read_unsigned(132, 9), Some(150));
    }

    #[test]
    fn test_sentinels_in_trace() {
        let report = PositionReport {
            mmsi: Mmsi(366_053_209),
            navigation: NavigationData {
                position: GeoPosition::NOT_AVAILABLE,
                sog: sentinel::SOG_KNOTS,
                ..NavigationData::default()
            },
        };
        let encoded = AisMessage::PositionReportScheduled(report).encode();
        let t = &encoded.trace;
        assert_eq!(t.get("latitude"), Some(&TraceValue::NotAvailable));
        assert_eq!(t.get("longitude"), Some(&TraceValue::NotAvailable));
        assert_eq!(t.get("sog"), Some(&TraceValue::NotAvailable));
        assert_eq!(t.get("heading"), Some(&TraceValue::NotAvailable));
        assert_eq!(t.get("rot"), Some(&TraceValue::NotAvailable));
        assert_eq!(t.get("mmsi"), Some(&TraceValue::Unsigned(366_053_209)));
        assert_eq!(
            encoded.bits.read_signed(89, 27),
            Some(sentinel::LATITUDE_RAW)
        );
    }

    #[test]
    fn test_peek_message_type() {
        let bits = AisMessage::ClassBPosition(position_report()).encode().bits;
        assert_eq!(peek_message_type(&bits).unwrap(), MessageType::ClassBPosition);
        assert!(peek_message_type(&"0101".parse().unwrap()).is_err());
    }
}
