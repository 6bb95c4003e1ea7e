//! AIS / NMEA 0183 Protocol Library
//!
//! This crate turns structured vessel data into the sentences real marine
//! electronics exchange:
//!
//! - **Bit-field codec** ([`bits`]): fixed-width unsigned, signed and 6-bit
//!   text fields with ITU "not available" sentinels
//! - **AIS messages** ([`messages`]): types 1, 2, 3, 4, 5, 18, 19, 21 and 24
//!   (parts A and B)
//! - **6-bit armor** ([`sixbit`]): the printable payload alphabet
//! - **AIVDM framing** ([`aivdm`]): multi-part splitting, sequential ids,
//!   reassembly
//! - **NMEA framework** ([`nmea`]): talker/sentence ids, checksum, the
//!   82-character bound, GGA and RMC models and a streaming line codec
//!
//! # Architecture
//!
//! Encoding is a pipeline of pure steps. Only [`aivdm::FragmentEncoder`]
//! carries state (the rotating sequential message id), so callers own one
//! encoder per output stream.
//!
//! ```text
//! AisMessage --encode--> BitBuffer --frame--> AivdmFragment* --> "!AIVDM,...*CC"
//! ```
//!
//! Out-of-range input is never an error: every numeric field is clamped or
//! replaced with its not-available sentinel.
//!
//! # Example
//!
//! ```rust
//! use ais_protocol::{AisMessage, FragmentEncoder, GeoPosition, Mmsi, NavigationData, PositionReport};
//!
//! let report = PositionReport {
//!     mmsi: Mmsi(366_053_209),
//!     navigation: NavigationData {
//!         position: GeoPosition::new(37.8, -122.4).unwrap(),
//!         sog: 12.3,
//!         cog: 210.0,
//!         heading: 211,
//!         ..NavigationData::default()
//!     },
//! };
//!
//! let mut encoder = FragmentEncoder::new();
//! let framed = encoder
//!     .encode(&AisMessage::PositionReportScheduled(report), None)
//!     .unwrap();
//!
//! let sentences = framed.sentences();
//! assert_eq!(sentences.len(), 1);
//! assert!(sentences[0].starts_with("!AIVDM,1,1,,A,1"));
//! ```

pub mod aivdm;
pub mod bits;
pub mod error;
pub mod gga;
pub mod messages;
pub mod nmea;
pub mod position;
pub mod rmc;
pub mod sixbit;
pub mod time;
pub mod trace;
pub mod types;

pub use aivdm::{AivdmFragment, Channel, FragmentEncoder, FramedMessage};
pub use bits::BitBuffer;
pub use error::{ParseError, ProtocolError};
pub use gga::{FixQuality, Gga};
pub use messages::{
    static_data_report, AidToNavigationReport, AisMessage, BaseStationReport, EncodedMessage,
    ExtendedClassBReport, MessageType, PositionReport, StaticAndVoyageReport, StaticDataPartA,
    StaticDataPartB,
};
pub use nmea::{NmeaCodec, NmeaSentence, Sentence, SentenceId, TalkerId};
pub use position::GeoPosition;
pub use rmc::{ModeIndicator, Rmc};
pub use sixbit::{calculate_fill_bits, decode_6bit_to_binary, encode_binary_to_6bit};
pub use time::{NmeaDate, NmeaTime, UtcDateTime};
pub use trace::{InputTrace, TraceValue};
pub use types::{
    AidToNavigationData, AidType, BaseStationData, Dimensions, EpfdType, Eta, Mmsi, MmsiKind,
    NavigationData, NavigationStatus, ShipType, StaticData, VesselClass, VoyageData,
};

/// Trait for protocol codecs that can parse incoming data streams
pub trait ProtocolCodec {
    /// The command type produced by this codec
    type Command;

    /// Push raw bytes into the codec's buffer
    fn push_bytes(&mut self, data: &[u8]);

    /// Try to extract the next complete command from the buffer
    fn next_command(&mut self) -> Option<Self::Command>;

    /// Try to extract the next complete command along with its raw bytes
    ///
    /// Useful for traffic logs that show exactly which bytes produced each
    /// decoded sentence.
    fn next_command_with_bytes(&mut self) -> Option<(Self::Command, Vec<u8>)>;

    /// Clear the internal buffer
    fn clear(&mut self);
}
