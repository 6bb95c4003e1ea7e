//! Turns scheduled (target, message type) pairs into AIVDM sentences

use ais_protocol::{
    static_data_report, AidToNavigationReport, AisMessage, BaseStationReport, Channel,
    ExtendedClassBReport, FragmentEncoder, InputTrace, MessageType, Mmsi, PositionReport,
    StaticAndVoyageReport, UtcDateTime, VesselClass,
};
use serde::Serialize;
use tracing::debug;

use crate::error::SimError;
use crate::target::{SimTarget, Vessel};

/// Sentences produced for one scheduled transmission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transmission {
    pub mmsi: Mmsi,
    pub message_type: MessageType,
    /// Simulated time of transmission
    pub at: UtcDateTime,
    /// Rendered AIVDM sentences, without line terminators
    pub sentences: Vec<String>,
    /// Field values behind each encoded message, in sentence order
    pub traces: Vec<InputTrace>,
}

/// AIS messages a target sends for one scheduled message type
///
/// Type 24 yields Part A followed by Part B.
pub fn build_messages(
    target: &SimTarget,
    message_type: MessageType,
) -> Result<Vec<AisMessage>, SimError> {
    let incompatible = || SimError::IncompatibleTarget {
        mmsi: target.mmsi(),
        message_type,
    };

    match target {
        SimTarget::Vessel(vessel) => vessel_messages(vessel, message_type).ok_or_else(incompatible),
        SimTarget::BaseStation(base) if message_type == MessageType::BaseStationReport => {
            Ok(vec![AisMessage::BaseStationReport(BaseStationReport {
                mmsi: base.mmsi,
                station: base.station.clone(),
            })])
        }
        SimTarget::AidToNavigation(aid) if message_type == MessageType::AidToNavigation => {
            Ok(vec![AisMessage::AidToNavigation(AidToNavigationReport {
                mmsi: aid.mmsi,
                aid: aid.aid.clone(),
            })])
        }
        _ => Err(incompatible()),
    }
}

fn vessel_messages(vessel: &Vessel, message_type: MessageType) -> Option<Vec<AisMessage>> {
    let position = || PositionReport {
        mmsi: vessel.mmsi,
        navigation: vessel.navigation.clone(),
    };

    let messages = match (vessel.class, message_type) {
        (VesselClass::A, MessageType::PositionReportScheduled) => {
            vec![AisMessage::PositionReportScheduled(position())]
        }
        (VesselClass::A, MessageType::PositionReportAssigned) => {
            vec![AisMessage::PositionReportAssigned(position())]
        }
        (VesselClass::A, MessageType::PositionReportResponse) => {
            vec![AisMessage::PositionReportResponse(position())]
        }
        (VesselClass::A, MessageType::StaticAndVoyage) => {
            vec![AisMessage::StaticAndVoyage(StaticAndVoyageReport {
                mmsi: vessel.mmsi,
                static_data: vessel.static_data.clone(),
                voyage: vessel.voyage.clone(),
            })]
        }
        (VesselClass::B, MessageType::ClassBPosition) => {
            vec![AisMessage::ClassBPosition(position())]
        }
        (VesselClass::B, MessageType::ClassBExtended) => {
            vec![AisMessage::ClassBExtended(ExtendedClassBReport {
                mmsi: vessel.mmsi,
                navigation: vessel.navigation.clone(),
                static_data: vessel.static_data.clone(),
            })]
        }
        (VesselClass::B, MessageType::StaticDataReport) => {
            static_data_report(vessel.mmsi, &vessel.static_data).to_vec()
        }
        _ => return None,
    };
    Some(messages)
}

/// Encodes and frames messages for the whole simulation
///
/// Owns the single fragment encoder, so sequential message ids rotate
/// across every multi-part message the simulation emits.
#[derive(Debug, Default)]
pub struct MessageGenerator {
    encoder: FragmentEncoder,
    /// Force every message onto one channel instead of its type's default
    channel: Option<Channel>,
}

impl MessageGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(channel: Channel) -> Self {
        Self {
            encoder: FragmentEncoder::new(),
            channel: Some(channel),
        }
    }

    /// Build, encode and frame the messages `target` owes for `message_type`
    pub fn generate(
        &mut self,
        target: &SimTarget,
        message_type: MessageType,
        at: UtcDateTime,
    ) -> Result<Transmission, SimError> {
        let messages = build_messages(target, message_type)?;

        let mut sentences = Vec::new();
        let mut traces = Vec::with_capacity(messages.len());
        for message in &messages {
            let framed = self.encoder.encode(message, self.channel)?;
            sentences.extend(framed.sentences());
            traces.push(framed.trace);
        }

        debug!(
            mmsi = %target.mmsi(),
            message_type = message_type.code(),
            sentences = sentences.len(),
            "Generated AIS transmission"
        );

        Ok(Transmission {
            mmsi: target.mmsi(),
            message_type,
            at,
            sentences,
            traces,
        })
    }
}
