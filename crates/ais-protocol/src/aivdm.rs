//! AIVDM framing and the Multi-Part Framer
//!
//! # Format
//! ```text
//! !AIVDM,<total>,<part>,<seq>,<channel>,<payload>,<fill>*CC
//! ```
//!
//! A payload whose armored form is longer than 56 characters (336 bits) is
//! cut into 336-bit chunks, one sentence each. All fragments of one message
//! share a sequential message id; single-fragment messages leave it empty.

use std::fmt;

use tracing::debug;

use crate::bits::BitBuffer;
use crate::error::{ParseError, ProtocolError};
use crate::messages::AisMessage;
use crate::nmea::{NmeaSentence, SentenceId, TalkerId};
use crate::sixbit::{
    calculate_fill_bits, char_value, decode_6bit_to_binary, encode_binary_to_6bit, is_valid_6bit,
};
use crate::trace::InputTrace;

/// Armored characters that fit in one sentence
pub const MAX_PAYLOAD_CHARS: usize = 56;

/// Payload bits carried by one fragment
pub const MAX_FRAGMENT_BITS: usize = MAX_PAYLOAD_CHARS * 6;

/// Fragment count is a single digit
pub const MAX_FRAGMENTS: usize = 9;

/// VHF data link channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Channel {
    /// 161.975 MHz
    #[default]
    A,
    /// 162.025 MHz
    B,
}

impl Channel {
    pub fn as_char(&self) -> char {
        match self {
            Channel::A => 'A',
            Channel::B => 'B',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(Channel::A),
            'B' => Some(Channel::B),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One AIVDM/AIVDO sentence worth of payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AivdmFragment {
    pub total: u8,
    /// 1-based
    pub index: u8,
    /// Shared by all fragments of a multi-part message, `None` otherwise
    pub sequence_id: Option<u8>,
    pub channel: Channel,
    pub payload: String,
    pub fill_bits: u8,
    /// Sent as AIVDO (own vessel) rather than AIVDM
    pub own_vessel: bool,
}

impl AivdmFragment {
    pub fn to_sentence(&self) -> NmeaSentence {
        let sentence_id = if self.own_vessel {
            SentenceId::Vdo
        } else {
            SentenceId::Vdm
        };
        NmeaSentence::new(
            TalkerId::AI,
            sentence_id,
            vec![
                self.total.to_string(),
                self.index.to_string(),
                self.sequence_id.map(|s| s.to_string()).unwrap_or_default(),
                self.channel.to_string(),
                self.payload.clone(),
                self.fill_bits.to_string(),
            ],
        )
    }

    /// Validate and extract the fragment fields of a parsed VDM/VDO sentence
    pub fn from_sentence(sentence: &NmeaSentence) -> Result<Self, ProtocolError> {
        let own_vessel = match sentence.sentence_id {
            SentenceId::Vdm => false,
            SentenceId::Vdo => true,
            other => return Err(ParseError::UnsupportedSentenceType(other.to_string()).into()),
        };
        if sentence.fields.len() != 6 {
            return Err(ProtocolError::InvalidFragment(format!(
                "expected 6 fields, got {}",
                sentence.fields.len()
            )));
        }

        let total = required_digit(sentence, 0, "fragment count", 1, MAX_FRAGMENTS as u8)?;
        let index = required_digit(sentence, 1, "fragment number", 1, total)?;
        let sequence_id = match sentence.field(2) {
            None => None,
            Some(_) => Some(required_digit(sentence, 2, "sequential message id", 0, 9)?),
        };

        let channel = sentence
            .field_char(3, "channel")?
            .and_then(Channel::from_char)
            .ok_or_else(|| invalid("channel", sentence.field(3).unwrap_or_default()))?;

        let payload = sentence.field(4).unwrap_or_default().to_string();
        if !is_valid_6bit(&payload) {
            return Err(invalid("payload", &payload).into());
        }

        let fill_bits = required_digit(sentence, 5, "fill bits", 0, 5)?;

        Ok(Self {
            total,
            index,
            sequence_id,
            channel,
            payload,
            fill_bits,
            own_vessel,
        })
    }

    /// Parse a complete `!AIVDM`/`!AIVDO` line
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        Self::from_sentence(&NmeaSentence::parse(line)?)
    }

    /// De-armored payload with the fill bits removed
    pub fn bits(&self) -> BitBuffer {
        let mut bits = decode_6bit_to_binary(&self.payload);
        let keep = bits.len().saturating_sub(usize::from(self.fill_bits));
        bits.truncate(keep);
        bits
    }

    /// Message type code from the first payload character of a first fragment
    pub fn message_type(&self) -> Option<u8> {
        if self.index != 1 {
            return None;
        }
        self.payload.chars().next().and_then(char_value)
    }
}

impl fmt::Display for AivdmFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sentence())
    }
}

fn invalid(field: &'static str, value: &str) -> ParseError {
    ParseError::InvalidField {
        field,
        value: value.to_string(),
    }
}

fn required_digit(
    sentence: &NmeaSentence,
    index: usize,
    field: &'static str,
    min: u8,
    max: u8,
) -> Result<u8, ParseError> {
    let text = sentence.field(index).unwrap_or_default();
    match text.parse::<u8>() {
        Ok(v) if text.len() == 1 && (min..=max).contains(&v) => Ok(v),
        _ => Err(invalid(field, text)),
    }
}

/// Whether the armored payload exceeds one sentence
pub fn needs_splitting(bits: &BitBuffer) -> bool {
    bits.len().div_ceil(6) > MAX_PAYLOAD_CHARS
}

/// Sentences needed for a payload of `bit_len` bits
pub fn fragment_count(bit_len: usize) -> usize {
    bit_len.div_ceil(MAX_FRAGMENT_BITS).max(1)
}

/// Cut a payload into fragment-sized chunks
pub fn split(bits: &BitBuffer) -> Vec<BitBuffer> {
    if bits.is_empty() {
        return vec![BitBuffer::new()];
    }
    bits.chunks(MAX_FRAGMENT_BITS).collect()
}

/// Rebuild the original payload from a complete set of fragments
///
/// Fragments may arrive in any order but must agree on count and sequence id.
pub fn reassemble(fragments: &[AivdmFragment]) -> Result<BitBuffer, ProtocolError> {
    let first = fragments
        .first()
        .ok_or_else(|| ProtocolError::InvalidFragment("no fragments".into()))?;

    if fragments.len() != usize::from(first.total) {
        return Err(ProtocolError::InvalidFragment(format!(
            "expected {} fragments, got {}",
            first.total,
            fragments.len()
        )));
    }
    if fragments
        .iter()
        .any(|f| f.total != first.total || f.sequence_id != first.sequence_id)
    {
        return Err(ProtocolError::InvalidFragment(
            "fragments disagree on count or sequential message id".into(),
        ));
    }

    let mut ordered: Vec<&AivdmFragment> = fragments.iter().collect();
    ordered.sort_by_key(|f| f.index);
    let mut bits = BitBuffer::new();
    for (expected, fragment) in (1u8..).zip(&ordered) {
        if fragment.index != expected {
            return Err(ProtocolError::InvalidFragment(format!(
                "missing fragment {expected}"
            )));
        }
        bits.extend_from(&fragment.bits());
    }
    Ok(bits)
}

/// Sentences and trace for one encoded message
#[derive(Debug, Clone, PartialEq)]
pub struct FramedMessage {
    pub fragments: Vec<AivdmFragment>,
    pub trace: InputTrace,
}

impl FramedMessage {
    /// Rendered sentences, without line terminators
    pub fn sentences(&self) -> Vec<String> {
        self.fragments.iter().map(ToString::to_string).collect()
    }
}

/// Turns payloads into AIVDM fragments, owning the sequential message id
///
/// The id rotates 1..=9 and then back to empty, advancing only when a
/// message needs more than one fragment. Give each producer its own encoder,
/// or share one behind a lock.
#[derive(Debug, Default)]
pub struct FragmentEncoder {
    sequence: u8,
}

impl FragmentEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter and return the id for the next multi-part message
    pub fn next_sequence_id(&mut self) -> Option<u8> {
        self.sequence = (self.sequence + 1) % 10;
        (self.sequence != 0).then_some(self.sequence)
    }

    /// Split and armor a payload into fragments
    pub fn frame(
        &mut self,
        bits: &BitBuffer,
        channel: Channel,
    ) -> Result<Vec<AivdmFragment>, ProtocolError> {
        let chunks = split(bits);
        let total = chunks.len();
        if total > MAX_FRAGMENTS {
            return Err(ProtocolError::InvalidFragment(format!(
                "{} bits needs {total} fragments (max {MAX_FRAGMENTS})",
                bits.len()
            )));
        }

        let sequence_id = if total > 1 {
            self.next_sequence_id()
        } else {
            None
        };

        let fragments: Vec<AivdmFragment> = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| AivdmFragment {
                total: total as u8,
                index: (i + 1) as u8,
                sequence_id,
                channel,
                payload: encode_binary_to_6bit(chunk),
                fill_bits: calculate_fill_bits(chunk.len()),
                own_vessel: false,
            })
            .collect();

        debug!(
            bits = bits.len(),
            fragments = total,
            sequence_id = ?sequence_id,
            "Framed AIS payload"
        );
        Ok(fragments)
    }

    /// Encode and frame a message on `channel`, or its type's default channel
    pub fn encode(
        &mut self,
        message: &AisMessage,
        channel: Option<Channel>,
    ) -> Result<FramedMessage, ProtocolError> {
        let encoded = message.encode();
        let channel = channel.unwrap_or_else(|| message.message_type().default_channel());
        let fragments = self.frame(&encoded.bits, channel)?;
        Ok(FramedMessage {
            fragments,
            trace: encoded.trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeros(n: usize) -> BitBuffer {
        std::iter::repeat(false).take(n).collect()
    }

    #[test]
    fn test_parse_fixture() {
        let frag = AivdmFragment::parse("!AIVDM,1,1,,A,13HOI:0P1kG?Vl@EWFk3NReh0000,0*75").unwrap();
        assert_eq!(frag.total, 1);
        assert_eq!(frag.index, 1);
        assert_eq!(frag.sequence_id, None);
        assert_eq!(frag.channel, Channel::A);
        assert_eq!(frag.fill_bits, 0);
        assert_eq!(frag.message_type(), Some(1));
        assert_eq!(frag.bits().len(), 168);
        assert_eq!(
            frag.to_string(),
            "!AIVDM,1,1,,A,13HOI:0P1kG?Vl@EWFk3NReh0000,0*75"
        );
    }

    #[test]
    fn test_fixture_decodes_with_itu_alphabet() {
        let frag = AivdmFragment::parse("!AIVDM,1,1,,A,13HOI:0P1kG?Vl@EWFk3NReh0000,0*75").unwrap();
        let bits = frag.bits();
        assert_eq!(bits.read_unsigned(8, 30), Some(227_006_760));
        assert_eq!(bits.read_unsigned(50, 10), Some(115));
    }

    #[test]
    fn test_parse_rejects_bad_fields() {
        let cases = [
            "AIVDM,0,1,,A,1,0",
            "AIVDM,2,3,,A,1,0",
            "AIVDM,1,1,,C,1,0",
            "AIVDM,1,1,,A,1,6",
            "AIVDM,1,1,,A,1X,0",
            "AIVDM,1,1,12,A,1,0",
            "AIVDM,1,1,,A,1",
        ];
        for body in cases {
            let line = format!("!{body}*{:02X}", crate::nmea::calculate_checksum(body));
            assert!(AivdmFragment::parse(&line).is_err(), "{body}");
        }
    }

    #[test]
    fn test_parse_vdo() {
        let body = "AIVDO,1,1,,B,B5NJ;PP005l4ot5Isbl03wsUkP06,0";
        let line = format!("!{body}*{:02X}", crate::nmea::calculate_checksum(body));
        let frag = AivdmFragment::parse(&line).unwrap();
        assert!(frag.own_vessel);
        assert_eq!(frag.channel, Channel::B);
        assert_eq!(frag.message_type(), Some(18));
    }

    #[test]
    fn test_splitting_threshold() {
        assert!(!needs_splitting(&zeros(336)));
        assert!(needs_splitting(&zeros(337)));
        assert_eq!(fragment_count(336), 1);
        assert_eq!(fragment_count(337), 2);
        assert_eq!(fragment_count(424), 2);
        assert_eq!(fragment_count(0), 1);
        assert_eq!(split(&zeros(337)).len(), 2);
        assert_eq!(split(&zeros(337))[1].len(), 1);
    }

    #[test]
    fn test_frame_single() {
        let mut encoder = FragmentEncoder::new();
        let frags = encoder.frame(&zeros(168), Channel::A).unwrap();
        assert_eq!(frags.len(), 1);
        assert_eq!(frags[0].sequence_id, None);
        assert_eq!(frags[0].payload.len(), 28);
        assert_eq!(frags[0].fill_bits, 0);
    }

    #[test]
    fn test_frame_multi() {
        let mut encoder = FragmentEncoder::new();
        let frags = encoder.frame(&zeros(424), Channel::B).unwrap();
        assert_eq!(frags.len(), 2);
        assert_eq!(frags[0].payload.len(), 56);
        assert_eq!(frags[0].fill_bits, 0);
        assert_eq!(frags[1].payload.len(), 15);
        assert_eq!(frags[1].fill_bits, 2);
        assert_eq!(frags[0].sequence_id, Some(1));
        assert_eq!(frags[1].sequence_id, Some(1));
        for f in &frags {
            assert!(f.to_sentence().encode().is_ok());
        }
    }

    #[test]
    fn test_sequence_rotation() {
        let mut encoder = FragmentEncoder::new();
        let ids: Vec<_> = (0..11).map(|_| encoder.next_sequence_id()).collect();
        assert_eq!(
            ids,
            vec![
                Some(1),
                Some(2),
                Some(3),
                Some(4),
                Some(5),
                Some(6),
                Some(7),
                Some(8),
                Some(9),
                None,
                Some(1)
            ]
        );
    }

    #[test]
    fn test_single_fragment_does_not_advance_sequence() {
        let mut encoder = FragmentEncoder::new();
        encoder.frame(&zeros(168), Channel::A).unwrap();
        let multi = encoder.frame(&zeros(424), Channel::A).unwrap();
        assert_eq!(multi[0].sequence_id, Some(1));
    }

    #[test]
    fn test_frame_too_large() {
        let mut encoder = FragmentEncoder::new();
        assert!(encoder.frame(&zeros(336 * 9 + 1), Channel::A).is_err());
    }

    #[test]
    fn test_reassemble() {
        let bits: BitBuffer = (0..424).map(|i| i % 3 == 0).collect();
        let mut encoder = FragmentEncoder::new();
        let mut frags = encoder.frame(&bits, Channel::A).unwrap();
        frags.reverse();
        assert_eq!(reassemble(&frags).unwrap(), bits);
    }

    #[test]
    fn test_reassemble_errors() {
        let mut encoder = FragmentEncoder::new();
        let frags = encoder.frame(&zeros(424), Channel::A).unwrap();
        assert!(reassemble(&[]).is_err());
        assert!(reassemble(&frags[..1]).is_err());

        let mut mixed = frags.clone();
        mixed[1].sequence_id = Some(7);
        assert!(reassemble(&mixed).is_err());

        let mut duplicated = frags;
        duplicated[1].index = 1;
        assert!(reassemble(&duplicated).is_err());
    }
}
