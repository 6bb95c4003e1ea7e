//! NMEA 0183 Sentence Framework
//!
//! Generic framing shared by every sentence family:
//!
//! ```text
//! $GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n
//! ^ ^ ^  ^                                                          ^
//! | | |  fields, comma separated                                   checksum
//! | | sentence id
//! | talker id
//! start delimiter: '$' parametric, '!' encapsulation (AIVDM/AIVDO)
//! ```
//!
//! The checksum is the XOR of every character between the delimiter and `*`,
//! written as two uppercase hex digits. A rendered sentence including the
//! CRLF terminator is at most 82 characters.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::aivdm::AivdmFragment;
use crate::error::{ParseError, ProtocolError};
use crate::gga::Gga;
use crate::rmc::Rmc;
use crate::ProtocolCodec;

/// Longest sentence allowed, CRLF included
pub const MAX_SENTENCE_LEN: usize = 82;

/// Talker identifier (first two characters of the address field)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TalkerId {
    /// GPS
    #[default]
    GP,
    /// GLONASS
    GL,
    /// Galileo
    GA,
    /// Combined GNSS
    GN,
    /// BeiDou
    BD,
    /// QZSS
    QZ,
    /// Integrated instrumentation
    II,
    /// Integrated navigation
    IN,
    /// ECDIS
    EC,
    /// AIS
    AI,
}

impl TalkerId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TalkerId::GP => "GP",
            TalkerId::GL => "GL",
            TalkerId::GA => "GA",
            TalkerId::GN => "GN",
            TalkerId::BD => "BD",
            TalkerId::QZ => "QZ",
            TalkerId::II => "II",
            TalkerId::IN => "IN",
            TalkerId::EC => "EC",
            TalkerId::AI => "AI",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "GP" => TalkerId::GP,
            "GL" => TalkerId::GL,
            "GA" => TalkerId::GA,
            "GN" => TalkerId::GN,
            "BD" => TalkerId::BD,
            "QZ" => TalkerId::QZ,
            "II" => TalkerId::II,
            "IN" => TalkerId::IN,
            "EC" => TalkerId::EC,
            "AI" => TalkerId::AI,
            _ => return None,
        })
    }

    /// Like [`TalkerId::from_code`], but unknown talkers become GP
    pub fn from_code_lenient(code: &str) -> Self {
        Self::from_code(code).unwrap_or_else(|| {
            warn!("Unknown talker id {:?}, treating as GP", code);
            TalkerId::GP
        })
    }
}

impl fmt::Display for TalkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentence formatter (three characters after the talker)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SentenceId {
    Gga,
    Rmc,
    Gsa,
    Gsv,
    Vtg,
    Gll,
    Zda,
    Hdg,
    /// AIS message from another station
    Vdm,
    /// AIS message from own vessel
    Vdo,
}

impl SentenceId {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentenceId::Gga => "GGA",
            SentenceId::Rmc => "RMC",
            SentenceId::Gsa => "GSA",
            SentenceId::Gsv => "GSV",
            SentenceId::Vtg => "VTG",
            SentenceId::Gll => "GLL",
            SentenceId::Zda => "ZDA",
            SentenceId::Hdg => "HDG",
            SentenceId::Vdm => "VDM",
            SentenceId::Vdo => "VDO",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "GGA" => SentenceId::Gga,
            "RMC" => SentenceId::Rmc,
            "GSA" => SentenceId::Gsa,
            "GSV" => SentenceId::Gsv,
            "VTG" => SentenceId::Vtg,
            "GLL" => SentenceId::Gll,
            "ZDA" => SentenceId::Zda,
            "HDG" => SentenceId::Hdg,
            "VDM" => SentenceId::Vdm,
            "VDO" => SentenceId::Vdo,
            _ => return None,
        })
    }

    /// Start delimiter this sentence type is sent with
    pub fn delimiter(&self) -> char {
        match self {
            SentenceId::Vdm | SentenceId::Vdo => '!',
            _ => '$',
        }
    }
}

impl fmt::Display for SentenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// XOR of every character of `body` (the text between delimiter and `*`)
pub fn calculate_checksum(body: &str) -> u8 {
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// A framed sentence: address, ordered fields, checksum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NmeaSentence {
    pub delimiter: char,
    pub talker: TalkerId,
    pub sentence_id: SentenceId,
    pub fields: Vec<String>,
}

impl NmeaSentence {
    /// Create a sentence using the sentence type's usual delimiter
    pub fn new(talker: TalkerId, sentence_id: SentenceId, fields: Vec<String>) -> Self {
        Self {
            delimiter: sentence_id.delimiter(),
            talker,
            sentence_id,
            fields,
        }
    }

    /// Frame fields into a complete CRLF-terminated sentence
    pub fn build<S: AsRef<str>>(
        talker: TalkerId,
        sentence_id: SentenceId,
        fields: &[S],
    ) -> Result<String, ProtocolError> {
        let fields = fields.iter().map(|f| f.as_ref().to_string()).collect();
        Self::new(talker, sentence_id, fields).encode()
    }

    /// Text covered by the checksum: `TTSSS,field1,...,fieldN`
    pub fn body(&self) -> String {
        let mut body = format!("{}{}", self.talker, self.sentence_id);
        for field in &self.fields {
            body.push(',');
            body.push_str(field);
        }
        body
    }

    pub fn checksum(&self) -> u8 {
        calculate_checksum(&self.body())
    }

    /// Render with CRLF, rejecting sentences over the length limit
    pub fn encode(&self) -> Result<String, ProtocolError> {
        let line = format!("{self}\r\n");
        if line.len() > MAX_SENTENCE_LEN {
            return Err(ProtocolError::SentenceTooLong { len: line.len() });
        }
        Ok(line)
    }

    /// Parse one sentence; trailing CR/LF is ignored
    ///
    /// Unknown talker ids fall back to GP. Unknown sentence ids fail with
    /// [`ParseError::UnsupportedSentenceType`]. On a checksum mismatch
    /// `expected` is the value computed from the content and `actual` the
    /// value the sentence carried.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.len() + 2 > MAX_SENTENCE_LEN {
            return Err(ParseError::MalformedSentence(format!(
                "{} characters exceeds the {MAX_SENTENCE_LEN} character limit",
                line.len() + 2
            )));
        }

        let delimiter = match line.chars().next() {
            Some(c @ ('$' | '!')) => c,
            _ => return Err(ParseError::MalformedSentence("missing '$' or '!'".into())),
        };

        let (body, checksum_text) = line[1..]
            .rsplit_once('*')
            .ok_or_else(|| ParseError::MalformedSentence("missing '*' checksum".into()))?;

        let actual = parse_checksum(checksum_text)?;
        let expected = calculate_checksum(body);
        if expected != actual {
            return Err(ParseError::ChecksumMismatch { expected, actual });
        }

        let mut parts = body.split(',');
        let address = parts.next().unwrap_or_default();
        if address.len() != 5 || !address.is_ascii() {
            return Err(ParseError::MalformedSentence(format!(
                "bad address field {address:?}"
            )));
        }
        let (talker_code, id_code) = address.split_at(2);

        let sentence_id = SentenceId::from_code(id_code)
            .ok_or_else(|| ParseError::UnsupportedSentenceType(id_code.to_string()))?;
        let talker = TalkerId::from_code_lenient(talker_code);

        Ok(Self {
            delimiter,
            talker,
            sentence_id,
            fields: parts.map(str::to_string).collect(),
        })
    }

    /// Raw field text, `None` when missing or empty
    pub fn field(&self, index: usize) -> Option<&str> {
        self.fields
            .get(index)
            .map(String::as_str)
            .filter(|f| !f.is_empty())
    }

    /// Numeric field, `Ok(None)` when empty
    pub fn field_parse<T: FromStr>(
        &self,
        index: usize,
        name: &'static str,
    ) -> Result<Option<T>, ParseError> {
        match self.field(index) {
            None => Ok(None),
            Some(text) => text.parse().map(Some).map_err(|_| ParseError::InvalidField {
                field: name,
                value: text.to_string(),
            }),
        }
    }

    /// Single-character field, `Ok(None)` when empty
    pub fn field_char(&self, index: usize, name: &'static str) -> Result<Option<char>, ParseError> {
        match self.field(index) {
            None => Ok(None),
            Some(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Some(c)),
                    _ => Err(ParseError::InvalidField {
                        field: name,
                        value: text.to_string(),
                    }),
                }
            }
        }
    }
}

impl fmt::Display for NmeaSentence {
    /// The sentence without its line terminator
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.body();
        write!(
            f,
            "{}{}*{:02X}",
            self.delimiter,
            body,
            calculate_checksum(&body)
        )
    }
}

impl FromStr for NmeaSentence {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_checksum(text: &str) -> Result<u8, ParseError> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::MalformedSentence(format!(
            "checksum must be two hex digits, got {text:?}"
        )));
    }
    u8::from_str_radix(text, 16)
        .map_err(|_| ParseError::MalformedSentence(format!("invalid checksum {text:?}")))
}

/// Format an optional float with fixed decimals, empty when absent
pub(crate) fn format_opt_f64(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(String::new, |v| format!("{v:.decimals$}"))
}

/// Any supported sentence, decoded
#[derive(Debug, Clone, PartialEq)]
pub enum Sentence {
    Gga(Gga),
    Rmc(Rmc),
    Aivdm(AivdmFragment),
    /// Framed and checksummed, but without a typed model
    Other(NmeaSentence),
}

impl Sentence {
    pub fn decode(line: &str) -> Result<Self, ProtocolError> {
        let sentence = NmeaSentence::parse(line)?;
        Ok(match sentence.sentence_id {
            SentenceId::Gga => Sentence::Gga(Gga::from_sentence(&sentence)?),
            SentenceId::Rmc => Sentence::Rmc(Rmc::from_sentence(&sentence)?),
            SentenceId::Vdm | SentenceId::Vdo => {
                Sentence::Aivdm(AivdmFragment::from_sentence(&sentence)?)
            }
            _ => Sentence::Other(sentence),
        })
    }
}

/// Streaming sentence codec: feed bytes, pull complete sentences
///
/// Lines are delimited by LF (CR is stripped). Lines that fail to decode are
/// logged and skipped.
#[derive(Debug, Default)]
pub struct NmeaCodec {
    buffer: Vec<u8>,
}

impl NmeaCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes waiting for a line terminator
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

impl ProtocolCodec for NmeaCodec {
    type Command = Sentence;

    fn push_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);

        // No terminator in sight: keep only the tail that could still be a sentence
        if self.buffer.len() > MAX_SENTENCE_LEN * 4 && !self.buffer.contains(&b'\n') {
            let start = self.buffer.len() - MAX_SENTENCE_LEN;
            self.buffer.drain(..start);
        }
    }

    fn next_command(&mut self) -> Option<Self::Command> {
        self.next_command_with_bytes().map(|(sentence, _)| sentence)
    }

    fn next_command_with_bytes(&mut self) -> Option<(Self::Command, Vec<u8>)> {
        loop {
            let term_pos = self.buffer.iter().position(|&b| b == b'\n')?;
            let line_bytes: Vec<u8> = self.buffer.drain(..=term_pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match Sentence::decode(line) {
                Ok(sentence) => return Some((sentence, line_bytes)),
                Err(e) => warn!("Skipping unparseable NMEA line {:?}: {}", line, e),
            }
        }
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }
}
