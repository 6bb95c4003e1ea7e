//! RMC: Recommended Minimum Specific GNSS Data
//!
//! ```text
//! $GPRMC,hhmmss.ss,A,llll.llll,a,yyyyy.yyyy,a,x.x,x.x,ddmmyy,x.x,a,m*CC
//! ```
//!
//! The trailing mode indicator (NMEA 2.3) is optional on input.

use crate::error::ParseError;
use crate::gga::{parse_position, push_position};
use crate::nmea::{format_opt_f64, NmeaSentence, SentenceId, TalkerId};
use crate::position::GeoPosition;
use crate::time::{NmeaDate, NmeaTime};

/// Positioning system mode indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModeIndicator {
    Autonomous,
    Differential,
    Estimated,
    Manual,
    Simulator,
    NotValid,
}

impl ModeIndicator {
    pub fn as_char(&self) -> char {
        match self {
            ModeIndicator::Autonomous => 'A',
            ModeIndicator::Differential => 'D',
            ModeIndicator::Estimated => 'E',
            ModeIndicator::Manual => 'M',
            ModeIndicator::Simulator => 'S',
            ModeIndicator::NotValid => 'N',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'A' => ModeIndicator::Autonomous,
            'D' => ModeIndicator::Differential,
            'E' => ModeIndicator::Estimated,
            'M' => ModeIndicator::Manual,
            'S' => ModeIndicator::Simulator,
            'N' => ModeIndicator::NotValid,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rmc {
    pub talker: TalkerId,
    pub time: Option<NmeaTime>,
    /// Status `A` (data valid) or `V` (warning)
    pub active: bool,
    pub position: Option<GeoPosition>,
    pub sog_knots: Option<f64>,
    pub cog_deg: Option<f64>,
    pub date: Option<NmeaDate>,
    /// Magnetic variation, degrees; east positive, west negative
    pub magnetic_variation: Option<f64>,
    pub mode: Option<ModeIndicator>,
}

impl Default for Rmc {
    fn default() -> Self {
        Self {
            talker: TalkerId::GP,
            time: None,
            active: false,
            position: None,
            sog_knots: None,
            cog_deg: None,
            date: None,
            magnetic_variation: None,
            mode: Some(ModeIndicator::NotValid),
        }
    }
}

impl Rmc {
    pub fn to_sentence(&self) -> NmeaSentence {
        let mut fields = Vec::with_capacity(12);
        fields.push(self.time.map(|t| t.to_nmea()).unwrap_or_default());
        fields.push(if self.active { "A" } else { "V" }.to_string());
        push_position(&mut fields, self.position.as_ref());
        fields.push(format_opt_f64(self.sog_knots, 1));
        fields.push(format_opt_f64(self.cog_deg, 1));
        fields.push(self.date.map(|d| d.to_nmea()).unwrap_or_default());
        match self.magnetic_variation {
            Some(v) => {
                fields.push(format!("{:.1}", v.abs()));
                fields.push(if v < 0.0 { "W" } else { "E" }.to_string());
            }
            None => fields.extend([String::new(), String::new()]),
        }
        if let Some(mode) = self.mode {
            fields.push(mode.as_char().to_string());
        }
        NmeaSentence::new(self.talker, SentenceId::Rmc, fields)
    }

    pub fn from_sentence(sentence: &NmeaSentence) -> Result<Self, ParseError> {
        if sentence.sentence_id != SentenceId::Rmc {
            return Err(ParseError::UnsupportedSentenceType(
                sentence.sentence_id.to_string(),
            ));
        }

        let active = match sentence.field_char(1, "status")? {
            Some('A') => true,
            Some('V') | None => false,
            Some(other) => {
                return Err(ParseError::InvalidField {
                    field: "status",
                    value: other.to_string(),
                })
            }
        };

        let magnetic_variation = match (
            sentence.field_parse::<f64>(9, "magnetic variation")?,
            sentence.field_char(10, "variation direction")?,
        ) {
            (Some(v), Some('W')) => Some(-v),
            (Some(v), Some('E')) => Some(v),
            (Some(_), dir) => {
                return Err(ParseError::InvalidField {
                    field: "variation direction",
                    value: dir.map(String::from).unwrap_or_default(),
                })
            }
            (None, _) => None,
        };

        let mode = match sentence.field_char(11, "mode")? {
            Some(c) => Some(ModeIndicator::from_char(c).ok_or(ParseError::InvalidField {
                field: "mode",
                value: c.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            talker: sentence.talker,
            time: sentence.field(0).map(NmeaTime::parse_nmea).transpose()?,
            active,
            position: parse_position(sentence, 2)?,
            sog_knots: sentence.field_parse(6, "speed")?,
            cog_deg: sentence.field_parse(7, "course")?,
            date: sentence.field(8).map(NmeaDate::parse_nmea).transpose()?,
            magnetic_variation,
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str =
        "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A";

    #[test]
    fn test_parse_sample() {
        let rmc = Rmc::from_sentence(&NmeaSentence::parse(SAMPLE).unwrap()).unwrap();
        assert!(rmc.active);
        assert_eq!(rmc.time, NmeaTime::new(12, 35, 19, 0));
        assert_eq!(rmc.sog_knots, Some(22.4));
        assert_eq!(rmc.cog_deg, Some(84.4));
        assert_eq!(rmc.date, NmeaDate::new(1994, 3, 23));
        assert_eq!(rmc.magnetic_variation, Some(-3.1));
        assert_eq!(rmc.mode, None);
        assert!(rmc.position.is_some());
    }

    #[test]
    fn test_build() {
        let rmc = Rmc {
            talker: TalkerId::GP,
            time: NmeaTime::new(8, 0, 0, 0),
            active: true,
            position: GeoPosition::new(-33.5, -70.25),
            sog_knots: Some(12.0),
            cog_deg: Some(270.0),
            date: NmeaDate::new(2024, 6, 1),
            magnetic_variation: None,
            mode: Some(ModeIndicator::Simulator),
        };
        assert_eq!(
            rmc.to_sentence().body(),
            "GPRMC,080000.00,A,3330.0000,S,07015.0000,W,12.0,270.0,010624,,,S"
        );
    }

    #[test]
    fn test_round_trip_variation_east() {
        let rmc = Rmc {
            magnetic_variation: Some(4.5),
            active: true,
            ..Rmc::default()
        };
        let back = Rmc::from_sentence(&rmc.to_sentence()).unwrap();
        assert_eq!(back.magnetic_variation, Some(4.5));
        assert_eq!(back.mode, Some(ModeIndicator::NotValid));
    }

    #[test]
    fn test_rejects_bad_status() {
        let s = NmeaSentence::new(TalkerId::GP, SentenceId::Rmc, vec!["".into(), "X".into()]);
        assert!(Rmc::from_sentence(&s).is_err());
    }
}
