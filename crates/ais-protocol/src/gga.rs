//! GGA: Global Positioning System Fix Data
//!
//! ```text
//! $GPGGA,hhmmss.ss,llll.llll,a,yyyyy.yyyy,a,q,nn,h.h,a.a,M,g.g,M,t.t,ssss*CC
//! ```

use crate::error::ParseError;
use crate::nmea::{format_opt_f64, NmeaSentence, SentenceId, TalkerId};
use crate::position::GeoPosition;
use crate::time::NmeaTime;

/// GPS quality indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum FixQuality {
    #[default]
    Invalid = 0,
    Gps = 1,
    Dgps = 2,
    Pps = 3,
    Rtk = 4,
    FloatRtk = 5,
    Estimated = 6,
    Manual = 7,
    Simulation = 8,
}

impl FixQuality {
    pub fn from_code(code: u8) -> Option<Self> {
        use FixQuality::*;
        Some(match code {
            0 => Invalid,
            1 => Gps,
            2 => Dgps,
            3 => Pps,
            4 => Rtk,
            5 => FloatRtk,
            6 => Estimated,
            7 => Manual,
            8 => Simulation,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gga {
    pub talker: TalkerId,
    pub time: Option<NmeaTime>,
    pub position: Option<GeoPosition>,
    pub fix_quality: FixQuality,
    pub satellites: Option<u8>,
    pub hdop: Option<f64>,
    /// Antenna altitude above mean sea level, meters
    pub altitude_m: Option<f64>,
    /// Geoid separation, meters
    pub geoid_separation_m: Option<f64>,
    /// Age of differential corrections, seconds
    pub dgps_age: Option<f64>,
    pub dgps_station: Option<String>,
}

impl Gga {
    pub fn to_sentence(&self) -> NmeaSentence {
        let mut fields = Vec::with_capacity(14);
        fields.push(self.time.map(|t| t.to_nmea()).unwrap_or_default());
        push_position(&mut fields, self.position.as_ref());
        fields.push((self.fix_quality as u8).to_string());
        fields.push(self.satellites.map(|n| format!("{n:02}")).unwrap_or_default());
        fields.push(format_opt_f64(self.hdop, 1));
        push_with_unit(&mut fields, self.altitude_m);
        push_with_unit(&mut fields, self.geoid_separation_m);
        fields.push(format_opt_f64(self.dgps_age, 1));
        fields.push(self.dgps_station.clone().unwrap_or_default());
        NmeaSentence::new(self.talker, SentenceId::Gga, fields)
    }

    pub fn from_sentence(sentence: &NmeaSentence) -> Result<Self, ParseError> {
        if sentence.sentence_id != SentenceId::Gga {
            return Err(ParseError::UnsupportedSentenceType(
                sentence.sentence_id.to_string(),
            ));
        }
        let quality_code = sentence.field_parse::<u8>(5, "fix quality")?.unwrap_or(0);
        let fix_quality = FixQuality::from_code(quality_code).ok_or(ParseError::InvalidField {
            field: "fix quality",
            value: quality_code.to_string(),
        })?;

        Ok(Self {
            talker: sentence.talker,
            time: sentence.field(0).map(NmeaTime::parse_nmea).transpose()?,
            position: parse_position(sentence, 1)?,
            fix_quality,
            satellites: sentence.field_parse(6, "satellites")?,
            hdop: sentence.field_parse(7, "hdop")?,
            altitude_m: sentence.field_parse(8, "altitude")?,
            geoid_separation_m: sentence.field_parse(10, "geoid separation")?,
            dgps_age: sentence.field_parse(12, "dgps age")?,
            dgps_station: sentence.field(13).map(str::to_string),
        })
    }
}

pub(crate) fn push_position(fields: &mut Vec<String>, position: Option<&GeoPosition>) {
    match position {
        Some(pos) => {
            let (lat, ns, lon, ew) = pos.to_nmea();
            fields.extend([lat, ns.to_string(), lon, ew.to_string()]);
        }
        None => fields.extend(std::iter::repeat(String::new()).take(4)),
    }
}

/// Parse the four position fields starting at `first`, `None` if any is empty
pub(crate) fn parse_position(
    sentence: &NmeaSentence,
    first: usize,
) -> Result<Option<GeoPosition>, ParseError> {
    match (
        sentence.field(first),
        sentence.field(first + 1),
        sentence.field(first + 2),
        sentence.field(first + 3),
    ) {
        (Some(lat), Some(ns), Some(lon), Some(ew)) => {
            GeoPosition::from_nmea(lat, ns, lon, ew).map(Some)
        }
        _ => Ok(None),
    }
}

fn push_with_unit(fields: &mut Vec<String>, meters: Option<f64>) {
    match meters {
        Some(m) => fields.extend([format!("{m:.1}"), "M".to_string()]),
        None => fields.extend([String::new(), String::new()]),
    }
}
