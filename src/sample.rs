//! Parsing of raw sample tracks.
//!
//! A track arrives as a JSON array of objects, one per observation. Every
//! required field must be present with the correct primitive type; optional
//! fields pass through as absent rather than defaulting to zero. Parsing
//! fails on the first mismatch, before any output is produced.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value as Json};
use thiserror::Error;

/// One timestamped observation from a recording device.
#[derive(Clone, Debug)]
pub struct Sample {
    /// Absolute instant of the observation, with its recorded UTC offset.
    pub time: DateTime<FixedOffset>,
    /// Elevation in meters.
    pub elevation: f64,
    /// Cumulative distance in meters.
    pub distance: f64,
    /// Crank cadence in revolutions per minute.
    pub cadence: f64,
    /// Heart rate in beats per minute.
    pub heart_rate: f64,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Speed in meters per second.
    pub speed: f64,
    /// Power in watts, when the source reports it.
    pub power: Option<f64>,
    /// Wind speed in meters per second, when the source reports it.
    pub wind: Option<f64>,
    /// Crank revolution counter, wrapping within `0..=255`.
    pub cycles: f64,
}

/// An error reading a raw sample track.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The input is not a sequence of structured records.
    #[error("Input is not a sequence of structured records.")]
    NotASequence,
    /// A field is missing or has the wrong primitive type.
    #[error("Sample {index}, field `{field}`: expected {expected}.")]
    Field {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
}

/// Parse a raw JSON track into a sample sequence.
pub fn parse(input: &[u8]) -> Result<Vec<Sample>, ParseError> {
    let document: Json = serde_json::from_slice(input).map_err(|_| ParseError::NotASequence)?;
    let records = document.as_array().ok_or(ParseError::NotASequence)?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| sample(index, record))
        .collect()
}

fn sample(index: usize, record: &Json) -> Result<Sample, ParseError> {
    let record = record.as_object().ok_or(ParseError::NotASequence)?;

    Ok(Sample {
        time: instant(index, record)?,
        elevation: required(index, record, "elevation")?,
        distance: required(index, record, "distance")?,
        cadence: required(index, record, "cadence")?,
        heart_rate: required(index, record, "heart_rate")?,
        latitude: required(index, record, "latitude")?,
        longitude: required(index, record, "longitude")?,
        speed: required(index, record, "speed")?,
        power: optional(index, record, "power")?,
        wind: optional(index, record, "wind")?,
        cycles: required(index, record, "cycles")?,
    })
}

fn instant(index: usize, record: &Map<String, Json>) -> Result<DateTime<FixedOffset>, ParseError> {
    record
        .get("time")
        .and_then(Json::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .ok_or(ParseError::Field {
            index,
            field: "time",
            expected: "an RFC 3339 timestamp string",
        })
}

fn required(
    index: usize,
    record: &Map<String, Json>,
    field: &'static str,
) -> Result<f64, ParseError> {
    record
        .get(field)
        .and_then(Json::as_f64)
        .ok_or(ParseError::Field {
            index,
            field,
            expected: "a number",
        })
}

/// Read an optional numeric field. Absent and `null` entries are both
/// treated as not present.
fn optional(
    index: usize,
    record: &Map<String, Json>,
    field: &'static str,
) -> Result<Option<f64>, ParseError> {
    match record.get(field) {
        None | Some(Json::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(ParseError::Field {
                index,
                field,
                expected: "a number",
            }),
    }
}
