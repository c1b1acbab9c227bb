//! Assembly of a sample track into an activity document.

use chrono::TimeDelta;
use either::Either::{Left, Right};
use thiserror::Error;
use tracing::debug;

use crate::{
    sample::Sample,
    wire::{
        DeveloperField, EncodeError, Encoder,
        profile::MessageKind,
        value::{BaseType, Value},
    },
};

use super::summary::{Summary, lap_bounds};

const FILE_ACTIVITY: u8 = 4;
const MANUFACTURER_DEVELOPMENT: u16 = 255;
const PRODUCT: u16 = 1;
const PRODUCT_NAME: &str = "Pannier";
const SERIAL_NUMBER: u32 = 1024;

const EVENT_SESSION: u8 = 8;
const EVENT_LAP: u8 = 9;
const EVENT_ACTIVITY: u8 = 26;
const EVENT_TYPE_STOP: u8 = 1;
const ACTIVITY_MANUAL: u8 = 0;

const APPLICATION_ID: [u8; 16] = *b"pannier-activity";
const APPLICATION_VERSION: u32 = 1;

/// Field definition number of the wind developer field.
const WIND_FIELD_NUMBER: u8 = 0;
/// Developer data index of the declaring application.
const WIND_DEVELOPER_INDEX: u8 = 0;

/// Sport stamped into the summary messages.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Sport {
    Generic,
    Running,
    #[default]
    Cycling,
}

impl Sport {
    fn code(self) -> u8 {
        match self {
            Sport::Generic => 0,
            Sport::Running => 1,
            Sport::Cycling => 2,
        }
    }
}

/// An error assembling an activity document.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The sample sequence is empty.
    #[error("Cannot build an activity from an empty sample sequence.")]
    EmptyTrack,
    /// Sample times are not strictly increasing.
    #[error("Sample times must be strictly increasing (sample {index}).")]
    TimeNotIncreasing { index: usize },
    /// The repeat count is zero.
    #[error("Repeat count must be at least one.")]
    ZeroRepeat,
    /// A message could not be serialized.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// One replay of the track: the derived state for repeat iteration `k`.
struct Pass {
    /// Whether samples are visited in reverse order.
    reversed: bool,
    /// Shift applied to every record timestamp.
    time_offset: TimeDelta,
    /// Factor applied to every per-sample distance value.
    distance_scale: f64,
}

impl Pass {
    fn for_iteration(k: u32, repeat: u32, span: TimeDelta) -> Self {
        Pass {
            reversed: k % 2 == 1,
            time_offset: span * k as i32,
            distance_scale: repeat as f64 * (k + 1) as f64,
        }
    }
}

/// Assembles one activity document from a flat sample track.
///
/// The assembler owns its encoder for the duration of one build and emits
/// messages in document order: file identification, developer-field
/// declarations, the activity and session summaries, four laps, and one
/// record per sample per repeat pass.
pub struct Assembler<E: Encoder> {
    encoder: E,
    sport: Sport,
}

impl<E: Encoder> Assembler<E> {
    /// Create an assembler around a fresh encoder.
    pub fn new(encoder: E, sport: Sport) -> Self {
        Assembler { encoder, sport }
    }

    /// Build the document for `samples`, replaying the track `repeat` times
    /// with alternating direction.
    ///
    /// The track must be non-empty and strictly increasing in time, and
    /// `repeat` at least one.
    pub fn build(mut self, samples: &[Sample], repeat: u32) -> Result<Vec<u8>, BuildError> {
        if samples.is_empty() {
            return Err(BuildError::EmptyTrack);
        }
        if repeat == 0 {
            return Err(BuildError::ZeroRepeat);
        }
        if let Some(i) = samples.windows(2).position(|w| w[1].time <= w[0].time) {
            return Err(BuildError::TimeNotIncreasing { index: i + 1 });
        }

        debug!(samples = samples.len(), repeat, "assembling activity document");

        let first = &samples[0];
        let span = samples[samples.len() - 1].time - first.time;
        let full = Summary::over(samples, 0, samples.len(), repeat);

        self.file_id(first)?;
        self.developer_fields()?;
        self.activity(first, &full)?;
        self.session(&full)?;

        for (lap, (start, end)) in lap_bounds(samples.len()).into_iter().enumerate() {
            let summary = Summary::over(samples, start, end, repeat);
            self.lap(&summary, lap == 3)?;
        }

        for k in 0..repeat {
            let pass = Pass::for_iteration(k, repeat, span);
            self.records(samples, &pass)?;
        }

        debug!("assembly complete");

        Ok(self.encoder.finish()?)
    }

    fn file_id(&mut self, first: &Sample) -> Result<(), EncodeError> {
        let created = self.encoder.timestamp(&first.time);

        self.encoder.write(
            MessageKind::FileId,
            &[
                ("type", Value::Uint8(FILE_ACTIVITY)),
                ("manufacturer", Value::Uint16(MANUFACTURER_DEVELOPMENT)),
                ("product", Value::Uint16(PRODUCT)),
                ("serial_number", Value::Uint32(SERIAL_NUMBER)),
                ("time_created", Value::Uint32(created)),
                ("product_name", Value::Text(PRODUCT_NAME)),
            ],
            &[],
            true,
        )
    }

    fn developer_fields(&mut self) -> Result<(), EncodeError> {
        self.encoder.write(
            MessageKind::DeveloperDataId,
            &[
                ("developer_data_index", Value::Uint8(WIND_DEVELOPER_INDEX)),
                ("application_id", Value::Bytes(&APPLICATION_ID)),
                ("application_version", Value::Uint32(APPLICATION_VERSION)),
            ],
            &[],
            true,
        )?;

        self.encoder.write(
            MessageKind::FieldDescription,
            &[
                ("developer_data_index", Value::Uint8(WIND_DEVELOPER_INDEX)),
                ("field_definition_number", Value::Uint8(WIND_FIELD_NUMBER)),
                ("fit_base_type_id", Value::Uint8(BaseType::Float64.code())),
                ("field_name", Value::Text("wind")),
                ("units", Value::Text("m/s")),
            ],
            &[],
            true,
        )
    }

    fn activity(&mut self, first: &Sample, full: &Summary) -> Result<(), EncodeError> {
        let created = self.encoder.timestamp(&first.time);
        let offset = first.time.offset().local_minus_utc() as i64;
        let local = (created as i64 + offset).clamp(0, u32::MAX as i64) as u32;

        self.encoder.write(
            MessageKind::Activity,
            &[
                ("timestamp", Value::Uint32(created)),
                ("total_timer_time", Value::Float64(full.elapsed_s)),
                ("num_sessions", Value::Uint16(1)),
                ("type", Value::Uint8(ACTIVITY_MANUAL)),
                ("event", Value::Uint8(EVENT_ACTIVITY)),
                ("event_type", Value::Uint8(EVENT_TYPE_STOP)),
                ("local_timestamp", Value::Uint32(local)),
            ],
            &[],
            true,
        )
    }

    fn session(&mut self, full: &Summary) -> Result<(), EncodeError> {
        let start = self.encoder.timestamp(&full.start_time);
        let end = self.encoder.timestamp(&full.end_time);
        let lat = self.encoder.semicircles(full.start_latitude);
        let long = self.encoder.semicircles(full.start_longitude);

        self.encoder.write(
            MessageKind::Session,
            &[
                ("timestamp", Value::Uint32(end)),
                ("event", Value::Uint8(EVENT_SESSION)),
                ("event_type", Value::Uint8(EVENT_TYPE_STOP)),
                ("start_time", Value::Uint32(start)),
                ("start_position_lat", Value::Sint32(lat)),
                ("start_position_long", Value::Sint32(long)),
                ("sport", Value::Uint8(self.sport.code())),
                ("total_elapsed_time", Value::Float64(full.elapsed_s)),
                ("total_timer_time", Value::Float64(full.elapsed_s)),
                ("total_distance", Value::Float64(full.distance_m)),
                ("first_lap_index", Value::Uint16(0)),
                ("num_laps", Value::Uint16(4)),
            ],
            &[],
            true,
        )
    }

    fn lap(&mut self, summary: &Summary, last: bool) -> Result<(), EncodeError> {
        let start = self.encoder.timestamp(&summary.start_time);
        let end = self.encoder.timestamp(&summary.end_time);
        let lat = self.encoder.semicircles(summary.start_latitude);
        let long = self.encoder.semicircles(summary.start_longitude);

        self.encoder.write(
            MessageKind::Lap,
            &[
                ("timestamp", Value::Uint32(end)),
                ("event", Value::Uint8(EVENT_LAP)),
                ("event_type", Value::Uint8(EVENT_TYPE_STOP)),
                ("start_time", Value::Uint32(start)),
                ("start_position_lat", Value::Sint32(lat)),
                ("start_position_long", Value::Sint32(long)),
                ("total_elapsed_time", Value::Float64(summary.elapsed_s)),
                ("total_timer_time", Value::Float64(summary.elapsed_s)),
                ("total_distance", Value::Float64(summary.distance_m)),
                ("sport", Value::Uint8(self.sport.code())),
            ],
            &[],
            last,
        )
    }

    fn records(&mut self, samples: &[Sample], pass: &Pass) -> Result<(), EncodeError> {
        let ordered = if pass.reversed {
            Right(samples.iter().rev())
        } else {
            Left(samples.iter())
        };

        for sample in ordered {
            let time = sample.time + pass.time_offset;
            let timestamp = self.encoder.timestamp(&time);
            let lat = self.encoder.semicircles(sample.latitude);
            let long = self.encoder.semicircles(sample.longitude);

            let mut fields = vec![
                ("timestamp", Value::Uint32(timestamp)),
                ("position_lat", Value::Sint32(lat)),
                ("position_long", Value::Sint32(long)),
                ("altitude", Value::Float64(sample.elevation)),
                ("heart_rate", Value::Float64(sample.heart_rate)),
                ("cadence", Value::Float64(sample.cadence)),
                ("distance", Value::Float64(sample.distance * pass.distance_scale)),
                ("speed", Value::Float64(sample.speed)),
                ("cycles", Value::Float64(sample.cycles)),
            ];

            if let Some(power) = sample.power {
                fields.push(("power", Value::Float64(power)));
            }

            let wind = sample.wind.map(|value| DeveloperField {
                number: WIND_FIELD_NUMBER,
                index: WIND_DEVELOPER_INDEX,
                value,
            });

            self.encoder
                .write(MessageKind::Record, &fields, wind.as_slice(), false)?;
        }

        Ok(())
    }
}
