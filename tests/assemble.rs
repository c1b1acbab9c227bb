use std::{cell::RefCell, rc::Rc};

use chrono::{DateTime, FixedOffset, TimeDelta};
use pannier::activity::{Assembler, BuildError, Sport};
use pannier::sample::Sample;
use pannier::wire::{DeveloperField, EncodeError, Encoder, profile::MessageKind, value::Value};

/// A message captured by the recording encoder.
#[derive(Clone, Debug)]
struct Message {
    kind: MessageKind,
    fields: Vec<(&'static str, Value)>,
    developer: Vec<DeveloperField>,
    last: bool,
}

impl Message {
    fn field(&self, name: &str) -> Value {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
            .unwrap_or_else(|| panic!("message has no field `{name}`"))
    }

    fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| *n == name)
    }

    fn float(&self, name: &str) -> f64 {
        match self.field(name) {
            Value::Float64(x) => x,
            other => panic!("field `{name}` is not a measurement: {other:?}"),
        }
    }

    fn uint32(&self, name: &str) -> u32 {
        match self.field(name) {
            Value::Uint32(x) => x,
            other => panic!("field `{name}` is not a uint32: {other:?}"),
        }
    }

    fn sint32(&self, name: &str) -> i32 {
        match self.field(name) {
            Value::Sint32(x) => x,
            other => panic!("field `{name}` is not a sint32: {other:?}"),
        }
    }
}

/// Encoder recording every message instead of serializing it.
#[derive(Default)]
struct Recorder(Rc<RefCell<Vec<Message>>>);

impl Encoder for Recorder {
    fn write(
        &mut self,
        kind: MessageKind,
        fields: &[(&'static str, Value)],
        developer: &[DeveloperField],
        last: bool,
    ) -> Result<(), EncodeError> {
        self.0.borrow_mut().push(Message {
            kind,
            fields: fields.to_vec(),
            developer: developer.to_vec(),
            last,
        });
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, EncodeError> {
        Ok(Vec::new())
    }
}

fn start() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339("2024-05-01T06:00:00+02:00").unwrap()
}

fn sample(i: usize) -> Sample {
    Sample {
        time: start() + TimeDelta::seconds(i as i64 * 10),
        elevation: 1800.0 + i as f64,
        distance: i as f64 * 25.0,
        cadence: 80.0,
        heart_rate: 140.0,
        latitude: 46.5 + i as f64 * 0.001,
        longitude: 9.8 + i as f64 * 0.001,
        speed: 7.5,
        power: None,
        wind: None,
        cycles: (i % 256) as f64,
    }
}

fn track(count: usize) -> Vec<Sample> {
    (0..count).map(sample).collect()
}

fn build(samples: &[Sample], repeat: u32) -> Vec<Message> {
    let messages = Rc::new(RefCell::new(Vec::new()));
    Assembler::new(Recorder(Rc::clone(&messages)), Sport::Cycling)
        .build(samples, repeat)
        .unwrap();
    let recorded = messages.borrow().clone();
    recorded
}

fn records(messages: &[Message]) -> Vec<&Message> {
    messages
        .iter()
        .filter(|m| m.kind == MessageKind::Record)
        .collect()
}

#[test]
fn header_messages_precede_records() {
    let messages = build(&track(8), 1);
    let kinds: Vec<MessageKind> = messages.iter().map(|m| m.kind).collect();

    assert_eq!(
        &kinds[..5],
        &[
            MessageKind::FileId,
            MessageKind::DeveloperDataId,
            MessageKind::FieldDescription,
            MessageKind::Activity,
            MessageKind::Session,
        ],
    );
    assert!(kinds[5..9].iter().all(|k| *k == MessageKind::Lap));
    assert!(kinds[9..].iter().all(|k| *k == MessageKind::Record));
    assert_eq!(kinds.len(), 9 + 8);
}

#[test]
fn record_total_scales_with_repeat() {
    for repeat in 1..=4 {
        let messages = build(&track(5), repeat);
        assert_eq!(records(&messages).len(), 5 * repeat as usize);
    }
}

#[test]
fn four_laps_for_any_count() {
    for count in [1, 2, 3, 4, 5, 7, 8, 13] {
        let messages = build(&track(count), 1);
        let laps: Vec<&Message> = messages
            .iter()
            .filter(|m| m.kind == MessageKind::Lap)
            .collect();

        assert_eq!(laps.len(), 4, "count {count}");

        // Only the final lap closes out its message type.
        let flags: Vec<bool> = laps.iter().map(|m| m.last).collect();
        assert_eq!(flags, [false, false, false, true], "count {count}");

        // Lap starts never move backward.
        let starts: Vec<u32> = laps.iter().map(|m| m.uint32("start_time")).collect();
        assert!(starts.windows(2).all(|w| w[0] <= w[1]), "count {count}");

        // Contiguous partitions telescope to the session total.
        let session = messages
            .iter()
            .find(|m| m.kind == MessageKind::Session)
            .unwrap();
        let lap_total: f64 = laps.iter().map(|m| m.float("total_distance")).sum();
        assert_eq!(lap_total, session.float("total_distance"), "count {count}");
    }
}

#[test]
fn session_distance_spans_the_track() {
    let messages = build(&track(4), 1);
    let session = messages
        .iter()
        .find(|m| m.kind == MessageKind::Session)
        .unwrap();

    // The full-range summary reaches one past the final lap boundary and
    // clamps to the last sample.
    assert_eq!(session.float("total_distance"), 75.0);
    assert_eq!(session.float("total_elapsed_time"), 30.0);
}

#[test]
fn single_sample_laps_follow_the_quartiles() {
    let mut samples = track(4);
    for (i, sample) in samples.iter_mut().enumerate() {
        sample.distance = i as f64;
    }

    let messages = build(&samples, 1);
    let encoder = Recorder::default();

    let session = messages
        .iter()
        .find(|m| m.kind == MessageKind::Session)
        .unwrap();
    assert_eq!(session.float("total_distance"), 3.0);

    let laps: Vec<&Message> = messages
        .iter()
        .filter(|m| m.kind == MessageKind::Lap)
        .collect();

    for (i, lap) in laps.iter().enumerate() {
        assert_eq!(
            lap.sint32("start_position_lat"),
            encoder.semicircles(samples[i].latitude),
        );
    }

    let distances: Vec<f64> = laps.iter().map(|m| m.float("total_distance")).collect();
    assert_eq!(distances, [1.0, 1.0, 1.0, 0.0]);
}

#[test]
fn odd_passes_reverse_the_track() {
    let samples = track(4);
    let messages = build(&samples, 2);
    let records = records(&messages);
    let encoder = Recorder::default();

    assert_eq!(records.len(), 8);

    let span = samples[3].time - samples[0].time;

    for (j, record) in records[..4].iter().enumerate() {
        assert_eq!(
            record.sint32("position_lat"),
            encoder.semicircles(samples[j].latitude),
        );
        assert_eq!(record.uint32("timestamp"), encoder.timestamp(&samples[j].time));
    }

    for (j, record) in records[4..].iter().enumerate() {
        let original = &samples[3 - j];
        assert_eq!(
            record.sint32("position_lat"),
            encoder.semicircles(original.latitude),
        );
        assert_eq!(
            record.uint32("timestamp"),
            encoder.timestamp(&(original.time + span)),
        );
    }
}

#[test]
fn pass_distances_scale_with_repeat() {
    let samples = track(8);
    let messages = build(&samples, 2);
    let records = records(&messages);

    assert_eq!(records.len(), 16);

    // First pass: forward, each distance at repeat * 1.
    for (j, record) in records[..8].iter().enumerate() {
        assert_eq!(record.float("distance"), samples[j].distance * 2.0);
    }

    // Second pass: reversed, each distance at repeat * 2.
    for (j, record) in records[8..].iter().enumerate() {
        assert_eq!(record.float("distance"), samples[7 - j].distance * 4.0);
    }
}

#[test]
fn wind_attaches_exactly_when_present() {
    let mut samples = track(4);
    samples[0].wind = Some(5.0);
    samples[2].wind = Some(0.0);

    let messages = build(&samples, 2);
    let records = records(&messages);

    for (j, record) in records.iter().enumerate() {
        let original = if j < 4 { j } else { 7 - j };
        match samples[original].wind {
            Some(value) => {
                assert_eq!(
                    record.developer,
                    [DeveloperField { number: 0, index: 0, value }],
                );
            }
            None => assert!(record.developer.is_empty()),
        }
    }
}

#[test]
fn power_passes_through_when_reported() {
    let mut samples = track(3);
    samples[1].power = Some(215.0);

    let messages = build(&samples, 1);
    let records = records(&messages);

    assert!(!records[0].has_field("power"));
    assert_eq!(records[1].float("power"), 215.0);
    assert!(!records[2].has_field("power"));
}

#[test]
fn activity_carries_the_local_offset() {
    let messages = build(&track(2), 1);
    let activity = messages
        .iter()
        .find(|m| m.kind == MessageKind::Activity)
        .unwrap();

    let timestamp = activity.uint32("timestamp");
    let local = activity.uint32("local_timestamp");
    assert_eq!(local, timestamp + 7200);

    assert_eq!(activity.field("num_sessions"), Value::Uint16(1));
}

#[test]
fn empty_track_is_rejected() {
    let result = Assembler::new(Recorder::default(), Sport::Cycling).build(&[], 1);
    assert!(matches!(result, Err(BuildError::EmptyTrack)));
}

#[test]
fn zero_repeat_is_rejected() {
    let result = Assembler::new(Recorder::default(), Sport::Cycling).build(&track(3), 0);
    assert!(matches!(result, Err(BuildError::ZeroRepeat)));
}

#[test]
fn unordered_times_are_rejected() {
    let mut samples = track(3);
    samples[2].time = samples[1].time;

    let result = Assembler::new(Recorder::default(), Sport::Cycling).build(&samples, 1);
    assert!(matches!(
        result,
        Err(BuildError::TimeNotIncreasing { index: 2 }),
    ));
}
