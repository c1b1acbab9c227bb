//! A builder for activity files in Garmin's Flexible and Interoperable Data
//! Transfer format.
//!
//! Pannier turns a flat, time-ordered sample track into the hierarchical
//! message structure fitness platforms expect: file identification,
//! developer-field declarations, summaries, a fixed four-lap segmentation,
//! and one record per sample. A replay mode repeats the track while
//! alternating direction, for synthesizing arbitrarily large files.
//!
//! Most users should begin with [`convert`], which reads a raw JSON track
//! and writes a finished file. The [`activity`] module exposes the assembler
//! for applications managing their own input and output, and [`wire`] the
//! low-level document encoder for those emitting other message streams.

pub mod activity;
pub mod convert;
pub mod sample;
pub mod wire;
