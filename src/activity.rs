//! Assembly of sample tracks into activity documents.
//!
//! The [`Assembler`] maps a flat, time-ordered sample sequence onto the
//! hierarchical message structure of an activity file: file identification,
//! developer-field declarations, an activity summary, a session summary, a
//! fixed four-lap segmentation, and one record message per sample. A repeat
//! count above one replays the track with alternating direction, shifting
//! timestamps and scaling distances per pass.
//!
//! Assembly is written against the [`crate::wire::Encoder`] capability, so
//! its ordering and segmentation can be tested with a recording encoder.

mod summary;

pub mod builder;

pub use builder::{Assembler, BuildError, Sport};
