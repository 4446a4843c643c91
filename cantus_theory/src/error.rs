// Errors for malformed music-theory literals.
//
// Parsing is the only fallible surface of this crate: once a `Pitch`,
// `Interval` or `NoteName` exists, arithmetic on it is total.

use thiserror::Error;

/// Errors that can occur while parsing or constructing theory values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TheoryError {
    /// Note name text did not match `[A-G][#b]*`.
    #[error("invalid note name: '{0}'")]
    InvalidNoteName(String),

    /// Note name spelled with more accidentals than the model supports.
    #[error("note name out of range: {fifths} fifths from C (supported: -15..=19)")]
    NoteNameOutOfRange { fifths: i32 },

    /// Pitch text did not match `[A-G][#b]*<octave>`.
    #[error("invalid pitch: '{0}'")]
    InvalidPitch(String),

    /// Interval text did not match `-?(P|M|m|A+|d+)<number>`.
    #[error("invalid interval: '{0}'")]
    InvalidInterval(String),

    /// Quality that the interval number cannot take (e.g. a "perfect third").
    #[error("interval step {step} cannot have quality {alter}")]
    InvalidQuality { step: i32, alter: i32 },
}
