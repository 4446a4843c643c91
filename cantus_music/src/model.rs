// Annotated notes and measures for the realized counterpoint voice.
//
// Plain score notes (`cantus_theory::Note`) are tagged with the role they
// play against the cantus firmus: harmonic (consonant at its onset), passing
// or neighbor. The validators need these tags to excuse non-harmonic tones
// from some rules, and to locate the note sounding at any offset of a
// measure.
//
// Also holds the fixed musical setting of the search: key, meter, which
// part sings the cantus firmus and which part is realized.

use crate::error::CounterpointError;
use cantus_theory::{Duration, Key, Measure, Note, Offset, Pitch, TimeSignature, Voice};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Key every realization is written in.
pub const KEY: Key = Key::C_MAJOR;

pub const TIME_SIGNATURE: TimeSignature = TimeSignature::COMMON;

/// One measure holds exactly one cantus firmus note.
pub const MEASURE_DURATION: Duration = Duration::WHOLE;

pub const CANTUS_FIRMUS_VOICE: Voice = Voice::Bass;

pub const REALIZED_VOICE: Voice = Voice::Soprano;

/// In-key pitches the realized voice may sing, lowest first.
pub fn realized_scale() -> Vec<Pitch> {
    let (low, high) = REALIZED_VOICE.range();
    KEY.scale_pitches(low, high)
}

/// Note value of one atomic note in the realized voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RhythmType {
    Quarter,
    Half,
    Whole,
}

impl RhythmType {
    pub fn note_duration(self) -> Duration {
        match self {
            RhythmType::Quarter => Duration::QUARTER,
            RhythmType::Half => Duration::HALF,
            RhythmType::Whole => Duration::WHOLE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            RhythmType::Quarter => "quarter",
            RhythmType::Half => "half",
            RhythmType::Whole => "whole",
        }
    }
}

impl fmt::Display for RhythmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RhythmType {
    type Err = CounterpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quarter" | "4" => Ok(RhythmType::Quarter),
            "half" | "2" => Ok(RhythmType::Half),
            "whole" | "1" => Ok(RhythmType::Whole),
            _ => Err(CounterpointError::UnknownRhythm(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToneType {
    Harmonic,
    Passing,
    Neighbor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedNote {
    pub note: Note,
    pub tone_type: ToneType,
}

impl AnnotatedNote {
    pub fn new(pitch: Pitch, duration: Duration, tone_type: ToneType) -> Self {
        Self {
            note: Note::new(pitch, duration),
            tone_type,
        }
    }

    /// Rests only ever open the piece, and count as harmonic.
    pub fn rest(duration: Duration) -> Self {
        Self {
            note: Note::rest(duration),
            tone_type: ToneType::Harmonic,
        }
    }

    pub fn pitch(&self) -> Option<Pitch> {
        self.note.pitch
    }

    pub fn duration(&self) -> Duration {
        self.note.duration
    }

    pub fn is_harmonic(&self) -> bool {
        self.tone_type == ToneType::Harmonic
    }
}

/// A finished measure of the realized voice. Durations sum to
/// `MEASURE_DURATION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedMeasure {
    pub notes: Vec<AnnotatedNote>,
}

impl AnnotatedMeasure {
    pub fn new(notes: Vec<AnnotatedNote>) -> Self {
        Self { notes }
    }

    pub fn total_duration(&self) -> Duration {
        self.notes.iter().map(|n| n.duration()).sum()
    }

    /// Onset of every note, in order.
    pub fn onsets(&self) -> Vec<Offset> {
        let mut onset = Offset::ZERO;
        self.notes
            .iter()
            .map(|n| {
                let start = onset;
                onset = onset + n.duration();
                start
            })
            .collect()
    }

    /// The note sounding at `offset` and its onset.
    ///
    /// Panics if `offset` lies outside the measure.
    pub fn note_at(&self, offset: Offset) -> (Offset, &AnnotatedNote) {
        let mut onset = Offset::ZERO;
        for note in &self.notes {
            let end = onset + note.duration();
            if onset <= offset && offset < end {
                return (onset, note);
            }
            onset = end;
        }
        panic!(
            "offset {} outside measure of length {}",
            offset.value(),
            onset.value()
        );
    }

    /// Pitch sounding at `offset`, `None` during the opening rest.
    pub fn pitch_at(&self, offset: Offset) -> Option<Pitch> {
        self.note_at(offset).1.pitch()
    }

    /// Sounding pitches in order, rests skipped.
    pub fn pitches(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.notes.iter().filter_map(|n| n.pitch())
    }

    pub fn last_pitch(&self) -> Option<Pitch> {
        self.notes.last().and_then(|n| n.pitch())
    }

    pub fn first_pitch(&self) -> Option<Pitch> {
        self.notes.first().and_then(|n| n.pitch())
    }

    /// Drop the annotations.
    pub fn to_measure(&self) -> Measure {
        Measure::new(self.notes.iter().map(|n| n.note).collect())
    }
}
