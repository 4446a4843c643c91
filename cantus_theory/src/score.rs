// Generic score structure shared by the generators and the renderers.
//
// A score is a key, a time signature and a list of parts; a part is one
// named voice's measures; a measure is a list of notes, each a pitch or rest
// with a duration. Nothing here knows about counterpoint: the engine builds
// a `Score` from a finished realization, the harmonizer builds one directly,
// and lilypond.rs / midi.rs read them.

use crate::key::Key;
use crate::pitch::{Letter, Pitch};
use crate::time::{Duration, Offset, TimeSignature};
use serde::{Deserialize, Serialize};

/// Voice in SATB order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Voice {
    Soprano = 0,
    Alto = 1,
    Tenor = 2,
    Bass = 3,
}

impl Voice {
    pub const ALL: [Voice; 4] = [Voice::Soprano, Voice::Alto, Voice::Tenor, Voice::Bass];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Voice::Soprano => "Soprano",
            Voice::Alto => "Alto",
            Voice::Tenor => "Tenor",
            Voice::Bass => "Bass",
        }
    }

    /// Singable range, inclusive on both ends.
    pub fn range(self) -> (Pitch, Pitch) {
        match self {
            Voice::Soprano => (
                Pitch::from_notation(Letter::C, 0, 4),
                Pitch::from_notation(Letter::A, 0, 5),
            ),
            Voice::Alto => (
                Pitch::from_notation(Letter::F, 0, 3),
                Pitch::from_notation(Letter::D, 0, 5),
            ),
            Voice::Tenor => (
                Pitch::from_notation(Letter::C, 0, 3),
                Pitch::from_notation(Letter::A, 0, 4),
            ),
            Voice::Bass => (
                Pitch::from_notation(Letter::F, 0, 2),
                Pitch::from_notation(Letter::D, 0, 4),
            ),
        }
    }
}

/// A pitch (or rest, when `pitch` is `None`) with a duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Option<Pitch>,
    pub duration: Duration,
}

impl Note {
    pub fn new(pitch: Pitch, duration: Duration) -> Note {
        Note {
            pitch: Some(pitch),
            duration,
        }
    }

    pub fn rest(duration: Duration) -> Note {
        Note {
            pitch: None,
            duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Measure {
    pub notes: Vec<Note>,
}

impl Measure {
    pub fn new(notes: Vec<Note>) -> Measure {
        Measure { notes }
    }

    pub fn total_duration(&self) -> Duration {
        self.notes.iter().map(|n| n.duration).sum()
    }

    /// Pitch sounding at `offset`, or `None` during a rest.
    ///
    /// Panics if `offset` is at or past the end of the measure.
    pub fn pitch_at(&self, offset: Offset) -> Option<Pitch> {
        let mut start = Offset::ZERO;
        for note in &self.notes {
            let end = start + note.duration;
            if start <= offset && offset < end {
                return note.pitch;
            }
            start = end;
        }
        panic!(
            "offset {} outside measure of length {}",
            offset.value(),
            start.value()
        );
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    pub voice: Voice,
    pub measures: Vec<Measure>,
}

impl Part {
    /// All notes of the part in order, across measures.
    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.measures.iter().flat_map(|m| m.notes.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub key: Key,
    pub time_signature: TimeSignature,
    pub parts: Vec<Part>,
}

impl Score {
    pub fn part(&self, voice: Voice) -> Option<&Part> {
        self.parts.iter().find(|p| p.voice == voice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Pitch {
        Pitch::parse(s).unwrap()
    }

    #[test]
    fn voice_ranges() {
        assert_eq!(Voice::Soprano.range(), (p("C4"), p("A5")));
        assert_eq!(Voice::Alto.range(), (p("F3"), p("D5")));
        assert_eq!(Voice::Tenor.range(), (p("C3"), p("A4")));
        assert_eq!(Voice::Bass.range(), (p("F2"), p("D4")));
    }

    #[test]
    fn pitch_at_walks_note_spans() {
        let measure = Measure::new(vec![
            Note::rest(Duration::QUARTER),
            Note::new(p("G4"), Duration::HALF),
            Note::new(p("A4"), Duration::QUARTER),
        ]);
        assert_eq!(measure.total_duration(), Duration::WHOLE);
        assert_eq!(measure.pitch_at(Offset::quarters(0)), None);
        assert_eq!(measure.pitch_at(Offset::quarters(1)), Some(p("G4")));
        assert_eq!(measure.pitch_at(Offset::quarters(2)), Some(p("G4")));
        assert_eq!(measure.pitch_at(Offset::quarters(3)), Some(p("A4")));
    }

    #[test]
    #[should_panic(expected = "outside measure")]
    fn pitch_at_past_the_end_panics() {
        let measure = Measure::new(vec![Note::new(p("C4"), Duration::WHOLE)]);
        measure.pitch_at(Offset::quarters(4));
    }
}
