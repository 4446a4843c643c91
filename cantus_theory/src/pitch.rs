// Note names and pitches on the line of fifths.
//
// A note name is a signed count of perfect fifths from C (F = -1, C = 0,
// G = 1, D = 2, ... , B = 5; each sharp adds 7, each flat subtracts 7). A
// pitch pairs a note name with an octave component, so that every pitch is
// "C4 moved up `octave` octaves and `fifths` perfect fifths". This keeps
// spelling exact: F#4 and Gb4 are different pitches that happen to sound the
// same, and the interval between two pitches is just the componentwise
// difference (see interval.rs).
//
// Equality and hashing are by spelling. Use `cmp_height` (or `num`) when
// comparing how high two pitches sound.

use crate::error::TheoryError;
use crate::interval::Interval;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Natural note letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    pub fn from_char(c: char) -> Option<Letter> {
        match c {
            'C' => Some(Letter::C),
            'D' => Some(Letter::D),
            'E' => Some(Letter::E),
            'F' => Some(Letter::F),
            'G' => Some(Letter::G),
            'A' => Some(Letter::A),
            'B' => Some(Letter::B),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }

    /// Position of the natural on the line of fifths.
    pub const fn base_fifth(self) -> i32 {
        match self {
            Letter::F => -1,
            Letter::C => 0,
            Letter::G => 1,
            Letter::D => 2,
            Letter::A => 3,
            Letter::E => 4,
            Letter::B => 5,
        }
    }

    /// Octave component of the natural in notated octave 4, chosen so that
    /// `7 * base_fifth + 12 * base_octave` is its semitone distance from C4.
    pub const fn base_octave(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => -1,
            Letter::E => -2,
            Letter::F => 1,
            Letter::G => 0,
            Letter::A => -1,
            Letter::B => -2,
        }
    }

    fn from_base_fifth(fifth: i32) -> Letter {
        match fifth {
            -1 => Letter::F,
            0 => Letter::C,
            1 => Letter::G,
            2 => Letter::D,
            3 => Letter::A,
            4 => Letter::E,
            5 => Letter::B,
            _ => unreachable!("base fifth outside -1..=5: {fifth}"),
        }
    }
}

/// A spelled note name without octave: C, F#, Bb, F##, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteName(i32);

impl NoteName {
    pub const C: NoteName = NoteName::from_notation(Letter::C, 0);
    pub const D: NoteName = NoteName::from_notation(Letter::D, 0);
    pub const E: NoteName = NoteName::from_notation(Letter::E, 0);
    pub const F: NoteName = NoteName::from_notation(Letter::F, 0);
    pub const G: NoteName = NoteName::from_notation(Letter::G, 0);
    pub const A: NoteName = NoteName::from_notation(Letter::A, 0);
    pub const B: NoteName = NoteName::from_notation(Letter::B, 0);

    /// Smallest and largest supported fifth counts (Fbb..B##).
    pub const MIN_FIFTHS: i32 = -15;
    pub const MAX_FIFTHS: i32 = 19;

    /// Checked constructor for user-facing input.
    pub fn new(fifths: i32) -> Result<NoteName, TheoryError> {
        if (Self::MIN_FIFTHS..=Self::MAX_FIFTHS).contains(&fifths) {
            Ok(NoteName(fifths))
        } else {
            Err(TheoryError::NoteNameOutOfRange { fifths })
        }
    }

    /// Unchecked constructor used by interval arithmetic.
    pub const fn from_fifths(fifths: i32) -> NoteName {
        NoteName(fifths)
    }

    pub const fn from_notation(letter: Letter, alter: i32) -> NoteName {
        NoteName(letter.base_fifth() + 7 * alter)
    }

    pub const fn fifths(self) -> i32 {
        self.0
    }

    /// Letter and accidental count, using the spelling with the fewest
    /// accidentals. `F#` gives `(F, 1)`, `Bb` gives `(B, -1)`.
    pub fn notation(self) -> (Letter, i32) {
        let base = (self.0 + 1).rem_euclid(7) - 1;
        let alter = (self.0 - base).div_euclid(7);
        (Letter::from_base_fifth(base), alter)
    }

    pub fn name(self) -> String {
        let (letter, alter) = self.notation();
        let mut out = String::new();
        out.push(letter.as_char());
        push_accidentals(&mut out, alter);
        out
    }

    /// Parse "C", "F#", "Bb", "F##" and the like.
    pub fn parse(text: &str) -> Result<NoteName, TheoryError> {
        let mut chars = text.chars();
        let letter = chars
            .next()
            .and_then(Letter::from_char)
            .ok_or_else(|| TheoryError::InvalidNoteName(text.to_string()))?;
        let alter = parse_accidentals(chars.as_str())
            .ok_or_else(|| TheoryError::InvalidNoteName(text.to_string()))?;
        NoteName::new(letter.base_fifth() + 7 * alter)
    }
}

impl fmt::Display for NoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for NoteName {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NoteName::parse(s)
    }
}

/// A spelled pitch with octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pitch {
    octave: i32,
    note_name: NoteName,
}

impl Pitch {
    pub const fn new(octave: i32, note_name: NoteName) -> Pitch {
        Pitch { octave, note_name }
    }

    /// Build a pitch from conventional notation, e.g. `(F, 1, 4)` for F#4.
    pub const fn from_notation(letter: Letter, alter: i32, notated_octave: i32) -> Pitch {
        Pitch {
            octave: letter.base_octave() - 4 * alter + notated_octave - 4,
            note_name: NoteName::from_notation(letter, alter),
        }
    }

    pub const fn octave(self) -> i32 {
        self.octave
    }

    pub const fn note_name(self) -> NoteName {
        self.note_name
    }

    /// Letter, accidental count and notated octave (F#4 gives `(F, 1, 4)`).
    pub fn notation(self) -> (Letter, i32, i32) {
        let (letter, alter) = self.note_name.notation();
        let notated_octave = self.octave - letter.base_octave() + 4 * alter + 4;
        (letter, alter, notated_octave)
    }

    /// Semitones above C4 (negative below).
    pub const fn num(self) -> i32 {
        7 * self.note_name.fifths() + 12 * self.octave
    }

    /// MIDI key number, with C4 = 60.
    pub const fn midi(self) -> i32 {
        60 + self.num()
    }

    /// Compare by sounding height, ignoring spelling.
    pub fn cmp_height(&self, other: &Pitch) -> Ordering {
        self.num().cmp(&other.num())
    }

    pub fn name(self) -> String {
        let (letter, alter, notated_octave) = self.notation();
        let mut out = String::new();
        out.push(letter.as_char());
        push_accidentals(&mut out, alter);
        out.push_str(&notated_octave.to_string());
        out
    }

    /// Parse "C4", "F#3", "Bb5", "F##4". `Pitch::parse(&p.name()) == Ok(p)`
    /// for every pitch with a non-negative notated octave.
    pub fn parse(text: &str) -> Result<Pitch, TheoryError> {
        let invalid = || TheoryError::InvalidPitch(text.to_string());
        let digits_at = text
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (name_part, octave_part) = text.split_at(digits_at);
        if !octave_part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let notated_octave: i32 = octave_part.parse().map_err(|_| invalid())?;
        let mut chars = name_part.chars();
        let letter = chars.next().and_then(Letter::from_char).ok_or_else(invalid)?;
        let alter = parse_accidentals(chars.as_str()).ok_or_else(invalid)?;
        NoteName::new(letter.base_fifth() + 7 * alter)?;
        Ok(Pitch::from_notation(letter, alter, notated_octave))
    }

    /// Parse a whitespace-separated list of pitches.
    pub fn parse_list(text: &str) -> Result<Vec<Pitch>, TheoryError> {
        text.split_whitespace().map(Pitch::parse).collect()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Pitch {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pitch::parse(s)
    }
}

impl Add<Interval> for Pitch {
    type Output = Pitch;

    fn add(self, rhs: Interval) -> Pitch {
        Pitch {
            octave: self.octave + rhs.octave(),
            note_name: NoteName::from_fifths(self.note_name.fifths() + rhs.fifth()),
        }
    }
}

/// `a - b` is the interval that takes `b` to `a`.
impl Sub<Pitch> for Pitch {
    type Output = Interval;

    fn sub(self, rhs: Pitch) -> Interval {
        Interval::new(
            self.octave - rhs.octave,
            self.note_name.fifths() - rhs.note_name.fifths(),
        )
    }
}

fn parse_accidentals(text: &str) -> Option<i32> {
    let mut alter = 0;
    for c in text.chars() {
        match c {
            '#' => alter += 1,
            'b' => alter -= 1,
            _ => return None,
        }
    }
    Some(alter)
}

fn push_accidentals(out: &mut String, alter: i32) {
    let symbol = if alter > 0 { '#' } else { 'b' };
    for _ in 0..alter.abs() {
        out.push(symbol);
    }
}
