// Keys, scale degrees and diatonic motion within a key.
//
// A degree is (step 0..=6 along the scale, chromatic alteration). Conversion
// between note names and degrees works on the line of fifths: relative to the
// tonic, the unaltered degrees of a major key occupy fifths -1..=5 (F C G D A
// E B for C major) and those of a minor key -4..=2. The harmonic minor
// scale used for candidate pitches raises degree 7 by one.

use crate::interval::{Interval, IntervalStep};
use crate::pitch::{NoteName, Pitch};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

impl Mode {
    /// Shift of the unaltered-degree window on the line of fifths. Relative
    /// keys (C major, A minor) share a signature because of this offset.
    pub fn offset(self) -> i32 {
        match self {
            Mode::Major => 0,
            Mode::Minor => -3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Mode::Major => "major",
            Mode::Minor => "minor",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Key {
    pub tonic: NoteName,
    pub mode: Mode,
}

impl Key {
    pub const C_MAJOR: Key = Key {
        tonic: NoteName::C,
        mode: Mode::Major,
    };

    pub fn new(tonic: NoteName, mode: Mode) -> Key {
        Key { tonic, mode }
    }

    /// Ascending in-key pitches from `low` to `high` inclusive (by sounding
    /// height). Minor keys use the harmonic minor scale.
    pub fn scale_pitches(&self, low: Pitch, high: Pitch) -> Vec<Pitch> {
        let template: [Interval; 7] = match self.mode {
            Mode::Major => [
                Interval::UNISON,
                Interval::MAJOR_SECOND,
                Interval::MAJOR_THIRD,
                Interval::PERFECT_FOURTH,
                Interval::PERFECT_FIFTH,
                Interval::MAJOR_SIXTH,
                Interval::MAJOR_SEVENTH,
            ],
            Mode::Minor => [
                Interval::UNISON,
                Interval::MAJOR_SECOND,
                Interval::MINOR_THIRD,
                Interval::PERFECT_FOURTH,
                Interval::PERFECT_FIFTH,
                Interval::MINOR_SIXTH,
                Interval::MAJOR_SEVENTH,
            ],
        };

        // Highest tonic at or below `low`.
        let tonic_octave = ((low.note_name().fifths() - self.tonic.fifths()) * 7
            + low.octave() * 12)
            .div_euclid(12);
        let tonic = Pitch::new(tonic_octave, self.tonic);

        let mut result = Vec::new();
        for octave in 0.. {
            for interval in template {
                let pitch = tonic + interval + Interval::new(octave, 0);
                if pitch.num() < low.num() {
                    continue;
                }
                if pitch.num() > high.num() {
                    return result;
                }
                result.push(pitch);
            }
        }
        result
    }

    /// Move `pitch` by a diatonic step within this key. The result is always
    /// an unaltered scale degree: in C major, `C4 + 3rd` is E4 and
    /// `F#4 + 2nd` is G4.
    pub fn add_step(&self, pitch: Pitch, step: IntervalStep) -> Pitch {
        let degree = Degree::from_note_name(pitch.note_name(), *self);
        let target = Degree::new(degree.step + DegreeStep::wrapping(step.value()), 0);
        let fifth_delta = target.note_name(*self).fifths() - pitch.note_name().fifths();
        let residual = step.value() - 4 * fifth_delta;
        debug_assert_eq!(residual.rem_euclid(7), 0, "step and fifth disagree");
        pitch + Interval::new(residual / 7, fifth_delta)
    }
}

/// Scale step 0..=6 (tonic = 0). Arithmetic wraps around the octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DegreeStep(u8);

impl DegreeStep {
    pub const TONIC: DegreeStep = DegreeStep(0);
    pub const DOMINANT: DegreeStep = DegreeStep(4);

    pub const fn wrapping(value: i32) -> DegreeStep {
        DegreeStep(value.rem_euclid(7) as u8)
    }

    /// 1-indexed: `number(5)` is the dominant.
    pub const fn number(n: i32) -> DegreeStep {
        DegreeStep::wrapping(n - 1)
    }

    pub const fn value(self) -> i32 {
        self.0 as i32
    }
}

impl Add for DegreeStep {
    type Output = DegreeStep;

    fn add(self, rhs: DegreeStep) -> DegreeStep {
        DegreeStep::wrapping(self.value() + rhs.value())
    }
}

impl Sub for DegreeStep {
    type Output = DegreeStep;

    fn sub(self, rhs: DegreeStep) -> DegreeStep {
        DegreeStep::wrapping(self.value() - rhs.value())
    }
}

/// A scale degree with chromatic alteration (+1 raised, -1 lowered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Degree {
    pub step: DegreeStep,
    pub alter: i32,
}

impl Degree {
    pub const fn new(step: DegreeStep, alter: i32) -> Degree {
        Degree { step, alter }
    }

    pub fn from_note_name(note_name: NoteName, key: Key) -> Degree {
        let r = note_name.fifths() - key.tonic.fifths();
        let m = key.mode.offset();
        // Nearest integer to (r - m - 2) / 7; the division never lands on .5.
        let alter = (r - m - 2 + 3).div_euclid(7);
        let r0 = r - 7 * alter;
        Degree::new(DegreeStep::wrapping(4 * r0), alter)
    }

    pub fn note_name(self, key: Key) -> NoteName {
        let m = key.mode.offset();
        let low = -1 + m;
        // 4 * r0 ≡ step (mod 7)  <=>  r0 ≡ 2 * step (mod 7)
        let r0 = (2 * self.step.value() - low).rem_euclid(7) + low;
        NoteName::from_fifths(key.tonic.fifths() + r0 + 7 * self.alter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Pitch {
        Pitch::parse(s).unwrap()
    }

    fn n(s: &str) -> NoteName {
        NoteName::parse(s).unwrap()
    }

    fn pitches(list: &str) -> Vec<Pitch> {
        Pitch::parse_list(list).unwrap()
    }

    #[test]
    fn degrees_in_d_major() {
        let key = Key::new(n("D"), Mode::Major);
        let found: Vec<Degree> = pitches("D3 E3 F#3 G3 A3 B3 C#4 D4")
            .into_iter()
            .map(|pitch| Degree::from_note_name(pitch.note_name(), key))
            .collect();
        let expected: Vec<Degree> = [1, 2, 3, 4, 5, 6, 7, 1]
            .into_iter()
            .map(|s| Degree::new(DegreeStep::number(s), 0))
            .collect();
        assert_eq!(found, expected);
    }

    #[test]
    fn degrees_in_c_minor_mark_raised_leading_tone() {
        let key = Key::new(n("C"), Mode::Minor);
        let found: Vec<Degree> = pitches("C3 D3 Eb3 F3 G3 Ab3 B3")
            .into_iter()
            .map(|pitch| Degree::from_note_name(pitch.note_name(), key))
            .collect();
        let mut expected: Vec<Degree> = (1..=7)
            .map(|s| Degree::new(DegreeStep::number(s), 0))
            .collect();
        expected[6].alter = 1;
        assert_eq!(found, expected);
    }

    #[test]
    fn degree_note_name_round_trip() {
        for key in [
            Key::C_MAJOR,
            Key::new(n("A"), Mode::Minor),
            Key::new(n("Eb"), Mode::Major),
            Key::new(n("F#"), Mode::Minor),
        ] {
            for fifths in -8..=12 {
                let name = NoteName::from_fifths(key.tonic.fifths() + fifths);
                let degree = Degree::from_note_name(name, key);
                assert_eq!(degree.note_name(key), name, "{key:?} {name}");
            }
        }
    }

    #[test]
    fn scale_pitches_d_major() {
        let key = Key::new(n("D"), Mode::Major);
        assert_eq!(
            key.scale_pitches(p("F2"), p("D4")),
            pitches("F#2 G2 A2 B2 C#3 D3 E3 F#3 G3 A3 B3 C#4 D4")
        );
    }

    #[test]
    fn scale_pitches_c_major_soprano_range() {
        assert_eq!(
            Key::C_MAJOR.scale_pitches(p("C4"), p("A5")),
            pitches("C4 D4 E4 F4 G4 A4 B4 C5 D5 E5 F5 G5 A5")
        );
    }

    #[test]
    fn scale_pitches_harmonic_minor() {
        let key = Key::new(n("A"), Mode::Minor);
        assert_eq!(
            key.scale_pitches(p("A3"), p("A4")),
            pitches("A3 B3 C4 D4 E4 F4 G#4 A4")
        );
    }

    #[test]
    fn add_step_in_c_major() {
        let key = Key::C_MAJOR;
        assert_eq!(key.add_step(p("C4"), IntervalStep::number(3)), p("E4"));
        assert_eq!(key.add_step(p("C4"), IntervalStep::number(-4)), p("G3"));
        assert_eq!(key.add_step(p("B4"), IntervalStep::number(2)), p("C5"));
        assert_eq!(key.add_step(p("E5"), IntervalStep::number(-2)), p("D5"));
        assert_eq!(key.add_step(p("G4"), IntervalStep::number(8)), p("G5"));
        assert_eq!(key.add_step(p("C4"), IntervalStep::number(1)), p("C4"));
    }

    #[test]
    fn add_step_lands_on_unaltered_degrees() {
        assert_eq!(Key::C_MAJOR.add_step(p("F#4"), IntervalStep::number(2)), p("G4"));
    }

    #[test]
    fn degree_step_wraps() {
        assert_eq!(DegreeStep::number(7) + DegreeStep::number(2), DegreeStep::TONIC);
        assert_eq!(DegreeStep::TONIC - DegreeStep::wrapping(1), DegreeStep::number(7));
    }
}
