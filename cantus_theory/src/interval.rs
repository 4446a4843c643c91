// Intervals between spelled pitches.
//
// An interval is the pair (octave moves, fifth moves) that takes one pitch to
// another, so `Pitch - Pitch` and `Pitch + Interval` are plain componentwise
// arithmetic. The familiar properties are derived from that pair:
//
// - step: the diatonic distance counted from 0 (unison = 0, third = 2,
//   octave = 7; negative for downward intervals). Equal to
//   `4 * fifth + 7 * octave`.
// - alter: the quality. 0 perfect, +1 major, -1 minor, +2 augmented,
//   -2 diminished, +3 doubly augmented, ...
//
// Text form is the usual shorthand: "P5", "m3", "-M2" (a major second down),
// "AA4", "d5". There is no "augmented unison down"; that interval is written
// as a diminished unison up ("d1").

use crate::error::TheoryError;
use crate::pitch::Pitch;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Diatonic distance counted from 0 (unison). Negative means downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntervalStep(i32);

impl IntervalStep {
    pub const UNISON: IntervalStep = IntervalStep(0);
    pub const OCTAVE: IntervalStep = IntervalStep(7);

    pub const fn new(value: i32) -> IntervalStep {
        IntervalStep(value)
    }

    /// Build from a conventional, 1-indexed interval number: `number(3)` is
    /// a third up, `number(-2)` a second down. Panics on 0.
    pub const fn number(n: i32) -> IntervalStep {
        assert!(n != 0, "interval numbers start at 1");
        if n > 0 {
            IntervalStep(n - 1)
        } else {
            IntervalStep(n + 1)
        }
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    pub const fn abs(self) -> IntervalStep {
        IntervalStep(self.0.abs())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    octave: i32,
    fifth: i32,
}

impl Interval {
    pub const UNISON: Interval = Interval::new(0, 0);
    pub const DIMINISHED_UNISON: Interval = Interval::new(4, -7);
    pub const MINOR_SECOND: Interval = Interval::new(3, -5);
    pub const MAJOR_SECOND: Interval = Interval::new(-1, 2);
    pub const MINOR_THIRD: Interval = Interval::new(2, -3);
    pub const MAJOR_THIRD: Interval = Interval::new(-2, 4);
    pub const PERFECT_FOURTH: Interval = Interval::new(1, -1);
    pub const DIMINISHED_FIFTH: Interval = Interval::new(4, -6);
    pub const PERFECT_FIFTH: Interval = Interval::new(0, 1);
    pub const MINOR_SIXTH: Interval = Interval::new(3, -4);
    pub const MAJOR_SIXTH: Interval = Interval::new(-1, 3);
    pub const MAJOR_SEVENTH: Interval = Interval::new(-2, 5);
    pub const OCTAVE: Interval = Interval::new(1, 0);
    pub const MAJOR_TENTH: Interval = Interval::new(-1, 4);
    pub const TWELFTH: Interval = Interval::new(1, 1);
    pub const FIFTEENTH: Interval = Interval::new(2, 0);
    pub const MAJOR_SEVENTEENTH: Interval = Interval::new(0, 4);

    pub const fn new(octave: i32, fifth: i32) -> Interval {
        Interval { octave, fifth }
    }

    /// The interval that takes `base` to `target`.
    pub fn between(base: Pitch, target: Pitch) -> Interval {
        target - base
    }

    pub const fn octave(self) -> i32 {
        self.octave
    }

    pub const fn fifth(self) -> i32 {
        self.fifth
    }

    pub const fn step(self) -> IntervalStep {
        IntervalStep(4 * self.fifth + 7 * self.octave)
    }

    /// Quality: 0 perfect, ±1 major/minor, ±2.. augmented/diminished.
    pub fn alter(self) -> i32 {
        let abs_fifth = self.fifth.abs();
        let step_sgn = if self.step().0 < 0 { -1 } else { 1 };
        let fifth_sgn = if self.fifth < 0 { -1 } else { 1 };
        let sgn = step_sgn * fifth_sgn;
        if abs_fifth <= 1 {
            0
        } else if abs_fifth <= 5 {
            sgn
        } else {
            sgn * (2 + (abs_fifth - 6) / 7)
        }
    }

    /// Rebuild an interval from its step and quality. Fails when the step
    /// cannot carry that quality (a "perfect third", a "major fifth").
    pub fn from_step_alter(step: IntervalStep, alter: i32) -> Result<Interval, TheoryError> {
        let s = step.0;
        let invalid = || TheoryError::InvalidQuality { step: s, alter };
        // fifth ≡ 2 * step (mod 7)
        let f_class = (2 * s).rem_euclid(7);
        let upward = s >= 0;
        let f_base_sharp = (f_class - 6).rem_euclid(7) + 6;
        let f_base_flat = (f_class - 2).rem_euclid(7) - 12;

        let f = match alter {
            0 => match f_class {
                0 => 0,
                1 => 1,
                6 => -1,
                _ => return Err(invalid()),
            },
            1 | -1 => {
                if !(2..=5).contains(&f_class) {
                    return Err(invalid());
                }
                // Major: step and fifth share a sign. Minor: they differ.
                if upward == (alter == 1) {
                    f_class
                } else {
                    f_class - 7
                }
            }
            a if a >= 2 => {
                let k = a - 2;
                if upward {
                    f_base_sharp + 7 * k
                } else {
                    f_base_flat - 7 * k
                }
            }
            a => {
                let k = -a - 2;
                if upward {
                    f_base_flat - 7 * k
                } else {
                    f_base_sharp + 7 * k
                }
            }
        };

        let residual = s - 4 * f;
        if residual.rem_euclid(7) != 0 {
            return Err(invalid());
        }
        Ok(Interval::new(residual / 7, f))
    }

    /// Reduce to an ascending simple interval, keeping the quality: a major
    /// tenth becomes a major third, an octave a unison, and a major third
    /// down a major third up (not its inversion).
    pub fn normalize(self) -> Interval {
        let step = self.step().0;
        let alter = self.alter();
        let simple = IntervalStep(step.abs() % 7);
        match Interval::from_step_alter(simple, alter) {
            Ok(interval) => interval,
            Err(_) => unreachable!("simple step {simple:?} rejects quality {alter}"),
        }
    }

    /// The same interval, measured upward.
    pub fn abs(self) -> Interval {
        if self.step().0 < 0 {
            Interval::new(-self.octave, -self.fifth)
        } else {
            self
        }
    }

    pub fn name(self) -> String {
        let step = self.step().0;
        let sign = if step < 0 { "-" } else { "" };
        let alter = self.alter();
        let quality = match alter {
            0 => "P".to_string(),
            1 => "M".to_string(),
            -1 => "m".to_string(),
            a if a >= 2 => "A".repeat((a - 1) as usize),
            a => "d".repeat((-a - 1) as usize),
        };
        format!("{sign}{quality}{}", step.abs() + 1)
    }

    /// Parse "P1", "-m3", "AA4", "dd5", ... (inverse of `name`).
    pub fn parse(text: &str) -> Result<Interval, TheoryError> {
        let invalid = || TheoryError::InvalidInterval(text.to_string());
        let (sign, rest) = match text.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, text),
        };
        let quality_len = rest
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (quality, number) = rest.split_at(quality_len);
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let number: i32 = number.parse().map_err(|_| invalid())?;
        if number < 1 {
            return Err(invalid());
        }

        let alter = match quality {
            "P" => 0,
            "M" => 1,
            "m" => -1,
            q if !q.is_empty() && q.chars().all(|c| c == 'A') => q.len() as i32 + 1,
            q if !q.is_empty() && q.chars().all(|c| c == 'd') => -(q.len() as i32 + 1),
            _ => return Err(invalid()),
        };

        Interval::from_step_alter(IntervalStep((number - 1) * sign), alter)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for Interval {
    type Err = TheoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Pitch {
        Pitch::parse(s).unwrap()
    }

    fn i(s: &str) -> Interval {
        Interval::parse(s).unwrap()
    }

    #[test]
    fn between_pitches() {
        let cases = [
            ("C4", "E4", Interval::new(-2, 4), 3, 1),
            ("D4", "F4", Interval::new(2, -3), 3, -1),
            ("C4", "C5", Interval::new(1, 0), 8, 0),
            ("C4", "Bb2", Interval::new(0, -2), -9, 1),
            ("C4", "C#4", Interval::new(-4, 7), 1, 2),
            ("C4", "Cb4", Interval::new(4, -7), 1, -2),
            ("C4", "Dbb4", Interval::new(7, -12), 2, -2),
            ("C4", "B#3", Interval::new(-7, 12), -2, -2),
        ];
        for (base, target, expected, number, alter) in cases {
            let interval = Interval::between(p(base), p(target));
            assert_eq!(interval, expected, "{base} -> {target}");
            assert_eq!(interval.step(), IntervalStep::number(number));
            assert_eq!(interval.alter(), alter);
            assert_eq!(
                Interval::from_step_alter(interval.step(), interval.alter()),
                Ok(interval)
            );
        }
    }

    #[test]
    fn name_and_parse_agree_with_pitches() {
        let cases = [
            ("P1", "C4"),
            ("P5", "G4"),
            ("P4", "F4"),
            ("P8", "C5"),
            ("M2", "D4"),
            ("M3", "E4"),
            ("M6", "A4"),
            ("M7", "B4"),
            ("m2", "Db4"),
            ("m3", "Eb4"),
            ("m6", "Ab4"),
            ("m7", "Bb4"),
            ("A4", "F#4"),
            ("A1", "C#4"),
            ("d5", "Gb4"),
            ("d7", "Bbb4"),
            ("AA4", "F##4"),
            ("-M2", "Bb3"),
            ("-P8", "C3"),
        ];
        for (name, target) in cases {
            let interval = i(name);
            assert_eq!(interval.name(), name);
            assert_eq!(interval, Interval::between(p("C4"), p(target)), "{name}");
        }
    }

    #[test]
    fn named_constants_match_parsed_forms() {
        assert_eq!(i("P1"), Interval::UNISON);
        assert_eq!(i("d1"), Interval::DIMINISHED_UNISON);
        assert_eq!(i("m2"), Interval::MINOR_SECOND);
        assert_eq!(i("M2"), Interval::MAJOR_SECOND);
        assert_eq!(i("m3"), Interval::MINOR_THIRD);
        assert_eq!(i("M3"), Interval::MAJOR_THIRD);
        assert_eq!(i("P4"), Interval::PERFECT_FOURTH);
        assert_eq!(i("d5"), Interval::DIMINISHED_FIFTH);
        assert_eq!(i("P5"), Interval::PERFECT_FIFTH);
        assert_eq!(i("m6"), Interval::MINOR_SIXTH);
        assert_eq!(i("M6"), Interval::MAJOR_SIXTH);
        assert_eq!(i("M7"), Interval::MAJOR_SEVENTH);
        assert_eq!(i("P8"), Interval::OCTAVE);
        assert_eq!(i("M10"), Interval::MAJOR_TENTH);
        assert_eq!(i("P12"), Interval::TWELFTH);
        assert_eq!(i("P15"), Interval::FIFTEENTH);
        assert_eq!(i("M17"), Interval::MAJOR_SEVENTEENTH);
    }

    #[test]
    fn malformed_intervals_are_errors() {
        assert!(Interval::parse("P3").is_err());
        assert!(Interval::parse("M5").is_err());
        assert!(Interval::parse("X3").is_err());
        assert!(Interval::parse("M0").is_err());
        assert!(Interval::parse("m").is_err());
        assert!(Interval::parse("3").is_err());
        assert!(Interval::parse("Ad4").is_err());
    }

    #[test]
    fn normalize_reduces_compound_and_downward() {
        assert_eq!(i("M10").normalize(), i("M3"));
        assert_eq!(i("P8").normalize(), i("P1"));
        assert_eq!(i("P15").normalize(), i("P1"));
        assert_eq!(i("P12").normalize(), i("P5"));
        assert_eq!(i("-M3").normalize(), i("M3"));
        assert_eq!(i("-P5").normalize(), i("P5"));
        assert_eq!(i("d5").normalize(), i("d5"));
        assert_eq!(i("-m10").normalize(), i("m3"));
    }

    #[test]
    fn abs_flips_downward_intervals_only() {
        assert_eq!(i("-m2").abs(), i("m2"));
        assert_eq!(i("-P8").abs(), i("P8"));
        assert_eq!(i("M6").abs(), i("M6"));
        assert_eq!((p("B4") - p("C5")).abs(), i("m2"));
    }

    #[test]
    fn step_numbers() {
        assert_eq!(IntervalStep::number(1), IntervalStep::UNISON);
        assert_eq!(IntervalStep::number(8), IntervalStep::OCTAVE);
        assert_eq!(IntervalStep::number(-2).value(), -1);
        assert_eq!(IntervalStep::number(-5).abs(), IntervalStep::number(5));
    }
}
