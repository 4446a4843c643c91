// Pitch sets the move generators draw from.
//
// All sets are in-key pitches of the realized voice's range, filtered by
// their relation to a cantus firmus pitch:
//
// - opening: perfect unison, fifth, octave, twelfth or fifteenth above
// - closing: perfect unison, octave or fifteenth above
// - consonant: unison, third, fifth or sixth above (or compounds), less
//   than two octaves above, optionally narrowed by the chord role already
//   committed in the measure
//
// A melodic move between consecutive realized pitches is allowed when its
// size (ignoring direction) is one of m2 M2 m3 M3 P4 P5 m6 P8. Unison is
// excluded so the voice never repeats a pitch.

use crate::model::{KEY, realized_scale};
use cantus_theory::{Interval, IntervalStep, Pitch};

const OPENING_INTERVALS: [Interval; 5] = [
    Interval::UNISON,
    Interval::PERFECT_FIFTH,
    Interval::OCTAVE,
    Interval::TWELFTH,
    Interval::FIFTEENTH,
];

const CLOSING_INTERVALS: [Interval; 3] = [Interval::UNISON, Interval::OCTAVE, Interval::FIFTEENTH];

const MELODIC_INTERVALS: [Interval; 8] = [
    Interval::MINOR_SECOND,
    Interval::MAJOR_SECOND,
    Interval::MINOR_THIRD,
    Interval::MAJOR_THIRD,
    Interval::PERFECT_FOURTH,
    Interval::PERFECT_FIFTH,
    Interval::MINOR_SIXTH,
    Interval::OCTAVE,
];

/// Highest consonance above the cantus firmus: a fifteenth (step 14).
const MAX_CONSONANT_STEP: IntervalStep = IntervalStep::new(14);

const UNISON_STEP: i32 = 0;
const THIRD_STEP: i32 = 2;
const FIFTH_STEP: i32 = 4;
const SIXTH_STEP: i32 = 5;

fn in_range(pitch: &Pitch) -> bool {
    realized_scale().contains(pitch)
}

fn above_cf(cf: Pitch, intervals: &[Interval]) -> Vec<Pitch> {
    intervals
        .iter()
        .map(|&interval| cf + interval)
        .filter(in_range)
        .collect()
}

/// Pitches the piece may open on over `cf`.
pub fn opening_pitches(cf: Pitch) -> Vec<Pitch> {
    above_cf(cf, &OPENING_INTERVALS)
}

/// Pitches the piece may close on over `cf`.
pub fn closing_pitches(cf: Pitch) -> Vec<Pitch> {
    above_cf(cf, &CLOSING_INTERVALS)
}

/// Chord role a consonance commits the measure to, given the role already
/// committed. The outer `None` means the consonance is not allowed at all.
///
/// A fifth above the cantus firmus implies root position, a sixth first
/// inversion; unison and third fit either.
fn chord_role(normalized_step: i32, committed: Option<bool>) -> Option<Option<bool>> {
    match (committed, normalized_step) {
        (None, UNISON_STEP | THIRD_STEP) => Some(None),
        (None, FIFTH_STEP) => Some(Some(true)),
        (None, SIXTH_STEP) => Some(Some(false)),
        (Some(true), UNISON_STEP | THIRD_STEP | FIFTH_STEP) => Some(Some(true)),
        (Some(false), UNISON_STEP | THIRD_STEP | SIXTH_STEP) => Some(Some(false)),
        _ => None,
    }
}

/// Consonances over `cf` compatible with `committed`, lowest first, each
/// paired with the chord role choosing it would commit to.
pub fn harmonic_pitches_with_chord(cf: Pitch, committed: Option<bool>) -> Vec<(Pitch, Option<bool>)> {
    realized_scale()
        .into_iter()
        .filter(|pitch| cf.num() <= pitch.num() && (*pitch - cf).step() <= MAX_CONSONANT_STEP)
        .filter_map(|pitch| {
            let step = (pitch - cf).normalize().step().value();
            chord_role(step, committed).map(|role| (pitch, role))
        })
        .collect()
}

/// Every consonance over `cf`, regardless of chord role.
pub fn consonant_pitches(cf: Pitch) -> Vec<Pitch> {
    harmonic_pitches_with_chord(cf, None)
        .into_iter()
        .map(|(pitch, _)| pitch)
        .collect()
}

/// Pitches that may open the next measure over `next_cf`: the closing set
/// when that measure ends the piece, the consonant set otherwise.
pub fn next_measure_pitches(next_cf: Pitch, next_is_last: bool) -> Vec<Pitch> {
    if next_is_last {
        closing_pitches(next_cf)
    } else {
        consonant_pitches(next_cf)
    }
}

/// Chord role implied by a pitch carried over the barline onto `cf`.
///
/// Panics if the carried pitch is not a consonance: the generators only
/// ever carry pitches drawn from the consonant or closing sets.
pub fn chord_role_of_mark(cf: Pitch, mark: Pitch) -> Option<bool> {
    let step = (cf - mark).normalize().step().value();
    match step {
        FIFTH_STEP => Some(true),
        SIXTH_STEP => Some(false),
        UNISON_STEP | THIRD_STEP => None,
        other => panic!("carried pitch {mark} forms step {other} with cantus firmus {cf}"),
    }
}

pub fn is_melodic_interval(from: Pitch, to: Pitch) -> bool {
    MELODIC_INTERVALS.contains(&(to - from).abs())
}

/// The scale run from `from` (exclusive) by `step`, one diatonic step at
/// a time. `step` 0 gives an empty run.
pub fn conjunct_pitches(from: Pitch, step: IntervalStep) -> Vec<Pitch> {
    let v = step.value();
    let steps: Vec<i32> = if v >= 0 {
        (1..=v).collect()
    } else {
        (v..=-1).rev().collect()
    };
    steps
        .into_iter()
        .map(|s| KEY.add_step(from, IntervalStep::new(s)))
        .collect()
}
