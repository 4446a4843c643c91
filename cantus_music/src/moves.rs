// Move generators: one local context in, candidate successor contexts out.
//
// Each generator appends one figure to the measure's note buffer:
//
// - start note: the opening pitch of the piece (after a leading rest unless
//   the rhythm is whole notes)
// - end note: the closing whole note of the piece
// - harmonic tone: one consonant note
// - passing tones: a stepwise run to a consonance a 3rd, 4th or 5th away
// - neighbor tone: a step away and back
//
// Passing and neighbor figures that end on the next downbeat do not place
// their final note here; it becomes `next_measure_mark` and the next
// measure's first harmonic tone is pinned to it.
//
// Generators are pure: the input is never modified and an empty result means
// the figure does not fit. They are called only from `engine::State`
// dispatch, which guarantees the buffer is not already full.

use crate::candidates::{
    chord_role_of_mark, closing_pitches, conjunct_pitches, harmonic_pitches_with_chord,
    is_melodic_interval, next_measure_pitches, opening_pitches,
};
use crate::context::LocalMeasureContext;
use crate::model::{AnnotatedNote, KEY, RhythmType, ToneType, realized_scale};
use cantus_theory::{Duration, IntervalStep, Offset, Pitch};

pub fn start_note(local: &LocalMeasureContext) -> Vec<LocalMeasureContext> {
    let unit = local.rhythm.note_duration();
    opening_pitches(local.current_cf)
        .into_iter()
        .map(|pitch| {
            let opening = AnnotatedNote::new(pitch, unit, ToneType::Harmonic);
            let mut next = local.clone();
            next.note_buffer = match local.rhythm {
                RhythmType::Whole => vec![opening],
                _ => vec![AnnotatedNote::rest(unit), opening],
            };
            next.is_root_chord = Some(true);
            next.next_measure_mark = None;
            next
        })
        .collect()
}

pub fn end_note(local: &LocalMeasureContext) -> Vec<LocalMeasureContext> {
    let pitches = match local.next_measure_mark {
        Some(mark) => vec![mark],
        None => {
            let previous = local.previous_latest_pitch();
            closing_pitches(local.current_cf)
                .into_iter()
                .filter(|&pitch| is_melodic_interval(previous, pitch))
                .collect()
        }
    };

    pitches
        .into_iter()
        .map(|pitch| {
            let mut next = local.clone();
            // The final note always fills the measure, whatever the rhythm.
            next.note_buffer = vec![AnnotatedNote::new(pitch, Duration::WHOLE, ToneType::Harmonic)];
            next.is_root_chord = Some(true);
            next.next_measure_mark = None;
            next
        })
        .collect()
}

pub fn harmonic_tone(local: &LocalMeasureContext) -> Vec<LocalMeasureContext> {
    let choices: Vec<(Pitch, Option<bool>)> = match local.next_measure_mark {
        Some(mark) => vec![(mark, chord_role_of_mark(local.current_cf, mark))],
        None => {
            let previous = local.previous_latest_pitch();
            harmonic_pitches_with_chord(local.current_cf, local.is_root_chord)
                .into_iter()
                .filter(|&(pitch, _)| is_melodic_interval(previous, pitch))
                .collect()
        }
    };

    let unit = local.rhythm.note_duration();
    choices
        .into_iter()
        .map(|(pitch, role)| {
            let mut next = local.with_notes([AnnotatedNote::new(pitch, unit, ToneType::Harmonic)]);
            next.is_root_chord = role;
            next.next_measure_mark = None;
            next
        })
        .collect()
}

/// Whether a passing or neighbor figure may start here at all.
fn accepts_non_harmonic(local: &LocalMeasureContext) -> bool {
    !local.is_last_measure
        && local.current_offset() != Offset::ZERO
        && local.next_measure_mark.is_none()
}

/// Passing-tone runs available from the current offset: target step above
/// the previous pitch, and whether the target still lands in this measure.
/// Each run is also tried downward.
///
/// Panics on an offset the rhythm never produces mid-measure.
pub fn passing_patterns(offset: Offset, rhythm: RhythmType) -> Vec<(IntervalStep, bool)> {
    let third = IntervalStep::number(3);
    let fourth = IntervalStep::number(4);
    let fifth = IntervalStep::number(5);

    let upward = match (rhythm, offset.value()) {
        (RhythmType::Quarter, 1) => vec![(third, true), (fourth, true), (fifth, false)],
        (RhythmType::Quarter, 2) => vec![(third, true), (fourth, false)],
        (RhythmType::Quarter, 3) => vec![(third, false)],
        (RhythmType::Half, 2) => vec![(third, false)],
        (rhythm, q) => panic!("no passing-tone pattern for {rhythm} rhythm at offset {q}"),
    };

    let downward: Vec<(IntervalStep, bool)> = upward
        .iter()
        .map(|&(step, in_measure)| (IntervalStep::new(-step.value()), in_measure))
        .collect();
    upward.into_iter().chain(downward).collect()
}

pub fn passing_tones(local: &LocalMeasureContext) -> Vec<LocalMeasureContext> {
    if !accepts_non_harmonic(local) {
        return Vec::new();
    }
    let Some(next_cf) = local.next_measure_cf else {
        unreachable!("only the last measure lacks a next cantus firmus");
    };

    let previous = local.previous_latest_pitch();
    let unit = local.rhythm.note_duration();
    let mut result = Vec::new();

    for (step, in_measure) in passing_patterns(local.current_offset(), local.rhythm) {
        let target = KEY.add_step(previous, step);
        let run = conjunct_pitches(previous, step);
        let Some((&last, passing)) = run.split_last() else {
            continue;
        };
        let passing_notes = passing
            .iter()
            .map(|&pitch| AnnotatedNote::new(pitch, unit, ToneType::Passing));

        if in_measure {
            for (pitch, role) in harmonic_pitches_with_chord(local.current_cf, local.is_root_chord) {
                if pitch != target {
                    continue;
                }
                let mut next = local.with_notes(
                    passing_notes
                        .clone()
                        .chain([AnnotatedNote::new(last, unit, ToneType::Harmonic)]),
                );
                next.is_root_chord = role;
                next.next_measure_mark = None;
                result.push(next);
            }
        } else if next_measure_pitches(next_cf, local.is_next_last_measure).contains(&target) {
            let mut next = local.with_notes(passing_notes);
            next.next_measure_mark = Some(last);
            result.push(next);
        }
    }
    result
}

/// Whether a neighbor figure started at `offset` returns within this
/// measure (`true`) or returns on the next downbeat (`false`).
///
/// Panics on an offset the rhythm never produces mid-measure.
pub fn neighbor_returns_in_measure(offset: Offset, rhythm: RhythmType) -> bool {
    match (rhythm, offset.value()) {
        (RhythmType::Quarter, 1 | 2) => true,
        (RhythmType::Quarter, 3) => false,
        (RhythmType::Half, 2) => false,
        (rhythm, q) => panic!("no neighbor-tone figure for {rhythm} rhythm at offset {q}"),
    }
}

/// In-range diatonic neighbors of `pitch`, upper first.
fn neighbors(pitch: Pitch) -> Vec<Pitch> {
    let scale = realized_scale();
    [IntervalStep::number(2), IntervalStep::number(-2)]
        .into_iter()
        .map(|step| KEY.add_step(pitch, step))
        .filter(|neighbor| scale.contains(neighbor))
        .collect()
}

pub fn neighbor_tone(local: &LocalMeasureContext) -> Vec<LocalMeasureContext> {
    if !accepts_non_harmonic(local) {
        return Vec::new();
    }
    let Some(next_cf) = local.next_measure_cf else {
        unreachable!("only the last measure lacks a next cantus firmus");
    };

    let previous = local.previous_latest_pitch();
    let unit = local.rhythm.note_duration();

    if neighbor_returns_in_measure(local.current_offset(), local.rhythm) {
        neighbors(previous)
            .into_iter()
            .map(|neighbor| {
                let mut next = local.with_notes([
                    AnnotatedNote::new(neighbor, unit, ToneType::Neighbor),
                    AnnotatedNote::new(previous, unit, ToneType::Harmonic),
                ]);
                next.next_measure_mark = None;
                next
            })
            .collect()
    } else {
        if !next_measure_pitches(next_cf, local.is_next_last_measure).contains(&previous) {
            return Vec::new();
        }
        neighbors(previous)
            .into_iter()
            .map(|neighbor| {
                let mut next =
                    local.with_notes([AnnotatedNote::new(neighbor, unit, ToneType::Neighbor)]);
                next.next_measure_mark = Some(previous);
                next
            })
            .collect()
    }
}
