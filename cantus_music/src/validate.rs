// Voice-leading and melodic rules.
//
// `measure_is_valid` checks a filled measure against the measure before it;
// `piece_is_valid` checks a finished piece as a whole. Both are pure
// predicates: a `false` prunes the search branch, nothing more.
//
// Measure rules:
// - no parallel or contrary fifths/octaves across the barline, and no hidden
//   fifths/octaves reached by similar motion
// - no indirect (offbeat) parallels within a whole note of each other,
//   unless the second interval is not struck together with the cantus
//   firmus and the voices move in contrary motion or one note is a
//   non-harmonic tone
// - no three-note outline of a root-position triad, nor of a bare fifth and
//   octave
// - a three-note span of a seventh or more than a ninth must contain a step
//
// Piece rule: the realized voice spans at most an eleventh.

use crate::context::{GlobalContext, LocalMeasureContext};
use crate::model::{AnnotatedNote, MEASURE_DURATION};
use cantus_theory::{Interval, IntervalStep, Offset, Pitch};

/// How two voices move from one pair of pitches to the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// Both voices move in the same direction.
    Similar,
    /// The voices move in opposite directions.
    Contrary,
    /// At least one voice holds its pitch.
    Oblique,
}

impl Motion {
    pub fn between(lower: (Pitch, Pitch), upper: (Pitch, Pitch)) -> Motion {
        if lower.0 == lower.1 || upper.0 == upper.1 {
            return Motion::Oblique;
        }
        let lower_up = lower.1.num() > lower.0.num();
        let upper_up = upper.1.num() > upper.0.num();
        if lower_up == upper_up {
            Motion::Similar
        } else {
            Motion::Contrary
        }
    }
}

fn simple_interval(lower: Pitch, upper: Pitch) -> Interval {
    Interval::between(lower, upper).normalize()
}

/// Consecutive perfect fifths or octaves (and fifths to or from a
/// diminished fifth) reached by similar or contrary motion.
pub fn is_parallel_violation(lower: (Pitch, Pitch), upper: (Pitch, Pitch)) -> bool {
    if Motion::between(lower, upper) == Motion::Oblique {
        return false;
    }
    let first = simple_interval(lower.0, upper.0);
    let second = simple_interval(lower.1, upper.1);
    matches!(
        (first, second),
        (Interval::UNISON, Interval::UNISON)
            | (Interval::PERFECT_FIFTH, Interval::PERFECT_FIFTH)
            | (Interval::DIMINISHED_FIFTH, Interval::PERFECT_FIFTH)
            | (Interval::PERFECT_FIFTH, Interval::DIMINISHED_FIFTH)
    )
}

/// A perfect fifth or octave approached by similar motion.
pub fn is_hidden_violation(lower: (Pitch, Pitch), upper: (Pitch, Pitch)) -> bool {
    if Motion::between(lower, upper) != Motion::Similar {
        return false;
    }
    matches!(
        simple_interval(lower.1, upper.1),
        Interval::UNISON | Interval::PERFECT_FIFTH
    )
}

pub fn measure_is_valid(local: &LocalMeasureContext) -> bool {
    intervals_are_valid(local) && melody_is_valid(local)
}

/// Parallel and hidden fifths/octaves against the cantus firmus.
pub fn intervals_are_valid(local: &LocalMeasureContext) -> bool {
    let (Some(previous_measure), Some(previous_cf)) =
        (local.previous_measure.as_deref(), local.previous_cf)
    else {
        return true;
    };
    let current_cf = local.current_cf;
    let cf_motion = (previous_cf, current_cf);

    let last = previous_measure.last_pitch();
    let first = local.note_buffer.first().and_then(|n| n.pitch());
    if let (Some(last), Some(first)) = (last, first) {
        if is_parallel_violation(cf_motion, (last, first))
            || is_hidden_violation(cf_motion, (last, first))
        {
            return false;
        }
    }

    // Indirect parallels: treat both measures as one span and test every
    // pair of realized onsets at most a whole note apart whose later note
    // falls in the current measure.
    let mut realized: Vec<(Offset, &AnnotatedNote)> = Vec::new();
    let mut onset = Offset::ZERO;
    for note in previous_measure.notes.iter().chain(&local.note_buffer) {
        realized.push((onset, note));
        onset = onset + note.duration();
    }
    let barline = Offset::ZERO + MEASURE_DURATION;
    let cf_at = |offset: Offset| -> (Offset, Pitch) {
        if offset < barline {
            (Offset::ZERO, previous_cf)
        } else {
            (barline, current_cf)
        }
    };
    let window = i64::from(MEASURE_DURATION.value());

    for &(later_onset, later) in &realized {
        if later_onset < barline {
            continue;
        }
        for &(earlier_onset, earlier) in &realized {
            let distance = later_onset.since(earlier_onset);
            if !(0 < distance && distance <= window) {
                continue;
            }
            let (Some(later_pitch), Some(earlier_pitch)) = (later.pitch(), earlier.pitch()) else {
                continue;
            };
            let (cf_later_onset, cf_later) = cf_at(later_onset);
            let (_, cf_earlier) = cf_at(earlier_onset);
            let lower = (cf_earlier, cf_later);
            let upper = (earlier_pitch, later_pitch);

            if !is_parallel_violation(lower, upper) {
                continue;
            }
            let struck_together = cf_later_onset == later_onset;
            let contrary = Motion::between(lower, upper) == Motion::Contrary;
            let non_harmonic = !later.is_harmonic() || !earlier.is_harmonic();
            if !(!struck_together && (contrary || non_harmonic)) {
                return false;
            }
        }
    }
    true
}

/// The previous measure's last two notes followed by the current buffer,
/// rests dropped.
fn melody_pitches(local: &LocalMeasureContext) -> Vec<Pitch> {
    let tail = local
        .previous_measure
        .as_deref()
        .map(|m| &m.notes[m.notes.len().saturating_sub(2)..])
        .unwrap_or(&[]);
    tail.iter()
        .chain(&local.note_buffer)
        .filter_map(|n| n.pitch())
        .collect()
}

/// Step pairs (second and third note, relative to the first) outlining a
/// root-position triad: 1-3-5, 3-5-1 and 5-1-3, up or down.
const ARPEGGIO_STEPS: [[i32; 2]; 6] = [[2, 4], [-2, -4], [2, 5], [-2, -5], [3, 5], [-3, -5]];

/// Fifth-and-octave outlines without a third: 1-5-1 and 5-1-5.
const BARE_ARPEGGIO_STEPS: [[i32; 2]; 4] = [[4, 7], [-4, -7], [3, 7], [-3, -7]];

fn window_steps(window: &[Pitch]) -> [i32; 2] {
    [
        (window[1] - window[0]).step().value(),
        (window[2] - window[0]).step().value(),
    ]
}

pub fn has_no_arpeggio(pitches: &[Pitch]) -> bool {
    pitches
        .windows(3)
        .all(|w| !ARPEGGIO_STEPS.contains(&window_steps(w)))
}

pub fn has_no_bare_arpeggio(pitches: &[Pitch]) -> bool {
    pitches
        .windows(3)
        .all(|w| !BARE_ARPEGGIO_STEPS.contains(&window_steps(w)))
}

/// Three notes spanning a seventh, or more than a ninth, need a step
/// between two of them.
pub fn wide_spans_have_a_step(pitches: &[Pitch]) -> bool {
    let seventh = IntervalStep::number(7);
    let ninth = IntervalStep::number(9);
    let second = IntervalStep::number(2);
    pitches.windows(3).all(|w| {
        let span = (w[0] - w[2]).abs().step();
        if span != seventh && span <= ninth {
            return true;
        }
        (w[0] - w[1]).abs().step() == second || (w[1] - w[2]).abs().step() == second
    })
}

pub fn melody_is_valid(local: &LocalMeasureContext) -> bool {
    let pitches = melody_pitches(local);
    has_no_arpeggio(&pitches) && has_no_bare_arpeggio(&pitches) && wide_spans_have_a_step(&pitches)
}

/// Largest span the realized voice may cover over a whole piece.
const MAX_PIECE_SPAN: IntervalStep = IntervalStep::new(10);

pub fn piece_is_valid(global: &GlobalContext) -> bool {
    let lowest = global.realized_pitches().min_by_key(|p| p.num());
    let highest = global.realized_pitches().max_by_key(|p| p.num());
    match (lowest, highest) {
        (Some(lowest), Some(highest)) => (highest - lowest).step() <= MAX_PIECE_SPAN,
        _ => true,
    }
}
