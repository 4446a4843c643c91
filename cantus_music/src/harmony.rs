// Four-voice chorale harmonization of a bass line.
//
// Every bass note carries a root-position triad. The first chord is spaced
// by the bass register; each later chord moves the three upper voices to the
// chord member that the root motion maps them to (common tones held, the
// rest moving to the nearest new chord tone), choosing the in-range pitch
// closest to where the voice already is.
//
// Deterministic and search-free: one bass line gives one harmonization, or a
// `HarmonyError` when a voice has no reachable pitch. Output is a 2/2 score
// with one half note per chord.

use crate::error::HarmonyError;
use cantus_theory::{
    Degree, DegreeStep, Duration, Interval, IntervalStep, Key, Letter, Measure, Mode, Note,
    NoteName, Part, Pitch, Score, TimeSignature, Voice,
};

/// One chord, voiced for SATB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    pub bass: Pitch,
    pub tenor: Pitch,
    pub alto: Pitch,
    pub soprano: Pitch,
}

impl Chord {
    pub fn pitch(&self, voice: Voice) -> Pitch {
        match voice {
            Voice::Soprano => self.soprano,
            Voice::Alto => self.alto,
            Voice::Tenor => self.tenor,
            Voice::Bass => self.bass,
        }
    }

    pub fn name(&self) -> String {
        format!(
            "[{}, {}, {}, {}]",
            self.bass, self.tenor, self.alto, self.soprano
        )
    }
}

const CHORD_DURATION: Duration = Duration::HALF;
const CHORALE_TIME: TimeSignature = TimeSignature::CUT;

/// Harmonize `bass` in `key`.
pub fn solve(bass: &[Pitch], key: Key) -> Result<Score, HarmonyError> {
    let (&first, rest) = bass.split_first().ok_or(HarmonyError::EmptyBass)?;
    let mut chords = vec![start_chord(first, key)];
    for &next_bass in rest {
        let previous = chords[chords.len() - 1];
        let chord = next_chord(next_bass, key, &previous)?;
        log::debug!("{} -> {}", previous.name(), chord.name());
        chords.push(chord);
    }
    Ok(chords_to_score(&chords, key))
}

fn chords_to_score(chords: &[Chord], key: Key) -> Score {
    let per_measure = (CHORALE_TIME.measure_duration().value() / CHORD_DURATION.value()) as usize;
    let parts = Voice::ALL
        .iter()
        .map(|&voice| {
            let measures = chords
                .chunks(per_measure)
                .map(|chunk| {
                    let mut notes: Vec<Note> = chunk
                        .iter()
                        .map(|chord| Note::new(chord.pitch(voice), CHORD_DURATION))
                        .collect();
                    while notes.len() < per_measure {
                        notes.push(Note::rest(CHORD_DURATION));
                    }
                    Measure::new(notes)
                })
                .collect();
            Part { voice, measures }
        })
        .collect();
    Score {
        key,
        time_signature: CHORALE_TIME,
        parts,
    }
}

/// Opening voicing, spread according to how low the bass sits.
pub fn start_chord(bass: Pitch, key: Key) -> Chord {
    // Lowers the major third to a minor one.
    let third_adjust = match key.mode {
        Mode::Major => Interval::UNISON,
        Mode::Minor => Interval::DIMINISHED_UNISON,
    };
    let f3 = Pitch::from_notation(Letter::F, 0, 3);
    let a2 = Pitch::from_notation(Letter::A, 0, 2);

    let (tenor, alto, soprano) = if bass.num() > f3.num() {
        // 1-5-8-10
        (Interval::PERFECT_FIFTH, Interval::OCTAVE, Interval::MAJOR_TENTH)
    } else if bass.num() > a2.num() {
        // 1-10-12-15
        (Interval::MAJOR_TENTH, Interval::TWELFTH, Interval::FIFTEENTH)
    } else {
        // 1-8-12-17
        (Interval::OCTAVE, Interval::TWELFTH, Interval::MAJOR_SEVENTEENTH)
    };

    let mut chord = Chord {
        bass,
        tenor: bass + tenor,
        alto: bass + alto,
        soprano: bass + soprano,
    };
    // Whichever upper voice holds the third takes the minor adjustment.
    for voice in [&mut chord.tenor, &mut chord.alto, &mut chord.soprano] {
        if (*voice - bass).normalize() == Interval::MAJOR_THIRD {
            *voice = *voice + third_adjust;
        }
    }
    chord
}

/// Root, third and fifth of the root-position triad on `bass`. Empty when
/// the bass is chromatically altered in `key`. In minor, the dominant triad
/// takes the raised leading tone.
pub fn triad_note_names(bass: NoteName, key: Key) -> Vec<NoteName> {
    let root = Degree::from_note_name(bass, key);
    if root.alter != 0 {
        return Vec::new();
    }
    let third = if root.step == DegreeStep::DOMINANT && key.mode == Mode::Minor {
        Degree::new(DegreeStep::number(7), 1)
    } else {
        Degree::new(root.step + DegreeStep::wrapping(2), 0)
    };
    let fifth = Degree::new(root.step + DegreeStep::wrapping(4), 0);
    [root, third, fifth]
        .into_iter()
        .map(|degree| degree.note_name(key))
        .collect()
}

/// Scale step each member of the current triad moves to, given how far the
/// root moves. Members are identified by their step; `None` for a step that
/// is not in the current triad.
fn voice_leading(current_root: DegreeStep, next_root: DegreeStep, from: DegreeStep) -> Option<DegreeStep> {
    let w = DegreeStep::wrapping;
    let root = current_root;
    let third = root + w(2);
    let fifth = root + w(4);
    let (to_root, to_third, to_fifth) = match (next_root - current_root).value() {
        0 => (root, third, fifth),
        1 => (root - w(2), third - w(1), fifth - w(1)),
        2 => (root - w(1), third, fifth),
        // II-V moves every voice down; other rising fourths keep the root.
        3 if current_root == w(1) => (root - w(2), third - w(2), fifth - w(1)),
        3 => (root, third + w(1), fifth + w(1)),
        4 => (root - w(1), third - w(1), fifth),
        5 => (root, third, fifth + w(1)),
        6 => (root + w(1), third + w(1), fifth + w(2)),
        _ => unreachable!("degree steps wrap below 7"),
    };
    if from == root {
        Some(to_root)
    } else if from == third {
        Some(to_third)
    } else if from == fifth {
        Some(to_fifth)
    } else {
        None
    }
}

/// Next chord over `next_bass`, moving each upper voice of `current`.
pub fn next_chord(next_bass: Pitch, key: Key, current: &Chord) -> Result<Chord, HarmonyError> {
    if triad_note_names(current.bass.note_name(), key).is_empty() {
        return Err(HarmonyError::NoTriad {
            bass: current.bass.name(),
        });
    }
    // Root position throughout: the bass is the root.
    let current_root = Degree::from_note_name(current.bass.note_name(), key).step;
    let next_root = Degree::from_note_name(next_bass.note_name(), key).step;

    let move_voice = |voice: Voice, from: Pitch| -> Result<Pitch, HarmonyError> {
        let from_step = Degree::from_note_name(from.note_name(), key).step;
        let Some(to_step) = voice_leading(current_root, next_root, from_step) else {
            return Err(HarmonyError::NotAChordTone {
                voice: voice.name(),
                pitch: from.name(),
            });
        };
        let (low, high) = voice.range();
        let candidates: Vec<Pitch> = key
            .scale_pitches(low, high)
            .into_iter()
            .filter(|&pitch| {
                Degree::from_note_name(pitch.note_name(), key).step == to_step
                    && (pitch - from).step().abs() <= IntervalStep::new(3)
            })
            .collect();
        match candidates.as_slice() {
            [first] | [first, _] => Ok(*first),
            _ => Err(HarmonyError::NoVoiceLeading {
                voice: voice.name(),
                from: from.name(),
                degree: to_step.value() + 1,
            }),
        }
    };

    Ok(Chord {
        bass: next_bass,
        tenor: move_voice(Voice::Tenor, current.tenor)?,
        alto: move_voice(Voice::Alto, current.alto)?,
        soprano: move_voice(Voice::Soprano, current.soprano)?,
    })
}
