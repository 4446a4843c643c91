// Immutable search contexts.
//
// `GlobalContext` is piece-level progress: the cantus firmus, the rhythm,
// the measures completed so far and any pitch carried into the next measure.
// `LocalMeasureContext` is the search state inside one measure: the notes
// placed so far, the chord role committed to, and the neighbouring cantus
// firmus pitches.
//
// Neither type is ever mutated after it is handed to the engine. Every
// transition clones the parent and changes the fields it needs, so sibling
// branches of the search tree can share ancestors freely. Completed measures
// and the cantus firmus sit behind `Arc` so those clones stay cheap.
//
// First/last flags are derived from how many measures are complete and are
// cross-checked against the optional pitch fields in `assert_consistent`.

use crate::model::{AnnotatedMeasure, AnnotatedNote, MEASURE_DURATION, RhythmType};
use cantus_theory::{Duration, Offset, Pitch};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalMeasureContext {
    /// `None` iff this is the first measure.
    pub previous_measure: Option<Arc<AnnotatedMeasure>>,
    /// `None` iff this is the first measure.
    pub previous_cf: Option<Pitch>,
    pub current_cf: Pitch,
    /// `None` iff this is the last measure.
    pub next_measure_cf: Option<Pitch>,
    pub rhythm: RhythmType,
    pub is_first_measure: bool,
    pub is_last_measure: bool,
    pub is_next_last_measure: bool,
    pub note_buffer: Vec<AnnotatedNote>,
    /// Root position (`true`) or first inversion (`false`) over the cantus
    /// firmus, once a harmonic tone has committed to one.
    pub is_root_chord: Option<bool>,
    /// Pitch that must open the next measure.
    pub next_measure_mark: Option<Pitch>,
}

impl LocalMeasureContext {
    pub fn assert_consistent(&self) {
        assert_eq!(
            self.is_first_measure,
            self.previous_cf.is_none(),
            "first-measure flag disagrees with previous cantus firmus"
        );
        assert_eq!(
            self.is_first_measure,
            self.previous_measure.is_none(),
            "first-measure flag disagrees with previous measure"
        );
        assert_eq!(
            self.is_last_measure,
            self.next_measure_cf.is_none(),
            "last-measure flag disagrees with next cantus firmus"
        );
        assert!(
            !(self.is_last_measure && self.is_next_last_measure),
            "a measure cannot be both last and next-to-last"
        );
        assert!(
            self.total_duration() <= MEASURE_DURATION,
            "note buffer overflows the measure"
        );
    }

    pub fn total_duration(&self) -> Duration {
        self.note_buffer.iter().map(|n| n.duration()).sum()
    }

    pub fn is_buffer_full(&self) -> bool {
        self.total_duration() == MEASURE_DURATION
    }

    /// Offset at which the next note would start.
    ///
    /// Panics once the buffer is full: nothing can be placed there.
    pub fn current_offset(&self) -> Offset {
        let total = self.total_duration();
        assert!(
            total < MEASURE_DURATION,
            "no offset left in a full measure ({} quarters)",
            total.value()
        );
        Offset::quarters(total.value())
    }

    /// Most recent sounding pitch before the next note: the end of the
    /// buffer, or the end of the previous measure when the buffer is empty.
    ///
    /// Panics when there is no such pitch (empty first measure, or the
    /// buffer ends in a rest).
    pub fn previous_latest_pitch(&self) -> Pitch {
        if let Some(last) = self.note_buffer.last() {
            match last.pitch() {
                Some(pitch) => pitch,
                None => panic!("note buffer ends with a rest"),
            }
        } else {
            match self.previous_measure.as_ref().and_then(|m| m.last_pitch()) {
                Some(pitch) => pitch,
                None => panic!("no previous pitch at the start of the first measure"),
            }
        }
    }

    /// Copy of this context with `notes` appended to the buffer.
    pub fn with_notes(&self, notes: impl IntoIterator<Item = AnnotatedNote>) -> Self {
        let mut next = self.clone();
        next.note_buffer.extend(notes);
        next
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalContext {
    pub cantus_firmus: Arc<[Pitch]>,
    pub rhythm: RhythmType,
    pub completed_measures: Vec<Arc<AnnotatedMeasure>>,
    pub next_measure_mark: Option<Pitch>,
}

impl GlobalContext {
    /// Panics on an empty cantus firmus; callers validate input first.
    pub fn new(cantus_firmus: impl Into<Arc<[Pitch]>>, rhythm: RhythmType) -> Self {
        let cantus_firmus = cantus_firmus.into();
        assert!(!cantus_firmus.is_empty(), "cantus firmus must not be empty");
        Self {
            cantus_firmus,
            rhythm,
            completed_measures: Vec::new(),
            next_measure_mark: None,
        }
    }

    pub fn measure_count(&self) -> usize {
        self.cantus_firmus.len()
    }

    pub fn is_complete(&self) -> bool {
        self.completed_measures.len() == self.cantus_firmus.len()
    }

    /// Context for the measure after the completed ones.
    pub fn new_local_context(&self) -> LocalMeasureContext {
        let index = self.completed_measures.len();
        let count = self.cantus_firmus.len();
        assert!(index < count, "no measure left to search");

        let is_first_measure = index == 0;
        let is_last_measure = index + 1 == count;
        let local = LocalMeasureContext {
            previous_measure: self.completed_measures.last().cloned(),
            previous_cf: if is_first_measure {
                None
            } else {
                Some(self.cantus_firmus[index - 1])
            },
            current_cf: self.cantus_firmus[index],
            next_measure_cf: self.cantus_firmus.get(index + 1).copied(),
            rhythm: self.rhythm,
            is_first_measure,
            is_last_measure,
            is_next_last_measure: index + 2 == count,
            note_buffer: Vec::new(),
            is_root_chord: None,
            next_measure_mark: self.next_measure_mark,
        };
        local.assert_consistent();
        local
    }

    /// Copy of this context with the local buffer committed as a measure.
    ///
    /// Panics unless the buffer is exactly full.
    pub fn with_measure_appended(&self, local: &LocalMeasureContext) -> Self {
        assert!(
            local.is_buffer_full(),
            "cannot commit a measure of {} quarters",
            local.total_duration().value()
        );
        let mut next = self.clone();
        next.completed_measures
            .push(Arc::new(AnnotatedMeasure::new(local.note_buffer.clone())));
        next.next_measure_mark = local.next_measure_mark;
        next
    }

    /// Every realized pitch in the completed measures.
    pub fn realized_pitches(&self) -> impl Iterator<Item = Pitch> + '_ {
        self.completed_measures.iter().flat_map(|m| m.pitches())
    }
}
