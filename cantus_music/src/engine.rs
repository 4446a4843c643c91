// Backtracking search for counterpoint realizations.
//
// The search is a lazily expanded tree of `State`s. Each state carries the
// immutable contexts it needs, and `State::next_states` is the whole
// transition function:
//
//   ChooseSearch ──► SearchingStartNote | SearchingEndNote
//        │           | SearchingHarmonic + SearchingPassing + SearchingNeighbor
//        │                   (each expands to ChooseSearch children)
//        └─ buffer full ──► ValidatingInMeasure ──► MeasurePruned
//                                   │
//                                   ├──► ChooseSearch (next measure)
//                                   └──► ValidatingAllMeasure ──► End | Pruned
//
// `Walk` consumes the tree depth-first, but at every branching point the
// children are merged through a `ShuffledInterleave`, so results surface in
// a seeded, shuffled order rather than leftmost-first. A `MeasurePruned`
// leaf is dropped on the spot, which sends the walk back to the nearest
// choice point. `Pruned` (a whole-piece failure such as excessive range) is
// passed up to `Realizations`, which discards the whole tree and restarts
// from the root with a fresh seed: no local change near the end of the
// piece can repair it.
//
// Every branch point forks its own `SearchRng` from its parent, so no
// generator state is shared across subtrees.

use crate::config::SearchConfig;
use crate::context::{GlobalContext, LocalMeasureContext};
use crate::error::CounterpointError;
use crate::interleave::ShuffledInterleave;
use crate::model::{
    AnnotatedMeasure, CANTUS_FIRMUS_VOICE, KEY, MEASURE_DURATION, REALIZED_VOICE, RhythmType,
    TIME_SIGNATURE,
};
use crate::moves;
use crate::validate::{measure_is_valid, piece_is_valid};
use cantus_prng::SearchRng;
use cantus_theory::{Measure, Note, Part, Pitch, Score};
use log::{debug, trace, warn};
use std::sync::Arc;

/// Contexts of a state that is working inside a measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureSearch {
    pub global: Arc<GlobalContext>,
    pub local: LocalMeasureContext,
}

impl MeasureSearch {
    fn with_local(&self, local: LocalMeasureContext) -> Self {
        Self {
            global: Arc::clone(&self.global),
            local,
        }
    }
}

/// A node of the search tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    ChooseSearch(MeasureSearch),
    SearchingStartNote(MeasureSearch),
    SearchingEndNote(MeasureSearch),
    SearchingHarmonic(MeasureSearch),
    SearchingPassing(MeasureSearch),
    SearchingNeighbor(MeasureSearch),
    ValidatingInMeasure(MeasureSearch),
    /// The measure broke a rule. Terminal.
    MeasurePruned(MeasureSearch),
    ValidatingAllMeasure(Arc<GlobalContext>),
    /// The finished piece broke a rule. Terminal.
    Pruned(Arc<GlobalContext>),
    /// A complete, valid realization. Terminal.
    End(Arc<GlobalContext>),
}

impl State {
    /// Root of a search over `cantus_firmus`.
    pub fn initial(cantus_firmus: Arc<[Pitch]>, rhythm: RhythmType) -> State {
        let global = GlobalContext::new(cantus_firmus, rhythm);
        let local = global.new_local_context();
        State::ChooseSearch(MeasureSearch {
            global: Arc::new(global),
            local,
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            State::ChooseSearch(_) => "ChooseSearch",
            State::SearchingStartNote(_) => "SearchingStartNote",
            State::SearchingEndNote(_) => "SearchingEndNote",
            State::SearchingHarmonic(_) => "SearchingHarmonic",
            State::SearchingPassing(_) => "SearchingPassing",
            State::SearchingNeighbor(_) => "SearchingNeighbor",
            State::ValidatingInMeasure(_) => "ValidatingInMeasure",
            State::MeasurePruned(_) => "MeasurePruned",
            State::ValidatingAllMeasure(_) => "ValidatingAllMeasure",
            State::Pruned(_) => "Pruned",
            State::End(_) => "End",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, State::MeasurePruned(_) | State::Pruned(_) | State::End(_))
    }

    pub fn global(&self) -> &GlobalContext {
        match self {
            State::ChooseSearch(s)
            | State::SearchingStartNote(s)
            | State::SearchingEndNote(s)
            | State::SearchingHarmonic(s)
            | State::SearchingPassing(s)
            | State::SearchingNeighbor(s)
            | State::ValidatingInMeasure(s)
            | State::MeasurePruned(s) => &s.global,
            State::ValidatingAllMeasure(g) | State::Pruned(g) | State::End(g) => g,
        }
    }

    pub fn local(&self) -> Option<&LocalMeasureContext> {
        match self {
            State::ChooseSearch(s)
            | State::SearchingStartNote(s)
            | State::SearchingEndNote(s)
            | State::SearchingHarmonic(s)
            | State::SearchingPassing(s)
            | State::SearchingNeighbor(s)
            | State::ValidatingInMeasure(s)
            | State::MeasurePruned(s) => Some(&s.local),
            State::ValidatingAllMeasure(_) | State::Pruned(_) | State::End(_) => None,
        }
    }

    /// Children of this node, in generator order.
    ///
    /// Panics on a terminal state.
    pub fn next_states(&self) -> Vec<State> {
        match self {
            State::ChooseSearch(s) => choose(s),
            State::SearchingStartNote(s) => expand(s, moves::start_note),
            State::SearchingEndNote(s) => expand(s, moves::end_note),
            State::SearchingHarmonic(s) => expand(s, moves::harmonic_tone),
            State::SearchingPassing(s) => expand(s, moves::passing_tones),
            State::SearchingNeighbor(s) => expand(s, moves::neighbor_tone),
            State::ValidatingInMeasure(s) => vec![validate_measure(s)],
            State::ValidatingAllMeasure(global) => {
                if piece_is_valid(global) {
                    vec![State::End(Arc::clone(global))]
                } else {
                    vec![State::Pruned(Arc::clone(global))]
                }
            }
            State::MeasurePruned(_) | State::Pruned(_) | State::End(_) => {
                panic!("terminal state {} has no successors", self.name())
            }
        }
    }
}

fn choose(s: &MeasureSearch) -> Vec<State> {
    let local = &s.local;
    if local.is_buffer_full() {
        return vec![State::ValidatingInMeasure(s.clone())];
    }
    let empty = local.note_buffer.is_empty();
    if local.is_first_measure && empty {
        vec![State::SearchingStartNote(s.clone())]
    } else if local.is_last_measure && empty {
        vec![State::SearchingEndNote(s.clone())]
    } else {
        vec![
            State::SearchingHarmonic(s.clone()),
            State::SearchingPassing(s.clone()),
            State::SearchingNeighbor(s.clone()),
        ]
    }
}

fn expand(s: &MeasureSearch, generator: fn(&LocalMeasureContext) -> Vec<LocalMeasureContext>) -> Vec<State> {
    generator(&s.local)
        .into_iter()
        .map(|local| {
            local.assert_consistent();
            State::ChooseSearch(s.with_local(local))
        })
        .collect()
}

fn validate_measure(s: &MeasureSearch) -> State {
    if !measure_is_valid(&s.local) {
        return State::MeasurePruned(s.clone());
    }
    let global = Arc::new(s.global.with_measure_appended(&s.local));
    if global.is_complete() {
        State::ValidatingAllMeasure(global)
    } else {
        let local = global.new_local_context();
        State::ChooseSearch(MeasureSearch { global, local })
    }
}

/// Lazy walk over a subtree. Yields only `End` and `Pruned` leaves.
enum Walk {
    Pending {
        state: State,
        rng: Option<SearchRng>,
    },
    Expanded(ShuffledInterleave<Walk>),
    Done,
}

impl Walk {
    fn new(state: State, rng: Option<SearchRng>) -> Self {
        Walk::Pending { state, rng }
    }
}

impl Iterator for Walk {
    type Item = State;

    fn next(&mut self) -> Option<State> {
        loop {
            match std::mem::replace(self, Walk::Done) {
                Walk::Done => return None,
                Walk::Expanded(mut children) => {
                    let item = children.next();
                    if item.is_some() {
                        *self = Walk::Expanded(children);
                    }
                    return item;
                }
                Walk::Pending { state, mut rng } => match state {
                    State::End(_) | State::Pruned(_) => return Some(state),
                    State::MeasurePruned(ref s) => {
                        debug!(
                            "measure {} pruned: {:?}",
                            s.global.completed_measures.len() + 1,
                            s.local
                                .note_buffer
                                .iter()
                                .map(|n| n.pitch().map_or("r".to_string(), |p| p.name()))
                                .collect::<Vec<_>>()
                        );
                        return None;
                    }
                    state => {
                        let children = state.next_states();
                        trace!("{} -> {} children", state.name(), children.len());
                        let walks: Vec<Walk> = children
                            .into_iter()
                            .map(|child| Walk::new(child, rng.as_mut().map(SearchRng::fork)))
                            .collect();
                        *self = Walk::Expanded(ShuffledInterleave::new(walks, rng));
                    }
                },
            }
        }
    }
}

/// A finished two-voice piece.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Realization {
    global: Arc<GlobalContext>,
}

impl Realization {
    pub fn cantus_firmus(&self) -> &[Pitch] {
        &self.global.cantus_firmus
    }

    pub fn rhythm(&self) -> RhythmType {
        self.global.rhythm
    }

    pub fn measures(&self) -> &[Arc<AnnotatedMeasure>] {
        &self.global.completed_measures
    }

    pub fn realized_pitches(&self) -> Vec<Pitch> {
        self.global.realized_pitches().collect()
    }

    /// The cantus firmus in whole notes under the realized voice.
    pub fn to_score(&self) -> Score {
        let realized = Part {
            voice: REALIZED_VOICE,
            measures: self.measures().iter().map(|m| m.to_measure()).collect(),
        };
        let cantus_firmus = Part {
            voice: CANTUS_FIRMUS_VOICE,
            measures: self
                .cantus_firmus()
                .iter()
                .map(|&pitch| Measure::new(vec![Note::new(pitch, MEASURE_DURATION)]))
                .collect(),
        };
        Score {
            key: KEY,
            time_signature: TIME_SIGNATURE,
            parts: vec![realized, cantus_firmus],
        }
    }
}

/// Lazy stream of realizations, restarting the search on whole-piece
/// failures.
pub struct Realizations {
    cantus_firmus: Arc<[Pitch]>,
    rhythm: RhythmType,
    randomized: bool,
    max_restarts: Option<u64>,
    driver_rng: SearchRng,
    walk: Walk,
    restarts: u64,
    found: u64,
}

impl Realizations {
    fn new(cantus_firmus: Arc<[Pitch]>, rhythm: RhythmType, config: &SearchConfig) -> Self {
        let seed = config.resolved_seed();
        debug!(
            "searching {} measures, {} rhythm, seed {}, randomized {}",
            cantus_firmus.len(),
            rhythm,
            seed,
            config.randomized
        );
        let mut realizations = Self {
            cantus_firmus,
            rhythm,
            randomized: config.randomized,
            max_restarts: config.max_restarts,
            driver_rng: SearchRng::new(seed),
            walk: Walk::Done,
            restarts: 0,
            found: 0,
        };
        realizations.walk = realizations.fresh_walk();
        realizations
    }

    fn fresh_walk(&mut self) -> Walk {
        let rng = if self.randomized {
            Some(self.driver_rng.fork())
        } else {
            None
        };
        Walk::new(State::initial(Arc::clone(&self.cantus_firmus), self.rhythm), rng)
    }

    /// Whole-piece failures seen so far.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Realizations yielded so far.
    pub fn found(&self) -> u64 {
        self.found
    }
}

impl Iterator for Realizations {
    type Item = Realization;

    fn next(&mut self) -> Option<Realization> {
        loop {
            match self.walk.next() {
                None => return None,
                Some(State::End(global)) => {
                    self.found += 1;
                    debug!("realization {} found after {} restarts", self.found, self.restarts);
                    return Some(Realization { global });
                }
                Some(State::Pruned(_)) => {
                    if self.max_restarts.is_some_and(|max| self.restarts >= max) {
                        warn!("giving up after {} restarts", self.restarts);
                        self.walk = Walk::Done;
                        return None;
                    }
                    self.restarts += 1;
                    if self.randomized {
                        debug!("piece pruned, restarting search ({})", self.restarts);
                        self.walk = self.fresh_walk();
                    } else {
                        debug!("piece pruned, continuing ordered search ({})", self.restarts);
                    }
                }
                Some(other) => unreachable!("walk yielded non-terminal state {}", other.name()),
            }
        }
    }
}

/// Realizations of `cantus_firmus` with the default (randomized,
/// clock-seeded) search.
pub fn generate(cantus_firmus: &[Pitch], rhythm: RhythmType) -> Result<Realizations, CounterpointError> {
    generate_with(cantus_firmus, rhythm, &SearchConfig::default())
}

pub fn generate_with(
    cantus_firmus: &[Pitch],
    rhythm: RhythmType,
    config: &SearchConfig,
) -> Result<Realizations, CounterpointError> {
    if cantus_firmus.is_empty() {
        return Err(CounterpointError::EmptyCantusFirmus);
    }
    Ok(Realizations::new(Arc::from(cantus_firmus), rhythm, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantus_theory::{Duration, IntervalStep, Offset};

    fn pitches(list: &str) -> Vec<Pitch> {
        Pitch::parse_list(list).unwrap()
    }

    fn root(cf: &str, rhythm: RhythmType) -> State {
        State::initial(Arc::from(pitches(cf)), rhythm)
    }

    fn names(states: &[State]) -> Vec<&'static str> {
        states.iter().map(State::name).collect()
    }

    #[test]
    fn first_measure_opens_with_the_start_note() {
        let children = root("C3 D3", RhythmType::Quarter).next_states();
        assert_eq!(names(&children), vec!["SearchingStartNote"]);
    }

    #[test]
    fn single_measure_opens_with_the_start_note() {
        let children = root("C4", RhythmType::Quarter).next_states();
        assert_eq!(names(&children), vec!["SearchingStartNote"]);
    }

    #[test]
    fn mid_measure_offers_three_searches() {
        let start = &root("C3 D3", RhythmType::Quarter).next_states()[0];
        let after_start = &start.next_states()[0];
        assert_eq!(after_start.name(), "ChooseSearch");
        assert_eq!(
            names(&after_start.next_states()),
            vec!["SearchingHarmonic", "SearchingPassing", "SearchingNeighbor"]
        );
    }

    #[test]
    fn full_measure_goes_to_validation() {
        let start = &root("C4 D4", RhythmType::Whole).next_states()[0];
        let choose = &start.next_states()[0];
        let children = choose.next_states();
        assert_eq!(names(&children), vec!["ValidatingInMeasure"]);

        let next = children[0].next_states();
        assert_eq!(names(&next), vec!["ChooseSearch"]);
        assert_eq!(next[0].global().completed_measures.len(), 1);
        // The last measure starts with the end note.
        assert_eq!(names(&next[0].next_states()), vec!["SearchingEndNote"]);
    }

    #[test]
    fn completed_piece_is_validated_as_a_whole() {
        let start = &root("C4", RhythmType::Whole).next_states()[0];
        let choose = &start.next_states()[0];
        let validating = &choose.next_states()[0];
        let whole = &validating.next_states()[0];
        assert_eq!(whole.name(), "ValidatingAllMeasure");
        assert!(whole.local().is_none());
        let end = &whole.next_states()[0];
        assert_eq!(end.name(), "End");
        assert!(end.is_terminal());
    }

    #[test]
    #[should_panic(expected = "terminal state")]
    fn terminal_states_cannot_expand() {
        let start = &root("C4", RhythmType::Whole).next_states()[0];
        let choose = &start.next_states()[0];
        let validating = &choose.next_states()[0];
        let whole = &validating.next_states()[0];
        let end = &whole.next_states()[0];
        end.next_states();
    }

    #[test]
    fn empty_cantus_firmus_is_rejected() {
        assert!(matches!(
            generate(&[], RhythmType::Half),
            Err(CounterpointError::EmptyCantusFirmus)
        ));
    }

    #[test]
    fn ordered_single_measure_search_terminates() {
        let found: Vec<Realization> =
            generate_with(&pitches("C4"), RhythmType::Quarter, &SearchConfig::ordered())
                .unwrap()
                .collect();
        assert!(!found.is_empty());
        for realization in &found {
            let measure = &realization.measures()[0];
            assert_eq!(measure.total_duration(), MEASURE_DURATION);
            assert_eq!(measure.pitch_at(Offset::ZERO), None);
            assert!(pitches("C4 G4 C5 G5").contains(&measure.notes[1].pitch().unwrap()));
            assert_eq!(measure.notes[1].duration(), Duration::QUARTER);
        }
    }

    #[test]
    fn ordered_search_lists_the_first_opening_first() {
        let first = generate_with(&pitches("C4"), RhythmType::Whole, &SearchConfig::ordered())
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(first.realized_pitches(), pitches("C4"));
    }

    fn realized(realizations: &mut Realizations) -> Vec<Vec<Pitch>> {
        realizations.by_ref().map(|r| r.realized_pitches()).collect()
    }

    #[test]
    fn restart_budget_cuts_the_ordered_stream_short() {
        // Whole notes over this line leave a finite tree with a too-wide
        // realization part way through it.
        let cf = pitches("C3 E3 G3 C4 F3 C3");
        let mut unbounded = generate_with(&cf, RhythmType::Whole, &SearchConfig::ordered()).unwrap();
        let all = realized(&mut unbounded);
        assert!(unbounded.restarts() > 0);

        let config = SearchConfig {
            max_restarts: Some(0),
            ..SearchConfig::ordered()
        };
        let mut bounded = generate_with(&cf, RhythmType::Whole, &config).unwrap();
        let prefix = realized(&mut bounded);

        assert_eq!(bounded.restarts(), 0);
        assert!(!prefix.is_empty());
        assert!(prefix.len() < all.len(), "{} of {}", prefix.len(), all.len());
        assert_eq!(prefix[..], all[..prefix.len()]);
        assert!(bounded.next().is_none());
    }

    #[test]
    fn ordered_search_keeps_walking_past_a_failed_piece() {
        let cf = pitches("C3 E3 G3 C4 F3 C3");
        let mut realizations = generate_with(&cf, RhythmType::Whole, &SearchConfig::ordered()).unwrap();
        let all = realized(&mut realizations);
        assert_eq!(realizations.found(), all.len() as u64);
        // The too-wide piece is skipped, not returned.
        for line in &all {
            let lowest = *line.iter().min_by_key(|p| p.num()).unwrap();
            let highest = *line.iter().max_by_key(|p| p.num()).unwrap();
            assert!((highest - lowest).step() <= IntervalStep::new(10), "{:?}", line);
        }
    }

    const LONG_CANTUS_FIRMUS: &str = "C4 A3 G3 E3 F3 A3 G3 E3 D3 C3";

    #[test]
    fn randomized_search_restarts_and_still_finds_a_realization() {
        let cf = pitches(LONG_CANTUS_FIRMUS);
        let mut restarts = 0;
        for seed in 0..4 {
            let mut realizations = generate_with(&cf, RhythmType::Quarter, &SearchConfig::seeded(seed)).unwrap();
            let first = realizations.next().unwrap();
            assert_eq!(first.measures().len(), cf.len());
            assert_eq!(realizations.found(), 1);
            restarts += realizations.restarts();
        }
        assert!(restarts > 0);
    }

    #[test]
    fn restart_budget_ends_the_randomized_stream() {
        let config = SearchConfig {
            max_restarts: Some(2),
            ..SearchConfig::seeded(3)
        };
        let mut realizations = generate_with(&pitches(LONG_CANTUS_FIRMUS), RhythmType::Quarter, &config).unwrap();
        let found = realized(&mut realizations);
        assert_eq!(realizations.restarts(), 2);
        assert_eq!(realizations.found(), found.len() as u64);
        assert!(realizations.next().is_none());
    }

    #[test]
    fn score_holds_realized_voice_over_cantus_firmus() {
        let realization = generate_with(&pitches("C3 D3 C3"), RhythmType::Half, &SearchConfig::seeded(1))
            .unwrap()
            .next()
            .unwrap();
        let score = realization.to_score();
        assert_eq!(score.parts.len(), 2);
        let soprano = score.part(REALIZED_VOICE).unwrap();
        let bass = score.part(CANTUS_FIRMUS_VOICE).unwrap();
        assert_eq!(soprano.measures.len(), 3);
        assert_eq!(
            bass.notes().map(|n| n.pitch.unwrap()).collect::<Vec<_>>(),
            pitches("C3 D3 C3")
        );
        assert!(soprano.measures.iter().all(|m| m.total_duration() == MEASURE_DURATION));
    }
}
