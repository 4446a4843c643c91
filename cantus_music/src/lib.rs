// Cantus Counterpoint Generator
//
// Writes a second voice above (or against) a fixed cantus firmus under the
// rules of species counterpoint, and harmonizes bass lines in four-voice
// chorale style. The counterpoint side is a lazy backtracking search: one
// measure at a time, three move generators propose notes, every completed
// measure is checked against voice-leading rules and every completed piece
// against whole-piece rules. Failed measures backtrack locally; failed
// pieces restart the search.
//
// Architecture:
// - model.rs: Fixed key/meter/voices, rhythm types, tone-annotated notes
//   and measures
// - context.rs: Immutable per-measure and whole-piece search contexts
// - candidates.rs: Harmonic and melodic pitch sets
// - moves.rs: Move generators (start, end, harmonic, passing, neighbor)
// - validate.rs: Measure and piece validators (parallels, hidden perfects,
//   arpeggios, range)
// - interleave.rs: Seeded shuffled merge of lazy sequences
// - engine.rs: Search state machine, tree walk and the realization stream
// - config.rs: Serde search configuration (seed, ordering, restart cap)
// - harmony.rs: Deterministic SATB harmonizer for a bass line
// - lilypond.rs: LilyPond sheet music output (.ly files for engraving)
// - midi.rs: MIDI file output from scores
// - error.rs: `CounterpointError`, `HarmonyError`
//
// The search is deterministic given a seed, supporting reproducible output.

pub mod candidates;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod harmony;
pub mod interleave;
pub mod lilypond;
pub mod midi;
pub mod model;
pub mod moves;
pub mod validate;

pub use config::SearchConfig;
pub use engine::{Realization, Realizations, generate, generate_with};
pub use error::{CounterpointError, HarmonyError};
pub use model::RhythmType;
