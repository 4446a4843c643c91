// Music theory model for the cantus workspace.
//
// Value types for spelled pitches and intervals on the line of fifths, keys
// and scale degrees, quarter-note durations, and a small generic score
// structure. Everything is `Copy` or cheaply cloneable and immutable in
// practice; the only fallible operations are the text parsers.
//
// Architecture:
// - pitch.rs: `Letter`, `NoteName` (fifths from C), `Pitch` (octave + note
//   name), parsing/printing, sounding height
// - interval.rs: `Interval` (octave + fifth moves), `IntervalStep`, quality,
//   normalization, shorthand names ("P5", "-m3")
// - key.rs: `Key`, `Mode`, `Degree`, scale pitches in a range, diatonic step
//   addition within a key
// - time.rs: `Duration`, `Offset`, `TimeSignature` in quarter-note units
// - score.rs: `Voice` (SATB + ranges), `Note`, `Measure`, `Part`, `Score`
// - error.rs: `TheoryError`
//
// Consumed by `cantus_music` (counterpoint search, harmonizer, renderers).

pub mod error;
pub mod interval;
pub mod key;
pub mod pitch;
pub mod score;
pub mod time;

pub use error::TheoryError;
pub use interval::{Interval, IntervalStep};
pub use key::{Degree, DegreeStep, Key, Mode};
pub use pitch::{Letter, NoteName, Pitch};
pub use score::{Measure, Note, Part, Score, Voice};
pub use time::{Duration, Offset, TimeSignature};
