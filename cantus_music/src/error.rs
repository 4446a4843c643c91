// Errors surfaced to callers before any search or harmonization begins.
//
// Rule violations found during the search are not errors: they simply prune
// a branch (see engine.rs). Broken internal preconditions panic. What is
// left for `Result` is malformed input and I/O around configuration.

use cantus_theory::TheoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CounterpointError {
    /// The search needs at least one cantus firmus pitch.
    #[error("cantus firmus is empty")]
    EmptyCantusFirmus,

    /// Rhythm selector other than quarter / half / whole.
    #[error("unknown rhythm '{0}' (expected quarter, half or whole)")]
    UnknownRhythm(String),

    /// A pitch literal could not be parsed.
    #[error(transparent)]
    Theory(#[from] TheoryError),

    /// Search configuration JSON was malformed.
    #[error("invalid search config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the four-voice harmonizer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarmonyError {
    #[error("bass line is empty")]
    EmptyBass,

    /// The bass note is chromatically altered, so no diatonic triad stands
    /// on it.
    #[error("no triad on altered bass note {bass}")]
    NoTriad { bass: String },

    /// An upper voice holds a note outside the current triad.
    #[error("{voice} note {pitch} is not a member of the current triad")]
    NotAChordTone { voice: &'static str, pitch: String },

    /// No in-range pitch of the required degree lies within a fourth.
    #[error("{voice} cannot move from {from} to a nearby degree {degree}")]
    NoVoiceLeading {
        voice: &'static str,
        from: String,
        degree: i32,
    },
}
