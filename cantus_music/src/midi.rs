// MIDI output from scores.
//
// Converts a Score into a Standard MIDI File (SMF) for playback. Track 0
// carries the tempo; each part of the score gets its own track on the
// channel of its voice. Rests are folded into the delta time of whatever
// event follows them, and a trailing rest stretches the end-of-track marker
// so every track spans the full piece.
//
// Uses the `midly` crate for MIDI writing. Output is SMF Format 1 (multi-track).

use cantus_theory::{Duration, Part, Score};
use midly::{
    Format, Header, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// Playback tempo in quarter notes per minute.
pub const TEMPO_BPM: u32 = 72;

/// Choir aahs.
const PROGRAM: u8 = 52;

const VELOCITY: u8 = 80;

fn ticks(duration: Duration) -> u32 {
    duration.value() * TICKS_PER_QUARTER as u32
}

/// Convert a Score to MIDI and write to a file.
pub fn write_midi(score: &Score, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let smf = score_to_smf(score);
    let mut buf = Vec::new();
    smf.write(&mut buf)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// Convert a Score to an in-memory SMF.
pub fn score_to_smf(score: &Score) -> Smf<'static> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo track
    let mut tempo_track: Track<'static> = Vec::new();
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::Tempo(u24::new(60_000_000 / TEMPO_BPM))),
    });
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    smf.tracks.push(tempo_track);

    for part in &score.parts {
        smf.tracks.push(part_to_track(part));
    }
    smf
}

fn part_to_track(part: &Part) -> Track<'static> {
    let channel = u4::new(part.voice.index() as u8);
    let mut track: Track<'static> = Vec::new();

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(midly::MetaMessage::TrackName(part.voice.name().as_bytes())),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(PROGRAM),
            },
        },
    });

    // Ticks since the last emitted event.
    let mut pending: u32 = 0;
    for note in part.notes() {
        let Some(pitch) = note.pitch else {
            pending += ticks(note.duration);
            continue;
        };
        let key = u7::new(pitch.midi().clamp(0, 127) as u8);
        track.push(TrackEvent {
            delta: u28::new(pending),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(VELOCITY),
                },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(ticks(note.duration)),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff { key, vel: u7::new(0) },
            },
        });
        pending = 0;
    }

    track.push(TrackEvent {
        delta: u28::new(pending),
        kind: TrackEventKind::Meta(midly::MetaMessage::EndOfTrack),
    });
    track
}
