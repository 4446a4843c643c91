// LilyPond sheet music output from scores.
//
// Converts a Score into a LilyPond (.ly) text file for the LilyPond
// typesetter. The layout is a PianoStaff: Soprano (stems up) and Alto (stems
// down) share the treble staff, Tenor and Bass share the bass staff. A part
// missing from the score renders as empty music, so the two-voice
// counterpoint output (Soprano over a Bass cantus firmus) uses the same
// template as the four-voice harmonizer.
//
// Pitches are absolute and keep their spelling (F# is `fis`, Gb is `ges`).
// Durations are whole quarter counts; values with no single LilyPond
// equivalent are split into tied pieces. Measures in a Score never straddle
// barlines, so no barline splitting is needed.

use cantus_theory::{Key, Mode, Note, NoteName, Part, Pitch, Score, Voice};
use std::fmt::Write;
use std::path::Path;

const LY_VERSION: &str = "2.24.4";

/// A valid LilyPond duration: note value in quarter notes and its text.
const DURATION_TABLE: [(u32, &str); 4] = [
    (4, "1"),  // whole note
    (3, "2."), // dotted half
    (2, "2"),  // half note
    (1, "4"),  // quarter note
];

/// LilyPond (Dutch) name of a spelled note: `c`, `fis`, `bes`, `as`, `eses`.
pub fn note_name_to_ly(note_name: NoteName) -> String {
    let (letter, alter) = note_name.notation();
    let mut out = letter.as_char().to_ascii_lowercase().to_string();
    if alter > 0 {
        for _ in 0..alter {
            out.push_str("is");
        }
    } else if alter < 0 {
        for _ in 0..-alter {
            out.push_str("es");
        }
        // aes -> as, ees -> es, aeses -> ases, eeses -> eses
        if out.starts_with("ae") || out.starts_with("ee") {
            out.remove(1);
        }
    }
    out
}

/// Convert a pitch to a LilyPond absolute pitch string.
///
/// LilyPond's `c` with no octave marks is C3. Each `'` raises one octave,
/// each `,` lowers one octave.
pub fn pitch_to_ly(pitch: Pitch) -> String {
    let (_, _, notated_octave) = pitch.notation();
    let mut result = note_name_to_ly(pitch.note_name());
    let octave = notated_octave - 3;
    if octave > 0 {
        for _ in 0..octave {
            result.push('\'');
        }
    } else if octave < 0 {
        for _ in 0..(-octave) {
            result.push(',');
        }
    }
    result
}

/// Decompose a duration (in quarter notes) into LilyPond duration strings,
/// largest first. Multiple parts are connected with ties.
///
/// For example: 5 quarters = "1" + "4".
pub fn decompose_duration(mut quarters: u32) -> Vec<&'static str> {
    let mut parts = Vec::new();
    for &(value, name) in &DURATION_TABLE {
        while quarters >= value {
            parts.push(name);
            quarters -= value;
        }
    }
    parts
}

/// `\key c \major` for a key.
pub fn key_to_ly(key: Key) -> String {
    let mode_name = match key.mode {
        Mode::Major => "major",
        Mode::Minor => "minor",
    };
    format!("\\key {} \\{}", note_name_to_ly(key.tonic), mode_name)
}

fn render_note(out: &mut String, note: &Note) {
    let parts = decompose_duration(note.duration.value());
    for (i, dur_str) in parts.iter().enumerate() {
        if !out.is_empty() {
            out.push(' ');
        }
        match note.pitch {
            Some(pitch) => {
                let _ = write!(out, "{}{}", pitch_to_ly(pitch), dur_str);
                if i + 1 < parts.len() {
                    out.push('~');
                }
            }
            None => {
                let _ = write!(out, "r{}", dur_str);
            }
        }
    }
}

/// Render a single part's music as a space-separated note list.
pub fn render_part_music(part: &Part) -> String {
    let mut out = String::new();
    for note in part.notes() {
        render_note(&mut out, note);
    }
    out
}

fn voice_music(score: &Score, voice: Voice) -> String {
    score.part(voice).map(render_part_music).unwrap_or_default()
}

/// Generate a complete LilyPond file from a Score.
pub fn score_to_lilypond(score: &Score) -> String {
    let mut ly = String::new();

    let _ = write!(ly, "\\version \"{}\"\n\n", LY_VERSION);
    let _ = write!(
        ly,
        "keyTime = {{ {} \\time {} }}\n\n",
        key_to_ly(score.key),
        score.time_signature.name()
    );

    // Variable names are padded so the braces line up.
    let variables = [
        (Voice::Soprano, "SopMusic  "),
        (Voice::Alto, "AltoMusic "),
        (Voice::Tenor, "TenorMusic"),
        (Voice::Bass, "BassMusic "),
    ];
    for (voice, name) in variables {
        let _ = writeln!(ly, "{} = {{ {} }}", name, voice_music(score, voice));
    }
    ly.push('\n');

    ly.push_str("\\score {\n");
    ly.push_str("  \\new PianoStaff <<\n");
    ly.push_str("    \\new Staff <<\n");
    ly.push_str("      \\clef \"treble\"\n");
    ly.push_str("      \\new Voice = \"Sop\"  { \\voiceOne \\keyTime \\SopMusic }\n");
    ly.push_str("      \\new Voice = \"Alto\" { \\voiceTwo \\AltoMusic }\n");
    ly.push_str("    >>\n");
    ly.push_str("    \\new Staff <<\n");
    ly.push_str("      \\clef \"bass\"\n");
    ly.push_str("      \\new Voice = \"Tenor\" { \\voiceOne \\keyTime \\TenorMusic }\n");
    ly.push_str("      \\new Voice = \"Bass\"  { \\voiceTwo \\BassMusic }\n");
    ly.push_str("    >>\n");
    ly.push_str("  >>\n");
    ly.push_str("}\n");

    ly
}

/// Write a LilyPond file from a Score.
pub fn write_lilypond(score: &Score, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let ly = score_to_lilypond(score);
    std::fs::write(path, ly)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantus_theory::{Duration, Measure, TimeSignature};

    fn p(s: &str) -> Pitch {
        Pitch::parse(s).unwrap()
    }

    fn half_note_part(voice: Voice, pitches: &str) -> Part {
        let notes: Vec<Note> = Pitch::parse_list(pitches)
            .unwrap()
            .into_iter()
            .map(|pitch| Note::new(pitch, Duration::HALF))
            .collect();
        Part {
            voice,
            measures: notes.chunks(2).map(|c| Measure::new(c.to_vec())).collect(),
        }
    }

    #[test]
    fn test_pitch_to_ly_reference_octave() {
        assert_eq!(pitch_to_ly(p("C3")), "c");
        assert_eq!(pitch_to_ly(p("G3")), "g");
        assert_eq!(pitch_to_ly(p("B3")), "b");
    }

    #[test]
    fn test_pitch_to_ly_octave_marks() {
        assert_eq!(pitch_to_ly(p("C4")), "c'");
        assert_eq!(pitch_to_ly(p("C5")), "c''");
        assert_eq!(pitch_to_ly(p("C2")), "c,");
        assert_eq!(pitch_to_ly(p("F1")), "f,,");
    }

    #[test]
    fn test_pitch_to_ly_keeps_spelling() {
        assert_eq!(pitch_to_ly(p("F#4")), "fis'");
        assert_eq!(pitch_to_ly(p("Gb4")), "ges'");
        assert_eq!(pitch_to_ly(p("Bb2")), "bes,");
        // Octave follows the written letter: B#3 sounds as C4.
        assert_eq!(pitch_to_ly(p("B#3")), "bis");
        assert_eq!(pitch_to_ly(p("Cb4")), "ces'");
    }

    #[test]
    fn test_note_name_to_ly_contractions() {
        let n = |s: &str| NoteName::parse(s).unwrap();
        assert_eq!(note_name_to_ly(n("Ab")), "as");
        assert_eq!(note_name_to_ly(n("Eb")), "es");
        assert_eq!(note_name_to_ly(n("Abb")), "ases");
        assert_eq!(note_name_to_ly(n("Ebb")), "eses");
        assert_eq!(note_name_to_ly(n("Dbb")), "deses");
        assert_eq!(note_name_to_ly(n("F##")), "fisis");
    }

    #[test]
    fn test_decompose_duration() {
        assert_eq!(decompose_duration(4), vec!["1"]);
        assert_eq!(decompose_duration(3), vec!["2."]);
        assert_eq!(decompose_duration(2), vec!["2"]);
        assert_eq!(decompose_duration(1), vec!["4"]);
        assert_eq!(decompose_duration(5), vec!["1", "4"]);
        assert_eq!(decompose_duration(0), Vec::<&str>::new());
    }

    #[test]
    fn test_key_to_ly() {
        assert_eq!(key_to_ly(Key::C_MAJOR), "\\key c \\major");
        let b_flat_minor = Key::new(NoteName::parse("Bb").unwrap(), Mode::Minor);
        assert_eq!(key_to_ly(b_flat_minor), "\\key bes \\minor");
    }

    #[test]
    fn test_render_ties_and_rests() {
        let part = Part {
            voice: Voice::Soprano,
            measures: vec![Measure::new(vec![
                Note::new(p("C4"), Duration::quarters(5)),
                Note::rest(Duration::quarters(3)),
            ])],
        };
        assert_eq!(render_part_music(&part), "c'1~ c'4 r2.");
    }

    #[test]
    fn test_score_to_lilypond_four_voices() {
        let score = Score {
            key: Key::C_MAJOR,
            time_signature: TimeSignature::CUT,
            parts: vec![
                half_note_part(Voice::Soprano, "C5 C5 B4 C5"),
                half_note_part(Voice::Alto, "G4 A4 G4 G4"),
                half_note_part(Voice::Tenor, "E4 F4 D4 E4"),
                half_note_part(Voice::Bass, "C3 F3 G3 C3"),
            ],
        };
        let expected = r#"\version "2.24.4"

keyTime = { \key c \major \time 2/2 }

SopMusic   = { c''2 c''2 b'2 c''2 }
AltoMusic  = { g'2 a'2 g'2 g'2 }
TenorMusic = { e'2 f'2 d'2 e'2 }
BassMusic  = { c2 f2 g2 c2 }

\score {
  \new PianoStaff <<
    \new Staff <<
      \clef "treble"
      \new Voice = "Sop"  { \voiceOne \keyTime \SopMusic }
      \new Voice = "Alto" { \voiceTwo \AltoMusic }
    >>
    \new Staff <<
      \clef "bass"
      \new Voice = "Tenor" { \voiceOne \keyTime \TenorMusic }
      \new Voice = "Bass"  { \voiceTwo \BassMusic }
    >>
  >>
}
"#;
        assert_eq!(score_to_lilypond(&score), expected);
    }

    #[test]
    fn test_missing_parts_render_empty() {
        let score = Score {
            key: Key::C_MAJOR,
            time_signature: TimeSignature::COMMON,
            parts: vec![
                half_note_part(Voice::Soprano, "E4 D4"),
                half_note_part(Voice::Bass, "C3 G2"),
            ],
        };
        let ly = score_to_lilypond(&score);
        assert!(ly.contains("\\time 4/4"), "{}", ly);
        assert!(ly.contains("SopMusic   = { e'2 d'2 }"), "{}", ly);
        assert!(ly.contains("AltoMusic  = {  }"), "{}", ly);
        assert!(ly.contains("TenorMusic = {  }"), "{}", ly);
        assert!(ly.contains("BassMusic  = { c2 g,2 }"), "{}", ly);
    }

    #[test]
    fn test_write_lilypond() {
        let score = Score {
            key: Key::C_MAJOR,
            time_signature: TimeSignature::COMMON,
            parts: vec![half_note_part(Voice::Bass, "C3 C3")],
        };
        let path = std::env::temp_dir().join("cantus_music_write_lilypond_test.ly");
        write_lilypond(&score, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, score_to_lilypond(&score));
        let _ = std::fs::remove_file(&path);
    }
}
