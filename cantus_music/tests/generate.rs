// End-to-end tests: search, render and harmonize through the public API.

use cantus_music::lilypond::score_to_lilypond;
use cantus_music::midi::score_to_smf;
use cantus_music::model::{KEY, MEASURE_DURATION, REALIZED_VOICE};
use cantus_music::{RhythmType, SearchConfig, generate_with, harmony};
use cantus_theory::{Degree, Duration, IntervalStep, Key, Offset, Pitch};

const CANTUS_FIRMUS: &str = "C4 A3 G3 E3 F3 A3 G3 E3 D3 C3";

fn pitches(list: &str) -> Vec<Pitch> {
    Pitch::parse_list(list).unwrap()
}

fn first_pitches(config: &SearchConfig, rhythm: RhythmType, n: usize) -> Vec<Vec<Pitch>> {
    generate_with(&pitches(CANTUS_FIRMUS), rhythm, config)
        .unwrap()
        .take(n)
        .map(|r| r.realized_pitches())
        .collect()
}

#[test]
fn realizations_fill_every_measure() {
    let cf = pitches(CANTUS_FIRMUS);
    let realizations: Vec<_> = generate_with(&cf, RhythmType::Quarter, &SearchConfig::seeded(42))
        .unwrap()
        .take(3)
        .collect();
    assert_eq!(realizations.len(), 3);

    for realization in &realizations {
        let measures = realization.measures();
        assert_eq!(measures.len(), cf.len());
        for measure in measures {
            assert_eq!(measure.total_duration(), MEASURE_DURATION);
        }
        // Opening rest, closing whole note.
        assert_eq!(measures[0].pitch_at(Offset::ZERO), None);
        assert_eq!(measures[0].notes[0].duration(), Duration::QUARTER);
        let last = &measures[measures.len() - 1];
        assert_eq!(last.notes.len(), 1);
        assert_eq!(last.notes[0].duration(), Duration::WHOLE);
    }
}

#[test]
fn realized_voice_stays_in_range_and_in_key() {
    let (low, high) = REALIZED_VOICE.range();
    for line in first_pitches(&SearchConfig::seeded(3), RhythmType::Half, 3) {
        assert!(!line.is_empty());
        for pitch in &line {
            assert!(pitch.num() >= low.num() && pitch.num() <= high.num(), "{} out of range", pitch);
            assert_eq!(Degree::from_note_name(pitch.note_name(), KEY).alter, 0, "{} not in key", pitch);
        }
        let lowest = *line.iter().min_by_key(|p| p.num()).unwrap();
        let highest = *line.iter().max_by_key(|p| p.num()).unwrap();
        // Never wider than an eleventh.
        assert!(
            (highest - lowest).step() <= IntervalStep::new(10),
            "span {}..{}",
            lowest,
            highest
        );
    }
}

#[test]
fn same_seed_same_stream() {
    let config = SearchConfig::seeded(2024);
    assert_eq!(
        first_pitches(&config, RhythmType::Quarter, 3),
        first_pitches(&config, RhythmType::Quarter, 3)
    );
}

#[test]
fn ordered_search_ignores_the_seed() {
    let a = SearchConfig {
        seed: Some(1),
        ..SearchConfig::ordered()
    };
    let b = SearchConfig {
        seed: Some(99),
        ..SearchConfig::ordered()
    };
    assert_eq!(
        first_pitches(&a, RhythmType::Whole, 5),
        first_pitches(&b, RhythmType::Whole, 5)
    );
}

#[test]
fn json_config_matches_builder() {
    let from_json = SearchConfig::from_json(r#"{ "seed": 5 }"#).unwrap();
    assert_eq!(from_json, SearchConfig::seeded(5));
    assert_eq!(
        first_pitches(&from_json, RhythmType::Whole, 2),
        first_pitches(&SearchConfig::seeded(5), RhythmType::Whole, 2)
    );
}

#[test]
fn single_measure_piece_opens_on_a_perfect_consonance() {
    let found: Vec<_> = generate_with(&pitches("C4"), RhythmType::Whole, &SearchConfig::ordered())
        .unwrap()
        .collect();
    assert!(!found.is_empty());
    for realization in &found {
        let line = realization.realized_pitches();
        assert_eq!(line.len(), 1);
        assert!(pitches("C4 G4 C5 G5").contains(&line[0]), "{}", line[0]);
    }
}

#[test]
fn every_onset_finds_its_own_note() {
    let realization = generate_with(&pitches(CANTUS_FIRMUS), RhythmType::Quarter, &SearchConfig::seeded(8))
        .unwrap()
        .next()
        .unwrap();
    for measure in realization.measures() {
        let onsets = measure.onsets();
        assert_eq!(onsets.len(), measure.notes.len());
        for (onset, note) in onsets.iter().zip(&measure.notes) {
            let (found_onset, found) = measure.note_at(*onset);
            assert_eq!(found_onset, *onset);
            assert_eq!(found, note);
            assert_eq!(measure.pitch_at(*onset), note.pitch());
        }
    }
}

#[test]
fn realization_renders_to_lilypond_and_midi() {
    let realization = generate_with(&pitches("C3 D3 C3"), RhythmType::Half, &SearchConfig::seeded(1))
        .unwrap()
        .next()
        .unwrap();
    let score = realization.to_score();

    let ly = score_to_lilypond(&score);
    assert!(ly.contains("\\key c \\major \\time 4/4"), "{}", ly);
    assert!(ly.contains("BassMusic  = { c1 d1 c1 }"), "{}", ly);
    assert!(ly.contains("SopMusic   = { r2 "), "{}", ly);
    assert!(ly.contains("AltoMusic  = {  }"), "{}", ly);

    let smf = score_to_smf(&score);
    assert_eq!(smf.tracks.len(), 3);
}

#[test]
fn harmonized_cadence_engraves() {
    let score = harmony::solve(&pitches("C3 F3 G3 C3"), Key::C_MAJOR).unwrap();
    let ly = score_to_lilypond(&score);
    assert!(ly.contains("keyTime = { \\key c \\major \\time 2/2 }"), "{}", ly);
    assert!(ly.contains("SopMusic   = { c''2 c''2 b'2 c''2 }"), "{}", ly);
    assert!(ly.contains("AltoMusic  = { g'2 a'2 g'2 g'2 }"), "{}", ly);
    assert!(ly.contains("TenorMusic = { e'2 f'2 d'2 e'2 }"), "{}", ly);
    assert!(ly.contains("BassMusic  = { c2 f2 g2 c2 }"), "{}", ly);
}
