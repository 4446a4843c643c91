// Cantus Counterpoint Generator: CLI entry point.
//
// Searches for a counterpoint above the given cantus firmus and prints the
// first realization as LilyPond. With --harmonize the pitches are treated
// as a bass line and harmonized in four voices instead. --count N (or
// --debug) lists realizations one per line rather than engraving one.
//
// Usage:
//   cargo run -p cantus_music --bin generate -- --cf C3 D3 F3 E3 D3 C3
//     [--rhythm quarter|half|whole] [--seed N] [--max-restarts N] [--ordered]
//     [--config search.json] [--midi out.mid] [--count N] [--debug]
//     [--harmonize]

use cantus_music::harmony;
use cantus_music::lilypond::score_to_lilypond;
use cantus_music::midi::write_midi;
use cantus_music::{RhythmType, SearchConfig, generate_with};
use cantus_theory::{Key, Pitch, Score};
use log::LevelFilter;
use std::path::Path;
use std::process::exit;

/// Listing length for --debug without --count.
const DEBUG_LISTING: usize = 10;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let debug = has_flag(&args, "--debug");
    init_logging(if debug { LevelFilter::Debug } else { LevelFilter::Warn });

    let cf_args = flag_values(&args, "--cf");
    if cf_args.is_empty() {
        eprintln!("Usage: generate --cf C3 D3 ... [--rhythm quarter|half|whole] [--seed N]");
        eprintln!("         [--max-restarts N] [--ordered] [--config FILE] [--midi FILE]");
        eprintln!("         [--count N] [--debug] [--harmonize]");
        exit(2);
    }
    let pitches: Vec<Pitch> = match cf_args.iter().map(|s| Pitch::parse(s)).collect() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Failed to parse cantus firmus: {}", e);
            exit(2);
        }
    };
    let midi_path: Option<String> = parse_flag(&args, "--midi");

    if has_flag(&args, "--harmonize") {
        match harmony::solve(&pitches, Key::C_MAJOR) {
            Ok(score) => emit(&score, midi_path.as_deref()),
            Err(e) => {
                eprintln!("Harmonization failed: {}", e);
                exit(1);
            }
        }
        return;
    }

    let rhythm = match flag_values(&args, "--rhythm").first() {
        None => RhythmType::Quarter,
        Some(name) => match name.parse::<RhythmType>() {
            Ok(r) => r,
            Err(e) => {
                eprintln!("{}", e);
                exit(2);
            }
        },
    };

    let mut config = match parse_flag::<String>(&args, "--config") {
        Some(path) => match SearchConfig::load(Path::new(&path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                exit(2);
            }
        },
        None => SearchConfig::default(),
    };
    if let Some(seed) = parse_flag(&args, "--seed") {
        config.seed = Some(seed);
    }
    if let Some(max) = parse_flag(&args, "--max-restarts") {
        config.max_restarts = Some(max);
    }
    if has_flag(&args, "--ordered") {
        config.randomized = false;
    }

    let mut realizations = match generate_with(&pitches, rhythm, &config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("{}", e);
            exit(2);
        }
    };

    let count: Option<usize> = parse_flag(&args, "--count");
    if count.is_some() || debug {
        let limit = count.unwrap_or(DEBUG_LISTING);
        for (i, realization) in realizations.by_ref().take(limit).enumerate() {
            let names: Vec<String> = realization
                .realized_pitches()
                .iter()
                .map(|p| p.name())
                .collect();
            println!("{}: {}", i + 1, names.join(" "));
        }
        println!(
            "{} realization(s), {} restart(s)",
            realizations.found(),
            realizations.restarts()
        );
        return;
    }

    match realizations.next() {
        Some(realization) => emit(&realization.to_score(), midi_path.as_deref()),
        None => {
            eprintln!(
                "No counterpoint found ({} restarts).",
                realizations.restarts()
            );
            exit(1);
        }
    }
}

/// Print the score as LilyPond and optionally write it to MIDI.
fn emit(score: &Score, midi_path: Option<&str>) {
    println!("{}", score_to_lilypond(score));
    if let Some(path) = midi_path {
        if let Err(e) = write_midi(score, Path::new(path)) {
            eprintln!("Error writing MIDI: {}", e);
            exit(1);
        }
        eprintln!("Wrote {}", path);
    }
}

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(level: LevelFilter) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Every argument after `flag` up to the next `--` flag.
fn flag_values<'a>(args: &'a [String], flag: &str) -> Vec<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .map(|i| {
            args[i + 1..]
                .iter()
                .take_while(|a| !a.starts_with("--"))
                .map(|a| a.as_str())
                .collect()
        })
        .unwrap_or_default()
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
}
