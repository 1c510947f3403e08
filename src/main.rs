use rustourney::bracket::BracketGraph;
use rustourney::group;
use rustourney::layout::LayoutEngine;
use rustourney::measure::BracketMetrics;
use rustourney::model::{self, TournamentData, TournamentType};
use std::env;
use std::fs;
use std::process;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <tournament.json> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>   Output file (default: stdout)");
        eprintln!("  -e, --em <px>         Em size for bracket geometry (default: 16)");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut em: f64 = 16.0;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-e" | "--em" => {
                i += 1;
                if i < args.len() {
                    em = args[i].parse().unwrap_or_else(|_| {
                        eprintln!("Invalid em size: {}", args[i]);
                        process::exit(1);
                    });
                }
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {input_path}: {e}");
            process::exit(1);
        }
    };

    let data: TournamentData = match serde_json::from_str(&input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Failed to parse {input_path}: {e}");
            process::exit(1);
        }
    };

    let ttype = match TournamentType::from_str(&data.tournament_type) {
        Some(t) => t,
        None => {
            eprintln!("Unknown tournament type: {}", data.tournament_type);
            process::exit(1);
        }
    };

    let mut rounds = data.rounds;
    model::trim_trailing_empty_rounds(&mut rounds, ttype);

    let output = if ttype.is_elimination() {
        let graph = BracketGraph::build(&rounds);
        let metrics = BracketMetrics::with_players(em, &data.players);
        let layout = LayoutEngine::new(metrics).layout(&graph, &data.players);
        serde_json::to_string_pretty(&layout)
    } else {
        let grouped: Vec<_> = rounds
            .iter()
            .map(|r| group::groupify(r, &data.players))
            .collect();
        serde_json::to_string_pretty(&grouped)
    };

    let output = match output {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to serialize output: {e}");
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, output) {
                eprintln!("Failed to write {path}: {e}");
                process::exit(1);
            }
        }
        None => println!("{output}"),
    }
}
