// vim: set ai et ts=4 sts=4 sw=4:
mod util;
mod grid;
mod line;
mod puzzle;

use std::fs;
use std::io;
use std::process;
use std::vec::Vec;
use clap::{App, Arg};
use log::warn;
use yaml_rust::{YamlLoader, Yaml};

use self::util::is_a_tty;
use self::puzzle::Puzzle;
use self::puzzle::solver::{Solver, SolveState};

// note: column numbers are listed top to bottom
const DEMO_PUZZLE: &str = "
rows:
    - 2 2
    - 8
    - 10
    - 10
    - 10
    - 8
    - 6
    - 4
    - 2
    -
cols:
    - 3
    - 5
    - 7
    - 8
    - 8
    - 8
    - 8
    - 7
    - 5
    - 3
";

struct Args {
    file:          Option<String>,
    visual_groups: Option<usize>,
    show_steps:    bool,
    verbosity:     u64,
}

fn parse_args() -> Args {
    let matches = App::new("nonogram-assist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("derives as much of a nonogram's solution as its lines admit")
        .arg(Arg::with_name("FILE")
                 .help("yaml puzzle file to solve (the builtin demo puzzle when omitted)")
                 .index(1))
        .arg(Arg::with_name("groups")
                 .short("g")
                 .long("groups")
                 .value_name("N")
                 .default_value("5")
                 .validator(|value: String| match value.parse::<usize>() {
                     Ok(_)  => Ok(()),
                     Err(_) => Err(format!("not a number: {}", value)),
                 })
                 .help("subdivide the board every N squares (0 disables)"))
        .arg(Arg::with_name("steps")
                 .long("steps")
                 .help("print the board again after every solver pass"))
        .arg(Arg::with_name("verbose")
                 .short("v")
                 .multiple(true)
                 .help("log more; repeat for even more"))
        .get_matches();

    Args {
        file:          matches.value_of("FILE").map(String::from),
        visual_groups: matches.value_of("groups")
                              .and_then(|value| value.parse::<usize>().ok())
                              .filter(|&n| n > 0),
        show_steps:    matches.is_present("steps"),
        verbosity:     matches.occurrences_of("verbose"),
    }
}

fn setup_logger(verbosity: u64) -> Result<(), fern::InitError> {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{:5}] {}: {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(io::stderr())
        .apply()?;
    Ok(())
}

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    let args = parse_args();
    if let Err(err) = setup_logger(args.verbosity) {
        eprintln!("could not set up logging: {}", err);
        return 2;
    }

    let source = match &args.file {
        Some(path) => match fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("could not read {}: {}", path, err);
                return 2;
            },
        },
        None => String::from(DEMO_PUZZLE),
    };

    let docs: Vec<Yaml> = match YamlLoader::load_from_str(&source) {
        Ok(docs) => docs,
        Err(err) => {
            eprintln!("not valid yaml: {}", err);
            return 2;
        },
    };
    if docs.is_empty() {
        eprintln!("the puzzle file contains no yaml document");
        return 2;
    }

    let puzzle = match Puzzle::from_yaml(&docs[0]) {
        Ok(puzzle) => puzzle,
        Err(err) => {
            eprintln!("{}", err);
            return 2;
        },
    };
    let mut solver = match Solver::new(puzzle) {
        Ok(solver) => solver,
        Err(err) => {
            eprintln!("{}", err);
            return 2;
        },
    };

    let emit_color = is_a_tty(io::stdout());
    if args.show_steps {
        loop {
            match solver.next() {
                Some(Ok(report)) => {
                    println!("{}: {} newly determined squares",
                             report.pass, report.changes.len());
                    println!("{}", solver.puzzle.render(args.visual_groups, emit_color));
                },
                Some(Err(err)) => {
                    eprintln!("{}", err);
                    return 2;
                },
                None => break,
            }
        }
    } else {
        if let Err(err) = solver.solve() {
            eprintln!("{}", err);
            return 2;
        }
        println!("{}", solver.puzzle.render(args.visual_groups, emit_color));
    }

    let outcome = solver.outcome();
    for (direction, index) in &outcome.contradictions {
        warn!("{} line {} contradicts its clues; the marks on it cannot all be right",
              direction, index);
    }
    if outcome.fully_solved() {
        0
    } else {
        if solver.state() == SolveState::Stalled && outcome.contradictions.is_empty() {
            println!("stalled at {}/{} squares; the rest is not determined by line-by-line deduction alone",
                     outcome.known, outcome.total);
        }
        1
    }
}
