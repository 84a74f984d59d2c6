//! Command-line entry point.
//!
//! `sequitur <file>` loads a rule file and answers its queries. Optional
//! modes layer on top of the same load/resolve surface: `--interactive`
//! drops into the fact-validation REPL, `--stats` prints rule-set metrics,
//! `--export dot|json <out>` writes the justification graph.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use sequitur::error::{Result, SequiturError};
use sequitur::export;
use sequitur::repl;
use sequitur::stats;
use sequitur::system::ExpertSystem;

struct Settings {
    log: String,
    color: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { log: "warn".to_string(), color: true }
    }
}

/// Optional `sequitur.toml` in the working directory tweaks defaults.
fn read_settings() -> Settings {
    let defaults = Settings::default();
    let Ok(file) = config::Config::builder()
        .add_source(config::File::with_name("sequitur").required(false))
        .build()
    else {
        return defaults;
    };
    Settings {
        log: file.get_string("log").unwrap_or(defaults.log),
        color: file.get_bool("color").unwrap_or(defaults.color),
    }
}

enum ExportKind {
    Dot,
    Json,
}

struct Options {
    input: PathBuf,
    interactive: bool,
    stats: bool,
    export: Option<(ExportKind, PathBuf)>,
}

fn print_usage() {
    println!("sequitur - propositional calculus expert system");
    println!();
    println!("Usage:");
    println!("  sequitur <input_file> [--interactive] [--stats] [--export dot|json <out>]");
    println!();
    println!("Input file format:");
    println!("  A + B => C      rule: if A and B then C");
    println!("  =ABC            initial facts: A, B and C are true");
    println!("  ?XYZ            queries: resolve X, Y and Z");
    println!();
    println!("Operators, tightest first: () ! + | ^  then => or <=>");
    println!("Comments run from # to end of line.");
}

fn parse_args(args: &[String]) -> std::result::Result<Options, String> {
    let mut input = None;
    let mut interactive = false;
    let mut stats = false;
    let mut export = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--interactive" | "-i" => interactive = true,
            "--stats" => stats = true,
            "--export" => {
                let kind = match iter.next().map(String::as_str) {
                    Some("dot") => ExportKind::Dot,
                    Some("json") => ExportKind::Json,
                    _ => return Err("--export takes 'dot' or 'json'".to_string()),
                };
                let Some(path) = iter.next() else {
                    return Err("--export needs an output path".to_string());
                };
                export = Some((kind, PathBuf::from(path)));
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}"));
            }
            other => {
                if input.replace(PathBuf::from(other)).is_some() {
                    return Err("more than one input file given".to_string());
                }
            }
        }
    }

    let Some(input) = input else {
        return Err("no input file given".to_string());
    };
    Ok(Options { input, interactive, stats, export })
}

fn run(options: Options, settings: &Settings) -> Result<()> {
    let text = fs::read_to_string(&options.input)
        .map_err(|e| SequiturError::Io(format!("{}: {e}", options.input.display())))?;
    let mut system = ExpertSystem::load(&text)?;

    if options.stats {
        println!("{}", stats::analyze(system.rules()));
        println!();
        println!("Fact degrees (concluded-by / used-by):");
        for (fact, concluding, using) in stats::fact_degrees(system.graph()) {
            println!("  {fact}: {concluding} / {using}");
        }
        for &query in system.queries() {
            let chain = system.graph().dependency_chain(system.rules(), query);
            let deps: String = chain.into_iter().collect();
            println!("  {query} depends on: {}", if deps.is_empty() { "-".to_string() } else { deps });
        }
        println!();
    }

    if let Some((kind, path)) = &options.export {
        match kind {
            ExportKind::Dot => export::write_dot(&mut system, path)?,
            ExportKind::Json => export::write_json(&mut system, path)?,
        }
        println!("Graph written to {}", path.display());
    }

    if options.interactive {
        return repl::run(&mut system, settings.color);
    }

    if system.queries().is_empty() {
        return Err(SequiturError::Config(
            "no queries specified; use ?<FACTS> to name query targets".to_string(),
        ));
    }

    let facts: String = system.current_facts().iter().collect();
    println!("Loaded {} rule(s), initial facts: {}", system.rules().len(), if facts.is_empty() {
        "(none)".to_string()
    } else {
        facts
    });
    println!();

    for finding in system.resolve_all() {
        match &finding.outcome {
            Ok(value) => println!("{}: {} {}", finding.fact, finding.symbol(), value),
            Err(e) => println!("{}: {} {}", finding.fact, finding.symbol(), e),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let settings = read_settings();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log.clone())),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") || args.is_empty() {
        print_usage();
        return if args.is_empty() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
    }

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {message}");
            return ExitCode::FAILURE;
        }
    };

    match run(options, &settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
