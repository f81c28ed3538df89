//! CLI entry point for the decTest corpus checker.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use dectest_core::{CaseScanner, LineItem};
use dectest_runner::corpus::{discover, CorpusFile};
use dectest_runner::logging;
use dectest_runner::report::RunOutput;
use dectest_runner::runner::{FileReport, ParseOnly, RunConfig, Runner};
use serde as _;
use serde_json as _;
#[cfg(test)]
use tempfile as _;
use thiserror as _;
use tracing as _;
use tracing_subscriber as _;

const USAGE_TEXT: &str = "\
Usage: dectest-run <command> [options]

Commands:
  check <path>... [--json] [--verbose]  Parse corpus files and report case counts,
                                        skips, and parse errors
  list  <path>                          Print every parsed case with its context

Options:
  --json           Print the full report as JSON (check only)
  -v, --verbose    Debug logging to stderr (check only)
  -h, --help       Show this help message

A <path> is a .decTest file or a directory of them. The exit code is 1 when
any line fails to parse.

Examples:
  dectest-run check corpus/
  dectest-run check add.decTest subtract.decTest --json
  dectest-run list corpus/abs.decTest
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Check(CheckArgs),
    List(ListArgs),
}

#[derive(Debug, PartialEq, Eq)]
struct CheckArgs {
    paths: Vec<PathBuf>,
    json: bool,
    verbose: bool,
}

#[derive(Debug, PartialEq, Eq)]
struct ListArgs {
    path: PathBuf,
}

#[derive(Debug)]
enum ParseResult {
    Command(Command),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<ParseResult, String> {
    let first = args.next().ok_or_else(|| "missing command".to_string())?;

    if first == "--help" || first == "-h" {
        return Ok(ParseResult::Help);
    }

    let command_str = first.to_string_lossy().to_string();

    match command_str.as_str() {
        "check" => parse_check_args(args)
            .map(Command::Check)
            .map(ParseResult::Command),
        "list" => parse_list_args(args)
            .map(Command::List)
            .map(ParseResult::Command),
        other => Err(format!("unknown command: {other}")),
    }
}

fn parse_check_args(args: impl Iterator<Item = OsString>) -> Result<CheckArgs, String> {
    let mut paths = Vec::new();
    let mut json = false;
    let mut verbose = false;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg == "--json" {
            json = true;
            continue;
        }

        if arg == "--verbose" || arg == "-v" {
            verbose = true;
            continue;
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        paths.push(PathBuf::from(arg));
    }

    if paths.is_empty() {
        return Err("missing input path".to_string());
    }
    Ok(CheckArgs {
        paths,
        json,
        verbose,
    })
}

fn parse_list_args(args: impl Iterator<Item = OsString>) -> Result<ListArgs, String> {
    let mut path: Option<PathBuf> = None;

    for arg in args {
        if arg == "--help" || arg == "-h" {
            return Err(USAGE_TEXT.to_string());
        }

        if arg.to_string_lossy().starts_with('-') {
            return Err(format!("unknown option: {}", arg.to_string_lossy()));
        }

        if path.is_some() {
            return Err("multiple input paths provided".to_string());
        }
        path = Some(PathBuf::from(arg));
    }

    let path = path.ok_or_else(|| "missing input path".to_string())?;
    Ok(ListArgs { path })
}

fn report_parse_errors(report: &FileReport) {
    for failure in &report.parse_errors {
        eprintln!("{}: error: {}", report.path.display(), failure.message);
    }
}

fn run_check(args: &CheckArgs) -> Result<(), i32> {
    logging::init(args.verbose);

    let mut runner = Runner::new(ParseOnly, RunConfig::default());
    let mut reports = Vec::new();
    for path in &args.paths {
        match runner.run_path(path) {
            Ok(files) => reports.extend(files),
            Err(e) => {
                eprintln!("error: {e}");
                return Err(1);
            }
        }
    }

    let output = RunOutput::new(reports);
    if args.json {
        match output.to_json() {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("error: failed to serialize report: {e}");
                return Err(1);
            }
        }
    } else {
        for report in &output.files {
            report_parse_errors(report);
            println!("{report}");
        }
        println!();
        println!(
            "Check Summary: {} (files: {}, cases: {})",
            output.summary, output.summary.files, output.summary.total
        );
    }

    if output.summary.parse_errors == 0 {
        Ok(())
    } else {
        Err(1)
    }
}

fn list_file(path: &Path) -> Result<usize, i32> {
    let file = CorpusFile::load(path).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;
    let name = file.name();

    let mut errors = 0;
    for scanned in CaseScanner::new(&file.text) {
        match scanned.item {
            Ok(LineItem::Case(case)) => println!("{name}:{}: {}", case.line, case.summary(0)),
            Ok(LineItem::Directive(_)) => {}
            Err(e) => {
                eprintln!("{}: error: {e}", path.display());
                errors += 1;
            }
        }
    }
    Ok(errors)
}

fn run_list(args: &ListArgs) -> Result<(), i32> {
    let files = discover(&args.path).map_err(|e| {
        eprintln!("error: {e}");
        1
    })?;

    let mut errors = 0;
    for path in &files {
        errors += list_file(path)?;
    }

    if errors == 0 {
        Ok(())
    } else {
        Err(1)
    }
}

fn main() {
    let exit_code = match parse_args(env::args_os().skip(1)) {
        Ok(ParseResult::Help) => {
            println!("{USAGE_TEXT}");
            0
        }
        Ok(ParseResult::Command(Command::Check(args))) => match run_check(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Ok(ParseResult::Command(Command::List(args))) => match run_list(&args) {
            Ok(()) => 0,
            Err(code) => code,
        },
        Err(error) => {
            if error.starts_with("Usage:") {
                println!("{error}");
            } else {
                eprintln!("error: {error}");
                eprintln!("{USAGE_TEXT}");
            }
            1
        }
    };

    std::process::exit(exit_code);
}
