//! rtsim entry point.
//!
//! Runs keyword scripts against a fresh simulator:
//!
//! ```text
//! rtsim [--config FILE] [--no-color] SCRIPT...
//! ```
//!
//! Exit status is 0 when every test passes, 1 when any fails and 2 for usage
//! or configuration errors.

use std::path::PathBuf;
use std::process::ExitCode;

use rtsim_kernel::console::{self, Status};
use rtsim_kernel::terminal::ScriptRunner;
use rtsim_kernel::{Config, RtosLibrary, SimError};

const USAGE: &str = "Usage: rtsim [--config FILE] [--no-color] SCRIPT...";

/// Parsed command line.
struct Args {
    config: Option<PathBuf>,
    color: bool,
    scripts: Vec<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        color: true,
        scripts: Vec::new(),
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let path = iter.next().ok_or("--config needs a file")?;
                args.config = Some(PathBuf::from(path));
            }
            "--no-color" => args.color = false,
            "-h" | "--help" => return Err(USAGE.to_string()),
            s if s.starts_with('-') => return Err(format!("unknown option '{}'", s)),
            _ => args.scripts.push(PathBuf::from(arg)),
        }
    }
    if args.scripts.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<Config, SimError> {
    match &args.config {
        Some(path) => Config::load(path),
        None => Ok(Config::default()),
    }
}

fn main() -> ExitCode {
    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::from(2);
        }
    };

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("rtsim: {}", e);
            return ExitCode::from(2);
        }
    };
    let level = match config.log.level_filter() {
        Ok(level) => level,
        Err(e) => {
            eprintln!("rtsim: {}", e);
            return ExitCode::from(2);
        }
    };
    if let Err(e) = console::init(level, args.color) {
        eprintln!("rtsim: {}", e);
        return ExitCode::from(2);
    }

    let mut library = RtosLibrary::from_config(&config);
    let mut failed = 0;
    for path in &args.scripts {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                console::report(Status::Fail, &format!("{}: {}", path.display(), e));
                failed += 1;
                continue;
            }
        };

        let report = ScriptRunner::new(&mut library).run(&source);
        for test in &report.tests {
            match &test.failure {
                None => console::report(Status::Ok, &test.name),
                Some(failure) => console::report(
                    Status::Fail,
                    &format!("{} (line {}): {}", test.name, failure.line, failure.error),
                ),
            }
        }
        console::report(
            Status::Info,
            &format!(
                "{}: {} passed, {} failed",
                path.display(),
                report.passed(),
                report.failed()
            ),
        );
        failed += report.failed();
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
