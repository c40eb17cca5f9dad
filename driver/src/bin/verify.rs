//! # Script verifier
//!
//! Reads a definition file and a script file, replays the script's rule
//! invocations against a fresh [`Book`], and reports the final judgement's
//! environment.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::exit;

use anyhow::{anyhow, Result};
use clap::{App, Arg};
use log::info;

use lambdad::book::Book;
use lambdad::environment::equiv_env;
use lambdad::parser::{parse_def_file, parse_script};

const APPLICATION_NAME: &str = "lambdad verify";
const ABOUT_MESSAGE: &str = "Verifies a proof script against its definitions.";
const AUTHOR_LIST: &str = "The Lambdad Development Team.";
const VERSION_NUMBER: &str = "0.1.0";

struct CommandLineArguments {
    script_path: Option<PathBuf>,
    defs_path: PathBuf,
    skip_checks: bool,
}

fn parse_command_line_arguments() -> CommandLineArguments {
    let mut app = App::new(APPLICATION_NAME)
        .about(ABOUT_MESSAGE)
        .version(VERSION_NUMBER)
        .author(AUTHOR_LIST);

    app.arg(Arg::new("file").about("Path of the script file to read (defaults to stdin)"));
    app.arg(
        Arg::new("defs")
            .short('d')
            .long("defs")
            .takes_value(true)
            .required(true)
            .about("Path of the .def file the script's definitions come from"),
    );
    app.arg(
        Arg::new("skip-checks")
            .short('s')
            .about("Accept a script even where a rule's applicability predicate fails"),
    );
    app.arg(Arg::new("verbose").short('v').about("Enable verbose logging"));

    let matches = app.get_matches();

    let defs_path = match matches.value_of("defs") {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("verify: no definition file provided (-d/--defs is required)");
            exit(1)
        }
    };

    CommandLineArguments {
        script_path: matches.value_of("file").map(PathBuf::from),
        defs_path,
        skip_checks: matches.is_present("skip-checks"),
    }
}

fn read_input(path: &Option<PathBuf>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn run() -> Result<()> {
    let args = parse_command_line_arguments();
    let defs_source = fs::read_to_string(&args.defs_path)?;
    let env = parse_def_file(&defs_source)?;
    info!("verify: {} definition(s) in scope", env.len());

    let script_source = read_input(&args.script_path)?;
    let rules = parse_script(&script_source)?;
    info!("verify: {} script line(s) to replay", rules.len());

    let mut book = if args.skip_checks {
        Book::with_skip_checks()
    } else {
        Book::new()
    };
    let mut last = None;
    for rule in &rules {
        last = Some(book.apply(rule)?);
    }

    let last = last.ok_or_else(|| anyhow!("script contained no rule invocations"))?;
    let judgement = book
        .get(last)
        .ok_or_else(|| anyhow!("internal error: final judgement index out of range"))?;
    if !equiv_env(judgement.env(), &env) {
        return Err(anyhow!(
            "script's derived environment ({} definition(s)) does not match {} ({} definition(s))",
            judgement.env().len(),
            args.defs_path.display(),
            env.len()
        ));
    }
    println!(
        "verified {} judgement(s); final environment matches {} ({} definition(s))",
        book.len(),
        args.defs_path.display(),
        judgement.env().len()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("verify: {}", e);
        exit(1);
    }
}
