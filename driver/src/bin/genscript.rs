//! # Proof-script generator
//!
//! Reads a `.def` file, builds its [`Environment`], and synthesizes a script
//! that re-derives it — the whole environment by default, or just the
//! dependency closure of one named definition with `-t`.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use clap::{App, Arg};
use log::info;

use lambdad::environment::Environment;
use lambdad::parser::{parse_def_file, write_script};
use lambdad::synth::{dependency_closure, Synthesizer};

const APPLICATION_NAME: &str = "lambdad genscript";
const ABOUT_MESSAGE: &str = "Synthesizes a proof script that re-derives a .def file's environment.";
const AUTHOR_LIST: &str = "The Lambdad Development Team.";
const VERSION_NUMBER: &str = "0.1.0";

struct CommandLineArguments {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    target: Option<String>,
    skip_checks: bool,
}

fn parse_command_line_arguments() -> CommandLineArguments {
    let mut app = App::new(APPLICATION_NAME)
        .about(ABOUT_MESSAGE)
        .version(VERSION_NUMBER)
        .author(AUTHOR_LIST);

    app.arg(Arg::new("file").about("Path of the .def file to read (defaults to stdin)"));
    app.arg(
        Arg::new("input-file")
            .short('f')
            .long("file")
            .takes_value(true)
            .about("Alternative way to name the input file"),
    );
    app.arg(
        Arg::new("output")
            .short('o')
            .long("out")
            .takes_value(true)
            .about("Path to write the script to (defaults to stdout)"),
    );
    app.arg(
        Arg::new("target")
            .short('t')
            .long("target")
            .takes_value(true)
            .about("Restrict the script to the dependency closure of NAME"),
    );
    app.arg(Arg::new("verbose").short('v').about("Enable verbose logging"));
    app.arg(
        Arg::new("skip-checks")
            .short('s')
            .about("Build the synthesized script's book in skip-checks mode"),
    );

    let matches = app.get_matches();

    CommandLineArguments {
        input_path: matches
            .value_of("input-file")
            .or_else(|| matches.value_of("file"))
            .map(PathBuf::from),
        output_path: matches.value_of("output").map(PathBuf::from),
        target: matches.value_of("target").map(str::to_string),
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

fn synthesize(
    env: &Environment,
    target: &Option<String>,
    skip_checks: bool,
) -> Result<Vec<lambdad::book::Rule>> {
    let mut synth = if skip_checks {
        Synthesizer::with_skip_checks()
    } else {
        Synthesizer::new()
    };
    match target {
        Some(name) => {
            let indices = dependency_closure(env, name)?;
            info!("genscript: restricting to {} definition(s)", indices.len());
            synth.synthesize_subset(env, &indices)?;
        }
        None => {
            synth.synthesize_environment(env)?;
        }
    }
    Ok(synth.script().to_vec())
}

fn run() -> Result<()> {
    let args = parse_command_line_arguments();
    let source = read_input(&args.input_path)?;
    let env = parse_def_file(&source)?;
    info!("genscript: parsed {} definition(s)", env.len());

    let script = synthesize(&env, &args.target, args.skip_checks)?;
    let text = write_script(&script);

    match &args.output_path {
        Some(path) => fs::write(path, text)?,
        None => io::stdout().write_all(text.as_bytes())?,
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("genscript: {}", e);
        exit(1);
    }
}
