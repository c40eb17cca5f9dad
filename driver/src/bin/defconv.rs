//! # Definition-file notation converter
//!
//! Reads a `.def` file and re-emits it, rendering every term in one of the
//! three notations the core supports.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::exit;

use anyhow::Result;
use clap::{App, Arg};
use log::info;

use lambdad::definition::Definition;
use lambdad::parser::{parse_def_file_entries, render, Notation};

const APPLICATION_NAME: &str = "lambdad defconv";
const ABOUT_MESSAGE: &str = "Re-emits a .def file, rendering terms in conventional, compact, or rich notation.";
const AUTHOR_LIST: &str = "The Lambdad Development Team.";
const VERSION_NUMBER: &str = "0.1.0";

struct CommandLineArguments {
    input_path: Option<PathBuf>,
    notation: Notation,
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
        Arg::new("conventional")
            .short('c')
            .about("Render in conventional notation"),
    );
    app.arg(
        Arg::new("new")
            .short('n')
            .about("Render in compact (new) notation"),
    );
    app.arg(
        Arg::new("rich")
            .short('r')
            .about("Render in rich, display-only notation"),
    );
    app.arg(
        Arg::new("skip-checks")
            .short('s')
            .about("Do not reject duplicate definition names while re-rendering"),
    );
    app.arg(Arg::new("verbose").short('v').about("Enable verbose logging"));

    let matches = app.get_matches();

    let notation = if matches.is_present("conventional") {
        Notation::Conventional
    } else if matches.is_present("rich") {
        Notation::Rich
    } else {
        Notation::Compact
    };

    let input_path = matches
        .value_of("input-file")
        .or_else(|| matches.value_of("file"))
        .map(PathBuf::from);

    CommandLineArguments {
        input_path,
        notation,
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

fn render_definition(def: &Definition, notation: Notation) -> String {
    let mut out = String::new();
    out.push_str(&format!("def2 {}", def.context().entries().len()));
    for (x, ty) in def.context().entries() {
        out.push_str(&format!(" {}:{}", x, render(ty, notation)));
    }
    out.push_str(&format!(" {}", def.definiendum()));
    match def.definiens() {
        Some(body) => out.push_str(&format!(" {}", render(body, notation))),
        None => out.push_str(" #"),
    }
    out.push_str(&format!(" {} edef2", render(def.ty(), notation)));
    out
}

fn run() -> Result<()> {
    let args = parse_command_line_arguments();
    let source = read_input(&args.input_path)?;
    let defs = parse_def_file_entries(&source)?;

    if !args.skip_checks {
        // Fold into an Environment purely to surface duplicate-name errors;
        // the rendering below still works directly off `defs`.
        let mut env = lambdad::environment::Environment::empty();
        for def in &defs {
            env = env.extended(def.clone())?;
        }
        info!("defconv: {} definition(s) validated", env.len());
    }

    for def in &defs {
        println!("{}", render_definition(def, args.notation));
    }
    println!("END");
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("defconv: {}", e);
        exit(1);
    }
}
