// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Lumen Authors

//! Command-line entry point: dispatches to the REPL or runs a script file,
//! mapping the result onto the process exit code.

use std::io::{self, BufWriter};
use std::process::ExitCode;
use std::{env, fs};

use lumen::repl;
use lumen::vm::{InterpretError, Vm};

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match args.len() {
        1 => run_repl(),
        2 => run_file(&args[1]),
        _ => {
            eprintln!("Usage: lumen [path]");
            ExitCode::from(64)
        }
    }
}

fn run_repl() -> ExitCode {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());

    match repl::run(&mut input, &mut output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => {
            eprintln!("Error: could not read from stdin.");
            ExitCode::from(74)
        }
    }
}

fn run_file(path: &str) -> ExitCode {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(_) => {
            eprintln!("Error: could not open file \"{path}\".");
            return ExitCode::from(74);
        }
    };

    let mut vm = Vm::new();
    match vm.interpret(&source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(InterpretError::Compile(_)) => ExitCode::from(65),
        Err(InterpretError::Runtime(_)) => ExitCode::from(70),
    }
}
