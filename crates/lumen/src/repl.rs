// SPDX-License-Identifier: MIT
// Copyright (c) 2026 The Lumen Authors

//! REPL (Read-Eval-Print Loop) for Lumen.
//!
//! Reads one line of source at a time, feeds it to a [`Vm`](crate::vm::Vm),
//! and reports compile/runtime errors without aborting the loop. Reads
//! through [`std::io::BufRead`], so a line's length is never a concern.

#[cfg(test)]
mod repl_test;

use std::io::{self, BufRead, Write};

use crate::vm::{InterpretError, Vm};

/// Runs the REPL loop, reading lines from `input` and writing the prompt
/// and any error output to `output`.
///
/// Returns on a clean EOF; never returns an error itself, since a bad
/// line in the REPL is reported and the loop continues.
pub fn run<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<()> {
    let mut vm = Vm::new();
    let mut line = String::new();

    loop {
        write!(output, "> ")?;
        output.flush()?;

        line.clear();
        let bytes_read = input.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(output)?;
            return Ok(());
        }

        match vm.interpret(&line) {
            Ok(()) => {}
            Err(InterpretError::Compile(_) | InterpretError::Runtime(_)) => {
                // The VM has already printed diagnostics to stderr; the
                // REPL just keeps the prompt going.
            }
        }
    }
}
