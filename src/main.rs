//
// Copyright (c) 2025-2026 Jeff Garzik
//
// This file is part of the glsl-pp project covered under
// the MIT License.  For the full license text, please see the LICENSE
// file in the root directory of this project.
// SPDX-License-Identifier: MIT
//
// glslpp - preprocess GLSL ES shader sources
//

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use glsl_pp::{
    Diagnostic, DiagnosticSink, DirectiveHandler, Options, Preprocessor, Severity,
    SourceLocation, TokenKind,
};

/// glslpp - preprocess GLSL ES shader sources
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Shader source files, concatenated in order; stdin if none given
    files: Vec<PathBuf>,

    /// Maximum token length before truncation
    #[arg(long, default_value_t = 256)]
    max_token_size: usize,
}

/// Prints diagnostics as they arrive and remembers whether any of them
/// was an error.
#[derive(Default)]
struct StderrSink {
    errors: u32,
}

impl DiagnosticSink for StderrSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.kind.severity() == Severity::Error {
            self.errors += 1;
        }
        eprintln!("{}", diagnostic);
    }
}

/// Surfaces #error and lets the other host directives pass via log.
#[derive(Default)]
struct CliHandler {
    errors: u32,
}

impl DirectiveHandler for CliHandler {
    fn handle_error(&mut self, location: SourceLocation, message: &str) {
        self.errors += 1;
        eprintln!("{}: #error: {}", location, message);
    }

    fn handle_pragma(&mut self, _location: SourceLocation, name: &str, value: &str, stdgl: bool) {
        log::debug!("pragma {} ({}) stdgl={}", name, value, stdgl);
    }

    fn handle_extension(&mut self, _location: SourceLocation, name: &str, behavior: &str) {
        log::debug!("extension {} : {}", name, behavior);
    }

    fn handle_version(&mut self, _location: SourceLocation, version: i32) {
        log::debug!("version {}", version);
    }
}

fn read_inputs(args: &Args) -> std::io::Result<Vec<String>> {
    if args.files.is_empty() {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        return Ok(vec![text]);
    }
    args.files.iter().map(std::fs::read_to_string).collect()
}

fn run(stdout: &mut impl Write, args: &Args, sources: &[String]) -> std::io::Result<bool> {
    let inputs: Vec<&str> = sources.iter().map(String::as_str).collect();
    let options = Options {
        max_token_size: args.max_token_size,
    };
    let mut sink = StderrSink::default();
    let mut handler = CliHandler::default();
    let mut pp = Preprocessor::new(&inputs, options, &mut sink, &mut handler);
    let mut wrote_any = false;
    loop {
        let token = pp.lex();
        if token.kind == TokenKind::Last {
            break;
        }
        if token.at_line_start {
            if wrote_any {
                writeln!(stdout)?;
            }
        } else if token.has_leading_space && wrote_any {
            write!(stdout, " ")?;
        }
        write!(stdout, "{}", token)?;
        wrote_any = true;
    }
    if wrote_any {
        writeln!(stdout)?;
    }
    drop(pp);
    Ok(sink.errors == 0 && handler.errors == 0)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let sources = match read_inputs(&args) {
        Ok(sources) => sources,
        Err(e) => {
            eprintln!("glslpp: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut stdout = std::io::stdout();
    match run(&mut stdout, &args, &sources) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("glslpp: {}", e);
            ExitCode::FAILURE
        }
    }
}
