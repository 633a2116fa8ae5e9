//! tinyscript command-line.
//!
//! When called without argument it drops into an interactive
//! read-evaluate-print loop; each line is one program.
//!
//! When called with arguments, it runs each file as a single program (a
//! statement, usually a block) in one interpreter session, so code defined in
//! one file is visible to the next.

use std::env;
use std::fs;
use std::io;
use std::io::prelude::*;

use anyhow::Context;

use tinyscript::interpreter::{Interpreter, Value};

fn main() -> Result<(), anyhow::Error> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    if !args.is_empty() {
        run_all_files(args)?;
    } else {
        run_prompt()?;
    }
    Ok(())
}

fn run_all_files(paths: Vec<String>) -> Result<(), anyhow::Error> {
    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout);

    for p in &paths {
        let source = fs::read_to_string(p).with_context(|| format!("failed to read {}", p))?;
        interp.eval(&source)?;
    }

    Ok(())
}

fn run_prompt() -> Result<(), io::Error> {
    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();
    let mut interp_stdout = io::stdout();

    let mut interp = Interpreter::new(&mut interp_stdout);

    let mut input = String::new();
    loop {
        repl_stdout.write_all("\n> ".as_bytes())?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }
        if input.trim().is_empty() {
            continue;
        }

        match interp.eval(&input) {
            Ok(flow) => match flow.value() {
                Value::Nil => (),
                value => println!("{}", value),
            },
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}
