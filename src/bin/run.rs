//! Parse and execute a CORE source file, prompting and printing over
//! stdin/stdout.

use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::io::{self, BufReader};
use std::process;

use anyhow::Context;

use rcore::interpreter;

fn main() -> Result<(), anyhow::Error> {
    let Some(path) = env::args().nth(1) else {
        eprintln!("Please specify a file name.");
        process::exit(1);
    };

    let reader =
        BufReader::new(File::open(&path).with_context(|| format!("failed to open {}", path))?);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = stdout.lock();

    if let Err(e) = interpreter::interpret(reader, &mut input, &mut output) {
        let _ = output.flush();
        eprintln!("{}", e);
        process::exit(1);
    }
    Ok(())
}
