//! Parse a CORE source file and pretty-print the program.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process;

use anyhow::Context;

use rcore::{interpreter, printer};

fn main() -> Result<(), anyhow::Error> {
    let Some(path) = env::args().nth(1) else {
        eprintln!("Please specify a file name.");
        process::exit(1);
    };

    let reader =
        BufReader::new(File::open(&path).with_context(|| format!("failed to open {}", path))?);
    match interpreter::parse(reader) {
        Ok((prog, _)) => print!("{}", printer::print(&prog)),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
    Ok(())
}
