//! Token dumper: prints the token numbers of a CORE source file, one per
//! line, ending with the number of `eof`.

use std::env;
use std::fs::File;
use std::io::BufReader;
use std::process;

use anyhow::Context;

use rcore::scanner::Tokenizer;

fn main() -> Result<(), anyhow::Error> {
    let Some(path) = env::args().nth(1) else {
        eprintln!("Please specify a file name.");
        process::exit(1);
    };

    let reader =
        BufReader::new(File::open(&path).with_context(|| format!("failed to open {}", path))?);
    let mut tokenizer = Tokenizer::new(reader);

    // Buffer the numbers so nothing is printed when the input fails to lex.
    let mut output = String::new();
    while !tokenizer.is_eof() {
        match tokenizer.next_token() {
            Ok(token) => {
                output.push_str(&token.kind.number().to_string());
                output.push('\n');
            }
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }
    print!("{}", output);
    Ok(())
}
