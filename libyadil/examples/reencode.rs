//! Re-encode YADIL documents in a chosen style.
//!
//! Usage: reencode [--verbose] [FILE...]
//!
//! Reads each file (or standard input when none is given), decodes it, and
//! prints it back out. Decode errors are reported per file.

use libyadil::{decode_reader, encode, DecodeOptions, Style};
use std::fs::File;
use std::io;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut style = Style::compact();
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--verbose" => style = Style::verbose(),
            _ => paths.push(arg),
        }
    }

    let mut failed = 0;
    if paths.is_empty() {
        if let Err(e) = reencode(io::stdin().lock(), DecodeOptions::new(), &style) {
            eprintln!("{}", e);
            failed += 1;
        }
    }
    for path in &paths {
        let result = File::open(path)
            .map_err(|e| format!("{}: {}", path, e))
            .and_then(|file| reencode(file, DecodeOptions::new().with_filename(path), &style));
        if let Err(e) = result {
            eprintln!("{}", e);
            failed += 1;
        }
    }

    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn reencode(reader: impl io::Read, options: DecodeOptions, style: &Style) -> Result<(), String> {
    let doc = decode_reader(reader, &options).map_err(|e| e.to_string())?;
    let text = encode(&doc, style).map_err(|e| e.to_string())?;
    print!("{}", text);
    if !style.line_breaks {
        println!();
    }
    Ok(())
}
