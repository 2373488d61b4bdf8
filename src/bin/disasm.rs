use clap::Parser;
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::process;

use rv32sim::disasm::disassemble;
use rv32sim::elf_utils::{read_symbols, read_text_section, SymbolTable, TextSection};

/// Disassemble the .text section of a RISC-V (RV32IM) executable
///
/// Writes one line per instruction word, prefixed with the address
/// and the raw word. Addresses that carry a symbol get a label line
/// above the instruction, so function boundaries are visible in the
/// listing.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    /// Path to input ELF file
    input: String,

    /// Path to output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<String>,
}

fn write_listing(
    out: &mut dyn Write,
    text: &TextSection,
    symbols: &SymbolTable,
) -> io::Result<()> {
    for (n, word) in text.words.iter().enumerate() {
        let addr = text.addr.wrapping_add(4 * n as u32);
        if let Some(name) = symbols.value_to_sym(addr) {
            writeln!(out, "{name}:")?;
        }
        writeln!(
            out,
            "{addr:8x} : {word:08X}     {}",
            disassemble(addr, *word, None)
        )?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let text = match read_text_section(&args.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {e}", args.input);
            process::exit(1);
        }
    };
    let symbols = match read_symbols(&args.input) {
        Ok(symbols) => symbols,
        Err(e) => {
            eprintln!("Error reading symbols from {}: {e}", args.input);
            process::exit(1);
        }
    };

    let mut out: Box<dyn Write> = match args.output.as_deref() {
        None => Box::new(io::stdout()),
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(LineWriter::new(file)),
            Err(e) => {
                eprintln!("Error creating {path}: {e}");
                process::exit(1);
            }
        },
    };

    if let Err(e) = write_listing(&mut out, &text, &symbols) {
        eprintln!("Error writing listing: {e}");
        process::exit(1);
    }
}
