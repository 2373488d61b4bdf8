use clap::Parser;
use clap_num::maybe_hex;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::fs::File;
use std::io::{self, LineWriter, Write};
use std::process;

use rv32sim::elf_utils::{load_elf, SymbolTable};
use rv32sim::hart::{simulate, Hart, StepStatus};
use rv32sim::memory::{Memory, Wordsize};
use rv32sim::registers::REG_NAMES;
use rv32sim::trace::Tracer;

/// Simulate a 32-bit RISC-V (RV32IM) program
///
/// Loads an ELF executable into an empty memory image and executes it
/// from its entry address until the program invokes the exit syscall.
/// Console output from the putchar syscall goes to stdout; getchar
/// reads from stdin.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about)]
struct Args {
    /// Path to input executable file
    input: String,

    /// Write an execution trace to this file ("-" for stdout)
    #[arg(short, long)]
    trace: Option<String>,

    /// Override the entry address (use 0x prefix for hexadecimal)
    #[arg(short, long, value_parser=maybe_hex::<u32>)]
    start: Option<u32>,

    /// Single step through each instruction with an interactive
    /// prompt
    #[arg(short, long)]
    debug: bool,
}

fn print_registers(hart: &Hart) {
    for (n, name) in REG_NAMES.iter().enumerate() {
        print!("{name:>5} {:08x}", hart.x(n as u8) as u32);
        if n % 4 == 3 {
            println!();
        }
    }
}

fn print_memory(mem: &Memory, base: u32) {
    for n in 0..8 {
        let addr = base.wrapping_add(4 * n);
        let word = mem.read(addr, Wordsize::Word);
        println!("{addr:x}: {word:x}");
    }
}

/// Step the program one instruction per prompt, printing the trace
/// line for each. An empty line steps, "r" prints the register file,
/// "m <addr>" prints an 8-word memory window, "q" quits.
fn debug_loop(mem: &mut Memory, start: u32, symbols: &SymbolTable) -> rustyline::Result<()> {
    let mut hart = Hart::new(start);
    let mut rl = DefaultEditor::new()?;
    loop {
        {
            let mut stdout = io::stdout();
            let mut tracer = Tracer::new(Some(&mut stdout), Some(symbols));
            match hart.step(mem, &mut tracer) {
                Ok(StepStatus::Continue) => {}
                Ok(StepStatus::Exited) => break,
                Err(trap) => {
                    eprintln!("{trap}");
                    process::exit(1);
                }
            }
        }
        print!("{}", hart.flush_stdout());
        let _ = io::stdout().flush();

        loop {
            match rl.readline("> ") {
                Ok(line) => match line.trim() {
                    "" => break,
                    "q" => return Ok(()),
                    "r" => print_registers(&hart),
                    command => {
                        if let Some(addr) = command.strip_prefix("m ") {
                            let addr = addr.trim().trim_start_matches("0x");
                            match u32::from_str_radix(addr, 16) {
                                Ok(addr) => print_memory(mem, addr),
                                Err(_) => println!("could not parse address {addr}"),
                            }
                        } else {
                            println!(
                                "commands: <enter> step, r registers, m <addr> memory, q quit"
                            );
                        }
                    }
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(()),
                Err(e) => return Err(e),
            }
        }
    }
    println!("\nRetired {} instructions", hart.stats.insns);
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut mem = Memory::new();
    let loaded = match load_elf(&mut mem, &args.input) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading {}: {e}", args.input);
            process::exit(1);
        }
    };
    let start = args.start.unwrap_or(loaded.entry);

    if args.debug {
        if let Err(e) = debug_loop(&mut mem, start, &loaded.symbols) {
            eprintln!("Readline error: {e}");
            process::exit(1);
        }
        return;
    }

    let mut trace_sink: Option<Box<dyn Write>> = match args.trace.as_deref() {
        None => None,
        Some("-") => Some(Box::new(io::stdout())),
        Some(path) => match File::create(path) {
            Ok(file) => Some(Box::new(LineWriter::new(file))),
            Err(e) => {
                eprintln!("Error creating trace file {path}: {e}");
                process::exit(1);
            }
        },
    };

    let sink_ref: Option<&mut dyn Write> = match trace_sink {
        Some(ref mut b) => Some(b.as_mut()),
        None => None,
    };
    let stats = simulate(&mut mem, start, sink_ref, Some(&loaded.symbols));
    println!("\nRetired {} instructions", stats.insns);
}
