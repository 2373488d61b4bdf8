//! Execution-trace formatter
//!
//! Produces one line per retired instruction with a fixed layout:
//!
//! ```text
//!        3     1008 : 00B50463     beq      a0,a1,0x1010            {T}
//! ```
//!
//! The line starts with the retired-instruction count (right-aligned,
//! width 8), the pc (lowercase hex, width 8), the instruction word
//! (uppercase hex, width 8) and the disassembly (left-aligned, minimum
//! width 30). Effect notes follow on the same line: register writes,
//! memory writes and a `{T}` marker for taken branches. Lines fetched
//! from a non-sequential pc are prefixed with `=>`.
//!
//! All writes to the sink are best-effort: a failing sink never
//! changes the architectural state of the simulation.

use std::fmt;
use std::io::Write;

use crate::disasm::disassemble;
use crate::elf_utils::SymbolTable;

pub struct Tracer<'a, 'b> {
    sink: Option<&'a mut dyn Write>,
    symbols: Option<&'b SymbolTable>,
}

impl<'a, 'b> Tracer<'a, 'b> {
    pub fn new(sink: Option<&'a mut dyn Write>, symbols: Option<&'b SymbolTable>) -> Self {
        Self { sink, symbols }
    }

    fn emit(&mut self, args: fmt::Arguments) {
        if let Some(sink) = self.sink.as_deref_mut() {
            let _ = sink.write_fmt(args);
        }
    }

    /// Mark an instruction fetched from a non-sequential address
    pub fn jump_target(&mut self) {
        self.emit(format_args!("=>"));
    }

    /// Start the line for one retired instruction
    pub fn insn_header(&mut self, count: u64, pc: u32, instr: u32) {
        if self.sink.is_none() {
            return;
        }
        let text = disassemble(pc, instr, self.symbols);
        self.emit(format_args!("{count:8} {pc:8x} : {instr:08X}     {text:<30}"));
    }

    /// Note a register write (writes to x0 are not shown)
    pub fn register_change(&mut self, n: u8, value: i32) {
        if n == 0 {
            return;
        }
        self.emit(format_args!("                R[{n:2}] <- {:x}", value as u32));
    }

    /// Note a memory write of the given number of bytes
    pub fn memory_write(&mut self, addr: u32, value: u32, bytes: u32) {
        self.emit(format_args!(
            "                M[{addr:x}] <- {value:x} ({bytes} bytes)"
        ));
    }

    /// Note a taken conditional branch
    pub fn branch_taken(&mut self) {
        self.emit(format_args!("            {{T}}"));
    }

    pub fn getchar(&mut self, value: i32) {
        self.emit(format_args!("getchar() -> {}\n", char::from(value as u8)));
    }

    pub fn putchar(&mut self, value: i32) {
        self.emit(format_args!("putchar({})\n", char::from(value as u8)));
    }

    pub fn exit(&mut self) {
        self.emit(format_args!("exit()\n"));
    }

    /// Finish the line for the current instruction
    pub fn end_line(&mut self) {
        self.emit(format_args!("\n"));
    }
}
