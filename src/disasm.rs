//! Symbol-aware disassembler
//!
//! Formats one instruction word as text. If the address itself names a
//! symbol, the output is the label (`name:`) and the instruction word
//! is not rendered; this is how function boundaries show up in
//! execution traces and listings.
//!
//! Operand conventions: registers appear under their ABI names,
//! I/S-immediates in signed decimal, branch and jump targets as
//! absolute hex addresses, upper immediates as hex. Mnemonics are
//! left-aligned in a 9-column field so operands line up.

use crate::elf_utils::SymbolTable;
use crate::instr::{Instr, UnknownClass};
use crate::registers::abi_name;

/// Disassemble the instruction word at addr
pub fn disassemble(addr: u32, instr: u32, symbols: Option<&SymbolTable>) -> String {
    if let Some(name) = symbols.and_then(|symbols| symbols.value_to_sym(addr)) {
        return format!("{name}:");
    }

    let decoded = match Instr::decode(instr) {
        Ok(decoded) => decoded,
        Err(_) => return format!("unknown instruction 0x{instr:08x}"),
    };

    match decoded {
        Instr::Lui { dest, u_immediate } => {
            format!("{:<9}{},0x{:x}", "lui", abi_name(dest), (u_immediate >> 12) as u32)
        }
        Instr::Auipc { dest, u_immediate } => {
            format!("{:<9}{},0x{:x}", "auipc", abi_name(dest), (u_immediate >> 12) as u32)
        }
        Instr::Jal { dest, offset } => {
            let target = addr.wrapping_add(offset as u32);
            format!("{:<9}{},0x{target:x}", "jal", abi_name(dest))
        }
        Instr::Jalr { dest, base, offset } => {
            format!("{:<9}{},{},{offset}", "jalr", abi_name(dest), abi_name(base))
        }
        Instr::Branch {
            mnemonic,
            src1,
            src2,
            offset,
        } => {
            let target = addr.wrapping_add(offset as u32);
            format!(
                "{:<9}{},{},0x{target:x}",
                mnemonic.mnemonic(),
                abi_name(src1),
                abi_name(src2)
            )
        }
        Instr::Load {
            mnemonic,
            dest,
            base,
            offset,
        } => {
            format!(
                "{:<9}{},{offset}({})",
                mnemonic.mnemonic(),
                abi_name(dest),
                abi_name(base)
            )
        }
        Instr::Store {
            mnemonic,
            src,
            base,
            offset,
        } => {
            format!(
                "{:<9}{},{offset}({})",
                mnemonic.mnemonic(),
                abi_name(src),
                abi_name(base)
            )
        }
        Instr::RegImm {
            mnemonic,
            dest,
            src,
            i_immediate,
        } => {
            format!(
                "{:<9}{},{},{i_immediate}",
                mnemonic.mnemonic(),
                abi_name(dest),
                abi_name(src)
            )
        }
        Instr::Shift {
            mnemonic,
            dest,
            src,
            shamt,
        } => {
            format!(
                "{:<9}{},{},{shamt}",
                mnemonic.mnemonic(),
                abi_name(dest),
                abi_name(src)
            )
        }
        Instr::RegReg {
            mnemonic,
            dest,
            src1,
            src2,
        } => {
            format!(
                "{:<9}{},{},{}",
                mnemonic.mnemonic(),
                abi_name(dest),
                abi_name(src1),
                abi_name(src2)
            )
        }
        Instr::Ecall => "ecall".to_string(),
        Instr::Unknown(class) => match class {
            UnknownClass::Branch => "unknown branch".to_string(),
            UnknownClass::Load => "unknown load".to_string(),
            UnknownClass::Store => "unknown store".to_string(),
            UnknownClass::System => "unknown system".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::encode::*;

    #[test]
    fn check_upper_immediates() {
        assert_eq!(disassemble(0, lui(10, 0x12345), None), "lui      a0,0x12345");
        assert_eq!(disassemble(0, auipc(3, 0x1), None), "auipc    gp,0x1");
        // The upper immediate keeps its sign through the shift
        assert_eq!(
            disassemble(0, lui(10, 0x80000), None),
            "lui      a0,0xfff80000"
        );
    }

    #[test]
    fn check_jumps() {
        assert_eq!(disassemble(0x1000, jal(1, 8), None), "jal      ra,0x1008");
        assert_eq!(disassemble(0x1000, jal(1, -16), None), "jal      ra,0xff0");
        assert_eq!(disassemble(0, jalr(1, 5, -4), None), "jalr     ra,t0,-4");
    }

    #[test]
    fn check_branches() {
        assert_eq!(
            disassemble(0x1000, beq(10, 11, 8), None),
            "beq      a0,a1,0x1008"
        );
        assert_eq!(
            disassemble(0x1000, bgeu(28, 31, -4), None),
            "bgeu     t3,t6,0xffc"
        );
    }

    #[test]
    fn check_loads_and_stores() {
        assert_eq!(disassemble(0, lw(10, 2, 16), None), "lw       a0,16(sp)");
        assert_eq!(disassemble(0, lbu(11, 8, -1), None), "lbu      a1,-1(s0)");
        assert_eq!(disassemble(0, sb(10, 2, -20), None), "sb       a0,-20(sp)");
        assert_eq!(disassemble(0, sw(17, 2, 0), None), "sw       a7,0(sp)");
    }

    #[test]
    fn check_immediate_arithmetic() {
        assert_eq!(
            disassemble(0, addi(10, 0, 5), None),
            "addi     a0,zero,5"
        );
        assert_eq!(
            disassemble(0, sltiu(10, 11, -1), None),
            "sltiu    a0,a1,-1"
        );
        assert_eq!(disassemble(0, slli(7, 5, 31), None), "slli     t2,t0,31");
        assert_eq!(disassemble(0, srai(10, 10, 4), None), "srai     a0,a0,4");
    }

    #[test]
    fn check_register_arithmetic() {
        assert_eq!(disassemble(0, add(12, 10, 11), None), "add      a2,a0,a1");
        assert_eq!(disassemble(0, mulh(12, 10, 11), None), "mulh     a2,a0,a1");
        assert_eq!(disassemble(0, remu(13, 10, 11), None), "remu     a3,a0,a1");
    }

    #[test]
    fn check_system() {
        assert_eq!(disassemble(0, ecall(), None), "ecall");
        assert_eq!(disassemble(0, 0x00100073, None), "unknown system");
    }

    #[test]
    fn check_placeholders() {
        assert_eq!(disassemble(0, 0x00b52463, None), "unknown branch");
        assert_eq!(disassemble(0, 0x00353503, None), "unknown load");
        assert_eq!(disassemble(0, 0x00a53523, None), "unknown store");
        assert_eq!(
            disassemble(0, 0x0000002f, None),
            "unknown instruction 0x0000002f"
        );
    }

    #[test]
    fn check_symbol_label_replaces_instruction() {
        let mut symbols = SymbolTable::default();
        symbols.insert(0x1000, "_start".to_string());
        assert_eq!(
            disassemble(0x1000, addi(10, 0, 5), Some(&symbols)),
            "_start:"
        );
        // A non-matching address still disassembles
        assert_eq!(
            disassemble(0x1004, addi(10, 0, 5), Some(&symbols)),
            "addi     a0,zero,5"
        );
    }
}
