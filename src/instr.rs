//! Instruction decoding
//!
//! This is where a u32 instruction word is converted into the Instr
//! enum, which holds the instruction fields in a form ready for
//! execution. Both the execution engine and the disassembler consume
//! this decoded form.
//!
//! Decoding distinguishes two failure modes. An unrecognised primary
//! opcode is an error (the word is not an instruction at all). An
//! unrecognised funct3/funct7 combination inside a known opcode family
//! decodes to Instr::Unknown, which the engine retires without any
//! state change and the disassembler prints as a category placeholder.

use thiserror::Error;

use crate::fields::{funct3, funct7, imm_b, imm_i, imm_j, imm_s, imm_u, opcode, rd, rs1, rs2};
use crate::opcodes::*;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("got invalid or unimplemented opcode 0x{opcode:02x} in instruction 0x{instr:08x}")]
    UnknownOpcode { opcode: u32, instr: u32 },
}

/// Condition for a conditional branch:
/// - beq: src1 == src2
/// - bne: src1 != src2
/// - blt: src1 < src2 as signed integers
/// - bge: src1 >= src2 as signed integers
/// - bltu: src1 < src2 as unsigned integers
/// - bgeu: src1 >= src2 as unsigned integers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
}

impl Branch {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Branch::Beq => "beq",
            Branch::Bne => "bne",
            Branch::Blt => "blt",
            Branch::Bge => "bge",
            Branch::Bltu => "bltu",
            Branch::Bgeu => "bgeu",
        }
    }
}

/// Width and extension behaviour of a load:
/// - lb/lh: sign extend an 8/16-bit value
/// - lw: full word
/// - lbu/lhu: zero extend an 8/16-bit value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
}

impl Load {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Load::Lb => "lb",
            Load::Lh => "lh",
            Load::Lw => "lw",
            Load::Lbu => "lbu",
            Load::Lhu => "lhu",
        }
    }
}

/// Width of a store (low 8, 16 or all 32 bits of the source register)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Store {
    Sb,
    Sh,
    Sw,
}

impl Store {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Store::Sb => "sb",
            Store::Sh => "sh",
            Store::Sw => "sw",
        }
    }
}

/// Register-immediate operation against the sign-extended I-immediate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegImm {
    Addi,
    Slti,
    Sltiu,
    Xori,
    Ori,
    Andi,
}

impl RegImm {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            RegImm::Addi => "addi",
            RegImm::Slti => "slti",
            RegImm::Sltiu => "sltiu",
            RegImm::Xori => "xori",
            RegImm::Ori => "ori",
            RegImm::Andi => "andi",
        }
    }
}

/// Shift-by-immediate operation. These use the I-type layout but carry
/// the shift amount in the rs2 field and select arithmetic right shift
/// with funct7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Slli,
    Srli,
    Srai,
}

impl Shift {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Shift::Slli => "slli",
            Shift::Srli => "srli",
            Shift::Srai => "srai",
        }
    }
}

/// Register-register operation, covering the base integer set and the
/// multiply/divide set (funct7 = 0x01)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegReg {
    Add,
    Sub,
    Mul,
    Sll,
    Mulh,
    Slt,
    Sltu,
    Xor,
    Div,
    Srl,
    Sra,
    Divu,
    Or,
    Rem,
    And,
    Remu,
}

impl RegReg {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            RegReg::Add => "add",
            RegReg::Sub => "sub",
            RegReg::Mul => "mul",
            RegReg::Sll => "sll",
            RegReg::Mulh => "mulh",
            RegReg::Slt => "slt",
            RegReg::Sltu => "sltu",
            RegReg::Xor => "xor",
            RegReg::Div => "div",
            RegReg::Srl => "srl",
            RegReg::Sra => "sra",
            RegReg::Divu => "divu",
            RegReg::Or => "or",
            RegReg::Rem => "rem",
            RegReg::And => "and",
            RegReg::Remu => "remu",
        }
    }
}

/// Opcode family of an instruction whose sub-fields did not decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownClass {
    Branch,
    Load,
    Store,
    System,
}

/// A decoded instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    Lui {
        dest: u8,
        u_immediate: i32,
    },
    Auipc {
        dest: u8,
        u_immediate: i32,
    },
    Jal {
        dest: u8,
        offset: i32,
    },
    Jalr {
        dest: u8,
        base: u8,
        offset: i32,
    },
    Branch {
        mnemonic: Branch,
        src1: u8,
        src2: u8,
        offset: i32,
    },
    Load {
        mnemonic: Load,
        dest: u8,
        base: u8,
        offset: i32,
    },
    Store {
        mnemonic: Store,
        src: u8,
        base: u8,
        offset: i32,
    },
    RegImm {
        mnemonic: RegImm,
        dest: u8,
        src: u8,
        i_immediate: i32,
    },
    Shift {
        mnemonic: Shift,
        dest: u8,
        src: u8,
        shamt: u8,
    },
    RegReg {
        mnemonic: RegReg,
        dest: u8,
        src1: u8,
        src2: u8,
    },
    Ecall,
    Unknown(UnknownClass),
}

impl Instr {
    pub fn decode(instr: u32) -> Result<Self, DecodeError> {
        let decoded = match opcode(instr) {
            OP_LUI => Self::Lui {
                dest: rd(instr),
                u_immediate: imm_u(instr),
            },
            OP_AUIPC => Self::Auipc {
                dest: rd(instr),
                u_immediate: imm_u(instr),
            },
            OP_JAL => Self::Jal {
                dest: rd(instr),
                offset: imm_j(instr),
            },
            OP_JALR => Self::Jalr {
                dest: rd(instr),
                base: rs1(instr),
                offset: imm_i(instr),
            },
            OP_BRANCH => {
                let mnemonic = match funct3(instr) {
                    FUNCT3_BEQ => Branch::Beq,
                    FUNCT3_BNE => Branch::Bne,
                    FUNCT3_BLT => Branch::Blt,
                    FUNCT3_BGE => Branch::Bge,
                    FUNCT3_BLTU => Branch::Bltu,
                    FUNCT3_BGEU => Branch::Bgeu,
                    _ => return Ok(Self::Unknown(UnknownClass::Branch)),
                };
                Self::Branch {
                    mnemonic,
                    src1: rs1(instr),
                    src2: rs2(instr),
                    offset: imm_b(instr),
                }
            }
            OP_LOAD => {
                let mnemonic = match funct3(instr) {
                    FUNCT3_B => Load::Lb,
                    FUNCT3_H => Load::Lh,
                    FUNCT3_W => Load::Lw,
                    FUNCT3_BU => Load::Lbu,
                    FUNCT3_HU => Load::Lhu,
                    _ => return Ok(Self::Unknown(UnknownClass::Load)),
                };
                Self::Load {
                    mnemonic,
                    dest: rd(instr),
                    base: rs1(instr),
                    offset: imm_i(instr),
                }
            }
            OP_STORE => {
                let mnemonic = match funct3(instr) {
                    FUNCT3_B => Store::Sb,
                    FUNCT3_H => Store::Sh,
                    FUNCT3_W => Store::Sw,
                    _ => return Ok(Self::Unknown(UnknownClass::Store)),
                };
                Self::Store {
                    mnemonic,
                    src: rs2(instr),
                    base: rs1(instr),
                    offset: imm_s(instr),
                }
            }
            OP_IMM => match funct3(instr) {
                FUNCT3_SLLI => Self::Shift {
                    mnemonic: Shift::Slli,
                    dest: rd(instr),
                    src: rs1(instr),
                    shamt: rs2(instr),
                },
                FUNCT3_SRLI_SRAI => Self::Shift {
                    mnemonic: if funct7(instr) == FUNCT7_SRA {
                        Shift::Srai
                    } else {
                        Shift::Srli
                    },
                    dest: rd(instr),
                    src: rs1(instr),
                    shamt: rs2(instr),
                },
                f3 => {
                    let mnemonic = match f3 {
                        FUNCT3_ADDI => RegImm::Addi,
                        FUNCT3_SLTI => RegImm::Slti,
                        FUNCT3_SLTIU => RegImm::Sltiu,
                        FUNCT3_XORI => RegImm::Xori,
                        FUNCT3_ORI => RegImm::Ori,
                        _ => RegImm::Andi,
                    };
                    Self::RegImm {
                        mnemonic,
                        dest: rd(instr),
                        src: rs1(instr),
                        i_immediate: imm_i(instr),
                    }
                }
            },
            OP => {
                let muldiv = funct7(instr) == FUNCT7_MULDIV;
                let mnemonic = match funct3(instr) {
                    FUNCT3_ADD => {
                        if funct7(instr) == FUNCT7_SUB {
                            RegReg::Sub
                        } else if muldiv {
                            RegReg::Mul
                        } else {
                            RegReg::Add
                        }
                    }
                    FUNCT3_SLL => {
                        if muldiv {
                            RegReg::Mulh
                        } else {
                            RegReg::Sll
                        }
                    }
                    FUNCT3_SLT => RegReg::Slt,
                    FUNCT3_SLTU => RegReg::Sltu,
                    FUNCT3_XOR => {
                        if muldiv {
                            RegReg::Div
                        } else {
                            RegReg::Xor
                        }
                    }
                    FUNCT3_SRL => {
                        if funct7(instr) == FUNCT7_SRA {
                            RegReg::Sra
                        } else if muldiv {
                            RegReg::Divu
                        } else {
                            RegReg::Srl
                        }
                    }
                    FUNCT3_OR => {
                        if muldiv {
                            RegReg::Rem
                        } else {
                            RegReg::Or
                        }
                    }
                    _ => {
                        if muldiv {
                            RegReg::Remu
                        } else {
                            RegReg::And
                        }
                    }
                };
                Self::RegReg {
                    mnemonic,
                    dest: rd(instr),
                    src1: rs1(instr),
                    src2: rs2(instr),
                }
            }
            OP_SYSTEM => {
                if instr == INSTR_ECALL {
                    Self::Ecall
                } else {
                    Self::Unknown(UnknownClass::System)
                }
            }
            opcode => return Err(DecodeError::UnknownOpcode { opcode, instr }),
        };
        Ok(decoded)
    }
}
