//! Instruction encoding
//!
//! Builders for the instruction words the simulator executes. These
//! are primarily used by the test suites to assemble small programs
//! directly into memory images, without going through an external
//! toolchain. Immediates are passed as signed values and masked to
//! their field widths; out-of-range immediates are silently truncated.

use crate::opcodes::*;
use crate::utils::extract_field;

fn reg(n: u8) -> u32 {
    u32::from(n & 0x1f)
}

fn rtype(funct7: u32, src2: u8, src1: u8, funct3: u32, dest: u8, opcode: u32) -> u32 {
    funct7 << 25 | reg(src2) << 20 | reg(src1) << 15 | funct3 << 12 | reg(dest) << 7 | opcode
}

fn itype(imm: i32, src: u8, funct3: u32, dest: u8, opcode: u32) -> u32 {
    let imm = (imm as u32) & 0xfff;
    imm << 20 | reg(src) << 15 | funct3 << 12 | reg(dest) << 7 | opcode
}

fn stype(imm: i32, src: u8, base: u8, funct3: u32) -> u32 {
    let imm = imm as u32;
    let imm11_5 = extract_field(imm, 11, 5);
    let imm4_0 = extract_field(imm, 4, 0);
    imm11_5 << 25 | reg(src) << 20 | reg(base) << 15 | funct3 << 12 | imm4_0 << 7 | OP_STORE
}

fn btype(offset: i32, src1: u8, src2: u8, funct3: u32) -> u32 {
    let imm = offset as u32;
    let hi = extract_field(imm, 12, 12) << 6 | extract_field(imm, 10, 5);
    let lo = extract_field(imm, 4, 1) << 1 | extract_field(imm, 11, 11);
    hi << 25 | reg(src2) << 20 | reg(src1) << 15 | funct3 << 12 | lo << 7 | OP_BRANCH
}

fn utype(imm20: u32, dest: u8, opcode: u32) -> u32 {
    (imm20 & 0xf_ffff) << 12 | reg(dest) << 7 | opcode
}

fn jtype(offset: i32, dest: u8) -> u32 {
    let imm = offset as u32;
    let field = extract_field(imm, 20, 20) << 19
        | extract_field(imm, 10, 1) << 9
        | extract_field(imm, 11, 11) << 8
        | extract_field(imm, 19, 12);
    field << 12 | reg(dest) << 7 | OP_JAL
}

fn shift(funct7: u32, shamt: u8, src: u8, funct3: u32, dest: u8) -> u32 {
    rtype(funct7, shamt & 0x1f, src, funct3, dest, OP_IMM)
}

/// Load the 20-bit imm into the upper bits of dest
pub fn lui(dest: u8, imm20: u32) -> u32 {
    utype(imm20, dest, OP_LUI)
}

/// Add the 20-bit imm shifted up by 12 to the pc, into dest
pub fn auipc(dest: u8, imm20: u32) -> u32 {
    utype(imm20, dest, OP_AUIPC)
}

pub fn jal(dest: u8, offset: i32) -> u32 {
    jtype(offset, dest)
}

pub fn jalr(dest: u8, base: u8, offset: i32) -> u32 {
    itype(offset, base, 0b000, dest, OP_JALR)
}

pub fn beq(src1: u8, src2: u8, offset: i32) -> u32 {
    btype(offset, src1, src2, FUNCT3_BEQ)
}

pub fn bne(src1: u8, src2: u8, offset: i32) -> u32 {
    btype(offset, src1, src2, FUNCT3_BNE)
}

pub fn blt(src1: u8, src2: u8, offset: i32) -> u32 {
    btype(offset, src1, src2, FUNCT3_BLT)
}

pub fn bge(src1: u8, src2: u8, offset: i32) -> u32 {
    btype(offset, src1, src2, FUNCT3_BGE)
}

pub fn bltu(src1: u8, src2: u8, offset: i32) -> u32 {
    btype(offset, src1, src2, FUNCT3_BLTU)
}

pub fn bgeu(src1: u8, src2: u8, offset: i32) -> u32 {
    btype(offset, src1, src2, FUNCT3_BGEU)
}

pub fn lb(dest: u8, base: u8, offset: i32) -> u32 {
    itype(offset, base, FUNCT3_B, dest, OP_LOAD)
}

pub fn lh(dest: u8, base: u8, offset: i32) -> u32 {
    itype(offset, base, FUNCT3_H, dest, OP_LOAD)
}

pub fn lw(dest: u8, base: u8, offset: i32) -> u32 {
    itype(offset, base, FUNCT3_W, dest, OP_LOAD)
}

pub fn lbu(dest: u8, base: u8, offset: i32) -> u32 {
    itype(offset, base, FUNCT3_BU, dest, OP_LOAD)
}

pub fn lhu(dest: u8, base: u8, offset: i32) -> u32 {
    itype(offset, base, FUNCT3_HU, dest, OP_LOAD)
}

pub fn sb(src: u8, base: u8, offset: i32) -> u32 {
    stype(offset, src, base, FUNCT3_B)
}

pub fn sh(src: u8, base: u8, offset: i32) -> u32 {
    stype(offset, src, base, FUNCT3_H)
}

pub fn sw(src: u8, base: u8, offset: i32) -> u32 {
    stype(offset, src, base, FUNCT3_W)
}

pub fn addi(dest: u8, src: u8, imm: i32) -> u32 {
    itype(imm, src, FUNCT3_ADDI, dest, OP_IMM)
}

pub fn slti(dest: u8, src: u8, imm: i32) -> u32 {
    itype(imm, src, FUNCT3_SLTI, dest, OP_IMM)
}

pub fn sltiu(dest: u8, src: u8, imm: i32) -> u32 {
    itype(imm, src, FUNCT3_SLTIU, dest, OP_IMM)
}

pub fn xori(dest: u8, src: u8, imm: i32) -> u32 {
    itype(imm, src, FUNCT3_XORI, dest, OP_IMM)
}

pub fn ori(dest: u8, src: u8, imm: i32) -> u32 {
    itype(imm, src, FUNCT3_ORI, dest, OP_IMM)
}

pub fn andi(dest: u8, src: u8, imm: i32) -> u32 {
    itype(imm, src, FUNCT3_ANDI, dest, OP_IMM)
}

pub fn slli(dest: u8, src: u8, shamt: u8) -> u32 {
    shift(0b0000000, shamt, src, FUNCT3_SLLI, dest)
}

pub fn srli(dest: u8, src: u8, shamt: u8) -> u32 {
    shift(0b0000000, shamt, src, FUNCT3_SRLI_SRAI, dest)
}

pub fn srai(dest: u8, src: u8, shamt: u8) -> u32 {
    shift(FUNCT7_SRA, shamt, src, FUNCT3_SRLI_SRAI, dest)
}

pub fn add(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(0b0000000, src2, src1, FUNCT3_ADD, dest, OP)
}

pub fn sub(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(FUNCT7_SUB, src2, src1, FUNCT3_ADD, dest, OP)
}

pub fn sll(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(0b0000000, src2, src1, FUNCT3_SLL, dest, OP)
}

pub fn slt(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(0b0000000, src2, src1, FUNCT3_SLT, dest, OP)
}

pub fn sltu(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(0b0000000, src2, src1, FUNCT3_SLTU, dest, OP)
}

pub fn xor(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(0b0000000, src2, src1, FUNCT3_XOR, dest, OP)
}

pub fn srl(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(0b0000000, src2, src1, FUNCT3_SRL, dest, OP)
}

pub fn sra(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(FUNCT7_SRA, src2, src1, FUNCT3_SRL, dest, OP)
}

pub fn or(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(0b0000000, src2, src1, FUNCT3_OR, dest, OP)
}

pub fn and(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(0b0000000, src2, src1, FUNCT3_AND, dest, OP)
}

pub fn mul(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(FUNCT7_MULDIV, src2, src1, FUNCT3_ADD, dest, OP)
}

pub fn mulh(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(FUNCT7_MULDIV, src2, src1, FUNCT3_SLL, dest, OP)
}

pub fn div(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(FUNCT7_MULDIV, src2, src1, FUNCT3_XOR, dest, OP)
}

pub fn divu(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(FUNCT7_MULDIV, src2, src1, FUNCT3_SRL, dest, OP)
}

pub fn rem(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(FUNCT7_MULDIV, src2, src1, FUNCT3_OR, dest, OP)
}

pub fn remu(dest: u8, src1: u8, src2: u8) -> u32 {
    rtype(FUNCT7_MULDIV, src2, src1, FUNCT3_AND, dest, OP)
}

pub fn ecall() -> u32 {
    INSTR_ECALL
}
