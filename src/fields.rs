//! Field extraction for 32-bit instruction words
//!
//! Every RV32 instruction format shares the opcode in bits [6:0];
//! register indices and function fields sit at fixed positions in the
//! word. The five immediate formats scatter their bits differently and
//! all sign-extend from their top bit. All of these functions are
//! total: no 32-bit input is invalid at this layer.

use crate::utils::{extract_field, sign_extend};

pub fn opcode(instr: u32) -> u32 {
    extract_field(instr, 6, 0)
}

pub fn rd(instr: u32) -> u8 {
    extract_field(instr, 11, 7) as u8
}

pub fn funct3(instr: u32) -> u32 {
    extract_field(instr, 14, 12)
}

pub fn rs1(instr: u32) -> u8 {
    extract_field(instr, 19, 15) as u8
}

pub fn rs2(instr: u32) -> u8 {
    extract_field(instr, 24, 20) as u8
}

pub fn funct7(instr: u32) -> u32 {
    extract_field(instr, 31, 25)
}

/// I-type immediate: instr[31:20], sign-extended from 12 bits
pub fn imm_i(instr: u32) -> i32 {
    sign_extend(instr >> 20, 11) as i32
}

/// S-type immediate: instr[31:25] || instr[11:7], sign-extended from
/// 12 bits
pub fn imm_s(instr: u32) -> i32 {
    let imm = (extract_field(instr, 31, 25) << 5) | extract_field(instr, 11, 7);
    sign_extend(imm, 11) as i32
}

/// B-type immediate: instr[31] || instr[7] || instr[30:25] ||
/// instr[11:8] || 0, sign-extended from 13 bits
pub fn imm_b(instr: u32) -> i32 {
    let imm = (extract_field(instr, 31, 31) << 12)
        | (extract_field(instr, 7, 7) << 11)
        | (extract_field(instr, 30, 25) << 5)
        | (extract_field(instr, 11, 8) << 1);
    sign_extend(imm, 12) as i32
}

/// U-type immediate: instr[31:12] || 12 low zeros
pub fn imm_u(instr: u32) -> i32 {
    (instr & 0xffff_f000) as i32
}

/// J-type immediate: instr[31] || instr[19:12] || instr[20] ||
/// instr[30:21] || 0, sign-extended from 21 bits
pub fn imm_j(instr: u32) -> i32 {
    let imm = (extract_field(instr, 31, 31) << 20)
        | (extract_field(instr, 19, 12) << 12)
        | (extract_field(instr, 20, 20) << 11)
        | (extract_field(instr, 30, 21) << 1);
    sign_extend(imm, 20) as i32
}
