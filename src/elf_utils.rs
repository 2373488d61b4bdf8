//! ELF loading and symbol-table construction
//!
//! Reads an executable produced by the riscv-gcc toolchain, loads
//! every allocatable section into the simulated memory, and collects
//! the named symbols so the disassembler can label addresses.

use elf::abi::{SHF_ALLOC, SHT_NOBITS, STT_FUNC, STT_NOTYPE, STT_OBJECT};
use elf::endian::AnyEndian;
use elf::section::SectionHeader;
use elf::string_table::StringTable;
use elf::ElfBytes;
use itertools::Itertools;
use log::{debug, info};
use std::collections::HashMap;
use thiserror::Error;

use crate::memory::{Memory, Wordsize};

#[derive(Debug, Error)]
pub enum ElfError {
    #[error("could not read {path}: {reason}")]
    ReadFailed { path: String, reason: String },
    #[error("could not parse ELF file: {0}")]
    ParseFailed(String),
    #[error("ELF file has no section headers or no string table")]
    MissingSectionHeaders,
    #[error("ELF file has no .text section")]
    MissingTextSection,
    #[error("found unexpected compression in section {0}")]
    CompressedSection(String),
}

/// Exact-match mapping from addresses to symbol names
#[derive(Debug, Default)]
pub struct SymbolTable {
    map: HashMap<u32, String>,
}

impl SymbolTable {
    pub fn insert(&mut self, addr: u32, name: String) {
        self.map.insert(addr, name);
    }

    /// Look up the symbol name at addr, if any
    pub fn value_to_sym(&self, addr: u32) -> Option<&str> {
        self.map.get(&addr).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// An ELF image loaded into simulated memory
#[derive(Debug)]
pub struct LoadedElf {
    /// Entry address from the ELF header
    pub entry: u32,
    pub symbols: SymbolTable,
}

/// The contents of the .text section, for disassembly listings
#[derive(Debug)]
pub struct TextSection {
    /// Load address of the first word
    pub addr: u32,
    pub words: Vec<u32>,
}

/// Get the section header name for this section
fn section_name<'a>(header: &SectionHeader, strtab: &'a StringTable) -> &'a str {
    strtab
        .get(header.sh_name.try_into().unwrap_or(usize::MAX))
        .unwrap_or("<unnamed>")
}

fn parse_file(file_data: &[u8]) -> Result<ElfBytes<'_, AnyEndian>, ElfError> {
    ElfBytes::<AnyEndian>::minimal_parse(file_data).map_err(|e| ElfError::ParseFailed(e.to_string()))
}

fn read_file(path: &str) -> Result<Vec<u8>, ElfError> {
    std::fs::read(path).map_err(|e| ElfError::ReadFailed {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

fn section_data<'a>(
    header: &SectionHeader,
    file: &'a ElfBytes<'_, AnyEndian>,
    name: &str,
) -> Result<&'a [u8], ElfError> {
    let (data, compression) = file
        .section_data(header)
        .map_err(|e| ElfError::ParseFailed(e.to_string()))?;
    if compression.is_some() {
        return Err(ElfError::CompressedSection(name.to_string()));
    }
    Ok(data)
}

fn load_symbols(file: &ElfBytes<'_, AnyEndian>) -> Result<SymbolTable, ElfError> {
    let mut symbols = SymbolTable::default();
    let symtab = file
        .symbol_table()
        .map_err(|e| ElfError::ParseFailed(e.to_string()))?;
    let Some((symtab, strtab)) = symtab else {
        return Ok(symbols);
    };
    for entry in symtab.iter() {
        let keep = matches!(entry.st_symtype(), STT_FUNC | STT_OBJECT | STT_NOTYPE);
        if !keep {
            continue;
        }
        let Ok(name) = strtab.get(entry.st_name.try_into().unwrap_or(usize::MAX)) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let addr = entry.st_value as u32;
        debug!("symbol {name} at 0x{addr:x}");
        symbols.insert(addr, name.to_string());
    }
    Ok(symbols)
}

/// Read an ELF file from disk and load the alloc sections (the ones
/// meant to be present during program execution) into memory. Returns
/// the entry address and the symbol table.
pub fn load_elf(mem: &mut Memory, path: &str) -> Result<LoadedElf, ElfError> {
    let file_data = read_file(path)?;
    let file = parse_file(&file_data)?;

    let (section_headers, strtab) = file
        .section_headers_with_strtab()
        .map_err(|e| ElfError::ParseFailed(e.to_string()))?;
    let (section_headers, strtab) = section_headers
        .zip(strtab)
        .ok_or(ElfError::MissingSectionHeaders)?;

    for header in section_headers.iter() {
        if header.sh_flags & u64::from(SHF_ALLOC) == 0 {
            continue;
        }
        // .bss carries no file data and memory reads as zero anyway
        if header.sh_type == SHT_NOBITS {
            continue;
        }
        let name = section_name(&header, &strtab);
        let data = section_data(&header, &file, name)?;
        let load_address = header.sh_addr as u32;
        info!(
            "loading section {name}: {} bytes at 0x{load_address:x}",
            data.len()
        );
        for (offset, byte) in data.iter().enumerate() {
            let addr = load_address.wrapping_add(offset as u32);
            mem.write(addr, (*byte).into(), Wordsize::Byte);
        }
    }

    let symbols = load_symbols(&file)?;
    let entry = file.ehdr.e_entry as u32;
    info!("entry address 0x{entry:x}, {} symbols", symbols.len());

    Ok(LoadedElf { entry, symbols })
}

/// Read only the symbol table of an ELF file
pub fn read_symbols(path: &str) -> Result<SymbolTable, ElfError> {
    let file_data = read_file(path)?;
    let file = parse_file(&file_data)?;
    load_symbols(&file)
}

/// Read the .text section of an ELF file as a stream of instruction
/// words, without loading the rest of the image
pub fn read_text_section(path: &str) -> Result<TextSection, ElfError> {
    let file_data = read_file(path)?;
    let file = parse_file(&file_data)?;

    let header: SectionHeader = file
        .section_header_by_name(".text")
        .map_err(|e| ElfError::ParseFailed(e.to_string()))?
        .ok_or(ElfError::MissingTextSection)?;
    let data = section_data(&header, &file, ".text")?;

    // The data is a little-endian byte stream; reinterpret it as a
    // stream of 32-bit words
    let words = data
        .iter()
        .copied()
        .tuples()
        .map(|(a, b, c, d)| u32::from_le_bytes([a, b, c, d]))
        .collect();

    Ok(TextSection {
        addr: header.sh_addr as u32,
        words,
    })
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn check_symbol_lookup_is_exact_match() {
        let mut symbols = SymbolTable::default();
        symbols.insert(0x1000, "_start".to_string());
        symbols.insert(0x1010, "main".to_string());
        assert_eq!(symbols.value_to_sym(0x1000), Some("_start"));
        assert_eq!(symbols.value_to_sym(0x1010), Some("main"));
        assert_eq!(symbols.value_to_sym(0x1004), None);
    }

    #[test]
    fn check_empty_symbol_table() {
        let symbols = SymbolTable::default();
        assert!(symbols.is_empty());
        assert_eq!(symbols.value_to_sym(0), None);
    }
}
