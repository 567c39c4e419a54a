//! The `MILO` binary container: a fixed header (`magic`, `version`,
//! `word_count`) followed by `word_count` little-endian 64-bit instruction
//! words, plus a hex dump text format for the same word stream.
//!
//! Grounded on the teacher's `ReadVexExt`/`WriteVexExt` extension-trait
//! pair and its `byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt}`
//! usage, generalized from the teacher's `data_length`-prefixed
//! `data`+`instructions` two-section format to Milo832's single
//! magic-header instruction-word-only format — there is no separate data
//! section in the container; `.data` constant pool entries are an
//! assembler-level concept applied at `Vm::load_data` time, not part of
//! this file format.

use byteorder::{ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use util::Endian;

#[cfg(test)]
mod test;

/// `b"MILO"` read as a big-endian `u32`, i.e. `0x4D49_4C4F`.
pub const MAGIC: u32 = 0x4D49_4C4F;

pub const VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VexError {
    BadMagic(u32),
    UnsupportedVersion(u32),
    Io(String),
}

impl fmt::Display for VexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VexError::BadMagic(found) => write!(f, "Not a Milo832 container (magic 0x{:08X})", found),
            VexError::UnsupportedVersion(found) => write!(f, "Unsupported container version {}", found),
            VexError::Io(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for VexError {}

impl From<std::io::Error> for VexError {
    fn from(err: std::io::Error) -> VexError {
        VexError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, VexError>;

/// Reads a `MILO`-magic container, returning its instruction words.
pub fn read<R: Read>(reader: &mut R) -> Result<Vec<u64>> {
    let magic = reader.read_u32::<Endian>()?;
    if magic != MAGIC {
        return Err(VexError::BadMagic(magic));
    }

    let version = reader.read_u32::<Endian>()?;
    if version != VERSION {
        return Err(VexError::UnsupportedVersion(version));
    }

    let word_count = reader.read_u32::<Endian>()?;
    let mut words = Vec::with_capacity(word_count as usize);
    for _ in 0..word_count {
        words.push(reader.read_u64::<Endian>()?);
    }
    Ok(words)
}

/// Writes `words` as a `MILO`-magic container.
pub fn write<W: Write>(writer: &mut W, words: &[u64]) -> Result<()> {
    writer.write_u32::<Endian>(MAGIC)?;
    writer.write_u32::<Endian>(VERSION)?;
    writer.write_u32::<Endian>(words.len() as u32)?;
    for word in words {
        writer.write_u64::<Endian>(*word)?;
    }
    Ok(())
}

pub trait ReadVexExt: Read + Sized {
    fn read_vex(&mut self) -> Result<Vec<u64>> {
        read(self)
    }
}

impl<R: Read + Sized> ReadVexExt for R {}

pub trait WriteVexExt: Write + Sized {
    fn write_vex(&mut self, words: &[u64]) -> Result<()> {
        write(self, words)
    }
}

impl<W: Write + Sized> WriteVexExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Vec<u64>> {
    BufReader::new(File::open(path)?).read_vex()
}

pub fn write_file<P: AsRef<Path>>(path: P, words: &[u64]) -> Result<()> {
    BufWriter::new(File::create(path)?).write_vex(words)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexDumpError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for HexDumpError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for HexDumpError {}

/// Renders `words` as one 16-character uppercase hex word per line.
pub fn hex_dump(words: &[u64]) -> String {
    let mut out = String::with_capacity(words.len() * 17);
    for word in words {
        out.push_str(&format!("{:016X}\n", word));
    }
    out
}

/// Parses a [`hex_dump`] listing back into instruction words, skipping
/// blank lines.
pub fn parse_hex_dump(text: &str) -> std::result::Result<Vec<u64>, HexDumpError> {
    let mut words = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let word = u64::from_str_radix(trimmed, 16).map_err(|e| HexDumpError {
            line: i + 1,
            message: format!("Malformed hex word \"{}\": {}", trimmed, e),
        })?;
        words.push(word);
    }
    Ok(words)
}
