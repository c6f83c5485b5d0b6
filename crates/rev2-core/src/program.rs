//! Program slot numbering.
//!
//! The Rev2 stores 8 banks of 128 programs. Banks 0-3 are the user banks
//! U1-U4, banks 4-7 the factory banks F1-F4.

use crate::error::{Error, Result};
use std::fmt;

/// Number of program banks.
pub const NUM_BANKS: usize = 8;

/// Programs per bank.
pub const PROGRAMS_PER_BANK: usize = 128;

/// Zero-based program slot across all banks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProgramNumber(u16);

impl ProgramNumber {
    /// Create a program number from a zero-based slot index.
    pub fn new(index: usize) -> Result<Self> {
        if index >= NUM_BANKS * PROGRAMS_PER_BANK {
            return Err(Error::ProgramOutOfRange(index));
        }
        Ok(Self(index as u16))
    }

    /// Create a program number from bank and program bytes as found in a dump.
    pub fn from_bank_program(bank: u8, program: u8) -> Result<Self> {
        Self::new(bank as usize * PROGRAMS_PER_BANK + program as usize)
    }

    /// Zero-based slot index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Zero-based bank.
    pub fn bank(&self) -> u8 {
        (self.index() / PROGRAMS_PER_BANK) as u8
    }

    /// Zero-based program within the bank.
    pub fn program_in_bank(&self) -> u8 {
        (self.index() % PROGRAMS_PER_BANK) as u8
    }

    /// Human readable name, e.g. `U1P1` or `F4P128`.
    pub fn friendly_name(&self) -> String {
        format!("{}P{}", bank_name(self.bank()), self.program_in_bank() as usize + 1)
    }
}

impl fmt::Display for ProgramNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.friendly_name())
    }
}

/// Name of a zero-based bank as printed on the synth.
pub fn bank_name(bank: u8) -> String {
    let section = if (bank as usize) < NUM_BANKS / 2 { "U" } else { "F" };
    format!("{}{}", section, bank % 4 + 1)
}
