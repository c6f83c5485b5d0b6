//! Outbound program messages.

use crate::error::{Error, Result};
use crate::packing::PackingCodec;
use crate::patch::RawPatch;
use crate::program::ProgramNumber;
use crate::sysex::{edit_buffer_frame, program_dump_frame, Sysex};

/// Which message shape to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameFormat {
    /// Goes to the synth's edit buffer without touching stored programs.
    #[default]
    EditBuffer,
    /// Overwrites the program slot assigned to the patch.
    ProgramDump,
}

/// Packs programs and wraps them in DSI headers.
#[derive(Debug, Clone)]
pub struct PatchFrameBuilder<C: PackingCodec> {
    model_id: u8,
    codec: C,
}

impl<C: PackingCodec> PatchFrameBuilder<C> {
    pub fn new(model_id: u8, codec: C) -> Self {
        Self { model_id, codec }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    fn encode(&self, patch: &RawPatch) -> Result<Vec<u8>> {
        let raw = patch
            .as_bytes()
            .get(..self.codec.raw_size())
            .ok_or(Error::SizeContract {
                what: "raw payload",
                expected: self.codec.raw_size(),
                actual: patch.as_bytes().len(),
            })?;
        let wire = self.codec.encode(raw)?;
        if wire.len() != self.codec.encoded_size() {
            return Err(Error::SizeContract {
                what: "encoded payload",
                expected: self.codec.encoded_size(),
                actual: wire.len(),
            });
        }
        Ok(wire)
    }

    /// Build an edit buffer dump.
    pub fn edit_buffer(&self, patch: &RawPatch) -> Result<Sysex> {
        Ok(edit_buffer_frame(self.model_id, &self.encode(patch)?))
    }

    /// Build a program dump for the slot assigned to `patch`.
    pub fn program_dump(&self, patch: &RawPatch) -> Result<Sysex> {
        let program = patch.program().ok_or(Error::MissingProgramNumber)?;
        self.program_dump_at(patch, program)
    }

    /// Build a program dump for an explicit slot.
    pub fn program_dump_at(&self, patch: &RawPatch, program: ProgramNumber) -> Result<Sysex> {
        log::debug!("Building program dump for {}", program);
        Ok(program_dump_frame(self.model_id, program, &self.encode(patch)?))
    }

    pub fn build(&self, patch: &RawPatch, format: FrameFormat) -> Result<Sysex> {
        match format {
            FrameFormat::EditBuffer => self.edit_buffer(patch),
            FrameFormat::ProgramDump => self.program_dump(patch),
        }
    }
}
