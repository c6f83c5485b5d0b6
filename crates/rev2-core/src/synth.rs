//! The Rev2 engine.
//!
//! [`Rev2`] ties the pieces together: it classifies inbound messages, unpacks
//! them into [`RawPatch`]es, applies the sequencer transformations and packs
//! the results back into messages.

use crate::error::Result;
use crate::fingerprint;
use crate::frames::{FrameFormat, PatchFrameBuilder};
use crate::layout::{Layer, PATCH_SIZE};
use crate::packing::{DsiPacking, PackingCodec};
use crate::patch::RawPatch;
use crate::program::{ProgramNumber, NUM_BANKS, PROGRAMS_PER_BANK};
use crate::sequencer;
use crate::sysex::{self, DumpKind, Sysex, REV2_MODEL_ID};

/// Patch engine for one synth model.
#[derive(Debug, Clone)]
pub struct Rev2<C: PackingCodec = DsiPacking> {
    model_id: u8,
    frames: PatchFrameBuilder<C>,
}

impl Default for Rev2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Rev2 {
    /// Engine for the Prophet Rev2 with DSI packing.
    pub fn new() -> Self {
        Self::with_codec(REV2_MODEL_ID, DsiPacking::default())
    }
}

impl<C: PackingCodec> Rev2<C> {
    /// Engine with a custom model id and codec.
    pub fn with_codec(model_id: u8, codec: C) -> Self {
        Self {
            model_id,
            frames: PatchFrameBuilder::new(model_id, codec),
        }
    }

    pub fn name(&self) -> &'static str {
        "DSI Prophet Rev2"
    }

    pub fn model_id(&self) -> u8 {
        self.model_id
    }

    pub fn number_of_banks(&self) -> usize {
        NUM_BANKS
    }

    pub fn number_of_patches(&self) -> usize {
        PROGRAMS_PER_BANK
    }

    /// Classify an inbound message.
    pub fn classify(&self, message: &Sysex) -> Result<DumpKind> {
        sysex::classify(message, self.model_id)
    }

    pub fn is_edit_buffer_dump(&self, message: &Sysex) -> bool {
        sysex::is_edit_buffer_dump(message, self.model_id)
    }

    pub fn is_program_dump(&self, message: &Sysex) -> bool {
        sysex::is_program_dump(message, self.model_id)
    }

    /// Decode an edit buffer or program dump.
    ///
    /// Program dumps carry their slot into the returned patch.
    pub fn patch_from_sysex(&self, message: &Sysex) -> Result<RawPatch> {
        let kind = self.classify(message)?;
        let raw = self.frames.codec().decode(kind.payload(message), PATCH_SIZE)?;
        let mut patch = RawPatch::from_bytes(&raw)?;
        patch.set_program(kind.program());
        log::debug!("Decoded {:?} '{}'", kind, patch.name());
        Ok(patch)
    }

    /// Encode as an edit buffer dump.
    pub fn patch_to_sysex(&self, patch: &RawPatch) -> Result<Sysex> {
        self.frames.edit_buffer(patch)
    }

    /// Encode as a program dump to the patch's own slot.
    pub fn patch_to_program_dump(&self, patch: &RawPatch) -> Result<Sysex> {
        self.frames.program_dump(patch)
    }

    /// Encode as a program dump to `program`.
    pub fn patch_to_program_dump_at(&self, patch: &RawPatch, program: ProgramNumber) -> Result<Sysex> {
        self.frames.program_dump_at(patch, program)
    }

    pub fn build(&self, patch: &RawPatch, format: FrameFormat) -> Result<Sysex> {
        self.frames.build(patch, format)
    }

    pub fn request_edit_buffer(&self) -> Sysex {
        sysex::edit_buffer_request(self.model_id)
    }

    pub fn request_program(&self, program: ProgramNumber) -> Sysex {
        sysex::program_request(self.model_id, program)
    }

    /// Requests for every program of a bank, in order.
    pub fn request_bank(&self, bank: u8) -> Result<Vec<Sysex>> {
        (0..PROGRAMS_PER_BANK as u8)
            .map(|program| {
                ProgramNumber::from_bank_program(bank, program).map(|p| self.request_program(p))
            })
            .collect()
    }

    /// Whether a received bank stream holds one program dump per slot.
    pub fn is_bank_complete(&self, messages: &[Sysex]) -> bool {
        messages.iter().filter(|m| self.is_program_dump(m)).count() == PROGRAMS_PER_BANK
    }

    /// Decode a message, apply `edit` and encode the result as an edit buffer.
    fn edit_message<F>(&self, message: &Sysex, edit: F) -> Result<Sysex>
    where
        F: FnOnce(&RawPatch) -> Result<RawPatch>,
    {
        let patch = self.patch_from_sysex(message)?;
        self.patch_to_sysex(&edit(&patch)?)
    }

    /// Message-level [`sequencer::poly_to_gated`].
    pub fn poly_sequence_to_gated_track(&self, message: &Sysex, gated_track: usize) -> Result<Sysex> {
        self.edit_message(message, |patch| sequencer::poly_to_gated(patch, gated_track))
    }

    /// Message-level [`sequencer::clear_poly_sequencer`].
    pub fn clear_poly_sequencer(&self, message: &Sysex, layer_a: bool, layer_b: bool) -> Result<Sysex> {
        self.edit_message(message, |patch| {
            Ok(sequencer::clear_poly_sequencer(patch, layer_a, layer_b))
        })
    }

    /// Message-level [`sequencer::copy_sequencers`]; `locked` provides the sequences.
    pub fn copy_sequencers_from_other(&self, current: &Sysex, locked: &Sysex) -> Result<Sysex> {
        let source = self.patch_from_sysex(locked)?;
        self.edit_message(current, |patch| Ok(sequencer::copy_sequencers(patch, &source)))
    }

    /// Send one layer of a program as an edit buffer in which both layers
    /// hold that layer's sound.
    pub fn layer_to_sysex(&self, patch: &RawPatch, source: Layer) -> Result<Sysex> {
        self.patch_to_sysex(&sequencer::copy_layer(patch, source))
    }

    /// Whether two messages carry voice-identical programs.
    pub fn same_voice(&self, a: &Sysex, b: &Sysex) -> Result<bool> {
        Ok(fingerprint::same_voice(&self.patch_from_sysex(a)?, &self.patch_from_sysex(b)?))
    }
}
