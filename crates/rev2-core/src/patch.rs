//! Decoded program memory.

use crate::error::{Error, Result};
use crate::layout::{self, Field, Layer, LAYER_SIZE, NAME, PATCH_SIZE, PAYLOAD_SIZE};
use crate::program::ProgramNumber;

/// How the two layers of a program are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMode {
    /// Only Layer A sounds.
    Single,
    /// Both layers sound on every key.
    Stack,
    /// Layers are split across the keyboard.
    Split,
    /// A value the synth does not document.
    Other(u8),
}

impl LayerMode {
    pub fn from_byte(value: u8) -> Self {
        match value {
            0 => LayerMode::Single,
            1 => LayerMode::Stack,
            2 => LayerMode::Split,
            other => LayerMode::Other(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            LayerMode::Single => 0,
            LayerMode::Stack => 1,
            LayerMode::Split => 2,
            LayerMode::Other(value) => value,
        }
    }

    pub fn number_of_layers(self) -> usize {
        match self {
            LayerMode::Single => 1,
            _ => 2,
        }
    }
}

/// A decoded 2048-byte Rev2 program.
///
/// The buffer always holds exactly [`PATCH_SIZE`] bytes. It optionally carries
/// the program slot it was dumped from, which is needed to send it back as a
/// program dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPatch {
    data: Box<[u8; PATCH_SIZE]>,
    program: Option<ProgramNumber>,
}

impl Default for RawPatch {
    fn default() -> Self {
        Self {
            data: Box::new([0; PATCH_SIZE]),
            program: None,
        }
    }
}

impl RawPatch {
    /// An all-zero program.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a program from stored bytes.
    ///
    /// Accepts either the full 2048-byte image or the 2046-byte payload carried
    /// by a dump, in which case the two padding bytes are zero.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != PATCH_SIZE && bytes.len() != PAYLOAD_SIZE {
            return Err(Error::SizeContract {
                what: "patch buffer",
                expected: PATCH_SIZE,
                actual: bytes.len(),
            });
        }
        let mut patch = Self::new();
        patch.data[..bytes.len()].copy_from_slice(bytes);
        Ok(patch)
    }

    /// Attach a program slot.
    pub fn with_program(mut self, program: ProgramNumber) -> Self {
        self.program = Some(program);
        self
    }

    pub fn program(&self) -> Option<ProgramNumber> {
        self.program
    }

    pub fn set_program(&mut self, program: Option<ProgramNumber>) {
        self.program = program;
    }

    /// The full memory image.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..]
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data[..]
    }

    /// The part of the image that is carried on the wire.
    pub fn payload(&self) -> &[u8] {
        &self.data[..PAYLOAD_SIZE]
    }

    /// One half of the image.
    pub fn layer(&self, layer: Layer) -> &[u8] {
        &self.data[layer.base()..layer.base() + LAYER_SIZE]
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut [u8] {
        &mut self.data[layer.base()..layer.base() + LAYER_SIZE]
    }

    /// The bytes of a named field.
    pub fn field(&self, field: &Field, layer: Layer) -> &[u8] {
        &self.data[field.range(layer)]
    }

    pub fn field_mut(&mut self, field: &Field, layer: Layer) -> &mut [u8] {
        &mut self.data[field.range(layer)]
    }

    /// First byte of a named field.
    pub fn byte(&self, field: &Field, layer: Layer) -> u8 {
        self.data[field.at(layer)]
    }

    pub fn set_byte(&mut self, field: &Field, layer: Layer, value: u8) {
        self.data[field.at(layer)] = value;
    }

    /// Copy a field from one layer to the other within this program.
    pub fn mirror_field(&mut self, field: &Field, from: Layer) {
        let src = field.range(from);
        self.data.copy_within(src, field.at(from.other()));
    }

    /// Copy a field of both layers from another program.
    pub fn copy_field_from(&mut self, other: &RawPatch, field: &Field) {
        for layer in Layer::ALL {
            let range = field.range(layer);
            self.data[range.clone()].copy_from_slice(&other.data[range]);
        }
    }

    pub fn tempo(&self, layer: Layer) -> u8 {
        self.byte(&layout::TEMPO, layer)
    }

    pub fn clock_divide(&self, layer: Layer) -> u8 {
        self.byte(&layout::CLOCK_DIVIDE, layer)
    }

    /// Whether the gated sequencer (rather than the poly sequencer) is active.
    pub fn gated_seq_active(&self, layer: Layer) -> bool {
        self.byte(&layout::GATED_SEQ_ON, layer) == 0
    }

    pub fn gated_destination(&self, layer: Layer) -> u8 {
        self.byte(&layout::GATED_SEQ_DESTINATION, layer)
    }

    /// Layer combination, stored in Layer A.
    pub fn layer_mode(&self) -> LayerMode {
        LayerMode::from_byte(self.byte(&layout::AB_MODE, Layer::A))
    }

    /// Whether the layers are stacked and their sequencers must stay in sync.
    pub fn is_stacked(&self) -> bool {
        self.layer_mode() == LayerMode::Stack
    }

    pub fn gated_step(&self, layer: Layer, track: usize, step: usize) -> u8 {
        self.data[layout::gated_step_offset(layer, track, step)]
    }

    pub fn set_gated_step(&mut self, layer: Layer, track: usize, step: usize, value: u8) {
        self.data[layout::gated_step_offset(layer, track, step)] = value;
    }

    pub fn poly_note(&self, layer: Layer, track: usize, step: usize) -> u8 {
        self.data[layout::poly_note_offset(layer, track, step)]
    }

    pub fn set_poly_note(&mut self, layer: Layer, track: usize, step: usize, note: u8) {
        self.data[layout::poly_note_offset(layer, track, step)] = note;
    }

    pub fn poly_velocity(&self, layer: Layer, track: usize, step: usize) -> u8 {
        self.data[layout::poly_velocity_offset(layer, track, step)]
    }

    pub fn set_poly_velocity(&mut self, layer: Layer, track: usize, step: usize, velocity: u8) {
        self.data[layout::poly_velocity_offset(layer, track, step)] = velocity;
    }

    /// Name of a layer with trailing padding removed.
    pub fn layer_name(&self, layer: Layer) -> String {
        self.field(&NAME, layer)
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { ' ' })
            .collect::<String>()
            .trim_end()
            .to_string()
    }

    /// Program name, which is the name of Layer A.
    pub fn name(&self) -> String {
        self.layer_name(Layer::A)
    }

    /// Set a layer name. Longer names are truncated, shorter ones space padded.
    pub fn set_layer_name(&mut self, layer: Layer, name: &str) -> Result<()> {
        if !name.chars().all(|c| c.is_ascii_graphic() || c == ' ') {
            return Err(Error::InvalidName(name.to_string()));
        }
        let target = self.field_mut(&NAME, layer);
        target.fill(b' ');
        for (slot, b) in target.iter_mut().zip(name.bytes()) {
            *slot = b;
        }
        Ok(())
    }
}
