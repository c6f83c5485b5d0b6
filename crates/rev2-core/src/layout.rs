//! Memory layout of a decoded Rev2 program.
//!
//! A program is 2048 bytes split into two mirrored 1024-byte layers. Every
//! field below is addressed relative to the start of a layer, so the same
//! [`Field`] works for Layer A and Layer B.

use std::fmt;
use std::ops::Range;

/// Size of a decoded program in bytes.
pub const PATCH_SIZE: usize = 2048;

/// Size of one layer.
pub const LAYER_SIZE: usize = PATCH_SIZE / 2;

/// Number of bytes actually carried by a dump; the rest is padding.
pub const PAYLOAD_SIZE: usize = 2046;

/// Number of gated sequencer tracks.
pub const GATED_TRACKS: usize = 4;

/// Steps per gated sequencer track.
pub const GATED_STEPS: usize = 16;

/// Number of poly sequencer tracks.
pub const POLY_TRACKS: usize = 6;

/// Steps per poly sequencer track.
pub const POLY_STEPS: usize = 64;

/// Distance between two poly tracks: 64 note bytes followed by 64 velocity bytes.
pub const POLY_TRACK_STRIDE: usize = 2 * POLY_STEPS;

/// Length of a layer name.
pub const NAME_LENGTH: usize = 20;

/// Gated sequencer sentinel: restart the sequence.
pub const GATED_RESET: u8 = 126;

/// Gated sequencer sentinel: rest.
pub const GATED_REST: u8 = 127;

/// Largest step value numeric conversion may produce.
pub const GATED_MAX_VALUE: u8 = 125;

/// Note written by poly sequencer clearing (middle C).
pub const DEFAULT_NOTE: u8 = 0x3C;

/// Gated sequencer destination "all oscillator frequencies".
pub const DEST_OSC_ALL_FREQ: u8 = 3;

/// The two halves of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    A,
    B,
}

impl Layer {
    /// Both layers, A first.
    pub const ALL: [Layer; 2] = [Layer::A, Layer::B];

    /// Absolute offset of the first byte of this layer.
    pub const fn base(self) -> usize {
        match self {
            Layer::A => 0,
            Layer::B => LAYER_SIZE,
        }
    }

    /// The other layer.
    pub const fn other(self) -> Layer {
        match self {
            Layer::A => Layer::B,
            Layer::B => Layer::A,
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::A => write!(f, "A"),
            Layer::B => write!(f, "B"),
        }
    }
}

/// A named byte range inside a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    /// Offset relative to the layer base.
    pub offset: usize,
    pub size: usize,
}

impl Field {
    const fn new(name: &'static str, offset: usize, size: usize) -> Self {
        Self { name, offset, size }
    }

    /// Absolute byte range of this field in `layer`.
    pub fn range(&self, layer: Layer) -> Range<usize> {
        let start = layer.base() + self.offset;
        start..start + self.size
    }

    /// Absolute offset of the first byte of this field in `layer`.
    pub fn at(&self, layer: Layer) -> usize {
        layer.base() + self.offset
    }

    /// Whether two fields share at least one byte.
    pub fn overlaps(&self, other: &Field) -> bool {
        self.offset < other.offset + other.size && other.offset < self.offset + self.size
    }
}

pub const GATED_SEQ_DESTINATION: Field = Field::new("gated sequencer destination", 111, 1);
pub const TEMPO: Field = Field::new("tempo", 130, 1);
pub const CLOCK_DIVIDE: Field = Field::new("clock divide", 131, 1);
/// 0 selects the gated sequencer, 1 the poly sequencer.
pub const GATED_SEQ_ON: Field = Field::new("gated sequencer on", 139, 1);
pub const GATED_SEQ_TRACKS: Field =
    Field::new("gated sequencer tracks", 140, GATED_TRACKS * GATED_STEPS);
pub const UNUSED: Field = Field::new("unused", 211, 20);
pub const AB_MODE: Field = Field::new("a/b mode", 231, 1);
pub const NAME: Field = Field::new("layer name", 235, NAME_LENGTH);
/// Six tracks, each 64 note bytes followed by 64 velocity bytes.
pub const POLY_SEQ: Field = Field::new("poly sequencer", 256, POLY_TRACKS * POLY_TRACK_STRIDE);

/// Every named field, in offset order.
pub const FIELDS: [Field; 9] = [
    GATED_SEQ_DESTINATION,
    TEMPO,
    CLOCK_DIVIDE,
    GATED_SEQ_ON,
    GATED_SEQ_TRACKS,
    UNUSED,
    AB_MODE,
    NAME,
    POLY_SEQ,
];

/// Fields that hold no sound-relevant data.
pub const BLANK_OUT_FIELDS: [Field; 2] = [UNUSED, NAME];

/// Absolute blank-out zones for both layers.
pub fn blank_out_zones() -> Vec<Range<usize>> {
    BLANK_OUT_FIELDS
        .iter()
        .flat_map(|field| Layer::ALL.into_iter().map(move |layer| field.range(layer)))
        .collect()
}

/// Absolute offset of a gated sequencer step.
pub fn gated_step_offset(layer: Layer, track: usize, step: usize) -> usize {
    debug_assert!(track < GATED_TRACKS && step < GATED_STEPS);
    GATED_SEQ_TRACKS.at(layer) + track * GATED_STEPS + step
}

/// Absolute offset of a poly sequencer note.
pub fn poly_note_offset(layer: Layer, track: usize, step: usize) -> usize {
    debug_assert!(track < POLY_TRACKS && step < POLY_STEPS);
    POLY_SEQ.at(layer) + track * POLY_TRACK_STRIDE + step
}

/// Absolute offset of a poly sequencer velocity.
pub fn poly_velocity_offset(layer: Layer, track: usize, step: usize) -> usize {
    poly_note_offset(layer, track, step) + POLY_STEPS
}
